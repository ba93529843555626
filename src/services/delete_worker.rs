//! 异步删除工作池
//!
//! 删除请求进入有界队列后立即返回 `DeleteTicket`，由固定数量的 worker 执行软删除。
//! 丢弃 ticket 不会取消删除。

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::url_service::UrlService;
use super::validation::validate_delete;
use crate::config::DeleterConfig;
use crate::errors::{Result, ShortUrlError};

struct DeleteJob {
    codes: Vec<String>,
    owner_id: String,
    reply: oneshot::Sender<Result<u64>>,
}

/// 删除请求的回执，可等待删除结果
pub struct DeleteTicket {
    rx: oneshot::Receiver<Result<u64>>,
}

impl DeleteTicket {
    /// 等待 worker 完成删除，返回实际标记的条数
    pub async fn wait(self) -> Result<u64> {
        self.rx
            .await
            .map_err(|_| ShortUrlError::delete_queue_closed("delete worker stopped before replying"))?
    }
}

pub struct DeleteDispatcher {
    tx: mpsc::Sender<DeleteJob>,
    workers: Vec<JoinHandle<()>>,
}

impl DeleteDispatcher {
    /// 启动 worker，必须在 tokio 运行时内调用
    pub fn spawn(service: Arc<UrlService>, config: &DeleterConfig) -> Self {
        let (tx, rx) = mpsc::channel::<DeleteJob>(config.queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let worker_count = config.workers.max(1);

        let workers = (0..worker_count)
            .map(|worker_id| {
                let rx = rx.clone();
                let service = service.clone();
                tokio::spawn(async move { run_worker(worker_id, rx, service).await })
            })
            .collect();

        info!(
            "Delete dispatcher started: {} workers, queue capacity {}",
            worker_count, config.queue_capacity
        );
        Self { tx, workers }
    }

    /// 将删除请求放入队列
    ///
    /// 参数非法时立即返回错误；队列已满返回 `DeleteQueueFull`，不会阻塞调用方。
    pub fn dispatch(&self, codes: Vec<String>, owner_id: &str) -> Result<DeleteTicket> {
        validate_delete(&codes, owner_id)?;

        let (reply, rx) = oneshot::channel();
        let job = DeleteJob {
            codes,
            owner_id: owner_id.to_string(),
            reply,
        };

        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                ShortUrlError::delete_queue_full("delete queue is full, try again later")
            }
            mpsc::error::TrySendError::Closed(_) => {
                ShortUrlError::delete_queue_closed("delete dispatcher is shut down")
            }
        })?;

        Ok(DeleteTicket { rx })
    }

    /// 关闭队列并等待已入队的请求全部处理完
    pub async fn shutdown(self) {
        let Self { tx, workers } = self;
        drop(tx);

        for worker in workers {
            if let Err(e) = worker.await {
                error!("Delete worker panicked: {}", e);
            }
        }
        info!("Delete dispatcher stopped");
    }
}

async fn run_worker(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<DeleteJob>>>,
    service: Arc<UrlService>,
) {
    loop {
        // 只在取任务时持有锁
        let job = { rx.lock().await.recv().await };
        let Some(job) = job else {
            break;
        };

        let result = service.delete(&job.codes, &job.owner_id).await;
        if let Err(e) = &result {
            error!(
                "Delete worker {}: failed to delete {} codes for {}: {}",
                worker_id,
                job.codes.len(),
                job.owner_id,
                e
            );
        }
        // 调用方可能已丢弃 ticket
        let _ = job.reply.send(result);
    }
    debug!("Delete worker {} exiting", worker_id);
}
