//! Mutation operations for SeaOrmStorage

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, SqlErr, TransactionTrait,
    sea_query::Expr,
};
use tracing::{debug, info};

use super::converters::new_active_model;
use super::query::find_model_by_url;
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, ShortUrlError};
use crate::storage::{BatchUrl, BatchUrlItem};

use migration::entities::short_url;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// 唯一约束冲突后按 URL 回查：找到记录说明 URL 已被缩短，否则是短码冲突
async fn resolve_unique_violation<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    original_url: &str,
) -> ShortUrlError {
    match find_model_by_url(conn, original_url).await {
        Ok(Some(existing)) => ShortUrlError::url_conflict(original_url, existing.code),
        Ok(None) => ShortUrlError::code_exists(format!("短码已被占用: {}", code)),
        Err(e) => ShortUrlError::database_operation(format!("冲突回查失败: {}", e)),
    }
}

impl SeaOrmStorage {
    pub(super) async fn insert_one(
        &self,
        code: &str,
        original_url: &str,
        owner_id: &str,
    ) -> Result<i64> {
        let db = &self.db;

        let result = retry::with_retry(&format!("save({})", code), self.retry_config, || {
            short_url::Entity::insert(new_active_model(code, original_url, owner_id)).exec(db)
        })
        .await;

        match result {
            Ok(res) => Ok(res.last_insert_id),
            Err(e) if is_unique_violation(&e) => {
                Err(resolve_unique_violation(db, code, original_url).await)
            }
            Err(e) => Err(ShortUrlError::database_operation(format!(
                "保存短链接失败: {}",
                e
            ))),
        }
    }

    /// 批量插入
    ///
    /// 整个批次在一个事务中执行，每条记录使用独立的保存点：URL 冲突只回滚该条并解析为
    /// 已有短码，其他错误回滚整个批次。
    pub(super) async fn insert_batch(
        &self,
        items: &[BatchUrlItem],
        owner_id: &str,
    ) -> Result<Vec<BatchUrl>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ShortUrlError::database_operation(format!("开启事务失败: {}", e)))?;

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let savepoint = txn.begin().await?;

            let inserted = short_url::Entity::insert(new_active_model(
                &item.code,
                &item.original_url,
                owner_id,
            ))
            .exec(&savepoint)
            .await;

            let code = match inserted {
                Ok(_) => {
                    savepoint.commit().await?;
                    item.code.clone()
                }
                Err(e) if is_unique_violation(&e) => {
                    savepoint.rollback().await?;
                    match resolve_unique_violation(&txn, &item.code, &item.original_url).await {
                        ShortUrlError::UrlConflict { existing_code, .. } => {
                            debug!(
                                "Batch item {} resolved to existing code {}",
                                item.correlation_id, existing_code
                            );
                            existing_code
                        }
                        other => {
                            txn.rollback().await?;
                            return Err(other);
                        }
                    }
                }
                Err(e) => {
                    savepoint.rollback().await?;
                    txn.rollback().await?;
                    return Err(ShortUrlError::database_operation(format!(
                        "批量保存失败 ({}): {}",
                        item.correlation_id, e
                    )));
                }
            };

            results.push(BatchUrl {
                correlation_id: item.correlation_id.clone(),
                code,
            });
        }

        txn.commit()
            .await
            .map_err(|e| ShortUrlError::database_operation(format!("提交事务失败: {}", e)))?;

        info!("Batch saved: {} items", results.len());
        Ok(results)
    }

    pub(super) async fn mark_deleted(&self, codes: &[String], owner_id: &str) -> Result<u64> {
        if codes.is_empty() {
            return Ok(0);
        }
        let db = &self.db;

        let result = retry::with_retry("soft_delete", self.retry_config, || {
            short_url::Entity::update_many()
                .col_expr(short_url::Column::IsDeleted, Expr::value(true))
                .filter(short_url::Column::UserId.eq(owner_id))
                .filter(short_url::Column::Code.is_in(codes.iter().cloned()))
                .filter(short_url::Column::IsDeleted.eq(false))
                .exec(db)
        })
        .await
        .map_err(|e| ShortUrlError::database_operation(format!("软删除失败: {}", e)))?;

        debug!(
            "Soft deleted {} of {} codes for owner {}",
            result.rows_affected,
            codes.len(),
            owner_id
        );
        Ok(result.rows_affected)
    }
}
