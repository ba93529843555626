use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::errors::{Result, ShortUrlError};
use crate::storage::ShortUrl;

/// 追加日志写入端
///
/// 每条记录先序列化成完整的一行，再一次性写入文件，不经过用户态缓冲。
/// 写入失败时把文件截回写入前的长度；截断也失败则拒绝后续写入，避免日志中留下半行。
pub struct Producer {
    file: File,
    broken: bool,
}

impl Producer {
    /// 以追加模式打开日志文件，必要时创建父目录和文件
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                ShortUrlError::file_operation(format!(
                    "无法创建存储目录 {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                ShortUrlError::file_operation(format!(
                    "无法打开存储文件 {}: {}",
                    path.display(),
                    e
                ))
            })?;

        Ok(Self {
            file,
            broken: false,
        })
    }

    pub fn write_record(&mut self, record: &ShortUrl) -> Result<()> {
        if self.broken {
            return Err(ShortUrlError::file_operation(
                "存储文件在之前的写入失败后无法恢复，拒绝继续写入",
            ));
        }

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let len_before = self.file.metadata()?.len();
        if let Err(e) = self.file.write_all(&line).and_then(|_| self.file.flush()) {
            if self.file.set_len(len_before).is_err() {
                self.broken = true;
            }
            return Err(ShortUrlError::file_operation(format!(
                "写入记录 {} 失败: {}",
                record.code, e
            )));
        }
        Ok(())
    }
}
