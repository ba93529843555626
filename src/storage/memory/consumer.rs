use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::errors::{Result, ShortUrlError};
use crate::storage::ShortUrl;

/// 追加日志读取端，逐行解码记录
pub struct Consumer {
    path: PathBuf,
    reader: BufReader<File>,
    line_no: usize,
}

impl Consumer {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            ShortUrlError::file_operation(format!("无法读取存储文件 {}: {}", path.display(), e))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            line_no: 0,
        })
    }

    /// 读取下一条记录，到达文件末尾时返回 `None`
    ///
    /// 空行跳过；无法解码的行（包括被截断的最后一行）返回带行号的错误。
    pub fn read_record(&mut self) -> Result<Option<ShortUrl>> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self.reader.read_line(&mut line)?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return serde_json::from_str::<ShortUrl>(trimmed)
                .map(Some)
                .map_err(|e| {
                    ShortUrlError::serialization(format!(
                        "{}:{}: 无法解析记录: {}",
                        self.path.display(),
                        self.line_no,
                        e
                    ))
                });
        }
    }

    /// 读取全部记录，按文件顺序返回
    pub fn read_all(mut self) -> Result<Vec<ShortUrl>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }
}
