use std::fmt;

/// 存储后端与 URL 服务共用的错误类型
///
/// `UrlConflict` 属于预期结果而非故障，携带已占用该 URL 的短码，调用方可直接返回它。
/// 查询不到记录时返回 `None`，没有对应的错误变体。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortUrlError {
    UrlConflict {
        original_url: String,
        existing_code: String,
    },
    CodeExists(String),
    InvalidUrl(String),
    Validation(String),
    StorageConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
    GenerationFailure(String),
    GenerationExhausted(u32),
    DeleteQueueFull(String),
    DeleteQueueClosed(String),
    Timeout(String),
}

impl ShortUrlError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShortUrlError::UrlConflict { .. } => "E001",
            ShortUrlError::CodeExists(_) => "E002",
            ShortUrlError::InvalidUrl(_) => "E003",
            ShortUrlError::Validation(_) => "E004",
            ShortUrlError::StorageConfig(_) => "E005",
            ShortUrlError::DatabaseConnection(_) => "E006",
            ShortUrlError::DatabaseOperation(_) => "E007",
            ShortUrlError::FileOperation(_) => "E008",
            ShortUrlError::Serialization(_) => "E009",
            ShortUrlError::GenerationFailure(_) => "E010",
            ShortUrlError::GenerationExhausted(_) => "E011",
            ShortUrlError::DeleteQueueFull(_) => "E012",
            ShortUrlError::DeleteQueueClosed(_) => "E013",
            ShortUrlError::Timeout(_) => "E014",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ShortUrlError::UrlConflict { .. } => "URL Already Shortened",
            ShortUrlError::CodeExists(_) => "Short Code Already Taken",
            ShortUrlError::InvalidUrl(_) => "Invalid URL",
            ShortUrlError::Validation(_) => "Validation Error",
            ShortUrlError::StorageConfig(_) => "Storage Configuration Error",
            ShortUrlError::DatabaseConnection(_) => "Database Connection Error",
            ShortUrlError::DatabaseOperation(_) => "Database Operation Error",
            ShortUrlError::FileOperation(_) => "File Operation Error",
            ShortUrlError::Serialization(_) => "Serialization Error",
            ShortUrlError::GenerationFailure(_) => "Code Generation Failure",
            ShortUrlError::GenerationExhausted(_) => "Code Generation Exhausted",
            ShortUrlError::DeleteQueueFull(_) => "Delete Queue Full",
            ShortUrlError::DeleteQueueClosed(_) => "Delete Queue Closed",
            ShortUrlError::Timeout(_) => "Timeout",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> String {
        match self {
            ShortUrlError::UrlConflict {
                original_url,
                existing_code,
            } => format!("{} is already shortened as {}", original_url, existing_code),
            ShortUrlError::GenerationExhausted(attempts) => {
                format!("no free short code after {} attempts", attempts)
            }
            ShortUrlError::CodeExists(msg)
            | ShortUrlError::InvalidUrl(msg)
            | ShortUrlError::Validation(msg)
            | ShortUrlError::StorageConfig(msg)
            | ShortUrlError::DatabaseConnection(msg)
            | ShortUrlError::DatabaseOperation(msg)
            | ShortUrlError::FileOperation(msg)
            | ShortUrlError::Serialization(msg)
            | ShortUrlError::GenerationFailure(msg)
            | ShortUrlError::DeleteQueueFull(msg)
            | ShortUrlError::DeleteQueueClosed(msg)
            | ShortUrlError::Timeout(msg) => msg.clone(),
        }
    }

    /// URL 冲突时返回已有短码
    pub fn existing_code(&self) -> Option<&str> {
        match self {
            ShortUrlError::UrlConflict { existing_code, .. } => Some(existing_code),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ShortUrlError::UrlConflict { .. })
    }

    /// 存储故障：I/O、连接、配置和持久化数据错误
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            ShortUrlError::StorageConfig(_)
                | ShortUrlError::DatabaseConnection(_)
                | ShortUrlError::DatabaseOperation(_)
                | ShortUrlError::FileOperation(_)
                | ShortUrlError::Serialization(_)
        )
    }

    /// 格式化为彩色输出（用于 CLI 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ShortUrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShortUrlError {}

// 便捷的构造函数
impl ShortUrlError {
    pub fn url_conflict<U: Into<String>, C: Into<String>>(original_url: U, existing_code: C) -> Self {
        ShortUrlError::UrlConflict {
            original_url: original_url.into(),
            existing_code: existing_code.into(),
        }
    }

    pub fn code_exists<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::CodeExists(msg.into())
    }

    pub fn invalid_url<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::InvalidUrl(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::Validation(msg.into())
    }

    pub fn storage_config<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::StorageConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::Serialization(msg.into())
    }

    pub fn generation_failure<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::GenerationFailure(msg.into())
    }

    pub fn delete_queue_full<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::DeleteQueueFull(msg.into())
    }

    pub fn delete_queue_closed<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::DeleteQueueClosed(msg.into())
    }

    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::Timeout(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ShortUrlError {
    fn from(err: sea_orm::DbErr) -> Self {
        ShortUrlError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ShortUrlError {
    fn from(err: std::io::Error) -> Self {
        ShortUrlError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ShortUrlError {
    fn from(err: serde_json::Error) -> Self {
        ShortUrlError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortUrlError>;
