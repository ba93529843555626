use serde::{Deserialize, Serialize};

/// 短链接记录
///
/// 序列化字段名与追加日志、数据库列保持一致：`url`、`user_id`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrl {
    pub id: i64,
    pub code: String,
    #[serde(rename = "url")]
    pub original_url: String,
    #[serde(rename = "user_id")]
    pub owner_id: String,
    #[serde(default)]
    pub is_deleted: bool,
}

/// 批量保存的输入项，code 已由调用方生成
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchUrlItem {
    pub correlation_id: String,
    pub original_url: String,
    pub code: String,
}

/// 批量保存的结果项，顺序与输入一致
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchUrl {
    pub correlation_id: String,
    pub code: String,
}

/// 存储后端信息（用于日志和统计输出）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    pub storage_type: String,
    /// 数据在重启后是否保留
    pub persistent: bool,
}
