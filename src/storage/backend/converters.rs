use sea_orm::ActiveValue::{NotSet, Set};

use crate::storage::ShortUrl;
use migration::entities::short_url;

pub fn model_to_short_url(model: short_url::Model) -> ShortUrl {
    ShortUrl {
        id: model.id,
        code: model.code,
        original_url: model.url,
        owner_id: model.user_id,
        is_deleted: model.is_deleted,
    }
}

/// 构造待插入的新记录，id 由数据库分配
pub fn new_active_model(code: &str, original_url: &str, owner_id: &str) -> short_url::ActiveModel {
    short_url::ActiveModel {
        id: NotSet,
        code: Set(code.to_string()),
        url: Set(original_url.to_string()),
        user_id: Set(owner_id.to_string()),
        is_deleted: Set(false),
    }
}
