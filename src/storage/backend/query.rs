//! Query operations for SeaOrmStorage

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use super::converters::model_to_short_url;
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, ShortUrlError};
use crate::storage::ShortUrl;

use migration::entities::short_url;

/// 按原始 URL 查询，可在事务内使用
pub(super) async fn find_model_by_url<C: ConnectionTrait>(
    conn: &C,
    original_url: &str,
) -> std::result::Result<Option<short_url::Model>, DbErr> {
    short_url::Entity::find()
        .filter(short_url::Column::Url.eq(original_url))
        .one(conn)
        .await
}

impl SeaOrmStorage {
    pub(super) async fn ping_db(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| ShortUrlError::database_connection(format!("数据库不可用: {}", e)))
    }

    pub(super) async fn fetch_by_code(&self, code: &str) -> Result<Option<ShortUrl>> {
        let db = &self.db;

        let model = retry::with_retry(&format!("find_by_code({})", code), self.retry_config, || {
            short_url::Entity::find()
                .filter(short_url::Column::Code.eq(code))
                .one(db)
        })
        .await
        .map_err(|e| ShortUrlError::database_operation(format!("按短码查询失败: {}", e)))?;

        Ok(model.map(model_to_short_url))
    }

    pub(super) async fn fetch_by_url(&self, original_url: &str) -> Result<Option<ShortUrl>> {
        let db = &self.db;

        let model = retry::with_retry("find_by_url", self.retry_config, || {
            find_model_by_url(db, original_url)
        })
        .await
        .map_err(|e| ShortUrlError::database_operation(format!("按 URL 查询失败: {}", e)))?;

        Ok(model.map(model_to_short_url))
    }

    pub(super) async fn fetch_by_owner(&self, owner_id: &str) -> Result<Vec<ShortUrl>> {
        let db = &self.db;

        let models = retry::with_retry("find_by_owner", self.retry_config, || {
            short_url::Entity::find()
                .filter(short_url::Column::UserId.eq(owner_id))
                .order_by_asc(short_url::Column::Id)
                .all(db)
        })
        .await
        .map_err(|e| ShortUrlError::database_operation(format!("查询用户短链接失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_short_url).collect())
    }

    pub(super) async fn count_all(&self) -> Result<u64> {
        let db = &self.db;

        retry::with_retry("count_records", self.retry_config, || {
            short_url::Entity::find().count(db)
        })
        .await
        .map_err(|e| ShortUrlError::database_operation(format!("统计记录数失败: {}", e)))
    }

    pub(super) async fn count_owners(&self) -> Result<u64> {
        let db = &self.db;

        // SELECT COUNT(*) FROM (SELECT DISTINCT user_id FROM urls)
        retry::with_retry("count_distinct_owners", self.retry_config, || {
            short_url::Entity::find()
                .select_only()
                .column(short_url::Column::UserId)
                .distinct()
                .count(db)
        })
        .await
        .map_err(|e| ShortUrlError::database_operation(format!("统计用户数失败: {}", e)))
    }
}
