use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::{ErrorRecord, EventRecord, GeoLocation, SessionRecord};

/// 上报数据的持久化接口
///
/// HTTP 层只依赖这个 trait，测试中可替换为内存实现。
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// 写入一条会话；`geo` 为 `None` 时地理位置列全部为 NULL
    async fn insert_session(&self, session: &SessionRecord, geo: Option<&GeoLocation>)
    -> Result<()>;

    /// 批量写入事件，单条多行 INSERT，要么全部成功要么全部失败。空切片不访问数据库
    async fn insert_events(&self, events: &[EventRecord]) -> Result<()>;

    async fn insert_error(&self, error: &ErrorRecord) -> Result<()>;

    /// 数据库连通性探测，任何错误都记录日志并返回 `false`
    async fn health_check(&self) -> bool;

    /// 后端名称（sqlite / postgres / mysql），用于日志与健康检查
    fn backend_name(&self) -> &str;
}

pub struct StorageFactory;

impl StorageFactory {
    /// 根据全局配置创建存储后端并执行迁移
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();

        let storage = SeaOrmStorage::new(&config.database).await?;
        Ok(Arc::new(storage))
    }
}
