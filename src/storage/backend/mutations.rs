//! Write operations for SeaOrmStorage
//!
//! 实现 `AnalyticsStore`：会话、事件批量与错误报告的写入，以及连通性探测。

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::EntityTrait;
use tracing::{debug, error};

use super::SeaOrmStorage;
use super::converters::{error_to_active_model, event_to_active_model, session_to_active_model};
use crate::errors::{AnalyticsError, Result};
use crate::storage::{AnalyticsStore, ErrorRecord, EventRecord, GeoLocation, SessionRecord};

use migration::entities::{app_error, app_event, app_session};

#[async_trait]
impl AnalyticsStore for SeaOrmStorage {
    async fn insert_session(
        &self,
        session: &SessionRecord,
        geo: Option<&GeoLocation>,
    ) -> Result<()> {
        let model = session_to_active_model(session, geo, Utc::now())?;

        app_session::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to insert session {}: {}", session.session_id, e);
                AnalyticsError::database_operation(format!("Failed to insert session: {}", e))
            })?;

        debug!("Session {} stored", session.session_id);
        Ok(())
    }

    async fn insert_events(&self, events: &[EventRecord]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let received_at = Utc::now();
        let models = events
            .iter()
            .map(|event| event_to_active_model(event, received_at))
            .collect::<Result<Vec<_>>>()?;

        // 单条多行 INSERT，原子写入
        app_event::Entity::insert_many(models)
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to insert {} events: {}", events.len(), e);
                AnalyticsError::database_operation(format!("Failed to insert events: {}", e))
            })?;

        debug!("{} events stored", events.len());
        Ok(())
    }

    async fn insert_error(&self, report: &ErrorRecord) -> Result<()> {
        let model = error_to_active_model(report, Utc::now())?;

        app_error::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to insert error report for {}: {}", report.session_id, e);
                AnalyticsError::database_operation(format!("Failed to insert error report: {}", e))
            })?;

        Ok(())
    }

    async fn health_check(&self) -> bool {
        match self.db.ping().await {
            Ok(()) => true,
            Err(e) => {
                error!("Database health check failed: {}", e);
                false
            }
        }
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }
}
