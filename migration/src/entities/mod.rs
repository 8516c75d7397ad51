pub mod app_error;
pub mod app_event;
pub mod app_session;

pub use app_error::Entity as AppErrorEntity;
pub use app_event::Entity as AppEventEntity;
pub use app_session::Entity as AppSessionEntity;
