//! App error / crash report entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "app_errors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: String,
    pub timestamp: DateTimeUtc,
    pub error_type: String,
    #[sea_orm(column_type = "Text")]
    pub error_message: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub stack_trace: Option<String>,
    /// Free-form error context, serialized JSON object
    #[sea_orm(column_type = "Text", nullable)]
    pub context: Option<String>,
    pub received_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
