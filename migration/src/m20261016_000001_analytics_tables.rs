//! 分析数据表迁移
//!
//! 创建三张表，均以 session_id 松散关联（不建外键）：
//! - app_sessions: 每次启动一行，包含设备/系统/应用/网络/区域/性能信息和 IP 地理位置
//! - app_events: 批量上报的事件
//! - app_errors: 崩溃与错误报告

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppSessions::SessionId)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AppSessions::UserIdHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppSessions::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AppSessions::DeviceModel).string().null())
                    .col(ColumnDef::new(AppSessions::DeviceBrand).string().null())
                    .col(ColumnDef::new(AppSessions::DeviceManufacturer).string().null())
                    .col(ColumnDef::new(AppSessions::DeviceIdHash).string().null())
                    .col(ColumnDef::new(AppSessions::ScreenWidth).integer().null())
                    .col(ColumnDef::new(AppSessions::ScreenHeight).integer().null())
                    .col(ColumnDef::new(AppSessions::ScreenDensity).double().null())
                    .col(ColumnDef::new(AppSessions::SupportedAbis).text().null())
                    .col(ColumnDef::new(AppSessions::OsName).string().null())
                    .col(ColumnDef::new(AppSessions::OsVersion).string().null())
                    .col(ColumnDef::new(AppSessions::ApiLevel).integer().null())
                    .col(ColumnDef::new(AppSessions::KernelVersion).string().null())
                    .col(ColumnDef::new(AppSessions::AppVersion).string().null())
                    .col(ColumnDef::new(AppSessions::AppBuildNumber).string().null())
                    .col(ColumnDef::new(AppSessions::PackageName).string().null())
                    .col(ColumnDef::new(AppSessions::IsFirstLaunch).boolean().null())
                    .col(ColumnDef::new(AppSessions::InstallSource).string().null())
                    .col(ColumnDef::new(AppSessions::LaunchCount).integer().null())
                    .col(ColumnDef::new(AppSessions::NetworkType).string_len(32).null())
                    .col(ColumnDef::new(AppSessions::CarrierName).string().null())
                    .col(ColumnDef::new(AppSessions::IpAddress).string_len(45).null())
                    .col(ColumnDef::new(AppSessions::LocaleLanguage).string_len(32).null())
                    .col(ColumnDef::new(AppSessions::LocaleCountry).string_len(32).null())
                    .col(ColumnDef::new(AppSessions::Timezone).string_len(64).null())
                    .col(ColumnDef::new(AppSessions::TimezoneOffset).double().null())
                    .col(ColumnDef::new(AppSessions::Currency).string_len(16).null())
                    .col(ColumnDef::new(AppSessions::StartupTimeMs).big_integer().null())
                    .col(ColumnDef::new(AppSessions::MemoryUsageMb).double().null())
                    .col(ColumnDef::new(AppSessions::AvailableStorageGb).double().null())
                    .col(ColumnDef::new(AppSessions::GeoCountry).string_len(64).null())
                    .col(ColumnDef::new(AppSessions::GeoRegion).string_len(128).null())
                    .col(ColumnDef::new(AppSessions::GeoCity).string_len(128).null())
                    .col(ColumnDef::new(AppSessions::GeoLatitude).double().null())
                    .col(ColumnDef::new(AppSessions::GeoLongitude).double().null())
                    .col(
                        ColumnDef::new(AppSessions::ReceivedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_app_sessions_timestamp")
                    .table(AppSessions::Table)
                    .col(AppSessions::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_app_sessions_user")
                    .table(AppSessions::Table)
                    .col(AppSessions::UserIdHash)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AppEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AppEvents::SessionId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppEvents::EventType)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppEvents::EventName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppEvents::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AppEvents::Properties).text().null())
                    .col(
                        ColumnDef::new(AppEvents::ReceivedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 单会话时间线查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_app_events_session_time")
                    .table(AppEvents::Table)
                    .col(AppEvents::SessionId)
                    .col(AppEvents::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_app_events_name")
                    .table(AppEvents::Table)
                    .col(AppEvents::EventName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AppErrors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppErrors::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AppErrors::SessionId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppErrors::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppErrors::ErrorType)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AppErrors::ErrorMessage).text().not_null())
                    .col(ColumnDef::new(AppErrors::StackTrace).text().null())
                    .col(ColumnDef::new(AppErrors::Context).text().null())
                    .col(
                        ColumnDef::new(AppErrors::ReceivedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_app_errors_session_time")
                    .table(AppErrors::Table)
                    .col(AppErrors::SessionId)
                    .col(AppErrors::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AppErrors::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AppEvents::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AppSessions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AppSessions {
    #[sea_orm(iden = "app_sessions")]
    Table,
    SessionId,
    UserIdHash,
    Timestamp,
    DeviceModel,
    DeviceBrand,
    DeviceManufacturer,
    DeviceIdHash,
    ScreenWidth,
    ScreenHeight,
    ScreenDensity,
    SupportedAbis,
    OsName,
    OsVersion,
    ApiLevel,
    KernelVersion,
    AppVersion,
    AppBuildNumber,
    PackageName,
    IsFirstLaunch,
    InstallSource,
    LaunchCount,
    NetworkType,
    CarrierName,
    IpAddress,
    LocaleLanguage,
    LocaleCountry,
    Timezone,
    TimezoneOffset,
    Currency,
    StartupTimeMs,
    MemoryUsageMb,
    AvailableStorageGb,
    GeoCountry,
    GeoRegion,
    GeoCity,
    GeoLatitude,
    GeoLongitude,
    ReceivedAt,
}

#[derive(DeriveIden)]
enum AppEvents {
    #[sea_orm(iden = "app_events")]
    Table,
    Id,
    SessionId,
    EventType,
    EventName,
    Timestamp,
    Properties,
    ReceivedAt,
}

#[derive(DeriveIden)]
enum AppErrors {
    #[sea_orm(iden = "app_errors")]
    Table,
    Id,
    SessionId,
    Timestamp,
    ErrorType,
    ErrorMessage,
    StackTrace,
    Context,
    ReceivedAt,
}
