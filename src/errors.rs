use std::fmt;

#[derive(Debug, Clone)]
pub enum AnalyticsError {
    Config(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
    GeoLookup(String),
}

impl AnalyticsError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            AnalyticsError::Config(_) => "E001",
            AnalyticsError::DatabaseConfig(_) => "E002",
            AnalyticsError::DatabaseConnection(_) => "E003",
            AnalyticsError::DatabaseOperation(_) => "E004",
            AnalyticsError::FileOperation(_) => "E005",
            AnalyticsError::Serialization(_) => "E006",
            AnalyticsError::GeoLookup(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            AnalyticsError::Config(_) => "Configuration Error",
            AnalyticsError::DatabaseConfig(_) => "Database Configuration Error",
            AnalyticsError::DatabaseConnection(_) => "Database Connection Error",
            AnalyticsError::DatabaseOperation(_) => "Database Operation Error",
            AnalyticsError::FileOperation(_) => "File Operation Error",
            AnalyticsError::Serialization(_) => "Serialization Error",
            AnalyticsError::GeoLookup(_) => "Geolocation Lookup Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            AnalyticsError::Config(msg)
            | AnalyticsError::DatabaseConfig(msg)
            | AnalyticsError::DatabaseConnection(msg)
            | AnalyticsError::DatabaseOperation(msg)
            | AnalyticsError::FileOperation(msg)
            | AnalyticsError::Serialization(msg)
            | AnalyticsError::GeoLookup(msg) => msg,
        }
    }

    /// 格式化为彩色输出（启动失败时打印到终端）
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

impl fmt::Display for AnalyticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AnalyticsError {}

// 便捷的构造函数
impl AnalyticsError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        AnalyticsError::Config(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        AnalyticsError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        AnalyticsError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        AnalyticsError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        AnalyticsError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        AnalyticsError::Serialization(msg.into())
    }

    pub fn geo_lookup<T: Into<String>>(msg: T) -> Self {
        AnalyticsError::GeoLookup(msg.into())
    }
}

impl From<sea_orm::DbErr> for AnalyticsError {
    fn from(err: sea_orm::DbErr) -> Self {
        AnalyticsError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for AnalyticsError {
    fn from(err: std::io::Error) -> Self {
        AnalyticsError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        AnalyticsError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
