use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitrackError {
    Network(String),
    Timeout(String),
    Parse(String),
    FileOperation(String),
    Serialization(String),
    Validation(String),
}

impl VisitrackError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            VisitrackError::Network(_) => "E001",
            VisitrackError::Timeout(_) => "E002",
            VisitrackError::Parse(_) => "E003",
            VisitrackError::FileOperation(_) => "E004",
            VisitrackError::Serialization(_) => "E005",
            VisitrackError::Validation(_) => "E006",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            VisitrackError::Network(_) => "Network Error",
            VisitrackError::Timeout(_) => "Timeout Error",
            VisitrackError::Parse(_) => "Parse Error",
            VisitrackError::FileOperation(_) => "File Operation Error",
            VisitrackError::Serialization(_) => "Serialization Error",
            VisitrackError::Validation(_) => "Validation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            VisitrackError::Network(msg) => msg,
            VisitrackError::Timeout(msg) => msg,
            VisitrackError::Parse(msg) => msg,
            VisitrackError::FileOperation(msg) => msg,
            VisitrackError::Serialization(msg) => msg,
            VisitrackError::Validation(msg) => msg,
        }
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

impl fmt::Display for VisitrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for VisitrackError {}

// 便捷的构造函数
impl VisitrackError {
    pub fn network<T: Into<String>>(msg: T) -> Self {
        VisitrackError::Network(msg.into())
    }

    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        VisitrackError::Timeout(msg.into())
    }

    pub fn parse<T: Into<String>>(msg: T) -> Self {
        VisitrackError::Parse(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        VisitrackError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        VisitrackError::Serialization(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        VisitrackError::Validation(msg.into())
    }
}

impl From<std::io::Error> for VisitrackError {
    fn from(err: std::io::Error) -> Self {
        VisitrackError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for VisitrackError {
    fn from(err: serde_json::Error) -> Self {
        VisitrackError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for VisitrackError {
    fn from(err: csv::Error) -> Self {
        VisitrackError::Serialization(err.to_string())
    }
}

impl From<ureq::Error> for VisitrackError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(t) => {
                VisitrackError::Timeout(format!("request timed out ({:?})", t))
            }
            other => VisitrackError::Network(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, VisitrackError>;
