use thiserror::Error;

/// 引擎与批处理的统一错误类型
///
/// 退回不完整（未提交/部分到期）不是错误，见 `BatchError`。
#[derive(Debug, Error)]
pub enum MatchError {
    /// 输入结构非法，本次调用不产生任何报告
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl MatchError {
    pub fn invalid(message: impl Into<String>) -> Self {
        MatchError::InvalidInput(message.into())
    }

    /// 为输入错误补充定位信息，其它错误原样返回
    pub fn context(self, what: impl std::fmt::Display) -> Self {
        match self {
            MatchError::InvalidInput(message) => {
                MatchError::InvalidInput(format!("{}: {}", what, message))
            }
            other => other,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, MatchError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
