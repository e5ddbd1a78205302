//! Ingestion 错误类型

use std::path::PathBuf;

use contracts::ContractError;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 运行文件读写失败
    #[error("io error on {path}: {source}")]
    Io {
        /// 文件路径
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 运行文件不是合法 JSON
    #[error("failed to decode run file {path}: {source}")]
    Json {
        /// 文件路径
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 运行数据缺少所需通道
    #[error("run {run_id} has no channel named '{channel}'")]
    MissingChannel {
        /// 运行编号
        run_id: String,
        /// 通道名
        channel: String,
    },

    /// 运行数据结构不一致
    #[error("run {run_id} is malformed: {message}")]
    MalformedRun {
        /// 运行编号
        run_id: String,
        /// 错误消息
        message: String,
    },

    /// 参数解码失败
    #[error("failed to decode parameter '{name}': {message}")]
    Parameter {
        /// 参数名
        name: String,
        /// 错误消息
        message: String,
    },

    /// 表结构描述冲突
    #[error("schema column '{name}' is defined twice")]
    DuplicateColumn {
        /// 列名
        name: String,
    },

    /// 信号构造失败
    #[error(transparent)]
    Signal(#[from] ContractError),
}

impl IngestionError {
    pub(crate) fn parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parameter {
            name: name.into(),
            message: message.into(),
        }
    }

    pub(crate) fn malformed(run_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedRun {
            run_id: run_id.into(),
            message: message.into(),
        }
    }
}

impl From<IngestionError> for ContractError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::Signal(inner) => inner,
            IngestionError::Io { source, .. } => ContractError::Io(source),
            other => ContractError::Other(other.to_string()),
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
