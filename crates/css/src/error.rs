use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    /// 样式表不可读或不可写
    #[error("cannot {action} stylesheet {}: {source}", .path.display())]
    FileAccess {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse stylesheet {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("stage `{stage}` failed: {message}")]
    Stage { stage: String, message: String },

    #[error("failed to emit css: {0}")]
    Codegen(#[from] std::fmt::Error),
}

impl ProcessError {
    pub(crate) fn file_access(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ProcessError::FileAccess {
            action,
            path: path.into(),
            source,
        }
    }

    /// 供自定义阶段使用的错误构造函数
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        ProcessError::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}
