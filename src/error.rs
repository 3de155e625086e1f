//! 错误类型
//!
//! 协调器与外部进程调用共用的错误定义。

use crate::coord::Role;
use std::path::PathBuf;
use thiserror::Error;

/// 命令模板解析或展开时的错误。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("command template is empty")]
    Empty,

    #[error("template references positional argument {{{index}}} but only {given} were given")]
    MissingArgument { index: usize, given: usize },

    #[error("unterminated placeholder in token `{0}`")]
    BadPlaceholder(String),

    #[error("`>` redirect has no target")]
    DanglingRedirect,
}

/// 使协调运行停止的错误。
#[derive(Debug, Error)]
pub enum CoordError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot file {0} does not exist")]
    MissingSnapshot(PathBuf),

    #[error("{role} exited with status {code:?} in round {round}")]
    CollaboratorFailed {
        role: Role,
        round: u64,
        code: Option<i32>,
    },

    #[error("failed to spawn {role} program `{program}`: {source}")]
    Spawn {
        role: Role,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("round limit of {limit} reached with work remaining")]
    RoundLimit { limit: u64 },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("invalid run configuration: {0}")]
    Config(String),

    /// 出错后再次调用 `step` 时返回。
    #[error("coordinator already halted by an earlier error")]
    Halted,
}

impl CoordError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoordError::Io {
            path: path.into(),
            source,
        }
    }
}

/// 单次外部调用的错误，尚未关联到具体角色。
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open redirect target {path}: {source}")]
    Redirect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
