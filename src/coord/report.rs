use super::Role;
use crate::error::CoordError;
use serde::{Deserialize, Serialize};

/// 循环停止的原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    SnapshotEmpty,
    SnapshotMissing,
    /// 出错停止，详情见 [`RunReport::failure`]。
    Halted,
}

/// 一次外部程序运行记录，按执行顺序排列。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub role: Role,
    /// 引导运行为 0，其余为从 1 开始的轮次。
    pub round: u64,
    pub command: String,
    /// 程序根本未能启动时为 false。
    pub spawned: bool,
    pub code: Option<i32>,
    pub elapsed_ms: u64,
}

/// 使运行停止的错误。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// 失败的外部程序；非外部程序错误（轮次上限、配置等）时为 `None`。
    pub role: Option<Role>,
    pub round: u64,
    pub code: Option<i32>,
    pub message: String,
}

impl FailureRecord {
    pub(crate) fn from_error(err: &CoordError, rounds: u64) -> Self {
        let (role, round, code) = match err {
            CoordError::CollaboratorFailed { role, round, code } => (Some(*role), *round, *code),
            CoordError::Spawn { role, .. } => (Some(*role), rounds, None),
            _ => (None, rounds, None),
        };
        FailureRecord {
            role,
            round,
            code,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub rounds: u64,
    /// 运行尚未结束时为 `None`。
    pub termination: Option<Termination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureRecord>,
    pub invocations: Vec<InvocationRecord>,
}

impl RunReport {
    pub fn invocations_of(&self, role: Role) -> impl Iterator<Item = &InvocationRecord> {
        self.invocations.iter().filter(move |r| r.role == role)
    }
}
