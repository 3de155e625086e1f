use serde::{Deserialize, Serialize};

/// 快照文件探测结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotProbe {
    Missing,
    Empty,
    NonEmpty(u64),
}

/// 快照文件不存在时的解释方式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSnapshotPolicy {
    /// 不存在即表示仿真已完成。
    #[default]
    Complete,
    /// 不存在视为配置错误，运行以错误结束。
    Error,
}
