use super::Termination;
use crate::error::CoordError;
use crate::store::{HandoffStore, MissingSnapshotPolicy, SnapshotProbe};
use std::path::PathBuf;
use tracing::warn;

/// 终止检查的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// 快照有这么多字节，需要再跑一轮。
    Continue(u64),
    Stop(Termination),
}

/// 仅根据快照文件判断是否还需要更多轮次。
///
/// 除路径与缺失策略外不持有任何状态。
#[derive(Debug, Clone)]
pub struct TerminationDetector {
    snapshot: PathBuf,
    missing: MissingSnapshotPolicy,
}

impl TerminationDetector {
    pub fn new(snapshot: impl Into<PathBuf>, missing: MissingSnapshotPolicy) -> Self {
        Self {
            snapshot: snapshot.into(),
            missing,
        }
    }

    /// 失败即关闭：文件不存在或为空都表示停止。
    pub fn should_continue<S: HandoffStore + ?Sized>(&self, store: &S) -> bool {
        store.is_non_empty(&self.snapshot)
    }

    pub fn check<S: HandoffStore + ?Sized>(&self, store: &S) -> Result<Verdict, CoordError> {
        match store.probe(&self.snapshot) {
            SnapshotProbe::NonEmpty(bytes) => Ok(Verdict::Continue(bytes)),
            SnapshotProbe::Empty => Ok(Verdict::Stop(Termination::SnapshotEmpty)),
            SnapshotProbe::Missing => {
                warn!(path = %self.snapshot.display(), "快照文件不存在");
                match self.missing {
                    MissingSnapshotPolicy::Complete => Ok(Verdict::Stop(Termination::SnapshotMissing)),
                    MissingSnapshotPolicy::Error => {
                        Err(CoordError::MissingSnapshot(self.snapshot.clone()))
                    }
                }
            }
        }
    }
}
