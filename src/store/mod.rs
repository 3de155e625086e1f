//! 快照存储模块
//!
//! 共享文件系统上的交接文件：存在性/大小探测与重置。

mod fs_store;
mod policy;

pub use fs_store::FsHandoffStore;
pub use policy::{MissingSnapshotPolicy, SnapshotProbe};

use std::io;
use std::path::Path;

/// 两个交接文件的传输层。
///
/// 从不读取内容，协调器只关心字节数。
pub trait HandoffStore {
    /// 字节数；路径不存在或无法 stat 时为 `None`。
    fn size(&self, path: &Path) -> Option<u64>;

    /// 将 `path` 截断（或创建）为空文件。
    fn truncate(&self, path: &Path) -> io::Result<()>;

    fn probe(&self, path: &Path) -> SnapshotProbe {
        match self.size(path) {
            None => SnapshotProbe::Missing,
            Some(0) => SnapshotProbe::Empty,
            Some(bytes) => SnapshotProbe::NonEmpty(bytes),
        }
    }

    /// 失败即关闭：文件缺失视为“没有更多工作”。
    fn is_non_empty(&self, path: &Path) -> bool {
        matches!(self.probe(path), SnapshotProbe::NonEmpty(_))
    }
}
