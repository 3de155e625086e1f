use super::HandoffStore;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// 本地文件系统上的交接文件，相对路径按基准目录解析。
#[derive(Debug, Clone, Default)]
pub struct FsHandoffStore {
    base: Option<PathBuf>,
}

impl FsHandoffStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 相对路径按 `base` 而非进程当前目录解析。
    pub fn rooted_at(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl HandoffStore for FsHandoffStore {
    fn size(&self, path: &Path) -> Option<u64> {
        let full = self.resolve(path);
        match fs::metadata(&full) {
            Ok(meta) => {
                trace!(path = %full.display(), bytes = meta.len(), "文件大小");
                Some(meta.len())
            }
            Err(err) => {
                debug!(path = %full.display(), %err, "stat 失败");
                None
            }
        }
    }

    fn truncate(&self, path: &Path) -> io::Result<()> {
        let full = self.resolve(path);
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&full)?;
        debug!(path = %full.display(), "已清空");
        Ok(())
    }
}
