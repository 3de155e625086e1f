use super::{CommandLine, ExitOutcome, Invoker};
use crate::error::InvokeError;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// 逐个启动真实子进程并等待其退出。
#[derive(Debug, Clone, Default)]
pub struct ProcessInvoker {
    workdir: Option<PathBuf>,
}

impl ProcessInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 子进程在 `dir` 中运行，相对程序路径与重定向目标按它解析。
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: Some(dir.into()),
        }
    }

    fn resolve_program(&self, program: &str) -> PathBuf {
        let path = Path::new(program);
        match &self.workdir {
            // 裸程序名走 PATH 查找
            Some(dir) if path.is_relative() && program.contains('/') => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn resolve_file(&self, path: &Path) -> PathBuf {
        match &self.workdir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Invoker for ProcessInvoker {
    #[tracing::instrument(skip(self, cmd), fields(program = %cmd.program))]
    fn run(&mut self, cmd: &CommandLine) -> Result<ExitOutcome, InvokeError> {
        debug!(command = %cmd, "启动外部程序");

        let mut child = Command::new(self.resolve_program(&cmd.program));
        child.args(&cmd.args);
        if let Some(dir) = &self.workdir {
            child.current_dir(dir);
        }
        if let Some(target) = &cmd.stdout {
            let path = self.resolve_file(target);
            let file = File::create(&path).map_err(|source| InvokeError::Redirect {
                path: path.clone(),
                source,
            })?;
            child.stdout(Stdio::from(file));
        }

        let status = child.status().map_err(|source| InvokeError::Spawn {
            program: cmd.program.clone(),
            source,
        })?;
        let outcome = ExitOutcome::from(status);
        debug!(code = ?outcome.code, "外部程序退出");
        Ok(outcome)
    }
}
