use std::process::ExitStatus;

/// 外部程序的退出状态。
///
/// 进程被信号终止时 `code` 为 `None`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub code: Option<i32>,
}

impl ExitOutcome {
    pub const SUCCESS: ExitOutcome = ExitOutcome { code: Some(0) };

    pub fn code(code: i32) -> Self {
        ExitOutcome { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        ExitOutcome {
            code: status.code(),
        }
    }
}
