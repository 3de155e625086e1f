//! 外部仿真器调用模块
//!
//! 位置参数模板展开，并以阻塞方式运行外部程序。

mod outcome;
mod process;
mod template;

pub use outcome::ExitOutcome;
pub use process::ProcessInvoker;
pub use template::{CommandLine, CommandTemplate};

use crate::error::InvokeError;

/// 运行一条外部命令直到其退出。
pub trait Invoker {
    /// 阻塞直到进程退出。除 `cmd` 自带的 stdout 重定向外不处理输出。
    fn run(&mut self, cmd: &CommandLine) -> Result<ExitOutcome, InvokeError>;

    /// 按位置用 `args` 展开 `template` 后运行。
    fn invoke(
        &mut self,
        template: &CommandTemplate,
        args: &[&str],
    ) -> Result<ExitOutcome, InvokeError> {
        let cmd = template.expand(args)?;
        self.run(&cmd)
    }
}
