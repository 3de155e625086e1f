//! 协调核心模块
//!
//! 调度器与网络仿真器的轮流执行：运行配置、终止判定与状态机。

mod config;
mod coordinator;
mod report;
mod state;
mod termination;

pub use config::{
    DEFAULT_BOOTSTRAP_PROGRAM, DEFAULT_RESET_FILES, FailurePolicy, RunConfig, Templates,
};
pub use coordinator::Coordinator;
pub use report::{FailureRecord, InvocationRecord, RunReport, Termination};
pub use state::{CoordState, Role};
pub use termination::{TerminationDetector, Verdict};
