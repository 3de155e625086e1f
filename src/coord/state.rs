use serde::{Deserialize, Serialize};
use std::fmt;

/// 协调器控制状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordState {
    Init,
    RunNetworkSim,
    RunScheduler,
    CheckTermination,
    Done,
}

impl fmt::Display for CoordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CoordState::Init => "INIT",
            CoordState::RunNetworkSim => "RUN_NETWORK_SIM",
            CoordState::RunScheduler => "RUN_SCHEDULER",
            CoordState::CheckTermination => "CHECK_TERMINATION",
            CoordState::Done => "DONE",
        };
        f.write_str(s)
    }
}

/// 一次调用运行的是哪个外部程序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// 生成第一个快照的一次性调度器运行。
    Bootstrap,
    NetworkSim,
    Scheduler,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Bootstrap => "bootstrap scheduler",
            Role::NetworkSim => "network simulator",
            Role::Scheduler => "scheduler",
        };
        f.write_str(s)
    }
}
