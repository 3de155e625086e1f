//! 解耦仿真协调器
//!
//! 调度器仿真与网络仿真是两个独立的外部程序，通过共享文件交接状态。
//! 本 crate 负责严格交替地驱动二者，直到调度器快照为空。

pub mod coord;
pub mod error;
pub mod invoke;
pub mod store;

#[cfg(test)]
mod test;
