//! 协调器状态机
//!
//! 严格交替运行网络仿真器与调度器，直到快照文件为空。

use super::config::{FailurePolicy, RunConfig, path_arg};
use super::report::{FailureRecord, InvocationRecord, RunReport, Termination};
use super::state::{CoordState, Role};
use super::termination::{TerminationDetector, Verdict};
use crate::error::{CoordError, InvokeError};
use crate::invoke::{CommandTemplate, ExitOutcome, Invoker};
use crate::store::HandoffStore;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// 外部程序的路径参数，构造时已校验为 UTF-8。
struct PathArgs {
    snapshot: String,
    network_output: String,
    scheduler_config: String,
}

/// 协调器：每轮先运行网络仿真器，再运行调度器。
///
/// 同一时刻只运行一个外部程序，且协调器阻塞等待其退出，
/// 因此每个交接文件任一时刻只有一个写者。
pub struct Coordinator<I: Invoker, S: HandoffStore> {
    config: RunConfig,
    paths: PathArgs,
    network: CommandTemplate,
    scheduler: CommandTemplate,
    bootstrap: CommandTemplate,
    detector: TerminationDetector,
    invoker: I,
    store: S,
    state: CoordState,
    rounds: u64,
    termination: Option<Termination>,
    failure: Option<FailureRecord>,
    invocations: Vec<InvocationRecord>,
}

impl<I: Invoker, S: HandoffStore> Coordinator<I, S> {
    pub fn new(config: RunConfig, invoker: I, store: S) -> Result<Self, CoordError> {
        config.validate()?;
        let paths = PathArgs {
            snapshot: path_arg("snapshot", &config.snapshot)?.to_string(),
            network_output: path_arg("network_output", &config.network_output)?.to_string(),
            scheduler_config: path_arg("scheduler_config", &config.scheduler_config)?
                .to_string(),
        };
        let network = CommandTemplate::parse(&config.templates.network)?;
        let scheduler = CommandTemplate::parse(&config.templates.scheduler)?;
        let bootstrap = CommandTemplate::parse(&config.templates.bootstrap)?;
        let detector = TerminationDetector::new(&config.snapshot, config.missing_snapshot);
        Ok(Self {
            config,
            paths,
            network,
            scheduler,
            bootstrap,
            detector,
            invoker,
            store,
            state: CoordState::Init,
            rounds: 0,
            termination: None,
            failure: None,
            invocations: Vec::new(),
        })
    }

    /// 当前状态
    pub fn state(&self) -> CoordState {
        self.state
    }

    /// 已开始的轮数（含失败的那一轮）
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn invocations(&self) -> &[InvocationRecord] {
        &self.invocations
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// 执行一次状态转换并返回新状态。
    ///
    /// 出错后协调器即停止：状态保持在出错时的位置，
    /// 之后的每次调用都返回 [`CoordError::Halted`]，不再运行任何外部程序。
    pub fn step(&mut self) -> Result<CoordState, CoordError> {
        if self.failure.is_some() {
            return Err(CoordError::Halted);
        }
        match self.transition() {
            Ok(to) => {
                debug!(from = %self.state, %to, "状态转换");
                self.state = to;
                Ok(to)
            }
            Err(err) => {
                error!(state = %self.state, %err, "协调器停止");
                self.failure = Some(FailureRecord::from_error(&err, self.rounds));
                self.termination = Some(Termination::Halted);
                Err(err)
            }
        }
    }

    fn transition(&mut self) -> Result<CoordState, CoordError> {
        let to = match self.state {
            CoordState::Init => {
                self.init()?;
                // 第一轮之前先检查一次快照。
                CoordState::CheckTermination
            }
            CoordState::CheckTermination => match self.detector.check(&self.store)? {
                Verdict::Continue(bytes) => {
                    if let Some(limit) = self.config.max_rounds {
                        if self.rounds >= limit {
                            return Err(CoordError::RoundLimit { limit });
                        }
                    }
                    debug!(snapshot_bytes = bytes, "快照非空，继续下一轮");
                    CoordState::RunNetworkSim
                }
                Verdict::Stop(termination) => {
                    self.termination = Some(termination);
                    CoordState::Done
                }
            },
            CoordState::RunNetworkSim => {
                self.rounds += 1;
                info!(round = self.rounds, "开始新一轮");
                self.invoke_role(Role::NetworkSim)?;
                CoordState::RunScheduler
            }
            CoordState::RunScheduler => {
                self.invoke_role(Role::Scheduler)?;
                CoordState::CheckTermination
            }
            CoordState::Done => CoordState::Done,
        };
        Ok(to)
    }

    /// 运行直到 `DONE` 或出错。出错时 [`Coordinator::report`] 仍可取得部分报告。
    #[tracing::instrument(skip(self), fields(snapshot = %self.config.snapshot.display()))]
    pub fn run(&mut self) -> Result<RunReport, CoordError> {
        info!("▶️  开始协调运行");
        while self.step()? != CoordState::Done {}
        let report = self.report();
        info!(
            rounds = report.rounds,
            termination = ?report.termination,
            invocations = report.invocations.len(),
            "✅ 协调运行完成"
        );
        Ok(report)
    }

    /// 当前为止的运行报告，包括出错停止的情形。
    pub fn report(&self) -> RunReport {
        RunReport {
            rounds: self.rounds,
            termination: self.termination,
            failure: self.failure.clone(),
            invocations: self.invocations.clone(),
        }
    }

    fn init(&mut self) -> Result<(), CoordError> {
        for path in &self.config.reset_files {
            self.store
                .truncate(path)
                .map_err(|e| CoordError::io(path, e))?;
        }
        debug!(files = self.config.reset_files.len(), "状态文件已重置");
        if self.config.bootstrap.is_some() {
            self.invoke_role(Role::Bootstrap)?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(round = self.rounds))]
    fn invoke_role(&mut self, role: Role) -> Result<(), CoordError> {
        let cfg = &self.config;
        let p = &self.paths;
        let (template, args): (&CommandTemplate, Vec<&str>) = match role {
            Role::NetworkSim => (
                &self.network,
                vec![
                    cfg.network_program.as_str(),
                    p.snapshot.as_str(),
                    p.network_output.as_str(),
                ],
            ),
            Role::Scheduler => (
                &self.scheduler,
                vec![
                    cfg.scheduler_program.as_str(),
                    p.snapshot.as_str(),
                    p.network_output.as_str(),
                    p.scheduler_config.as_str(),
                ],
            ),
            Role::Bootstrap => (
                &self.bootstrap,
                vec![
                    cfg.bootstrap.as_deref().unwrap_or_default(),
                    p.scheduler_config.as_str(),
                ],
            ),
        };
        let cmd = template.expand(&args)?;
        let command = cmd.to_string();
        let round = if role == Role::Bootstrap { 0 } else { self.rounds };

        let started = Instant::now();
        let result = self.invoker.run(&cmd);
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (outcome, err) = match result {
            Ok(outcome) if outcome.success() => (Some(outcome), None),
            Ok(outcome) => (
                Some(outcome),
                Some(CoordError::CollaboratorFailed {
                    role,
                    round,
                    code: outcome.code,
                }),
            ),
            Err(InvokeError::Template(e)) => return Err(e.into()),
            Err(InvokeError::Spawn { program, source }) => (
                None,
                Some(CoordError::Spawn {
                    role,
                    program,
                    source,
                }),
            ),
            Err(InvokeError::Redirect { path, source }) => {
                (None, Some(CoordError::Io { path, source }))
            }
        };

        self.invocations.push(InvocationRecord {
            role,
            round,
            command,
            spawned: outcome.is_some(),
            code: outcome.and_then(|o: ExitOutcome| o.code),
            elapsed_ms,
        });

        match (err, self.config.on_failure) {
            (None, _) => Ok(()),
            (Some(err), FailurePolicy::Halt) => Err(err),
            (Some(err), FailurePolicy::Proceed) => {
                warn!(%role, round, %err, "外部程序失败，按策略继续");
                Ok(())
            }
        }
    }
}
