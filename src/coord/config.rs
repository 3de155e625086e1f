use crate::error::CoordError;
use crate::invoke::CommandTemplate;
use crate::store::MissingSnapshotPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BOOTSTRAP_PROGRAM: &str = "sst";
pub const DEFAULT_RESET_FILES: [&str; 2] = ["emberRunning.txt", "emberCompleted.txt"];

/// 外部程序非零退出或无法启动时的处理策略。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// 停止循环并报告失败的外部程序。
    #[default]
    Halt,
    /// 记录警告后照常进入下一状态。
    Proceed,
}

/// 三类调用的命令模板。
///
/// 位置参数：
/// - `network`：`{0}` 网络程序，`{1}` 快照，`{2}` 网络输出
/// - `scheduler`：`{0}` 调度程序，`{1}` 快照，`{2}` 网络输出，`{3}` 调度器参数
/// - `bootstrap`：`{0}` 引导程序，`{1}` 调度器参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Templates {
    pub network: String,
    pub scheduler: String,
    pub bootstrap: String,
}

impl Templates {
    pub const NETWORK_ARGS: usize = 3;
    pub const SCHEDULER_ARGS: usize = 4;
    pub const BOOTSTRAP_ARGS: usize = 2;
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            network: "./{0} --xml {1} > {2}".to_string(),
            scheduler: "./{0} --xml {1} --emberOut {2} --schedPy {3}".to_string(),
            bootstrap: "{0} ./{1}".to_string(),
        }
    }
}

/// 一次协调运行的路径与程序名。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// 调度器快照文件（`--xml`）
    pub snapshot: PathBuf,
    /// 网络仿真器输出文件（`--emberOut`）
    pub network_output: PathBuf,
    /// 调度器参数文件（`--schedPy`）
    pub scheduler_config: PathBuf,
    /// 解析快照并运行网络仿真器的程序（`--sched_parser`）
    pub network_program: String,
    /// 解析网络输出并运行调度器的程序（`--ember_parser`）
    pub scheduler_program: String,

    #[serde(default)]
    pub workdir: Option<PathBuf>,
    /// `None` 表示跳过引导运行，快照须已存在。
    #[serde(default = "default_bootstrap")]
    pub bootstrap: Option<String>,
    #[serde(default = "default_reset_files")]
    pub reset_files: Vec<PathBuf>,
    /// `None` 表示不限轮数。
    #[serde(default)]
    pub max_rounds: Option<u64>,
    #[serde(default)]
    pub on_failure: FailurePolicy,
    #[serde(default)]
    pub missing_snapshot: MissingSnapshotPolicy,
    #[serde(default)]
    pub templates: Templates,
}

fn default_bootstrap() -> Option<String> {
    Some(DEFAULT_BOOTSTRAP_PROGRAM.to_string())
}

fn default_reset_files() -> Vec<PathBuf> {
    DEFAULT_RESET_FILES.into_iter().map(PathBuf::from).collect()
}

impl RunConfig {
    pub fn new(
        snapshot: impl Into<PathBuf>,
        network_output: impl Into<PathBuf>,
        scheduler_config: impl Into<PathBuf>,
        network_program: impl Into<String>,
        scheduler_program: impl Into<String>,
    ) -> Self {
        Self {
            snapshot: snapshot.into(),
            network_output: network_output.into(),
            scheduler_config: scheduler_config.into(),
            network_program: network_program.into(),
            scheduler_program: scheduler_program.into(),
            workdir: None,
            bootstrap: default_bootstrap(),
            reset_files: default_reset_files(),
            max_rounds: None,
            on_failure: FailurePolicy::default(),
            missing_snapshot: MissingSnapshotPolicy::default(),
            templates: Templates::default(),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CoordError> {
        let raw = fs::read_to_string(path).map_err(|e| CoordError::io(path, e))?;
        serde_json::from_str(&raw)
            .map_err(|e| CoordError::Config(format!("{}: {e}", path.display())))
    }

    /// 校验必填字段、路径编码，以及各模板能否解析且参数个数足够。
    pub fn validate(&self) -> Result<(), CoordError> {
        let required = [
            ("snapshot", self.snapshot.as_os_str().is_empty()),
            ("network_output", self.network_output.as_os_str().is_empty()),
            ("scheduler_config", self.scheduler_config.as_os_str().is_empty()),
            ("network_program", self.network_program.trim().is_empty()),
            ("scheduler_program", self.scheduler_program.trim().is_empty()),
        ];
        if let Some((name, _)) = required.iter().find(|(_, missing)| *missing) {
            return Err(CoordError::Config(format!("`{name}` must be set")));
        }
        if matches!(&self.bootstrap, Some(p) if p.trim().is_empty()) {
            return Err(CoordError::Config("`bootstrap` must not be blank".into()));
        }
        path_arg("snapshot", &self.snapshot)?;
        path_arg("network_output", &self.network_output)?;
        path_arg("scheduler_config", &self.scheduler_config)?;
        if self.snapshot == self.network_output {
            return Err(CoordError::Config(
                "snapshot and network output must be different files".into(),
            ));
        }

        let checks = [
            ("network", &self.templates.network, Templates::NETWORK_ARGS),
            ("scheduler", &self.templates.scheduler, Templates::SCHEDULER_ARGS),
            ("bootstrap", &self.templates.bootstrap, Templates::BOOTSTRAP_ARGS),
        ];
        for (name, src, given) in checks {
            let tpl = CommandTemplate::parse(src)?;
            if tpl.arity() > given {
                return Err(CoordError::Config(format!(
                    "{name} template `{src}` uses {} arguments, only {given} available",
                    tpl.arity()
                )));
            }
        }
        Ok(())
    }
}

/// 交接文件路径会原样传给外部程序，必须是 UTF-8。
pub(crate) fn path_arg<'a>(name: &str, path: &'a Path) -> Result<&'a str, CoordError> {
    path.to_str().ok_or_else(|| {
        CoordError::Config(format!(
            "`{name}` path {} is not valid UTF-8",
            path.display()
        ))
    })
}
