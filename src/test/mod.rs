
use crate::error::InvokeError;
use crate::invoke::{CommandLine, ExitOutcome, Invoker};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "decoupled-sim-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

pub(crate) fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

type Handler = Box<dyn FnMut(&CommandLine) -> Result<ExitOutcome, InvokeError>>;

/// Records every command and lets the test script what the "process" does.
pub(crate) struct FakeInvoker {
    pub calls: Vec<CommandLine>,
    handler: Handler,
}

impl FakeInvoker {
    pub fn new(
        handler: impl FnMut(&CommandLine) -> Result<ExitOutcome, InvokeError> + 'static,
    ) -> Self {
        Self {
            calls: Vec::new(),
            handler: Box::new(handler),
        }
    }

    /// Always succeeds without touching any file.
    pub fn noop() -> Self {
        Self::new(|_| Ok(ExitOutcome::SUCCESS))
    }

    pub fn programs(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.program.as_str()).collect()
    }
}

impl Invoker for FakeInvoker {
    fn run(&mut self, cmd: &CommandLine) -> Result<ExitOutcome, InvokeError> {
        self.calls.push(cmd.clone());
        (self.handler)(cmd)
    }
}

/// Collaborators for a run that needs `rounds` scheduler passes to drain.
///
/// The bootstrap writes the first snapshot, the network step writes its
/// output through the redirect, and each scheduler pass rewrites the snapshot,
/// leaving it empty on the last one.
pub(crate) fn countdown_invoker(dir: &Path, rounds: usize) -> FakeInvoker {
    let dir = dir.to_path_buf();
    let mut remaining = rounds;
    FakeInvoker::new(move |cmd| {
        match cmd.program.as_str() {
            "sst" => {
                fs::write(dir.join("snap.xml"), format!("<jobs left=\"{remaining}\"/>"))
                    .expect("write snapshot");
            }
            "./net" => {
                let out = cmd.stdout.as_ref().expect("network step redirects stdout");
                fs::write(dir.join(out), "ember done\n").expect("write ember output");
            }
            "./sched" => {
                remaining = remaining.saturating_sub(1);
                let body = if remaining == 0 {
                    String::new()
                } else {
                    format!("<jobs left=\"{remaining}\"/>")
                };
                fs::write(dir.join("snap.xml"), body).expect("write snapshot");
            }
            other => panic!("unexpected program {other}"),
        }
        Ok(ExitOutcome::SUCCESS)
    })
}
