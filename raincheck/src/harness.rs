//! Launching the benchmark harness and capturing its output.
use crate::error::HarnessError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, warn};

pub const DEFAULT_JAVA: &str = "java";
pub const DEFAULT_CLASSPATH: &str = ".:rain.jar:workloads/httptest.jar";
pub const RAIN_MAIN_CLASS: &str = "radlab.rain.Benchmark";
const DEFAULT_JVM_ARGS: &[&str] = &["-Xmx1g"];

/// How to launch the harness.
///
/// The path of the run configuration is appended as the last argument.
#[derive(Clone, Debug)]
pub struct Harness {
    program: PathBuf,
    args: Vec<OsString>,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::rain(DEFAULT_JAVA, DEFAULT_CLASSPATH)
    }
}

impl Harness {
    /// Launch Rain through `java` with the given classpath.
    pub fn rain(java: impl Into<PathBuf>, classpath: &str) -> Self {
        let mut args: Vec<OsString> = DEFAULT_JVM_ARGS.iter().map(OsString::from).collect();
        args.extend(["-cp", classpath, RAIN_MAIN_CLASS].map(OsString::from));
        Self::command(java, args)
    }

    /// Launch an arbitrary program with leading `args`.
    pub fn command<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: None,
            timeout: None,
        }
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Kill the harness if it has not finished after `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Run the harness on `config_path` and return its stdout followed by its stderr.
    ///
    /// The output is returned regardless of the exit status; a failing status is only logged.
    #[instrument(name = "harness", skip_all, fields(program = %self.program.display()))]
    pub async fn run(&self, config_path: &Path) -> Result<String, HarnessError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(config_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        info!("Launching harness with {}", config_path.display());
        debug!("Harness command: {command:?}");

        let start = Instant::now();
        let child = command.spawn().map_err(|source| HarnessError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| {
                    error!("Harness timed out, killing it");
                    HarnessError::Timeout(timeout)
                })??,
            None => child.wait_with_output().await?,
        };

        let elapsed = Duration::from_millis(start.elapsed().as_millis() as u64);
        if output.status.success() {
            info!("Harness finished in {}", humantime::format_duration(elapsed));
        } else {
            warn!(
                "Harness exited with {} after {}",
                output.status,
                humantime::format_duration(elapsed)
            );
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        debug!("Captured {} bytes of harness output", text.len());
        Ok(text)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use ntest::timeout;

    #[test]
    fn rain_command_line() {
        let harness = Harness::default();
        assert_eq!(harness.program(), Path::new("java"));
        assert_eq!(
            harness.args(),
            ["-Xmx1g", "-cp", ".:rain.jar:workloads/httptest.jar", "radlab.rain.Benchmark"]
                .map(OsString::from)
        );
    }

    #[tokio::test]
    #[timeout(10000)]
    async fn captures_stdout_then_stderr() {
        let harness = Harness::command("sh", ["-c", "echo out; echo err >&2; echo \"$0\""]);
        let output = harness.run(Path::new("config.json")).await.unwrap();
        assert_eq!(output, "out\nconfig.json\nerr\n");
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn failing_status_keeps_output() {
        let harness = Harness::command("sh", ["-c", "echo partial; exit 3"]);
        let output = harness.run(Path::new("config.json")).await.unwrap();
        assert_eq!(output, "partial\n");
        assert!(logs_contain("Harness exited with"));
    }

    #[tokio::test]
    #[timeout(10000)]
    async fn missing_program() {
        let harness = Harness::command("/nonexistent/raincheck-harness", Vec::<String>::new());
        let err = harness.run(Path::new("config.json")).await.unwrap_err();
        assert!(matches!(err, HarnessError::Spawn { .. }));
    }

    #[tokio::test]
    #[timeout(10000)]
    async fn times_out() {
        let harness =
            Harness::command("sh", ["-c", "sleep 30"]).timeout(Duration::from_millis(200));
        let err = harness.run(Path::new("config.json")).await.unwrap_err();
        assert!(matches!(err, HarnessError::Timeout(_)));
    }
}
