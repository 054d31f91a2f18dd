use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

pub const DEFAULT_ENCODER: &str = "ffmpeg";
pub const DEFAULT_REAP_TIMEOUT: Duration = Duration::from_secs(5);
const OUTPUT_CONTAINER_ARGS: [&str; 2] = ["-f", "flv"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorOptions {
    /// Program name resolved through `PATH`, or an explicit path.
    pub encoder: String,
    /// Start the encoder in its own process group so it outlives us.
    pub detach: bool,
    pub reap_timeout: Duration,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            encoder: DEFAULT_ENCODER.to_owned(),
            detach: true,
            reap_timeout: DEFAULT_REAP_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to reap stream process {pid}")]
    Reap {
        pid: u32,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
pub struct ActiveStream {
    child: Child,
    pub pid: u32,
    pub url: String,
    pub started_at: Instant,
}

/// Owns at most one running encoder process.
#[derive(Debug)]
pub struct Supervisor {
    options: SupervisorOptions,
    active: Option<ActiveStream>,
}

/// Preset tokens, then the fixed container flags, then the destination.
#[must_use]
pub fn build_args(preset: &str, url: &str) -> Vec<String> {
    preset
        .split_whitespace()
        .chain(OUTPUT_CONTAINER_ARGS)
        .chain(std::iter::once(url))
        .map(str::to_owned)
        .collect()
}

impl Supervisor {
    #[must_use]
    pub fn new(options: SupervisorOptions) -> Self {
        Self {
            options,
            active: None,
        }
    }

    pub fn options(&self) -> &SupervisorOptions {
        &self.options
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveStream> {
        self.active.as_ref()
    }

    /// Kills and reaps any running encoder, then spawns a new one.
    ///
    /// A failed reap of the old process is logged and does not block the new
    /// spawn. On spawn failure the supervisor is left idle.
    pub async fn start(&mut self, url: &str, preset: &str) -> Result<u32, SupervisorError> {
        if let Some(previous) = self.active.as_ref().map(|active| active.pid) {
            debug!(pid = previous, "replacing running stream");
        }
        if let Err(err) = self.stop().await {
            warn!(error = %err, "previous stream was not reaped cleanly");
        }

        let args = build_args(preset, url);
        let mut command = Command::new(&self.options.encoder);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if self.options.detach {
            #[cfg(unix)]
            command.process_group(0);
        } else {
            command.kill_on_drop(true);
        }

        let child = command.spawn().map_err(|source| SupervisorError::Spawn {
            program: self.options.encoder.clone(),
            source,
        })?;
        let pid = child.id().unwrap_or_default();
        info!(
            pid,
            encoder = %self.options.encoder,
            url,
            detached = self.options.detach,
            "stream started"
        );

        self.active = Some(ActiveStream {
            child,
            pid,
            url: url.to_owned(),
            started_at: Instant::now(),
        });
        Ok(pid)
    }

    /// Force-kills the running encoder and waits for it to exit.
    ///
    /// Returns the pid that was stopped, or `None` when idle. The supervisor is
    /// idle afterwards even when the wait fails or times out.
    pub async fn stop(&mut self) -> Result<Option<u32>, SupervisorError> {
        let Some(mut active) = self.active.take() else {
            return Ok(None);
        };
        let pid = active.pid;

        if let Err(err) = active.child.start_kill() {
            // Already exited; the wait below still collects its status.
            debug!(pid, error = %err, "kill signal not delivered");
        }

        match tokio::time::timeout(self.options.reap_timeout, active.child.wait()).await {
            Ok(Ok(status)) => {
                info!(pid, %status, "stream stopped");
                Ok(Some(pid))
            }
            Ok(Err(source)) => Err(SupervisorError::Reap { pid, source }),
            Err(_) => Err(SupervisorError::Reap {
                pid,
                source: io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!(
                        "still running {}ms after kill",
                        self.options.reap_timeout.as_millis()
                    ),
                ),
            }),
        }
    }

    /// Non-blocking check for an encoder that exited on its own.
    pub fn poll_exit(&mut self) -> Option<(u32, ExitStatus)> {
        let active = self.active.as_mut()?;
        match active.child.try_wait() {
            Ok(Some(status)) => {
                let pid = active.pid;
                self.active = None;
                info!(pid, %status, "stream exited");
                Some((pid, status))
            }
            Ok(None) => None,
            Err(err) => {
                warn!(pid = active.pid, error = %err, "failed polling stream process");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Stands in for an encoder that keeps streaming until killed.
    #[cfg(unix)]
    const SLEEPER_PRESET: &str = "-c exec${IFS}sleep${IFS}30";

    #[cfg(unix)]
    fn sleeper(detach: bool) -> Supervisor {
        Supervisor::new(SupervisorOptions {
            encoder: "sh".to_owned(),
            detach,
            reap_timeout: Duration::from_secs(5),
        })
    }

    #[cfg(target_os = "linux")]
    fn proc_alive(pid: u32) -> bool {
        std::path::Path::new(&format!("/proc/{pid}")).exists()
    }

    #[cfg(target_os = "linux")]
    fn process_group_of(pid: u32) -> Option<u32> {
        let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
        let after_comm = stat.rsplit_once(')')?.1;
        after_comm.split_whitespace().nth(2)?.parse().ok()
    }

    #[test]
    fn args_are_preset_tokens_then_container_then_url() {
        let args = build_args("  -re -i  input.mp4\t-c:v copy ", "rtmp://x/live/1");
        assert_eq!(
            args,
            ["-re", "-i", "input.mp4", "-c:v", "copy", "-f", "flv", "rtmp://x/live/1"]
        );
    }

    #[test]
    fn empty_preset_still_targets_url() {
        assert_eq!(build_args("", "rtmp://x"), ["-f", "flv", "rtmp://x"]);
    }

    #[tokio::test]
    async fn spawn_failure_leaves_supervisor_idle() {
        let mut supervisor = Supervisor::new(SupervisorOptions {
            encoder: "/nonexistent/quickstream-encoder".to_owned(),
            ..SupervisorOptions::default()
        });

        let err = supervisor.start("rtmp://x", "-i in").await.unwrap_err();
        assert!(matches!(err, SupervisorError::Spawn { .. }));
        assert!(!supervisor.is_running());
    }

    #[tokio::test]
    async fn stop_when_idle_is_noop() {
        let mut supervisor = Supervisor::new(SupervisorOptions::default());
        assert_eq!(supervisor.stop().await.unwrap(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn start_then_stop_kills_and_reaps() {
        let mut supervisor = sleeper(true);
        let pid = supervisor.start("rtmp://x/live/1", SLEEPER_PRESET).await.unwrap();
        assert!(supervisor.is_running());
        assert_eq!(supervisor.active().map(|active| active.pid), Some(pid));

        assert_eq!(supervisor.stop().await.unwrap(), Some(pid));
        assert!(!supervisor.is_running());
        #[cfg(target_os = "linux")]
        assert!(!proc_alive(pid));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn start_replaces_running_stream() {
        let mut supervisor = sleeper(true);
        let first = supervisor.start("rtmp://x/live/1", SLEEPER_PRESET).await.unwrap();
        let second = supervisor.start("rtmp://x/live/2", SLEEPER_PRESET).await.unwrap();

        assert_ne!(first, second);
        #[cfg(target_os = "linux")]
        assert!(!proc_alive(first));
        let active = supervisor.active().unwrap();
        assert_eq!(active.pid, second);
        assert_eq!(active.url, "rtmp://x/live/2");

        supervisor.stop().await.unwrap();
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn detached_stream_leads_its_own_process_group() {
        let mut supervisor = sleeper(true);
        let pid = supervisor.start("rtmp://x", SLEEPER_PRESET).await.unwrap();
        assert_eq!(process_group_of(pid), Some(pid));
        supervisor.stop().await.unwrap();
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn attached_stream_shares_our_process_group() {
        let mut supervisor = sleeper(false);
        let pid = supervisor.start("rtmp://x", SLEEPER_PRESET).await.unwrap();
        assert_eq!(
            process_group_of(pid),
            process_group_of(std::process::id())
        );
        supervisor.stop().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn poll_exit_reports_self_terminated_stream() {
        let mut supervisor = Supervisor::new(SupervisorOptions {
            encoder: "true".to_owned(),
            ..SupervisorOptions::default()
        });
        let pid = supervisor.start("rtmp://x", "").await.unwrap();

        let mut exited = None;
        for _ in 0..200 {
            exited = supervisor.poll_exit();
            if exited.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let (exited_pid, status) = exited.expect("encoder should exit on its own");
        assert_eq!(exited_pid, pid);
        assert!(status.success());
        assert!(!supervisor.is_running());
    }
}
