use crate::store::ConfigStore;
use crate::supervisor::{DEFAULT_ENCODER, SupervisorOptions};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "quickstream";
const LOG_FILE: &str = "quickstream.log";

#[derive(Debug, Parser)]
#[command(
    name = "quickstream",
    version,
    about = "Pick a saved URL and encoder preset, then stream in the background"
)]
pub struct Cli {
    /// Config file holding saved URLs and presets. Defaults to ~/.quickstream.json.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Encoder program launched for each stream.
    #[arg(long, default_value = DEFAULT_ENCODER)]
    pub encoder: String,

    /// Keep the encoder in our process group and kill it when quickstream exits.
    #[arg(long, default_value_t = false)]
    pub attach: bool,

    /// How long to wait for a killed encoder to exit, in milliseconds.
    #[arg(long, default_value_t = 5_000)]
    pub reap_timeout_ms: u64,

    /// Log file. Defaults to quickstream.log in the local data directory.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(ConfigStore::default_path)
    }

    #[must_use]
    pub fn supervisor_options(&self) -> SupervisorOptions {
        SupervisorOptions {
            encoder: self.encoder.clone(),
            detach: !self.attach,
            reap_timeout: Duration::from_millis(self.reap_timeout_ms),
        }
    }

    /// `None` when no data directory is known; logs are then discarded.
    #[must_use]
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file.clone().or_else(|| {
            dirs::data_local_dir()
                .or_else(dirs::home_dir)
                .map(|root| root.join(APP_DIR).join(LOG_FILE))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_detach_ffmpeg() {
        let cli = Cli::try_parse_from(["quickstream"]).unwrap();
        assert_eq!(cli.supervisor_options(), SupervisorOptions::default());
        assert_eq!(cli.config_path(), ConfigStore::default_path());
    }

    #[test]
    fn flags_map_onto_options() {
        let cli = Cli::try_parse_from([
            "quickstream",
            "--config",
            "/tmp/qs.json",
            "--encoder",
            "/opt/ffmpeg/bin/ffmpeg",
            "--attach",
            "--reap-timeout-ms",
            "250",
            "--log-file",
            "/tmp/qs.log",
        ])
        .unwrap();

        assert_eq!(cli.config_path(), PathBuf::from("/tmp/qs.json"));
        assert_eq!(cli.log_path(), Some(PathBuf::from("/tmp/qs.log")));
        let options = cli.supervisor_options();
        assert_eq!(options.encoder, "/opt/ffmpeg/bin/ffmpeg");
        assert!(!options.detach);
        assert_eq!(options.reap_timeout, Duration::from_millis(250));
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["quickstream", "--pool-size", "4"]).is_err());
    }
}
