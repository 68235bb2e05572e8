//! Utilities: diagnostic file logging.
//!
//! Key items:
//!   init_logging / candidate_log_paths / open_log_file

/// Logging helpers.
///
/// All diagnostics go to an append-only file: stdout carries the MCP
/// protocol and must stay clean. Lines are formatted completely before a
/// single locked write, so concurrent callers never interleave within one
/// line.
pub mod logging {
    use std::fs::{File, OpenOptions};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use anyhow::{Context, Result, anyhow};
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, fmt};

    pub const LOG_FILE_NAME: &str = "mcp-tree.log";

    /// Where to try opening the log file, in order.
    ///
    /// An explicit path is the only candidate. Otherwise `/tmp`, then the
    /// home directory.
    pub fn candidate_log_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
        if let Some(path) = explicit {
            return vec![path.to_path_buf()];
        }
        let mut paths = vec![Path::new("/tmp").join(LOG_FILE_NAME)];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(LOG_FILE_NAME));
        }
        paths
    }

    /// Open the first candidate that can be created/appended.
    pub fn open_log_file(candidates: &[PathBuf]) -> Result<(PathBuf, File)> {
        let mut last_err = None;
        for path in candidates {
            match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => return Ok((path.clone(), file)),
                Err(e) => last_err = Some(anyhow!(e).context(format!("{}", path.display()))),
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("no log file candidates")))
            .context("Failed to open diagnostic log file")
    }

    /// Install the global subscriber writing to the log file.
    ///
    /// Level filter from `RUST_LOG`, default `info`. Returns the path in use.
    pub fn init_logging(explicit: Option<&Path>) -> Result<PathBuf> {
        let (path, file) = open_log_file(&candidate_log_paths(explicit))?;

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file));

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .try_init()
            .context("Failed to install log subscriber")?;

        Ok(path)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::io::Write;

        #[test]
        fn explicit_path_is_only_candidate() {
            let p = Path::new("/var/log/custom.log");
            assert_eq!(candidate_log_paths(Some(p)), vec![p.to_path_buf()]);
        }

        #[test]
        fn default_candidates_start_in_tmp() {
            let paths = candidate_log_paths(None);
            assert_eq!(paths[0], Path::new("/tmp").join(LOG_FILE_NAME));
        }

        #[test]
        fn open_log_file_falls_through_to_writable_candidate() {
            let dir = tempfile::tempdir().unwrap();
            let bad = dir.path().join("missing").join("x.log");
            let good = dir.path().join("ok.log");
            let (path, mut file) = open_log_file(&[bad, good.clone()]).unwrap();
            assert_eq!(path, good);
            writeln!(file, "first").unwrap();

            // Appends, never truncates.
            let (_, mut again) = open_log_file(&[good.clone()]).unwrap();
            writeln!(again, "second").unwrap();
            assert_eq!(std::fs::read_to_string(&good).unwrap(), "first\nsecond\n");
        }

        #[test]
        fn open_log_file_fails_when_nothing_is_writable() {
            let dir = tempfile::tempdir().unwrap();
            let bad = dir.path().join("missing").join("x.log");
            let err = open_log_file(&[bad]).unwrap_err();
            assert!(err.to_string().contains("Failed to open diagnostic log file"));
        }
    }
}

pub use logging::init_logging;
