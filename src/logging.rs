use crate::config::{Config, DebugLogRotation};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "perceive-debug.log";
const FILTER: &str = "perceive=debug,warn";

/// Keeps the background log writer alive; flushes on drop
pub struct LogGuard(#[allow(dead_code)] WorkerGuard);

/// Turn on file logging when `debug` is set.
///
/// Nothing ever goes to stdout/stderr: the TUI owns the terminal.
pub fn init(config: &Config) -> Result<Option<LogGuard>> {
    if !config.debug {
        return Ok(None);
    }

    let rotation = config.debug_log_rotation.unwrap_or(DebugLogRotation::Session);
    let target = LogTarget::resolve(config.debug_log_path.as_deref())?;
    std::fs::create_dir_all(&target.dir)
        .with_context(|| format!("Failed to create log directory: {}", target.dir.display()))?;

    if let Some(prefix) = target.rotated_prefix(rotation) {
        let keep = config.debug_log_keep.unwrap_or(default_keep(rotation));
        target.prune(&prefix, keep)?;
    }

    let (file_name, appender) = match rotation {
        DebugLogRotation::None => (
            target.base_name.clone(),
            rolling::never(&target.dir, &target.base_name),
        ),
        DebugLogRotation::Daily => (
            format!("{}.<date>", target.base_name),
            rolling::daily(&target.dir, &target.base_name),
        ),
        DebugLogRotation::Session => {
            let name = target.session_file_name();
            (name.clone(), rolling::never(&target.dir, name))
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_new(FILTER).unwrap_or_else(|_| EnvFilter::new("debug"));
    // Fails only when a subscriber is already set, as in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init();

    tracing::info!(
        log_file = %target.dir.join(file_name).display(),
        rotation = ?rotation,
        "debug logging enabled"
    );

    Ok(Some(LogGuard(guard)))
}

fn default_keep(rotation: DebugLogRotation) -> usize {
    match rotation {
        DebugLogRotation::Daily => 7,
        DebugLogRotation::None | DebugLogRotation::Session => 20,
    }
}

/// Where log files go: a directory plus the base file name
#[derive(Debug, PartialEq, Eq)]
struct LogTarget {
    dir: PathBuf,
    base_name: String,
}

impl LogTarget {
    /// From `debug_log_path`, or next to the config file when unset.
    /// A directory (existing, or written with a trailing separator) gets the default name.
    fn resolve(configured: Option<&str>) -> Result<Self> {
        let path = match configured {
            None => crate::config::config_path()?.with_file_name(LOG_FILE_NAME),
            Some(raw) => {
                let path = expand_home(raw);
                if raw.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
                    path.join(LOG_FILE_NAME)
                } else {
                    path
                }
            }
        };

        let base_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .context("Invalid debug_log_path: file name is not valid UTF-8")?
            .to_string();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self { dir, base_name })
    }

    fn session_file_name(&self) -> String {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        format!("{}.session-{stamp}", self.base_name)
    }

    /// File-name prefix shared by the rotated files of `rotation`
    fn rotated_prefix(&self, rotation: DebugLogRotation) -> Option<String> {
        match rotation {
            DebugLogRotation::None => None,
            DebugLogRotation::Daily => Some(format!("{}.", self.base_name)),
            DebugLogRotation::Session => Some(format!("{}.session-", self.base_name)),
        }
    }

    /// Delete all but the newest `keep` files starting with `prefix`; 0 keeps everything.
    /// Date and session stamps both sort lexicographically by time.
    fn prune(&self, prefix: &str, keep: usize) -> Result<()> {
        if keep == 0 {
            return Ok(());
        }

        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read log directory: {}", self.dir.display()))?;
        let mut rotated: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| file_name_starts_with(path, prefix))
            .collect();
        rotated.sort_unstable_by(|a, b| b.cmp(a));

        for stale in rotated.iter().skip(keep) {
            if let Err(e) = std::fs::remove_file(stale) {
                tracing::debug!(error = %e, file = %stale.display(), "could not remove old log file");
            }
        }
        Ok(())
    }
}

fn file_name_starts_with(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(prefix))
}

fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_prune_keeps_newest_sessions() {
        let dir = tempfile::TempDir::new().unwrap();
        for ts in ["20260101-000000", "20260102-000000", "20260103-000000"] {
            std::fs::write(dir.path().join(format!("{LOG_FILE_NAME}.session-{ts}")), "").unwrap();
        }
        std::fs::write(dir.path().join("unrelated.txt"), "").unwrap();

        let target = LogTarget {
            dir: dir.path().to_path_buf(),
            base_name: LOG_FILE_NAME.to_string(),
        };
        let prefix = target.rotated_prefix(DebugLogRotation::Session).unwrap();
        target.prune(&prefix, 2).unwrap();

        assert_eq!(
            names_in(dir.path()),
            vec![
                format!("{LOG_FILE_NAME}.session-20260102-000000"),
                format!("{LOG_FILE_NAME}.session-20260103-000000"),
                "unrelated.txt".to_string(),
            ]
        );
    }

    #[test]
    fn test_prune_zero_keeps_everything() {
        let dir = tempfile::TempDir::new().unwrap();
        for day in ["2026-01-01", "2026-01-02"] {
            std::fs::write(dir.path().join(format!("{LOG_FILE_NAME}.{day}")), "").unwrap();
        }
        let target = LogTarget {
            dir: dir.path().to_path_buf(),
            base_name: LOG_FILE_NAME.to_string(),
        };
        target.prune(&format!("{LOG_FILE_NAME}."), 0).unwrap();
        assert_eq!(names_in(dir.path()).len(), 2);
    }

    #[test]
    fn test_no_rotation_has_nothing_to_prune() {
        let target = LogTarget {
            dir: PathBuf::from("/tmp"),
            base_name: "x.log".to_string(),
        };
        assert!(target.rotated_prefix(DebugLogRotation::None).is_none());
    }

    #[test]
    fn test_resolve_directory_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let raw = dir.path().to_string_lossy().to_string();
        let target = LogTarget::resolve(Some(&raw)).unwrap();
        assert_eq!(target.dir, dir.path());
        assert_eq!(target.base_name, LOG_FILE_NAME);
    }

    #[test]
    fn test_resolve_file_path() {
        let target = LogTarget::resolve(Some("/tmp/perceive-test/custom.log")).unwrap();
        assert_eq!(
            target,
            LogTarget {
                dir: PathBuf::from("/tmp/perceive-test"),
                base_name: "custom.log".to_string(),
            }
        );
    }

    #[test]
    fn test_init_disabled_is_noop() {
        let config = Config::default();
        assert!(init(&config).unwrap().is_none());
    }
}
