use std::path::PathBuf;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "STUDYLOG_DATA_DIR";

pub struct Config {
    /// Directory holding one JSON file per storage key
    pub data_dir: PathBuf,
    /// Filter used when `RUST_LOG` is unset
    pub default_log_filter: &'static str,
}

impl Config {
    /// `data_dir` comes from `--data-dir` or the environment (resolved by clap);
    /// without it the platform data directory is used.
    pub fn resolve(data_dir: Option<PathBuf>, verbose: bool) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        Self {
            data_dir,
            default_log_filter: if verbose { "studylog=debug" } else { "warn" },
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studylog")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let config = Config::resolve(Some(PathBuf::from("/srv/studylog")), false);
        assert_eq!(config.data_dir, PathBuf::from("/srv/studylog"));
        assert_eq!(config.default_log_filter, "warn");
    }

    #[test]
    fn falls_back_to_platform_dir() {
        let config = Config::resolve(None, true);
        assert!(config.data_dir.ends_with("studylog"));
        assert_eq!(config.default_log_filter, "studylog=debug");
    }
}
