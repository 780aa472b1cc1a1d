use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "data/users.json";
pub const DATA_PATH_ENV: &str = "BANK_DATA_PATH";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where the ledger is loaded from and saved to.
    pub data_path: PathBuf,
}

impl Config {
    /// The first command line argument wins, then `BANK_DATA_PATH`, then the
    /// default location.
    pub fn from_env() -> Self {
        Self::resolve(std::env::args().nth(1), std::env::var(DATA_PATH_ENV).ok())
    }

    fn resolve(arg: Option<String>, env_path: Option<String>) -> Self {
        let data_path = arg
            .into_iter()
            .chain(env_path)
            .find(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        Self { data_path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_overrides_env() {
        let config = Config::resolve(Some("a.json".into()), Some("b.json".into()));
        assert_eq!(config.data_path, PathBuf::from("a.json"));
    }

    #[test]
    fn env_used_without_argument() {
        let config = Config::resolve(None, Some("b.json".into()));
        assert_eq!(config.data_path, PathBuf::from("b.json"));
    }

    #[test]
    fn default_when_unset_or_blank() {
        assert_eq!(
            Config::resolve(None, None).data_path,
            PathBuf::from(DEFAULT_DATA_PATH)
        );
        assert_eq!(
            Config::resolve(Some(" ".into()), None).data_path,
            PathBuf::from(DEFAULT_DATA_PATH)
        );
    }
}
