use serde::{Deserialize, Serialize};

/// Repository configuration persisted as `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ignored: Vec<String>,
}

impl Config {
    /// Ignored paths are skipped when the scan looks for new files.
    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignored.iter().any(|ignored| ignored == path)
    }

    /// Returns `false` if the path was already ignored.
    pub fn ignore(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.is_ignored(&path) {
            return false;
        }
        self.ignored.push(path);
        true
    }

    pub fn unignore(&mut self, path: &str) -> bool {
        let before = self.ignored.len();
        self.ignored.retain(|ignored| ignored != path);
        self.ignored.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_is_exact_match() {
        let mut config = Config::default();
        assert!(config.ignore("build.log"));

        assert!(config.is_ignored("build.log"));
        assert!(!config.is_ignored("build.log.1"));
        assert!(!config.is_ignored("build"));
    }

    #[test]
    fn test_ignore_twice_keeps_one_entry() {
        let mut config = Config::default();

        assert!(config.ignore("a.txt"));
        assert!(!config.ignore("a.txt"));
        assert_eq!(config.ignored, vec!["a.txt".to_string()]);
    }

    #[test]
    fn test_unignore() {
        let mut config = Config::default();
        config.ignore("a.txt");

        assert!(config.unignore("a.txt"));
        assert!(!config.unignore("a.txt"));
        assert!(!config.is_ignored("a.txt"));
    }

    #[test]
    fn test_config_json_shape() {
        let config: Config = serde_json::from_str(r#"{"ignored":["x"]}"#).unwrap();
        assert!(config.is_ignored("x"));

        let empty: Config = serde_json::from_str("{}").unwrap();
        assert!(empty.ignored.is_empty());
        assert_eq!(serde_json::to_string(&empty).unwrap(), r#"{"ignored":[]}"#);
    }
}
