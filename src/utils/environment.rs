use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::ExtractOptions;

/// Environment variable naming an options JSON file
pub const OPTIONS_ENV_VAR: &str = "CONVO_EXPORT_OPTIONS";

/// Options file named by `CONVO_EXPORT_OPTIONS`, if set and non-empty
pub fn options_path_from_env() -> Option<PathBuf> {
    env::var_os(OPTIONS_ENV_VAR).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Load extraction options.
///
/// An explicit path wins over the environment variable; with neither, defaults are used.
/// Omitted fields take their defaults and unknown fields are ignored.
pub fn load_options(explicit: Option<&Path>) -> Result<ExtractOptions> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match options_path_from_env() {
            Some(path) => path,
            None => return Ok(ExtractOptions::default()),
        },
    };

    let json =
        fs::read_to_string(&path).with_context(|| format!("Failed to read options file: {}", path.display()))?;
    ExtractOptions::from_json_str(&json).with_context(|| format!("Invalid options file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::models::LimitMode;

    fn options_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", json).unwrap();
        file
    }

    #[test]
    fn test_explicit_path() {
        let file = options_file(r#"{"parseCode": false, "maxMessages": 5, "limitMode": "hard", "extra": 1}"#);
        let options = load_options(Some(file.path())).unwrap();
        assert!(!options.parse_code);
        assert!(options.parse_tables);
        assert_eq!(options.max_messages, 5);
        assert_eq!(options.limit_mode, LimitMode::Hard);
    }

    #[test]
    fn test_invalid_json_has_context() {
        let file = options_file("{not json");
        let err = load_options(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Invalid options file"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_options(Some(Path::new("/nonexistent/options.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read options file"));
    }

    #[test]
    fn test_environment_variable() {
        let file = options_file(r#"{"parseMath": false}"#);
        let original = env::var_os(OPTIONS_ENV_VAR);

        // SAFETY: this is the only test touching the variable and it restores the original
        // value before returning.
        unsafe {
            env::set_var(OPTIONS_ENV_VAR, file.path());
        }
        let from_env = load_options(None);

        unsafe {
            env::remove_var(OPTIONS_ENV_VAR);
        }
        let defaults = load_options(None);

        if let Some(value) = original {
            unsafe {
                env::set_var(OPTIONS_ENV_VAR, value);
            }
        }

        assert!(!from_env.unwrap().parse_math);
        assert_eq!(defaults.unwrap(), ExtractOptions::default());
    }
}
