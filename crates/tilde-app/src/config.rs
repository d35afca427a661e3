//! Host configuration, loaded from `tilde.toml`.
//!
//! Every field has a default; a missing file means a default config.
//!
//! ```toml
//! # Remote bridge listen port.
//! port = 55055
//! # Command names match regardless of ASCII case.
//! case_insensitive = true
//! # Character budget for the transcript renderings.
//! max_scrollback_chars = 15000
//! # Print a greeting as the first transcript line.
//! show_banner = true
//! # Write the plain transcript here on exit.
//! transcript_path = "transcript.txt"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use tilde_types::Result;

/// Host settings for the demo console.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Remote bridge listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whether command name matching ignores ASCII case.
    #[serde(default = "default_case_insensitive")]
    pub case_insensitive: bool,
    /// Character budget for the transcript renderings.
    #[serde(default = "default_max_scrollback_chars")]
    pub max_scrollback_chars: usize,
    /// Print a greeting as the first transcript line.
    #[serde(default = "default_show_banner")]
    pub show_banner: bool,
    /// Where to write the plain transcript on exit, if anywhere.
    #[serde(default)]
    pub transcript_path: Option<PathBuf>,
}

fn default_port() -> u16 {
    55055
}

fn default_case_insensitive() -> bool {
    true
}

fn default_max_scrollback_chars() -> usize {
    15_000
}

fn default_show_banner() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            case_insensitive: default_case_insensitive(),
            max_scrollback_chars: default_max_scrollback_chars(),
            show_banner: default_show_banner(),
            transcript_path: None,
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.port, 55055);
        assert!(cfg.case_insensitive);
        assert_eq!(cfg.max_scrollback_chars, 15_000);
        assert!(cfg.show_banner);
        assert!(cfg.transcript_path.is_none());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: AppConfig = toml::from_str("port = 8080\n").unwrap();
        assert_eq!(cfg.port, 8080);
        assert!(cfg.case_insensitive);
        assert_eq!(cfg.max_scrollback_chars, 15_000);
    }

    #[test]
    fn full_toml_round_trips() {
        let cfg: AppConfig = toml::from_str(
            "port = 9000\n\
             case_insensitive = false\n\
             max_scrollback_chars = 400\n\
             show_banner = false\n\
             transcript_path = \"out.txt\"\n",
        )
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert!(!cfg.case_insensitive);
        assert_eq!(cfg.max_scrollback_chars, 400);
        assert!(!cfg.show_banner);
        assert_eq!(cfg.transcript_path, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn missing_file_means_defaults() {
        let cfg = AppConfig::load(Path::new("/nonexistent/tilde.toml")).unwrap();
        assert_eq!(cfg.port, 55055);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(toml::from_str::<AppConfig>("port = \"not a number\"").is_err());
    }
}
