//! Server settings from the environment, overridable on the command line.

use std::path::{Path, PathBuf};

use chrono::Duration;
use services::AuthConfig;
use thiserror::Error;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_DB_URL: &str = "sqlite://lesson_converter.sqlite3";
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:5173"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("{flag} requires a value")]
    MissingValue { flag: &'static str },
    #[error("unknown argument: {0}")]
    UnknownArg(String),
    #[error("invalid --db value: {raw}")]
    InvalidDbUrl { raw: String },
    #[error("invalid --bind value: {raw}")]
    InvalidBind { raw: String },
    #[error("invalid LESSON_TOKEN_TTL_MINUTES value: {raw}")]
    InvalidTokenTtl { raw: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub db_url: String,
    pub auth: AuthConfig,
    pub cors_origins: Vec<String>,
}

/// Outcome of command-line parsing.
#[derive(Debug)]
pub enum Invocation {
    Serve(ServerConfig),
    Help,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  lesson-server [--bind <addr:port>] [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --bind {DEFAULT_BIND}");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LESSON_BIND, LESSON_DB_URL, LESSON_SECRET_KEY, LESSON_TOKEN_TTL_MINUTES,");
    eprintln!("  LESSON_CORS_ORIGINS, LESSON_AI_API_KEY, LESSON_AI_BASE_URL, LESSON_AI_MODEL");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ArgsError::MissingValue { flag })
}

impl ServerConfig {
    /// Build the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError::InvalidTokenTtl` for a non-positive or unparsable
    /// token lifetime.
    pub fn from_env() -> Result<Self, ArgsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError::InvalidTokenTtl` for a non-positive or unparsable
    /// token lifetime.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ArgsError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind = var("LESSON_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let db_url = var("LESSON_DB_URL").map_or_else(|| DEFAULT_DB_URL.to_string(), normalize_sqlite_url);

        let mut auth = AuthConfig::default();
        if let Some(secret) = var("LESSON_SECRET_KEY") {
            auth.secret_key = secret;
        }
        if let Some(raw) = var("LESSON_TOKEN_TTL_MINUTES") {
            let minutes = raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or(ArgsError::InvalidTokenTtl { raw })?;
            auth.token_ttl = Duration::minutes(minutes);
        }

        let cors_origins = match var("LESSON_CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_owned)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| (*o).to_string()).collect(),
        };

        Ok(Self {
            bind,
            db_url,
            auth,
            cors_origins,
        })
    }

    /// Apply command-line flags on top of `self`.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for unknown flags or missing and invalid values.
    pub fn apply_args(
        mut self,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Invocation, ArgsError> {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bind" => {
                    let value = require_value(&mut args, "--bind")?;
                    if !value.contains(':') {
                        return Err(ArgsError::InvalidBind { raw: value });
                    }
                    self.bind = value;
                }
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    self.db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => return Ok(Invocation::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(Invocation::Serve(self))
    }
}

/// Turn a bare path or `sqlite:` URL into an absolute `sqlite://` URL.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    let raw = raw.trim().to_string();
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let path_str = raw.strip_prefix("sqlite:").unwrap_or(raw.as_str());
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directory so the pool can open it.
///
/// # Errors
///
/// Returns `ArgsError::InvalidDbUrl` for URLs without a file path, or the
/// I/O error from creating the file.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.contains("mode=memory") {
        return Ok(());
    }

    let invalid = || ArgsError::InvalidDbUrl {
        raw: db_url.to_string(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid().into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ArgsError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.db_url, DEFAULT_DB_URL);
        assert!(config.auth.uses_default_secret());
        assert_eq!(config.auth.token_ttl, Duration::minutes(30));
        assert_eq!(config.cors_origins, DEFAULT_CORS_ORIGINS);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = config_from(&[
            ("LESSON_SECRET_KEY", "s3cret"),
            ("LESSON_TOKEN_TTL_MINUTES", "5"),
            ("LESSON_CORS_ORIGINS", "https://a.example, ,https://b.example"),
            ("LESSON_DB_URL", "sqlite:///tmp/lessons.db"),
        ])
        .unwrap();
        assert!(!config.auth.uses_default_secret());
        assert_eq!(config.auth.token_ttl, Duration::minutes(5));
        assert_eq!(config.cors_origins, ["https://a.example", "https://b.example"]);
        assert_eq!(config.db_url, "sqlite:///tmp/lessons.db");
    }

    #[test]
    fn rejects_bad_token_ttl() {
        for raw in ["0", "-3", "soon"] {
            let err = config_from(&[("LESSON_TOKEN_TTL_MINUTES", raw)]).unwrap_err();
            assert_eq!(err, ArgsError::InvalidTokenTtl { raw: raw.to_string() });
        }
    }

    #[test]
    fn flags_override_environment() {
        let base = config_from(&[("LESSON_BIND", "127.0.0.1:1")]).unwrap();
        let Invocation::Serve(config) = base
            .apply_args(args(&["--bind", "127.0.0.1:9000", "--db", "sqlite::memory:"]))
            .unwrap()
        else {
            panic!("expected serve");
        };
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.db_url, "sqlite::memory:");
    }

    #[test]
    fn flag_errors() {
        let base = config_from(&[]).unwrap();
        assert_eq!(
            base.clone().apply_args(args(&["--db"])).unwrap_err(),
            ArgsError::MissingValue { flag: "--db" }
        );
        assert_eq!(
            base.clone().apply_args(args(&["--port", "1"])).unwrap_err(),
            ArgsError::UnknownArg("--port".into())
        );
        assert!(matches!(
            base.clone().apply_args(args(&["--bind", "8000"])),
            Err(ArgsError::InvalidBind { .. })
        ));
        assert!(matches!(base.apply_args(args(&["-h"])), Ok(Invocation::Help)));
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:data/lessons.db".to_string());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/lessons.db"));
        assert_eq!(normalize_sqlite_url(" sqlite::memory: ".to_string()), "sqlite::memory:");
    }
}
