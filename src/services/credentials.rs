use crate::constants::credentials::{
    DOT_ENV_FILE, ENV_SERVICE_ACCOUNT_FILE, ENV_SERVICE_ACCOUNT_JSON,
};
use crate::services::logger::Logger;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    CliFlag,
    EnvFile,
    EnvJson,
    DotEnv,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub service_account_json: Vec<u8>,
    pub source: CredentialSource,
}

/// Finds service account JSON. Highest priority first:
/// `--service-account-file`, `GOOGLE_SERVICE_ACCOUNT_FILE`,
/// `GOOGLE_SERVICE_ACCOUNT_JSON`, then the same two keys in `.env`.
/// An unreadable file is logged and the next source is tried.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    logger: Logger,
    dot_env_path: PathBuf,
}

impl CredentialResolver {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger: logger.child("credentials"),
            dot_env_path: PathBuf::from(DOT_ENV_FILE),
        }
    }

    pub fn with_dot_env_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dot_env_path = path.into();
        self
    }

    pub fn resolve(&self, cli_file: Option<&Path>) -> Option<Credentials> {
        if let Some(path) = cli_file {
            if let Some(data) = self.read_file(path, "--service-account-file") {
                return Some(self.found(data, CredentialSource::CliFlag));
            }
        }

        if let Some(path) = non_empty_env(ENV_SERVICE_ACCOUNT_FILE) {
            if let Some(data) = self.read_file(Path::new(&path), ENV_SERVICE_ACCOUNT_FILE) {
                return Some(self.found(data, CredentialSource::EnvFile));
            }
        }

        if let Some(json) = non_empty_env(ENV_SERVICE_ACCOUNT_JSON) {
            return Some(self.found(json.into_bytes(), CredentialSource::EnvJson));
        }

        self.load_from_dot_env()
            .map(|data| self.found(data, CredentialSource::DotEnv))
    }

    fn load_from_dot_env(&self) -> Option<Vec<u8>> {
        let entries = dotenv::from_path_iter(&self.dot_env_path).ok()?;
        let mut rejected = 0usize;
        for entry in entries {
            match entry {
                Ok((key, value)) => {
                    if let Some(data) = self.dot_env_value(&key, &value) {
                        return Some(data);
                    }
                }
                Err(err) => {
                    rejected += 1;
                    self.logger.debug(
                        "dotenv rejected a .env line",
                        Some(&serde_json::json!({ "error": err.to_string() })),
                    );
                }
            }
        }
        if rejected == 0 {
            return None;
        }
        self.scan_dot_env_lines()
    }

    /// Plain `KEY=value` reading for lines the dotenv grammar refuses, most
    /// commonly unquoted service account JSON with spaces in it.
    fn scan_dot_env_lines(&self) -> Option<Vec<u8>> {
        let contents = std::fs::read_to_string(&self.dot_env_path).ok()?;
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if let Some(data) = self.dot_env_value(key.trim(), value) {
                return Some(data);
            }
        }
        None
    }

    fn dot_env_value(&self, key: &str, value: &str) -> Option<Vec<u8>> {
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        if value.is_empty() {
            return None;
        }
        if key == ENV_SERVICE_ACCOUNT_FILE {
            self.read_file(Path::new(value), ".env")
        } else if key == ENV_SERVICE_ACCOUNT_JSON {
            Some(value.as_bytes().to_vec())
        } else {
            None
        }
    }

    fn read_file(&self, path: &Path, origin: &str) -> Option<Vec<u8>> {
        match std::fs::read(path) {
            Ok(data) => Some(data),
            Err(err) => {
                self.logger.error(
                    "failed to read service account file",
                    Some(&serde_json::json!({
                        "origin": origin,
                        "path": path.display().to_string(),
                        "error": err.to_string(),
                    })),
                );
                None
            }
        }
    }

    fn found(&self, data: Vec<u8>, source: CredentialSource) -> Credentials {
        self.logger.debug(
            "service account loaded",
            Some(&serde_json::json!({ "source": format!("{:?}", source) })),
        );
        Credentials {
            service_account_json: data,
            source,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
