use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::session::SessionOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown config section [{0}]")]
    UnknownSection(String),

    #[error("unknown config key '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{1}' for '{0}'")]
    InvalidValue(String, String),

    #[error("could not read config file: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub connection: ConnectionConfig,
    pub session: SessionConfig,
    pub login: LoginConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub await_timeout: Duration,
    pub poll_interval: Duration,
    pub read_chunk_size: usize,
    pub prompt_pattern: String,
    pub password_prompt: String,
    pub exit_command: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoginConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default `tracing` filter, overridden by `RUST_LOG`
    pub level: String,
    /// Log every sent and matched sequence at info level
    pub log_traffic: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig {
                host: "127.0.0.1".to_string(),
                port: 23,
                connect_timeout: Duration::from_secs(5),
            },
            session: SessionConfig {
                await_timeout: Duration::from_millis(1000),
                poll_interval: Duration::from_millis(10),
                read_chunk_size: 4096,
                prompt_pattern: r"[$#>]\s*$".to_string(),
                password_prompt: "Password:".to_string(),
                exit_command: "exit".to_string(),
            },
            login: LoginConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                log_traffic: true,
            },
        }
    }
}

impl ClientConfig {
    /// Load the config file, writing a default one if it does not exist yet
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Self::parse_config(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let default_config = Self::default();
                if let Err(e) = fs::write(path, default_config.to_config_file_format()) {
                    tracing::warn!(
                        "Could not create default config file {}: {}",
                        path.display(),
                        e
                    );
                }
                Ok(default_config)
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    pub fn parse_config(content: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let mut current_section = String::new();

        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = line[1..line.len() - 1].trim().to_string();
                continue;
            }

            if let Some(eq_pos) = line.find('=') {
                let key = line[..eq_pos].trim();
                let value = parse_value(&line[eq_pos + 1..]);

                match current_section.as_str() {
                    "connection" => config.parse_connection_config(key, value)?,
                    "session" => config.parse_session_config(key, value)?,
                    "login" => config.parse_login_config(key, value)?,
                    "logging" => config.parse_logging_config(key, value)?,
                    _ => return Err(ConfigError::UnknownSection(current_section.clone())),
                }
            }
        }

        Ok(config)
    }

    /// Session engine settings derived from the `[session]` section
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            timeout: self.session.await_timeout,
            poll_interval: self.session.poll_interval,
            read_chunk_size: self.session.read_chunk_size,
            password_prompt: self.session.password_prompt.clone(),
            exit_command: self.session.exit_command.clone(),
        }
    }

    fn parse_connection_config(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "host" => self.connection.host = value.to_string(),
            "port" => self.connection.port = parse_number(key, value)?,
            "connect_timeout" => {
                self.connection.connect_timeout = Duration::from_secs(parse_number(key, value)?)
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    fn parse_session_config(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "await_timeout_ms" => {
                self.session.await_timeout = Duration::from_millis(parse_number(key, value)?)
            }
            "poll_interval_ms" => {
                let millis: u64 = parse_number(key, value)?;
                if millis == 0 {
                    return Err(ConfigError::InvalidValue(key.to_string(), value.to_string()));
                }
                self.session.poll_interval = Duration::from_millis(millis);
            }
            "read_chunk_size" => {
                let size: usize = parse_number(key, value)?;
                if size == 0 {
                    return Err(ConfigError::InvalidValue(key.to_string(), value.to_string()));
                }
                self.session.read_chunk_size = size;
            }
            "prompt_pattern" => self.session.prompt_pattern = value.to_string(),
            "password_prompt" => self.session.password_prompt = value.to_string(),
            "exit_command" => self.session.exit_command = value.to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    fn parse_login_config(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = (!value.is_empty()).then(|| value.to_string());
        match key {
            "username" => self.login.username = value,
            "password" => self.login.password = value,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    fn parse_logging_config(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "level" => self.logging.level = value.to_string(),
            "log_traffic" => {
                self.logging.log_traffic = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string(), value.to_string()))?;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn to_config_file_format(&self) -> String {
        format!(
            r#"# Telnet Client Configuration File
# Lines starting with # are comments

[connection]
# Remote host defaults, overridden on the command line
host = "{}"
port = {}
connect_timeout = {}    # seconds

[session]
# Await timeouts are counted in poll ticks of poll_interval_ms
await_timeout_ms = {}
poll_interval_ms = {}
read_chunk_size = {}
# Regular expression matched against received output
prompt_pattern = "{}"
password_prompt = "{}"
exit_command = "{}"

[login]
username = "{}"
password = "{}"

[logging]
level = "{}"            # tracing filter, RUST_LOG takes precedence
log_traffic = {}
"#,
            self.connection.host,
            self.connection.port,
            self.connection.connect_timeout.as_secs(),
            self.session.await_timeout.as_millis(),
            self.session.poll_interval.as_millis(),
            self.session.read_chunk_size,
            self.session.prompt_pattern,
            self.session.password_prompt,
            self.session.exit_command,
            self.login.username.as_deref().unwrap_or(""),
            self.login.password.as_deref().unwrap_or(""),
            self.logging.level,
            self.logging.log_traffic,
        )
    }
}

/// Quoted values run to the closing quote; bare values end at an inline `#`
fn parse_value(raw: &str) -> &str {
    let raw = raw.trim();
    if let Some(quoted) = raw.strip_prefix('"') {
        match quoted.rfind('"') {
            Some(end) => &quoted[..end],
            None => quoted,
        }
    } else {
        match raw.find('#') {
            Some(comment) => raw[..comment].trim_end(),
            None => raw,
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), value.to_string()))
}
