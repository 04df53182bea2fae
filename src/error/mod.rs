use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

pub mod codes;

pub use codes::ErrorCode;

/// The unified error type for shardctl
#[derive(Error, Debug)]
pub enum ShardctlError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Connection error: {message}")]
    Connection {
        code: u16,
        message: String,
        endpoint: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Parse error: {message}")]
    Parse {
        code: u16,
        message: String,
        /// The text that failed to parse, kept for diagnosis
        input: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Execution error: {message}")]
    Execution {
        code: u16,
        message: String,
        command: Option<String>,
        exit_code: Option<i32>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Command failed: {message}")]
    CommandFailed {
        code: u16,
        message: String,
        operation: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ShardctlError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_GENERIC,
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create a configuration error with specific code and path
    pub fn config_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a connection error with default code
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            code: ErrorCode::CONNECTION_GENERIC,
            message: message.into(),
            endpoint: None,
            source: None,
        }
    }

    /// Create a connection error with specific code and endpoint
    pub fn connection_with_code(
        code: u16,
        message: impl Into<String>,
        endpoint: Option<String>,
    ) -> Self {
        Self::Connection {
            code,
            message: message.into(),
            endpoint,
            source: None,
        }
    }

    /// Create a parse error that keeps the offending text
    pub fn parse(message: impl Into<String>, input: impl Into<String>) -> Self {
        Self::Parse {
            code: ErrorCode::PARSE_GENERIC,
            message: message.into(),
            input: Some(input.into()),
            source: None,
        }
    }

    /// Create a parse error with specific code
    pub fn parse_with_code(code: u16, message: impl Into<String>, input: Option<String>) -> Self {
        Self::Parse {
            code,
            message: message.into(),
            input,
            source: None,
        }
    }

    /// Create an execution error with default code
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            code: ErrorCode::EXEC_GENERIC,
            message: message.into(),
            command: None,
            exit_code: None,
            source: None,
        }
    }

    /// Create an execution error with specific code
    pub fn execution_with_code(
        code: u16,
        message: impl Into<String>,
        command: Option<String>,
    ) -> Self {
        Self::Execution {
            code,
            message: message.into(),
            command,
            exit_code: None,
            source: None,
        }
    }

    /// Create a cluster command failure for the named operation
    pub fn command_failed(code: u16, message: impl Into<String>, operation: Option<String>) -> Self {
        Self::CommandFailed {
            code,
            message: message.into(),
            operation,
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Connection { source: src, .. }
            | Self::Parse { source: src, .. }
            | Self::Execution { source: src, .. }
            | Self::CommandFailed { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Connection { message, .. }
            | Self::Parse { message, .. }
            | Self::Execution { message, .. }
            | Self::CommandFailed { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Set the exit code for an execution error
    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        if let Self::Execution {
            exit_code: ref mut ec,
            ..
        } = self
        {
            *ec = Some(exit_code);
        }
        self
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Connection { .. } => 3,
            Self::Parse { .. } => 4,
            Self::Execution { .. } => 5,
            Self::CommandFailed { .. } => 6,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Connection { code, .. }
            | Self::Parse { code, .. }
            | Self::Execution { code, .. }
            | Self::CommandFailed { code, .. } => *code,
        }
    }

    /// The raw message, without the code prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Config { message, .. }
            | Self::Connection { message, .. }
            | Self::Parse { message, .. }
            | Self::Execution { message, .. }
            | Self::CommandFailed { message, .. } => message,
        }
    }

    /// The text a parse error failed on, if any
    pub fn parse_input(&self) -> Option<&str> {
        match self {
            Self::Parse { input, .. } => input.as_deref(),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, path, .. } => match path {
                Some(p) => format!("Configuration problem in {}: {}", p.display(), message),
                None => format!("Configuration problem: {}", message),
            },
            Self::Connection {
                message, endpoint, ..
            } => match endpoint {
                Some(host) => format!("Could not reach {}: {}", host, message),
                None => format!("Connection error: {}", message),
            },
            Self::Parse { message, .. } => format!("Could not parse command output: {}", message),
            Self::Execution {
                message, command, ..
            } => {
                if let Some(cmd) = command {
                    format!("Command '{}' failed: {}", cmd, message)
                } else {
                    format!("Execution error: {}", message)
                }
            }
            Self::CommandFailed {
                message, operation, ..
            } => match operation {
                Some(op) => format!("{} failed: {}", op, message),
                None => format!("Cluster command failed: {}", message),
            },
        }
    }

    /// Whether the server may still come up and the command is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection {
                code: ErrorCode::CONNECTION_NOT_READY,
                ..
            }
        )
    }
}

/// Type alias for Results using ShardctlError
pub type Result<T> = std::result::Result<T, ShardctlError>;

impl From<serde_json::Error> for ShardctlError {
    fn from(err: serde_json::Error) -> Self {
        ShardctlError::parse_with_code(ErrorCode::PARSE_INVALID_JSON, err.to_string(), None)
            .with_source(err)
    }
}

impl From<serde_yaml::Error> for ShardctlError {
    fn from(err: serde_yaml::Error) -> Self {
        ShardctlError::config_with_code(
            ErrorCode::CONFIG_INVALID_YAML,
            "Invalid YAML syntax",
            None,
        )
        .with_source(err)
    }
}

impl From<toml::de::Error> for ShardctlError {
    fn from(err: toml::de::Error) -> Self {
        ShardctlError::config_with_code(
            ErrorCode::CONFIG_INVALID_TOML,
            "Invalid TOML syntax",
            None,
        )
        .with_source(err)
    }
}
