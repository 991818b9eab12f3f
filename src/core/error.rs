use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidToml,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    PathResolutionFailed,

    StepFailed,
    StepSpawnFailed,

    InternalIoError,
    InternalJsonError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidToml => "config.invalid_toml",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::PathResolutionFailed => "path.resolution_failed",

            ErrorCode::StepFailed => "step.failed",
            ErrorCode::StepSpawnFailed => "step.spawn_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidTomlDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResolutionDetails {
    pub anchor: String,
    pub levels: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFailedDetails {
    pub step: String,
    pub command: String,
    pub exit_code: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSpawnFailedDetails {
    pub step: String,
    pub command: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn config_invalid_toml(path: impl Into<String>, error: impl Into<String>) -> Self {
        let details = to_details(ConfigInvalidTomlDetails {
            path: path.into(),
            error: error.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidToml,
            "Invalid TOML in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn path_resolution_failed(
        anchor: impl Into<String>,
        levels: usize,
        resolved: Option<String>,
    ) -> Self {
        let anchor = anchor.into();
        let message = match &resolved {
            Some(path) => format!("Package root does not exist: {}", path),
            None => format!("'{}' has no ancestor {} levels up", anchor, levels),
        };
        let details = to_details(PathResolutionDetails {
            anchor,
            levels,
            resolved,
        });

        Self::new(ErrorCode::PathResolutionFailed, message, details)
            .with_hint("Pass --anchor with the path of the entry-point script")
    }

    pub fn step_failed(step: impl Into<String>, command: impl Into<String>, exit_code: i32) -> Self {
        let step = step.into();
        let command = command.into();
        let message = format!("{} exited with code {}", command, exit_code);
        let details = to_details(StepFailedDetails {
            step,
            command,
            exit_code,
        });

        Self::new(ErrorCode::StepFailed, message, details)
    }

    pub fn step_spawn_failed(
        step: impl Into<String>,
        command: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let command = command.into();
        let message = format!("Failed to run {}", command);
        let details = to_details(StepSpawnFailedDetails {
            step: step.into(),
            command,
            error: error.into(),
        });

        Self::new(ErrorCode::StepSpawnFailed, message, details)
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    /// Exit code carried by a `StepFailed` error.
    pub fn step_exit_code(&self) -> Option<i32> {
        if self.code != ErrorCode::StepFailed {
            return None;
        }
        self.details
            .get("exitCode")
            .and_then(Value::as_i64)
            .map(|code| code as i32)
    }
}
