use thiserror::Error;

use super::codes::ErrorCode;
use super::pipeline::PipelineError;
use super::tool::ToolError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("pipeline failed: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("tool failed: {0}")]
    Tool(#[from] ToolError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::Pipeline(e) => e.error_code(),
            Self::Tool(e) => e.error_code(),
            Self::Command(_) => ErrorCode::GeneralError,
            Self::Io(_) => ErrorCode::FileError,
            Self::Anyhow(_) => ErrorCode::GeneralError,
        }
    }
}

/// Bad or missing user input, raised before anything is executed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}", describe_inputs(.missing, .empty))]
    Inputs {
        missing: Vec<String>,
        empty: Vec<String>,
    },

    #[error("required fields are empty: {}", .fields.join(", "))]
    EmptyFields { fields: Vec<&'static str> },
}

impl ValidationError {
    /// Every offending key, missing ones first.
    pub fn keys(&self) -> Vec<String> {
        match self {
            Self::Inputs { missing, empty } => missing.iter().chain(empty).cloned().collect(),
            Self::EmptyFields { fields } => fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

fn describe_inputs(missing: &[String], empty: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing inputs: {}", missing.join(", ")));
    }
    if !empty.is_empty() {
        parts.push(format!("empty inputs: {}", empty.join(", ")));
    }
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inputs_message_lists_every_key() {
        let err = ValidationError::Inputs {
            missing: vec!["origin".into(), "date_range".into()],
            empty: vec!["cities".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("missing inputs: origin, date_range"));
        assert!(msg.contains("empty inputs: cities"));
        assert_eq!(err.keys(), vec!["origin", "date_range", "cities"]);
    }

    #[test]
    fn test_cli_error_codes() {
        let err = CliError::Validation(ValidationError::EmptyFields {
            fields: vec!["origin"],
        });
        assert_eq!(err.error_code(), ErrorCode::ValidationError);
        assert_eq!(
            CliError::Config("bad".into()).error_code(),
            ErrorCode::ConfigError
        );
    }
}
