/// Stable error codes shared by process exit codes and HTTP `error_code` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    ValidationError = 3,
    MissingPlaceholder = 4,
    DependencyError = 11,
    CircularDependency = 12,
    ModelError = 20,
    AgentExhausted = 21,
    Timeout = 30,
    NetworkError = 40,
    ToolError = 50,
    FileError = 60,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::GeneralError => "GENERAL_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::MissingPlaceholder => "MISSING_PLACEHOLDER",
            Self::DependencyError => "DEPENDENCY_ERROR",
            Self::CircularDependency => "CIRCULAR_DEPENDENCY",
            Self::ModelError => "MODEL_ERROR",
            Self::AgentExhausted => "AGENT_EXHAUSTED",
            Self::Timeout => "TIMEOUT",
            Self::NetworkError => "NETWORK_ERROR",
            Self::ToolError => "TOOL_ERROR",
            Self::FileError => "FILE_ERROR",
        }
    }

    /// Process exit code for the CLI.
    ///
    /// 0 success, 11 config, 12 validation, 20 I/O, 30 pipeline/agent, 40 tool, 50 internal.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::ConfigError => 11,
            Self::ValidationError => 12,
            Self::FileError => 20,
            Self::MissingPlaceholder
            | Self::DependencyError
            | Self::CircularDependency
            | Self::ModelError
            | Self::AgentExhausted => 30,
            Self::Timeout | Self::NetworkError | Self::ToolError => 40,
            Self::GeneralError => 50,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
