use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("DNS resolution failed for {host}: {message}")]
    TransientResolution { host: String, message: String },

    #[error("SMP request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("SMP response is not valid service metadata XML: {message}")]
    Parse { message: String },

    #[error("Lookup cancelled during {stage} stage")]
    Cancelled { stage: &'static str },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LookupError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LookupError::TransientResolution { .. }
            | LookupError::Fetch { .. }
            | LookupError::Cancelled { .. } => ErrorCategory::Network,
            LookupError::Parse { .. } => ErrorCategory::Data,
            LookupError::ConfigError { .. }
            | LookupError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            LookupError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LookupError::Cancelled { .. } => ErrorSeverity::Low,
            LookupError::TransientResolution { .. } => ErrorSeverity::Medium,
            // 5xx 和傳輸錯誤可以重試，4xx 不行
            LookupError::Fetch { source, .. } => match source.status() {
                Some(status) if status.is_client_error() => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            LookupError::Parse { .. }
            | LookupError::ConfigError { .. }
            | LookupError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            LookupError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Whether a caller-side retry has a reasonable chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    /// HTTP status of a failed SMP request, when the server answered at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            LookupError::Fetch { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LookupError::TransientResolution { .. } => {
                "Check network connectivity and the system DNS configuration, then retry".to_string()
            }
            LookupError::Fetch { source, .. } if source.is_timeout() => {
                "The SMP did not answer in time; retry or raise --http-timeout-secs".to_string()
            }
            LookupError::Fetch { source, .. } => match source.status() {
                Some(status) if status.as_u16() == 404 => {
                    "The SMP does not publish a service group for this participant".to_string()
                }
                Some(status) if status.is_client_error() => {
                    "Verify the participant scheme and identifier".to_string()
                }
                _ => "The SMP may be temporarily unavailable, retry later".to_string(),
            },
            LookupError::Parse { .. } => {
                "The SMP returned unexpected content; inspect it with --verbose".to_string()
            }
            LookupError::Cancelled { .. } => "Run the lookup again".to_string(),
            LookupError::ConfigError { .. } | LookupError::InvalidConfigValueError { .. } => {
                "Review the configuration file, environment and command line flags".to_string()
            }
            LookupError::IoError(_) => "Check file paths and permissions".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LookupError::TransientResolution { host, .. } => {
                format!("Could not reach DNS to look up {}", host)
            }
            LookupError::Fetch { url, source } => match source.status() {
                Some(status) => format!("SMP answered {} for {}", status, url),
                None => format!("Could not fetch {}", url),
            },
            LookupError::Parse { .. } => "SMP returned malformed service metadata".to_string(),
            LookupError::Cancelled { stage } => format!("Lookup cancelled ({})", stage),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
