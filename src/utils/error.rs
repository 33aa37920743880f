use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("{service} API returned {status}: {body}")]
    ApiError {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} authentication failed: {message}")]
    AuthError {
        service: &'static str,
        message: String,
    },

    #[error("Unexpected {service} response: {message}")]
    ResponseError {
        service: &'static str,
        message: String,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    RemoteApi,
    Data,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::HttpError(_) => ErrorCategory::Network,
            SyncError::AuthError { .. } => ErrorCategory::Authentication,
            SyncError::ApiError { status, .. } if *status == 401 || *status == 403 => {
                ErrorCategory::Authentication
            }
            SyncError::ApiError { .. } => ErrorCategory::RemoteApi,
            SyncError::ResponseError { .. }
            | SyncError::CsvError(_)
            | SyncError::SerializationError(_) => ErrorCategory::Data,
            SyncError::IoError(_) => ErrorCategory::Storage,
            SyncError::MissingConfigError { .. }
            | SyncError::InvalidConfigValueError { .. }
            | SyncError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // worth re-running later
            ErrorCategory::Network | ErrorCategory::RemoteApi => ErrorSeverity::Medium,
            ErrorCategory::Authentication | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// Whether a retry of the same request has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::HttpError(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            SyncError::ApiError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Transient, and the server cannot have acted on the request: it was
    /// never connected, or it was throttled. Timeouts and 5xx may follow a
    /// committed write, so requests that create something stop there.
    pub fn is_unprocessed(&self) -> bool {
        match self {
            SyncError::HttpError(e) => e.is_connect(),
            SyncError::ApiError { status, .. } => *status == 429,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check that the Directus and Medusa servers are running and reachable"
            }
            ErrorCategory::Authentication => {
                "Check DIRECTUS_EMAIL/DIRECTUS_PASS and MEDUSA_EMAIL/MEDUSA_PASS"
            }
            ErrorCategory::RemoteApi => "Inspect the server logs of the service that rejected the request",
            ErrorCategory::Data => "Check that the products collection has the expected fields",
            ErrorCategory::Storage => "Check that the report path is writable",
            ErrorCategory::Configuration => "Fix the configuration file or command line arguments",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SyncError::HttpError(e) if e.is_connect() => {
                "Could not connect to a server".to_string()
            }
            SyncError::HttpError(e) if e.is_timeout() => "A request timed out".to_string(),
            SyncError::AuthError { service, .. } => format!("Could not log in to {}", service),
            SyncError::MissingConfigError { field } => {
                format!("Required setting '{}' is not set", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_classification() {
        let unauthorized = SyncError::ApiError {
            service: "medusa",
            status: 401,
            body: String::new(),
        };
        assert_eq!(unauthorized.category(), ErrorCategory::Authentication);
        assert!(!unauthorized.is_transient());

        let unavailable = SyncError::ApiError {
            service: "medusa",
            status: 503,
            body: String::new(),
        };
        assert_eq!(unavailable.category(), ErrorCategory::RemoteApi);
        assert_eq!(unavailable.severity(), ErrorSeverity::Medium);
        assert!(unavailable.is_transient());
        assert!(!unavailable.is_unprocessed());

        let throttled = SyncError::ApiError {
            service: "medusa",
            status: 429,
            body: String::new(),
        };
        assert!(throttled.is_transient());
        assert!(throttled.is_unprocessed());
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = SyncError::MissingConfigError {
            field: "medusa_email".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(
            err.user_friendly_message(),
            "Required setting 'medusa_email' is not set"
        );
    }
}
