// PIM error taxonomy
use thiserror::Error;

/// Errors raised anywhere between the transport and the process boundary.
///
/// Classification is carried by the variant, never by message text:
/// `Cancelled` travels unchanged to the top, `AuthorizationDenied` is the
/// only class that allows a caller to widen scope and continue.
#[derive(Debug, Error)]
pub enum PimError {
    #[error("operation cancelled by user")]
    Cancelled,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("HTTP {status}: {}", describe(.code, .message))]
    AuthorizationDenied {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("HTTP {status}: {}", describe(.code, .message))]
    Http {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("credential error: {0}")]
    Credential(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("read input: input stream closed")]
    InputClosed,

    #[error("no items to select from")]
    NoItems,

    #[error("{}", no_roles_message(.filtered))]
    NoEligibleRoles { filtered: bool },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<PimError>,
    },
}

fn describe(code: &Option<String>, message: &str) -> String {
    match code {
        Some(code) => format!("{} - {}", code, message),
        None => message.to_string(),
    }
}

fn no_roles_message(filtered: &bool) -> &'static str {
    if *filtered {
        "no eligible PIM roles matched the provided filters"
    } else {
        "no eligible PIM roles found"
    }
}

impl PimError {
    pub fn validation(message: impl Into<String>) -> Self {
        PimError::Validation(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        PimError::Decode(message.into())
    }

    pub fn credential(message: impl Into<String>) -> Self {
        PimError::Credential(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        PimError::Config(message.into())
    }

    /// Build a classified error from an HTTP status and the ARM error envelope.
    pub fn from_status(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let denied = status == 403
            || code
                .as_deref()
                .map(|c| c.to_ascii_lowercase().contains("authorizationfailed"))
                .unwrap_or(false);

        if denied {
            PimError::AuthorizationDenied { status, code, message }
        } else {
            PimError::Http { status, code, message }
        }
    }

    /// Wrap this error with the operation that was being attempted.
    /// `Cancelled` is returned as-is so it reaches the top unwrapped.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        if matches!(self, PimError::Cancelled) {
            return self;
        }
        PimError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error beneath any context layers.
    pub fn root(&self) -> &PimError {
        match self {
            PimError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), PimError::Cancelled)
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self.root(), PimError::AuthorizationDenied { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.root(), PimError::Validation(_))
    }

    /// Process exit status for this error.
    /// - 130: cancelled by the operator
    /// - 2: validation failure
    /// - 1: everything else
    pub fn exit_code(&self) -> i32 {
        match self.root() {
            PimError::Cancelled => 130,
            PimError::Validation(_) => 2,
            _ => 1,
        }
    }
}

/// Attach operation context to fallible results.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T, PimError>;

    fn with_context<F, S>(self, f: F) -> Result<T, PimError>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T, PimError> {
    fn context(self, context: impl Into<String>) -> Result<T, PimError> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F, S>(self, f: F) -> Result<T, PimError>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

pub type PimResult<T> = Result<T, PimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_status_is_authorization() {
        let err = PimError::from_status(403, None, "nope");
        assert!(err.is_authorization());
    }

    #[test]
    fn test_authorization_failed_code_is_authorization() {
        let err = PimError::from_status(
            400,
            Some("AuthorizationFailed".to_string()),
            "The client does not have authorization",
        );
        assert!(err.is_authorization());
    }

    #[test]
    fn test_other_status_is_generic() {
        let err = PimError::from_status(500, Some("InternalError".to_string()), "boom");
        assert!(!err.is_authorization());
        assert_eq!(err.to_string(), "HTTP 500: InternalError - boom");
    }

    #[test]
    fn test_context_preserves_classification() {
        let err = PimError::Cancelled
            .with_context("selection")
            .with_context("activate");
        assert!(matches!(err, PimError::Cancelled));
        assert_eq!(err.exit_code(), 130);

        let denied: PimResult<()> = Err(PimError::from_status(403, None, "denied"));
        let wrapped = denied.context("list subscriptions for Root").unwrap_err();
        assert!(wrapped.is_authorization());
        assert_eq!(wrapped.to_string(), "list subscriptions for Root: HTTP 403: denied");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(PimError::validation("bad").exit_code(), 2);
        assert_eq!(PimError::NoItems.exit_code(), 1);
    }

    #[test]
    fn test_no_eligible_roles_messages() {
        assert_eq!(
            PimError::NoEligibleRoles { filtered: true }.to_string(),
            "no eligible PIM roles matched the provided filters"
        );
        assert_eq!(
            PimError::NoEligibleRoles { filtered: false }.to_string(),
            "no eligible PIM roles found"
        );
    }
}
