//! Collapsed view of AWS SDK failures.
//!
//! The SDK produces one `SdkError<E, R>` type per operation. The clients only
//! need to log a failure and decide whether to continue, so every SDK error is
//! flattened into an [`ApiError`] at the API seam.

use std::fmt;

use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;

/// Broad category of an API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The request could not be built.
    Construction,
    /// The request timed out.
    Timeout,
    /// The request could not be sent (network, DNS, TLS).
    Dispatch,
    /// A response arrived but could not be understood.
    Response,
    /// The service returned an error (access denied, name conflict, ...).
    Service,
}

impl ApiErrorKind {
    /// Stable name used in log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Construction => "ConstructionFailure",
            Self::Timeout => "TimeoutError",
            Self::Dispatch => "DispatchFailure",
            Self::Response => "ResponseError",
            Self::Service => "ServiceError",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call to S3 or IAM.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failed with {kind}: {message}")]
pub struct ApiError {
    /// Name of the API operation, e.g. `"CreateBucket"`.
    pub operation: &'static str,
    /// Broad category of the failure.
    pub kind: ApiErrorKind,
    /// Service error code (e.g. `BucketAlreadyExists`), when the service sent one.
    pub code: Option<String>,
    /// HTTP status of the response, when one was received.
    pub status: Option<u16>,
    /// Human-readable description including the error source chain.
    pub message: String,
}

impl ApiError {
    /// Create an error with no code or status attached.
    #[must_use]
    pub fn new(operation: &'static str, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            code: None,
            status: None,
            message: message.into(),
        }
    }

    /// Attach a service error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach an HTTP status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// A response that parsed but lacked a field the flow needs.
    #[must_use]
    pub fn missing_field(operation: &'static str, field: &str) -> Self {
        Self::new(
            operation,
            ApiErrorKind::Response,
            format!("response is missing `{field}`"),
        )
    }

    /// Flatten an SDK error.
    pub fn from_sdk<E>(operation: &'static str, err: &SdkError<E, HttpResponse>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
    {
        let kind = match err {
            SdkError::ConstructionFailure(_) => ApiErrorKind::Construction,
            SdkError::TimeoutError(_) => ApiErrorKind::Timeout,
            SdkError::DispatchFailure(_) => ApiErrorKind::Dispatch,
            SdkError::ServiceError(_) => ApiErrorKind::Service,
            _ => ApiErrorKind::Response,
        };

        Self {
            operation,
            kind,
            code: err.code().map(ToOwned::to_owned),
            status: err.raw_response().map(|r| r.status().as_u16()),
            message: DisplayErrorContext(err).to_string(),
        }
    }
}
