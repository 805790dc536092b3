use thiserror::Error;

/// Failure talking to the mentions backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success status with no usable message from the server.
    #[error("HTTP error fetching {resource}, status {status}")]
    Status { resource: &'static str, status: u16 },

    /// The server refused the request and said why.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Connection, timeout or body decoding failure.
    #[error("request for {resource} failed: {source}")]
    Transport {
        resource: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } | ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
        }
    }
}

/// A poll cycle failed. Recorded on the dashboard, never propagated.
#[derive(Debug, Error)]
#[error("Failed to load data: {source}. Is the backend running?")]
pub struct FetchError {
    #[from]
    source: ApiError,
}

impl FetchError {
    pub fn cause(&self) -> &ApiError {
        &self.source
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Mention text cannot be empty.")]
    Validation,

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_message_wraps_cause() {
        let err = FetchError::from(ApiError::Status {
            resource: "mentions",
            status: 500,
        });
        assert_eq!(
            err.to_string(),
            "Failed to load data: HTTP error fetching mentions, status 500. Is the backend running?"
        );
        assert_eq!(err.cause().status(), Some(500));
    }

    #[test]
    fn test_submit_error_surfaces_server_detail() {
        let err = SubmitError::from(ApiError::Rejected {
            status: 400,
            message: "too long".to_string(),
        });
        assert_eq!(err.to_string(), "too long");
    }

    #[test]
    fn test_validation_message() {
        assert_eq!(
            SubmitError::Validation.to_string(),
            "Mention text cannot be empty."
        );
    }
}
