use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum LlmError {
    /// The upstream answered with anything other than `200 OK`.
    #[error("Error: {status_code} {reason} - {body}")]
    UpstreamRequest {
        status_code: u16,
        reason: String,
        body: String,
    },

    /// A `200 OK` whose body is not JSON or lacks `choices[0].message.content`.
    #[error("Malformed response: {message}")]
    MalformedResponse {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl LlmError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Transport { .. } => true,
            LlmError::UpstreamRequest { status_code, .. } => {
                *status_code == 429 || (500..600).contains(status_code)
            }
            LlmError::MalformedResponse { .. } | LlmError::InvalidRequest(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(status_code: u16) -> LlmError {
        LlmError::UpstreamRequest {
            status_code,
            reason: String::new(),
            body: String::new(),
        }
    }

    #[test]
    fn upstream_display_matches_status_reason_body() {
        let err = LlmError::UpstreamRequest {
            status_code: 500,
            reason: "Internal Server Error".to_string(),
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Error: 500 Internal Server Error - boom");
    }

    #[test]
    fn rate_limits_and_server_errors_are_transient() {
        assert!(upstream(429).is_transient());
        assert!(upstream(500).is_transient());
        assert!(upstream(503).is_transient());
        assert!(!upstream(400).is_transient());
        assert!(!upstream(404).is_transient());
    }

    #[test]
    fn malformed_and_invalid_are_permanent() {
        let malformed = LlmError::MalformedResponse {
            message: "No choices in response".to_string(),
            source: None,
        };
        assert!(!malformed.is_transient());
        assert!(!LlmError::InvalidRequest("empty".to_string()).is_transient());
    }
}
