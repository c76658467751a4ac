//! Shared HTTP plumbing for platform clients.

use herald_error::{HttpError, SocialError, SocialErrorKind};
use reqwest::{Client, Response, StatusCode, header::RETRY_AFTER};
use std::time::Duration;
use tracing::{error, warn};

/// Build a client with a bounded request timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, HttpError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("herald/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))
}

/// Map a transport failure (no response received).
#[track_caller]
pub(crate) fn transport_error(err: reqwest::Error) -> SocialError {
    error!(error = ?err, "Platform request failed before a response arrived");
    SocialError::new(SocialErrorKind::Transport(err.to_string()))
}

/// Seconds to wait, from `Retry-After` (integer or fractional seconds).
pub(crate) fn retry_after_secs(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| secs.ceil() as u64)
}

/// Map a non-success status onto the social error taxonomy.
pub(crate) fn status_error(
    status: StatusCode,
    retry_after_secs: Option<u64>,
    body: String,
) -> SocialError {
    let kind = match status {
        StatusCode::TOO_MANY_REQUESTS => SocialErrorKind::RateLimited { retry_after_secs },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SocialErrorKind::Unauthorized(body),
        StatusCode::NOT_FOUND => SocialErrorKind::NotFound(body),
        _ => SocialErrorKind::Rejected {
            status: status.as_u16(),
            message: body,
        },
    };
    warn!(status = %status, kind = %kind, "Platform returned error status");
    SocialError::new(kind)
}

/// Turn an error response into a [`SocialError`], consuming the body.
pub(crate) async fn error_from_response(response: Response) -> SocialError {
    let status = response.status();
    let retry_after = retry_after_secs(&response);
    let body = response.text().await.unwrap_or_default();
    status_error(status, retry_after, body)
}

/// Decode a JSON body, mapping failures to [`SocialErrorKind::Parse`].
pub(crate) async fn json_body<T: serde::de::DeserializeOwned>(
    response: Response,
) -> Result<T, SocialError> {
    response.json::<T>().await.map_err(|e| {
        error!(error = ?e, "Failed to decode platform response");
        SocialError::new(SocialErrorKind::Parse(e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_error::RetryableError;

    #[test]
    fn test_status_mapping() {
        let err = status_error(StatusCode::TOO_MANY_REQUESTS, Some(9), String::new());
        assert_eq!(
            err.kind,
            SocialErrorKind::RateLimited {
                retry_after_secs: Some(9)
            }
        );
        assert!(err.is_retryable());

        let err = status_error(StatusCode::FORBIDDEN, None, "nope".into());
        assert_eq!(err.kind, SocialErrorKind::Unauthorized("nope".into()));
        assert!(!err.is_retryable());

        let err = status_error(StatusCode::BAD_GATEWAY, None, String::new());
        assert!(err.is_retryable());

        let err = status_error(StatusCode::BAD_REQUEST, None, "dup".into());
        assert!(!err.is_retryable());
    }
}
