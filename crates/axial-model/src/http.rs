//! Status handling for Gemini API responses.
//!
//! Google APIs report failures as a JSON envelope:
//!
//! ```json
//! {"error": {"code": 429, "message": "...", "status": "RESOURCE_EXHAUSTED",
//!            "details": [{"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "37s"}]}}
//! ```
//!
//! Quota exhaustion (429) and overload (503) become
//! [`ModelError::Unavailable`] so the retry loop waits them out. Every other
//! failure is [`ModelError::Api`] carrying the envelope's status and message.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::ModelError;

/// Wait assumed for a 429 that carries no delay hint.
const RATE_LIMIT_FALLBACK_SECS: u64 = 60;

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    #[serde(default)]
    retry_delay: Option<String>,
}

/// Pass successful responses through; turn failures into [`ModelError`].
///
/// # Errors
///
/// [`ModelError::Unavailable`] for 429 and 503, [`ModelError::Api`] for any
/// other non-success status.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ModelError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let header_delay = retry_after_header(&resp);
    let body = resp.text().await.unwrap_or_default();
    Err(classify_failure(status, header_delay, &body))
}

fn classify_failure(status: StatusCode, header_delay: Option<u64>, body: &str) -> ModelError {
    let error = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .unwrap_or_default();
    let message = if error.message.is_empty() {
        body.trim().to_string()
    } else {
        error.message
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => {
            let hinted = header_delay.or_else(|| {
                error
                    .details
                    .iter()
                    .find_map(|d| d.retry_delay.as_deref().and_then(parse_retry_delay))
            });
            let fallback =
                (status == StatusCode::TOO_MANY_REQUESTS).then_some(RATE_LIMIT_FALLBACK_SECS);
            ModelError::Unavailable {
                status: status.as_u16(),
                message,
                retry_after_secs: hinted.or(fallback),
            }
        }
        _ => ModelError::Api {
            status: status.as_u16(),
            code: if error.status.is_empty() {
                status.canonical_reason().unwrap_or("UNKNOWN").to_string()
            } else {
                error.status
            },
            message,
        },
    }
}

/// `Retry-After` in seconds. HTTP-date values are ignored.
fn retry_after_header(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Protobuf duration text such as `"37s"` or `"1.5s"`, rounded up.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_retry_delay(value: &str) -> Option<u64> {
    let secs: f64 = value.trim().strip_suffix('s')?.parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| secs.ceil() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const QUOTA_BODY: &str = r#"{
        "error": {
            "code": 429,
            "message": "Resource has been exhausted (e.g. check quota).",
            "status": "RESOURCE_EXHAUSTED",
            "details": [
                {"@type": "type.googleapis.com/google.rpc.QuotaFailure", "violations": []},
                {"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "37s"}
            ]
        }
    }"#;

    const OVERLOADED_BODY: &str = r#"{
        "error": {"code": 503, "message": "The model is overloaded. Please try again later.", "status": "UNAVAILABLE"}
    }"#;

    const BAD_SCHEMA_BODY: &str = r#"{
        "error": {
            "code": 400,
            "message": "Invalid JSON payload received. Unknown name \"responseSchema\".",
            "status": "INVALID_ARGUMENT"
        }
    }"#;

    fn mock_response(status: u16, retry_after: Option<&str>, body: &'static str) -> reqwest::Response {
        let mut builder = ::http::Response::builder().status(status);
        if let Some(value) = retry_after {
            builder = builder.header("Retry-After", value);
        }
        reqwest::Response::from(builder.body(body).unwrap())
    }

    #[tokio::test]
    async fn quota_exhaustion_uses_retry_info_delay() {
        let err = check_response(mock_response(429, None, QUOTA_BODY))
            .await
            .unwrap_err();
        match err {
            ModelError::Unavailable {
                status,
                message,
                retry_after_secs,
            } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Resource has been exhausted (e.g. check quota).");
                assert_eq!(retry_after_secs, Some(37));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn retry_after_header_wins_over_body_hint() {
        let err = check_response(mock_response(429, Some("12"), QUOTA_BODY))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::Unavailable {
                retry_after_secs: Some(12),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn bare_rate_limit_falls_back_to_a_minute() {
        let err = check_response(mock_response(429, None, ""))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::Unavailable {
                retry_after_secs: Some(60),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn overload_is_transient_without_a_fixed_wait() {
        let err = check_response(mock_response(503, None, OVERLOADED_BODY))
            .await
            .unwrap_err();
        assert!(err.is_transient());
        match err {
            ModelError::Unavailable {
                status,
                message,
                retry_after_secs,
            } => {
                assert_eq!(status, 503);
                assert_eq!(message, "The model is overloaded. Please try again later.");
                assert_eq!(retry_after_secs, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_request_carries_google_status() {
        let err = check_response(mock_response(400, None, BAD_SCHEMA_BODY))
            .await
            .unwrap_err();
        assert!(!err.is_transient());
        match err {
            ModelError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, "INVALID_ARGUMENT");
                assert!(message.starts_with("Invalid JSON payload received."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_envelope_body_is_kept_verbatim() {
        let err = classify_failure(
            StatusCode::BAD_GATEWAY,
            None,
            "  <html>upstream connect error</html>\n",
        );
        match err {
            ModelError::Api { code, message, .. } => {
                assert_eq!(code, "Bad Gateway");
                assert_eq!(message, "<html>upstream connect error</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn retry_delay_text() {
        assert_eq!(parse_retry_delay("37s"), Some(37));
        assert_eq!(parse_retry_delay("1.5s"), Some(2));
        assert_eq!(parse_retry_delay("0s"), Some(0));
        assert_eq!(parse_retry_delay("37"), None);
        assert_eq!(parse_retry_delay("-3s"), None);
    }

    #[tokio::test]
    async fn success_passes_through() {
        let resp = check_response(mock_response(200, None, "{}")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
