use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{TranslateError, Translator};

/// Client for the public Google Translate endpoint used by browser
/// extensions (`client=gtx`). No credentials are needed.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    source: String,
}

impl GoogleTranslator {
    pub const DEFAULT_ENDPOINT: &'static str =
        "https://translate.googleapis.com/translate_a/single";

    /// `source` is a language code, or `auto` to let the service detect it.
    pub fn new(
        endpoint: impl Into<String>,
        source: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslateError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            source: source.into(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslateError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source.as_str()),
                ("tl", target),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
            .send()
            .await
            .map_err(|e| TranslateError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TranslateError::Malformed(e.to_string()))?;

        parse_google_response(&body)
    }
}

/// Join the translated segments of a `translate_a/single` answer.
///
/// The answer is a nested array whose first element lists the sentence
/// segments as `[translated, original, ...]`. A null segment list means the
/// service had nothing to say and yields an empty string.
pub fn parse_google_response(body: &Value) -> Result<String, TranslateError> {
    let root = body
        .as_array()
        .ok_or_else(|| TranslateError::Malformed("expected a JSON array".to_string()))?;

    let segments = match root.first() {
        Some(Value::Array(segments)) => segments,
        Some(Value::Null) | None => return Ok(String::new()),
        Some(other) => {
            return Err(TranslateError::Malformed(format!(
                "unexpected segment list: {other}"
            )))
        }
    };

    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, routing::post, Form, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_parse_joins_segments() {
        let body = json!([
            [
                ["Hola mundo. ", "Hello world. ", null, null, 10],
                ["Adiós.", "Goodbye.", null, null, 10]
            ],
            null,
            "en"
        ]);
        assert_eq!(parse_google_response(&body).unwrap(), "Hola mundo. Adiós.");
    }

    #[test]
    fn test_parse_null_segments_is_empty() {
        assert_eq!(parse_google_response(&json!([null, null, "en"])).unwrap(), "");
        assert_eq!(parse_google_response(&json!([])).unwrap(), "");
    }

    #[test]
    fn test_parse_rejects_unexpected_shapes() {
        assert!(matches!(
            parse_google_response(&json!({"error": "nope"})),
            Err(TranslateError::Malformed(_))
        ));
        assert!(matches!(
            parse_google_response(&json!(["text"])),
            Err(TranslateError::Malformed(_))
        ));
    }

    async fn handler(
        Query(params): Query<HashMap<String, String>>,
        Form(form): Form<HashMap<String, String>>,
    ) -> Json<Value> {
        let text = form.get("q").cloned().unwrap_or_default();
        let target = params.get("tl").cloned().unwrap_or_default();
        Json(json!([[[format!("{target}:{text}"), text, null, null, 1]], null, "en"]))
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/translate_a/single")
    }

    #[tokio::test]
    async fn test_translate_against_local_endpoint() {
        let endpoint = serve(Router::new().route("/translate_a/single", post(handler))).await;
        let translator = GoogleTranslator::new(endpoint, "auto", Duration::from_secs(5)).unwrap();
        let out = translator.translate("Hello World", "es").await.unwrap();
        assert_eq!(out, "es:Hello World");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let router = Router::new().route(
            "/translate_a/single",
            post(|| async { (axum::http::StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let endpoint = serve(router).await;
        let translator = GoogleTranslator::new(endpoint, "auto", Duration::from_secs(5)).unwrap();
        match translator.translate("Hello", "es").await {
            Err(TranslateError::Status { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let translator =
            GoogleTranslator::new("http://127.0.0.1:1/none", "auto", Duration::from_secs(5))
                .unwrap();
        assert!(matches!(
            translator.translate("Hello", "es").await,
            Err(TranslateError::Transport(_))
        ));
    }
}
