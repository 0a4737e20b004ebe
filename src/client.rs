//! HTTP client for the ledger service
//!
//! Every call goes through one request path so transport failures, non-2xx
//! answers and undecodable bodies come back as the same [`ClientError`]
//! shapes regardless of the endpoint.

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::types::*;
use crate::Result;

/// Longest raw error body shown verbatim when it carries no message record
const MAX_RAW_ERROR_LEN: usize = 200;

pub struct LedgerClient {
    /// reqwest::Client is internally Arc-based
    http: reqwest::Client,
    base: Url,
}

impl LedgerClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base = Url::parse(&config.ledger_url).map_err(|e| {
            ClientError::validation(format!("invalid ledger URL '{}': {}", config.ledger_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::validation(format!(
                "ledger URL '{}' cannot carry paths",
                config.ledger_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// GET /wallet
    pub async fn issue_wallet(&self) -> Result<IssuedWallet> {
        self.get(&["wallet"]).await
    }

    /// GET /chain
    pub async fn fetch_chain(&self) -> Result<ChainSnapshot> {
        self.get(&["chain"]).await
    }

    /// GET /address/{address}
    pub async fn fetch_address(&self, address: &str) -> Result<AddressView> {
        self.get(&["address", address]).await
    }

    /// GET /block/{index}
    pub async fn fetch_block(&self, index: u64) -> Result<Block> {
        self.get(&["block", &index.to_string()]).await
    }

    /// POST /transactions/sign
    pub async fn sign_transfer(&self, request: &SignRequest<'_>) -> Result<SignResponse> {
        self.post(&["transactions", "sign"], request).await
    }

    /// POST /transactions/new
    pub async fn submit_transfer(&self, request: &SubmitRequest<'_>) -> Result<ActionResult> {
        self.post(&["transactions", "new"], request).await
    }

    /// POST /mint
    pub async fn mint(&self, request: &MintRequest<'_>) -> Result<ActionResult> {
        self.post(&["mint"], request).await
    }

    /// POST /forge
    pub async fn forge(&self, request: &ForgeRequest<'_>) -> Result<ActionResult> {
        self.post(&["forge"], request).await
    }

    /// POST /nodes/register
    pub async fn register_nodes(&self, nodes: &[String]) -> Result<ActionResult> {
        self.post(&["nodes", "register"], &RegisterNodesRequest { nodes })
            .await
    }

    /// GET /nodes/resolve
    pub async fn resolve_chain(&self) -> Result<ActionResult> {
        self.get(&["nodes", "resolve"]).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::validation("ledger URL cannot carry paths"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        log::debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    async fn post<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        log::debug!("POST {}", url);
        let response = self.http.post(url).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        log::debug!("Ledger answered {}: {}", status, message);
        return Err(ClientError::Service {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

/// Message to show for a non-2xx answer
///
/// Prefers the error record's `message` (or `error`), then a short plain-text
/// body, then a generic status line.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(record) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = record.message.or(record.error) {
            if !message.trim().is_empty() {
                return message;
            }
        }
    }

    let trimmed = body.trim();
    let looks_structured = trimmed.starts_with('{') || trimmed.starts_with('<');
    if !trimmed.is_empty() && !looks_structured && trimmed.len() <= MAX_RAW_ERROR_LEN {
        return trimmed.to_string();
    }

    match status.canonical_reason() {
        Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
        None => format!("HTTP {}", status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_record() {
        let msg = error_message(
            StatusCode::BAD_REQUEST,
            r#"{"message": "Minting failed. Invalid solution or already solved."}"#,
        );
        assert_eq!(msg, "Minting failed. Invalid solution or already solved.");

        let msg = error_message(StatusCode::CONFLICT, r#"{"error": "duplicate"}"#);
        assert_eq!(msg, "duplicate");
    }

    #[test]
    fn test_error_message_plain_text_body() {
        let msg = error_message(StatusCode::BAD_REQUEST, "Missing values in transaction data");
        assert_eq!(msg, "Missing values in transaction data");
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "HTTP 500 Internal Server Error"
        );
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, "<html><body>nope</body></html>"),
            "HTTP 404 Not Found"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, r#"{"detail": "upstream"}"#),
            "HTTP 502 Bad Gateway"
        );
    }

    #[test]
    fn test_endpoint_joins_and_encodes_segments() {
        let client = LedgerClient::new(&ClientConfig::with_ledger_url("http://ledger.test/api/"))
            .unwrap();
        let url = client.endpoint(&["address", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://ledger.test/api/address/a%20b%2Fc");

        let client = LedgerClient::new(&ClientConfig::with_ledger_url("http://ledger.test")).unwrap();
        let url = client.endpoint(&["transactions", "sign"]).unwrap();
        assert_eq!(url.as_str(), "http://ledger.test/transactions/sign");
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        let err = LedgerClient::new(&ClientConfig::with_ledger_url("not a url"))
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
