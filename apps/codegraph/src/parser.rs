//! # AST Parser Client
//!
//! Blocking HTTP client for the syntax tree parsing service.
//!
//! Protocol: `GET /version` as a handshake, then one `POST /parse` per file.

use codegraph_core::{AstNode, AstParser, CodegraphError, ParseError, ParsedAst};
use serde::Deserialize;
use std::time::Duration;

/// Parse mode requested from the service.
const PARSE_MODE: &str = "semantic";

/// Body of a `POST /parse` response.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParseResponse {
    status: String,
    language: String,
    uast: Option<serde_json::Value>,
    errors: Vec<String>,
}

/// Client bound to one parser service.
#[derive(Debug, Clone)]
pub struct ParserClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl ParserClient {
    /// Connect to `address` (`host:port` or URL) and check that the service
    /// answers within `timeout_secs`.
    pub fn connect(address: &str, timeout_secs: u64) -> Result<Self, CodegraphError> {
        let base_url = normalize_address(address);
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CodegraphError::ParserUnavailable(e.to_string()))?;

        let client = Self { http, base_url };
        let version = client.version()?;
        tracing::info!(url = %client.base_url, version = %version, "Connected to parser");
        Ok(client)
    }

    /// GET /version
    fn version(&self) -> Result<String, CodegraphError> {
        let unavailable = |e: reqwest::Error| {
            CodegraphError::ParserUnavailable(format!("{}: {e}", self.base_url))
        };

        let resp = self
            .http
            .get(format!("{}/version", self.base_url))
            .send()
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;
        let body: serde_json::Value = resp.json().map_err(unavailable)?;
        Ok(body
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string())
    }
}

/// Normalize an address into a base URL without a trailing slash.
fn normalize_address(address: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}

/// Map service error strings onto the parse error kinds.
fn classify_errors(errors: &[String]) -> ParseError {
    let joined = errors.join("; ");
    if errors.iter().any(|e| e.contains("missing driver for language")) {
        ParseError::UnsupportedLanguage(joined)
    } else if errors.iter().any(|e| e.contains("unknown source file encoding")) {
        ParseError::InvalidEncoding(joined)
    } else if joined.is_empty() {
        ParseError::Other("parser returned no tree".to_string())
    } else {
        ParseError::Other(joined)
    }
}

fn into_parsed(resp: ParseResponse) -> Result<ParsedAst, ParseError> {
    let failed = !resp.errors.is_empty() || (!resp.status.is_empty() && resp.status != "ok");
    let uast = match resp.uast {
        Some(uast) if !failed && !uast.is_null() => uast,
        _ => return Err(classify_errors(&resp.errors)),
    };

    let root = AstNode::from_json(uast).map_err(|e| ParseError::Other(e.to_string()))?;
    Ok(ParsedAst {
        root,
        language: (!resp.language.is_empty()).then_some(resp.language),
    })
}

impl AstParser for ParserClient {
    fn parse(
        &self,
        filename: &str,
        content: &[u8],
        hint: Option<&str>,
    ) -> Result<ParsedAst, ParseError> {
        let content = std::str::from_utf8(content)
            .map_err(|e| ParseError::InvalidEncoding(format!("{filename}: {e}")))?;

        let body = serde_json::json!({
            "filename": filename,
            "content": content,
            "language": hint.unwrap_or(""),
            "mode": PARSE_MODE,
        });
        let resp = self
            .http
            .post(format!("{}/parse", self.base_url))
            .json(&body)
            .send()
            .map_err(|e| ParseError::Other(format!("{}: {e}", self.base_url)))?;

        let status = resp.status();
        if status.is_server_error() {
            let text = resp.text().unwrap_or_default();
            return Err(ParseError::Other(format!("server error ({status}): {text}")));
        }
        let parsed: ParseResponse = resp
            .json()
            .map_err(|e| ParseError::Other(format!("bad response for {filename}: {e}")))?;
        into_parsed(parsed)
    }
}
