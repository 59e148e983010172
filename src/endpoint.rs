//! Transport-independent half of a call.
//!
//! Both the async and the blocking client build their envelopes and classify
//! responses here; they differ only in how the HTTP round trip is performed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{HttpError, HttpErrorKind, JsonRpcError, Result};
use crate::rpc::{ErrorObject, Params, RpcRequest, JSONRPC_VERSION};

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How request ids are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Integers counting up from 1, shared by all clones of a client.
    #[default]
    Sequential,
    /// Random UUIDv4 strings in 32-character hex form.
    Uuid,
}

#[derive(Debug)]
struct IdGenerator {
    strategy: IdStrategy,
    next: AtomicU64,
}

impl IdGenerator {
    fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            next: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> Value {
        match self.strategy {
            IdStrategy::Sequential => Value::from(self.next.fetch_add(1, Ordering::Relaxed)),
            IdStrategy::Uuid => Value::String(uuid::Uuid::new_v4().simple().to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    url: String,
    printable: String,
    timeout: Duration,
    strict: bool,
    ids: Arc<IdGenerator>,
}

impl Endpoint {
    pub(crate) fn new(url: String, timeout: Duration, strict: bool, ids: IdStrategy) -> Self {
        Self {
            printable: redact_password(&url),
            url,
            timeout,
            strict,
            ids: Arc::new(IdGenerator::new(ids)),
        }
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn printable(&self) -> &str {
        &self.printable
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the envelope for one call, consuming a fresh id.
    pub(crate) fn prepare(&self, method: &str, params: Params) -> RpcRequest {
        let request = RpcRequest::new(method, params, self.ids.next_id());
        tracing::debug!(
            endpoint = %self.printable,
            method,
            params = ?request.params,
            id = %request.id,
            "calling remote method"
        );
        request
    }

    /// Turns the HTTP status and raw body of a response into the call outcome.
    pub(crate) fn finish(&self, request: &RpcRequest, status: StatusCode, body: &str) -> Result<Value> {
        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                body.to_string()
            };
            return Err(HttpError::from_status(status.as_u16(), message).into());
        }

        tracing::debug!(method = %request.method, body, "response data");

        let data: Value = serde_json::from_str(body).map_err(|e| {
            HttpError::malformed(Some(status.as_u16()), format!("expected JSON response: {e}"))
        })?;

        decode_envelope(&request.id, data, self.strict, status.as_u16())
    }
}

/// Classifies a parsed response object against the id of the request it answers.
fn decode_envelope(expected_id: &Value, data: Value, strict: bool, status: u16) -> Result<Value> {
    let Value::Object(mut obj) = data else {
        return Err(HttpError::malformed(Some(status), "response is not a JSON object").into());
    };

    if strict {
        let version = obj.get("jsonrpc").and_then(Value::as_str).unwrap_or_default();
        if version != JSONRPC_VERSION {
            return Err(HttpError::new(
                HttpErrorKind::UnsupportedVersion,
                Some(status),
                format!("unsupported JSON-RPC version {version:?}"),
            )
            .into());
        }
    }

    let error = obj.remove("error").filter(|e| !e.is_null());
    let id = obj.remove("id").unwrap_or(Value::Null);

    // A null id is legitimate on errors raised before the server could read the request id.
    if !same_id(&id, expected_id) && !(error.is_some() && id.is_null()) {
        return Err(HttpError::new(
            HttpErrorKind::IdentifierMismatch,
            Some(status),
            format!("expected response id {expected_id}, got {id}"),
        )
        .into());
    }

    if let Some(error) = error {
        let error: ErrorObject = serde_json::from_value(error).map_err(|e| {
            HttpError::malformed(Some(status), format!("invalid error object: {e}"))
        })?;
        return Err(JsonRpcError::from(error).into());
    }

    obj.remove("result")
        .ok_or_else(|| HttpError::malformed(Some(status), "response has neither result nor error").into())
}

/// Numeric ids compare by value, so a server echoing `1` as `1.0` still matches.
fn same_id(received: &Value, expected: &Value) -> bool {
    match (received.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => received == expected,
    }
}

/// Scheme and user of a URL carrying a password in its authority.
static URL_PASSWORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*://[^/?#@:]*):[^/?#]*@")
        .expect("Invalid URL password regex pattern")
});

/// Masks the password of a URL for display, e.g. in logs.
///
/// Everything but the password is left exactly as given.
pub fn redact_password(url: &str) -> String {
    URL_PASSWORD_REGEX.replace(url, "${1}:*****@").into_owned()
}
