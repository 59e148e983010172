use serde_json::Value;
use thiserror::Error;

use crate::rpc::{
    ErrorObject, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
    SERVER_ERROR_RANGE,
};

/// Outcome of a failed call: the HTTP exchange broke, or the server answered
/// with a JSON-RPC error object. Never both.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    JsonRpc(#[from] JsonRpcError),
}

impl Error {
    pub fn as_http(&self) -> Option<&HttpError> {
        match self {
            Error::Http(err) => Some(err),
            Error::JsonRpc(_) => None,
        }
    }

    pub fn as_json_rpc(&self) -> Option<&JsonRpcError> {
        match self {
            Error::JsonRpc(err) => Some(err),
            Error::Http(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    /// The server answered with a non-2xx status.
    Status,
    /// No connection could be established.
    Connect,
    /// The request did not complete within the configured timeout.
    Timeout,
    /// Any other failure while sending the request or reading the body.
    Request,
    /// The body was not a JSON-RPC response object.
    MalformedResponse,
    /// The response declared a `jsonrpc` version other than "2.0".
    UnsupportedVersion,
    /// The response id does not match the request id.
    IdentifierMismatch,
}

/// Failure below the JSON-RPC layer.
///
/// `status` is `None` when no HTTP response was received at all.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("HTTP error ({}): {message}", .status.map_or_else(|| "no status".to_string(), |s| s.to_string()))]
pub struct HttpError {
    pub kind: HttpErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl HttpError {
    pub fn new(kind: HttpErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Status, Some(status), message)
    }

    pub fn malformed(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::MalformedResponse, status, message)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == HttpErrorKind::Timeout
    }

    pub fn is_connect(&self) -> bool {
        self.kind == HttpErrorKind::Connect
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            HttpErrorKind::Timeout
        } else if err.is_connect() {
            HttpErrorKind::Connect
        } else {
            HttpErrorKind::Request
        };
        HttpError::new(kind, err.status().map(|s| s.as_u16()), err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.into())
    }
}

/// Standard meaning of a JSON-RPC error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    /// Implementation-defined server error, -32099 to -32000.
    ServerError,
    Unknown,
}

impl ErrorKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            PARSE_ERROR => ErrorKind::ParseError,
            INVALID_REQUEST => ErrorKind::InvalidRequest,
            METHOD_NOT_FOUND => ErrorKind::MethodNotFound,
            INVALID_PARAMS => ErrorKind::InvalidParams,
            INTERNAL_ERROR => ErrorKind::InternalError,
            c if SERVER_ERROR_RANGE.contains(&c) => ErrorKind::ServerError,
            _ => ErrorKind::Unknown,
        }
    }
}

/// An error object reported by the remote service, passed through unmodified.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("JSON-RPC error {code}: {message}")]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_code(self.code)
    }
}

impl From<ErrorObject> for JsonRpcError {
    fn from(obj: ErrorObject) -> Self {
        Self::new(obj.code, obj.message, obj.data)
    }
}
