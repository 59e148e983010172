//! Damn simple JSON-RPC 2.0 client over HTTP.
//!
//! A [`Client`] holds an endpoint URL and turns each call into one JSON-RPC
//! request sent with an HTTP POST. The `result` member of the response is
//! returned as is; failures come back as one of two kinds:
//!
//! - [`HttpError`]: the HTTP exchange failed (connection refused, timeout,
//!   non-2xx status) or the body was not a valid JSON-RPC response.
//! - [`JsonRpcError`]: the server answered with a JSON-RPC error object.
//!
//! ```no_run
//! # async fn run() {
//! use jsonrpcproxy::{Client, Error};
//! use serde_json::json;
//!
//! let client = Client::new("http://calc.example/jsonrpc");
//!
//! match client.method("div").call(vec![json!(18), json!(3)]).await {
//!     Ok(quotient) => println!("18 / 3 = {}", quotient),
//!     Err(Error::Http(err)) => eprintln!("transport failed: {}", err),
//!     Err(Error::JsonRpc(err)) => eprintln!("server error {}: {:?}", err.code, err.data),
//! }
//! # }
//! ```
//!
//! [`blocking::Client`] offers the same calls without an async runtime.

pub mod blocking;
pub mod client;
mod endpoint;
pub mod error;
pub mod rpc;

pub use client::{Client, ClientBuilder, Method};
pub use endpoint::{redact_password, IdStrategy};
pub use error::{Error, ErrorKind, HttpError, HttpErrorKind, JsonRpcError, Result};
pub use rpc::Params;

/// Former name of [`Client`].
pub type ServiceProxy = Client;
