//! Synchronous client: each call blocks the current thread until the HTTP
//! round trip completes or fails.
//!
//! Like `reqwest::blocking`, this client must not be created or used from
//! inside an async runtime.

use std::fmt;

use serde_json::{Map, Value};

use crate::client::ClientBuilder;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::rpc::{Params, RpcRequest};

/// Synchronous JSON-RPC 2.0 client for one HTTP endpoint.
///
/// Every call is a single POST; nothing is retried or cached. Clones share the
/// connection pool and the request-id counter.
///
/// ```no_run
/// use jsonrpcproxy::blocking::Client;
/// use serde_json::json;
///
/// let client = Client::new("http://calc.example/jsonrpc");
/// let sum = client.invoke("add", vec![json!(2), json!(4)])?;
/// assert_eq!(sum, json!(6));
/// # Ok::<(), jsonrpcproxy::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::blocking::Client,
    endpoint: Endpoint,
}

impl Client {
    pub fn new(endpoint: impl Into<String>) -> Self {
        ClientBuilder::new(endpoint).build_blocking()
    }

    pub(crate) fn from_endpoint(endpoint: Endpoint) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.url()
    }

    /// The endpoint with any password masked.
    pub fn printable_endpoint(&self) -> &str {
        self.endpoint.printable()
    }

    /// Handle for the remote method `name`; see [`Method::method`] for dotted names.
    pub fn method(&self, name: impl Into<String>) -> Method<'_> {
        Method {
            client: self,
            name: name.into(),
        }
    }

    /// Calls `method` with positional arguments.
    pub fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        self.invoke_with(method, Params::Positional(args))
    }

    /// Calls `method` with keyword arguments, sent as a JSON object.
    pub fn invoke_named(&self, method: &str, kwargs: Map<String, Value>) -> Result<Value> {
        self.invoke_with(method, Params::Named(kwargs))
    }

    pub fn invoke_with(&self, method: &str, params: Params) -> Result<Value> {
        let request = self.endpoint.prepare(method, params);
        self.send(&request).inspect_err(|err| {
            tracing::debug!(endpoint = %self.endpoint.printable(), method, %err, "remote call failed");
        })
    }

    fn send(&self, request: &RpcRequest) -> Result<Value> {
        let response = self
            .http
            .post(self.endpoint.url())
            .timeout(self.endpoint.timeout())
            .json(request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        self.endpoint.finish(request, status, &body)
    }
}

/// A named remote method bound to a blocking [`Client`].
#[derive(Debug, Clone)]
pub struct Method<'a> {
    client: &'a Client,
    name: String,
}

impl<'a> Method<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &'a Client {
        self.client
    }

    /// Nested method: `client.method("math").method("add")` calls `math.add`.
    pub fn method(&self, name: &str) -> Method<'a> {
        Method {
            client: self.client,
            name: format!("{}.{}", self.name, name),
        }
    }

    pub fn call(&self, args: Vec<Value>) -> Result<Value> {
        self.client.invoke(&self.name, args)
    }

    pub fn call_named(&self, kwargs: Map<String, Value>) -> Result<Value> {
        self.client.invoke_named(&self.name, kwargs)
    }
}

impl fmt::Display for Method<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
