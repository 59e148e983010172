use std::fmt;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::blocking;
use crate::endpoint::{Endpoint, IdStrategy, DEFAULT_TIMEOUT};
use crate::error::Result;
use crate::rpc::{Params, RpcRequest};

/// JSON-RPC 2.0 client for one HTTP endpoint.
///
/// Every call is a single POST; nothing is retried or cached. Cloning is cheap
/// and clones share the connection pool and the request-id counter.
///
/// ```no_run
/// # async fn run() -> jsonrpcproxy::Result<()> {
/// use jsonrpcproxy::Client;
/// use serde_json::json;
///
/// let client = Client::new("http://calc.example/jsonrpc");
/// let sum = client.invoke("add", vec![json!(2), json!(4)]).await?;
/// assert_eq!(sum, json!(6));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    endpoint: Endpoint,
}

impl Client {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::builder(endpoint).build()
    }

    pub fn builder(endpoint: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(endpoint)
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
    pub async fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        self.invoke_with(method, Params::Positional(args)).await
    }

    /// Calls `method` with keyword arguments, sent as a JSON object.
    pub async fn invoke_named(&self, method: &str, kwargs: Map<String, Value>) -> Result<Value> {
        self.invoke_with(method, Params::Named(kwargs)).await
    }

    pub async fn invoke_with(&self, method: &str, params: Params) -> Result<Value> {
        let request = self.endpoint.prepare(method, params);
        self.send(&request).await.inspect_err(|err| {
            tracing::debug!(endpoint = %self.endpoint.printable(), method, %err, "remote call failed");
        })
    }

    async fn send(&self, request: &RpcRequest) -> Result<Value> {
        let response = self
            .http
            .post(self.endpoint.url())
            .timeout(self.endpoint.timeout())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        self.endpoint.finish(request, status, &body)
    }
}

/// Configures a [`Client`] or a [`blocking::Client`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    endpoint: String,
    timeout: Duration,
    strict: bool,
    ids: IdStrategy,
}

impl ClientBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
            strict: true,
            ids: IdStrategy::default(),
        }
    }

    /// Per-request timeout. Defaults to 10 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject responses whose `jsonrpc` member is not "2.0". On by default.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn ids(mut self, ids: IdStrategy) -> Self {
        self.ids = ids;
        self
    }

    pub fn build(self) -> Client {
        Client {
            http: reqwest::Client::new(),
            endpoint: self.into_endpoint(),
        }
    }

    /// Builds the synchronous client. Must not be called from within an async runtime.
    pub fn build_blocking(self) -> blocking::Client {
        blocking::Client::from_endpoint(self.into_endpoint())
    }

    fn into_endpoint(self) -> Endpoint {
        Endpoint::new(self.endpoint, self.timeout, self.strict, self.ids)
    }
}

/// A named remote method bound to a [`Client`].
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

    pub async fn call(&self, args: Vec<Value>) -> Result<Value> {
        self.client.invoke(&self.name, args).await
    }

    pub async fn call_named(&self, kwargs: Map<String, Value>) -> Result<Value> {
        self.client.invoke_named(&self.name, kwargs).await
    }
}

impl fmt::Display for Method<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
