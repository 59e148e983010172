//! Calculator JSON-RPC server used by the integration tests.
//!
//! Routes:
//! - `/jsonrpc`: well-behaved server (`add`, `div`, `sub`, `math.mul`, `echo`, `void`)
//! - `/envelope`: answers with the request envelope and its content type
//! - `/status500`, `/garbage`, `/wrong-id`, `/legacy`, `/null-id-error`, `/slow`:
//!   misbehaving servers, one failure mode each
#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use warp::http::StatusCode;
use warp::Filter;

#[derive(Deserialize, Debug)]
pub struct ServerRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    pub id: Value,
}

#[derive(Serialize, Debug)]
struct ServerResponse {
    jsonrpc: String,
    result: Value,
    id: Value,
}

#[derive(Serialize, Debug)]
struct ServerError {
    jsonrpc: String,
    error: ErrorBody,
    id: Value,
}

#[derive(Serialize, Debug)]
struct ErrorBody {
    code: i64,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn reply(result: Value, id: Value) -> warp::reply::Json {
    warp::reply::json(&ServerResponse {
        jsonrpc: "2.0".into(),
        result,
        id,
    })
}

fn make_error(code: i64, message: &str, data: Option<Value>, id: Value) -> warp::reply::Json {
    warp::reply::json(&ServerError {
        jsonrpc: "2.0".into(),
        error: ErrorBody {
            code,
            message: message.into(),
            data,
        },
        id,
    })
}

fn handle_rpc(req: ServerRequest) -> warp::reply::Json {
    let args: Vec<i64> = match &req.params {
        Value::Array(values) => values.iter().filter_map(Value::as_i64).collect(),
        _ => Vec::new(),
    };

    match req.method.as_str() {
        "add" => reply(json!(args.iter().sum::<i64>()), req.id),
        "math.mul" => reply(json!(args.iter().product::<i64>()), req.id),
        "div" => match args.as_slice() {
            [_, 0] => make_error(-32000, "Division error", Some(json!("divide by zero")), req.id),
            [a, b] => reply(json!(a / b), req.id),
            _ => make_error(-32602, "Invalid params", None, req.id),
        },
        "sub" => {
            let named = req.params.as_object().and_then(|params| {
                Some((params.get("a")?.as_i64()?, params.get("b")?.as_i64()?))
            });
            match named {
                Some((a, b)) => reply(json!(a - b), req.id),
                None => make_error(-32602, "Invalid params", None, req.id),
            }
        }
        "echo" => reply(req.params, req.id),
        "void" => reply(Value::Null, req.id),
        _ => make_error(-32601, "Method not found", None, req.id),
    }
}

pub fn routes() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone + Send + Sync + 'static {
    let rpc = warp::path("jsonrpc")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::header::exact("content-type", "application/json"))
        .and(warp::body::json())
        .map(handle_rpc);

    let envelope = warp::path("envelope")
        .and(warp::post())
        .and(warp::header::optional::<String>("content-type"))
        .and(warp::body::bytes())
        .map(|content_type: Option<String>, body: warp::hyper::body::Bytes| {
            let envelope: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            let id = envelope["id"].clone();
            reply(json!({"content_type": content_type, "envelope": envelope}), id)
        });

    let status500 = warp::path("status500")
        .map(|| warp::reply::with_status("internal failure", StatusCode::INTERNAL_SERVER_ERROR));

    let garbage = warp::path("garbage").map(|| "this is not json");

    let wrong_id = warp::path("wrong-id")
        .and(warp::body::json())
        .map(|_req: ServerRequest| reply(json!(6), json!("someone-else")));

    let legacy = warp::path("legacy")
        .and(warp::body::json())
        .map(|req: ServerRequest| {
            warp::reply::json(&json!({"jsonrpc": "1.0", "result": 6, "id": req.id}))
        });

    let null_id_error = warp::path("null-id-error")
        .map(|| make_error(-32700, "Parse error", None, Value::Null));

    let slow = warp::path("slow")
        .and(warp::body::json())
        .and_then(|req: ServerRequest| async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok::<_, Infallible>(reply(json!(6), req.id))
        });

    rpc.or(envelope)
        .or(status500)
        .or(garbage)
        .or(wrong_id)
        .or(legacy)
        .or(null_id_error)
        .or(slow)
}

/// Serves the test routes on an ephemeral port of the current runtime.
pub async fn spawn() -> SocketAddr {
    let (addr, server) = warp::serve(routes()).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

/// Serves the test routes from a runtime on its own thread, for blocking clients.
pub fn spawn_on_thread() -> SocketAddr {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("failed to build runtime");
        runtime.block_on(async move {
            let (addr, server) = warp::serve(routes()).bind_ephemeral(([127, 0, 0, 1], 0));
            tx.send(addr).expect("test thread went away");
            server.await;
        });
    });
    rx.recv().expect("server thread did not start")
}

pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}/{}", addr, path)
}

/// An address nothing listens on.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    listener.local_addr().expect("no local addr")
}
