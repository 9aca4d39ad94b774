//! Smoke tests the deployed friends / private chat API over HTTP.
//!
//! Drives every v1 and v2 path with a real bearer token and checks status
//! codes only. A 4xx from a handler that looked at the request and turned
//! it down is as much proof of life as a 200, so anything in the accepted
//! set passes. This is a deployment probe, not a correctness suite.

use clap::Parser;
use log::{error, info};
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the homeserver, e.g. https://matrix.example.com
    #[arg(short, long)]
    base_url: String,

    /// Access token used for the Authorization header
    #[arg(short, long)]
    token: String,

    /// User id to target with friend/chat operations
    #[arg(short, long, default_value_t = String::from("@smoke_test_peer:example.com"))]
    peer: String,
}

const ACCEPTABLE: &[StatusCode] = &[
    StatusCode::OK,
    StatusCode::CREATED,
    StatusCode::BAD_REQUEST,
    StatusCode::UNAUTHORIZED,
    StatusCode::NOT_FOUND,
];

struct Check {
    name: &'static str,
    method: Method,
    path: String,
    body: Option<Value>,
}

impl Check {
    fn new(name: &'static str, method: Method, path: &str, body: Option<Value>) -> Self {
        Self {
            name,
            method,
            path: path.to_string(),
            body,
        }
    }
}

fn checks(peer: &str) -> Vec<Check> {
    let request_body = json!({ "user_id": peer, "message": "smoke test" });
    let settle_body = json!({ "request_id": 1 });
    let remove_body = json!({ "user_id": peer });
    let send_body = json!({
        "friend_id": peer,
        "content": { "msgtype": "m.text", "body": "smoke test" }
    });

    vec![
        // v1 friends
        Check::new("v1 list friends", Method::GET, "/friends/list", None),
        Check::new("v1 list categories", Method::GET, "/friends/categories", None),
        Check::new(
            "v1 pending requests",
            Method::GET,
            "/friends/requests/pending",
            None,
        ),
        Check::new("v1 friend stats", Method::GET, "/friends/stats", None),
        Check::new("v1 friend search", Method::GET, "/friends/search", None),
        Check::new(
            "v1 send request",
            Method::POST,
            "/friends/request",
            Some(request_body.clone()),
        ),
        Check::new(
            "v1 accept request",
            Method::POST,
            "/friends/request/accept",
            Some(settle_body.clone()),
        ),
        Check::new(
            "v1 reject request",
            Method::POST,
            "/friends/request/reject",
            Some(settle_body.clone()),
        ),
        Check::new(
            "v1 remove friend",
            Method::DELETE,
            "/friends/remove",
            Some(remove_body.clone()),
        ),
        // v2 friends
        Check::new("v2 list friends", Method::GET, "/friends/v2/list", None),
        Check::new(
            "v2 send request",
            Method::POST,
            "/friends/v2/request",
            Some(request_body),
        ),
        Check::new(
            "v2 accept request",
            Method::POST,
            "/friends/v2/request/accept",
            Some(settle_body.clone()),
        ),
        Check::new(
            "v2 reject request",
            Method::POST,
            "/friends/v2/request/reject",
            Some(settle_body),
        ),
        Check::new(
            "v2 remove friend",
            Method::DELETE,
            "/friends/v2/remove",
            Some(remove_body),
        ),
        // v1 private chat
        Check::new("v1 list sessions", Method::GET, "/private/sessions", None),
        Check::new(
            "v1 send message",
            Method::POST,
            "/private/send",
            Some(send_body.clone()),
        ),
        Check::new(
            "v1 delete session",
            Method::DELETE,
            "/private/session/1",
            None,
        ),
        // v2 private chat
        Check::new(
            "v2 list sessions",
            Method::GET,
            "/private_chat/v2/sessions",
            None,
        ),
        Check::new(
            "v2 send message",
            Method::POST,
            "/private_chat/v2/send",
            Some(send_body),
        ),
        Check::new(
            "v2 delete session",
            Method::DELETE,
            "/private_chat/v2/session/1",
            None,
        ),
    ]
}

async fn run_check(client: &Client, args: &Args, check: &Check) -> Result<bool, reqwest::Error> {
    let url = format!(
        "{}/_synapse/client/enhanced{}",
        args.base_url.trim_end_matches('/'),
        check.path
    );

    let mut request = client
        .request(check.method.clone(), &url)
        .bearer_auth(&args.token);

    if let Some(body) = &check.body {
        request = request.json(body);
    }

    let status = request.send().await?.status();

    let passed = ACCEPTABLE.contains(&status);

    if passed {
        info!("PASS {} ({} {}) -> {}", check.name, check.method, url, status);
    } else {
        error!("FAIL {} ({} {}) -> {}", check.name, check.method, url, status);
    }

    Ok(passed)
}

#[tokio::main]
async fn main() -> Result<(), reqwest::Error> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let client = Client::new();

    let mut failed = 0usize;
    let checks = checks(&args.peer);

    for check in &checks {
        if !run_check(&client, &args, check).await? {
            failed += 1;
        }
    }

    info!("{}/{} checks passed", checks.len() - failed, checks.len());

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
