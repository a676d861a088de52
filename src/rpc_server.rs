//! Jumper RPC server: NDJSON over stdin/stdout for the extension host.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"views.apply", "params":{"view_id":"saved"}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Fire-and-forget messages are sent without an `id` and get no response.
//! Every line goes through the typed message channel; the app itself is only
//! touched by the channel's serve loop.

use std::path::PathBuf;
use std::time::Instant;

use jumper::app::App;
use jumper::platform;
use jumper::rpc_handler::{handle_request, route};
use jumper::services::messaging::{self, MessageChannel};

use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const CHANNEL_CAPACITY: usize = 64;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn db_path() -> PathBuf {
    match std::env::var("JUMPER_DATA_DIR") {
        Ok(dir) => PathBuf::from(dir).join("jumper.db"),
        Err(_) => platform::get_data_dir().join("jumper.db"),
    }
}

async fn respond(out: &mut io::Stdout, response: &Value) -> std::io::Result<()> {
    out.write_all(format!("{}\n", response).as_bytes()).await?;
    out.flush().await
}

/// Reads stdin until EOF, one message per line. Dropping `channel` on return
/// ends the serve loop.
async fn read_lines(channel: MessageChannel) {
    let mut out = io::stdout();
    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")});
    if respond(&mut out, &ready).await.is_err() {
        return;
    }

    let mut rate_limiter = RateLimiter::new(200);
    let mut lines = BufReader::new(io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unparseable request line");
                let err = json!({"id": null, "error": format!("parse error: {}", e)});
                if respond(&mut out, &err).await.is_err() {
                    break;
                }
                continue;
            }
        };

        let id = req.get("id").cloned();

        if !rate_limiter.check() {
            warn!("rate limit exceeded");
            if let Some(id) = id {
                if respond(&mut out, &json!({"id": id, "error": "rate limit exceeded"})).await.is_err() {
                    break;
                }
            }
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(Value::Null);

        if let Some(response) = route(&channel, id, method, &params).await {
            if respond(&mut out, &response).await.is_err() {
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let path = db_path();
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!(dir = %parent.display(), error = %e, "could not create data directory");
        }
    }
    let mut app = match App::new(&path.to_string_lossy()) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "failed to initialize jumper");
            std::process::exit(1);
        }
    };
    info!(db = %path.display(), "jumper rpc server started");

    let (channel, receiver) = messaging::channel(CHANNEL_CAPACITY);
    let reader = tokio::spawn(read_lines(channel));

    let handled = receiver.serve(|request| handle_request(&mut app, request)).await;
    if let Err(e) = reader.await {
        warn!(error = %e, "stdin reader stopped abnormally");
    }
    info!(handled, "jumper rpc server stopped");
}
