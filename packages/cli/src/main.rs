//! `maki` — command-line client for a remote Maki node.
//!
//! - **`enumerate`** — list the resources the node advertises on `OPTIONS /`.
//! - **`get`** / **`options`** — fetch a path and print the JSON answer.
//! - **`put`** / **`post`** / **`patch`** — send a JSON body to a path.
//!
//! The node is chosen with `--host` (or `MAKI_REMOTE_HOST`); `--secure`
//! (or `MAKI_REMOTE_SECURE`) switches to `https`.
//!
//! ```sh
//! maki --host localhost:9200 enumerate
//! maki --host localhost:9200 post /people '{"name":"Ada"}'
//! echo '{"name":"Ada L."}' | maki --host localhost:9200 patch /people/7 -
//! ```

use std::fs;
use std::io::{self, Read};
use std::process;

use clap::{Parser, Subcommand};
use maki_remote::{Fetched, Remote, RemoteConfig};
use serde_json::Value;
use tracing::debug;

/// maki — talk to a remote Maki node
#[derive(Parser)]
#[command(name = "maki", version, about, long_about = None)]
struct Cli {
    /// `hostname[:port]` of the remote node.
    #[arg(long, global = true, env = "MAKI_REMOTE_HOST")]
    host: Option<String>,

    /// Use https instead of http.
    #[arg(long, global = true, env = "MAKI_REMOTE_SECURE")]
    secure: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the resources the node exposes.
    ///
    /// Prints a JSON array of normalized resource descriptors. A node that
    /// cannot be reached yields `[]`.
    Enumerate,

    /// GET a path.
    Get { path: String },

    /// OPTIONS a path.
    Options { path: String },

    /// PUT a JSON body to a path.
    Put {
        path: String,
        /// JSON text, `@FILE` to read a file, or `-` for stdin.
        body: String,
    },

    /// POST a JSON body to a path, following a 303 to the created entity.
    Post {
        path: String,
        /// JSON text, `@FILE` to read a file, or `-` for stdin.
        body: String,
    },

    /// PATCH a path with a partial JSON body.
    Patch {
        path: String,
        /// JSON text, `@FILE` to read a file, or `-` for stdin.
        body: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maki=info,maki_remote=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = RemoteConfig::from_env();
    if cli.host.is_some() {
        config.host = cli.host;
    }
    config.secure |= cli.secure;
    debug!("maki: talking to {}", target(&config));

    let remote = Remote::new(config)
        .unwrap_or_else(|e| fatal(&format!("failed to build HTTP client: {e}")));

    match cli.command {
        Command::Enumerate => match remote.enumerate().await {
            Ok(resources) => print_json(&serde_json::to_value(resources).unwrap_or_default()),
            Err(e) => fail(&e.to_string()),
        },
        Command::Get { path } => report(remote.get(&path).await),
        Command::Options { path } => report(remote.options(&path).await),
        Command::Put { path, body } => report(remote.put(&path, &read_body(&body)).await),
        Command::Post { path, body } => report(remote.post(&path, &read_body(&body)).await),
        Command::Patch { path, body } => report(remote.patch(&path, &read_body(&body)).await),
    }
}

/// `scheme://host` of the configured node, for diagnostics.
fn target(config: &RemoteConfig) -> String {
    let scheme = if config.secure { "https" } else { "http" };
    match config.host.as_deref() {
        Some(host) if !host.is_empty() => format!("{scheme}://{host}"),
        _ => format!("{scheme}://<no host>"),
    }
}

/// Print the decoded body; an empty body prints nothing.
fn report(result: Fetched) {
    match result {
        Ok(Some(body)) => print_json(&body),
        Ok(None) => {}
        Err(e) => fail(&e.to_string()),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => fail(&e.to_string()),
    }
}

/// Resolve a BODY argument into JSON.
fn read_body(arg: &str) -> Value {
    let text = if arg == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {e}")));
        buf
    } else if let Some(path) = arg.strip_prefix('@') {
        fs::read_to_string(path)
            .unwrap_or_else(|e| fatal(&format!("failed to read {path}: {e}")))
    } else {
        arg.to_string()
    };
    parse_body(&text).unwrap_or_else(|e| fatal(&e))
}

fn parse_body(text: &str) -> Result<Value, String> {
    serde_json::from_str(text).map_err(|e| format!("body is not valid JSON: {e}"))
}

/// The request went out but failed: exit 1.
fn fail(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Bad invocation or unreadable input: exit 2.
fn fatal(msg: &str) -> ! {
    eprintln!("maki: {msg}");
    process::exit(2);
}
