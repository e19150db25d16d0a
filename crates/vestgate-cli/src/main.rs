//! `vestgate`: operator tool for the document passcode gate.
//!
//! Hashes codes for the allow-list, checks candidates, inspects and edits
//! the session access flag (kept in a JSON file standing in for browser
//! session storage), and issues HTTP requests through the timeout and retry
//! wrappers.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use vestgate_client::{CacheHint, FetchOptions, Fetcher};
use vestgate_core::access::{AccessStatus, AccessStore};
use vestgate_core::passcode::{self, PasscodeVerifier};
use vestgate_storage::FileBackend;

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

// ── CLI structure ────────────────────────────────────────────────────

/// Vestgate: document passcode gate and resilient fetch.
#[derive(Parser)]
#[command(
    name = "vestgate",
    version,
    about = "Vestgate CLI — passcode hashing, document access sessions, and retrying HTTP fetch",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         VESTGATE_SESSION_FILE     Session flag file (default: .vestgate-session.json)\n  \
         VESTGATE_PASSCODE_HASHES  Comma-separated allow-list digests\n  \
         VESTGATE_LOG_LEVEL        Log filter when RUST_LOG is unset (default: warn)\n\n\
         {DIM}Examples:{RESET}\n  \
         vestgate hash access2025\n  \
         vestgate verify ACCESS2025 --grant\n  \
         vestgate access status\n  \
         vestgate fetch https://api.example.com/properties --no-store"
    ),
)]
struct Cli {
    /// Session flag file.
    #[arg(
        long,
        env = "VESTGATE_SESSION_FILE",
        default_value = ".vestgate-session.json",
        global = true
    )]
    session_file: PathBuf,

    /// JSON array of allow-list digests. Overrides VESTGATE_PASSCODE_HASHES.
    #[arg(long, global = true)]
    allow_list: Option<PathBuf>,

    /// Comma-separated allow-list digests.
    #[arg(long, env = "VESTGATE_PASSCODE_HASHES", hide_env_values = true, global = true)]
    hashes: Option<String>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, env = "VESTGATE_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the allow-list digest for a passcode.
    Hash {
        /// Plaintext passcode (normalized before hashing).
        plain: String,
    },
    /// Check a passcode against the allow-list.
    Verify {
        /// Candidate passcode.
        candidate: String,
        /// Record a session grant when the passcode is accepted.
        #[arg(long, default_value = "false")]
        grant: bool,
    },
    /// Inspect or change the session access flag.
    Access {
        #[command(subcommand)]
        action: AccessCommands,
    },
    /// Send an HTTP request with per-attempt timeout and retry on 5xx/errors.
    Fetch {
        /// Request URL.
        url: String,
        /// HTTP method.
        #[arg(long, short = 'X', default_value = "GET")]
        method: String,
        /// Request header as 'Name: value'. Repeatable.
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,
        /// Request body.
        #[arg(long, short = 'd')]
        data: Option<String>,
        /// Send Cache-Control: no-store.
        #[arg(long, default_value = "false")]
        no_store: bool,
        /// Per-attempt deadline in milliseconds.
        #[arg(long, env = "VESTGATE_TIMEOUT_MS", default_value = "10000")]
        timeout_ms: u64,
        /// Retries after the first attempt.
        #[arg(long, env = "VESTGATE_MAX_RETRIES", default_value = "2")]
        max_retries: u32,
    },
}

#[derive(Subcommand)]
enum AccessCommands {
    /// Show whether document access is currently granted.
    Status,
    /// Grant document access for the next 60 seconds.
    Grant,
    /// Revoke document access.
    Revoke,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    config::init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let access = AccessStore::new(FileBackend::new(&cli.session_file));

    match cli.command {
        Commands::Hash { plain } => cmd_hash(&plain),
        Commands::Verify { candidate, grant } => {
            let allow_list =
                config::resolve_allow_list(cli.allow_list.as_deref(), cli.hashes.as_deref())?;
            cmd_verify(&PasscodeVerifier::new(allow_list), &access, &candidate, grant).await
        }
        Commands::Access { action } => cmd_access(&access, action).await,
        Commands::Fetch {
            url,
            method,
            headers,
            data,
            no_store,
            timeout_ms,
            max_retries,
        } => {
            let mut opts = FetchOptions::method(method);
            for raw in &headers {
                let (name, value) = config::parse_header(raw)?;
                opts = opts.header(name, value);
            }
            if let Some(body) = data {
                opts = opts.body(body);
            }
            if no_store {
                opts = opts.cache(CacheHint::NoStore);
            }
            cmd_fetch(&url, &opts, config::retry_policy(timeout_ms, max_retries)).await
        }
    }
}

// ── Commands ─────────────────────────────────────────────────────────

fn cmd_hash(plain: &str) -> Result<ExitCode> {
    let digest = passcode::generate_hash(plain).context("failed to hash passcode")?;
    println!("{digest}");
    Ok(ExitCode::SUCCESS)
}

async fn cmd_verify(
    verifier: &PasscodeVerifier,
    access: &AccessStore<FileBackend>,
    candidate: &str,
    grant: bool,
) -> Result<ExitCode> {
    if !verifier.verify(candidate) {
        println!("  {RED}✗{RESET} access denied");
        return Ok(ExitCode::FAILURE);
    }

    println!("  {GREEN}✓{RESET} access granted");
    if grant {
        access
            .grant()
            .await
            .context("failed to record document access")?;
        println!("  {DIM}session flag written to {}{RESET}", access.storage().path().display());
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_access(access: &AccessStore<FileBackend>, action: AccessCommands) -> Result<ExitCode> {
    match action {
        AccessCommands::Status => match access.status().await {
            AccessStatus::Verified { remaining, .. } => {
                println!(
                    "  {GREEN}●{RESET} verified {DIM}({}s remaining){RESET}",
                    remaining.as_secs()
                );
            }
            AccessStatus::Unverified => {
                println!("  {YELLOW}○{RESET} unverified");
            }
        },
        AccessCommands::Grant => {
            access
                .grant()
                .await
                .context("failed to record document access")?;
            println!("  {GREEN}✓{RESET} access granted");
        }
        AccessCommands::Revoke => {
            access
                .revoke()
                .await
                .context("failed to revoke document access")?;
            println!("  {GREEN}✓{RESET} access revoked");
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_fetch(
    url: &str,
    opts: &FetchOptions,
    policy: vestgate_client::RetryPolicy,
) -> Result<ExitCode> {
    let fetcher = Fetcher::with_policy(policy).context("failed to build HTTP client")?;
    let resp = fetcher
        .fetch(url, opts)
        .await
        .with_context(|| format!("request to {url} failed"))?;

    let status = resp.status();
    let body = resp.text().await.context("failed to read response body")?;

    println!("HTTP {}", status.as_u16());
    if !body.is_empty() {
        println!("{body}");
    }

    if status.is_client_error() || status.is_server_error() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
