//! Runtime configuration for the `vestgate` binary.
//!
//! Resolves the passcode allow-list and the fetch policy from command-line
//! flags and `VESTGATE_*` environment variables, and installs the log
//! subscriber.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use vestgate_client::RetryPolicy;
use vestgate_core::passcode::AllowList;

/// Install a stderr log subscriber. `RUST_LOG` wins over `level`.
pub fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Pick the allow-list source.
///
/// Priority: `--allow-list` JSON file > `VESTGATE_PASSCODE_HASHES` >
/// built-in list.
pub fn resolve_allow_list(file: Option<&Path>, hashes: Option<&str>) -> Result<AllowList> {
    let list = if let Some(path) = file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read allow-list {}", path.display()))?;
        AllowList::from_json(&raw)
            .with_context(|| format!("failed to parse allow-list {}", path.display()))?
    } else if let Some(hashes) = hashes.filter(|h| !h.trim().is_empty()) {
        AllowList::from_csv(hashes)
    } else {
        AllowList::default()
    };

    if list.configured() == 0 {
        warn!(
            entries = list.len(),
            "allow-list has no usable digests; every passcode will be denied"
        );
    }
    Ok(list)
}

/// Build the retry policy from flag values.
pub fn retry_policy(timeout_ms: u64, max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        timeout: Duration::from_millis(timeout_ms),
        max_retries,
        ..RetryPolicy::default()
    }
}

/// Split a `Name: value` header argument.
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let Some((name, value)) = raw.split_once(':') else {
        bail!("header '{raw}' must look like 'Name: value'");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("header '{raw}' has an empty name");
    }
    Ok((name.to_owned(), value.trim().to_owned()))
}
