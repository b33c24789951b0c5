//! Purpose: Fetch typed JSON documents over HTTP.
//! Exports: `USER_AGENT`, `fetch_from_url`.
//! Role: Network boundary; one process-wide agent, per-call cancellation.
//! Invariants: Exactly one agent is ever constructed, even under concurrent first use.
//! Invariants: The agent carries no overall timeout; callers bound waits via the token.
//! Invariants: Non-2xx statuses and transport failures are `Network` errors; no retry.
//! Notes: The blocking transport call runs on the blocking pool and is raced
//! against the cancellation token, so a cancelled call returns promptly while
//! the abandoned request winds down in the background.

use std::io::Read;
use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::codec;
use crate::error::{Error, ErrorKind, Result};

/// Fixed identifying header sent with every request, matching the upstream
/// API's expectations.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Snap.Json";

fn shared_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(build_agent)
}

fn build_agent() -> ureq::Agent {
    #[cfg(test)]
    tests::AGENT_BUILDS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    ureq::AgentBuilder::new().user_agent(USER_AGENT).build()
}

/// Issues an HTTP GET to `url`, reads the full response body, and decodes it
/// into `T`. A literal `null` body yields `Ok(None)`, as with [`codec::parse`].
///
/// Cancellation is cooperative: a token signalled before completion fails the
/// call with `ErrorKind::Cancelled` instead of waiting for the response. An
/// already-cancelled token fails before any request is issued.
pub async fn fetch_from_url<T: DeserializeOwned>(
    url: &str,
    cancel: CancellationToken,
) -> Result<Option<T>> {
    if cancel.is_cancelled() {
        return Err(Error::new(ErrorKind::Cancelled)
            .with_message("fetch cancelled before request")
            .with_url(url));
    }

    let target = Url::parse(url).map_err(|err| {
        Error::new(ErrorKind::Network)
            .with_message("invalid url")
            .with_url(url)
            .with_source(err)
    })?;

    tracing::trace!(url, "fetching json document");
    let mut request = tokio::task::spawn_blocking(move || fetch_text(&target));
    let body = tokio::select! {
        _ = cancel.cancelled() => {
            return Err(Error::new(ErrorKind::Cancelled)
                .with_message("fetch cancelled")
                .with_url(url));
        }
        joined = &mut request => match joined {
            Ok(fetched) => fetched?,
            Err(err) => {
                return Err(Error::new(ErrorKind::Internal)
                    .with_message("fetch worker failed")
                    .with_url(url)
                    .with_source(err));
            }
        }
    };

    codec::parse(&body).map_err(|err| err.with_url(url))
}

fn fetch_text(url: &Url) -> Result<String> {
    let response = match shared_agent().request("GET", url.as_str()).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(code, _)) => {
            return Err(Error::new(ErrorKind::Network)
                .with_message(format!("http status {code}"))
                .with_url(url.as_str()));
        }
        Err(ureq::Error::Transport(err)) => {
            return Err(Error::new(ErrorKind::Network)
                .with_message("request failed")
                .with_url(url.as_str())
                .with_source(err));
        }
    };

    let mut body = String::new();
    response
        .into_reader()
        .read_to_string(&mut body)
        .map_err(|err| {
            Error::new(ErrorKind::Network)
                .with_message("failed to read response body")
                .with_url(url.as_str())
                .with_source(err)
        })?;
    Ok(body)
}
