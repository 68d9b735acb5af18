//! Pluggable HTTP execution.
//!
//! # Design
//! The client never performs I/O itself: it hands a finished [`HttpRequest`]
//! to a [`Transport`] and interprets the [`HttpResponse`] it gets back. The
//! default transport is a blocking `ureq` agent run on tokio's blocking
//! pool. Cancellation is enforced by the client racing the returned future;
//! the remaining deadline is also forwarded so the blocking worker gives up
//! on its own instead of lingering.

use std::fmt;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP exchange.
///
/// Implementations must return non-2xx statuses as ordinary responses;
/// classifying them is the client's job.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn execute(
        &self,
        request: HttpRequest,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, TransportError>;
}

/// Default transport backed by a blocking [`ureq::Agent`].
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl UreqTransport {
    /// Wrap an existing agent.
    ///
    /// The agent should be configured with `http_status_as_error(false)`,
    /// otherwise 4xx/5xx responses surface as transport errors and lose
    /// their body.
    pub fn from_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(
        &self,
        request: HttpRequest,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || call(&agent, request, timeout))
            .await
            .map_err(|e| TransportError::Runtime(e.to_string()))?
    }
}

fn prepare<B>(
    mut builder: RequestBuilder<B>,
    headers: &[(String, String)],
    timeout: Option<Duration>,
) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    match timeout {
        Some(timeout) => builder.config().timeout_global(Some(timeout)).build(),
        None => builder,
    }
}

fn call(
    agent: &Agent,
    request: HttpRequest,
    timeout: Option<Duration>,
) -> Result<HttpResponse, TransportError> {
    let HttpRequest {
        method,
        url,
        headers,
        body,
    } = request;

    let result = match (method, body) {
        (HttpMethod::Get, _) => prepare(agent.get(&url), &headers, timeout).call(),
        (HttpMethod::Delete, _) => prepare(agent.delete(&url), &headers, timeout).call(),
        (HttpMethod::Post, Some(body)) => {
            prepare(agent.post(&url), &headers, timeout).send(body.as_bytes())
        }
        (HttpMethod::Post, None) => prepare(agent.post(&url), &headers, timeout).send_empty(),
    };
    let mut response = result.map_err(map_ureq_error)?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| match map_ureq_error(e) {
            TransportError::Timeout => TransportError::Timeout,
            other => TransportError::Io(other.to_string()),
        })?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::Io(e) => match e.kind() {
            io::ErrorKind::TimedOut => TransportError::Timeout,
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected => TransportError::Connection(e.to_string()),
            _ => TransportError::Io(e.to_string()),
        },
        other => TransportError::Connection(other.to_string()),
    }
}
