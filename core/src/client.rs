//! Request construction and dispatch for the accounts API.
//!
//! # Design
//! `Client` is an immutable value: base URL, user agent and transport are
//! fixed by [`ClientBuilder::build`] and there are no setters afterwards, so
//! one client can be shared freely across tasks. Each call is split into
//! [`Client::new_request`], which produces a plain [`HttpRequest`], and
//! [`Client::send`] / [`Client::send_json`], which run it through the
//! transport and classify the outcome.

use std::env;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::account::AccountService;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::response::{self, Response};
use crate::transport::{Transport, UreqTransport};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// Media type requested from the server.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// Environment variable holding the base URL for [`ClientBuilder::from_env`].
pub const BASE_URL_ENV: &str = "ACCOUNT_API_ADDR";

/// Environment variable holding the user agent for [`ClientBuilder::from_env`].
pub const USER_AGENT_ENV: &str = "ACCOUNT_API_USER_AGENT";

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Client for the accounts API.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    user_agent: String,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Client for `base_url` with the default user agent and transport.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::builder().base_url(base_url).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Account operations bound to this client.
    pub fn accounts(&self) -> AccountService<'_> {
        AccountService::new(self)
    }

    /// Build a request for `path`, resolved against the base URL.
    ///
    /// Resolution follows URL-join rules: with a base of `http://h/api/`, a
    /// path of `v1/x` lands on `/api/v1/x`, while `/v1/x` lands on `/v1/x`.
    /// When `body` is present it is serialized as JSON.
    pub fn new_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpRequest> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| Error::RequestBuild(format!("cannot resolve path {path:?}: {e}")))?;

        let mut headers = Vec::with_capacity(3);
        let body = match body {
            Some(body) => {
                let json = serde_json::to_string(body)
                    .map_err(|e| Error::RequestBuild(format!("cannot serialize body: {e}")))?;
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(json)
            }
            None => None,
        };
        headers.push(("Accept".to_string(), MEDIA_TYPE.to_string()));
        if !self.user_agent.is_empty() {
            headers.push(("User-Agent".to_string(), self.user_agent.clone()));
        }

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// Execute `request` and classify the response by status.
    ///
    /// Returns `Error::Cancelled` or `Error::Timeout` as soon as `ctx` is
    /// cancelled or its deadline passes, even while the transport is still
    /// blocked.
    pub async fn send(&self, ctx: &Context, request: HttpRequest) -> Result<Response> {
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let remaining = ctx.remaining();
        if remaining.is_some_and(|d| d.is_zero()) {
            return Err(Error::Timeout);
        }

        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, "sending request");

        let exchange = self.transport.execute(request, remaining);
        let raw = tokio::select! {
            biased;
            _ = ctx.token().cancelled() => {
                debug!(%method, %url, "request cancelled");
                return Err(Error::Cancelled);
            }
            _ = sleep_until(ctx.deadline()) => {
                debug!(%method, %url, "request deadline exceeded");
                return Err(Error::Timeout);
            }
            result = exchange => result?,
        };

        debug!(%method, %url, status = raw.status, "received response");
        response::check_response(Response::new(raw)).inspect_err(|err| {
            if let Error::Api {
                status, message, ..
            } = err
            {
                warn!(%method, %url, status, %message, "request rejected");
            }
        })
    }

    /// Execute `request` and decode a 2xx body into `T`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        request: HttpRequest,
    ) -> Result<(T, Response)> {
        let response = self.send(ctx, request).await?;
        response::decode(response)
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Builder for [`Client`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Builder seeded from `ACCOUNT_API_ADDR` and `ACCOUNT_API_USER_AGENT`.
    pub fn from_env() -> Self {
        Self {
            base_url: env::var(BASE_URL_ENV).ok(),
            user_agent: env::var(USER_AGENT_ENV).ok(),
            transport: None,
        }
    }

    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    /// User agent sent with every request; empty disables the header.
    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> Result<Client> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(raw)
            .map_err(|e| Error::RequestBuild(format!("invalid base URL {raw:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::RequestBuild(format!(
                "base URL {raw:?} cannot be used as a base"
            )));
        }

        Ok(Client {
            base_url,
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(UreqTransport::default())),
        })
    }
}
