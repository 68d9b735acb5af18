//! Account operations: create, fetch, list, delete.

use tracing::{debug, instrument};
use url::Url;

use crate::client::Client;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::http::HttpMethod;
use crate::query::{add_options, ListOptions};
use crate::response::Response;
use crate::types::{
    Account, AccountCreateRequest, AccountCreateRequestAttributes, AccountLinks,
    AccountListLinks, Envelope,
};

/// Collection path of the accounts resource.
pub const ACCOUNTS_PATH: &str = "/v1/organisation/accounts";

/// Decoded payload of a successful call, with the response it came from.
#[derive(Debug, Clone)]
pub struct Reply<T, L> {
    pub data: T,
    pub links: Option<L>,
    pub response: Response,
}

impl<T, L> Reply<T, L> {
    fn from_envelope(envelope: Envelope<T, L>, response: Response) -> Self {
        Self {
            data: envelope.data,
            links: envelope.links,
            response,
        }
    }
}

/// Account operations borrowed from a [`Client`].
///
/// Every operation is one HTTP round trip. Failures come back as
/// [`Error`]; when the server answered, the error carries its response.
#[derive(Debug, Clone, Copy)]
pub struct AccountService<'a> {
    client: &'a Client,
}

impl<'a> AccountService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create an account. Attribute formats are checked by the server only.
    #[instrument(skip(self, ctx, attributes))]
    pub async fn create(
        &self,
        ctx: &Context,
        id: &str,
        organisation_id: &str,
        attributes: &AccountCreateRequestAttributes,
    ) -> Result<Reply<Account, AccountLinks>> {
        let body = AccountCreateRequest::new(id, organisation_id, attributes.clone());
        let request = self
            .client
            .new_request(HttpMethod::Post, ACCOUNTS_PATH, Some(&body))?;
        let (envelope, response) = self.client.send_json(ctx, request).await?;
        Ok(Reply::from_envelope(envelope, response))
    }

    #[instrument(skip(self, ctx))]
    pub async fn fetch(&self, ctx: &Context, id: &str) -> Result<Reply<Account, AccountLinks>> {
        let path = resource_path(self.client.base_url(), id)?;
        let request = self.client.new_request::<()>(HttpMethod::Get, &path, None)?;
        let (envelope, response) = self.client.send_json(ctx, request).await?;
        Ok(Reply::from_envelope(envelope, response))
    }

    /// List one page of accounts. `None` requests the server's default page.
    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &Context,
        opts: Option<&ListOptions>,
    ) -> Result<Reply<Vec<Account>, AccountListLinks>> {
        let path = add_options(ACCOUNTS_PATH, opts)?;
        let request = self.client.new_request::<()>(HttpMethod::Get, &path, None)?;
        let (envelope, response) = self.client.send_json(ctx, request).await?;
        Ok(Reply::from_envelope(envelope, response))
    }

    /// Delete an account at `version`.
    ///
    /// The version is not checked locally; a stale one is rejected by the
    /// server.
    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &Context, id: &str, version: u64) -> Result<Response> {
        let path = resource_path(self.client.base_url(), id)?;
        let path = format!("{path}?version={version}");
        let request = self.client.new_request::<()>(HttpMethod::Delete, &path, None)?;
        self.client.send(ctx, request).await
    }

    /// Collect every account by walking pages of `per_page` from page 0
    /// until the first empty page.
    ///
    /// Without concurrent writes the result holds the same ids as a single
    /// unpaginated [`list`](Self::list).
    #[instrument(skip(self, ctx))]
    pub async fn list_all(&self, ctx: &Context, per_page: u64) -> Result<Vec<Account>> {
        if per_page == 0 {
            return Err(Error::Encoding("page size must be positive".to_string()));
        }
        let mut accounts = Vec::new();
        let mut opts = ListOptions::new(0, per_page);
        loop {
            let page = self.list(ctx, Some(&opts)).await?.data;
            if page.is_empty() {
                break;
            }
            debug!(page = opts.page, count = page.len(), "fetched page");
            accounts.extend(page);
            opts.page += 1;
        }
        Ok(accounts)
    }
}

/// Path of a single account, with `id` pushed as one percent-encoded
/// segment.
fn resource_path(base: &Url, id: &str) -> Result<String> {
    if matches!(id, "" | "." | "..") {
        return Err(Error::RequestBuild(format!(
            "{id:?} is not a valid account id"
        )));
    }
    let mut url = base
        .join(ACCOUNTS_PATH)
        .map_err(|e| Error::RequestBuild(format!("cannot resolve {ACCOUNTS_PATH:?}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| Error::RequestBuild(format!("{base} cannot be used as a base")))?
        .pop_if_empty()
        .push(id);
    Ok(url.path().to_string())
}
