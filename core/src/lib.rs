//! Typed async client for the organisation accounts API.
//!
//! # Overview
//! Turns create/fetch/list/delete calls into JSON:API requests, runs them
//! through a pluggable [`Transport`], and decodes success and error bodies
//! into typed results. The raw [`Response`] is kept on success and attached
//! to every error the server answered.
//!
//! # Design
//! - [`Client`] is immutable once built; share it by cloning.
//! - [`Client::new_request`] builds plain [`HttpRequest`] values and
//!   [`Client::send`] executes them, so the I/O boundary stays explicit.
//! - Every call takes a [`Context`] carrying cancellation and a deadline.
//! - No retries, caching or local attribute validation: the server owns
//!   business rules and callers own resilience.
//!
//! ```no_run
//! # async fn run() -> accounts_client::Result<()> {
//! use accounts_client::{Client, Context, ListOptions};
//!
//! let client = Client::new("http://localhost:8080/")?;
//! let ctx = Context::background();
//! let page = client.accounts().list(&ctx, Some(&ListOptions::new(0, 10))).await?;
//! for account in page.data {
//!     println!("{}", account.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod client;
pub mod context;
pub mod error;
pub mod http;
pub mod query;
pub mod response;
pub mod transport;
pub mod types;

pub use account::{AccountService, Reply, ACCOUNTS_PATH};
pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL};
pub use context::Context;
pub use error::{Error, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{add_options, encode_query, ListOptions, QueryOptions};
pub use response::{ErrorResponse, Response};
pub use transport::{Transport, UreqTransport};
pub use types::{
    Account, AccountAttributes, AccountCreateRequest, AccountCreateRequestAttributes,
    AccountCreateRequestData, AccountLinks, AccountListLinks, Envelope, ACCOUNT_TYPE,
};
