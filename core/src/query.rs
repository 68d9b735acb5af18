//! Query-string encoding for optional request parameters.
//!
//! # Design
//! Each options type lists its own query keys explicitly through
//! [`QueryOptions`]. A field is emitted only when it differs from its zero
//! value, so `page[number]=0` is never sent: the server's default first page
//! is page 0 and omitting it is equivalent.

use url::form_urlencoded;

use crate::error::{Error, Result};

/// A flat options record that can be rendered as URL query parameters.
pub trait QueryOptions {
    /// Non-default fields as `(key, value)` pairs, in a fixed order.
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

/// Offset pagination parameters accepted by list endpoints.
///
/// Pages are 0-based. A zero field is omitted from the query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Page of results to retrieve.
    pub page: u64,
    /// Number of results per page.
    pub per_page: u64,
}

impl ListOptions {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self { page, per_page }
    }
}

impl QueryOptions for ListOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        if self.page != 0 {
            pairs.push(("page[number]", self.page.to_string()));
        }
        if self.per_page != 0 {
            pairs.push(("page[size]", self.per_page.to_string()));
        }
        pairs
    }
}

/// Form-urlencode the non-default fields of `opts`.
pub fn encode_query<O: QueryOptions + ?Sized>(opts: &O) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in opts.query_pairs() {
        serializer.append_pair(key, &value);
    }
    serializer.finish()
}

/// Add the parameters in `opts` to `path` as its query string.
///
/// `None` leaves `path` untouched. Otherwise any query already on `path` is
/// replaced, and a path whose options are all zero comes back without a `?`.
pub fn add_options<O: QueryOptions + ?Sized>(path: &str, opts: Option<&O>) -> Result<String> {
    let Some(opts) = opts else {
        return Ok(path.to_string());
    };
    if path.contains('#') {
        return Err(Error::Encoding(format!(
            "path {path:?} contains a fragment"
        )));
    }
    let base = path.split_once('?').map_or(path, |(base, _)| base);
    let query = encode_query(opts);
    if query.is_empty() {
        Ok(base.to_string())
    } else {
        Ok(format!("{base}?{query}"))
    }
}
