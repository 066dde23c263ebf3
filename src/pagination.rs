//! # Pagination links
//!
//! Computes the canonical navigation URLs (`self`, `first`, `last`, `next`,
//! `previous`) for a paginated collection from a total count, a page
//! descriptor and the request's own URL.
//!
//! URLs are relative (path + query) and their query parameters are serialized
//! in sorted name order, so the same logical page always renders the same
//! byte-identical URL regardless of how the client ordered its parameters.

use std::fmt;

use url::Url;

use crate::errors::ApiError;
use crate::models::PageInfo;

/// Query parameter carrying the page size.
pub const PAGE_SIZE_PARAM: &str = "page[size]";
/// Query parameter carrying the 1-based page number.
pub const PAGE_NUMBER_PARAM: &str = "page[number]";

// Dummy origin so relative request URLs can ride the WHATWG parser.
const BASE: &str = "http://example.com";

/// A relative URL (path + query) with parameter-level editing.
///
/// `Display` renders the path and the query with parameter names sorted.
#[derive(Debug, Clone)]
pub struct RelativeUrl {
    url: Url,
}

impl RelativeUrl {
    /// Parse a relative URL such as `/colors?fields=name`.
    ///
    /// # Errors
    ///
    /// Returns an internal [`ApiError`] when the input is not a parseable
    /// relative URL; request URLs come from the server, so this is never a
    /// client fault.
    pub fn parse(relative: &str) -> Result<Self, ApiError> {
        let base = Url::parse(BASE)
            .map_err(|e| ApiError::internal("Invalid request URL", Some(e.to_string())))?;
        let url = base
            .join(relative)
            .map_err(|e| ApiError::internal("Invalid request URL", Some(e.to_string())))?;
        Ok(Self { url })
    }

    /// Set a query parameter, replacing any existing value.
    pub fn set_param(&mut self, name: &str, value: &str) -> &mut Self {
        let mut pairs = self.decoded_pairs();
        pairs.retain(|(k, _)| k != name);
        pairs.push((name.to_string(), value.to_string()));
        self.replace_query(&pairs);
        self
    }

    /// Remove a query parameter if present.
    pub fn remove_param(&mut self, name: &str) -> &mut Self {
        let mut pairs = self.decoded_pairs();
        pairs.retain(|(k, _)| k != name);
        self.replace_query(&pairs);
        self
    }

    /// Drop every query parameter whose name is not in `names`.
    pub fn retain_params(&mut self, names: &[&str]) -> &mut Self {
        let mut pairs = self.decoded_pairs();
        pairs.retain(|(k, _)| names.contains(&k.as_str()));
        self.replace_query(&pairs);
        self
    }

    /// Append one segment to the path, e.g. the id of a created document.
    pub fn append_path_segment(&mut self, segment: &str) -> &mut Self {
        let path = format!("{}/{}", self.url.path().trim_end_matches('/'), segment);
        self.url.set_path(&path);
        self
    }

    /// The percent-encoded path without query.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    fn decoded_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn replace_query(&mut self, pairs: &[(String, String)]) {
        if pairs.is_empty() {
            self.url.set_query(None);
        } else {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish();
            self.url.set_query(Some(&query));
        }
    }
}

impl fmt::Display for RelativeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.path())?;
        let mut pairs = self.decoded_pairs();
        if !pairs.is_empty() {
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish();
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = self.url.fragment() {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

/// The navigation URLs of one collection page.
///
/// `next` and `previous` are only present when the respective page exists;
/// representations decide how absence is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationLinks {
    pub total_pages: u64,
    pub self_link: String,
    pub first: String,
    pub last: String,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// Compute pagination links for a collection page.
///
/// `total_pages` is `ceil(total_count / size)`. The `self` link is the request
/// URL with `page[size]`/`page[number]` forced to the resolved page, all other
/// parameters preserved. No clamping happens here; callers clamp via
/// [`crate::models::PageBounds`].
///
/// # Errors
///
/// Propagates the internal error of an unparseable request URL.
pub fn pagination_links(
    total_count: u64,
    page: PageInfo,
    self_url: &str,
) -> Result<PaginationLinks, ApiError> {
    let total_pages = if page.size == 0 {
        0
    } else {
        total_count.div_ceil(page.size)
    };

    let mut url = RelativeUrl::parse(self_url)?;
    url.set_param(PAGE_SIZE_PARAM, &page.size.to_string());
    url.set_param(PAGE_NUMBER_PARAM, &page.current.to_string());

    let mut first = url.clone();
    first.set_param(PAGE_NUMBER_PARAM, "1");
    let mut last = url.clone();
    last.set_param(PAGE_NUMBER_PARAM, &total_pages.to_string());

    let previous = (page.current > 1).then(|| {
        let mut previous = url.clone();
        previous.set_param(PAGE_NUMBER_PARAM, &(page.current - 1).to_string());
        previous.to_string()
    });
    let next = (page.current < total_pages).then(|| {
        let mut next = url.clone();
        next.set_param(PAGE_NUMBER_PARAM, &(page.current + 1).to_string());
        next.to_string()
    });

    Ok(PaginationLinks {
        total_pages,
        self_link: url.to_string(),
        first: first.to_string(),
        last: last.to_string(),
        next,
        previous,
    })
}
