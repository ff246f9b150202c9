//! Pagination reconstruction from list envelopes.
//!
//! Datasets recover the current page from the `next`/`previous` links;
//! resources trust the server-echoed `current_page` with a fixed page size.

use once_cell::sync::Lazy;
use regex::Regex;

use super::envelope::PagedEnvelope;
use super::model::{DEFAULT_PAGE_SIZE, Pagination};

/// Fixed page size of the resources endpoint.
pub const RESOURCE_PAGE_SIZE: u32 = 10;

static PAGE_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"page=(\d+)").expect("page pattern is a valid regex"));

/// Extracts the `page=N` value from a pagination link.
pub fn page_from_url(url: &str) -> Option<u32> {
    PAGE_PARAM
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Current page from the envelope links.
///
/// Precedence: `next` (page − 1), else `previous` (page + 1), else 1. A link
/// without a parsable `page=` also yields 1.
pub fn current_page_from_links(next: Option<&str>, previous: Option<&str>) -> u32 {
    if let Some(next) = next {
        page_from_url(next).map_or(1, |page| page.saturating_sub(1).max(1))
    } else if let Some(previous) = previous {
        page_from_url(previous).map_or(1, |page| page.saturating_add(1))
    } else {
        1
    }
}

/// Page size: explicit server value, else the returned page length, else 10.
pub fn resolve_page_size(explicit: Option<u32>, returned_len: Option<usize>) -> u32 {
    explicit
        .filter(|size| *size > 0)
        .or_else(|| {
            returned_len
                .filter(|len| *len > 0)
                .map(|len| u32::try_from(len).unwrap_or(u32::MAX))
        })
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// `ceil(count / page_size)`.
pub fn total_pages(count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(count.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

/// Dataset pagination for an envelope; `None` when the envelope has no `count`.
pub fn dataset_pagination<T>(envelope: &PagedEnvelope<T>) -> Option<Pagination> {
    let count = envelope.count?;
    let page_size = resolve_page_size(envelope.page_size, envelope.returned_len());
    let current_page =
        current_page_from_links(envelope.next.as_deref(), envelope.previous.as_deref());

    Some(Pagination {
        current_page,
        total_pages: total_pages(count, page_size),
        total_items: count,
        page_size,
    })
}

/// Resource pagination: echoed `current_page` or the requested page, page
/// size fixed at [`RESOURCE_PAGE_SIZE`], missing `count` read as 0.
pub fn resource_pagination<T>(envelope: &PagedEnvelope<T>, requested_page: u32) -> Pagination {
    let count = envelope.count.unwrap_or(0);
    Pagination {
        current_page: envelope
            .current_page
            .filter(|page| *page > 0)
            .unwrap_or(requested_page),
        total_pages: total_pages(count, RESOURCE_PAGE_SIZE),
        total_items: count,
        page_size: RESOURCE_PAGE_SIZE,
    }
}

/// A bare array collapses to a single page sized to the array.
pub fn single_page(len: usize) -> Pagination {
    let len32 = u32::try_from(len).unwrap_or(u32::MAX);
    Pagination {
        current_page: 1,
        total_pages: 1,
        total_items: len as u64,
        page_size: len32,
    }
}
