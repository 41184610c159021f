//! Shared pagination utilities
//!
//! Pages are 1-indexed and bounded; a page never holds more than
//! [`MAX_PAGE_SIZE`] items.
//!
//! # Examples
//!
//! ```rust,ignore
//! use sirene_server::features::shared::pagination::{Page, PageRequest};
//!
//! let request = PageRequest::new(Some(2), Some(10));
//! assert_eq!(request.offset(), 10);
//!
//! // After fetching data...
//! let page = Page::counted(items, &request, 25);
//! assert!(page.pagination.has_next);
//! ```

use futures::{Stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

/// Page size used when the request does not specify one
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Upper bound on the page size
pub const MAX_PAGE_SIZE: u64 = 100;

/// Invalid pagination parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("Page must be greater than 0")]
    InvalidPage,
    #[error("Size must be between 1 and 100")]
    InvalidSize,
    #[error("Page is too large for the requested size")]
    PageOutOfRange,
}

/// Pagination request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageRequest {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[param(minimum = 1, example = 1)]
    pub page: Option<u64>,

    /// Items per page. Defaults to 20, at most 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[param(minimum = 1, maximum = 100, example = 20)]
    pub size: Option<u64>,
}

impl PageRequest {
    pub fn new(page: Option<u64>, size: Option<u64>) -> Self {
        Self { page, size }
    }

    /// Page number (1-indexed), defaulting to 1
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Items per page, defaulting to 20 and clamped to 1-100
    pub fn size(&self) -> u64 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Number of items preceding this page
    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.size())
    }

    /// Reject out-of-range values instead of silently clamping them
    ///
    /// The offset of a valid request fits in an `i64`, the widest skip the
    /// store accepts.
    pub fn validate(&self) -> Result<(), PaginationError> {
        if self.page == Some(0) {
            return Err(PaginationError::InvalidPage);
        }
        if let Some(size) = self.size {
            if !(1..=MAX_PAGE_SIZE).contains(&size) {
                return Err(PaginationError::InvalidSize);
            }
        }
        (self.page() - 1)
            .checked_mul(self.size())
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or(PaginationError::PageOutOfRange)?;
        Ok(())
    }
}

/// Pagination metadata for responses
///
/// `total` and `pages` are absent when the result comes from a criteria
/// search, which is not counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMetadata {
    /// Current page number (1-indexed)
    pub page: u64,

    /// Items per page
    pub size: u64,

    /// Total number of items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    /// Total number of pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u64>,

    pub has_next: bool,

    pub has_prev: bool,
}

impl PaginationMetadata {
    /// Metadata for a page whose collection size is known
    pub fn counted(request: &PageRequest, total: u64) -> Self {
        let page = request.page();
        let size = request.size();
        let pages = total.div_ceil(size);

        Self {
            page,
            size,
            total: Some(total),
            pages: Some(pages),
            has_next: page < pages,
            has_prev: page > 1,
        }
    }

    /// Metadata for a page cut out of an uncounted sequence
    pub fn windowed(request: &PageRequest, has_next: bool) -> Self {
        let page = request.page();

        Self {
            page,
            size: request.size(),
            total: None,
            pages: None,
            has_next,
            has_prev: page > 1,
        }
    }
}

/// One bounded page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMetadata,
}

impl<T> Page<T> {
    pub fn counted(items: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Self {
            items,
            pagination: PaginationMetadata::counted(request, total),
        }
    }

    /// Page built from a window of at most `size + 1` items read from the
    /// requested offset; the extra item only decides `has_next`
    pub fn windowed(mut items: Vec<T>, request: &PageRequest) -> Self {
        let size = request.size() as usize;
        let has_next = items.len() > size;
        items.truncate(size);

        Self {
            items,
            pagination: PaginationMetadata::windowed(request, has_next),
        }
    }

    /// Cut the requested page out of a lazy sequence
    ///
    /// Consumes at most `offset + size + 1` items; the extra item only
    /// decides `has_next` and is dropped.
    pub async fn from_stream<S, E>(stream: S, request: &PageRequest) -> Result<Self, E>
    where
        S: Stream<Item = Result<T, E>>,
    {
        let size = request.size() as usize;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);

        let window = stream
            .try_skip_while({
                let mut skipped = 0usize;
                move |_| {
                    let skip = skipped < offset;
                    skipped += 1;
                    futures::future::ready(Ok(skip))
                }
            })
            .take(size + 1);
        let mut window = std::pin::pin!(window);

        let mut items = Vec::with_capacity(size + 1);
        while let Some(item) = window.try_next().await? {
            items.push(item);
        }

        Ok(Self::windowed(items, request))
    }
}
