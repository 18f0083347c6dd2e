//! Offset pagination shared by every list endpoint.

use std::future::Future;

use crate::{
    config::MAX_PAGES,
    error::{AppError, Result},
    types::Page,
};

/// Fetches every page, starting at offset 0 and advancing by `page_size`,
/// until a page reports that nothing follows.
pub async fn fetch_all<T, F, Fut>(page_size: u32, fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    fetch_until(page_size, fetch_page, |_: &[T]| Ok(false)).await
}

/// Like [`fetch_all`], but after each page `stop` sees everything fetched so
/// far and can end the fetch early even when more pages exist.
///
/// A page that claims more items but is empty, or more than [`MAX_PAGES`]
/// pages, is a [`AppError::Pagination`] error instead of an endless loop.
pub async fn fetch_until<T, F, Fut, S>(
    page_size: u32,
    mut fetch_page: F,
    mut stop: S,
) -> Result<Vec<T>>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
    S: FnMut(&[T]) -> Result<bool>,
{
    if page_size == 0 {
        return Err(AppError::Pagination("page size must be positive".to_string()));
    }

    let mut items = Vec::new();
    let mut offset: u32 = 0;

    for page_number in 0..MAX_PAGES {
        let page = fetch_page(offset, page_size).await?;
        let fetched = page.items.len();
        items.extend(page.items);
        tracing::trace!(page_number, offset, fetched, "fetched page");

        if stop(&items)? {
            tracing::debug!(offset, total = items.len(), "stopped paging early");
            return Ok(items);
        }

        if !page.has_more {
            return Ok(items);
        }

        if fetched == 0 {
            return Err(AppError::Pagination(format!(
                "empty page at offset {} reported more items",
                offset
            )));
        }

        offset = offset.checked_add(page_size).ok_or_else(|| {
            AppError::Pagination(format!("offset overflow after {} items", items.len()))
        })?;
    }

    Err(AppError::Pagination(format!("gave up after {} pages", MAX_PAGES)))
}
