use crate::core::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Default page size when scanning a whole collection
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// One page of a collection query. Queries are always ordered by a stable key,
/// so walking pages by offset is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn first(limit: u32) -> Self {
        Self { limit, offset: 0 }
    }

    pub fn next(self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset + self.limit,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Walk a paged query until a short page comes back and return every row
pub async fn collect_pages<T, F, Fut>(page_size: u32, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Page) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let page_size = page_size.max(1);
    let mut page = Page::first(page_size);
    let mut rows = Vec::new();

    loop {
        let batch = fetch(page).await?;
        let short = (batch.len() as u32) < page_size;
        rows.extend(batch);
        if short {
            break;
        }
        page = page.next();
    }

    Ok(rows)
}
