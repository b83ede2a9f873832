//! Page sources
//!
//! A page source is the only way the pagination engine talks to the outside
//! world: given a page key it returns the decoded items of that page, or an
//! error. An empty page means the end of the catalog.

use crate::error::Result;
use crate::types::PageKey;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

/// Fetches one page of items for a page key
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch the items of page `key` (possibly empty)
    async fn fetch_page(&self, key: PageKey) -> Result<Vec<T>>;
}

/// Page source backed by an async closure
pub struct FnSource<T, F> {
    f: F,
    _item: PhantomData<fn() -> T>,
}

/// Wrap an async closure as a page source
///
/// ```rust,ignore
/// let source = from_fn(|page| async move { Ok(vec![format!("item {page}")]) });
/// ```
pub fn from_fn<T, F, Fut>(f: F) -> FnSource<T, F>
where
    F: Fn(PageKey) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>>> + Send,
{
    FnSource {
        f,
        _item: PhantomData,
    }
}

#[async_trait]
impl<T, F, Fut> PageSource<T> for FnSource<T, F>
where
    T: Send,
    F: Fn(PageKey) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>>> + Send,
{
    async fn fetch_page(&self, key: PageKey) -> Result<Vec<T>> {
        (self.f)(key).await
    }
}

impl<T, F> std::fmt::Debug for FnSource<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_fn_source_passes_key() {
        let source = from_fn(|page| async move { Ok(vec![page * 10]) });
        assert_eq!(source.fetch_page(3).await.unwrap(), vec![30]);
    }

    #[tokio::test]
    async fn test_fn_source_propagates_error() {
        let source = from_fn(|page| async move { Err::<Vec<u32>, _>(Error::fetch(page, "down")) });
        let err = source.fetch_page(2).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch page 2: down");
    }
}
