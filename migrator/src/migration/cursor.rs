//! Paginated traversal of source records

use std::sync::Arc;
use tracing::debug;

use super::types::SourceRecord;
use crate::services::errors::{MigrationError, MigrationResult};
use crate::services::repository::RecordSource;

/// Walks a `RecordSource` page by page, keyed on the last seen `_id`.
///
/// A page shorter than the page size (or empty) ends the traversal.
pub struct RecordCursor {
    source: Arc<dyn RecordSource>,
    page_size: usize,
    after: Option<String>,
    exhausted: bool,
    pages_fetched: u32,
}

impl RecordCursor {
    pub fn new(source: Arc<dyn RecordSource>, page_size: usize) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            after: None,
            exhausted: false,
            pages_fetched: 0,
        }
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Next page of records, `None` once the source is exhausted
    pub async fn next_page(&mut self) -> MigrationResult<Option<Vec<SourceRecord>>> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self
            .source
            .fetch_page(self.after.as_deref(), self.page_size)
            .await
            .map_err(|source| MigrationError::Query { source })?;
        self.pages_fetched += 1;

        debug!(
            "[RecordCursor] Page {} returned {} records",
            self.pages_fetched,
            page.len()
        );

        if page.len() < self.page_size {
            self.exhausted = true;
        }

        match page.last() {
            Some(last) => {
                // An id that does not advance would loop forever
                if self.after.as_deref().is_some_and(|after| last.id.as_str() <= after) {
                    self.exhausted = true;
                }
                self.after = Some(last.id.clone());
                Ok(Some(page))
            }
            None => {
                self.exhausted = true;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::client::{ClientError, ClientResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct PagedSource {
        ids: Vec<&'static str>,
        calls: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl RecordSource for PagedSource {
        async fn fetch_page(
            &self,
            after: Option<&str>,
            limit: usize,
        ) -> ClientResult<Vec<SourceRecord>> {
            self.calls.lock().unwrap().push(after.map(str::to_string));
            Ok(self
                .ids
                .iter()
                .filter(|id| after.map_or(true, |after| **id > after))
                .take(limit)
                .map(|id| SourceRecord {
                    id: id.to_string(),
                    record_type: "application".to_string(),
                    ..Default::default()
                })
                .collect())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl RecordSource for FailingSource {
        async fn fetch_page(&self, _: Option<&str>, _: usize) -> ClientResult<Vec<SourceRecord>> {
            Err(ClientError::request_failed("query", 401, "bad token"))
        }
    }

    #[tokio::test]
    async fn test_pages_until_short_page() {
        let source = Arc::new(PagedSource {
            ids: vec!["a", "b", "c", "d", "e"],
            calls: Mutex::new(Vec::new()),
        });
        let mut cursor = RecordCursor::new(source.clone(), 2);

        let mut seen = Vec::new();
        while let Some(page) = cursor.next_page().await.unwrap() {
            seen.extend(page.into_iter().map(|r| r.id));
        }

        assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(cursor.pages_fetched(), 3);
        assert_eq!(
            *source.calls.lock().unwrap(),
            vec![None, Some("b".to_string()), Some("d".to_string())]
        );
    }

    #[tokio::test]
    async fn test_exact_multiple_needs_one_empty_page() {
        let source = Arc::new(PagedSource {
            ids: vec!["a", "b"],
            calls: Mutex::new(Vec::new()),
        });
        let mut cursor = RecordCursor::new(source, 2);

        assert_eq!(cursor.next_page().await.unwrap().unwrap().len(), 2);
        assert!(cursor.next_page().await.unwrap().is_none());
        assert!(cursor.next_page().await.unwrap().is_none());
        assert_eq!(cursor.pages_fetched(), 2);
    }

    #[tokio::test]
    async fn test_query_failure() {
        let mut cursor = RecordCursor::new(Arc::new(FailingSource), 10);
        let err = cursor.next_page().await.unwrap_err();
        assert!(matches!(err, MigrationError::Query { .. }));
    }
}
