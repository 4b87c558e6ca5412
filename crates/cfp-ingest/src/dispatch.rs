//! Record dispatcher
//!
//! Consumes one file's line stream and routes every record to the
//! domain model matching the file's classification. Per-record
//! isolation is absolute: a corrupt or unsaveable record costs that
//! record, never the file. One file can carry hundreds of thousands of
//! records, so a single bad one must not contaminate the totals.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::file::FeedFile;
use crate::models::ModelFactory;
use crate::stream::{LineEvent, LineStream};

/// Per-file parsing counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOutcome {
    /// Product records saved
    pub products: u64,
    /// Article records saved
    pub articles: u64,
    /// Malformed lines dropped by the streamer
    pub line_errors: u64,
    /// Records dropped at parse or save time
    pub record_errors: u64,
}

impl FileOutcome {
    pub fn saved(&self) -> u64 {
        self.products + self.articles
    }
}

pub struct Dispatcher {
    factory: Arc<dyn ModelFactory>,
}

impl Dispatcher {
    pub fn new(factory: Arc<dyn ModelFactory>) -> Self {
        Self { factory }
    }

    /// Stream one file's records through the model layer.
    ///
    /// Takes the file's content (it is not needed afterwards and must
    /// not be persisted), spawns the line streamer, and services the
    /// record and error channels until both are exhausted. The file
    /// transitions to parsed state on return.
    pub async fn parse_file(&self, file: &mut FeedFile) -> FileOutcome {
        let content = std::mem::take(&mut file.content);
        let mut stream = LineStream::spawn(content);
        let mut outcome = FileOutcome::default();

        while let Some(event) = stream.next_event().await {
            let json = match event {
                LineEvent::Record(json) => json,
                LineEvent::Malformed(err) => {
                    outcome.line_errors += 1;
                    warn!(path = %file.path, error = %err, "dropped malformed line");
                    continue;
                },
            };

            let mut model = if file.is_product {
                self.factory.product()
            } else {
                self.factory.article()
            };

            if let Err(err) = model.parse(&json) {
                outcome.record_errors += 1;
                warn!(path = %file.path, error = %err, "record parse failed, skipping");
                continue;
            }

            match model.save().await {
                Ok(id) => {
                    if file.is_product {
                        outcome.products += 1;
                    } else {
                        outcome.articles += 1;
                    }
                    file.owner_id = Some(id);
                    file.date_modified = Utc::now();
                },
                Err(err) => {
                    outcome.record_errors += 1;
                    warn!(path = %file.path, error = %err, "record save failed");
                },
            }
        }

        file.is_parsed = true;
        file.line_errors = outcome.line_errors;
        file.record_errors = outcome.record_errors;

        info!(
            path = %file.path,
            products = outcome.products,
            articles = outcome.articles,
            line_errors = outcome.line_errors,
            record_errors = outcome.record_errors,
            "finished parsing file"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedModel;
    use async_trait::async_trait;
    use cfp_common::{CfpError, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubState {
        saved: Mutex<Vec<String>>,
        save_attempts: AtomicUsize,
        /// 1-based save attempts that fail
        fail_save_attempts: Vec<usize>,
    }

    struct StubModel {
        state: Arc<StubState>,
        json: Option<String>,
    }

    #[async_trait]
    impl FeedModel for StubModel {
        fn parse(&mut self, json: &str) -> Result<()> {
            if json.contains("reject-me") {
                return Err(CfpError::Model("field validation failed".to_string()));
            }
            self.json = Some(json.to_string());
            Ok(())
        }

        async fn save(&mut self) -> Result<String> {
            let attempt = self.state.save_attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if self.state.fail_save_attempts.contains(&attempt) {
                return Err(CfpError::store("write rejected"));
            }
            let json = self.json.clone().unwrap_or_default();
            self.state.saved.lock().unwrap().push(json);
            Ok(format!("id-{attempt}"))
        }

        fn id(&self) -> Option<&str> {
            None
        }
    }

    struct StubFactory {
        state: Arc<StubState>,
    }

    impl ModelFactory for StubFactory {
        fn product(&self) -> Box<dyn FeedModel> {
            Box::new(StubModel { state: self.state.clone(), json: None })
        }

        fn article(&self) -> Box<dyn FeedModel> {
            Box::new(StubModel { state: self.state.clone(), json: None })
        }
    }

    fn dispatcher_with(state: Arc<StubState>) -> Dispatcher {
        Dispatcher::new(Arc::new(StubFactory { state }))
    }

    fn product_file(content: &str) -> FeedFile {
        let mut file = FeedFile::new("feeds/products.jl", "sweetwater", true);
        file.content = content.to_string();
        file
    }

    #[tokio::test]
    async fn test_counts_and_flags_for_clean_file() {
        let state = Arc::new(StubState::default());
        let dispatcher = dispatcher_with(state.clone());
        let mut file = product_file("header\n{\"n\":1}\n{\"n\":2}\n");

        let outcome = dispatcher.parse_file(&mut file).await;

        assert_eq!(outcome.products, 2);
        assert_eq!(outcome.articles, 0);
        assert_eq!(outcome.record_errors, 0);
        assert!(file.is_parsed);
        assert_eq!(file.owner_id.as_deref(), Some("id-2"));
        assert!(file.content.is_empty(), "content is consumed by the stream");
    }

    #[tokio::test]
    async fn test_save_failure_does_not_stop_later_records() {
        let state = Arc::new(StubState {
            fail_save_attempts: vec![2],
            ..Default::default()
        });
        let dispatcher = dispatcher_with(state.clone());
        let mut file = product_file("header\n{\"n\":1}\n{\"n\":2}\n{\"n\":3}\n{\"n\":4}\n");

        let outcome = dispatcher.parse_file(&mut file).await;

        assert_eq!(state.save_attempts.load(Ordering::SeqCst), 4, "every record attempted");
        assert_eq!(outcome.products, 3);
        assert_eq!(outcome.record_errors, 1);
        assert_eq!(file.owner_id.as_deref(), Some("id-4"));
    }

    #[tokio::test]
    async fn test_parse_failure_skips_save() {
        let state = Arc::new(StubState::default());
        let dispatcher = dispatcher_with(state.clone());
        let mut file = product_file("header\n{\"n\":1}\n{\"x\":\"reject-me\"}\n{\"n\":3}\n");

        let outcome = dispatcher.parse_file(&mut file).await;

        assert_eq!(state.save_attempts.load(Ordering::SeqCst), 2, "rejected record never saved");
        assert_eq!(outcome.products, 2);
        assert_eq!(outcome.record_errors, 1);
    }

    #[tokio::test]
    async fn test_malformed_lines_counted_separately() {
        let state = Arc::new(StubState::default());
        let dispatcher = dispatcher_with(state.clone());
        let mut file = product_file("header\n{\"n\":1}\nnot json\n{\"n\":2}\n");

        let outcome = dispatcher.parse_file(&mut file).await;

        assert_eq!(outcome.products, 2);
        assert_eq!(outcome.line_errors, 1);
        assert_eq!(file.line_errors, 1);
        assert!(file.had_errors());
    }

    #[tokio::test]
    async fn test_article_file_routes_to_article_model() {
        let state = Arc::new(StubState::default());
        let dispatcher = dispatcher_with(state.clone());
        let mut file = FeedFile::new("feeds/blog.jl", "randomblog", false);
        file.content = "header\n{\"headline\":\"a\"}\n".to_string();

        let outcome = dispatcher.parse_file(&mut file).await;

        assert_eq!(outcome.articles, 1);
        assert_eq!(outcome.products, 0);
    }

    #[tokio::test]
    async fn test_empty_file_is_parsed_trivially() {
        let state = Arc::new(StubState::default());
        let dispatcher = dispatcher_with(state);
        let mut file = product_file("header\n");

        let outcome = dispatcher.parse_file(&mut file).await;

        assert_eq!(outcome.saved(), 0);
        assert_eq!(outcome.line_errors, 0);
        assert!(file.is_parsed);
    }
}
