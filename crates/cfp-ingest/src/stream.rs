//! Concurrent line streamer
//!
//! Turns one feed file's raw text into a lazy sequence of normalized
//! JSON strings plus a parallel sequence of line errors. The producer
//! runs as its own task and blocks on every send until the consumer
//! takes the value; the consumer must service both channels in one
//! select loop and stop only after observing both closed.
//!
//! The first line of every feed file is a non-data header and is always
//! skipped. A malformed line costs exactly that line: the error is
//! reported on the error channel and the stream continues.

use std::io::Cursor;

use cfp_common::CfpError;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::debug;

/// Upper bound on a single record line. Feed records can be
/// multi-megabyte single-line JSON objects; a default-sized line buffer
/// would misreport them as framing errors.
pub const MAX_LINE_BYTES: usize = 50 * 1024 * 1024;

/// One event from the line stream.
#[derive(Debug)]
pub enum LineEvent {
    /// A normalized JSON record string
    Record(String),
    /// A dropped line, with the reason
    Malformed(CfpError),
}

/// Handle to one file's streaming parse.
///
/// The stream is finite and non-restartable; [`LineStream::next_event`]
/// returns `None` once both underlying channels are exhausted.
pub struct LineStream {
    records: mpsc::Receiver<String>,
    errors: mpsc::Receiver<CfpError>,
    records_done: bool,
    errors_done: bool,
}

impl LineStream {
    /// Spawn the producer task for `content` and return the consumer
    /// handle.
    pub fn spawn(content: String) -> Self {
        Self::spawn_with_limit(content, MAX_LINE_BYTES)
    }

    /// Same as [`LineStream::spawn`] with an explicit line-length cap.
    pub fn spawn_with_limit(content: String, max_line_bytes: usize) -> Self {
        // Capacity 1 on both channels: every send suspends the producer
        // until the consumer catches up, so a file is never buffered
        // twice in memory.
        let (records_tx, records_rx) = mpsc::channel(1);
        let (errors_tx, errors_rx) = mpsc::channel(1);

        tokio::spawn(read_json_lines(content, max_line_bytes, records_tx, errors_tx));

        Self {
            records: records_rx,
            errors: errors_rx,
            records_done: false,
            errors_done: false,
        }
    }

    /// Receive the next record or error, interleaving both channels.
    ///
    /// Returns `None` only when both channels have been observed closed.
    pub async fn next_event(&mut self) -> Option<LineEvent> {
        loop {
            tokio::select! {
                record = self.records.recv(), if !self.records_done => {
                    match record {
                        Some(json) => return Some(LineEvent::Record(json)),
                        None => self.records_done = true,
                    }
                },
                error = self.errors.recv(), if !self.errors_done => {
                    match error {
                        Some(err) => return Some(LineEvent::Malformed(err)),
                        None => self.errors_done = true,
                    }
                },
                else => return None,
            }
        }
    }
}

/// Producer: frame lines, skip the header, decode and re-encode each
/// record. Both channels close when this returns.
async fn read_json_lines(
    content: String,
    max_line_bytes: usize,
    records: mpsc::Sender<String>,
    errors: mpsc::Sender<CfpError>,
) {
    let codec = LinesCodec::new_with_max_length(max_line_bytes);
    let mut lines = FramedRead::new(Cursor::new(content), codec);

    // The first line is the feed's header marker, not data. An over-long
    // header errors; swallow the pause `None` the codec emits before it
    // resumes at the next newline.
    if let Some(Err(_)) = lines.next().await {
        let _ = lines.next().await;
    }

    let mut after_error = false;
    loop {
        let line = match lines.next().await {
            Some(Ok(line)) => {
                after_error = false;
                line
            },
            Some(Err(err)) => {
                // Over-long line: the codec discards the remainder and
                // resumes at the next newline.
                after_error = true;
                if errors
                    .send(CfpError::LineDecode(format!("line framing failed: {err}")))
                    .await
                    .is_err()
                {
                    return;
                }
                continue;
            },
            // The codec yields exactly one `None` after a framing error
            // before it resumes; only a `None` with no preceding error
            // is end of input.
            None if after_error => {
                after_error = false;
                continue;
            },
            None => return,
        };

        let json_obj: serde_json::Map<String, serde_json::Value> =
            match serde_json::from_str(&line) {
                Ok(obj) => obj,
                Err(err) => {
                    if errors
                        .send(CfpError::LineDecode(format!(
                            "failed to decode JSON object: {err}"
                        )))
                        .await
                        .is_err()
                    {
                        return;
                    }
                    continue;
                },
            };

        let json_str = match serde_json::to_string(&json_obj) {
            Ok(s) => s,
            Err(err) => {
                if errors
                    .send(CfpError::LineDecode(format!(
                        "failed to re-encode JSON object: {err}"
                    )))
                    .await
                    .is_err()
                {
                    return;
                }
                continue;
            },
        };

        if records.send(json_str).await.is_err() {
            debug!("record consumer dropped, ending stream");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(mut stream: LineStream) -> (Vec<String>, Vec<CfpError>) {
        let mut records = Vec::new();
        let mut errors = Vec::new();
        while let Some(event) = stream.next_event().await {
            match event {
                LineEvent::Record(json) => records.push(json),
                LineEvent::Malformed(err) => errors.push(err),
            }
        }
        (records, errors)
    }

    #[tokio::test]
    async fn test_skips_exactly_one_header_line() {
        let content = "header\n{\"a\":1}\n{\"b\":2}\n{\"c\":3}\n";
        let (records, errors) = collect(LineStream::spawn(content.to_string())).await;
        assert_eq!(records.len(), 3);
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_lines_cost_exactly_one_line() {
        let content = "header\n{\"a\":1}\nnot json\n{\"b\":2}\nalso bad\n{\"c\":3}\n";
        let (records, errors) = collect(LineStream::spawn(content.to_string())).await;
        assert_eq!(records.len(), 3, "valid records after bad lines must survive");
        assert_eq!(errors.len(), 2);
        for err in &errors {
            assert!(matches!(err, CfpError::LineDecode(_)));
        }
    }

    #[tokio::test]
    async fn test_empty_content_after_header() {
        let (records, errors) = collect(LineStream::spawn("header\n".to_string())).await;
        assert!(records.is_empty());
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_completely_empty_content() {
        let (records, errors) = collect(LineStream::spawn(String::new())).await;
        assert!(records.is_empty());
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_records_arrive_in_source_order() {
        let content = "header\n{\"n\":1}\n{\"n\":2}\n{\"n\":3}\n";
        let (records, _) = collect(LineStream::spawn(content.to_string())).await;
        let ns: Vec<i64> = records
            .iter()
            .map(|r| serde_json::from_str::<serde_json::Value>(r).unwrap()["n"].as_i64().unwrap())
            .collect();
        assert_eq!(ns, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_record_larger_than_typical_buffer() {
        // A single record line far bigger than common default line
        // buffers must pass through intact.
        let big_value = "x".repeat(2 * 1024 * 1024);
        let content = format!("header\n{{\"blob\":\"{big_value}\"}}\n");
        let (records, errors) = collect(LineStream::spawn(content)).await;
        assert_eq!(records.len(), 1);
        assert!(errors.is_empty());
        assert!(records[0].len() > 2 * 1024 * 1024);
    }

    #[tokio::test]
    async fn test_over_long_line_reports_error_and_continues() {
        let content = format!(
            "header\n{{\"pad\":\"{}\"}}\n{{\"ok\":1}}\n{{\"ok\":2}}\n",
            "y".repeat(256)
        );
        let (records, errors) =
            collect(LineStream::spawn_with_limit(content, 64)).await;
        assert_eq!(records.len(), 2, "records after the over-long line must survive");
        assert_eq!(errors.len(), 1);
    }

    #[tokio::test]
    async fn test_each_over_long_line_costs_one_line() {
        let pad = "y".repeat(256);
        let content = format!(
            "header\n{{\"pad\":\"{pad}\"}}\n{{\"a\":1}}\n{{\"pad\":\"{pad}\"}}\n{{\"b\":2}}\n"
        );
        let (records, errors) =
            collect(LineStream::spawn_with_limit(content, 64)).await;
        assert_eq!(records.len(), 2);
        assert_eq!(errors.len(), 2);
    }

    #[tokio::test]
    async fn test_over_long_header_does_not_end_stream() {
        let content = format!("{}\n{{\"ok\":true}}\n", "h".repeat(256));
        let (records, errors) =
            collect(LineStream::spawn_with_limit(content, 64)).await;
        assert_eq!(records.len(), 1);
        assert!(errors.is_empty(), "the skipped header is not a data line");
    }

    #[tokio::test]
    async fn test_json_array_line_is_malformed() {
        // Records must be JSON objects; a bare array is reported, not emitted.
        let content = "header\n[1,2,3]\n{\"a\":1}\n";
        let (records, errors) = collect(LineStream::spawn(content.to_string())).await;
        assert_eq!(records.len(), 1);
        assert_eq!(errors.len(), 1);
    }
}
