use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

use crate::collector::{RAW_DATA_PREFIX, TIMESTAMP_FORMAT};
use crate::error::PipelineError;
use crate::store::{BlobStore, ObjectMeta};

/// Prefix the training CSVs are written under.
pub const PROCESSED_DATA_PREFIX: &str = "processed_data/";

// Comprehend custom classification expects exactly these two columns,
// label first.
const CSV_HEADER: [&str; 2] = ["label", "text"];

/// Outcome of one transformation run.
#[derive(Debug, Clone)]
pub struct TransformSummary {
    pub output_key: String,
    /// Input elements seen, including rows the cleaning pass dropped.
    pub entries_processed: usize,
}

/// Reshapes the newest raw snapshot into a Comprehend training CSV.
pub struct Transformer {
    store: Arc<dyn BlobStore>,
    bucket: String,
}

impl Transformer {
    pub fn new(store: Arc<dyn BlobStore>, bucket: impl Into<String>) -> Self {
        Self { store, bucket: bucket.into() }
    }

    pub async fn run(&self) -> Result<TransformSummary, PipelineError> {
        let latest = self.latest_input().await?;
        info!(key = %latest.key, "reading snapshot");
        let entries = self.load_entries(&latest.key).await?;
        let csv = comprehend_csv(&entries)?;
        let output_key = processed_data_key(Utc::now());
        self.store
            .put(&self.bucket, &output_key, csv, Some("text/csv"))
            .await?;
        info!(key = %output_key, entries = entries.len(), "stored training data");
        Ok(TransformSummary { output_key, entries_processed: entries.len() })
    }

    /// Newest object under the raw-data prefix. Ties on modification time go
    /// to the lexically greatest key, so the pick is deterministic.
    async fn latest_input(&self) -> Result<ObjectMeta, PipelineError> {
        let objects = self.store.list(&self.bucket, RAW_DATA_PREFIX).await?;
        objects
            .into_iter()
            .max_by(|a, b| a.last_modified.cmp(&b.last_modified).then_with(|| a.key.cmp(&b.key)))
            .ok_or_else(|| PipelineError::NotFound {
                bucket: self.bucket.clone(),
                prefix: RAW_DATA_PREFIX.to_string(),
            })
    }

    async fn load_entries(&self, key: &str) -> Result<Vec<Value>, PipelineError> {
        let bytes = self.store.get(&self.bucket, key).await?;
        let text = String::from_utf8(bytes)
            .map_err(|e| PipelineError::Parse { key: key.to_string(), reason: e.to_string() })?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| PipelineError::Parse { key: key.to_string(), reason: e.to_string() })?;
        match value {
            Value::Array(entries) => Ok(entries),
            other => Err(PipelineError::Validation(format!(
                "input data must be a list of objects, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

/// Key for a training CSV written at `at`.
pub fn processed_data_key(at: DateTime<Utc>) -> String {
    format!("{PROCESSED_DATA_PREFIX}comprehend_training_data_{}.csv", at.format(TIMESTAMP_FORMAT))
}

/// Replace line breaks with spaces, then trim. Each LF and CR becomes its
/// own space, so a CRLF pair widens to two spaces mid-string.
pub fn clean_text(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    replaced.trim().to_string()
}

/// Render entries as CSV bytes: the two-column header, then one cleaned row
/// per entry. Rows whose cleaned label or text is empty are dropped. Fields
/// are quoted only when they contain the delimiter, a quote, or a newline.
pub fn comprehend_csv(entries: &[Value]) -> Result<Vec<u8>, PipelineError> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(CSV_HEADER)?;
        for entry in entries {
            let obj = entry.as_object().ok_or_else(|| {
                PipelineError::Validation(format!(
                    "input elements must be objects, got {}",
                    json_type_name(entry)
                ))
            })?;
            let text = clean_text(field(obj, "text")?);
            let label = field(obj, "label")?.trim();
            if text.is_empty() || label.is_empty() {
                continue;
            }
            writer.write_record([label, text.as_str()])?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

// Absent keys read as empty (and the row is then dropped); a present value
// of any other JSON type is a shape error.
fn field<'a>(entry: &'a serde_json::Map<String, Value>, name: &str) -> Result<&'a str, PipelineError> {
    match entry.get(name) {
        None => Ok(""),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(PipelineError::Validation(format!(
            "field {name} must be a string, got {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    use crate::error::ErrorKind;
    use crate::store::MemoryStore;

    fn ts(sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, sec).unwrap()
    }

    fn transformer_with(store: Arc<MemoryStore>) -> Transformer {
        Transformer::new(store, "data")
    }

    #[test]
    fn clean_text_collapses_line_breaks() {
        assert_eq!(clean_text("hello\nworld"), "hello world");
        assert_eq!(clean_text("  padded  "), "padded");
        // CR and LF each become a space of their own
        assert_eq!(clean_text("a\r\nb"), "a  b");
        assert_eq!(clean_text("\n\r"), "");
    }

    #[test]
    fn csv_starts_with_header_and_cleans_rows() {
        let entries = vec![json!({"text": "hello\nworld", "label": " pos "})];
        let body = String::from_utf8(comprehend_csv(&entries).unwrap()).unwrap();
        assert_eq!(body, "label,text\npos,hello world\n");
    }

    #[test]
    fn rows_with_empty_fields_are_dropped() {
        let entries = vec![
            json!({"text": "", "label": "x"}),
            json!({"text": "ok", "label": "y"}),
            json!({"text": "no label"}),
            json!({"text": "   ", "label": "blank after trim"}),
        ];
        let body = String::from_utf8(comprehend_csv(&entries).unwrap()).unwrap();
        assert_eq!(body, "label,text\ny,ok\n");
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let entries = vec![json!({"text": "one, two, three", "label": "list"})];
        let body = String::from_utf8(comprehend_csv(&entries).unwrap()).unwrap();
        assert_eq!(body, "label,text\nlist,\"one, two, three\"\n");
        // still exactly two fields per row once quoting is honored
        let mut reader = csv::Reader::from_reader(body.as_bytes());
        for row in reader.records() {
            assert_eq!(row.unwrap().len(), 2);
        }
    }

    #[test]
    fn non_object_element_is_a_validation_error() {
        let err = comprehend_csv(&[json!("just a string")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn non_string_field_is_a_validation_error() {
        let err = comprehend_csv(&[json!({"text": 42, "label": "x"})]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn processed_key_embeds_the_timestamp() {
        assert_eq!(
            processed_data_key(ts(7)),
            "processed_data/comprehend_training_data_20240501_120007.csv"
        );
    }

    #[tokio::test]
    async fn empty_listing_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let err = transformer_with(store.clone()).run().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(store.keys("data").is_empty());
    }

    #[tokio::test]
    async fn newest_snapshot_wins_regardless_of_key_order() {
        let store = Arc::new(MemoryStore::new());
        // lexically greatest key is the oldest object
        store.put_at("data", "raw_data/reddit/zzz.json", b"[]".to_vec(), ts(0));
        store.put_at(
            "data",
            "raw_data/reddit/aaa.json",
            serde_json::to_vec(&vec![json!({"text": "newest", "label": "n"})]).unwrap(),
            ts(30),
        );

        let summary = transformer_with(store.clone()).run().await.unwrap();
        assert_eq!(summary.entries_processed, 1);
        let body = store.get("data", &summary.output_key).await.unwrap();
        assert_eq!(String::from_utf8(body).unwrap(), "label,text\nn,newest\n");
    }

    #[tokio::test]
    async fn modification_ties_break_to_lexically_greatest_key() {
        let store = Arc::new(MemoryStore::new());
        store.put_at(
            "data",
            "raw_data/reddit/a.json",
            serde_json::to_vec(&vec![json!({"text": "from a", "label": "a"})]).unwrap(),
            ts(10),
        );
        store.put_at(
            "data",
            "raw_data/reddit/b.json",
            serde_json::to_vec(&vec![json!({"text": "from b", "label": "b"})]).unwrap(),
            ts(10),
        );

        let summary = transformer_with(store.clone()).run().await.unwrap();
        let body = store.get("data", &summary.output_key).await.unwrap();
        assert_eq!(String::from_utf8(body).unwrap(), "label,text\nb,from b\n");
    }

    #[tokio::test]
    async fn non_list_input_fails_validation_before_writing() {
        let store = Arc::new(MemoryStore::new());
        store.put_at("data", "raw_data/reddit/x.json", br#"{"a":1}"#.to_vec(), ts(0));

        let err = transformer_with(store.clone()).run().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.keys("data"), vec!["raw_data/reddit/x.json"]);
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let store = Arc::new(MemoryStore::new());
        store.put_at("data", "raw_data/reddit/x.json", b"not json".to_vec(), ts(0));

        let err = transformer_with(store).run().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[tokio::test]
    async fn output_is_written_as_csv_under_processed_prefix() {
        let store = Arc::new(MemoryStore::new());
        store.put_at(
            "data",
            "raw_data/reddit/x.json",
            serde_json::to_vec(&vec![json!({"text": "ok", "label": "y"})]).unwrap(),
            ts(0),
        );

        let summary = transformer_with(store.clone()).run().await.unwrap();
        assert!(summary.output_key.starts_with(PROCESSED_DATA_PREFIX));
        assert!(summary.output_key.ends_with(".csv"));
        assert_eq!(store.content_type_of("data", &summary.output_key).as_deref(), Some("text/csv"));
    }
}
