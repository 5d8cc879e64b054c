//! Exchange records and the capture sink boundary.

use std::io::Write;
use std::sync::Mutex;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One structured record per completed request/response exchange.
///
/// Body fields hold the exact transmitted bytes. The JSON representation
/// base64-encodes them; the tracing sink lossy-decodes only for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub uri: String,
    pub method: String,
    pub client_key: String,
    pub response_status: u16,
    #[serde(with = "base64_bytes")]
    pub request_body: Bytes,
    #[serde(with = "base64_bytes")]
    pub response_body: Bytes,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded)
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}

/// Destination for completed exchange records.
///
/// The capture stage emits exactly one record per admitted request,
/// on every exit path. Rejected requests emit nothing.
pub trait CaptureSink: Send + Sync + 'static {
    fn record(&self, record: ExchangeRecord);
}

/// Default sink: one structured debug event per exchange.
#[derive(Debug, Default)]
pub struct TracingSink;

impl CaptureSink for TracingSink {
    fn record(&self, record: ExchangeRecord) {
        tracing::debug!(
            uri = %record.uri,
            method = %record.method,
            client_key = %record.client_key,
            response_status = record.response_status,
            request_body = %String::from_utf8_lossy(&record.request_body),
            response_body = %String::from_utf8_lossy(&record.response_body),
            "request completed"
        );
    }
}

/// Sink writing one JSON object per line to a writer.
pub struct JsonLinesSink<W: Write + Send + 'static> {
    writer: Mutex<W>,
}

impl<W: Write + Send + 'static> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send + 'static> CaptureSink for JsonLinesSink<W> {
    fn record(&self, record: ExchangeRecord) {
        let mut writer = self.writer.lock().expect("json sink lock poisoned");
        match serde_json::to_string(&record) {
            Ok(line) => {
                if let Err(err) = writeln!(writer, "{line}") {
                    tracing::error!(error = %err, "failed to write exchange record");
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize exchange record");
            }
        }
    }
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<ExchangeRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records received so far.
    pub fn records(&self) -> Vec<ExchangeRecord> {
        self.records.lock().expect("memory sink lock poisoned").clone()
    }
}

impl CaptureSink for MemorySink {
    fn record(&self, record: ExchangeRecord) {
        self.records
            .lock()
            .expect("memory sink lock poisoned")
            .push(record);
    }
}
