use thiserror::Error;

/// Errors reading or decoding sample records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Underlying I/O failure.
    #[error("record io error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended inside a record.
    #[error("truncated record: expected {expected} bytes, found {found}")]
    Truncated {
        /// Bytes required.
        expected: usize,
        /// Bytes available.
        found: usize,
    },

    /// A record declared a length this platform cannot address.
    #[error("record length {length} exceeds addressable memory")]
    Oversized {
        /// The declared length.
        length: u64,
    },

    /// A framing checksum did not match.
    #[error("corrupt record {what}: expected crc {expected:#010x}, found {found:#010x}")]
    Checksum {
        /// The checksummed field: `length` or `data`.
        what: &'static str,
        /// Checksum of the bytes read.
        expected: u32,
        /// Checksum stored in the frame.
        found: u32,
    },

    /// The payload was not a valid protobuf message.
    #[error("record decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// A required feature was missing.
    #[error("missing feature: {key}")]
    MissingFeature {
        /// Feature key.
        key: String,
    },

    /// A feature held the wrong value kind.
    #[error("feature {key}: expected {expected}")]
    FeatureKind {
        /// Feature key.
        key: String,
        /// The expected list kind.
        expected: &'static str,
    },

    /// A payload did not match its declared shape.
    #[error("feature {key}: payload of {found} bytes does not match shape {shape:?}")]
    PayloadShape {
        /// Feature key.
        key: String,
        /// Declared ``(h, w, c)`` shape.
        shape: Vec<usize>,
        /// Payload size in bytes.
        found: usize,
    },
}

impl RecordError {
    /// Build a [`RecordError::MissingFeature`].
    pub fn missing(key: &str) -> Self {
        RecordError::MissingFeature {
            key: key.to_string(),
        }
    }

    /// Build a [`RecordError::FeatureKind`].
    pub fn kind(
        key: &str,
        expected: &'static str,
    ) -> Self {
        RecordError::FeatureKind {
            key: key.to_string(),
            expected,
        }
    }
}
