use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Malformed JSON on line {line}: {source}")]
    MalformedRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid record on line {line}: {reason}")]
    Schema { line: usize, reason: String },

    #[error("Video {mid} has neither a sentences path nor an SRT path")]
    MissingTranscriptSource { mid: String },

    #[error("Session text references {mid}, which has no key moments to save")]
    EncodeMismatch { mid: String },

    #[error("No video with MID {mid} in this session")]
    UnknownItem { mid: String },

    #[error("Invalid timecode {input:?}, expected HH:MM:SS,mmm")]
    InvalidTimecode { input: String },

    #[error("Sentence {number} has an invalid time range {start}..{end}")]
    InvalidSentence { number: u64, start: f64, end: f64 },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Failed to read transcript from {location}: {reason}")]
    TranscriptUnavailable { location: String, reason: String },

    #[error("Session file not found: {path}")]
    SessionNotFound { path: PathBuf },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl ReviewError {
    /// Whether the error came from decoding the session text itself.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ReviewError::MalformedRecord { .. } | ReviewError::Schema { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ReviewError>;
