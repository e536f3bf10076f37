pub mod config;
pub mod error;
pub mod format;
pub mod mapping;
pub mod playback;
pub mod resolver;
pub mod session;
pub mod store;
pub mod transcript;
pub mod types;

pub use config::ReviewConfig;
pub use error::{Result, ReviewError};
pub use format::{format_clock, format_timestamp, parse_timecode};
pub use mapping::{
    GroupOwner, SentenceGroup, group_sentences, moment_duration, sentence_at, time_range_of,
};
pub use playback::{MediaEvent, MediaHandle, PlaybackController, PlaybackStatus};
pub use resolver::{OverlapPolicy, resolve_overlaps, resolve_tagged};
pub use session::{Session, SessionFiles};
pub use store::{Action, EditorState, KeyMomentSink, KeyMomentStore, insertion_range, reduce};
pub use transcript::{fetch_sentences, http_client};
pub use types::{
    KeyMoment, KeyMomentPatch, Sentence, SentenceRange, TimeRange, TranscriptSource, VideoInfo,
};
