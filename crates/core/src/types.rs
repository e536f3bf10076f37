use serde::{Deserialize, Serialize};

/// Separator used when two moments are folded or merged into one.
pub const MERGE_SEPARATOR: &str = ", ";

/// Time span in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Pins `seconds` into the range. An inverted range pins to its end.
    pub fn clamp(&self, seconds: f64) -> f64 {
        seconds.max(self.start).min(self.end)
    }
}

/// Inclusive range of zero-based sentence indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SentenceRange {
    pub start: usize,
    pub end: usize,
}

impl SentenceRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of sentences covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    pub fn overlaps(&self, other: &SentenceRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub time_range: TimeRange,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMoment {
    pub title: String,
    pub concept: String,
    pub key_takeaway: String,
    pub sentence_range: SentenceRange,
    pub is_reviewed: bool,
}

impl KeyMoment {
    /// Fresh moment with the editor's placeholder text.
    pub fn placeholder(sentence_range: SentenceRange) -> Self {
        Self {
            title: "Title".to_string(),
            concept: "Concept".to_string(),
            key_takeaway: "Key Takeaway".to_string(),
            sentence_range,
            is_reviewed: false,
        }
    }

    /// Concatenate this moment with the one that follows it. The result spans
    /// from this moment's start to `next`'s end and is never reviewed.
    pub fn merged_with(&self, next: &KeyMoment) -> KeyMoment {
        KeyMoment {
            title: join_text(&self.title, &next.title),
            concept: join_text(&self.concept, &next.concept),
            key_takeaway: join_text(&self.key_takeaway, &next.key_takeaway),
            sentence_range: SentenceRange::new(self.sentence_range.start, next.sentence_range.end),
            is_reviewed: false,
        }
    }
}

fn join_text(left: &str, right: &str) -> String {
    format!("{left}{MERGE_SEPARATOR}{right}")
}

/// Partial update for the selected moment. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMomentPatch {
    pub title: Option<String>,
    pub concept: Option<String>,
    pub key_takeaway: Option<String>,
    pub sentence_range: Option<SentenceRange>,
}

impl KeyMomentPatch {
    pub fn range(sentence_range: SentenceRange) -> Self {
        Self {
            sentence_range: Some(sentence_range),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.concept.is_none()
            && self.key_takeaway.is_none()
            && self.sentence_range.is_none()
    }

    pub fn apply_to(self, moment: &mut KeyMoment) {
        if let Some(title) = self.title {
            moment.title = title;
        }
        if let Some(concept) = self.concept {
            moment.concept = concept;
        }
        if let Some(key_takeaway) = self.key_takeaway {
            moment.key_takeaway = key_takeaway;
        }
        if let Some(range) = self.sentence_range {
            moment.sentence_range = range;
        }
    }
}

impl From<KeyMoment> for KeyMomentPatch {
    fn from(moment: KeyMoment) -> Self {
        Self {
            title: Some(moment.title),
            concept: Some(moment.concept),
            key_takeaway: Some(moment.key_takeaway),
            sentence_range: Some(moment.sentence_range),
        }
    }
}

/// Where an item's transcript lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriptSource {
    /// Sentence table: `[{SL, Start Timecode, End Timecode, Sentence}]`.
    Sentences(String),
    /// Subtitle track: `[{id, start, end, text}]` in seconds.
    Subtitles(String),
}

impl TranscriptSource {
    pub fn location(&self) -> &str {
        match self {
            TranscriptSource::Sentences(location) | TranscriptSource::Subtitles(location) => {
                location
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub mid: String,
    pub name: String,
    pub grade: String,
    pub subject: String,
    pub chapter: String,
    /// Seconds.
    pub duration: f64,
    pub video_url: String,
    pub transcript_source: TranscriptSource,
    /// Empty until the transcript source has been resolved.
    pub sentences: Vec<Sentence>,
    pub key_moments: Vec<KeyMoment>,
}

impl VideoInfo {
    /// `(reviewed, total)` key moments.
    pub fn review_progress(&self) -> (usize, usize) {
        let reviewed = self.key_moments.iter().filter(|m| m.is_reviewed).count();
        (reviewed, self.key_moments.len())
    }

    pub fn is_fully_reviewed(&self) -> bool {
        let (reviewed, total) = self.review_progress();
        total > 0 && reviewed == total
    }
}
