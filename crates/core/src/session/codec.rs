//! JSON Lines session records: one video item per line, with 1-based SL
//! bounds on key moments.

use std::{collections::BTreeMap, fmt};

use log::{debug, warn};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, Visitor},
};
use serde_json::value::RawValue;

use crate::{
    error::{Result, ReviewError},
    types::{KeyMoment, SentenceRange, TranscriptSource, VideoInfo},
};

const MID_FIELD: &str = "MID";
const KEY_MOMENT_FIELD: &str = "Key Moment";

#[derive(Debug, Clone, Deserialize)]
pub struct VideoRecord {
    #[serde(rename = "MID")]
    pub mid: String,
    #[serde(rename = "Video Name")]
    pub name: String,
    #[serde(rename = "Grade")]
    pub grade: String,
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Chapter")]
    pub chapter: String,
    #[serde(rename = "Duration (minute)")]
    pub duration_minutes: f64,
    #[serde(rename = "Video Path")]
    pub video_path: String,
    #[serde(rename = "Sentences Path", default)]
    pub sentences_path: Option<String>,
    #[serde(rename = "SRT Path", default)]
    pub srt_path: Option<String>,
    #[serde(rename = "Key Moment", default)]
    pub key_moments: Vec<KeyMomentRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMomentRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Start SL")]
    pub start_sl: i64,
    #[serde(rename = "End SL")]
    pub end_sl: i64,
    #[serde(rename = "Concept")]
    pub concept: String,
    #[serde(rename = "Key Takeaway")]
    pub key_takeaway: String,
    #[serde(rename = "Is Reviewed?", default)]
    pub is_reviewed: bool,
}

impl KeyMomentRecord {
    fn into_key_moment(self, line: usize) -> Result<KeyMoment> {
        if self.start_sl < 1 || self.end_sl < self.start_sl {
            return Err(ReviewError::Schema {
                line,
                reason: format!(
                    "key moment {:?} has invalid SL bounds {}..{}",
                    self.title, self.start_sl, self.end_sl
                ),
            });
        }
        Ok(KeyMoment {
            title: self.title,
            concept: self.concept,
            key_takeaway: self.key_takeaway,
            sentence_range: SentenceRange::new(
                (self.start_sl - 1) as usize,
                (self.end_sl - 1) as usize,
            ),
            is_reviewed: self.is_reviewed,
        })
    }
}

impl From<&KeyMoment> for KeyMomentRecord {
    fn from(moment: &KeyMoment) -> Self {
        Self {
            title: moment.title.clone(),
            start_sl: moment.sentence_range.start as i64 + 1,
            end_sl: moment.sentence_range.end as i64 + 1,
            concept: moment.concept.clone(),
            key_takeaway: moment.key_takeaway.clone(),
            is_reviewed: moment.is_reviewed,
        }
    }
}

/// An item that decoded but cannot be opened. Its moments are kept so a
/// later save still has something to write for its record.
#[derive(Debug)]
pub struct SkippedItem {
    pub mid: String,
    pub key_moments: Vec<KeyMoment>,
    pub error: ReviewError,
}

#[derive(Debug)]
pub enum DecodedRecord {
    Item(VideoInfo),
    Skipped(SkippedItem),
}

impl DecodedRecord {
    pub fn mid(&self) -> &str {
        match self {
            DecodedRecord::Item(video) => &video.mid,
            DecodedRecord::Skipped(skipped) => &skipped.mid,
        }
    }
}

#[derive(Debug, Default)]
pub struct DecodedSession {
    pub items: BTreeMap<String, VideoInfo>,
    pub skipped: Vec<SkippedItem>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Decode a single record. `line` is 1-based and only used for reporting.
pub fn decode_record(line: usize, text: &str) -> Result<DecodedRecord> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|source| ReviewError::MalformedRecord { line, source })?;
    let record: VideoRecord = serde_json::from_value(value).map_err(|e| ReviewError::Schema {
        line,
        reason: e.to_string(),
    })?;

    let key_moments = record
        .key_moments
        .into_iter()
        .map(|k| k.into_key_moment(line))
        .collect::<Result<Vec<_>>>()?;

    let source = blank_to_none(record.sentences_path)
        .map(TranscriptSource::Sentences)
        .or_else(|| blank_to_none(record.srt_path).map(TranscriptSource::Subtitles));

    let Some(transcript_source) = source else {
        let error = ReviewError::MissingTranscriptSource {
            mid: record.mid.clone(),
        };
        warn!("skipping line {line}: {error}");
        return Ok(DecodedRecord::Skipped(SkippedItem {
            mid: record.mid,
            key_moments,
            error,
        }));
    };

    Ok(DecodedRecord::Item(VideoInfo {
        mid: record.mid,
        name: record.name,
        grade: record.grade,
        subject: record.subject,
        chapter: record.chapter,
        duration: record.duration_minutes * 60.0,
        video_url: record.video_path,
        transcript_source,
        sentences: Vec::new(),
        key_moments,
    }))
}

/// Decode a whole session. Any malformed or invalid record fails the whole
/// decode; items without a transcript source are only skipped.
pub fn decode(text: &str) -> Result<DecodedSession> {
    let mut session = DecodedSession::default();

    for (index, line) in text.split('\n').enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = index + 1;
        let record = decode_record(line_no, line)?;

        let duplicate = session.items.contains_key(record.mid())
            || session.skipped.iter().any(|s| s.mid == record.mid());
        if duplicate {
            return Err(ReviewError::Schema {
                line: line_no,
                reason: format!("duplicate MID {}", record.mid()),
            });
        }

        match record {
            DecodedRecord::Item(video) => {
                session.items.insert(video.mid.clone(), video);
            }
            DecodedRecord::Skipped(skipped) => session.skipped.push(skipped),
        }
    }

    debug!(
        "decoded {} items, {} skipped",
        session.items.len(),
        session.skipped.len()
    );
    Ok(session)
}

/// Object fields in input order, values kept as their original JSON text.
struct RawRecord<'a> {
    fields: Vec<(String, &'a RawValue)>,
}

impl<'de> Deserialize<'de> for RawRecord<'de> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = RawRecord<'de>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(10));
                while let Some((key, value)) = map.next_entry::<String, &'de RawValue>()? {
                    fields.push((key, value));
                }
                Ok(RawRecord { fields })
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

impl RawRecord<'_> {
    fn parse(line: usize, text: &str) -> Result<RawRecord<'_>> {
        serde_json::from_str(text).map_err(|source| ReviewError::MalformedRecord { line, source })
    }

    fn mid(&self, line: usize) -> Result<String> {
        let raw = self
            .fields
            .iter()
            .find(|(key, _)| key == MID_FIELD)
            .map(|(_, value)| *value)
            .ok_or_else(|| ReviewError::Schema {
                line,
                reason: format!("missing field `{MID_FIELD}`"),
            })?;
        serde_json::from_str(raw.get()).map_err(|e| ReviewError::Schema {
            line,
            reason: e.to_string(),
        })
    }

    /// Rewrite the record with `key_moments` as its key-moment field,
    /// appending the field when the record had none.
    fn render_with(&self, key_moments: &str) -> Result<String> {
        let mut out = String::from("{");
        let mut replaced = false;

        for (index, (key, value)) in self.fields.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            out.push_str(&serde_json::to_string(key)?);
            out.push(':');
            if key == KEY_MOMENT_FIELD {
                out.push_str(key_moments);
                replaced = true;
            } else {
                out.push_str(value.get());
            }
        }

        if !replaced {
            if !self.fields.is_empty() {
                out.push(',');
            }
            out.push_str(&serde_json::to_string(KEY_MOMENT_FIELD)?);
            out.push(':');
            out.push_str(key_moments);
        }

        out.push('}');
        Ok(out)
    }
}

/// MID of a record line, or `None` for a blank line.
pub fn record_mid(line: usize, text: &str) -> Result<Option<String>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    RawRecord::parse(line, text)?.mid(line).map(Some)
}

/// Re-encode `original` with fresh key moments. Only the key-moment field of
/// each record changes; every other field keeps its original JSON text and
/// position, and lines keep their terminator. Fails without producing output
/// if any record's MID has no entry.
pub fn encode(original: &str, key_moments: &BTreeMap<String, Vec<KeyMoment>>) -> Result<String> {
    let mut lines = Vec::new();

    for (index, line) in original.split('\n').enumerate() {
        if line.trim().is_empty() {
            lines.push(line.to_string());
            continue;
        }
        let line_no = index + 1;
        let (body, ending) = line.strip_suffix('\r').map_or((line, ""), |body| (body, "\r"));
        let record = RawRecord::parse(line_no, body)?;
        let mid = record.mid(line_no)?;
        let moments = key_moments
            .get(&mid)
            .ok_or(ReviewError::EncodeMismatch { mid })?;

        let records: Vec<KeyMomentRecord> = moments.iter().map(KeyMomentRecord::from).collect();
        let mut rendered = record.render_with(&serde_json::to_string(&records)?)?;
        rendered.push_str(ending);
        lines.push(rendered);
    }

    Ok(lines.join("\n"))
}
