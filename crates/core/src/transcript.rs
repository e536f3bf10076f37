use std::path::Path;

use log::{debug, info};
use serde::Deserialize;
use tokio::fs;

use crate::{
    config::ReviewConfig,
    error::{Result, ReviewError},
    format::parse_timecode,
    types::{Sentence, TimeRange, TranscriptSource},
};

#[derive(Debug, Deserialize)]
struct SentenceRow {
    #[serde(rename = "SL")]
    sl: u64,
    #[serde(rename = "Start Timecode")]
    start: String,
    #[serde(rename = "End Timecode")]
    end: String,
    #[serde(rename = "Sentence")]
    text: String,
}

#[derive(Debug, Deserialize)]
struct SubtitleCue {
    id: u64,
    start: f64,
    end: f64,
    text: String,
}

/// Sentence timings must be finite and must not end before they start.
fn checked_range(number: u64, start: f64, end: f64) -> Result<TimeRange> {
    if start.is_finite() && end.is_finite() && start <= end {
        Ok(TimeRange::new(start, end))
    } else {
        Err(ReviewError::InvalidSentence { number, start, end })
    }
}

/// Parse a sentence table, ordering rows by their SL number.
pub fn parse_sentence_table(json: &str) -> Result<Vec<Sentence>> {
    let mut rows: Vec<SentenceRow> = serde_json::from_str(json)?;
    rows.sort_by_key(|row| row.sl);

    rows.into_iter()
        .map(|row| {
            let start = parse_timecode(&row.start)?;
            let end = parse_timecode(&row.end)?;
            Ok(Sentence {
                time_range: checked_range(row.sl, start, end)?,
                text: row.text,
            })
        })
        .collect()
}

/// Parse a subtitle track, ordering cues by id.
pub fn parse_subtitle_track(json: &str) -> Result<Vec<Sentence>> {
    let mut cues: Vec<SubtitleCue> = serde_json::from_str(json)?;
    cues.sort_by_key(|cue| cue.id);

    cues.into_iter()
        .map(|cue| {
            Ok(Sentence {
                time_range: checked_range(cue.id, cue.start, cue.end)?,
                text: cue.text.trim().to_string(),
            })
        })
        .collect()
}

pub fn http_client(config: &ReviewConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(config.fetch_timeout)
        .build()?)
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

async fn read_location(client: &reqwest::Client, location: &str) -> Result<String> {
    if is_remote(location) {
        debug!("fetching transcript from {location}");
        let response = client.get(location).send().await?;
        if !response.status().is_success() {
            return Err(ReviewError::TranscriptUnavailable {
                location: location.to_string(),
                reason: format!("server answered {}", response.status()),
            });
        }
        Ok(response.text().await?)
    } else {
        let path = Path::new(location);
        fs::read_to_string(path)
            .await
            .map_err(|e| ReviewError::TranscriptUnavailable {
                location: location.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Load the sentences an item's transcript source points at.
pub async fn fetch_sentences(
    client: &reqwest::Client,
    source: &TranscriptSource,
) -> Result<Vec<Sentence>> {
    let text = read_location(client, source.location()).await?;
    let sentences = match source {
        TranscriptSource::Sentences(_) => parse_sentence_table(&text)?,
        TranscriptSource::Subtitles(_) => parse_subtitle_track(&text)?,
    };
    info!(
        "loaded {} sentences from {}",
        sentences.len(),
        source.location()
    );
    Ok(sentences)
}
