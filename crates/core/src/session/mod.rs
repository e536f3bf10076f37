//! Session-level store: every video item of one session file, keyed by MID,
//! together with the text it was decoded from.

pub mod codec;
pub mod files;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    error::{Result, ReviewError},
    resolver::OverlapPolicy,
    store::{KeyMomentSink, KeyMomentStore},
    transcript,
    types::{KeyMoment, VideoInfo},
};

pub use codec::{DecodedRecord, DecodedSession, SkippedItem, decode, encode};
pub use files::SessionFiles;

#[derive(Debug)]
pub struct Session {
    path: Option<PathBuf>,
    text: String,
    items: BTreeMap<String, VideoInfo>,
    skipped: Vec<SkippedItem>,
    dirty: bool,
}

impl Session {
    /// Decode `text`. A parse failure yields no session at all.
    pub fn from_text(text: impl Into<String>, path: Option<PathBuf>) -> Result<Self> {
        let text = text.into();
        let DecodedSession { items, skipped } = decode(&text)?;
        Ok(Self {
            path,
            text,
            items,
            skipped,
            dirty: false,
        })
    }

    /// Ask `files` for a session and load it. `Ok(None)` when the user
    /// cancels the dialog.
    pub async fn load(files: &dyn SessionFiles, default_dir: &Path) -> Result<Option<Self>> {
        let Some(path) = files.open_path(Some(default_dir)).await else {
            debug!("open cancelled");
            return Ok(None);
        };
        Self::load_from(files, path).await.map(Some)
    }

    pub async fn load_from(files: &dyn SessionFiles, path: PathBuf) -> Result<Self> {
        let text = files.read_session(&path).await?;
        let session = Self::from_text(text, Some(path))?;
        info!(
            "loaded {} items from {} ({} skipped)",
            session.items.len(),
            session.display_path(),
            session.skipped.len()
        );
        Ok(session)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn display_path(&self) -> String {
        self.path
            .as_deref()
            .map_or_else(|| "<unsaved>".to_string(), |p| p.display().to_string())
    }

    /// Text as last loaded or saved.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn items(&self) -> &BTreeMap<String, VideoInfo> {
        &self.items
    }

    pub fn item(&self, mid: &str) -> Option<&VideoInfo> {
        self.items.get(mid)
    }

    pub fn skipped(&self) -> &[SkippedItem] {
        &self.skipped
    }

    /// Whether key moments changed since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Open one item for editing. Changes flow back through [`KeyMomentSink`].
    pub fn open_item(&self, mid: &str, policy: OverlapPolicy) -> Result<KeyMomentStore> {
        self.items
            .get(mid)
            .map(|video| KeyMomentStore::open(video, policy))
            .ok_or_else(|| ReviewError::UnknownItem {
                mid: mid.to_string(),
            })
    }

    /// Fetch the item's transcript if it has not been loaded yet.
    pub async fn resolve_sentences(
        &mut self,
        client: &reqwest::Client,
        mid: &str,
    ) -> Result<&VideoInfo> {
        let video = self
            .items
            .get_mut(mid)
            .ok_or_else(|| ReviewError::UnknownItem {
                mid: mid.to_string(),
            })?;
        if video.sentences.is_empty() {
            video.sentences = transcript::fetch_sentences(client, &video.transcript_source).await?;
        }
        Ok(video)
    }

    fn key_moments_by_mid(&self) -> BTreeMap<String, Vec<KeyMoment>> {
        let mut moments: BTreeMap<String, Vec<KeyMoment>> = self
            .items
            .iter()
            .map(|(mid, video)| (mid.clone(), video.key_moments.clone()))
            .collect();
        for skipped in &self.skipped {
            moments.insert(skipped.mid.clone(), skipped.key_moments.clone());
        }
        moments
    }

    pub fn encode(&self) -> Result<String> {
        encode(&self.text, &self.key_moments_by_mid())
    }

    /// Save to the current path, or ask for one when there is none.
    /// `Ok(None)` when the user cancels.
    pub async fn save(&mut self, files: &dyn SessionFiles) -> Result<Option<PathBuf>> {
        match self.path.clone() {
            Some(path) => {
                self.write_to(files, &path).await?;
                Ok(Some(path))
            }
            None => self.save_as(files, None).await,
        }
    }

    pub async fn save_as(
        &mut self,
        files: &dyn SessionFiles,
        default_dir: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        let default_path = self.path.as_deref().or(default_dir);
        let Some(path) = files.save_path(default_path).await else {
            debug!("save cancelled");
            return Ok(None);
        };
        self.write_to(files, &path).await?;
        self.path = Some(path.clone());
        Ok(Some(path))
    }

    async fn write_to(&mut self, files: &dyn SessionFiles, path: &Path) -> Result<()> {
        let encoded = self.encode()?;
        files.write_session(&encoded, path).await?;
        self.text = encoded;
        self.dirty = false;
        info!("saved {} items to {}", self.items.len(), path.display());
        Ok(())
    }

    /// Add an item from one session record line.
    pub fn add_item(&mut self, record: &str) -> Result<&VideoInfo> {
        let record = record.trim();
        let line = self.text.split('\n').count() + 1;
        let video = match codec::decode_record(line, record)? {
            DecodedRecord::Item(video) => video,
            DecodedRecord::Skipped(skipped) => return Err(skipped.error),
        };

        let mid = video.mid.clone();
        if self.items.contains_key(&mid) || self.skipped.iter().any(|s| s.mid == mid) {
            return Err(ReviewError::Schema {
                line,
                reason: format!("duplicate MID {mid}"),
            });
        }

        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push_str(record);
        self.dirty = true;
        info!("added {mid}");
        Ok(self.items.entry(mid).or_insert(video))
    }

    /// Remove an item and drop its record from the session text.
    pub fn remove_item(&mut self, mid: &str) -> Result<VideoInfo> {
        let video = self
            .items
            .remove(mid)
            .ok_or_else(|| ReviewError::UnknownItem {
                mid: mid.to_string(),
            })?;

        let kept: Vec<&str> = self
            .text
            .split('\n')
            .enumerate()
            .filter(|(index, line)| {
                !matches!(codec::record_mid(index + 1, line), Ok(Some(m)) if m == mid)
            })
            .map(|(_, line)| line)
            .collect();
        self.text = kept.join("\n");
        self.dirty = true;
        info!("removed {mid}");
        Ok(video)
    }
}

impl KeyMomentSink for Session {
    fn write_back(&mut self, mid: &str, key_moments: &[KeyMoment]) {
        match self.items.get_mut(mid) {
            Some(video) => {
                video.key_moments = key_moments.to_vec();
                self.dirty = true;
            }
            None => warn!("dropping key moments for unknown item {mid}"),
        }
    }
}
