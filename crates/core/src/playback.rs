//! Keeps a media element inside the selected key moment while playing in
//! key-moment mode, and out of the way otherwise.

use log::debug;

use crate::types::TimeRange;

/// Commands the controller issues to the media element it owns.
pub trait MediaHandle {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
}

/// Events reported back by the media element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    Play,
    Pause,
    TimeUpdate { position: f64 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    /// Free playback, no boundary enforcement.
    PlayingUnconstrained,
    /// Key-moment mode: reaching the range end pauses and rewinds.
    PlayingScoped,
}

pub struct PlaybackController<M: MediaHandle> {
    media: M,
    status: PlaybackStatus,
    scoped_requested: bool,
    active_range: Option<TimeRange>,
    position: f64,
}

impl<M: MediaHandle> PlaybackController<M> {
    pub fn new(media: M) -> Self {
        Self {
            media,
            status: PlaybackStatus::Idle,
            scoped_requested: false,
            active_range: None,
            position: 0.0,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status != PlaybackStatus::Idle
    }

    /// Last position reported by the media element.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn active_range(&self) -> Option<TimeRange> {
        self.active_range
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn into_media(self) -> M {
        self.media
    }

    /// Point the controller at a new moment's time range. A changed range
    /// rewinds to its start but does not stop playback.
    pub fn set_active_range(&mut self, range: Option<TimeRange>) {
        if self.active_range == range {
            return;
        }
        self.active_range = range;
        if let Some(range) = range {
            debug!("active range now {:.2}..{:.2}", range.start, range.end);
            self.seek(range.start);
        }
    }

    /// Play in key-moment mode. The mode takes hold on the next play event.
    pub fn play_scoped(&mut self) {
        self.scoped_requested = true;
        self.media.play();
    }

    pub fn play(&mut self) {
        self.media.play();
    }

    pub fn pause(&mut self) {
        self.media.pause();
    }

    /// Jump back to the start of the active range.
    pub fn restart(&mut self) {
        if let Some(range) = self.active_range {
            self.seek(range.start);
        }
    }

    /// Seek to `seconds`, clamped to the active range when there is one.
    pub fn scrub(&mut self, seconds: f64) {
        let target = self
            .active_range
            .map_or(seconds, |range| range.clamp(seconds));
        self.seek(target);
    }

    pub fn handle_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::Play => {
                self.status = if std::mem::take(&mut self.scoped_requested) {
                    PlaybackStatus::PlayingScoped
                } else {
                    PlaybackStatus::PlayingUnconstrained
                };
                debug!("playback started: {:?}", self.status);
            }
            MediaEvent::Pause => {
                self.status = PlaybackStatus::Idle;
                debug!("playback paused at {:.2}", self.position);
            }
            MediaEvent::TimeUpdate { position } => {
                self.position = position;
                self.enforce_boundary();
            }
        }
    }

    fn enforce_boundary(&mut self) {
        if self.status != PlaybackStatus::PlayingScoped {
            return;
        }
        let Some(range) = self.active_range else {
            return;
        };
        if self.position >= range.end {
            debug!("reached end of key moment at {:.2}, rewinding", self.position);
            self.media.pause();
            self.seek(range.start);
        }
    }

    fn seek(&mut self, seconds: f64) {
        self.position = seconds;
        self.media.seek(seconds);
    }
}
