use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::playback::NowPlaying;
use crate::scroll::TextScroller;
use crate::vinyl::VinylSpin;

/// Album-art slot. `Loaded` holds the decoded, square-resized bitmap;
/// it is replaced whole on a successful fetch and never mutated in place.
pub enum ArtworkState {
    Idle,
    Loading,
    Loaded(DynamicImage),
    Failed,
}

impl ArtworkState {
    pub fn image(&self) -> Option<&DynamicImage> {
        match self {
            ArtworkState::Loaded(img) => Some(img),
            _ => None,
        }
    }
}

/// Art download the event loop should start after a playback update.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtFetch {
    pub track_id: String,
    pub url: String,
}

/// All mutable display state, owned by the event loop and touched from no
/// other task. Background fetches report back through events carrying the
/// track id they were started for, so stale results can be dropped here.
pub struct App {
    pub is_running: bool,
    pub current_track_id: String,
    pub track: Option<NowPlaying>,
    pub artwork: ArtworkState,
    pub scroller: TextScroller,
    pub vinyl: VinylSpin,
    pub show_vinyl: bool,
    /// Track id of the art fetch currently in flight. The marquee skips
    /// (but keeps) its position while this is set; only the matching
    /// result releases it, so a stale result cannot unlock early.
    pending_fetch: Option<String>,
    last_art_url: Option<String>,
}

impl App {
    pub fn new(scroll_width: usize, vinyl: VinylSpin, show_vinyl: bool) -> Self {
        Self {
            is_running: true,
            current_track_id: String::new(),
            track: None,
            artwork: ArtworkState::Idle,
            scroller: TextScroller::new(scroll_width),
            vinyl,
            show_vinyl,
            pending_fetch: None,
            last_art_url: None,
        }
    }

    pub fn display_text(&self) -> String {
        self.scroller.line()
    }

    /// Apply one data tick. `None` (paused/stopped session) leaves the
    /// last frame untouched. Returns the art download to start, if any;
    /// text updates immediately on track change even when the art fetch
    /// later fails.
    pub fn apply_playback(&mut self, info: Option<NowPlaying>) -> Option<ArtFetch> {
        let track = info?;

        let changed = track.id != self.current_track_id;
        if changed {
            info!(track = %track.display_text(), "track change");
            self.current_track_id = track.id.clone();
            self.scroller.set_text(&track.display_text());
            self.scroller.reset();
            self.vinyl.set_label(&track.title, &track.artist);
        }

        // Fetch when the art URL is new; a previous failure cleared the
        // remembered URL, so the next tick naturally acts as the retry.
        let fetch = match &track.art_url {
            Some(url) if self.last_art_url.as_deref() != Some(url.as_str()) => {
                self.last_art_url = Some(url.clone());
                if self.artwork.image().is_none() {
                    self.artwork = ArtworkState::Loading;
                }
                self.pending_fetch = Some(track.id.clone());
                Some(ArtFetch {
                    track_id: track.id.clone(),
                    url: url.clone(),
                })
            }
            _ => None,
        };

        self.track = Some(track);
        fetch
    }

    /// Apply a finished art fetch. Results for a track that is no longer
    /// current are dropped; a failure keeps whatever image is on screen.
    pub fn apply_artwork(&mut self, track_id: &str, result: Option<DynamicImage>) {
        if self.pending_fetch.as_deref() == Some(track_id) {
            self.pending_fetch = None;
        }
        if track_id != self.current_track_id {
            debug!(%track_id, "dropping stale artwork result");
            return;
        }
        match result {
            Some(img) => self.artwork = ArtworkState::Loaded(img),
            None => {
                warn!(%track_id, "artwork fetch failed, keeping previous frame");
                // Forget the URL so the fixed-interval refresh retries.
                self.last_art_url = None;
                if self.artwork.image().is_none() {
                    self.artwork = ArtworkState::Failed;
                }
            }
        }
    }

    /// Marquee tick. Skipped without losing position while a refresh is
    /// being applied.
    pub fn on_scroll_tick(&mut self) {
        if self.pending_fetch.is_none() {
            self.scroller.tick();
        }
    }

    pub fn on_vinyl_tick(&mut self) {
        if self.show_vinyl {
            self.vinyl.tick();
        }
    }

    pub fn toggle_vinyl(&mut self) {
        self.show_vinyl = !self.show_vinyl;
    }

    pub fn quit(&mut self) {
        self.is_running = false;
    }
}
