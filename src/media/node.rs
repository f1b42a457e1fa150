use tracing::{debug, trace, warn};

use crate::error::MediaError;
use crate::models::{ItemKey, MediaKind, NaturalSize, PlaybackOptions, PreparedItem};

use super::backend::{LoadRequest, LoadToken, MediaBackend, MediaEvent};
use super::redraw::RedrawDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePhase {
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoPhase {
    Unloaded,
    Opening,
    MetadataKnown,
    FirstFrameReady,
    Playing,
    Paused,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaPhase {
    Image(ImagePhase),
    Video(VideoPhase),
}

/// What the renderer should show for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeVisual {
    Placeholder,
    Ready,
    TapToPlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    Played,
    Paused,
}

/// Per-item load and playback lifecycle plus local hover/drag state.
#[derive(Debug)]
pub struct MediaNode {
    key: ItemKey,
    url: String,
    playback: PlaybackOptions,
    phase: MediaPhase,
    token: Option<LoadToken>,
    reported: bool,
    tap_to_play: bool,
    hovered: bool,
    drag_offset: (f32, f32),
}

impl MediaNode {
    pub fn new(item: &PreparedItem) -> Self {
        let phase = match item.kind {
            MediaKind::Image => MediaPhase::Image(ImagePhase::Unloaded),
            MediaKind::Video => MediaPhase::Video(VideoPhase::Unloaded),
        };
        Self {
            key: item.key.clone(),
            url: item.item.url.clone(),
            playback: item.playback.clone(),
            phase,
            token: None,
            reported: false,
            tap_to_play: false,
            hovered: false,
            drag_offset: (0.0, 0.0),
        }
    }

    pub fn key(&self) -> &ItemKey {
        &self.key
    }

    pub fn phase(&self) -> MediaPhase {
        self.phase
    }

    pub fn token(&self) -> Option<LoadToken> {
        self.token
    }

    pub fn is_mounted(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_video(&self) -> bool {
        matches!(self.phase, MediaPhase::Video(_))
    }

    /// True when `item` shares this node's key but not its media source or
    /// playback options, so the node has to be rebuilt.
    pub fn is_outdated_by(&self, item: &PreparedItem) -> bool {
        self.is_video() != item.is_video()
            || self.url != item.item.url
            || self.playback != item.playback
    }

    /// Starts loading. Video decoding never begins before this call.
    pub fn mount(&mut self, token: LoadToken, backend: &mut dyn MediaBackend) {
        if self.token.is_some() {
            trace!(key = %self.key, "Node already mounted");
            return;
        }
        self.token = Some(token);
        self.reported = false;
        self.tap_to_play = false;
        self.drag_offset = (0.0, 0.0);

        let request = LoadRequest {
            key: self.key.clone(),
            token,
            url: self.url.clone(),
        };
        match self.phase {
            MediaPhase::Image(_) => {
                self.phase = MediaPhase::Image(ImagePhase::Loading);
                backend.load_image(&request);
            }
            MediaPhase::Video(_) => {
                self.phase = MediaPhase::Video(VideoPhase::Opening);
                backend.open_video(&request, &self.playback);
            }
        }
        debug!(key = %self.key, token = token.0, "Mounted media node");
    }

    /// Stops playback, cancels any pending load and drops the redraw
    /// subscription. Late events for the old token are ignored afterwards.
    pub fn unmount(&mut self, backend: &mut dyn MediaBackend, redraw: &mut RedrawDriver) {
        if self.token.take().is_none() {
            return;
        }
        if self.phase == MediaPhase::Video(VideoPhase::Playing) {
            backend.pause(&self.key);
        }
        backend.release(&self.key);
        redraw.unsubscribe(&self.key);

        self.phase = match self.phase {
            MediaPhase::Image(_) => MediaPhase::Image(ImagePhase::Unloaded),
            MediaPhase::Video(_) => MediaPhase::Video(VideoPhase::Unloaded),
        };
        self.reported = false;
        self.tap_to_play = false;
        self.hovered = false;
        self.drag_offset = (0.0, 0.0);
        debug!(key = %self.key, "Unmounted media node");
    }

    /// Applies a media event. Returns the natural size the first time it
    /// becomes known for the current load.
    pub fn handle_event(
        &mut self,
        token: LoadToken,
        event: MediaEvent,
        backend: &mut dyn MediaBackend,
        redraw: &mut RedrawDriver,
    ) -> Option<NaturalSize> {
        if self.token != Some(token) {
            trace!(key = %self.key, token = token.0, "Dropping stale media event");
            return None;
        }

        match (self.phase, event) {
            (MediaPhase::Image(ImagePhase::Loading), MediaEvent::ImageLoaded(size)) => {
                if size.is_empty() {
                    warn!(key = %self.key, "Image decoded with empty dimensions");
                    self.phase = MediaPhase::Image(ImagePhase::Failed);
                    return None;
                }
                self.phase = MediaPhase::Image(ImagePhase::Loaded);
                self.report(size)
            }
            (MediaPhase::Image(ImagePhase::Loading), MediaEvent::ImageFailed(err)) => {
                warn!(key = %self.key, error = %err, "Image failed to load");
                self.phase = MediaPhase::Image(ImagePhase::Failed);
                None
            }
            (MediaPhase::Video(VideoPhase::Opening), MediaEvent::MetadataReady(size)) => {
                self.phase = MediaPhase::Video(VideoPhase::MetadataKnown);
                self.report(size)
            }
            // Metadata may trail the first frame; keep the later phase.
            (
                MediaPhase::Video(
                    VideoPhase::MetadataKnown
                    | VideoPhase::FirstFrameReady
                    | VideoPhase::Playing
                    | VideoPhase::Paused,
                ),
                MediaEvent::MetadataReady(size),
            ) => self.report(size),
            (
                MediaPhase::Video(VideoPhase::Opening | VideoPhase::MetadataKnown),
                MediaEvent::FirstFrameReady,
            ) => {
                self.phase = MediaPhase::Video(VideoPhase::FirstFrameReady);
                if self.playback.autoplay {
                    self.start_playback(backend, redraw);
                } else {
                    self.phase = MediaPhase::Video(VideoPhase::Paused);
                    self.tap_to_play = true;
                }
                None
            }
            (MediaPhase::Video(_), MediaEvent::VideoFailed(err)) => {
                warn!(key = %self.key, error = %err, "Video failed to load");
                redraw.unsubscribe(&self.key);
                backend.release(&self.key);
                self.phase = MediaPhase::Video(VideoPhase::Failed);
                None
            }
            (MediaPhase::Video(_), MediaEvent::FrameUpdated) => None,
            (phase, event) => {
                trace!(key = %self.key, ?phase, ?event, "Ignoring media event");
                None
            }
        }
    }

    /// Images ignore clicks; videos toggle between playing and paused.
    pub fn click(&mut self, backend: &mut dyn MediaBackend, redraw: &mut RedrawDriver) -> ClickOutcome {
        match self.phase {
            MediaPhase::Video(VideoPhase::Playing) => {
                backend.pause(&self.key);
                redraw.unsubscribe(&self.key);
                self.phase = MediaPhase::Video(VideoPhase::Paused);
                ClickOutcome::Paused
            }
            MediaPhase::Video(VideoPhase::Paused | VideoPhase::FirstFrameReady) => {
                match backend.play(&self.key) {
                    Ok(()) => {
                        self.enter_playing(redraw);
                        ClickOutcome::Played
                    }
                    Err(err) => {
                        warn!(key = %self.key, error = %err, "Play request refused");
                        ClickOutcome::Ignored
                    }
                }
            }
            _ => ClickOutcome::Ignored,
        }
    }

    pub fn pointer_enter(&mut self) {
        self.hovered = true;
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = false;
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Moves the node visually. The offset is never written back to the item.
    pub fn drag_by(&mut self, dx: f32, dy: f32) {
        self.drag_offset.0 += dx;
        self.drag_offset.1 += dy;
    }

    pub fn drag_offset(&self) -> (f32, f32) {
        self.drag_offset
    }

    pub fn visual(&self) -> NodeVisual {
        match self.phase {
            MediaPhase::Image(ImagePhase::Loaded) => NodeVisual::Ready,
            MediaPhase::Video(
                VideoPhase::FirstFrameReady | VideoPhase::Playing | VideoPhase::Paused,
            ) if self.tap_to_play => NodeVisual::TapToPlay,
            MediaPhase::Video(
                VideoPhase::FirstFrameReady | VideoPhase::Playing | VideoPhase::Paused,
            ) => NodeVisual::Ready,
            _ => NodeVisual::Placeholder,
        }
    }

    fn report(&mut self, size: NaturalSize) -> Option<NaturalSize> {
        if self.reported || size.is_empty() {
            return None;
        }
        self.reported = true;
        trace!(key = %self.key, w = size.w, h = size.h, "Natural size known");
        Some(size)
    }

    fn start_playback(&mut self, backend: &mut dyn MediaBackend, redraw: &mut RedrawDriver) {
        match backend.play(&self.key) {
            Ok(()) => self.enter_playing(redraw),
            Err(MediaError::AutoplayRejected { .. }) => {
                debug!(key = %self.key, "Autoplay rejected, waiting for tap");
                self.phase = MediaPhase::Video(VideoPhase::Paused);
                self.tap_to_play = true;
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "Autoplay failed, waiting for tap");
                self.phase = MediaPhase::Video(VideoPhase::Paused);
                self.tap_to_play = true;
            }
        }
    }

    fn enter_playing(&mut self, redraw: &mut RedrawDriver) {
        self.phase = MediaPhase::Video(VideoPhase::Playing);
        self.tap_to_play = false;
        redraw.subscribe(&self.key);
    }
}
