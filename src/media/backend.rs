//! Seam between the gallery core and whatever actually decodes media.
//!
//! The core never fetches or decodes anything itself. It asks a
//! [`MediaBackend`] to start work and later receives [`MediaEvent`]s tagged
//! with the [`LoadToken`] it handed out, so completions that arrive after an
//! item was unmounted can be recognised and dropped.

use crate::error::MediaError;
use crate::models::{ItemKey, NaturalSize, PlaybackOptions};

/// Identifies one mount of one node. Each mount gets a fresh token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadToken(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub key: ItemKey,
    pub token: LoadToken,
    pub url: String,
}

/// Completion and progress notifications from the media subsystem.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    ImageLoaded(NaturalSize),
    ImageFailed(MediaError),
    MetadataReady(NaturalSize),
    FirstFrameReady,
    FrameUpdated,
    VideoFailed(MediaError),
}

pub trait MediaBackend {
    /// Starts loading an image. Completion is reported as
    /// [`MediaEvent::ImageLoaded`] or [`MediaEvent::ImageFailed`].
    fn load_image(&mut self, request: &LoadRequest);

    /// Creates a video element and starts fetching metadata.
    fn open_video(&mut self, request: &LoadRequest, playback: &PlaybackOptions);

    /// Starts playback. Autoplay policies may refuse with
    /// [`MediaError::AutoplayRejected`].
    fn play(&mut self, key: &ItemKey) -> Result<(), MediaError>;

    fn pause(&mut self, key: &ItemKey);

    /// Cancels pending work and frees decode resources for `key`.
    /// Must be safe to call more than once.
    fn release(&mut self, key: &ItemKey);
}

#[cfg(test)]
pub mod mock {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum BackendCall {
        LoadImage(LoadRequest),
        OpenVideo(LoadRequest),
        Play(ItemKey),
        Pause(ItemKey),
        Release(ItemKey),
    }

    /// Records every call; `reject_autoplay` makes the first `play` of each
    /// key fail the way a browser autoplay policy would.
    #[derive(Debug, Default)]
    pub struct RecordingBackend {
        pub calls: Vec<BackendCall>,
        pub reject_autoplay: bool,
        played_once: std::collections::HashSet<ItemKey>,
    }

    impl RecordingBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn rejecting_autoplay() -> Self {
            Self {
                reject_autoplay: true,
                ..Default::default()
            }
        }

        pub fn last_request(&self) -> Option<&LoadRequest> {
            self.calls.iter().rev().find_map(|call| match call {
                BackendCall::LoadImage(req) | BackendCall::OpenVideo(req) => Some(req),
                _ => None,
            })
        }

        pub fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
            self.calls.iter().filter(|call| pred(call)).count()
        }
    }

    impl MediaBackend for RecordingBackend {
        fn load_image(&mut self, request: &LoadRequest) {
            self.calls.push(BackendCall::LoadImage(request.clone()));
        }

        fn open_video(&mut self, request: &LoadRequest, _playback: &PlaybackOptions) {
            self.calls.push(BackendCall::OpenVideo(request.clone()));
        }

        fn play(&mut self, key: &ItemKey) -> Result<(), MediaError> {
            self.calls.push(BackendCall::Play(key.clone()));
            if self.reject_autoplay && self.played_once.insert(key.clone()) {
                return Err(MediaError::AutoplayRejected {
                    url: key.to_string(),
                });
            }
            Ok(())
        }

        fn pause(&mut self, key: &ItemKey) {
            self.calls.push(BackendCall::Pause(key.clone()));
        }

        fn release(&mut self, key: &ItemKey) {
            self.calls.push(BackendCall::Release(key.clone()));
        }
    }
}
