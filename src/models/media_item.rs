use std::fmt;

use serde::{Deserialize, Serialize};

use super::placement::PlacementMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp" | "tiff" | "tif" | "svg" | "avif" => {
                Some(Self::Image)
            }
            "mp4" | "webm" | "mov" | "m4v" | "ogv" | "ogg" | "mkv" | "avi" => Some(Self::Video),
            _ => None,
        }
    }

    /// Classifies a media URL by its suffix. Query strings and fragments are
    /// ignored; anything unrecognised is treated as an image.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let file = path.rsplit('/').next().unwrap_or_default();
        file.rsplit_once('.')
            .and_then(|(_, ext)| Self::from_extension(ext))
            .unwrap_or(Self::Image)
    }
}

/// Input descriptor for one gallery entry.
///
/// Coordinates and sizes are in unscaled base units; they are multiplied by
/// the global scale during layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MediaKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoplay: Option<bool>,
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub looped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

impl GalleryItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_width(mut self, w: f32) -> Self {
        self.w = Some(w);
        self
    }

    pub fn with_height(mut self, h: f32) -> Self {
        self.h = Some(h);
        self
    }

    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Identity used for the natural-size registry and node reuse:
    /// url, then title, then the serialized item.
    pub fn identity_key(&self) -> ItemKey {
        if !self.url.is_empty() {
            return ItemKey(self.url.clone());
        }
        if !self.title.is_empty() {
            return ItemKey(self.title.clone());
        }
        ItemKey(serde_json::to_string(self).unwrap_or_default())
    }

    pub fn media_kind(&self) -> MediaKind {
        self.kind.unwrap_or_else(|| MediaKind::from_url(&self.url))
    }

    pub fn placement_mode(&self) -> PlacementMode {
        if self.x.is_some() || self.y.is_some() {
            PlacementMode::Free
        } else {
            PlacementMode::Grid
        }
    }

    /// Declared rendered size; width wins when both are present.
    pub fn declared_size(&self) -> DeclaredSize {
        match (self.w, self.h) {
            (Some(w), _) => DeclaredSize::Width(w),
            (None, Some(h)) => DeclaredSize::Height(h),
            (None, None) => DeclaredSize::Natural,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeclaredSize {
    Width(f32),
    Height(f32),
    Natural,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(String);

impl ItemKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Video playback hints after defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackOptions {
    pub autoplay: bool,
    pub looped: bool,
    pub muted: bool,
    pub inline: bool,
    pub poster_url: Option<String>,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            autoplay: true,
            looped: true,
            muted: true,
            inline: true,
            poster_url: None,
        }
    }
}

/// An item after ingestion: identity, media kind and placement mode are
/// resolved once and cached with it.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedItem {
    pub item: GalleryItem,
    pub key: ItemKey,
    pub kind: MediaKind,
    pub mode: PlacementMode,
    pub playback: PlaybackOptions,
}

impl PreparedItem {
    pub fn new(item: GalleryItem) -> Self {
        let key = item.identity_key();
        let kind = item.media_kind();
        let mode = item.placement_mode();
        let defaults = PlaybackOptions::default();
        let playback = PlaybackOptions {
            autoplay: item.autoplay.unwrap_or(defaults.autoplay),
            looped: item.looped.unwrap_or(defaults.looped),
            muted: item.muted.unwrap_or(defaults.muted),
            inline: true,
            poster_url: item.poster_url.clone(),
        };
        Self {
            item,
            key,
            kind,
            mode,
            playback,
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    pub fn title(&self) -> &str {
        &self.item.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_url_suffix() {
        assert_eq!(MediaKind::from_url("clips/intro.MP4"), MediaKind::Video);
        assert_eq!(
            MediaKind::from_url("https://cdn.test/a.webm?token=1#t=3"),
            MediaKind::Video
        );
        assert_eq!(MediaKind::from_url("photo.jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_url("https://cdn.test/no-ext"), MediaKind::Image);
        assert_eq!(MediaKind::from_url("dir.mp4/frame"), MediaKind::Image);
    }

    #[test]
    fn test_explicit_kind_wins() {
        let item = GalleryItem::new("t", "stream.php").with_kind(MediaKind::Video);
        assert_eq!(item.media_kind(), MediaKind::Video);
    }

    #[test]
    fn test_identity_key_fallbacks() {
        assert_eq!(GalleryItem::new("T", "u.png").identity_key().as_str(), "u.png");
        assert_eq!(GalleryItem::new("T", "").identity_key().as_str(), "T");

        let anonymous = GalleryItem {
            w: Some(120.0),
            ..Default::default()
        };
        let key = anonymous.identity_key();
        assert!(key.as_str().contains("120"));
        assert_eq!(key, anonymous.clone().identity_key());
    }

    #[test]
    fn test_placement_mode_from_coordinates() {
        assert_eq!(GalleryItem::new("a", "a.png").placement_mode(), PlacementMode::Grid);
        let mut only_y = GalleryItem::new("b", "b.png");
        only_y.y = Some(10.0);
        assert_eq!(only_y.placement_mode(), PlacementMode::Free);
    }

    #[test]
    fn test_width_is_authoritative() {
        let item = GalleryItem::new("a", "a.png").with_width(200.0).with_height(90.0);
        assert_eq!(item.declared_size(), DeclaredSize::Width(200.0));
        let item = GalleryItem::new("a", "a.png").with_height(90.0);
        assert_eq!(item.declared_size(), DeclaredSize::Height(90.0));
    }

    #[test]
    fn test_deserialize_wire_names() {
        let json = r#"{
            "title": "Intro",
            "url": "intro.bin",
            "type": "video",
            "loop": false,
            "posterUrl": "intro.jpg",
            "x": 10
        }"#;
        let item: GalleryItem = serde_json::from_str(json).unwrap();
        let prepared = PreparedItem::new(item);
        assert!(prepared.is_video());
        assert_eq!(prepared.mode, PlacementMode::Free);
        assert!(!prepared.playback.looped);
        assert!(prepared.playback.muted);
        assert!(prepared.playback.autoplay);
        assert_eq!(prepared.playback.poster_url.as_deref(), Some("intro.jpg"));
    }
}
