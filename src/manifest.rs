//! Builds gallery item lists from a JSON manifest or a directory of media.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::models::{GalleryItem, MediaKind};

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestFile {
    List(Vec<GalleryItem>),
    Wrapped { items: Vec<GalleryItem> },
}

/// Reads items from a JSON file holding either an array of items or an
/// object with an `items` array.
pub fn load_manifest(path: &Path) -> Result<Vec<GalleryItem>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let items = parse_manifest(&text).with_context(|| format!("Invalid manifest: {:?}", path))?;
    info!(count = items.len(), "Loaded manifest {:?}", path);
    Ok(items)
}

pub fn parse_manifest(text: &str) -> Result<Vec<GalleryItem>> {
    let parsed: ManifestFile = serde_json::from_str(text).context("Failed to parse JSON")?;
    Ok(match parsed {
        ManifestFile::List(items) | ManifestFile::Wrapped { items } => items,
    })
}

/// Options for directory scanning.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Whether to descend into subdirectories.
    pub recursive: bool,
    /// Maximum directory depth (0 = unlimited).
    pub max_depth: usize,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            max_depth: 0,
            follow_symlinks: false,
        }
    }
}

/// One grid item per media file under `root`, ordered by path. Titles are
/// file stems; urls are the file paths.
pub fn scan_directory(root: &Path, options: &ScanOptions) -> Result<Vec<GalleryItem>> {
    if !root.is_dir() {
        anyhow::bail!("Not a directory: {:?}", root);
    }

    let mut walker = WalkDir::new(root).follow_links(options.follow_symlinks);
    if !options.recursive {
        walker = walker.max_depth(1);
    } else if options.max_depth > 0 {
        walker = walker.max_depth(options.max_depth);
    }

    let mut paths: Vec<(PathBuf, MediaKind)> = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let kind = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(MediaKind::from_extension);
        if let Some(kind) = kind {
            paths.push((entry.into_path(), kind));
        }
    }
    paths.sort_by(|a, b| a.0.cmp(&b.0));

    let items: Vec<GalleryItem> = paths
        .into_iter()
        .map(|(path, kind)| {
            let title = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            GalleryItem::new(title, path.to_string_lossy()).with_kind(kind)
        })
        .collect();

    debug!(count = items.len(), "Scanned {:?}", root);
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_array_and_wrapped() {
        let list = parse_manifest(r#"[{"title": "a", "url": "a.png"}]"#).unwrap();
        assert_eq!(list.len(), 1);

        let wrapped = parse_manifest(
            r#"{"items": [{"title": "a", "url": "a.png", "x": 10, "y": 20}, {"url": "b.mp4"}]}"#,
        )
        .unwrap();
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[0].x, Some(10.0));
        assert_eq!(wrapped[1].media_kind(), MediaKind::Video);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_manifest("{\"pictures\": 3}").is_err());
        assert!(parse_manifest("not json").is_err());
    }

    #[test]
    fn test_load_manifest_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gallery.json");
        fs::write(&path, r#"[{"title": "one", "url": "one.jpg", "w": 300}]"#).unwrap();
        let items = load_manifest(&path).unwrap();
        assert_eq!(items[0].w, Some(300.0));
        assert!(load_manifest(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_scan_directory() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("nested");
        fs::create_dir(&sub).unwrap();
        fs::write(dir.path().join("b.png"), b"").unwrap();
        fs::write(dir.path().join("a.mp4"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::write(sub.join("c.jpg"), b"").unwrap();

        let items = scan_directory(dir.path(), &ScanOptions::default()).unwrap();
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert_eq!(items[0].kind, Some(MediaKind::Video));

        let recursive = ScanOptions {
            recursive: true,
            ..Default::default()
        };
        let items = scan_directory(dir.path(), &recursive).unwrap();
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_scan_requires_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("x.png");
        fs::write(&file, b"").unwrap();
        assert!(scan_directory(&file, &ScanOptions::default()).is_err());
    }
}
