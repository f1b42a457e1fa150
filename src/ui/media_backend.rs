// GTK media backend: images decode on worker threads, videos play through
// GtkMediaFile. Every completion is posted to the main loop as a message.

use gdk4::{MemoryFormat, MemoryTexture, Paintable, Texture};
use gtk4::prelude::*;
use gtk4::MediaFile;
use parking_lot::Mutex;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::error::MediaError;
use crate::image_loader::{decode_for_display, local_path, DecodedImage};
use crate::media::{LoadRequest, LoadToken, MediaBackend, MediaEvent};
use crate::models::{ItemKey, NaturalSize, PlaybackOptions};

const DECODE_THREADS: usize = 2;
const DECODE_QUEUE: usize = 512;
const DISPLAY_MAX_EDGE: u32 = 1600;
const TEXTURE_CACHE_ENTRIES: usize = 256;

/// Decoded visuals shared with the surface, keyed by item.
pub type PaintableStore = Rc<RefCell<HashMap<ItemKey, Paintable>>>;

/// A media event addressed to one mount of one item.
#[derive(Debug, Clone)]
pub struct BackendMessage {
    pub key: ItemKey,
    pub token: LoadToken,
    pub event: MediaEvent,
}

#[derive(Debug)]
struct DecodeRequest {
    key: ItemKey,
    token: LoadToken,
    url: String,
}

#[derive(Debug)]
struct DecodeResult {
    key: ItemKey,
    token: LoadToken,
    url: String,
    decoded: Result<DecodedImage, String>,
}

#[derive(Default)]
struct VideoProgress {
    metadata_sent: Cell<bool>,
    first_frame_sent: Cell<bool>,
}

pub struct GtkMediaBackend {
    request_tx: flume::Sender<DecodeRequest>,
    live_tokens: Arc<Mutex<HashSet<LoadToken>>>,
    tokens: HashMap<ItemKey, LoadToken>,
    videos: HashMap<ItemKey, MediaFile>,
    textures: Rc<RefCell<lru::LruCache<String, (Texture, NaturalSize)>>>,
    paintables: PaintableStore,
    events_tx: async_channel::Sender<BackendMessage>,
}

impl GtkMediaBackend {
    pub fn new(events_tx: async_channel::Sender<BackendMessage>, paintables: PaintableStore) -> Self {
        let (request_tx, request_rx) = flume::bounded::<DecodeRequest>(DECODE_QUEUE);
        let (result_tx, result_rx) = async_channel::unbounded::<DecodeResult>();
        let live_tokens: Arc<Mutex<HashSet<LoadToken>>> = Arc::new(Mutex::new(HashSet::new()));

        for worker_id in 0..DECODE_THREADS {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            let live = Arc::clone(&live_tokens);
            std::thread::Builder::new()
                .name(format!("gallery-decode-{}", worker_id))
                .spawn(move || decode_loop(worker_id, rx, tx, live))
                .map_err(|e| warn!(worker_id, error = %e, "Failed to spawn decode worker"))
                .ok();
        }

        let textures = Rc::new(RefCell::new(lru::LruCache::new(
            NonZeroUsize::new(TEXTURE_CACHE_ENTRIES).unwrap_or(NonZeroUsize::MIN),
        )));

        let backend = Self {
            request_tx,
            live_tokens,
            tokens: HashMap::new(),
            videos: HashMap::new(),
            textures,
            paintables,
            events_tx,
        };
        backend.spawn_result_pump(result_rx);
        backend
    }

    /// Uploads decoded pixels on the main loop and forwards the outcome.
    fn spawn_result_pump(&self, result_rx: async_channel::Receiver<DecodeResult>) {
        let live = Arc::clone(&self.live_tokens);
        let textures = Rc::clone(&self.textures);
        let paintables = Rc::clone(&self.paintables);
        let events_tx = self.events_tx.clone();

        glib::spawn_future_local(async move {
            while let Ok(result) = result_rx.recv().await {
                if !live.lock().contains(&result.token) {
                    trace!(key = %result.key, "Dropping decode for released item");
                    continue;
                }
                let event = match result.decoded {
                    Ok(decoded) => {
                        let size = NaturalSize::new(decoded.natural_w, decoded.natural_h);
                        let texture = texture_from_rgba(decoded);
                        textures.borrow_mut().put(result.url.clone(), (texture.clone(), size));
                        paintables
                            .borrow_mut()
                            .insert(result.key.clone(), texture.upcast::<Paintable>());
                        MediaEvent::ImageLoaded(size)
                    }
                    Err(reason) => {
                        MediaEvent::ImageFailed(MediaError::load_failure(&result.url, reason))
                    }
                };
                let message = BackendMessage {
                    key: result.key,
                    token: result.token,
                    event,
                };
                if events_tx.send(message).await.is_err() {
                    break;
                }
            }
        });
    }

    fn post(&self, key: &ItemKey, token: LoadToken, event: MediaEvent) {
        let message = BackendMessage {
            key: key.clone(),
            token,
            event,
        };
        if self.events_tx.try_send(message).is_err() {
            warn!(%key, "Media event channel closed");
        }
    }

    fn track(&mut self, request: &LoadRequest) {
        if let Some(previous) = self.tokens.insert(request.key.clone(), request.token) {
            self.live_tokens.lock().remove(&previous);
        }
        self.live_tokens.lock().insert(request.token);
    }
}

impl MediaBackend for GtkMediaBackend {
    fn load_image(&mut self, request: &LoadRequest) {
        self.track(request);

        let cached = self.textures.borrow_mut().get(&request.url).cloned();
        if let Some((texture, size)) = cached {
            self.paintables
                .borrow_mut()
                .insert(request.key.clone(), texture.upcast::<Paintable>());
            self.post(&request.key, request.token, MediaEvent::ImageLoaded(size));
            return;
        }

        let decode = DecodeRequest {
            key: request.key.clone(),
            token: request.token,
            url: request.url.clone(),
        };
        if self.request_tx.try_send(decode).is_err() {
            warn!(key = %request.key, "Decode queue full");
            let err = MediaError::load_failure(&request.url, "decode queue full");
            self.post(&request.key, request.token, MediaEvent::ImageFailed(err));
        }
    }

    fn open_video(&mut self, request: &LoadRequest, playback: &PlaybackOptions) {
        self.track(request);

        let Some(path) = local_path(&request.url) else {
            let err = MediaError::load_failure(&request.url, "only local files can be played");
            self.post(&request.key, request.token, MediaEvent::VideoFailed(err));
            return;
        };

        let media = MediaFile::for_filename(&path);
        media.set_muted(playback.muted);
        media.set_loop(playback.looped);

        let progress = Rc::new(VideoProgress::default());
        let (key, token) = (request.key.clone(), request.token);

        let events_tx = self.events_tx.clone();
        let size_progress = Rc::clone(&progress);
        let size_key = key.clone();
        media.connect_invalidate_size(move |media| {
            report_video_size(media, &size_progress, &size_key, token, &events_tx);
        });

        let events_tx = self.events_tx.clone();
        let frame_key = key.clone();
        media.connect_invalidate_contents(move |media| {
            report_video_size(media, &progress, &frame_key, token, &events_tx);
            if !progress.first_frame_sent.replace(true) {
                let _ = events_tx.try_send(BackendMessage {
                    key: frame_key.clone(),
                    token,
                    event: MediaEvent::FirstFrameReady,
                });
            }
        });

        let events_tx = self.events_tx.clone();
        let url = request.url.clone();
        media.connect_error_notify(move |media| {
            if let Some(err) = media.error() {
                let _ = events_tx.try_send(BackendMessage {
                    key: key.clone(),
                    token,
                    event: MediaEvent::VideoFailed(MediaError::load_failure(&url, err)),
                });
            }
        });

        self.paintables
            .borrow_mut()
            .insert(request.key.clone(), media.clone().upcast::<Paintable>());
        self.videos.insert(request.key.clone(), media);
        debug!(key = %request.key, "Opened video");
    }

    fn play(&mut self, key: &ItemKey) -> Result<(), MediaError> {
        match self.videos.get(key) {
            Some(media) => {
                media.play();
                Ok(())
            }
            None => Err(MediaError::load_failure(key.as_str(), "no video element")),
        }
    }

    fn pause(&mut self, key: &ItemKey) {
        if let Some(media) = self.videos.get(key) {
            media.pause();
        }
    }

    fn release(&mut self, key: &ItemKey) {
        if let Some(token) = self.tokens.remove(key) {
            self.live_tokens.lock().remove(&token);
        }
        if let Some(media) = self.videos.remove(key) {
            media.pause();
            media.clear();
            debug!(%key, "Released video");
        }
        self.paintables.borrow_mut().remove(key);
    }
}

fn report_video_size(
    media: &MediaFile,
    progress: &VideoProgress,
    key: &ItemKey,
    token: LoadToken,
    events_tx: &async_channel::Sender<BackendMessage>,
) {
    if progress.metadata_sent.get() {
        return;
    }
    let (w, h) = (media.intrinsic_width(), media.intrinsic_height());
    if w <= 0 || h <= 0 {
        return;
    }
    progress.metadata_sent.set(true);
    let _ = events_tx.try_send(BackendMessage {
        key: key.clone(),
        token,
        event: MediaEvent::MetadataReady(NaturalSize::new(w as u32, h as u32)),
    });
}

fn decode_loop(
    worker_id: usize,
    rx: flume::Receiver<DecodeRequest>,
    tx: async_channel::Sender<DecodeResult>,
    live: Arc<Mutex<HashSet<LoadToken>>>,
) {
    debug!(worker_id, "Decode worker started");
    while let Ok(req) = rx.recv() {
        if !live.lock().contains(&req.token) {
            trace!(key = %req.key, "Skipping cancelled decode");
            continue;
        }
        let decoded = match local_path(&req.url) {
            Some(path) => decode_for_display(&path, DISPLAY_MAX_EDGE).map_err(|e| format!("{:#}", e)),
            None => Err("only local files can be loaded".to_string()),
        };
        let result = DecodeResult {
            key: req.key,
            token: req.token,
            url: req.url,
            decoded,
        };
        if tx.send_blocking(result).is_err() {
            break;
        }
    }
    debug!(worker_id, "Decode worker stopped");
}

fn texture_from_rgba(decoded: DecodedImage) -> Texture {
    let stride = decoded.width as usize * 4;
    let bytes = glib::Bytes::from_owned(decoded.rgba);
    MemoryTexture::new(
        decoded.width as i32,
        decoded.height as i32,
        MemoryFormat::R8g8b8a8,
        &bytes,
        stride,
    )
    .upcast()
}
