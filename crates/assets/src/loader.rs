use donutfield_common::MaterialSlot;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::{AssetError, MATCAP_SIZE, ReloadRequest};

/// Raw font bytes that parsed as a valid face.
#[derive(Debug, Clone)]
pub struct FontAsset {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

/// Decoded RGBA8 matcap pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcapImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Work for the loader thread.
#[derive(Debug, Clone)]
pub enum LoadRequest {
    Font(PathBuf),
    Matcap(ReloadRequest),
}

/// A completed load, delivered back to the main thread.
#[derive(Debug)]
pub enum LoadEvent {
    Font(Result<FontAsset, AssetError>),
    Matcap {
        slot: MaterialSlot,
        index: u32,
        result: Result<MatcapImage, AssetError>,
    },
}

/// Read a font file and check that it parses.
pub fn load_font(path: &Path) -> Result<FontAsset, AssetError> {
    let data = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ttf_parser::Face::parse(&data, 0).map_err(|e| AssetError::InvalidFont {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(FontAsset {
        path: path.to_path_buf(),
        data,
    })
}

/// Read and decode a matcap image into RGBA8.
pub fn load_matcap(path: &Path) -> Result<MatcapImage, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let img = image::load_from_memory(&bytes)
        .map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = img.dimensions();
    if width != MATCAP_SIZE || height != MATCAP_SIZE {
        tracing::warn!(
            path = %path.display(),
            width,
            height,
            "matcap is not {MATCAP_SIZE}x{MATCAP_SIZE}"
        );
    }
    Ok(MatcapImage {
        width,
        height,
        rgba: img.into_raw(),
    })
}

/// Background loader: one worker thread, requests in, results out.
///
/// There is no cancellation or timeout; every request eventually produces
/// exactly one [`LoadEvent`] unless the worker has exited.
pub struct AssetLoader {
    request_tx: Sender<LoadRequest>,
    result_rx: Receiver<LoadEvent>,
    in_flight: usize,
}

impl AssetLoader {
    pub fn new() -> Result<Self, AssetError> {
        let (request_tx, request_rx) = mpsc::channel::<LoadRequest>();
        let (result_tx, result_rx) = mpsc::channel::<LoadEvent>();

        thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || Self::worker(request_rx, result_tx))
            .map_err(|source| AssetError::Io {
                path: PathBuf::from("<asset-loader thread>"),
                source,
            })?;

        Ok(Self {
            request_tx,
            result_rx,
            in_flight: 0,
        })
    }

    fn worker(request_rx: Receiver<LoadRequest>, result_tx: Sender<LoadEvent>) {
        while let Ok(request) = request_rx.recv() {
            let event = match request {
                LoadRequest::Font(path) => {
                    tracing::debug!(path = %path.display(), "loading font");
                    LoadEvent::Font(load_font(&path))
                }
                LoadRequest::Matcap(req) => {
                    tracing::debug!(slot = %req.slot, index = req.index, "loading matcap");
                    LoadEvent::Matcap {
                        slot: req.slot,
                        index: req.index,
                        result: load_matcap(&req.path),
                    }
                }
            };
            if result_tx.send(event).is_err() {
                // Owner dropped
                break;
            }
        }
    }

    /// Queue a load.
    pub fn request(&mut self, request: LoadRequest) -> Result<(), AssetError> {
        self.request_tx
            .send(request)
            .map_err(|_| AssetError::WorkerGone)?;
        self.in_flight += 1;
        Ok(())
    }

    /// Number of requests whose result has not been collected yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Collect every completed load without blocking.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.result_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            events.push(event);
        }
        events
    }

    /// Block until one load completes or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadEvent> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(event)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
