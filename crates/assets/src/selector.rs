use donutfield_common::MaterialSlot;
use rand::Rng;
use std::path::{Path, PathBuf};

use crate::AssetPaths;

/// A request to (re)load the matcap image for one material slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadRequest {
    pub slot: MaterialSlot,
    pub index: u32,
    pub path: PathBuf,
}

/// Tracks the current matcap index of each material and resolves it to a path.
///
/// Each slot reloads from its own index; the text never follows the donut.
#[derive(Debug, Clone)]
pub struct TextureSelector {
    base: PathBuf,
    count: u32,
    text_index: u32,
    mesh_index: u32,
}

impl TextureSelector {
    pub fn new(paths: &AssetPaths) -> Self {
        let count = paths.matcap_count.max(1);
        let default = paths.default_matcap.clamp(1, count);
        Self {
            base: paths.matcap_dir.clone(),
            count,
            text_index: default,
            mesh_index: default,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn text_index(&self) -> u32 {
        self.text_index
    }

    pub fn mesh_index(&self) -> u32 {
        self.mesh_index
    }

    pub fn index(&self, slot: MaterialSlot) -> u32 {
        match slot {
            MaterialSlot::Text => self.text_index,
            MaterialSlot::Donut => self.mesh_index,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// `<base>/<index>.png`
    pub fn path_for(&self, index: u32) -> PathBuf {
        self.base.join(format!("{index}.png"))
    }

    /// One request per slot for the current indices.
    pub fn current_requests(&self) -> [ReloadRequest; 2] {
        MaterialSlot::ALL.map(|slot| self.request(slot))
    }

    /// Draw new indices in `[1, count]` for text then donut and return one
    /// reload request per slot.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> [ReloadRequest; 2] {
        self.text_index = rng.random_range(1..=self.count);
        self.mesh_index = rng.random_range(1..=self.count);
        tracing::debug!(
            text = self.text_index,
            donut = self.mesh_index,
            "randomized matcap selection"
        );
        self.current_requests()
    }

    fn request(&self, slot: MaterialSlot) -> ReloadRequest {
        let index = self.index(slot);
        ReloadRequest {
            slot,
            index,
            path: self.path_for(index),
        }
    }
}
