use donutfield_assets::MatcapImage;
use donutfield_common::MaterialSlot;

/// Lowest opacity the debug sliders allow.
pub const MIN_OPACITY: f32 = 0.1;

/// A matcap-shaded material. The texture it samples is looked up by `slot`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcapMaterial {
    pub slot: MaterialSlot,
    pub opacity: f32,
    pub transparent: bool,
}

impl MatcapMaterial {
    pub fn translucent(slot: MaterialSlot, opacity: f32) -> Self {
        Self {
            slot,
            opacity: opacity.clamp(0.0, 1.0),
            transparent: true,
        }
    }
}

/// The image currently bound to a material slot.
///
/// `version` increments every time new pixels arrive; a renderer compares it
/// with the version it last uploaded to decide whether to re-upload. Until the
/// bump happens the previous image stays in use.
#[derive(Debug, Clone, Default)]
pub struct MatcapTexture {
    image: Option<MatcapImage>,
    index: Option<u32>,
    version: u64,
}

impl MatcapTexture {
    pub fn image(&self) -> Option<&MatcapImage> {
        self.image.as_ref()
    }

    /// Matcap index of the pixels currently held.
    pub fn index(&self) -> Option<u32> {
        self.index
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn needs_update(&self, uploaded_version: u64) -> bool {
        self.version != uploaded_version
    }

    pub fn set(&mut self, index: u32, image: MatcapImage) {
        self.image = Some(image);
        self.index = Some(index);
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel() -> MatcapImage {
        MatcapImage {
            width: 1,
            height: 1,
            rgba: vec![255, 255, 255, 255],
        }
    }

    #[test]
    fn texture_version_bumps_on_set() {
        let mut t = MatcapTexture::default();
        assert!(!t.needs_update(0));
        t.set(4, pixel());
        assert_eq!(t.version(), 1);
        assert!(t.needs_update(0));
        assert!(!t.needs_update(1));
        assert_eq!(t.index(), Some(4));
    }

    #[test]
    fn translucent_clamps_opacity() {
        let m = MatcapMaterial::translucent(MaterialSlot::Donut, 1.5);
        assert_eq!(m.opacity, 1.0);
        assert!(m.transparent);
    }
}
