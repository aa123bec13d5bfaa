//! Texture metadata sidecars.
//!
//! `bgf2png` drops one `grd#####.json` next to each PNG it writes; the
//! mesh pipeline reads sprite dimensions and the shrink factor back out
//! of them. A sidecar that is missing or malformed does not stop the
//! conversion: the material is marked invalid and the affected faces get
//! all-zero UVs so the geometry stays inspectable.

use log::warn;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Texture information one mesh object carries into the OBJ/MTL pair.
#[derive(Clone, Debug)]
pub struct Material {
    pub valid: bool,
    /// Image path relative to the texture directory.
    pub texture_file: String,
    /// Sprite dimensions in pixels (sprite 0 of the sidecar).
    pub tex_width: u32,
    pub tex_height: u32,
    pub shrink_factor: u32,
}

impl Material {
    /// Placeholder for a bitmap id whose sidecar could not be used. The
    /// conventional PNG name keeps the MTL entry pointing at a real path.
    pub fn invalid(bitmap: u16) -> Self {
        Material {
            valid: false,
            texture_file: format!("grd{bitmap:05}.png"),
            tex_width: 0,
            tex_height: 0,
            shrink_factor: 1,
        }
    }
}

/// Source of material metadata, keyed by bitmap number.
pub trait MaterialLookup {
    fn material(&self, bitmap: u16) -> Material;
}

#[derive(Error, Debug)]
pub enum SidecarError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("no sprites in document")]
    NoSprites,

    #[error("non-positive sprite dimensions or shrink factor")]
    BadDimensions,
}

/// The subset of the sidecar document the mesh pipeline consumes.
#[derive(Deserialize)]
struct SidecarDoc {
    shrink_factor: i64,
    image_file: String,
    sprites: Vec<SpriteSize>,
}

#[derive(Deserialize)]
struct SpriteSize {
    width: i64,
    height: i64,
}

/// Directory of `grd#####.json` sidecars.
pub struct SidecarLibrary {
    dir: PathBuf,
}

impl SidecarLibrary {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// `<dir>/grd#####.json`, five digits zero-padded.
    pub fn sidecar_path(&self, bitmap: u16) -> PathBuf {
        self.dir.join(format!("grd{bitmap:05}.json"))
    }

    fn load(&self, bitmap: u16) -> Result<Material, SidecarError> {
        let text = fs::read_to_string(self.sidecar_path(bitmap))?;
        let doc: SidecarDoc = serde_json::from_str(&text)?;
        let sprite = doc.sprites.first().ok_or(SidecarError::NoSprites)?;
        if doc.shrink_factor <= 0 || sprite.width <= 0 || sprite.height <= 0 {
            return Err(SidecarError::BadDimensions);
        }
        Ok(Material {
            valid: true,
            texture_file: doc.image_file,
            tex_width: sprite.width as u32,
            tex_height: sprite.height as u32,
            shrink_factor: doc.shrink_factor as u32,
        })
    }
}

impl MaterialLookup for SidecarLibrary {
    fn material(&self, bitmap: u16) -> Material {
        match self.load(bitmap) {
            Ok(mat) => mat,
            Err(err) => {
                warn!(
                    "bitmap {bitmap}: {}: {err}",
                    self.sidecar_path(bitmap).display()
                );
                Material::invalid(bitmap)
            }
        }
    }
}
