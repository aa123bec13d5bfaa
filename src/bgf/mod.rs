//! BGF sprite containers → PNG atlas + JSON metadata.

pub mod atlas;
pub mod export;
pub mod raw;

pub use atlas::{ATLAS_MAX_DIM, ATLAS_PAD, Atlas, AtlasOverflow, build_atlas};
pub use raw::{BGF_VERSION, Bgf, BgfBitmap, BgfError, Hotspot};
