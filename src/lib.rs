//! Converters for legacy Meridian 59 game assets.
//!
//! * `roo2obj` — BSP room files (ROO) to textured Wavefront OBJ/MTL.
//! * `bgf2png` — palettized sprite containers (BGF) to a PNG atlas plus a
//!   JSON sidecar describing sprite placement, offsets and grouping.
//!
//! `roo2obj` consumes the sidecars written by `bgf2png` as its texture
//! library, so the two tools share this crate.

pub mod bgf;
pub mod material;
pub mod mesh;
pub mod obj;
pub mod palette;
pub mod roo;
pub mod units;
