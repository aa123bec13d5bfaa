//! Unit conventions shared by the ROO and BGF pipelines.

/// Fineness units per world unit.
pub const FINENESS: f32 = 1024.0;

/// Sector heights and wall endpoints are stored in 16-bit kod units;
/// multiplying by this factor yields fineness.
pub const BLAK_FACTOR: f32 = 16.0;

/// Texture pixels per world unit.
pub const BITMAP_WIDTH: f32 = 64.0;

/// Angular units in a full circle (texture rotation on sloped planes).
pub const NUM_DEGREES: f32 = 4096.0;
