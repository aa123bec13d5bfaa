//! ROO room containers.
//!
//! * `raw` — binary reader for the multi-section BSP container.
//! * `geometry` — typed records and per-sector height queries.

pub mod geometry;
pub mod raw;

pub use geometry::{
    MapBounds, Room, Sector, SectorFlags, Sidedef, SlopeData, Subsector, Thing, Wall, WallFlags,
};
pub use raw::{MIN_ROOM_VERSION, RooError};
