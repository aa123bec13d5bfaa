//! Typed in-memory form of one ROO room (immutable after load).
//!
//! Sidedef and sector references are table indices, already shifted for
//! the format's "0 / −1 means absent" conventions; dereference through
//! [`Room::sidedef`] and [`Room::sector`].

use bitflags::bitflags;
use glam::Vec2;

bitflags! {
    /// Per-sidedef texture flags. Only the bits that change mesh output
    /// are kept; the rest of the word is dropped on load.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WallFlags: u32 {
        /// Draw bitmap right/left reversed.
        const BACKWARDS      = 0x0000_0001;
        /// Draw upper texture bottom-up.
        const ABOVE_BOTTOMUP = 0x0000_0040;
        /// Draw lower texture top-down.
        const BELOW_TOPDOWN  = 0x0000_0080;
        /// Draw normal texture top-down.
        const NORMAL_TOPDOWN = 0x0000_0100;
        /// Don't tile texture vertically.
        const NO_VTILE       = 0x0000_0200;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SectorFlags: u32 {
        const SLOPED_FLOOR   = 0x0000_0400;
        const SLOPED_CEILING = 0x0000_0800;
    }
}

/// A map edge. Walking from endpoint 0 to endpoint 1, the positive-side
/// sector lies on one side and the negative on the other.
#[derive(Clone, Debug)]
pub struct Wall {
    pub pos_sidedef: Option<u16>,
    pub neg_sidedef: Option<u16>,
    pub pos_x_offset: i16,
    pub pos_y_offset: i16,
    pub neg_x_offset: i16,
    pub neg_y_offset: i16,
    pub pos_sector: Option<u16>,
    pub neg_sector: Option<u16>,
    /// Endpoints in 16-bit map units.
    pub x0: i16,
    pub y0: i16,
    pub x1: i16,
    pub y1: i16,
}

/// Texture information for one side of a wall. A bitmap number of 0
/// means "no texture there".
#[derive(Clone, Debug)]
pub struct Sidedef {
    pub id: u16,
    pub normal_bitmap: u16,
    pub above_bitmap: u16,
    pub below_bitmap: u16,
    pub flags: WallFlags,
    pub animation_speed: u8,
}

/// Plane coefficients satisfying `a·x + b·y + c·z + d = 0`, plus the
/// texture frame of a sloped floor or ceiling.
#[derive(Clone, Debug)]
pub struct SlopeData {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tex_origin: Vec2,
    pub tex_angle: i32,
}

impl SlopeData {
    /// Height of the plane at `(x, y)`, rounded to the nearest integer.
    pub fn height_at(&self, x: f32, y: f32) -> f32 {
        ((-self.a * x - self.b * y - self.d) / self.c).round()
    }
}

#[derive(Clone, Debug)]
pub struct Sector {
    pub id: u16,
    pub floor_bitmap: u16,
    pub ceiling_bitmap: u16,
    pub x_tex_offset: u16,
    pub y_tex_offset: u16,
    /// Base heights in fineness (scaled up from kod units on load).
    pub floor_height: f32,
    pub ceiling_height: f32,
    pub light: u8,
    pub flags: SectorFlags,
    pub animation_speed: u8,
    pub floor_slope: Option<SlopeData>,
    pub ceiling_slope: Option<SlopeData>,
}

impl Sector {
    pub fn floor_height_at(&self, x: f32, y: f32) -> f32 {
        match &self.floor_slope {
            Some(slope) => slope.height_at(x, y),
            None => self.floor_height,
        }
    }

    pub fn ceiling_height_at(&self, x: f32, y: f32) -> f32 {
        match &self.ceiling_slope {
            Some(slope) => slope.height_at(x, y),
            None => self.ceiling_height,
        }
    }
}

/// BSP leaf: a convex polygon belonging to one sector.
/// A `sector` of 0 marks "no sector".
#[derive(Clone, Debug)]
pub struct Subsector {
    pub sector: u16,
    pub points: Vec<Vec2>,
}

/// Map object. Only the position matters here; the first two things of a
/// room delimit its bounding box.
#[derive(Clone, Copy, Debug)]
pub struct Thing {
    pub x: i16,
    pub y: i16,
}

/// Bounding box in map units; wall output positions are translated and
/// Y-flipped through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapBounds {
    pub min_x: i16,
    pub min_y: i16,
    pub max_x: i16,
    pub max_y: i16,
}

impl MapBounds {
    /// The two-thing convention: a room whose things section holds exactly
    /// two entries uses them as opposite box corners. Anything else falls
    /// back to the union of wall endpoints.
    pub fn of(walls: &[Wall], things: &[Thing]) -> Self {
        if let [a, b] = things {
            return MapBounds {
                min_x: a.x.min(b.x),
                min_y: a.y.min(b.y),
                max_x: a.x.max(b.x),
                max_y: a.y.max(b.y),
            };
        }

        let mut bounds = MapBounds {
            min_x: 32767,
            min_y: 32767,
            max_x: -32767,
            max_y: -32767,
        };
        for wall in walls {
            bounds.min_x = bounds.min_x.min(wall.x0).min(wall.x1);
            bounds.min_y = bounds.min_y.min(wall.y0).min(wall.y1);
            bounds.max_x = bounds.max_x.max(wall.x0).max(wall.x1);
            bounds.max_y = bounds.max_y.max(wall.y0).max(wall.y1);
        }
        bounds
    }
}

/// One parsed room.
#[derive(Debug)]
pub struct Room {
    pub version: i32,
    pub width: i32,
    pub height: i32,
    pub walls: Vec<Wall>,
    pub sidedefs: Vec<Sidedef>,
    pub sectors: Vec<Sector>,
    pub subsectors: Vec<Subsector>,
    pub things: Vec<Thing>,
    pub bounds: MapBounds,
}

impl Room {
    pub fn sidedef(&self, index: Option<u16>) -> Option<&Sidedef> {
        index.and_then(|i| self.sidedefs.get(i as usize))
    }

    pub fn sector(&self, index: Option<u16>) -> Option<&Sector> {
        index.and_then(|i| self.sectors.get(i as usize))
    }
}
