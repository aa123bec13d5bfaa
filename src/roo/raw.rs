//! ROO container reader.
//!
//! The file is little-endian and offset-driven: a fixed header points at a
//! main-info block, which in turn points at the node, wall, sidedef,
//! sector and things subsections. Each subsection starts with a 16-bit
//! record count.
//!
//! 32-bit coordinates (node points, slope records) are stored as signed
//! integers before room version 13 and as IEEE-754 floats from version 13
//! on; [`read_coord`] decides at runtime. Wall endpoints and sector base
//! heights are 16-bit regardless of version.

use byteorder::{LittleEndian as LE, ReadBytesExt};
use glam::vec2;
use std::{
    fs::File,
    io::{self, BufReader, Read, Seek, SeekFrom},
    path::Path,
};
use thiserror::Error;

use crate::roo::geometry::{
    MapBounds, Room, Sector, SectorFlags, Sidedef, SlopeData, Subsector, Thing, Wall, WallFlags,
};
use crate::units::BLAK_FACTOR;

const ROO_MAGIC: [u8; 4] = [0x52, 0x4F, 0x4F, 0xB1];

/// Oldest room version this reader accepts.
pub const MIN_ROOM_VERSION: i32 = 10;

/// First version that stores 32-bit coordinates as floats.
const FLOAT_COORDS_VERSION: i32 = 13;

/// Loader errors. All of them abort the pipeline before any mesh output.
#[derive(Error, Debug)]
pub enum RooError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("not a ROO file (bad magic)")]
    BadMagic,

    #[error("unsupported room version {0} (minimum {MIN_ROOM_VERSION})")]
    UnsupportedVersion(i32),

    #[error("unknown BSP node tag {tag:#04x} at byte {offset}")]
    BadNodeTag { tag: u8, offset: u64 },
}

impl Room {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RooError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read + Seek>(mut r: R) -> Result<Self, RooError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != ROO_MAGIC {
            return Err(RooError::BadMagic);
        }

        let version = r.read_i32::<LE>()?;
        if version < MIN_ROOM_VERSION {
            return Err(RooError::UnsupportedVersion(version));
        }

        let _security = r.read_i32::<LE>()?;

        let main_info = r.read_u32::<LE>()?;
        r.seek(SeekFrom::Start(u64::from(main_info)))?;

        let width = r.read_i32::<LE>()?;
        let height = r.read_i32::<LE>()?;

        let node_pos = r.read_u32::<LE>()?;
        let _client_pos = r.read_u32::<LE>()?; // client geometry, unused
        let wall_pos = r.read_u32::<LE>()?;
        let sidedef_pos = r.read_u32::<LE>()?;
        let sector_pos = r.read_u32::<LE>()?;
        let things_pos = r.read_u32::<LE>()?;

        r.seek(SeekFrom::Start(u64::from(node_pos)))?;
        let subsectors = load_subsectors(&mut r, version)?;

        r.seek(SeekFrom::Start(u64::from(wall_pos)))?;
        let walls = load_walls(&mut r)?;

        r.seek(SeekFrom::Start(u64::from(sidedef_pos)))?;
        let sidedefs = load_sidedefs(&mut r)?;

        r.seek(SeekFrom::Start(u64::from(sector_pos)))?;
        let sectors = load_sectors(&mut r, version)?;

        r.seek(SeekFrom::Start(u64::from(things_pos)))?;
        let things = load_things(&mut r)?;

        let bounds = MapBounds::of(&walls, &things);

        Ok(Room {
            version,
            width,
            height,
            walls,
            sidedefs,
            sectors,
            subsectors,
            things,
            bounds,
        })
    }
}

/// Integer before version 13, float bit-pattern from 13 on.
fn read_coord<R: Read>(r: &mut R, version: i32) -> io::Result<f32> {
    let raw = r.read_i32::<LE>()?;
    Ok(if version < FLOAT_COORDS_VERSION {
        raw as f32
    } else {
        f32::from_bits(raw as u32)
    })
}

/// 0 means "no sidedef", anything else is a 1-based table index.
fn sidedef_ref(raw: u16) -> Option<u16> {
    (raw != 0).then(|| raw - 1)
}

/// −1 means "no sector", anything else indexes the table directly.
fn sector_ref(raw: i16) -> Option<u16> {
    (raw >= 0).then_some(raw as u16)
}

/// Walk the tagged node sequence, keeping only the leaves.
fn load_subsectors<R: Read + Seek>(r: &mut R, version: i32) -> Result<Vec<Subsector>, RooError> {
    let node_count = r.read_u16::<LE>()?;
    let mut subsectors = Vec::with_capacity(node_count as usize / 2);

    for _ in 0..node_count {
        let tag = r.read_u8()?;
        match tag {
            1 => {
                // internal node: bounding box + splitter data
                r.seek(SeekFrom::Current(16 + 18))?;
            }
            2 => {
                r.seek(SeekFrom::Current(16))?; // bounding box
                let sector = r.read_u16::<LE>()?;
                let point_count = r.read_u16::<LE>()?;
                let mut points = Vec::with_capacity(point_count as usize);
                for _ in 0..point_count {
                    let x = read_coord(r, version)?;
                    let y = read_coord(r, version)?;
                    points.push(vec2(x, y));
                }
                subsectors.push(Subsector { sector, points });
            }
            tag => {
                let offset = r.stream_position()?.saturating_sub(1);
                return Err(RooError::BadNodeTag { tag, offset });
            }
        }
    }
    Ok(subsectors)
}

fn load_walls<R: Read>(r: &mut R) -> Result<Vec<Wall>, RooError> {
    let count = r.read_u16::<LE>()?;
    let mut walls = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let pos_sidedef = sidedef_ref(r.read_u16::<LE>()?);
        let neg_sidedef = sidedef_ref(r.read_u16::<LE>()?);
        let pos_x_offset = r.read_i16::<LE>()?;
        let neg_x_offset = r.read_i16::<LE>()?;
        let pos_y_offset = r.read_i16::<LE>()?;
        let neg_y_offset = r.read_i16::<LE>()?;
        let pos_sector = sector_ref(r.read_i16::<LE>()?);
        let neg_sector = sector_ref(r.read_i16::<LE>()?);

        // endpoints occupy 32 bits each but carry 16-bit map units
        let x0 = r.read_i32::<LE>()? as i16;
        let y0 = r.read_i32::<LE>()? as i16;
        let x1 = r.read_i32::<LE>()? as i16;
        let y1 = r.read_i32::<LE>()? as i16;

        walls.push(Wall {
            pos_sidedef,
            neg_sidedef,
            pos_x_offset,
            pos_y_offset,
            neg_x_offset,
            neg_y_offset,
            pos_sector,
            neg_sector,
            x0,
            y0,
            x1,
            y1,
        });
    }
    Ok(walls)
}

fn load_sidedefs<R: Read>(r: &mut R) -> Result<Vec<Sidedef>, RooError> {
    let count = r.read_u16::<LE>()?;
    let mut sidedefs = Vec::with_capacity(count as usize);

    for _ in 0..count {
        sidedefs.push(Sidedef {
            id: r.read_u16::<LE>()?,
            normal_bitmap: r.read_u16::<LE>()?,
            above_bitmap: r.read_u16::<LE>()?,
            below_bitmap: r.read_u16::<LE>()?,
            flags: WallFlags::from_bits_truncate(r.read_u32::<LE>()?),
            animation_speed: r.read_u8()?,
        });
    }
    Ok(sidedefs)
}

fn load_slope<R: Read + Seek>(r: &mut R, version: i32) -> Result<SlopeData, RooError> {
    let a = read_coord(r, version)?;
    let b = read_coord(r, version)?;
    let c = read_coord(r, version)?;
    let d = read_coord(r, version)?;
    let tex_origin = vec2(read_coord(r, version)?, read_coord(r, version)?);
    let tex_angle = r.read_i32::<LE>()?;

    // three packed (x, y, z) vertex triplets, unused
    r.seek(SeekFrom::Current(18))?;

    Ok(SlopeData {
        a,
        b,
        c,
        d,
        tex_origin,
        tex_angle,
    })
}

fn load_sectors<R: Read + Seek>(r: &mut R, version: i32) -> Result<Vec<Sector>, RooError> {
    let count = r.read_u16::<LE>()?;
    let mut sectors = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let id = r.read_u16::<LE>()?;
        let floor_bitmap = r.read_u16::<LE>()?;
        let ceiling_bitmap = r.read_u16::<LE>()?;
        let x_tex_offset = r.read_u16::<LE>()?;
        let y_tex_offset = r.read_u16::<LE>()?;
        let floor_height = f32::from(r.read_i16::<LE>()?) * BLAK_FACTOR;
        let ceiling_height = f32::from(r.read_i16::<LE>()?) * BLAK_FACTOR;
        let light = r.read_u8()?;
        let flags = SectorFlags::from_bits_truncate(r.read_u32::<LE>()?);
        let animation_speed = r.read_u8()?;

        let floor_slope = flags
            .contains(SectorFlags::SLOPED_FLOOR)
            .then(|| load_slope(r, version))
            .transpose()?;
        let ceiling_slope = flags
            .contains(SectorFlags::SLOPED_CEILING)
            .then(|| load_slope(r, version))
            .transpose()?;

        sectors.push(Sector {
            id,
            floor_bitmap,
            ceiling_bitmap,
            x_tex_offset,
            y_tex_offset,
            floor_height,
            ceiling_height,
            light,
            flags,
            animation_speed,
            floor_slope,
            ceiling_slope,
        });
    }
    Ok(sectors)
}

fn load_things<R: Read + Seek>(r: &mut R) -> Result<Vec<Thing>, RooError> {
    let count = r.read_u16::<LE>()?;
    let mut things = Vec::with_capacity(count as usize);

    // rooms with at most two things store bare coordinate pairs
    if count <= 2 {
        for _ in 0..count {
            let x = r.read_i32::<LE>()? as i16;
            let y = r.read_i32::<LE>()? as i16;
            things.push(Thing { x, y });
        }
        return Ok(things);
    }

    for _ in 0..count {
        let _type = r.read_i32::<LE>()?;
        let _angle = r.read_i32::<LE>()?;
        let x = r.read_i32::<LE>()? as i16;
        let y = r.read_i32::<LE>()? as i16;
        // when, exit position, flags, comment
        r.seek(SeekFrom::Current(4 * 4 + 64))?;
        things.push(Thing { x, y });
    }
    Ok(things)
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
