//! BGF sprite-container reader.
//!
//! Little-endian, sequential: header, then the bitmaps (each with its
//! hotspot list and zlib-compressed or raw pixel data), then the sprite
//! groups.

use byteorder::{LittleEndian as LE, ReadBytesExt};
use libflate::zlib;
use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};
use thiserror::Error;

const BGF_MAGIC: [u8; 4] = [0x42, 0x47, 0x46, 0x11];

/// The only container version this reader accepts.
pub const BGF_VERSION: u32 = 10;

const FORMAT_COMPRESSED: u8 = 1;

#[derive(Error, Debug)]
pub enum BgfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("not a BGF file (bad magic)")]
    BadMagic,

    #[error("unsupported BGF version {0} (expected {BGF_VERSION})")]
    UnsupportedVersion(u32),

    #[error("bitmap {index} has invalid dimensions {width}x{height}")]
    BadDimensions { index: usize, width: i32, height: i32 },

    #[error("bitmap {index}: decompression failed: {source}")]
    Decompress { index: usize, source: io::Error },

    #[error("bitmap {index}: expected {expected} pixels, got {actual}")]
    BadPixelCount {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Named anchor point inside one sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hotspot {
    pub number: i8,
    pub x: i32,
    pub y: i32,
}

/// One decoded sprite.
#[derive(Clone, Debug)]
pub struct BgfBitmap {
    pub width: u32,
    pub height: u32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub hotspots: Vec<Hotspot>,
    /// Palette indexes, row major, `width * height` long.
    pub pixels: Vec<u8>,
    /// Atlas placement, filled in by packing.
    pub x_pos: u32,
    pub y_pos: u32,
}

/// Entire container in memory.
#[derive(Debug)]
pub struct Bgf {
    pub name: String,
    pub version: u32,
    pub shrink_factor: u32,
    pub bitmaps: Vec<BgfBitmap>,
    /// Sprite indexes per animation group.
    pub groups: Vec<Vec<u32>>,
}

impl Bgf {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BgfError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(mut r: R) -> Result<Self, BgfError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != BGF_MAGIC {
            return Err(BgfError::BadMagic);
        }

        let version = r.read_u32::<LE>()?;
        if version != BGF_VERSION {
            return Err(BgfError::UnsupportedVersion(version));
        }

        let mut name_bytes = [0u8; 32];
        r.read_exact(&mut name_bytes)?;
        let end = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(name_bytes.len());
        let name = String::from_utf8_lossy(&name_bytes[..end]).into_owned();

        let bitmap_count = r.read_u32::<LE>()?;
        let group_count = r.read_u32::<LE>()?;
        let _max_group_bitmaps = r.read_u32::<LE>()?; // sizing hint only
        let shrink_factor = r.read_u32::<LE>()?;

        let mut bitmaps = Vec::with_capacity(bitmap_count as usize);
        for index in 0..bitmap_count as usize {
            bitmaps.push(load_bitmap(&mut r, index)?);
        }

        let mut groups = Vec::with_capacity(group_count as usize);
        for _ in 0..group_count {
            let index_count = r.read_u32::<LE>()?;
            let mut indexes = Vec::with_capacity(index_count as usize);
            for _ in 0..index_count {
                indexes.push(r.read_u32::<LE>()?);
            }
            groups.push(indexes);
        }

        Ok(Bgf {
            name,
            version,
            shrink_factor,
            bitmaps,
            groups,
        })
    }
}

fn load_bitmap<R: Read>(r: &mut R, index: usize) -> Result<BgfBitmap, BgfError> {
    let width = r.read_i32::<LE>()?;
    let height = r.read_i32::<LE>()?;
    if width <= 0 || height <= 0 {
        return Err(BgfError::BadDimensions {
            index,
            width,
            height,
        });
    }
    let (width, height) = (width as u32, height as u32);

    let x_offset = r.read_i32::<LE>()?;
    let y_offset = r.read_i32::<LE>()?;

    let hotspot_count = r.read_u8()?;
    let mut hotspots = Vec::with_capacity(hotspot_count as usize);
    for _ in 0..hotspot_count {
        hotspots.push(Hotspot {
            number: r.read_i8()?,
            x: r.read_i32::<LE>()?,
            y: r.read_i32::<LE>()?,
        });
    }

    let format = r.read_u8()?;
    let compressed_size = r.read_u32::<LE>()?;

    let expected = width as usize * height as usize;
    let pixels = if format == FORMAT_COMPRESSED {
        let mut packed = vec![0u8; compressed_size as usize];
        r.read_exact(&mut packed)?;
        let mut pixels = Vec::with_capacity(expected);
        zlib::Decoder::new(&packed[..])
            .map_err(|source| BgfError::Decompress { index, source })?
            .read_to_end(&mut pixels)
            .map_err(|source| BgfError::Decompress { index, source })?;
        pixels
    } else {
        let mut pixels = vec![0u8; expected];
        r.read_exact(&mut pixels)?;
        pixels
    };

    if pixels.len() != expected {
        return Err(BgfError::BadPixelCount {
            index,
            expected,
            actual: pixels.len(),
        });
    }

    Ok(BgfBitmap {
        width,
        height,
        x_offset,
        y_offset,
        hotspots,
        pixels,
        x_pos: 0,
        y_pos: 0,
    })
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
