//! PNG and JSON sidecar emission for unpacked BGF sprites.

use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use crate::bgf::atlas::Atlas;
use crate::bgf::raw::Bgf;
use crate::palette::{PALETTE, TRANSPARENT_INDEX};

/// Expand the indexed atlas through the palette and write an RGBA PNG.
pub fn write_png(path: &Path, atlas: &Atlas) -> image::ImageResult<()> {
    let mut rgba = Vec::with_capacity(atlas.pixels.len() * 4);
    for &index in &atlas.pixels {
        let color = PALETTE[index as usize];
        rgba.push((color >> 16) as u8);
        rgba.push((color >> 8) as u8);
        rgba.push(color as u8);
        rgba.push(if index == TRANSPARENT_INDEX { 0 } else { 255 });
    }
    image::save_buffer(
        path,
        &rgba,
        atlas.width,
        atlas.height,
        image::ColorType::Rgba8,
    )
}

#[derive(Serialize)]
struct Metadata<'a> {
    name: &'a str,
    version: u32,
    sprite_count: usize,
    group_count: usize,
    shrink_factor: u32,
    image_file: &'a str,
    sprites: Vec<SpriteMeta>,
    groups: Vec<GroupMeta<'a>>,
}

#[derive(Serialize)]
struct SpriteMeta {
    x_pos: u32,
    y_pos: u32,
    width: u32,
    height: u32,
    x_offset: i32,
    y_offset: i32,
    hotspot_count: usize,
    hotspots: Vec<HotspotMeta>,
}

#[derive(Serialize)]
struct HotspotMeta {
    number: i8,
    x: i32,
    y: i32,
}

#[derive(Serialize)]
struct GroupMeta<'a> {
    index_count: usize,
    indexes: &'a [u32],
}

/// Write the sidecar document that the mesh pipeline later reads back.
pub fn write_metadata<W: Write>(out: &mut W, bgf: &Bgf, image_file: &str) -> io::Result<()> {
    let doc = Metadata {
        name: &bgf.name,
        version: bgf.version,
        sprite_count: bgf.bitmaps.len(),
        group_count: bgf.groups.len(),
        shrink_factor: bgf.shrink_factor,
        image_file,
        sprites: bgf
            .bitmaps
            .iter()
            .map(|bm| SpriteMeta {
                x_pos: bm.x_pos,
                y_pos: bm.y_pos,
                width: bm.width,
                height: bm.height,
                x_offset: bm.x_offset,
                y_offset: bm.y_offset,
                hotspot_count: bm.hotspots.len(),
                hotspots: bm
                    .hotspots
                    .iter()
                    .map(|h| HotspotMeta {
                        number: h.number,
                        x: h.x,
                        y: h.y,
                    })
                    .collect(),
            })
            .collect(),
        groups: bgf
            .groups
            .iter()
            .map(|g| GroupMeta {
                index_count: g.len(),
                indexes: g,
            })
            .collect(),
    };
    serde_json::to_writer_pretty(&mut *out, &doc).map_err(io::Error::other)?;
    out.write_all(b"\n")
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
