//! Sprite atlas packing.
//!
//! Sprites are shelf-packed tallest-first into a square target that
//! doubles from 256 while below the 4096 ceiling; each sprite keeps a
//! one-pixel transparent border so neighbouring sprites never bleed into
//! each other when sampled.

use thiserror::Error;

use crate::bgf::raw::BgfBitmap;
use crate::palette::TRANSPARENT_INDEX;

/// Transparent border around every packed sprite, in pixels.
pub const ATLAS_PAD: u32 = 1;

/// Growth ceiling for the square packing target.
pub const ATLAS_MAX_DIM: u32 = 4096;

#[derive(Error, Debug)]
#[error("bitmaps do not fit in a {0}x{0} atlas")]
pub struct AtlasOverflow(pub u32);

/// Indexed-color atlas image.
#[derive(Debug)]
pub struct Atlas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Place every bitmap (filling `x_pos`/`y_pos`) and blit them into one
/// image. A lone bitmap is exported as-is at (0, 0).
pub fn build_atlas(bitmaps: &mut [BgfBitmap]) -> Result<Atlas, AtlasOverflow> {
    if let [bitmap] = bitmaps {
        bitmap.x_pos = 0;
        bitmap.y_pos = 0;
        return Ok(Atlas {
            width: bitmap.width,
            height: bitmap.height,
            pixels: bitmap.pixels.clone(),
        });
    }

    pack_rects(bitmaps)?;

    // atlas extents come from the furthest placed sprite
    let mut width = 0;
    let mut height = 0;
    for bitmap in bitmaps.iter() {
        width = width.max(bitmap.x_pos + bitmap.width + ATLAS_PAD);
        height = height.max(bitmap.y_pos + bitmap.height + ATLAS_PAD);
    }

    let mut pixels = vec![TRANSPARENT_INDEX; (width * height) as usize];
    for bitmap in bitmaps.iter() {
        for row in 0..bitmap.height {
            let src = (row * bitmap.width) as usize;
            let dst = ((bitmap.y_pos + row) * width + bitmap.x_pos) as usize;
            pixels[dst..dst + bitmap.width as usize]
                .copy_from_slice(&bitmap.pixels[src..src + bitmap.width as usize]);
        }
    }

    Ok(Atlas {
        width,
        height,
        pixels,
    })
}

fn pack_rects(bitmaps: &mut [BgfBitmap]) -> Result<(), AtlasOverflow> {
    let mut order: Vec<usize> = (0..bitmaps.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(bitmaps[i].height));

    let mut dim = 256;
    while dim < ATLAS_MAX_DIM {
        if try_pack(bitmaps, &order, dim) {
            return Ok(());
        }
        dim *= 2;
    }
    Err(AtlasOverflow(ATLAS_MAX_DIM))
}

/// One shelf-packing attempt at a fixed square size. Placements are only
/// committed when everything fits.
fn try_pack(bitmaps: &mut [BgfBitmap], order: &[usize], dim: u32) -> bool {
    let mut cursor_x = 0u32;
    let mut cursor_y = 0u32;
    let mut shelf_height = 0u32;
    let mut placed = Vec::with_capacity(order.len());

    for &i in order {
        let w = bitmaps[i].width + 2 * ATLAS_PAD;
        let h = bitmaps[i].height + 2 * ATLAS_PAD;
        if w > dim {
            return false;
        }
        if cursor_x + w > dim {
            cursor_y += shelf_height;
            cursor_x = 0;
            shelf_height = 0;
        }
        if cursor_y + h > dim {
            return false;
        }
        placed.push((i, cursor_x + ATLAS_PAD, cursor_y + ATLAS_PAD));
        cursor_x += w;
        shelf_height = shelf_height.max(h);
    }

    for (i, x, y) in placed {
        bitmaps[i].x_pos = x;
        bitmaps[i].y_pos = y;
    }
    true
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(width: u32, height: u32, fill: u8) -> BgfBitmap {
        BgfBitmap {
            width,
            height,
            x_offset: 0,
            y_offset: 0,
            hotspots: Vec::new(),
            pixels: vec![fill; (width * height) as usize],
            x_pos: 0,
            y_pos: 0,
        }
    }

    #[test]
    fn single_bitmap_is_passed_through() {
        let mut bitmaps = vec![bitmap(5, 3, 9)];
        let atlas = build_atlas(&mut bitmaps).unwrap();
        assert_eq!((atlas.width, atlas.height), (5, 3));
        assert_eq!(atlas.pixels, vec![9u8; 15]);
        assert_eq!((bitmaps[0].x_pos, bitmaps[0].y_pos), (0, 0));
    }

    #[test]
    fn placements_are_padded_and_disjoint() {
        let mut bitmaps = vec![bitmap(64, 64, 1), bitmap(32, 48, 2), bitmap(16, 16, 3)];
        let atlas = build_atlas(&mut bitmaps).unwrap();

        assert!(atlas.width <= 256 && atlas.height <= 256);
        for bm in &bitmaps {
            assert!(bm.x_pos >= ATLAS_PAD && bm.y_pos >= ATLAS_PAD);
            assert!(bm.x_pos + bm.width + ATLAS_PAD <= atlas.width);
            assert!(bm.y_pos + bm.height + ATLAS_PAD <= atlas.height);
        }

        // padded rects must not overlap
        for (i, a) in bitmaps.iter().enumerate() {
            for b in bitmaps.iter().skip(i + 1) {
                let apart_x = a.x_pos + a.width + ATLAS_PAD <= b.x_pos
                    || b.x_pos + b.width + ATLAS_PAD <= a.x_pos;
                let apart_y = a.y_pos + a.height + ATLAS_PAD <= b.y_pos
                    || b.y_pos + b.height + ATLAS_PAD <= a.y_pos;
                assert!(apart_x || apart_y);
            }
        }
    }

    #[test]
    fn blit_preserves_pixels_and_pads_with_transparency() {
        let mut bitmaps = vec![bitmap(2, 2, 7), bitmap(2, 2, 8)];
        let atlas = build_atlas(&mut bitmaps).unwrap();

        for bm in &bitmaps {
            for row in 0..bm.height {
                for col in 0..bm.width {
                    let idx = ((bm.y_pos + row) * atlas.width + bm.x_pos + col) as usize;
                    assert_eq!(atlas.pixels[idx], bm.pixels[0]);
                }
            }
        }
        // corner stays transparent
        assert_eq!(atlas.pixels[0], TRANSPARENT_INDEX);
    }

    #[test]
    fn target_grows_until_sprites_fit() {
        // 200 sprites of 32x32 (34x34 padded) need more than 256x256
        let mut bitmaps: Vec<BgfBitmap> = (0..200).map(|i| bitmap(32, 32, i as u8)).collect();
        let atlas = build_atlas(&mut bitmaps).unwrap();
        assert!(atlas.width > 256 || atlas.height > 256);
        assert!(atlas.width <= 512 && atlas.height <= 512);
    }

    #[test]
    fn oversized_sprite_overflows() {
        let mut bitmaps = vec![bitmap(3000, 3000, 0), bitmap(4, 4, 1)];
        assert!(build_atlas(&mut bitmaps).is_err());
    }
}
