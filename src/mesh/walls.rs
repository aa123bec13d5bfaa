//! Wall faces: corner-height resolution, bowtie classification, and
//! textured quad emission.
//!
//! Each wall can show up to six faces: three vertical bands (below,
//! normal, above) on each of its two sides. Band edges come from the
//! floor and ceiling heights of the neighbouring sectors; when those
//! planes cross along the wall the band is a *bowtie* and each side keeps
//! only the triangle on its side of the crossing.

use glam::{Vec2, vec2, vec3};
use smallvec::SmallVec;

use crate::material::Material;
use crate::mesh::builder::{MeshBuilder, MeshFace};
use crate::roo::{Room, Sector, Sidedef, Wall, WallFlags};
use crate::units::{BITMAP_WIDTH, BLAK_FACTOR, FINENESS};

/// Which side of the wall a face belongs to, walking endpoint 0 → 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Pos,
    Neg,
}

/// Vertical band of a wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceKind {
    Below,
    Normal,
    Above,
}

/// Crossing state of a band: the two sector planes either keep their
/// vertical order along the wall or swap it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Bowtie {
    #[default]
    None,
    /// Positive side starts above, ends below.
    Pos,
    /// Negative side starts above, ends below.
    Neg,
}

/// Height differences below this are treated as a level edge.
const SLOPE_EPSILON: f32 = 1e-5;

/// One wall resolved into output coordinates: endpoints translated and
/// Y-flipped through the map bounds, plus four band edges per endpoint
/// (lower floor, upper floor, lower ceiling, upper ceiling).
struct WallSpan<'a> {
    pos_sector: Option<&'a Sector>,
    neg_sector: Option<&'a Sector>,
    pos_sidedef: Option<&'a Sidedef>,
    neg_sidedef: Option<&'a Sidedef>,
    pos_x_offset: f32,
    pos_y_offset: f32,
    neg_x_offset: f32,
    neg_y_offset: f32,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    z00: f32,
    z01: f32,
    z02: f32,
    z03: f32,
    z10: f32,
    z11: f32,
    z12: f32,
    z13: f32,
    below_bowtie: Bowtie,
    above_bowtie: Bowtie,
}

/// Order the two sector heights at both wall endpoints into
/// `[lower0, upper0, lower1, upper1]` and report whether the planes cross.
/// Ties at endpoint 0 fall into the negative-on-top branch, where the
/// `neg_z1 >= pos_z1` test still settles None vs Neg.
fn classify_band(pos_z0: f32, pos_z1: f32, neg_z0: f32, neg_z1: f32) -> (Bowtie, [f32; 4]) {
    if pos_z0 > neg_z0 {
        if pos_z1 >= neg_z1 {
            (Bowtie::None, [neg_z0, pos_z0, neg_z1, pos_z1])
        } else {
            (Bowtie::Pos, [neg_z0, pos_z0, pos_z1, neg_z1])
        }
    } else if neg_z1 >= pos_z1 {
        (Bowtie::None, [pos_z0, neg_z0, pos_z1, neg_z1])
    } else {
        (Bowtie::Neg, [pos_z0, neg_z0, neg_z1, pos_z1])
    }
}

impl<'a> WallSpan<'a> {
    fn resolve(room: &'a Room, wall: &Wall) -> Self {
        let b = room.bounds;
        let mut span = WallSpan {
            pos_sector: room.sector(wall.pos_sector),
            neg_sector: room.sector(wall.neg_sector),
            pos_sidedef: room.sidedef(wall.pos_sidedef),
            neg_sidedef: room.sidedef(wall.neg_sidedef),
            pos_x_offset: f32::from(wall.pos_x_offset),
            pos_y_offset: f32::from(wall.pos_y_offset),
            neg_x_offset: f32::from(wall.neg_x_offset),
            neg_y_offset: f32::from(wall.neg_y_offset),
            x0: (f32::from(wall.x0) - f32::from(b.min_x)) * BLAK_FACTOR,
            y0: (f32::from(b.max_y) - f32::from(wall.y0)) * BLAK_FACTOR,
            x1: (f32::from(wall.x1) - f32::from(b.min_x)) * BLAK_FACTOR,
            y1: (f32::from(b.max_y) - f32::from(wall.y1)) * BLAK_FACTOR,
            z00: 0.0,
            z01: 0.0,
            z02: 0.0,
            z03: 0.0,
            z10: 0.0,
            z11: 0.0,
            z12: 0.0,
            z13: 0.0,
            below_bowtie: Bowtie::None,
            above_bowtie: Bowtie::None,
        };
        span.resolve_heights();
        span
    }

    fn resolve_heights(&mut self) {
        let (x0, y0, x1, y1) = (self.x0, self.y0, self.x1, self.y1);

        match (self.pos_sector, self.neg_sector) {
            (None, None) => {
                // unit-high default box
                self.z00 = 0.0;
                self.z01 = 0.0;
                self.z02 = FINENESS;
                self.z03 = FINENESS;
                self.z10 = 0.0;
                self.z11 = 0.0;
                self.z12 = FINENESS;
                self.z13 = FINENESS;
            }
            (Some(sec), None) | (None, Some(sec)) => {
                // a lone sector supplies both limits of both bands
                let bottom0 = sec.floor_height_at(x0, y0);
                let top0 = sec.ceiling_height_at(x0, y0);
                let bottom1 = sec.floor_height_at(x1, y1);
                let top1 = sec.ceiling_height_at(x1, y1);
                self.z00 = bottom0;
                self.z01 = bottom0;
                self.z02 = top0;
                self.z03 = top0;
                self.z10 = bottom1;
                self.z11 = bottom1;
                self.z12 = top1;
                self.z13 = top1;
            }
            (Some(pos), Some(neg)) => {
                let (flag, [z00, z01, z10, z11]) = classify_band(
                    pos.floor_height_at(x0, y0),
                    pos.floor_height_at(x1, y1),
                    neg.floor_height_at(x0, y0),
                    neg.floor_height_at(x1, y1),
                );
                self.below_bowtie = flag;
                self.z00 = z00;
                self.z01 = z01;
                self.z10 = z10;
                self.z11 = z11;

                let (flag, [z02, z03, z12, z13]) = classify_band(
                    pos.ceiling_height_at(x0, y0),
                    pos.ceiling_height_at(x1, y1),
                    neg.ceiling_height_at(x0, y0),
                    neg.ceiling_height_at(x1, y1),
                );
                self.above_bowtie = flag;
                self.z02 = z02;
                self.z03 = z03;
                self.z12 = z12;
                self.z13 = z13;
            }
        }
    }

    fn sidedef(&self, side: Side) -> Option<&'a Sidedef> {
        match side {
            Side::Pos => self.pos_sidedef,
            Side::Neg => self.neg_sidedef,
        }
    }

    fn bitmap(sidedef: &Sidedef, kind: FaceKind) -> u16 {
        match kind {
            FaceKind::Below => sidedef.below_bitmap,
            FaceKind::Normal => sidedef.normal_bitmap,
            FaceKind::Above => sidedef.above_bitmap,
        }
    }

    /// A band produces geometry only when it has non-zero height at one
    /// of the endpoints.
    fn band_open(&self, kind: FaceKind) -> bool {
        match kind {
            FaceKind::Below => self.z00 != self.z01 || self.z10 != self.z11,
            FaceKind::Normal => self.z01 != self.z02 || self.z11 != self.z12,
            FaceKind::Above => self.z02 != self.z03 || self.z12 != self.z13,
        }
    }

    /// Faces that produce geometry, in emission order.
    fn visible_faces(&self) -> SmallVec<[(Side, FaceKind); 6]> {
        let mut faces = SmallVec::new();
        for side in [Side::Pos, Side::Neg] {
            let Some(sidedef) = self.sidedef(side) else {
                continue;
            };
            for kind in [FaceKind::Below, FaceKind::Above, FaceKind::Normal] {
                if Self::bitmap(sidedef, kind) != 0 && self.band_open(kind) {
                    faces.push((side, kind));
                }
            }
        }
        faces
    }

    /// Build one textured quad. `None` only when the side has no sidedef,
    /// which visibility already rules out.
    fn face(&self, side: Side, kind: FaceKind, mat: &Material) -> Option<MeshFace> {
        let sidedef = self.sidedef(side)?;
        let flags = sidedef.flags;

        let mut flip_h = flags.contains(WallFlags::BACKWARDS);
        let top_down = match kind {
            FaceKind::Below => flags.contains(WallFlags::BELOW_TOPDOWN),
            FaceKind::Normal => flags.contains(WallFlags::NORMAL_TOPDOWN),
            FaceKind::Above => !flags.contains(WallFlags::ABOVE_BOTTOMUP),
        };
        let no_v_tile = flags.contains(WallFlags::NO_VTILE);

        // band edges for this face
        let (mut z00, mut z01, mut z10, mut z11) = match kind {
            FaceKind::Below => (self.z00, self.z01, self.z10, self.z11),
            FaceKind::Normal => (self.z01, self.z02, self.z11, self.z12),
            FaceKind::Above => (self.z02, self.z03, self.z12, self.z13),
        };

        let mut ignore_triangle = None;

        match kind {
            FaceKind::Below => match (self.below_bowtie, side) {
                (Bowtie::Pos, Side::Pos) | (Bowtie::Neg, Side::Neg) => {
                    z01 = z00;
                    ignore_triangle = Some(1);
                }
                (Bowtie::Pos, Side::Neg) | (Bowtie::Neg, Side::Pos) => {
                    z11 = z10;
                    ignore_triangle = Some(0);
                }
                (Bowtie::None, _) => {}
            },
            FaceKind::Above => match (self.above_bowtie, side) {
                (Bowtie::Pos, Side::Pos) | (Bowtie::Neg, Side::Neg) => {
                    z10 = z11;
                    ignore_triangle = Some(0);
                }
                (Bowtie::Pos, Side::Neg) | (Bowtie::Neg, Side::Pos) => {
                    z00 = z01;
                    ignore_triangle = Some(1);
                }
                (Bowtie::None, _) => {}
            },
            FaceKind::Normal => {
                // a bowtied neighbour band pulls the shared edge back to
                // the crossing point
                match (self.below_bowtie, side) {
                    (Bowtie::Pos, Side::Pos) | (Bowtie::Neg, Side::Neg) => z00 = self.z00,
                    (Bowtie::Pos, Side::Neg) | (Bowtie::Neg, Side::Pos) => z10 = self.z10,
                    (Bowtie::None, _) => {}
                }
                match (self.above_bowtie, side) {
                    (Bowtie::Pos, Side::Pos) | (Bowtie::Neg, Side::Neg) => z11 = self.z13,
                    (Bowtie::Pos, Side::Neg) | (Bowtie::Neg, Side::Pos) => z01 = self.z03,
                    (Bowtie::None, _) => {}
                }
            }
        }

        let indices: [u32; 6] = match side {
            Side::Pos => [0, 2, 1, 0, 3, 2],
            Side::Neg => [0, 2, 3, 0, 1, 2],
        };

        let (x_offset, y_offset) = match side {
            Side::Pos => (self.pos_x_offset, self.pos_y_offset),
            Side::Neg => (self.neg_x_offset, self.neg_y_offset),
        };
        // positive-facing walls sample the texture mirrored
        if side == Side::Pos {
            flip_h = !flip_h;
        }

        let dx = self.x1 - self.x0;
        let dy = self.y1 - self.y0;
        let length = dx.hypot(dy);

        let mut tex_coords = [Vec2::ZERO; 4];
        if mat.valid {
            // wall textures are stored transposed
            let shrink = mat.shrink_factor as f32;
            let tex_width = mat.tex_height as f32 / shrink;
            let tex_height = mat.tex_width as f32 / shrink;

            if no_v_tile && kind == FaceKind::Normal {
                let max_height = (tex_height - y_offset) / BITMAP_WIDTH * FINENESS;
                if top_down {
                    // clamp bottom corners
                    if z01 - z00 > max_height {
                        z00 = z01 - max_height;
                    }
                    if z11 - z10 > max_height {
                        z10 = z11 - max_height;
                    }
                } else {
                    // clamp top corners
                    if z01 - z00 > max_height {
                        z01 = z00 + max_height;
                    }
                    if z11 - z10 > max_height {
                        z11 = z10 + max_height;
                    }
                }
            }

            // texture anchor in wall-local fineness coordinates
            let mut x_origin = 0.0;
            let mut z_origin = if top_down { z01 } else { z00 };

            // a sloped anchoring edge snaps the origin to the next whole
            // world unit so texels line up across neighbouring walls
            if !top_down && (z00 - z10).abs() > SLOPE_EPSILON {
                z_origin = (z00.min(z10) / FINENESS).ceil() * FINENESS;
            }
            if top_down && (z01 - z11).abs() > SLOPE_EPSILON {
                z_origin = (z01.min(z11) / FINENESS).ceil() * FINENESS;
            }

            x_origin -= x_offset / BITMAP_WIDTH * FINENESS;
            z_origin -= y_offset / BITMAP_WIDTH * FINENESS;

            let mut u0 = (0.0 - x_origin) / FINENESS * BITMAP_WIDTH / tex_width;
            let mut u1 = (length - x_origin) / FINENESS * BITMAP_WIDTH / tex_width;

            // center the repeating pattern on the wall
            let shift = 0.5 - (u0 + u1) / 2.0;
            u0 += shift;
            u1 += shift;

            // bottom of the texture sits at v = 1
            let v = |z: f32| (z_origin - z) / FINENESS * BITMAP_WIDTH / tex_height + 1.0;

            // uv pairs are swapped so the transposed storage renders upright
            tex_coords = [
                vec2(v(z01), u0), // top left
                vec2(v(z11), u1), // top right
                vec2(v(z10), u1), // bottom right
                vec2(v(z00), u0), // bottom left
            ];

            if flip_h {
                // mirror the u channel
                (tex_coords[0].y, tex_coords[1].y) = (tex_coords[1].y, tex_coords[0].y);
                (tex_coords[2].y, tex_coords[3].y) = (tex_coords[3].y, tex_coords[2].y);
            }
        }

        let positions = [
            vec3(self.x0, self.y0, z01), // top left
            vec3(self.x1, self.y1, z11), // top right
            vec3(self.x1, self.y1, z10), // bottom right
            vec3(self.x0, self.y0, z00), // bottom left
        ];

        let mut normal = vec3(dy / length, -dx / length, 0.0);
        if side == Side::Pos {
            normal = vec3(-normal.x, -normal.y, 0.0);
        }

        Some(MeshFace {
            ignore_triangle,
            indices,
            positions,
            tex_coords,
            normal,
        })
    }
}

/// Emit every visible face of `wall` into the builder.
pub fn meshify_wall(room: &Room, wall: &Wall, builder: &mut MeshBuilder) {
    let span = WallSpan::resolve(room, wall);
    for (side, kind) in span.visible_faces() {
        let Some(sidedef) = span.sidedef(side) else {
            continue;
        };
        let index = builder.object_index(WallSpan::bitmap(sidedef, kind));
        if let Some(face) = span.face(side, kind, builder.material(index)) {
            builder.push_face(index, &face);
        }
    }
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
