//! Floor and ceiling polygons for BSP leaf subsectors.
//!
//! Subsector points arrive counter-clockwise seen from above, so the fan
//! `(0, i+2, i+1)` faces up for floors; ceilings reverse the order.
//! Sloped planes carry their own texture frame: an orthonormal basis on
//! the plane, rotated by the slope's texture angle.

use glam::{Vec2, Vec3, vec2, vec3};
use std::f32::consts::TAU;

use crate::material::Material;
use crate::mesh::builder::{MeshBuilder, MeshPoly};
use crate::roo::{Room, Sector, Subsector};
use crate::units::{FINENESS, NUM_DEGREES};

/// Emit the floor and ceiling of one subsector (floor first).
pub fn meshify_subsector(room: &Room, sub: &Subsector, builder: &mut MeshBuilder) {
    // sector number 0 marks "no sector"
    if sub.sector == 0 {
        return;
    }
    let Some(sector) = room.sectors.get(sub.sector as usize - 1) else {
        return;
    };
    if sub.points.len() < 3 {
        return;
    }

    if sector.floor_bitmap != 0 {
        emit_plane(sector, sub, true, builder);
    }
    if sector.ceiling_bitmap != 0 {
        emit_plane(sector, sub, false, builder);
    }
}

fn emit_plane(sector: &Sector, sub: &Subsector, is_floor: bool, builder: &mut MeshBuilder) {
    let bitmap = if is_floor {
        sector.floor_bitmap
    } else {
        sector.ceiling_bitmap
    };
    let index = builder.object_index(bitmap);
    let poly = plane_poly(sector, sub, is_floor, builder.material(index));
    builder.push_poly(index, &poly);
}

fn plane_poly(sector: &Sector, sub: &Subsector, is_floor: bool, mat: &Material) -> MeshPoly {
    let height = |x: f32, y: f32| {
        if is_floor {
            sector.floor_height_at(x, y)
        } else {
            sector.ceiling_height_at(x, y)
        }
    };

    // subsector coordinates are already in the output frame
    let positions: Vec<Vec3> = sub
        .points
        .iter()
        .map(|p| vec3(p.x, p.y, height(p.x, p.y)))
        .collect();

    let mut indices = Vec::with_capacity((positions.len() - 2) * 3);
    for i in 0..positions.len() as u32 - 2 {
        if is_floor {
            indices.extend_from_slice(&[0, i + 2, i + 1]);
        } else {
            indices.extend_from_slice(&[0, i + 1, i + 2]);
        }
    }

    let slope = if is_floor {
        sector.floor_slope.as_ref()
    } else {
        sector.ceiling_slope.as_ref()
    };

    let mut normal = slope.map_or(Vec3::Z, |s| vec3(s.a, s.b, s.c));
    if !is_floor {
        normal = -normal;
    }

    // flat planes map world x/y straight onto the texture; sloped planes
    // get a frame rotated by the slope's texture angle
    let mut u_axis = Vec3::X;
    let mut v_axis = Vec3::Y;
    if let Some(s) = slope {
        let theta = s.tex_angle as f32 / NUM_DEGREES * TAU;
        let t = vec3(theta.cos(), theta.sin(), 0.0);
        v_axis = normal.cross(t);
        u_axis = v_axis.cross(normal);
        v_axis = v_axis.normalize();
        u_axis = u_axis.normalize();
        normal = normal.normalize();
    }

    let mut tex_coords = vec![Vec2::ZERO; positions.len()];
    if mat.valid {
        let u_offset = f32::from(sector.x_tex_offset) / mat.tex_width as f32;
        let v_offset = f32::from(sector.y_tex_offset) / mat.tex_height as f32;

        let tex_origin = slope.map_or(Vec2::ZERO, |s| s.tex_origin);
        let origin = vec3(
            tex_origin.x,
            tex_origin.y,
            height(tex_origin.x, tex_origin.y),
        ) / FINENESS;

        for (uv, pos) in tex_coords.iter_mut().zip(&positions) {
            let p = *pos / FINENESS - origin;
            *uv = vec2(u_axis.dot(p) - u_offset, v_axis.dot(p) - v_offset);
        }
    }

    MeshPoly {
        indices,
        positions,
        tex_coords,
        normal,
    }
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialLookup;
    use crate::roo::{MapBounds, SectorFlags, SlopeData};

    struct SquareTexture;

    impl MaterialLookup for SquareTexture {
        fn material(&self, bitmap: u16) -> Material {
            Material {
                valid: true,
                texture_file: format!("grd{bitmap:05}.png"),
                tex_width: 64,
                tex_height: 64,
                shrink_factor: 1,
            }
        }
    }

    fn sector(floor_bitmap: u16, ceiling_bitmap: u16) -> Sector {
        Sector {
            id: 1,
            floor_bitmap,
            ceiling_bitmap,
            x_tex_offset: 0,
            y_tex_offset: 0,
            floor_height: 512.0,
            ceiling_height: 2048.0,
            light: 255,
            flags: SectorFlags::empty(),
            animation_speed: 0,
            floor_slope: None,
            ceiling_slope: None,
        }
    }

    fn unit_square() -> Vec<Vec2> {
        vec![
            vec2(0.0, 0.0),
            vec2(1024.0, 0.0),
            vec2(1024.0, 1024.0),
            vec2(0.0, 1024.0),
        ]
    }

    fn room_with(sectors: Vec<Sector>, subsectors: Vec<Subsector>) -> Room {
        Room {
            version: 12,
            width: 0,
            height: 0,
            walls: Vec::new(),
            sidedefs: Vec::new(),
            sectors,
            subsectors,
            things: Vec::new(),
            bounds: MapBounds {
                min_x: 0,
                min_y: 0,
                max_x: 0,
                max_y: 0,
            },
        }
    }

    #[test]
    fn flat_floor_fan() {
        let room = room_with(
            vec![sector(3, 0)],
            vec![Subsector {
                sector: 1,
                points: unit_square(),
            }],
        );
        let materials = SquareTexture;
        let mut builder = MeshBuilder::new(&materials);
        meshify_subsector(&room, &room.subsectors[0], &mut builder);

        let obj = &builder.objects()[0];
        assert_eq!(obj.id, 3);
        assert_eq!(obj.vertex_count(), 4);
        assert_eq!(obj.triangle_count(), 2);
        assert_eq!(obj.indices, [0, 2, 1, 0, 3, 2]);
        assert_eq!(&obj.normals[0..3], &[0.0, 0.0, 1.0]);
        // flat plane at the sector's base height
        assert_eq!(obj.positions[2], 512.0);
    }

    #[test]
    fn flat_floor_uvs_follow_world_axes() {
        let mut sec = sector(3, 0);
        sec.x_tex_offset = 32; // half the 64-pixel texture
        let room = room_with(
            vec![sec],
            vec![Subsector {
                sector: 1,
                points: unit_square(),
            }],
        );
        let materials = SquareTexture;
        let mut builder = MeshBuilder::new(&materials);
        meshify_subsector(&room, &room.subsectors[0], &mut builder);

        let obj = &builder.objects()[0];
        // u tracks world x (shifted by the offset), v tracks world y
        assert_eq!(
            obj.tex_coords,
            [
                -0.5, 0.0, //
                0.5, 0.0, //
                0.5, 1.0, //
                -0.5, 1.0,
            ]
        );
    }

    #[test]
    fn ceiling_reverses_winding_and_normal() {
        let room = room_with(
            vec![sector(0, 4)],
            vec![Subsector {
                sector: 1,
                points: unit_square(),
            }],
        );
        let materials = SquareTexture;
        let mut builder = MeshBuilder::new(&materials);
        meshify_subsector(&room, &room.subsectors[0], &mut builder);

        let obj = &builder.objects()[0];
        assert_eq!(obj.indices, [0, 1, 2, 0, 2, 3]);
        assert_eq!(&obj.normals[0..3], &[0.0, -0.0, -1.0]);
        assert_eq!(obj.positions[2], 2048.0);
    }

    #[test]
    fn sloped_floor_heights_and_normal() {
        // floor rises with y: plane -y + z = 0
        let mut sec = sector(6, 0);
        sec.flags = SectorFlags::SLOPED_FLOOR;
        sec.floor_slope = Some(SlopeData {
            a: 0.0,
            b: -1.0,
            c: 1.0,
            d: 0.0,
            tex_origin: vec2(0.0, 0.0),
            tex_angle: 0,
        });
        let room = room_with(
            vec![sec],
            vec![Subsector {
                sector: 1,
                points: unit_square(),
            }],
        );
        let materials = SquareTexture;
        let mut builder = MeshBuilder::new(&materials);
        meshify_subsector(&room, &room.subsectors[0], &mut builder);

        let obj = &builder.objects()[0];
        assert_eq!(obj.vertex_count(), 4);
        assert_eq!(obj.triangle_count(), 2);
        let z: Vec<f32> = obj.positions.chunks_exact(3).map(|p| p[2]).collect();
        assert_eq!(z, [0.0, 0.0, 1024.0, 1024.0]);

        let inv_sqrt2 = 1.0 / 2.0f32.sqrt();
        let normal = &obj.normals[0..3];
        assert!((normal[0] - 0.0).abs() < 1e-6);
        assert!((normal[1] + inv_sqrt2).abs() < 1e-6);
        assert!((normal[2] - inv_sqrt2).abs() < 1e-6);
    }

    #[test]
    fn missing_sector_or_bitmap_is_skipped() {
        let room = room_with(
            vec![sector(0, 0)],
            vec![
                Subsector {
                    sector: 0,
                    points: unit_square(),
                },
                Subsector {
                    sector: 1,
                    points: unit_square(),
                },
                Subsector {
                    sector: 40,
                    points: unit_square(),
                },
            ],
        );
        let materials = SquareTexture;
        let mut builder = MeshBuilder::new(&materials);
        for sub in &room.subsectors {
            meshify_subsector(&room, sub, &mut builder);
        }
        assert!(builder.objects().is_empty());
    }

    #[test]
    fn floor_comes_before_ceiling() {
        let room = room_with(
            vec![sector(3, 4)],
            vec![Subsector {
                sector: 1,
                points: unit_square(),
            }],
        );
        let materials = SquareTexture;
        let mut builder = MeshBuilder::new(&materials);
        meshify_subsector(&room, &room.subsectors[0], &mut builder);

        let ids: Vec<u16> = builder.objects().iter().map(|o| o.id).collect();
        assert_eq!(ids, [3, 4]);
    }
}
