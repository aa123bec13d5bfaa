//! Room geometry → textured triangle mesh.

mod builder;
mod planes;
mod walls;

pub use builder::{MeshBuilder, MeshFace, MeshObject, MeshPoly};
pub use planes::meshify_subsector;
pub use walls::{Bowtie, FaceKind, Side, meshify_wall};

use crate::roo::Room;

/// Convert a whole room: walls in file order, then subsector planes in
/// file order with floors before ceilings.
pub fn meshify_room(room: &Room, builder: &mut MeshBuilder) {
    for wall in &room.walls {
        walls::meshify_wall(room, wall, builder);
    }
    for sub in &room.subsectors {
        planes::meshify_subsector(room, sub, builder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Material, MaterialLookup};
    use crate::obj;
    use crate::roo::{MapBounds, Sector, SectorFlags, Sidedef, Subsector, Wall, WallFlags};
    use glam::vec2;
    use std::path::Path;

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

    fn small_room() -> Room {
        let sector = Sector {
            id: 1,
            floor_bitmap: 2,
            ceiling_bitmap: 0,
            x_tex_offset: 0,
            y_tex_offset: 0,
            floor_height: 0.0,
            ceiling_height: 1024.0,
            light: 255,
            flags: SectorFlags::empty(),
            animation_speed: 0,
            floor_slope: None,
            ceiling_slope: None,
        };
        let sidedef = Sidedef {
            id: 1,
            normal_bitmap: 1,
            above_bitmap: 0,
            below_bitmap: 0,
            flags: WallFlags::empty(),
            animation_speed: 0,
        };
        let wall = Wall {
            pos_sidedef: Some(0),
            neg_sidedef: None,
            pos_x_offset: 0,
            pos_y_offset: 0,
            neg_x_offset: 0,
            neg_y_offset: 0,
            pos_sector: Some(0),
            neg_sector: None,
            x0: 0,
            y0: 0,
            x1: 4,
            y1: 0,
        };
        let subsector = Subsector {
            sector: 1,
            points: vec![
                vec2(0.0, 0.0),
                vec2(64.0, 0.0),
                vec2(64.0, 64.0),
                vec2(0.0, 64.0),
            ],
        };
        let walls = vec![wall];
        let bounds = MapBounds::of(&walls, &[]);
        Room {
            version: 12,
            width: 64,
            height: 64,
            walls,
            sidedefs: vec![sidedef],
            sectors: vec![sector],
            subsectors: vec![subsector],
            things: Vec::new(),
            bounds,
        }
    }

    fn render(room: &Room) -> (String, String) {
        let materials = SquareTexture;
        let mut builder = MeshBuilder::new(&materials);
        meshify_room(room, &mut builder);

        let mut obj_out = Vec::new();
        let mut mtl_out = Vec::new();
        obj::write_obj(&mut obj_out, builder.objects(), "room.mtl").unwrap();
        obj::write_mtl(&mut mtl_out, builder.objects(), Path::new("textures")).unwrap();
        (
            String::from_utf8(obj_out).unwrap(),
            String::from_utf8(mtl_out).unwrap(),
        )
    }

    #[test]
    fn empty_room_produces_no_geometry() {
        let room = Room {
            walls: Vec::new(),
            sidedefs: Vec::new(),
            sectors: Vec::new(),
            subsectors: Vec::new(),
            ..small_room()
        };
        let (obj, mtl) = render(&room);
        assert_eq!(obj, "mtllib room.mtl\n");
        assert!(mtl.is_empty());
    }

    #[test]
    fn wall_then_floor_end_to_end() {
        let (obj, mtl) = render(&small_room());

        // one quad wall + one quad floor
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 8);
        assert_eq!(obj.lines().filter(|l| l.starts_with("vt ")).count(), 8);
        assert_eq!(obj.lines().filter(|l| l.starts_with("vn ")).count(), 8);
        assert_eq!(obj.lines().filter(|l| l.starts_with("f ")).count(), 4);

        // wall group (bitmap 1) precedes the floor group (bitmap 2)
        let groups: Vec<&str> = obj.lines().filter(|l| l.starts_with("usemtl")).collect();
        assert_eq!(groups, ["usemtl mat_1", "usemtl mat_2"]);
        assert!(mtl.contains("map_Kd textures/grd00001.png"));
        assert!(mtl.contains("map_Kd textures/grd00002.png"));
    }

    #[test]
    fn conversion_is_reproducible() {
        let room = small_room();
        assert_eq!(render(&room), render(&room));
    }
}
