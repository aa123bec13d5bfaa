//! Mesh accumulation: one [`MeshObject`] per bitmap number.
//!
//! Objects appear in first-touch order and keep that order all the way
//! into the OBJ file; the material for a bitmap is resolved exactly once,
//! when its object is created.

use glam::{Vec2, Vec3};

use crate::material::{Material, MaterialLookup};

/// Quadrilateral face: four corners (TL, TR, BR, BL) and two triangles.
/// A bowtied face collapses one corner pair; `ignore_triangle` names the
/// degenerate triangle, which is then not emitted.
#[derive(Clone, Debug)]
pub struct MeshFace {
    pub ignore_triangle: Option<usize>,
    pub indices: [u32; 6],
    pub positions: [Vec3; 4],
    pub tex_coords: [Vec2; 4],
    pub normal: Vec3,
}

/// Convex polygon fanned into `n − 2` triangles on a single plane.
#[derive(Clone, Debug)]
pub struct MeshPoly {
    pub indices: Vec<u32>,
    pub positions: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub normal: Vec3,
}

/// All faces sharing one bitmap number. Position / UV / normal sequences
/// run in parallel; indices are local to this object and rebased when the
/// OBJ file is written.
#[derive(Debug)]
pub struct MeshObject {
    pub id: u16,
    pub material: Material,
    pub indices: Vec<u32>,
    pub positions: Vec<f32>,
    pub tex_coords: Vec<f32>,
    pub normals: Vec<f32>,
}

impl MeshObject {
    fn new(id: u16, material: Material) -> Self {
        MeshObject {
            id,
            material,
            indices: Vec::new(),
            positions: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_vertex(&mut self, pos: Vec3, uv: Vec2, normal: Vec3) {
        self.positions.extend_from_slice(&[pos.x, pos.y, pos.z]);
        self.tex_coords.extend_from_slice(&[uv.x, uv.y]);
        self.normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
    }

    fn add_face(&mut self, face: &MeshFace) {
        let base = self.vertex_count() as u32;
        match face.ignore_triangle {
            Some(ignored) => {
                // the three surviving corners renumber to a single triangle
                let dropped = if ignored == 0 { 1 } else { 3 };
                self.indices.extend_from_slice(&[base, base + 1, base + 2]);
                for corner in 0..4 {
                    if corner == dropped {
                        continue;
                    }
                    self.push_vertex(
                        face.positions[corner],
                        face.tex_coords[corner],
                        face.normal,
                    );
                }
            }
            None => {
                self.indices.extend(face.indices.iter().map(|i| base + i));
                for corner in 0..4 {
                    self.push_vertex(
                        face.positions[corner],
                        face.tex_coords[corner],
                        face.normal,
                    );
                }
            }
        }
    }

    fn add_poly(&mut self, poly: &MeshPoly) {
        let base = self.vertex_count() as u32;
        self.indices.extend(poly.indices.iter().map(|i| base + i));
        for (pos, uv) in poly.positions.iter().zip(&poly.tex_coords) {
            self.push_vertex(*pos, *uv, poly.normal);
        }
    }
}

/// Accumulates mesh objects while walls and subsectors are converted.
pub struct MeshBuilder<'a> {
    materials: &'a dyn MaterialLookup,
    objects: Vec<MeshObject>,
}

impl<'a> MeshBuilder<'a> {
    pub fn new(materials: &'a dyn MaterialLookup) -> Self {
        MeshBuilder {
            materials,
            objects: Vec::new(),
        }
    }

    /// Index of the object for `bitmap`, creating it on first touch.
    pub(crate) fn object_index(&mut self, bitmap: u16) -> usize {
        if let Some(i) = self.objects.iter().position(|o| o.id == bitmap) {
            return i;
        }
        self.objects
            .push(MeshObject::new(bitmap, self.materials.material(bitmap)));
        self.objects.len() - 1
    }

    pub(crate) fn material(&self, index: usize) -> &Material {
        &self.objects[index].material
    }

    pub(crate) fn push_face(&mut self, index: usize, face: &MeshFace) {
        self.objects[index].add_face(face);
    }

    pub(crate) fn push_poly(&mut self, index: usize, poly: &MeshPoly) {
        self.objects[index].add_poly(poly);
    }

    pub fn objects(&self) -> &[MeshObject] {
        &self.objects
    }

    pub fn into_objects(self) -> Vec<MeshObject> {
        self.objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{vec2, vec3};

    struct StubMaterials;

    impl MaterialLookup for StubMaterials {
        fn material(&self, bitmap: u16) -> Material {
            Material::invalid(bitmap)
        }
    }

    fn quad() -> MeshFace {
        MeshFace {
            ignore_triangle: None,
            indices: [0, 2, 1, 0, 3, 2],
            positions: [
                vec3(0.0, 0.0, 1.0),
                vec3(1.0, 0.0, 1.0),
                vec3(1.0, 0.0, 0.0),
                vec3(0.0, 0.0, 0.0),
            ],
            tex_coords: [vec2(0.0, 0.0); 4],
            normal: vec3(0.0, 1.0, 0.0),
        }
    }

    #[test]
    fn objects_keep_first_touch_order() {
        let materials = StubMaterials;
        let mut builder = MeshBuilder::new(&materials);
        for bitmap in [9, 3, 9, 12, 3] {
            builder.object_index(bitmap);
        }
        let ids: Vec<u16> = builder.objects().iter().map(|o| o.id).collect();
        assert_eq!(ids, [9, 3, 12]);
    }

    #[test]
    fn face_appends_parallel_arrays() {
        let materials = StubMaterials;
        let mut builder = MeshBuilder::new(&materials);
        let idx = builder.object_index(1);
        builder.push_face(idx, &quad());
        builder.push_face(idx, &quad());

        let obj = &builder.objects()[0];
        assert_eq!(obj.vertex_count(), 8);
        assert_eq!(obj.positions.len(), 8 * 3);
        assert_eq!(obj.tex_coords.len(), 8 * 2);
        assert_eq!(obj.normals.len(), 8 * 3);
        // second face's indices are rebased past the first's vertices
        assert_eq!(&obj.indices[6..], &[4, 6, 5, 4, 7, 6]);
        assert!(obj.indices.iter().all(|&i| (i as usize) < obj.vertex_count()));
    }

    #[test]
    fn bowtied_face_keeps_one_triangle() {
        let materials = StubMaterials;
        let mut builder = MeshBuilder::new(&materials);
        let idx = builder.object_index(1);

        let mut face = quad();
        face.ignore_triangle = Some(0);
        builder.push_face(idx, &face);

        let obj = &builder.objects()[0];
        assert_eq!(obj.vertex_count(), 3);
        assert_eq!(obj.indices, [0, 1, 2]);
        // corner 1 (top right) was the dropped one
        assert_eq!(&obj.positions[3..6], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn poly_fan_rebases_like_faces() {
        let materials = StubMaterials;
        let mut builder = MeshBuilder::new(&materials);
        let idx = builder.object_index(2);
        builder.push_face(idx, &quad());

        let poly = MeshPoly {
            indices: vec![0, 2, 1, 0, 3, 2],
            positions: vec![
                vec3(0.0, 0.0, 0.0),
                vec3(1.0, 0.0, 0.0),
                vec3(1.0, 1.0, 0.0),
                vec3(0.0, 1.0, 0.0),
            ],
            tex_coords: vec![vec2(0.0, 0.0); 4],
            normal: vec3(0.0, 0.0, 1.0),
        };
        builder.push_poly(idx, &poly);

        let obj = &builder.objects()[0];
        assert_eq!(obj.vertex_count(), 8);
        assert_eq!(&obj.indices[6..], &[4, 6, 5, 4, 7, 6]);
    }
}
