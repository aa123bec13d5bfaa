//! Wavefront OBJ/MTL serialization of the mesh-object table.
//!
//! Vertex data is written object by object in first-touch order (all `v`,
//! then all `vt`, then all `vn`), followed by one `usemtl` group per
//! object whose face indices are rebased into the global 1-based arrays.

use std::io::{self, Write};
use std::path::Path;

use glam::{Vec3, vec3};

use crate::mesh::MeshObject;
use crate::units::FINENESS;

/// World fineness → OBJ space: forward is −Z, up is Y, and the model is
/// mirrored to match the in-game orientation.
pub fn obj_position(v: Vec3) -> Vec3 {
    vec3(-v.x / FINENESS, v.z / FINENESS, -v.y / FINENESS)
}

/// Same axis swap as [`obj_position`] without the unit scaling.
pub fn obj_normal(v: Vec3) -> Vec3 {
    vec3(-v.x, v.z, -v.y)
}

pub fn write_obj<W: Write>(out: &mut W, objects: &[MeshObject], mtl_name: &str) -> io::Result<()> {
    writeln!(out, "mtllib {mtl_name}")?;

    for obj in objects {
        for p in obj.positions.chunks_exact(3) {
            let v = obj_position(vec3(p[0], p[1], p[2]));
            writeln!(out, "v {:.6} {:.6} {:.6}", v.x, v.y, v.z)?;
        }
    }
    for obj in objects {
        for t in obj.tex_coords.chunks_exact(2) {
            writeln!(out, "vt {:.6} {:.6}", t[0], t[1])?;
        }
    }
    for obj in objects {
        for n in obj.normals.chunks_exact(3) {
            let v = obj_normal(vec3(n[0], n[1], n[2]));
            writeln!(out, "vn {:.6} {:.6} {:.6}", v.x, v.y, v.z)?;
        }
    }

    let mut base = 1usize;
    for obj in objects {
        writeln!(out, "usemtl mat_{}", obj.id)?;
        for tri in obj.indices.chunks_exact(3) {
            let a = tri[0] as usize + base;
            let b = tri[1] as usize + base;
            let c = tri[2] as usize + base;
            writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        }
        base += obj.vertex_count();
    }
    Ok(())
}

pub fn write_mtl<W: Write>(
    out: &mut W,
    objects: &[MeshObject],
    texture_dir: &Path,
) -> io::Result<()> {
    for obj in objects {
        writeln!(out, "newmtl mat_{}", obj.id)?;
        writeln!(out, "Ka 1.000000 1.000000 1.000000")?;
        writeln!(out, "Kd 1.000000 1.000000 1.000000")?;
        writeln!(out, "Ks 0.000000 0.000000 0.000000")?;
        writeln!(out, "Tr 1.000000")?;
        writeln!(out, "illum 1")?;
        writeln!(out, "Ns 0.000000")?;
        writeln!(
            out,
            "map_Kd {}/{}",
            texture_dir.display(),
            obj.material.texture_file
        )?;
        writeln!(out)?;
    }
    Ok(())
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
