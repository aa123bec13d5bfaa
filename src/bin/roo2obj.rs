//! Convert one Meridian 59 ROO room file into a Wavefront OBJ/MTL pair.
//!
//! ```bash
//! roo2obj room.roo textures/
//! ```
//!
//! `textures/` is the directory holding the `grd#####.json` / PNG pairs
//! written by `bgf2png`. Output lands in the working directory as
//! `<basename>.obj` and `<basename>.mtl`.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, bail};
use clap::Parser;

use m59tools::{
    material::SidecarLibrary,
    mesh::{self, MeshBuilder},
    obj,
    roo::Room,
};

#[derive(Parser)]
#[command(about = "Convert a Meridian 59 ROO room file to Wavefront OBJ/MTL")]
struct Args {
    /// Room file to convert
    roo_file: PathBuf,
    /// Directory of grd#####.json sidecars and their PNG atlases
    texture_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !args.texture_dir.is_dir() {
        bail!(
            "texture directory {} does not exist",
            args.texture_dir.display()
        );
    }

    let room = Room::from_file(&args.roo_file)
        .with_context(|| format!("failed to load {}", args.roo_file.display()))?;

    let materials = SidecarLibrary::new(&args.texture_dir);
    let mut builder = MeshBuilder::new(&materials);
    mesh::meshify_room(&room, &mut builder);

    let stem = args
        .roo_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("room");
    let obj_name = format!("{stem}.obj");
    let mtl_name = format!("{stem}.mtl");

    let obj_file =
        File::create(&obj_name).with_context(|| format!("failed to create {obj_name}"))?;
    let mut obj_out = BufWriter::new(obj_file);
    obj::write_obj(&mut obj_out, builder.objects(), &mtl_name)?;
    obj_out.flush()?;

    let mtl_file =
        File::create(&mtl_name).with_context(|| format!("failed to create {mtl_name}"))?;
    let mut mtl_out = BufWriter::new(mtl_file);
    obj::write_mtl(&mut mtl_out, builder.objects(), &args.texture_dir)?;
    mtl_out.flush()?;

    Ok(())
}
