//! Unpack one Meridian 59 BGF sprite container.
//!
//! ```bash
//! bgf2png grd00042.bgf
//! ```
//!
//! Writes `<basename>.png` (the sprite atlas) and `<basename>.json` (the
//! metadata sidecar consumed by `roo2obj`) into the working directory.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use clap::Parser;

use m59tools::bgf::{self, Bgf};

#[derive(Parser)]
#[command(about = "Unpack a Meridian 59 BGF sprite container to a PNG atlas")]
struct Args {
    /// Sprite container to unpack
    bgf_file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Unpacking {}", args.bgf_file.display());
    let mut bgf = Bgf::from_file(&args.bgf_file)
        .with_context(|| format!("failed to load {}", args.bgf_file.display()))?;

    if bgf.bitmaps.is_empty() {
        bail!("{} holds no bitmaps", args.bgf_file.display());
    }

    println!("Packing {} bitmaps...", bgf.bitmaps.len());
    let atlas = bgf::build_atlas(&mut bgf.bitmaps)?;

    let stem = args
        .bgf_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sprites");
    let png_name = format!("{stem}.png");
    let json_name = format!("{stem}.json");

    bgf::export::write_png(Path::new(&png_name), &atlas)
        .with_context(|| format!("failed to write {png_name}"))?;

    let json_file =
        File::create(&json_name).with_context(|| format!("failed to create {json_name}"))?;
    let mut json_out = BufWriter::new(json_file);
    bgf::export::write_metadata(&mut json_out, &bgf, &png_name)?;
    json_out.flush()?;

    println!("{} successfully unpacked", args.bgf_file.display());
    Ok(())
}
