//! Writing a [`ResultBundle`] to disk.

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::processing::layout::Rect;
use crate::result::{ResultBundle, StyleInfo};

/// Files produced for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub print: PathBuf,
    pub mask: PathBuf,
    pub normal: Option<PathBuf>,
    pub meta: PathBuf,
}

#[derive(Serialize)]
struct Metadata<'a> {
    size: (u32, u32),
    photo_rect: Rect,
    border_rect: Rect,
    #[serde(flatten)]
    style: &'a StyleInfo,
}

/// Save `<stem>_print.png`, `<stem>_mask.png`, optionally `<stem>_normal.png`
/// and `<stem>_meta.json` under `out_dir`, creating it if needed.
pub fn write_bundle(bundle: &ResultBundle, out_dir: &Path, stem: &str) -> Result<OutputPaths> {
    fs::create_dir_all(out_dir)?;
    let paths = OutputPaths {
        print: out_dir.join(format!("{stem}_print.png")),
        mask: out_dir.join(format!("{stem}_mask.png")),
        normal: bundle
            .normal_map
            .as_ref()
            .map(|_| out_dir.join(format!("{stem}_normal.png"))),
        meta: out_dir.join(format!("{stem}_meta.json")),
    };

    bundle.image.save(&paths.print)?;
    bundle.photo_mask.save(&paths.mask)?;
    if let (Some(normal), Some(path)) = (&bundle.normal_map, &paths.normal) {
        normal.save(path)?;
    }

    let meta = Metadata {
        size: bundle.size(),
        photo_rect: bundle.photo_rect,
        border_rect: bundle.border_rect,
        style: &bundle.style_info,
    };
    let writer = BufWriter::new(fs::File::create(&paths.meta)?);
    serde_json::to_writer_pretty(writer, &meta)?;
    debug!(print = %paths.print.display(), "wrote outputs");
    Ok(paths)
}
