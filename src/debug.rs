//! Optional sink for intermediate images.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::{debug, warn};

/// Default directory used when debugging is requested without a sink.
pub const DEFAULT_DEBUG_DIR: &str = "_debug";

/// Receives every named intermediate image in pipeline order.
///
/// Sinks must not influence the pipeline: failures are theirs to report.
pub trait DebugSink {
    fn record(&mut self, image: &DynamicImage, label: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DebugSink for NullSink {
    fn record(&mut self, _image: &DynamicImage, _label: &str) {}
}

/// Writes `NN_label.png` files in call order.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    counter: u32,
    ready: bool,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: 0,
            ready: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_path(&mut self, label: &str) -> PathBuf {
        let name = format!("{:02}_{}.png", self.counter, sanitize(label));
        self.counter += 1;
        self.dir.join(name)
    }
}

impl DebugSink for DirectorySink {
    fn record(&mut self, image: &DynamicImage, label: &str) {
        if !self.ready {
            if let Err(err) = fs::create_dir_all(&self.dir) {
                warn!(dir = %self.dir.display(), error = %err, "cannot create debug directory");
                return;
            }
            self.ready = true;
        }
        let path = self.next_path(label);
        match image.save(&path) {
            Ok(()) => debug!(path = %path.display(), "saved debug frame"),
            Err(err) => warn!(path = %path.display(), error = %err, "failed to save debug frame"),
        }
    }
}

fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn writes_numbered_frames() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("frames");
        let mut sink = DirectorySink::new(&dir);
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, Rgb([1, 2, 3])));
        sink.record(&img, "source");
        sink.record(&img, "after optics");
        assert!(dir.join("00_source.png").exists());
        assert!(dir.join("01_after_optics.png").exists());
    }

    #[test]
    fn unwritable_directory_is_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let mut sink = DirectorySink::new(blocker.join("nested"));
        let img = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        sink.record(&img, "source");
        assert!(!blocker.join("nested").exists());
    }
}
