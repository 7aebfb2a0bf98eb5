//! Local image frame source.
//!
//! Reads a single image file or every PNG/JPEG file in a directory (sorted by
//! file name) and decodes each to an RGB8 `Frame`. Nothing is fetched from the
//! network and decoded frames are not cached.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use super::{Pacer, SourceConfig, SourceStats};
use crate::frame::Frame;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub struct ImageSource {
    config: SourceConfig,
    pending: Vec<PathBuf>,
    next_index: usize,
    frame_count: u64,
    pacer: Pacer,
    connected: bool,
    last_error: Option<String>,
}

impl ImageSource {
    pub fn new(config: SourceConfig) -> Self {
        let pacer = Pacer::new(config.target_fps);
        Self {
            config,
            pending: Vec::new(),
            next_index: 0,
            frame_count: 0,
            pacer,
            connected: false,
            last_error: None,
        }
    }

    pub fn connect(&mut self) -> Result<()> {
        let path = Path::new(&self.config.url);
        self.pending = if path.is_dir() {
            list_images(path)?
        } else if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            return Err(anyhow!("image source {} does not exist", path.display()));
        };
        if self.pending.is_empty() {
            return Err(anyhow!("no PNG or JPEG images in {}", path.display()));
        }
        self.next_index = 0;
        self.connected = true;
        log::info!(
            "ImageSource: connected to {} ({} images)",
            path.display(),
            self.pending.len()
        );
        Ok(())
    }

    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        if !self.connected {
            return Err(anyhow!("image source not connected; call connect() first"));
        }
        let Some(path) = self.pending.get(self.next_index).cloned() else {
            return Ok(None);
        };
        self.next_index += 1;
        self.pacer.wait();

        match decode_image(&path) {
            Ok(frame) => {
                self.frame_count += 1;
                self.last_error = None;
                Ok(Some(frame))
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.connected && self.last_error.is_none()
    }

    pub fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            source: self.config.url.clone(),
        }
    }
}

/// Decode an image file into a tightly packed RGB8 frame.
pub fn decode_image(path: &Path) -> Result<Frame> {
    let decoded = ::image::open(path)
        .with_context(|| format!("failed to decode image {}", path.display()))?
        .to_rgb8();
    let (width, height) = decoded.dimensions();
    Ok(Frame::rgb8(width, height, decoded.into_raw()))
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read image directory {}", dir.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && has_image_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str, white_col: Option<u32>) -> PathBuf {
        let mut img = RgbImage::from_pixel(6, 2, Rgb([0, 0, 0]));
        if let Some(col) = white_col {
            img.put_pixel(col, 1, Rgb([255, 255, 255]));
        }
        let path = dir.join(name);
        img.save(&path).expect("save png");
        path
    }

    fn source_for(path: &Path) -> ImageSource {
        ImageSource::new(SourceConfig {
            url: path.display().to_string(),
            target_fps: 0,
            ..SourceConfig::default()
        })
    }

    #[test]
    fn decodes_png_to_rgb8_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "one.png", Some(5));
        let frame = decode_image(&path).unwrap();
        assert_eq!(frame.width(), 6);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.step(), 18);
        assert_eq!(&frame.pixels()[33..36], &[255, 255, 255]);
    }

    #[test]
    fn directory_yields_sorted_images_then_ends() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "b.png", Some(5));
        write_png(dir.path(), "a.png", None);
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

        let mut source = source_for(dir.path());
        source.connect().unwrap();
        let first = source.next_frame().unwrap().expect("a.png");
        assert!(!first.pixels().contains(&255));
        let second = source.next_frame().unwrap().expect("b.png");
        assert!(second.pixels().contains(&255));
        assert!(source.next_frame().unwrap().is_none());
        assert_eq!(source.stats().frames_captured, 2);
    }

    #[test]
    fn corrupt_image_marks_source_unhealthy() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not really a png").unwrap();
        let mut source = source_for(dir.path());
        source.connect().unwrap();
        assert!(source.next_frame().is_err());
        assert!(!source.is_healthy());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn empty_directory_fails_to_connect() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = source_for(dir.path());
        assert!(source.connect().is_err());
    }

    #[test]
    fn missing_path_fails_to_connect() {
        let mut source = source_for(Path::new("/nonexistent/ball/frames"));
        assert!(source.connect().is_err());
    }
}
