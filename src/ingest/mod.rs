//! Frame sources.
//!
//! - Synthetic source (`stub://`): a white ball sweeping across a black scene
//! - Local image file or directory (feature: ingest-image)
//!
//! All sources produce RGB8 `Frame` values and pace themselves to the
//! configured frame rate. Sources do not queue frames; the consumer decides
//! which frame to process.

#[cfg(feature = "ingest-image")]
pub mod images;
mod pace;
pub mod synthetic;

use anyhow::{anyhow, Result};

use crate::frame::Frame;

#[cfg(feature = "ingest-image")]
pub use images::{decode_image, ImageSource};
pub(crate) use pace::Pacer;
pub use pace::RetryBackoff;
pub use synthetic::SyntheticSource;

/// Configuration for a frame source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceConfig {
    /// `stub://name` for synthetic frames, otherwise a local image file or directory.
    pub url: String,
    /// Target frame rate (frames per second).
    pub target_fps: u32,
    /// Frame width for synthetic frames.
    pub width: u32,
    /// Frame height for synthetic frames.
    pub height: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "stub://camera/rgb/image_raw".to_string(),
            target_fps: 10,
            width: 640,
            height: 480,
        }
    }
}

/// Capture statistics for a source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceStats {
    pub frames_captured: u64,
    pub source: String,
}

/// Camera frame source.
pub struct FrameSource {
    backend: SourceBackend,
}

enum SourceBackend {
    Synthetic(SyntheticSource),
    #[cfg(feature = "ingest-image")]
    Image(ImageSource),
}

impl FrameSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(anyhow!("frame source url must not be empty"));
        }
        if config.url.starts_with("stub://") {
            return Ok(Self {
                backend: SourceBackend::Synthetic(SyntheticSource::new(config)),
            });
        }
        if config.url.contains("://") {
            return Err(anyhow!(
                "unsupported frame source '{}': expected stub:// or a local path",
                config.url
            ));
        }
        #[cfg(feature = "ingest-image")]
        {
            Ok(Self {
                backend: SourceBackend::Image(ImageSource::new(config)),
            })
        }
        #[cfg(not(feature = "ingest-image"))]
        {
            Err(anyhow!(
                "image file ingestion requires the ingest-image feature"
            ))
        }
    }

    pub fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            SourceBackend::Synthetic(source) => source.connect(),
            #[cfg(feature = "ingest-image")]
            SourceBackend::Image(source) => source.connect(),
        }
    }

    /// Capture the next frame. `None` means the source is exhausted.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        match &mut self.backend {
            SourceBackend::Synthetic(source) => source.next_frame(),
            #[cfg(feature = "ingest-image")]
            SourceBackend::Image(source) => source.next_frame(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        match &self.backend {
            SourceBackend::Synthetic(source) => source.is_healthy(),
            #[cfg(feature = "ingest-image")]
            SourceBackend::Image(source) => source.is_healthy(),
        }
    }

    pub fn stats(&self) -> SourceStats {
        match &self.backend {
            SourceBackend::Synthetic(source) => source.stats(),
            #[cfg(feature = "ingest-image")]
            SourceBackend::Image(source) => source.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_url_selects_synthetic_source() {
        let mut source = FrameSource::new(SourceConfig {
            target_fps: 1000,
            ..SourceConfig::default()
        })
        .unwrap();
        source.connect().unwrap();
        let frame = source.next_frame().unwrap().expect("frame");
        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 480);
        assert_eq!(source.stats().frames_captured, 1);
        assert!(source.is_healthy());
    }

    #[test]
    fn remote_schemes_are_rejected() {
        let err = FrameSource::new(SourceConfig {
            url: "rtsp://camera/stream".into(),
            ..SourceConfig::default()
        })
        .err()
        .expect("rejected");
        assert!(err.to_string().contains("unsupported frame source"));
    }

    #[test]
    fn empty_url_is_rejected() {
        assert!(FrameSource::new(SourceConfig {
            url: "  ".into(),
            ..SourceConfig::default()
        })
        .is_err());
    }
}
