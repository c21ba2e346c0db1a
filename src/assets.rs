//! Asset loading: still images and flip-book frame sequences.
//!
//! Decoding happens off the event-loop thread. [`AssetLoader::spawn`] reads
//! every path of an [`AssetSource`] in order and hands the complete result to
//! a delivery callback, typically one that posts it back to the event loop.
//! Nothing is delivered until every frame has resolved, and the first
//! failure aborts the whole load.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use log::{debug, info};

use crate::config::AssetSource;
use crate::error::{Error, Result};

/// An RGBA8 image decoded on the CPU, ready for upload.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    /// Read and decode an image file.
    pub fn load(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .map_err(|source| Error::AssetLoadFailure {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();

        Ok(Self {
            path: path.to_path_buf(),
            width,
            height,
            rgba: img.into_raw(),
        })
    }

    /// Decode an image from embedded bytes. `label` stands in for the path.
    pub fn from_bytes(bytes: &[u8], label: &str) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|source| Error::AssetLoadFailure {
                path: PathBuf::from(label),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();

        Ok(Self {
            path: PathBuf::from(label),
            width,
            height,
            rgba: img.into_raw(),
        })
    }
}

/// Load every image of `source` in order, stopping at the first failure.
pub fn load_source(source: &AssetSource) -> Result<Vec<DecodedImage>> {
    let paths = source.paths();
    if paths.is_empty() {
        let dir = match source {
            AssetSource::FrameSequence(seq) => seq.dir.clone(),
            AssetSource::Still { path } => path.clone(),
        };
        return Err(Error::NoFrames(dir));
    }

    let images = paths
        .iter()
        .map(|path| {
            debug!("decoding {}", path.display());
            DecodedImage::load(path)
        })
        .collect::<Result<Vec<_>>>()?;

    info!("loaded {} image(s)", images.len());
    Ok(images)
}

/// Background decoder for one [`AssetSource`].
pub struct AssetLoader {
    handle: JoinHandle<()>,
}

impl AssetLoader {
    /// Start decoding on a worker thread and call `deliver` with the result.
    pub fn spawn<F>(source: AssetSource, deliver: F) -> Result<Self>
    where
        F: FnOnce(Result<Vec<DecodedImage>>) + Send + 'static,
    {
        let handle = std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || deliver(load_source(&source)))?;

        Ok(Self { handle })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameSequence;
    use std::sync::mpsc;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "pixel-zoom-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn still_image_decodes_to_rgba() {
        let dir = scratch_dir("still");
        let path = dir.join("full.png");
        write_png(&path, 3, 2);

        let images = load_source(&AssetSource::still(&path)).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!((images[0].width, images[0].height), (3, 2));
        assert_eq!(images[0].rgba.len(), 3 * 2 * 4);
        assert_eq!(&images[0].rgba[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn frames_resolve_in_index_order() {
        let dir = scratch_dir("frames");
        let seq = FrameSequence::new(&dir).count(12);
        for i in 0..12 {
            // Width encodes the index
            write_png(&seq.frame_path(i), i as u32 + 1, 1);
        }

        let images = load_source(&AssetSource::FrameSequence(seq)).unwrap();
        let widths: Vec<u32> = images.iter().map(|img| img.width).collect();
        assert_eq!(widths, (1..=12).collect::<Vec<u32>>());
    }

    #[test]
    fn missing_frame_fails_with_its_path() {
        let dir = scratch_dir("gap");
        let seq = FrameSequence::new(&dir).count(3);
        write_png(&seq.frame_path(0), 1, 1);
        write_png(&seq.frame_path(2), 1, 1);

        let err = load_source(&AssetSource::FrameSequence(seq.clone())).unwrap_err();
        match err {
            Error::AssetLoadFailure { path, .. } => assert_eq!(path, seq.frame_path(1)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_sequence_is_an_error() {
        let seq = FrameSequence::new("nowhere").count(0);
        assert!(matches!(
            load_source(&AssetSource::FrameSequence(seq)),
            Err(Error::NoFrames(_))
        ));
    }

    #[test]
    fn invalid_bytes_are_rejected() {
        let err = DecodedImage::from_bytes(b"not an image", "inline").unwrap_err();
        assert!(err.to_string().contains("inline"));
    }

    #[test]
    fn loader_delivers_from_worker_thread() {
        let dir = scratch_dir("worker");
        let path = dir.join("full.png");
        write_png(&path, 4, 4);

        let (tx, rx) = mpsc::channel();
        let loader = AssetLoader::spawn(AssetSource::still(&path), move |result| {
            tx.send(result).unwrap();
        })
        .unwrap();

        let images = rx.recv().unwrap().unwrap();
        assert_eq!(images[0].width, 4);
        while !loader.is_finished() {
            std::thread::yield_now();
        }
    }
}
