//! Where rendered images go once the sweep is done.
use std::{io::{self, BufRead}, path::PathBuf};

use ::image::DynamicImage;
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DisplayError {
    #[error("Unable to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },
    #[error("Unable to read keypress")]
    Input(#[from] io::Error),
}

/// Accepts rendered buffers for display
pub trait DisplaySink {
    /// Show `image` under `title`
    fn show(&mut self, title: &str, image: &DynamicImage) -> Result<(), DisplayError>;

    /// Block until the user acknowledges the shown images
    fn wait_key(&mut self) -> Result<(), DisplayError>;
}

/// Discards everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDisplay;

impl DisplaySink for NoDisplay {
    fn show(&mut self, _title: &str, _image: &DynamicImage) -> Result<(), DisplayError> {
        Ok(())
    }

    fn wait_key(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// Writes every shown image as a PNG file into a directory
#[derive(Clone, Debug)]
pub struct FileSink {
    dir: PathBuf,
    wait: bool,
    written: Vec<PathBuf>,
}

impl FileSink {
    /// `wait`: block on Enter in [DisplaySink::wait_key]
    pub fn new(dir: impl Into<PathBuf>, wait: bool) -> Self {
        Self {
            dir: dir.into(),
            wait,
            written: Vec::new(),
        }
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// `Output Image` -> `output_image.png`
    fn file_name(title: &str) -> String {
        let stem = title
            .trim()
            .chars()
            .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect::<String>();
        format!("{stem}.png")
    }
}

impl DisplaySink for FileSink {
    fn show(&mut self, title: &str, image: &DynamicImage) -> Result<(), DisplayError> {
        let path = self.dir.join(Self::file_name(title));
        image.save(&path)
            .map_err(|source| DisplayError::Write { path: path.clone(), source })?;
        info!("{title}: wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }

    fn wait_key(&mut self) -> Result<(), DisplayError> {
        if !self.wait {
            return Ok(());
        }
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use ::image::{DynamicImage, GrayImage};

    use super::{DisplayError, DisplaySink, FileSink, NoDisplay};

    #[test]
    fn file_names() {
        assert_eq!(FileSink::file_name("Output Image"), "output_image.png");
        assert_eq!(FileSink::file_name(" a/b "), "a_b.png");
    }

    #[test]
    fn writes_png() {
        let dir = std::env::temp_dir().join(format!("sobel-sweep-sink-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut sink = FileSink::new(&dir, false);
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 2, ::image::Luma([9])));
        sink.show("Original Image", &image).unwrap();
        sink.wait_key().unwrap();

        let path = dir.join("original_image.png");
        assert_eq!(sink.written(), &[path.clone()]);
        let read = ::image::open(&path).unwrap().into_luma8();
        assert_eq!(read.dimensions(), (3, 2));
        assert_eq!(read.get_pixel(2, 1).0, [9]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_dir_fails() {
        let mut sink = FileSink::new("/nonexistent/sobel-sweep", false);
        let image = DynamicImage::ImageLuma8(GrayImage::new(1, 1));
        assert!(matches!(sink.show("x", &image), Err(DisplayError::Write { .. })));
    }

    #[test]
    fn no_display() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(1, 1));
        NoDisplay.show("x", &image).unwrap();
        NoDisplay.wait_key().unwrap();
    }
}
