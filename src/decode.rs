//! Image decoding off the session loop.
//!
//! A decoder turns the raw bytes of a dropped file into an [`ImagePayload`]:
//! a `data:` URL the renderer can display plus the natural pixel size. The
//! session runs decoders on the blocking pool, so implementations may do
//! CPU-heavy work synchronously.

#[cfg(test)]
#[path = "decode_test.rs"]
mod decode_test;

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use canvas::doc::{ImagePayload, SourceFile};
use image::ImageFormat;
use image::io::Reader;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("unrecognized image format")]
    UnknownFormat,
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("image read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns a source file into a displayable payload.
pub trait ImageDecoder: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the file is not a readable image.
    fn decode(&self, file: &SourceFile) -> Result<ImagePayload, DecodeError>;
}

/// Default decoder: sniffs the format, reads the header for the dimensions,
/// and embeds the original bytes as a base64 `data:` URL.
#[derive(Debug, Clone, Copy)]
pub struct DataUrlDecoder {
    max_bytes: usize,
}

impl DataUrlDecoder {
    #[must_use]
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

impl ImageDecoder for DataUrlDecoder {
    fn decode(&self, file: &SourceFile) -> Result<ImagePayload, DecodeError> {
        let bytes: &[u8] = &file.bytes;
        if bytes.len() > self.max_bytes {
            return Err(DecodeError::TooLarge { size: bytes.len(), limit: self.max_bytes });
        }
        let reader = Reader::new(Cursor::new(bytes)).with_guessed_format()?;
        let Some(format) = reader.format() else {
            return Err(DecodeError::UnknownFormat);
        };
        let (natural_width, natural_height) = reader.into_dimensions()?;
        let mime = mime_type(format);
        let data_url = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
        Ok(ImagePayload { data_url: data_url.into(), mime: mime.to_owned(), natural_width, natural_height })
    }
}

fn mime_type(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Avif => "image/avif",
        _ => "application/octet-stream",
    }
}
