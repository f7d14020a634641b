//! PNG codec for texture save/load, over the `image` crate.
//!
//! Images are always transferred as 8-bit RGBA, row 0 first.

use std::path::Path;

use glbind_core::{CodecOperation, Error, Result};
use image::{ColorType, ImageFormat};

/// A decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rgba8Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

fn codec_error(operation: CodecOperation, path: &Path, message: impl ToString) -> Error {
    Error::ImageCodec {
        operation,
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Decode the PNG at `path` into RGBA8 pixels.
pub fn decode_rgba8(path: impl AsRef<Path>) -> Result<Rgba8Image> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|err| codec_error(CodecOperation::Decode, path, err))?;
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .map_err(|err| codec_error(CodecOperation::Decode, path, err))?
        .into_rgba8();

    Ok(Rgba8Image {
        width: image.width(),
        height: image.height(),
        pixels: image.into_raw(),
    })
}

/// Encode `pixels` (`width * height * 4` bytes) as a PNG at `path`.
pub fn encode_rgba8(path: impl AsRef<Path>, width: u32, height: u32, pixels: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(codec_error(
            CodecOperation::Encode,
            path,
            format!("expected {expected} bytes of RGBA8 data, got {}", pixels.len()),
        ));
    }
    image::save_buffer_with_format(path, pixels, width, height, ColorType::Rgba8, ImageFormat::Png)
        .map_err(|err| codec_error(CodecOperation::Encode, path, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_are_decode_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode_rgba8(dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(
            err,
            Error::ImageCodec {
                operation: CodecOperation::Decode,
                ..
            }
        ));
    }

    #[test]
    fn short_buffers_are_encode_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = encode_rgba8(dir.path().join("out.png"), 2, 2, &[0; 15]).unwrap_err();
        assert!(matches!(
            err,
            Error::ImageCodec {
                operation: CodecOperation::Encode,
                ..
            }
        ));
    }

    #[test]
    fn odd_sizes_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.png");
        let pixels: Vec<u8> = (0..3 * 5 * 4).map(|i| (i * 7) as u8).collect();
        encode_rgba8(&path, 3, 5, &pixels).unwrap();

        let image = decode_rgba8(&path).unwrap();
        assert_eq!((image.width, image.height), (3, 5));
        assert_eq!(image.pixels, pixels);
    }
}
