use std::rc::Rc;

use glbind::image_io::{decode_rgba8, encode_rgba8};
use glbind::{Error, GpuObject, InternalFormat, Texture2D};
use glbind_core::mock::MockGl;
use glbind_core::CodecOperation;

fn pattern(width: u32, height: u32) -> Vec<u8> {
    (0..width * height * 4).map(|i| (i * 37 % 251) as u8).collect()
}

fn round_trip(width: u32, height: u32) -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("source.png");
    let saved = dir.path().join("saved.png");
    let pixels = pattern(width, height);
    encode_rgba8(&source, width, height, &pixels)?;

    let mock = Rc::new(MockGl::new());
    let texture = Texture2D::from_image_file(mock.clone(), InternalFormat::RGBA8, &source)?;
    assert_eq!((texture.width(), texture.height()), (width, height));
    texture.save_image(&saved, 0)?;

    let image = decode_rgba8(&saved)?;
    assert_eq!((image.width, image.height), (width, height));
    assert_eq!(image.pixels, pixels);
    Ok(())
}

#[test]
fn single_pixel_round_trip() -> anyhow::Result<()> {
    round_trip(1, 1)
}

#[test]
fn square_round_trip() -> anyhow::Result<()> {
    round_trip(4, 4)
}

#[test]
fn odd_sized_round_trip() -> anyhow::Result<()> {
    round_trip(3, 5)
}

#[test]
fn loads_upload_rgba_bytes() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ids.png");
    encode_rgba8(&path, 2, 1, &[1, 2, 3, 4, 5, 6, 7, 8])?;

    let mock = Rc::new(MockGl::new());
    let texture = Texture2D::new(mock.clone(), InternalFormat::RGBA8UI);
    texture.load_image(&path, 0)?;

    let image = mock.texture_image(texture.id(), 0).unwrap();
    assert_eq!(image.internal_format, gl::RGBA8UI);
    assert_eq!(image.format, gl::RGBA_INTEGER);
    assert_eq!(image.ty, gl::UNSIGNED_BYTE);
    assert_eq!(image.data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    Ok(())
}

#[test]
fn depth_textures_cannot_load_images() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("depth.png");
    encode_rgba8(&path, 1, 1, &[0, 0, 0, 255])?;

    let mock = Rc::new(MockGl::new());
    let texture = Texture2D::new(mock.clone(), InternalFormat::DEPTH24_STENCIL8);
    let err = texture.load_image(&path, 0).unwrap_err();
    assert!(matches!(
        err,
        Error::IncompatibleFormat {
            internal_format: gl::DEPTH24_STENCIL8,
            operation: CodecOperation::Decode,
        }
    ));
    assert!(!texture.is_created());
    Ok(())
}

#[test]
fn corrupt_files_are_decode_errors() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("corrupt.png");
    std::fs::write(&path, b"not a png")?;

    let mock = Rc::new(MockGl::new());
    let err = Texture2D::from_image_file(mock, InternalFormat::RGBA8, &path)
        .err()
        .unwrap();
    match err {
        Error::ImageCodec {
            operation,
            path: reported,
            ..
        } => {
            assert_eq!(operation, CodecOperation::Decode);
            assert_eq!(reported, path);
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn read_pixels_uses_the_base_layout() -> anyhow::Result<()> {
    let mock = Rc::new(MockGl::new());
    let texture = Texture2D::with_data(mock, InternalFormat::RG8, 2, 2, &[1u8, 2, 3, 4, 5, 6, 7, 8])?;
    assert_eq!(texture.read_pixels(0)?, vec![1, 2, 3, 4, 5, 6, 7, 8]);

    let mut floats = [0.0f32; 3];
    assert!(matches!(
        texture.get_image(0, &mut floats),
        Err(Error::BufferTooSmall {
            required: 8,
            provided: 3
        })
    ));
    Ok(())
}
