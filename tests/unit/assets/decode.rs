use std::io::Cursor;

use super::*;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let decoded = decode_image(&buf).unwrap();
    assert_eq!(decoded.width, 1);
    assert_eq!(decoded.height, 1);
    assert_eq!(
        decoded.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_garbage_is_an_error() {
    let err = decode_image(b"definitely not a png").unwrap_err();
    assert!(err.is_recoverable());
}

#[test]
fn from_rgba8_checks_length() {
    let ok = DecodedImage::from_rgba8(2, 1, vec![255; 8]).unwrap();
    assert_eq!(ok.size(), Size::new(2.0, 1.0));
    assert!((ok.aspect() - 2.0).abs() < 1e-12);

    let err = DecodedImage::from_rgba8(2, 2, vec![255; 8]).unwrap_err();
    assert!(err.is_recoverable());
}
