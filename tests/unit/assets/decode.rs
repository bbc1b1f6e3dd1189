use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, EditorError::Decode(_)));
}

#[test]
fn decode_image_rasterizes_svg_at_intrinsic_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4">
        <rect width="8" height="4" fill="#ff0000"/>
    </svg>"##;
    let img = decode_image(svg).unwrap();
    assert_eq!((img.width, img.height), (8, 4));
    assert_eq!(img.pixel(3, 2), Some([255, 0, 0, 255]));
}

#[test]
fn svg_sniffing_survives_multibyte_char_at_cutoff() {
    let open = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><desc>"#;
    let mut svg = String::from(open);
    svg.push_str(&"a".repeat(511 - open.len()));
    svg.push('é');
    svg.push_str(r##"</desc><rect width="4" height="4" fill="#00ff00"/></svg>"##);
    assert_eq!(svg.find('é'), Some(511));

    let img = decode_image(svg.as_bytes()).unwrap();
    assert_eq!((img.width, img.height), (4, 4));
    assert_eq!(img.pixel(1, 1), Some([0, 255, 0, 255]));
}

#[test]
fn parse_svg_ok_and_err() {
    let ok = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"></svg>"#;
    parse_svg(ok).unwrap();
    assert!(parse_svg(br#"<svg"#).is_err());
}

#[test]
fn from_premul_checks_buffer_length() {
    assert!(PreparedImage::from_premul(2, 2, vec![0; 16]).is_ok());
    assert!(PreparedImage::from_premul(2, 2, vec![0; 15]).is_err());
    assert!(PreparedImage::from_premul(0, 2, vec![]).is_err());
}

#[test]
fn unpremultiply_inverts_premultiply_for_opaque_and_half_alpha() {
    let mut px = vec![200, 100, 50, 255, 200, 100, 50, 128];
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[200, 100, 50, 255]);
    for (got, want) in px[4..7].iter().zip([200u8, 100, 50]) {
        assert!((*got as i16 - want as i16).abs() <= 2);
    }
}
