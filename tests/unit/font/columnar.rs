use super::*;
use crate::foundation::core::{Point, Rgba8};
use crate::raster::buffer::PixelBuffer;

fn spec(data: Vec<Vec<u8>>, w: u32, h: u32) -> ColumnarFontSpec {
    ColumnarFontSpec {
        data,
        char_height: h,
        char_width: w,
        first_char: 65,
        name: "t".to_string(),
        char_count: None,
    }
}

#[test]
fn solid_square_sets_exactly_four_pixels() {
    let font = decode_columnar(&spec(vec![vec![0b11, 0b11]], 2, 2)).unwrap();
    let mut buf = PixelBuffer::new(4, 4);
    crate::font::raster::draw(&mut buf, &font, "A", Point::new(0, 2), 1, Rgba8::WHITE);

    assert_eq!(buf.count_set(), 4);
    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        assert!(buf.is_set(x, y), "({x},{y}) should be set");
    }
}

#[test]
fn glyph_metrics_anchor_bottom_row_above_pen() {
    let font = decode_columnar(&spec(vec![vec![0x01, 0x00, 0x40]], 3, 7)).unwrap();
    let g = font.glyph(65).unwrap();
    assert_eq!(g.bounds.x_offset, 0);
    assert_eq!(g.bounds.y_offset, 6);
    assert_eq!(g.x_advance, 4);
    assert!(g.pixel(0, 0));
    assert!(g.pixel(2, 6));
    assert!(!g.pixel(1, 0));
    assert_eq!(g.ink_count(), 2);
}

#[test]
fn second_plane_holds_rows_below_eight() {
    let font = decode_columnar(&spec(vec![vec![0xFF, 0x01]], 1, 9)).unwrap();
    let g = font.glyph(65).unwrap();
    assert_eq!(g.ink_count(), 9);
    assert!(g.pixel(0, 8));
}

#[test]
fn codes_start_at_first_char() {
    let font = decode_columnar(&spec(vec![vec![1], vec![2], vec![3]], 1, 2)).unwrap();
    assert_eq!(font.len(), 3);
    assert!(font.has_char(65));
    assert!(font.has_char(67));
    assert!(!font.has_char(68));
    assert_eq!(font.meta().ascent, 2);
    assert_eq!(font.meta().default_char, 65);
}

#[test]
fn byte_count_mismatch_is_a_decode_error() {
    let err = decode_columnar(&spec(vec![vec![1, 1], vec![1]], 2, 2)).unwrap_err();
    assert!(matches!(err, SceneError::Decode(_)));
    assert!(err.to_string().contains("glyph #1"));
}

#[test]
fn declared_count_must_match_data() {
    let mut s = spec(vec![vec![1, 1]], 2, 2);
    s.char_count = Some(2);
    assert!(matches!(decode_columnar(&s), Err(SceneError::Decode(_))));
}

#[test]
fn empty_glyph_size_is_rejected() {
    assert!(decode_columnar(&spec(vec![vec![]], 0, 8)).is_err());
    assert!(decode_columnar(&spec(vec![vec![]], 3, 0)).is_err());
}

#[test]
fn deserializes_camel_case_source() {
    let json = r#"{"data":[[3,3]],"charHeight":2,"charWidth":2,"name":"sq"}"#;
    let s: ColumnarFontSpec = serde_json::from_str(json).unwrap();
    assert_eq!(s.first_char, 32);
    let font = decode_columnar(&s).unwrap();
    assert_eq!(font.name(), "sq");
    assert!(font.has_char(32));
}
