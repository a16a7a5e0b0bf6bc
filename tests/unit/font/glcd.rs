use super::*;

#[test]
fn decodes_five_byte_records() {
    // '!' in the stock font: a single column with rows 0..=4 and row 6.
    let mut bytes = vec![0u8; 10];
    bytes[5 + 2] = 0b0101_1111;
    let font = decode_glcd(&bytes, &GlcdOptions::default()).unwrap();

    assert_eq!(font.len(), 2);
    let g = font.glyph(1).unwrap();
    assert_eq!(g.bounds.width, 5);
    assert_eq!(g.bounds.height, 7);
    assert_eq!(g.x_advance, 6);
    assert_eq!(g.ink_count(), 6);
    assert!(g.pixel(2, 0));
    assert!(!g.pixel(2, 5));
    assert!(g.pixel(2, 6));
}

#[test]
fn rejects_truncated_binary() {
    let err = decode_glcd(&[0u8; 7], &GlcdOptions::default()).unwrap_err();
    assert!(matches!(err, SceneError::Decode(_)));
}

#[test]
fn rejects_tall_glyphs() {
    let opts = GlcdOptions {
        char_height: 9,
        ..GlcdOptions::default()
    };
    assert!(decode_glcd(&[0u8; 5], &opts).is_err());
}
