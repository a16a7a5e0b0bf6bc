use super::*;

const INK: PremulRgba8 = [255, 255, 255, 255];
const EMPTY: PremulRgba8 = [0, 0, 0, 0];

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    assert_eq!(over(dst, INK, 0.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn xor_of_two_inks_cancels() {
    assert_eq!(xor(INK, INK, 1.0), EMPTY);
}

#[test]
fn xor_onto_empty_or_with_empty_keeps_ink() {
    assert_eq!(xor(EMPTY, INK, 1.0), INK);
    assert_eq!(xor(INK, EMPTY, 1.0), INK);
}

#[test]
fn blend_in_place_rejects_mismatched_lengths() {
    let mut dst = vec![0u8; 8];
    assert!(blend_in_place(&mut dst, &[0u8; 4], BlendOp::Over, 1.0).is_err());
}

#[test]
fn quantize_thresholds_at_half_alpha() {
    let fg = Rgba8::new(10, 200, 30, 255);
    let mut data = vec![
        255, 255, 255, 127, //
        128, 128, 128, 128, //
        0, 0, 0, 0, //
        1, 1, 1, 255,
    ];
    quantize_in_place(&mut data, fg).unwrap();
    assert_eq!(&data[0..4], &[0, 0, 0, 0]);
    assert_eq!(&data[4..8], &[10, 200, 30, 255]);
    assert_eq!(&data[8..12], &[0, 0, 0, 0]);
    assert_eq!(&data[12..16], &[10, 200, 30, 255]);
}

#[test]
fn quantize_is_idempotent() {
    let fg = Rgba8::WHITE;
    let mut data = vec![0, 0, 0, 200, 0, 0, 0, 20];
    quantize_in_place(&mut data, fg).unwrap();
    let once = data.clone();
    quantize_in_place(&mut data, fg).unwrap();
    assert_eq!(data, once);
}
