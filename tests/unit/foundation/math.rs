use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn opacity_is_clamped_and_rounded() {
    assert_eq!(opacity_u16(-1.0), 0);
    assert_eq!(opacity_u16(0.3), 77);
    assert_eq!(opacity_u16(1.0), 255);
    assert_eq!(opacity_u16(7.0), 255);
}

#[test]
fn div_ceil8_counts_partial_bytes() {
    assert_eq!(div_ceil8(1), 1);
    assert_eq!(div_ceil8(8), 1);
    assert_eq!(div_ceil8(9), 2);
    assert_eq!(div_ceil8(16), 2);
}
