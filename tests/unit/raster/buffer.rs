use super::*;

#[test]
fn fill_rect_is_clipped_to_bounds() {
    let mut buf = PixelBuffer::new(4, 4);
    buf.fill_rect(-2, -2, 4, 4, Rgba8::WHITE);
    assert_eq!(buf.count_set(), 4);
    assert!(buf.is_set(0, 0));
    assert!(buf.is_set(1, 1));
    assert!(!buf.is_set(2, 2));

    buf.fill_rect(10, 10, 5, 5, Rgba8::WHITE);
    assert_eq!(buf.count_set(), 4);
}

#[test]
fn out_of_bounds_access_is_ignored() {
    let mut buf = PixelBuffer::new(2, 2);
    buf.set(-1, 0, Rgba8::WHITE);
    buf.set(2, 0, Rgba8::WHITE);
    assert_eq!(buf.count_set(), 0);
    assert_eq!(buf.get(5, 5), None);
}

#[test]
fn draw_buffer_requires_matching_size() {
    let mut dst = PixelBuffer::new(2, 2);
    let src = PixelBuffer::new(3, 2);
    assert!(dst.draw_buffer(&src, BlendOp::Over, 1.0).is_err());
}

#[test]
fn draw_buffer_xor_cancels_overlap() {
    let mut dst = PixelBuffer::new(3, 1);
    dst.fill_rect(0, 0, 2, 1, Rgba8::WHITE);
    let mut src = PixelBuffer::new(3, 1);
    src.fill_rect(1, 0, 2, 1, Rgba8::WHITE);
    dst.draw_buffer(&src, BlendOp::Xor, 1.0).unwrap();
    assert!(dst.is_set(0, 0));
    assert!(!dst.is_set(1, 0));
    assert!(dst.is_set(2, 0));
}

#[test]
fn ink_bounds_and_crop() {
    let mut buf = PixelBuffer::new(8, 8);
    assert_eq!(buf.ink_bounds(), None);
    buf.set(2, 3, Rgba8::WHITE);
    buf.set(5, 4, Rgba8::WHITE);
    let bounds = buf.ink_bounds().unwrap();
    assert_eq!(bounds, Rect::new(Point::new(2, 3), Size::new(4, 2)));

    let cropped = buf.crop(bounds);
    assert_eq!(cropped.size(), Size::new(4, 2));
    assert!(cropped.is_set(0, 0));
    assert!(cropped.is_set(3, 1));
    assert_eq!(cropped.count_set(), 2);
}

#[test]
fn scaled_replicates_pixels() {
    let mut buf = PixelBuffer::new(2, 1);
    buf.set(1, 0, Rgba8::WHITE);
    let big = buf.scaled(2, 3);
    assert_eq!(big.size(), Size::new(4, 3));
    assert_eq!(big.count_set(), 6);
    assert!(big.is_set(2, 2));
    assert!(!big.is_set(1, 0));
}
