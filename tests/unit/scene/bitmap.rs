use super::*;
use crate::foundation::core::Size;

#[test]
fn set_get_and_count() {
    let mut b = Bitmap::new(10, 2);
    assert_eq!(b.bits().len(), 4);
    b.set(0, 0, true);
    b.set(9, 1, true);
    b.set(10, 0, true);
    assert!(b.get(0, 0));
    assert!(b.get(9, 1));
    assert!(!b.get(10, 0));
    assert_eq!(b.count_set(), 2);
    b.set(0, 0, false);
    assert_eq!(b.count_set(), 1);
}

#[test]
fn from_bits_checks_length() {
    assert!(Bitmap::from_bits(9, 2, vec![0; 4]).is_ok());
    assert!(matches!(
        Bitmap::from_bits(9, 2, vec![0; 3]),
        Err(SceneError::Decode(_))
    ));
}

#[test]
fn from_image_thresholds_luminance_and_alpha() {
    let mut img = image::RgbaImage::new(3, 1);
    img.put_pixel(0, 0, image::Rgba([255, 255, 255, 255]));
    img.put_pixel(1, 0, image::Rgba([255, 255, 255, 60]));
    img.put_pixel(2, 0, image::Rgba([20, 20, 20, 255]));
    let b = Bitmap::from_image(&img);
    assert!(b.get(0, 0));
    assert!(!b.get(1, 0));
    assert!(!b.get(2, 0));
}

#[test]
fn from_buffer_captures_region() {
    let mut buf = PixelBuffer::new(8, 8);
    buf.fill_rect(2, 2, 3, 2, Rgba8::WHITE);
    let b = Bitmap::from_buffer(&buf, Rect::new(Point::new(2, 2), Size::new(4, 2)));
    assert_eq!(b.count_set(), 6);
    assert!(b.get(2, 1));
    assert!(!b.get(3, 0));
}

#[test]
fn draw_round_trips_through_buffer() {
    let mut b = Bitmap::new(3, 3);
    b.set(1, 1, true);
    b.set(2, 2, true);
    let mut buf = PixelBuffer::new(6, 6);
    b.draw(&mut buf, Point::new(2, 1), Rgba8::WHITE);
    assert_eq!(buf.count_set(), 2);
    assert!(buf.is_set(3, 2));
    assert!(buf.is_set(4, 3));
}

#[test]
fn serializes_as_base64() {
    let mut b = Bitmap::new(8, 1);
    b.set(0, 0, true);
    let v = serde_json::to_value(&b).unwrap();
    assert_eq!(v, serde_json::json!({ "w": 8, "h": 1, "d": "gA==" }));
    let back: Bitmap = serde_json::from_value(v).unwrap();
    assert_eq!(back, b);

    let bad = serde_json::json!({ "w": 8, "h": 2, "d": "gA==" });
    assert!(serde_json::from_value::<Bitmap>(bad).is_err());
}
