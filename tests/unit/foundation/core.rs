use super::*;

#[test]
fn rect_contains_is_half_open() {
    let r = Rect::new(Point::new(2, 3), Size::new(4, 2));
    assert!(r.contains(Point::new(2, 3)));
    assert!(r.contains(Point::new(5, 4)));
    assert!(!r.contains(Point::new(6, 4)));
    assert!(!r.contains(Point::new(5, 5)));
    assert!(!r.contains(Point::new(1, 3)));
}

#[test]
fn rect_from_corners_is_inclusive_and_order_free() {
    let a = Rect::from_corners(Point::new(5, 1), Point::new(2, 4));
    assert_eq!(a, Rect::new(Point::new(2, 1), Size::new(4, 4)));
    let single = Rect::from_corners(Point::new(7, 7), Point::new(7, 7));
    assert_eq!(single.size, Size::new(1, 1));
}

#[test]
fn rect_union_ignores_empty() {
    let a = Rect::new(Point::new(0, 0), Size::new(2, 2));
    let b = Rect::new(Point::new(5, 5), Size::new(1, 3));
    assert_eq!(a.union(b), Rect::new(Point::new(0, 0), Size::new(6, 8)));
    assert_eq!(Rect::default().union(b), b);
    assert_eq!(a.union(Rect::default()), a);
}

#[test]
fn hex_colors_parse_and_format() {
    let c = Rgba8::from_hex("#3fA0ff").unwrap();
    assert_eq!(c, Rgba8::new(0x3f, 0xa0, 0xff, 255));
    assert_eq!(c.to_hex(), "#3fa0ff");
    assert_eq!(Rgba8::from_hex("ffffff").unwrap(), Rgba8::WHITE);
    assert!(Rgba8::from_hex("#fff").is_err());
    assert!(Rgba8::from_hex("#gg0000").is_err());
}

#[test]
fn premul_keeps_opaque_channels() {
    assert_eq!(Rgba8::WHITE.to_premul(), [255, 255, 255, 255]);
    assert_eq!(Rgba8::new(200, 100, 50, 0).to_premul(), [0, 0, 0, 0]);
}
