use super::*;

fn fonts() -> FontLibrary {
    FontLibrary::new()
}

#[test]
fn rectangle_reshape_follows_drag_in_any_direction() {
    let mut k = LayerKind::Rectangle {
        pos: Point::default(),
        size: Size::new(1, 1),
        fill: false,
    };
    k.reshape(Point::new(10, 10), Point::new(4, 7));
    assert_eq!(
        k.bounds(&fonts()),
        Rect::new(Point::new(4, 7), Size::new(7, 4))
    );
    k.resize_to(Point::new(5, 20));
    assert_eq!(
        k.bounds(&fonts()),
        Rect::new(Point::new(4, 7), Size::new(2, 14))
    );
    k.resize_to(Point::new(0, 0));
    assert_eq!(k.bounds(&fonts()).size, Size::new(1, 1));
}

#[test]
fn circle_hit_test_uses_radius() {
    let k = LayerKind::Circle {
        center: Point::new(10, 10),
        radius: 3,
        fill: true,
    };
    assert!(k.contains(Point::new(10, 13), &fonts()));
    assert!(k.contains(Point::new(12, 12), &fonts()));
    assert!(!k.contains(Point::new(13, 13), &fonts()));
    assert_eq!(
        k.bounds(&fonts()),
        Rect::new(Point::new(7, 7), Size::new(7, 7))
    );
}

#[test]
fn line_hit_test_is_one_pixel_wide() {
    let k = LayerKind::Line {
        p1: Point::new(0, 0),
        p2: Point::new(10, 0),
    };
    assert!(k.contains(Point::new(5, 1), &fonts()));
    assert!(!k.contains(Point::new(5, 2), &fonts()));
    assert!(!k.contains(Point::new(12, 0), &fonts()));
}

#[test]
fn translate_moves_every_point() {
    let mut k = LayerKind::Line {
        p1: Point::new(0, 0),
        p2: Point::new(3, 4),
    };
    k.translate(Point::new(2, -1));
    assert_eq!(
        k,
        LayerKind::Line {
            p1: Point::new(2, -1),
            p2: Point::new(5, 3),
        }
    );
}

#[test]
fn draw_outline_and_filled_variants() {
    let mut buf = PixelBuffer::new(16, 16);
    let frame = LayerKind::Rectangle {
        pos: Point::new(1, 1),
        size: Size::new(4, 3),
        fill: false,
    };
    frame.draw(&mut buf, &fonts(), Rgba8::WHITE);
    assert_eq!(buf.count_set(), 10);

    buf.clear();
    let filled = LayerKind::Rectangle {
        pos: Point::new(1, 1),
        size: Size::new(4, 3),
        fill: true,
    };
    filled.draw(&mut buf, &fonts(), Rgba8::WHITE);
    assert_eq!(buf.count_set(), 12);
}

#[test]
fn text_without_fonts_draws_nothing() {
    let mut buf = PixelBuffer::new(8, 8);
    let k = LayerKind::Text {
        pos: Point::new(0, 7),
        text: "hi".to_string(),
        font: "none".to_string(),
        scale: 1,
    };
    k.draw(&mut buf, &fonts(), Rgba8::WHITE);
    assert_eq!(buf.count_set(), 0);
    assert!(k.bounds(&fonts()).size.is_empty());
}

fn tiny_font() -> FontLibrary {
    let mut lib = FontLibrary::new();
    let pack = crate::font::columnar::decode_columnar(&crate::font::columnar::ColumnarFontSpec {
        data: vec![vec![3, 3], vec![3, 3], vec![3, 3]],
        char_height: 2,
        char_width: 2,
        first_char: 'A' as u32,
        name: "tiny".to_string(),
        char_count: None,
    })
    .unwrap();
    lib.insert("tiny", pack);
    lib
}

fn text(s: &str) -> LayerKind {
    LayerKind::Text {
        pos: Point::new(0, 4),
        text: s.to_string(),
        font: "tiny".to_string(),
        scale: 1,
    }
}

#[test]
fn text_draws_only_its_own_characters() {
    let fonts = tiny_font();
    for (s, ink) in [("AB", 8), ("AzB", 8), ("", 0), ("zz", 0)] {
        let mut buf = PixelBuffer::new(16, 8);
        text(s).draw(&mut buf, &fonts, Rgba8::WHITE);
        assert_eq!(buf.count_set(), ink, "text {s:?}");
    }
    assert_eq!(
        text("AB").bounds(&fonts),
        Rect::new(Point::new(0, 2), Size::new(6, 2))
    );
    assert!(text("").bounds(&fonts).size.is_empty());
    assert!(text("zz").bounds(&fonts).size.is_empty());
}

#[test]
fn extent_check_bounds_every_coordinate() {
    let huge = LayerKind::Circle {
        center: Point::new(4, 4),
        radius: 1_500_000_000,
        fill: false,
    };
    assert!(huge.check_extent().is_err());
    let far = LayerKind::Line {
        p1: Point::new(0, 0),
        p2: Point::new(i32::MIN, 0),
    };
    assert!(far.check_extent().is_err());
    let scaled = LayerKind::Text {
        pos: Point::new(0, 0),
        text: "A".to_string(),
        font: String::new(),
        scale: u32::MAX,
    };
    assert!(scaled.check_extent().is_err());
    assert!(LayerKind::group().check_extent().is_ok());
    assert!(text("AB").check_extent().is_ok());
}

#[test]
fn dragging_clamps_radius() {
    let mut k = LayerKind::Circle {
        center: Point::default(),
        radius: 0,
        fill: true,
    };
    k.reshape(Point::new(0, 0), Point::new(i32::MAX, 3));
    assert!(k.check_extent().is_ok());
    let mut buf = PixelBuffer::new(4, 4);
    k.draw(&mut buf, &fonts(), Rgba8::WHITE);
    assert_eq!(buf.count_set(), 16);
}

#[test]
fn props_use_short_keys() {
    let k = LayerKind::Circle {
        center: Point::new(1, 2),
        radius: 5,
        fill: false,
    };
    let p = k.props();
    assert_eq!(p["c"], serde_json::json!({ "x": 1, "y": 2 }));
    assert_eq!(p["r"], serde_json::json!(5));
    assert_eq!(p["f"], serde_json::json!(false));
    assert_eq!(k.tag(), "circle");
    assert_eq!(LayerKind::group().props()["ex"], serde_json::json!(true));
}
