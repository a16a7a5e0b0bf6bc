use super::*;
use crate::foundation::core::Size;

fn canvas() -> PixelBuffer {
    PixelBuffer::new(16, 16)
}

#[test]
fn line_endpoints_are_inclusive() {
    let mut buf = canvas();
    draw_line(&mut buf, Point::new(1, 1), Point::new(4, 1), Rgba8::WHITE);
    assert_eq!(buf.count_set(), 4);

    let mut buf = canvas();
    draw_line(&mut buf, Point::new(3, 3), Point::new(0, 0), Rgba8::WHITE);
    assert_eq!(buf.count_set(), 4);
    for i in 0..4 {
        assert!(buf.is_set(i, i));
    }
}

#[test]
fn frame_and_box_pixel_counts() {
    let rect = Rect::new(Point::new(2, 2), Size::new(4, 3));
    let mut frame = canvas();
    draw_frame(&mut frame, rect, Rgba8::WHITE);
    assert_eq!(frame.count_set(), 10);
    assert!(!frame.is_set(3, 3));

    let mut solid = canvas();
    draw_box(&mut solid, rect, Rgba8::WHITE);
    assert_eq!(solid.count_set(), 12);
}

#[test]
fn circle_radius_two_is_symmetric_ring() {
    let mut buf = canvas();
    let c = Point::new(8, 8);
    draw_circle(&mut buf, c, 2, Rgba8::WHITE);
    assert_eq!(buf.count_set(), 12);
    assert!(!buf.is_set(8, 8));
    for (dx, dy) in [(0, 2), (2, 0), (1, 2), (2, 1)] {
        assert!(buf.is_set(8 + dx, 8 + dy));
        assert!(buf.is_set(8 - dx, 8 - dy));
        assert!(buf.is_set(8 + dy, 8 - dx));
    }
}

#[test]
fn disc_radius_two_fills_interior() {
    let mut buf = canvas();
    draw_disc(&mut buf, Point::new(8, 8), 2, Rgba8::WHITE);
    assert_eq!(buf.count_set(), 21);
    assert!(buf.is_set(8, 8));
}

#[test]
fn zero_radius_circle_is_single_pixel() {
    let mut buf = canvas();
    draw_circle(&mut buf, Point::new(3, 3), 0, Rgba8::WHITE);
    assert_eq!(buf.count_set(), 1);
}

#[test]
fn unit_ellipse_is_a_diamond() {
    let mut buf = canvas();
    draw_ellipse(&mut buf, Point::new(5, 5), 1, 1, Rgba8::WHITE);
    assert_eq!(buf.count_set(), 4);
    assert!(buf.is_set(5, 4));
    assert!(buf.is_set(6, 5));
    assert!(!buf.is_set(5, 5));
}

#[test]
fn filled_ellipse_covers_outline() {
    let mut outline = canvas();
    draw_ellipse(&mut outline, Point::new(8, 8), 5, 3, Rgba8::WHITE);
    let mut filled = canvas();
    draw_filled_ellipse(&mut filled, Point::new(8, 8), 5, 3, Rgba8::WHITE);
    for y in 0..16 {
        for x in 0..16 {
            if outline.is_set(x, y) {
                assert!(filled.is_set(x, y), "({x},{y}) missing from fill");
            }
        }
    }
    assert!(filled.count_set() > outline.count_set());
}

#[test]
fn flat_ellipse_degenerates_to_line() {
    let mut buf = canvas();
    draw_ellipse(&mut buf, Point::new(8, 8), 3, 0, Rgba8::WHITE);
    assert_eq!(buf.count_set(), 7);
}

#[test]
fn mask_bits_are_msb_first() {
    let mut buf = canvas();
    // 10 px wide: two bytes per row.
    draw_mask(&mut buf, Point::new(1, 1), 10, 1, &[0b1000_0001, 0b0100_0000], Rgba8::WHITE);
    assert!(buf.is_set(1, 1));
    assert!(buf.is_set(8, 1));
    assert!(buf.is_set(10, 1));
    assert_eq!(buf.count_set(), 3);
}

#[test]
fn extreme_lines_are_clipped_to_the_buffer() {
    let mut buf = canvas();
    draw_line(
        &mut buf,
        Point::new(i32::MIN, 3),
        Point::new(i32::MAX, 3),
        Rgba8::WHITE,
    );
    assert_eq!(buf.count_set(), 16);
    assert!(buf.is_set(0, 3));
    assert!(buf.is_set(15, 3));

    let mut buf = canvas();
    draw_line(
        &mut buf,
        Point::new(-2_000_000_000, -5),
        Point::new(2_000_000_000, -5),
        Rgba8::WHITE,
    );
    assert_eq!(buf.count_set(), 0);
}

#[test]
fn extreme_circles_do_not_overflow() {
    let mut buf = canvas();
    draw_disc(&mut buf, Point::new(i32::MAX - 10, 0), 1000, Rgba8::WHITE);
    draw_circle(&mut buf, Point::new(i32::MIN, i32::MIN), 1000, Rgba8::WHITE);
    draw_filled_ellipse(&mut buf, Point::new(i32::MAX, i32::MAX), 5, 5, Rgba8::WHITE);
    assert_eq!(buf.count_set(), 0);

    // The ring lies far outside; only the walk near the buffer runs.
    draw_circle(&mut buf, Point::new(4, 4), u32::MAX, Rgba8::WHITE);
    assert_eq!(buf.count_set(), 0);

    draw_disc(&mut buf, Point::new(4, 4), u32::MAX, Rgba8::WHITE);
    assert_eq!(buf.count_set(), 256);
}

#[test]
fn degenerate_ellipse_at_the_edge_of_i32() {
    let mut buf = canvas();
    draw_ellipse(&mut buf, Point::new(i32::MAX, 2), u32::MAX, 0, Rgba8::WHITE);
    assert_eq!(buf.count_set(), 16);
    assert!(buf.is_set(0, 2));
}

#[test]
fn mask_near_i32_max_is_clipped() {
    let mut buf = canvas();
    draw_mask(&mut buf, Point::new(i32::MAX, i32::MAX), 16, 1, &[0xff, 0xff], Rgba8::WHITE);
    assert_eq!(buf.count_set(), 0);
}
