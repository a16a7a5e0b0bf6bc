use super::*;

fn rect_layer() -> Layer {
    Layer::new(
        LayerId(1),
        LayerKind::Rectangle {
            pos: Point::new(2, 2),
            size: Size::new(3, 3),
            fill: true,
        },
    )
}

#[test]
fn edit_is_noop_while_idle() {
    let mut l = rect_layer();
    assert_eq!(l.mode(), EditMode::None);
    let before = l.kind.clone();
    assert_eq!(l.edit(Point::new(9, 9)), EditOutcome::Idle);
    assert_eq!(l.kind, before);
}

#[test]
fn creating_grows_from_anchor() {
    let mut l = rect_layer();
    l.start_edit(EditMode::Creating, Point::new(5, 5));
    assert_eq!(l.edit(Point::new(7, 8)), EditOutcome::Reshaped);
    l.stop_edit();
    assert_eq!(l.mode(), EditMode::None);
    let fonts = FontLibrary::new();
    assert_eq!(
        l.bounds(&fonts),
        Rect::new(Point::new(5, 5), Size::new(3, 4))
    );
}

#[test]
fn moving_reports_incremental_deltas() {
    let mut l = rect_layer();
    l.start_edit(EditMode::Moving, Point::new(0, 0));
    assert_eq!(l.edit(Point::new(1, 2)), EditOutcome::Moved(Point::new(1, 2)));
    assert_eq!(l.edit(Point::new(3, 2)), EditOutcome::Moved(Point::new(2, 0)));
    let fonts = FontLibrary::new();
    assert_eq!(l.bounds(&fonts).pos, Point::new(5, 4));
}

#[test]
fn locked_layers_ignore_move_and_resize() {
    let mut l = rect_layer();
    l.locked = true;
    l.start_edit(EditMode::Moving, Point::new(0, 0));
    assert_eq!(l.edit(Point::new(4, 4)), EditOutcome::Idle);
    l.start_edit(EditMode::Resizing, Point::new(0, 0));
    assert_eq!(l.edit(Point::new(9, 9)), EditOutcome::Idle);
    assert_eq!(
        l.kind,
        LayerKind::Rectangle {
            pos: Point::new(2, 2),
            size: Size::new(3, 3),
            fill: true,
        }
    );
}

#[test]
fn resize_and_draw_fill_the_owned_buffer() {
    let mut l = rect_layer();
    l.resize(Size::new(8, 8), Vec2::new(4.0, 4.0));
    assert_eq!(l.buffer().size(), Size::new(8, 8));
    let fonts = FontLibrary::new();
    l.draw(&DrawContext { fonts: &fonts });
    assert_eq!(l.buffer().count_set(), 9);
    // Drawing is a pure function of state.
    l.draw(&DrawContext { fonts: &fonts });
    assert_eq!(l.buffer().count_set(), 9);
}

#[test]
fn view_points_are_scaled_down() {
    let mut l = rect_layer();
    l.resize(Size::new(8, 8), Vec2::new(4.0, 4.0));
    let fonts = FontLibrary::new();
    assert!(l.contains_view(kurbo::Point::new(9.0, 9.0), &fonts));
    assert!(!l.contains_view(kurbo::Point::new(7.9, 9.0), &fonts));
    assert_eq!(
        view_to_display(kurbo::Point::new(7.9, 0.0), Vec2::new(0.0, 1.0)),
        Point::new(7, 0)
    );
}

#[test]
fn group_children_are_exposed() {
    let g = Layer::new(
        LayerId(3),
        LayerKind::Group {
            children: vec![LayerId(1), LayerId(2)],
            expanded: false,
        },
    );
    assert!(g.is_group());
    assert!(!g.is_expanded_group());
    assert_eq!(g.children(), &[LayerId(1), LayerId(2)]);
    assert!(rect_layer().children().is_empty());
}
