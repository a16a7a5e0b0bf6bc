use super::*;
use crate::font::library::FontLibrary;
use crate::foundation::core::Point;
use crate::scene::kind::LayerKind;
use crate::scene::layer::DrawContext;

const DISPLAY: Size = Size::new(16, 8);

fn filled(x: i32, w: u32) -> LayerKind {
    LayerKind::Rectangle {
        pos: Point::new(x, 0),
        size: Size::new(w, 4),
        fill: true,
    }
}

fn add(tree: &mut SceneTree, kind: LayerKind, index: u32, parent: Option<LayerId>) -> LayerId {
    let mut layer = Layer::new(tree.alloc_id(), kind);
    layer.index = Some(index);
    tree.insert_front(layer, parent).unwrap()
}

fn paint(tree: &mut SceneTree) {
    let fonts = FontLibrary::new();
    tree.resize_all(DISPLAY, crate::foundation::core::Vec2::new(1.0, 1.0));
    tree.draw_all(&DrawContext { fonts: &fonts }).unwrap();
}

#[test]
fn hidden_group_hides_every_descendant() {
    let mut tree = SceneTree::new();
    let outer = add(&mut tree, LayerKind::group(), 1, None);
    let inner = add(&mut tree, LayerKind::group(), 2, Some(outer));
    let leaf = add(&mut tree, filled(0, 2), 3, Some(inner));
    let top = add(&mut tree, filled(4, 2), 4, None);
    assert_eq!(flatten_visible(&tree), vec![top, leaf]);

    tree.get_mut(outer).unwrap().visible = false;
    assert_eq!(flatten_visible(&tree), vec![top]);
    tree.get_mut(outer).unwrap().visible = true;
    tree.get_mut(inner).unwrap().visible = false;
    assert_eq!(flatten_visible(&tree), vec![top]);
}

#[test]
fn output_is_two_tone() {
    let mut tree = SceneTree::new();
    add(&mut tree, filled(0, 4), 1, None);
    paint(&mut tree);
    let c = Compositor::new(Rgba8::from_hex("#33FF66").unwrap(), 0.3);
    let frame = c.render(&tree, DISPLAY).unwrap();
    assert_eq!(frame.size(), DISPLAY);
    assert_eq!(frame.count_opaque(), 16);
    for px in frame.data.chunks_exact(4) {
        assert!(px == [0x33, 0xFF, 0x66, 255] || px == [0, 0, 0, 0]);
    }
}

#[test]
fn overlapping_inverted_layers_cancel() {
    let mut tree = SceneTree::new();
    let a = add(&mut tree, filled(0, 4), 1, None);
    let b = add(&mut tree, filled(2, 4), 2, None);
    tree.get_mut(a).unwrap().inverted = true;
    tree.get_mut(b).unwrap().inverted = true;
    paint(&mut tree);
    let frame = Compositor::default().render(&tree, DISPLAY).unwrap();
    // Columns 2..4 are covered twice and drop out.
    assert_eq!(frame.count_opaque(), 16);
    assert_eq!(frame.pixel(2, 0), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(5, 0), Some([255, 255, 255, 255]));
}

#[test]
fn paint_index_orders_inverted_punch_outs() {
    let mut tree = SceneTree::new();
    // Inserted first but painted last because of its higher index.
    let hole = add(&mut tree, filled(0, 2), 5, None);
    add(&mut tree, filled(0, 4), 1, None);
    tree.get_mut(hole).unwrap().inverted = true;
    paint(&mut tree);
    let frame = Compositor::default().render(&tree, DISPLAY).unwrap();
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(3, 0), Some([255, 255, 255, 255]));
    assert_eq!(frame.count_opaque(), 8);
}

#[test]
fn overlays_stay_translucent_and_out_of_quantization() {
    let mut tree = SceneTree::new();
    let overlay = add(&mut tree, filled(8, 4), 1, None);
    tree.get_mut(overlay).unwrap().modifiers.overlay = true;
    add(&mut tree, filled(0, 4), 2, None);
    paint(&mut tree);
    let c = Compositor::default();

    let quantized = c.render_quantized(&tree, DISPLAY).unwrap();
    assert_eq!(quantized.count_set(), 16);
    assert!(!quantized.is_set(9, 0));

    let frame = c.render(&tree, DISPLAY).unwrap();
    assert_eq!(frame.count_opaque(), 16);
    let px = frame.pixel(9, 0).unwrap();
    assert!(px[3] > 0 && px[3] < 128);
}

#[test]
fn repeated_renders_are_byte_identical() {
    let mut tree = SceneTree::new();
    add(&mut tree, filled(0, 3), 1, None);
    let b = add(&mut tree, filled(1, 5), 2, None);
    tree.get_mut(b).unwrap().inverted = true;
    paint(&mut tree);
    let c = Compositor::default();
    let first = c.render(&tree, DISPLAY).unwrap();
    let second = c.render(&tree, DISPLAY).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn undrawn_layers_are_skipped() {
    let mut tree = SceneTree::new();
    add(&mut tree, filled(0, 3), 1, None);
    let frame = Compositor::default().render(&tree, DISPLAY).unwrap();
    assert_eq!(frame.count_opaque(), 0);
}
