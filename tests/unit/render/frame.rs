use super::*;

fn frame_with(px: [u8; 4]) -> Frame {
    let mut data = vec![0u8; 2 * 2 * 4];
    data[..4].copy_from_slice(&px);
    Frame {
        width: 2,
        height: 2,
        data,
    }
}

#[test]
fn fingerprint_is_stable_and_content_sensitive() {
    let a = frame_with([255, 255, 255, 255]);
    assert_eq!(a.fingerprint(), a.clone().fingerprint());
    assert_ne!(a.fingerprint(), frame_with([0, 0, 0, 0]).fingerprint());
}

#[test]
fn fingerprint_covers_dimensions() {
    let a = Frame {
        width: 4,
        height: 1,
        data: vec![0; 16],
    };
    let b = Frame {
        width: 1,
        height: 4,
        data: vec![0; 16],
    };
    assert_ne!(a.fingerprint(), b.fingerprint());
}

#[test]
fn png_bytes_carry_signature() {
    let png = frame_with([255, 255, 255, 255]).to_png().unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    let back = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (2, 2));
    assert_eq!(back.get_pixel(0, 0).0, [255, 255, 255, 255]);
}

#[test]
fn scaled_repeats_pixels() {
    let f = frame_with([255, 0, 0, 255]).scaled(2, 3);
    assert_eq!(f.size(), Size::new(4, 6));
    assert_eq!(f.pixel(1, 2), Some([255, 0, 0, 255]));
    assert_eq!(f.pixel(2, 0), Some([0, 0, 0, 0]));
    assert_eq!(f.count_opaque(), 6);
}

#[test]
fn background_makes_every_pixel_opaque() {
    let f = frame_with([255, 255, 255, 255]).on_background([0, 0, 0]);
    assert_eq!(f.count_opaque(), 4);
    assert_eq!(f.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(f.pixel(1, 1), Some([0, 0, 0, 255]));
}

#[test]
fn straight_alpha_undoes_premultiplication() {
    let f = frame_with([51, 51, 51, 77]);
    let data = f.straight_rgba();
    assert_eq!(&data[..4], &[169, 169, 169, 77]);
}
