use super::*;

#[test]
fn flatten_premul_half_alpha_over_white() {
    let src = [64, 0, 0, 128];
    let mut dst = [0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, Rgba8::WHITE).unwrap();
    assert_eq!(dst, [191, 127, 127, 255]);
}

#[test]
fn flatten_straight_alpha_over_black() {
    let src = [200, 100, 50, 0];
    let mut dst = [9u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, false, Rgba8::BLACK).unwrap();
    assert_eq!(dst, [0, 0, 0, 255]);
}

#[test]
fn flatten_keeps_opaque_pixels() {
    let src = [1, 2, 3, 255, 4, 5, 6, 255];
    let mut dst = [0u8; 8];
    flatten_to_opaque_rgba8(&mut dst, &src, true, Rgba8::WHITE).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_rejects_mismatched_lengths() {
    let mut dst = [0u8; 4];
    let err = flatten_to_opaque_rgba8(&mut dst, &[0u8; 8], true, Rgba8::WHITE).unwrap_err();
    assert!(matches!(err, VizError::Encode(_)));
}

#[test]
fn flatten_frame_checks_buffer_size() {
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 12],
        premultiplied: true,
    };
    assert!(flatten_frame(&frame, Rgba8::WHITE).is_err());
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let root = crate::test_support::temp_dir("encode_parent");
    let path = root.join("a/b/out.png");
    ensure_parent_dir(&path).unwrap();
    assert!(root.join("a/b").is_dir());
    ensure_parent_dir(Path::new("bare.png")).unwrap();
    std::fs::remove_dir_all(&root).ok();
}
