use super::*;

#[test]
fn hex_parse_and_format() {
    let c = Rgba8::from_hex("#FF00BF").unwrap();
    assert_eq!(c, Rgba8::rgb(0xff, 0x00, 0xbf));
    assert_eq!(c.to_hex(), "#ff00bf");

    let c = Rgba8::from_hex("00b4a280").unwrap();
    assert_eq!(c.a, 0x80);
    assert_eq!(c.to_hex(), "#00b4a280");
}

#[test]
fn hex_rejects_garbage() {
    assert!(Rgba8::from_hex("#12345").is_err());
    assert!(Rgba8::from_hex("#gg0000").is_err());
    assert!(Rgba8::from_hex("").is_err());
}

#[test]
fn serde_uses_hex_strings() {
    let s = serde_json::to_string(&Rgba8::rgb(0xf5, 0xa6, 0x23)).unwrap();
    assert_eq!(s, "\"#f5a623\"");
    let back: Rgba8 = serde_json::from_str(&s).unwrap();
    assert_eq!(back, Rgba8::rgb(0xf5, 0xa6, 0x23));
    assert!(serde_json::from_str::<Rgba8>("\"blue\"").is_err());
}

#[test]
fn canvas_rejects_zero() {
    assert!(Canvas::new(0, 10).is_err());
    let c = Canvas::new(4, 3).unwrap();
    assert_eq!(c.rect().width(), 4.0);
}

#[test]
fn escape_markup_handles_specials() {
    assert_eq!(
        escape_markup(r#"<a href="x">Tom & 'Jerry'</a>"#),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
    );
}
