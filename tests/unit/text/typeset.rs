use super::*;

#[test]
fn monospace_measures_by_character_count() {
    let mut m = MonospaceTypesetter::default();
    assert_eq!(m.advance("abcd", 10.0).unwrap(), 24.0);
    assert_eq!(m.advance("", 10.0).unwrap(), 0.0);
    assert_eq!(m.advance("héé", 10.0).unwrap(), 18.0);
    assert_eq!(m.line_height(10.0).unwrap(), 12.0);
}

#[test]
fn monospace_paints_cells_for_visible_characters_only() {
    let mut m = MonospaceTypesetter::default();
    let runs = [TextRun {
        text: "a b".to_string(),
        x: 0.0,
        y: 0.0,
        size_px: 10.0,
        color: Rgba8::opaque(0, 0, 0),
    }];
    let layer = m.rasterize(20, 12, &runs).unwrap();
    assert_eq!(layer.len(), 20 * 12 * 4);

    let alpha_at = |x: usize, y: usize| layer[(y * 20 + x) * 4 + 3];
    assert_eq!(alpha_at(3, 6), 255);
    assert_eq!(alpha_at(9, 6), 0);
    assert_eq!(alpha_at(15, 6), 255);
}

#[test]
fn empty_font_bytes_are_rejected() {
    assert!(matches!(
        FontAsset::from_bytes(Vec::new()),
        Err(LettererError::Render(_))
    ));
}

#[test]
fn garbage_font_bytes_cannot_build_a_typesetter() {
    let asset = FontAsset::from_bytes(vec![0u8; 64]).unwrap();
    assert!(asset.typesetter().is_err());
}

#[test]
fn missing_font_file_is_reported() {
    let err = FontAsset::from_path(Path::new("/definitely/not/here.ttf")).unwrap_err();
    assert!(err.to_string().contains("here.ttf"));
}

#[test]
fn system_font_measures_and_paints() {
    let Some(asset) = FontAsset::from_system() else {
        eprintln!("skipping: no system font available");
        return;
    };
    let mut ts = asset.typesetter().unwrap();
    assert!(!ts.family_name().is_empty());

    let short = ts.advance("Hi", 20.0).unwrap();
    let long = ts.advance("Hi there friend", 20.0).unwrap();
    assert!(short > 0.0 && long > short);
    assert!(ts.advance("Hi", 40.0).unwrap() > short);
    assert!(ts.line_height(20.0).unwrap() >= 20.0);

    let runs = [TextRun {
        text: "HELLO".to_string(),
        x: 2.0,
        y: 2.0,
        size_px: 20.0,
        color: Rgba8::opaque(0, 0, 0),
    }];
    let layer = ts.rasterize(120, 40, &runs).unwrap();
    assert_eq!(layer.len(), 120 * 40 * 4);
    assert!(layer.chunks_exact(4).any(|px| px[3] > 0));
}

#[test]
fn system_font_rejects_invalid_size() {
    let Some(asset) = FontAsset::from_system() else {
        return;
    };
    let mut ts = asset.typesetter().unwrap();
    assert!(ts.advance("x", 0.0).is_err());
    assert!(ts.advance("x", f32::NAN).is_err());
}
