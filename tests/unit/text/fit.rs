use super::*;

use crate::{model::request::Anchor, text::typeset::MonospaceTypesetter};

fn long_text(chars: usize) -> String {
    let words = ["lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing"];
    let mut out = String::new();
    let mut i = 0;
    while out.len() < chars {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(words[i % words.len()]);
        i += 1;
    }
    out.truncate(chars);
    out
}

fn cfg(min: u32, max: u32) -> FitConfig {
    FitConfig {
        min_font: min,
        max_font: max,
        ..FitConfig::default()
    }
}

fn assert_within<M: TextMeasure>(m: &mut M, fit: &FitResult, w: f32, h: f32) {
    for line in &fit.lines {
        let adv = m.advance(line, fit.font_size as f32).unwrap();
        assert!(adv <= w, "line {line:?} is {adv}px wide");
    }
    assert!(fit.block_height() <= h, "block is {}px tall", fit.block_height());
}

#[test]
fn long_text_in_small_box_truncates_within_bounds() {
    let mut m = MonospaceTypesetter::default();
    let text = long_text(500);
    let fit = fit_text(&mut m, &text, 200, 80, ElementKind::Speech, &cfg(10, 40)).unwrap();

    assert!(fit.truncated);
    assert_eq!(fit.font_size, 10);
    assert!(!fit.lines.is_empty());
    assert!(fit.lines.last().unwrap().ends_with("..."));
    assert_within(&mut m, &fit, 200.0, 80.0);
}

#[test]
fn short_text_takes_the_largest_fitting_size() {
    let mut m = MonospaceTypesetter::default();
    let fit = fit_text(&mut m, "Hi!", 200, 80, ElementKind::Speech, &cfg(10, 40)).unwrap();
    assert!(!fit.truncated);
    assert_eq!(fit.lines, vec!["Hi!".to_string()]);
    // 3 chars * 0.6 * 40 = 72px wide, 40 * 1.2 * 1.2 = 57.6px tall.
    assert_eq!(fit.font_size, 40);
    assert_within(&mut m, &fit, 200.0, 80.0);
}

#[test]
fn chosen_size_is_maximal() {
    let mut m = MonospaceTypesetter::default();
    let text = "the quick brown fox jumps over the lazy dog";
    let c = cfg(8, 60);
    let fit = fit_text(&mut m, text, 180, 120, ElementKind::Speech, &c).unwrap();
    assert!(!fit.truncated);
    assert_within(&mut m, &fit, 180.0, 120.0);

    let bigger = FitConfig {
        min_font: fit.font_size + 1,
        max_font: fit.font_size + 1,
        ..c
    };
    let next = fit_text(&mut m, text, 180, 120, ElementKind::Speech, &bigger).unwrap();
    assert!(next.truncated);
}

#[test]
fn fitting_is_idempotent() {
    let mut m = MonospaceTypesetter::default();
    let text = long_text(140);
    let a = fit_text(&mut m, &text, 160, 90, ElementKind::Thought, &FitConfig::default()).unwrap();
    let b = fit_text(&mut m, &text, 160, 90, ElementKind::Thought, &FitConfig::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn alignment_depends_on_kind() {
    let mut m = MonospaceTypesetter::default();
    let speech = fit_text(&mut m, "hey", 100, 50, ElementKind::Speech, &cfg(10, 20)).unwrap();
    assert_eq!((speech.halign, speech.valign), (HAlign::Center, VAlign::Center));
    let narration = fit_text(&mut m, "hey", 100, 50, ElementKind::Narration, &cfg(10, 20)).unwrap();
    assert_eq!((narration.halign, narration.valign), (HAlign::Left, VAlign::Top));
}

#[test]
fn empty_text_yields_no_lines() {
    let mut m = MonospaceTypesetter::default();
    let fit = fit_text(&mut m, "   ", 100, 50, ElementKind::Speech, &cfg(10, 20)).unwrap();
    assert!(fit.lines.is_empty());
    assert!(!fit.truncated);
    assert_eq!(fit.font_size, 20);
}

#[test]
fn overlong_words_are_broken_between_characters() {
    let mut m = MonospaceTypesetter::default();
    // 6px per char at size 10: 5 chars per 30px line.
    let lines = wrap_words(&mut m, &["abcdefghijkl", "xy"], 30.0, 10.0).unwrap();
    assert_eq!(lines, vec!["abcde", "fghij", "kl xy"]);
}

#[test]
fn greedy_wrap_packs_words() {
    let mut m = MonospaceTypesetter::default();
    let lines = wrap_words(&mut m, &["aa", "bb", "cc", "dd"], 48.0, 10.0).unwrap();
    assert_eq!(lines, vec!["aa bb cc", "dd"]);
}

#[test]
fn box_too_short_for_one_line_yields_nothing() {
    let mut m = MonospaceTypesetter::default();
    let fit = fit_text(&mut m, "hello world", 200, 5, ElementKind::Speech, &cfg(10, 20)).unwrap();
    assert!(fit.truncated);
    assert!(fit.lines.is_empty());
    assert!(fit.block_height() <= 5.0);
}

#[test]
fn narrow_box_ellipsizes_a_single_line() {
    let mut m = MonospaceTypesetter::default();
    let fit = fit_text(&mut m, "abcdefghij", 36, 15, ElementKind::Speech, &cfg(10, 10)).unwrap();
    assert!(fit.truncated);
    assert_eq!(fit.lines, vec!["abc...".to_string()]);
}

#[test]
fn char_hint_cuts_at_word_boundary() {
    assert_eq!(
        clip_to_char_hint("hello there world", 13, "..."),
        ("hello there...".to_string(), true)
    );
    assert_eq!(
        clip_to_char_hint("short", 10, "..."),
        ("short".to_string(), false)
    );
    assert_eq!(
        clip_to_char_hint("unbroken", 4, "..."),
        ("unbr...".to_string(), true)
    );
}

#[test]
fn element_hint_marks_result_truncated() {
    let mut m = MonospaceTypesetter::default();
    let req = ElementRequest::new(ElementKind::Speech, Anchor::Center, "one two three four")
        .with_max_chars(8);
    let fit = fit_element(&mut m, &req, 300, 100, &FitConfig::default()).unwrap();
    assert!(fit.truncated);
    assert_eq!(fit.lines, vec!["one two...".to_string()]);
}

#[test]
fn speaker_label_reserves_height() {
    let mut m = MonospaceTypesetter::default();
    let c = cfg(8, 40);
    let plain = ElementRequest::new(ElementKind::Speech, Anchor::Center, "hello there");
    let labelled = plain.clone().with_speaker("ada");

    let a = fit_element(&mut m, &plain, 240, 60, &c).unwrap();
    let b = fit_element(&mut m, &labelled, 240, 60, &c).unwrap();

    let label = b.label.as_ref().expect("label");
    assert_eq!(label.text, "ADA");
    assert_eq!(a.font_size, 36);
    assert_eq!(b.font_size, 23);
    assert_eq!(label.font_size, 17);
    assert_within(&mut m, &b, 240.0, 60.0);
}

#[test]
fn oversized_speaker_label_is_dropped_instead_of_truncating() {
    let mut m = MonospaceTypesetter::default();
    let c = cfg(10, 40);
    let plain = ElementRequest::new(ElementKind::Speech, Anchor::Center, "Hi there");
    let labelled = plain.clone().with_speaker("Bartholomew-the-magnificent");

    let a = fit_element(&mut m, &plain, 60, 60, &c).unwrap();
    let b = fit_element(&mut m, &labelled, 60, 60, &c).unwrap();

    assert_eq!(a.lines, vec!["Hi", "there"]);
    assert_eq!(a.font_size, 20);
    assert!(!b.truncated);
    assert!(b.label.is_none());
    assert_eq!(b.lines, a.lines);
    assert_eq!(b.font_size, a.font_size);
    assert_within(&mut m, &b, 60.0, 60.0);
}

#[test]
fn ellipsize_does_not_stack_ellipses() {
    let mut m = MonospaceTypesetter::default();
    // 6 px per character at size 10.
    assert_eq!(
        ellipsize(&mut m, "one two...", 60.0, 10.0, "...").unwrap(),
        "one two..."
    );
    assert_eq!(
        ellipsize(&mut m, "one two...", 40.0, 10.0, "...").unwrap(),
        "one..."
    );
}

#[test]
fn narration_never_gets_a_label() {
    let mut m = MonospaceTypesetter::default();
    let req = ElementRequest::new(ElementKind::Narration, Anchor::TopLeft, "later").with_speaker("x");
    let fit = fit_element(&mut m, &req, 200, 60, &FitConfig::default()).unwrap();
    assert!(fit.label.is_none());
}

#[test]
fn config_validation() {
    assert!(FitConfig::default().validate().is_ok());
    assert!(cfg(20, 10).validate().is_err());
    assert!(cfg(0, 10).validate().is_err());
}

#[test]
fn system_font_box_stays_within_bounds() {
    let Some(asset) = crate::text::typeset::FontAsset::from_system() else {
        eprintln!("skipping: no system font available");
        return;
    };
    let mut ts = crate::text::typeset::FontTypesetter::new(&asset).unwrap();
    let text = long_text(500);
    let fit = fit_text(&mut ts, &text, 200, 80, ElementKind::Speech, &cfg(10, 40)).unwrap();
    assert!(fit.truncated);
    assert_within(&mut ts, &fit, 200.0, 80.0);
}
