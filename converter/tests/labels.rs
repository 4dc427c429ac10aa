use converter::resolve::{LabelTable, is_reserved, is_valid_label, slugify};

#[test]
fn slugs() {
    assert_eq!(slugify("Chapter One!"), "chapter_one");
    assert_eq!(slugify("  Left -- Path  "), "left_path");
    assert_eq!(slugify("Don't Look Back"), "don_t_look_back");
    assert_eq!(slugify("Café"), "caf");
    assert_eq!(slugify("1984"), "label_1984");
    assert_eq!(slugify("???"), "");
}

#[test]
fn keyword_slugs_are_prefixed() {
    assert_eq!(slugify("Menu"), "label_menu");
    assert_eq!(slugify("SCENE"), "label_scene");
    assert_eq!(slugify("Return!"), "label_return");
    assert_eq!(slugify("With"), "label_with");
    assert_eq!(slugify("In"), "label_in");
    assert_eq!(slugify("Menu Two"), "menu_two");
    assert_eq!(slugify("Showdown"), "showdown");
}

#[test]
fn reserved_words() {
    for word in [
        "and", "as", "assert", "async", "at", "await", "behind", "break", "call", "camera",
        "class", "continue", "def", "del", "elif", "else", "except", "expression", "finally",
        "for", "from", "global", "hide", "if", "image", "import", "in", "init", "is", "jump",
        "lambda", "menu", "nonlocal", "not", "onlayer", "or", "pass", "python", "raise",
        "return", "scene", "show", "transform", "try", "while", "with", "yield", "zorder",
    ] {
        assert!(is_reserved(word), "{} should be reserved", word);
        assert!(!is_valid_label(word));
    }
    assert!(!is_reserved("start"));
    assert!(!is_reserved("Menu"));
}

#[test]
fn label_names() {
    assert!(is_valid_label("start"));
    assert!(is_valid_label("_hidden"));
    assert!(is_valid_label("chapter_2"));
    assert!(!is_valid_label(""));
    assert!(!is_valid_label("2nd"));
    assert!(!is_valid_label("the end"));
    assert!(!is_valid_label("caf\u{e9}"));
}

#[test]
fn claims_are_suffixed_in_order() {
    let mut table = LabelTable::new();
    assert_eq!(table.claim("intro").0.as_str(), "intro");
    let (second, renamed) = table.claim("intro");
    assert_eq!(second.as_str(), "intro_1");
    assert!(renamed);

    table.reserve("intro_2");
    assert_eq!(table.claim("intro").0.as_str(), "intro_3");
    assert!(table.contains("intro_2"));
}

#[test]
fn suffixes_skip_natural_names() {
    let mut table = LabelTable::new();
    table.claim("loop");
    table.claim("loop_1");
    assert_eq!(table.claim("loop").0.as_str(), "loop_2");
    assert_eq!(table.claim_suffixed("section").as_str(), "section_1");
    assert_eq!(table.claim_suffixed("section").as_str(), "section_2");
}

#[test]
fn tables_do_not_share_counters() {
    let mut first = LabelTable::new();
    first.claim("a");
    first.claim("a");
    let mut second = LabelTable::new();
    assert_eq!(second.claim("a").0.as_str(), "a");
}
