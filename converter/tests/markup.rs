use converter::markup::{escape, translate_run, translate_runs};
use manuscript::{Formatting, Run};

#[test]
fn escapes() {
    assert_eq!(escape(r#"a "b" \c"#), r#"a \"b\" \\c"#);
    assert_eq!(escape("{w=1} [name]"), "{{w=1} [[name]");
    assert_eq!(escape("one\r\ntwo\tthree"), "one\\ntwo three");
}

#[test]
fn empty_run_has_no_tags() {
    assert_eq!(translate_run(&Run::new("", Formatting::bold())), "");
}

#[test]
fn tags_nest_in_fixed_order() {
    let all = Formatting::strikethrough()
        .and(Formatting::underline())
        .and(Formatting::italic())
        .and(Formatting::bold());
    assert_eq!(
        translate_run(&Run::new("x", all)),
        "{b}{i}{u}{s}x{/s}{/u}{/i}{/b}"
    );
}

#[test]
fn neighbours_with_same_format_merge() {
    let runs = vec![
        Run::new("Hel", Formatting::bold()),
        Run::new("", Formatting::italic()),
        Run::new("lo", Formatting::bold()),
        Run::plain(" there"),
    ];
    assert_eq!(translate_runs(&runs), "{b}Hello{/b} there");
}
