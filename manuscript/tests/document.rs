use manuscript::{Block, CellCoords, Document, Formatting, Run};

#[test]
fn text_concatenates_runs() {
    let block = Block::new(
        "Normal",
        vec![Run::plain("Hel"), Run::new("lo", Formatting::bold())],
    );
    assert_eq!(block.text(), "Hello");
    assert!(!block.is_blank());
}

#[test]
fn whitespace_only_blocks_are_blank() {
    assert!(Block::plain("Normal", "  \t ").is_blank());
    assert!(Block::new("Normal", vec![]).is_blank());
    assert!(Block::new("Normal", vec![Run::plain(""), Run::plain(" ")]).is_blank());
}

#[test]
fn builders_fill_placement() {
    let block = Block::plain("List Bullet", "Two")
        .with_list_level(1)
        .with_cell(2, 3)
        .with_span(10..14);
    assert_eq!(block.list_level, Some(1));
    assert_eq!(block.cell, Some(CellCoords { row: 2, column: 3 }));
    assert_eq!(block.span, 10..14);

    let bare = Block::plain("Normal", "x");
    assert_eq!((bare.list_level, bare.cell, bare.span), (None, None, 0..0));
}

#[test]
fn plain_formatting() {
    assert!(Formatting::PLAIN.is_plain());
    assert!(Formatting::default().is_plain());
    assert!(!Formatting::underline().is_plain());
    assert!(!Formatting::PLAIN.and(Formatting::strikethrough()).is_plain());
}

#[test]
fn runs_from_splits_inside_a_run() {
    let block = Block::new(
        "Normal",
        vec![
            Run::new("Alice", Formatting::bold()),
            Run::plain(": Hi "),
            Run::new("there ", Formatting::italic()),
        ],
    );
    assert_eq!(
        block.runs_from(6),
        vec![Run::plain("Hi "), Run::new("there", Formatting::italic())]
    );
}

#[test]
fn runs_from_drops_whitespace_only_edges() {
    let block = Block::new(
        "Normal",
        vec![Run::plain("Bob:"), Run::new("  ", Formatting::bold()), Run::plain("yo")],
    );
    assert_eq!(block.runs_from(4), vec![Run::plain("yo")]);
}

#[test]
fn from_blocks_renders_one_line_per_block() {
    let doc = Document::from_blocks(vec![
        Block::plain("Heading 1", "Intro"),
        Block::plain("Normal", "two\nlines"),
    ]);
    assert_eq!(doc.source, "Intro\ntwo lines\n");
    assert_eq!(&doc.source[doc.blocks[1].span.clone()], "two lines");
    assert_eq!(doc.len(), 2);
}
