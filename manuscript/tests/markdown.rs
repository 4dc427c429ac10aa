use manuscript::{Block, CellCoords, Formatting, Run, read_markdown};

fn styles(source: &str) -> Vec<(String, String)> {
    read_markdown(source)
        .blocks
        .iter()
        .map(|b| (b.style.clone(), b.text()))
        .collect()
}

fn pair(style: &str, text: &str) -> (String, String) {
    (style.to_string(), text.to_string())
}

#[test]
fn headings_and_paragraphs() {
    let doc = read_markdown("# Chapter One\n\nAlice: Hello there\n\n## Left Path\n");
    assert_eq!(
        styles_of(&doc.blocks),
        vec![
            pair("Heading 1", "Chapter One"),
            pair("Normal", "Alice: Hello there"),
            pair("Heading 2", "Left Path"),
        ]
    );
}

fn styles_of(blocks: &[Block]) -> Vec<(String, String)> {
    blocks.iter().map(|b| (b.style.clone(), b.text())).collect()
}

#[test]
fn list_items_carry_levels() {
    let doc = read_markdown("- Go left\n- Go right\n  - Hide\n\n1. First\n");
    let levels: Vec<(String, Option<u8>)> = doc
        .blocks
        .iter()
        .map(|b| (b.text(), b.list_level))
        .collect();
    assert_eq!(
        levels,
        vec![
            ("Go left".to_string(), Some(0)),
            ("Go right".to_string(), Some(0)),
            ("Hide".to_string(), Some(1)),
            ("First".to_string(), Some(0)),
        ]
    );
    assert_eq!(doc.blocks[0].style, "List Bullet");
    assert_eq!(doc.blocks[3].style, "List Number");
}

#[test]
fn loose_list_items_keep_one_block_per_item() {
    assert_eq!(
        styles("- One\n\n- Two\n"),
        vec![pair("List Bullet", "One"), pair("List Bullet", "Two")]
    );
}

#[test]
fn inline_formatting_becomes_runs() {
    let doc = read_markdown("Plain **bold *both*** ~~gone~~ <u>under</u>\n");
    let runs = &doc.blocks[0].runs;
    assert_eq!(
        runs,
        &vec![
            Run::plain("Plain "),
            Run::new("bold ", Formatting::bold()),
            Run::new("both", Formatting::bold().and(Formatting::italic())),
            Run::plain(" "),
            Run::new("gone", Formatting::strikethrough()),
            Run::plain(" "),
            Run::new("under", Formatting::underline()),
        ]
    );
}

#[test]
fn quotes_and_code_blocks() {
    assert_eq!(
        styles("> The rain falls.\n\n```\nscene bg park\n```\n"),
        vec![pair("Quote", "The rain falls."), pair("Code", "scene bg park")]
    );
}

#[test]
fn table_cells_have_coordinates() {
    let doc = read_markdown("| Who | Line |\n|---|---|\n| Bob | Hi |\n");
    let cells: Vec<(String, Option<CellCoords>)> =
        doc.blocks.iter().map(|b| (b.text(), b.cell)).collect();
    assert_eq!(
        cells,
        vec![
            ("Who".to_string(), Some(CellCoords { row: 0, column: 0 })),
            ("Line".to_string(), Some(CellCoords { row: 0, column: 1 })),
            ("Bob".to_string(), Some(CellCoords { row: 1, column: 0 })),
            ("Hi".to_string(), Some(CellCoords { row: 1, column: 1 })),
        ]
    );
}

#[test]
fn soft_breaks_join_lines() {
    assert_eq!(styles("one\ntwo\n"), vec![pair("Normal", "one two")]);
}

#[test]
fn spans_point_into_source() {
    let source = "# Intro\n\nSome text.\n";
    let doc = read_markdown(source);
    assert_eq!(doc.source, source);
    assert!(source[doc.blocks[0].span.clone()].starts_with("# Intro"));
    assert!(source[doc.blocks[1].span.clone()].starts_with("Some text."));
}
