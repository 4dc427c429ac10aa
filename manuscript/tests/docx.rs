use std::io::{Cursor, Write};

use manuscript::reader::{InputFormat, read};
use manuscript::{CellCoords, Formatting, ReadError, Run, read_docx};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
  <w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/></w:style>
</w:styles>"#;

fn build_docx(body: &str, styles: Option<&str>) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
        W_NS, body
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(document.as_bytes()).unwrap();
    if let Some(styles) = styles {
        zip.start_file("word/styles.xml", options).unwrap();
        zip.write_all(styles.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

#[test]
fn paragraphs_styles_and_runs() {
    let body = r#"
        <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Chapter One</w:t></w:r></w:p>
        <w:p>
          <w:r><w:rPr><w:b/></w:rPr><w:t>Alice</w:t></w:r>
          <w:r><w:t xml:space="preserve">: Hello </w:t></w:r>
          <w:r><w:rPr><w:i/><w:u w:val="single"/></w:rPr><w:t>there</w:t></w:r>
        </w:p>"#;
    let doc = read_docx(&build_docx(body, Some(STYLES_XML))).unwrap();

    assert_eq!(doc.blocks.len(), 2);
    assert_eq!(doc.blocks[0].style, "heading 1");
    assert_eq!(doc.blocks[0].text(), "Chapter One");
    assert_eq!(doc.blocks[1].style, "Normal");
    assert_eq!(
        doc.blocks[1].runs,
        vec![
            Run::new("Alice", Formatting::bold()),
            Run::plain(": Hello "),
            Run::new("there", Formatting::italic().and(Formatting::underline())),
        ]
    );
}

#[test]
fn unknown_style_ids_are_kept_verbatim() {
    let body = r#"<w:p><w:pPr><w:pStyle w:val="ChoiceItem"/></w:pPr><w:r><w:t>Go</w:t></w:r></w:p>"#;
    let doc = read_docx(&build_docx(body, None)).unwrap();
    assert_eq!(doc.blocks[0].style, "ChoiceItem");
}

#[test]
fn toggles_can_be_switched_off() {
    let body = r#"<w:p><w:r><w:rPr><w:b w:val="0"/><w:strike/><w:u w:val="none"/></w:rPr><w:t>x</w:t></w:r></w:p>"#;
    let doc = read_docx(&build_docx(body, None)).unwrap();
    assert_eq!(doc.blocks[0].runs, vec![Run::new("x", Formatting::strikethrough())]);
}

#[test]
fn paragraph_mark_properties_do_not_format_runs() {
    let body = r#"<w:p><w:pPr><w:rPr><w:b/></w:rPr></w:pPr><w:r><w:t>plain</w:t></w:r></w:p>"#;
    let doc = read_docx(&build_docx(body, None)).unwrap();
    assert_eq!(doc.blocks[0].runs, vec![Run::plain("plain")]);
}

#[test]
fn list_levels_tabs_and_breaks() {
    let body = r#"
        <w:p><w:pPr><w:pStyle w:val="ListBullet"/><w:numPr><w:ilvl w:val="1"/><w:numId w:val="3"/></w:numPr></w:pPr>
          <w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>"#;
    let doc = read_docx(&build_docx(body, Some(STYLES_XML))).unwrap();
    assert_eq!(doc.blocks[0].style, "List Bullet");
    assert_eq!(doc.blocks[0].list_level, Some(1));
    assert_eq!(doc.blocks[0].text(), "a\tb\nc");
    assert_eq!(doc.source, "a\tb c\n");
}

#[test]
fn table_cells_get_coordinates() {
    let body = r#"
        <w:tbl>
          <w:tr><w:tc><w:p><w:r><w:t>Bob</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Hi</w:t></w:r></w:p></w:tc></w:tr>
          <w:tr><w:tc><w:p><w:r><w:t>Eve</w:t></w:r></w:p></w:tc></w:tr>
        </w:tbl>
        <w:p><w:r><w:t>After</w:t></w:r></w:p>"#;
    let doc = read_docx(&build_docx(body, None)).unwrap();
    let cells: Vec<_> = doc.blocks.iter().map(|b| (b.text(), b.cell)).collect();
    assert_eq!(
        cells,
        vec![
            ("Bob".to_string(), Some(CellCoords { row: 0, column: 0 })),
            ("Hi".to_string(), Some(CellCoords { row: 0, column: 1 })),
            ("Eve".to_string(), Some(CellCoords { row: 1, column: 0 })),
            ("After".to_string(), None),
        ]
    );
}

#[test]
fn empty_paragraphs_are_kept_as_blank_blocks() {
    let body = r#"<w:p/><w:p><w:r><w:t>x</w:t></w:r></w:p>"#;
    let doc = read_docx(&build_docx(body, None)).unwrap();
    assert_eq!(doc.blocks.len(), 2);
    assert!(doc.blocks[0].is_blank());
}

#[test]
fn entities_are_unescaped() {
    let body = r#"<w:p><w:r><w:t>Tom &amp; &quot;Jerry&quot;</w:t></w:r></w:p>"#;
    let doc = read_docx(&build_docx(body, None)).unwrap();
    assert_eq!(doc.blocks[0].text(), "Tom & \"Jerry\"");
}

#[test]
fn missing_document_part_is_reported() {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("other.xml", SimpleFileOptions::default()).unwrap();
    zip.write_all(b"<x/>").unwrap();
    let bytes = zip.finish().unwrap().into_inner();

    match read_docx(&bytes) {
        Err(ReadError::MissingPart(part)) => assert_eq!(part, "word/document.xml"),
        other => panic!("expected missing part, got {:?}", other),
    }
}

#[test]
fn garbage_is_not_a_container() {
    assert!(matches!(read_docx(b"not a zip"), Err(ReadError::Zip(_))));
}

#[test]
fn read_dispatches_on_format_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("story.DOCX");
    std::fs::write(&path, build_docx(r#"<w:p><w:r><w:t>On disk</w:t></w:r></w:p>"#, None)).unwrap();

    let format = InputFormat::from_path(&path).unwrap();
    assert_eq!(format, InputFormat::Docx);
    let doc = read(format, std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(doc.blocks[0].text(), "On disk");

    let md = dir.path().join("story.md");
    assert_eq!(InputFormat::from_path(&md), Some(InputFormat::Markdown));
    assert_eq!(InputFormat::from_path(&dir.path().join("story.pdf")), None);
}
