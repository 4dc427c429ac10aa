use manuscript::{Formatting, Run};

/// Escape text for use inside a double-quoted script string.
///
/// Quotes and backslashes get a backslash, `{` and `[` are doubled so they
/// are not read as text tags or interpolation. Newlines become `\n`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '{' => out.push_str("{{"),
            '[' => out.push_str("[["),
            '\n' => out.push_str("\\n"),
            '\t' => out.push(' '),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Text tags for the active flags, outermost first. The order is fixed
/// (bold, italic, underline, strikethrough) whatever order the source
/// applied them in.
fn tags(format: Formatting) -> Vec<&'static str> {
    [
        (format.bold, "b"),
        (format.italic, "i"),
        (format.underline, "u"),
        (format.strikethrough, "s"),
    ]
    .into_iter()
    .filter_map(|(on, tag)| on.then_some(tag))
    .collect()
}

/// Render one run as an escaped, tag-wrapped fragment. Empty runs render
/// as nothing at all, never as an empty tag pair.
pub fn translate_run(run: &Run) -> String {
    if run.text.is_empty() {
        return String::new();
    }
    if run.format.is_plain() {
        return escape(&run.text);
    }
    let tags = tags(run.format);
    let mut out = String::new();
    for tag in &tags {
        out.push('{');
        out.push_str(tag);
        out.push('}');
    }
    out.push_str(&escape(&run.text));
    for tag in tags.iter().rev() {
        out.push_str("{/");
        out.push_str(tag);
        out.push('}');
    }
    out
}

/// Render a run sequence, merging neighbours that share formatting first.
pub fn translate_runs(runs: &[Run]) -> String {
    coalesce(runs).iter().map(translate_run).collect()
}

/// Concatenated text of `runs`, with no markup.
pub fn plain_text(runs: &[Run]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

fn coalesce(runs: &[Run]) -> Vec<Run> {
    let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
    for run in runs.iter().filter(|r| !r.text.is_empty()) {
        match merged.last_mut() {
            Some(last) if last.format == run.format => last.text.push_str(&run.text),
            _ => merged.push(run.clone()),
        }
    }
    merged
}
