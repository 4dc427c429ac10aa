use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use converter::{Config, Conversion, ConvertError, Converter, Diagnostic};
use manuscript::{Document, read_markdown};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// If set, the warning's block must start on this 1-based line of the
    /// manuscript (counted from the line after the closing `---`).
    #[serde(default)]
    pub line: Option<usize>,
}

/// Front matter of a `.test.md` fixture.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    #[serde(default)]
    pub description: Option<String>,

    /// Conversion settings, same shape as a `--config` file.
    #[serde(default)]
    pub config: Option<Config>,

    /// Expected script text (trimmed comparison).
    #[serde(default)]
    pub expect_output: Option<String>,

    /// Conversion must fail with an error whose message contains this.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// If present (even empty), warning count and content are checked.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,
}

/// Split a fixture into its TOML front matter and the markdown manuscript.
fn parse_fixture(content: &str) -> Result<(Fixture, &str), String> {
    let content = content.trim_start_matches('\u{feff}');
    let body = content
        .strip_prefix("---")
        .ok_or("missing opening --- front matter delimiter")?;
    let body = body
        .strip_prefix('\n')
        .or_else(|| body.strip_prefix("\r\n"))
        .unwrap_or(body);

    let close = body
        .find("\n---")
        .ok_or("missing closing --- front matter delimiter")?;
    let front = body[..close].trim_end_matches('\r');
    let rest = &body[close + 4..];
    let manuscript = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let fixture: Fixture = toml::from_str(front).map_err(|e| format!("TOML parse error: {}", e))?;
    Ok((fixture, manuscript))
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    /// `None` on success, otherwise why the fixture failed.
    pub failure: Option<String>,
}

fn run_fixture(path: &Path) -> TestResult {
    let (description, failure) = match std::fs::read_to_string(path) {
        Err(e) => (None, Some(format!("cannot read file: {}", e))),
        Ok(content) => match parse_fixture(&content) {
            Err(e) => (None, Some(format!("front matter error: {}", e))),
            Ok((fixture, manuscript)) => {
                let description = fixture.description.clone();
                (description, check_fixture(fixture, manuscript))
            }
        },
    };
    TestResult {
        path: path.to_path_buf(),
        description,
        failure,
    }
}

fn check_fixture(fixture: Fixture, manuscript: &str) -> Option<String> {
    let document = read_markdown(manuscript);
    let result = Converter::new(fixture.config.unwrap_or_default())
        .and_then(|converter| converter.convert(&document));

    let conversion = match check_result(fixture.expect_error.as_deref(), result) {
        Ok(Some(conversion)) => conversion,
        Ok(None) => return None,
        Err(reason) => return Some(reason),
    };

    if let Some(expected) = &fixture.expect_output {
        let actual = conversion.script.trim();
        let expected = expected.trim();
        if actual != expected {
            return Some(format!(
                "output mismatch\n  expected:\n{}\n  actual:\n{}",
                indent(expected),
                indent(actual)
            ));
        }
    }

    fixture.expect_warnings.as_ref().and_then(|expected| {
        check_warnings(manuscript, &document, &conversion.diagnostics, expected)
    })
}

/// Match the conversion result against `expect_error`. A conversion that
/// still needs its output and warnings checked comes back as `Some`.
fn check_result(
    expect_error: Option<&str>,
    result: Result<Conversion, ConvertError>,
) -> Result<Option<Conversion>, String> {
    match (expect_error, result) {
        (Some(expected), Err(error)) => {
            let message = error.to_string();
            if message.contains(expected) {
                Ok(None)
            } else {
                Err(format!(
                    "expected error containing \"{}\", got: {}",
                    expected, message
                ))
            }
        }
        (Some(expected), Ok(_)) => Err(format!(
            "expected error containing \"{}\", but conversion succeeded",
            expected
        )),
        (None, Err(error)) => Err(format!("unexpected error: {}", error)),
        (None, Ok(conversion)) => Ok(Some(conversion)),
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    | {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 1-based line of byte `offset` in `source`.
fn line_of(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}

fn check_warnings(
    manuscript: &str,
    document: &Document,
    diagnostics: &[Diagnostic],
    expected: &[ExpectedWarning],
) -> Option<String> {
    let warnings: Vec<&Diagnostic> = diagnostics.iter().filter(|d| d.is_warning()).collect();

    if warnings.len() != expected.len() {
        let listed = if warnings.is_empty() {
            "    (none)".to_string()
        } else {
            warnings
                .iter()
                .map(|w| format!("  - {}", w))
                .collect::<Vec<_>>()
                .join("\n")
        };
        return Some(format!(
            "expected {} warning(s), got {}\n  actual warnings:\n{}",
            expected.len(),
            warnings.len(),
            listed
        ));
    }

    for (i, (actual, expected)) in warnings.iter().zip(expected).enumerate() {
        if !actual.message.contains(&expected.contains) {
            return Some(format!(
                "warning[{}]: expected message containing \"{}\", got: {}",
                i, expected.contains, actual.message
            ));
        }

        let Some(expected_line) = expected.line else {
            continue;
        };
        let span = actual
            .block
            .and_then(|index| document.blocks.get(index))
            .map(|block| block.span.clone());
        match span {
            Some(span) => {
                let actual_line = line_of(manuscript, span.start);
                if actual_line != expected_line {
                    return Some(format!(
                        "warning[{}]: expected on line {}, but block starts on line {}",
                        i, expected_line, actual_line
                    ));
                }
            }
            None => {
                return Some(format!(
                    "warning[{}]: expected on line {}, but warning has no block",
                    i, expected_line
                ));
            }
        }
    }

    None
}

/// `.test.md` files under `root`, grouped by subfolder. Files directly in
/// `root` get the category "".
fn discover(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.is_dir() {
            collect(&path, root, out);
            continue;
        }
        let is_fixture = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with(".test.md"));
        if is_fixture {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_name(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }
    let categories = discover(path);
    if categories.is_empty() {
        eprintln!("no .test.md files found in {}", path.display());
        return;
    }
    eprintln!("available categories:");
    for (category, files) in &categories {
        eprintln!("  {} ({} tests)", category_name(category), files.len());
    }
}

/// Pick the categories to run. Unknown requests are reported and skipped.
fn select<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a [PathBuf]> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v.as_slice())).collect();
    }
    let mut selected = BTreeMap::new();
    for request in requested {
        let request = request.trim_matches('/');
        let prefix = format!("{}/", request);
        let mut found = false;
        for (category, files) in all {
            if category == request || category.starts_with(&prefix) {
                selected.insert(category.as_str(), files.as_slice());
                found = true;
            }
        }
        if !found {
            let available: Vec<&str> = all.keys().map(|k| category_name(k)).collect();
            eprintln!(
                "warning: category '{}' not found (available: {})",
                request,
                available.join(", ")
            );
        }
    }
    selected
}

/// Terminal output for a test run.
struct Reporter {
    no_color: bool,
    passed: usize,
    failures: Vec<TestResult>,
}

impl Reporter {
    fn new(no_color: bool) -> Self {
        Reporter {
            no_color,
            passed: 0,
            failures: Vec::new(),
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        }
    }

    fn header(&self, category: &str) {
        eprintln!();
        eprintln!("{}", self.paint(category_name(category), "1"));
    }

    fn record(&mut self, result: TestResult) {
        let label = result
            .description
            .clone()
            .or_else(|| {
                result
                    .path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .map(|s| s.trim_end_matches(".test.md").to_string())
            })
            .unwrap_or_else(|| "?".to_string());
        if result.failure.is_none() {
            self.passed += 1;
            eprintln!("  {}  {}", self.paint("PASS", "32"), label);
        } else {
            eprintln!("  {}  {}", self.paint("FAIL", "31"), label);
            self.failures.push(result);
        }
    }

    /// Print failure details and the summary line; returns the exit code.
    fn finish(self) -> i32 {
        if !self.failures.is_empty() {
            eprintln!();
            eprintln!("failures:");
            for result in &self.failures {
                eprintln!();
                eprintln!("  --- {} ---", result.path.display());
                for line in result.failure.iter().flat_map(|f| f.lines()) {
                    eprintln!("  {}", line);
                }
            }
        }

        eprintln!();
        let failed = self.failures.len();
        if failed == 0 {
            eprintln!(
                "test result: {}. {} passed, 0 failed",
                self.paint("ok", "32"),
                self.passed
            );
            0
        } else {
            eprintln!(
                "test result: {}. {} passed, {} failed (of {})",
                self.paint("FAILED", "31"),
                self.passed,
                failed,
                self.passed + failed
            );
            1
        }
    }
}

/// Run all `.test.md` files under `path` (or a single file).
/// Returns the exit code: 0 when every fixture passed, 1 otherwise.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let mut reporter = Reporter::new(no_color);

    if path.is_file() {
        reporter.record(run_fixture(path));
        return reporter.finish();
    }

    let all = discover(path);
    if all.is_empty() {
        eprintln!("no .test.md files found in {}", path.display());
        return 1;
    }
    let selected = select(&all, categories);
    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    for (category, files) in selected {
        reporter.header(category);
        for file in files {
            reporter.record(run_fixture(file));
        }
    }
    reporter.finish()
}
