//! JUnit-style XML report parsing with nosetests fallback.
//!
//! A report's root element is either `<testsuites>` or `<testsuite>`:
//!
//! - JUnit: every direct `<testsuite>` child of the root is a suite.
//! - nosetests: a root `<testsuite>` carrying a non-empty `name` is itself a
//!   suite, added after the JUnit suites of the same file.
//!
//! A `<testsuites>` root is never read as a nosetests suite, so its own
//! summary attributes are not counted a second time.

use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::TestSuite;

const TESTSUITES_TAG: &[u8] = b"testsuites";
const TESTSUITE_TAG: &[u8] = b"testsuite";

/// Parse one report document into its suites.
///
/// Fails when the document is not well-formed XML, its root is not a test
/// report element, or a suite carries a non-integer count.
pub fn parse_report(data: &[u8]) -> Result<Vec<TestSuite>, String> {
    let scanned = scan_report(data)?;

    let mut suites = scanned.children;

    if let Some(suite) = scanned.root_suite.filter(|s| !s.name.is_empty()) {
        suites.push(suite);
    }

    Ok(suites)
}

/// Read and parse every report file, in order, stopping at the first failure.
pub async fn parse_report_files(paths: &[PathBuf]) -> AppResult<Vec<TestSuite>> {
    let mut partials = Vec::with_capacity(paths.len());

    for path in paths {
        partials.push(parse_report_file(path).await?);
    }

    Ok(partials.into_iter().flatten().collect())
}

/// Read and parse a single report file.
pub async fn parse_report_file(path: &Path) -> AppResult<Vec<TestSuite>> {
    let data = tokio::fs::read(path).await.map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let suites = parse_report(&data)
        .map_err(|e| AppError::Decode(format!("cannot interpret file {} ({})", path.display(), e)))?;

    debug!("Parsed {} suite(s) from {}", suites.len(), path.display());

    Ok(suites)
}

/// Elements of interest found in one report.
struct ScannedReport {
    /// Root decoded as a suite when the root is `<testsuite>`
    root_suite: Option<TestSuite>,
    /// Direct `<testsuite>` children of the root
    children: Vec<TestSuite>,
}

fn scan_report(data: &[u8]) -> Result<ScannedReport, String> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();

    let mut depth = 0usize;
    let mut seen_root = false;
    let mut root_suite = None;
    let mut children = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("malformed XML at byte {}: {}", reader.buffer_position(), e))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));

                if depth == 0 {
                    if seen_root {
                        return Err("multiple root elements".to_string());
                    }
                    seen_root = true;
                    match e.local_name().as_ref() {
                        TESTSUITES_TAG => {}
                        TESTSUITE_TAG => root_suite = Some(read_suite(e)?),
                        other => {
                            return Err(format!(
                                "unexpected root element <{}>",
                                String::from_utf8_lossy(other)
                            ));
                        }
                    }
                } else if depth == 1 && e.local_name().as_ref() == TESTSUITE_TAG {
                    children.push(read_suite(e)?);
                }

                if !is_empty {
                    depth += 1;
                }
            }
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    if !seen_root {
        return Err("no root element".to_string());
    }
    if depth != 0 {
        return Err("unexpected end of document".to_string());
    }

    Ok(ScannedReport {
        root_suite,
        children,
    })
}

fn read_suite(element: &BytesStart<'_>) -> Result<TestSuite, String> {
    let mut suite = TestSuite::new(String::new(), 0, 0, 0);

    for attr in element.attributes() {
        let attr = attr.map_err(|e| format!("invalid attribute: {}", e))?;
        let value = attr
            .unescape_value()
            .map_err(|e| format!("invalid attribute value: {}", e))?;

        match attr.key.local_name().as_ref() {
            b"name" => suite.name = value.into_owned(),
            b"tests" => suite.total = parse_count("tests", &value)?,
            b"failures" => suite.failures = parse_count("failures", &value)?,
            b"skipped" | b"skip" => suite.skipped = parse_count("skipped", &value)?,
            _ => {}
        }
    }

    Ok(suite)
}

fn parse_count(attribute: &str, value: &str) -> Result<i64, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }

    value
        .parse::<i64>()
        .map_err(|_| format!("attribute {}=\"{}\" is not an integer", attribute, value))
}
