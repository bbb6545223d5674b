//! Streaming reader for JaCoCo XML coverage reports.
//!
//! `Packages` walks the document with `quick_xml` and yields one `Package` per
//! `<package>` child of the root element, in document order. Lookups follow
//! the report's nesting strictly:
//! - `<package>` must be a direct child of the root (root name is not checked).
//! - `<class>` must be a direct child of a `<package>`.
//! - the LINE `<counter>` must be a direct child of a `<class>`; counters under
//!   `<method>` are skipped with the rest of that subtree.
//!
//! Well-formedness is checked as the reader advances, so a broken tail
//! surfaces as an `Err` item after the packages that preceded it.

use crate::error::{Error, Result};
use crate::models::report::{Class, LineCounter, Package};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace};

/// Default report location produced by the Gradle JaCoCo plugin.
pub const DEFAULT_REPORT_PATH: &str = "build/reports/jacoco/jacocoTestReport/jacocoTestReport.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    BeforeRoot,
    InRoot,
    AfterRoot,
}

/// Lazy iterator over the packages of a report.
///
/// Finite and not restartable; re-open the source to scan again. Stops after
/// the first error.
pub struct Packages<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    position: Position,
    done: bool,
}

/// Open a report file for streaming.
pub fn open(path: &Path) -> Result<Packages<BufReader<File>>> {
    debug!(path = %path.display(), "opening coverage report");
    let file = File::open(path).map_err(|source| Error::ReportNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Packages::new(BufReader::new(file)))
}

impl<R: BufRead> Packages<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::new(),
            position: Position::BeforeRoot,
            done: false,
        }
    }

    fn next_package(&mut self) -> Result<Option<Package>> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => match self.position {
                    Position::BeforeRoot => self.position = Position::InRoot,
                    Position::InRoot if e.name().as_ref() == b"package" => {
                        let name = package_name(&e)?;
                        let classes = read_classes(&mut self.reader)?;
                        trace!(package = %name, classes = classes.len(), "read package");
                        return Ok(Some(Package { name, classes }));
                    }
                    Position::InRoot => skip_element(&mut self.reader, &e)?,
                    Position::AfterRoot => return Err(junk_after_root()),
                },
                Event::Empty(e) => match self.position {
                    // `<report/>`: a root with no packages
                    Position::BeforeRoot => self.position = Position::AfterRoot,
                    Position::InRoot if e.name().as_ref() == b"package" => {
                        let name = package_name(&e)?;
                        return Ok(Some(Package {
                            name,
                            classes: Vec::new(),
                        }));
                    }
                    Position::InRoot => {}
                    Position::AfterRoot => return Err(junk_after_root()),
                },
                Event::End(_) if self.position == Position::InRoot => {
                    self.position = Position::AfterRoot;
                }
                Event::End(_) => return Err(Error::malformed("unexpected closing tag")),
                Event::Text(t) if self.position != Position::InRoot && !is_blank(&t) => {
                    return Err(Error::malformed("text outside the root element"));
                }
                Event::Eof => {
                    return match self.position {
                        Position::BeforeRoot => Err(Error::malformed("no root element")),
                        Position::InRoot => Err(unexpected_eof()),
                        Position::AfterRoot => Ok(None),
                    };
                }
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for Packages<R> {
    type Item = Result<Package>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_package().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

/// Read the children of an open `<package>` up to its closing tag.
fn read_classes<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<Class>> {
    let mut buf = Vec::new();
    let mut classes = Vec::new();
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"class" => {
                let (name, source_file) = class_attributes(&e)?;
                let line_counter = read_line_counter(reader)?;
                classes.push(Class {
                    name,
                    source_file,
                    line_counter,
                });
            }
            Event::Empty(e) if e.name().as_ref() == b"class" => {
                let (name, source_file) = class_attributes(&e)?;
                classes.push(Class {
                    name,
                    source_file,
                    line_counter: None,
                });
            }
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(_) => return Ok(classes),
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

/// Read the children of an open `<class>`, keeping the first LINE counter.
fn read_line_counter<R: BufRead>(reader: &mut Reader<R>) -> Result<Option<LineCounter>> {
    let mut buf = Vec::new();
    let mut found = None;
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                if found.is_none() && e.name().as_ref() == b"counter" {
                    found = line_counter(&e)?;
                }
            }
            Event::Start(e) => {
                if found.is_none() && e.name().as_ref() == b"counter" {
                    found = line_counter(&e)?;
                }
                skip_element(reader, &e)?;
            }
            Event::End(_) => return Ok(found),
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

fn skip_element<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart<'_>) -> Result<()> {
    let mut scratch = Vec::new();
    reader.read_to_end_into(start.name(), &mut scratch)?;
    Ok(())
}

fn package_name(e: &BytesStart<'_>) -> Result<String> {
    attribute(e, b"name")?.ok_or_else(|| Error::malformed("<package> without a name attribute"))
}

fn class_attributes(e: &BytesStart<'_>) -> Result<(String, Option<String>)> {
    let name = attribute(e, b"name")?.unwrap_or_default();
    let source_file = attribute(e, b"sourcefilename")?;
    Ok((name, source_file))
}

/// Parse a `<counter>` element; `None` unless `type="LINE"`.
fn line_counter(e: &BytesStart<'_>) -> Result<Option<LineCounter>> {
    if attribute(e, b"type")?.as_deref() != Some("LINE") {
        return Ok(None);
    }
    Ok(Some(LineCounter {
        missed: count(e, b"missed")?,
        covered: count(e, b"covered")?,
    }))
}

fn count(e: &BytesStart<'_>, key: &[u8]) -> Result<u64> {
    let key_name = String::from_utf8_lossy(key);
    let raw = attribute(e, key)?
        .ok_or_else(|| Error::malformed(format!("LINE counter without `{key_name}`")))?;
    raw.trim().parse().map_err(|_| {
        Error::malformed(format!(
            "LINE counter `{key_name}` is not a non-negative integer: {raw:?}"
        ))
    })
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

fn unexpected_eof() -> Error {
    Error::malformed("unexpected end of document")
}

fn junk_after_root() -> Error {
    Error::malformed("content after the root element")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const JACOCO: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<!DOCTYPE report PUBLIC "-//JACOCO//DTD Report 1.1//EN" "report.dtd">
<report name="designcompose">
  <sessioninfo id="host-1" start="1" dump="2"/>
  <package name="com/android/designcompose/x">
    <class name="com/android/designcompose/x/File" sourcefilename="File.kt">
      <method name="run" desc="()V" line="3">
        <counter type="LINE" missed="100" covered="0"/>
      </method>
      <counter type="INSTRUCTION" missed="4" covered="40"/>
      <counter type="LINE" missed="11" covered="9"/>
      <counter type="LINE" missed="0" covered="99"/>
    </class>
    <class name="com/android/designcompose/x/Empty" sourcefilename="Empty.kt"/>
    <sourcefile name="File.kt">
      <line nr="3" mi="0" ci="4" mb="0" cb="0"/>
      <counter type="LINE" missed="1" covered="1"/>
    </sourcefile>
    <counter type="LINE" missed="11" covered="9"/>
  </package>
  <package name="com/other/y"/>
  <counter type="LINE" missed="11" covered="9"/>
</report>
"#;

    fn parse_all(xml: &str) -> Result<Vec<Package>> {
        Packages::new(xml.as_bytes()).collect()
    }

    #[test]
    fn test_reads_packages_classes_and_direct_line_counter() {
        let packages = parse_all(JACOCO).unwrap();
        assert_eq!(packages.len(), 2);
        let pkg = &packages[0];
        assert_eq!(pkg.name, "com/android/designcompose/x");
        assert_eq!(pkg.classes.len(), 2);
        assert_eq!(pkg.classes[0].source_file.as_deref(), Some("File.kt"));
        // method-level counter ignored; first class-level LINE counter wins
        assert_eq!(
            pkg.classes[0].line_counter,
            Some(LineCounter {
                missed: 11,
                covered: 9
            })
        );
        assert_eq!(pkg.classes[1].line_counter, None);
        assert_eq!(packages[1].name, "com/other/y");
        assert!(packages[1].classes.is_empty());
    }

    #[test]
    fn test_empty_root_yields_no_packages() {
        assert!(parse_all("<report/>").unwrap().is_empty());
        assert!(parse_all("<report>\n</report>\n").unwrap().is_empty());
    }

    #[test]
    fn test_only_direct_children_of_root_are_packages() {
        let xml = r#"<report><group name="g"><package name="nested"/></group><package name="top"/></report>"#;
        let names: Vec<String> = parse_all(xml)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["top"]);
    }

    #[test]
    fn test_lazy_sequence_yields_before_error() {
        let xml = r#"<report><package name="a"/><package name="b"><class name="c"></package>"#;
        let mut it = Packages::new(xml.as_bytes());
        assert_eq!(it.next().unwrap().unwrap().name, "a");
        assert!(it.next().unwrap().is_err());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_mismatched_tags_are_xml_errors() {
        let err = parse_all("<report><package name=\"a\"></report>").unwrap_err();
        assert!(matches!(err, Error::Xml(_)), "{err:?}");
    }

    #[test]
    fn test_truncated_document_is_rejected() {
        assert!(parse_all("<report><package name=\"a\"/>").is_err());
        assert!(parse_all("<report><package name=\"a\"><class name=\"c\">").is_err());
    }

    #[test]
    fn test_no_root_and_trailing_content_rejected() {
        assert!(parse_all("").is_err());
        assert!(parse_all("<report/><report/>").is_err());
        assert!(parse_all("<report/>trailing").is_err());
    }

    #[test]
    fn test_package_without_name_rejected() {
        let err = parse_all("<report><package/></report>").unwrap_err();
        assert!(matches!(err, Error::MalformedReport(_)));
    }

    #[test]
    fn test_bad_counter_values_rejected() {
        let xml = r#"<report><package name="p"><class name="c"><counter type="LINE" missed="x" covered="1"/></class></package></report>"#;
        assert!(matches!(
            parse_all(xml).unwrap_err(),
            Error::MalformedReport(_)
        ));
        let xml = r#"<report><package name="p"><class name="c"><counter type="LINE" covered="1"/></class></package></report>"#;
        assert!(matches!(
            parse_all(xml).unwrap_err(),
            Error::MalformedReport(_)
        ));
        // non-LINE counters are never interpreted
        let xml = r#"<report><package name="p"><class name="c"><counter type="BRANCH" missed="x"/></class></package></report>"#;
        assert!(parse_all(xml).is_ok());
    }

    #[test]
    fn test_escaped_attribute_values_are_unescaped() {
        let xml = r#"<report><package name="a&amp;b"/></report>"#;
        assert_eq!(parse_all(xml).unwrap()[0].name, "a&b");
    }

    #[test]
    fn test_open_missing_file_is_report_not_found() {
        let dir = tempdir().unwrap();
        let err = open(&dir.path().join("missing.xml")).err().unwrap();
        assert!(matches!(err, Error::ReportNotFound { .. }));
    }

    #[test]
    fn test_open_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xml");
        std::fs::write(&path, JACOCO).unwrap();
        let packages: Vec<Package> = open(&path).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(packages.len(), 2);
    }
}
