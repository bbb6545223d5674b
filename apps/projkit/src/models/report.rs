//! Coverage report schema: packages, classes, and their LINE counters.
//!
//! Entities are read-only snapshots of one `<package>` subtree; the parser
//! drops everything else in the document.

#[derive(Debug, Clone, PartialEq, Eq)]
/// A `<package>` element with its direct `<class>` children.
pub struct Package {
    /// Slash-delimited namespace path, e.g. `com/android/designcompose/foo`.
    pub name: String,
    pub classes: Vec<Class>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A `<class>` element.
pub struct Class {
    pub name: String,
    pub source_file: Option<String>,
    /// First direct `<counter type="LINE">` child, if any.
    pub line_counter: Option<LineCounter>,
}

impl Class {
    /// File name used when reporting; falls back to the class name.
    pub fn display_file(&self) -> &str {
        self.source_file.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCounter {
    pub missed: u64,
    pub covered: u64,
}
