// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::loader::{FileLoader, FsLoader};
use crate::registry::Registry;
use crate::resolver::closure;
use crate::scanner::{find_definition, include_target, load_target};
use crate::source::Source;

use std::collections::BTreeSet;

use anyhow::{Context, Result};

/// The inlining engine.
///
/// Processes a main script line by line. A load-directive is replaced by
/// the definitions of exactly the library functions the rest of the script
/// transitively needs; an include-directive is replaced by the target file
/// verbatim; every other line passes through unchanged. Each function is
/// emitted at most once per run, from the first library it resolved
/// against.
pub struct Engine {
    loader: Box<dyn FileLoader>,
    registry: Registry,
    processed: BTreeSet<String>,
}

/// Create an engine reading from the filesystem.
impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_loader(Box::new(FsLoader))
    }

    pub fn with_loader(loader: Box<dyn FileLoader>) -> Self {
        Self {
            loader,
            registry: Registry::new(),
            processed: BTreeSet::new(),
        }
    }

    pub fn expand_file(&mut self, path: &str) -> Result<String> {
        let source = self.loader.load(path)?;
        self.expand(&source)
    }

    pub fn expand(&mut self, source: &Source) -> Result<String> {
        let mut out = String::new();
        let count = source.line_count();
        for idx in 0..count {
            let line = source.line(idx as u32);
            // The line table carries a synthetic empty final line when the
            // text ends with a newline; emitting it would append a line.
            if idx + 1 == count && line.is_empty() {
                break;
            }
            if let Some(path) = include_target(line) {
                let included = self
                    .loader
                    .load(path)
                    .with_context(|| format!("failed to include {path}"))?;
                out.push_str(included.contents());
                if !included.contents().ends_with('\n') {
                    out.push('\n');
                }
            } else if let Some(path) = load_target(line) {
                self.registry.load_library(path, self.loader.as_ref())?;
                self.emit_needed(source, idx + 1, &mut out);
            } else {
                out.push_str(line);
                out.push('\n');
            }
        }
        Ok(squeeze_blank_lines(&out))
    }

    /// Emit definitions for every registry name the remainder of the script
    /// needs, directly or transitively, skipping names already emitted.
    fn emit_needed(&mut self, source: &Source, from_line: usize, out: &mut String) {
        let remainder = usage_text(source, from_line);
        let mut needed = BTreeSet::new();
        for name in self.registry.names() {
            // Unscoped substring test, not a token match. A name occurring
            // inside a longer identifier or a string still counts; the error
            // direction is over-inclusion.
            if remainder.contains(name.as_str()) {
                closure(name, &self.registry, &mut needed);
            }
        }
        for name in &needed {
            if !self.processed.insert(name.clone()) {
                continue;
            }
            let Some(src) = self.registry.get(name) else {
                continue;
            };
            let Some(def) = find_definition(src, name) else {
                continue;
            };
            out.push_str(def.span.text());
            out.push('\n');
            out.push('\n');
        }
    }
}

/// The remainder of the script as seen by usage detection: directive lines
/// excluded, `#` to end of line stripped.
fn usage_text(source: &Source, from_line: usize) -> String {
    let mut text = String::new();
    for idx in from_line..source.line_count() {
        let line = source.line(idx as u32);
        if load_target(line).is_some() || include_target(line).is_some() {
            continue;
        }
        let code = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        text.push_str(code);
        text.push('\n');
    }
    text
}

/// Collapse every run of two or more consecutive empty lines to one.
/// Whitespace-only lines are not empty and pass through.
fn squeeze_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blanks = 0usize;
    for line in text.split_inclusive('\n') {
        if line == "\n" || line == "\r\n" {
            blanks += 1;
            if blanks > 1 {
                continue;
            }
        } else {
            blanks = 0;
        }
        out.push_str(line);
    }
    out
}
