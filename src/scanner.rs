// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::source::{Source, Span};

use core::iter::Peekable;
use core::str::CharIndices;
use std::collections::BTreeSet;

/// A function definition located in a source file.
///
/// `span` covers the header through the matching closing brace, verbatim.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: Span,
    pub span: Span,
}

/// Top-level items a library scan can produce.
#[derive(Debug, Clone)]
pub enum ScanItem {
    Definition(FunctionDef),
    /// Target path of a load-directive (`. <path>` / `source <path>`).
    Load(Span),
}

/// Scans a script for top-level function definitions and load-directives.
///
/// This is a textual scan; the script is never executed. Definitions are
/// recognized in the POSIX form `name() { ... }` and the keyword form
/// `function name { ... }` (with optional `()`), with the body delimited by
/// balanced braces to arbitrary nesting depth. Definitions nested inside
/// another function's body are not reported, matching what sourcing the file
/// would define.
#[derive(Clone)]
pub struct Scanner<'source> {
    source: Source,
    iter: Peekable<CharIndices<'source>>,
    line: u32,
    col: u32,
}

impl<'source> Scanner<'source> {
    pub fn new(source: &'source Source) -> Self {
        Self {
            source: source.clone(),
            iter: source.contents().char_indices().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn peek(&mut self) -> (usize, char) {
        match self.iter.peek() {
            Some((index, chr)) => (*index, *chr),
            _ => (self.source.contents().len(), '\x00'),
        }
    }

    fn peekahead(&mut self, n: usize) -> (usize, char) {
        match self.iter.clone().nth(n) {
            Some((index, chr)) => (index, chr),
            _ => (self.source.contents().len(), '\x00'),
        }
    }

    fn bump(&mut self) {
        if let Some((_, ch)) = self.iter.next() {
            match ch {
                '\n' => {
                    self.line += 1;
                    self.col = 1;
                }
                '\t' => self.col += 4,
                _ => self.col += 1,
            }
        }
    }

    fn skip_ws(&mut self) {
        loop {
            match self.peek().1 {
                ' ' | '\t' | '\r' | '\n' => self.bump(),
                '#' => {
                    while !matches!(self.peek().1, '\n' | '\x00') {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek().1, ' ' | '\t') {
            self.bump();
        }
    }

    fn read_ident(&mut self) -> Span {
        let start = self.peek().0;
        let (line, col) = (self.line, self.col);
        loop {
            let ch = self.peek().1;
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.bump();
            } else {
                break;
            }
        }
        let end = self.peek().0;
        Span {
            source: self.source.clone(),
            line,
            col,
            start: start as u32,
            end: end as u32,
        }
    }

    /// Consume to end of line and return the whitespace-trimmed remainder.
    fn read_rest_of_line(&mut self) -> Span {
        let start = self.peek().0;
        let (line, col) = (self.line, self.col);
        while !matches!(self.peek().1, '\n' | '\x00') {
            self.bump();
        }
        let end = self.peek().0;
        let text = &self.source.contents()[start..end];
        let lead = text.len() - text.trim_start().len();
        let trimmed = text.trim();
        Span {
            source: self.source.clone(),
            line,
            col: col + lead as u32,
            start: (start + lead) as u32,
            end: (start + lead + trimmed.len()) as u32,
        }
    }

    /// Consume a balanced `{...}` block. The scanner must be positioned at
    /// the opening brace. Returns the offset one past the closing brace, or
    /// `None` if the block is unterminated.
    fn read_brace_block(&mut self) -> Option<u32> {
        let mut depth = 0usize;
        loop {
            let (i, ch) = self.peek();
            match ch {
                '\x00' => return None,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        return Some(i as u32 + 1);
                    }
                }
                _ => (),
            }
            self.bump();
        }
    }

    /// `name() { ... }` — `name` has already been consumed.
    fn try_posix_form(&mut self, name: Span) -> Option<FunctionDef> {
        let state = (self.iter.clone(), self.line, self.col);
        self.skip_blanks();
        if self.peek().1 != '(' {
            (self.iter, self.line, self.col) = state;
            return None;
        }
        self.bump();
        self.skip_blanks();
        if self.peek().1 != ')' {
            (self.iter, self.line, self.col) = state;
            return None;
        }
        self.bump();
        self.skip_ws();
        if self.peek().1 != '{' {
            (self.iter, self.line, self.col) = state;
            return None;
        }
        let end = self.read_brace_block()?;
        let span = Span {
            source: self.source.clone(),
            line: name.line,
            col: name.col,
            start: name.start,
            end,
        };
        Some(FunctionDef { name, span })
    }

    /// `function name { ... }` or `function name() { ... }` — the `function`
    /// keyword has already been consumed.
    fn try_keyword_form(&mut self, keyword: &Span) -> Option<FunctionDef> {
        let state = (self.iter.clone(), self.line, self.col);
        self.skip_blanks();
        let ch = self.peek().1;
        if !(ch.is_ascii_alphabetic() || ch == '_') {
            (self.iter, self.line, self.col) = state;
            return None;
        }
        let name = self.read_ident();
        self.skip_blanks();
        if self.peek().1 == '(' {
            self.bump();
            self.skip_blanks();
            if self.peek().1 != ')' {
                (self.iter, self.line, self.col) = state;
                return None;
            }
            self.bump();
        }
        self.skip_ws();
        if self.peek().1 != '{' {
            (self.iter, self.line, self.col) = state;
            return None;
        }
        let end = self.read_brace_block()?;
        let span = Span {
            source: self.source.clone(),
            line: keyword.line,
            col: keyword.col,
            start: keyword.start,
            end,
        };
        Some(FunctionDef { name, span })
    }

    pub fn next_item(&mut self) -> Option<ScanItem> {
        loop {
            self.skip_ws();
            let ch = self.peek().1;
            match ch {
                '\x00' => return None,
                '.' if self.col == 1 && matches!(self.peekahead(1).1, ' ' | '\t') => {
                    self.bump();
                    let path = self.read_rest_of_line();
                    if path.start != path.end {
                        return Some(ScanItem::Load(path));
                    }
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let at_col_1 = self.col == 1;
                    let ident = self.read_ident();
                    if at_col_1
                        && ident.text() == "source"
                        && matches!(self.peek().1, ' ' | '\t')
                    {
                        let path = self.read_rest_of_line();
                        if path.start != path.end {
                            return Some(ScanItem::Load(path));
                        }
                        continue;
                    }
                    if ident.text() == "function" {
                        if let Some(def) = self.try_keyword_form(&ident) {
                            return Some(ScanItem::Definition(def));
                        }
                    }
                    if let Some(def) = self.try_posix_form(ident) {
                        return Some(ScanItem::Definition(def));
                    }
                }
                _ => self.bump(),
            }
        }
    }
}

/// Find the first top-level definition of `name` in `source`.
///
/// Returns `None` when the file defines no such function; callers treat
/// that as nothing to emit.
pub fn find_definition(source: &Source, name: &str) -> Option<FunctionDef> {
    let mut scanner = Scanner::new(source);
    while let Some(item) = scanner.next_item() {
        if let ScanItem::Definition(def) = item {
            if def.name.text() == name {
                return Some(def);
            }
        }
    }
    None
}

/// Parse a load-directive line: `. <path>` or `source <path>`.
///
/// The directive must start the line and the rest of the line is the path,
/// whitespace-trimmed. A trailing comment is not recognized; it would be
/// taken as part of the path.
pub fn load_target(line: &str) -> Option<&str> {
    let rest = if let Some(rest) = line.strip_prefix('.') {
        rest
    } else if let Some(rest) = line.strip_prefix("source") {
        rest
    } else {
        return None;
    };
    if !rest.starts_with(' ') && !rest.starts_with('\t') {
        return None;
    }
    let path = rest.trim();
    (!path.is_empty()).then_some(path)
}

/// Parse an include-directive line: `###Include: <path>`, keyword matched
/// case-insensitively.
pub fn include_target(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("###")?;
    let kw = rest.get(..7)?;
    if !kw.eq_ignore_ascii_case("include") {
        return None;
    }
    let rest = rest[7..].strip_prefix(':')?;
    let path = rest.trim();
    (!path.is_empty()).then_some(path)
}

/// Split `text` into the deduplicated set of maximal identifier runs.
///
/// An identifier character is a letter, digit or underscore; any other
/// character terminates a candidate token.
pub fn ident_tokens(text: &str) -> BTreeSet<&str> {
    let mut tokens = BTreeSet::new();
    let mut start = None;
    for (i, ch) in text.char_indices() {
        let ident = ch.is_ascii_alphanumeric() || ch == '_';
        match start {
            None if ident => start = Some(i),
            Some(s) if !ident => {
                tokens.insert(&text[s..i]);
                start = None;
            }
            _ => (),
        }
    }
    if let Some(s) = start {
        tokens.insert(&text[s..]);
    }
    tokens
}
