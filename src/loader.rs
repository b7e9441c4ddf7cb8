// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::source::Source;

use std::collections::BTreeMap;

use anyhow::{bail, Result};

/// Resolves a directive target path to its contents.
///
/// Library and include files are read through this seam, so embedders and
/// tests can supply scripts without touching the filesystem.
pub trait FileLoader {
    fn load(&self, path: &str) -> Result<Source>;
}

/// Loads files from the filesystem, paths resolved as given.
#[derive(Clone, Default)]
pub struct FsLoader;

impl FileLoader for FsLoader {
    fn load(&self, path: &str) -> Result<Source> {
        Source::from_file(path)
    }
}

/// An in-memory file map.
#[derive(Clone, Default)]
pub struct MemLoader {
    files: BTreeMap<String, String>,
}

impl MemLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: &str, contents: &str) {
        self.files.insert(path.to_string(), contents.to_string());
    }
}

impl FileLoader for MemLoader {
    fn load(&self, path: &str) -> Result<Source> {
        match self.files.get(path) {
            Some(contents) => Source::from_contents(path.to_string(), contents.clone()),
            None => bail!("Failed to read {path}. No such file"),
        }
    }
}
