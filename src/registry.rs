// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::loader::FileLoader;
use crate::scanner::{ScanItem, Scanner};
use crate::source::Source;

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};

/// Accumulated mapping from function name to the source that textually
/// contains its definition.
///
/// The registry only grows or overwrites entries; a library loaded later
/// that redefines a name replaces the mapping. Which definition gets
/// emitted is decided elsewhere, by the driver's processed set.
#[derive(Clone, Default)]
pub struct Registry {
    functions: BTreeMap<String, Source>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a library file and merge every function it defines.
    ///
    /// A load-directive inside the library is followed at its textual
    /// position, so a parent definition appearing after the directive
    /// overwrites a nested one of the same name, as sourcing would. Any
    /// file that cannot be read is an error for the whole call.
    pub fn load_library(&mut self, path: &str, loader: &dyn FileLoader) -> Result<()> {
        let mut visited = BTreeSet::new();
        self.load_library_impl(path, loader, &mut visited)
    }

    fn load_library_impl(
        &mut self,
        path: &str,
        loader: &dyn FileLoader,
        visited: &mut BTreeSet<String>,
    ) -> Result<()> {
        if !visited.insert(path.to_string()) {
            // already scanned in this locate call; library graphs may have cycles
            return Ok(());
        }
        let source = loader
            .load(path)
            .with_context(|| format!("failed to load library {path}"))?;
        let mut scanner = Scanner::new(&source);
        while let Some(item) = scanner.next_item() {
            match item {
                ScanItem::Load(target) => {
                    let target = target.text().to_string();
                    self.load_library_impl(&target, loader, visited)?;
                }
                ScanItem::Definition(def) => {
                    self.functions
                        .insert(def.name.text().to_string(), source.clone());
                }
            }
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Source> {
        self.functions.get(name)
    }

    /// Registered names, in ordinal order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.functions.keys()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
