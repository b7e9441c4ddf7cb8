// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::registry::Registry;
use crate::scanner::{find_definition, ident_tokens};

use std::collections::BTreeSet;

/// Add `name` and every function transitively referenced from its body to
/// `needed`.
///
/// Call edges are detected by token presence: identifier tokens in the
/// definition text that the registry resolves to a defined function. Tokens
/// that resolve to nothing are not dependencies and are dropped silently.
/// A name already in `needed` is not descended again, which terminates
/// recursion and self-recursion alike. The seed's own name inside its body
/// (recursive call, comment) is skipped outright.
///
/// Detection is textual, not scoped: a function name occurring inside a
/// string literal or a comment still counts. The error direction is
/// over-inclusion; a genuinely used function is never missed.
pub fn closure(name: &str, registry: &Registry, needed: &mut BTreeSet<String>) {
    if !needed.insert(name.to_string()) {
        return;
    }
    let Some(source) = registry.get(name) else {
        return;
    };
    let Some(def) = find_definition(source, name) else {
        // registered but not textually found; nothing to descend into
        return;
    };
    for token in ident_tokens(def.span.text()) {
        if token == name {
            continue;
        }
        if registry.contains(token) {
            closure(token, registry, needed);
        }
    }
}
