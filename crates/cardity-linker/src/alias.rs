//! Import alias tables.
//!
//! A module refers to other modules through `using` declarations in its own
//! source text:
//!
//! ```text
//! using Token as t;
//! using Vault;
//! ```
//!
//! The bare form maps the module name to itself. Lines that are not a
//! `using` declaration are ignored here; whether a referenced module exists
//! is the validator's concern, not the table's.

use std::collections::BTreeMap;

/// Per-module mapping from local alias to canonical module name.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    map: BTreeMap<String, String>,
}

impl AliasTable {
    /// Build the table from a module's source text.
    ///
    /// Declarations may appear anywhere in the file; scanning is
    /// top-to-bottom and later declarations overwrite earlier ones for the
    /// same alias.
    pub fn parse(source: &str) -> Self {
        let mut map = BTreeMap::new();
        for line in source.lines() {
            if let Some((alias, module)) = parse_using_line(line) {
                map.insert(alias, module);
            }
        }
        Self { map }
    }

    /// Resolve an alias to its canonical module name.
    ///
    /// An alias never declared resolves to itself, matching the bare
    /// `using Module;` identity form.
    pub fn resolve<'a>(&'a self, alias: &'a str) -> &'a str {
        self.map.get(alias).map(String::as_str).unwrap_or(alias)
    }

    /// The declared mapping for an alias, if any.
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.map.get(alias).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// Parse one line as a `using` declaration.
///
/// Returns `(alias, module)` for `using Module as alias;` and
/// `(module, module)` for `using Module;`. Any other line yields `None`;
/// partial matches are not an error.
fn parse_using_line(line: &str) -> Option<(String, String)> {
    let rest = line.trim().strip_prefix("using")?;
    // "usingFoo" is an identifier, not a declaration.
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let (module, rest) = take_identifier(rest.trim_start())?;
    let rest = rest.trim_start();

    if let Some(rest) = rest.strip_prefix(';') {
        return rest
            .trim()
            .is_empty()
            .then(|| (module.to_string(), module.to_string()));
    }

    let rest = rest.strip_prefix("as")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let (alias, rest) = take_identifier(rest.trim_start())?;
    let rest = rest.trim_start().strip_prefix(';')?;
    rest.trim()
        .is_empty()
        .then(|| (alias.to_string(), module.to_string()))
}

fn take_identifier(s: &str) -> Option<(&str, &str)> {
    let first = s.chars().next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    let end = s
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}
