//! Cross-module call extraction.
//!
//! Method bodies are opaque text here. A narrow scanning pass finds
//! `alias.method(...)` patterns and slices out the top-level arguments with
//! a parenthesis depth counter that is string-literal aware. This
//! deliberately stops short of a full expression grammar, which belongs to
//! the external compiler; call-site binding is all the linker needs.

use std::ops::Range;

/// One cross-module invocation found in a method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Local alias the call targets (left of the dot).
    pub alias: String,
    /// Invoked method name.
    pub method: String,
    /// Raw top-level argument expressions, trimmed.
    pub args: Vec<String>,
}

impl CallSite {
    /// Number of arguments at the call site.
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }
}

/// Extract every cross-module call site from one method body, in source
/// order.
///
/// A call whose closing parenthesis never appears is dropped without a
/// diagnostic; the rest of the body still contributes call sites. Scanning
/// resumes after a completed call's closing parenthesis, so calls nested
/// inside an argument are not extracted as separate top-level sites.
pub fn extract_call_sites(body: &str) -> Vec<CallSite> {
    let bytes = body.as_bytes();
    let mut sites = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let Some(head) = match_call_head(bytes, i) else {
            i += 1;
            continue;
        };
        match scan_call_extent(bytes, head.open + 1) {
            Some(end) => {
                // end is one past the closing parenthesis
                sites.push(CallSite {
                    alias: body[head.alias].to_string(),
                    method: body[head.method].to_string(),
                    args: split_top_level_args(&body[head.open + 1..end - 1]),
                });
                i = end;
            }
            None => {
                tracing::debug!(
                    alias = &body[head.alias.clone()],
                    method = &body[head.method.clone()],
                    "skipping unterminated call site"
                );
                i = head.open + 1;
            }
        }
    }
    sites
}

struct CallHead {
    alias: Range<usize>,
    method: Range<usize>,
    open: usize,
}

/// Match `identifier . identifier (` starting at `at`, whitespace allowed
/// around the dot and before the parenthesis.
fn match_call_head(bytes: &[u8], at: usize) -> Option<CallHead> {
    let alias_end = scan_identifier(bytes, at)?;
    let mut j = skip_whitespace(bytes, alias_end);
    if bytes.get(j) != Some(&b'.') {
        return None;
    }
    j = skip_whitespace(bytes, j + 1);
    let method_start = j;
    let method_end = scan_identifier(bytes, j)?;
    j = skip_whitespace(bytes, method_end);
    if bytes.get(j) != Some(&b'(') {
        return None;
    }
    Some(CallHead {
        alias: at..alias_end,
        method: method_start..method_end,
        open: j,
    })
}

fn scan_identifier(bytes: &[u8], at: usize) -> Option<usize> {
    let first = *bytes.get(at)?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    let mut i = at + 1;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    Some(i)
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Scan from just after the opening parenthesis to the call's closing one.
///
/// The opening parenthesis counts as depth 1; the first parenthesis that
/// returns depth to 0 closes the call. Characters inside a quoted string
/// (`"` or `'`, matching delimiter) never affect depth. Returns the index
/// one past the closing parenthesis, or `None` if the call never closes.
fn scan_call_extent(bytes: &[u8], mut i: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut in_str: Option<u8> = None;
    while i < bytes.len() {
        let c = bytes[i];
        i += 1;
        match in_str {
            Some(quote) => {
                if c == quote {
                    in_str = None;
                }
            }
            None => match c {
                b'"' | b'\'' => in_str = Some(c),
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
    }
    None
}

/// Split an argument extent on top-level commas only.
///
/// Commas inside nested parentheses or string literals do not split.
/// Whitespace-only segments are dropped, so an empty argument list yields
/// zero arguments rather than one empty argument.
fn split_top_level_args(slice: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_str: Option<char> = None;
    for c in slice.chars() {
        match in_str {
            Some(quote) => {
                current.push(c);
                if c == quote {
                    in_str = None;
                }
            }
            None => match c {
                '"' | '\'' => {
                    in_str = Some(c);
                    current.push(c);
                }
                '(' => {
                    depth += 1;
                    current.push(c);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                ',' if depth == 0 => {
                    let arg = current.trim();
                    if !arg.is_empty() {
                        args.push(arg.to_string());
                    }
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }
    let arg = current.trim();
    if !arg.is_empty() {
        args.push(arg.to_string());
    }
    args
}
