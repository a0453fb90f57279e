//! `_version.toml` reader and writer
//!
//! The declaration file is read with the TOML grammar and never evaluated:
//! only the `[version]` table is looked at, and it may only hold the keys a
//! [`Version`] is built from.
//!
//! ```toml
//! [version]
//! package = "widgetbox"
//! major = 1
//! minor = 2
//! micro = 3
//! release_candidate = 1
//! ```
//!
//! `major = "NEXT"` declares the placeholder version.

use indexmap::IndexMap;
use tracing::warn;

use crate::config::{NEXT_MARKER, VERSION_TABLE};
use crate::discovery::error::DiscoveryError;
use crate::version::error::VersionError;
use crate::version::value::{Major, Qualifiers, Version};

const KEYS: [&str; 7] = [
    "package",
    "major",
    "minor",
    "micro",
    "release_candidate",
    "post",
    "dev",
];

/// Parse the content of a declaration file into the declared version
pub fn parse_declaration(content: &str) -> Result<Version, DiscoveryError> {
    let mut parser = tree_sitter::Parser::new();
    let language = tree_sitter_toml_ng::LANGUAGE;
    parser.set_language(&language.into()).map_err(|e| {
        warn!("Failed to set TOML language for tree-sitter: {}", e);
        DiscoveryError::Syntax(e.to_string())
    })?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| DiscoveryError::Syntax("Failed to parse TOML".to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(DiscoveryError::Syntax(format!(
            "malformed TOML near line {}",
            first_error_line(root)
        )));
    }

    let table = find_version_table(root, content)?;
    let pairs = collect_pairs(table, content)?;

    let package = string_value(&pairs, "package", content)?;
    let major = major_value(&pairs, content)?;
    let minor = integer_value(&pairs, "minor", content)?;
    let micro = integer_value(&pairs, "micro", content)?;
    let qualifiers = Qualifiers {
        release_candidate: optional_integer(&pairs, "release_candidate", content)?,
        post: optional_integer(&pairs, "post", content)?,
        dev: optional_integer(&pairs, "dev", content)?,
    };

    Ok(Version::from_parts(package, major, minor, micro, qualifiers)?)
}

/// Render the auto-generated declaration file for `version`
pub fn render_declaration(version: &Version) -> String {
    let major = match version.major() {
        Major::Release(n) => n.to_string(),
        Major::Next => format!("\"{NEXT_MARKER}\""),
    };

    let mut out = format!(
        "# This file is auto-generated! Do not edit!\n\
         # Use `incremental update {escaped}` to change this file.\n\
         \n\
         [{VERSION_TABLE}]\n\
         package = \"{escaped}\"\n\
         major = {major}\n\
         minor = {minor}\n\
         micro = {micro}\n",
        escaped = escape(version.package()),
        minor = version.minor(),
        micro = version.micro(),
    );

    if let Some(rc) = version.release_candidate() {
        out.push_str(&format!("release_candidate = {rc}\n"));
    }
    if let Some(post) = version.post() {
        out.push_str(&format!("post = {post}\n"));
    }
    if let Some(dev) = version.dev() {
        out.push_str(&format!("dev = {dev}\n"));
    }
    out
}

fn first_error_line(node: tree_sitter::Node) -> usize {
    if node.is_error() || node.is_missing() {
        return node.start_position().row + 1;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            return first_error_line(child);
        }
    }
    node.start_position().row + 1
}

/// Find the single `[version]` table in the document
fn find_version_table<'tree>(
    root: tree_sitter::Node<'tree>,
    content: &str,
) -> Result<tree_sitter::Node<'tree>, DiscoveryError> {
    let mut cursor = root.walk();
    let mut found: Option<tree_sitter::Node<'tree>> = None;

    for child in root.children(&mut cursor) {
        if child.kind() != "table" {
            continue;
        }

        let Some(name) = table_name(child, content) else {
            continue;
        };
        if name != VERSION_TABLE {
            continue;
        }

        if found.is_some() {
            return Err(DiscoveryError::InvalidDeclaration(format!(
                "[{VERSION_TABLE}] declared more than once"
            )));
        }
        found = Some(child);
    }

    found.ok_or_else(|| DiscoveryError::MissingDeclaration(VERSION_TABLE.to_string()))
}

fn table_name(table_node: tree_sitter::Node, content: &str) -> Option<String> {
    let mut cursor = table_node.walk();

    for child in table_node.children(&mut cursor) {
        match child.kind() {
            "bare_key" | "dotted_key" => return Some(content[child.byte_range()].to_string()),
            "quoted_key" => return unquote(&content[child.byte_range()]).ok(),
            _ => {}
        }
    }
    None
}

/// Collect `key = value` pairs of the table, rejecting unknown and repeated keys
fn collect_pairs<'tree>(
    table_node: tree_sitter::Node<'tree>,
    content: &str,
) -> Result<IndexMap<String, tree_sitter::Node<'tree>>, DiscoveryError> {
    let mut pairs = IndexMap::new();
    let mut cursor = table_node.walk();

    for child in table_node.children(&mut cursor) {
        if child.kind() != "pair" {
            continue;
        }

        // A trailing `# comment` is a named child of the pair too
        let mut pair_cursor = child.walk();
        let mut parts = child
            .named_children(&mut pair_cursor)
            .filter(|node| node.kind() != "comment");
        let (Some(key_node), Some(value_node)) = (parts.next(), parts.next()) else {
            continue;
        };

        let raw_key = &content[key_node.byte_range()];
        let key = match key_node.kind() {
            "bare_key" => raw_key.to_string(),
            "quoted_key" => unquote(raw_key).map_err(DiscoveryError::InvalidDeclaration)?,
            _ => {
                return Err(DiscoveryError::InvalidDeclaration(format!(
                    "unexpected key {raw_key:?} on line {}",
                    key_node.start_position().row + 1
                )));
            }
        };

        if !KEYS.contains(&key.as_str()) {
            return Err(DiscoveryError::InvalidDeclaration(format!(
                "unknown key {key:?} on line {}",
                key_node.start_position().row + 1
            )));
        }
        if pairs.insert(key.clone(), value_node).is_some() {
            return Err(DiscoveryError::InvalidDeclaration(format!(
                "key {key:?} declared more than once"
            )));
        }
    }

    Ok(pairs)
}

fn required<'a, 'tree>(
    pairs: &'a IndexMap<String, tree_sitter::Node<'tree>>,
    key: &str,
) -> Result<&'a tree_sitter::Node<'tree>, DiscoveryError> {
    pairs
        .get(key)
        .ok_or_else(|| DiscoveryError::InvalidDeclaration(format!("missing key {key:?}")))
}

fn string_value(
    pairs: &IndexMap<String, tree_sitter::Node>,
    key: &str,
    content: &str,
) -> Result<String, DiscoveryError> {
    let node = required(pairs, key)?;
    if node.kind() != "string" {
        return Err(wrong_type(key, "a string", node.kind()));
    }
    unquote(&content[node.byte_range()]).map_err(DiscoveryError::InvalidDeclaration)
}

fn major_value(
    pairs: &IndexMap<String, tree_sitter::Node>,
    content: &str,
) -> Result<Major, DiscoveryError> {
    let node = required(pairs, "major")?;
    match node.kind() {
        "string" => {
            let text = unquote(&content[node.byte_range()])
                .map_err(DiscoveryError::InvalidDeclaration)?;
            if text == NEXT_MARKER {
                Ok(Major::Next)
            } else {
                Err(DiscoveryError::InvalidDeclaration(format!(
                    "major must be an integer or {NEXT_MARKER:?}, got {text:?}"
                )))
            }
        }
        "integer" => {
            let value = parse_integer(&content[node.byte_range()])?;
            let value = u64::try_from(value).map_err(|_| {
                VersionError::InvalidVersion(format!(
                    "major must be non-negative, got {value}"
                ))
            })?;
            Ok(Major::Release(value))
        }
        other => Err(wrong_type("major", "an integer", other)),
    }
}

fn integer_value(
    pairs: &IndexMap<String, tree_sitter::Node>,
    key: &str,
    content: &str,
) -> Result<i64, DiscoveryError> {
    let node = required(pairs, key)?;
    if node.kind() != "integer" {
        return Err(wrong_type(key, "an integer", node.kind()));
    }
    parse_integer(&content[node.byte_range()])
}

fn optional_integer(
    pairs: &IndexMap<String, tree_sitter::Node>,
    key: &str,
    content: &str,
) -> Result<Option<i64>, DiscoveryError> {
    if pairs.contains_key(key) {
        integer_value(pairs, key, content).map(Some)
    } else {
        Ok(None)
    }
}

fn wrong_type(key: &str, expected: &str, found: &str) -> DiscoveryError {
    DiscoveryError::InvalidDeclaration(format!("{key} must be {expected}, found {found}"))
}

/// TOML integers: optional sign, `_` separators, and `0x`/`0o`/`0b` prefixes
fn parse_integer(text: &str) -> Result<i64, DiscoveryError> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };

    let parsed = if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16)
    } else if let Some(oct) = digits.strip_prefix("0o") {
        i64::from_str_radix(oct, 8)
    } else if let Some(bin) = digits.strip_prefix("0b") {
        i64::from_str_radix(bin, 2)
    } else {
        digits.parse::<i64>()
    };

    parsed
        .map(|v| if negative { -v } else { v })
        .map_err(|e| DiscoveryError::InvalidDeclaration(format!("bad integer {text:?}: {e}")))
}

/// Strip the quotes of a TOML string, resolving escapes in basic strings
fn unquote(text: &str) -> Result<String, String> {
    let text = text.trim();

    if let Some(inner) = text
        .strip_prefix("'''")
        .and_then(|t| t.strip_suffix("'''"))
    {
        return Ok(inner.to_string());
    }
    if let Some(inner) = text
        .strip_prefix("\"\"\"")
        .and_then(|t| t.strip_suffix("\"\"\""))
    {
        return unescape(inner);
    }
    if let Some(inner) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        return Ok(inner.to_string());
    }
    if let Some(inner) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        return unescape(inner);
    }
    Err(format!("expected a quoted string, got {text}"))
}

fn unescape(inner: &str) -> Result<String, String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(u @ ('u' | 'U')) => {
                let len = if u == 'u' { 4 } else { 8 };
                let hex: String = chars.by_ref().take(len).collect();
                let ch = u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("invalid unicode escape \\{u}{hex}"))?;
                out.push(ch);
            }
            Some(other) => return Err(format!("unsupported escape \\{other}")),
            None => return Err("dangling backslash".to_string()),
        }
    }
    Ok(out)
}

/// Basic-string escaping; control characters never appear raw in the output
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}
