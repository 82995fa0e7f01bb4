use std::collections::HashSet;

use regex::Regex;

/// Avro type names an identifier may not collide with.
pub const RESERVED_TYPE_NAMES: &[&str] = &[
    "boolean", "int", "long", "float", "double", "bytes", "string", "null", "record", "enum",
    "array", "map", "union", "fixed",
];

/// Rewrite a raw XML name into a legal Avro identifier.
///
/// `.` and `-` become `_` (keeping their position); every other character
/// that is not an ASCII letter, digit, or underscore is dropped. A leading
/// digit gets an underscore prefix. The empty string stays empty.
pub fn sanitize(name: &str) -> String {
    let separated = Regex::new(r"[.\-]").unwrap().replace_all(name, "_");
    let mut val = Regex::new(r"[^A-Za-z0-9_]")
        .unwrap()
        .replace_all(&separated, "")
        .to_string();
    if val
        .chars()
        .next()
        .map(|c| c.is_ascii_digit())
        .unwrap_or(false)
    {
        val = format!("_{val}");
    }
    val
}

/// Whether a sanitized identifier collides with an Avro type name.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_TYPE_NAMES.contains(&name)
}

/// Hands out names that are unique within one scope (a record's fields, or
/// the schema-wide record/enum names).
///
/// The first claim of a name keeps it bare; later claims of the same name
/// get a numeric suffix `0`, `1`, … in claim order.
#[derive(Debug, Default)]
pub struct UniqueNames {
    used: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }
        let mut suffix = 0usize;
        loop {
            let candidate = format!("{base}{suffix}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
