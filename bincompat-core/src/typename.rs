//! Type name helpers shared by the query language and the printer.
//!
//! Query strings use C#-style short names (`int`, `List<string>`), while module
//! metadata uses CLR full names (`System.Int32`, ``List`1<System.String>``).
//! This module converts between the two.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static SHORT_TO_FULL: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("bool", "System.Boolean"),
        ("byte", "System.Byte"),
        ("sbyte", "System.SByte"),
        ("char", "System.Char"),
        ("decimal", "System.Decimal"),
        ("double", "System.Double"),
        ("float", "System.Single"),
        ("int", "System.Int32"),
        ("uint", "System.UInt32"),
        ("long", "System.Int64"),
        ("ulong", "System.UInt64"),
        ("object", "System.Object"),
        ("short", "System.Int16"),
        ("ushort", "System.UInt16"),
        ("string", "System.String"),
        ("", "System.Void"),
        ("void", "System.Void"),
        ("Bool", "System.Boolean"),
        ("Byte", "System.Byte"),
        ("SByte", "System.SByte"),
        ("Char", "System.Char"),
        ("Decimal", "System.Decimal"),
        ("Double", "System.Double"),
        ("Single", "System.Single"),
        ("Int32", "System.Int32"),
        ("UInt32", "System.UInt32"),
        ("Int64", "System.Int64"),
        ("UInt64", "System.UInt64"),
        ("Object", "System.Object"),
        ("Int16", "System.Int16"),
        ("UInt16", "System.UInt16"),
        ("String", "System.String"),
        ("Void", "System.Void"),
    ])
});

static FULL_TO_SHORT: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("System.Boolean", "bool"),
        ("System.Byte", "byte"),
        ("System.SByte", "sbyte"),
        ("System.Char", "char"),
        ("System.Decimal", "decimal"),
        ("System.Double", "double"),
        ("System.Single", "float"),
        ("System.Int32", "int"),
        ("System.UInt32", "uint"),
        ("System.Int64", "long"),
        ("System.UInt64", "ulong"),
        ("System.Object", "object"),
        ("System.Int16", "short"),
        ("System.UInt16", "ushort"),
        ("System.String", "string"),
        ("System.Void", "void"),
        ("Boolean", "bool"),
        ("Byte", "byte"),
        ("SByte", "sbyte"),
        ("Char", "char"),
        ("Decimal", "decimal"),
        ("Double", "double"),
        ("Single", "float"),
        ("Int32", "int"),
        ("UInt32", "uint"),
        ("Int64", "long"),
        ("UInt64", "ulong"),
        ("Object", "object"),
        ("Int16", "short"),
        ("UInt16", "ushort"),
        ("String", "string"),
        ("Void", "void"),
    ])
});

/// Split a trailing array/pointer/by-ref decoration (`[]`, `[,]`, `*`, `&`) off a name.
pub(crate) fn split_type_suffix(name: &str) -> (&str, &str) {
    let idx = name
        .find(|c| c == '[' || c == '&' || c == '*')
        .unwrap_or(name.len());
    name.split_at(idx)
}

fn map_alias(name: &str, table: &HashMap<&'static str, &'static str>) -> String {
    if let Some(mapped) = table.get(name) {
        return (*mapped).to_string();
    }
    let (base, suffix) = split_type_suffix(name);
    if !suffix.is_empty() && !base.is_empty() {
        if let Some(mapped) = table.get(base) {
            return format!("{}{}", mapped, suffix);
        }
    }
    name.to_string()
}

/// Map a C# keyword or bare CLR name to its full CLR name (`int` -> `System.Int32`).
///
/// Unknown names are returned unchanged. Array and by-ref decorations are kept.
pub fn short_to_full(short: &str) -> String {
    map_alias(short, &SHORT_TO_FULL)
}

/// Map a CLR full name to its C# keyword (`System.Int32` -> `int`).
pub fn full_to_short(full: &str) -> String {
    map_alias(full, &FULL_TO_SHORT)
}

/// Strip the generic arity marker from a metadata name (``List`1`` -> `List`).
pub fn strip_arity(name: &str) -> &str {
    name.split('`').next().unwrap_or(name)
}

/// Split `input` on `sep` where it is not nested inside `<...>`.
pub(crate) fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, c) in input.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Find the `>` closing the `<` at byte offset `open`.
pub(crate) fn matching_angle(input: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (idx, c) in input[open..].char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// A generic type name as written in a query, e.g. `Dictionary<string, List<int>>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericName {
    pub name: String,
    pub arguments: Vec<GenericName>,
    /// Decoration after the closing `>`, e.g. `[]`.
    pub suffix: String,
}

impl GenericName {
    fn leaf(name: &str) -> Self {
        Self {
            name: short_to_full(name),
            arguments: Vec::new(),
            suffix: String::new(),
        }
    }

    /// Parse a space-free generic name. Returns `None` if there is no `<`.
    ///
    /// The root name keeps its spelling (minus any arity marker); leaf
    /// arguments are mapped through [`short_to_full`].
    pub fn parse(normalized: &str) -> Option<Self> {
        let open = normalized.find('<')?;
        let close = matching_angle(normalized, open).unwrap_or(normalized.len());
        let inner_end = close.min(normalized.len());
        let inner = &normalized[open + 1..inner_end];

        let arguments = split_top_level(inner, ',')
            .into_iter()
            .filter(|arg| !arg.is_empty())
            .map(|arg| Self::parse(arg).unwrap_or_else(|| Self::leaf(arg)))
            .collect();

        let suffix = if close < normalized.len() {
            normalized[close + 1..].to_string()
        } else {
            String::new()
        };

        Some(Self {
            name: strip_arity(&normalized[..open]).to_string(),
            arguments,
            suffix,
        })
    }

    /// Apply `f` to this name and every argument name, depth first.
    pub fn map_names(&mut self, f: &impl Fn(&str) -> String) {
        self.name = f(&self.name);
        for arg in &mut self.arguments {
            arg.map_names(f);
        }
    }

    /// Render in metadata form: ``Name`N<Arg1,Arg2>``.
    pub fn format(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push_str(&self.name);
        if !self.arguments.is_empty() {
            out.push('`');
            out.push_str(&self.arguments.len().to_string());
            out.push('<');
            for (i, arg) in self.arguments.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                arg.write_to(out);
            }
            out.push('>');
        }
        out.push_str(&self.suffix);
    }
}

/// Convert a query type name to metadata spelling.
///
/// `int` becomes `System.Int32`; `List<string>` becomes ``List`1<System.String>``.
pub fn expand_generic_names(type_name: &str) -> String {
    if type_name.is_empty() {
        return type_name.to_string();
    }
    if !type_name.contains('<') {
        return short_to_full(type_name);
    }
    let normalized = type_name.replace(' ', "");
    match GenericName::parse(&normalized) {
        Some(generic) => generic.format(),
        None => normalized,
    }
}

/// Expand generics and rewrite every contained type name with `f`.
pub fn transform_generic_names(type_name: &str, f: impl Fn(&str) -> String) -> String {
    if type_name.is_empty() {
        return type_name.to_string();
    }
    let normalized = type_name.replace(' ', "");
    match GenericName::parse(&normalized) {
        Some(mut generic) => {
            generic.map_names(&f);
            generic.format()
        }
        None => normalized,
    }
}
