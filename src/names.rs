//! Display names for heap types.
//!
//! Raw type names from managed runtimes are long
//! (`System.Collections.Generic.Dictionary<System.String, App.Orders.Order>`),
//! and the synthetic root categories use bracketed markers. This module
//! shortens them for presentation. Display names are presentation only and
//! must never serve as aggregation or join keys, since two distinct raw names
//! may format identically.

use std::collections::HashMap;

/// Reserved root-category names and their fixed display forms.
const SPECIAL_NAMES: &[(&str, &str)] = &[
    ("[.NET Roots]", "[GC Root]"),
    ("[static vars]", "[Static Fields]"),
    ("[pinned handles]", "[Pinned]"),
    ("[finalizer handles]", "[Finalizer Queue]"),
    ("[strong handles]", "[Strong Handles]"),
    ("[weak handles]", "[Weak References]"),
    ("[other roots]", "[Other Roots]"),
];

/// Shortens raw type names for display.
///
/// Namespaces are stripped down to the final segment when that segment is
/// unambiguous among the snapshot's type names; ambiguous names keep their
/// last two segments (`System.*` names keep only the type name). Generic
/// arguments inside `<…>` are simplified recursively by the same rule.
///
/// All display names are computed in one pass at construction and cached per
/// raw name; lookups never allocate.
#[derive(Debug, Clone)]
pub struct TypeNameFormatter {
    display: HashMap<String, String>,
}

impl TypeNameFormatter {
    /// Builds the formatter from every type name observed in a snapshot.
    pub fn new<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        // Distinct type handles may share one raw name; a name must not
        // compete with itself for its final segment.
        let mut names: Vec<&str> = names.into_iter().collect();
        names.sort_unstable();
        names.dedup();

        let mut segment_counts: HashMap<&str, usize> = HashMap::new();
        for &name in &names {
            if let Some(segment) = final_segment(name) {
                *segment_counts.entry(segment).or_default() += 1;
            }
        }

        let mut display = HashMap::with_capacity(names.len());
        for name in names {
            display.insert(name.to_string(), format_name(name, &segment_counts));
        }
        Self { display }
    }

    /// The cached display name, falling back to the raw name for types the
    /// formatter has not seen.
    pub fn display_name<'a>(&'a self, raw: &'a str) -> &'a str {
        self.display.get(raw).map(String::as_str).unwrap_or(raw)
    }
}

/// The final namespace segment of a plain type name, used for ambiguity
/// counting. Bracketed special names do not participate.
fn final_segment(name: &str) -> Option<&str> {
    if name.starts_with('[') {
        return None;
    }
    let core = name.split('<').next().unwrap_or(name);
    core.rsplit('.').next()
}

fn format_name(raw: &str, counts: &HashMap<&str, usize>) -> String {
    for &(special, fixed) in SPECIAL_NAMES {
        if raw == special {
            return fixed.to_string();
        }
    }
    if let Some(var_path) = raw
        .strip_prefix("[static var ")
        .and_then(|rest| rest.strip_suffix(']'))
    {
        return format_static_var(var_path);
    }
    simplify(raw, counts)
}

/// `[static var X.Y.Z]` renders as the declaring type plus field: `Y.Z (static)`.
fn format_static_var(path: &str) -> String {
    let segments: Vec<&str> = path.split('.').collect();
    let tail = if segments.len() >= 2 {
        segments[segments.len() - 2..].join(".")
    } else {
        path.to_string()
    };
    format!("{tail} (static)")
}

fn simplify(name: &str, counts: &HashMap<&str, usize>) -> String {
    if let Some(open) = name.find('<') {
        if let Some(args) = name[open..].strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
            let base = simplify_plain(&name[..open], counts);
            let parts: Vec<String> = split_top_level(args)
                .into_iter()
                .map(|arg| simplify(arg.trim(), counts))
                .collect();
            return format!("{base}<{}>", parts.join(", "));
        }
    }
    simplify_plain(name, counts)
}

/// Applies the namespace-stripping rule to a name with no generic suffix.
fn simplify_plain(name: &str, counts: &HashMap<&str, usize>) -> String {
    let segments: Vec<&str> = name.split('.').collect();
    let last = segments[segments.len() - 1];
    // Names never observed in the snapshot (generic arguments of observed
    // names, typically) count as unambiguous.
    let ambiguous = counts.get(last).copied().unwrap_or(0) > 1;
    if !ambiguous || segments.len() < 2 || name.starts_with("System.") {
        return last.to_string();
    }
    segments[segments.len() - 2..].join(".")
}

/// Splits generic arguments on commas not nested inside `<…>`.
fn split_top_level(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in args.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&args[start..]);
    parts
}
