use convert_case::{Case, Casing};

/// Flattens a category or token name into a lowercase, hyphen separated
/// identifier. Every uppercase ASCII letter opens a new segment, so runs of
/// capitals split letter by letter (`fontXL` -> `font-x-l`). Non-ASCII text is
/// transliterated first; any other character acts as a separator. Leading
/// digits are kept. May return an empty string.
pub fn identifier(s: &str) -> String {
    let ascii = deunicode::deunicode(s);
    let mut out = String::with_capacity(ascii.len() + 4);
    let mut pending_separator = false;
    for c in ascii.chars() {
        if c.is_ascii_uppercase() {
            pending_separator = true;
        }
        if c.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    out
}

/// `--<category>-<name>`, or `None` when either part has no identifier characters.
pub fn css_property(category: &str, name: &str) -> Option<String> {
    let category = identifier(category);
    let name = identifier(name);
    if category.is_empty() || name.is_empty() {
        return None;
    }
    Some(format!("--{category}-{name}"))
}

/// `UPPER_SNAKE` constant name for a generated Rust item.
pub fn rust_const(category: &str, name: &str) -> String {
    let flat = format!("{}-{}", identifier(category), identifier(name))
        .from_case(Case::Kebab)
        .to_case(Case::UpperSnake);
    escape_leading_digit(flat)
}

/// `snake_case` module name for a generated Rust item.
pub fn rust_module(name: &str) -> String {
    escape_leading_digit(identifier(name).from_case(Case::Kebab).to_case(Case::Snake))
}

fn escape_leading_digit(s: String) -> String {
    match s.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{s}"),
        _ => s,
    }
}
