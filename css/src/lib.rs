//! The bundled design tokens as a ready-made stylesheet.

pub const CSS: &str = include_str!(concat!(env!("OUT_DIR"), "/tokens.css"));

#[test]
fn test() {
    assert!(CSS.contains(":root {"));
    assert!(CSS.contains("--font-sizes-base: clamp(18px, "));
    assert!(CSS.contains("@media (min-width: 768px)"));
    assert!(CSS.contains("--spacing-gutter: var(--spacing-md);"));
}
