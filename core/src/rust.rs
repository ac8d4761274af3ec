use std::collections::HashSet;

use itertools::Itertools;

use crate::{naming, Result, TokenError, TokenSet, TokenValue};

impl TokenSet {
    /// Rust source with the breakpoint table and one module per breakpoint
    /// holding a `const` per token.
    pub fn to_rust(&self) -> Result<String> {
        let table = self
            .breakpoints()
            .iter()
            .map(|breakpoint| format!("({:?}, {})", breakpoint.name, breakpoint.viewport_width))
            .join(", ");
        let mut modules = HashSet::new();
        let mut out = vec![format!(
            "pub const BREAKPOINTS: &[(&str, u32)] = &[{table}];"
        )];
        for breakpoint in self.breakpoints() {
            let module = naming::rust_module(&breakpoint.name);
            if module.is_empty() || !modules.insert(module.clone()) {
                return Err(TokenError::InvalidBreakpoints(format!(
                    "breakpoint {} does not map to a distinct Rust module name",
                    breakpoint.name
                )));
            }
            let consts = self
                .tokens()
                .map(|token| {
                    let name = naming::rust_const(&token.category, &token.name);
                    Ok(match self.value_at(token, breakpoint)? {
                        TokenValue::Number(value) => format!("pub const {name}: f64 = {value:?};"),
                        TokenValue::Text(text) => format!("pub const {name}: &str = {text:?};"),
                    })
                })
                .collect::<Result<Vec<_>>>()?
                .join("\n    ");
            out.push(format!("pub mod {module} {{\n    {consts}\n}}"));
        }
        Ok(out.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Breakpoint, Breakpoints, Options};

    #[test]
    fn generates_modules() {
        let tokens = TokenSet::from_sources(
            [(
                "test.json",
                r#"{
                    "fontSizes": { "base": { "fluid": { "minWidth": 320, "maxWidth": 1240, "minSize": 18, "maxSize": 20 } } },
                    "fontFamilies": { "body": { "value": "Inter, sans-serif" } }
                }"#,
            )],
            Options::default(),
        )
        .unwrap();
        let rust = tokens.to_rust().unwrap();
        assert!(rust.contains(
            r#"pub const BREAKPOINTS: &[(&str, u32)] = &[("phone", 320), ("tablet", 768), ("desktop", 1240)];"#
        ));
        assert!(rust.contains("pub mod phone {\n    pub const FONT_SIZES_BASE: f64 = 18.0;\n"));
        assert!(rust.contains("pub const FONT_SIZES_BASE: f64 = 18.97;"));
        assert!(rust.contains(r#"pub const FONT_FAMILIES_BODY: &str = "Inter, sans-serif";"#));
    }

    #[test]
    fn colliding_module_names() {
        let options = Options {
            breakpoints: Breakpoints::new(vec![
                Breakpoint::new("largeScreen", 320),
                Breakpoint::new("large screen", 768),
            ])
            .unwrap(),
            ..Options::default()
        };
        let tokens = TokenSet::from_sources(
            [("test.json", r#"{ "spacing": { "none": { "value": "0px" } } }"#)],
            options,
        )
        .unwrap();
        assert!(matches!(
            tokens.to_rust(),
            Err(TokenError::InvalidBreakpoints(_))
        ));
    }
}
