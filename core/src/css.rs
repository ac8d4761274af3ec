use itertools::Itertools;

use crate::{format_number, Expression, FluidRange, Result, Token, TokenError, TokenKind, TokenSet};

pub const CSS_BANNER: &str = "/**
 * Fluid design tokens
 * Auto-generated - do not edit directly
 */
";

/// The `clamp()` rendering of a fluid range. Bounds are rounded to the build
/// precision before rendering, the same rounding the discrete export applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampExpr {
    range: FluidRange,
    precision: u32,
}
impl ClampExpr {
    pub fn new(range: FluidRange, precision: u32) -> Self {
        Self { range, precision }
    }

    pub fn to_css(&self) -> String {
        let n = |value: f64| format_number(value, self.precision);
        let FluidRange {
            min_width,
            max_width,
            min_size,
            max_size,
        } = self.range;
        format!(
            "clamp({lo}px, {min}px + ({max} - {min}) * ((100vw - {min_w}px) / ({max_w} - {min_w})), {hi}px)",
            lo = n(self.range.lower_size()),
            hi = n(self.range.upper_size()),
            min = n(min_size),
            max = n(max_size),
            min_w = n(min_width),
            max_w = n(max_width),
        )
    }

    /// What a browser computes for [`ClampExpr::to_css`] when `100vw` is
    /// `viewport` pixels.
    pub fn evaluate_at(&self, viewport: f64) -> f64 {
        let n = |value: f64| crate::round_to(value, self.precision);
        let (min_w, max_w) = (n(self.range.min_width), n(self.range.max_width));
        let (min, max) = (n(self.range.min_size), n(self.range.max_size));
        let preferred = min + (max - min) * ((viewport - min_w) / (max_w - min_w));
        preferred
            .min(n(self.range.upper_size()))
            .max(n(self.range.lower_size()))
    }
}

impl TokenSet {
    /// `:root` declarations for every token, then one mobile-first media query
    /// per wider breakpoint carrying the responsive overrides.
    pub fn to_css(&self) -> Result<String> {
        let root = self
            .tokens()
            .map(|token| Ok(format!("  {}: {};", token.property, self.css_value(token)?)))
            .collect::<Result<Vec<_>>>()?
            .join("\n");
        let mut css = format!("{CSS_BANNER}\n:root {{\n{root}\n}}\n");
        for breakpoint in self.breakpoints().iter().skip(1) {
            let overrides = self
                .tokens()
                .filter_map(|token| match &token.kind {
                    TokenKind::Responsive(values) => values.get(&breakpoint.name).map(|value| {
                        format!("    {}: {};", token.property, self.px(*value))
                    }),
                    _ => None,
                })
                .join("\n");
            if overrides.is_empty() {
                continue;
            }
            css += &format!(
                "\n@media (min-width: {}px) {{\n  :root {{\n{overrides}\n  }}\n}}\n",
                breakpoint.viewport_width
            );
        }
        Ok(css)
    }

    /// Value of the token's `:root` declaration.
    pub fn css_value(&self, token: &Token) -> Result<String> {
        match &token.kind {
            TokenKind::Fixed(expr) => self.expression_css(expr, token),
            TokenKind::Fluid(range) => Ok(ClampExpr::new(*range, self.options().precision).to_css()),
            TokenKind::Responsive(values) => {
                let narrowest = &self.breakpoints().narrowest().name;
                values
                    .get(narrowest)
                    .map(|value| self.px(*value))
                    .ok_or_else(|| TokenError::MissingBreakpointValue {
                        token: token.key(),
                        breakpoint: narrowest.clone(),
                    })
            }
        }
    }

    fn expression_css(&self, expr: &Expression, token: &Token) -> Result<String> {
        Ok(match expr {
            Expression::Ref(path) => {
                let target = self.resolve_ref(path).ok_or_else(|| {
                    TokenError::invalid(token.key(), format!("unresolved reference {expr}"))
                })?;
                format!("var({})", target.property)
            }
            Expression::Mul(a, b) => format!(
                "calc({} * {})",
                self.expression_css(a, token)?,
                self.expression_css(b, token)?
            ),
            Expression::Div(a, b) => format!(
                "calc({} / {})",
                self.expression_css(a, token)?,
                self.expression_css(b, token)?
            ),
            Expression::Dimension { .. } | Expression::Literal(_) => expr.to_string(),
        })
    }

    fn px(&self, value: f64) -> String {
        format!("{}px", format_number(value, self.options().precision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Options;

    fn load(json: &str) -> TokenSet {
        TokenSet::from_sources([("test.json", json)], Options::default()).unwrap()
    }

    #[test]
    fn fluid_renders_clamp() {
        let clamp = ClampExpr::new(FluidRange::new(320.0, 1240.0, 18.0, 20.0), 2);
        assert_eq!(
            clamp.to_css(),
            "clamp(18px, 18px + (20 - 18) * ((100vw - 320px) / (1240 - 320)), 20px)"
        );
        let clamp = ClampExpr::new(FluidRange::new(320.0, 1240.0, 12.5, 12.8), 2);
        assert_eq!(
            clamp.to_css(),
            "clamp(12.5px, 12.5px + (12.8 - 12.5) * ((100vw - 320px) / (1240 - 320)), 12.8px)"
        );
    }

    #[test]
    fn negative_slope_keeps_bounds_ordered() {
        let clamp = ClampExpr::new(FluidRange::new(320.0, 1240.0, 24.0, 16.0), 2);
        assert_eq!(
            clamp.to_css(),
            "clamp(16px, 24px + (16 - 24) * ((100vw - 320px) / (1240 - 320)), 24px)"
        );
        assert_eq!(clamp.evaluate_at(320.0), 24.0);
        assert_eq!(clamp.evaluate_at(1240.0), 16.0);
        assert_eq!(clamp.evaluate_at(2000.0), 16.0);
    }

    #[test]
    fn clamp_matches_bounds_at_range_edges() {
        let range = FluidRange::new(320.0, 1240.0, 21.6, 25.0);
        let clamp = ClampExpr::new(range, 2);
        assert!((clamp.evaluate_at(range.min_width) - range.min_size).abs() < 1e-9);
        assert!((clamp.evaluate_at(range.max_width) - range.max_size).abs() < 1e-9);
        assert_eq!(clamp.evaluate_at(0.0), 21.6);
        assert_eq!(clamp.evaluate_at(5000.0), 25.0);
    }

    #[test]
    fn clamp_agrees_with_discrete_samples() {
        let tokens = crate::bundled_tokens().unwrap();
        let mut checked = 0;
        for token in tokens.tokens() {
            let TokenKind::Fluid(range) = &token.kind else {
                continue;
            };
            let clamp = ClampExpr::new(*range, tokens.options().precision);
            for (breakpoint, value) in tokens.breakpoints().iter().zip(tokens.sample(token).unwrap().values()) {
                let css = clamp.evaluate_at(breakpoint.viewport_width as f64);
                let discrete = value.as_number().unwrap();
                assert!(
                    (css - discrete).abs() <= 0.005 + 1e-9,
                    "{} at {}: css {css}, discrete {discrete}",
                    token.key(),
                    breakpoint.name
                );
                checked += 1;
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn stylesheet() {
        let tokens = load(
            r#"{
                "fontSizes": { "base": { "fluid": { "minWidth": 320, "maxWidth": 1240, "minSize": 18, "maxSize": 20 } } },
                "spacing": {
                    "sm": { "responsive": { "phone": 4, "tablet": 6, "desktop": 8 } },
                    "none": { "value": "0px" },
                    "gutter": { "value": "{spacing.sm}" },
                    "section": { "value": "{spacing.sm} * 2" }
                },
                "fontWeights": { "bold": { "value": 700 } }
            }"#,
        );
        let expected = format!(
            "{CSS_BANNER}
:root {{
  --font-sizes-base: clamp(18px, 18px + (20 - 18) * ((100vw - 320px) / (1240 - 320)), 20px);
  --spacing-sm: 4px;
  --spacing-none: 0px;
  --spacing-gutter: var(--spacing-sm);
  --spacing-section: calc(var(--spacing-sm) * 2);
  --font-weights-bold: 700;
}}

@media (min-width: 768px) {{
  :root {{
    --spacing-sm: 6px;
  }}
}}

@media (min-width: 1240px) {{
  :root {{
    --spacing-sm: 8px;
  }}
}}
"
        );
        assert_eq!(tokens.to_css().unwrap(), expected);
    }

    #[test]
    fn no_media_queries_without_responsive_tokens() {
        let tokens = load(r#"{ "spacing": { "none": { "value": "0px" } } }"#);
        let css = tokens.to_css().unwrap();
        assert!(!css.contains("@media"));
        assert!(css.starts_with(CSS_BANNER));
    }
}
