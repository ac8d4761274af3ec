use std::fmt;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Serialize, Serializer};

use crate::{round_to, Breakpoint, Expression, Result, Token, TokenError, TokenKind, TokenSet};

/// Resolved value of a token at one breakpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Number(f64),
    Text(String),
}
impl TokenValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            TokenValue::Number(value) => Some(*value),
            TokenValue::Text(_) => None,
        }
    }
}
impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Number(value) => write!(f, "{value}"),
            TokenValue::Text(text) => f.write_str(text),
        }
    }
}
/// Integral numbers serialize as JSON integers (`8`, not `8.0`).
impl Serialize for TokenValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TokenValue::Number(value) if value.fract() == 0.0 && value.abs() < 9.0e15 => {
                serializer.serialize_i64(*value as i64)
            }
            TokenValue::Number(value) => serializer.serialize_f64(*value),
            TokenValue::Text(text) => serializer.serialize_str(text),
        }
    }
}

/// Breakpoint name -> value, one entry per breakpoint, narrowest first.
pub type BreakpointValues = IndexMap<String, TokenValue>;

impl TokenSet {
    pub fn sample(&self, token: &Token) -> Result<BreakpointValues> {
        self.breakpoints()
            .iter()
            .map(|breakpoint| Ok((breakpoint.name.clone(), self.value_at(token, breakpoint)?)))
            .collect()
    }

    pub fn value_at(&self, token: &Token, breakpoint: &Breakpoint) -> Result<TokenValue> {
        self.value_at_inner(token, breakpoint, &mut Vec::new())
    }

    fn value_at_inner(
        &self,
        token: &Token,
        breakpoint: &Breakpoint,
        stack: &mut Vec<String>,
    ) -> Result<TokenValue> {
        let key = token.key();
        if stack.contains(&key) {
            let chain = stack.iter().chain([&key]).join(" -> ");
            return Err(TokenError::invalid(
                stack[0].clone(),
                format!("circular reference {chain}"),
            ));
        }
        let precision = self.options().precision;
        match &token.kind {
            TokenKind::Fluid(range) => {
                range.validate(&key)?;
                let value = range.evaluate(breakpoint.viewport_width as f64)?;
                Ok(TokenValue::Number(round_to(value, precision)))
            }
            TokenKind::Responsive(values) => values
                .get(&breakpoint.name)
                .map(|value| TokenValue::Number(round_to(*value, precision)))
                .ok_or_else(|| TokenError::MissingBreakpointValue {
                    token: key,
                    breakpoint: breakpoint.name.clone(),
                }),
            TokenKind::Fixed(expr) => {
                stack.push(key);
                let value = self.resolve(expr, breakpoint, stack);
                stack.pop();
                value
            }
        }
    }

    fn resolve(
        &self,
        expr: &Expression,
        breakpoint: &Breakpoint,
        stack: &mut Vec<String>,
    ) -> Result<TokenValue> {
        match expr {
            Expression::Ref(path) => {
                let target = self.resolve_ref(path).ok_or_else(|| {
                    TokenError::invalid(stack[0].clone(), format!("unresolved reference {expr}"))
                })?;
                self.value_at_inner(target, breakpoint, stack)
            }
            Expression::Mul(a, b) | Expression::Div(a, b) => {
                let lhs = self.resolve(a, breakpoint, stack)?.as_number();
                let rhs = self.resolve(b, breakpoint, stack)?.as_number();
                let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
                    return Err(TokenError::invalid(
                        stack[0].clone(),
                        format!("{expr} combines text with arithmetic"),
                    ));
                };
                let value = match expr {
                    Expression::Div(..) if rhs == 0.0 => {
                        return Err(TokenError::invalid(
                            stack[0].clone(),
                            format!("{expr} divides by zero"),
                        ))
                    }
                    Expression::Div(..) => lhs / rhs,
                    _ => lhs * rhs,
                };
                if !value.is_finite() {
                    return Err(TokenError::invalid(
                        stack[0].clone(),
                        format!("{expr} is not a finite number"),
                    ));
                }
                Ok(TokenValue::Number(round_to(value, self.options().precision)))
            }
            Expression::Dimension { value, .. } => Ok(TokenValue::Number(*value)),
            Expression::Literal(text) => Ok(TokenValue::Text(text.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Breakpoints, InvalidTokenPolicy, Options};

    fn load(json: &str) -> TokenSet {
        TokenSet::from_sources([("test.json", json)], Options::default()).unwrap()
    }

    fn numbers(values: &BreakpointValues) -> Vec<(&str, f64)> {
        values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_number().unwrap()))
            .collect()
    }

    #[test]
    fn fluid_at_canonical_breakpoints() {
        let tokens = load(
            r#"{ "fontSizes": { "base": { "fluid": { "minWidth": 320, "maxWidth": 1240, "minSize": 18, "maxSize": 20 } } } }"#,
        );
        let values = tokens.sample(tokens.get("fontSizes", "base").unwrap()).unwrap();
        // 768px is 448/920 of the way: 18 + 2 * 0.4869... = 18.97
        assert_eq!(
            numbers(&values),
            vec![("phone", 18.0), ("tablet", 18.97), ("desktop", 20.0)]
        );
    }

    #[test]
    fn responsive_is_not_interpolated() {
        let tokens = load(
            r#"{ "spacing": { "sm": { "responsive": { "phone": 4, "tablet": 6, "desktop": 8 } } } }"#,
        );
        let values = tokens.sample(tokens.get("spacing", "sm").unwrap()).unwrap();
        assert_eq!(
            numbers(&values),
            vec![("phone", 4.0), ("tablet", 6.0), ("desktop", 8.0)]
        );
    }

    #[test]
    fn fixed_is_constant() {
        let tokens = load(
            r#"{ "spacing": { "none": { "value": "0px" } }, "fontFamilies": { "body": { "value": "Inter, sans-serif" } } }"#,
        );
        let values = tokens.sample(tokens.get("spacing", "none").unwrap()).unwrap();
        assert!(values.values().all(|v| *v == TokenValue::Number(0.0)));
        assert_eq!(values.len(), 3);
        let values = tokens
            .sample(tokens.get("fontFamilies", "body").unwrap())
            .unwrap();
        assert!(values
            .values()
            .all(|v| *v == TokenValue::Text("Inter, sans-serif".to_string())));
    }

    #[test]
    fn references_follow_their_target() {
        let tokens = load(
            r#"{ "spacing": {
                "sm": { "responsive": { "phone": 4, "tablet": 6, "desktop": 8 } },
                "gutter": { "value": "{spacing.sm}" },
                "section": { "value": "{spacing.gutter} * 1.5" },
                "half": { "value": "{spacing.sm} / 2" }
            } }"#,
        );
        let sample = |name| numbers(&tokens.sample(tokens.get("spacing", name).unwrap()).unwrap())
            .into_iter()
            .map(|(_, v)| v)
            .collect::<Vec<_>>();
        assert_eq!(sample("gutter"), vec![4.0, 6.0, 8.0]);
        assert_eq!(sample("section"), vec![6.0, 9.0, 12.0]);
        assert_eq!(sample("half"), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn circular_references_are_invalid() {
        let err = TokenSet::from_sources(
            [(
                "test.json",
                r#"{ "spacing": { "a": { "value": "{spacing.b}" }, "b": { "value": "{spacing.a}" } } }"#,
            )],
            Options::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("circular reference"));
    }

    #[test]
    fn unresolved_and_arithmetic_errors() {
        for json in [
            r#"{ "spacing": { "a": { "value": "{spacing.missing}" } } }"#,
            r#"{ "spacing": { "a": { "value": "bold * 2" } } }"#,
            r#"{ "spacing": { "a": { "value": "8px / 0" } } }"#,
        ] {
            let err = TokenSet::from_sources([("test.json", json)], Options::default())
                .unwrap_err();
            assert!(
                matches!(err, TokenError::InvalidDescriptor { ref token, .. } if token == "spacing/a"),
                "{json}: {err}"
            );
        }
    }

    #[test]
    fn custom_breakpoints_are_injected() {
        let options = Options {
            breakpoints: Breakpoints::new(vec![
                Breakpoint::new("small", 400),
                Breakpoint::new("large", 1400),
            ])
            .unwrap(),
            precision: 1,
            on_invalid: InvalidTokenPolicy::Abort,
        };
        let tokens = TokenSet::from_sources(
            [(
                "test.json",
                r#"{
                    "fontSizes": { "base": { "fluid": { "minWidth": 320, "maxWidth": 1240, "minSize": 18, "maxSize": 20 } } },
                    "spacing": { "sm": { "responsive": { "small": 4, "large": 8 } } }
                }"#,
            )],
            options,
        )
        .unwrap();
        let base = tokens.sample(tokens.get("fontSizes", "base").unwrap()).unwrap();
        // 400px is 80/920 of the way: 18.17, rounded to one place
        assert_eq!(numbers(&base), vec![("small", 18.2), ("large", 20.0)]);
        let sm = tokens.sample(tokens.get("spacing", "sm").unwrap()).unwrap();
        assert_eq!(numbers(&sm), vec![("small", 4.0), ("large", 8.0)]);
    }

    #[test]
    fn sampling_is_deterministic() {
        let tokens = crate::bundled_tokens().unwrap();
        for token in tokens.tokens() {
            let first = tokens.sample(token).unwrap();
            let second = tokens.sample(token).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.len(), tokens.breakpoints().len());
        }
    }

    #[test]
    fn integral_numbers_serialize_as_integers() {
        let values = vec![
            TokenValue::Number(8.0),
            TokenValue::Number(18.97),
            TokenValue::Text("bold".to_string()),
        ];
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"[8,18.97,"bold"]"#
        );
    }
}
