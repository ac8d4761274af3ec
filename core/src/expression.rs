use std::fmt;

use itertools::Itertools;
use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer,
};

/// The `value` of a fixed token.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `{category.name}`
    Ref(Vec<String>),
    Mul(Box<Expression>, Box<Expression>),
    Div(Box<Expression>, Box<Expression>),
    /// A number with an optional unit: `4`, `4px`, `1.5rem`, `90%`.
    Dimension { value: f64, unit: Option<String> },
    /// Anything else, kept verbatim: `bold`, `Inter, sans-serif`.
    Literal(String),
}
impl Expression {
    pub fn parse(s: &str) -> Result<Expression, String> {
        expr_parser::expr(s).map_err(|err| format!("Invalid expression {s:?}: {err}"))
    }

    pub fn number(value: f64) -> Self {
        Expression::Dimension { value, unit: None }
    }
}
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Ref(path) => write!(f, "{{{}}}", path.iter().join(".")),
            Expression::Mul(a, b) => write!(f, "{a} * {b}"),
            Expression::Div(a, b) => write!(f, "{a} / {b}"),
            Expression::Dimension { value, unit } => {
                write!(f, "{value}{}", unit.as_deref().unwrap_or(""))
            }
            Expression::Literal(text) => f.write_str(text),
        }
    }
}

peg::parser! {
  grammar expr_parser() for str {
    rule _ = quiet!{[' ' | '\n' | '\t']*}

    rule number() -> f64
        = n:$("-"? (['0'..='9']+ ("." ['0'..='9']+)? / "." ['0'..='9']+)) {? n.parse().or(Err("number")) }

    rule unit() -> String
        = u:$(['a'..='z' | 'A'..='Z' | '%']+) { u.to_string() }

    rule operand_end() = &(_ ("*" / "/" / ![_]))

    pub(crate) rule expr() -> Expression = _ e:arith() _ { e }

    rule arith() -> Expression = precedence!{
        x:(@) _ "*" _ y:@ { Expression::Mul(Box::new(x), Box::new(y)) }
        x:(@) _ "/" _ y:@ { Expression::Div(Box::new(x), Box::new(y)) }
        --
        "{" v:($((!"}" !"." [_])+) ++ ".") "}" { Expression::Ref(v.iter().map(|x| x.trim().to_string()).collect()) }
        value:number() unit:unit()? operand_end() { Expression::Dimension { value, unit } }
        v:$((!['{' | '}' | '*' | '/'] [_])+) { Expression::Literal(v.trim().to_string()) }
    }
  }
}

struct ExpressionVisitor;

impl<'de> Visitor<'de> for ExpressionVisitor {
    type Value = Expression;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number or a token value expression")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Expression::parse(value).map_err(E::custom)
    }

    fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Expression::number(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Expression::number(value as f64))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Expression::number(value as f64))
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D>(deserializer: D) -> Result<Expression, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ExpressionVisitor)
    }
}

#[cfg(test)]
fn dim(value: f64, unit: &str) -> Expression {
    Expression::Dimension {
        value,
        unit: Some(unit.to_string()),
    }
}

#[test]
fn test() {
    assert_eq!(
        expr_parser::expr("{spacing.md}").unwrap(),
        Expression::Ref(vec!["spacing".to_string(), "md".to_string()])
    );
    assert_eq!(expr_parser::expr("4px").unwrap(), dim(4.0, "px"));
    assert_eq!(expr_parser::expr("1.5rem").unwrap(), dim(1.5, "rem"));
    assert_eq!(expr_parser::expr("90%").unwrap(), dim(90.0, "%"));
    assert_eq!(expr_parser::expr("-90%").unwrap(), dim(-90.0, "%"));
    assert_eq!(expr_parser::expr(".5em").unwrap(), dim(0.5, "em"));
    assert_eq!(
        expr_parser::expr("232.8300018310547").unwrap(),
        Expression::number(232.8300018310547)
    );
    assert_eq!(
        expr_parser::expr("ABC Diatype Variable").unwrap(),
        Expression::Literal("ABC Diatype Variable".to_string())
    );
    assert_eq!(
        expr_parser::expr("4px solid").unwrap(),
        Expression::Literal("4px solid".to_string())
    );
    assert_eq!(
        expr_parser::expr("{x} * {y}").unwrap(),
        Expression::Mul(
            Box::new(Expression::Ref(vec!["x".to_string()])),
            Box::new(Expression::Ref(vec!["y".to_string()])),
        )
    );
    assert_eq!(
        expr_parser::expr("{x}/5").unwrap(),
        Expression::Div(
            Box::new(Expression::Ref(vec!["x".to_string()])),
            Box::new(Expression::number(5.0)),
        )
    );
    assert!(expr_parser::expr("{unterminated").is_err());
}

#[test]
fn deserializes_numbers_and_strings() {
    let values: Vec<Expression> = serde_json::from_str(r#"[400, 1.25, -2, "8px"]"#).unwrap();
    assert_eq!(
        values,
        vec![
            Expression::number(400.0),
            Expression::number(1.25),
            Expression::number(-2.0),
            dim(8.0, "px"),
        ]
    );
}

#[test]
fn display() {
    let expr = Expression::parse("{spacing.sm} * {scale.ratio}").unwrap();
    assert_eq!(expr.to_string(), "{spacing.sm} * {scale.ratio}");
    assert_eq!(dim(1.5, "rem").to_string(), "1.5rem");
}
