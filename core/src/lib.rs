use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod breakpoint;
mod css;
mod error;
mod export;
mod expression;
mod fluid;
pub mod naming;
mod rust;
mod sample;

pub use breakpoint::{Breakpoint, Breakpoints};
pub use css::{ClampExpr, CSS_BANNER};
pub use error::{Result, TokenError};
pub use export::{BreakpointExport, DiscreteExport, ExportRecord, ExportType, PluginExport};
pub use expression::Expression;
pub use fluid::{format_number, round_to, FluidRange, MAX_PRECISION};
pub use sample::{BreakpointValues, TokenValue};

/// The token sources shipped with this repository, as `(name, contents)`.
pub fn bundled_sources() -> [(&'static str, &'static str); 2] {
    [
        (
            "tokens/typography/font-sizes.json",
            include_str!("../../tokens/typography/font-sizes.json"),
        ),
        (
            "tokens/spacing/spacing.json",
            include_str!("../../tokens/spacing/spacing.json"),
        ),
    ]
}

pub fn bundled_tokens() -> Result<TokenSet> {
    TokenSet::from_sources(bundled_sources(), Options::default())
}

/// What to do with a token whose descriptor is invalid or incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidTokenPolicy {
    /// Fail the whole build.
    #[default]
    Abort,
    /// Drop the token and log a warning.
    Skip,
}
impl InvalidTokenPolicy {
    fn handle(self, token: &str, err: TokenError) -> Result<()> {
        match self {
            InvalidTokenPolicy::Skip if err.is_token_scoped() => {
                tracing::warn!(token, error = %err, "skipping invalid token");
                Ok(())
            }
            _ => Err(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub breakpoints: Breakpoints,
    /// Decimal places kept by computed values, on every output path.
    pub precision: u32,
    pub on_invalid: InvalidTokenPolicy,
}
impl Default for Options {
    fn default() -> Self {
        Self {
            breakpoints: Breakpoints::canonical(),
            precision: 2,
            on_invalid: InvalidTokenPolicy::Abort,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum TokenType {
    #[serde(rename = "fontSizes", alias = "fontSize")]
    FontSizes,
    #[serde(rename = "spacing")]
    Spacing,
    #[serde(rename = "dimension")]
    Dimension,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Fixed(Expression),
    Fluid(FluidRange),
    Responsive(IndexMap<String, f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub category: String,
    pub name: String,
    pub kind: TokenKind,
    pub type_: Option<TokenType>,
    pub description: Option<String>,
    /// Derived CSS custom property, `--<category>-<name>`.
    pub property: String,
}
impl Token {
    /// `category/name`, the key shared by every JSON artifact.
    pub fn key(&self) -> String {
        token_key(&self.category, &self.name)
    }

    fn from_raw(category: &str, name: &str, raw: Value, options: &Options) -> Result<Self> {
        let key = token_key(category, name);
        let raw = RawToken::deserialize(raw)
            .map_err(|err| TokenError::invalid(&key, err.to_string()))?;
        let RawToken {
            value,
            fluid,
            responsive,
            type_,
            description,
        } = raw;
        let kind = match (value, fluid, responsive) {
            (None, None, None) => {
                return Err(TokenError::invalid(
                    key,
                    "one of value, fluid or responsive is required",
                ))
            }
            (Some(value), None, None) => TokenKind::Fixed(
                Expression::deserialize(value)
                    .map_err(|err| TokenError::invalid(&key, format!("value: {err}")))?,
            ),
            (None, Some(fluid), None) => {
                let range = FluidRange::deserialize(fluid)
                    .map_err(|err| TokenError::invalid(&key, format!("fluid: {err}")))?;
                range.validate(&key)?;
                TokenKind::Fluid(range)
            }
            (None, None, Some(responsive)) => {
                let values = IndexMap::<String, f64>::deserialize(responsive)
                    .map_err(|err| TokenError::invalid(&key, format!("responsive: {err}")))?;
                validate_responsive(&key, &values, &options.breakpoints)?;
                TokenKind::Responsive(values)
            }
            (value, fluid, responsive) => {
                let present = [
                    ("value", value.is_some()),
                    ("fluid", fluid.is_some()),
                    ("responsive", responsive.is_some()),
                ]
                .into_iter()
                .filter_map(|(field, present)| present.then_some(field))
                .join(", ");
                return Err(TokenError::invalid(
                    key,
                    format!("only one of {present} may be set"),
                ));
            }
        };
        let property = naming::css_property(category, name).ok_or_else(|| {
            TokenError::invalid(&key, "name has no characters usable in a CSS property")
        })?;
        Ok(Token {
            category: category.to_string(),
            name: name.to_string(),
            kind,
            type_,
            description,
            property,
        })
    }
}

fn validate_responsive(
    key: &str,
    values: &IndexMap<String, f64>,
    breakpoints: &Breakpoints,
) -> Result<()> {
    if let Some((breakpoint, value)) = values.iter().find(|(_, value)| !value.is_finite()) {
        return Err(TokenError::invalid(
            key,
            format!("responsive.{breakpoint} is not a finite number ({value})"),
        ));
    }
    if let Some(missing) = breakpoints.iter().find(|b| !values.contains_key(&b.name)) {
        return Err(TokenError::MissingBreakpointValue {
            token: key.to_string(),
            breakpoint: missing.name.clone(),
        });
    }
    for unknown in values.keys().filter(|name| !breakpoints.contains(name)) {
        tracing::warn!(token = key, breakpoint = %unknown, "ignoring value for unknown breakpoint");
    }
    Ok(())
}

fn token_key(category: &str, name: &str) -> String {
    format!("{category}/{name}")
}

/// A token descriptor as written in a source file. Fields are kept as raw JSON
/// so that a malformed field is reported against its token.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawToken {
    #[serde(alias = "$value")]
    value: Option<Value>,
    fluid: Option<Value>,
    responsive: Option<Value>,
    #[serde(rename = "type", alias = "$type")]
    type_: Option<TokenType>,
    #[serde(alias = "$description")]
    description: Option<String>,
}

const FLUID_FIELDS: [&str; 4] = ["minWidth", "maxWidth", "minSize", "maxSize"];

/// A node of a source file, told apart by shape rather than field names: groups
/// only ever hold objects, so any scalar member marks a descriptor, and
/// otherwise a kind field must hold a descriptor-shaped object.
enum TokenOrGroup {
    Token(Value),
    Group(Map<String, Value>),
}
impl From<Value> for TokenOrGroup {
    fn from(node: Value) -> Self {
        match node {
            Value::Object(members) if !is_descriptor(&members) => TokenOrGroup::Group(members),
            other => TokenOrGroup::Token(other),
        }
    }
}
impl TokenOrGroup {
    fn flatten(self, path: &mut Vec<String>, out: &mut Vec<(Vec<String>, Value)>) {
        match self {
            TokenOrGroup::Token(raw) => out.push((path.clone(), raw)),
            TokenOrGroup::Group(group) => {
                for (key, value) in group {
                    path.push(key);
                    TokenOrGroup::from(value).flatten(path, out);
                    path.pop();
                }
            }
        }
    }
}

fn is_descriptor(members: &Map<String, Value>) -> bool {
    members.iter().any(|(field, member)| match (field.as_str(), member) {
        (_, member) if !member.is_object() => true,
        ("fluid", Value::Object(range)) => FLUID_FIELDS.iter().any(|f| range.contains_key(*f)),
        ("responsive", Value::Object(values)) => {
            !values.is_empty() && values.values().all(|value| !value.is_object())
        }
        _ => false,
    })
}

/// One parsed token source: category -> token name (or nested group) -> descriptor.
#[derive(Debug)]
pub struct TokenFile {
    pub name: String,
    groups: IndexMap<String, Value>,
}
impl TokenFile {
    pub fn parse(name: &str, contents: &str) -> Result<Self> {
        let groups = serde_json::from_str(contents).map_err(|error| TokenError::Parse {
            source_name: name.to_string(),
            error,
        })?;
        Ok(TokenFile {
            name: name.to_string(),
            groups,
        })
    }

    /// `(category, name, descriptor)` in file order; nested groups below the
    /// category are joined into the name with `-`.
    fn into_descriptors(self) -> Vec<(String, String, Value)> {
        let mut flat = Vec::new();
        for (category, node) in self.groups {
            let mut path = vec![category];
            TokenOrGroup::from(node).flatten(&mut path, &mut flat);
        }
        flat.into_iter()
            .map(|(path, raw)| {
                let name = path[1..].join("-");
                (path[0].clone(), name, raw)
            })
            .collect()
    }
}

/// Every loaded token, grouped by category in source order.
#[derive(Debug, Clone)]
pub struct TokenSet {
    categories: IndexMap<String, IndexMap<String, Token>>,
    options: Options,
}
impl TokenSet {
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
        options: Options,
    ) -> Result<Self> {
        let files = sources
            .into_iter()
            .map(|(name, contents)| TokenFile::parse(name, contents))
            .collect::<Result<Vec<_>>>()?;
        Self::load(files, options)
    }

    /// Merges the files into one set. A descriptor's kind is decided here, and
    /// every surviving token is known to sample cleanly at every breakpoint.
    pub fn load(files: impl IntoIterator<Item = TokenFile>, options: Options) -> Result<Self> {
        if options.precision > MAX_PRECISION {
            return Err(TokenError::InvalidPrecision(options.precision));
        }
        let policy = options.on_invalid;
        let mut set = TokenSet {
            categories: IndexMap::new(),
            options,
        };
        let mut seen = HashSet::new();
        for file in files {
            tracing::debug!(source = %file.name, "loading token source");
            let source_name = file.name.clone();
            for (category, name, raw) in file.into_descriptors() {
                let key = token_key(&category, &name);
                if !seen.insert(key.clone()) {
                    return Err(TokenError::DuplicateToken {
                        token: key,
                        source_name,
                    });
                }
                let token = if name.is_empty() {
                    Err(TokenError::invalid(&key, "tokens must be nested in a category"))
                } else {
                    Token::from_raw(&category, &name, raw, &set.options)
                };
                match token {
                    Ok(token) => {
                        set.categories
                            .entry(category)
                            .or_default()
                            .insert(name, token);
                    }
                    Err(err) => policy.handle(&key, err)?,
                }
            }
        }
        set.drop_unsampleable()?;
        set.check_properties()?;
        Ok(set)
    }

    /// Dropping a token can break the tokens referencing it, so this repeats
    /// until a pass finds nothing to drop.
    fn drop_unsampleable(&mut self) -> Result<()> {
        loop {
            let failures = self
                .tokens()
                .filter_map(|token| self.sample(token).err().map(|err| (token.key(), err)))
                .collect_vec();
            if failures.is_empty() {
                return Ok(());
            }
            for (key, err) in failures {
                self.options.on_invalid.handle(&key, err)?;
                self.remove(&key);
            }
        }
    }

    fn check_properties(&self) -> Result<()> {
        let mut owners: HashMap<&str, String> = HashMap::new();
        for token in self.tokens() {
            if let Some(first) = owners.insert(&token.property, token.key()) {
                return Err(TokenError::DuplicateIdentifier {
                    property: token.property.clone(),
                    first,
                    second: token.key(),
                });
            }
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        let Some((category, name)) = self
            .lookup(key)
            .map(|token| (token.category.clone(), token.name.clone()))
        else {
            return;
        };
        if let Some(tokens) = self.categories.get_mut(&category) {
            tokens.shift_remove(&name);
            if tokens.is_empty() {
                self.categories.shift_remove(&category);
            }
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.options.breakpoints
    }

    pub fn get(&self, category: &str, name: &str) -> Option<&Token> {
        self.categories.get(category)?.get(name)
    }

    /// Looks a token up by its `category/name` key.
    pub fn lookup(&self, key: &str) -> Option<&Token> {
        self.tokens().find(|token| token.key() == key)
    }

    /// Target of a `{category.name}` reference; segments after the category
    /// address nested groups.
    pub fn resolve_ref(&self, path: &[String]) -> Option<&Token> {
        match path {
            [category, name @ ..] if !name.is_empty() => self.get(category, &name.join("-")),
            _ => None,
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = (&String, &IndexMap<String, Token>)> {
        self.categories.iter()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.categories.values().flat_map(|tokens| tokens.values())
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(|tokens| tokens.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
