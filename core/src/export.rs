use indexmap::IndexMap;
use serde::Serialize;

use crate::{naming, Result, Token, TokenKind, TokenSet, TokenType, TokenValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportType {
    FontSize,
    Spacing,
    Dimension,
}

/// One token at one breakpoint, as the design-tool import expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub value: TokenValue,
    #[serde(rename = "type")]
    pub type_: ExportType,
    pub breakpoint: String,
    pub description: String,
}

/// `category/name` -> record, for a single breakpoint.
pub type BreakpointExport = IndexMap<String, ExportRecord>;

/// category -> name -> breakpoint -> value.
pub type PluginExport = IndexMap<String, IndexMap<String, IndexMap<String, TokenValue>>>;

/// Every breakpoint's export; serializes as the combined artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DiscreteExport(IndexMap<String, BreakpointExport>);
impl DiscreteExport {
    pub fn breakpoint(&self, name: &str) -> Option<&BreakpointExport> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BreakpointExport)> {
        self.0.iter()
    }
}

impl Token {
    pub fn export_type(&self) -> ExportType {
        match self.type_ {
            Some(TokenType::FontSizes) => ExportType::FontSize,
            Some(TokenType::Spacing) => ExportType::Spacing,
            _ if naming::identifier(&self.category).contains("spacing") => ExportType::Spacing,
            _ => ExportType::Dimension,
        }
    }

    fn export_description(&self, breakpoint: &str) -> String {
        if let Some(description) = &self.description {
            return description.clone();
        }
        match &self.kind {
            TokenKind::Fluid(range) => {
                format!("Fluid from {}px to {}px", range.min_size, range.max_size)
            }
            TokenKind::Responsive(_) => format!("Responsive {breakpoint} value"),
            TokenKind::Fixed(_) => "Fixed value".to_string(),
        }
    }
}

impl TokenSet {
    pub fn to_discrete(&self) -> Result<DiscreteExport> {
        let mut exports: IndexMap<String, BreakpointExport> = self
            .breakpoints()
            .iter()
            .map(|breakpoint| (breakpoint.name.clone(), IndexMap::new()))
            .collect();
        for token in self.tokens() {
            let key = token.key();
            for (breakpoint, value) in self.sample(token)? {
                let record = ExportRecord {
                    value,
                    type_: token.export_type(),
                    description: token.export_description(&breakpoint),
                    breakpoint: breakpoint.clone(),
                };
                exports
                    .entry(breakpoint)
                    .or_default()
                    .insert(key.clone(), record);
            }
        }
        Ok(DiscreteExport(exports))
    }

    pub fn to_plugin_format(&self) -> Result<PluginExport> {
        let mut plugin = PluginExport::new();
        for token in self.tokens() {
            plugin
                .entry(token.category.clone())
                .or_default()
                .insert(token.name.clone(), self.sample(token)?);
        }
        Ok(plugin)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::Options;

    fn load(json: &str) -> TokenSet {
        TokenSet::from_sources([("test.json", json)], Options::default()).unwrap()
    }

    #[test]
    fn records() {
        let tokens = load(
            r#"{
                "fontSizes": { "base": { "type": "fontSizes", "fluid": { "minWidth": 320, "maxWidth": 1240, "minSize": 18, "maxSize": 20 } } },
                "spacing": { "sm": { "type": "dimension", "responsive": { "phone": 4, "tablet": 6, "desktop": 8 } } }
            }"#,
        );
        let export = tokens.to_discrete().unwrap();
        let phone = export.breakpoint("phone").unwrap();
        assert_eq!(
            serde_json::to_value(&phone["fontSizes/base"]).unwrap(),
            serde_json::json!({
                "value": 18,
                "type": "fontSize",
                "breakpoint": "phone",
                "description": "Fluid from 18px to 20px"
            })
        );
        let tablet = export.breakpoint("tablet").unwrap();
        assert_eq!(
            serde_json::to_value(&tablet["spacing/sm"]).unwrap(),
            serde_json::json!({
                "value": 6,
                "type": "spacing",
                "breakpoint": "tablet",
                "description": "Responsive tablet value"
            })
        );
    }

    #[test]
    fn type_tags() {
        let tokens = load(
            r#"{
                "fontSizes": { "a": { "type": "fontSize", "value": 16 } },
                "gaps": { "b": { "type": "spacing", "value": 16 } },
                "spacing": { "c": { "type": "dimension", "value": 16 } },
                "radii": { "d": { "type": "borderRadius", "value": 16 } },
                "sizes": { "e": { "value": 16 } }
            }"#,
        );
        let tags = tokens
            .tokens()
            .map(|token| token.export_type())
            .collect::<Vec<_>>();
        assert_eq!(
            tags,
            vec![
                ExportType::FontSize,
                ExportType::Spacing,
                ExportType::Spacing,
                ExportType::Dimension,
                ExportType::Dimension,
            ]
        );
    }

    #[test]
    fn every_breakpoint_has_every_token() {
        let tokens = crate::bundled_tokens().unwrap();
        let export = tokens.to_discrete().unwrap();
        let expected: HashSet<String> = tokens.tokens().map(|token| token.key()).collect();
        assert_eq!(export.iter().count(), tokens.breakpoints().len());
        for (name, records) in export.iter() {
            let keys: HashSet<String> = records.keys().cloned().collect();
            assert_eq!(keys, expected, "breakpoint {name}");
            assert!(records.values().all(|record| &record.breakpoint == name));
        }
    }

    #[test]
    fn own_description_wins() {
        let tokens = crate::bundled_tokens().unwrap();
        let export = tokens.to_discrete().unwrap();
        let record = &export.breakpoint("desktop").unwrap()["spacing/gutter"];
        assert_eq!(record.description, "Horizontal page gutter");
        assert_eq!(record.value, TokenValue::Number(16.0));
    }

    #[test]
    fn plugin_format_regroups_by_category() {
        let tokens = load(
            r#"{ "spacing": { "sm": { "responsive": { "phone": 4, "tablet": 6, "desktop": 8 } } } }"#,
        );
        assert_eq!(
            serde_json::to_value(tokens.to_plugin_format().unwrap()).unwrap(),
            serde_json::json!({ "spacing": { "sm": { "phone": 4, "tablet": 6, "desktop": 8 } } })
        );
    }

    #[test]
    fn combined_matches_per_breakpoint() {
        let tokens = crate::bundled_tokens().unwrap();
        let export = tokens.to_discrete().unwrap();
        let combined = serde_json::to_value(&export).unwrap();
        for (name, records) in export.iter() {
            assert_eq!(combined[name], serde_json::to_value(records).unwrap());
        }
    }
}
