use serde::{Deserialize, Serialize};

use crate::{Result, TokenError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub name: String,
    pub viewport_width: u32,
}
impl Breakpoint {
    pub fn new(name: impl Into<String>, viewport_width: u32) -> Self {
        Self {
            name: name.into(),
            viewport_width,
        }
    }
}

/// The viewport widths tokens are sampled at for design-tool export, narrowest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Breakpoint>", into = "Vec<Breakpoint>")]
pub struct Breakpoints(Vec<Breakpoint>);
impl Breakpoints {
    pub fn new(breakpoints: Vec<Breakpoint>) -> Result<Self> {
        if breakpoints.is_empty() {
            return Err(TokenError::InvalidBreakpoints(
                "at least one breakpoint is required".to_string(),
            ));
        }
        for (i, breakpoint) in breakpoints.iter().enumerate() {
            if breakpoint.name.trim().is_empty() {
                return Err(TokenError::InvalidBreakpoints(format!(
                    "breakpoint {i} has an empty name"
                )));
            }
            if breakpoints[..i].iter().any(|b| b.name == breakpoint.name) {
                return Err(TokenError::InvalidBreakpoints(format!(
                    "breakpoint {} is listed twice",
                    breakpoint.name
                )));
            }
            if let Some(previous) = i.checked_sub(1).map(|p| &breakpoints[p]) {
                if breakpoint.viewport_width <= previous.viewport_width {
                    return Err(TokenError::InvalidBreakpoints(format!(
                        "{} ({}px) must be wider than {} ({}px)",
                        breakpoint.name,
                        breakpoint.viewport_width,
                        previous.name,
                        previous.viewport_width
                    )));
                }
            }
        }
        Ok(Self(breakpoints))
    }

    /// phone 320px, tablet 768px, desktop 1240px.
    ///
    /// Desktop sits at the common fluid `maxWidth`, so desktop samples of fluid
    /// tokens land exactly on their maximum size.
    pub fn canonical() -> Self {
        Self(vec![
            Breakpoint::new("phone", 320),
            Breakpoint::new("tablet", 768),
            Breakpoint::new("desktop", 1240),
        ])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Breakpoint> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Breakpoint> {
        self.0.iter().find(|b| b.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn narrowest(&self) -> &Breakpoint {
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl Default for Breakpoints {
    fn default() -> Self {
        Self::canonical()
    }
}
impl TryFrom<Vec<Breakpoint>> for Breakpoints {
    type Error = TokenError;

    fn try_from(breakpoints: Vec<Breakpoint>) -> Result<Self> {
        Self::new(breakpoints)
    }
}
impl From<Breakpoints> for Vec<Breakpoint> {
    fn from(breakpoints: Breakpoints) -> Self {
        breakpoints.0
    }
}
impl<'a> IntoIterator for &'a Breakpoints {
    type Item = &'a Breakpoint;
    type IntoIter = std::slice::Iter<'a, Breakpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
