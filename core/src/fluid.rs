use serde::Deserialize;

use crate::{Result, TokenError};

/// A value that scales linearly with the viewport between two widths and is
/// held constant outside of them.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FluidRange {
    pub min_width: f64,
    pub max_width: f64,
    pub min_size: f64,
    pub max_size: f64,
}
impl FluidRange {
    pub fn new(min_width: f64, max_width: f64, min_size: f64, max_size: f64) -> Self {
        Self {
            min_width,
            max_width,
            min_size,
            max_size,
        }
    }

    pub(crate) fn validate(&self, token: &str) -> Result<()> {
        let fields = [
            ("minWidth", self.min_width),
            ("maxWidth", self.max_width),
            ("minSize", self.min_size),
            ("maxSize", self.max_size),
        ];
        if let Some((field, value)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(TokenError::invalid(
                token,
                format!("fluid.{field} is not a finite number ({value})"),
            ));
        }
        if self.max_width <= self.min_width {
            return Err(TokenError::invalid(
                token,
                format!(
                    "fluid.minWidth ({}) must be less than fluid.maxWidth ({})",
                    self.min_width, self.max_width
                ),
            ));
        }
        Ok(())
    }

    /// Interpolated size at `viewport`, unrounded.
    ///
    /// The two-weight form keeps both endpoints exact: ratio 0 yields
    /// `min_size` and ratio 1 yields `max_size` bit for bit.
    pub fn evaluate(&self, viewport: f64) -> Result<f64> {
        self.validate("fluid range")?;
        let ratio = ((viewport - self.min_width) / (self.max_width - self.min_width)).clamp(0.0, 1.0);
        Ok(self.min_size * (1.0 - ratio) + self.max_size * ratio)
    }

    pub fn lower_size(&self) -> f64 {
        self.min_size.min(self.max_size)
    }

    pub fn upper_size(&self) -> f64 {
        self.min_size.max(self.max_size)
    }
}

/// Highest supported precision; more decimals than this only exposes float noise.
pub const MAX_PRECISION: u32 = 6;

/// Rounds to `decimals` places, half away from zero. Negative zero is
/// normalized so it never prints as `-0`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Shortest display of a number after rounding; integral values print without
/// a fractional part.
pub fn format_number(value: f64, decimals: u32) -> String {
    format!("{}", round_to(value, decimals))
}
