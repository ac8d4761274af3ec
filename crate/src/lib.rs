//! The bundled design tokens as Rust constants, one module per breakpoint.
//!
//! ```
//! assert_eq!(fluid_tokens::desktop::FONT_SIZES_BASE, 20.0);
//! ```

include!(concat!(env!("OUT_DIR"), "/tokens.rs"));

pub const CSS: &str = include_str!(concat!(env!("OUT_DIR"), "/tokens.css"));
