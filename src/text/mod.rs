//! Text rendering for decoy carriers.

pub mod render;

pub use render::{glyph_scale, layout, render_text, text_canvas, wrap_text};
