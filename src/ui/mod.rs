//! Terminal UI components.
//!
//! - [`render`]: draws the visible surface, its header and status bar
//! - [`preview_lines`]: flattens preview HTML for the terminal
//! - [`style`]: theming and colors

pub mod style;

mod overlays;
mod preview;
mod render;
mod status;

pub use preview::{html_to_lines, preview_lines};
pub use render::{char_column_at, line_number_width, render, split_editor_columns, toolbar_labels};

pub const DOCUMENT_LEFT_PADDING: u16 = 2;
/// Rows above a surface body: the viewer header or the editor toolbar.
pub const HEADER_ROWS: u16 = 1;
