//! In-place editing: a rope-backed buffer and the editor surface that
//! keeps it in sync with the draft store and its preview.

mod buffer;
mod surface;

pub use buffer::{Cursor, Direction, EditorBuffer};
pub use surface::{DEFAULT_RENDER_DEBOUNCE_MS, DIRTY_INDICATOR, EditorSurface, SyncOutcome};
