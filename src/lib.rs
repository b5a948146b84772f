// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. editor::EditorBuffer)
    clippy::module_name_repetitions
)]

//! # mdview
//!
//! A single-file markdown/text viewer with an in-place editor kept in
//! sync with it.
//!
//! - The viewer shows the rendered document and follows unsaved edits
//! - The editor opens at the text the user clicked, with a live preview
//! - Unsaved work survives closing the editor and is recovered on reopen
//! - External changes on disk reload whichever surface is clean
//!
//! ## Architecture
//!
//! A [`coordinator::Coordinator`] owns the [`store::DraftStore`] and both
//! surfaces and routes typed [`bus`] messages between them on one
//! cooperative loop. Rendering sits behind the [`render::Renderer`] trait
//! and answers asynchronously; stale answers are dropped by sequence
//! number.
//!
//! The terminal host in [`app`] uses The Elm Architecture (TEA):
//! - **Model**: terminal state around the coordinator
//! - **Message**: user actions
//! - **Update**: state transitions
//! - **View**: render to terminal
//!
//! ## Modules
//!
//! - [`session`]: the managed file and its type
//! - [`store`]: persisted text and the unsaved draft
//! - [`bus`]: messages between surfaces
//! - [`viewer`] / [`editor`]: the two surfaces
//! - [`format`]: toolbar formatting toggles
//! - [`locator`]: preview text to caret offset
//! - [`render`] / [`highlight`]: HTML conversion
//! - [`watcher`]: file watching
//! - [`app`] / [`ui`]: the terminal host

pub mod app;
pub mod bus;
pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod editor;
pub mod error;
pub mod format;
pub mod highlight;
pub mod locator;
pub mod perf;
pub mod render;
pub mod session;
pub mod store;
pub mod ui;
pub mod viewer;
pub mod watcher;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::coordinator::{Coordinator, OpenEditorRequest, Surface};
    pub use crate::render::{NativeRenderer, RenderClient};
    pub use crate::session::DocumentSession;
}
