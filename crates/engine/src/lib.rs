//! The signsort file-organization engine.
//!
//! A filesystem-event-driven pipeline that detects newly created or renamed
//! files in a single watched directory, waits for each file to stop
//! changing size, parses structured metadata from its name, and moves
//! signed documents into a metadata-derived destination tree.
//!
//! # Architecture
//!
//! Data flows strictly downward, leaf components first:
//!
//! ```text
//! notify event → stability wait → filename parse → destination resolve → move
//! ```
//!
//! - [`parse`], [`normalize`]: pure functions, no I/O
//! - [`stability`]: bounded size-polling wait
//! - [`resolve`], [`mover`]: destination layout and the atomic relocation
//! - [`decide`], [`preview`]: the shared classification used by both the
//!   live pipeline and the synchronous dry-run preview
//! - [`watch`]: the coordinator owning the per-path state machine
//!
//! Only the watch coordinator holds cross-file state: a map from path to
//! in-flight token guaranteeing at most one pipeline per path.

pub mod decide;
pub mod mover;
pub mod normalize;
pub mod parse;
pub mod preview;
pub mod resolve;
pub mod stability;
pub mod watch;

mod pipeline;

pub use decide::{Classification, ProcessingDecision};
pub use mover::MoveError;
pub use parse::ParseError;
pub use preview::{PreviewEntry, PreviewReport, PreviewSummary};
pub use resolve::ResolveError;
pub use stability::Stability;
pub use watch::{Engine, EngineError, EngineHandle, ShutdownReport};
