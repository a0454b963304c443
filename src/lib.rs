//! Core of a visual window designer.
//!
//! Widgets are described by the [`schema`] registry, placed under each
//! other subject to [`placement`] rules, addressed by positional [`path`]s
//! and edited through the [`project`] document model. The model persists as
//! a `scheme.html` markup document plus `metadata.json` ([`package`]).

pub mod config;
pub mod error;
pub mod events;
pub mod markup;
pub mod outline;
pub mod package;
pub mod path;
pub mod placement;
pub mod project;
pub mod properties;
pub mod scaffold;
pub mod schema;

pub use error::{EditError, MarkupError, PackageError, PlacementRejected, ProjectError};
pub use markup::Node;
pub use project::{Metadata, MoveOutcome, Project};
pub use schema::{SchemaRegistry, registry};
