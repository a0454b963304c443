//! Error taxonomy for the designer core.
//!
//! Only loading and saving surface hard errors. Structural and property
//! edits report failure through [`EditError`] values or booleans and never
//! leave the document half-mutated.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Malformed persisted markup.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("markup syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },
    #[error("closing tag </{found}> does not match <{expected}> at byte {position}")]
    MismatchedClose {
        expected: String,
        found: String,
        position: u64,
    },
    #[error("unexpected closing tag </{0}>")]
    UnexpectedClose(String),
    #[error("element <{0}> is never closed")]
    Unclosed(String),
    #[error("text outside of the root element at byte {0}")]
    StrayText(u64),
    #[error("markup has no root element")]
    NoRoot,
    #[error("markup has more than one root element (second is <{0}>)")]
    MultipleRoots(String),
}

/// Failures of [`crate::project::Project`] operations that cross the I/O
/// boundary, plus fragment id collisions.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to parse scheme: {0}")]
    Parse(#[from] MarkupError),
    #[error("failed to parse metadata: {0}")]
    Metadata(#[source] serde_json::Error),
    #[error("failed to serialize metadata: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("a fragment named `{0}` already exists")]
    DuplicateId(String),
}

/// Which placement rule refused an attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementRule {
    /// The parent is a leaf and holds no children at all.
    IsContainer,
    AllowChildren,
    AllowParents,
    InvalidChildren,
    AllowInnerContainers,
}

impl PlacementRule {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PlacementRule::IsContainer => "isContainer",
            PlacementRule::AllowChildren => "allowChildren",
            PlacementRule::AllowParents => "allowParents",
            PlacementRule::InvalidChildren => "invalidChildren",
            PlacementRule::AllowInnerContainers => "allowInnerContainers",
        }
    }
}

impl fmt::Display for PlacementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A refused drop. Not a hard error: the reason is surfaced as a notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementRejected {
    pub rule: PlacementRule,
    pub child: String,
    pub parent: String,
}

impl fmt::Display for PlacementRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // allowParents is phrased from the child's side
        match self.rule {
            PlacementRule::AllowParents => write!(
                f,
                "{} does not allow ({}) {}",
                self.child, self.rule, self.parent
            ),
            _ => write!(
                f,
                "{} does not allow ({}) {}",
                self.parent, self.rule, self.child
            ),
        }
    }
}

impl std::error::Error for PlacementRejected {}

/// Recoverable failure of a structural edit.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no element at `{path}`")]
    NotFound { path: String },
    #[error(transparent)]
    Rejected(#[from] PlacementRejected),
    #[error("invalid move: {0}")]
    InvalidMove(String),
}

impl EditError {
    pub(crate) fn not_found(path: &str) -> Self {
        EditError::NotFound {
            path: path.to_string(),
        }
    }
}

/// Reading or writing a project directory failed.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("project has no location on disk")]
    NoPath,
    #[error(transparent)]
    Project(#[from] ProjectError),
}

/// Copying a template into a new project failed.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("template metadata is not valid JSON: {0}")]
    TemplateMetadata(#[from] serde_json::Error),
}
