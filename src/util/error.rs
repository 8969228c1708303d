//! Error types for the exporter.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for export operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Polygon with a loop count other than 3 or 4
    #[error("Mesh '{mesh}': polygon {polygon} has {loops} loops, only triangles and quads are supported")]
    UnsupportedPolygon { mesh: String, polygon: usize, loops: usize },

    /// Mesh data block referenced by an object does not exist
    #[error("Mesh not found: {0}")]
    MissingMesh(String),

    /// Armature data block referenced by an object does not exist
    #[error("Armature not found: {0}")]
    MissingArmature(String),

    /// Object referenced by name (e.g. from a skin modifier) does not exist
    #[error("Object not found: {0}")]
    MissingObject(String),

    /// Bone names a parent that is not part of the armature
    #[error("Armature '{armature}': bone '{bone}' has unknown parent '{parent}'")]
    UnknownParent { armature: String, bone: String, parent: String },

    /// Bone parent links form a cycle
    #[error("Armature '{armature}': bone '{bone}' is part of a parent cycle")]
    BoneCycle { armature: String, bone: String },

    /// Loop span or loop vertex index out of range
    #[error("Mesh '{mesh}': {detail}")]
    InvalidLoop { mesh: String, detail: String },

    /// Vertex group index outside the joint list
    #[error("Mesh '{mesh}': vertex {vertex} references group {group} (joint count: {joints})")]
    InvalidGroupIndex { mesh: String, vertex: usize, group: u32, joints: usize },

    /// Name that cannot be used as an id or a Name array token
    #[error("Invalid {kind} name '{name}': names must be non-empty and contain no whitespace")]
    InvalidName { kind: &'static str, name: String },

    /// Keyframes out of order or otherwise unusable
    #[error("Animation of '{object}': {detail}")]
    InvalidAnimation { object: String, detail: String },

    /// Array length is not a multiple of the accessor stride
    #[error("Source '{id}': {len} values do not divide into records of stride {stride}")]
    StrideMismatch { id: String, len: usize, stride: usize },

    /// `#id` reference without a matching element id
    #[error("Dangling reference: {0}")]
    DanglingReference(String),

    /// Input file does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Scene or options JSON could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML serialization failed
    #[error("XML write error: {0}")]
    Xml(#[from] xmltree::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid name error.
    pub fn invalid_name(kind: &'static str, name: impl Into<String>) -> Self {
        Self::InvalidName { kind, name: name.into() }
    }

    /// Create an invalid loop error.
    pub fn invalid_loop(mesh: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidLoop { mesh: mesh.into(), detail: detail.into() }
    }
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, Error>;
