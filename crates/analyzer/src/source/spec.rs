use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use crate::parser::Dialect;

/// One entry of the source list: `{"id": "...", "path": "...", "type": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub id: String,
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub dialect: Dialect,
}

impl SourceSpec {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>, dialect: Dialect) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            dialect,
        }
    }
}
