//! Import / export of the trash lists as a JSON document:
//! `{ "songs": { uri: true, ... }, "artists": { uri: true, ... } }`

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::trash::{TrashList, TrashSet};

pub const SUGGESTED_FILE_NAME: &str = "spicetify-trashbin.json";

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backup is not a valid trashbin document: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashDocument {
    #[serde(default)]
    pub songs: TrashList,
    #[serde(default)]
    pub artists: TrashList,
}

impl From<&TrashSet> for TrashDocument {
    fn from(trash: &TrashSet) -> Self {
        let (songs, artists) = trash.snapshot();
        Self { songs, artists }
    }
}

impl TrashDocument {
    pub fn to_json(&self) -> Result<String, BackupError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, BackupError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), BackupError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, BackupError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
