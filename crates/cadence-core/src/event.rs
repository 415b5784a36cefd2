use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::repeat::RepeatInfo;

/// An event as the client hands it to (or reads it back from) the backend.
///
/// Only `date` and `repeat` carry meaning here; every other field rides
/// along in `extra` and is written back untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub date: String,

    #[serde(default)]
    pub repeat: RepeatInfo,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl EventForm {
    pub fn new(date: impl Into<String>, repeat: RepeatInfo) -> Self {
        Self {
            id: None,
            date: date.into(),
            repeat,
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_date(&self, date: String) -> Self {
        Self {
            date,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn detached(&self) -> Self {
        Self {
            repeat: self.repeat.detached(),
            ..self.clone()
        }
    }

    pub fn series_id(&self) -> Option<&str> {
        self.repeat.id.as_deref()
    }

    pub fn is_repeating_series(&self) -> bool {
        self.series_id().is_some()
    }
}
