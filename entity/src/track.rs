use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_valid::Validate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid track structure: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("Invalid track fields: {0}")]
    Fields(String),
}

/// Metadata of a single audio track as stored in the `track` collection.
#[derive(Serialize, Deserialize, Validate, Clone, Debug, PartialEq)]
pub struct Track {
    #[validate(min_length = 1)]
    pub title: String,
    #[validate(min_length = 1)]
    pub artist: String,
    #[validate(min_length = 1)]
    pub audio_url: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    /// Length in seconds.
    #[serde(default)]
    pub duration: Option<f64>,

    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub play_count: u64,
}

/// The client supplied part of a track. Counters are never accepted from clients.
#[derive(Deserialize, Clone, Debug)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    pub audio_url: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl Track {
    pub fn create(new: NewTrack) -> Result<Self, ValidationError> {
        let track = Self {
            title: new.title,
            artist: new.artist,
            audio_url: new.audio_url,
            cover_url: new.cover_url,
            duration: new.duration,
            likes: 0,
            play_count: 0,
        };
        track.validate_fields()?;
        Ok(track)
    }

    /// Builds a track out of a field name to value mapping.
    pub fn from_document(fields: Map<String, Value>) -> Result<Self, ValidationError> {
        let track: Self = serde_json::from_value(Value::Object(fields))?;
        track.validate_fields()?;
        Ok(track)
    }

    pub fn validate_fields(&self) -> Result<(), ValidationError> {
        self.validate()
            .map_err(|e| ValidationError::Fields(e.to_string()))
    }
}
