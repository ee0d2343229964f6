use std::fmt;

use serde::{Deserialize, Serialize};

/// Single process-wide slot; opening new media overwrites it.
pub const PLAYER_SLOT_KEY: &str = "currentAudioPlayer";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub fn tag_name(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPlayer {
    pub media_kind: MediaKind,
    pub media_ref: u32,
    pub playback_position_seconds: f64,
    pub origin_page: String,
}

#[derive(Debug)]
pub enum RecordError {
    Empty,
    Malformed(serde_json::Error),
    InvalidPosition(f64),
    Encode(serde_json::Error),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::Empty => write!(f, "empty player record"),
            RecordError::Malformed(err) => write!(f, "malformed player record: {err}"),
            RecordError::InvalidPosition(value) => {
                write!(f, "player record has invalid position {value}")
            }
            RecordError::Encode(err) => write!(f, "failed to encode player record: {err}"),
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordError::Malformed(err) | RecordError::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl PersistedPlayer {
    pub fn new(media_kind: MediaKind, media_ref: u32, position: f64, origin_page: &str) -> Self {
        Self {
            media_kind,
            media_ref,
            playback_position_seconds: sanitize_position(position),
            origin_page: origin_page.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        serde_json::to_string(self).map_err(RecordError::Encode)
    }

    pub fn from_json(raw: &str) -> Result<Self, RecordError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(RecordError::Empty);
        }
        let record: PersistedPlayer = serde_json::from_str(raw).map_err(RecordError::Malformed)?;
        let position = record.playback_position_seconds;
        if !position.is_finite() || position < 0.0 {
            return Err(RecordError::InvalidPosition(position));
        }
        Ok(record)
    }
}

pub fn sanitize_position(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_camel_case_fields() {
        let record = PersistedPlayer::new(MediaKind::Video, 1, 12.5, "/DMC/music-videos.html");
        let raw = record.to_json().unwrap();
        assert_eq!(
            raw,
            r#"{"mediaKind":"video","mediaRef":1,"playbackPositionSeconds":12.5,"originPage":"/DMC/music-videos.html"}"#
        );
    }

    #[test]
    fn negative_position_is_rejected() {
        let raw = r#"{"mediaKind":"audio","mediaRef":2,"playbackPositionSeconds":-3.0,"originPage":"x"}"#;
        assert!(matches!(
            PersistedPlayer::from_json(raw),
            Err(RecordError::InvalidPosition(_))
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            PersistedPlayer::from_json("{not json"),
            Err(RecordError::Malformed(_))
        ));
        assert!(matches!(PersistedPlayer::from_json("  "), Err(RecordError::Empty)));
    }

    #[test]
    fn non_finite_positions_are_zeroed() {
        assert_eq!(sanitize_position(f64::NAN), 0.0);
        assert_eq!(sanitize_position(f64::INFINITY), 0.0);
        assert_eq!(sanitize_position(4.0), 4.0);
    }
}
