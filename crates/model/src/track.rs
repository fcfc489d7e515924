use serde::{Deserialize, Serialize};

pub const DEFAULT_VOLUME: i32 = 75;
pub const DEFAULT_PAN: i32 = 50;

/// A finished piece of audio as shown in the library, discover feed and
/// playback bar.
///
/// The title doubles as the identity key for library removal; nothing
/// enforces uniqueness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryTrack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_sig: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

impl LibraryTrack {
    pub fn new(title: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            duration: duration.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Beat,
    Vocal,
}

impl TrackKind {
    /// Prefix used for auto-generated track titles.
    pub fn title_prefix(&self) -> &'static str {
        match self {
            TrackKind::Beat => "Audio",
            TrackKind::Vocal => "Vocals",
        }
    }
}

/// One channel of the working session: a lane in the studio and a strip on
/// the mixer console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTrack {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TrackKind,
    pub file_url: Option<String>,
    pub vol: i32,
    pub pan: i32,
    pub muted: bool,
    pub solo: bool,
}

impl SessionTrack {
    /// A track with default mixer values and no audio source.
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            file_url: None,
            vol: DEFAULT_VOLUME,
            pan: DEFAULT_PAN,
            muted: false,
            solo: false,
        }
    }

    /// Overwrite every field present in `patch`. The id is never touched.
    pub fn merge(&mut self, patch: &TrackPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(file_url) = &patch.file_url {
            self.file_url = file_url.clone();
        }
        if let Some(vol) = patch.vol {
            self.vol = vol;
        }
        if let Some(pan) = patch.pan {
            self.pan = pan;
        }
        if let Some(muted) = patch.muted {
            self.muted = muted;
        }
        if let Some(solo) = patch.solo {
            self.solo = solo;
        }
    }
}

/// Partial update for a [`SessionTrack`]. `file_url` is doubly optional so a
/// patch can clear the source (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<TrackKind>,
    #[serde(default, with = "double_option")]
    pub file_url: Option<Option<String>>,
    #[serde(default)]
    pub vol: Option<i32>,
    #[serde(default)]
    pub pan: Option<i32>,
    #[serde(default)]
    pub muted: Option<bool>,
    #[serde(default)]
    pub solo: Option<bool>,
}

impl TrackPatch {
    pub fn volume(vol: i32) -> Self {
        Self {
            vol: Some(vol),
            ..Default::default()
        }
    }

    pub fn pan(pan: i32) -> Self {
        Self {
            pan: Some(pan),
            ..Default::default()
        }
    }

    pub fn muted(muted: bool) -> Self {
        Self {
            muted: Some(muted),
            ..Default::default()
        }
    }

    pub fn solo(solo: bool) -> Self {
        Self {
            solo: Some(solo),
            ..Default::default()
        }
    }
}

// A present `null` means "clear", an absent key means "leave alone".
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<Option<String>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}

/// Display title for an imported file: the file name with its final
/// extension removed (`beat.v2.wav` -> `beat.v2`).
pub fn display_title(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(dot) => {
            let extension = &file_name[dot + 1..];
            if extension.is_empty() || extension.contains('/') {
                file_name.to_string()
            } else {
                file_name[..dot].to_string()
            }
        }
        None => file_name.to_string(),
    }
}
