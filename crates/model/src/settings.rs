use serde::{Deserialize, Serialize};

/// Buffer sizes the settings screen offers. The store does not enforce them.
pub const BUFFER_SIZES: [u32; 3] = [128, 256, 512];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub audio_buffer_size: u32,
    pub audio_input_id: String,
    pub ai_model_version: String,
    pub auto_save: bool,
    pub cloud_sync: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_buffer_size: 256,
            audio_input_id: "default".to_string(),
            ai_model_version: "v2_stable".to_string(),
            auto_save: true,
            cloud_sync: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingKey {
    AudioBufferSize,
    AudioInputId,
    AiModelVersion,
    AutoSave,
    CloudSync,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Flag(bool),
    Number(u32),
    Text(String),
}

impl Settings {
    /// Write `value` under `key`. Returns `false` and leaves the settings
    /// untouched when the value has the wrong type for the key.
    pub fn set(&mut self, key: SettingKey, value: SettingValue) -> bool {
        match (key, value) {
            (SettingKey::AudioBufferSize, SettingValue::Number(size)) => {
                self.audio_buffer_size = size;
            }
            (SettingKey::AudioInputId, SettingValue::Text(id)) => self.audio_input_id = id,
            (SettingKey::AiModelVersion, SettingValue::Text(version)) => {
                self.ai_model_version = version;
            }
            (SettingKey::AutoSave, SettingValue::Flag(on)) => self.auto_save = on,
            (SettingKey::CloudSync, SettingValue::Flag(on)) => self.cloud_sync = on,
            _ => return false,
        }
        true
    }

    pub fn get(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::AudioBufferSize => SettingValue::Number(self.audio_buffer_size),
            SettingKey::AudioInputId => SettingValue::Text(self.audio_input_id.clone()),
            SettingKey::AiModelVersion => SettingValue::Text(self.ai_model_version.clone()),
            SettingKey::AutoSave => SettingValue::Flag(self.auto_save),
            SettingKey::CloudSync => SettingValue::Flag(self.cloud_sync),
        }
    }
}
