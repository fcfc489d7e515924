use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Top-level screen shown by the navigation shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Home,
    Generate,
    Studio,
    Library,
    Discover,
    Swipe,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modal {
    Setup,
    Upgrade,
    Mastering,
    Command,
    Shortcuts,
}

impl Modal {
    pub const ALL: [Modal; 5] = [
        Modal::Setup,
        Modal::Upgrade,
        Modal::Mastering,
        Modal::Command,
        Modal::Shortcuts,
    ];
}

/// Named bundle of simulated vocal processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocalPreset {
    #[default]
    Clean,
    Trap,
    Vintage,
    Stadium,
}

impl VocalPreset {
    pub const ALL: [VocalPreset; 4] = [
        VocalPreset::Clean,
        VocalPreset::Trap,
        VocalPreset::Vintage,
        VocalPreset::Stadium,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VocalPreset::Clean => "Studio Dry",
            VocalPreset::Trap => "Auto-Tune",
            VocalPreset::Vintage => "Vintage",
            VocalPreset::Stadium => "Stadium",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_toggle_roundtrip() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn test_view_names() {
        let view: View = serde_json::from_str("\"swipe\"").expect("decode");
        assert_eq!(view, View::Swipe);
        assert!(serde_json::from_str::<View>("\"nowhere\"").is_err());
    }
}
