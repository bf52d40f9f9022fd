//! Declarative description of the splash layout plus per-frame battery state

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::display::font::Font;
use crate::display::layout::Placement;
use crate::models::battery::BatteryStatus;

fn default_color() -> [u8; 4] {
    [255, 255, 255, 255]
}

fn default_track_color() -> [u8; 4] {
    [48, 48, 48, 255]
}

fn default_enabled() -> bool {
    true
}

fn default_num_frames() -> i32 {
    1
}

fn unknown_level() -> i32 {
    -1
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

/// Where and how one piece of text is drawn.
///
/// The font is resolved from `font_file` when the renderer is constructed;
/// fields whose font cannot be resolved are skipped at render time.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct TextField {
    #[serde(default)]
    pub pos_x: Placement,
    #[serde(default)]
    pub pos_y: Placement,
    #[serde(default = "default_color")]
    pub color: [u8; 4],
    #[serde(default)]
    pub font_file: Option<PathBuf>,
    #[serde(skip)]
    pub font: Option<Font>,
}

impl Default for TextField {
    fn default() -> Self {
        TextField {
            pos_x: Placement::Center,
            pos_y: Placement::Center,
            color: default_color(),
            font_file: None,
            font: None,
        }
    }
}

impl TextField {
    fn at(pos_x: Placement, pos_y: Placement, color: [u8; 4]) -> TextField {
        TextField {
            pos_x,
            pos_y,
            color,
            ..TextField::default()
        }
    }

    /// Font for this field if it is usable for layout math.
    pub fn usable_font(&self) -> Option<&Font> {
        self.font.as_ref().filter(|f| f.is_usable())
    }
}

/// What a decorative overlay renders.
#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum OverlaySource {
    /// Fixed string, e.g. a header or footer line.
    Literal { text: String },
    /// The crate version, rendered as `v<version>`.
    Version,
    /// Current local date. Ignores the overlay's own field: the line is
    /// drawn in the percent field's font, in white, a fixed margin below
    /// the percentage.
    Date {
        #[serde(default = "default_date_format")]
        format: String,
    },
    /// Battery temperature with threshold-banded color.
    Temperature,
}

/// One configured overlay: a text source plus its field.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct TextOverlay {
    #[serde(flatten)]
    pub source: OverlaySource,
    #[serde(default)]
    pub field: TextField,
}

/// Progress bar settings. Width and height are fixed by the renderer;
/// only the vertical anchor and track color are configurable.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ProgressBar {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "ProgressBar::default_pos_y")]
    pub pos_y: Placement,
    #[serde(default = "default_track_color")]
    pub track_color: [u8; 4],
}

impl ProgressBar {
    fn default_pos_y() -> Placement {
        Placement::FromFar(-160)
    }
}

impl Default for ProgressBar {
    fn default() -> Self {
        ProgressBar {
            enabled: true,
            pos_y: ProgressBar::default_pos_y(),
            track_color: default_track_color(),
        }
    }
}

/// Input state for one redraw: the configured layout plus the battery
/// reading the caller refreshes before every frame.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Animation {
    #[serde(default)]
    pub text_clock: TextField,
    #[serde(default)]
    pub text_percent: TextField,
    #[serde(default)]
    pub overlays: Vec<TextOverlay>,
    #[serde(default)]
    pub progress_bar: ProgressBar,
    #[serde(default = "default_num_frames")]
    pub num_frames: i32,

    #[serde(skip)]
    pub cur_status: BatteryStatus,
    #[serde(skip, default = "unknown_level")]
    pub cur_level: i32,
    #[serde(skip)]
    pub cur_temp_deci: i32,
}

impl Animation {
    /// Load an animation description from a JSON file.
    pub fn load(path: &Path) -> Result<Animation, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read animation file {}: {}", path.display(), e))?;
        serde_json::from_str(&contents)
            .map_err(|e| format!("Invalid animation file {}: {}", path.display(), e))
    }

    /// Built-in layout used when no animation file is supplied: clock in the
    /// top-right corner, percentage centered, version string in the footer.
    pub fn default_layout() -> Animation {
        Animation {
            text_clock: TextField::at(
                Placement::FromFar(-16),
                Placement::FromNear(16),
                default_color(),
            ),
            text_percent: TextField::default(),
            overlays: vec![
                TextOverlay {
                    source: OverlaySource::Temperature,
                    field: TextField::at(
                        Placement::FromNear(16),
                        Placement::FromNear(16),
                        default_color(),
                    ),
                },
                TextOverlay {
                    source: OverlaySource::Version,
                    field: TextField::at(
                        Placement::Center,
                        Placement::FromFar(-20),
                        [20, 90, 200, 255],
                    ),
                },
            ],
            progress_bar: ProgressBar::default(),
            num_frames: default_num_frames(),
            cur_status: BatteryStatus::Unknown,
            cur_level: unknown_level(),
            cur_temp_deci: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_a_minimal_description() {
        let anim: Animation = serde_json::from_str("{}").unwrap();
        assert_eq!(anim.num_frames, 1);
        assert_eq!(anim.cur_level, -1);
        assert_eq!(anim.cur_status, BatteryStatus::Unknown);
        assert!(anim.progress_bar.enabled);
        assert!(anim.overlays.is_empty());
    }

    #[test]
    fn deserializes_overlay_sources() {
        let json = r#"{
            "overlays": [
                {"source": "literal", "text": "DevTITANS",
                 "field": {"pos_x": "center", "pos_y": 20, "color": [0, 179, 13, 255]}},
                {"source": "version",
                 "field": {"pos_x": "center", "pos_y": -20}},
                {"source": "date", "format": "%d/%m/%Y"},
                {"source": "temperature"}
            ]
        }"#;
        let anim: Animation = serde_json::from_str(json).unwrap();
        assert_eq!(anim.overlays.len(), 4);
        match &anim.overlays[0].source {
            OverlaySource::Literal { text } => assert_eq!(text, "DevTITANS"),
            other => panic!("expected literal overlay, got {:?}", other),
        }
        assert_eq!(anim.overlays[0].field.pos_y, Placement::FromNear(20));
        assert_eq!(anim.overlays[1].field.pos_y, Placement::FromFar(-20));
    }

    #[test]
    fn runtime_state_is_not_serialized() {
        let mut anim = Animation::default_layout();
        anim.cur_level = 57;
        anim.cur_status = BatteryStatus::Charging;
        let json = serde_json::to_string(&anim).unwrap();
        assert!(!json.contains("cur_level"));
        assert!(!json.contains("cur_status"));
    }

    #[test]
    fn default_layout_has_centered_percent_field() {
        let anim = Animation::default_layout();
        assert_eq!(anim.text_percent.pos_x, Placement::Center);
        assert_eq!(anim.text_percent.pos_y, Placement::Center);
    }
}
