//! Configuration for the `collect_points` demo binary.

use crate::session::{InputEvent, Mode};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct CollectConfig {
    /// Camera parameter file (JSON, see `camera::CameraParams::load`).
    #[serde(rename = "params")]
    pub params: PathBuf,
    /// Raw frame image standing in for the live frame source.
    #[serde(rename = "input")]
    pub input: PathBuf,
    #[serde(default = "default_display_width")]
    pub display_width: u32,
    /// Scripted operator events, replayed in order.
    #[serde(default)]
    pub events: Vec<EventConfig>,
    pub output: CollectOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct CollectOutputConfig {
    #[serde(rename = "annotated_image")]
    pub annotated_image: PathBuf,
    #[serde(rename = "points_txt")]
    pub points_txt: PathBuf,
    /// Optional dump of the display preview with its click overlays.
    #[serde(default)]
    pub preview_image: Option<PathBuf>,
}

/// One scripted operator input.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventConfig {
    SelectMode { mode: Mode },
    Click { x: f64, y: f64 },
    CornerIndex { value: String },
    Abort,
}

impl EventConfig {
    pub fn to_event(&self) -> InputEvent {
        match self {
            EventConfig::SelectMode { mode } => InputEvent::SelectMode(*mode),
            EventConfig::Click { x, y } => InputEvent::Click { x: *x, y: *y },
            EventConfig::CornerIndex { value } => InputEvent::CornerIndex(value.clone()),
            EventConfig::Abort => InputEvent::Abort,
        }
    }
}

fn default_display_width() -> u32 {
    960
}

pub fn load_config(path: &Path) -> Result<CollectConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_event_script() {
        let json = r#"{
            "params": "camera_params.json",
            "input": "frame.png",
            "events": [
                {"event": "select_mode", "mode": "inferred"},
                {"event": "click", "x": 10.0, "y": 20.0},
                {"event": "corner_index", "value": "2"},
                {"event": "abort"}
            ],
            "output": {
                "annotated_image": "out/result.png",
                "points_txt": "out/points.txt"
            }
        }"#;
        let config: CollectConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.display_width, 960);
        assert_eq!(config.events.len(), 4);
        assert!(matches!(
            config.events[0].to_event(),
            InputEvent::SelectMode(Mode::Inferred)
        ));
        assert!(matches!(config.events[3].to_event(), InputEvent::Abort));
    }
}
