use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use landmarks::SelectionPolicy;
use raster::DecodeLimits;

/// Tunables for one pipeline instance, loadable from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Decode bounds applied to every uploaded photo
    pub decode_limits: DecodeLimits,
    /// Face candidate filtering and disambiguation
    pub selection: SelectionPolicy,
    /// Minimum pupil separation (px) for a stable alignment solve
    pub min_pupil_separation: f32,
    /// Outline stroke width in pixels
    pub stroke_width: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            decode_limits: DecodeLimits::default(),
            selection: SelectionPolicy::default(),
            min_pupil_separation: alignment::MIN_PUPIL_SEPARATION,
            stroke_width: 2,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(std::io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "stroke_width": 4 }"#).unwrap();
        assert_eq!(config.stroke_width, 4);
        assert_eq!(config.decode_limits, DecodeLimits::default());
        assert_eq!(config.selection, SelectionPolicy::default());
    }
}
