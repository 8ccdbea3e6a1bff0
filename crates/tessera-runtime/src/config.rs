// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Graphics system configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cvars::CvarTable;

/// The display presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// A regular window.
    Windowed,
    /// A borderless window covering the display.
    Borderless,
    /// Exclusive fullscreen.
    Fullscreen,
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self::Windowed
    }
}

/// Which render API implementation backs the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderApi {
    /// The software reference driver.
    Soft,
}

impl Default for RenderApi {
    fn default() -> Self {
        Self::Soft
    }
}

/// Boot configuration of the graphics system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    /// The render API to load.
    pub api: RenderApi,
    /// Display width in texels.
    pub width: u32,
    /// Display height in texels.
    pub height: u32,
    /// Display multisampling sample count.
    pub sample_count: u32,
    /// Display presentation mode.
    pub display_mode: DisplayMode,
    /// Root directory for textures, shaders, and models.
    pub asset_root: PathBuf,
    /// Initial console variables, applied to the application's table.
    pub cvars: serde_json::Map<String, serde_json::Value>,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            api: RenderApi::Soft,
            width: 1280,
            height: 720,
            sample_count: 1,
            display_mode: DisplayMode::Windowed,
            asset_root: PathBuf::from("assets"),
            cvars: serde_json::Map::new(),
        }
    }
}

impl GraphicsConfig {
    /// Loads a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, std::io::Error> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(std::io::Error::other)
    }

    /// Applies the configuration's cvar seed values to a table.
    pub fn seed_cvars(&self, table: &mut CvarTable) {
        for (name, value) in &self.cvars {
            table.set_json(name, value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_headless_friendly() {
        let config = GraphicsConfig::default();
        assert_eq!(config.api, RenderApi::Soft);
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.sample_count, 1);
        assert_eq!(config.display_mode, DisplayMode::Windowed);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: GraphicsConfig =
            serde_json::from_str(r#"{ "width": 640, "display_mode": "borderless" }"#).unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 720);
        assert_eq!(config.display_mode, DisplayMode::Borderless);
    }

    #[test]
    fn load_reads_a_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graphics.json");
        std::fs::write(
            &path,
            r#"{ "api": "soft", "asset_root": "data", "cvars": { "scale": 2.5 } }"#,
        )
        .unwrap();

        let config = GraphicsConfig::load(&path).unwrap();
        assert_eq!(config.asset_root, PathBuf::from("data"));

        let mut table = CvarTable::new();
        config.seed_cvars(&mut table);
        assert_eq!(table.get_float("scale", 1.0), 2.5);
    }
}
