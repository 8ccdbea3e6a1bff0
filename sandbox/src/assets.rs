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

//! Sandbox asset provisioning.
//!
//! The sandbox is self-contained: it generates its model files and shader
//! stage blobs into a scratch directory at startup and then loads everything
//! back through the regular asset managers, exercising the same paths a
//! shipped application would.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::geometry;

/// Shader programs the scene uses, each as a vertex+pixel pair.
pub const PROGRAMS: [&str; 4] = ["standard", "lightsource", "shadowmap", "skybox"];

/// Guards the scratch directory: assets are written once per process.
static ASSET_ROOT: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Writes the sandbox assets (once per process) and returns the asset root.
pub fn prepare() -> Result<PathBuf> {
    let mut prepared = ASSET_ROOT.lock().unwrap();
    if let Some(root) = prepared.as_ref() {
        return Ok(root.clone());
    }

    let root = std::env::temp_dir().join(format!("tessera-sandbox-{}", std::process::id()));
    std::fs::create_dir_all(&root)
        .with_context(|| format!("creating asset root {}", root.display()))?;

    for name in PROGRAMS {
        for stage in ["vs", "ps"] {
            let path = root.join(format!("{name}.{stage}.tsb"));
            let blob = format!("TSB1:{name}:{stage}");
            std::fs::write(&path, blob.as_bytes())
                .with_context(|| format!("writing {}", path.display()))?;
        }
    }

    geometry::cube("default").write_file(&root.join("cube.tsm"))?;
    std::fs::write(
        root.join("cube.mat.json"),
        r#"{
    "materials": {
        "default": {
            "shininess": 48.0,
            "diffuseColour": [0.85, 0.85, 0.9, 1.0],
            "ambientColour": [0.2, 0.2, 0.2, 1.0]
        }
    }
}
"#,
    )?;

    geometry::uv_sphere("light", 12, 18).write_file(&root.join("sphere.tsm"))?;
    std::fs::write(
        root.join("sphere.mat.json"),
        r#"{
    "materials": {
        "light": {
            "emissiveColour": [1.0, 1.0, 0.9, 1.0]
        }
    }
}
"#,
    )?;

    log::info!("sandbox assets prepared under \"{}\"", root.display());
    *prepared = Some(root.clone());
    Ok(root)
}

/// RGBA8 checkerboard pixels.
pub fn checkerboard_pixels(size: u32, cells: u32) -> Vec<u8> {
    let cell = (size / cells).max(1);
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let dark = ((x / cell) + (y / cell)) % 2 == 0;
            let value = if dark { 60 } else { 220 };
            pixels.extend_from_slice(&[value, value, value, 255]);
        }
    }
    pixels
}

/// RGBA8 pixels for six cube faces (slice-major), a simple vertical sky
/// gradient tinted per face.
pub fn sky_pixels(face_size: u32) -> Vec<u8> {
    const TINTS: [[u32; 3]; 6] = [
        [200, 220, 255],
        [200, 220, 255],
        [230, 240, 255],
        [150, 170, 210],
        [200, 220, 255],
        [200, 220, 255],
    ];

    let mut pixels = Vec::with_capacity((face_size * face_size * 4 * 6) as usize);
    for tint in TINTS {
        for y in 0..face_size {
            let fade = 255 - (y * 80 / face_size.max(1));
            for _ in 0..face_size {
                pixels.extend_from_slice(&[
                    (tint[0] * fade / 255) as u8,
                    (tint[1] * fade / 255) as u8,
                    (tint[2] * fade / 255) as u8,
                    255,
                ]);
            }
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepared_assets_land_on_disk() {
        let root = prepare().unwrap();
        assert!(root.join("standard.vs.tsb").is_file());
        assert!(root.join("skybox.ps.tsb").is_file());
        assert!(root.join("cube.tsm").is_file());
        assert!(root.join("cube.mat.json").is_file());
        assert!(root.join("sphere.tsm").is_file());
    }

    #[test]
    fn pixel_generators_fill_exact_sizes() {
        assert_eq!(checkerboard_pixels(8, 4).len(), 8 * 8 * 4);
        assert_eq!(sky_pixels(4).len(), 4 * 4 * 4 * 6);
    }
}
