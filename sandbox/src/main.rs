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

// Tessera sandbox: renders a lit, shadowed model with a skybox headlessly
// for a fixed number of frames. Usage: sandbox [frames] [config.json]

mod assets;
mod geometry;
mod scene;
mod uniforms;

use anyhow::{Context, Result};
use std::path::Path;

use tessera_core::LinearRgba;
use tessera_runtime::{CvarTable, GraphicsConfig, GraphicsSystem};

use crate::scene::SandboxScene;

fn main() -> Result<()> {
    use env_logger::{Builder, Env};
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let frames: u32 = match args.next() {
        Some(arg) => arg.parse().context("frame count must be a number")?,
        None => 8,
    };

    let mut config = match args.next() {
        Some(path) => GraphicsConfig::load(Path::new(&path))
            .with_context(|| format!("loading config \"{path}\""))?,
        None => GraphicsConfig::default(),
    };
    config.asset_root = assets::prepare()?;

    let mut cvars = CvarTable::new();
    config.seed_cvars(&mut cvars);

    let mut system = GraphicsSystem::new(config)?;
    let mut scene = SandboxScene::new(&mut system)?;

    let clear = LinearRgba::new(0.05, 0.05, 0.08, 1.0);
    let dt = 1.0 / 60.0;
    for frame in 0..frames {
        system.frame_begin(clear)?;
        scene.frame(&mut system, &cvars, dt)?;
        system.frame_end()?;

        let stats = system.device().stats();
        log::info!(
            "frame {frame}: {} draw call(s) total, {} view cache hit(s)",
            stats.draw_calls,
            stats.view_cache_hits
        );
    }

    let stats = system.device().stats();
    log::info!(
        "done: {} frame(s), {} draw call(s), {} buffer update(s), {} view(s) created",
        stats.frames_submitted,
        stats.draw_calls,
        stats.buffer_updates,
        stats.views_created
    );
    Ok(())
}
