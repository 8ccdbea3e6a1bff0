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

//! The graphics system: device, context, and managers under one roof.

use std::sync::Arc;

use tessera_core::gfx::{Multisampling, RenderContext, RenderDevice, RenderError, ViewId};
use tessera_core::LinearRgba;
use tessera_infra::{SoftDevice, SoftDeviceDescriptor};
use tessera_io::{ShaderManager, TextureManager};

use crate::config::{DisplayMode, GraphicsConfig, RenderApi};

/// Owns the render device, one render context, and the asset managers.
///
/// The system drives the per-frame bracket: [`frame_begin`] clears the
/// display target, the application records its passes on the context, and
/// [`frame_end`] seals and submits the recorded stream.
///
/// [`frame_begin`]: GraphicsSystem::frame_begin
/// [`frame_end`]: GraphicsSystem::frame_end
pub struct GraphicsSystem {
    device: Arc<dyn RenderDevice>,
    context: Box<dyn RenderContext>,
    textures: TextureManager,
    shaders: ShaderManager,
    config: GraphicsConfig,
}

impl GraphicsSystem {
    /// Boots the configured render API and opens its context.
    pub fn new(config: GraphicsConfig) -> Result<Self, RenderError> {
        let device: Arc<dyn RenderDevice> = match config.api {
            RenderApi::Soft => Arc::new(
                SoftDevice::new(&SoftDeviceDescriptor {
                    label: None,
                    width: config.width,
                    height: config.height,
                    multisampling: Multisampling::new(config.sample_count),
                })
                .map_err(|err| RenderError::InitializationFailed(err.to_string()))?,
            ),
        };
        log::info!(
            "graphics system: api {:?}, adapter \"{}\"",
            config.api,
            device.adapter_info().name
        );

        let context = device.create_context()?;
        let textures = TextureManager::new(device.clone(), config.asset_root.clone());
        let shaders = ShaderManager::new(device.clone(), config.asset_root.clone());

        Ok(Self {
            device,
            context,
            textures,
            shaders,
            config,
        })
    }

    /// The render device.
    pub fn device(&self) -> &Arc<dyn RenderDevice> {
        &self.device
    }

    /// The render context.
    pub fn context(&mut self) -> &mut dyn RenderContext {
        self.context.as_mut()
    }

    /// The texture manager.
    pub fn textures(&mut self) -> &mut TextureManager {
        &mut self.textures
    }

    /// The shader manager.
    pub fn shaders(&mut self) -> &mut ShaderManager {
        &mut self.shaders
    }

    /// The active configuration.
    pub fn config(&self) -> &GraphicsConfig {
        &self.config
    }

    /// The display backbuffer render target.
    pub fn display_target(&self) -> ViewId {
        self.device.display_render_target()
    }

    /// Opens the frame by clearing the display target.
    pub fn frame_begin(&mut self, clear_colour: LinearRgba) -> Result<(), RenderError> {
        let target = self.device.display_render_target();
        self.context.clear_render_target(target, clear_colour)?;
        Ok(())
    }

    /// Seals the context's recorded stream and submits it.
    pub fn frame_end(&mut self) -> Result<(), RenderError> {
        self.context.finish();
        self.device.execute_context(self.context.as_mut())?;
        Ok(())
    }

    /// Reconfigures the display, rebuilding the backbuffer.
    ///
    /// Display-sized targets owned by the application (e.g. its depth
    /// target) must be rebuilt by the application afterwards.
    pub fn set_display_mode(
        &mut self,
        mode: DisplayMode,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Result<(), RenderError> {
        self.device
            .resize_display(width, height, Multisampling::new(sample_count))?;
        self.config.display_mode = mode;
        self.config.width = width;
        self.config.height = height;
        self.config.sample_count = sample_count;
        log::info!("display reconfigured: {mode:?} {width}x{height} ({sample_count} sample(s))");
        Ok(())
    }
}

impl Drop for GraphicsSystem {
    fn drop(&mut self) {
        let stats = self.device.stats();
        log::debug!(
            "graphics system shut down after {} submitted frame(s), {} draw call(s)",
            stats.frames_submitted,
            stats.draw_calls
        );
    }
}
