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

//! The texture manager: file-to-device texture loading with a path cache.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tessera_core::gfx::{
    ImageKind, Multisampling, RenderDevice, ResourceId, TextureFormat, TextureResourceDescriptor,
    TextureUsage, TextureViewDescriptor, ViewId,
};

use crate::error::AssetError;

/// A non-owning reference to a loaded texture: the resource and its default
/// shader view. Lifetime stays with the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureProxy {
    /// The texture resource.
    pub resource: ResourceId,
    /// The default shader view (2D or cube, per the load call).
    pub view: ViewId,
}

/// Loads image files into device textures and caches them by name.
///
/// Paths are resolved against the manager's root directory. Every decoded
/// image is normalized to RGBA8. Repeated loads of the same name return the
/// cached proxy without touching the device.
pub struct TextureManager {
    device: Arc<dyn RenderDevice>,
    root: PathBuf,
    cache: HashMap<String, TextureProxy>,
}

impl TextureManager {
    /// Creates a manager resolving names against `root`.
    pub fn new(device: Arc<dyn RenderDevice>, root: PathBuf) -> Self {
        Self {
            device,
            root,
            cache: HashMap::new(),
        }
    }

    /// Loads a 2D texture by file name.
    pub fn load_2d(&mut self, name: &str) -> Result<TextureProxy, AssetError> {
        let key = format!("2d:{name}");
        if let Some(proxy) = self.cache.get(&key) {
            return Ok(*proxy);
        }

        let path = self.root.join(name);
        log::info!("loading texture \"{}\"", path.display());
        let pixels = image::open(&path)?.to_rgba8();
        let (width, height) = pixels.dimensions();
        let proxy = self.upload_2d(name, width, height, pixels.as_raw())?;
        self.cache.insert(key, proxy);
        Ok(proxy)
    }

    /// Loads a cube texture by file name.
    ///
    /// Accepted layouts: a vertical strip of six square faces
    /// (`height == 6 * width`), or a single square image replicated onto all
    /// six faces.
    pub fn load_cube(&mut self, name: &str) -> Result<TextureProxy, AssetError> {
        let key = format!("cube:{name}");
        if let Some(proxy) = self.cache.get(&key) {
            return Ok(*proxy);
        }

        let path = self.root.join(name);
        log::info!("loading cube texture \"{}\"", path.display());
        let pixels = image::open(&path)?.to_rgba8();
        let (width, height) = pixels.dimensions();

        let face_pixels: Vec<u8> = if height == 6 * width {
            pixels.into_raw()
        } else if height == width {
            let face = pixels.into_raw();
            let mut all = Vec::with_capacity(face.len() * 6);
            for _ in 0..6 {
                all.extend_from_slice(&face);
            }
            all
        } else {
            return Err(AssetError::UnsupportedImage(format!(
                "cube texture \"{name}\" must be square or a 1x6 vertical strip, got {width}x{height}"
            )));
        };

        let proxy = self.upload_cube(name, width, &face_pixels)?;
        self.cache.insert(key, proxy);
        Ok(proxy)
    }

    /// Registers raw RGBA8 pixels as a 2D texture under `key`.
    ///
    /// Used for procedurally generated content; cached like a file load.
    pub fn insert_raw_2d(
        &mut self,
        key: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureProxy, AssetError> {
        let proxy = self.upload_2d(key, width, height, pixels)?;
        self.cache.insert(format!("2d:{key}"), proxy);
        Ok(proxy)
    }

    /// Registers raw RGBA8 pixels (six faces, slice-major) as a cube texture
    /// under `key`.
    pub fn insert_raw_cube(
        &mut self,
        key: &str,
        face_size: u32,
        pixels: &[u8],
    ) -> Result<TextureProxy, AssetError> {
        let proxy = self.upload_cube(key, face_size, pixels)?;
        self.cache.insert(format!("cube:{key}"), proxy);
        Ok(proxy)
    }

    /// A previously loaded 2D texture, if cached.
    pub fn get_2d(&self, name: &str) -> Option<TextureProxy> {
        self.cache.get(&format!("2d:{name}")).copied()
    }

    /// A previously loaded cube texture, if cached.
    pub fn get_cube(&self, name: &str) -> Option<TextureProxy> {
        self.cache.get(&format!("cube:{name}")).copied()
    }

    fn upload_2d(
        &self,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureProxy, AssetError> {
        let descriptor = TextureResourceDescriptor {
            label: Some(label.to_string().into()),
            width,
            height,
            depth: 0,
            array_size: 1,
            format: TextureFormat::Rgba8,
            usage: TextureUsage::SHADER_RESOURCE,
            kind: ImageKind::Texture2D,
            use_mips: false,
            multisampling: Multisampling::OFF,
        };
        let resource = self.device.create_texture(&descriptor, Some(pixels))?;
        let view = self
            .device
            .create_texture_view_2d(resource, &TextureViewDescriptor::default())?;
        Ok(TextureProxy { resource, view })
    }

    fn upload_cube(
        &self,
        label: &str,
        face_size: u32,
        pixels: &[u8],
    ) -> Result<TextureProxy, AssetError> {
        let descriptor = TextureResourceDescriptor {
            label: Some(label.to_string().into()),
            width: face_size,
            height: face_size,
            depth: 0,
            array_size: 6,
            format: TextureFormat::Rgba8,
            usage: TextureUsage::SHADER_RESOURCE,
            kind: ImageKind::TextureCube,
            use_mips: false,
            multisampling: Multisampling::OFF,
        };
        let resource = self.device.create_texture(&descriptor, Some(pixels))?;
        let view = self.device.create_texture_view_cube(
            resource,
            &TextureViewDescriptor {
                array_index: 0,
                array_count: 6,
            },
        )?;
        Ok(TextureProxy { resource, view })
    }
}
