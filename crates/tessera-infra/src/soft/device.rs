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

//! The software render device.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tessera_core::gfx::{
    AdapterInfo, BufferResourceDescriptor, DeviceError, DeviceKind, DeviceStats, ImageKind,
    InputChannel, InputFormat, InputLayoutDescriptor, InputLayoutId, Multisampling, RenderContext,
    RenderDevice, ResourceId, SamplerAddressMode, SamplerDescriptor, SamplerFilter, SamplerId,
    ShaderModuleDescriptor, ShaderModuleId, ShaderProgramDescriptor, ShaderProgramId, ShaderStage,
    TextureFormat, TextureResourceDescriptor, TextureUsage, TextureViewDescriptor, ViewId,
};

use super::context::SoftContext;
use super::resource::{
    BufferEntry, ImageEntry, ResourceEntry, SrvDimension, SrvKey, ViewCache, ViewPurpose,
    ViewRecord,
};
use super::shader::{ShaderModuleEntry, ShaderProgramEntry};

/// An input attribute with owned storage, kept in the layout registry.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub(crate) struct LayoutAttribute {
    pub buffer_slot: u32,
    pub semantic: String,
    pub byte_offset: u32,
    pub format: InputFormat,
    pub channel: InputChannel,
}

/// A registered input layout: the vertex module it was reflected against,
/// its attributes, and the minimum vertex record length they address.
#[allow(dead_code)]
#[derive(Debug)]
pub(crate) struct InputLayoutEntry {
    pub shader: ShaderModuleId,
    pub attributes: Vec<LayoutAttribute>,
    pub record_len: u32,
}

/// A registered sampler.
#[allow(dead_code)]
#[derive(Debug)]
pub(crate) struct SamplerEntry {
    pub address: [SamplerAddressMode; 3],
    pub filtering: SamplerFilter,
    pub anisotropy: u32,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub buffers_created: AtomicU64,
    pub textures_created: AtomicU64,
    pub resources_destroyed: AtomicU64,
    pub views_created: AtomicU64,
    pub views_released: AtomicU64,
    pub view_cache_hits: AtomicU64,
    pub shader_modules_created: AtomicU64,
    pub shader_programs_created: AtomicU64,
    pub input_layouts_created: AtomicU64,
    pub samplers_created: AtomicU64,
    pub buffer_updates: AtomicU64,
    pub draw_calls: AtomicU64,
    pub frames_submitted: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> DeviceStats {
        DeviceStats {
            buffers_created: self.buffers_created.load(Ordering::Relaxed),
            textures_created: self.textures_created.load(Ordering::Relaxed),
            resources_destroyed: self.resources_destroyed.load(Ordering::Relaxed),
            views_created: self.views_created.load(Ordering::Relaxed),
            views_released: self.views_released.load(Ordering::Relaxed),
            view_cache_hits: self.view_cache_hits.load(Ordering::Relaxed),
            shader_modules_created: self.shader_modules_created.load(Ordering::Relaxed),
            shader_programs_created: self.shader_programs_created.load(Ordering::Relaxed),
            input_layouts_created: self.input_layouts_created.load(Ordering::Relaxed),
            samplers_created: self.samplers_created.load(Ordering::Relaxed),
            buffer_updates: self.buffer_updates.load(Ordering::Relaxed),
            draw_calls: self.draw_calls.load(Ordering::Relaxed),
            frames_submitted: self.frames_submitted.load(Ordering::Relaxed),
        }
    }
}

/// The display backbuffer bookkeeping. `ResourceId(0)`/`ViewId(0)` are never
/// allocated and mark the not-yet-created state during device construction.
#[derive(Debug)]
struct DisplayTarget {
    resource: ResourceId,
    view: ViewId,
    width: u32,
    height: u32,
}

/// The shared, internally synchronized device state.
pub(crate) struct DeviceShared {
    pub resources: Mutex<HashMap<ResourceId, ResourceEntry>>,
    pub views: Mutex<HashMap<ViewId, ViewRecord>>,
    pub shader_modules: Mutex<HashMap<ShaderModuleId, ShaderModuleEntry>>,
    pub shader_programs: Mutex<HashMap<ShaderProgramId, ShaderProgramEntry>>,
    pub input_layouts: Mutex<HashMap<InputLayoutId, InputLayoutEntry>>,
    pub samplers: Mutex<HashMap<SamplerId, SamplerEntry>>,
    pub counters: Counters,
    pub context_open: AtomicBool,
    display: Mutex<DisplayTarget>,

    next_resource: AtomicUsize,
    next_view: AtomicUsize,
    next_module: AtomicUsize,
    next_program: AtomicUsize,
    next_layout: AtomicUsize,
    next_sampler: AtomicUsize,
}

enum ViewRequest {
    Shader(SrvDimension),
    RenderTarget,
    DepthTarget,
}

impl DeviceShared {
    fn new() -> Self {
        Self {
            resources: Mutex::new(HashMap::new()),
            views: Mutex::new(HashMap::new()),
            shader_modules: Mutex::new(HashMap::new()),
            shader_programs: Mutex::new(HashMap::new()),
            input_layouts: Mutex::new(HashMap::new()),
            samplers: Mutex::new(HashMap::new()),
            counters: Counters::default(),
            context_open: AtomicBool::new(false),
            display: Mutex::new(DisplayTarget {
                resource: ResourceId(0),
                view: ViewId(0),
                width: 0,
                height: 0,
            }),
            next_resource: AtomicUsize::new(1),
            next_view: AtomicUsize::new(1),
            next_module: AtomicUsize::new(1),
            next_program: AtomicUsize::new(1),
            next_layout: AtomicUsize::new(1),
            next_sampler: AtomicUsize::new(1),
        }
    }

    // IDs grow monotonically and are never reused, so destroyed handles can
    // never alias a live object.

    fn next_resource_id(&self) -> ResourceId {
        ResourceId(self.next_resource.fetch_add(1, Ordering::Relaxed))
    }

    fn next_view_id(&self) -> ViewId {
        ViewId(self.next_view.fetch_add(1, Ordering::Relaxed))
    }

    fn create_buffer_entry(
        &self,
        descriptor: &BufferResourceDescriptor,
        initial: Option<&[u8]>,
    ) -> Result<ResourceId, DeviceError> {
        if descriptor.size == 0 {
            return Err(DeviceError::InvalidDescriptor(
                "buffer size must be non-zero".into(),
            ));
        }
        let mut contents = vec![0u8; descriptor.size as usize];
        if let Some(data) = initial {
            if data.len() as u64 != descriptor.size {
                return Err(DeviceError::BufferSizeMismatch {
                    expected: descriptor.size,
                    actual: data.len() as u64,
                });
            }
            contents.copy_from_slice(data);
        }

        let id = self.next_resource_id();
        self.resources.lock().unwrap().insert(
            id,
            ResourceEntry::Buffer(BufferEntry {
                kind: descriptor.kind,
                contents,
            }),
        );
        self.counters.buffers_created.fetch_add(1, Ordering::Relaxed);
        Ok(id)
    }

    fn create_texture_entry(
        &self,
        descriptor: &TextureResourceDescriptor,
        initial: Option<&[u8]>,
    ) -> Result<ResourceId, DeviceError> {
        // D3D11-style resource limits.
        const MAX_DIMENSION: u32 = 16384;
        const MAX_ARRAY_SIZE: u32 = 2048;

        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(DeviceError::InvalidDescriptor(
                "texture dimensions must be non-zero".into(),
            ));
        }
        if descriptor.width > MAX_DIMENSION
            || descriptor.height > MAX_DIMENSION
            || descriptor.depth > MAX_DIMENSION
        {
            return Err(DeviceError::InvalidDescriptor(format!(
                "texture dimensions exceed the {MAX_DIMENSION} texel limit"
            )));
        }
        if descriptor.array_size == 0 || descriptor.array_size > MAX_ARRAY_SIZE {
            return Err(DeviceError::InvalidDescriptor(format!(
                "texture array size must be between 1 and {MAX_ARRAY_SIZE}"
            )));
        }
        if descriptor.usage.is_empty() {
            return Err(DeviceError::InvalidDescriptor(
                "texture usage mask is empty".into(),
            ));
        }
        if descriptor.kind == ImageKind::TextureCube && descriptor.array_size % 6 != 0 {
            return Err(DeviceError::InvalidDescriptor(
                "cube textures need a multiple of six array slices".into(),
            ));
        }
        if descriptor.multisampling.count == 0 {
            return Err(DeviceError::InvalidDescriptor(
                "multisampling count must be at least one".into(),
            ));
        }
        if descriptor.format.is_depth() && descriptor.usage.contains(TextureUsage::RENDER_TARGET) {
            return Err(DeviceError::UnsupportedFormat(descriptor.format));
        }
        if descriptor.usage.contains(TextureUsage::DEPTH_TARGET) && !descriptor.format.is_depth() {
            return Err(DeviceError::UnsupportedFormat(descriptor.format));
        }
        if let Some(data) = initial {
            // Initial data covers mip level zero of every slice.
            let expected = descriptor.slice_len() * descriptor.array_size as usize;
            if data.len() != expected {
                return Err(DeviceError::InvalidDescriptor(format!(
                    "initial texel data is {} bytes, expected {expected}",
                    data.len()
                )));
            }
        }

        let id = self.next_resource_id();
        self.resources.lock().unwrap().insert(
            id,
            ResourceEntry::Image(ImageEntry {
                width: descriptor.width,
                height: descriptor.height,
                array_size: descriptor.array_size,
                format: descriptor.format,
                usage: descriptor.usage,
                kind: descriptor.kind,
                multisampling: descriptor.multisampling,
                views: ViewCache::default(),
            }),
        );
        self.counters
            .textures_created
            .fetch_add(1, Ordering::Relaxed);
        Ok(id)
    }

    fn create_view_entry(
        &self,
        resource: ResourceId,
        descriptor: &TextureViewDescriptor,
        request: ViewRequest,
    ) -> Result<ViewId, DeviceError> {
        let mut resources = self.resources.lock().unwrap();
        let image = resources
            .get_mut(&resource)
            .and_then(ResourceEntry::as_image_mut)
            .ok_or(DeviceError::InvalidHandle)?;

        if descriptor.array_count == 0 {
            return Err(DeviceError::InvalidDescriptor(
                "view array count must be at least one".into(),
            ));
        }
        let slice_end = descriptor
            .array_index
            .checked_add(descriptor.array_count)
            .filter(|end| *end <= image.array_size);
        if slice_end.is_none() {
            return Err(DeviceError::InvalidDescriptor(format!(
                "view slices {}+{} exceed array size {}",
                descriptor.array_index, descriptor.array_count, image.array_size
            )));
        }

        // Validate before touching the cache so a rejected request leaves no
        // partial entry behind.
        let purpose = match &request {
            ViewRequest::Shader(dimension) => {
                if !image.usage.contains(TextureUsage::SHADER_RESOURCE) {
                    return Err(DeviceError::InvalidDescriptor(
                        "texture was not created with SHADER_RESOURCE usage".into(),
                    ));
                }
                if image.multisampling.count > 1 {
                    return Err(DeviceError::InvalidDescriptor(
                        "shader views of multisampled textures are not supported".into(),
                    ));
                }
                if image.format.is_depth() {
                    return Err(DeviceError::UnsupportedFormat(image.format));
                }
                if *dimension == SrvDimension::TextureCube && image.kind != ImageKind::TextureCube {
                    return Err(DeviceError::InvalidDescriptor(
                        "cube view of a non-cube texture".into(),
                    ));
                }
                ViewPurpose::Shader(*dimension)
            }
            ViewRequest::RenderTarget => {
                if !image.usage.contains(TextureUsage::RENDER_TARGET) {
                    return Err(DeviceError::InvalidDescriptor(
                        "texture was not created with RENDER_TARGET usage".into(),
                    ));
                }
                if image.format.is_depth() {
                    return Err(DeviceError::UnsupportedFormat(image.format));
                }
                ViewPurpose::RenderTarget
            }
            ViewRequest::DepthTarget => {
                if !image.usage.contains(TextureUsage::DEPTH_TARGET) {
                    return Err(DeviceError::InvalidDescriptor(
                        "texture was not created with DEPTH_TARGET usage".into(),
                    ));
                }
                if !image.format.is_depth() {
                    return Err(DeviceError::UnsupportedFormat(image.format));
                }
                ViewPurpose::DepthTarget
            }
        };

        let cached = match &request {
            ViewRequest::Shader(dimension) => image.views.srv(&SrvKey {
                array_index: descriptor.array_index,
                array_count: descriptor.array_count,
                dimension: *dimension,
            }),
            ViewRequest::RenderTarget => image.views.rtv(descriptor.array_index),
            ViewRequest::DepthTarget => image.views.dsv(descriptor.array_index),
        };
        if let Some(view) = cached {
            self.counters.view_cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(view);
        }

        let view = self.next_view_id();
        match request {
            ViewRequest::Shader(dimension) => image.views.insert_srv(
                SrvKey {
                    array_index: descriptor.array_index,
                    array_count: descriptor.array_count,
                    dimension,
                },
                view,
            ),
            ViewRequest::RenderTarget => image.views.insert_rtv(descriptor.array_index, view),
            ViewRequest::DepthTarget => image.views.insert_dsv(descriptor.array_index, view),
        }
        self.views
            .lock()
            .unwrap()
            .insert(view, ViewRecord { resource, purpose });
        self.counters.views_created.fetch_add(1, Ordering::Relaxed);
        Ok(view)
    }

    fn release_views(&self, cache: &mut ViewCache) {
        let released = cache.drain();
        if released.is_empty() {
            return;
        }
        let mut views = self.views.lock().unwrap();
        for view in &released {
            views.remove(view);
        }
        self.counters
            .views_released
            .fetch_add(released.len() as u64, Ordering::Relaxed);
    }

    fn destroy_resource_entry(&self, id: ResourceId) -> Result<(), DeviceError> {
        let entry = self
            .resources
            .lock()
            .unwrap()
            .remove(&id)
            .ok_or(DeviceError::InvalidHandle)?;
        match entry {
            ResourceEntry::Buffer(buffer) => {
                log::trace!("destroyed buffer {id:?} ({} bytes)", buffer.contents.len());
            }
            ResourceEntry::Image(mut image) => {
                log::trace!(
                    "destroyed image {id:?} ({}x{}, {} slice(s))",
                    image.width,
                    image.height,
                    image.array_size
                );
                self.release_views(&mut image.views);
            }
        }
        self.counters
            .resources_destroyed
            .fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn rebuild_display(
        &self,
        width: u32,
        height: u32,
        multisampling: Multisampling,
    ) -> Result<(), DeviceError> {
        let descriptor = TextureResourceDescriptor {
            label: Some("display backbuffer".into()),
            width,
            height,
            depth: 0,
            array_size: 1,
            format: TextureFormat::Rgba8,
            usage: TextureUsage::RENDER_TARGET,
            kind: ImageKind::Texture2D,
            use_mips: false,
            multisampling,
        };
        let resource = self.create_texture_entry(&descriptor, None)?;
        let view = self.create_view_entry(
            resource,
            &TextureViewDescriptor::default(),
            ViewRequest::RenderTarget,
        )?;

        let previous = {
            let mut display = self.display.lock().unwrap();
            let previous = display.resource;
            *display = DisplayTarget {
                resource,
                view,
                width,
                height,
            };
            previous
        };
        if previous != ResourceId(0) {
            self.destroy_resource_entry(previous)?;
        }
        Ok(())
    }
}

/// A descriptor for creating a [`SoftDevice`].
#[derive(Debug, Clone)]
pub struct SoftDeviceDescriptor {
    /// An optional adapter label surfaced through [`AdapterInfo`].
    pub label: Option<String>,
    /// Initial display width in texels.
    pub width: u32,
    /// Initial display height in texels.
    pub height: u32,
    /// Display multisampling.
    pub multisampling: Multisampling,
}

impl Default for SoftDeviceDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            width: 1280,
            height: 720,
            multisampling: Multisampling::OFF,
        }
    }
}

/// The software reference implementation of [`RenderDevice`].
///
/// Cloning is cheap and shares the underlying device.
#[derive(Clone)]
pub struct SoftDevice {
    shared: Arc<DeviceShared>,
    name: String,
}

impl SoftDevice {
    /// Creates the device and its display backbuffer.
    pub fn new(descriptor: &SoftDeviceDescriptor) -> Result<Self, DeviceError> {
        let shared = Arc::new(DeviceShared::new());
        shared.rebuild_display(descriptor.width, descriptor.height, descriptor.multisampling)?;
        let name = descriptor
            .label
            .clone()
            .unwrap_or_else(|| "tessera soft device".to_string());
        log::info!(
            "{name}: initialized ({}x{}, {} sample(s))",
            descriptor.width,
            descriptor.height,
            descriptor.multisampling.count
        );
        Ok(Self { shared, name })
    }

    /// Current display dimensions.
    pub fn display_size(&self) -> (u32, u32) {
        let display = self.shared.display.lock().unwrap();
        (display.width, display.height)
    }
}

impl std::fmt::Debug for SoftDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftDevice").field("name", &self.name).finish()
    }
}

impl RenderDevice for SoftDevice {
    fn adapter_info(&self) -> AdapterInfo {
        AdapterInfo {
            name: self.name.clone(),
            kind: DeviceKind::Software,
        }
    }

    fn stats(&self) -> DeviceStats {
        self.shared.counters.snapshot()
    }

    fn create_buffer(
        &self,
        descriptor: &BufferResourceDescriptor,
        initial: Option<&[u8]>,
    ) -> Result<ResourceId, DeviceError> {
        self.shared.create_buffer_entry(descriptor, initial)
    }

    fn create_texture(
        &self,
        descriptor: &TextureResourceDescriptor,
        initial: Option<&[u8]>,
    ) -> Result<ResourceId, DeviceError> {
        self.shared.create_texture_entry(descriptor, initial)
    }

    fn destroy_resource(&self, id: ResourceId) -> Result<(), DeviceError> {
        self.shared.destroy_resource_entry(id)
    }

    fn reset_resource_views(&self, id: ResourceId) -> Result<(), DeviceError> {
        let mut resources = self.shared.resources.lock().unwrap();
        let entry = resources.get_mut(&id).ok_or(DeviceError::InvalidHandle)?;
        if let ResourceEntry::Image(image) = entry {
            // Move the cache out so the registry lock can be dropped before
            // the global view table is updated.
            let mut cache = std::mem::take(&mut image.views);
            drop(resources);
            self.shared.release_views(&mut cache);
        }
        Ok(())
    }

    fn read_buffer(&self, id: ResourceId) -> Result<Vec<u8>, DeviceError> {
        let resources = self.shared.resources.lock().unwrap();
        let buffer = resources
            .get(&id)
            .and_then(ResourceEntry::as_buffer)
            .ok_or(DeviceError::InvalidHandle)?;
        Ok(buffer.contents.clone())
    }

    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, DeviceError> {
        if descriptor.bytecode.is_empty() {
            return Err(DeviceError::InvalidDescriptor(
                "shader bytecode is empty".into(),
            ));
        }
        let id = ShaderModuleId(self.shared.next_module.fetch_add(1, Ordering::Relaxed));
        self.shared.shader_modules.lock().unwrap().insert(
            id,
            ShaderModuleEntry {
                stage: descriptor.stage,
                bytecode: descriptor.bytecode.to_vec(),
            },
        );
        self.shared
            .counters
            .shader_modules_created
            .fetch_add(1, Ordering::Relaxed);
        Ok(id)
    }

    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), DeviceError> {
        self.shared
            .shader_modules
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DeviceError::InvalidHandle)
    }

    fn create_shader_program(
        &self,
        descriptor: &ShaderProgramDescriptor,
    ) -> Result<ShaderProgramId, DeviceError> {
        if descriptor.stages.is_empty() {
            return Err(DeviceError::InvalidDescriptor(
                "shader program has no stages".into(),
            ));
        }
        {
            let modules = self.shared.shader_modules.lock().unwrap();
            for (stage, module) in descriptor.stages.iter() {
                let Some(module) = module else { continue };
                let entry = modules.get(&module).ok_or(DeviceError::InvalidHandle)?;
                if entry.stage != stage {
                    return Err(DeviceError::StageMismatch {
                        expected: stage,
                        found: entry.stage,
                    });
                }
            }
        }
        let id = ShaderProgramId(self.shared.next_program.fetch_add(1, Ordering::Relaxed));
        self.shared.shader_programs.lock().unwrap().insert(
            id,
            ShaderProgramEntry {
                stages: descriptor.stages,
            },
        );
        self.shared
            .counters
            .shader_programs_created
            .fetch_add(1, Ordering::Relaxed);
        Ok(id)
    }

    fn destroy_shader_program(&self, id: ShaderProgramId) -> Result<(), DeviceError> {
        self.shared
            .shader_programs
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DeviceError::InvalidHandle)
    }

    fn create_input_layout(
        &self,
        descriptor: &InputLayoutDescriptor,
    ) -> Result<InputLayoutId, DeviceError> {
        {
            let modules = self.shared.shader_modules.lock().unwrap();
            let module = modules
                .get(&descriptor.shader)
                .ok_or(DeviceError::InvalidHandle)?;
            if module.stage != ShaderStage::Vertex {
                return Err(DeviceError::StageMismatch {
                    expected: ShaderStage::Vertex,
                    found: module.stage,
                });
            }
            debug_assert!(!module.bytecode.is_empty());
        }
        if descriptor.attributes.is_empty() {
            return Err(DeviceError::InvalidDescriptor(
                "input layout has no attributes".into(),
            ));
        }
        let mut record_len = 0u32;
        for (i, attribute) in descriptor.attributes.iter().enumerate() {
            for earlier in &descriptor.attributes[..i] {
                if earlier.buffer_slot == attribute.buffer_slot
                    && earlier.semantic == attribute.semantic
                {
                    return Err(DeviceError::InvalidDescriptor(format!(
                        "duplicate input semantic '{}' on slot {}",
                        attribute.semantic, attribute.buffer_slot
                    )));
                }
            }
            record_len =
                record_len.max(attribute.byte_offset.saturating_add(attribute.format.byte_size()));
        }

        let id = InputLayoutId(self.shared.next_layout.fetch_add(1, Ordering::Relaxed));
        self.shared.input_layouts.lock().unwrap().insert(
            id,
            InputLayoutEntry {
                shader: descriptor.shader,
                attributes: descriptor
                    .attributes
                    .iter()
                    .map(|a| LayoutAttribute {
                        buffer_slot: a.buffer_slot,
                        semantic: a.semantic.clone().into_owned(),
                        byte_offset: a.byte_offset,
                        format: a.format,
                        channel: a.channel,
                    })
                    .collect(),
                record_len,
            },
        );
        self.shared
            .counters
            .input_layouts_created
            .fetch_add(1, Ordering::Relaxed);
        Ok(id)
    }

    fn destroy_input_layout(&self, id: InputLayoutId) -> Result<(), DeviceError> {
        self.shared
            .input_layouts
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DeviceError::InvalidHandle)
    }

    fn create_sampler(&self, descriptor: &SamplerDescriptor) -> Result<SamplerId, DeviceError> {
        if descriptor.anisotropy == 0 {
            return Err(DeviceError::InvalidDescriptor(
                "sampler anisotropy must be at least one".into(),
            ));
        }
        let id = SamplerId(self.shared.next_sampler.fetch_add(1, Ordering::Relaxed));
        self.shared.samplers.lock().unwrap().insert(
            id,
            SamplerEntry {
                address: [
                    descriptor.address_u,
                    descriptor.address_v,
                    descriptor.address_w,
                ],
                filtering: descriptor.filtering,
                anisotropy: descriptor.anisotropy,
            },
        );
        self.shared
            .counters
            .samplers_created
            .fetch_add(1, Ordering::Relaxed);
        Ok(id)
    }

    fn destroy_sampler(&self, id: SamplerId) -> Result<(), DeviceError> {
        self.shared
            .samplers
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DeviceError::InvalidHandle)
    }

    fn create_texture_view_2d(
        &self,
        resource: ResourceId,
        descriptor: &TextureViewDescriptor,
    ) -> Result<ViewId, DeviceError> {
        self.shared
            .create_view_entry(resource, descriptor, ViewRequest::Shader(SrvDimension::Texture2D))
    }

    fn create_texture_view_cube(
        &self,
        resource: ResourceId,
        descriptor: &TextureViewDescriptor,
    ) -> Result<ViewId, DeviceError> {
        self.shared.create_view_entry(
            resource,
            descriptor,
            ViewRequest::Shader(SrvDimension::TextureCube),
        )
    }

    fn create_render_target_view(
        &self,
        resource: ResourceId,
        descriptor: &TextureViewDescriptor,
    ) -> Result<ViewId, DeviceError> {
        self.shared
            .create_view_entry(resource, descriptor, ViewRequest::RenderTarget)
    }

    fn create_depth_target_view(
        &self,
        resource: ResourceId,
        descriptor: &TextureViewDescriptor,
    ) -> Result<ViewId, DeviceError> {
        self.shared
            .create_view_entry(resource, descriptor, ViewRequest::DepthTarget)
    }

    fn display_render_target(&self) -> ViewId {
        self.shared.display.lock().unwrap().view
    }

    fn resize_display(
        &self,
        width: u32,
        height: u32,
        multisampling: Multisampling,
    ) -> Result<(), DeviceError> {
        self.shared.rebuild_display(width, height, multisampling)
    }

    fn create_context(&self) -> Result<Box<dyn RenderContext>, DeviceError> {
        if self
            .shared
            .context_open
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DeviceError::ContextBusy);
        }
        Ok(Box::new(SoftContext::new(Arc::clone(&self.shared))))
    }

    fn execute_context(&self, context: &mut dyn RenderContext) -> Result<(), DeviceError> {
        let soft = context
            .as_any_mut()
            .downcast_mut::<SoftContext>()
            .ok_or_else(|| DeviceError::Backend("context belongs to a different driver".into()))?;
        if !soft.shares_device(&self.shared) {
            return Err(DeviceError::Backend(
                "context belongs to a different device".into(),
            ));
        }
        if !soft.is_finished() {
            return Err(DeviceError::ContextNotFinished);
        }
        let ops = soft.take_submission();
        self.shared
            .counters
            .frames_submitted
            .fetch_add(1, Ordering::Relaxed);
        log::trace!("{}: submitted {} recorded op(s)", self.name, ops);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use tessera_core::gfx::InputAttributeDescriptor;

    pub(crate) fn device() -> SoftDevice {
        SoftDevice::new(&SoftDeviceDescriptor::default()).unwrap()
    }

    pub(crate) fn colour_texture(
        array_size: u32,
        kind: ImageKind,
        usage: TextureUsage,
    ) -> TextureResourceDescriptor<'static> {
        TextureResourceDescriptor {
            label: None,
            width: 1024,
            height: 1024,
            depth: 0,
            array_size,
            format: TextureFormat::Rgba8,
            usage,
            kind,
            use_mips: false,
            multisampling: Multisampling::OFF,
        }
    }

    pub(crate) fn vertex_module(device: &SoftDevice) -> ShaderModuleId {
        device
            .create_shader_module(&ShaderModuleDescriptor {
                label: None,
                stage: ShaderStage::Vertex,
                bytecode: Cow::Borrowed(&[1, 2, 3, 4]),
            })
            .unwrap()
    }

    pub(crate) fn pixel_module(device: &SoftDevice) -> ShaderModuleId {
        device
            .create_shader_module(&ShaderModuleDescriptor {
                label: None,
                stage: ShaderStage::Pixel,
                bytecode: Cow::Borrowed(&[5, 6, 7, 8]),
            })
            .unwrap()
    }

    #[test]
    fn buffer_round_trips_initial_contents() {
        let device = device();
        let data = [7u8, 9, 11, 13];
        let id = device
            .create_buffer(
                &BufferResourceDescriptor::new(4, tessera_core::gfx::BufferKind::Vertex),
                Some(&data),
            )
            .unwrap();
        assert_eq!(device.read_buffer(id).unwrap(), data);
    }

    #[test]
    fn buffer_initial_data_must_match_size() {
        let device = device();
        let err = device
            .create_buffer(
                &BufferResourceDescriptor::new(8, tessera_core::gfx::BufferKind::Vertex),
                Some(&[1, 2, 3]),
            )
            .unwrap_err();
        assert_eq!(
            err,
            DeviceError::BufferSizeMismatch {
                expected: 8,
                actual: 3
            }
        );
    }

    #[test]
    fn destroyed_handles_stay_invalid_forever() {
        let device = device();
        let id = device
            .create_buffer(
                &BufferResourceDescriptor::new(4, tessera_core::gfx::BufferKind::Constants),
                None,
            )
            .unwrap();
        device.destroy_resource(id).unwrap();
        assert_eq!(device.read_buffer(id), Err(DeviceError::InvalidHandle));
        assert_eq!(device.destroy_resource(id), Err(DeviceError::InvalidHandle));

        // A fresh resource never reuses the old handle value.
        let fresh = device
            .create_buffer(
                &BufferResourceDescriptor::new(4, tessera_core::gfx::BufferKind::Constants),
                None,
            )
            .unwrap();
        assert_ne!(fresh, id);
    }

    #[test]
    fn shader_view_requests_with_equal_keys_share_one_view() {
        let device = device();
        let texture = device
            .create_texture(
                &colour_texture(4, ImageKind::Texture2D, TextureUsage::SHADER_RESOURCE),
                None,
            )
            .unwrap();
        let descriptor = TextureViewDescriptor {
            array_index: 1,
            array_count: 2,
        };

        let before = device.stats();
        let first = device.create_texture_view_2d(texture, &descriptor).unwrap();
        let second = device.create_texture_view_2d(texture, &descriptor).unwrap();
        let after = device.stats();

        assert_eq!(first, second);
        assert_eq!(after.views_created - before.views_created, 1);
        assert_eq!(after.view_cache_hits - before.view_cache_hits, 1);
    }

    #[test]
    fn srv_key_fields_separate_cache_entries() {
        let device = device();
        let texture = device
            .create_texture(
                &colour_texture(6, ImageKind::TextureCube, TextureUsage::SHADER_RESOURCE),
                None,
            )
            .unwrap();

        let a = device
            .create_texture_view_2d(
                texture,
                &TextureViewDescriptor {
                    array_index: 0,
                    array_count: 1,
                },
            )
            .unwrap();
        let b = device
            .create_texture_view_2d(
                texture,
                &TextureViewDescriptor {
                    array_index: 0,
                    array_count: 6,
                },
            )
            .unwrap();
        let c = device
            .create_texture_view_cube(
                texture,
                &TextureViewDescriptor {
                    array_index: 0,
                    array_count: 6,
                },
            )
            .unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn cube_faces_cache_six_views_and_reset_releases_them() {
        let device = device();
        let cube = device
            .create_texture(
                &colour_texture(
                    6,
                    ImageKind::TextureCube,
                    TextureUsage::SHADER_RESOURCE | TextureUsage::RENDER_TARGET,
                ),
                None,
            )
            .unwrap();

        let before = device.stats();
        let mut faces = Vec::new();
        for face in 0..6u32 {
            let view = device
                .create_render_target_view(
                    cube,
                    &TextureViewDescriptor {
                        array_index: face,
                        array_count: 1,
                    },
                )
                .unwrap();
            faces.push(view);
        }
        // Second frame over the same faces: all hits, nothing created.
        for face in 0..6u32 {
            let view = device
                .create_render_target_view(
                    cube,
                    &TextureViewDescriptor {
                        array_index: face,
                        array_count: 1,
                    },
                )
                .unwrap();
            assert_eq!(view, faces[face as usize]);
        }
        let cached = device.stats();
        assert_eq!(cached.views_created - before.views_created, 6);
        assert_eq!(cached.view_cache_hits - before.view_cache_hits, 6);
        faces.sort_by_key(|v| v.0);
        faces.dedup();
        assert_eq!(faces.len(), 6);

        device.reset_resource_views(cube).unwrap();
        let reset = device.stats();
        assert_eq!(reset.views_released - cached.views_released, 6);

        // The cache is cold again after a reset.
        device
            .create_render_target_view(
                cube,
                &TextureViewDescriptor {
                    array_index: 0,
                    array_count: 1,
                },
            )
            .unwrap();
        assert_eq!(device.stats().views_created - cached.views_created, 1);
    }

    #[test]
    fn rejected_view_requests_insert_no_cache_entry() {
        let device = device();
        let texture = device
            .create_texture(
                &colour_texture(1, ImageKind::Texture2D, TextureUsage::SHADER_RESOURCE),
                None,
            )
            .unwrap();

        let before = device.stats();
        // Not created with RENDER_TARGET usage.
        let err = device
            .create_render_target_view(texture, &TextureViewDescriptor::default())
            .unwrap_err();
        assert!(matches!(err, DeviceError::InvalidDescriptor(_)));
        // The same rejected request fails identically; nothing was cached.
        let err = device
            .create_render_target_view(texture, &TextureViewDescriptor::default())
            .unwrap_err();
        assert!(matches!(err, DeviceError::InvalidDescriptor(_)));
        let after = device.stats();
        assert_eq!(after.views_created, before.views_created);
        assert_eq!(after.view_cache_hits, before.view_cache_hits);
    }

    #[test]
    fn view_type_follows_resource_format() {
        let device = device();
        let depth = device
            .create_texture(
                &TextureResourceDescriptor {
                    format: TextureFormat::Depth32Float,
                    usage: TextureUsage::DEPTH_TARGET,
                    ..colour_texture(1, ImageKind::Texture2D, TextureUsage::DEPTH_TARGET)
                },
                None,
            )
            .unwrap();
        assert!(device
            .create_depth_target_view(depth, &TextureViewDescriptor::default())
            .is_ok());

        // A colour target cannot be created with a depth format, and a
        // depth target cannot be created from a colour texture.
        let err = device
            .create_texture(
                &TextureResourceDescriptor {
                    format: TextureFormat::Depth32Float,
                    usage: TextureUsage::RENDER_TARGET,
                    ..colour_texture(1, ImageKind::Texture2D, TextureUsage::RENDER_TARGET)
                },
                None,
            )
            .unwrap_err();
        assert_eq!(err, DeviceError::UnsupportedFormat(TextureFormat::Depth32Float));
        let err = device
            .create_texture(
                &TextureResourceDescriptor {
                    format: TextureFormat::Rgba8,
                    usage: TextureUsage::DEPTH_TARGET,
                    ..colour_texture(1, ImageKind::Texture2D, TextureUsage::DEPTH_TARGET)
                },
                None,
            )
            .unwrap_err();
        assert_eq!(err, DeviceError::UnsupportedFormat(TextureFormat::Rgba8));
    }

    #[test]
    fn views_of_buffers_are_rejected() {
        let device = device();
        let buffer = device
            .create_buffer(
                &BufferResourceDescriptor::new(16, tessera_core::gfx::BufferKind::Vertex),
                None,
            )
            .unwrap();
        assert_eq!(
            device.create_texture_view_2d(buffer, &TextureViewDescriptor::default()),
            Err(DeviceError::InvalidHandle)
        );
    }

    #[test]
    fn view_slices_must_fit_the_array() {
        let device = device();
        let texture = device
            .create_texture(
                &colour_texture(2, ImageKind::Texture2D, TextureUsage::SHADER_RESOURCE),
                None,
            )
            .unwrap();
        let err = device
            .create_texture_view_2d(
                texture,
                &TextureViewDescriptor {
                    array_index: 1,
                    array_count: 2,
                },
            )
            .unwrap_err();
        assert!(matches!(err, DeviceError::InvalidDescriptor(_)));
    }

    #[test]
    fn program_rejects_module_on_wrong_stage() {
        let device = device();
        let pixel = pixel_module(&device);
        // Attached under the vertex slot.
        let err = device
            .create_shader_program(&ShaderProgramDescriptor::new().vertex(pixel))
            .unwrap_err();
        assert_eq!(
            err,
            DeviceError::StageMismatch {
                expected: ShaderStage::Vertex,
                found: ShaderStage::Pixel,
            }
        );
    }

    #[test]
    fn program_rejects_unknown_modules_and_empty_sets() {
        let device = device();
        let err = device
            .create_shader_program(&ShaderProgramDescriptor::new().vertex(ShaderModuleId(999)))
            .unwrap_err();
        assert_eq!(err, DeviceError::InvalidHandle);

        let err = device
            .create_shader_program(&ShaderProgramDescriptor::new())
            .unwrap_err();
        assert!(matches!(err, DeviceError::InvalidDescriptor(_)));
    }

    #[test]
    fn input_layout_requires_a_vertex_module() {
        let device = device();
        let pixel = pixel_module(&device);
        let attributes = [InputAttributeDescriptor {
            buffer_slot: 0,
            semantic: Cow::Borrowed("POSITION"),
            byte_offset: 0,
            format: InputFormat::Float4,
            channel: InputChannel::PerVertex,
        }];
        let err = device
            .create_input_layout(&InputLayoutDescriptor {
                label: None,
                shader: pixel,
                attributes: Cow::Borrowed(&attributes),
            })
            .unwrap_err();
        assert_eq!(
            err,
            DeviceError::StageMismatch {
                expected: ShaderStage::Vertex,
                found: ShaderStage::Pixel,
            }
        );
    }

    #[test]
    fn input_layout_rejects_duplicate_semantics() {
        let device = device();
        let vertex = vertex_module(&device);
        let attributes = [
            InputAttributeDescriptor {
                buffer_slot: 0,
                semantic: Cow::Borrowed("POSITION"),
                byte_offset: 0,
                format: InputFormat::Float4,
                channel: InputChannel::PerVertex,
            },
            InputAttributeDescriptor {
                buffer_slot: 0,
                semantic: Cow::Borrowed("POSITION"),
                byte_offset: 16,
                format: InputFormat::Float4,
                channel: InputChannel::PerVertex,
            },
        ];
        let err = device
            .create_input_layout(&InputLayoutDescriptor {
                label: None,
                shader: vertex,
                attributes: Cow::Borrowed(&attributes),
            })
            .unwrap_err();
        assert!(matches!(err, DeviceError::InvalidDescriptor(_)));
    }

    #[test]
    fn one_context_at_a_time() {
        let device = device();
        let first = device.create_context().unwrap();
        assert!(matches!(
            device.create_context().map(|_| ()),
            Err(DeviceError::ContextBusy)
        ));
        drop(first);
        assert!(device.create_context().is_ok());
    }

    #[test]
    fn unfinished_context_cannot_be_submitted() {
        let device = device();
        let mut context = device.create_context().unwrap();
        assert_eq!(
            device.execute_context(context.as_mut()),
            Err(DeviceError::ContextNotFinished)
        );
        context.finish();
        assert!(device.execute_context(context.as_mut()).is_ok());
        assert_eq!(device.stats().frames_submitted, 1);
    }

    #[test]
    fn resize_display_swaps_the_backbuffer() {
        let device = device();
        let old_view = device.display_render_target();
        let before = device.stats();
        device
            .resize_display(640, 360, Multisampling::OFF)
            .unwrap();
        let new_view = device.display_render_target();
        assert_ne!(old_view, new_view);
        assert_eq!(device.display_size(), (640, 360));
        let after = device.stats();
        assert_eq!(after.views_released - before.views_released, 1);
        assert_eq!(after.resources_destroyed - before.resources_destroyed, 1);
    }
}
