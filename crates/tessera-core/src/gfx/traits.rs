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

//! The render device and render context contracts.

use crate::color::LinearRgba;
use crate::gfx::{
    AdapterInfo, BufferResourceDescriptor, DeviceError, DeviceStats, InputLayoutDescriptor,
    InputLayoutId, Multisampling, RenderCommand, ResourceId, SamplerDescriptor, SamplerId,
    ShaderModuleDescriptor, ShaderModuleId, ShaderProgramDescriptor, ShaderProgramId,
    TextureResourceDescriptor, TextureViewDescriptor, ViewId,
};
use std::any::Any;

/// The device owning all GPU-backed objects.
///
/// Creation calls take a plain descriptor and return the new handle or a
/// specific [`DeviceError`]; on failure no handle is allocated. Creation and
/// destruction may be driven from a different thread than the one driving a
/// context only if externally serialized; the device provides no internal
/// ordering between mutations.
pub trait RenderDevice: Send + Sync + 'static {
    /// Information about the adapter backing this device.
    fn adapter_info(&self) -> AdapterInfo;

    /// A snapshot of the device's cumulative counters.
    fn stats(&self) -> DeviceStats;

    /// Creates a buffer resource, optionally copying `initial` into it.
    ///
    /// When `initial` is given its length must equal the descriptor size.
    fn create_buffer(
        &self,
        descriptor: &BufferResourceDescriptor,
        initial: Option<&[u8]>,
    ) -> Result<ResourceId, DeviceError>;

    /// Creates a texture resource, optionally with initial texel data laid
    /// out slice-by-slice.
    fn create_texture(
        &self,
        descriptor: &TextureResourceDescriptor,
        initial: Option<&[u8]>,
    ) -> Result<ResourceId, DeviceError>;

    /// Destroys a resource, releasing every view derived from it.
    fn destroy_resource(&self, id: ResourceId) -> Result<(), DeviceError>;

    /// Releases all cached views of a resource without destroying it.
    ///
    /// `destroy_resource` performs this implicitly; it is exposed for
    /// callers that recycle a resource's views (e.g. on display resize).
    fn reset_resource_views(&self, id: ResourceId) -> Result<(), DeviceError>;

    /// Reads back the full contents of a buffer resource.
    ///
    /// Blocking; intended for tooling and tests.
    fn read_buffer(&self, id: ResourceId) -> Result<Vec<u8>, DeviceError>;

    /// Creates a compiled shader stage module. The bytecode is retained for
    /// reflection (input layout validation).
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, DeviceError>;

    /// Destroys a shader stage module.
    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), DeviceError>;

    /// Creates a shader program from per-stage modules.
    ///
    /// Every attached module must have been compiled for the stage it is
    /// attached under; a mismatch is a programming error and fails with
    /// [`DeviceError::StageMismatch`]. Programs that are not drawable may
    /// still be created; drawability is enforced at execution.
    fn create_shader_program(
        &self,
        descriptor: &ShaderProgramDescriptor,
    ) -> Result<ShaderProgramId, DeviceError>;

    /// Destroys a shader program. The attached modules stay alive.
    fn destroy_shader_program(&self, id: ShaderProgramId) -> Result<(), DeviceError>;

    /// Creates an input layout validated against the vertex module's
    /// retained bytecode.
    fn create_input_layout(
        &self,
        descriptor: &InputLayoutDescriptor,
    ) -> Result<InputLayoutId, DeviceError>;

    /// Destroys an input layout.
    fn destroy_input_layout(&self, id: InputLayoutId) -> Result<(), DeviceError>;

    /// Creates a texture sampler.
    fn create_sampler(&self, descriptor: &SamplerDescriptor) -> Result<SamplerId, DeviceError>;

    /// Destroys a sampler.
    fn destroy_sampler(&self, id: SamplerId) -> Result<(), DeviceError>;

    /// Returns a shader-readable 2D view of a texture resource.
    ///
    /// Views are cached per resource and keyed by the full
    /// `(array_index, array_count)` pair plus the view dimensionality:
    /// repeating a request returns the identical view with no device work.
    fn create_texture_view_2d(
        &self,
        resource: ResourceId,
        descriptor: &TextureViewDescriptor,
    ) -> Result<ViewId, DeviceError>;

    /// Returns a shader-readable cubemap view of a texture resource.
    /// Cached like [`create_texture_view_2d`](Self::create_texture_view_2d).
    fn create_texture_view_cube(
        &self,
        resource: ResourceId,
        descriptor: &TextureViewDescriptor,
    ) -> Result<ViewId, DeviceError>;

    /// Returns a render-target view of one array slice of a texture.
    /// Cached per resource, keyed by `array_index`.
    fn create_render_target_view(
        &self,
        resource: ResourceId,
        descriptor: &TextureViewDescriptor,
    ) -> Result<ViewId, DeviceError>;

    /// Returns a depth-target view of one array slice of a texture.
    /// Cached per resource, keyed by `array_index`.
    fn create_depth_target_view(
        &self,
        resource: ResourceId,
        descriptor: &TextureViewDescriptor,
    ) -> Result<ViewId, DeviceError>;

    /// The render-target view of the display backbuffer.
    fn display_render_target(&self) -> ViewId;

    /// Recreates the display backbuffer with new dimensions, releasing the
    /// previous backbuffer views.
    fn resize_display(
        &self,
        width: u32,
        height: u32,
        multisampling: Multisampling,
    ) -> Result<(), DeviceError>;

    /// Opens a render context.
    ///
    /// This engine guarantees correctness for one live context at a time;
    /// opening a second concurrently fails with
    /// [`DeviceError::ContextBusy`]. Further contexts are an extension
    /// point, not a capability.
    fn create_context(&self) -> Result<Box<dyn RenderContext>, DeviceError>;

    /// Submits a finished context's recorded stream for execution and
    /// reopens the context for the next frame.
    fn execute_context(&self, context: &mut dyn RenderContext) -> Result<(), DeviceError>;
}

/// A recording surface executing render commands against the device.
///
/// All operations apply synchronously, in call order, to the context's
/// command stream; no reordering occurs. A context is not reentrant and must
/// be driven from one thread at a time.
pub trait RenderContext: Send {
    /// Clears a colour render target to `colour`.
    fn clear_render_target(&mut self, view: ViewId, colour: LinearRgba)
        -> Result<(), DeviceError>;

    /// Clears a depth target to `depth`.
    fn clear_depth_target(&mut self, view: ViewId, depth: f32) -> Result<(), DeviceError>;

    /// Replaces the full contents of a buffer resource.
    ///
    /// `data` must match the buffer's byte size exactly.
    fn update_buffer(&mut self, resource: ResourceId, data: &[u8]) -> Result<(), DeviceError>;

    /// Validates and executes one draw command.
    ///
    /// Validation happens in full before any state change: a rejected
    /// command has no side effects. On success the context applies, in
    /// order: targets and viewport, a total-coverage shader stage bind
    /// (present stages bound, absent stages explicitly unbound), the input
    /// layout, vertex/index buffers, texture/sampler/uniform slots, and the
    /// draw itself (indexed when [`RenderCommand::is_indexed`] holds,
    /// non-indexed otherwise).
    fn execute(&mut self, command: &RenderCommand) -> Result<(), DeviceError>;

    /// Marks the recorded stream complete for submission.
    fn finish(&mut self);

    /// Whether [`finish`](Self::finish) has been called since the last
    /// submission.
    fn is_finished(&self) -> bool;

    /// Downcast support for drivers submitting their own context type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
