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

//! The software render context.

use std::any::Any;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tessera_core::gfx::{
    BufferKind, DeviceError, InputLayoutId, RenderCommand, RenderContext, ResourceId, SamplerId,
    ShaderProgramId, StageSet, ViewId, Viewport, MAX_RENDER_TARGETS, MAX_SAMPLER_SLOTS,
    MAX_TEXTURE_SLOTS, MAX_UNIFORM_BUFFERS,
};
use tessera_core::LinearRgba;

use super::device::DeviceShared;
use super::resource::{ResourceEntry, ViewPurpose};
use super::shader::StageBindings;

/// One draw as it reaches the command stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DrawCall {
    /// Indexed draw over `start..start + count` with a base vertex offset.
    Indexed { start: u32, count: u32, base: i32 },
    /// Non-indexed draw over `start..start + count` vertices.
    Linear { start: u32, count: u32 },
}

/// An operation recorded into the context's command stream.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RecordedOp {
    ClearTarget { view: ViewId, colour: [f32; 4] },
    ClearDepth { view: ViewId, depth: f32 },
    UpdateBuffer { resource: ResourceId, bytes: u64 },
    Draw(DrawCall),
}

/// The retained pipeline state of the context. Native contexts keep all of
/// this across draws, which is why command execution rebinds it wholesale.
#[allow(dead_code)]
#[derive(Debug, Default)]
struct RetainedState {
    render_targets: [Option<ViewId>; MAX_RENDER_TARGETS],
    depth_target: Option<ViewId>,
    viewport: Viewport,
    program: Option<ShaderProgramId>,
    input_layout: Option<InputLayoutId>,
    vertex_buffer: Option<ResourceId>,
    index_buffer: Option<ResourceId>,
    vertex_stride: u32,
    textures: [Option<ViewId>; MAX_TEXTURE_SLOTS],
    samplers: [Option<SamplerId>; MAX_SAMPLER_SLOTS],
    uniform_buffers: [Option<ResourceId>; MAX_UNIFORM_BUFFERS],
}

/// The software implementation of [`RenderContext`].
///
/// Operations apply synchronously and in call order. `execute` validates a
/// command completely before touching any retained state, so a rejected
/// command has no side effects at all.
pub struct SoftContext {
    shared: Arc<DeviceShared>,
    bindings: StageBindings,
    state: RetainedState,
    journal: Vec<RecordedOp>,
    finished: bool,
}

impl SoftContext {
    pub(crate) fn new(shared: Arc<DeviceShared>) -> Self {
        Self {
            shared,
            bindings: StageBindings::new(),
            state: RetainedState::default(),
            journal: Vec::new(),
            finished: false,
        }
    }

    pub(crate) fn shares_device(&self, shared: &Arc<DeviceShared>) -> bool {
        Arc::ptr_eq(&self.shared, shared)
    }

    /// Drains the sealed command stream and reopens the context. Returns the
    /// number of submitted operations.
    pub(crate) fn take_submission(&mut self) -> usize {
        let ops = self.journal.len();
        self.journal.clear();
        self.finished = false;
        ops
    }

    #[cfg(test)]
    pub(crate) fn journal(&self) -> &[RecordedOp] {
        &self.journal
    }

    #[cfg(test)]
    pub(crate) fn bound_stage(
        &self,
        stage: tessera_core::gfx::ShaderStage,
    ) -> Option<tessera_core::gfx::ShaderModuleId> {
        self.bindings.bound(stage)
    }

    #[cfg(test)]
    pub(crate) fn retained_vertex_buffer(&self) -> Option<ResourceId> {
        self.state.vertex_buffer
    }

    #[cfg(test)]
    pub(crate) fn retained_viewport(&self) -> Viewport {
        self.state.viewport
    }

    fn ensure_open(&self) -> Result<(), DeviceError> {
        if self.finished {
            Err(DeviceError::ContextSealed)
        } else {
            Ok(())
        }
    }

    fn view_purpose(&self, view: ViewId) -> Result<ViewPurpose, DeviceError> {
        self.shared
            .views
            .lock()
            .unwrap()
            .get(&view)
            .map(|record| record.purpose)
            .ok_or(DeviceError::InvalidHandle)
    }

    /// Full command validation. Read-only: performed before any state change
    /// so a failed command has no partial side effects.
    fn validate(&self, command: &RenderCommand) -> Result<StageSet, DeviceError> {
        let program_id = command
            .program
            .ok_or_else(|| DeviceError::InvalidCommand("no shader program bound".into()))?;
        let stages = {
            let programs = self.shared.shader_programs.lock().unwrap();
            programs
                .get(&program_id)
                .map(|entry| entry.stages)
                .ok_or(DeviceError::InvalidHandle)?
        };
        if !stages.is_drawable() {
            return Err(DeviceError::InvalidCommand(
                "program needs a vertex+pixel pair or a lone compute stage".into(),
            ));
        }
        {
            let modules = self.shared.shader_modules.lock().unwrap();
            for (_, module) in stages.iter() {
                if let Some(module) = module {
                    if !modules.contains_key(&module) {
                        return Err(DeviceError::InvalidHandle);
                    }
                }
            }
        }

        if command.viewport.w == 0 || command.viewport.h == 0 {
            return Err(DeviceError::InvalidCommand("degenerate viewport".into()));
        }

        {
            let views = self.shared.views.lock().unwrap();
            let mut target_resources: Vec<ResourceId> = Vec::new();
            for slot in command.render_targets.iter().flatten() {
                match views.get(slot) {
                    Some(record) if record.purpose == ViewPurpose::RenderTarget => {
                        target_resources.push(record.resource);
                    }
                    Some(_) => {
                        return Err(DeviceError::InvalidCommand(
                            "render target slot holds a non-colour view".into(),
                        ))
                    }
                    None => return Err(DeviceError::InvalidHandle),
                }
            }
            if let Some(depth) = command.depth_target {
                match views.get(&depth) {
                    Some(record) if record.purpose == ViewPurpose::DepthTarget => {
                        target_resources.push(record.resource);
                    }
                    Some(_) => {
                        return Err(DeviceError::InvalidCommand(
                            "depth target slot holds a non-depth view".into(),
                        ))
                    }
                    None => return Err(DeviceError::InvalidHandle),
                }
            }
            for slot in command.textures.iter().flatten() {
                match views.get(slot) {
                    Some(record) if matches!(record.purpose, ViewPurpose::Shader(_)) => {
                        // Read-write hazard: a resource bound for writing in
                        // this draw cannot also be sampled by it.
                        if target_resources.contains(&record.resource) {
                            return Err(DeviceError::InvalidCommand(
                                "texture slot reads a resource bound as a target".into(),
                            ));
                        }
                    }
                    Some(_) => {
                        return Err(DeviceError::InvalidCommand(
                            "texture slot holds a non-shader view".into(),
                        ))
                    }
                    None => return Err(DeviceError::InvalidHandle),
                }
            }
        }

        {
            let resources = self.shared.resources.lock().unwrap();
            if let Some(vertex_buffer) = command.vertex_buffer {
                let buffer = resources
                    .get(&vertex_buffer)
                    .and_then(ResourceEntry::as_buffer)
                    .ok_or(DeviceError::InvalidHandle)?;
                if buffer.kind != BufferKind::Vertex {
                    return Err(DeviceError::InvalidCommand(
                        "vertex buffer slot holds a non-vertex buffer".into(),
                    ));
                }
                if command.vertex_stride == 0 {
                    return Err(DeviceError::InvalidCommand(
                        "vertex stride must be non-zero when a vertex buffer is bound".into(),
                    ));
                }
            }
            if let Some(index_buffer) = command.index_buffer {
                let buffer = resources
                    .get(&index_buffer)
                    .and_then(ResourceEntry::as_buffer)
                    .ok_or(DeviceError::InvalidHandle)?;
                if buffer.kind != BufferKind::Index {
                    return Err(DeviceError::InvalidCommand(
                        "index buffer slot holds a non-index buffer".into(),
                    ));
                }
            }
            for slot in command.uniform_buffers.iter().flatten() {
                let buffer = resources
                    .get(slot)
                    .and_then(ResourceEntry::as_buffer)
                    .ok_or(DeviceError::InvalidHandle)?;
                if buffer.kind != BufferKind::Constants {
                    return Err(DeviceError::InvalidCommand(
                        "uniform slot holds a non-constants buffer".into(),
                    ));
                }
            }
        }

        if let Some(layout_id) = command.input_layout {
            let layouts = self.shared.input_layouts.lock().unwrap();
            let layout = layouts.get(&layout_id).ok_or(DeviceError::InvalidHandle)?;
            // Dimensional consistency: every attribute must fit inside one
            // vertex record of the bound buffer.
            if command.vertex_buffer.is_some() && layout.record_len > command.vertex_stride {
                return Err(DeviceError::InvalidCommand(format!(
                    "input layout reads {} bytes per vertex but the stride is {}",
                    layout.record_len, command.vertex_stride
                )));
            }
        }

        {
            let samplers = self.shared.samplers.lock().unwrap();
            for slot in command.samplers.iter().flatten() {
                if !samplers.contains_key(slot) {
                    return Err(DeviceError::InvalidHandle);
                }
            }
        }

        Ok(stages)
    }
}

impl RenderContext for SoftContext {
    fn clear_render_target(
        &mut self,
        view: ViewId,
        colour: LinearRgba,
    ) -> Result<(), DeviceError> {
        self.ensure_open()?;
        match self.view_purpose(view)? {
            ViewPurpose::RenderTarget => {}
            _ => return Err(DeviceError::InvalidHandle),
        }
        self.journal.push(RecordedOp::ClearTarget {
            view,
            colour: colour.to_array(),
        });
        Ok(())
    }

    fn clear_depth_target(&mut self, view: ViewId, depth: f32) -> Result<(), DeviceError> {
        self.ensure_open()?;
        match self.view_purpose(view)? {
            ViewPurpose::DepthTarget => {}
            _ => return Err(DeviceError::InvalidHandle),
        }
        self.journal.push(RecordedOp::ClearDepth { view, depth });
        Ok(())
    }

    fn update_buffer(&mut self, resource: ResourceId, data: &[u8]) -> Result<(), DeviceError> {
        self.ensure_open()?;
        {
            let mut resources = self.shared.resources.lock().unwrap();
            let buffer = resources
                .get_mut(&resource)
                .and_then(ResourceEntry::as_buffer_mut)
                .ok_or(DeviceError::InvalidHandle)?;
            if buffer.contents.len() != data.len() {
                return Err(DeviceError::BufferSizeMismatch {
                    expected: buffer.contents.len() as u64,
                    actual: data.len() as u64,
                });
            }
            buffer.contents.copy_from_slice(data);
        }
        self.shared
            .counters
            .buffer_updates
            .fetch_add(1, Ordering::Relaxed);
        self.journal.push(RecordedOp::UpdateBuffer {
            resource,
            bytes: data.len() as u64,
        });
        Ok(())
    }

    fn execute(&mut self, command: &RenderCommand) -> Result<(), DeviceError> {
        self.ensure_open()?;
        let stages = self.validate(command)?;

        // Validation passed; apply in order. Targets and viewport first.
        self.state.render_targets = command.render_targets;
        self.state.depth_target = command.depth_target;
        self.state.viewport = command.viewport;

        // Total-coverage stage bind: absent stages are explicitly unbound so
        // nothing leaks from the previously bound program.
        self.bindings.bind_stages(&stages);
        self.state.program = command.program;

        self.state.input_layout = command.input_layout;
        self.state.vertex_buffer = command.vertex_buffer;
        self.state.index_buffer = command.index_buffer;
        self.state.vertex_stride = command.vertex_stride;
        self.state.textures = command.textures;
        self.state.samplers = command.samplers;
        self.state.uniform_buffers = command.uniform_buffers;

        let draw = if command.is_indexed() {
            DrawCall::Indexed {
                start: command.draw.index_start,
                count: command.draw.index_count,
                base: command.draw.vertex_base,
            }
        } else {
            DrawCall::Linear {
                start: command.draw.vertex_start,
                count: command.draw.vertex_count,
            }
        };
        self.journal.push(RecordedOp::Draw(draw));
        self.shared
            .counters
            .draw_calls
            .fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn finish(&mut self) {
        self.finished = true;
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Drop for SoftContext {
    fn drop(&mut self) {
        self.shared.context_open.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for SoftContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftContext")
            .field("recorded_ops", &self.journal.len())
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soft::{SoftDevice, SoftDeviceDescriptor};
    use std::borrow::Cow;
    use std::sync::Arc;
    use tessera_core::gfx::{
        Buffer, BufferResourceDescriptor, ConstantBuffer, ImageKind, InputAttributeDescriptor,
        InputChannel, InputFormat, InputLayoutDescriptor, Multisampling, RenderDevice,
        ShaderModuleDescriptor, ShaderProgramDescriptor, ShaderProgramId, ShaderStage,
        TextureFormat, TextureResourceDescriptor, TextureUsage, TextureViewDescriptor,
    };

    struct Fixture {
        device: Arc<SoftDevice>,
        program: ShaderProgramId,
    }

    fn fixture() -> Fixture {
        let device = Arc::new(SoftDevice::new(&SoftDeviceDescriptor::default()).unwrap());
        let vertex = device
            .create_shader_module(&ShaderModuleDescriptor {
                label: None,
                stage: ShaderStage::Vertex,
                bytecode: Cow::Borrowed(&[1, 2, 3]),
            })
            .unwrap();
        let pixel = device
            .create_shader_module(&ShaderModuleDescriptor {
                label: None,
                stage: ShaderStage::Pixel,
                bytecode: Cow::Borrowed(&[4, 5, 6]),
            })
            .unwrap();
        let program = device
            .create_shader_program(&ShaderProgramDescriptor::new().vertex(vertex).pixel(pixel))
            .unwrap();
        Fixture { device, program }
    }

    fn base_command(fixture: &Fixture) -> RenderCommand {
        let mut command = RenderCommand::new();
        command.render_targets[0] = Some(fixture.device.display_render_target());
        command.viewport = Viewport::sized(1280, 720);
        command.program = Some(fixture.program);
        command.draw.vertex_count = 6;
        command
    }

    fn soft(context: &mut dyn RenderContext) -> &mut SoftContext {
        context.as_any_mut().downcast_mut::<SoftContext>().unwrap()
    }

    #[test]
    fn non_indexed_draw_without_index_count() {
        let fixture = fixture();
        let mut context = fixture.device.create_context().unwrap();

        // Index buffer bound, but index_count stays zero: a linear draw.
        let index_buffer = fixture
            .device
            .create_buffer(
                &BufferResourceDescriptor::new(12, BufferKind::Index),
                None,
            )
            .unwrap();
        let mut command = base_command(&fixture);
        command.index_buffer = Some(index_buffer);
        command.draw.vertex_start = 3;
        command.draw.vertex_count = 9;
        context.execute(&command).unwrap();

        assert_eq!(
            soft(context.as_mut()).journal(),
            &[RecordedOp::Draw(DrawCall::Linear { start: 3, count: 9 })]
        );
    }

    #[test]
    fn indexed_draw_uses_index_range_and_base_vertex() {
        let fixture = fixture();
        let mut context = fixture.device.create_context().unwrap();

        let index_buffer = fixture
            .device
            .create_buffer(
                &BufferResourceDescriptor::new(144, BufferKind::Index),
                None,
            )
            .unwrap();
        let mut command = base_command(&fixture);
        command.index_buffer = Some(index_buffer);
        command.draw.index_start = 12;
        command.draw.index_count = 24;
        command.draw.vertex_base = 100;
        context.execute(&command).unwrap();

        assert_eq!(
            soft(context.as_mut()).journal(),
            &[RecordedOp::Draw(DrawCall::Indexed {
                start: 12,
                count: 24,
                base: 100
            })]
        );
    }

    #[test]
    fn commands_stay_in_call_order() {
        let fixture = fixture();
        let mut context = fixture.device.create_context().unwrap();
        let display = fixture.device.display_render_target();

        let uniforms = fixture
            .device
            .create_buffer(
                &BufferResourceDescriptor::new(16, BufferKind::Constants),
                None,
            )
            .unwrap();

        context
            .clear_render_target(display, LinearRgba::BLACK)
            .unwrap();
        context.update_buffer(uniforms, &[1u8; 16]).unwrap();
        context.execute(&base_command(&fixture)).unwrap();
        context.update_buffer(uniforms, &[2u8; 16]).unwrap();
        context.execute(&base_command(&fixture)).unwrap();

        let journal = soft(context.as_mut()).journal().to_vec();
        assert_eq!(journal.len(), 5);
        assert!(matches!(journal[0], RecordedOp::ClearTarget { .. }));
        assert!(matches!(journal[1], RecordedOp::UpdateBuffer { .. }));
        assert!(matches!(journal[2], RecordedOp::Draw(_)));
        assert!(matches!(journal[3], RecordedOp::UpdateBuffer { .. }));
        assert!(matches!(journal[4], RecordedOp::Draw(_)));
    }

    #[test]
    fn program_switch_unbinds_stages_the_new_program_lacks() {
        let fixture = fixture();
        let mut context = fixture.device.create_context().unwrap();

        context.execute(&base_command(&fixture)).unwrap();
        {
            let soft = soft(context.as_mut());
            assert!(soft.bound_stage(ShaderStage::Vertex).is_some());
            assert!(soft.bound_stage(ShaderStage::Pixel).is_some());
        }

        // A compute-only program: every graphics stage must be unbound.
        let compute = fixture
            .device
            .create_shader_module(&ShaderModuleDescriptor {
                label: None,
                stage: ShaderStage::Compute,
                bytecode: Cow::Borrowed(&[9]),
            })
            .unwrap();
        let compute_program = fixture
            .device
            .create_shader_program(&ShaderProgramDescriptor::new().compute(compute))
            .unwrap();
        let mut command = base_command(&fixture);
        command.program = Some(compute_program);
        context.execute(&command).unwrap();

        let soft = soft(context.as_mut());
        assert!(soft.bound_stage(ShaderStage::Vertex).is_none());
        assert!(
            soft.bound_stage(ShaderStage::Pixel).is_none(),
            "pixel stage leaked across the program switch"
        );
        assert!(soft.bound_stage(ShaderStage::Compute).is_some());
    }

    #[test]
    fn rejected_commands_have_no_side_effects() {
        let fixture = fixture();
        let mut context = fixture.device.create_context().unwrap();
        context.execute(&base_command(&fixture)).unwrap();
        let draws_before = fixture.device.stats().draw_calls;
        let journal_before = soft(context.as_mut()).journal().len();

        // Vertex buffer bound with a zero stride fails validation.
        let vertex_buffer = fixture
            .device
            .create_buffer(
                &BufferResourceDescriptor::new(96, BufferKind::Vertex),
                None,
            )
            .unwrap();
        let mut bad = base_command(&fixture);
        bad.vertex_buffer = Some(vertex_buffer);
        bad.vertex_stride = 0;
        let err = context.execute(&bad).unwrap_err();
        assert!(matches!(err, DeviceError::InvalidCommand(_)));

        assert_eq!(fixture.device.stats().draw_calls, draws_before);
        assert_eq!(soft(context.as_mut()).journal().len(), journal_before);
    }

    #[test]
    fn draw_requires_a_drawable_program() {
        let fixture = fixture();
        let mut context = fixture.device.create_context().unwrap();

        let vertex = fixture
            .device
            .create_shader_module(&ShaderModuleDescriptor {
                label: None,
                stage: ShaderStage::Vertex,
                bytecode: Cow::Borrowed(&[7]),
            })
            .unwrap();
        let vertex_only = fixture
            .device
            .create_shader_program(&ShaderProgramDescriptor::new().vertex(vertex))
            .unwrap();
        let mut command = base_command(&fixture);
        command.program = Some(vertex_only);
        let err = context.execute(&command).unwrap_err();
        assert!(matches!(err, DeviceError::InvalidCommand(_)));

        let mut no_program = base_command(&fixture);
        no_program.program = None;
        let err = context.execute(&no_program).unwrap_err();
        assert!(matches!(err, DeviceError::InvalidCommand(_)));
    }

    #[test]
    fn input_layout_must_fit_the_vertex_stride() {
        let fixture = fixture();
        let mut context = fixture.device.create_context().unwrap();

        let vertex = fixture
            .device
            .create_shader_module(&ShaderModuleDescriptor {
                label: None,
                stage: ShaderStage::Vertex,
                bytecode: Cow::Borrowed(&[7]),
            })
            .unwrap();
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
                semantic: Cow::Borrowed("NORMAL"),
                byte_offset: 16,
                format: InputFormat::Float3,
                channel: InputChannel::PerVertex,
            },
        ];
        let layout = fixture
            .device
            .create_input_layout(&InputLayoutDescriptor {
                label: None,
                shader: vertex,
                attributes: Cow::Borrowed(&attributes),
            })
            .unwrap();
        let vertex_buffer = fixture
            .device
            .create_buffer(
                &BufferResourceDescriptor::new(280, BufferKind::Vertex),
                None,
            )
            .unwrap();

        let mut command = base_command(&fixture);
        command.input_layout = Some(layout);
        command.vertex_buffer = Some(vertex_buffer);
        command.vertex_stride = 16; // layout reads 28 bytes
        let err = context.execute(&command).unwrap_err();
        assert!(matches!(err, DeviceError::InvalidCommand(_)));

        command.vertex_stride = 28;
        context.execute(&command).unwrap();
    }

    #[test]
    fn buffer_slots_are_kind_checked() {
        let fixture = fixture();
        let mut context = fixture.device.create_context().unwrap();
        let constants = fixture
            .device
            .create_buffer(
                &BufferResourceDescriptor::new(16, BufferKind::Constants),
                None,
            )
            .unwrap();

        let mut command = base_command(&fixture);
        command.vertex_buffer = Some(constants);
        command.vertex_stride = 16;
        let err = context.execute(&command).unwrap_err();
        assert!(matches!(err, DeviceError::InvalidCommand(_)));

        let mut command = base_command(&fixture);
        command.uniform_buffers[0] = Some(constants);
        context.execute(&command).unwrap();
    }

    #[test]
    fn sampling_a_bound_target_resource_is_rejected() {
        let fixture = fixture();
        let mut context = fixture.device.create_context().unwrap();

        // A texture usable both as a target and as a shader resource.
        let texture = fixture
            .device
            .create_texture(
                &TextureResourceDescriptor {
                    label: None,
                    width: 256,
                    height: 256,
                    depth: 0,
                    array_size: 2,
                    format: TextureFormat::Rgba8,
                    usage: TextureUsage::SHADER_RESOURCE | TextureUsage::RENDER_TARGET,
                    kind: ImageKind::Texture2D,
                    use_mips: false,
                    multisampling: Multisampling::OFF,
                },
                None,
            )
            .unwrap();
        let target = fixture
            .device
            .create_render_target_view(
                texture,
                &TextureViewDescriptor {
                    array_index: 0,
                    array_count: 1,
                },
            )
            .unwrap();
        let shader_view = fixture
            .device
            .create_texture_view_2d(
                texture,
                &TextureViewDescriptor {
                    array_index: 1,
                    array_count: 1,
                },
            )
            .unwrap();

        let mut command = base_command(&fixture);
        command.render_targets[0] = Some(target);
        command.textures[0] = Some(shader_view);
        let err = context.execute(&command).unwrap_err();
        assert!(matches!(err, DeviceError::InvalidCommand(_)));

        // Sampling it while rendering elsewhere is fine.
        let mut command = base_command(&fixture);
        command.textures[0] = Some(shader_view);
        context.execute(&command).unwrap();
    }

    #[test]
    fn texture_slots_reject_non_shader_views() {
        let fixture = fixture();
        let mut context = fixture.device.create_context().unwrap();
        // The display view is a render target, not a shader view.
        let mut command = base_command(&fixture);
        command.textures[0] = Some(fixture.device.display_render_target());
        let err = context.execute(&command).unwrap_err();
        assert!(matches!(err, DeviceError::InvalidCommand(_)));
    }

    #[test]
    fn clears_are_purpose_checked() {
        let fixture = fixture();
        let mut context = fixture.device.create_context().unwrap();
        let display = fixture.device.display_render_target();

        context
            .clear_render_target(display, LinearRgba::BLUE)
            .unwrap();
        assert_eq!(
            context.clear_depth_target(display, 1.0),
            Err(DeviceError::InvalidHandle)
        );

        let depth_texture = fixture
            .device
            .create_texture(
                &TextureResourceDescriptor {
                    label: None,
                    width: 1280,
                    height: 720,
                    depth: 0,
                    array_size: 1,
                    format: TextureFormat::Depth32Float,
                    usage: TextureUsage::DEPTH_TARGET,
                    kind: ImageKind::Texture2D,
                    use_mips: false,
                    multisampling: Multisampling::OFF,
                },
                None,
            )
            .unwrap();
        let depth_view = fixture
            .device
            .create_depth_target_view(depth_texture, &TextureViewDescriptor::default())
            .unwrap();
        context.clear_depth_target(depth_view, 1.0).unwrap();
        assert_eq!(
            context.clear_render_target(depth_view, LinearRgba::BLACK),
            Err(DeviceError::InvalidHandle)
        );
    }

    #[test]
    fn sealed_context_rejects_recording_until_submission() {
        let fixture = fixture();
        let mut context = fixture.device.create_context().unwrap();
        context.execute(&base_command(&fixture)).unwrap();
        context.finish();

        let err = context.execute(&base_command(&fixture)).unwrap_err();
        assert_eq!(err, DeviceError::ContextSealed);

        fixture.device.execute_context(context.as_mut()).unwrap();
        context.execute(&base_command(&fixture)).unwrap();
    }

    #[test]
    fn context_retains_state_across_commands() {
        let fixture = fixture();
        let mut context = fixture.device.create_context().unwrap();

        let vertex_buffer = fixture
            .device
            .create_buffer(
                &BufferResourceDescriptor::new(96, BufferKind::Vertex),
                None,
            )
            .unwrap();
        let mut command = base_command(&fixture);
        command.vertex_buffer = Some(vertex_buffer);
        command.vertex_stride = 32;
        command.viewport = Viewport::sized(256, 256);
        context.execute(&command).unwrap();

        let soft = soft(context.as_mut());
        assert_eq!(soft.retained_vertex_buffer(), Some(vertex_buffer));
        assert_eq!(soft.retained_viewport(), Viewport::sized(256, 256));
    }

    #[test]
    fn buffer_update_must_match_size() {
        let fixture = fixture();
        let mut context = fixture.device.create_context().unwrap();
        let buffer = fixture
            .device
            .create_buffer(
                &BufferResourceDescriptor::new(16, BufferKind::Constants),
                None,
            )
            .unwrap();
        assert_eq!(
            context.update_buffer(buffer, &[0u8; 12]),
            Err(DeviceError::BufferSizeMismatch {
                expected: 16,
                actual: 12
            })
        );
        context.update_buffer(buffer, &[3u8; 16]).unwrap();
        assert_eq!(fixture.device.read_buffer(buffer).unwrap(), vec![3u8; 16]);
    }

    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    struct Material {
        tint: [f32; 4],
        shininess: f32,
        flags: u32,
        _pad: [u32; 2],
    }

    #[test]
    fn constant_buffer_commit_writes_the_exact_byte_image() {
        let fixture = fixture();
        let device: Arc<dyn RenderDevice> = fixture.device.clone();
        let mut context = fixture.device.create_context().unwrap();

        let initial = Material {
            tint: [1.0, 0.5, 0.25, 1.0],
            shininess: 32.0,
            flags: 0b101,
            _pad: [0; 2],
        };
        let mut constants = ConstantBuffer::new(&device, initial).unwrap();
        let handle = constants.handle().unwrap();

        // set() alone leaves the GPU copy untouched.
        let updated = Material {
            tint: [0.0, 0.0, 1.0, 1.0],
            shininess: 8.0,
            flags: 0b010,
            _pad: [0; 2],
        };
        constants.set(updated);
        assert_eq!(
            fixture.device.read_buffer(handle).unwrap(),
            bytemuck::bytes_of(&initial)
        );

        constants.commit(context.as_mut()).unwrap();
        let contents = fixture.device.read_buffer(handle).unwrap();
        assert_eq!(contents.len(), std::mem::size_of::<Material>());
        assert_eq!(contents, bytemuck::bytes_of(&updated));
    }

    #[test]
    fn buffer_wrapper_destroys_exactly_once() {
        let fixture = fixture();
        let device: Arc<dyn RenderDevice> = fixture.device.clone();

        let wrapper = Buffer::from_bytes(&device, &[1, 2, 3, 4], BufferKind::Vertex).unwrap();
        let handle = wrapper.handle().unwrap();
        let destroyed_before = fixture.device.stats().resources_destroyed;

        // A move transfers ownership; only the destination drops the handle.
        let moved = wrapper;
        drop(moved);
        assert_eq!(
            fixture.device.stats().resources_destroyed,
            destroyed_before + 1
        );
        assert_eq!(
            fixture.device.read_buffer(handle),
            Err(DeviceError::InvalidHandle)
        );

        // Releasing detaches ownership: no destroy on drop.
        let mut released = Buffer::from_bytes(&device, &[5, 6], BufferKind::Vertex).unwrap();
        let kept = released.release().unwrap();
        drop(released);
        assert!(fixture.device.read_buffer(kept).is_ok());
    }
}
