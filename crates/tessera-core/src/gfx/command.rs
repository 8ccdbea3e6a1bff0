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

//! The declarative render command consumed by the render context.

use crate::gfx::{InputLayoutId, ResourceId, SamplerId, ShaderProgramId, ViewId};

/// Number of colour render target slots in a command.
pub const MAX_RENDER_TARGETS: usize = 4;
/// Number of texture slots in a command.
pub const MAX_TEXTURE_SLOTS: usize = 16;
/// Number of sampler slots in a command.
pub const MAX_SAMPLER_SLOTS: usize = 8;
/// Number of uniform buffer slots in a command.
pub const MAX_UNIFORM_BUFFERS: usize = 8;

/// The primitive topology of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexTopology {
    /// Independent point primitives.
    PointList,
    /// Independent line primitives.
    LineList,
    /// Independent triangle primitives.
    TriangleList,
    /// A connected triangle strip.
    TriangleStrip,
}

impl Default for VertexTopology {
    fn default() -> Self {
        Self::TriangleList
    }
}

/// A viewport rectangle in target texel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in texels.
    pub w: u32,
    /// Height in texels.
    pub h: u32,
}

impl Viewport {
    /// Creates a viewport covering a `w`×`h` rectangle at the origin.
    pub const fn sized(w: u32, h: u32) -> Self {
        Self { x: 0, y: 0, w, h }
    }
}

/// The element range of a draw.
///
/// The context issues an indexed draw when an index buffer is bound and
/// `index_count > 0`; otherwise it issues a non-indexed draw over
/// `vertex_start..vertex_start + vertex_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DrawRange {
    /// First index read from the index buffer.
    pub index_start: u32,
    /// Number of indices to draw.
    pub index_count: u32,
    /// First vertex of a non-indexed draw.
    pub vertex_start: u32,
    /// Number of vertices of a non-indexed draw.
    pub vertex_count: u32,
    /// Value added to each index before fetching the vertex.
    pub vertex_base: i32,
}

/// A complete description of one draw call.
///
/// Commands are plain data: constructed fresh per draw, consumed
/// synchronously by [`RenderContext::execute`](crate::gfx::RenderContext::execute),
/// and discarded afterwards. Slot arrays are sparse; `None` slots are left
/// unbound.
#[derive(Debug, Clone)]
pub struct RenderCommand {
    /// Colour render target slots.
    pub render_targets: [Option<ViewId>; MAX_RENDER_TARGETS],
    /// The depth target.
    pub depth_target: Option<ViewId>,
    /// The viewport rectangle.
    pub viewport: Viewport,
    /// The shader program to draw with.
    pub program: Option<ShaderProgramId>,
    /// The input layout; may be absent for draws that generate vertices in
    /// the shader.
    pub input_layout: Option<InputLayoutId>,
    /// The vertex buffer.
    pub vertex_buffer: Option<ResourceId>,
    /// The index buffer.
    pub index_buffer: Option<ResourceId>,
    /// Byte stride of one vertex record.
    pub vertex_stride: u32,
    /// Primitive topology.
    pub topology: VertexTopology,
    /// The element range to draw.
    pub draw: DrawRange,
    /// Shader-visible texture slots.
    pub textures: [Option<ViewId>; MAX_TEXTURE_SLOTS],
    /// Sampler slots.
    pub samplers: [Option<SamplerId>; MAX_SAMPLER_SLOTS],
    /// Uniform buffer slots.
    pub uniform_buffers: [Option<ResourceId>; MAX_UNIFORM_BUFFERS],
}

impl RenderCommand {
    /// Creates an empty command with every slot unbound.
    pub fn new() -> Self {
        Self {
            render_targets: [None; MAX_RENDER_TARGETS],
            depth_target: None,
            viewport: Viewport::default(),
            program: None,
            input_layout: None,
            vertex_buffer: None,
            index_buffer: None,
            vertex_stride: 0,
            topology: VertexTopology::default(),
            draw: DrawRange::default(),
            textures: [None; MAX_TEXTURE_SLOTS],
            samplers: [None; MAX_SAMPLER_SLOTS],
            uniform_buffers: [None; MAX_UNIFORM_BUFFERS],
        }
    }

    /// Whether the command requests an indexed draw.
    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some() && self.draw.index_count > 0
    }
}

impl Default for RenderCommand {
    fn default() -> Self {
        Self::new()
    }
}
