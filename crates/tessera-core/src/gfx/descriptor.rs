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

//! Plain descriptor structs consumed by the device creation calls.
//!
//! Every `create_*` operation on [`RenderDevice`](crate::gfx::RenderDevice)
//! takes one of these fully-specified descriptors and returns a handle plus
//! a status. Field sets mirror the engine's on-disk asset formats and must
//! stay interoperable with them.

use crate::tessera_bitflags;
use std::borrow::Cow;

/// The texel format of a texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit-per-channel RGBA, normalized.
    Rgba8,
    /// Two 32-bit float channels (used for variance shadow maps).
    Rg32Float,
    /// Four 32-bit float channels.
    Rgba32Float,
    /// 32-bit float depth.
    Depth32Float,
}

impl TextureFormat {
    /// Bytes occupied by a single texel of this format.
    pub const fn bytes_per_texel(&self) -> u32 {
        match self {
            Self::Rgba8 | Self::Depth32Float => 4,
            Self::Rg32Float => 8,
            Self::Rgba32Float => 16,
        }
    }

    /// Whether this format is a depth format (bindable as a depth target).
    pub const fn is_depth(&self) -> bool {
        matches!(self, Self::Depth32Float)
    }
}

/// The dimensionality of an image resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    /// A two-dimensional texture (optionally an array).
    Texture2D,
    /// A three-dimensional (volumetric) texture.
    Texture3D,
    /// A cubemap: six 2D faces stored as array slices.
    TextureCube,
}

/// Multisampling configuration for a texture or the display target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Multisampling {
    /// Samples per texel. `1` disables multisampling.
    pub count: u32,
}

impl Multisampling {
    /// Multisampling disabled.
    pub const OFF: Self = Self { count: 1 };

    /// Creates a multisampling description with the given sample count.
    pub const fn new(count: u32) -> Self {
        Self { count }
    }
}

impl Default for Multisampling {
    fn default() -> Self {
        Self::OFF
    }
}

tessera_bitflags! {
    /// Pipeline binding points a texture resource may be used at.
    pub struct TextureUsage: u32 {
        /// The texture can be read from shaders through a shader view.
        const SHADER_RESOURCE = 1 << 0;
        /// The texture can be bound as a colour render target.
        const RENDER_TARGET = 1 << 1;
        /// The texture can be bound as a depth target.
        const DEPTH_TARGET = 1 << 2;
    }
}

/// A descriptor fully specifying a texture resource.
#[derive(Debug, Clone)]
pub struct TextureResourceDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth in texels; `0` for non-volumetric textures.
    pub depth: u32,
    /// Number of array slices. Cubemaps use six slices per cube.
    pub array_size: u32,
    /// Texel format, fixed for the resource lifetime.
    pub format: TextureFormat,
    /// Allowed binding points.
    pub usage: TextureUsage,
    /// Dimensionality, fixed for the resource lifetime.
    pub kind: ImageKind,
    /// Whether a mip chain is allocated.
    pub use_mips: bool,
    /// Multisampling configuration.
    pub multisampling: Multisampling,
}

impl<'a> TextureResourceDescriptor<'a> {
    /// Total bytes of one array slice at mip level zero.
    pub fn slice_len(&self) -> usize {
        let depth = self.depth.max(1);
        self.width as usize
            * self.height as usize
            * depth as usize
            * self.format.bytes_per_texel() as usize
    }
}

/// A descriptor for a view over an image resource.
///
/// Views address a contiguous range of array slices. The pair
/// `(array_index, array_count)` is the cache key for shader views;
/// render-target and depth-target views are keyed by `array_index` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureViewDescriptor {
    /// First array slice addressed by the view.
    pub array_index: u32,
    /// Number of array slices addressed by the view.
    pub array_count: u32,
}

impl Default for TextureViewDescriptor {
    fn default() -> Self {
        Self {
            array_index: 0,
            array_count: 1,
        }
    }
}

/// The role of a buffer resource, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Vertex data.
    Vertex,
    /// Index data.
    Index,
    /// Shader constants (uniforms).
    Constants,
}

/// A descriptor fully specifying a buffer resource.
#[derive(Debug, Clone)]
pub struct BufferResourceDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Size of the buffer in bytes.
    pub size: u64,
    /// Role of the buffer, fixed for the resource lifetime.
    pub kind: BufferKind,
}

impl<'a> BufferResourceDescriptor<'a> {
    /// Creates a descriptor with no label.
    pub fn new(size: u64, kind: BufferKind) -> Self {
        Self {
            label: None,
            size,
            kind,
        }
    }
}

/// How texture coordinates outside `[0, 1]` are resolved when sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerAddressMode {
    /// Coordinates wrap around.
    Wrap,
    /// Coordinates are clamped to the edge texel.
    Clamp,
    /// Coordinates mirror at integer boundaries.
    Mirror,
    /// Out-of-range samples return the border colour.
    Border,
}

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerFilter {
    /// Nearest-texel sampling.
    Point,
    /// Bilinear filtering.
    Bilinear,
    /// Trilinear filtering across mip levels.
    Trilinear,
    /// Anisotropic filtering; the level is given separately.
    Anisotropic,
}

/// A descriptor fully specifying a texture sampler.
#[derive(Debug, Clone)]
pub struct SamplerDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Address mode along U.
    pub address_u: SamplerAddressMode,
    /// Address mode along V.
    pub address_v: SamplerAddressMode,
    /// Address mode along W.
    pub address_w: SamplerAddressMode,
    /// Filtering mode.
    pub filtering: SamplerFilter,
    /// Maximum anisotropy level; meaningful only for
    /// [`SamplerFilter::Anisotropic`].
    pub anisotropy: u32,
    /// Border colour for [`SamplerAddressMode::Border`], as linear RGBA.
    pub border: [f32; 4],
}

impl<'a> Default for SamplerDescriptor<'a> {
    fn default() -> Self {
        Self {
            label: None,
            address_u: SamplerAddressMode::Wrap,
            address_v: SamplerAddressMode::Wrap,
            address_w: SamplerAddressMode::Wrap,
            filtering: SamplerFilter::Bilinear,
            anisotropy: 1,
            border: [0.0; 4],
        }
    }
}

/// Per-vertex or per-instance stepping of an input attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputChannel {
    /// The attribute advances once per vertex.
    PerVertex,
    /// The attribute advances once per instance.
    PerInstance,
}

/// The component layout of a single input attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFormat {
    /// One 32-bit float.
    Float,
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
}

impl InputFormat {
    /// Bytes occupied by one attribute of this format.
    pub const fn byte_size(&self) -> u32 {
        match self {
            Self::Float => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
        }
    }
}

/// Maps one region of a vertex buffer record to a shader input semantic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputAttributeDescriptor<'a> {
    /// The vertex buffer slot the attribute reads from.
    pub buffer_slot: u32,
    /// The shader semantic the attribute feeds (e.g. `"POSITION"`).
    pub semantic: Cow<'a, str>,
    /// Byte offset of the attribute within one vertex record.
    pub byte_offset: u32,
    /// Component layout of the attribute.
    pub format: InputFormat,
    /// Stepping channel.
    pub channel: InputChannel,
}

/// A descriptor for an input layout.
///
/// The layout is validated against the retained bytecode of the given
/// vertex-stage module at creation time.
#[derive(Debug, Clone)]
pub struct InputLayoutDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The vertex-stage module whose inputs the layout must satisfy.
    pub shader: crate::gfx::ShaderModuleId,
    /// The attribute mappings.
    pub attributes: Cow<'a, [InputAttributeDescriptor<'a>]>,
}
