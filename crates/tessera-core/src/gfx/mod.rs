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

//! The backend-agnostic rendering API.
//!
//! This module is the "common language" for all rendering operations:
//!
//! - **[`handle`]**: opaque typed handles to device-owned objects.
//! - **[`descriptor`]**: plain descriptor structs consumed by creation calls.
//! - **[`shader`]**: shader stages, stage sets, and program descriptors.
//! - **[`command`]**: the declarative single-draw [`RenderCommand`].
//! - **[`buffer`]**: RAII buffer wrappers and the typed constant buffer.
//! - **[`traits`]**: the [`RenderDevice`] and [`RenderContext`] contracts.
//! - **[`error`]**: the device error taxonomy.
//!
//! Concrete drivers live elsewhere (`tessera-infra`) and implement the
//! traits defined here.

pub mod adapter;
pub mod buffer;
pub mod command;
pub mod descriptor;
pub mod error;
pub mod handle;
pub mod shader;
pub mod stats;
pub mod traits;

pub use self::adapter::{AdapterInfo, DeviceKind};
pub use self::buffer::{Buffer, ConstantBuffer};
pub use self::command::{
    DrawRange, RenderCommand, VertexTopology, Viewport, MAX_RENDER_TARGETS, MAX_SAMPLER_SLOTS,
    MAX_TEXTURE_SLOTS, MAX_UNIFORM_BUFFERS,
};
pub use self::descriptor::{
    BufferKind, BufferResourceDescriptor, ImageKind, InputAttributeDescriptor, InputChannel,
    InputFormat, InputLayoutDescriptor, Multisampling, SamplerAddressMode, SamplerDescriptor,
    SamplerFilter, TextureFormat, TextureResourceDescriptor, TextureUsage, TextureViewDescriptor,
};
pub use self::error::{DeviceError, RenderError};
pub use self::handle::{
    InputLayoutId, ResourceId, SamplerId, ShaderModuleId, ShaderProgramId, ViewId,
};
pub use self::shader::{ShaderModuleDescriptor, ShaderProgramDescriptor, ShaderStage, StageSet};
pub use self::stats::DeviceStats;
pub use self::traits::{RenderContext, RenderDevice};
