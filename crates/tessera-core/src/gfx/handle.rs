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

//! Opaque typed handles to device-owned objects.
//!
//! Handles are plain value tokens: copyable, hashable, comparable by
//! identity. They carry no ownership; RAII wrappers
//! ([`Buffer`](crate::gfx::Buffer)) or the creating owner are responsible
//! for destruction. A handle is valid from its creation call until the
//! matching destroy call. Drivers allocate handle values from monotonically
//! increasing counters and never reuse them, so a stale handle can never
//! alias a live object: any use after destruction fails with
//! [`DeviceError::InvalidHandle`](crate::gfx::DeviceError::InvalidHandle)
//! (and a debug assertion in debug builds).

/// An opaque handle to a GPU resource (a buffer or an image).
///
/// The resource kind is fixed at creation and does not change for the
/// lifetime of the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(pub usize);

/// An opaque handle to a typed view of a resource (shader-resource,
/// render-target, or depth-target).
///
/// Views are derived from and owned by the resource they interpret;
/// destroying the resource releases all of its views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub usize);

/// An opaque handle to a single compiled shader stage module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderModuleId(pub usize);

/// An opaque handle to a shader program (a set of per-stage modules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderProgramId(pub usize);

/// An opaque handle to an input layout (vertex attribute mapping).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputLayoutId(pub usize);

/// An opaque handle to a texture sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerId(pub usize);
