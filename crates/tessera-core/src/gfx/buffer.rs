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

//! RAII ownership wrappers around device-created buffers.

use crate::gfx::{
    BufferKind, BufferResourceDescriptor, DeviceError, RenderContext, RenderDevice, ResourceId,
};
use std::sync::Arc;

/// An exclusively owned buffer resource.
///
/// `Buffer` destroys its handle exactly once when dropped. It cannot be
/// cloned; moving it transfers ownership. A null buffer (default) owns
/// nothing and drops as a no-op.
pub struct Buffer {
    device: Option<Arc<dyn RenderDevice>>,
    handle: Option<ResourceId>,
}

impl Buffer {
    /// A buffer owning nothing.
    pub fn null() -> Self {
        Self {
            device: None,
            handle: None,
        }
    }

    /// Creates a buffer of `bytes.len()` bytes initialized with `bytes`.
    pub fn from_bytes(
        device: &Arc<dyn RenderDevice>,
        bytes: &[u8],
        kind: BufferKind,
    ) -> Result<Self, DeviceError> {
        let descriptor = BufferResourceDescriptor::new(bytes.len() as u64, kind);
        let handle = device.create_buffer(&descriptor, Some(bytes))?;
        Ok(Self {
            device: Some(Arc::clone(device)),
            handle: Some(handle),
        })
    }

    /// Creates a buffer of exactly `size_of::<T>()` bytes from a typed value.
    pub fn from_value<T: bytemuck::Pod>(
        device: &Arc<dyn RenderDevice>,
        value: &T,
        kind: BufferKind,
    ) -> Result<Self, DeviceError> {
        Self::from_bytes(device, bytemuck::bytes_of(value), kind)
    }

    /// The owned handle, or `None` for a null buffer.
    pub fn handle(&self) -> Option<ResourceId> {
        self.handle
    }

    /// Whether this wrapper owns nothing.
    pub fn is_null(&self) -> bool {
        self.handle.is_none()
    }

    /// Releases ownership without destroying the resource, returning the
    /// handle. The wrapper becomes null.
    pub fn release(&mut self) -> Option<ResourceId> {
        self.device = None;
        self.handle.take()
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::null()
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let (Some(device), Some(handle)) = (self.device.take(), self.handle.take()) {
            if let Err(err) = device.destroy_resource(handle) {
                log::warn!("Buffer: failed to destroy {handle:?}: {err}");
            }
        }
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer").field("handle", &self.handle).finish()
    }
}

/// A typed constant buffer: a CPU-side value paired with a GPU buffer of
/// identical byte size.
///
/// `set` only changes the CPU value; `commit` pushes it to the GPU buffer.
/// The two may diverge between calls: an intentional write-batching
/// allowance. Staleness across frames is the caller's responsibility.
pub struct ConstantBuffer<T: bytemuck::Pod> {
    inner: Buffer,
    value: T,
}

impl<T: bytemuck::Pod> ConstantBuffer<T> {
    /// Creates the GPU buffer with `initial` as both the CPU value and the
    /// initial GPU contents.
    pub fn new(device: &Arc<dyn RenderDevice>, initial: T) -> Result<Self, DeviceError> {
        let inner = Buffer::from_value(device, &initial, BufferKind::Constants)?;
        Ok(Self {
            inner,
            value: initial,
        })
    }

    /// The current CPU-side value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Mutable access to the CPU-side value.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Replaces the CPU-side value. The GPU buffer is unchanged until
    /// [`commit`](Self::commit).
    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    /// Pushes the CPU value to the GPU buffer: exactly `size_of::<T>()`
    /// bytes, the value's byte representation.
    pub fn commit(&self, context: &mut dyn RenderContext) -> Result<(), DeviceError> {
        match self.inner.handle() {
            Some(handle) => context.update_buffer(handle, bytemuck::bytes_of(&self.value)),
            None => {
                debug_assert!(false, "commit on a null constant buffer");
                Err(DeviceError::InvalidHandle)
            }
        }
    }

    /// The underlying buffer handle, for binding in a command.
    pub fn handle(&self) -> Option<ResourceId> {
        self.inner.handle()
    }
}

impl<T: bytemuck::Pod> std::fmt::Debug for ConstantBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstantBuffer")
            .field("handle", &self.inner.handle())
            .field("size", &std::mem::size_of::<T>())
            .finish()
    }
}
