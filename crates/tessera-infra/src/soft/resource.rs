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

//! Resource registry entries and the per-resource view caches.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use tessera_core::gfx::{
    BufferKind, ImageKind, Multisampling, TextureFormat, TextureUsage, ViewId,
};

/// The dimensionality a shader view interprets its slices as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SrvDimension {
    Texture2D,
    TextureCube,
}

impl SrvDimension {
    fn rank(self) -> u64 {
        match self {
            Self::Texture2D => 1,
            Self::TextureCube => 2,
        }
    }
}

/// Cache key of a shader view: exact match on index, count, and dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SrvKey {
    pub array_index: u32,
    pub array_count: u32,
    pub dimension: SrvDimension,
}

impl Hash for SrvKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Deterministic fold of the three key fields. Equal keys fold equal;
        // the constant is not a stability promise across versions.
        let folded = (self.dimension.rank() * 8 + u64::from(self.array_count))
            .wrapping_mul(0x9e37_79b9_7f4a_7c15)
            .wrapping_add(u64::from(self.array_index));
        state.write_u64(folded);
    }
}

/// What a view is bound as. Recorded per view so contexts can check a
/// command references the right kind of view for each slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ViewPurpose {
    Shader(SrvDimension),
    RenderTarget,
    DepthTarget,
}

/// Registry record of a live view: the resource it derives from and its
/// binding purpose.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ViewRecord {
    pub resource: tessera_core::gfx::ResourceId,
    pub purpose: ViewPurpose,
}

/// The per-resource view caches.
///
/// Shader views are keyed by the full [`SrvKey`]; render-target and
/// depth-target views are keyed by the array index alone, their type being
/// derived from the resource's fixed format and dimensionality. A cache hit
/// returns the identical view; no duplicate view exists per key.
#[derive(Debug, Default)]
pub(crate) struct ViewCache {
    srv: HashMap<SrvKey, ViewId>,
    rtv: HashMap<u32, ViewId>,
    dsv: HashMap<u32, ViewId>,
}

impl ViewCache {
    pub fn srv(&self, key: &SrvKey) -> Option<ViewId> {
        self.srv.get(key).copied()
    }

    pub fn insert_srv(&mut self, key: SrvKey, view: ViewId) {
        self.srv.insert(key, view);
    }

    pub fn rtv(&self, array_index: u32) -> Option<ViewId> {
        self.rtv.get(&array_index).copied()
    }

    pub fn insert_rtv(&mut self, array_index: u32, view: ViewId) {
        self.rtv.insert(array_index, view);
    }

    pub fn dsv(&self, array_index: u32) -> Option<ViewId> {
        self.dsv.get(&array_index).copied()
    }

    pub fn insert_dsv(&mut self, array_index: u32, view: ViewId) {
        self.dsv.insert(array_index, view);
    }

    /// Empties every cache, returning the released views.
    pub fn drain(&mut self) -> Vec<ViewId> {
        let mut views: Vec<ViewId> = Vec::with_capacity(self.len());
        views.extend(self.srv.drain().map(|(_, v)| v));
        views.extend(self.rtv.drain().map(|(_, v)| v));
        views.extend(self.dsv.drain().map(|(_, v)| v));
        views
    }

    pub fn len(&self) -> usize {
        self.srv.len() + self.rtv.len() + self.dsv.len()
    }
}

/// A buffer resource: linear memory with retained contents.
#[derive(Debug)]
pub(crate) struct BufferEntry {
    pub kind: BufferKind,
    pub contents: Vec<u8>,
}

/// An image resource: dimensions, fixed format/kind, and its view caches.
#[derive(Debug)]
pub(crate) struct ImageEntry {
    pub width: u32,
    pub height: u32,
    pub array_size: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
    pub kind: ImageKind,
    pub multisampling: Multisampling,
    pub views: ViewCache,
}

/// A registry entry: exactly one resource kind for the entry's lifetime.
#[derive(Debug)]
pub(crate) enum ResourceEntry {
    Buffer(BufferEntry),
    Image(ImageEntry),
}

impl ResourceEntry {
    pub fn as_buffer(&self) -> Option<&BufferEntry> {
        match self {
            Self::Buffer(buffer) => Some(buffer),
            Self::Image(_) => None,
        }
    }

    pub fn as_buffer_mut(&mut self) -> Option<&mut BufferEntry> {
        match self {
            Self::Buffer(buffer) => Some(buffer),
            Self::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageEntry> {
        match self {
            Self::Image(image) => Some(image),
            Self::Buffer(_) => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut ImageEntry> {
        match self {
            Self::Image(image) => Some(image),
            Self::Buffer(_) => None,
        }
    }
}
