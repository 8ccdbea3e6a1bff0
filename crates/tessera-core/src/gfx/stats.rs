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

//! Cumulative device statistics.

/// A snapshot of the device's cumulative counters.
///
/// Counters only ever increase; callers diff two snapshots to measure a
/// frame or a scope. The view counters make the per-resource view caches
/// observable: a cache hit increments `view_cache_hits` and leaves
/// `views_created` untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceStats {
    /// Buffer resources created.
    pub buffers_created: u64,
    /// Texture resources created.
    pub textures_created: u64,
    /// Resources destroyed (buffers and textures).
    pub resources_destroyed: u64,
    /// Native views created (cache misses).
    pub views_created: u64,
    /// Native views released by resource reset or destruction.
    pub views_released: u64,
    /// View requests answered from a resource's view cache.
    pub view_cache_hits: u64,
    /// Shader stage modules created.
    pub shader_modules_created: u64,
    /// Shader programs created.
    pub shader_programs_created: u64,
    /// Input layouts created.
    pub input_layouts_created: u64,
    /// Samplers created.
    pub samplers_created: u64,
    /// Buffer updates applied through a context.
    pub buffer_updates: u64,
    /// Draw calls executed.
    pub draw_calls: u64,
    /// Context command streams submitted.
    pub frames_submitted: u64,
}

impl DeviceStats {
    /// Native views currently alive.
    pub fn views_alive(&self) -> u64 {
        self.views_created.saturating_sub(self.views_released)
    }
}
