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

//! The software reference render device.
//!
//! `soft` keeps every device-owned object in CPU-side registries guarded by
//! mutexes, with handle values drawn from monotonically increasing counters
//! that are never reused. Buffers retain their contents, images carry their
//! per-resource view caches, and the context maintains the retained stage
//! and target bindings a native immediate context would. Draws are recorded
//! into the context's command stream and accounted in the device statistics
//! at submission.

mod context;
mod device;
mod resource;
mod shader;

pub use context::SoftContext;
pub use device::{SoftDevice, SoftDeviceDescriptor};
