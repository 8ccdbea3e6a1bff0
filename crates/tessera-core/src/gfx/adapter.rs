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

//! Adapter and device information.

/// The physical kind of device backing a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    /// A CPU-side software implementation.
    #[default]
    Software,
    /// A GPU integrated with the CPU.
    IntegratedGpu,
    /// A discrete GPU.
    DiscreteGpu,
}

/// Standardized, driver-agnostic information about the active adapter.
#[derive(Debug, Clone, Default)]
pub struct AdapterInfo {
    /// Human-readable adapter name.
    pub name: String,
    /// The physical kind of the device.
    pub kind: DeviceKind,
}
