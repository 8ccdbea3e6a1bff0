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

//! # Tessera Infra
//!
//! Concrete implementations of the `tessera-core` rendering contracts.
//!
//! The in-tree driver is the software reference device ([`soft`]): it
//! implements the full resource, view-cache, shader-binding, and command
//! execution semantics on the CPU, which makes it suitable for headless
//! runs, tooling, and tests. GPU-backed drivers plug in at the same trait
//! boundary.

#![warn(missing_docs)]

pub mod soft;

pub use soft::{SoftDevice, SoftDeviceDescriptor};
