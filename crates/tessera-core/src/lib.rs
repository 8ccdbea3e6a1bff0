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

//! # Tessera Core
//!
//! Foundational crate containing the hardware-abstracted rendering contracts:
//! typed resource handles, creation descriptors, the declarative
//! [`RenderCommand`](gfx::RenderCommand), the [`RenderDevice`](gfx::RenderDevice)
//! and [`RenderContext`](gfx::RenderContext) traits, and the typed buffer
//! wrappers built on top of them.
//!
//! This crate defines the *what* of rendering; the *how* is provided by a
//! concrete driver in the `tessera-infra` crate which implements these traits.

#![warn(missing_docs)]

pub mod color;
pub mod gfx;
pub mod utils;

pub use color::LinearRgba;
pub use utils::timer::Stopwatch;
