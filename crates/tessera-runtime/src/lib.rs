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

//! # Tessera Runtime
//!
//! Orchestration above the rendering contracts: the [`GraphicsSystem`] that
//! owns the device, the render context, and the asset managers; the
//! [`GraphicsConfig`] it boots from; and the console variable table used by
//! applications for runtime tuning.

#![warn(missing_docs)]

pub mod config;
pub mod cvars;
pub mod system;

pub use config::{DisplayMode, GraphicsConfig, RenderApi};
pub use cvars::CvarTable;
pub use system::GraphicsSystem;
