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

//! # Tessera IO
//!
//! Asset input/output for the engine: the fixed-record binary model format,
//! the texture manager, and the shader manager. Asset failures are surfaced
//! as [`AssetError`] values and logged; whether to abort or skip an asset is
//! the caller's policy.

#![warn(missing_docs)]

pub mod error;
pub mod model;
pub mod shaders;
pub mod textures;

pub use error::AssetError;
pub use model::{
    vertex_input_attributes, MaterialParams, Mesh, MeshMaterial, Model, ModelData, ModelHeader,
    ModelIndex, ModelMeshRecord, ModelVertexRecord, VertexAttributes, MODEL_MATERIAL_NAME_LEN,
};
pub use shaders::ShaderManager;
pub use textures::{TextureManager, TextureProxy};
