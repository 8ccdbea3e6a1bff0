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

//! Model import: record blocks to device buffers plus per-mesh materials.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use bytemuck::Zeroable;
use serde::Deserialize;

use tessera_core::gfx::{Buffer, BufferKind, RenderDevice, ResourceId};
use tessera_core::Stopwatch;

use crate::error::AssetError;
use crate::model::{ModelData, ModelVertexRecord, VertexAttributes};
use crate::textures::{TextureManager, TextureProxy};

/// GPU-visible material constants, committed per mesh before its draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialParams {
    /// Diffuse reflectance colour.
    pub diffuse_colour: [f32; 4],
    /// Ambient reflectance colour.
    pub ambient_colour: [f32; 4],
    /// Emissive colour.
    pub emissive_colour: [f32; 4],
    /// Specular exponent.
    pub specular_power: f32,
    /// Non-zero when a diffuse map is bound.
    pub use_diffuse_map: u32,
    /// Non-zero when a normal map is bound.
    pub use_normal_map: u32,
    /// Non-zero when a specular map is bound.
    pub use_specular_map: u32,
    /// Non-zero when a displacement map is bound.
    pub use_displacement_map: u32,
    /// Keeps the struct a multiple of 16 bytes for constant buffer layout.
    pub _padding: [u32; 3],
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// One entry of a model's sibling material file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MaterialDesc {
    shininess: f32,
    diffuse_colour: [f32; 4],
    ambient_colour: [f32; 4],
    emissive_colour: [f32; 4],
    diffuse_map: Option<String>,
    normal_map: Option<String>,
    specular_map: Option<String>,
    displacement_map: Option<String>,
}

/// The material file: a map from material name to its description.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MaterialFile {
    materials: HashMap<String, MaterialDesc>,
}

/// A mesh material: the GPU constants plus the resolved texture maps.
#[derive(Debug, Default)]
pub struct MeshMaterial {
    /// The constants committed before drawing the mesh.
    pub params: MaterialParams,
    /// Diffuse map, if the material names one.
    pub diffuse_map: Option<TextureProxy>,
    /// Normal map.
    pub normal_map: Option<TextureProxy>,
    /// Specular map.
    pub specular_map: Option<TextureProxy>,
    /// Displacement map.
    pub displacement_map: Option<TextureProxy>,
}

/// One drawable mesh of an imported model.
#[derive(Debug)]
pub struct Mesh {
    /// Material name from the mesh record.
    pub name: String,
    /// First index within the model's shared index buffer.
    pub index_offset: u32,
    /// Number of indices.
    pub index_count: u32,
    /// Base vertex added to each index.
    pub vertex_base: i32,
    /// The attributes this mesh carries (after masking).
    pub attributes: VertexAttributes,
    /// The resolved material.
    pub material: MeshMaterial,
}

/// An imported model: one shared vertex/index buffer pair and its meshes.
#[derive(Debug)]
pub struct Model {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    meshes: Vec<Mesh>,
}

impl Model {
    /// Imports a model file and its sibling material file.
    ///
    /// The binary blocks are uploaded as one vertex buffer and one index
    /// buffer; each mesh resolves its material from `<stem>.mat.json` next
    /// to the model. A missing material file or entry is logged and falls
    /// back to default constants; the model still imports.
    pub fn import(
        device: &Arc<dyn RenderDevice>,
        textures: &mut TextureManager,
        path: &Path,
        attribute_mask: VertexAttributes,
    ) -> Result<Self, AssetError> {
        let watch = Stopwatch::new();
        log::info!("importing model \"{}\"...", path.display());

        let data = ModelData::read_file(path)?;

        let vertex_buffer = Buffer::from_bytes(
            device,
            bytemuck::cast_slice(&data.vertices),
            BufferKind::Vertex,
        )?;
        let index_buffer = Buffer::from_bytes(
            device,
            bytemuck::cast_slice(&data.indices),
            BufferKind::Index,
        )?;

        let materials = load_material_file(&path.with_extension("mat.json"));

        let mut meshes = Vec::with_capacity(data.meshes.len());
        let mut vertex_base = 0i32;
        for (idx, record) in data.meshes.iter().enumerate() {
            let name = record.material_name().to_string();
            let material = match materials.materials.get(&name) {
                Some(desc) => resolve_material(desc, textures),
                None => {
                    log::warn!("material({idx}) '{name}' was not found");
                    MeshMaterial::default()
                }
            };

            meshes.push(Mesh {
                name,
                index_offset: record.index_offset,
                index_count: record.index_count,
                vertex_base,
                attributes: record.attributes() & attribute_mask,
                material,
            });
            vertex_base += record.vertex_count as i32;
        }

        log::info!(
            "model imported successfully ({} mesh(es), {:.1}ms)",
            meshes.len(),
            watch.elapsed_ms()
        );

        Ok(Self {
            vertex_buffer,
            index_buffer,
            meshes,
        })
    }

    /// The shared vertex buffer handle.
    pub fn vertex_buffer(&self) -> Option<ResourceId> {
        self.vertex_buffer.handle()
    }

    /// The shared index buffer handle.
    pub fn index_buffer(&self) -> Option<ResourceId> {
        self.index_buffer.handle()
    }

    /// Byte stride of one vertex record.
    pub fn vertex_stride(&self) -> u32 {
        ModelVertexRecord::STRIDE
    }

    /// The imported meshes.
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }
}

fn load_material_file(path: &Path) -> MaterialFile {
    match std::fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(file) => file,
            Err(err) => {
                log::warn!("material file \"{}\" is malformed: {err}", path.display());
                MaterialFile::default()
            }
        },
        Err(_) => {
            log::warn!("material file \"{}\" does not exist", path.display());
            MaterialFile::default()
        }
    }
}

fn resolve_material(desc: &MaterialDesc, textures: &mut TextureManager) -> MeshMaterial {
    let mut material = MeshMaterial {
        params: MaterialParams {
            diffuse_colour: desc.diffuse_colour,
            ambient_colour: desc.ambient_colour,
            emissive_colour: desc.emissive_colour,
            specular_power: desc.shininess,
            ..MaterialParams::default()
        },
        ..MeshMaterial::default()
    };

    let mut load = |map: &Option<String>, used: &mut u32| -> Option<TextureProxy> {
        let name = map.as_deref()?.trim();
        if name.is_empty() {
            return None;
        }
        match textures.load_2d(name) {
            Ok(proxy) => {
                *used = 1;
                Some(proxy)
            }
            Err(err) => {
                log::warn!("texture map \"{name}\" failed to load: {err}");
                None
            }
        }
    };

    let mut params = material.params;
    material.diffuse_map = load(&desc.diffuse_map, &mut params.use_diffuse_map);
    material.normal_map = load(&desc.normal_map, &mut params.use_normal_map);
    material.specular_map = load(&desc.specular_map, &mut params.use_specular_map);
    material.displacement_map = load(&desc.displacement_map, &mut params.use_displacement_map);
    material.params = params;

    material
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelMeshRecord, MODEL_MATERIAL_NAME_LEN};
    use bytemuck::Zeroable;
    use tessera_infra::{SoftDevice, SoftDeviceDescriptor};

    fn test_device() -> Arc<dyn RenderDevice> {
        Arc::new(SoftDevice::new(&SoftDeviceDescriptor::default()).unwrap())
    }

    fn write_sample_assets(dir: &Path) -> std::path::PathBuf {
        let mut mesh = ModelMeshRecord::zeroed();
        mesh.set_material_name("stone");
        mesh.index_count = 3;
        mesh.vertex_count = 3;
        mesh.attribute_mask = VertexAttributes::ALL.bits();

        let data = ModelData {
            meshes: vec![mesh],
            vertices: vec![ModelVertexRecord::zeroed(); 3],
            indices: vec![0, 1, 2],
        };
        let model_path = dir.join("rock.tsm");
        data.write_file(&model_path).unwrap();

        std::fs::write(
            dir.join("rock.mat.json"),
            r#"{
                "materials": {
                    "stone": {
                        "shininess": 24.0,
                        "diffuseColour": [0.8, 0.7, 0.6, 1.0]
                    }
                }
            }"#,
        )
        .unwrap();
        model_path
    }

    #[test]
    fn material_params_layout_is_gpu_friendly() {
        assert_eq!(std::mem::size_of::<MaterialParams>(), 80);
        assert_eq!(std::mem::size_of::<MaterialParams>() % 16, 0);
    }

    #[test]
    fn import_uploads_buffers_and_resolves_materials() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = write_sample_assets(dir.path());

        let device = test_device();
        let mut textures = TextureManager::new(device.clone(), dir.path().to_path_buf());
        let model = Model::import(&device, &mut textures, &model_path, VertexAttributes::ALL)
            .unwrap();

        assert!(model.vertex_buffer().is_some());
        assert!(model.index_buffer().is_some());
        assert_eq!(model.vertex_stride(), 96);
        assert_eq!(model.meshes().len(), 1);

        let mesh = &model.meshes()[0];
        assert_eq!(mesh.name, "stone");
        assert_eq!(mesh.index_count, 3);
        assert_eq!(mesh.vertex_base, 0);
        assert_eq!(mesh.material.params.specular_power, 24.0);
        assert_eq!(mesh.material.params.diffuse_colour, [0.8, 0.7, 0.6, 1.0]);
        assert_eq!(mesh.material.params.use_diffuse_map, 0);

        // The uploaded index buffer holds the exact index block bytes.
        let contents = device.read_buffer(model.index_buffer().unwrap()).unwrap();
        assert_eq!(contents, bytemuck::cast_slice::<u32, u8>(&[0u32, 1, 2]));
    }

    #[test]
    fn missing_material_entries_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut mesh = ModelMeshRecord::zeroed();
        mesh.set_material_name("unknown");
        mesh.index_count = 3;
        mesh.vertex_count = 3;
        let data = ModelData {
            meshes: vec![mesh],
            vertices: vec![ModelVertexRecord::zeroed(); 3],
            indices: vec![0, 1, 2],
        };
        let path = dir.path().join("bare.tsm");
        data.write_file(&path).unwrap();

        let device = test_device();
        let mut textures = TextureManager::new(device.clone(), dir.path().to_path_buf());
        let model =
            Model::import(&device, &mut textures, &path, VertexAttributes::ALL).unwrap();
        assert_eq!(model.meshes()[0].material.params, MaterialParams::default());
    }

    #[test]
    fn vertex_base_accumulates_across_meshes() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = ModelMeshRecord::zeroed();
        first.set_material_name("a");
        first.index_count = 3;
        first.vertex_count = 7;
        let mut second = ModelMeshRecord::zeroed();
        second.set_material_name("b");
        second.index_offset = 3;
        second.index_count = 3;
        second.vertex_count = 5;

        let data = ModelData {
            meshes: vec![first, second],
            vertices: vec![ModelVertexRecord::zeroed(); 12],
            indices: vec![0; 6],
        };
        let path = dir.path().join("two.tsm");
        data.write_file(&path).unwrap();

        let device = test_device();
        let mut textures = TextureManager::new(device.clone(), dir.path().to_path_buf());
        let model =
            Model::import(&device, &mut textures, &path, VertexAttributes::ALL).unwrap();
        assert_eq!(model.meshes()[0].vertex_base, 0);
        assert_eq!(model.meshes()[1].vertex_base, 7);
    }

    #[test]
    fn long_material_names_survive_the_fixed_field() {
        let mut record = ModelMeshRecord::zeroed();
        let name = "m".repeat(MODEL_MATERIAL_NAME_LEN);
        record.set_material_name(&name);
        assert_eq!(record.material_name(), name.as_str());
    }
}
