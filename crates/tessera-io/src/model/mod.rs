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

//! The binary model format.
//!
//! A model file is four fixed-size record blocks, written back to back with
//! no versioning field and no padding between blocks:
//!
//! 1. one [`ModelHeader`],
//! 2. `mesh_count` × [`ModelMeshRecord`],
//! 3. `vertex_count` × [`ModelVertexRecord`],
//! 4. `index_count` × [`ModelIndex`].
//!
//! The records are `#[repr(C)]` PODs read and written verbatim; changing any
//! field is a breaking format change and needs an explicit migration.

mod import;

pub use import::{MaterialParams, Mesh, MeshMaterial, Model};

use crate::error::AssetError;
use bytemuck::Zeroable;
use std::io::{Read, Write};
use std::path::Path;

use tessera_core::gfx::{InputAttributeDescriptor, InputChannel, InputFormat};
use tessera_core::tessera_bitflags;

/// Length of the fixed material name field in a mesh record.
pub const MODEL_MATERIAL_NAME_LEN: usize = 64;

/// Element type of the model index block.
pub type ModelIndex = u32;

/// Refuses headers whose counts would allocate absurd amounts of memory.
const MAX_RECORD_COUNT: u32 = 1 << 24;

tessera_bitflags! {
    /// The vertex attributes present in a mesh, one bit per attribute slot
    /// of [`ModelVertexRecord`].
    pub struct VertexAttributes: u32 {
        /// Position, `[f32; 4]`.
        const POSITION = 1 << 0;
        /// Texture coordinates, the first two floats of the slot.
        const TEXCOORD = 1 << 1;
        /// Vertex colour, `[f32; 4]`.
        const COLOUR = 1 << 2;
        /// Normal, the first three floats of the slot.
        const NORMAL = 1 << 3;
        /// Tangent, the first three floats of the slot.
        const TANGENT = 1 << 4;
        /// Bitangent, the first three floats of the slot.
        const BITANGENT = 1 << 5;
        /// Every attribute slot.
        const ALL = 0x3f;
    }
}

/// The leading record of a model file.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelHeader {
    /// Number of mesh records.
    pub mesh_count: u32,
    /// Number of vertex records.
    pub vertex_count: u32,
    /// Number of indices.
    pub index_count: u32,
}

/// One mesh of a model: an index range into the shared index block plus the
/// material it is drawn with.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelMeshRecord {
    /// Material name, NUL-padded.
    pub material_name: [u8; MODEL_MATERIAL_NAME_LEN],
    /// First index of the mesh within the index block.
    pub index_offset: u32,
    /// Number of indices.
    pub index_count: u32,
    /// Number of vertices referenced by the mesh.
    pub vertex_count: u32,
    /// The [`VertexAttributes`] present, as a raw mask.
    pub attribute_mask: u32,
}

impl ModelMeshRecord {
    /// Writes `name` into the fixed-size field, truncated and NUL-padded.
    pub fn set_material_name(&mut self, name: &str) {
        self.material_name = [0; MODEL_MATERIAL_NAME_LEN];
        let bytes = name.as_bytes();
        let len = bytes.len().min(MODEL_MATERIAL_NAME_LEN);
        self.material_name[..len].copy_from_slice(&bytes[..len]);
    }

    /// The material name up to the first NUL. Non-UTF-8 names read as empty.
    pub fn material_name(&self) -> &str {
        let end = self
            .material_name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MODEL_MATERIAL_NAME_LEN);
        std::str::from_utf8(&self.material_name[..end]).unwrap_or("")
    }

    /// The attribute mask as typed flags.
    pub fn attributes(&self) -> VertexAttributes {
        VertexAttributes::from_bits(self.attribute_mask)
    }
}

/// One vertex: six four-float attribute slots, 96 bytes.
///
/// Narrow attributes (texcoord, normal, tangent, bitangent) occupy the
/// leading floats of their slot; the remainder is padding on disk.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertexRecord {
    /// Position (xyzw).
    pub position: [f32; 4],
    /// Texture coordinates (uv in the first two floats).
    pub texcoord: [f32; 4],
    /// Vertex colour (rgba).
    pub colour: [f32; 4],
    /// Normal (xyz).
    pub normal: [f32; 4],
    /// Tangent (xyz).
    pub tangent: [f32; 4],
    /// Bitangent (xyz).
    pub bitangent: [f32; 4],
}

impl ModelVertexRecord {
    /// Byte stride of one vertex record.
    pub const STRIDE: u32 = std::mem::size_of::<ModelVertexRecord>() as u32;

    /// Byte offset of one attribute slot within the record.
    pub const fn slot_offset(slot: u32) -> u32 {
        slot * std::mem::size_of::<[f32; 4]>() as u32
    }
}

/// A model's record blocks, as read from or written to disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    /// The mesh records.
    pub meshes: Vec<ModelMeshRecord>,
    /// The shared vertex block.
    pub vertices: Vec<ModelVertexRecord>,
    /// The shared index block.
    pub indices: Vec<ModelIndex>,
}

impl ModelData {
    /// The header describing this data.
    pub fn header(&self) -> ModelHeader {
        ModelHeader {
            mesh_count: self.meshes.len() as u32,
            vertex_count: self.vertices.len() as u32,
            index_count: self.indices.len() as u32,
        }
    }

    /// Reads the record blocks from `reader`.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, AssetError> {
        let mut header = ModelHeader::zeroed();
        reader.read_exact(bytemuck::bytes_of_mut(&mut header))?;
        if header.mesh_count > MAX_RECORD_COUNT
            || header.vertex_count > MAX_RECORD_COUNT
            || header.index_count > MAX_RECORD_COUNT
        {
            return Err(AssetError::Corrupt(format!(
                "implausible model header counts ({}/{}/{})",
                header.mesh_count, header.vertex_count, header.index_count
            )));
        }

        let mut meshes = vec![ModelMeshRecord::zeroed(); header.mesh_count as usize];
        reader.read_exact(bytemuck::cast_slice_mut(&mut meshes))?;
        let mut vertices = vec![ModelVertexRecord::zeroed(); header.vertex_count as usize];
        reader.read_exact(bytemuck::cast_slice_mut(&mut vertices))?;
        let mut indices = vec![0 as ModelIndex; header.index_count as usize];
        reader.read_exact(bytemuck::cast_slice_mut(&mut indices))?;

        Ok(Self {
            meshes,
            vertices,
            indices,
        })
    }

    /// Writes the record blocks to `writer`.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), AssetError> {
        writer.write_all(bytemuck::bytes_of(&self.header()))?;
        writer.write_all(bytemuck::cast_slice(&self.meshes))?;
        writer.write_all(bytemuck::cast_slice(&self.vertices))?;
        writer.write_all(bytemuck::cast_slice(&self.indices))?;
        Ok(())
    }

    /// Reads a model file.
    pub fn read_file(path: &Path) -> Result<Self, AssetError> {
        let mut file = std::io::BufReader::new(std::fs::File::open(path)?);
        Self::read(&mut file)
    }

    /// Writes a model file.
    pub fn write_file(&self, path: &Path) -> Result<(), AssetError> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write(&mut file)
    }
}

/// Builds the input attribute list for the vertex record layout, filtered by
/// an attribute mask.
///
/// Offsets address the attribute slots of [`ModelVertexRecord`]; narrow
/// attributes keep their slot's full 16-byte stride on disk.
pub fn vertex_input_attributes(mask: VertexAttributes) -> Vec<InputAttributeDescriptor<'static>> {
    const TABLE: [(VertexAttributes, &str, u32, InputFormat); 6] = [
        (VertexAttributes::POSITION, "POSITION", 0, InputFormat::Float4),
        (VertexAttributes::TEXCOORD, "TEXCOORD", 1, InputFormat::Float2),
        (VertexAttributes::COLOUR, "COLOUR", 2, InputFormat::Float4),
        (VertexAttributes::NORMAL, "NORMAL", 3, InputFormat::Float3),
        (VertexAttributes::TANGENT, "TANGENT", 4, InputFormat::Float3),
        (
            VertexAttributes::BITANGENT,
            "BITANGENT",
            5,
            InputFormat::Float3,
        ),
    ];

    TABLE
        .iter()
        .filter(|(flag, _, _, _)| mask.contains(*flag))
        .map(|(_, semantic, slot, format)| InputAttributeDescriptor {
            buffer_slot: 0,
            semantic: (*semantic).into(),
            byte_offset: ModelVertexRecord::slot_offset(*slot),
            format: *format,
            channel: InputChannel::PerVertex,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> ModelData {
        let mut mesh_a = ModelMeshRecord::zeroed();
        mesh_a.set_material_name("hull");
        mesh_a.index_offset = 0;
        mesh_a.index_count = 3;
        mesh_a.vertex_count = 3;
        mesh_a.attribute_mask = (VertexAttributes::POSITION | VertexAttributes::NORMAL).bits();

        let mut mesh_b = ModelMeshRecord::zeroed();
        mesh_b.set_material_name("glass");
        mesh_b.index_offset = 3;
        mesh_b.index_count = 3;
        mesh_b.vertex_count = 2;
        mesh_b.attribute_mask = VertexAttributes::ALL.bits();

        let mut vertices = vec![ModelVertexRecord::zeroed(); 5];
        for (i, vertex) in vertices.iter_mut().enumerate() {
            vertex.position = [i as f32, 2.0 * i as f32, -1.0, 1.0];
            vertex.normal = [0.0, 1.0, 0.0, 0.0];
            vertex.texcoord = [0.5, 0.25, 0.0, 0.0];
        }

        ModelData {
            meshes: vec![mesh_a, mesh_b],
            vertices,
            indices: vec![0, 1, 2, 2, 3, 4],
        }
    }

    #[test]
    fn record_sizes_are_fixed() {
        assert_eq!(std::mem::size_of::<ModelHeader>(), 12);
        assert_eq!(
            std::mem::size_of::<ModelMeshRecord>(),
            MODEL_MATERIAL_NAME_LEN + 16
        );
        assert_eq!(std::mem::size_of::<ModelVertexRecord>(), 96);
        assert_eq!(ModelVertexRecord::STRIDE, 96);
    }

    #[test]
    fn round_trip_preserves_cardinalities_and_bytes() {
        let model = sample_model();
        let mut blob = Vec::new();
        model.write(&mut blob).unwrap();

        let read_back = ModelData::read(&mut blob.as_slice()).unwrap();
        assert_eq!(read_back.meshes.len(), model.meshes.len());
        assert_eq!(read_back.vertices.len(), model.vertices.len());
        assert_eq!(read_back.indices.len(), model.indices.len());
        assert_eq!(read_back, model);

        // Byte-for-byte: re-serializing yields the identical blob.
        let mut again = Vec::new();
        read_back.write(&mut again).unwrap();
        assert_eq!(again, blob);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.tsm");
        let model = sample_model();
        model.write_file(&path).unwrap();
        let read_back = ModelData::read_file(&path).unwrap();
        assert_eq!(read_back, model);
    }

    #[test]
    fn truncated_files_are_rejected() {
        let model = sample_model();
        let mut blob = Vec::new();
        model.write(&mut blob).unwrap();
        blob.truncate(blob.len() - 7);
        assert!(matches!(
            ModelData::read(&mut blob.as_slice()),
            Err(AssetError::Io(_))
        ));
    }

    #[test]
    fn implausible_header_counts_are_rejected() {
        let header = ModelHeader {
            mesh_count: u32::MAX,
            vertex_count: 1,
            index_count: 1,
        };
        let blob = bytemuck::bytes_of(&header).to_vec();
        assert!(matches!(
            ModelData::read(&mut blob.as_slice()),
            Err(AssetError::Corrupt(_))
        ));
    }

    #[test]
    fn material_names_truncate_and_round_trip() {
        let mut record = ModelMeshRecord::zeroed();
        record.set_material_name("bricks");
        assert_eq!(record.material_name(), "bricks");

        let long = "x".repeat(MODEL_MATERIAL_NAME_LEN + 10);
        record.set_material_name(&long);
        assert_eq!(record.material_name().len(), MODEL_MATERIAL_NAME_LEN);
    }

    #[test]
    fn attribute_list_follows_the_mask() {
        let attributes = vertex_input_attributes(
            VertexAttributes::POSITION | VertexAttributes::TEXCOORD | VertexAttributes::NORMAL,
        );
        let semantics: Vec<&str> = attributes.iter().map(|a| a.semantic.as_ref()).collect();
        assert_eq!(semantics, ["POSITION", "TEXCOORD", "NORMAL"]);
        assert_eq!(attributes[0].byte_offset, 0);
        assert_eq!(attributes[1].byte_offset, 16);
        assert_eq!(attributes[2].byte_offset, 48);
        assert_eq!(attributes[1].format, InputFormat::Float2);

        assert!(vertex_input_attributes(VertexAttributes::EMPTY).is_empty());
        assert_eq!(vertex_input_attributes(VertexAttributes::ALL).len(), 6);
    }
}
