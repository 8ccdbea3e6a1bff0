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

//! Procedural geometry emitted in the binary model format.

use bytemuck::Zeroable;
use glam::Vec3;
use tessera_io::{ModelData, ModelMeshRecord, ModelVertexRecord, VertexAttributes};

fn vertex(position: Vec3, normal: Vec3, uv: [f32; 2], colour: [f32; 4]) -> ModelVertexRecord {
    let tangent = normal.any_orthonormal_vector();
    let bitangent = normal.cross(tangent);
    let mut record = ModelVertexRecord::zeroed();
    record.position = [position.x, position.y, position.z, 1.0];
    record.texcoord = [uv[0], uv[1], 0.0, 0.0];
    record.colour = colour;
    record.normal = [normal.x, normal.y, normal.z, 0.0];
    record.tangent = [tangent.x, tangent.y, tangent.z, 0.0];
    record.bitangent = [bitangent.x, bitangent.y, bitangent.z, 0.0];
    record
}

fn mesh_record(material: &str, index_count: u32, vertex_count: u32) -> ModelMeshRecord {
    let mut record = ModelMeshRecord::zeroed();
    record.set_material_name(material);
    record.index_count = index_count;
    record.vertex_count = vertex_count;
    record.attribute_mask = VertexAttributes::ALL.bits();
    record
}

/// A unit cube centred at the origin: 24 vertices, 36 indices, one mesh.
pub fn cube(material: &str) -> ModelData {
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, right, up) in FACES {
        let base = vertices.len() as u32;
        let centre = normal * 0.5;
        for (corner_r, corner_u, uv) in [
            (-0.5, -0.5, [0.0, 1.0]),
            (-0.5, 0.5, [0.0, 0.0]),
            (0.5, 0.5, [1.0, 0.0]),
            (0.5, -0.5, [1.0, 1.0]),
        ] {
            let position = centre + right * corner_r + up * corner_u;
            vertices.push(vertex(position, normal, uv, [1.0; 4]));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    ModelData {
        meshes: vec![mesh_record(
            material,
            indices.len() as u32,
            vertices.len() as u32,
        )],
        vertices,
        indices,
    }
}

/// A unit UV sphere centred at the origin, one mesh.
pub fn uv_sphere(material: &str, stacks: u32, slices: u32) -> ModelData {
    let stacks = stacks.max(2);
    let slices = slices.max(3);

    let mut vertices = Vec::new();
    for stack in 0..=stacks {
        let v = stack as f32 / stacks as f32;
        let phi = v * std::f32::consts::PI;
        for slice in 0..=slices {
            let u = slice as f32 / slices as f32;
            let theta = u * std::f32::consts::TAU;
            let normal = Vec3::new(
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            );
            vertices.push(vertex(normal * 0.5, normal, [u, v], [1.0; 4]));
        }
    }

    let ring = slices + 1;
    let mut indices = Vec::new();
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * ring + slice;
            let b = a + ring;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    ModelData {
        meshes: vec![mesh_record(
            material,
            indices.len() as u32,
            vertices.len() as u32,
        )],
        vertices,
        indices,
    }
}
