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

//! The per-scene uniform block shared by every pass.

use glam::{Mat4, Vec4};

/// Scene-wide shader constants.
///
/// Committed through a `ConstantBuffer`, so the layout is `#[repr(C)]` and
/// padded to a 16-byte multiple. Inverse matrices are refreshed by
/// [`prepare`](SceneUniforms::prepare) after the transforms change.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    /// Object-to-world transform.
    pub world: Mat4,
    /// Inverse of `world`.
    pub inv_world: Mat4,
    /// World-to-view transform.
    pub view: Mat4,
    /// Inverse of `view`.
    pub inv_view: Mat4,
    /// View-to-clip transform.
    pub projection: Mat4,
    /// Inverse of `projection`.
    pub inv_projection: Mat4,
    /// Light position (w unused).
    pub light_pos: Vec4,
    /// Light colour.
    pub light_colour: Vec4,
    /// Global ambient colour.
    pub ambient_colour: Vec4,
    /// Camera position (w unused).
    pub eye_pos: Vec4,
    /// Near clip plane distance.
    pub near_plane: f32,
    /// Far clip plane distance.
    pub far_plane: f32,
    /// Constant light attenuation factor.
    pub atten_const: f32,
    /// Linear light attenuation factor.
    pub atten_linear: f32,
    /// Quadratic light attenuation factor.
    pub atten_quad: f32,
    /// Pads the block to a 16-byte multiple.
    pub _pad: [f32; 3],
}

impl SceneUniforms {
    /// Identity transforms, black light, unit attenuation.
    pub fn new() -> Self {
        Self {
            world: Mat4::IDENTITY,
            inv_world: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            inv_view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            inv_projection: Mat4::IDENTITY,
            light_pos: Vec4::ZERO,
            light_colour: Vec4::ZERO,
            ambient_colour: Vec4::ZERO,
            eye_pos: Vec4::ZERO,
            near_plane: 0.1,
            far_plane: 100.0,
            atten_const: 1.0,
            atten_linear: 0.0,
            atten_quad: 0.0,
            _pad: [0.0; 3],
        }
    }

    /// Recomputes the inverse matrices from the current transforms.
    pub fn prepare(&mut self) {
        self.inv_world = self.world.inverse();
        self.inv_view = self.view.inverse();
        self.inv_projection = self.projection.inverse();
    }
}

impl Default for SceneUniforms {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn block_is_constant_buffer_sized() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 480);
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);
    }

    #[test]
    fn prepare_refreshes_the_inverses() {
        let mut uniforms = SceneUniforms::new();
        uniforms.world = Mat4::from_translation(Vec3::new(3.0, -1.0, 2.0));
        uniforms.view = Mat4::look_at_rh(Vec3::new(0.0, 1.0, 5.0), Vec3::ZERO, Vec3::Y);
        uniforms.prepare();

        let round_trip = uniforms.world * uniforms.inv_world;
        assert!(round_trip.abs_diff_eq(Mat4::IDENTITY, 1e-5));
        let round_trip = uniforms.view * uniforms.inv_view;
        assert!(round_trip.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }
}
