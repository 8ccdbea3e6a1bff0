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

//! The sandbox scene: shadowed model, skybox, and a light-source marker.

use anyhow::{Context, Result};
use glam::{Mat4, Vec3, Vec4};
use std::borrow::Cow;
use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use tessera_core::gfx::{
    ConstantBuffer, ImageKind, InputLayoutDescriptor, InputLayoutId, Multisampling, RenderCommand,
    RenderDevice, ResourceId, SamplerAddressMode, SamplerDescriptor, SamplerFilter, SamplerId,
    ShaderProgramId, ShaderStage, TextureFormat, TextureResourceDescriptor, TextureUsage,
    TextureViewDescriptor, VertexTopology, ViewId, Viewport,
};
use tessera_core::LinearRgba;
use tessera_io::{vertex_input_attributes, MaterialParams, Model, TextureProxy, VertexAttributes};
use tessera_runtime::{CvarTable, GraphicsSystem};

use crate::assets;
use crate::uniforms::SceneUniforms;

const SHADOW_MAP_SIZE: u32 = 1024;
const SHADOW_TEXTURE_SLOT: usize = 8;

/// View directions and up vectors for the six faces of a shadow cube.
const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::Y),
    (Vec3::NEG_X, Vec3::Y),
    (Vec3::Y, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::Z),
    (Vec3::Z, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y),
];

struct Programs {
    standard: ShaderProgramId,
    light: ShaderProgramId,
    shadow: ShaderProgramId,
    skybox: ShaderProgramId,
}

struct Layouts {
    standard: InputLayoutId,
    light: InputLayoutId,
    shadow: InputLayoutId,
}

/// Everything the sandbox renders each frame.
pub struct SandboxScene {
    device: Arc<dyn RenderDevice>,
    programs: Programs,
    layouts: Layouts,
    model: Model,
    sphere: Model,
    checker: TextureProxy,
    sky: TextureProxy,
    sampler: SamplerId,
    shadow_cube: ResourceId,
    shadow_cube_srv: ViewId,
    shadow_depth_view: ViewId,
    depth_view: ViewId,
    scene_buffer: ConstantBuffer<SceneUniforms>,
    material_buffer: ConstantBuffer<MaterialParams>,
    pulsatance: f32,
    time: f32,
}

impl SandboxScene {
    /// Loads shaders and assets and builds the scene's GPU state.
    pub fn new(system: &mut GraphicsSystem) -> Result<Self> {
        let device = system.device().clone();
        let root = system.config().asset_root.clone();
        let (width, height) = (system.config().width, system.config().height);

        // Shader programs and the vertex modules their layouts reflect.
        let shaders = system.shaders();
        for name in assets::PROGRAMS {
            shaders.load_program(name)?;
        }
        let programs = Programs {
            standard: shaders.program("standard").context("standard program")?,
            light: shaders.program("lightsource").context("light program")?,
            shadow: shaders.program("shadowmap").context("shadow program")?,
            skybox: shaders.program("skybox").context("skybox program")?,
        };
        let standard_vs = shaders
            .stage_module("standard", ShaderStage::Vertex)
            .context("standard vertex module")?;
        let light_vs = shaders
            .stage_module("lightsource", ShaderStage::Vertex)
            .context("light vertex module")?;
        let shadow_vs = shaders
            .stage_module("shadowmap", ShaderStage::Vertex)
            .context("shadow vertex module")?;

        let layouts = Layouts {
            standard: device.create_input_layout(&InputLayoutDescriptor {
                label: Some("standard".into()),
                shader: standard_vs,
                attributes: Cow::Owned(vertex_input_attributes(VertexAttributes::ALL)),
            })?,
            light: device.create_input_layout(&InputLayoutDescriptor {
                label: Some("lightsource".into()),
                shader: light_vs,
                attributes: Cow::Owned(vertex_input_attributes(
                    VertexAttributes::POSITION | VertexAttributes::COLOUR,
                )),
            })?,
            shadow: device.create_input_layout(&InputLayoutDescriptor {
                label: Some("shadowmap".into()),
                shader: shadow_vs,
                attributes: Cow::Owned(vertex_input_attributes(VertexAttributes::POSITION)),
            })?,
        };

        // Procedural textures through the manager, then the models (whose
        // material files may reference further maps).
        let checker = system
            .textures()
            .insert_raw_2d("checker", 64, 64, &assets::checkerboard_pixels(64, 8))?;
        let sky = system
            .textures()
            .insert_raw_cube("sky", 64, &assets::sky_pixels(64))?;

        let model = Model::import(
            &device,
            system.textures(),
            &root.join("cube.tsm"),
            VertexAttributes::ALL,
        )?;
        let sphere = Model::import(
            &device,
            system.textures(),
            &root.join("sphere.tsm"),
            VertexAttributes::POSITION | VertexAttributes::COLOUR,
        )?;

        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("scene sampler".into()),
            address_u: SamplerAddressMode::Wrap,
            address_v: SamplerAddressMode::Wrap,
            address_w: SamplerAddressMode::Wrap,
            filtering: SamplerFilter::Anisotropic,
            anisotropy: 16,
            border: [0.0; 4],
        })?;

        // Shadow cube target: one colour slice per face plus a shared depth
        // target, rendered at a fixed resolution.
        let shadow_cube = device.create_texture(
            &TextureResourceDescriptor {
                label: Some("shadow cube".into()),
                width: SHADOW_MAP_SIZE,
                height: SHADOW_MAP_SIZE,
                depth: 0,
                array_size: 6,
                format: TextureFormat::Rg32Float,
                usage: TextureUsage::SHADER_RESOURCE | TextureUsage::RENDER_TARGET,
                kind: ImageKind::TextureCube,
                use_mips: false,
                multisampling: Multisampling::OFF,
            },
            None,
        )?;
        let shadow_cube_srv = device.create_texture_view_cube(
            shadow_cube,
            &TextureViewDescriptor {
                array_index: 0,
                array_count: 6,
            },
        )?;
        let shadow_depth = device.create_texture(
            &TextureResourceDescriptor {
                label: Some("shadow depth".into()),
                width: SHADOW_MAP_SIZE,
                height: SHADOW_MAP_SIZE,
                depth: 0,
                array_size: 1,
                format: TextureFormat::Depth32Float,
                usage: TextureUsage::DEPTH_TARGET,
                kind: ImageKind::Texture2D,
                use_mips: false,
                multisampling: Multisampling::OFF,
            },
            None,
        )?;
        let shadow_depth_view =
            device.create_depth_target_view(shadow_depth, &TextureViewDescriptor::default())?;

        let depth_view = Self::build_depth_target(&device, width, height)?;

        let scene_buffer = ConstantBuffer::new(&device, SceneUniforms::new())?;
        let material_buffer = ConstantBuffer::new(&device, MaterialParams::default())?;

        Ok(Self {
            device,
            programs,
            layouts,
            model,
            sphere,
            checker,
            sky,
            sampler,
            shadow_cube,
            shadow_cube_srv,
            shadow_depth_view,
            depth_view,
            scene_buffer,
            material_buffer,
            pulsatance: 0.0,
            time: 0.0,
        })
    }

    fn build_depth_target(
        device: &Arc<dyn RenderDevice>,
        width: u32,
        height: u32,
    ) -> Result<ViewId, tessera_core::gfx::DeviceError> {
        let depth = device.create_texture(
            &TextureResourceDescriptor {
                label: Some("scene depth".into()),
                width,
                height,
                depth: 0,
                array_size: 1,
                format: TextureFormat::Depth32Float,
                usage: TextureUsage::DEPTH_TARGET,
                kind: ImageKind::Texture2D,
                use_mips: false,
                multisampling: Multisampling::OFF,
            },
            None,
        )?;
        device.create_depth_target_view(depth, &TextureViewDescriptor::default())
    }

    /// Advances the simulation and records one frame of passes.
    pub fn frame(&mut self, system: &mut GraphicsSystem, cvars: &CvarTable, dt: f32) -> Result<()> {
        let (width, height) = (system.config().width, system.config().height);
        let display = system.display_target();
        let viewport = Viewport::sized(width, height);

        self.time += dt;
        let scale = cvars.get_float("scale", 1.0);
        if cvars.get_bool("simulation", true) {
            self.pulsatance = (self.pulsatance + TAU / 5.0 * dt) % TAU;
        }
        let light_pos = Vec3::new(12.0 * self.pulsatance.sin(), 2.0, 0.0) / scale.max(1e-3);

        // Orbiting camera standing in for the interactive one.
        let eye = Vec3::new(4.0 * self.time.sin(), 1.5, 4.0 * self.time.cos());
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let projection =
            Mat4::perspective_rh(PI / 4.0, width as f32 / height as f32, 0.1, 100.0);

        let mut scene = SceneUniforms::new();
        scene.world = Mat4::from_scale(Vec3::splat(scale));
        scene.view = view;
        scene.projection = projection;
        scene.eye_pos = eye.extend(1.0);
        scene.light_pos = light_pos.extend(1.0);
        scene.light_colour = Vec4::from((Vec3::from(cvars.get_vec3(
            "lightColour",
            [1.0, 1.0, 1.0],
        )), 1.0));
        scene.ambient_colour = Vec4::from((Vec3::from(cvars.get_vec3(
            "ambientColour",
            [0.21, 0.2, 0.21],
        )), 1.0));
        scene.atten_const = cvars.get_float("attenConst", 1.0);
        scene.atten_linear = cvars.get_float("attenLinear", 0.04);
        scene.atten_quad = cvars.get_float("attenQuad", 0.0);
        scene.prepare();

        self.shadow_pass(system, &scene, light_pos, scale)?;
        self.colour_pass(system, cvars, &scene, display, viewport, light_pos)?;
        Ok(())
    }

    /// Renders the model into each face of the shadow cube.
    fn shadow_pass(
        &mut self,
        system: &mut GraphicsSystem,
        scene: &SceneUniforms,
        light_pos: Vec3,
        scale: f32,
    ) -> Result<()> {
        let light_far = 100.0 / scale.max(1e-3);
        let light_projection = Mat4::perspective_rh(PI / 2.0, 1.0, 0.1, light_far);

        // Face render-target views are requested per frame; after the first
        // frame every request is a cache hit on the resource's view cache.
        let mut face_views = [ViewId(0); 6];
        for (face, view) in face_views.iter_mut().enumerate() {
            *view = self.device.create_render_target_view(
                self.shadow_cube,
                &TextureViewDescriptor {
                    array_index: face as u32,
                    array_count: 1,
                },
            )?;
        }

        let mut command = RenderCommand::new();
        command.depth_target = Some(self.shadow_depth_view);
        command.viewport = Viewport::sized(SHADOW_MAP_SIZE, SHADOW_MAP_SIZE);
        command.program = Some(self.programs.shadow);
        command.input_layout = Some(self.layouts.shadow);
        command.topology = VertexTopology::TriangleList;
        command.vertex_buffer = self.model.vertex_buffer();
        command.index_buffer = self.model.index_buffer();
        command.vertex_stride = self.model.vertex_stride();
        command.uniform_buffers[0] = self.scene_buffer.handle();

        for (face, (forward, up)) in CUBE_FACES.iter().enumerate() {
            let mut shadow = *scene;
            shadow.eye_pos = light_pos.extend(1.0);
            shadow.near_plane = 0.1;
            shadow.far_plane = light_far;
            shadow.projection = light_projection;
            shadow.view = Mat4::look_to_rh(light_pos, *forward, *up);
            shadow.prepare();
            self.scene_buffer.set(shadow);

            let context = system.context();
            context.clear_render_target(face_views[face], LinearRgba::TRANSPARENT)?;
            context.clear_depth_target(self.shadow_depth_view, 1.0)?;
            self.scene_buffer.commit(context)?;

            command.render_targets[0] = Some(face_views[face]);
            for mesh in self.model.meshes() {
                command.draw.index_start = mesh.index_offset;
                command.draw.index_count = mesh.index_count;
                command.draw.vertex_base = mesh.vertex_base;
                context.execute(&command)?;
            }
        }
        Ok(())
    }

    /// Skybox, model, and light-source passes into the display target.
    fn colour_pass(
        &mut self,
        system: &mut GraphicsSystem,
        cvars: &CvarTable,
        scene: &SceneUniforms,
        display: ViewId,
        viewport: Viewport,
        light_pos: Vec3,
    ) -> Result<()> {
        self.scene_buffer.set(*scene);
        let context = system.context();
        self.scene_buffer.commit(context)?;

        // Skybox: no vertex input, the shader generates the cube directions.
        {
            context.clear_depth_target(self.depth_view, 1.0)?;
            let mut command = RenderCommand::new();
            command.render_targets[0] = Some(display);
            command.depth_target = Some(self.depth_view);
            command.viewport = viewport;
            command.program = Some(self.programs.skybox);
            command.topology = VertexTopology::TriangleList;
            command.draw.vertex_count = 6;
            command.uniform_buffers[0] = self.scene_buffer.handle();
            command.textures[0] = Some(self.sky.view);
            command.samplers[0] = Some(self.sampler);
            context.execute(&command)?;
        }

        // The model, one draw per mesh with its material committed first.
        {
            context.clear_depth_target(self.depth_view, 1.0)?;
            let mut command = RenderCommand::new();
            command.render_targets[0] = Some(display);
            command.depth_target = Some(self.depth_view);
            command.viewport = viewport;
            command.program = Some(self.programs.standard);
            command.input_layout = Some(self.layouts.standard);
            command.topology = VertexTopology::TriangleList;
            command.vertex_buffer = self.model.vertex_buffer();
            command.index_buffer = self.model.index_buffer();
            command.vertex_stride = self.model.vertex_stride();
            command.uniform_buffers[0] = self.scene_buffer.handle();
            command.uniform_buffers[1] = self.material_buffer.handle();
            command.samplers[0] = Some(self.sampler);
            command.textures[SHADOW_TEXTURE_SLOT] = Some(self.shadow_cube_srv);

            for mesh in self.model.meshes() {
                let material = &mesh.material;
                command.textures[0] = Some(
                    material
                        .diffuse_map
                        .unwrap_or(self.checker)
                        .view,
                );
                command.textures[1] = material.normal_map.map(|map| map.view);
                command.textures[2] = material.specular_map.map(|map| map.view);
                command.textures[3] = material.displacement_map.map(|map| map.view);

                let mut params = material.params;
                params.use_diffuse_map = u32::from(cvars.get_bool("useDiffMap", true));
                params.use_normal_map &= u32::from(cvars.get_bool("useNormMap", true));
                params.use_specular_map &= u32::from(cvars.get_bool("useSpecMap", true));
                params.use_displacement_map &= u32::from(cvars.get_bool("useDispMap", true));
                self.material_buffer.set(params);
                self.material_buffer.commit(context)?;

                command.draw.index_start = mesh.index_offset;
                command.draw.index_count = mesh.index_count;
                command.draw.vertex_base = mesh.vertex_base;
                context.execute(&command)?;
            }
        }

        // The light source marker, drawn as an emissive sphere.
        {
            let mut light_scene = *scene;
            light_scene.world = Mat4::from_translation(light_pos);
            light_scene.prepare();
            self.scene_buffer.set(light_scene);
            self.scene_buffer.commit(context)?;

            let mut command = RenderCommand::new();
            command.render_targets[0] = Some(display);
            command.depth_target = Some(self.depth_view);
            command.viewport = viewport;
            command.program = Some(self.programs.light);
            command.input_layout = Some(self.layouts.light);
            command.topology = VertexTopology::TriangleList;
            command.vertex_buffer = self.sphere.vertex_buffer();
            command.index_buffer = self.sphere.index_buffer();
            command.vertex_stride = self.sphere.vertex_stride();
            command.uniform_buffers[0] = self.scene_buffer.handle();

            let mesh = &self.sphere.meshes()[0];
            command.draw.index_start = mesh.index_offset;
            command.draw.index_count = mesh.index_count;
            command.draw.vertex_base = mesh.vertex_base;
            context.execute(&command)?;
        }

        Ok(())
    }
}
