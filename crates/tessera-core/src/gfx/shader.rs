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

//! Shader stages, stage sets, and program descriptors.

use crate::gfx::ShaderModuleId;
use std::borrow::Cow;

/// One programmable unit of the graphics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Pixel stage.
    Pixel,
    /// Geometry stage.
    Geometry,
    /// Hull (tessellation control) stage.
    Hull,
    /// Domain (tessellation evaluation) stage.
    Domain,
    /// Compute stage.
    Compute,
}

impl ShaderStage {
    /// The number of pipeline stages.
    pub const COUNT: usize = 6;

    /// All stages, in binding order.
    pub const ALL: [ShaderStage; Self::COUNT] = [
        Self::Vertex,
        Self::Pixel,
        Self::Geometry,
        Self::Hull,
        Self::Domain,
        Self::Compute,
    ];

    /// Stable index of the stage within [`StageSet`] storage.
    pub const fn index(&self) -> usize {
        match self {
            Self::Vertex => 0,
            Self::Pixel => 1,
            Self::Geometry => 2,
            Self::Hull => 3,
            Self::Domain => 4,
            Self::Compute => 5,
        }
    }

    /// Short lowercase name used for log lines and file extensions.
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::Vertex => "vs",
            Self::Pixel => "ps",
            Self::Geometry => "gs",
            Self::Hull => "hs",
            Self::Domain => "ds",
            Self::Compute => "cs",
        }
    }
}

/// A fixed-size mapping from pipeline stage to an optional shader module.
///
/// Every stage slot is always present, so iterating a `StageSet` covers the
/// full pipeline; drivers rely on this to bind present stages and explicitly
/// unbind absent ones in a single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageSet {
    modules: [Option<ShaderModuleId>; ShaderStage::COUNT],
}

impl StageSet {
    /// Creates an empty stage set.
    pub const fn new() -> Self {
        Self {
            modules: [None; ShaderStage::COUNT],
        }
    }

    /// Returns the module attached to `stage`, if any.
    pub fn get(&self, stage: ShaderStage) -> Option<ShaderModuleId> {
        self.modules[stage.index()]
    }

    /// Attaches `module` to `stage`, replacing any previous attachment.
    pub fn set(&mut self, stage: ShaderStage, module: ShaderModuleId) {
        self.modules[stage.index()] = Some(module);
    }

    /// Iterates all six stages in binding order, present or not.
    pub fn iter(&self) -> impl Iterator<Item = (ShaderStage, Option<ShaderModuleId>)> + '_ {
        ShaderStage::ALL
            .iter()
            .map(move |stage| (*stage, self.modules[stage.index()]))
    }

    /// Returns `true` if no stage is attached.
    pub fn is_empty(&self) -> bool {
        self.modules.iter().all(Option::is_none)
    }

    /// Whether the set forms a drawable program: a vertex+pixel pair, or a
    /// compute stage alone.
    pub fn is_drawable(&self) -> bool {
        let graphics =
            self.get(ShaderStage::Vertex).is_some() && self.get(ShaderStage::Pixel).is_some();
        let compute_only = self.get(ShaderStage::Compute).is_some()
            && ShaderStage::ALL
                .iter()
                .filter(|s| **s != ShaderStage::Compute)
                .all(|s| self.get(*s).is_none());
        graphics || compute_only
    }
}

/// A descriptor for creating a single compiled shader stage module.
#[derive(Debug, Clone)]
pub struct ShaderModuleDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The stage the module was compiled for.
    pub stage: ShaderStage,
    /// The compiled bytecode. Retained by the device for reflection.
    pub bytecode: Cow<'a, [u8]>,
}

/// A descriptor for creating a shader program from per-stage modules.
///
/// Stages are attached through the stage-named builder methods, which makes
/// attaching a module under the wrong stage a visible mistake at the call
/// site; the device additionally verifies every attached module was compiled
/// for its slot.
#[derive(Debug, Clone, Default)]
pub struct ShaderProgramDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The per-stage module attachments.
    pub stages: StageSet,
}

impl<'a> ShaderProgramDescriptor<'a> {
    /// Creates an empty program descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the debug label.
    pub fn label(mut self, label: impl Into<Cow<'a, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attaches the vertex stage module.
    pub fn vertex(mut self, module: ShaderModuleId) -> Self {
        self.stages.set(ShaderStage::Vertex, module);
        self
    }

    /// Attaches the pixel stage module.
    pub fn pixel(mut self, module: ShaderModuleId) -> Self {
        self.stages.set(ShaderStage::Pixel, module);
        self
    }

    /// Attaches the geometry stage module.
    pub fn geometry(mut self, module: ShaderModuleId) -> Self {
        self.stages.set(ShaderStage::Geometry, module);
        self
    }

    /// Attaches the hull stage module.
    pub fn hull(mut self, module: ShaderModuleId) -> Self {
        self.stages.set(ShaderStage::Hull, module);
        self
    }

    /// Attaches the domain stage module.
    pub fn domain(mut self, module: ShaderModuleId) -> Self {
        self.stages.set(ShaderStage::Domain, module);
        self
    }

    /// Attaches the compute stage module.
    pub fn compute(mut self, module: ShaderModuleId) -> Self {
        self.stages.set(ShaderStage::Compute, module);
        self
    }
}
