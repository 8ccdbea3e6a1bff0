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

//! The shader manager: precompiled stage bytecode files to device programs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tessera_core::gfx::{
    RenderDevice, ShaderModuleDescriptor, ShaderModuleId, ShaderProgramDescriptor,
    ShaderProgramId, ShaderStage, StageSet,
};

use crate::error::AssetError;

/// A program loaded by the manager: the device program plus its per-stage
/// modules for reflection-dependent callers (input layout creation).
#[derive(Debug, Clone, Copy)]
struct LoadedProgram {
    program: ShaderProgramId,
    stages: StageSet,
}

/// Loads precompiled shader stage bytecode and assembles device programs,
/// cached by logical name.
///
/// For a program `name`, the manager looks for `<name>.<stage>.tsb` files in
/// its root directory, one per pipeline stage (`vs`, `ps`, `gs`, `hs`, `ds`,
/// `cs`). Present stages are attached; the resulting set must be drawable.
pub struct ShaderManager {
    device: Arc<dyn RenderDevice>,
    root: PathBuf,
    programs: HashMap<String, LoadedProgram>,
}

impl ShaderManager {
    /// Creates a manager resolving names against `root`.
    pub fn new(device: Arc<dyn RenderDevice>, root: PathBuf) -> Self {
        Self {
            device,
            root,
            programs: HashMap::new(),
        }
    }

    /// Loads (or returns the cached) program for `name`.
    pub fn load_program(&mut self, name: &str) -> Result<ShaderProgramId, AssetError> {
        if let Some(loaded) = self.programs.get(name) {
            return Ok(loaded.program);
        }

        let mut descriptor = ShaderProgramDescriptor::new().label(name.to_string());
        let mut found_any = false;
        for stage in ShaderStage::ALL {
            let path = self
                .root
                .join(format!("{name}.{}.tsb", stage.short_name()));
            let bytecode = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            let module = self.device.create_shader_module(&ShaderModuleDescriptor {
                label: Some(format!("{name}.{}", stage.short_name()).into()),
                stage,
                bytecode: bytecode.into(),
            })?;
            descriptor.stages.set(stage, module);
            found_any = true;
            log::debug!("compiled shader stage \"{name}.{}\"", stage.short_name());
        }

        if !found_any || !descriptor.stages.is_drawable() {
            return Err(AssetError::IncompleteProgram {
                name: name.to_string(),
            });
        }

        let stages = descriptor.stages;
        let program = self.device.create_shader_program(&descriptor)?;
        log::info!("shader program \"{name}\" ready");
        self.programs
            .insert(name.to_string(), LoadedProgram { program, stages });
        Ok(program)
    }

    /// The program proxy for a previously loaded name.
    pub fn program(&self, name: &str) -> Option<ShaderProgramId> {
        self.programs.get(name).map(|loaded| loaded.program)
    }

    /// A stage module of a previously loaded program. The vertex module is
    /// what input layout creation reflects against.
    pub fn stage_module(&self, name: &str, stage: ShaderStage) -> Option<ShaderModuleId> {
        self.programs
            .get(name)
            .and_then(|loaded| loaded.stages.get(stage))
    }
}
