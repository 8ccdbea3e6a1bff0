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

//! Shader registry entries and the context's stage binding table.

use tessera_core::gfx::{ShaderModuleId, ShaderStage, StageSet};

/// A compiled stage module. The bytecode is retained because reflection
/// (input layout validation) runs against bytecode, not the opaque driver
/// object.
#[derive(Debug)]
pub(crate) struct ShaderModuleEntry {
    pub stage: ShaderStage,
    pub bytecode: Vec<u8>,
}

/// A shader program: the validated per-stage module set.
#[derive(Debug)]
pub(crate) struct ShaderProgramEntry {
    pub stages: StageSet,
}

/// The retained per-stage bindings of a context.
///
/// Native contexts keep previously bound stage state across draws, so a
/// program bind must cover every stage: present modules are bound, absent
/// slots are explicitly unbound. Skipping the unbind half would leak a stale
/// stage from a prior program into the next draw.
#[derive(Debug, Default)]
pub(crate) struct StageBindings {
    slots: [Option<ShaderModuleId>; ShaderStage::COUNT],
}

impl StageBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// The module currently bound at `stage`.
    pub fn bound(&self, stage: ShaderStage) -> Option<ShaderModuleId> {
        self.slots[stage.index()]
    }

    /// Total-coverage bind of a program's stage set.
    pub fn bind_stages(&mut self, stages: &StageSet) {
        for (stage, module) in stages.iter() {
            self.slots[stage.index()] = module;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(pairs: &[(ShaderStage, usize)]) -> StageSet {
        let mut set = StageSet::new();
        for (stage, id) in pairs {
            set.set(*stage, ShaderModuleId(*id));
        }
        set
    }

    #[test]
    fn binding_a_smaller_program_unbinds_the_dropped_stage() {
        let mut bindings = StageBindings::new();

        let full = program(&[(ShaderStage::Vertex, 1), (ShaderStage::Pixel, 2)]);
        bindings.bind_stages(&full);
        assert_eq!(bindings.bound(ShaderStage::Pixel), Some(ShaderModuleId(2)));

        let vertex_only = program(&[(ShaderStage::Vertex, 3)]);
        bindings.bind_stages(&vertex_only);
        assert_eq!(bindings.bound(ShaderStage::Vertex), Some(ShaderModuleId(3)));
        assert_eq!(
            bindings.bound(ShaderStage::Pixel),
            None,
            "pixel stage must not leak from the previous program"
        );
    }

    #[test]
    fn binding_is_idempotent() {
        let mut bindings = StageBindings::new();
        let set = program(&[
            (ShaderStage::Vertex, 1),
            (ShaderStage::Pixel, 2),
            (ShaderStage::Geometry, 3),
        ]);
        bindings.bind_stages(&set);
        let snapshot: Vec<_> = ShaderStage::ALL.iter().map(|s| bindings.bound(*s)).collect();
        bindings.bind_stages(&set);
        let again: Vec<_> = ShaderStage::ALL.iter().map(|s| bindings.bound(*s)).collect();
        assert_eq!(snapshot, again);
    }

    #[test]
    fn every_stage_slot_is_covered() {
        let mut bindings = StageBindings::new();
        let all = program(&[
            (ShaderStage::Vertex, 1),
            (ShaderStage::Pixel, 2),
            (ShaderStage::Geometry, 3),
            (ShaderStage::Hull, 4),
            (ShaderStage::Domain, 5),
            (ShaderStage::Compute, 6),
        ]);
        bindings.bind_stages(&all);
        for stage in ShaderStage::ALL {
            assert!(bindings.bound(stage).is_some());
        }

        bindings.bind_stages(&StageSet::new());
        for stage in ShaderStage::ALL {
            assert!(bindings.bound(stage).is_none());
        }
    }
}
