//! Test-side reflection of the embedded GLSL through naga's GLSL frontend
//!
//! Parses both stages of a program and collects the names the CPU side
//! addresses: uniform block members, texture bindings and the size of the
//! push-constant block.

use naga::front::glsl::{Frontend, Options};
use naga::{AddressSpace, ArraySize, Module, ShaderStage, TypeInner};
use rustc_hash::FxHashMap;
use crate::graphics_device::ShaderProgramDesc;

/// Descriptor set holding each program's uniform block
pub const UNIFORM_SET: u32 = 0;
/// Descriptor set holding the shared sampler
pub const SAMPLER_SET: u32 = 1;
/// Descriptor set holding textures, binding = texture unit
pub const TEXTURE_SET: u32 = 2;

/// Resource binding of a texture or sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub set: u32,
    pub binding: u32,
}

/// Everything a program exposes to the command stream
#[derive(Debug, Default)]
pub struct ProgramInterface {
    /// Uniform block members; arrays carry their length
    uniforms: FxHashMap<String, Option<u32>>,
    uniform_blocks: Vec<Binding>,
    textures: FxHashMap<String, Binding>,
    samplers: FxHashMap<String, Binding>,
    push_constant_size: Option<u32>,
}

impl ProgramInterface {
    /// Parse both stages and merge what they declare
    pub fn reflect(desc: &ShaderProgramDesc) -> Result<Self, String> {
        let mut interface = Self::default();
        for (stage, source) in [
            (ShaderStage::Vertex, desc.vertex_source),
            (ShaderStage::Fragment, desc.fragment_source),
        ] {
            let module = parse(stage, source)
                .map_err(|err| format!("{} {:?} stage: {}", desc.name, stage, err))?;
            interface.collect(&module);
        }
        Ok(interface)
    }

    /// Whether `name` (or `name[index]`) is a member of the uniform block
    pub fn declares_uniform(&self, name: &str) -> bool {
        match split_index(name) {
            Some((base, index)) => matches!(self.uniforms.get(base), Some(Some(len)) if index < *len),
            None => matches!(self.uniforms.get(name), Some(None)),
        }
    }

    /// Length of a uniform array member
    pub fn array_len(&self, name: &str) -> Option<u32> {
        self.uniforms.get(name).copied().flatten()
    }

    pub fn uniform_blocks(&self) -> &[Binding] {
        &self.uniform_blocks
    }

    pub fn texture(&self, name: &str) -> Option<Binding> {
        self.textures.get(name).copied()
    }

    /// Binding of the texture read on `unit`, if any
    pub fn texture_on_unit(&self, unit: u32) -> Option<&str> {
        self.textures.iter()
            .find(|(_, binding)| **binding == Binding { set: TEXTURE_SET, binding: unit })
            .map(|(name, _)| name.as_str())
    }

    pub fn samplers(&self) -> impl Iterator<Item = (&str, Binding)> {
        self.samplers.iter().map(|(name, binding)| (name.as_str(), *binding))
    }

    pub fn push_constant_size(&self) -> Option<u32> {
        self.push_constant_size
    }

    fn collect(&mut self, module: &Module) {
        for (_, var) in module.global_variables.iter() {
            let inner = &module.types[var.ty].inner;
            let binding = var.binding.as_ref()
                .map(|b| Binding { set: b.group, binding: b.binding });
            match (var.space, inner) {
                (AddressSpace::Uniform, TypeInner::Struct { members, .. }) => {
                    if let Some(binding) = binding {
                        if !self.uniform_blocks.contains(&binding) {
                            self.uniform_blocks.push(binding);
                        }
                    }
                    for member in members {
                        let Some(name) = &member.name else {
                            continue;
                        };
                        let len = match module.types[member.ty].inner {
                            TypeInner::Array { size: ArraySize::Constant(len), .. } => Some(len.get()),
                            _ => None,
                        };
                        self.uniforms.insert(name.clone(), len);
                    }
                }
                (AddressSpace::PushConstant, TypeInner::Struct { span, .. }) => {
                    self.push_constant_size = Some(*span);
                }
                (AddressSpace::Handle, TypeInner::Image { .. }) => {
                    if let (Some(name), Some(binding)) = (&var.name, binding) {
                        self.textures.insert(name.clone(), binding);
                    }
                }
                (AddressSpace::Handle, TypeInner::Sampler { .. }) => {
                    if let (Some(name), Some(binding)) = (&var.name, binding) {
                        self.samplers.insert(name.clone(), binding);
                    }
                }
                _ => {}
            }
        }
    }
}

fn parse(stage: ShaderStage, source: &str) -> Result<Module, String> {
    Frontend::default()
        .parse(&Options::from(stage), source)
        .map_err(|errors| format!("{:?}", errors))
}

/// `lightPosition[3]` -> (`lightPosition`, 3)
fn split_index(name: &str) -> Option<(&str, u32)> {
    let (base, rest) = name.split_once('[')?;
    let index = rest.strip_suffix(']')?.parse().ok()?;
    Some((base, index))
}
