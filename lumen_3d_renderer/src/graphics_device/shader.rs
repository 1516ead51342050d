/// ShaderProgram trait and program descriptor

use crate::error::{Error, Result};

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment shader
    Fragment,
}

/// Descriptor for creating a linked shader program
#[derive(Debug, Clone)]
pub struct ShaderProgramDesc {
    /// Program name (used in logs and errors)
    pub name: String,
    /// Vertex stage source
    pub vertex_source: &'static str,
    /// Fragment stage source
    pub fragment_source: &'static str,
}

impl ShaderProgramDesc {
    /// Reject sources that can never compile
    ///
    /// Backends run their own compiler afterwards; this only catches
    /// empty stages and missing entry points before touching the driver.
    pub fn validate(&self) -> Result<()> {
        for (stage, source) in [
            (ShaderStage::Vertex, self.vertex_source),
            (ShaderStage::Fragment, self.fragment_source),
        ] {
            if source.trim().is_empty() {
                return Err(Error::ShaderCompilation(format!(
                    "{}: empty {:?} source", self.name, stage
                )));
            }
            if !source.contains("void main") {
                return Err(Error::ShaderCompilation(format!(
                    "{}: {:?} source has no entry point", self.name, stage
                )));
            }
        }
        Ok(())
    }
}

/// Shader program resource trait
///
/// Implemented by backend-specific program types.
pub trait ShaderProgram: Send + Sync {
    /// Program name
    fn name(&self) -> &str;
}
