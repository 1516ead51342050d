/*!
# Lumen 3D Renderer

Real-time forward rendering pipeline: frustum culling, a directional shadow
map with texel-snapped light-space matrix, an HDR main pass and a bloom
compositor with adaptive exposure.

The GPU is reached through the [`graphics_device::GraphicsDevice`] trait. A
backend implements it; the pipeline only records commands and submits them.

## Architecture

- **MasterRenderer**: owns the passes and runs one frame end to end
- **ShadowPass**: depth-only render of the casters from the selected light
- **MainPass**: lit, textured draw of the visible drawables into the HDR target
- **BloomCompositor**: bright pass, ping-pong blur, tone-mapped composite
- **Frustum / RenderView**: per-frame culling shared by the passes
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod camera;
pub mod scene;
pub mod target;
pub mod pipeline;

// Main lumen3d namespace module
pub mod lumen3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton (global logger)
    pub use crate::engine::Engine;

    // Pipeline entry points
    pub use crate::pipeline::{FrameState, FrameStats, MasterRenderer, PipelineConfig};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Backend seam
    pub mod render {
        pub use crate::graphics_device::*;
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod pipeline {
        pub use crate::pipeline::*;
    }
}

// Re-export math and window-size types at crate root
pub use glam;
pub use winit::dpi::PhysicalSize;
