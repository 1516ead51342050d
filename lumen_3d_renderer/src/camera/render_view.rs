/// RenderView - result of frustum culling for one frame.
///
/// Holds the frustum the drawables were tested against and the indices of
/// the survivors, in the caller's list order. Ephemeral: lives for one frame
/// and is shared by the shadow and main passes.

use crate::scene::Drawable;
use super::frustum::Frustum;

/// Result of frustum culling. Lives for one frame.
#[derive(Debug, Clone)]
pub struct RenderView {
    frustum: Frustum,
    visible: Vec<usize>,
    total: usize,
}

impl RenderView {
    /// Cull `drawables` against `frustum`, preserving list order.
    pub fn cull(frustum: Frustum, drawables: &[Drawable]) -> Self {
        let visible = drawables.iter()
            .enumerate()
            .filter(|(_, drawable)| {
                frustum.contains(drawable.transform().position(), drawable.culling_radius())
            })
            .map(|(index, _)| index)
            .collect();

        Self {
            frustum,
            visible,
            total: drawables.len(),
        }
    }

    /// Frustum used for culling.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Indices of visible drawables, in list order.
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    /// Number of visible drawables.
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Number of drawables rejected by the frustum test.
    pub fn culled_count(&self) -> usize {
        self.total - self.visible.len()
    }
}

#[cfg(test)]
#[path = "render_view_tests.rs"]
mod tests;
