/// Render target registry owned by the master renderer.
///
/// Targets are created once at fixed resolution through the graphics device
/// and stored in a slot map. Each target is reachable by a stable key and by
/// its unique name ("shadow_map", "hdr", "bright", ...).

use std::sync::Arc;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, RenderTarget, RenderTargetDesc};
use crate::{engine_bail, engine_debug, engine_error};

new_key_type! {
    /// Stable key for a render target within a TargetManager.
    ///
    /// A key becomes invalid only when its own target is removed.
    pub struct TargetKey;
}

/// Named, keyed render targets
pub struct TargetManager {
    targets: SlotMap<TargetKey, Arc<dyn RenderTarget>>,
    names: FxHashMap<String, TargetKey>,
}

impl TargetManager {
    /// Create a new empty target manager
    pub fn new() -> Self {
        Self {
            targets: SlotMap::with_key(),
            names: FxHashMap::default(),
        }
    }

    /// Create a render target on `device` and register it under `desc.label`
    ///
    /// # Errors
    ///
    /// Fails if the name is taken, or with `IncompleteRenderTarget` if the
    /// attachments are incomplete or the device rejects them.
    pub fn create_render_target(
        &mut self,
        device: &mut dyn GraphicsDevice,
        desc: &RenderTargetDesc,
    ) -> Result<TargetKey> {
        if self.names.contains_key(&desc.label) {
            engine_bail!("lumen3d::TargetManager", InvalidResource,
                "RenderTarget '{}' already exists", desc.label);
        }

        desc.validate().map_err(|err| {
            engine_error!("lumen3d::TargetManager",
                "Rejected RenderTarget '{}': {}", desc.label, err);
            err
        })?;

        let target = device.create_render_target(desc).map_err(|err| {
            engine_error!("lumen3d::TargetManager",
                "Failed to create RenderTarget '{}': {}", desc.label, err);
            err
        })?;

        let key = self.targets.insert(target);
        self.names.insert(desc.label.clone(), key);
        engine_debug!("lumen3d::TargetManager",
            "Created RenderTarget '{}' ({}x{})", desc.label, desc.width, desc.height);
        Ok(key)
    }

    /// Get a render target by key
    pub fn get(&self, key: TargetKey) -> Option<&Arc<dyn RenderTarget>> {
        self.targets.get(key)
    }

    /// Get a render target by name
    pub fn render_target(&self, name: &str) -> Option<&Arc<dyn RenderTarget>> {
        self.key(name).and_then(|key| self.targets.get(key))
    }

    /// Key registered under `name`
    pub fn key(&self, name: &str) -> Option<TargetKey> {
        self.names.get(name).copied()
    }

    /// Remove a render target by name
    ///
    /// Returns the removed render target, or None if not found.
    pub fn remove_render_target(&mut self, name: &str) -> Option<Arc<dyn RenderTarget>> {
        let key = self.names.remove(name)?;
        self.targets.remove(key)
    }

    /// Get the number of render targets
    pub fn render_target_count(&self) -> usize {
        self.targets.len()
    }

    /// Get all render target names, sorted
    pub fn render_target_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Remove all render targets
    pub fn clear(&mut self) {
        self.targets.clear();
        self.names.clear();
    }
}

impl Default for TargetManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "target_manager_tests.rs"]
mod tests;
