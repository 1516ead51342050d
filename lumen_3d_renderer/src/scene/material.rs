/// Material descriptor: optional texture maps plus surface scalars.
///
/// Each optional map role owns one texture unit and one boolean presence
/// uniform in the shaders. The presence mask is derived from the stored
/// handles, so a flag can never disagree with its texture.

use std::fmt;
use std::sync::Arc;
use bitflags::bitflags;
use crate::graphics_device::Texture;

// ===== MAP ROLES =====

/// Role of an optional material texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapRole {
    Diffuse,
    Normal,
    Height,
    Metallic,
    Roughness,
    AmbientOcclusion,
}

impl MapRole {
    /// Every role, in texture-unit order
    pub const ALL: [MapRole; 6] = [
        MapRole::Diffuse,
        MapRole::Normal,
        MapRole::Height,
        MapRole::Metallic,
        MapRole::Roughness,
        MapRole::AmbientOcclusion,
    ];

    /// Texture unit the role is bound to (units 0..=5)
    pub fn texture_unit(self) -> u32 {
        self as u32
    }

    /// Name of the role's texture binding in the main program
    pub fn texture_binding(self) -> &'static str {
        match self {
            MapRole::Diffuse => "diffuseMap",
            MapRole::Normal => "normalMap",
            MapRole::Height => "heightMap",
            MapRole::Metallic => "metallicMap",
            MapRole::Roughness => "roughnessMap",
            MapRole::AmbientOcclusion => "aoMap",
        }
    }

    /// Boolean uniform telling the shader the texture is bound
    pub fn presence_uniform(self) -> &'static str {
        match self {
            MapRole::Diffuse => "hasDiffuseMap",
            MapRole::Normal => "hasNormalMap",
            MapRole::Height => "hasHeightMap",
            MapRole::Metallic => "hasMetallicMap",
            MapRole::Roughness => "hasRoughnessMap",
            MapRole::AmbientOcclusion => "hasAoMap",
        }
    }

    /// Presence bit for this role
    pub fn flag(self) -> MapFlags {
        MapFlags::from_bits_truncate(1 << (self as u8))
    }
}

bitflags! {
    /// Presence mask of a material's optional maps
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MapFlags: u8 {
        const DIFFUSE = 1 << 0;
        const NORMAL = 1 << 1;
        const HEIGHT = 1 << 2;
        const METALLIC = 1 << 3;
        const ROUGHNESS = 1 << 4;
        const AMBIENT_OCCLUSION = 1 << 5;
    }
}

// ===== MATERIAL MAPS =====

/// The six optional texture maps of a material
#[derive(Clone, Default)]
pub struct MaterialMaps {
    slots: [Option<Arc<dyn Texture>>; 6],
}

impl MaterialMaps {
    /// No maps
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: attach a texture to a role
    pub fn with(mut self, role: MapRole, texture: Arc<dyn Texture>) -> Self {
        self.set(role, Some(texture));
        self
    }

    /// Attach or detach the texture of a role
    pub fn set(&mut self, role: MapRole, texture: Option<Arc<dyn Texture>>) {
        self.slots[role as usize] = texture;
    }

    /// Texture of a role, if present
    pub fn get(&self, role: MapRole) -> Option<&Arc<dyn Texture>> {
        self.slots[role as usize].as_ref()
    }

    /// Whether a role has a texture
    pub fn has(&self, role: MapRole) -> bool {
        self.slots[role as usize].is_some()
    }

    /// Presence mask derived from the stored textures
    pub fn flags(&self) -> MapFlags {
        MapRole::ALL.iter()
            .filter(|role| self.has(**role))
            .fold(MapFlags::empty(), |flags, role| flags | role.flag())
    }

    /// Present maps with their roles, in texture-unit order
    pub fn present(&self) -> impl Iterator<Item = (MapRole, &Arc<dyn Texture>)> {
        MapRole::ALL.iter()
            .filter_map(move |role| self.get(*role).map(|texture| (*role, texture)))
    }
}

impl fmt::Debug for MaterialMaps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterialMaps")
            .field("flags", &self.flags())
            .finish()
    }
}

// ===== MATERIAL =====

/// Parallax occlusion settings, read only when a height map is present
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parallax {
    /// Depth scale of the height map
    pub scale: f32,
    /// Number of ray-march layers
    pub layers: u32,
}

impl Default for Parallax {
    fn default() -> Self {
        Self { scale: 0.05, layers: 16 }
    }
}

/// Surface description of a drawable
#[derive(Debug, Clone)]
pub struct Material {
    /// Optional texture maps
    pub maps: MaterialMaps,
    /// Specular exponent
    pub shine_damper: f32,
    /// Specular strength
    pub reflectivity: f32,
    /// Parallax settings (height map only)
    pub parallax: Parallax,
}

impl Material {
    /// Material with the given maps and default scalars
    pub fn new(maps: MaterialMaps) -> Self {
        Self {
            maps,
            ..Self::default()
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            maps: MaterialMaps::new(),
            shine_damper: 10.0,
            reflectivity: 0.0,
            parallax: Parallax::default(),
        }
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
