/// Light descriptors consumed by the shadow and main passes.

use glam::{Vec3, Vec4};

/// Distance falloff `1 / (constant + linear·d + quadratic·d²)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    /// No falloff
    pub const NONE: Attenuation = Attenuation { constant: 1.0, linear: 0.0, quadratic: 0.0 };

    pub const fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self { constant, linear, quadratic }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.constant, self.linear, self.quadratic)
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        Self::NONE
    }
}

/// Point or directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Point {
        position: Vec3,
        color: Vec3,
        attenuation: Attenuation,
    },
    Directional {
        /// Normalized direction the light travels along
        direction: Vec3,
        color: Vec3,
    },
}

impl Light {
    pub fn point(position: Vec3, color: Vec3, attenuation: Attenuation) -> Self {
        Light::Point { position, color, attenuation }
    }

    /// Directional light; a zero or non-finite direction points straight down.
    pub fn directional(direction: Vec3, color: Vec3) -> Self {
        Light::Directional {
            direction: direction.try_normalize().unwrap_or(Vec3::NEG_Y),
            color,
        }
    }

    pub fn color(&self) -> Vec3 {
        match self {
            Light::Point { color, .. } | Light::Directional { color, .. } => *color,
        }
    }

    /// Attenuation coefficients ({1, 0, 0} for directional lights)
    pub fn attenuation(&self) -> Attenuation {
        match self {
            Light::Point { attenuation, .. } => *attenuation,
            Light::Directional { .. } => Attenuation::NONE,
        }
    }

    pub fn is_directional(&self) -> bool {
        matches!(self, Light::Directional { .. })
    }

    /// Position/direction as uploaded to the light array:
    /// `w = 1` for a point position, `w = 0` for a direction.
    pub fn shader_vector(&self) -> Vec4 {
        match self {
            Light::Point { position, .. } => position.extend(1.0),
            Light::Directional { direction, .. } => direction.extend(0.0),
        }
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
