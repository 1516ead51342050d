//! GLSL sources and the uniform interface of the pipeline's programs
//!
//! The sources are Vulkan GLSL 450. Each program declares one uniform block
//! at set 0, binding 0 whose members are addressed by name; light arrays are
//! indexed as `lightPosition[i]`. Textures are `texture2D` bindings in set 2
//! whose binding number is the texture unit, all read through the shared
//! sampler at set 1, binding 0. The per-draw model matrix travels as a
//! push-constant block.

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, ShaderProgram, ShaderProgramDesc};
use crate::{engine_debug, engine_error};

/// Size of the light uniform arrays compiled into the main program
pub const MAX_LIGHT_CAPACITY: usize = 16;

/// Texture unit of the shadow map in the main pass (units 0..=5 are material maps)
pub const SHADOW_MAP_UNIT: u32 = 6;

/// Texture unit of the image a post-processing stage reads
pub const SOURCE_TEXTURE_UNIT: u32 = 0;

/// Texture unit of the blurred bloom image in the composite
pub const BLOOM_TEXTURE_UNIT: u32 = 1;

/// Per-draw push-constant block shared by the shadow and main programs
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DrawConstants {
    pub model: Mat4,
}

impl DrawConstants {
    pub fn new(model: Mat4) -> Self {
        Self { model }
    }
}

/// Uniform block member and texture binding names
pub mod uniforms {
    // Camera
    pub const PROJECTION_MATRIX: &str = "projectionMatrix";
    pub const VIEW_MATRIX: &str = "viewMatrix";
    pub const CAMERA_POSITION: &str = "cameraPosition";

    // Lights
    pub const LIGHT_COUNT: &str = "lightCount";
    pub const LIGHT_POSITION: &str = "lightPosition";
    pub const LIGHT_COLOUR: &str = "lightColour";
    pub const ATTENUATION: &str = "attenuation";

    // Material scalars
    pub const SHINE_DAMPER: &str = "shineDamper";
    pub const REFLECTIVITY: &str = "reflectivity";
    pub const PARALLAX_SCALE: &str = "parallaxScale";
    pub const PARALLAX_LAYERS: &str = "parallaxLayers";

    // Shadows
    pub const LIGHT_SPACE_MATRIX: &str = "lightSpaceMatrix";
    pub const HAS_SHADOW_MAP: &str = "hasShadowMap";
    pub const SHADOW_MAP: &str = "shadowMap";
    pub const SHADOW_MAP_SIZE: &str = "shadowMapSize";
    pub const SHADOW_LIGHT_INDEX: &str = "shadowLightIndex";
    pub const HAS_TRANSPARENCY: &str = "hasTransparency";

    // Post-processing (textures at units 0 and 1)
    pub const SOURCE_TEXTURE: &str = "sourceTexture";
    pub const BLOOM_TEXTURE: &str = "bloomTexture";
    pub const THRESHOLD: &str = "threshold";
    pub const HORIZONTAL: &str = "horizontal";
    pub const EXPOSURE: &str = "exposure";
    pub const GAMMA: &str = "gamma";
    pub const BLOOM_INTENSITY: &str = "bloomIntensity";

    /// `name[index]`
    pub fn indexed(name: &str, index: usize) -> String {
        format!("{}[{}]", name, index)
    }
}

// ===== PROGRAM DESCRIPTORS =====

pub const SHADOW_PROGRAM: &str = "lumen3d.shadow";
pub const MAIN_PROGRAM: &str = "lumen3d.main";
pub const BRIGHT_PROGRAM: &str = "lumen3d.bright";
pub const BLUR_PROGRAM: &str = "lumen3d.blur";
pub const COMBINE_PROGRAM: &str = "lumen3d.combine";

pub fn shadow_program() -> ShaderProgramDesc {
    program(SHADOW_PROGRAM, SHADOW_VERT, SHADOW_FRAG)
}

pub fn main_program() -> ShaderProgramDesc {
    program(MAIN_PROGRAM, MAIN_VERT, MAIN_FRAG)
}

pub fn bright_program() -> ShaderProgramDesc {
    program(BRIGHT_PROGRAM, FULLSCREEN_VERT, BRIGHT_FRAG)
}

pub fn blur_program() -> ShaderProgramDesc {
    program(BLUR_PROGRAM, FULLSCREEN_VERT, BLUR_FRAG)
}

pub fn combine_program() -> ShaderProgramDesc {
    program(COMBINE_PROGRAM, FULLSCREEN_VERT, COMBINE_FRAG)
}

/// Compile and link a program, logging failures
pub(crate) fn compile(
    device: &mut dyn GraphicsDevice,
    desc: &ShaderProgramDesc,
) -> Result<Arc<dyn ShaderProgram>> {
    let program = device.create_shader_program(desc).map_err(|err| {
        engine_error!("lumen3d::Shaders", "Program '{}' failed: {}", desc.name, err);
        err
    })?;
    engine_debug!("lumen3d::Shaders", "Program '{}' ready", desc.name);
    Ok(program)
}

fn program(name: &str, vertex_source: &'static str, fragment_source: &'static str) -> ShaderProgramDesc {
    ShaderProgramDesc {
        name: name.to_string(),
        vertex_source,
        fragment_source,
    }
}

// ===== SOURCES =====

/// Uniform block, sampler and texture shared by both shadow stages
macro_rules! shadow_interface {
    () => {
        r#"
layout(set = 0, binding = 0) uniform ShadowUniforms {
    mat4 lightSpaceMatrix;
    bool hasTransparency;
};

layout(set = 1, binding = 0) uniform sampler textureSampler;
layout(set = 2, binding = 0) uniform texture2D diffuseMap;

layout(push_constant) uniform DrawConstants {
    mat4 model;
} constants;
"#
    };
}

/// Uniform block, sampler and textures shared by both main stages
macro_rules! main_interface {
    () => {
        r#"
#define MAX_LIGHTS 16

layout(set = 0, binding = 0) uniform MainUniforms {
    mat4 projectionMatrix;
    mat4 viewMatrix;
    mat4 lightSpaceMatrix;
    vec3 cameraPosition;
    int lightCount;
    vec4 lightPosition[MAX_LIGHTS];
    vec3 lightColour[MAX_LIGHTS];
    vec3 attenuation[MAX_LIGHTS];
    bool hasDiffuseMap;
    bool hasNormalMap;
    bool hasHeightMap;
    bool hasMetallicMap;
    bool hasRoughnessMap;
    bool hasAoMap;
    float shineDamper;
    float reflectivity;
    float parallaxScale;
    int parallaxLayers;
    bool hasShadowMap;
    float shadowMapSize;
    int shadowLightIndex;
};

layout(set = 1, binding = 0) uniform sampler textureSampler;
layout(set = 2, binding = 0) uniform texture2D diffuseMap;
layout(set = 2, binding = 1) uniform texture2D normalMap;
layout(set = 2, binding = 2) uniform texture2D heightMap;
layout(set = 2, binding = 3) uniform texture2D metallicMap;
layout(set = 2, binding = 4) uniform texture2D roughnessMap;
layout(set = 2, binding = 5) uniform texture2D aoMap;
layout(set = 2, binding = 6) uniform texture2D shadowMap;

layout(push_constant) uniform DrawConstants {
    mat4 model;
} constants;
"#
    };
}

/// Depth-only vertex stage
pub const SHADOW_VERT: &str = concat!("#version 450\n", shadow_interface!(), r#"
layout(location = 0) in vec3 position;
layout(location = 1) in vec2 textureCoords;

layout(location = 0) out vec2 passTextureCoords;

void main() {
    gl_Position = lightSpaceMatrix * constants.model * vec4(position, 1.0);
    passTextureCoords = textureCoords;
}
"#);

/// Depth-only fragment stage with optional alpha test
pub const SHADOW_FRAG: &str = concat!("#version 450\n", shadow_interface!(), r#"
layout(location = 0) in vec2 passTextureCoords;

void main() {
    if (hasTransparency && texture(sampler2D(diffuseMap, textureSampler), passTextureCoords).a < 0.5) {
        discard;
    }
}
"#);

/// Lit, textured geometry into the HDR target
pub const MAIN_VERT: &str = concat!("#version 450\n", main_interface!(), r#"
layout(location = 0) in vec3 position;
layout(location = 1) in vec2 textureCoords;
layout(location = 2) in vec3 normal;
layout(location = 3) in vec3 tangent;

layout(location = 0) out vec3 worldPosition;
layout(location = 1) out vec2 passTextureCoords;
layout(location = 2) out vec3 worldTangent;
layout(location = 3) out vec3 worldBitangent;
layout(location = 4) out vec3 worldNormal;
layout(location = 5) out vec4 lightSpacePosition;

void main() {
    vec4 world = constants.model * vec4(position, 1.0);
    worldPosition = world.xyz;
    passTextureCoords = textureCoords;

    // Model matrices carry uniform scale only
    vec3 n = normalize((constants.model * vec4(normal, 0.0)).xyz);
    vec3 t = normalize((constants.model * vec4(tangent, 0.0)).xyz);
    t = normalize(t - dot(t, n) * n);
    worldTangent = t;
    worldBitangent = cross(n, t);
    worldNormal = n;

    lightSpacePosition = lightSpaceMatrix * world;
    gl_Position = projectionMatrix * viewMatrix * world;
}
"#);

pub const MAIN_FRAG: &str = concat!("#version 450\n", main_interface!(), r#"
layout(location = 0) in vec3 worldPosition;
layout(location = 1) in vec2 passTextureCoords;
layout(location = 2) in vec3 worldTangent;
layout(location = 3) in vec3 worldBitangent;
layout(location = 4) in vec3 worldNormal;
layout(location = 5) in vec4 lightSpacePosition;

layout(location = 0) out vec4 outColour;

vec2 parallaxCoords(vec2 uv, vec3 viewTangent) {
    int layers = max(parallaxLayers, 1);
    float layerDepth = 1.0 / float(layers);
    vec2 shift = viewTangent.xy / max(viewTangent.z, 0.05) * parallaxScale * layerDepth;
    float depth = 0.0;
    float sampled = 1.0 - textureLod(sampler2D(heightMap, textureSampler), uv, 0.0).r;
    for (int layer = 0; layer < layers && depth < sampled; layer++) {
        uv -= shift;
        sampled = 1.0 - textureLod(sampler2D(heightMap, textureSampler), uv, 0.0).r;
        depth += layerDepth;
    }
    return uv;
}

float shadowFactor(vec3 n, vec3 toLight) {
    vec3 projected = lightSpacePosition.xyz / lightSpacePosition.w;
    vec2 coords = projected.xy * 0.5 + 0.5;
    if (projected.z > 1.0 || coords.x < 0.0 || coords.x > 1.0 || coords.y < 0.0 || coords.y > 1.0) {
        return 1.0;
    }
    float bias = max(0.002 * (1.0 - dot(n, toLight)), 0.0005);
    float texel = 1.0 / shadowMapSize;
    float lit = 0.0;
    for (int x = -1; x <= 1; x++) {
        for (int y = -1; y <= 1; y++) {
            vec2 offset = vec2(float(x), float(y)) * texel;
            float closest = textureLod(sampler2D(shadowMap, textureSampler), coords + offset, 0.0).r;
            lit += projected.z - bias > closest ? 0.0 : 1.0;
        }
    }
    return lit / 9.0;
}

void main() {
    mat3 tangentToWorld = mat3(normalize(worldTangent), normalize(worldBitangent), normalize(worldNormal));
    vec3 toCamera = normalize(cameraPosition - worldPosition);
    vec2 uv = passTextureCoords;
    if (hasHeightMap) {
        uv = parallaxCoords(uv, normalize(transpose(tangentToWorld) * toCamera));
    }

    vec4 albedo = hasDiffuseMap ? texture(sampler2D(diffuseMap, textureSampler), uv) : vec4(1.0);
    vec3 n = tangentToWorld[2];
    if (hasNormalMap) {
        vec3 tangentNormal = texture(sampler2D(normalMap, textureSampler), uv).rgb * 2.0 - 1.0;
        n = normalize(tangentToWorld * tangentNormal);
    }
    float metallic = hasMetallicMap ? texture(sampler2D(metallicMap, textureSampler), uv).r : 0.0;
    float roughness = hasRoughnessMap ? texture(sampler2D(roughnessMap, textureSampler), uv).r : 1.0;
    float ao = hasAoMap ? texture(sampler2D(aoMap, textureSampler), uv).r : 1.0;

    vec3 diffuse = vec3(0.0);
    vec3 specular = vec3(0.0);
    for (int i = 0; i < lightCount; i++) {
        vec4 light = lightPosition[i];
        vec3 toLight;
        float distanceFactor = 1.0;
        if (light.w == 0.0) {
            // A zero direction lights nothing
            if (dot(light.xyz, light.xyz) < 1e-12) {
                continue;
            }
            toLight = normalize(-light.xyz);
        } else {
            vec3 offset = light.xyz - worldPosition;
            float d = length(offset);
            toLight = offset / max(d, 1e-4);
            distanceFactor = max(attenuation[i].x + attenuation[i].y * d + attenuation[i].z * d * d, 1e-4);
        }
        float shadow = (hasShadowMap && i == shadowLightIndex) ? shadowFactor(n, toLight) : 1.0;
        float brightness = max(dot(n, toLight), 0.0);
        vec3 reflected = reflect(-toLight, n);
        float spec = pow(max(dot(reflected, toCamera), 0.0), shineDamper * (1.0 - 0.5 * roughness));
        diffuse += shadow * brightness * lightColour[i] / distanceFactor;
        specular += shadow * spec * reflectivity * mix(vec3(1.0), albedo.rgb, metallic) * lightColour[i] / distanceFactor;
    }
    diffuse = max(diffuse, vec3(0.05)) * ao;

    outColour = vec4(diffuse * albedo.rgb + specular, albedo.a);
}
"#);

/// Single triangle covering the screen, no vertex buffer
pub const FULLSCREEN_VERT: &str = r#"
#version 450

layout(location = 0) out vec2 uv;

void main() {
    uv = vec2((gl_VertexIndex << 1) & 2, gl_VertexIndex & 2);
    gl_Position = vec4(uv * 2.0 - 1.0, 0.0, 1.0);
}
"#;

/// Keeps texels whose luminance reaches the threshold
pub const BRIGHT_FRAG: &str = r#"
#version 450

layout(set = 0, binding = 0) uniform BrightUniforms {
    float threshold;
};

layout(set = 1, binding = 0) uniform sampler textureSampler;
layout(set = 2, binding = 0) uniform texture2D sourceTexture;

layout(location = 0) in vec2 uv;
layout(location = 0) out vec4 outColour;

void main() {
    vec3 colour = texture(sampler2D(sourceTexture, textureSampler), uv).rgb;
    float luminance = dot(colour, vec3(0.2126, 0.7152, 0.0722));
    outColour = luminance >= threshold ? vec4(colour, 1.0) : vec4(0.0, 0.0, 0.0, 1.0);
}
"#;

/// One direction of a separable 9-tap gaussian
pub const BLUR_FRAG: &str = r#"
#version 450

layout(set = 0, binding = 0) uniform BlurUniforms {
    bool horizontal;
};

layout(set = 1, binding = 0) uniform sampler textureSampler;
layout(set = 2, binding = 0) uniform texture2D sourceTexture;

layout(location = 0) in vec2 uv;
layout(location = 0) out vec4 outColour;

vec3 taps(vec2 offset) {
    return texture(sampler2D(sourceTexture, textureSampler), uv + offset).rgb
        + texture(sampler2D(sourceTexture, textureSampler), uv - offset).rgb;
}

void main() {
    vec2 texel = 1.0 / vec2(textureSize(sampler2D(sourceTexture, textureSampler), 0));
    vec2 direction = horizontal ? vec2(texel.x, 0.0) : vec2(0.0, texel.y);
    vec3 result = texture(sampler2D(sourceTexture, textureSampler), uv).rgb * 0.227027;
    result += taps(direction) * 0.1945946;
    result += taps(direction * 2.0) * 0.1216216;
    result += taps(direction * 3.0) * 0.054054;
    result += taps(direction * 4.0) * 0.016216;
    outColour = vec4(result, 1.0);
}
"#;

/// Tone map plus bloom into the window target
pub const COMBINE_FRAG: &str = r#"
#version 450

layout(set = 0, binding = 0) uniform CombineUniforms {
    float exposure;
    float gamma;
    float bloomIntensity;
};

layout(set = 1, binding = 0) uniform sampler textureSampler;
layout(set = 2, binding = 0) uniform texture2D sourceTexture;
layout(set = 2, binding = 1) uniform texture2D bloomTexture;

layout(location = 0) in vec2 uv;
layout(location = 0) out vec4 outColour;

void main() {
    vec3 hdr = texture(sampler2D(sourceTexture, textureSampler), uv).rgb;
    vec3 mapped = pow(vec3(1.0) - exp(-hdr * exposure), vec3(1.0 / gamma));
    vec3 bloom = texture(sampler2D(bloomTexture, textureSampler), uv).rgb;
    outColour = vec4(mapped + bloomIntensity * bloom, 1.0);
}
"#;

#[cfg(test)]
#[path = "shaders_tests.rs"]
mod tests;
