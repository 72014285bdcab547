//! The overlay's fixed vertex/fragment program.

/// GLSL-level data type of an attribute, uniform or varying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderType { Vec2, Vec4, Mat4 }

/// How a varying is interpolated between vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpolation { Smooth, Flat, NoPerspective }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub location: u32,
    pub ty:       ShaderType,
    pub name:     &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Varying {
    pub interpolation: Interpolation,
    pub ty:            ShaderType,
    pub name:          &'static str,
}

/// Everything the host needs to build the program: interface plus sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderDesc {
    pub name:            &'static str,
    pub push_constants:  &'static [(ShaderType, &'static str)],
    pub vertex_inputs:   &'static [Attribute],
    pub varyings:        &'static [Varying],
    /// `(slot, name)` of each 2-D float sampler.
    pub samplers:        &'static [(u32, &'static str)],
    pub fragment_output: (u32, ShaderType, &'static str),
    pub vertex_source:   &'static str,
    pub fragment_source: &'static str,
}

pub const VERTEX_SHADER_SRC: &str = r#"
void main() {
    Frag_UV = UV;
    Frag_Color = Color;

    gl_Position = ProjMtx * vec4(Position.xy, 0, 1);
}
"#;

// The host presents in sRGB, so the GUI's sRGB colours are linearised once here.
pub const FRAGMENT_SHADER_SRC: &str = r#"
vec4 srgb_to_linear(vec4 srgb) {
    return mix(
        pow((srgb + 0.055) / 1.055, vec4(2.4)),
        srgb / 12.92,
        step(srgb, vec4(0.04045))
    );
}

void main() {
    Out_Color = Frag_Color * texture(Texture, Frag_UV.st);
    Out_Color.rgba = srgb_to_linear(Out_Color.rgba);
}
"#;

pub const OVERLAY_SHADER: ShaderDesc = ShaderDesc {
    name:           "imoverlay_shader_interface",
    push_constants: &[(ShaderType::Mat4, "ProjMtx")],
    vertex_inputs:  &[
        Attribute { location: 0, ty: ShaderType::Vec2, name: "Position" },
        Attribute { location: 1, ty: ShaderType::Vec2, name: "UV" },
        Attribute { location: 2, ty: ShaderType::Vec4, name: "Color" },
    ],
    varyings: &[
        Varying { interpolation: Interpolation::NoPerspective, ty: ShaderType::Vec2, name: "Frag_UV" },
        Varying { interpolation: Interpolation::NoPerspective, ty: ShaderType::Vec4, name: "Frag_Color" },
    ],
    samplers:        &[(0, "Texture")],
    fragment_output: (0, ShaderType::Vec4, "Out_Color"),
    vertex_source:   VERTEX_SHADER_SRC,
    fragment_source: FRAGMENT_SHADER_SRC,
};
