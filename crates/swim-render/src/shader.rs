//! Vertex-stage composition.
//!
//! A [`VertexStage`] is a list of named uniform fields and texture bindings plus
//! one [`VertexTransform`]. [`VertexStage::to_wgsl`] checks that the transform's
//! inputs are all registered and emits the module source. The uniform block is
//! laid out to match [`DeformUniforms`] byte for byte.

use bytemuck::{Pod, Zeroable};
use std::fmt::Write;

use swim_core::{Result, SwimError};
use swim_deform::{BoundaryPolicy, DeformationContext, SampleRow};

use crate::camera::Camera;
use crate::texture::SplineTexture;

/// Bind group holding the uniform block and textures.
pub const DEFORM_GROUP: u32 = 0;
const UNIFORM_BLOCK: &str = "DeformUniforms";
const UNIFORM_VAR: &str = "u_deform";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    F32,
    U32,
    Vec2F,
    Vec4F,
    Mat4F,
}

impl UniformType {
    pub fn wgsl(self) -> &'static str {
        match self {
            UniformType::F32 => "f32",
            UniformType::U32 => "u32",
            UniformType::Vec2F => "vec2<f32>",
            UniformType::Vec4F => "vec4<f32>",
            UniformType::Mat4F => "mat4x4<f32>",
        }
    }
}

/// One field of the stage's uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformField {
    pub name: &'static str,
    pub ty: UniformType,
}

/// What a binding slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    UniformBlock,
    /// Unfilterable float texture read with `textureLoad`
    FloatTexture,
}

/// A resolved `@group/@binding` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformBinding {
    pub name: &'static str,
    pub kind: BindingKind,
    pub group: u32,
    pub binding: u32,
}

/// Position transform applied in the vertex stage before projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexTransform {
    /// Positions pass through unchanged
    Identity,
    /// Bend local positions along the curve stored in the spline texture
    CurveDeform,
}

impl VertexTransform {
    fn required_fields(self) -> &'static [&'static str] {
        match self {
            VertexTransform::Identity => &[],
            VertexTransform::CurveDeform => &["obj_size", "texture_size", "playhead", "length_ratio", "policy"],
        }
    }

    fn required_textures(self) -> &'static [&'static str] {
        match self {
            VertexTransform::Identity => &[],
            VertexTransform::CurveDeform => &["spline"],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VertexStage {
    fields: Vec<UniformField>,
    textures: Vec<&'static str>,
    transform: VertexTransform,
}

impl VertexStage {
    /// An empty stage; every stage needs `view_proj` before it can emit.
    pub fn new(transform: VertexTransform) -> Self {
        Self {
            fields: Vec::new(),
            textures: Vec::new(),
            transform,
        }
    }

    pub fn uniform(mut self, name: &'static str, ty: UniformType) -> Self {
        self.fields.push(UniformField { name, ty });
        self
    }

    pub fn texture(mut self, name: &'static str) -> Self {
        self.textures.push(name);
        self
    }

    pub fn transform(&self) -> VertexTransform {
        self.transform
    }

    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    /// Slots in declaration order: the uniform block first, then textures.
    pub fn bindings(&self) -> Vec<UniformBinding> {
        let block = UniformBinding {
            name: UNIFORM_VAR,
            kind: BindingKind::UniformBlock,
            group: DEFORM_GROUP,
            binding: 0,
        };
        std::iter::once(block)
            .chain(self.textures.iter().zip(1u32..).map(|(&name, binding)| UniformBinding {
                name,
                kind: BindingKind::FloatTexture,
                group: DEFORM_GROUP,
                binding,
            }))
            .collect()
    }

    pub fn binding_of(&self, name: &str) -> Option<UniformBinding> {
        self.bindings().into_iter().find(|b| b.name == name)
    }

    fn validate(&self) -> Result<()> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.fields.len() + self.textures.len());
        for name in self.fields.iter().map(|f| f.name).chain(self.textures.iter().copied()) {
            if seen.contains(&name) {
                return Err(SwimError::config(format!("binding `{}` registered twice", name)));
            }
            seen.push(name);
        }
        match self.fields.iter().find(|f| f.name == "view_proj") {
            Some(f) if f.ty == UniformType::Mat4F => {}
            Some(_) => return Err(SwimError::config("`view_proj` must be a mat4x4<f32>")),
            None => return Err(SwimError::config("vertex stage has no `view_proj` uniform")),
        }
        for name in self.transform.required_fields() {
            if !self.fields.iter().any(|f| f.name == *name) {
                return Err(SwimError::config(format!(
                    "{:?} needs uniform `{}`",
                    self.transform, name
                )));
            }
        }
        for name in self.transform.required_textures() {
            if !self.textures.contains(name) {
                return Err(SwimError::config(format!(
                    "{:?} needs texture `{}`",
                    self.transform, name
                )));
            }
        }
        Ok(())
    }

    /// Emit the WGSL module for this stage.
    pub fn to_wgsl(&self) -> Result<String> {
        self.validate()?;
        let mut src = String::new();
        self.write_wgsl(&mut src)
            .map_err(|e| SwimError::config(format!("wgsl emit failed: {}", e)))?;
        Ok(src)
    }

    fn write_wgsl(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "struct {} {{", UNIFORM_BLOCK)?;
        for f in &self.fields {
            writeln!(out, "    {}: {},", f.name, f.ty.wgsl())?;
        }
        writeln!(out, "}};\n")?;

        for b in self.bindings() {
            match b.kind {
                BindingKind::UniformBlock => writeln!(
                    out,
                    "@group({}) @binding({}) var<uniform> {}: {};",
                    b.group, b.binding, b.name, UNIFORM_BLOCK
                )?,
                BindingKind::FloatTexture => writeln!(
                    out,
                    "@group({}) @binding({}) var {}: texture_2d<f32>;",
                    b.group, b.binding, b.name
                )?,
            }
        }

        out.push_str(
            "
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) uv: vec2<f32>,
};
",
        );

        match self.transform {
            VertexTransform::Identity => {
                out.push_str("\nfn transform_position(pos: vec3<f32>) -> vec3<f32> {\n    return pos;\n}\n");
            }
            VertexTransform::CurveDeform => self.write_curve_deform(out)?,
        }

        write!(
            out,
            "
@vertex
fn vs_main(input: VertexInput) -> VertexOutput {{
    let world = transform_position(input.position);
    var out: VertexOutput;
    out.clip_position = {var}.view_proj * vec4<f32>(world, 1.0);
    out.world_position = world;
    out.uv = input.uv;
    return out;
}}
",
            var = UNIFORM_VAR
        )
    }

    fn write_curve_deform(&self, out: &mut String) -> std::fmt::Result {
        write!(
            out,
            "
const ROW_POINT: u32 = {point}u;
const ROW_BINORMAL: u32 = {binormal}u;
const ROW_NORMAL: u32 = {normal}u;
const POLICY_WRAP: u32 = {wrap}u;

fn spline_texel(row: u32, column: u32) -> vec3<f32> {{
    return textureLoad(spline, vec2<u32>(column, row), 0).xyz;
}}

fn resolve_t(t: f32) -> f32 {{
    if ({var}.policy == POLICY_WRAP) {{
        return fract(t);
    }}
    return clamp(t, 0.0, 1.0);
}}

fn transform_position(pos: vec3<f32>) -> vec3<f32> {{
    let n = {var}.texture_size.x - 1.0;
    let d = pos.z / {var}.obj_size.z;
    let t = resolve_t({var}.playhead + d * {var}.length_ratio);
    let index = t * n;
    let prev = min(floor(index), max(n - 1.0, 0.0));
    let f = index - prev;
    let i0 = u32(prev);
    let i1 = min(i0 + 1u, u32(n));
    let p = mix(spline_texel(ROW_POINT, i0), spline_texel(ROW_POINT, i1), f);
    let b = mix(spline_texel(ROW_BINORMAL, i0), spline_texel(ROW_BINORMAL, i1), f);
    let nrm = mix(spline_texel(ROW_NORMAL, i0), spline_texel(ROW_NORMAL, i1), f);
    return p + nrm * pos.x + b * pos.y;
}}
",
            point = SampleRow::Point.index(),
            binormal = SampleRow::Binormal.index(),
            normal = SampleRow::Normal.index(),
            wrap = policy_code(BoundaryPolicy::Wrap),
            var = UNIFORM_VAR,
        )
    }
}

/// The stage used by every swimmer, matching [`DeformUniforms`].
pub fn curve_deform_stage() -> VertexStage {
    VertexStage::new(VertexTransform::CurveDeform)
        .uniform("view_proj", UniformType::Mat4F)
        .uniform("obj_size", UniformType::Vec4F)
        .uniform("texture_size", UniformType::Vec2F)
        .uniform("playhead", UniformType::F32)
        .uniform("length_ratio", UniformType::F32)
        .uniform("policy", UniformType::U32)
        .texture("spline")
}

pub fn policy_code(policy: BoundaryPolicy) -> u32 {
    match policy {
        BoundaryPolicy::Wrap => 0,
        BoundaryPolicy::Clamp => 1,
    }
}

/// Per-swimmer uniform block, rewritten every frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DeformUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub obj_size: [f32; 4],
    pub texture_size: [f32; 2],
    pub playhead: f32,
    pub length_ratio: f32,
    pub policy: u32,
    pub _pad: [u32; 3],
}

impl DeformUniforms {
    pub fn new(camera: &Camera, ctx: &DeformationContext, texture: &SplineTexture, playhead: f64) -> Self {
        let s = ctx.obj_size.as_vec3();
        Self {
            view_proj: camera.view_projection().as_mat4().to_cols_array_2d(),
            obj_size: [s.x, s.y, s.z, 0.0],
            texture_size: [texture.width as f32, texture.height as f32],
            playhead: playhead as f32,
            length_ratio: ctx.length_ratio as f32,
            policy: policy_code(ctx.policy),
            _pad: [0; 3],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
