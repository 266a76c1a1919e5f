//! The vertex stage reads the f32 spline texture; the CPU deformer reads the
//! f64 buffer. Replaying the stage's arithmetic on the texture must land on
//! the CPU result up to f32 rounding.

use approx::assert_abs_diff_eq;
use swim_deform::{deformed_position, encode, BoundaryPolicy, DeformationContext, SampleRow, TriangleMesh};
use swim_geometry::{build_curve, sample_curve, PlacementBox, Profile2D};
use swim_math::DVec3;
use swim_render::{policy_code, DeformUniforms, SceneConfig, SplineTexture};

fn texel(tex: &SplineTexture, row: SampleRow, col: u32) -> [f32; 3] {
    tex.texel(row, col)
}

fn mix(a: [f32; 3], b: [f32; 3], f: f32) -> [f32; 3] {
    [a[0] + (b[0] - a[0]) * f, a[1] + (b[1] - a[1]) * f, a[2] + (b[2] - a[2]) * f]
}

/// Same steps as the emitted `transform_position`.
fn stage_position(pos: [f32; 3], u: &DeformUniforms, tex: &SplineTexture) -> [f32; 3] {
    let n = u.texture_size[0] - 1.0;
    let d = pos[2] / u.obj_size[2];
    let raw = u.playhead + d * u.length_ratio;
    let t = if u.policy == policy_code(BoundaryPolicy::Wrap) {
        raw - raw.floor()
    } else {
        raw.clamp(0.0, 1.0)
    };
    let index = t * n;
    let prev = index.floor().min((n - 1.0).max(0.0));
    let f = index - prev;
    let i0 = prev as u32;
    let i1 = (i0 + 1).min(n as u32);
    let p = mix(texel(tex, SampleRow::Point, i0), texel(tex, SampleRow::Point, i1), f);
    let b = mix(texel(tex, SampleRow::Binormal, i0), texel(tex, SampleRow::Binormal, i1), f);
    let nrm = mix(texel(tex, SampleRow::Normal, i0), texel(tex, SampleRow::Normal, i1), f);
    [
        p[0] + nrm[0] * pos[0] + b[0] * pos[1],
        p[1] + nrm[1] * pos[0] + b[1] * pos[1],
        p[2] + nrm[2] * pos[0] + b[2] * pos[1],
    ]
}

fn check_parity(policy: BoundaryPolicy) {
    let curve = build_curve(&Profile2D::swim_arc(), &PlacementBox::new(-140.0, 80.0, -10.0, 20.0, 10.0)).unwrap();
    let samples = sample_curve(&curve, 255).unwrap();
    let buffer = encode(&samples).unwrap();
    let texture = SplineTexture::from_buffer(&buffer);

    let mesh = TriangleMesh::ellipsoid(DVec3::new(2.0, 3.0, 12.0), 8, 12);
    let ctx = DeformationContext::from_mesh(&mesh, &samples, policy).unwrap();
    let camera = SceneConfig::default().camera;

    for playhead in [0.0, 0.25, 0.6, 0.97] {
        let u = DeformUniforms::new(&camera, &ctx, &texture, playhead);
        for &p in &mesh.positions {
            let cpu = deformed_position(p, &ctx, &buffer, playhead);
            let gpu = stage_position(p.as_vec3().to_array(), &u, &texture);
            let gpu = DVec3::new(gpu[0] as f64, gpu[1] as f64, gpu[2] as f64);
            assert_abs_diff_eq!(cpu, gpu, epsilon = 1e-2);
        }
    }
}

#[test]
fn wrap_stage_matches_cpu() {
    check_parity(BoundaryPolicy::Wrap);
}

#[test]
fn clamp_stage_matches_cpu() {
    check_parity(BoundaryPolicy::Clamp);
}
