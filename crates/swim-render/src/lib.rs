//! SwimPath render preparation: GPU-ready buffers, the spline texture, WGSL
//! vertex stages, camera and the scene context driven once per frame.

pub mod camera;
pub mod export;
pub mod pipeline;
pub mod scene;
pub mod shader;
pub mod texture;

pub use camera::{Camera, OrbitLimits};
pub use export::{export_frame_obj, write_frame_obj};
pub use pipeline::{prepare_mesh, GpuVertex, RenderMesh};
pub use scene::{Environment, SceneConfig, SceneContext, SwimmerConfig, SwimmerFrame, SwimmerInstance, SwimmerKey};
pub use shader::{
    curve_deform_stage, policy_code, BindingKind, DeformUniforms, UniformBinding, UniformField, UniformType,
    VertexStage, VertexTransform, DEFORM_GROUP,
};
pub use texture::{SplineTexture, TextureFilter};
