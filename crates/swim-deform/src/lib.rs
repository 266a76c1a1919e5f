//! SwimPath deformation: sample-buffer encoding and the per-vertex curve transform.

pub mod context;
pub mod deformer;
pub mod encode;
pub mod mesh;
pub mod source;

pub use context::{BoundaryPolicy, DeformationContext};
pub use deformer::{curve_parameter, deform_into, deform_mesh, deformed_position, frame_at, CurveFrame};
pub use encode::{encode, EncodedBuffer, SampleRow, CHANNELS};
pub use mesh::TriangleMesh;
pub use source::{parse_glb, GlbFileSource, InMemorySource, MeshSource};
