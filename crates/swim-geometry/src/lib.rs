//! SwimPath geometry: 2D profiles, centripetal splines, and arc-length frame sampling.

pub mod arc_length;
pub mod builder;
pub mod curve;
pub mod profile;
pub mod sampler;

pub use arc_length::ArcLengthTable;
pub use builder::{build_curve, remap_profile};
pub use curve::{CatmullRomCurve, Curve};
pub use profile::{PlacementBox, Profile2D, ProfileBox};
pub use sampler::{sample_curve, sample_curve_with, FrameClosure, Sample, SampleSet, SamplerConfig};
