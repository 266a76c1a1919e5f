pub mod aabb;
pub mod frame;
pub mod transform;

pub use glam::{dvec2, dvec3, DMat3, DMat4, DQuat, DVec2, DVec3, DVec4};
pub use aabb::Aabb3;
pub use frame::Frame;
pub use transform::Transform;

pub type Point2 = DVec2;
pub type Point3 = DVec3;
pub type Vector2 = DVec2;
pub type Vector3 = DVec3;

/// Linearly remap `value` from `[src_min, src_max]` into `[dst_min, dst_max]`.
///
/// Reversed destination ranges are allowed and flip the direction.
pub fn remap(value: f64, src_min: f64, src_max: f64, dst_min: f64, dst_max: f64) -> f64 {
    dst_min + (value - src_min) / (src_max - src_min) * (dst_max - dst_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap() {
        assert!((remap(100.0, 0.0, 200.0, -140.0, 80.0) - (-30.0)).abs() < 1e-12);
        // flipped destination: source min lands on destination "min" argument
        assert!((remap(0.0, 0.0, 40.0, 20.0, -10.0) - 20.0).abs() < 1e-12);
        assert!((remap(40.0, 0.0, 40.0, 20.0, -10.0) + 10.0).abs() < 1e-12);
    }
}
