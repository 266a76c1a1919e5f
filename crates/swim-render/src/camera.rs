use serde::{Deserialize, Serialize};
use swim_math::{DMat4, Point3, Vector3};

/// Bounds applied by [`Camera::orbit`] and [`Camera::zoom`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitLimits {
    pub min_distance: f64,
    pub max_distance: f64,
    /// Largest polar angle from +Y, in radians; keeps the eye above the water
    pub max_polar: f64,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_distance: 40.0,
            max_distance: 200.0,
            max_polar: std::f64::consts::PI * 0.495,
        }
    }
}

/// A perspective camera orbiting a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub eye: Point3,
    pub target: Point3,
    pub up: Vector3,
    /// Vertical field of view in degrees
    pub fov_y_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub limits: OrbitLimits,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Point3::new(3.159, 12.559, 162.85),
            target: Point3::new(0.0, 10.0, 0.0),
            up: Vector3::Y,
            fov_y_deg: 55.0,
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 20000.0,
            limits: OrbitLimits::default(),
        }
    }
}

impl Camera {
    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// OpenGL-style clip space (z in -1..1).
    pub fn projection_matrix(&self) -> DMat4 {
        DMat4::perspective_rh_gl(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> DMat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f64 / height as f64;
        }
    }

    pub fn distance(&self) -> f64 {
        (self.eye - self.target).length()
    }

    /// Orbit around the target by azimuth and polar deltas in radians.
    pub fn orbit(&mut self, delta_azimuth: f64, delta_polar: f64) {
        let offset = self.eye - self.target;
        let radius = offset.length();
        if radius <= 0.0 {
            return;
        }

        let theta = offset.x.atan2(offset.z);
        let phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let theta = theta + delta_azimuth;
        let phi = (phi + delta_polar).clamp(0.01, self.limits.max_polar);

        self.eye = self.target
            + Vector3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
    }

    /// Move toward the target by `delta`, staying within the distance limits.
    pub fn zoom(&mut self, delta: f64) {
        let offset = self.eye - self.target;
        let distance = offset.length();
        if distance <= 0.0 {
            return;
        }
        let next = (distance - delta).clamp(self.limits.min_distance, self.limits.max_distance);
        self.eye = self.target + offset * (next / distance);
    }
}
