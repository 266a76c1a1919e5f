//! Scene state owned by one [`SceneContext`] and passed to each frame.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, info};

use swim_anim::{Ease, EasePath, LoopingTimeline, PlayheadSource, PlayheadTrack};
use swim_core::{InstanceId, Result, SwimError};
use swim_deform::{
    deform_mesh, encode, BoundaryPolicy, DeformationContext, EncodedBuffer, MeshSource, TriangleMesh,
};
use swim_geometry::{build_curve, sample_curve_with, Curve, PlacementBox, Profile2D, SamplerConfig};
use swim_math::{Point3, Vector3};

use crate::camera::Camera;
use crate::pipeline::{prepare_mesh, RenderMesh};
use crate::shader::{curve_deform_stage, DeformUniforms, VertexStage};
use crate::texture::SplineTexture;

new_key_type! {
    pub struct SwimmerKey;
}

/// Where one swimmer travels and when it moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwimmerConfig {
    pub placement: PlacementBox,
    pub track: PlayheadTrack,
}

impl SwimmerConfig {
    pub fn new(placement: PlacementBox, start: f64) -> Self {
        Self {
            placement,
            track: PlayheadTrack::new(start, SceneConfig::DEFAULT_DURATION, Ease::Path(EasePath::swim_stroke())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub profile: Profile2D,
    pub swimmers: Vec<SwimmerConfig>,
    pub sampler: SamplerConfig,
    pub policy: BoundaryPolicy,
    /// Rotation about Z applied to the loaded mesh, in radians
    pub mesh_roll: f64,
    /// Pause after each timeline cycle, in seconds
    pub repeat_delay: f64,
    pub camera: Camera,
    pub environment: Environment,
}

impl SceneConfig {
    pub const DEFAULT_DURATION: f64 = 3.0;

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SwimError::config(format!("invalid scene config: {}", e)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SwimError::config(e.to_string()))
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            profile: Profile2D::swim_arc(),
            swimmers: vec![
                SwimmerConfig::new(PlacementBox::new(-140.0, 80.0, -10.0, 20.0, 10.0), 0.3),
                SwimmerConfig::new(PlacementBox::new(-100.0, 100.0, -15.0, 25.0, 30.0), 0.0),
                SwimmerConfig::new(PlacementBox::new(-80.0, 120.0, -10.0, 20.0, 50.0), 0.4),
            ],
            sampler: SamplerConfig::default(),
            policy: BoundaryPolicy::default(),
            mesh_roll: -std::f64::consts::FRAC_PI_2,
            repeat_delay: 1.0,
            camera: Camera::default(),
            environment: Environment::default(),
        }
    }
}

/// Lighting and water parameters consumed by the shading passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f64,
    /// Degrees above the horizon
    pub sun_elevation_deg: f64,
    /// Degrees around +Y, 0 facing +Z
    pub sun_azimuth_deg: f64,
    /// Water animation clock
    pub water_time: f64,
    /// Clock increment per rendered frame
    pub water_time_step: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.6,
            sun_elevation_deg: 2.0,
            sun_azimuth_deg: 180.0,
            water_time: 0.0,
            water_time_step: 1.0 / 60.0,
        }
    }
}

impl Environment {
    /// Unit vector pointing at the sun.
    pub fn sun_direction(&self) -> Vector3 {
        let phi = (90.0 - self.sun_elevation_deg).to_radians();
        let theta = self.sun_azimuth_deg.to_radians();
        Vector3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos())
    }

    pub fn tick(&mut self) {
        self.water_time += self.water_time_step;
    }
}

/// A mesh bound to one sampled path.
#[derive(Debug, Clone)]
pub struct SwimmerInstance {
    pub id: InstanceId,
    pub mesh: TriangleMesh,
    pub buffer: Arc<EncodedBuffer>,
    pub texture: SplineTexture,
    pub context: DeformationContext,
    pub arc_length: f64,
    /// Upload-ready copy of the mesh; positions hold the last CPU-deformed frame
    pub render: RenderMesh,
}

impl SwimmerInstance {
    /// Sample `curve`, encode it, and fit `mesh` to its length.
    pub fn build(mesh: TriangleMesh, curve: &dyn Curve, sampler: &SamplerConfig, policy: BoundaryPolicy) -> Result<Self> {
        let samples = sample_curve_with(curve, sampler)?;
        let buffer = encode(&samples)?;
        let context = DeformationContext::from_mesh(&mesh, &samples, policy)?;
        let id = InstanceId::new();
        info!(
            %id,
            vertices = mesh.vertex_count(),
            arc_length = samples.arc_length(),
            length_ratio = context.length_ratio,
            "swimmer created"
        );
        Ok(Self {
            id,
            texture: SplineTexture::from_buffer(&buffer),
            render: prepare_mesh(&mesh),
            buffer: Arc::new(buffer),
            arc_length: samples.arc_length(),
            context,
            mesh,
        })
    }

    /// Await `source`, roll the mesh about Z, then [`SwimmerInstance::build`].
    pub async fn load<S: MeshSource>(
        source: &S,
        curve: &dyn Curve,
        sampler: &SamplerConfig,
        policy: BoundaryPolicy,
        mesh_roll: f64,
    ) -> Result<Self> {
        let mut mesh = source.load_mesh().await?;
        if mesh_roll != 0.0 {
            mesh.rotate_z(mesh_roll);
        }
        Self::build(mesh, curve, sampler, policy)
    }

    pub fn deform(&self, playhead: f64) -> Vec<Point3> {
        deform_mesh(&self.mesh, &self.context, &self.buffer, playhead)
    }

    pub fn uniforms(&self, camera: &Camera, playhead: f64) -> DeformUniforms {
        DeformUniforms::new(camera, &self.context, &self.texture, playhead)
    }
}

/// Deformed output of one swimmer for one frame.
#[derive(Debug, Clone)]
pub struct SwimmerFrame {
    pub key: SwimmerKey,
    pub id: InstanceId,
    pub playhead: f64,
    pub positions: Vec<Point3>,
}

pub struct SceneContext {
    pub camera: Camera,
    pub environment: Environment,
    pub timeline: LoopingTimeline,
    swimmers: SlotMap<SwimmerKey, SwimmerInstance>,
    stage: VertexStage,
}

impl SceneContext {
    pub fn new(camera: Camera, environment: Environment, repeat_delay: f64) -> Self {
        Self {
            camera,
            environment,
            timeline: LoopingTimeline::new(repeat_delay),
            swimmers: SlotMap::with_key(),
            stage: curve_deform_stage(),
        }
    }

    /// Load the mesh once and place one swimmer per configured path.
    pub async fn setup<S: MeshSource>(config: &SceneConfig, source: &S) -> Result<Self> {
        let mut mesh = source.load_mesh().await?;
        if config.mesh_roll != 0.0 {
            mesh.rotate_z(config.mesh_roll);
        }

        let mut scene = Self::new(config.camera.clone(), config.environment.clone(), config.repeat_delay);
        for swimmer in &config.swimmers {
            let curve = build_curve(&config.profile, &swimmer.placement)?;
            let instance = SwimmerInstance::build(mesh.clone(), &curve, &config.sampler, config.policy)?;
            scene.add_swimmer(instance, swimmer.track.clone());
        }
        info!(swimmers = scene.len(), cycle = scene.timeline.cycle_length(), "scene ready");
        Ok(scene)
    }

    pub fn add_swimmer(&mut self, instance: SwimmerInstance, track: PlayheadTrack) -> SwimmerKey {
        self.timeline.insert(instance.id, track);
        self.swimmers.insert(instance)
    }

    pub fn remove_swimmer(&mut self, key: SwimmerKey) -> Option<SwimmerInstance> {
        let instance = self.swimmers.remove(key)?;
        self.timeline.remove(instance.id);
        Some(instance)
    }

    pub fn swimmer(&self, key: SwimmerKey) -> Option<&SwimmerInstance> {
        self.swimmers.get(key)
    }

    pub fn swimmers(&self) -> impl Iterator<Item = (SwimmerKey, &SwimmerInstance)> {
        self.swimmers.iter()
    }

    pub fn len(&self) -> usize {
        self.swimmers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swimmers.is_empty()
    }

    pub fn playhead(&self, key: SwimmerKey) -> Option<f64> {
        self.swimmers
            .get(key)
            .map(|s| self.timeline.current_playhead(s.id))
    }

    /// Advance clocks by `dt` seconds and deform every swimmer.
    pub fn frame(&mut self, dt: f64) -> Vec<SwimmerFrame> {
        self.timeline.advance(dt);
        self.environment.tick();
        debug!(time = self.timeline.time(), "frame");

        let timeline = &self.timeline;
        self.swimmers
            .iter_mut()
            .map(|(key, s)| {
                let playhead = timeline.current_playhead(s.id);
                let positions = s.deform(playhead);
                s.render.write_positions(&positions);
                SwimmerFrame {
                    key,
                    id: s.id,
                    playhead,
                    positions,
                }
            })
            .collect()
    }

    /// Uniform block for `key` at the current timeline position.
    pub fn uniforms(&self, key: SwimmerKey) -> Option<DeformUniforms> {
        let s = self.swimmers.get(key)?;
        Some(s.uniforms(&self.camera, self.timeline.current_playhead(s.id)))
    }

    pub fn stage(&self) -> &VertexStage {
        &self.stage
    }

    pub fn shader_source(&self) -> Result<String> {
        self.stage.to_wgsl()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::policy_code;
    use approx::assert_abs_diff_eq;
    use swim_deform::InMemorySource;

    fn small_config() -> SceneConfig {
        SceneConfig {
            sampler: SamplerConfig::with_num_points(63),
            ..SceneConfig::default()
        }
    }

    fn fish() -> TriangleMesh {
        TriangleMesh::ellipsoid(Vector3::new(1.0, 2.0, 8.0), 6, 8)
    }

    #[test]
    fn test_default_config_has_three_swimmers() {
        let config = SceneConfig::default();
        assert_eq!(config.swimmers.len(), 3);
        let starts: Vec<f64> = config.swimmers.iter().map(|s| s.track.start).collect();
        assert_eq!(starts, vec![0.3, 0.0, 0.4]);
        assert_eq!(config.swimmers[1].placement, PlacementBox::new(-100.0, 100.0, -15.0, 25.0, 30.0));
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = SceneConfig::default();
        let json = config.to_json_string().unwrap();
        let back = SceneConfig::from_json_str(&json).unwrap();
        assert_eq!(back.swimmers.len(), 3);
        assert_eq!(back.swimmers[2].placement, config.swimmers[2].placement);
        assert_eq!(back.policy, config.policy);
        assert_eq!(back.profile.segments.len(), config.profile.segments.len());
        assert!((back.mesh_roll - config.mesh_roll).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SceneConfig::from_json_str(r#"{ "policy": "clamp", "repeat_delay": 2.5 }"#).unwrap();
        assert_eq!(config.policy, BoundaryPolicy::Clamp);
        assert_eq!(config.repeat_delay, 2.5);
        assert_eq!(config.swimmers.len(), 3);
        assert_eq!(config.sampler.num_points, 511);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(SceneConfig::from_json_str("{ nope"), Err(SwimError::Config(_))));
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let err = SceneConfig::from_path("/nonexistent/scene.json").unwrap_err();
        assert!(matches!(err, SwimError::Io(_)));
    }

    #[test]
    fn test_sun_direction() {
        let env = Environment::default();
        let d = env.sun_direction();
        assert!((d.length() - 1.0).abs() < 1e-12);
        // Low sun behind the scene
        assert!(d.z < -0.99);
        assert!(d.y > 0.0 && d.y < 0.05);
    }

    #[test]
    fn test_setup_and_frame() {
        let mut scene = pollster::block_on(SceneContext::setup(&small_config(), &InMemorySource::new(fish()))).unwrap();
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.timeline.len(), 3);

        let frames = scene.frame(1.0 / 60.0);
        assert_eq!(frames.len(), 3);
        for f in &frames {
            let s = scene.swimmer(f.key).unwrap();
            assert_eq!(f.positions.len(), s.mesh.vertex_count());
            assert!(f.positions.iter().all(|p| p.is_finite()));
            assert_eq!(s.buffer.num_points(), 63);
            assert_eq!(s.render.vertices.len(), f.positions.len());
            assert_eq!(s.render.vertices[0].position, f.positions[0].as_vec3().to_array());
        }
        assert!((scene.environment.water_time - 1.0 / 60.0).abs() < 1e-15);
    }

    #[test]
    fn test_playheads_follow_track_offsets() {
        let mut scene = pollster::block_on(SceneContext::setup(&small_config(), &InMemorySource::new(fish()))).unwrap();
        let frames = scene.frame(0.2);
        // Only the swimmer starting at 0 has moved
        let moving = frames.iter().filter(|f| f.playhead > 0.0).count();
        assert_eq!(moving, 1);
    }

    fn x_spread(positions: &[Point3]) -> f64 {
        let (lo, hi) = positions
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
        hi - lo
    }

    #[test]
    fn test_bodies_stay_whole_during_repeat_delay() {
        let config = small_config();
        assert_eq!(config.policy, BoundaryPolicy::Clamp);
        let body = TriangleMesh::ellipsoid(Vector3::new(1.5, 2.5, 12.0), 8, 12);
        let mut scene = pollster::block_on(SceneContext::setup(&config, &InMemorySource::new(body))).unwrap();

        // every track has finished; the cycle is in its pause
        scene.timeline.seek(3.7);
        for f in scene.frame(0.0) {
            assert_abs_diff_eq!(f.playhead, 1.0, epsilon = 1e-9);
            let spread = x_spread(&f.positions);
            assert!(spread < 30.0, "body torn across the path: x spread {}", spread);
        }
    }

    #[test]
    fn test_wrap_tears_body_at_path_end() {
        let config = SceneConfig {
            policy: BoundaryPolicy::Wrap,
            ..small_config()
        };
        let body = TriangleMesh::ellipsoid(Vector3::new(1.5, 2.5, 12.0), 8, 12);
        let mut scene = pollster::block_on(SceneContext::setup(&config, &InMemorySource::new(body))).unwrap();
        scene.timeline.seek(3.7);
        let frames = scene.frame(0.0);
        assert!(frames.iter().all(|f| x_spread(&f.positions) > 100.0));
    }

    #[test]
    fn test_remove_swimmer() {
        let mut scene = pollster::block_on(SceneContext::setup(&small_config(), &InMemorySource::new(fish()))).unwrap();
        let key = scene.swimmers().next().map(|(k, _)| k).unwrap();
        let removed = scene.remove_swimmer(key).unwrap();
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.timeline.len(), 2);
        assert!(scene.playhead(key).is_none());
        assert_eq!(scene.timeline.current_playhead(removed.id), 0.0);
    }

    #[test]
    fn test_setup_propagates_load_error() {
        let result = pollster::block_on(SceneContext::setup(
            &small_config(),
            &InMemorySource::new(TriangleMesh::default()),
        ));
        assert!(matches!(result, Err(SwimError::AssetLoad(_))));
    }

    #[test]
    fn test_uniforms_and_shader() {
        let scene = pollster::block_on(SceneContext::setup(&small_config(), &InMemorySource::new(fish()))).unwrap();
        let key = scene.swimmers().next().map(|(k, _)| k).unwrap();
        let u = scene.uniforms(key).unwrap();
        assert_eq!(u.texture_size, [64.0, 4.0]);
        assert_eq!(u.policy, policy_code(BoundaryPolicy::Clamp));
        assert_eq!(u.as_bytes().len(), 112);
        assert!(scene.shader_source().unwrap().contains("fn transform_position"));
    }
}
