#![deny(unsafe_code)]
//! Pointer-driven particle field.
//!
//! A fixed lattice of particles sits on the x/z plane. Each frame the pointer
//! (already projected onto that plane) pushes nearby particles outward and
//! upward, a spring pulls every particle back to its home, and velocity is
//! damped. The field emits one [`RenderAttributes`] per particle for an
//! instanced renderer.
//!
//! The integrator is explicit Euler with one unit step per call and no
//! delta-time scaling, so simulation speed follows the frame rate.

pub mod config;
pub mod instance;

pub use config::FieldConfig;
pub use instance::AccentColors;

use glam::{DVec2, DVec3};
use motion_field_core::error::FieldError;
use serde::Serialize;
use serde_json::Value;

/// Share of the repulsion impulse that is also applied as vertical lift.
const LIFT_FACTOR: f64 = 0.5;
/// How strongly vertical displacement enlarges a particle.
const HEIGHT_SCALE: f64 = 0.8;
/// Smallest emitted scale, so no instance degenerates to nothing.
const MIN_SCALE: f64 = 0.3;

/// A single simulated point.
///
/// `home` is fixed at construction; `position` and `velocity` are only
/// changed by [`ParticleField::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    home: DVec2,
    position: DVec3,
    velocity: DVec3,
}

impl Particle {
    fn at_rest(home: DVec2) -> Self {
        Self {
            home,
            position: DVec3::new(home.x, 0.0, home.y),
            velocity: DVec3::ZERO,
        }
    }

    /// Planar rest position; `home().y` is the world z coordinate.
    pub fn home(&self) -> DVec2 {
        self.home
    }

    /// Rest position in world space (y = 0).
    pub fn home_position(&self) -> DVec3 {
        DVec3::new(self.home.x, 0.0, self.home.y)
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    /// One repulsion + spring + damping + Euler update.
    fn advance(&mut self, pointer: DVec3, cfg: &FieldConfig) {
        let offset = planar_offset(self.position, pointer);
        let dist = offset.length();

        // dist == 0 has no outward direction; NaN fails both comparisons.
        if dist > 0.0 && dist < cfg.repulsion_radius {
            let force = cfg.repulsion_force * (1.0 - dist / cfg.repulsion_radius);
            let dir = offset / dist;
            self.velocity.x += dir.x * force;
            self.velocity.z += dir.y * force;
            self.velocity.y += force * LIFT_FACTOR;
        }

        self.velocity += (self.home_position() - self.position) * cfg.spring;
        self.velocity *= cfg.damping;
        self.position += self.velocity;
    }
}

/// Derived per-particle values handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderAttributes {
    pub position: DVec3,
    /// Uniform scale, never below 0.3.
    pub scale: f64,
    /// 0 under the pointer, 1 at or beyond the repulsion radius.
    pub color_mix: f64,
}

impl RenderAttributes {
    fn of(particle: &Particle, pointer: DVec3, repulsion_radius: f64) -> Self {
        let position = particle.position;
        let dist = planar_offset(position, pointer).length();
        Self {
            position,
            scale: (1.0 + position.y * HEIGHT_SCALE).max(MIN_SCALE),
            // f64::min ignores a NaN operand, so the result stays in [0, 1].
            color_mix: (dist / repulsion_radius).min(1.0),
        }
    }
}

/// The particle grid and its per-frame update.
///
/// Particles are stored row-major: index `i * cols + j` is row `i`, column `j`.
#[derive(Debug, Clone)]
pub struct ParticleField {
    config: FieldConfig,
    particles: Vec<Particle>,
    attributes: Vec<RenderAttributes>,
}

impl ParticleField {
    /// Builds `rows x cols` particles at rest on a lattice centered on the origin.
    ///
    /// Returns `FieldError::InvalidConfiguration` if `config` fails
    /// [`FieldConfig::validate`].
    pub fn new(config: FieldConfig) -> Result<Self, FieldError> {
        config.validate()?;

        let half_x = (config.rows - 1) as f64 * config.spacing / 2.0;
        let half_z = (config.cols - 1) as f64 * config.spacing / 2.0;
        let particles: Vec<Particle> = (0..config.rows)
            .flat_map(|i| {
                (0..config.cols).map(move |j| {
                    Particle::at_rest(DVec2::new(
                        i as f64 * config.spacing - half_x,
                        j as f64 * config.spacing - half_z,
                    ))
                })
            })
            .collect();

        let far_away = DVec3::splat(f64::INFINITY);
        let attributes = particles
            .iter()
            .map(|p| RenderAttributes::of(p, far_away, config.repulsion_radius))
            .collect();

        tracing::debug!(
            rows = config.rows,
            cols = config.cols,
            particles = particles.len(),
            "particle field created"
        );

        Ok(Self {
            config,
            particles,
            attributes,
        })
    }

    /// Creates a field from a loose JSON params object (see [`FieldConfig::from_json`]).
    pub fn from_json(params: &Value) -> Result<Self, FieldError> {
        Self::new(FieldConfig::from_json(params))
    }

    /// Advances the simulation one frame and returns the new render attributes.
    ///
    /// With `motion_enabled == false` particle state is left untouched and only
    /// the attributes are recomputed against the current pointer. Never fails:
    /// a pointer at infinity or NaN just produces no repulsion.
    pub fn step(&mut self, pointer: DVec3, motion_enabled: bool) -> &[RenderAttributes] {
        if motion_enabled {
            for particle in &mut self.particles {
                particle.advance(pointer, &self.config);
            }
        } else {
            tracing::trace!("motion disabled, particle state frozen");
        }

        let radius = self.config.repulsion_radius;
        for (out, particle) in self.attributes.iter_mut().zip(&self.particles) {
            *out = RenderAttributes::of(particle, pointer, radius);
        }
        &self.attributes
    }

    /// Attributes from the last `step`, or for a far-away pointer before the first.
    pub fn attributes(&self) -> &[RenderAttributes] {
        &self.attributes
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Always `false` for a successfully constructed field.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Current parameter values as a JSON object.
    pub fn params(&self) -> Value {
        self.config.params()
    }

    /// Schema describing all parameters.
    pub fn param_schema(&self) -> Value {
        FieldConfig::param_schema()
    }
}

/// `(a - b)` projected onto the x/z plane, as `(x, z)`.
fn planar_offset(a: DVec3, b: DVec3) -> DVec2 {
    DVec2::new(a.x - b.x, a.z - b.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// The 2x2 configuration used in the worked example.
    fn small_config() -> FieldConfig {
        FieldConfig {
            rows: 2,
            cols: 2,
            spacing: 1.0,
            repulsion_radius: 3.0,
            repulsion_force: 0.1,
            spring: 0.05,
            damping: 0.9,
        }
    }

    fn field(cfg: FieldConfig) -> ParticleField {
        ParticleField::new(cfg).unwrap()
    }

    fn far_pointer() -> DVec3 {
        DVec3::new(1.0e6, 0.0, 1.0e6)
    }

    fn state_bits(field: &ParticleField) -> Vec<[u64; 6]> {
        field
            .particles()
            .iter()
            .map(|p| {
                let (pos, vel) = (p.position(), p.velocity());
                [
                    pos.x.to_bits(),
                    pos.y.to_bits(),
                    pos.z.to_bits(),
                    vel.x.to_bits(),
                    vel.y.to_bits(),
                    vel.z.to_bits(),
                ]
            })
            .collect()
    }

    // ---- Construction ----

    #[test]
    fn new_creates_rows_times_cols_particles_at_rest() {
        let f = field(FieldConfig {
            rows: 3,
            cols: 5,
            ..FieldConfig::default()
        });
        assert_eq!(f.len(), 15);
        assert!(!f.is_empty());
        assert_eq!(f.attributes().len(), 15);
        for p in f.particles() {
            assert_eq!(p.position(), p.home_position());
            assert_eq!(p.velocity(), DVec3::ZERO);
        }
    }

    #[test]
    fn lattice_is_centered_and_row_major() {
        let f = field(small_config());
        let homes: Vec<DVec2> = f.particles().iter().map(Particle::home).collect();
        assert_eq!(
            homes,
            vec![
                DVec2::new(-0.5, -0.5),
                DVec2::new(-0.5, 0.5),
                DVec2::new(0.5, -0.5),
                DVec2::new(0.5, 0.5),
            ]
        );
    }

    #[test]
    fn non_square_lattice_centers_each_axis() {
        let f = field(FieldConfig {
            rows: 3,
            cols: 2,
            spacing: 2.0,
            ..FieldConfig::default()
        });
        let sum = f
            .particles()
            .iter()
            .fold(DVec2::ZERO, |acc, p| acc + p.home());
        assert!(sum.length() < 1e-12, "lattice not centered: {sum:?}");
        assert_eq!(f.particles()[0].home(), DVec2::new(-2.0, -1.0));
        assert_eq!(f.particles()[5].home(), DVec2::new(2.0, 1.0));
    }

    #[test]
    fn single_particle_sits_at_origin() {
        let f = field(FieldConfig {
            rows: 1,
            cols: 1,
            ..FieldConfig::default()
        });
        assert_eq!(f.particles()[0].home(), DVec2::ZERO);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        for cfg in [
            FieldConfig {
                rows: 0,
                ..small_config()
            },
            FieldConfig {
                cols: 0,
                ..small_config()
            },
            FieldConfig {
                spacing: 0.0,
                ..small_config()
            },
            FieldConfig {
                spacing: -1.0,
                ..small_config()
            },
        ] {
            assert!(matches!(
                ParticleField::new(cfg),
                Err(FieldError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn from_json_uses_defaults_for_missing_keys() {
        let f = ParticleField::from_json(&json!({"rows": 4, "cols": 3})).unwrap();
        assert_eq!(f.len(), 12);
        assert!((f.config().damping - 0.88).abs() < f64::EPSILON);
    }

    #[test]
    fn from_json_rejects_zero_rows() {
        assert!(ParticleField::from_json(&json!({"rows": 0})).is_err());
    }

    #[test]
    fn initial_attributes_are_rest_pose_far_from_pointer() {
        let f = field(small_config());
        for a in f.attributes() {
            assert_eq!(a.scale, 1.0);
            assert_eq!(a.color_mix, 1.0);
        }
    }

    #[test]
    fn params_and_schema_delegate_to_config() {
        let f = field(small_config());
        assert_eq!(f.params()["rows"], 2);
        assert!(f.param_schema().get("damping").is_some());
    }

    // ---- Worked example ----

    #[test]
    fn pointer_on_particle_home_pushes_the_others_away() {
        let mut f = field(small_config());
        let pointer = DVec3::new(-0.5, 0.0, -0.5);
        let attrs = f.step(pointer, true).to_vec();

        let p0 = f.particles()[0];
        assert_eq!(p0.velocity(), DVec3::ZERO);
        assert_eq!(p0.position(), p0.home_position());
        assert_eq!(attrs[0].color_mix, 0.0);
        assert_eq!(attrs[0].scale, 1.0);

        for (idx, p) in f.particles().iter().enumerate().skip(1) {
            let outward = p.home_position() - pointer;
            let vel = p.velocity();
            assert!(
                vel.x * outward.x + vel.z * outward.z > 0.0,
                "particle {idx} velocity {vel:?} not pointing away from the pointer"
            );
            assert!(vel.y > 0.0, "particle {idx} should be lifted");
            assert_ne!(p.position(), p.home_position(), "particle {idx} did not move");
            assert!(attrs[idx].scale > 1.0);
        }
    }

    #[test]
    fn worked_example_exact_values_for_neighbour() {
        // Particle 1 sits one unit from the pointer along +z.
        let mut f = field(small_config());
        f.step(DVec3::new(-0.5, 0.0, -0.5), true);
        let p1 = f.particles()[1];
        let force = 0.1 * (1.0 - 1.0 / 3.0);
        let expected = DVec3::new(0.0, force * 0.5 * 0.9, force * 0.9);
        assert!((p1.velocity() - expected).length() < 1e-12, "{:?}", p1.velocity());
        assert!((p1.position() - (DVec3::new(-0.5, 0.0, 0.5) + expected)).length() < 1e-12);
    }

    // ---- Stability ----

    #[test]
    fn unstable_spring_settings_are_rejected() {
        for spring in [5.0, -0.5] {
            let cfg = FieldConfig {
                spring,
                damping: 0.9,
                ..small_config()
            };
            assert!(
                matches!(
                    ParticleField::new(cfg),
                    Err(FieldError::InvalidConfiguration(_))
                ),
                "spring {spring} should be rejected"
            );
        }
    }

    #[test]
    fn stiffest_accepted_spring_stays_finite() {
        let mut f = field(FieldConfig {
            spring: 3.7,
            damping: 0.9,
            ..small_config()
        });
        for step in 0..2000 {
            f.step(DVec3::ZERO, true);
            for p in f.particles() {
                assert!(
                    p.position().is_finite() && p.velocity().is_finite(),
                    "non-finite state at step {step}"
                );
            }
        }
    }

    // ---- Motion disabled ----

    #[test]
    fn disabled_motion_leaves_state_bit_identical() {
        let mut f = field(small_config());
        f.step(DVec3::new(0.1, 0.0, 0.2), true);
        f.step(DVec3::new(0.3, 0.0, -0.2), true);
        let before = state_bits(&f);
        f.step(DVec3::new(0.0, 0.0, 0.0), false);
        f.step(DVec3::new(-0.4, 0.0, 0.4), false);
        assert_eq!(before, state_bits(&f));
    }

    #[test]
    fn disabled_motion_still_updates_color_mix() {
        let mut f = field(small_config());
        let far = f.step(far_pointer(), false).to_vec();
        assert!(far.iter().all(|a| a.color_mix == 1.0));
        let near = f.step(DVec3::new(-0.5, 0.0, -0.5), false);
        assert_eq!(near[0].color_mix, 0.0);
        assert!((near[1].color_mix - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn re_enabling_motion_resumes_from_frozen_state() {
        let pointer = DVec3::new(0.2, 0.0, 0.1);
        let mut a = field(small_config());
        let mut b = field(small_config());
        a.step(pointer, true);
        b.step(pointer, true);
        b.step(pointer, false);
        a.step(pointer, true);
        b.step(pointer, true);
        assert_eq!(state_bits(&a), state_bits(&b));
    }

    // ---- Edge cases ----

    #[test]
    fn zero_distance_produces_finite_state() {
        let mut f = field(small_config());
        let pointer = f.particles()[3].home_position();
        for _ in 0..20 {
            f.step(pointer, true);
        }
        for p in f.particles() {
            assert!(p.position().is_finite());
            assert!(p.velocity().is_finite());
        }
    }

    #[test]
    fn pointer_at_infinity_springs_everything_home() {
        let mut f = field(small_config());
        f.step(DVec3::ZERO, true);
        let inf = DVec3::new(f64::INFINITY, 0.0, f64::NEG_INFINITY);
        for _ in 0..600 {
            let attrs = f.step(inf, true);
            assert!(attrs.iter().all(|a| a.color_mix == 1.0));
        }
        for p in f.particles() {
            assert!((p.position() - p.home_position()).length() < 1e-9);
        }
    }

    #[test]
    fn nan_pointer_never_poisons_state() {
        let mut f = field(small_config());
        let attrs = f.step(DVec3::splat(f64::NAN), true).to_vec();
        assert!(attrs.iter().all(|a| a.color_mix == 1.0));
        for p in f.particles() {
            assert!(p.position().is_finite());
        }
    }

    #[test]
    fn pointer_height_is_ignored() {
        let mut a = field(small_config());
        let mut b = field(small_config());
        a.step(DVec3::new(0.1, 0.0, 0.3), true);
        b.step(DVec3::new(0.1, 42.0, 0.3), true);
        assert_eq!(state_bits(&a), state_bits(&b));
    }

    #[test]
    fn particle_outside_radius_gets_no_impulse() {
        let mut f = field(small_config());
        // Every particle is more than 3 units away.
        f.step(DVec3::new(10.0, 0.0, 0.0), true);
        for p in f.particles() {
            assert_eq!(p.velocity(), DVec3::ZERO);
        }
    }

    #[test]
    fn particle_at_rest_far_from_pointer_stays_put() {
        let mut f = field(FieldConfig::default());
        for _ in 0..100 {
            f.step(far_pointer(), true);
        }
        for p in f.particles() {
            assert_eq!(p.position(), p.home_position());
        }
    }

    #[test]
    fn displaced_particles_converge_home_with_pointer_far_away() {
        let mut f = field(FieldConfig::default());
        for p in &mut f.particles {
            p.position += DVec3::new(0.7, 1.2, -0.4);
            p.velocity = DVec3::new(0.05, -0.1, 0.02);
        }
        // The spring-damper is underdamped, so compare peak displacement over
        // windows longer than one oscillation period.
        let mut window_peaks = Vec::new();
        for _ in 0..6 {
            let mut peak = 0.0_f64;
            for _ in 0..50 {
                f.step(far_pointer(), true);
                for p in f.particles() {
                    peak = peak.max((p.position() - p.home_position()).length());
                }
            }
            window_peaks.push(peak);
        }
        for pair in window_peaks.windows(2) {
            assert!(pair[1] < pair[0], "peaks not decreasing: {window_peaks:?}");
        }
        assert!(window_peaks[5] < 1e-6, "did not settle: {window_peaks:?}");
    }

    #[test]
    fn scale_floor_applies_below_rest_height() {
        let mut f = field(small_config());
        f.particles[0].position.y = -5.0;
        let attrs = f.step(far_pointer(), false);
        assert_eq!(attrs[0].scale, MIN_SCALE);
    }

    #[test]
    fn lifted_particle_scales_up() {
        let mut f = field(small_config());
        f.particles[2].position.y = 0.5;
        let attrs = f.step(far_pointer(), false);
        assert!((attrs[2].scale - 1.4).abs() < 1e-12);
    }

    #[test]
    fn home_positions_never_change() {
        let mut f = field(FieldConfig::default());
        let homes: Vec<DVec2> = f.particles().iter().map(Particle::home).collect();
        for k in 0..200 {
            let t = k as f64 * 0.1;
            f.step(DVec3::new(t.cos() * 2.0, 0.0, t.sin() * 2.0), k % 7 != 0);
        }
        let after: Vec<DVec2> = f.particles().iter().map(Particle::home).collect();
        assert_eq!(homes, after);
    }

    #[test]
    fn step_returns_same_buffer_as_attributes() {
        let mut f = field(small_config());
        let stepped = f.step(DVec3::new(0.3, 0.0, 0.0), true).to_vec();
        assert_eq!(stepped.as_slice(), f.attributes());
    }

    #[test]
    fn render_attributes_serialize_to_json() {
        let attrs = RenderAttributes {
            position: DVec3::new(1.0, 2.0, 3.0),
            scale: 1.5,
            color_mix: 0.25,
        };
        let v = serde_json::to_value(attrs).unwrap();
        assert_eq!(v["position"], json!([1.0, 2.0, 3.0]));
        assert_eq!(v["scale"], 1.5);
        assert_eq!(v["color_mix"], 0.25);
    }

    // ---- Property-based tests ----

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn config() -> impl Strategy<Value = FieldConfig> {
            (
                1_usize..=8,
                1_usize..=8,
                0.1_f64..=2.0,
                0.5_f64..=5.0,
                0.0_f64..=0.5,
                0.0_f64..=0.2,
                0.01_f64..=0.99,
            )
                .prop_map(|(rows, cols, spacing, radius, force, spring, damping)| {
                    FieldConfig {
                        rows,
                        cols,
                        spacing,
                        repulsion_radius: radius,
                        repulsion_force: force,
                        spring,
                        damping,
                    }
                })
        }

        fn pointer_path() -> impl Strategy<Value = Vec<(f64, f64, bool)>> {
            prop::collection::vec((-6.0_f64..6.0, -6.0_f64..6.0, any::<bool>()), 1..60)
        }

        proptest! {
            #[test]
            fn construction_matches_grid(cfg in config()) {
                let f = ParticleField::new(cfg).unwrap();
                prop_assert_eq!(f.len(), cfg.rows * cfg.cols);
                for p in f.particles() {
                    prop_assert_eq!(p.position(), p.home_position());
                    prop_assert_eq!(p.velocity(), DVec3::ZERO);
                }
            }

            #[test]
            fn outputs_stay_finite_and_in_range(cfg in config(), path in pointer_path()) {
                let mut f = ParticleField::new(cfg).unwrap();
                for (x, z, enabled) in path {
                    let attrs = f.step(DVec3::new(x, 0.0, z), enabled);
                    for a in attrs {
                        prop_assert!(a.position.is_finite());
                        prop_assert!(a.scale >= MIN_SCALE, "scale {}", a.scale);
                        prop_assert!((0.0..=1.0).contains(&a.color_mix), "mix {}", a.color_mix);
                    }
                }
                for p in f.particles() {
                    prop_assert!(p.velocity().is_finite());
                }
            }

            #[test]
            fn deterministic_across_instances(cfg in config(), path in pointer_path()) {
                let mut a = ParticleField::new(cfg).unwrap();
                let mut b = ParticleField::new(cfg).unwrap();
                for (x, z, enabled) in path {
                    let pointer = DVec3::new(x, 0.0, z);
                    a.step(pointer, enabled);
                    b.step(pointer, enabled);
                }
                prop_assert_eq!(state_bits(&a), state_bits(&b));
            }

            #[test]
            fn disabled_step_is_identity(cfg in config(), path in pointer_path(), x in -6.0_f64..6.0, z in -6.0_f64..6.0) {
                let mut f = ParticleField::new(cfg).unwrap();
                for (px, pz, _) in path {
                    f.step(DVec3::new(px, 0.0, pz), true);
                }
                let before = state_bits(&f);
                f.step(DVec3::new(x, 0.0, z), false);
                prop_assert_eq!(before, state_bits(&f));
            }
        }
    }
}
