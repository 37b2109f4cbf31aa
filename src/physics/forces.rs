//! Pairwise forces between particle groups
//!
//! Every source particle sums one contribution per target particle within the
//! cutoff radius. Evaluation is exhaustive, so a full pass over all ordered
//! type pairs costs O(n²) for n particles.
//!
//! Sign convention: the contribution `F * (a - b)` is added to the source
//! particle `a`. A positive `F` pushes `a` away from `b`, a negative `F` pulls
//! it closer.

use crate::physics::math::{Scalar, Vector, distance};
use crate::physics::particles::Particle;
use crate::physics::rules::Rule;

/// Default maximum separation at which particles interact
pub const DEFAULT_CUTOFF_RADIUS: Scalar = 80.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceModel {
    /// Pairs at or beyond this separation contribute nothing
    pub cutoff_radius: Scalar,
    /// Pairs at or below this separation contribute nothing; zero skips only
    /// coincident particles
    pub min_distance: Scalar,
    /// Zero the repulsion term of dual rules between particles of one type
    pub suppress_same_type_repulsion: bool,
}

impl Default for ForceModel {
    fn default() -> Self {
        Self {
            cutoff_radius: DEFAULT_CUTOFF_RADIUS,
            min_distance: 0.0,
            suppress_same_type_repulsion: false,
        }
    }
}

impl ForceModel {
    pub fn new(cutoff_radius: Scalar) -> Self {
        Self {
            cutoff_radius,
            ..Self::default()
        }
    }

    pub fn with_min_distance(mut self, min_distance: Scalar) -> Self {
        self.min_distance = min_distance;
        self
    }

    pub fn with_same_type_repulsion_suppressed(mut self, suppress: bool) -> Self {
        self.suppress_same_type_repulsion = suppress;
        self
    }

    /// Scalar force factor `F` for a pair at separation `d`
    #[inline]
    pub fn magnitude(&self, d: Scalar, rule: Rule, same_type: bool) -> Scalar {
        match rule {
            Rule::Scalar(g) => g / d,
            Rule::Dual {
                attraction,
                repulsion,
            } => {
                let repulsion = if same_type && self.suppress_same_type_repulsion {
                    0.0
                } else {
                    repulsion
                };
                attraction / d - repulsion / (d * d)
            }
        }
    }

    /// Force contribution on a particle at `a` from a particle at `b`
    #[inline]
    pub fn pair_force(&self, a: Vector, b: Vector, rule: Rule, same_type: bool) -> Vector {
        let d = distance(a, b);
        if d <= self.min_distance || d >= self.cutoff_radius {
            return Vector::ZERO;
        }

        (a - b) * self.magnitude(d, rule, same_type)
    }

    /// Net force on a particle at `position` from every particle in `targets`
    pub fn force_on(
        &self,
        position: Vector,
        targets: &[Particle],
        rule: Rule,
        same_type: bool,
    ) -> Vector {
        targets.iter().fold(Vector::ZERO, |force, target| {
            force + self.pair_force(position, target.position, rule, same_type)
        })
    }

    /// Adds the force each `sources[i]` feels from `targets` into `forces[i]`.
    ///
    /// Reads positions only, so `sources` and `targets` may be the same group.
    pub fn accumulate(
        &self,
        sources: &[Particle],
        targets: &[Particle],
        rule: Rule,
        same_type: bool,
        forces: &mut [Vector],
    ) {
        debug_assert_eq!(sources.len(), forces.len());

        for (source, force) in sources.iter().zip(forces.iter_mut()) {
            *force += self.force_on(source.position, targets, rule, same_type);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::particles::ParticleType;

    fn particle_at(x: Scalar, y: Scalar) -> Particle {
        Particle::new(Vector::new(x, y, 0.0), Vector::ZERO, ParticleType(0))
    }

    #[test]
    fn test_scalar_rule_follows_source_sign_convention() {
        let model = ForceModel::default();
        let force = model.pair_force(
            Vector::ZERO,
            Vector::new(10.0, 0.0, 0.0),
            Rule::Scalar(-0.34),
            true,
        );

        // F = -0.34 / 10, applied along (a - b) = (-10, 0)
        assert!((force.x - 0.34).abs() < 1e-12);
        assert_eq!(force.y, 0.0);

        let pushed = model.pair_force(
            Vector::ZERO,
            Vector::new(10.0, 0.0, 0.0),
            Rule::Scalar(0.34),
            true,
        );
        assert!(pushed.x < 0.0);
    }

    #[test]
    fn test_coincident_and_distant_pairs_contribute_nothing() {
        let model = ForceModel::default();
        let rule = Rule::Scalar(1.0);

        assert_eq!(
            model.pair_force(Vector::ONE, Vector::ONE, rule, false),
            Vector::ZERO
        );
        assert_eq!(
            model.pair_force(Vector::ZERO, Vector::new(80.0, 0.0, 0.0), rule, false),
            Vector::ZERO
        );
        assert_ne!(
            model.pair_force(Vector::ZERO, Vector::new(79.9, 0.0, 0.0), rule, false),
            Vector::ZERO
        );
    }

    #[test]
    fn test_min_distance_excludes_near_pairs() {
        let model = ForceModel::default().with_min_distance(0.5);
        let force = model.pair_force(
            Vector::ZERO,
            Vector::new(0.25, 0.0, 0.0),
            Rule::Scalar(1.0),
            false,
        );
        assert_eq!(force, Vector::ZERO);
    }

    #[test]
    fn test_dual_rule_short_range_term_dominates_up_close() {
        let model = ForceModel::default();
        let rule = Rule::Dual {
            attraction: 1.0,
            repulsion: 4.0,
        };

        // F = 1/d - 4/d²: negative below d = 4, positive above
        assert!(model.magnitude(2.0, rule, false) < 0.0);
        assert!(model.magnitude(8.0, rule, false) > 0.0);
        assert_eq!(model.magnitude(4.0, rule, false), 0.0);
    }

    #[test]
    fn test_same_type_flag_zeroes_repulsion_only_when_enabled() {
        let rule = Rule::Dual {
            attraction: 1.0,
            repulsion: 4.0,
        };
        let plain = ForceModel::default();
        let suppressed = ForceModel::default().with_same_type_repulsion_suppressed(true);

        assert_eq!(plain.magnitude(2.0, rule, true), 0.5 - 1.0);
        assert_eq!(suppressed.magnitude(2.0, rule, true), 0.5);
        assert_eq!(suppressed.magnitude(2.0, rule, false), 0.5 - 1.0);
    }

    #[test]
    fn test_accumulate_sums_over_targets_including_self_group() {
        let model = ForceModel::default();
        let group = vec![
            particle_at(0.0, 0.0),
            particle_at(10.0, 0.0),
            particle_at(0.0, 20.0),
        ];
        let mut forces = vec![Vector::ZERO; group.len()];

        model.accumulate(&group, &group, Rule::Scalar(-1.0), true, &mut forces);

        // -1/d * (a - b) is the unit vector from a toward b
        assert!((forces[0] - Vector::new(1.0, 1.0, 0.0)).length() < 1e-12);
        let net: Vector = forces.iter().copied().sum();
        assert!(net.length() < 1e-12);
    }
}
