//! Interaction rules between particle types
//!
//! A [`RuleMatrix`] holds one [`Rule`] for every ordered pair of particle
//! types, self-pairs included. Entries are not required to be symmetric:
//! `(A, B)` governs how `A` reacts to `B` and may differ from `(B, A)`.

use crate::physics::math::Scalar;
use crate::physics::particles::ParticleType;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coefficient(s) governing the force one type feels from another
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(untagged)]
pub enum Rule {
    /// Single signed coefficient `g`; force magnitude `g / d`
    Scalar(Scalar),
    /// Net force `attraction / d - repulsion / d²`
    Dual {
        attraction: Scalar,
        repulsion: Scalar,
    },
}

impl Rule {
    pub const ZERO_SCALAR: Rule = Rule::Scalar(0.0);
    pub const ZERO_DUAL: Rule = Rule::Dual {
        attraction: 0.0,
        repulsion: 0.0,
    };

    pub fn shape(&self) -> RuleShape {
        match self {
            Rule::Scalar(_) => RuleShape::Scalar,
            Rule::Dual { .. } => RuleShape::Dual,
        }
    }

    /// Converts between shapes, keeping the long-range coefficient.
    ///
    /// A scalar `g` becomes `{ attraction: g, repulsion: 0 }`; a dual rule
    /// keeps only its attraction.
    pub fn to_shape(self, shape: RuleShape) -> Rule {
        match (self, shape) {
            (Rule::Scalar(g), RuleShape::Dual) => Rule::Dual {
                attraction: g,
                repulsion: 0.0,
            },
            (Rule::Dual { attraction, .. }, RuleShape::Scalar) => Rule::Scalar(attraction),
            (rule, _) => rule,
        }
    }

    fn random<R: Rng + ?Sized>(rng: &mut R, shape: RuleShape) -> Rule {
        match shape {
            RuleShape::Scalar => Rule::Scalar(rng.random_range(-1.0..=1.0)),
            RuleShape::Dual => Rule::Dual {
                attraction: rng.random_range(-1.0..=1.0),
                repulsion: rng.random_range(-1.0..=1.0),
            },
        }
    }

    /// Whether the rule exerts no force at any distance
    pub fn is_zero(&self) -> bool {
        match *self {
            Rule::Scalar(g) => g == 0.0,
            Rule::Dual {
                attraction,
                repulsion,
            } => attraction == 0.0 && repulsion == 0.0,
        }
    }

    fn is_finite(&self) -> bool {
        match *self {
            Rule::Scalar(g) => g.is_finite(),
            Rule::Dual {
                attraction,
                repulsion,
            } => attraction.is_finite() && repulsion.is_finite(),
        }
    }
}

/// Which kind of [`Rule`] a matrix holds
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RuleShape {
    #[default]
    Scalar,
    Dual,
}

impl RuleShape {
    pub fn zero(self) -> Rule {
        match self {
            RuleShape::Scalar => Rule::ZERO_SCALAR,
            RuleShape::Dual => Rule::ZERO_DUAL,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            RuleShape::Scalar => RuleShape::Dual,
            RuleShape::Dual => RuleShape::Scalar,
        }
    }
}

/// Errors raised while building or editing a [`RuleMatrix`]
#[derive(Debug, Clone, PartialEq)]
pub enum RuleError {
    /// A type index outside `0..type_count`
    TypeOutOfRange { particle_type: usize, type_count: usize },
    /// A rule whose shape differs from the rest of the matrix
    ShapeMismatch { expected: RuleShape, found: RuleShape },
    /// Row `row` does not have one entry per type
    NotSquare { row: usize, len: usize, type_count: usize },
    /// No entry for the ordered pair `(source, target)`
    MissingEntry { source: usize, target: usize },
    /// A coefficient that is NaN or infinite
    NonFinite { source: usize, target: usize },
    /// A matrix sized for a different number of types than the particles use
    TypeCountMismatch { expected: usize, found: usize },
    /// A matrix with no types at all
    Empty,
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::TypeOutOfRange {
                particle_type,
                type_count,
            } => write!(
                f,
                "particle type {particle_type} is out of range for {type_count} types"
            ),
            RuleError::ShapeMismatch { expected, found } => {
                write!(f, "expected a {expected:?} rule, found a {found:?} rule")
            }
            RuleError::NotSquare {
                row,
                len,
                type_count,
            } => write!(
                f,
                "rule row {row} has {len} entries but the matrix covers {type_count} types"
            ),
            RuleError::MissingEntry { source, target } => {
                write!(f, "no rule defined for the pair ({source}, {target})")
            }
            RuleError::NonFinite { source, target } => {
                write!(f, "rule ({source}, {target}) is not a finite number")
            }
            RuleError::TypeCountMismatch { expected, found } => write!(
                f,
                "rule matrix covers {found} types but the particles use {expected}"
            ),
            RuleError::Empty => write!(f, "rule matrix has no types"),
        }
    }
}

impl std::error::Error for RuleError {}

/// Serialized form of a [`RuleMatrix`]: one row per source type
pub type RuleRows = Vec<Vec<Rule>>;

/// Rules for every ordered pair of particle types, stored row-major
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "RuleRows", into = "RuleRows")]
pub struct RuleMatrix {
    type_count: usize,
    shape: RuleShape,
    entries: Vec<Rule>,
}

impl RuleMatrix {
    /// A matrix where every ordered pair uses `rule`
    pub fn uniform(type_count: usize, rule: Rule) -> Self {
        Self {
            type_count,
            shape: rule.shape(),
            entries: vec![rule; type_count * type_count],
        }
    }

    /// A matrix of zero coefficients
    pub fn zeroed(type_count: usize, shape: RuleShape) -> Self {
        Self::uniform(type_count, shape.zero())
    }

    /// Yellow, red, green rules of the classic particle life demo.
    ///
    /// Type 0 is yellow, 1 is red, 2 is green. Pairs the demo never wired up
    /// are explicit zeros.
    pub fn classic() -> Self {
        Self {
            type_count: 3,
            shape: RuleShape::Scalar,
            entries: vec![
                // yellow from yellow, red, green
                Rule::Scalar(0.15),
                Rule::Scalar(0.0),
                Rule::Scalar(-0.2),
                // red
                Rule::Scalar(0.0),
                Rule::Scalar(-0.1),
                Rule::Scalar(-0.34),
                // green
                Rule::Scalar(0.34),
                Rule::Scalar(-0.17),
                Rule::Scalar(-0.32),
            ],
        }
    }

    /// Builds a matrix from rows, rejecting ragged, mixed or empty input
    pub fn from_rows(rows: RuleRows) -> Result<Self, RuleError> {
        let type_count = rows.len();
        let shape = rows
            .first()
            .and_then(|row| row.first())
            .map(Rule::shape)
            .ok_or(RuleError::Empty)?;

        let mut entries = Vec::with_capacity(type_count * type_count);
        for (source, row) in rows.into_iter().enumerate() {
            if row.len() < type_count {
                return Err(RuleError::MissingEntry {
                    source,
                    target: row.len(),
                });
            }
            if row.len() != type_count {
                return Err(RuleError::NotSquare {
                    row: source,
                    len: row.len(),
                    type_count,
                });
            }
            for (target, rule) in row.into_iter().enumerate() {
                if rule.shape() != shape {
                    return Err(RuleError::ShapeMismatch {
                        expected: shape,
                        found: rule.shape(),
                    });
                }
                if !rule.is_finite() {
                    return Err(RuleError::NonFinite { source, target });
                }
                entries.push(rule);
            }
        }

        Ok(Self {
            type_count,
            shape,
            entries,
        })
    }

    pub fn rows(&self) -> RuleRows {
        self.entries
            .chunks(self.type_count.max(1))
            .map(<[Rule]>::to_vec)
            .collect()
    }

    #[inline]
    pub fn type_count(&self) -> usize {
        self.type_count
    }

    #[inline]
    pub fn shape(&self) -> RuleShape {
        self.shape
    }

    #[inline]
    fn index(&self, source: ParticleType, target: ParticleType) -> usize {
        source.index() * self.type_count + target.index()
    }

    /// Rule applied to `source` particles by `target` particles.
    ///
    /// Both types must be below [`type_count`](Self::type_count).
    #[inline]
    pub fn get(&self, source: ParticleType, target: ParticleType) -> Rule {
        self.entries[self.index(source, target)]
    }

    /// Checked variant of [`get`](Self::get)
    pub fn try_get(&self, source: ParticleType, target: ParticleType) -> Option<Rule> {
        if source.index() < self.type_count && target.index() < self.type_count {
            Some(self.get(source, target))
        } else {
            None
        }
    }

    /// Replaces one ordered-pair entry, leaving `(target, source)` untouched
    pub fn set(
        &mut self,
        source: ParticleType,
        target: ParticleType,
        rule: Rule,
    ) -> Result<(), RuleError> {
        for particle_type in [source, target] {
            if particle_type.index() >= self.type_count {
                return Err(RuleError::TypeOutOfRange {
                    particle_type: particle_type.index(),
                    type_count: self.type_count,
                });
            }
        }
        if rule.shape() != self.shape {
            return Err(RuleError::ShapeMismatch {
                expected: self.shape,
                found: rule.shape(),
            });
        }
        if !rule.is_finite() {
            return Err(RuleError::NonFinite {
                source: source.index(),
                target: target.index(),
            });
        }

        let index = self.index(source, target);
        self.entries[index] = rule;
        Ok(())
    }

    /// Redraws every coefficient independently and uniformly from `[-1, 1]`
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let shape = self.shape;
        for rule in &mut self.entries {
            *rule = Rule::random(rng, shape);
        }
    }

    /// Same rules re-expressed in another shape
    pub fn to_shape(&self, shape: RuleShape) -> Self {
        Self {
            type_count: self.type_count,
            shape,
            entries: self.entries.iter().map(|rule| rule.to_shape(shape)).collect(),
        }
    }

    /// Copy covering `type_count` types.
    ///
    /// Pairs present in both matrices keep their rule; new pairs are zero.
    pub fn resized(&self, type_count: usize) -> Self {
        let mut resized = Self::zeroed(type_count, self.shape);
        let shared = type_count.min(self.type_count);
        for source in 0..shared {
            for target in 0..shared {
                resized.entries[source * type_count + target] =
                    self.entries[source * self.type_count + target];
            }
        }
        resized
    }
}

impl Default for RuleMatrix {
    fn default() -> Self {
        Self::classic()
    }
}

impl TryFrom<RuleRows> for RuleMatrix {
    type Error = RuleError;

    fn try_from(rows: RuleRows) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<RuleMatrix> for RuleRows {
    fn from(matrix: RuleMatrix) -> Self {
        matrix.rows()
    }
}
