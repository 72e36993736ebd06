//! Input values supplied by the caller and the mechanism-level result type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AssemblyResult, EntityId, ErrorCollector, ErrorKind};
use crate::probability::Probability;

/// Regulatory limits of an assessment section, in failures per year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSection {
    pub signaling_limit: Probability,
    pub lower_limit: Probability,
}

impl AssessmentSection {
    /// Construct and validate.
    pub fn new(signaling_limit: Probability, lower_limit: Probability) -> AssemblyResult<Self> {
        let section = Self {
            signaling_limit,
            lower_limit,
        };
        section.validate()?;
        Ok(section)
    }

    /// Limits given as return periods in years, e.g. `(3000, 1000)`.
    pub fn from_return_periods(signaling_years: f64, lower_years: f64) -> AssemblyResult<Self> {
        let mut errors = ErrorCollector::new();
        let signaling = errors.absorb(
            Probability::from_return_period(signaling_years)
                .map_err(|e| e.at("assessment section/signaling limit")),
        );
        let lower = errors.absorb(
            Probability::from_return_period(lower_years)
                .map_err(|e| e.at("assessment section/lower limit")),
        );
        match (signaling, lower) {
            (Some(s), Some(l)) => Self::new(s, l),
            _ => errors.finish_with(Self {
                signaling_limit: Probability::UNDEFINED,
                lower_limit: Probability::UNDEFINED,
            }),
        }
    }

    /// Both limits defined and the signaling limit not above the lower limit.
    pub fn validate(&self) -> AssemblyResult<()> {
        let entity = EntityId::new("assessment section");
        let mut errors = ErrorCollector::new();
        let signaling = errors.absorb(self.signaling_limit.require(entity.child("signaling limit")));
        let lower = errors.absorb(self.lower_limit.require(entity.child("lower limit")));
        if let (Some(s), Some(l)) = (signaling, lower) {
            if s > l {
                errors.push(entity, ErrorKind::SignalingLimitAboveLowerLimit);
            }
        }
        errors.finish()
    }
}

/// Properties of a failure mechanism that enter the category limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureMechanism {
    pub id: EntityId,
    /// Number of equivalent independent sections along the assessment
    /// section; at least 1.
    pub length_effect_factor: f64,
    /// Share of the assessment section's failure probability allotted to this
    /// mechanism, within `(0, 1]`.
    pub probability_space: f64,
}

impl FailureMechanism {
    pub fn new(
        id: impl Into<EntityId>,
        length_effect_factor: f64,
        probability_space: f64,
    ) -> AssemblyResult<Self> {
        let mechanism = Self {
            id: id.into(),
            length_effect_factor,
            probability_space,
        };
        mechanism.validate()?;
        Ok(mechanism)
    }

    /// A mechanism with the whole probability space and no length effect.
    pub fn without_length_effect(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            length_effect_factor: 1.0,
            probability_space: 1.0,
        }
    }

    pub fn validate(&self) -> AssemblyResult<()> {
        let mut errors = ErrorCollector::new();
        if let Err(e) = validate_length_effect_factor(&self.id, self.length_effect_factor) {
            errors.extend(e);
        }
        let space = self.probability_space;
        if !(space.is_finite() && space > 0.0 && space <= 1.0) {
            errors.push(&self.id, ErrorKind::FailureProbabilitySpaceOutOfRange);
        }
        errors.finish()
    }
}

/// A length-effect factor is finite and at least 1.
pub fn validate_length_effect_factor(
    entity: impl Into<EntityId>,
    length_effect_factor: f64,
) -> AssemblyResult<()> {
    if length_effect_factor.is_finite() && length_effect_factor >= 1.0 {
        Ok(())
    } else {
        Err(crate::error::AssemblyErrors::single(
            entity,
            ErrorKind::LengthEffectFactorOutOfRange,
        ))
    }
}

/// Regulatory group of a failure mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MechanismGroup {
    Group1,
    Group2,
    Group3,
    Group4,
    Group5,
}

impl MechanismGroup {
    /// Groups 1 and 2 are assessed probabilistically.
    pub fn is_probabilistic(self) -> bool {
        matches!(self, MechanismGroup::Group1 | MechanismGroup::Group2)
    }

    /// Groups 3 and 4 contribute a direct category to the grade.
    pub fn is_direct(self) -> bool {
        matches!(self, MechanismGroup::Group3 | MechanismGroup::Group4)
    }

    /// Group 5 is reported but never enters the grade.
    pub fn is_reported_only(self) -> bool {
        self == MechanismGroup::Group5
    }
}

impl fmt::Display for MechanismGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            MechanismGroup::Group1 => 1,
            MechanismGroup::Group2 => 2,
            MechanismGroup::Group3 => 3,
            MechanismGroup::Group4 => 4,
            MechanismGroup::Group5 => 5,
        };
        write!(f, "group {n}")
    }
}

/// How a mechanism probability was obtained. Provenance only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssemblyMethod {
    /// Independent union of section probabilities.
    #[serde(rename = "BOI-1A-1")]
    Boi1A1,
    /// Section union bounded by `n` times the largest profile probability.
    #[serde(rename = "BOI-1A-2")]
    Boi1A2,
    /// Section union bounded by `1 - (1 - max profile)^n`.
    #[serde(rename = "BOI-1A-3")]
    Boi1A3,
    /// Independent union of group 1 and 2 mechanism probabilities.
    #[serde(rename = "BOI-2A-1")]
    Boi2A1,
    /// Probability supplied by the caller.
    #[serde(rename = "manual")]
    Manual,
}

impl fmt::Display for AssemblyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssemblyMethod::Boi1A1 => "BOI-1A-1",
            AssemblyMethod::Boi1A2 => "BOI-1A-2",
            AssemblyMethod::Boi1A3 => "BOI-1A-3",
            AssemblyMethod::Boi2A1 => "BOI-2A-1",
            AssemblyMethod::Manual => "manual",
        };
        f.write_str(s)
    }
}

/// Probability of one failure mechanism plus the method that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailureMechanismAssemblyResult {
    pub probability: Probability,
    pub method: AssemblyMethod,
}

impl FailureMechanismAssemblyResult {
    pub fn new(probability: Probability, method: AssemblyMethod) -> Self {
        Self {
            probability,
            method,
        }
    }

    /// A probability determined outside the assembly procedure.
    pub fn manual(probability: Probability) -> Self {
        Self::new(probability, AssemblyMethod::Manual)
    }
}
