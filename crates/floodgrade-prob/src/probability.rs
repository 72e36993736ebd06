use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

use crate::error::{AssemblyError, EntityId, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProbabilityError {
    #[error("Probability {0} is outside [0, 1]")]
    OutOfRange(f64),
    #[error("Return period {0} is below 1 year")]
    ReturnPeriodOutOfRange(f64),
    #[error("Cannot order an undefined probability")]
    UndefinedComparison,
}

impl ProbabilityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbabilityError::OutOfRange(_) => ErrorKind::FailureProbabilityOutOfRange,
            ProbabilityError::ReturnPeriodOutOfRange(_) => ErrorKind::ReturnPeriodOutOfRange,
            ProbabilityError::UndefinedComparison => ErrorKind::UndefinedProbabilityComparison,
        }
    }

    /// Attach the entity the failing value belongs to.
    pub fn at(&self, entity: impl Into<EntityId>) -> AssemblyError {
        AssemblyError::new(entity, self.kind())
    }
}

/// A probability in `[0, 1]`, or explicitly undefined.
///
/// The undefined state is a separate variant, not a NaN payload, so it can
/// never leak out of floating-point arithmetic by accident. NaN is accepted
/// only at construction, where it is mapped to [`Probability::UNDEFINED`].
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Option<f64>", into = "Option<f64>")]
pub struct Probability(Option<f64>);

impl Probability {
    pub const UNDEFINED: Probability = Probability(None);
    pub const ZERO: Probability = Probability(Some(0.0));
    pub const ONE: Probability = Probability(Some(1.0));

    /// Construct a probability. NaN yields [`Probability::UNDEFINED`].
    pub fn new(value: f64) -> Result<Self, ProbabilityError> {
        if value.is_nan() {
            return Ok(Self::UNDEFINED);
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(ProbabilityError::OutOfRange(value));
        }
        Ok(Self(Some(value)))
    }

    /// Probability of an event with a return period of `years`, i.e. `1 / years`.
    pub fn from_return_period(years: f64) -> Result<Self, ProbabilityError> {
        if years.is_nan() || years < 1.0 {
            return Err(ProbabilityError::ReturnPeriodOutOfRange(years));
        }
        Ok(Self(Some(1.0 / years)))
    }

    pub fn is_defined(&self) -> bool {
        self.0.is_some()
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    /// The defined value, or an [`ErrorKind::UndefinedProbability`] error
    /// attributed to `entity`.
    pub fn require(&self, entity: impl Into<EntityId>) -> Result<f64, AssemblyError> {
        self.0
            .ok_or_else(|| AssemblyError::new(entity, ErrorKind::UndefinedProbability))
    }

    /// `1 - p`; undefined stays undefined.
    pub fn complement(&self) -> Probability {
        Probability(self.0.map(|p| 1.0 - p))
    }

    /// Total ordering for contexts that cannot accept an undefined operand.
    pub fn try_cmp(&self, other: &Probability) -> Result<Ordering, ProbabilityError> {
        self.partial_cmp(other)
            .ok_or(ProbabilityError::UndefinedComparison)
    }
}

impl PartialOrd for Probability {
    /// Undefined is incomparable with everything, itself included.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.0, other.0) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        }
    }
}

impl fmt::Debug for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) => write!(f, "Probability({p:e})"),
            None => f.write_str("Probability(undefined)"),
        }
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) if p > 0.0 && p < 1.0 => write!(f, "1/{:.0}", 1.0 / p),
            Some(p) => write!(f, "{p}"),
            None => f.write_str("undefined"),
        }
    }
}

impl TryFrom<f64> for Probability {
    type Error = ProbabilityError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Probability::new(value)
    }
}

impl TryFrom<Option<f64>> for Probability {
    type Error = ProbabilityError;

    fn try_from(value: Option<f64>) -> Result<Self, Self::Error> {
        match value {
            Some(v) => Probability::new(v),
            None => Ok(Probability::UNDEFINED),
        }
    }
}

impl From<Probability> for Option<f64> {
    fn from(value: Probability) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    #[test]
    fn new_accepts_unit_interval_bounds() {
        assert_eq!(Probability::new(0.0).unwrap(), Probability::ZERO);
        assert_eq!(Probability::new(1.0).unwrap(), Probability::ONE);
        assert_eq!(Probability::new(0.25).unwrap().value(), Some(0.25));
    }

    #[test]
    fn new_rejects_out_of_range() {
        assert_eq!(
            Probability::new(-0.1),
            Err(ProbabilityError::OutOfRange(-0.1))
        );
        assert_eq!(Probability::new(1.5), Err(ProbabilityError::OutOfRange(1.5)));
        assert!(Probability::new(f64::INFINITY).is_err());
    }

    #[test]
    fn nan_maps_to_undefined() {
        let p = Probability::new(f64::NAN).unwrap();
        assert!(!p.is_defined());
        assert_eq!(p, Probability::UNDEFINED);
    }

    #[test]
    fn return_period_is_reciprocal() {
        let p = Probability::from_return_period(1000.0).unwrap();
        assert!((p.value().unwrap() - 0.001).abs() < 1e-15);
        assert_eq!(
            Probability::from_return_period(0.5),
            Err(ProbabilityError::ReturnPeriodOutOfRange(0.5))
        );
    }

    #[test]
    fn out_of_range_error_maps_to_kind() {
        let err = Probability::new(2.0).unwrap_err().at("limit");
        assert_eq!(err.kind, ErrorKind::FailureProbabilityOutOfRange);
        assert_eq!(err.entity.as_str(), "limit");
    }

    // ---------------------------------------------------------------
    // Undefined handling
    // ---------------------------------------------------------------

    #[test]
    fn complement_propagates_undefined() {
        assert_eq!(Probability::UNDEFINED.complement(), Probability::UNDEFINED);
        assert_eq!(
            Probability::new(0.25).unwrap().complement().value(),
            Some(0.75)
        );
    }

    #[test]
    fn require_reports_undefined() {
        let err = Probability::UNDEFINED.require("section[0]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedProbability);
        assert_eq!(Probability::ONE.require("x").unwrap(), 1.0);
    }

    #[test]
    fn undefined_is_incomparable() {
        let p = Probability::new(0.5).unwrap();
        assert_eq!(p.partial_cmp(&Probability::UNDEFINED), None);
        assert!(!(p < Probability::UNDEFINED));
        assert!(!(p > Probability::UNDEFINED));
        assert_eq!(
            p.try_cmp(&Probability::UNDEFINED),
            Err(ProbabilityError::UndefinedComparison)
        );
        assert_eq!(
            ProbabilityError::UndefinedComparison.kind(),
            ErrorKind::UndefinedProbabilityComparison
        );
    }

    #[test]
    fn defined_values_are_totally_ordered() {
        let low = Probability::new(0.1).unwrap();
        let high = Probability::new(0.2).unwrap();
        assert_eq!(low.try_cmp(&high), Ok(Ordering::Less));
        assert!(high > low);
    }

    // ---------------------------------------------------------------
    // Formatting and serde
    // ---------------------------------------------------------------

    #[test]
    fn display_uses_return_period_notation() {
        assert_eq!(Probability::new(0.001).unwrap().to_string(), "1/1000");
        assert_eq!(Probability::ZERO.to_string(), "0");
        assert_eq!(Probability::UNDEFINED.to_string(), "undefined");
    }

    #[test]
    fn serde_maps_undefined_to_null() {
        let json = serde_json::to_string(&Probability::UNDEFINED).unwrap();
        assert_eq!(json, "null");
        let p: Probability = serde_json::from_str("0.5").unwrap();
        assert_eq!(p.value(), Some(0.5));
        let back: Probability = serde_json::from_str("null").unwrap();
        assert!(!back.is_defined());
    }

    #[test]
    fn serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<Probability>("1.5").is_err());
    }

    // ---------------------------------------------------------------
    // Proptest: property-based / randomized tests
    // ---------------------------------------------------------------

    use proptest::prelude::*;
    use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence, RngAlgorithm};

    fn probability_proptest_config() -> ProptestConfig {
        ProptestConfig {
            cases: 64,
            source_file: Some(file!()),
            failure_persistence: Some(Box::new(FileFailurePersistence::WithSource(
                "proptest-regressions",
            ))),
            rng_algorithm: RngAlgorithm::ChaCha,
            ..ProptestConfig::default()
        }
    }

    proptest! {
        #![proptest_config(probability_proptest_config())]

        /// Construction accepts exactly the unit interval.
        #[test]
        fn construction_matches_unit_interval(v in -2.0f64..2.0) {
            let result = Probability::new(v);
            prop_assert_eq!(result.is_ok(), (0.0..=1.0).contains(&v));
            if let Ok(p) = result {
                prop_assert_eq!(p.value(), Some(v));
            }
        }

        /// Ordering of defined values follows the underlying reals, and any
        /// undefined operand makes the pair incomparable.
        #[test]
        fn ordering_follows_values(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (pa, pb) = (Probability::new(a).unwrap(), Probability::new(b).unwrap());
            prop_assert_eq!(pa.try_cmp(&pb).ok(), a.partial_cmp(&b));
            prop_assert_eq!(pa.partial_cmp(&Probability::UNDEFINED), None);
            prop_assert_eq!(
                Probability::UNDEFINED.try_cmp(&pb),
                Err(ProbabilityError::UndefinedComparison)
            );
        }
    }
}
