use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of an assembly failure.
///
/// Every kind is caused by invalid input. None of them is transient, so a
/// caller fixes the input and re-invokes rather than retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    // Range violations.
    LengthEffectFactorOutOfRange,
    SectionLengthOutOfRange,
    FailureProbabilityOutOfRange,
    UndefinedProbability,
    UndefinedProbabilityComparison,
    SignalingLimitAboveLowerLimit,
    FailureProbabilitySpaceOutOfRange,
    ReturnPeriodOutOfRange,
    SectionToleranceOutOfRange,

    // Structural violations.
    CommonFailureMechanismSectionsInvalid,
    CommonFailureMechanismSectionsNotConsecutive,
    InputNotTheSameType,
    UnequalCommonFailureMechanismSectionLists,

    // Sequencing and classification violations.
    InvalidCategoryValue,
    InvalidCategoryLimits,
    SectionsWithoutCategory,
    CommonSectionsWithoutCategoryValues,
    ProfileProbabilityGreaterThanSectionProbability,
    RequestedPointOutOfRange,
    MechanismWithoutResult,

    // Input contract violations.
    EmptyResultsList,
    InvalidConfiguration,
}

impl ErrorKind {
    /// Stable diagnostic code, e.g. `floodgrade::empty_results_list`.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::LengthEffectFactorOutOfRange => "floodgrade::length_effect_factor_out_of_range",
            ErrorKind::SectionLengthOutOfRange => "floodgrade::section_length_out_of_range",
            ErrorKind::FailureProbabilityOutOfRange => "floodgrade::failure_probability_out_of_range",
            ErrorKind::UndefinedProbability => "floodgrade::undefined_probability",
            ErrorKind::UndefinedProbabilityComparison => {
                "floodgrade::undefined_probability_comparison"
            }
            ErrorKind::SignalingLimitAboveLowerLimit => "floodgrade::signaling_limit_above_lower_limit",
            ErrorKind::FailureProbabilitySpaceOutOfRange => {
                "floodgrade::failure_probability_space_out_of_range"
            }
            ErrorKind::ReturnPeriodOutOfRange => "floodgrade::return_period_out_of_range",
            ErrorKind::SectionToleranceOutOfRange => "floodgrade::section_tolerance_out_of_range",
            ErrorKind::CommonFailureMechanismSectionsInvalid => {
                "floodgrade::common_failure_mechanism_sections_invalid"
            }
            ErrorKind::CommonFailureMechanismSectionsNotConsecutive => {
                "floodgrade::common_failure_mechanism_sections_not_consecutive"
            }
            ErrorKind::InputNotTheSameType => "floodgrade::input_not_the_same_type",
            ErrorKind::UnequalCommonFailureMechanismSectionLists => {
                "floodgrade::unequal_common_failure_mechanism_section_lists"
            }
            ErrorKind::InvalidCategoryValue => "floodgrade::invalid_category_value",
            ErrorKind::InvalidCategoryLimits => "floodgrade::invalid_category_limits",
            ErrorKind::SectionsWithoutCategory => "floodgrade::sections_without_category",
            ErrorKind::CommonSectionsWithoutCategoryValues => {
                "floodgrade::common_sections_without_category_values"
            }
            ErrorKind::ProfileProbabilityGreaterThanSectionProbability => {
                "floodgrade::profile_probability_greater_than_section_probability"
            }
            ErrorKind::RequestedPointOutOfRange => "floodgrade::requested_point_out_of_range",
            ErrorKind::MechanismWithoutResult => "floodgrade::mechanism_without_result",
            ErrorKind::EmptyResultsList => "floodgrade::empty_results_list",
            ErrorKind::InvalidConfiguration => "floodgrade::invalid_configuration",
        }
    }

    fn message(self) -> &'static str {
        match self {
            ErrorKind::LengthEffectFactorOutOfRange => "length-effect factor must be at least 1",
            ErrorKind::SectionLengthOutOfRange => "section end must lie beyond its start",
            ErrorKind::FailureProbabilityOutOfRange => "probability must lie within [0, 1]",
            ErrorKind::UndefinedProbability => "probability is undefined",
            ErrorKind::UndefinedProbabilityComparison => {
                "an undefined probability cannot be ordered against another probability"
            }
            ErrorKind::SignalingLimitAboveLowerLimit => {
                "signaling limit exceeds the lower limit"
            }
            ErrorKind::FailureProbabilitySpaceOutOfRange => {
                "failure probability space must lie within (0, 1]"
            }
            ErrorKind::ReturnPeriodOutOfRange => "return period must be at least 1 year",
            ErrorKind::SectionToleranceOutOfRange => {
                "section tolerance must be a positive, finite length"
            }
            ErrorKind::CommonFailureMechanismSectionsInvalid => {
                "section list does not start at 0 m"
            }
            ErrorKind::CommonFailureMechanismSectionsNotConsecutive => {
                "sections are not consecutive"
            }
            ErrorKind::InputNotTheSameType => "results are not of the same type",
            ErrorKind::UnequalCommonFailureMechanismSectionLists => {
                "section lists do not cover the same length"
            }
            ErrorKind::InvalidCategoryValue => "category is not valid in this context",
            ErrorKind::InvalidCategoryLimits => {
                "category limits do not form a gapless cover of [0, 1]"
            }
            ErrorKind::SectionsWithoutCategory => "no section covers this interval",
            ErrorKind::CommonSectionsWithoutCategoryValues => {
                "common section has a covering section without a result"
            }
            ErrorKind::ProfileProbabilityGreaterThanSectionProbability => {
                "profile probability exceeds section probability"
            }
            ErrorKind::RequestedPointOutOfRange => "requested point lies outside the section list",
            ErrorKind::MechanismWithoutResult => "failure mechanism has no result",
            ErrorKind::EmptyResultsList => "no results to assemble",
            ErrorKind::InvalidConfiguration => "invalid assembly configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Identifier of the entity an error refers to (a mechanism, a section, a
/// list entry, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Child id, e.g. `dike/section[3]`.
    pub fn child(&self, part: impl fmt::Display) -> Self {
        Self(format!("{}/{part}", self.0))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&EntityId> for EntityId {
    fn from(value: &EntityId) -> Self {
        value.clone()
    }
}

/// A single structured error: which entity, and what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{entity}: {kind}")]
pub struct AssemblyError {
    pub entity: EntityId,
    pub kind: ErrorKind,
}

impl AssemblyError {
    pub fn new(entity: impl Into<EntityId>, kind: ErrorKind) -> Self {
        Self {
            entity: entity.into(),
            kind,
        }
    }
}

impl Diagnostic for AssemblyError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }
}

/// Non-empty, ordered collection of every violation found in one validation
/// pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", format_assembly_errors(.errors))]
pub struct AssemblyErrors {
    errors: Vec<AssemblyError>,
}

fn format_assembly_errors(errors: &[AssemblyError]) -> String {
    if errors.len() == 1 {
        return errors[0].to_string();
    }
    let mut s = format!("{} assembly errors:\n", errors.len());
    for (i, e) in errors.iter().enumerate() {
        s.push_str(&format!("  {}. {}\n", i + 1, e));
    }
    s
}

impl Diagnostic for AssemblyErrors {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        if self.errors.len() == 1 {
            Some(Box::new(self.errors[0].kind.code()))
        } else {
            Some(Box::new("floodgrade::multiple"))
        }
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        if self.errors.len() == 1 {
            return None;
        }
        Some(Box::new(self.errors.iter().map(|e| e as &dyn Diagnostic)))
    }
}

impl AssemblyErrors {
    pub fn single(entity: impl Into<EntityId>, kind: ErrorKind) -> Self {
        Self {
            errors: vec![AssemblyError::new(entity, kind)],
        }
    }

    /// Returns `None` when `errors` is empty.
    pub fn from_vec(errors: Vec<AssemblyError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn errors(&self) -> &[AssemblyError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssemblyError> {
        self.errors.iter()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        self.errors.iter().map(|e| e.kind)
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.kinds().any(|k| k == kind)
    }

    pub fn into_vec(self) -> Vec<AssemblyError> {
        self.errors
    }
}

impl From<AssemblyError> for AssemblyErrors {
    fn from(error: AssemblyError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for AssemblyErrors {
    type Item = AssemblyError;
    type IntoIter = std::vec::IntoIter<AssemblyError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a AssemblyErrors {
    type Item = &'a AssemblyError;
    type IntoIter = std::slice::Iter<'a, AssemblyError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

pub type AssemblyResult<T> = Result<T, AssemblyErrors>;

/// Accumulates errors during a validation pass instead of failing on the
/// first one.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<AssemblyError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: impl Into<EntityId>, kind: ErrorKind) {
        self.errors.push(AssemblyError::new(entity, kind));
    }

    pub fn push_error(&mut self, error: AssemblyError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: AssemblyErrors) {
        self.errors.extend(errors);
    }

    /// Keep the value of a successful result, record the errors of a failed
    /// one.
    pub fn absorb<T, E>(&mut self, result: Result<T, E>) -> Option<T>
    where
        E: Into<AssemblyErrors>,
    {
        match result {
            Ok(value) => Some(value),
            Err(errors) => {
                self.extend(errors.into());
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn finish(self) -> AssemblyResult<()> {
        self.finish_with(())
    }

    pub fn finish_with<T>(self, value: T) -> AssemblyResult<T> {
        match AssemblyErrors::from_vec(self.errors) {
            None => Ok(value),
            Some(errors) => Err(errors),
        }
    }
}
