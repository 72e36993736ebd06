//! Assembly of section results into one failure-mechanism probability.
//!
//! | method | input | result |
//! |---|---|---|
//! | BOI-1A-1 | section probabilities `pᵢ` | `1 − Π(1 − pᵢ)` |
//! | BOI-1A-2 | profile/section pairs | `min(1 − Π(1 − sᵢ), min(1, n · max rᵢ))` |
//! | BOI-1A-3 | profile/section pairs | `min(1 − Π(1 − sᵢ), 1 − (1 − max rᵢ)ⁿ)` |
//!
//! With partial assembly an undefined entry is skipped; without it the entry
//! is an error. Errors are reported per entry as `<id>/section[i]`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use floodgrade_prob::{
    model::validate_length_effect_factor, AssemblyErrors, AssemblyMethod, AssemblyResult,
    AssessmentSection, EntityId, ErrorCollector, ErrorKind, FailureMechanism,
    FailureMechanismAssemblyResult, MechanismCategory, Probability, SectionCategory,
};

use crate::limits::{mechanism_category_limits, section_category_limits};
use crate::section::{FailureMechanismSectionList, SectionResult, SectionResultKind};

/// Probability of a representative profile together with the probability of
/// the section it represents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultWithProfileAndSectionProbabilities {
    pub profile: Probability,
    pub section: Probability,
}

impl ResultWithProfileAndSectionProbabilities {
    pub fn new(profile: Probability, section: Probability) -> Self {
        Self { profile, section }
    }
}

/// Bound applied to the section union when a length effect is present.
#[derive(Debug, Clone, Copy)]
enum LengthEffectBound {
    /// `n · max profile`, capped at 1.
    Linear,
    /// `1 − (1 − max profile)ⁿ`.
    Exponent,
}

impl LengthEffectBound {
    fn method(self) -> AssemblyMethod {
        match self {
            LengthEffectBound::Linear => AssemblyMethod::Boi1A2,
            LengthEffectBound::Exponent => AssemblyMethod::Boi1A3,
        }
    }

    fn apply(self, max_profile: f64, n: f64) -> f64 {
        match self {
            LengthEffectBound::Linear => (n * max_profile).min(1.0),
            LengthEffectBound::Exponent => -(n * (-max_profile).ln_1p()).exp_m1(),
        }
    }
}

/// `1 − Π(1 − pᵢ)`, accumulated in log space.
pub(crate) fn independent_union(values: impl IntoIterator<Item = f64>) -> f64 {
    let log_survival: f64 = values.into_iter().map(|p| (-p).ln_1p()).sum();
    -log_survival.exp_m1()
}

fn entry_id(id: &EntityId, i: usize) -> EntityId {
    id.child(format_args!("section[{i}]"))
}

fn log_skipped(id: &EntityId, skipped: usize) {
    if skipped > 0 {
        warn!(
            entity = %id,
            skipped,
            "Partial assembly skipped undefined section results"
        );
    }
}

/// BOI-1A-1: independent union of section probabilities.
pub fn assemble_independent(
    id: impl Into<EntityId>,
    probabilities: &[Probability],
    partial: bool,
) -> AssemblyResult<FailureMechanismAssemblyResult> {
    let id = id.into();
    let mut errors = ErrorCollector::new();
    let mut values = Vec::with_capacity(probabilities.len());
    let mut skipped = 0;
    for (i, p) in probabilities.iter().enumerate() {
        match p.value() {
            Some(v) => values.push(v),
            None if partial => skipped += 1,
            None => errors.push(entry_id(&id, i), ErrorKind::UndefinedProbability),
        }
    }
    errors.finish()?;
    log_skipped(&id, skipped);
    if values.is_empty() {
        return Err(AssemblyErrors::single(id, ErrorKind::EmptyResultsList));
    }

    let probability = clamp_probability(&id, independent_union(values.iter().copied()))?;
    debug!(
        entity = %id,
        sections = values.len(),
        %probability,
        "Assembled mechanism probability (BOI-1A-1)"
    );
    Ok(FailureMechanismAssemblyResult::new(
        probability,
        AssemblyMethod::Boi1A1,
    ))
}

/// BOI-1A-2: section union bounded by `n` times the largest profile
/// probability.
pub fn assemble_with_length_effect(
    id: impl Into<EntityId>,
    length_effect_factor: f64,
    results: &[ResultWithProfileAndSectionProbabilities],
    partial: bool,
) -> AssemblyResult<FailureMechanismAssemblyResult> {
    assemble_bounded(
        id.into(),
        length_effect_factor,
        results,
        partial,
        LengthEffectBound::Linear,
    )
}

/// BOI-1A-3: section union bounded by the `n`-fold independent union of the
/// largest profile probability.
pub fn assemble_with_length_effect_exponent(
    id: impl Into<EntityId>,
    length_effect_factor: f64,
    results: &[ResultWithProfileAndSectionProbabilities],
    partial: bool,
) -> AssemblyResult<FailureMechanismAssemblyResult> {
    assemble_bounded(
        id.into(),
        length_effect_factor,
        results,
        partial,
        LengthEffectBound::Exponent,
    )
}

fn assemble_bounded(
    id: EntityId,
    n: f64,
    results: &[ResultWithProfileAndSectionProbabilities],
    partial: bool,
    bound: LengthEffectBound,
) -> AssemblyResult<FailureMechanismAssemblyResult> {
    let mut errors = ErrorCollector::new();
    errors.absorb(validate_length_effect_factor(&id, n));

    let mut pairs = Vec::with_capacity(results.len());
    let mut skipped = 0;
    for (i, r) in results.iter().enumerate() {
        match (r.profile.value(), r.section.value()) {
            (Some(profile), Some(section)) => {
                if profile > section {
                    errors.push(
                        entry_id(&id, i),
                        ErrorKind::ProfileProbabilityGreaterThanSectionProbability,
                    );
                }
                pairs.push((profile, section));
            }
            _ if partial => skipped += 1,
            _ => errors.push(entry_id(&id, i), ErrorKind::UndefinedProbability),
        }
    }
    errors.finish()?;
    log_skipped(&id, skipped);
    if pairs.is_empty() {
        return Err(AssemblyErrors::single(id, ErrorKind::EmptyResultsList));
    }

    let union = independent_union(pairs.iter().map(|(_, s)| *s));
    let max_profile = pairs.iter().map(|(p, _)| *p).fold(0.0, f64::max);
    let bounded = bound.apply(max_profile, n);
    let probability = clamp_probability(&id, union.min(bounded))?;
    debug!(
        entity = %id,
        sections = pairs.len(),
        length_effect_factor = n,
        union,
        bounded,
        %probability,
        "Assembled mechanism probability ({})",
        bound.method()
    );
    Ok(FailureMechanismAssemblyResult::new(probability, bound.method()))
}

/// Rounding in log space can leave a value a few ulps outside `[0, 1]`.
pub(crate) fn clamp_probability(id: &EntityId, value: f64) -> AssemblyResult<Probability> {
    Probability::new(value.clamp(0.0, 1.0)).map_err(|e| AssemblyErrors::from(e.at(id)))
}

/// Assemble a section list with the method its result kind calls for:
/// probabilities by BOI-1A-1, profile/section pairs by BOI-1A-2 with the
/// mechanism's length-effect factor. Category lists carry no probability and
/// are rejected.
pub fn assemble_section_list(
    list: &FailureMechanismSectionList,
    mechanism: &FailureMechanism,
    partial: bool,
) -> AssemblyResult<FailureMechanismAssemblyResult> {
    match list.result_kind() {
        SectionResultKind::Category => Err(AssemblyErrors::single(
            list.id(),
            ErrorKind::InputNotTheSameType,
        )),
        SectionResultKind::Probability => {
            let probabilities: Vec<Probability> = list
                .iter()
                .filter_map(|s| match s.result {
                    SectionResult::Probability { probability } => Some(probability),
                    _ => None,
                })
                .collect();
            assemble_independent(list.id(), &probabilities, partial)
        }
        SectionResultKind::ProfileAndSection => {
            let pairs: Vec<ResultWithProfileAndSectionProbabilities> = list
                .iter()
                .filter_map(|s| match s.result {
                    SectionResult::ProfileAndSection { profile, section } => Some(
                        ResultWithProfileAndSectionProbabilities::new(profile, section),
                    ),
                    _ => None,
                })
                .collect();
            assemble_with_length_effect(
                list.id(),
                mechanism.length_effect_factor,
                &pairs,
                partial,
            )
        }
    }
}

/// Section category of a section probability.
pub fn determine_section_category(
    probability: Probability,
    section: &AssessmentSection,
    mechanism: &FailureMechanism,
) -> AssemblyResult<SectionCategory> {
    section_category_limits(section, mechanism)?.classify(probability)
}

/// Mechanism category of an assembled mechanism probability.
pub fn determine_mechanism_category(
    result: &FailureMechanismAssemblyResult,
    section: &AssessmentSection,
    mechanism: &FailureMechanism,
) -> AssemblyResult<MechanismCategory> {
    mechanism_category_limits(section, mechanism)?.classify(result.probability)
}
