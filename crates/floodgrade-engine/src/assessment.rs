//! Assembly of failure-mechanism results into the grade of an assessment
//! section.
//!
//! Mechanisms are partitioned by [`MechanismGroup`]:
//!
//! - groups 1 and 2 carry probabilities, combined by independent union
//!   (BOI-2A-1) and classified against the assessment grade limits;
//! - groups 3 and 4 carry direct categories; the worst one maps onto a grade;
//! - group 5 is reported alongside and never affects the grade.
//!
//! The final grade is the more severe of the probabilistic and direct grades.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use floodgrade_prob::{
    AssemblyErrors, AssemblyMethod, AssemblyResult, AssessmentGrade, AssessmentSection, EntityId,
    ErrorCollector, ErrorKind, FailureMechanismAssemblyResult, MechanismCategory, MechanismGroup,
    RankedCategory,
};

use crate::limits::assessment_grade_limits;
use crate::mechanism::{clamp_probability, independent_union};

/// Result of one mechanism, tagged by how it was assessed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MechanismResult {
    Probabilistic(FailureMechanismAssemblyResult),
    Direct { category: MechanismCategory },
}

/// A mechanism's group membership and result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanismAssessment {
    pub id: EntityId,
    pub group: MechanismGroup,
    pub result: MechanismResult,
}

impl MechanismAssessment {
    pub fn probabilistic(
        id: impl Into<EntityId>,
        group: MechanismGroup,
        result: FailureMechanismAssemblyResult,
    ) -> Self {
        Self {
            id: id.into(),
            group,
            result: MechanismResult::Probabilistic(result),
        }
    }

    pub fn direct(id: impl Into<EntityId>, group: MechanismGroup, category: MechanismCategory) -> Self {
        Self {
            id: id.into(),
            group,
            result: MechanismResult::Direct { category },
        }
    }
}

/// Grade of an assessment section with the partial outcomes it was derived
/// from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyAssessmentResult {
    pub grade: AssessmentGrade,
    /// Combined probability of groups 1 and 2, if any contributed.
    pub probability: Option<FailureMechanismAssemblyResult>,
    pub probabilistic_grade: Option<AssessmentGrade>,
    pub direct_grade: Option<AssessmentGrade>,
    /// Worst ranked category among group 5 mechanisms.
    pub group5_category: Option<MechanismCategory>,
    /// Mechanism ids per group, in input order.
    pub mechanisms: IndexMap<MechanismGroup, Vec<EntityId>>,
}

/// Current and previous assessment of the same section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalAssessmentResult {
    pub current: SafetyAssessmentResult,
    pub previous: SafetyAssessmentResult,
}

fn worst_of<T: RankedCategory>(current: Option<T>, next: T) -> Option<T> {
    Some(current.map_or(next, |c| c.worst(next)))
}

/// Fold mechanism results into the section grade.
pub fn assemble_safety_assessment(
    section: &AssessmentSection,
    mechanisms: &[MechanismAssessment],
    partial: bool,
) -> AssemblyResult<SafetyAssessmentResult> {
    if mechanisms.is_empty() {
        return Err(AssemblyErrors::single(
            "mechanisms",
            ErrorKind::EmptyResultsList,
        ));
    }

    let mut errors = ErrorCollector::new();
    let grade_limits = errors.absorb(assessment_grade_limits(section));

    let mut listing: IndexMap<MechanismGroup, Vec<EntityId>> = IndexMap::new();
    let mut probabilities = Vec::new();
    let mut direct: Option<MechanismCategory> = None;
    let mut group5: Option<MechanismCategory> = None;
    let mut skipped = 0;

    for m in mechanisms {
        listing.entry(m.group).or_default().push(m.id.clone());
        match (m.group, m.result) {
            (MechanismGroup::Group1 | MechanismGroup::Group2, MechanismResult::Probabilistic(r)) => {
                match r.probability.value() {
                    Some(p) => probabilities.push(p),
                    None if partial => skipped += 1,
                    None => errors.push(&m.id, ErrorKind::UndefinedProbability),
                }
            }
            (MechanismGroup::Group3 | MechanismGroup::Group4, MechanismResult::Direct { category }) => {
                match category {
                    MechanismCategory::NotApplicable => {}
                    MechanismCategory::NoResult if partial => skipped += 1,
                    MechanismCategory::NoResult => {
                        errors.push(&m.id, ErrorKind::MechanismWithoutResult)
                    }
                    ranked => direct = worst_of(direct, ranked),
                }
            }
            (MechanismGroup::Group5, MechanismResult::Direct { category }) => {
                if category.is_ranked() {
                    group5 = worst_of(group5, category);
                }
            }
            _ => errors.push(&m.id, ErrorKind::InvalidCategoryValue),
        }
    }
    errors.finish()?;
    if skipped > 0 {
        warn!(skipped, "Partial assembly skipped mechanisms without a result");
    }

    let probability = if probabilities.is_empty() {
        None
    } else {
        let union = independent_union(probabilities.iter().copied());
        Some(FailureMechanismAssemblyResult::new(
            clamp_probability(&EntityId::new("mechanisms"), union)?,
            AssemblyMethod::Boi2A1,
        ))
    };

    let probabilistic_grade = match (probability, &grade_limits) {
        (Some(r), Some(limits)) => Some(limits.classify(r.probability)?),
        _ => None,
    };
    let direct_grade = direct.and_then(MechanismCategory::to_grade);

    let grade = match (probabilistic_grade, direct_grade) {
        (Some(a), Some(b)) => a.worst(b),
        (Some(g), None) | (None, Some(g)) => g,
        (None, None) => {
            return Err(AssemblyErrors::single(
                "mechanisms",
                ErrorKind::EmptyResultsList,
            ))
        }
    };

    debug!(
        mechanisms = mechanisms.len(),
        probabilistic = probabilities.len(),
        ?probabilistic_grade,
        ?direct_grade,
        %grade,
        "Assembled safety assessment"
    );
    Ok(SafetyAssessmentResult {
        grade,
        probability,
        probabilistic_grade,
        direct_grade,
        group5_category: group5,
        mechanisms: listing,
    })
}

/// Assemble the current and a previous set of mechanism results against the
/// same section limits. Errors of both runs are reported together.
pub fn assemble_with_previous(
    section: &AssessmentSection,
    current: &[MechanismAssessment],
    previous: &[MechanismAssessment],
    partial: bool,
) -> AssemblyResult<TemporalAssessmentResult> {
    let mut errors = ErrorCollector::new();
    let current = errors.absorb(assemble_safety_assessment(section, current, partial));
    let previous = errors.absorb(assemble_safety_assessment(section, previous, partial));
    match (current, previous) {
        (Some(current), Some(previous)) => Ok(TemporalAssessmentResult { current, previous }),
        _ => Err(errors
            .finish()
            .err()
            .unwrap_or_else(|| AssemblyErrors::single("mechanisms", ErrorKind::EmptyResultsList))),
    }
}
