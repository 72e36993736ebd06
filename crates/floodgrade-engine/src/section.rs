//! Sections along an assessment section and validated lists of them.

use serde::Serialize;
use std::fmt;

use floodgrade_prob::{
    AssemblyErrors, AssemblyResult, EntityId, ErrorCollector, ErrorKind, Probability,
    SectionCategory,
};

/// Offsets closer than this many meters are the same point.
pub const SECTION_TOLERANCE: f64 = 0.01;

/// Result attached to a section, tagged by shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionResult {
    /// A direct category judgement.
    Category { category: SectionCategory },
    /// A section failure probability.
    Probability { probability: Probability },
    /// Representative-profile probability plus the section probability that
    /// already includes the within-section length effect.
    ProfileAndSection {
        profile: Probability,
        section: Probability,
    },
}

/// Shape of a [`SectionResult`], without its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionResultKind {
    Category,
    Probability,
    ProfileAndSection,
}

impl SectionResult {
    pub fn category(category: SectionCategory) -> Self {
        SectionResult::Category { category }
    }

    pub fn probability(probability: Probability) -> Self {
        SectionResult::Probability { probability }
    }

    pub fn profile_and_section(profile: Probability, section: Probability) -> Self {
        SectionResult::ProfileAndSection { profile, section }
    }

    pub fn kind(&self) -> SectionResultKind {
        match self {
            SectionResult::Category { .. } => SectionResultKind::Category,
            SectionResult::Probability { .. } => SectionResultKind::Probability,
            SectionResult::ProfileAndSection { .. } => SectionResultKind::ProfileAndSection,
        }
    }

    /// False for a `NoResult` category or an undefined (section) probability.
    pub fn has_value(&self) -> bool {
        match self {
            SectionResult::Category { category } => *category != SectionCategory::NoResult,
            SectionResult::Probability { probability } => probability.is_defined(),
            SectionResult::ProfileAndSection { profile, section } => {
                profile.is_defined() && section.is_defined()
            }
        }
    }
}

impl fmt::Display for SectionResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SectionResultKind::Category => "category",
            SectionResultKind::Probability => "probability",
            SectionResultKind::ProfileAndSection => "profile and section probability",
        };
        f.write_str(s)
    }
}

/// Half-open interval `[start, end)` in meters with its result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FailureMechanismSection {
    pub start: f64,
    pub end: f64,
    pub result: SectionResult,
}

impl FailureMechanismSection {
    pub fn new(start: f64, end: f64, result: SectionResult) -> Self {
        Self { start, end, result }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        self.start + 0.5 * (self.end - self.start)
    }
}

impl fmt::Display for FailureMechanismSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.2}, {:.2})", self.start, self.end)
    }
}

/// Contiguous, validated sequence of sections starting at 0 m.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureMechanismSectionList {
    id: EntityId,
    sections: Vec<FailureMechanismSection>,
}

impl FailureMechanismSectionList {
    /// Validate with the default [`SECTION_TOLERANCE`].
    pub fn new(
        id: impl Into<EntityId>,
        sections: Vec<FailureMechanismSection>,
    ) -> AssemblyResult<Self> {
        Self::with_tolerance(id, sections, SECTION_TOLERANCE)
    }

    /// Validate the list, reporting every violation found. `tolerance` must
    /// be finite and positive.
    pub fn with_tolerance(
        id: impl Into<EntityId>,
        sections: Vec<FailureMechanismSection>,
        tolerance: f64,
    ) -> AssemblyResult<Self> {
        let id = id.into();
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(AssemblyErrors::single(
                id.child("section tolerance"),
                ErrorKind::SectionToleranceOutOfRange,
            ));
        }
        if sections.is_empty() {
            return Err(AssemblyErrors::single(id, ErrorKind::EmptyResultsList));
        }

        let mut errors = ErrorCollector::new();
        if (sections[0].start).abs() > tolerance {
            errors.push(&id, ErrorKind::CommonFailureMechanismSectionsInvalid);
        }

        let kind = sections[0].result.kind();
        for (i, section) in sections.iter().enumerate() {
            let section_id = id.child(format_args!("section[{i}]"));
            if !(section.start.is_finite() && section.end.is_finite())
                || section.end <= section.start
            {
                errors.push(&section_id, ErrorKind::SectionLengthOutOfRange);
            }
            if section.result.kind() != kind {
                errors.push(&section_id, ErrorKind::InputNotTheSameType);
            }
        }

        // Section ends strictly ascend.
        for (i, pair) in sections.windows(2).enumerate() {
            if (pair[1].start - pair[0].end).abs() > tolerance || pair[1].end <= pair[0].end {
                errors.push(
                    id.child(format_args!("section[{}]", i + 1)),
                    ErrorKind::CommonFailureMechanismSectionsNotConsecutive,
                );
            }
        }

        errors.finish_with(Self { id, sections })
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn sections(&self) -> &[FailureMechanismSection] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always false: construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FailureMechanismSection> {
        self.sections.iter()
    }

    /// Result kind shared by every section of the list.
    pub fn result_kind(&self) -> SectionResultKind {
        self.sections[0].result.kind()
    }

    /// End of the last section.
    pub fn total_length(&self) -> f64 {
        self.sections[self.sections.len() - 1].end
    }

    /// Section containing `point`.
    ///
    /// A point exactly on a cut belongs to the following section; the end of
    /// the list belongs to the last section. Points further than `tolerance`
    /// outside `[0, total_length]` are rejected.
    pub fn section_at_point(
        &self,
        point: f64,
        tolerance: f64,
    ) -> AssemblyResult<&FailureMechanismSection> {
        self.index_at_point(point, tolerance)
            .map(|i| &self.sections[i])
    }

    pub(crate) fn index_at_point(&self, point: f64, tolerance: f64) -> AssemblyResult<usize> {
        if !point.is_finite() || point < -tolerance || point > self.total_length() + tolerance {
            return Err(AssemblyErrors::single(
                self.id.child(format_args!("point {point:.2}")),
                ErrorKind::RequestedPointOutOfRange,
            ));
        }
        let idx = self.sections.partition_point(|s| s.end <= point);
        Ok(idx.min(self.sections.len() - 1))
    }
}

impl<'a> IntoIterator for &'a FailureMechanismSectionList {
    type Item = &'a FailureMechanismSection;
    type IntoIter = std::slice::Iter<'a, FailureMechanismSection>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
