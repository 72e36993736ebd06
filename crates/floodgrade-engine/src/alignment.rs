//! Alignment of differently partitioned section lists onto their finest
//! common partition.
//!
//! The procedure has three steps, each available on its own:
//!
//! 1. [`SectionListAligner::common_sections`] merges the breakpoints of all
//!    lists into one partition, collapsing breakpoints that lie within the
//!    tolerance of each other.
//! 2. [`SectionListAligner::translate`] projects one list onto that
//!    partition.
//! 3. [`SectionListAligner::combine_worst`] folds the projected results of
//!    all lists into the most severe result per common section.
//!
//! [`SectionListAligner::align`] exposes the intermediate form: every common
//! section with the results of all lists, in input order.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use floodgrade_prob::{
    AssemblyErrors, AssemblyResult, EntityId, ErrorCollector, ErrorKind, Probability,
    RankedCategory, SectionCategory,
};

use crate::section::{
    FailureMechanismSection, FailureMechanismSectionList, SectionResult, SectionResultKind,
    SECTION_TOLERANCE,
};

/// Interval of the common partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CommonSection {
    pub start: f64,
    pub end: f64,
}

impl CommonSection {
    pub fn midpoint(&self) -> f64 {
        self.start + 0.5 * (self.end - self.start)
    }
}

impl fmt::Display for CommonSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "common section [{:.2}, {:.2})", self.start, self.end)
    }
}

/// A common section with the covering result of every input list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSection {
    pub start: f64,
    pub end: f64,
    /// One result per input list, in input order.
    pub results: Vec<SectionResult>,
}

/// Merges section lists covering the same length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectionListAligner {
    tolerance: f64,
}

impl Default for SectionListAligner {
    fn default() -> Self {
        Self {
            tolerance: SECTION_TOLERANCE,
        }
    }
}

/// Forward-only position in a section list. Lookups must be issued at
/// non-decreasing points, which keeps a full sweep linear.
struct SectionCursor<'a> {
    sections: &'a [FailureMechanismSection],
    idx: usize,
}

impl<'a> SectionCursor<'a> {
    fn new(list: &'a FailureMechanismSectionList) -> Self {
        Self {
            sections: list.sections(),
            idx: 0,
        }
    }

    fn seek(&mut self, point: f64, tolerance: f64) -> Option<&'a FailureMechanismSection> {
        while self.idx + 1 < self.sections.len() && self.sections[self.idx].end <= point {
            self.idx += 1;
        }
        let section = &self.sections[self.idx];
        let covered = point >= section.start - tolerance && point <= section.end + tolerance;
        covered.then_some(section)
    }
}

impl SectionListAligner {
    pub fn new(tolerance: f64) -> AssemblyResult<Self> {
        if tolerance.is_finite() && tolerance > 0.0 {
            Ok(Self { tolerance })
        } else {
            Err(AssemblyErrors::single(
                "section tolerance",
                ErrorKind::SectionToleranceOutOfRange,
            ))
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// All lists present and of equal total length.
    fn check_lists(&self, lists: &[FailureMechanismSectionList]) -> AssemblyResult<()> {
        if lists.is_empty() {
            return Err(AssemblyErrors::single(
                "section lists",
                ErrorKind::EmptyResultsList,
            ));
        }
        let shortest = lists
            .iter()
            .map(|l| l.total_length())
            .fold(f64::INFINITY, f64::min);
        let mut errors = ErrorCollector::new();
        for list in lists {
            if list.total_length() - shortest > self.tolerance {
                errors.push(
                    list.id(),
                    ErrorKind::UnequalCommonFailureMechanismSectionLists,
                );
            }
        }
        errors.finish()
    }

    /// Finest common partition of all lists.
    ///
    /// Breakpoints are sorted and a breakpoint within the tolerance of the
    /// previously kept one is dropped, so every common section is longer than
    /// the tolerance and the result does not depend on the order of `lists`.
    pub fn common_sections(
        &self,
        lists: &[FailureMechanismSectionList],
    ) -> AssemblyResult<Vec<CommonSection>> {
        self.check_lists(lists)?;

        let mut offsets: Vec<f64> = lists
            .iter()
            .flat_map(|l| l.iter().flat_map(|s| [s.start, s.end]))
            .collect();
        offsets.sort_by(f64::total_cmp);

        let mut breakpoints = vec![0.0];
        for offset in offsets {
            let last = breakpoints[breakpoints.len() - 1];
            if offset - last > self.tolerance {
                breakpoints.push(offset);
            }
        }

        let common: Vec<CommonSection> = breakpoints
            .windows(2)
            .map(|pair| CommonSection {
                start: pair[0],
                end: pair[1],
            })
            .collect();
        if common.is_empty() {
            // Every list is shorter than the tolerance.
            return Err(AssemblyErrors::single(
                "section lists",
                ErrorKind::SectionLengthOutOfRange,
            ));
        }
        debug!(
            lists = lists.len(),
            common_sections = common.len(),
            "Determined common sections"
        );
        Ok(common)
    }

    /// Project `list` onto the `common` partition.
    pub fn translate(
        &self,
        list: &FailureMechanismSectionList,
        common: &[CommonSection],
    ) -> AssemblyResult<FailureMechanismSectionList> {
        let Some(last) = common.last() else {
            return Err(AssemblyErrors::single(
                "common sections",
                ErrorKind::EmptyResultsList,
            ));
        };
        if (last.end - list.total_length()).abs() > self.tolerance {
            return Err(AssemblyErrors::single(
                list.id(),
                ErrorKind::UnequalCommonFailureMechanismSectionLists,
            ));
        }

        let mut errors = ErrorCollector::new();
        let mut cursor = SectionCursor::new(list);
        let mut sections = Vec::with_capacity(common.len());
        for c in common {
            match cursor.seek(c.midpoint(), self.tolerance) {
                Some(source) => {
                    sections.push(FailureMechanismSection::new(c.start, c.end, source.result))
                }
                None => errors.push(list.id().child(c), ErrorKind::SectionsWithoutCategory),
            }
        }
        errors.finish()?;
        FailureMechanismSectionList::with_tolerance(list.id(), sections, self.tolerance)
    }

    /// Every common section with the covering result of each list.
    pub fn align(
        &self,
        lists: &[FailureMechanismSectionList],
    ) -> AssemblyResult<Vec<AlignedSection>> {
        let common = self.common_sections(lists)?;
        let mut cursors: Vec<SectionCursor<'_>> = lists.iter().map(SectionCursor::new).collect();

        let mut errors = ErrorCollector::new();
        let mut aligned = Vec::with_capacity(common.len());
        for c in &common {
            let mid = c.midpoint();
            let mut results = Vec::with_capacity(lists.len());
            for (list, cursor) in lists.iter().zip(cursors.iter_mut()) {
                match cursor.seek(mid, self.tolerance) {
                    Some(source) => results.push(source.result),
                    None => errors.push(list.id().child(c), ErrorKind::SectionsWithoutCategory),
                }
            }
            aligned.push(AlignedSection {
                start: c.start,
                end: c.end,
                results,
            });
        }
        errors.finish_with(aligned)
    }

    /// Most severe result per common section.
    ///
    /// Categories combine by rank, probabilities by maximum, and
    /// profile/section pairs by the larger section probability. A covering
    /// section without a value is skipped when `partial` is set and rejected
    /// otherwise; a common section left without any value gets the "no value"
    /// result of its kind. Lists of different result kinds are rejected.
    pub fn combine_worst(
        &self,
        lists: &[FailureMechanismSectionList],
        partial: bool,
    ) -> AssemblyResult<FailureMechanismSectionList> {
        let aligned = self.align(lists)?;
        let kind = lists[0].result_kind();
        let mut errors = ErrorCollector::new();
        for list in &lists[1..] {
            if list.result_kind() != kind {
                errors.push(list.id(), ErrorKind::InputNotTheSameType);
            }
        }
        errors.finish()?;

        let entity = EntityId::new("combined sections");
        let mut errors = ErrorCollector::new();
        let mut sections = Vec::with_capacity(aligned.len());
        for section in &aligned {
            let id = entity.child(CommonSection {
                start: section.start,
                end: section.end,
            });
            let mut worst: Option<SectionResult> = None;
            let mut missing = false;
            for result in &section.results {
                if !result.has_value() {
                    missing = !partial;
                    continue;
                }
                worst = Some(match worst {
                    None => *result,
                    Some(current) => more_severe(current, *result),
                });
            }
            if missing {
                errors.push(id, ErrorKind::CommonSectionsWithoutCategoryValues);
                continue;
            }
            let result = worst.unwrap_or_else(|| no_value(kind));
            sections.push(FailureMechanismSection::new(section.start, section.end, result));
        }
        errors.finish()?;

        debug!(
            lists = lists.len(),
            sections = sections.len(),
            partial,
            "Combined section lists"
        );
        FailureMechanismSectionList::with_tolerance(entity, sections, self.tolerance)
    }
}

/// The more severe of two results of the same kind; ties keep the first.
fn more_severe(a: SectionResult, b: SectionResult) -> SectionResult {
    match (a, b) {
        (SectionResult::Category { category: x }, SectionResult::Category { category: y }) => {
            SectionResult::category(x.worst(y))
        }
        (
            SectionResult::Probability { probability: x },
            SectionResult::Probability { probability: y },
        ) => {
            if y > x {
                b
            } else {
                a
            }
        }
        (
            SectionResult::ProfileAndSection {
                profile: xp,
                section: xs,
            },
            SectionResult::ProfileAndSection {
                profile: yp,
                section: ys,
            },
        ) => {
            if ys > xs || (ys == xs && yp > xp) {
                b
            } else {
                a
            }
        }
        // Callers reject lists of different kinds before combining.
        _ => a,
    }
}

fn no_value(kind: SectionResultKind) -> SectionResult {
    match kind {
        SectionResultKind::Category => SectionResult::category(SectionCategory::NoResult),
        SectionResultKind::Probability => SectionResult::probability(Probability::UNDEFINED),
        SectionResultKind::ProfileAndSection => {
            SectionResult::profile_and_section(Probability::UNDEFINED, Probability::UNDEFINED)
        }
    }
}
