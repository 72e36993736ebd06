//! Category enumerations, ordered by increasing severity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A category enumeration whose ranked members span probability intervals.
///
/// `RANKED` lists those members safest first. Members absent from `RANKED`
/// (markers such as "no result") carry no severity and are never the outcome
/// of a classification.
pub trait RankedCategory: Copy + Eq + fmt::Debug + fmt::Display + 'static {
    const RANKED: &'static [Self];

    /// Zero-based severity rank, `None` for unranked markers.
    fn rank(self) -> Option<usize> {
        Self::RANKED.iter().position(|c| *c == self)
    }

    fn is_ranked(self) -> bool {
        self.rank().is_some()
    }

    /// The more severe of two ranked categories. An unranked operand yields
    /// the other one.
    fn worst(self, other: Self) -> Self {
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) if b > a => other,
            (None, Some(_)) => other,
            _ => self,
        }
    }
}

/// Section-level category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionCategory {
    Iv,
    IIv,
    IIIv,
    IVv,
    Vv,
    VIv,
    VIIv,
    /// No judgement available for the section yet.
    NoResult,
}

impl RankedCategory for SectionCategory {
    const RANKED: &'static [Self] = &[
        SectionCategory::Iv,
        SectionCategory::IIv,
        SectionCategory::IIIv,
        SectionCategory::IVv,
        SectionCategory::Vv,
        SectionCategory::VIv,
        SectionCategory::VIIv,
    ];
}

impl fmt::Display for SectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SectionCategory::Iv => "Iv",
            SectionCategory::IIv => "IIv",
            SectionCategory::IIIv => "IIIv",
            SectionCategory::IVv => "IVv",
            SectionCategory::Vv => "Vv",
            SectionCategory::VIv => "VIv",
            SectionCategory::VIIv => "VIIv",
            SectionCategory::NoResult => "no result",
        };
        f.write_str(s)
    }
}

/// Mechanism-level category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MechanismCategory {
    It,
    IIt,
    IIIt,
    IVt,
    Vt,
    /// The mechanism is not relevant for this assessment section.
    NotApplicable,
    /// No judgement available for the mechanism yet.
    NoResult,
}

impl RankedCategory for MechanismCategory {
    const RANKED: &'static [Self] = &[
        MechanismCategory::It,
        MechanismCategory::IIt,
        MechanismCategory::IIIt,
        MechanismCategory::IVt,
        MechanismCategory::Vt,
    ];
}

impl MechanismCategory {
    /// Grade equivalent of a ranked mechanism category.
    pub fn to_grade(self) -> Option<AssessmentGrade> {
        match self {
            MechanismCategory::It => Some(AssessmentGrade::APlus),
            MechanismCategory::IIt => Some(AssessmentGrade::A),
            MechanismCategory::IIIt => Some(AssessmentGrade::B),
            MechanismCategory::IVt => Some(AssessmentGrade::C),
            MechanismCategory::Vt => Some(AssessmentGrade::D),
            MechanismCategory::NotApplicable | MechanismCategory::NoResult => None,
        }
    }
}

impl fmt::Display for MechanismCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MechanismCategory::It => "It",
            MechanismCategory::IIt => "IIt",
            MechanismCategory::IIIt => "IIIt",
            MechanismCategory::IVt => "IVt",
            MechanismCategory::Vt => "Vt",
            MechanismCategory::NotApplicable => "not applicable",
            MechanismCategory::NoResult => "no result",
        };
        f.write_str(s)
    }
}

/// Safety grade of a whole assessment section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssessmentGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl RankedCategory for AssessmentGrade {
    const RANKED: &'static [Self] = &[
        AssessmentGrade::APlus,
        AssessmentGrade::A,
        AssessmentGrade::B,
        AssessmentGrade::C,
        AssessmentGrade::D,
    ];
}

impl fmt::Display for AssessmentGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssessmentGrade::APlus => "A+",
            AssessmentGrade::A => "A",
            AssessmentGrade::B => "B",
            AssessmentGrade::C => "C",
            AssessmentGrade::D => "D",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_categories_rank_in_declaration_order() {
        assert_eq!(SectionCategory::Iv.rank(), Some(0));
        assert_eq!(SectionCategory::VIIv.rank(), Some(6));
        assert_eq!(SectionCategory::NoResult.rank(), None);
        assert_eq!(SectionCategory::RANKED.len(), 7);
    }

    #[test]
    fn worst_picks_more_severe() {
        assert_eq!(
            SectionCategory::IIv.worst(SectionCategory::IVv),
            SectionCategory::IVv
        );
        assert_eq!(
            SectionCategory::IVv.worst(SectionCategory::IIv),
            SectionCategory::IVv
        );
        assert_eq!(
            AssessmentGrade::B.worst(AssessmentGrade::APlus),
            AssessmentGrade::B
        );
    }

    #[test]
    fn worst_ignores_unranked_operand() {
        assert_eq!(
            MechanismCategory::NotApplicable.worst(MechanismCategory::IIt),
            MechanismCategory::IIt
        );
        assert_eq!(
            MechanismCategory::IIt.worst(MechanismCategory::NoResult),
            MechanismCategory::IIt
        );
    }

    #[test]
    fn mechanism_category_maps_onto_grades() {
        assert_eq!(MechanismCategory::It.to_grade(), Some(AssessmentGrade::APlus));
        assert_eq!(MechanismCategory::Vt.to_grade(), Some(AssessmentGrade::D));
        assert_eq!(MechanismCategory::NotApplicable.to_grade(), None);
        assert_eq!(MechanismCategory::RANKED.len(), AssessmentGrade::RANKED.len());
    }

    #[test]
    fn grade_display_and_serde_use_a_plus() {
        assert_eq!(AssessmentGrade::APlus.to_string(), "A+");
        assert_eq!(
            serde_json::to_string(&AssessmentGrade::APlus).unwrap(),
            "\"A+\""
        );
    }
}
