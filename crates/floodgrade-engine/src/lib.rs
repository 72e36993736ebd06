//! Assembly engine for flood-defense safety assessments.
//!
//! Data flows from sections to mechanisms to the assessment section:
//!
//! 1. [`limits`] derives category boundaries from the regulatory limits.
//! 2. [`mechanism`] folds section probabilities into a mechanism probability.
//! 3. [`assessment`] folds mechanism results, by group, into the final grade.
//!
//! [`alignment`] merges differently partitioned [`section`] lists onto their
//! finest common partition, for reporting and cross-checking.
//!
//! All operations are pure and synchronous. Every validation pass reports all
//! violations it finds as [`AssemblyErrors`](floodgrade_prob::AssemblyErrors).

pub mod alignment;
pub mod assessment;
pub mod config;
pub mod limits;
pub mod mechanism;
pub mod section;

pub use alignment::{AlignedSection, CommonSection, SectionListAligner};
pub use assessment::{
    assemble_safety_assessment, assemble_with_previous, MechanismAssessment, MechanismResult,
    SafetyAssessmentResult, TemporalAssessmentResult,
};
pub use config::AssemblyOptions;
pub use limits::{
    assessment_grade_limits, length_effect_adjusted, mechanism_category_limits,
    section_category_limits, CategoriesList, CategoryLimits,
};
pub use mechanism::{
    assemble_independent, assemble_section_list, assemble_with_length_effect,
    assemble_with_length_effect_exponent, determine_mechanism_category,
    determine_section_category, ResultWithProfileAndSectionProbabilities,
};
pub use section::{
    FailureMechanismSection, FailureMechanismSectionList, SectionResult, SectionResultKind,
    SECTION_TOLERANCE,
};
