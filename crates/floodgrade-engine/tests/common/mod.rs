#![allow(dead_code)]

use serde::Deserialize;

use floodgrade_engine::{
    AssemblyOptions, FailureMechanismSection, FailureMechanismSectionList, MechanismAssessment,
    SectionResult,
};
use floodgrade_prob::{AssessmentSection, Probability, SectionCategory};

/// A complete assessment as an external driver would supply it.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssessmentFixture {
    pub section: AssessmentSection,
    #[serde(default)]
    pub options: AssemblyOptions,
    pub mechanisms: Vec<MechanismAssessment>,
}

pub fn load_fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {path}: {e}"))
}

pub fn load_assessment(name: &str) -> AssessmentFixture {
    let json = load_fixture(name);
    serde_json::from_str(&json).unwrap_or_else(|e| panic!("Failed to parse {name}: {e}"))
}

pub fn p(v: f64) -> Probability {
    Probability::new(v).unwrap()
}

/// Section (1/3000, 1/1000) per year.
pub fn dike_section() -> AssessmentSection {
    AssessmentSection::from_return_periods(3000.0, 1000.0).unwrap()
}

pub fn category_list(
    id: &str,
    cuts: &[f64],
    categories: &[SectionCategory],
) -> FailureMechanismSectionList {
    assert_eq!(cuts.len(), categories.len() + 1, "one category per interval");
    let sections = cuts
        .windows(2)
        .zip(categories)
        .map(|(pair, c)| {
            FailureMechanismSection::new(pair[0], pair[1], SectionResult::category(*c))
        })
        .collect();
    FailureMechanismSectionList::new(id, sections).unwrap()
}

pub fn probability_list(id: &str, cuts: &[f64], values: &[f64]) -> FailureMechanismSectionList {
    assert_eq!(cuts.len(), values.len() + 1, "one probability per interval");
    let sections = cuts
        .windows(2)
        .zip(values)
        .map(|(pair, v)| {
            FailureMechanismSection::new(pair[0], pair[1], SectionResult::probability(p(*v)))
        })
        .collect();
    FailureMechanismSectionList::new(id, sections).unwrap()
}

pub fn categories_of(list: &FailureMechanismSectionList) -> Vec<SectionCategory> {
    list.iter()
        .map(|s| match s.result {
            SectionResult::Category { category } => category,
            other => panic!("expected a category result, got {other:?}"),
        })
        .collect()
}

pub fn breakpoints_of(list: &FailureMechanismSectionList) -> Vec<f64> {
    let mut cuts: Vec<f64> = list.iter().map(|s| s.start).collect();
    cuts.push(list.total_length());
    cuts
}
