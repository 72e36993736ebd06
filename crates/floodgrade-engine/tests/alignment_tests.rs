//! End-to-end tests for aligning differently partitioned section lists.

mod common;

use common::{breakpoints_of, categories_of, category_list, probability_list};
use floodgrade_engine::{
    assemble_section_list, AssemblyOptions, FailureMechanismSection, SectionListAligner,
    SectionResult,
};
use floodgrade_prob::{ErrorKind, FailureMechanism, SectionCategory::*};

#[test]
fn two_lists_merge_onto_union_of_breakpoints() {
    let a = category_list("piping", &[0.0, 40.0, 100.0], &[IIv, IIIv]);
    let b = category_list("overtopping", &[0.0, 60.0, 100.0], &[Iv, IVv]);

    let combined = SectionListAligner::default()
        .combine_worst(&[a, b], false)
        .unwrap();

    assert_eq!(breakpoints_of(&combined), vec![0.0, 40.0, 60.0, 100.0]);
    assert_eq!(categories_of(&combined), vec![IIv, IIIv, IVv]);
}

#[test]
fn three_lists_with_shared_and_near_breakpoints() {
    let a = category_list("a", &[0.0, 25.0, 100.0], &[Iv, IIv]);
    let b = category_list("b", &[0.0, 25.004, 75.0, 100.0], &[IIIv, Iv, Iv]);
    let c = category_list("c", &[0.0, 50.0, 100.0], &[Iv, Vv]);

    let aligner = SectionListAligner::default();
    let combined = aligner.combine_worst(&[a, b, c], false).unwrap();

    assert_eq!(breakpoints_of(&combined), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
    assert_eq!(categories_of(&combined), vec![IIIv, IIv, Vv, Vv]);
}

#[test]
fn detailed_alignment_keeps_each_list_contribution() {
    let a = category_list("a", &[0.0, 40.0, 100.0], &[IIv, IIIv]);
    let b = category_list("b", &[0.0, 60.0, 100.0], &[Iv, IVv]);

    let aligned = SectionListAligner::default().align(&[a, b]).unwrap();

    let rows: Vec<(f64, f64, Vec<SectionResult>)> = aligned
        .into_iter()
        .map(|s| (s.start, s.end, s.results))
        .collect();
    assert_eq!(
        rows,
        vec![
            (
                0.0,
                40.0,
                vec![SectionResult::category(IIv), SectionResult::category(Iv)]
            ),
            (
                40.0,
                60.0,
                vec![SectionResult::category(IIIv), SectionResult::category(Iv)]
            ),
            (
                60.0,
                100.0,
                vec![SectionResult::category(IIIv), SectionResult::category(IVv)]
            ),
        ]
    );
}

#[test]
fn translating_onto_own_partition_is_identity() {
    let a = category_list("a", &[0.0, 30.0, 70.0, 100.0], &[Iv, VIIv, IIv]);
    let aligner = SectionListAligner::default();
    let common = aligner.common_sections(std::slice::from_ref(&a)).unwrap();
    let translated = aligner.translate(&a, &common).unwrap();
    assert_eq!(translated, a);
}

#[test]
fn combined_probabilities_feed_mechanism_assembly() {
    let inner = probability_list("inner slope", &[0.0, 50.0, 100.0], &[0.001, 0.002]);
    let outer = probability_list("outer slope", &[0.0, 20.0, 100.0], &[0.003, 0.0005]);

    let combined = SectionListAligner::default()
        .combine_worst(&[inner, outer], false)
        .unwrap();
    assert_eq!(breakpoints_of(&combined), vec![0.0, 20.0, 50.0, 100.0]);

    let mechanism = FailureMechanism::without_length_effect("slope stability");
    let result = assemble_section_list(&combined, &mechanism, false).unwrap();
    let expected = 1.0 - (1.0 - 0.003) * (1.0 - 0.001) * (1.0 - 0.002);
    let actual = result.probability.value().unwrap();
    assert!((actual - expected).abs() < 1e-12, "{actual} vs {expected}");
}

#[test]
fn configured_tolerance_governs_alignment() {
    let options = AssemblyOptions::from_json_str(r#"{"section_tolerance": 0.5}"#).unwrap();
    let a = category_list("a", &[0.0, 40.0, 100.0], &[IIv, IIIv]);
    let sections = vec![
        FailureMechanismSection::new(0.0, 40.0, SectionResult::category(Iv)),
        FailureMechanismSection::new(40.3, 100.2, SectionResult::category(IVv)),
    ];
    let errs = AssemblyOptions::default()
        .section_list("b", sections.clone())
        .unwrap_err();
    assert!(errs.contains(ErrorKind::CommonFailureMechanismSectionsNotConsecutive));
    let b = options.section_list("b", sections).unwrap();

    let strict = SectionListAligner::default().combine_worst(&[a.clone(), b.clone()], false);
    assert!(strict
        .unwrap_err()
        .contains(ErrorKind::UnequalCommonFailureMechanismSectionLists));

    let loose = options.aligner().unwrap().combine_worst(&[a, b], false).unwrap();
    assert_eq!(breakpoints_of(&loose), vec![0.0, 40.0, 100.0]);
    assert_eq!(categories_of(&loose), vec![IIv, IVv]);
}

#[test]
fn missing_results_follow_partial_assembly_flag() {
    let a = category_list("a", &[0.0, 50.0, 100.0], &[NoResult, IIIv]);
    let b = category_list("b", &[0.0, 100.0], &[IIv]);
    let aligner = SectionListAligner::default();

    let errs = aligner
        .combine_worst(&[a.clone(), b.clone()], false)
        .unwrap_err();
    assert_eq!(
        errs.kinds().collect::<Vec<_>>(),
        vec![ErrorKind::CommonSectionsWithoutCategoryValues]
    );
    assert_eq!(errs.errors()[0].entity.as_str(), "combined sections/common section [0.00, 50.00)");

    let combined = aligner.combine_worst(&[a, b], true).unwrap();
    assert_eq!(categories_of(&combined), vec![IIv, IIIv]);
}

#[test]
fn combined_list_serializes_with_tagged_results() {
    let a = category_list("a", &[0.0, 100.0], &[IIv]);
    let combined = SectionListAligner::default()
        .combine_worst(&[a], false)
        .unwrap();
    let json = serde_json::to_value(&combined).unwrap();
    assert_eq!(json["id"], "combined sections");
    assert_eq!(json["sections"][0]["result"]["kind"], "category");
    assert_eq!(json["sections"][0]["result"]["category"], "IIv");
}
