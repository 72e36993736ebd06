#![no_main]
use floodgrade_engine::{
    FailureMechanismSection, FailureMechanismSectionList, SectionListAligner, SectionResult,
};
use floodgrade_prob::{RankedCategory, SectionCategory};
use libfuzzer_sys::fuzz_target;

/// A category list over [0, 100] cut at the given per-mille offsets.
fn list_from(id: &str, bytes: &[u8]) -> Option<FailureMechanismSectionList> {
    let mut cuts: Vec<f64> = bytes
        .chunks_exact(2)
        .map(|c| f64::from(u16::from_le_bytes([c[0], c[1]]) % 1000) / 10.0)
        .filter(|c| *c > 0.0)
        .collect();
    cuts.sort_by(f64::total_cmp);
    cuts.dedup();

    let mut offsets = vec![0.0];
    offsets.extend(cuts);
    offsets.push(100.0);
    let sections = offsets
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let ranked = SectionCategory::RANKED;
            let category = bytes
                .get(i)
                .map_or(SectionCategory::NoResult, |b| ranked[*b as usize % ranked.len()]);
            FailureMechanismSection::new(pair[0], pair[1], SectionResult::category(category))
        })
        .collect();
    FailureMechanismSectionList::new(id, sections).ok()
}

fuzz_target!(|data: &[u8]| {
    let mid = data.len() / 2;
    let (Some(a), Some(b)) = (list_from("a", &data[..mid]), list_from("b", &data[mid..])) else {
        return;
    };
    let aligner = SectionListAligner::default();
    let lists = [a, b];
    let _ = aligner.align(&lists);
    let _ = aligner.combine_worst(&lists, true);
    let _ = aligner.combine_worst(&lists, false);
});
