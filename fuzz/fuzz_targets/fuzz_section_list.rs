#![no_main]
use floodgrade_engine::{FailureMechanismSection, FailureMechanismSectionList, SectionResult};
use floodgrade_prob::Probability;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Each 16-byte chunk is (start, end); raw bit patterns include NaN and
    // infinities. Validation must reject bad input without panicking.
    let sections: Vec<FailureMechanismSection> = data
        .chunks_exact(16)
        .map(|chunk| {
            let start = f64::from_le_bytes(chunk[..8].try_into().unwrap());
            let end = f64::from_le_bytes(chunk[8..].try_into().unwrap());
            let p = Probability::new(end.fract().abs()).unwrap_or(Probability::UNDEFINED);
            FailureMechanismSection::new(start, end, SectionResult::probability(p))
        })
        .collect();

    if let Ok(list) = FailureMechanismSectionList::new("fuzz", sections) {
        let total = list.total_length();
        for frac in [0.0, 0.25, 0.5, 0.75, 1.0] {
            list.section_at_point(frac * total, 0.01)
                .expect("points inside a valid list resolve");
        }
    }
});
