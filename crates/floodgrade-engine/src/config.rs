//! Assembly options supplied by the caller.

use serde::{Deserialize, Serialize};

use floodgrade_prob::{AssemblyErrors, AssemblyResult, EntityId, ErrorKind};

use crate::alignment::SectionListAligner;
use crate::section::{FailureMechanismSection, FailureMechanismSectionList, SECTION_TOLERANCE};

/// Options shared by every assembly step.
///
/// ```json
/// { "partial_assembly": true, "section_tolerance": 0.01 }
/// ```
///
/// Both fields are optional; unknown fields are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssemblyOptions {
    /// Skip entries without a result instead of failing on them.
    #[serde(default)]
    pub partial_assembly: bool,
    /// Offsets closer than this many meters are the same point.
    #[serde(default = "default_section_tolerance")]
    pub section_tolerance: f64,
}

fn default_section_tolerance() -> f64 {
    SECTION_TOLERANCE
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            partial_assembly: false,
            section_tolerance: default_section_tolerance(),
        }
    }
}

impl AssemblyOptions {
    /// Parse and validate options from JSON.
    pub fn from_json_str(json: &str) -> AssemblyResult<Self> {
        let options: Self = serde_json::from_str(json).map_err(|e| {
            AssemblyErrors::single(
                EntityId::new("options").child(format_args!("line {}", e.line())),
                ErrorKind::InvalidConfiguration,
            )
        })?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> AssemblyResult<()> {
        self.aligner().map(|_| ())
    }

    pub fn aligner(&self) -> AssemblyResult<SectionListAligner> {
        SectionListAligner::new(self.section_tolerance).map_err(|_| {
            AssemblyErrors::single(
                "options/section_tolerance",
                ErrorKind::SectionToleranceOutOfRange,
            )
        })
    }

    /// Validate a section list with the configured tolerance.
    pub fn section_list(
        &self,
        id: impl Into<EntityId>,
        sections: Vec<FailureMechanismSection>,
    ) -> AssemblyResult<FailureMechanismSectionList> {
        FailureMechanismSectionList::with_tolerance(id, sections, self.section_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SectionResult;
    use floodgrade_prob::Probability;

    #[test]
    fn empty_object_uses_defaults() {
        let options = AssemblyOptions::from_json_str("{}").unwrap();
        assert_eq!(options, AssemblyOptions::default());
        assert!(!options.partial_assembly);
        assert_eq!(options.section_tolerance, 0.01);
    }

    #[test]
    fn fields_are_read() {
        let options =
            AssemblyOptions::from_json_str(r#"{"partial_assembly": true, "section_tolerance": 0.5}"#)
                .unwrap();
        assert!(options.partial_assembly);
        assert_eq!(options.aligner().unwrap().tolerance(), 0.5);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let errs = AssemblyOptions::from_json_str(r#"{"partial": true}"#).unwrap_err();
        assert!(errs.contains(ErrorKind::InvalidConfiguration));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let errs = AssemblyOptions::from_json_str("{\n\"partial_assembly\": 1").unwrap_err();
        assert!(errs.contains(ErrorKind::InvalidConfiguration));
        assert_eq!(errs.errors()[0].entity.as_str(), "options/line 2");
    }

    #[test]
    fn non_positive_tolerance_is_rejected() {
        for json in [r#"{"section_tolerance": 0.0}"#, r#"{"section_tolerance": -1.0}"#] {
            let errs = AssemblyOptions::from_json_str(json).unwrap_err();
            assert!(errs.contains(ErrorKind::SectionToleranceOutOfRange));
        }
        let options = AssemblyOptions {
            partial_assembly: false,
            section_tolerance: f64::NAN,
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn section_list_uses_configured_tolerance() {
        let sections = vec![
            FailureMechanismSection::new(0.0, 50.0, SectionResult::probability(Probability::ZERO)),
            FailureMechanismSection::new(50.3, 100.0, SectionResult::probability(Probability::ZERO)),
        ];
        assert!(AssemblyOptions::default()
            .section_list("piping", sections.clone())
            .is_err());
        let loose = AssemblyOptions {
            partial_assembly: false,
            section_tolerance: 0.5,
        };
        assert!(loose.section_list("piping", sections).is_ok());
    }
}
