//! Probability values, category enumerations, input model and the error
//! taxonomy shared by the floodgrade assembly engine.

pub mod category;
pub mod error;
pub mod model;
pub mod probability;

pub use category::{AssessmentGrade, MechanismCategory, RankedCategory, SectionCategory};
pub use error::{AssemblyError, AssemblyErrors, AssemblyResult, EntityId, ErrorCollector, ErrorKind};
pub use model::{
    AssemblyMethod, AssessmentSection, FailureMechanism, FailureMechanismAssemblyResult,
    MechanismGroup,
};
pub use probability::{Probability, ProbabilityError};
