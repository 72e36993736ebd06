//! Category boundaries derived from regulatory limits.
//!
//! Three tables are produced:
//!
//! | context | categories | thresholds |
//! |---|---|---|
//! | section | 7 × [`SectionCategory`] | `ω·p` adjusted for length effect |
//! | mechanism | 5 × [`MechanismCategory`] | `ω·p` |
//! | assessment section | 5 × [`AssessmentGrade`] | `p` |
//!
//! where `p` ranges over the signaling and lower limits and `ω` is the
//! mechanism's failure probability space.

use serde::Serialize;
use tracing::debug;

use floodgrade_prob::{
    AssemblyErrors, AssemblyResult, AssessmentGrade, AssessmentSection, EntityId, ErrorCollector,
    ErrorKind, FailureMechanism, MechanismCategory, Probability, RankedCategory, SectionCategory,
};

/// Factor between the signaling/lower limits and the outer grade boundaries.
const GRADE_FACTOR: f64 = 30.0;

/// One entry of a [`CategoriesList`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryLimits<T> {
    pub category: T,
    pub lower_limit: Probability,
    pub upper_limit: Probability,
}

impl<T> CategoryLimits<T> {
    pub fn new(category: T, lower_limit: Probability, upper_limit: Probability) -> Self {
        Self {
            category,
            lower_limit,
            upper_limit,
        }
    }
}

/// Ordered, gapless cover of `[0, 1]` by category intervals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoriesList<T> {
    categories: Vec<CategoryLimits<T>>,
}

impl<T: RankedCategory> CategoriesList<T> {
    /// Validate and wrap a list of limits.
    ///
    /// All violations are reported together: undefined bounds, inverted
    /// intervals, gaps or overlaps between neighbours, a cover that does not
    /// start at 0 or end at 1, and unranked or out-of-order categories.
    pub fn new(categories: Vec<CategoryLimits<T>>) -> AssemblyResult<Self> {
        let entity = EntityId::new("categories");
        if categories.is_empty() {
            return Err(AssemblyErrors::single(entity, ErrorKind::EmptyResultsList));
        }

        let mut errors = ErrorCollector::new();
        let mut bounds = Vec::with_capacity(categories.len());
        let mut previous_rank = None;
        for limits in &categories {
            let id = entity.child(limits.category);
            match limits.category.rank() {
                Some(rank) => {
                    if previous_rank.is_some_and(|prev| rank <= prev) {
                        errors.push(&id, ErrorKind::InvalidCategoryValue);
                    }
                    previous_rank = Some(rank);
                }
                None => errors.push(&id, ErrorKind::InvalidCategoryValue),
            }

            let lower = errors.absorb(limits.lower_limit.require(id.child("lower limit")));
            let upper = errors.absorb(limits.upper_limit.require(id.child("upper limit")));
            bounds.push((lower, upper));
            if let (Some(l), Some(u)) = (lower, upper) {
                if l > u {
                    errors.push(&id, ErrorKind::InvalidCategoryLimits);
                }
            }
        }

        if let Some((Some(first_lower), _)) = bounds.first() {
            if *first_lower != 0.0 {
                errors.push(&entity, ErrorKind::InvalidCategoryLimits);
            }
        }
        if let Some((_, Some(last_upper))) = bounds.last() {
            if *last_upper != 1.0 {
                errors.push(&entity, ErrorKind::InvalidCategoryLimits);
            }
        }
        for (i, pair) in bounds.windows(2).enumerate() {
            if let ((_, Some(upper)), (Some(next_lower), _)) = (pair[0], pair[1]) {
                if upper != next_lower {
                    errors.push(
                        entity.child(categories[i + 1].category),
                        ErrorKind::InvalidCategoryLimits,
                    );
                }
            }
        }

        errors.finish_with(Self { categories })
    }

    pub fn categories(&self) -> &[CategoryLimits<T>] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryLimits<T>> {
        self.categories.iter()
    }

    /// Category whose interval contains `probability`. A probability exactly
    /// on a boundary belongs to the safer category, except that certain
    /// failure always lands in the most severe one, even when its interval
    /// has collapsed to `[1, 1]`.
    pub fn classify(&self, probability: Probability) -> AssemblyResult<T> {
        let p = probability.require("probability")?;
        if p >= 1.0 {
            if let Some(last) = self.categories.last() {
                return Ok(last.category);
            }
        }
        let found = self.categories.iter().find(|c| {
            c.upper_limit
                .value()
                .is_some_and(|upper| p <= upper)
        });
        match found {
            Some(c) => Ok(c.category),
            // Unreachable for a validated cover of [0, 1]; kept total.
            None => Err(AssemblyErrors::single(
                "probability",
                ErrorKind::FailureProbabilityOutOfRange,
            )),
        }
    }

    pub fn limits_of(&self, category: T) -> Option<&CategoryLimits<T>> {
        self.categories.iter().find(|c| c.category == category)
    }
}

impl<'a, T> IntoIterator for &'a CategoriesList<T> {
    type Item = &'a CategoryLimits<T>;
    type IntoIter = std::slice::Iter<'a, CategoryLimits<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}

/// Threshold of one of `n` independent equivalent sections such that their
/// union has probability `p`: `1 - (1 - p)^(1/n)`.
pub fn length_effect_adjusted(p: f64, length_effect_factor: f64) -> f64 {
    // exp_m1/ln_1p keep precision for the small probabilities typical here.
    -((-p).ln_1p() / length_effect_factor).exp_m1()
}

/// Validated `(signaling, lower)` limits of an assessment section.
fn section_limits(section: &AssessmentSection) -> AssemblyResult<(f64, f64)> {
    section.validate()?;
    let signaling = section.signaling_limit.require("assessment section/signaling limit")?;
    let lower = section.lower_limit.require("assessment section/lower limit")?;
    Ok((signaling, lower))
}

/// Validate section and mechanism together so both sets of errors surface.
fn validated_inputs(
    section: &AssessmentSection,
    mechanism: &FailureMechanism,
) -> AssemblyResult<(f64, f64)> {
    let mut errors = ErrorCollector::new();
    let limits = errors.absorb(section_limits(section));
    errors.absorb(mechanism.validate());
    match limits {
        Some(limits) if errors.is_empty() => Ok(limits),
        _ => errors.finish_with((0.0, 0.0)),
    }
}

/// Build a list from ascending inner thresholds; `0` and `1` close the cover.
fn build_list<T: RankedCategory>(thresholds: &[f64]) -> AssemblyResult<CategoriesList<T>> {
    debug_assert_eq!(thresholds.len() + 1, T::RANKED.len());
    let mut bounds = Vec::with_capacity(thresholds.len() + 2);
    bounds.push(0.0);
    bounds.extend(thresholds.iter().map(|t| t.clamp(0.0, 1.0)));
    bounds.push(1.0);

    let mut categories = Vec::with_capacity(T::RANKED.len());
    for (category, pair) in T::RANKED.iter().zip(bounds.windows(2)) {
        let lower = Probability::new(pair[0]).map_err(|e| e.at("category limits"))?;
        let upper = Probability::new(pair[1]).map_err(|e| e.at("category limits"))?;
        categories.push(CategoryLimits::new(*category, lower, upper));
    }
    CategoriesList::new(categories)
}

/// Grade limits of a whole assessment section.
pub fn assessment_grade_limits(
    section: &AssessmentSection,
) -> AssemblyResult<CategoriesList<AssessmentGrade>> {
    let (signaling, lower) = section_limits(section)?;
    debug!(signaling, lower, "Deriving assessment grade limits");
    build_list(&grade_thresholds(signaling, lower))
}

/// Mechanism-level category limits: the grade table on limits scaled by the
/// mechanism's probability space.
pub fn mechanism_category_limits(
    section: &AssessmentSection,
    mechanism: &FailureMechanism,
) -> AssemblyResult<CategoriesList<MechanismCategory>> {
    let (signaling, lower) = validated_inputs(section, mechanism)?;
    let space = mechanism.probability_space;
    debug!(mechanism = %mechanism.id, space, "Deriving mechanism category limits");
    build_list(&grade_thresholds(space * signaling, space * lower))
}

/// Section-level category limits: limits scaled by the probability space and
/// adjusted for the mechanism's length effect.
pub fn section_category_limits(
    section: &AssessmentSection,
    mechanism: &FailureMechanism,
) -> AssemblyResult<CategoriesList<SectionCategory>> {
    let (signaling, lower) = validated_inputs(section, mechanism)?;
    let space = mechanism.probability_space;
    let n = mechanism.length_effect_factor;
    let signaling = length_effect_adjusted(space * signaling, n);
    let lower = length_effect_adjusted(space * lower, n);
    debug!(
        mechanism = %mechanism.id,
        signaling,
        lower,
        "Deriving section category limits"
    );
    let upper_severe = (10.0 * lower).min(1.0);
    build_list(&[
        signaling / 1000.0,
        signaling / 100.0,
        signaling / 10.0,
        signaling,
        lower,
        upper_severe,
    ])
}

fn grade_thresholds(signaling: f64, lower: f64) -> [f64; 4] {
    [
        signaling / GRADE_FACTOR,
        signaling,
        lower,
        (GRADE_FACTOR * lower).min(1.0),
    ]
}
