//! Search space types: the per-gene domain table consulted by every operator.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Domain of a single gene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneDomain {
    /// Inclusive integer range.
    Integer { min: i64, max: i64 },
    /// Inclusive real range.
    Real { min: f32, max: f32 },
    /// Enumerated set; genes store an index into `values`.
    Categorical { values: Vec<String> },
}

impl GeneDomain {
    /// Whether genes of this domain take part in the crossover blend stage.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, GeneDomain::Categorical { .. })
    }

    /// Clamp a real value into this domain.
    ///
    /// Integer domains round to the nearest integer first. Categorical
    /// domains have no numeric interpretation and return `None`.
    pub fn clamp(&self, value: f32) -> Option<Gene> {
        match self {
            GeneDomain::Integer { min, max } => {
                let rounded = (value.round() as i64).clamp(*min, *max);
                Some(Gene::Integer(rounded))
            }
            GeneDomain::Real { min, max } => Some(Gene::Real(value.clamp(*min, *max))),
            GeneDomain::Categorical { .. } => None,
        }
    }

    /// Whether `gene` is a legal value of this domain.
    pub fn contains(&self, gene: &Gene) -> bool {
        match (self, gene) {
            (GeneDomain::Integer { min, max }, Gene::Integer(v)) => (*min..=*max).contains(v),
            (GeneDomain::Real { min, max }, Gene::Real(v)) => *v >= *min && *v <= *max,
            (GeneDomain::Categorical { values }, Gene::Category(i)) => *i < values.len(),
            _ => false,
        }
    }
}

/// A single gene value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gene {
    Integer(i64),
    Real(f32),
    /// Index into the gene's categorical domain.
    Category(usize),
}

impl Gene {
    /// Numeric value, or `None` for categorical genes.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Gene::Integer(v) => Some(*v as f32),
            Gene::Real(v) => Some(*v),
            Gene::Category(_) => None,
        }
    }

    /// Category index, or `None` for numeric genes.
    pub fn as_category(&self) -> Option<usize> {
        match self {
            Gene::Category(i) => Some(*i),
            _ => None,
        }
    }
}

/// Correlated gene groups exchanged as a block by crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GeneGroup {
    /// Body attributes (health, speed, movement...).
    #[default]
    Body,
    /// Equipment attributes (weapon and its parameters).
    Equipment,
}

/// Description of one gene in the search space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneSpec {
    /// Unique gene name.
    pub name: String,
    /// Legal values.
    pub domain: GeneDomain,
    /// Crossover group.
    #[serde(default)]
    pub group: GeneGroup,
    /// Name of the categorical gene this numeric gene is conditioned on.
    #[serde(default)]
    pub depends_on: Option<String>,
}

impl GeneSpec {
    /// Integer gene in the body group.
    pub fn integer(name: &str, min: i64, max: i64) -> Self {
        Self::new(name, GeneDomain::Integer { min, max })
    }

    /// Real gene in the body group.
    pub fn real(name: &str, min: f32, max: f32) -> Self {
        Self::new(name, GeneDomain::Real { min, max })
    }

    /// Categorical gene in the body group.
    pub fn categorical(name: &str, values: &[&str]) -> Self {
        Self::new(
            name,
            GeneDomain::Categorical {
                values: values.iter().map(|v| v.to_string()).collect(),
            },
        )
    }

    fn new(name: &str, domain: GeneDomain) -> Self {
        Self {
            name: name.to_string(),
            domain,
            group: GeneGroup::Body,
            depends_on: None,
        }
    }

    /// Move this gene to another crossover group.
    pub fn in_group(mut self, group: GeneGroup) -> Self {
        self.group = group;
        self
    }

    /// Condition this gene on a categorical gene.
    pub fn depends_on(mut self, gene: &str) -> Self {
        self.depends_on = Some(gene.to_string());
        self
    }
}

/// Ordered, read-only table of gene domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    genes: Vec<GeneSpec>,
}

impl SearchSpace {
    /// Create a validated search space.
    pub fn new(genes: Vec<GeneSpec>) -> Result<Self, SearchSpaceError> {
        let space = Self { genes };
        space.validate()?;
        Ok(space)
    }

    /// Gene specs in genome order.
    pub fn genes(&self) -> &[GeneSpec] {
        &self.genes
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Check if the space has no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Position of a gene by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.genes.iter().position(|g| g.name == name)
    }

    /// Position of the categorical gene that `index` depends on, if any.
    pub fn dependency_of(&self, index: usize) -> Option<usize> {
        self.genes
            .get(index)?
            .depends_on
            .as_deref()
            .and_then(|name| self.index_of(name))
    }

    /// Validate bounds, names and dependencies.
    pub fn validate(&self) -> Result<(), SearchSpaceError> {
        if self.genes.is_empty() {
            return Err(SearchSpaceError::Empty);
        }

        let mut names = HashSet::new();
        for gene in &self.genes {
            if !names.insert(gene.name.as_str()) {
                return Err(SearchSpaceError::DuplicateGene(gene.name.clone()));
            }
            match &gene.domain {
                GeneDomain::Integer { min, max } if min > max => {
                    return Err(SearchSpaceError::InvalidBounds(format!(
                        "{} min ({}) > max ({})",
                        gene.name, min, max
                    )));
                }
                GeneDomain::Real { min, max } => {
                    if !min.is_finite() || !max.is_finite() {
                        return Err(SearchSpaceError::NonFiniteBounds(gene.name.clone()));
                    }
                    if min > max {
                        return Err(SearchSpaceError::InvalidBounds(format!(
                            "{} min ({}) > max ({})",
                            gene.name, min, max
                        )));
                    }
                    // Uniform sampling needs the width itself to be representable.
                    if !(max - min).is_finite() {
                        return Err(SearchSpaceError::RangeOverflow(gene.name.clone()));
                    }
                }
                GeneDomain::Categorical { values } if values.is_empty() => {
                    return Err(SearchSpaceError::EmptyDomain(gene.name.clone()));
                }
                _ => {}
            }
        }

        for gene in &self.genes {
            let Some(dependency) = gene.depends_on.as_deref() else {
                continue;
            };
            let target = self
                .genes
                .iter()
                .find(|g| g.name == dependency)
                .ok_or_else(|| SearchSpaceError::UnknownDependency {
                    gene: gene.name.clone(),
                    dependency: dependency.to_string(),
                })?;
            if target.domain.is_numeric() || !gene.domain.is_numeric() {
                return Err(SearchSpaceError::InvalidDependency {
                    gene: gene.name.clone(),
                    dependency: dependency.to_string(),
                });
            }
            if target.group != gene.group {
                return Err(SearchSpaceError::DependencyAcrossGroups {
                    gene: gene.name.clone(),
                    dependency: dependency.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Search space validation errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SearchSpaceError {
    #[error("Search space must contain at least one gene")]
    Empty,
    #[error("Gene {0} is declared more than once")]
    DuplicateGene(String),
    #[error("Invalid gene bounds: {0}")]
    InvalidBounds(String),
    #[error("Gene {0} has a non-finite bound")]
    NonFiniteBounds(String),
    #[error("Gene {0} spans a range wider than an f32 can represent")]
    RangeOverflow(String),
    #[error("Categorical gene {0} has no values")]
    EmptyDomain(String),
    #[error("Gene {gene} depends on unknown gene {dependency}")]
    UnknownDependency { gene: String, dependency: String },
    #[error("Numeric gene {gene} must depend on a categorical gene, not {dependency}")]
    InvalidDependency { gene: String, dependency: String },
    #[error("Gene {gene} and its dependency {dependency} belong to different groups")]
    DependencyAcrossGroups { gene: String, dependency: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weapon_space() -> Vec<GeneSpec> {
        vec![
            GeneSpec::integer("health", 1, 5),
            GeneSpec::categorical("weapon", &["sword", "bow"]).in_group(GeneGroup::Equipment),
            GeneSpec::real("projectile_speed", 1.0, 4.0)
                .in_group(GeneGroup::Equipment)
                .depends_on("weapon"),
        ]
    }

    #[test]
    fn test_valid_space() {
        let space = SearchSpace::new(weapon_space()).unwrap();
        assert_eq!(space.len(), 3);
        assert_eq!(space.dependency_of(2), Some(1));
        assert_eq!(space.dependency_of(0), None);
    }

    #[test]
    fn test_inverted_bounds() {
        let err = SearchSpace::new(vec![GeneSpec::real("speed", 2.0, 1.0)]).unwrap_err();
        assert!(matches!(err, SearchSpaceError::InvalidBounds(_)));
    }

    #[test]
    fn test_non_finite_bounds() {
        assert_eq!(
            SearchSpace::new(vec![GeneSpec::real("speed", 0.0, f32::INFINITY)]),
            Err(SearchSpaceError::NonFiniteBounds("speed".to_string()))
        );
        assert_eq!(
            SearchSpace::new(vec![GeneSpec::real("speed", f32::NAN, 1.0)]),
            Err(SearchSpaceError::NonFiniteBounds("speed".to_string()))
        );
    }

    #[test]
    fn test_range_wider_than_f32() {
        assert_eq!(
            SearchSpace::new(vec![GeneSpec::real("x", -f32::MAX, f32::MAX)]),
            Err(SearchSpaceError::RangeOverflow("x".to_string()))
        );
        // Half the span still fits.
        assert!(SearchSpace::new(vec![GeneSpec::real("x", 0.0, f32::MAX)]).is_ok());
    }

    #[test]
    fn test_dependency_must_be_categorical() {
        let genes = vec![
            GeneSpec::integer("health", 1, 5),
            GeneSpec::real("speed", 1.0, 2.0).depends_on("health"),
        ];
        assert!(matches!(
            SearchSpace::new(genes),
            Err(SearchSpaceError::InvalidDependency { .. })
        ));
    }

    #[test]
    fn test_dependency_same_group() {
        let mut genes = weapon_space();
        genes[2].group = GeneGroup::Body;
        assert!(matches!(
            SearchSpace::new(genes),
            Err(SearchSpaceError::DependencyAcrossGroups { .. })
        ));
    }

    #[test]
    fn test_duplicate_names() {
        let genes = vec![
            GeneSpec::integer("health", 1, 5),
            GeneSpec::integer("health", 1, 3),
        ];
        assert_eq!(
            SearchSpace::new(genes),
            Err(SearchSpaceError::DuplicateGene("health".to_string()))
        );
    }

    #[test]
    fn test_clamp_rounds_integers() {
        let domain = GeneDomain::Integer { min: 1, max: 5 };
        assert_eq!(domain.clamp(2.6), Some(Gene::Integer(3)));
        assert_eq!(domain.clamp(-3.0), Some(Gene::Integer(1)));
        assert_eq!(domain.clamp(9.4), Some(Gene::Integer(5)));
    }

    #[test]
    fn test_contains() {
        let domain = GeneDomain::Categorical {
            values: vec!["a".into(), "b".into()],
        };
        assert!(domain.contains(&Gene::Category(1)));
        assert!(!domain.contains(&Gene::Category(2)));
        assert!(!domain.contains(&Gene::Real(0.0)));
    }
}
