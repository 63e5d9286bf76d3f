//! Constant lookup tables for the interchange format
//!
//! Distribution and type names are matched without regard to case. Parameter
//! names are matched exactly.

/// Canonical distribution type names
pub const CANONICAL_DISTRIBUTIONS: &[(&str, &str)] = &[
    ("lognormal", "LogNormal"),
    ("normal", "Normal"),
    ("gamma", "Gamma"),
    ("exponential", "Exponential"),
    ("beta", "Beta"),
    ("dirichlet", "Dirichlet"),
    ("uniform", "Uniform"),
    ("yule", "Yule"),
    ("birthdeath", "BirthDeath"),
    ("calibrated_birthdeath", "ConstrainedYule"),
    ("phyloctmc", "PhyloCTMC"),
];

/// Generated value kind by the declared variable type
pub const GENERATES_BY_TYPE: &[(&str, &str)] = &[
    ("real", "REAL"),
    ("integer", "INTEGER"),
    ("boolean", "BOOLEAN"),
    ("simplex", "REAL_VECTOR"),
    ("vector", "REAL_VECTOR"),
    ("matrix", "REAL_MATRIX"),
    ("tree", "TREE"),
    ("timetree", "TREE"),
    ("alignment", "ALIGNMENT"),
];

/// Generated value kind by distribution, used when the variable type is not in
/// [`GENERATES_BY_TYPE`]
pub const GENERATES_BY_DISTRIBUTION: &[(&str, &str)] = &[
    ("lognormal", "REAL"),
    ("normal", "REAL"),
    ("gamma", "REAL"),
    ("exponential", "REAL"),
    ("beta", "REAL"),
    ("uniform", "REAL"),
    ("dirichlet", "REAL_VECTOR"),
    ("yule", "TREE"),
    ("birthdeath", "TREE"),
    ("calibrated_birthdeath", "TREE"),
    ("phyloctmc", "ALIGNMENT"),
];

pub const DEFAULT_GENERATES: &str = "REAL";

/// What happens to one distribution parameter on output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterRule {
    Keep,
    Rename(&'static str),
    /// Emit `1 / value` under a new name
    Reciprocal(&'static str),
    Drop,
}

/// Parameter rules for one canonical distribution type
#[derive(Debug)]
pub struct ParameterMapping {
    pub distribution: &'static str,
    pub rules: &'static [(&'static str, ParameterRule)],
    /// Applied to parameters without an explicit rule
    pub otherwise: ParameterRule,
}

impl ParameterMapping {
    pub fn rule(&self, parameter: &str) -> ParameterRule {
        self.rules
            .iter()
            .find(|(name, _)| *name == parameter)
            .map(|(_, rule)| *rule)
            .unwrap_or(self.otherwise)
    }
}

use ParameterRule::*;

pub const PARAMETER_MAPPINGS: &[ParameterMapping] = &[
    ParameterMapping {
        distribution: "LogNormal",
        rules: &[("mean", Rename("meanlog")), ("sigma", Rename("sdlog"))],
        otherwise: Keep,
    },
    ParameterMapping {
        distribution: "Normal",
        rules: &[("sigma", Rename("sd"))],
        otherwise: Keep,
    },
    ParameterMapping {
        distribution: "Exponential",
        rules: &[("mean", Reciprocal("rate"))],
        otherwise: Keep,
    },
    ParameterMapping {
        distribution: "Uniform",
        rules: &[("min", Rename("lower")), ("max", Rename("upper"))],
        otherwise: Keep,
    },
    ParameterMapping {
        distribution: "Gamma",
        rules: &[],
        otherwise: Keep,
    },
    ParameterMapping {
        distribution: "Dirichlet",
        rules: &[("alpha", Keep)],
        otherwise: Drop,
    },
    ParameterMapping {
        distribution: "Yule",
        rules: &[("birthrate", Rename("birthRate")), ("n", Drop)],
        otherwise: Keep,
    },
    ParameterMapping {
        distribution: "BirthDeath",
        rules: &[
            ("birthrate", Rename("birthRate")),
            ("deathrate", Rename("deathRate")),
            ("n", Drop),
        ],
        otherwise: Keep,
    },
    ParameterMapping {
        distribution: "PhyloCTMC",
        rules: &[
            ("substmodel", Rename("Q")),
            ("siterates", Rename("siteRates")),
            ("branchrates", Rename("branchRates")),
        ],
        otherwise: Keep,
    },
];

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| *v)
}

pub fn canonical_distribution(name: &str) -> Option<&'static str> {
    lookup(CANONICAL_DISTRIBUTIONS, name)
}

pub fn generates_for_type(ty: &str) -> Option<&'static str> {
    lookup(GENERATES_BY_TYPE, ty)
}

pub fn distribution_generates(name: &str) -> &'static str {
    lookup(GENERATES_BY_DISTRIBUTION, name).unwrap_or(DEFAULT_GENERATES)
}

pub fn parameter_mapping(canonical_type: &str) -> Option<&'static ParameterMapping> {
    PARAMETER_MAPPINGS
        .iter()
        .find(|m| m.distribution.eq_ignore_ascii_case(canonical_type))
}

/// Rule for `parameter` of a distribution with the given canonical type;
/// unmapped types keep every parameter
pub fn parameter_rule(canonical_type: &str, parameter: &str) -> ParameterRule {
    parameter_mapping(canonical_type)
        .map(|m| m.rule(parameter))
        .unwrap_or(Keep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names_ignore_case() {
        assert_eq!(canonical_distribution("LOGNORMAL"), Some("LogNormal"));
        assert_eq!(canonical_distribution("calibrated_BirthDeath"), Some("ConstrainedYule"));
        assert_eq!(canonical_distribution("Poisson"), None);
    }

    #[test]
    fn test_generates_fallbacks() {
        assert_eq!(generates_for_type("TimeTree"), Some("TREE"));
        assert_eq!(generates_for_type("PositiveReal"), None);
        assert_eq!(distribution_generates("Dirichlet"), "REAL_VECTOR");
        assert_eq!(distribution_generates("Poisson"), DEFAULT_GENERATES);
    }

    #[test]
    fn test_parameter_rules() {
        assert_eq!(parameter_rule("Exponential", "mean"), Reciprocal("rate"));
        assert_eq!(parameter_rule("dirichlet", "n"), Drop);
        assert_eq!(parameter_rule("Dirichlet", "alpha"), Keep);
        assert_eq!(parameter_rule("Yule", "n"), Drop);
        assert_eq!(parameter_rule("ConstrainedYule", "n"), Keep);
        assert_eq!(parameter_rule("Normal", "Sigma"), Keep);
    }

    #[test]
    fn test_every_mapping_targets_a_canonical_type() {
        for mapping in PARAMETER_MAPPINGS {
            assert!(
                CANONICAL_DISTRIBUTIONS
                    .iter()
                    .any(|(_, canonical)| *canonical == mapping.distribution),
                "{} has no canonical entry",
                mapping.distribution
            );
        }
    }
}
