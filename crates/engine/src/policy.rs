use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

pub const DEFAULT_LENGTH_OUT: usize = 10;

/// Largest grid `build_grid` will assemble.
pub const MAX_GRID_ROWS: usize = 1 << 24;

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// How a non-target numeric column is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericsPolicy {
    #[default]
    Mean,
    Median,
    Min,
    Max,
    /// Enumerate like a target.
    Combination,
}

/// How a non-target categorical column is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorsPolicy {
    /// Collapse to one label, chosen by [`ReferenceLevel`].
    #[default]
    ReferenceLevel,
    /// Every observed label.
    Combination,
}

/// Which label a collapsed categorical column takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceLevel {
    /// First observed label in level order.
    #[default]
    FirstLevel,
    /// Highest count; ties go to the earlier level.
    MostFrequent,
}

/// Interval covered when a numeric column is enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spread {
    /// Observed minimum to maximum.
    #[default]
    Range,
    /// First to third quartile.
    Iqr,
}

macro_rules! policy_names {
    ($ty:ty, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = GridError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($name => Ok(Self::$variant),)+
                    other => Err(GridError::UnknownPolicy {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

policy_names!(NumericsPolicy, "numerics", {
    Mean => "mean",
    Median => "median",
    Min => "min",
    Max => "max",
    Combination => "combination",
});

policy_names!(FactorsPolicy, "factors", {
    ReferenceLevel => "reference_level",
    Combination => "combination",
});

policy_names!(ReferenceLevel, "reference", {
    FirstLevel => "first_level",
    MostFrequent => "most_frequent",
});

policy_names!(Spread, "spread", {
    Range => "range",
    Iqr => "iqr",
});

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Everything `build_grid` needs besides the table and the targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridOptions {
    pub length_out: usize,
    pub numerics: NumericsPolicy,
    pub factors: FactorsPolicy,
    pub reference: ReferenceLevel,
    pub spread: Spread,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            length_out: DEFAULT_LENGTH_OUT,
            numerics: NumericsPolicy::default(),
            factors: FactorsPolicy::default(),
            reference: ReferenceLevel::default(),
            spread: Spread::default(),
        }
    }
}

impl GridOptions {
    pub fn length_out(mut self, n: usize) -> Self {
        self.length_out = n;
        self
    }

    pub fn numerics(mut self, policy: NumericsPolicy) -> Self {
        self.numerics = policy;
        self
    }

    pub fn factors(mut self, policy: FactorsPolicy) -> Self {
        self.factors = policy;
        self
    }

    pub fn reference(mut self, reference: ReferenceLevel) -> Self {
        self.reference = reference;
        self
    }

    pub fn spread(mut self, spread: Spread) -> Self {
        self.spread = spread;
        self
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.length_out == 0 {
            return Err(GridError::InvalidParameter(
                "length_out must be a positive integer, got 0".into(),
            ));
        }
        Ok(())
    }
}
