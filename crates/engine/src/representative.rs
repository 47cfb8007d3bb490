use ordered_float::OrderedFloat;
use refgrid_core::{Column, ColumnKind, Field, Table, Value};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::GridError;
use crate::policy::{
    FactorsPolicy, GridOptions, NumericsPolicy, ReferenceLevel, Spread, MAX_GRID_ROWS,
};
use crate::stats;
use crate::target::TargetValues;

/// Whether a column is being enumerated or held fixed.
#[derive(Debug, Clone, Copy)]
pub enum Role<'a> {
    Target(&'a TargetValues),
    NonTarget,
}

/// Representative-value set for one column of `table`.
///
/// The returned column never contains missing cells.
pub fn representative_values(
    table: &Table,
    column: &str,
    role: Role<'_>,
    options: &GridOptions,
) -> Result<Column, GridError> {
    let idx = table.schema().index_of(column).ok_or_else(|| GridError::ColumnNotFound {
        column: column.to_string(),
    })?;
    let set = value_set(&table.schema().fields()[idx], &table.columns()[idx], role, options)?;
    if set.len() > MAX_GRID_ROWS {
        return Err(GridError::InvalidParameter(format!(
            "column '{column}': {} representative values exceed the limit of {MAX_GRID_ROWS}",
            set.len()
        )));
    }
    Ok(set.into_column())
}

/// A column's representative values before materialisation.
///
/// `len` is known up front, so the grid size can be checked before any
/// enumeration is allocated.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ValueSet {
    /// `n` evenly spaced numbers from `lo` to `hi`.
    Span { lo: f64, hi: f64, n: usize },
    Numbers(Vec<f64>),
    Labels(Vec<String>),
}

impl ValueSet {
    /// Matches the length of [`stats::linspace`] for a span.
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Span { lo, hi, n } => {
                if lo == hi {
                    1
                } else {
                    (*n).max(1)
                }
            }
            Self::Numbers(v) => v.len(),
            Self::Labels(v) => v.len(),
        }
    }

    pub(crate) fn labels(&self) -> &[String] {
        match self {
            Self::Labels(v) => v,
            Self::Span { .. } | Self::Numbers(_) => &[],
        }
    }

    pub(crate) fn into_column(self) -> Column {
        match self {
            Self::Span { lo, hi, n } => {
                Column::Numeric(stats::linspace(lo, hi, n).into_iter().map(Some).collect())
            }
            Self::Numbers(v) => Column::Numeric(v.into_iter().map(Some).collect()),
            Self::Labels(v) => Column::Categorical(v.into_iter().map(Some).collect()),
        }
    }
}

pub(crate) fn value_set(
    field: &Field,
    data: &Column,
    role: Role<'_>,
    options: &GridOptions,
) -> Result<ValueSet, GridError> {
    let set = match field.kind {
        ColumnKind::Numeric => numeric_values(field, data, role, options)?,
        ColumnKind::Categorical => {
            ValueSet::Labels(categorical_values(field, data, role, options)?)
        }
    };
    log::debug!("column '{}': {} representative value(s)", field.name, set.len());
    Ok(set)
}

// ---------------------------------------------------------------------------
// Numeric
// ---------------------------------------------------------------------------

fn numeric_values(
    field: &Field,
    data: &Column,
    role: Role<'_>,
    options: &GridOptions,
) -> Result<ValueSet, GridError> {
    let statistic: fn(&[f64]) -> Option<f64> = match role {
        Role::Target(TargetValues::Explicit(values)) => {
            return explicit_numbers(field, values).map(ValueSet::Numbers)
        }
        Role::Target(TargetValues::Length(n)) => return enumerate(field, data, *n, options.spread),
        Role::Target(TargetValues::Auto) => {
            return enumerate(field, data, options.length_out, options.spread)
        }
        Role::NonTarget => match options.numerics {
            NumericsPolicy::Combination => {
                return enumerate(field, data, options.length_out, options.spread)
            }
            NumericsPolicy::Mean => stats::mean,
            NumericsPolicy::Median => stats::median,
            NumericsPolicy::Min => stats::min,
            NumericsPolicy::Max => stats::max,
        },
    };
    let value = statistic(&observed_numbers(field, data)?).ok_or_else(|| no_values(field))?;
    Ok(ValueSet::Numbers(vec![value]))
}

fn enumerate(
    field: &Field,
    data: &Column,
    n: usize,
    spread: Spread,
) -> Result<ValueSet, GridError> {
    if n == 0 {
        return Err(GridError::InvalidParameter(format!(
            "column '{}': length must be a positive integer, got 0",
            field.name
        )));
    }
    let observed = observed_numbers(field, data)?;
    let bounds = match spread {
        Spread::Range => stats::min(&observed).zip(stats::max(&observed)),
        Spread::Iqr => stats::quantile(&observed, 0.25).zip(stats::quantile(&observed, 0.75)),
    };
    let (lo, hi) = bounds.ok_or_else(|| no_values(field))?;
    Ok(ValueSet::Span { lo, hi, n })
}

fn explicit_numbers(field: &Field, values: &[Value]) -> Result<Vec<f64>, GridError> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        let n = match value {
            Value::Number(n) => Some(*n),
            Value::Label(s) => s.trim().parse::<f64>().ok(),
            Value::Missing => None,
        }
        .filter(|n| n.is_finite())
        .ok_or_else(|| {
            GridError::InvalidParameter(format!(
                "column '{}': '{value}' is not a number",
                field.name
            ))
        })?;
        if seen.insert(OrderedFloat(n)) {
            out.push(n);
        }
    }
    non_empty_explicit(field, out)
}

fn observed_numbers(field: &Field, data: &Column) -> Result<Vec<f64>, GridError> {
    let observed = data.numbers();
    if observed.is_empty() {
        return Err(no_values(field));
    }
    Ok(observed)
}

// ---------------------------------------------------------------------------
// Categorical
// ---------------------------------------------------------------------------

fn categorical_values(
    field: &Field,
    data: &Column,
    role: Role<'_>,
    options: &GridOptions,
) -> Result<Vec<String>, GridError> {
    match role {
        Role::Target(TargetValues::Explicit(values)) => explicit_labels(field, values),
        Role::Target(TargetValues::Length(_)) => Err(GridError::InvalidParameter(format!(
            "column '{}': a length only applies to numeric targets",
            field.name
        ))),
        Role::Target(TargetValues::Auto) => observed_levels(field, data),
        Role::NonTarget => match options.factors {
            FactorsPolicy::Combination => observed_levels(field, data),
            FactorsPolicy::ReferenceLevel => {
                Ok(vec![reference_level(field, data, options.reference)?])
            }
        },
    }
}

/// Distinct observed labels in level order.
///
/// Level order is the declared level list when the field has one,
/// otherwise first-observed order.
pub(crate) fn observed_levels(field: &Field, data: &Column) -> Result<Vec<String>, GridError> {
    let labels = data.labels();
    if labels.is_empty() {
        return Err(no_values(field));
    }
    let levels = match &field.levels {
        Some(declared) => {
            let seen: FxHashSet<&str> = labels.into_iter().collect();
            declared.iter().filter(|l| seen.contains(l.as_str())).cloned().collect()
        }
        None => {
            let mut seen = FxHashSet::default();
            labels
                .into_iter()
                .filter(|l| seen.insert(*l))
                .map(str::to_string)
                .collect()
        }
    };
    Ok(levels)
}

fn reference_level(
    field: &Field,
    data: &Column,
    rule: ReferenceLevel,
) -> Result<String, GridError> {
    let levels = observed_levels(field, data)?;
    let chosen = match rule {
        ReferenceLevel::FirstLevel => levels.into_iter().next(),
        ReferenceLevel::MostFrequent => {
            let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
            for label in data.labels() {
                *counts.entry(label).or_default() += 1;
            }
            let mut best: Option<(&String, usize)> = None;
            for level in &levels {
                let count = counts.get(level.as_str()).copied().unwrap_or(0);
                if best.is_none_or(|(_, c)| count > c) {
                    best = Some((level, count));
                }
            }
            best.map(|(level, _)| level.clone())
        }
    };
    chosen.ok_or_else(|| no_values(field))
}

fn explicit_labels(field: &Field, values: &[Value]) -> Result<Vec<String>, GridError> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        let label = match value {
            Value::Label(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Missing => {
                return Err(GridError::InvalidParameter(format!(
                    "column '{}': missing value in explicit target values",
                    field.name
                )))
            }
        };
        if field.levels.is_some() && field.level_index(&label).is_none() {
            return Err(GridError::InvalidParameter(format!(
                "column '{}': '{label}' is not a declared level",
                field.name
            )));
        }
        if seen.insert(label.clone()) {
            out.push(label);
        }
    }
    non_empty_explicit(field, out)
}

fn non_empty_explicit<T>(field: &Field, values: Vec<T>) -> Result<Vec<T>, GridError> {
    if values.is_empty() {
        return Err(GridError::InvalidParameter(format!(
            "column '{}': explicit target values are empty",
            field.name
        )));
    }
    Ok(values)
}

fn no_values(field: &Field) -> GridError {
    GridError::NoObservedValues {
        column: field.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refgrid_core::Schema;

    fn table() -> Table {
        let schema = Schema::new(vec![
            Field::factor("Salary", ["<1000", "<2000", "2000+"]),
            Field::categorical("City"),
            Field::numeric("Age"),
        ])
        .unwrap();
        Table::new(
            schema,
            vec![
                Column::from(vec!["2000+", "<1000", "<2000", "2000+", "2000+"]),
                Column::from(vec!["Oslo", "Lima", "Lima", "Oslo", "Lima"]),
                Column::Numeric(vec![Some(10.0), Some(20.0), None, Some(40.0), Some(50.0)]),
            ],
        )
        .unwrap()
    }

    fn values(column: &str, role: Role<'_>, options: &GridOptions) -> Vec<Value> {
        let set = representative_values(&table(), column, role, options).unwrap();
        (0..set.len()).map(|i| set.get(i).unwrap()).collect()
    }

    #[test]
    fn numeric_target_spans_range() {
        let opts = GridOptions::default().length_out(5);
        let got = values("Age", Role::Target(&TargetValues::Auto), &opts);
        let want: Vec<Value> = [10.0, 20.0, 30.0, 40.0, 50.0].map(Value::Number).into();
        assert_eq!(got, want);
    }

    #[test]
    fn numeric_target_length_one_is_minimum() {
        let opts = GridOptions::default().length_out(1);
        let got = values("Age", Role::Target(&TargetValues::Auto), &opts);
        assert_eq!(got, vec![Value::Number(10.0)]);
    }

    #[test]
    fn per_target_length_overrides_options() {
        let opts = GridOptions::default();
        let got = values("Age", Role::Target(&TargetValues::Length(3)), &opts);
        assert_eq!(got, [10.0, 30.0, 50.0].map(Value::Number).to_vec());
    }

    #[test]
    fn iqr_spread() {
        let opts = GridOptions::default().length_out(2).spread(Spread::Iqr);
        // observed 10, 20, 40, 50 -> q1 = 17.5, q3 = 42.5
        let got = values("Age", Role::Target(&TargetValues::Auto), &opts);
        assert_eq!(got, vec![Value::Number(17.5), Value::Number(42.5)]);
    }

    #[test]
    fn non_target_numeric_statistics() {
        let cases = [
            (NumericsPolicy::Mean, 30.0),
            (NumericsPolicy::Median, 30.0),
            (NumericsPolicy::Min, 10.0),
            (NumericsPolicy::Max, 50.0),
        ];
        for (policy, expected) in cases {
            let opts = GridOptions::default().numerics(policy);
            let got = values("Age", Role::NonTarget, &opts);
            assert_eq!(got, vec![Value::Number(expected)], "{policy}");
        }
    }

    #[test]
    fn non_target_numeric_combination_enumerates() {
        let opts = GridOptions::default().length_out(3).numerics(NumericsPolicy::Combination);
        assert_eq!(values("Age", Role::NonTarget, &opts).len(), 3);
    }

    #[test]
    fn categorical_target_uses_declared_order() {
        let got = values("Salary", Role::Target(&TargetValues::Auto), &GridOptions::default());
        assert_eq!(got, vec![Value::label("<1000"), Value::label("<2000"), Value::label("2000+")]);
    }

    #[test]
    fn categorical_target_without_levels_uses_first_observed() {
        let got = values("City", Role::Target(&TargetValues::Auto), &GridOptions::default());
        assert_eq!(got, vec![Value::label("Oslo"), Value::label("Lima")]);
    }

    #[test]
    fn reference_level_rules_can_differ() {
        let first = GridOptions::default();
        assert_eq!(values("Salary", Role::NonTarget, &first), vec![Value::label("<1000")]);

        let frequent = GridOptions::default().reference(ReferenceLevel::MostFrequent);
        assert_eq!(values("Salary", Role::NonTarget, &frequent), vec![Value::label("2000+")]);
    }

    #[test]
    fn most_frequent_tie_goes_to_earlier_level() {
        let schema = Schema::new(vec![Field::factor("G", ["b", "a"])]).unwrap();
        let table = Table::new(schema, vec![Column::from(vec!["a", "b", "a", "b"])]).unwrap();
        let opts = GridOptions::default().reference(ReferenceLevel::MostFrequent);
        let set = representative_values(&table, "G", Role::NonTarget, &opts).unwrap();
        assert_eq!(set, Column::from(vec!["b"]));
    }

    #[test]
    fn non_target_categorical_combination() {
        let opts = GridOptions::default().factors(FactorsPolicy::Combination);
        assert_eq!(values("City", Role::NonTarget, &opts).len(), 2);
    }

    #[test]
    fn explicit_values_are_deduplicated() {
        let explicit = TargetValues::Explicit(vec![
            Value::label("25"),
            Value::Number(35.0),
            Value::Number(25.0),
        ]);
        let got = values("Age", Role::Target(&explicit), &GridOptions::default());
        assert_eq!(got, vec![Value::Number(25.0), Value::Number(35.0)]);
    }

    #[test]
    fn explicit_values_checked_against_kind_and_levels() {
        let opts = GridOptions::default();
        let bad_number = TargetValues::Explicit(vec![Value::label("old")]);
        let err =
            representative_values(&table(), "Age", Role::Target(&bad_number), &opts).unwrap_err();
        assert!(err.to_string().contains("'old' is not a number"));

        let bad_level = TargetValues::Explicit(vec![Value::label("5000+")]);
        let err = representative_values(&table(), "Salary", Role::Target(&bad_level), &opts)
            .unwrap_err();
        assert!(err.to_string().contains("not a declared level"));

        let empty = TargetValues::Explicit(Vec::new());
        let err = representative_values(&table(), "Age", Role::Target(&empty), &opts).unwrap_err();
        assert!(matches!(err, GridError::InvalidParameter(_)));
    }

    #[test]
    fn length_on_categorical_target_rejected() {
        let err = representative_values(
            &table(),
            "City",
            Role::Target(&TargetValues::Length(2)),
            &GridOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GridError::InvalidParameter(_)));
    }

    #[test]
    fn all_missing_column_has_no_values() {
        let schema = Schema::new(vec![Field::numeric("X")]).unwrap();
        let table = Table::new(schema, vec![Column::Numeric(vec![None, None])]).unwrap();
        let opts = GridOptions::default();
        let err = representative_values(&table, "X", Role::NonTarget, &opts).unwrap_err();
        assert_eq!(err, GridError::NoObservedValues { column: "X".into() });
    }

    #[test]
    fn unknown_column() {
        let opts = GridOptions::default();
        let err = representative_values(&table(), "Nope", Role::NonTarget, &opts).unwrap_err();
        assert_eq!(err, GridError::ColumnNotFound { column: "Nope".into() });
    }

    #[test]
    fn infinities_are_not_observations() {
        let schema = Schema::new(vec![Field::numeric("X")]).unwrap();
        let column = Column::from(vec![0.0, f64::INFINITY, 2.0, f64::NEG_INFINITY]);
        let table = Table::new(schema, vec![column]).unwrap();
        let opts = GridOptions::default().length_out(3);

        let set = representative_values(&table, "X", Role::Target(&TargetValues::Auto), &opts);
        assert_eq!(set.unwrap(), Column::from(vec![0.0, 1.0, 2.0]));
        let mean = representative_values(&table, "X", Role::NonTarget, &opts).unwrap();
        assert_eq!(mean, Column::from(vec![1.0]));

        let explicit = TargetValues::Explicit(vec![Value::Number(f64::INFINITY)]);
        let err = representative_values(&table, "X", Role::Target(&explicit), &opts).unwrap_err();
        assert!(matches!(err, GridError::InvalidParameter(_)));
    }

    #[test]
    fn span_is_sized_without_enumerating() {
        let huge = TargetValues::Length(usize::MAX);
        let set = value_set(
            &table().schema().fields()[2],
            &table().columns()[2],
            Role::Target(&huge),
            &GridOptions::default(),
        )
        .unwrap();
        assert_eq!(set.len(), usize::MAX);

        let err = representative_values(
            &table(),
            "Age",
            Role::Target(&huge),
            &GridOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("exceed the limit"));
    }

    #[test]
    fn constant_span_has_one_value() {
        let set = ValueSet::Span {
            lo: 4.0,
            hi: 4.0,
            n: 10,
        };
        assert_eq!(set.len(), 1);
        assert_eq!(set.into_column(), Column::from(vec![4.0]));
    }
}
