use refgrid_core::{Column, ColumnKind, Field, Schema, Table};
use rustc_hash::FxHashSet;

use crate::error::GridError;
use crate::policy::{GridOptions, MAX_GRID_ROWS};
use crate::representative::{observed_levels, value_set, Role, ValueSet};
use crate::target::Target;

/// Build a reference grid over `table`.
///
/// Output columns are the targets in the order given, followed by every
/// other column in table order. Rows are the Cartesian product of each
/// column's representative values, with the first output column varying
/// slowest. The result is a plain [`Table`] and can be fed back in.
///
/// Grids of more than [`MAX_GRID_ROWS`] rows are rejected before any
/// value is enumerated.
pub fn build_grid<I, T>(
    table: &Table,
    targets: I,
    options: &GridOptions,
) -> Result<Table, GridError>
where
    I: IntoIterator<Item = T>,
    T: Into<Target>,
{
    let plan = plan(table, targets, options)?;
    let total = row_count(&plan)?;
    if total > MAX_GRID_ROWS {
        return Err(GridError::InvalidParameter(format!(
            "grid too large: {total} rows exceed the limit of {MAX_GRID_ROWS}"
        )));
    }

    let mut fields = Vec::with_capacity(plan.len());
    let mut columns = Vec::with_capacity(plan.len());
    let mut stride = total;
    for (field, set) in plan {
        let set = set.into_column();
        stride /= set.len();
        columns.push(expand(&set, stride, total));
        fields.push(field);
    }

    log::debug!("reference grid: {} column(s) x {} row(s)", columns.len(), total);
    Ok(Table::new(Schema::new(fields)?, columns)?)
}

/// Number of rows `build_grid` would produce, without assembling them.
///
/// The count is not capped; a result above [`MAX_GRID_ROWS`] means
/// `build_grid` would refuse the same arguments.
pub fn expected_row_count<I, T>(
    table: &Table,
    targets: I,
    options: &GridOptions,
) -> Result<usize, GridError>
where
    I: IntoIterator<Item = T>,
    T: Into<Target>,
{
    row_count(&plan(table, targets, options)?)
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Validate inputs and resolve every column's representative set, in output
/// column order. Enumerations are left unmaterialised. Each output field
/// carries an explicit level list.
fn plan<I, T>(
    table: &Table,
    targets: I,
    options: &GridOptions,
) -> Result<Vec<(Field, ValueSet)>, GridError>
where
    I: IntoIterator<Item = T>,
    T: Into<Target>,
{
    options.validate()?;

    let targets: Vec<Target> = targets.into_iter().map(Into::into).collect();
    if targets.is_empty() {
        return Err(GridError::InvalidParameter("at least one target is required".into()));
    }
    if table.column_count() == 0 || table.row_count() == 0 {
        return Err(GridError::EmptyInput);
    }

    let schema = table.schema();
    let mut target_idx = Vec::with_capacity(targets.len());
    let mut seen = FxHashSet::default();
    for target in &targets {
        let idx = schema.index_of(&target.column).ok_or_else(|| GridError::ColumnNotFound {
            column: target.column.clone(),
        })?;
        if !seen.insert(idx) {
            return Err(GridError::InvalidParameter(format!(
                "duplicate target '{}'",
                target.column
            )));
        }
        target_idx.push(idx);
    }

    let non_targets = (0..schema.len()).filter(|i| !seen.contains(i));
    let order = target_idx
        .iter()
        .zip(&targets)
        .map(|(&idx, target)| (idx, Role::Target(&target.values)))
        .chain(non_targets.map(|idx| (idx, Role::NonTarget)));

    let mut plan = Vec::with_capacity(schema.len());
    for (idx, role) in order {
        let field = &schema.fields()[idx];
        let data = &table.columns()[idx];
        let set = value_set(field, data, role, options)?;
        plan.push((output_field(field, data, &set), set));
    }
    Ok(plan)
}

/// Materialise the level ordering so a chained call sees the same order
/// (and therefore the same reference level) as this one.
fn output_field(field: &Field, data: &Column, set: &ValueSet) -> Field {
    if field.kind != ColumnKind::Categorical || field.levels.is_some() {
        return field.clone();
    }
    let mut levels = observed_levels(field, data).unwrap_or_default();
    for label in set.labels() {
        if !levels.contains(label) {
            levels.push(label.clone());
        }
    }
    Field::factor(field.name.clone(), levels)
}

fn row_count(plan: &[(Field, ValueSet)]) -> Result<usize, GridError> {
    plan.iter().try_fold(1usize, |acc, (field, set)| {
        acc.checked_mul(set.len()).ok_or_else(|| {
            GridError::InvalidParameter(format!(
                "grid too large: row count overflows at column '{}'",
                field.name
            ))
        })
    })
}

/// Repeat each value of `set` `stride` times, cycling until `total` rows.
fn expand(set: &Column, stride: usize, total: usize) -> Column {
    let n = set.len();
    match set {
        Column::Numeric(v) => Column::Numeric((0..total).map(|r| v[(r / stride) % n]).collect()),
        Column::Categorical(v) => {
            Column::Categorical((0..total).map(|r| v[(r / stride) % n].clone()).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{FactorsPolicy, NumericsPolicy};
    use refgrid_core::Value;

    fn table() -> Table {
        let schema = Schema::new(vec![
            Field::numeric("Age"),
            Field::categorical("Salary"),
            Field::numeric("Concealing"),
        ])
        .unwrap();
        Table::new(
            schema,
            vec![
                Column::from(vec![0.0, 0.11, 0.22]),
                Column::from(vec!["<2000", "<1000", "2000+"]),
                Column::from(vec![-2.52, 0.5, 3.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn targets_first_then_table_order() {
        let grid = build_grid(&table(), ["Concealing"], &GridOptions::default()).unwrap();
        assert_eq!(
            grid.schema().names().collect::<Vec<_>>(),
            vec!["Concealing", "Age", "Salary"]
        );
    }

    #[test]
    fn first_column_varies_slowest() {
        let opts = GridOptions::default().length_out(2);
        let grid = build_grid(&table(), ["Salary", "Concealing"], &opts).unwrap();
        assert_eq!(grid.row_count(), 6);
        let salary: Vec<_> = (0..6).map(|r| grid.value(r, "Salary").unwrap()).collect();
        assert_eq!(
            salary,
            ["<2000", "<2000", "<1000", "<1000", "2000+", "2000+"].map(Value::label).to_vec()
        );
        let concealing: Vec<_> = (0..6).map(|r| grid.value(r, "Concealing").unwrap()).collect();
        assert_eq!(concealing, [-2.52, 3.0, -2.52, 3.0, -2.52, 3.0].map(Value::Number).to_vec());
    }

    #[test]
    fn output_levels_are_materialised() {
        let grid = build_grid(&table(), ["Age"], &GridOptions::default()).unwrap();
        let salary = grid.field("Salary").unwrap();
        assert_eq!(
            salary.levels.as_deref(),
            Some(&["<2000".to_string(), "<1000".to_string(), "2000+".to_string()][..])
        );
        assert_eq!(grid.value(0, "Salary"), Some(Value::label("<2000")));
    }

    #[test]
    fn expected_count_matches_grid() {
        let opts = GridOptions::default()
            .length_out(4)
            .numerics(NumericsPolicy::Combination)
            .factors(FactorsPolicy::Combination);
        let expected = expected_row_count(&table(), ["Age"], &opts).unwrap();
        assert_eq!(expected, 4 * 3 * 4);
        assert_eq!(build_grid(&table(), ["Age"], &opts).unwrap().row_count(), expected);
    }

    #[test]
    fn rejects_duplicate_and_empty_targets() {
        let err = build_grid(&table(), ["Age", "Age"], &GridOptions::default()).unwrap_err();
        assert_eq!(err, GridError::InvalidParameter("duplicate target 'Age'".into()));

        let err = build_grid(&table(), Vec::<Target>::new(), &GridOptions::default()).unwrap_err();
        assert!(matches!(err, GridError::InvalidParameter(_)));
    }

    #[test]
    fn rejects_empty_table() {
        let schema = Schema::new(vec![Field::numeric("Age")]).unwrap();
        let empty = Table::new(schema, vec![Column::Numeric(Vec::new())]).unwrap();
        let err = build_grid(&empty, ["Age"], &GridOptions::default()).unwrap_err();
        assert_eq!(err, GridError::EmptyInput);
    }

    #[test]
    fn huge_length_is_rejected_before_enumerating() {
        let opts = GridOptions::default().length_out(usize::MAX);
        let err = build_grid(&table(), ["Concealing"], &opts).unwrap_err();
        assert!(matches!(err, GridError::InvalidParameter(ref m) if m.contains("grid too large")));

        // The count itself is cheap: Age and Salary contribute one value each.
        assert_eq!(expected_row_count(&table(), ["Concealing"], &opts), Ok(usize::MAX));
    }

    #[test]
    fn row_count_overflow_is_reported() {
        let opts = GridOptions::default().length_out(usize::MAX);
        let err = expected_row_count(&table(), ["Concealing", "Age"], &opts).unwrap_err();
        assert_eq!(
            err,
            GridError::InvalidParameter(
                "grid too large: row count overflows at column 'Age'".into()
            )
        );
    }

    #[test]
    fn grid_just_over_the_row_limit_is_rejected() {
        let opts = GridOptions::default().length_out(MAX_GRID_ROWS + 1);
        assert_eq!(
            expected_row_count(&table(), ["Concealing"], &opts),
            Ok(MAX_GRID_ROWS + 1)
        );
        assert!(build_grid(&table(), ["Concealing"], &opts).is_err());
    }
}
