//! Pivot tables
//!
//! Reshapes grouped rows so one key becomes the rows and another the
//! columns. Keys are sorted ascending; cells with no data are 0.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotTable<R, C> {
    pub rows: Vec<R>,
    pub columns: Vec<C>,
    /// `cells[row][column]`
    pub cells: Vec<Vec<u64>>,
}

impl<R: Ord + Clone, C: Ord + Clone> PivotTable<R, C> {
    /// Pivot `items`. Repeated (row, column) keys accumulate.
    pub fn from_rows<T>(
        items: &[T],
        row_key: impl Fn(&T) -> R,
        col_key: impl Fn(&T) -> C,
        value: impl Fn(&T) -> u64,
    ) -> Self {
        let mut grid: BTreeMap<R, BTreeMap<C, u64>> = BTreeMap::new();
        let mut columns: BTreeSet<C> = BTreeSet::new();

        for item in items {
            let col = col_key(item);
            columns.insert(col.clone());
            *grid.entry(row_key(item)).or_default().entry(col).or_insert(0) += value(item);
        }

        let columns: Vec<C> = columns.into_iter().collect();
        let mut rows = Vec::with_capacity(grid.len());
        let mut cells = Vec::with_capacity(grid.len());

        for (row, values) in grid {
            cells.push(
                columns
                    .iter()
                    .map(|c| values.get(c).copied().unwrap_or(0))
                    .collect(),
            );
            rows.push(row);
        }

        Self { rows, columns, cells }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value, 0 when either key is absent
    pub fn get(&self, row: &R, col: &C) -> u64 {
        let (Ok(r), Ok(c)) = (self.rows.binary_search(row), self.columns.binary_search(col)) else {
            return 0;
        };
        self.cells[r][c]
    }

    pub fn row_total(&self, row: &R) -> u64 {
        self.rows
            .binary_search(row)
            .map(|r| self.cells[r].iter().sum())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::YearUsage;

    fn usage(dataset: &str, year: i64, count: u64) -> YearUsage {
        YearUsage {
            dataset: dataset.into(),
            year,
            count,
        }
    }

    #[test]
    fn test_missing_cells_are_zero() {
        let items = vec![usage("MNIST", 2019, 3), usage("COCO", 2020, 2), usage("MNIST", 2021, 1)];
        let table = PivotTable::from_rows(&items, |u| u.year, |u| u.dataset.clone(), |u| u.count);

        assert_eq!(table.rows, vec![2019, 2020, 2021]);
        assert_eq!(table.columns, vec!["COCO".to_string(), "MNIST".to_string()]);
        assert_eq!(table.cells, vec![vec![0, 3], vec![2, 0], vec![0, 1]]);
        assert_eq!(table.get(&2020, &"MNIST".to_string()), 0);
        assert_eq!(table.get(&1999, &"MNIST".to_string()), 0);
    }

    #[test]
    fn test_duplicate_keys_accumulate() {
        let items = vec![usage("A", 2020, 2), usage("A", 2020, 5)];
        let table = PivotTable::from_rows(&items, |u| u.dataset.clone(), |u| u.year, |u| u.count);

        assert_eq!(table.get(&"A".to_string(), &2020), 7);
        assert_eq!(table.row_total(&"A".to_string()), 7);
    }

    #[test]
    fn test_empty_input() {
        let table: PivotTable<String, i64> =
            PivotTable::from_rows(&[] as &[YearUsage], |u| u.dataset.clone(), |u| u.year, |u| u.count);
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }
}
