use crate::game::{is_legal_action, NUM_ACTIONS};

/// Action values for one pile size, indexed by action.
pub type Row = [f64; NUM_ACTIONS];

/// Index of the largest value, lowest index on ties.
fn first_max<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = (usize, f64)>,
{
    let mut best: Option<(usize, f64)> = None;
    for (action, value) in values {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((action, value)),
        }
    }
    best.map(|(action, _)| action)
}

/// Mutable value table owned by the trainer while learning.
///
/// Row `s` holds the estimates for a pile of `s` stones. Row 0 is never
/// stepped from but is bootstrapped from on terminal transitions, so it exists
/// and stays at zero.
#[derive(Debug, Clone)]
pub struct QTableBuilder {
    rows: Vec<Row>,
}

impl QTableBuilder {
    /// All-zero table covering piles `0..=max_stones`.
    pub fn zeros(max_stones: u32) -> Self {
        QTableBuilder {
            rows: vec![[0.0; NUM_ACTIONS]; max_stones as usize + 1],
        }
    }

    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, stones: u32) -> &Row {
        &self.rows[stones as usize]
    }

    pub fn value(&self, stones: u32, action: usize) -> f64 {
        self.rows[stones as usize][action]
    }

    pub fn max_value(&self, stones: u32) -> f64 {
        self.row(stones)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Greedy action over all three actions, legal or not.
    pub fn best_action(&self, stones: u32) -> usize {
        first_max(self.row(stones).iter().copied().enumerate()).unwrap_or(0)
    }

    /// Move `Q[stones, action]` toward `target` by `learning_rate`. Returns the TD error.
    pub fn update(&mut self, stones: u32, action: usize, target: f64, learning_rate: f64) -> f64 {
        let entry = &mut self.rows[stones as usize][action];
        let td_error = target - *entry;
        *entry += learning_rate * td_error;
        td_error
    }

    /// Freeze the table for inference and persistence.
    pub fn finalize(self) -> QTable {
        QTable { rows: self.rows }
    }
}

/// Immutable value table handed to inference once training is done.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    rows: Vec<Row>,
}

impl QTable {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        QTable { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    /// Largest pile size the table has a row for.
    pub fn max_stones(&self) -> u32 {
        self.rows.len().saturating_sub(1) as u32
    }

    pub fn row(&self, stones: u32) -> Option<&Row> {
        self.rows.get(stones as usize)
    }

    /// Greedy action over all three actions, legal or not.
    pub fn best_action(&self, stones: u32) -> Option<usize> {
        self.row(stones)
            .and_then(|row| first_max(row.iter().copied().enumerate()))
    }

    /// Greedy action among those that remove no more than `stones`.
    ///
    /// `None` when there is no row for `stones` or no legal action.
    pub fn best_legal_action(&self, stones: u32) -> Option<usize> {
        let row = self.row(stones)?;
        first_max(
            row.iter()
                .copied()
                .enumerate()
                .filter(|&(a, _)| is_legal_action(a, stones)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_shape() {
        let table = QTableBuilder::zeros(21);
        assert_eq!(table.num_states(), 22);
        assert!(table.row(0).iter().all(|&v| v == 0.0));
        assert_eq!(table.max_value(0), 0.0);
    }

    #[test]
    fn test_first_max_tie_break() {
        let table = QTableBuilder::zeros(5);
        assert_eq!(table.best_action(5), 0);

        let frozen = QTable::from_rows(vec![[0.0; 3], [0.5, 0.7, 0.7]]);
        assert_eq!(frozen.best_action(1), Some(1));
    }

    #[test]
    fn test_update_moves_toward_target() {
        let mut table = QTableBuilder::zeros(3);
        let td = table.update(3, 2, 1.0, 0.5);
        assert!((td - 1.0).abs() < 1e-12);
        assert!((table.value(3, 2) - 0.5).abs() < 1e-12);
        table.update(3, 2, 1.0, 0.5);
        assert!((table.value(3, 2) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_best_legal_action_masks_illegal() {
        // Illegal actions carry the largest values but must never be chosen.
        let table = QTable::from_rows(vec![
            [0.0; 3],
            [-1.0, 5.0, 9.0],
            [-2.0, -1.0, 9.0],
            [0.1, 0.2, 0.3],
        ]);
        assert_eq!(table.best_legal_action(1), Some(0));
        assert_eq!(table.best_legal_action(2), Some(1));
        assert_eq!(table.best_legal_action(3), Some(2));
        assert_eq!(table.best_legal_action(0), None);
        assert_eq!(table.best_legal_action(4), None);
    }

    #[test]
    fn test_finalize_keeps_values() {
        let mut builder = QTableBuilder::zeros(2);
        builder.update(2, 1, 1.0, 1.0);
        let table = builder.finalize();
        assert_eq!(table.row(2), Some(&[0.0, 1.0, 0.0]));
        assert_eq!(table.max_stones(), 2);
    }
}
