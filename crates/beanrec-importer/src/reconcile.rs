//! Chronological reconciliation of statement rows.
//!
//! Statement exports rarely say in which order same-day transactions were
//! posted, and some list rows newest first. Every row does carry the running
//! balance, though, so the true order is the one in which each balance equals
//! the previous balance plus the row's amount.
//!
//! [`reconcile`] searches for that order. Any row of the earliest date could
//! be the first one, so each of them proposes an opening balance; for each
//! candidate the rows are placed greedily, deferring the ones that do not fit
//! yet and giving them another chance whenever the balance moves.

use rust_decimal::Decimal;
use tracing::debug;

use crate::Row;

/// Outcome of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// The rows, in balance order when `unbalanced` is `None` and in their
    /// original order otherwise.
    pub rows: Vec<Row>,
    /// Line of the first row that could not be placed under the last opening
    /// balance tried, if no ordering agrees with the balances.
    pub unbalanced: Option<usize>,
}

impl Reconciled {
    /// Rows whose order agrees with their balances.
    pub const fn balanced(rows: Vec<Row>) -> Self {
        Self {
            rows,
            unbalanced: None,
        }
    }

    /// Whether the balance values of the rows could be trusted.
    pub const fn is_balanced(&self) -> bool {
        self.unbalanced.is_none()
    }
}

/// Where a placement attempt stands after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// The last row was placed.
    Placing,
    /// The last row did not fit and was set aside.
    Deferred,
    /// Every row was placed.
    Done,
    /// No further row can be placed.
    Stuck,
}

/// Result of one placement attempt.
#[derive(Debug)]
enum Outcome {
    /// Indices of all rows, in balance order.
    Balanced(Vec<usize>),
    /// Index of the first row that was set aside when the attempt stopped.
    Stuck { first_unplaced: usize },
}

/// Greedy placement of rows starting from one opening balance.
struct Attempt<'a> {
    rows: &'a [Row],
    /// Rows still to visit; the next one is at the end.
    pending: Vec<usize>,
    /// Rows that did not fit the balance when visited.
    deferred: Vec<usize>,
    placed: Vec<usize>,
    balance: Decimal,
}

impl<'a> Attempt<'a> {
    fn new(rows: &'a [Row], opening: Decimal) -> Self {
        Self {
            rows,
            pending: (0..rows.len()).rev().collect(),
            deferred: Vec::new(),
            placed: Vec::with_capacity(rows.len()),
            balance: opening,
        }
    }

    fn step(&mut self) -> State {
        let rows = self.rows;
        let Some(index) = self.pending.pop() else {
            return if self.deferred.is_empty() {
                State::Done
            } else {
                State::Stuck
            };
        };
        let row = &rows[index];

        if row.follows(self.balance) {
            self.placed.push(index);
            self.balance = row.balance;
            // The new balance may suit the rows set aside so far
            self.pending.append(&mut self.deferred);
            return State::Placing;
        }

        // Rows of two different dates that both fail to fit cannot be told apart
        if self
            .deferred
            .first()
            .is_some_and(|&first| rows[first].date != row.date)
        {
            return State::Stuck;
        }
        self.deferred.push(index);
        State::Deferred
    }

    fn run(mut self) -> Outcome {
        loop {
            match self.step() {
                State::Placing | State::Deferred => {}
                State::Done => return Outcome::Balanced(self.placed),
                State::Stuck => {
                    return Outcome::Stuck {
                        first_unplaced: self.deferred[0],
                    }
                }
            }
        }
    }
}

/// Order `rows` so that their balance values agree with their amounts.
///
/// `rows` must be sorted by ascending date; the order within a date does not
/// matter. The first opening balance, in row order, that lets every row be
/// placed wins. When duplicate balances allow more than one consistent
/// order this choice is arbitrary.
///
/// When no order agrees with the balances, the rows come back untouched
/// together with the line of the first row the last attempt could not place.
pub fn reconcile(rows: Vec<Row>) -> Reconciled {
    if rows.len() <= 1 {
        return Reconciled::balanced(rows);
    }

    // Any row of the earliest date might have come first
    let first_date = rows[0].date;
    let openings: Vec<Decimal> = rows
        .iter()
        .take_while(|row| row.date == first_date)
        .map(Row::opening_balance)
        .collect();

    let mut unbalanced = None;
    for opening in openings {
        match Attempt::new(&rows, opening).run() {
            Outcome::Balanced(order) => {
                debug!(%opening, rows = rows.len(), "rows agree with balance values");
                return Reconciled::balanced(arrange(rows, &order));
            }
            Outcome::Stuck { first_unplaced } => {
                let lineno = rows[first_unplaced].lineno;
                debug!(%opening, lineno, "opening balance rejected");
                unbalanced = Some(lineno);
            }
        }
    }

    Reconciled { rows, unbalanced }
}

/// Move rows into the order given by `order`, a permutation of their indices.
fn arrange(rows: Vec<Row>, order: &[usize]) -> Vec<Row> {
    let mut slots: Vec<Option<Row>> = rows.into_iter().map(Some).collect();
    order.iter().filter_map(|&index| slots[index].take()).collect()
}
