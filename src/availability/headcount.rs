use super::grid::AvailabilityGrid;
use super::symbol::Symbol;

/// Five availability counts for one date, taken over every member column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadcountRow {
    pub date: String,
    /// ◎ answers.
    pub full_day: usize,
    /// ◎ or ○ answers.
    pub evening_or_undecided: usize,
    /// ◎ or △ answers.
    pub day_or_undecided: usize,
    /// ○ answers.
    pub evening_only: usize,
    /// △ answers.
    pub day_only: usize,
}

/// Derives the per-date headcount rows from a (possibly month-filtered)
/// grid. Pure projection: `×`, `-` and missing cells count toward nothing.
pub fn summarize(grid: &AvailabilityGrid) -> Vec<HeadcountRow> {
    grid.rows()
        .iter()
        .map(|row| {
            let count = |accept: fn(Symbol) -> bool| {
                row.cells.iter().filter(|cell| accept(**cell)).count()
            };
            HeadcountRow {
                date: row.date.clone(),
                full_day: count(|s| s == Symbol::FullDay),
                evening_or_undecided: count(|s| matches!(s, Symbol::FullDay | Symbol::Evening)),
                day_or_undecided: count(|s| matches!(s, Symbol::FullDay | Symbol::Daytime)),
                evening_only: count(|s| s == Symbol::Evening),
                day_only: count(|s| s == Symbol::Daytime),
            }
        })
        .collect()
}
