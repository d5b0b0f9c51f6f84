use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::AvailabilityGrid;
use super::symbol::{acceptable_symbols, Level, Symbol};

/// The current extraction request: which members must all be available, and
/// at which confidence level. Held by the session layer between requests
/// and passed in explicitly on every board render.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionQuery {
    pub members: Vec<String>,
    pub level: Level,
}

/// A member was selected that has no column in the current grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("選択されたメンバーが見つかりません: {member}")]
pub struct MissingMemberError {
    pub member: String,
}

/// Extraction output: the selected member columns and the date rows on
/// which every selected member qualifies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub members: Vec<String>,
    pub rows: Vec<ExtractionRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRow {
    pub date: String,
    pub cells: Vec<Symbol>,
}

/// Filters the grid down to the dates where every selected member's symbol
/// is acceptable at the query's level, restricted to the selected columns
/// in selection order.
///
/// A selected member without a grid column is a validation failure, never
/// treated as always-unavailable. Empty selections are the caller's
/// concern: the web surface skips extraction entirely for them.
pub fn extract(
    grid: &AvailabilityGrid,
    query: &ExtractionQuery,
) -> Result<ExtractionResult, MissingMemberError> {
    let columns: Vec<usize> = query
        .members
        .iter()
        .map(|member| {
            grid.member_index(member).ok_or_else(|| MissingMemberError {
                member: member.clone(),
            })
        })
        .collect::<Result<_, _>>()?;

    let acceptable = acceptable_symbols(query.level);

    let rows = grid
        .rows()
        .iter()
        .filter(|row| columns.iter().all(|&col| acceptable.contains(&row.cells[col])))
        .map(|row| ExtractionRow {
            date: row.date.clone(),
            cells: columns.iter().map(|&col| row.cells[col]).collect(),
        })
        .collect();

    Ok(ExtractionResult {
        members: query.members.clone(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::grid::AttendanceRecord;

    fn grid() -> AvailabilityGrid {
        AvailabilityGrid::from_records(&[
            AttendanceRecord {
                date: "4/1".to_string(),
                member: "a".to_string(),
                symbol: Symbol::FullDay,
            },
            AttendanceRecord {
                date: "4/1".to_string(),
                member: "b".to_string(),
                symbol: Symbol::Evening,
            },
            AttendanceRecord {
                date: "4/2".to_string(),
                member: "a".to_string(),
                symbol: Symbol::Unavailable,
            },
            AttendanceRecord {
                date: "4/2".to_string(),
                member: "b".to_string(),
                symbol: Symbol::FullDay,
            },
        ])
    }

    fn query(members: &[&str], level: Level) -> ExtractionQuery {
        ExtractionQuery {
            members: members.iter().map(|m| m.to_string()).collect(),
            level,
        }
    }

    #[test]
    fn row_included_when_all_selected_qualify() {
        let result = extract(&grid(), &query(&["a", "b"], Level::Evening)).unwrap();
        let dates: Vec<&str> = result.rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["4/1"]);
        assert_eq!(result.rows[0].cells, vec![Symbol::FullDay, Symbol::Evening]);
    }

    #[test]
    fn row_excluded_when_one_selected_fails() {
        let result = extract(&grid(), &query(&["a", "b"], Level::DaytimeOnly)).unwrap();
        assert!(result.rows.is_empty());
    }

    #[test]
    fn all_level_keeps_every_row() {
        let result = extract(&grid(), &query(&["a", "b"], Level::All)).unwrap();
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn columns_follow_selection_order() {
        let result = extract(&grid(), &query(&["b", "a"], Level::All)).unwrap();
        assert_eq!(result.members, vec!["b", "a"]);
        assert_eq!(result.rows[0].cells, vec![Symbol::Evening, Symbol::FullDay]);
    }

    #[test]
    fn unknown_member_is_a_validation_error() {
        let err = extract(&grid(), &query(&["a", "z"], Level::FullDay)).unwrap_err();
        assert_eq!(err.member, "z");
    }

    #[test]
    fn unanswered_member_does_not_block_a_date() {
        let grid = AvailabilityGrid::from_records(&[
            AttendanceRecord {
                date: "4/1".to_string(),
                member: "a".to_string(),
                symbol: Symbol::FullDay,
            },
            AttendanceRecord {
                date: "4/2".to_string(),
                member: "a".to_string(),
                symbol: Symbol::Unavailable,
            },
            AttendanceRecord {
                date: "4/2".to_string(),
                member: "b".to_string(),
                symbol: Symbol::FullDay,
            },
        ]);
        // On 4/1 member b has no record at all; the cell reads `-`.
        let result = extract(&grid, &query(&["a", "b"], Level::FullDay)).unwrap();
        let dates: Vec<&str> = result.rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["4/1"]);
    }
}
