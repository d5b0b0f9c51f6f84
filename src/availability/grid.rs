use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::symbol::Symbol;

/// One long-form attendance record: what one member answered for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: String,
    pub member: String,
    pub symbol: Symbol,
}

/// Parsed month/day component of a date token. Tokens carry no year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

/// Parses a date token like `4/12(金)` into its month/day components.
///
/// The trailing parenthesized day-of-week annotation is stripped, the rest
/// is read as `month/day`. The pair is checked against a leap reference
/// year, so 2/29 is accepted. Absence of a parse is a normal outcome: the
/// caller excludes the row.
pub fn parse_month_day(token: &str) -> Option<MonthDay> {
    let clean = token.split('(').next().unwrap_or(token).trim();
    let mut parts = clean.split('/');
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(2024, month, day)?;
    Some(MonthDay { month, day })
}

/// One date row of the wide grid; `cells` is aligned with the grid's member
/// columns, missing combinations filled with `Symbol::Unspecified`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub date: String,
    pub month_day: MonthDay,
    pub cells: Vec<Symbol>,
}

/// The wide date×member availability matrix, derived from long-form records
/// on every query and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityGrid {
    members: Vec<String>,
    rows: Vec<GridRow>,
}

impl AvailabilityGrid {
    /// Reshapes long-form records into the wide grid.
    ///
    /// Exact duplicates collapse silently. When the same (date, member) pair
    /// carries conflicting symbols, the first-encountered value wins and the
    /// rest are dropped. Rows whose date token does not parse are excluded.
    pub fn from_records(records: &[AttendanceRecord]) -> AvailabilityGrid {
        let mut cells: HashMap<(&str, &str), Symbol> = HashMap::new();
        let mut member_names: Vec<&str> = Vec::new();
        let mut dates: Vec<(&str, MonthDay)> = Vec::new();

        for record in records {
            if !member_names.contains(&record.member.as_str()) {
                member_names.push(record.member.as_str());
            }
            let key = (record.date.as_str(), record.member.as_str());
            if cells.contains_key(&key) {
                continue; // duplicate or conflicting entry, first wins
            }
            cells.insert(key, record.symbol);
            if !dates.iter().any(|(date, _)| *date == record.date) {
                if let Some(month_day) = parse_month_day(&record.date) {
                    dates.push((record.date.as_str(), month_day));
                }
            }
        }

        let members = order_members(member_names.iter().map(|name| name.to_string()));

        let mut rows: Vec<GridRow> = dates
            .into_iter()
            .map(|(date, month_day)| GridRow {
                date: date.to_string(),
                month_day,
                cells: members
                    .iter()
                    .map(|member| {
                        cells
                            .get(&(date, member.as_str()))
                            .copied()
                            .unwrap_or(Symbol::Unspecified)
                    })
                    .collect(),
            })
            .collect();

        // Stable sort: rows sharing a (month, day) keep insertion order.
        rows.sort_by_key(|row| row.month_day);

        AvailabilityGrid { members, rows }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column index of a member, if the member exists in the grid.
    pub fn member_index(&self, member: &str) -> Option<usize> {
        self.members.iter().position(|name| name == member)
    }

    /// Sorted distinct months found among the valid date rows.
    pub fn months_present(&self) -> Vec<u32> {
        let months: BTreeSet<u32> = self.rows.iter().map(|row| row.month_day.month).collect();
        months.into_iter().collect()
    }

    /// Restricts the grid to rows whose parsed month equals `month`,
    /// keeping the chronological order.
    pub fn filter_by_month(&self, month: u32) -> AvailabilityGrid {
        AvailabilityGrid {
            members: self.members.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| row.month_day.month == month)
                .cloned()
                .collect(),
        }
    }
}

/// Orders member names for display: ASCII-letter names first
/// (case-insensitive alphabetical), then syllabic-script names, then
/// ideographic names; anything else sorts last. Derived fresh from the
/// distinct member set on every read.
pub fn order_members(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut members: Vec<String> = names.into_iter().collect();
    members.sort_by(|a, b| {
        script_class(a)
            .cmp(&script_class(b))
            .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
            .then_with(|| a.cmp(b))
    });
    members
}

fn script_class(name: &str) -> u8 {
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => 0,
        Some(c) if ('ぁ'..='ん').contains(&c) || ('ァ'..='ヶ').contains(&c) => 1,
        Some(c) if ('一'..='龯').contains(&c) => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, member: &str, symbol: Symbol) -> AttendanceRecord {
        AttendanceRecord {
            date: date.to_string(),
            member: member.to_string(),
            symbol,
        }
    }

    #[test]
    fn parse_month_day_strips_weekday_annotation() {
        assert_eq!(
            parse_month_day("4/12(金)"),
            Some(MonthDay { month: 4, day: 12 })
        );
        assert_eq!(parse_month_day(" 12/3 "), Some(MonthDay { month: 12, day: 3 }));
        assert_eq!(parse_month_day("2/29"), Some(MonthDay { month: 2, day: 29 }));
        assert_eq!(parse_month_day("TBD"), None);
        assert_eq!(parse_month_day("13/1"), None);
        assert_eq!(parse_month_day("4/31"), None);
        assert_eq!(parse_month_day("4/1/2"), None);
        assert_eq!(parse_month_day(""), None);
    }

    #[test]
    fn reshape_is_deterministic() {
        let records = vec![
            record("4/2(火)", "ann", Symbol::Evening),
            record("4/1(月)", "ann", Symbol::FullDay),
            record("4/1(月)", "bob", Symbol::Daytime),
        ];
        let first = AvailabilityGrid::from_records(&records);
        let second = AvailabilityGrid::from_records(&records);
        assert_eq!(first, second);
        assert_eq!(
            first.rows().iter().map(|r| r.date.as_str()).collect::<Vec<_>>(),
            vec!["4/1(月)", "4/2(火)"]
        );
    }

    #[test]
    fn duplicates_collapse() {
        let once = AvailabilityGrid::from_records(&[record("4/1", "ann", Symbol::FullDay)]);
        let twice = AvailabilityGrid::from_records(&[
            record("4/1", "ann", Symbol::FullDay),
            record("4/1", "ann", Symbol::FullDay),
        ]);
        assert_eq!(once, twice);
    }

    #[test]
    fn conflicting_symbols_first_wins() {
        let grid = AvailabilityGrid::from_records(&[
            record("4/1", "ann", Symbol::FullDay),
            record("4/1", "ann", Symbol::Daytime),
        ]);
        assert_eq!(grid.rows()[0].cells, vec![Symbol::FullDay]);
    }

    #[test]
    fn unparseable_dates_are_excluded() {
        let grid = AvailabilityGrid::from_records(&[
            record("TBD", "ann", Symbol::FullDay),
            record("4/1", "ann", Symbol::Evening),
        ]);
        assert_eq!(grid.rows().len(), 1);
        assert_eq!(grid.rows()[0].date, "4/1");
        assert_eq!(grid.months_present(), vec![4]);
        // The member column survives even though its other row was dropped.
        assert_eq!(grid.members(), ["ann"]);
    }

    #[test]
    fn missing_cells_fill_as_unspecified() {
        let grid = AvailabilityGrid::from_records(&[
            record("4/1", "ann", Symbol::FullDay),
            record("4/2", "bob", Symbol::Daytime),
        ]);
        let ann = grid.member_index("ann").unwrap();
        let bob = grid.member_index("bob").unwrap();
        assert_eq!(grid.rows()[0].cells[bob], Symbol::Unspecified);
        assert_eq!(grid.rows()[1].cells[ann], Symbol::Unspecified);
    }

    #[test]
    fn rows_sort_chronologically_across_months() {
        let grid = AvailabilityGrid::from_records(&[
            record("5/1", "ann", Symbol::FullDay),
            record("4/30", "ann", Symbol::FullDay),
            record("4/2", "ann", Symbol::FullDay),
        ]);
        let dates: Vec<&str> = grid.rows().iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["4/2", "4/30", "5/1"]);
        assert_eq!(grid.months_present(), vec![4, 5]);
    }

    #[test]
    fn filter_by_month_keeps_order() {
        let grid = AvailabilityGrid::from_records(&[
            record("4/2", "ann", Symbol::FullDay),
            record("5/1", "ann", Symbol::Evening),
            record("4/10", "ann", Symbol::Daytime),
        ]);
        let april = grid.filter_by_month(4);
        let dates: Vec<&str> = april.rows().iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["4/2", "4/10"]);
        let june = grid.filter_by_month(6);
        assert!(june.is_empty());
    }

    #[test]
    fn member_ordering_by_script_class() {
        let ordered = order_members(
            [
                "田中",
                "Zoe",
                "すずき",
                "alice",
                "カトウ",
                "7th",
            ]
            .into_iter()
            .map(String::from),
        );
        assert_eq!(ordered, vec!["alice", "Zoe", "すずき", "カトウ", "田中", "7th"]);
    }
}
