pub mod extract;
pub mod grid;
pub mod headcount;
pub mod symbol;

pub use extract::{extract, ExtractionQuery, ExtractionResult, MissingMemberError};
pub use grid::{order_members, parse_month_day, AttendanceRecord, AvailabilityGrid};
pub use headcount::{summarize, HeadcountRow};
pub use symbol::{acceptable_symbols, Level, Symbol};
