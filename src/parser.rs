use chardetng::EncodingDetector;
use csv::StringRecord;
use std::collections::HashMap;
use thiserror::Error;

use crate::availability::{parse_month_day, AttendanceRecord, Symbol};

/// Metadata row keys, in the order the export carries them.
pub const META_LAST_UPDATE: &str = "last update time";
pub const META_COMMENT: &str = "comment";

/// Everything a schedule export contains: the long-form records plus the
/// per-member metadata from the trailing rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPayload {
    pub records: Vec<AttendanceRecord>,
    pub metadata: HashMap<String, HashMap<String, String>>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("取り込みファイルが空です")]
    Empty,
    #[error("ヘッダー行にメンバーが見つかりません")]
    NoMembers,
    #[error("CSVの読み込みに失敗しました: {0}")]
    Csv(#[from] csv::Error),
}

/// Parses a raw schedule export.
///
/// The payload is delimited text in an arbitrary encoding. The first
/// non-blank row is the header `[label, member1, member2, ...]`; body rows
/// are `[dateToken, symbol1, ...]`. The final two rows are per-member
/// metadata ("last update time", then "comment") when both of their first
/// cells fail to parse as a date. Body rows with a blank or unparseable
/// date token are skipped, never errored.
pub fn parse_import_payload(bytes: &[u8]) -> Result<ImportPayload, ParseError> {
    if bytes.is_empty() {
        return Err(ParseError::Empty);
    }
    let text = decode_payload(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<StringRecord> = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(record);
    }

    let Some(header) = rows.first() else {
        return Err(ParseError::Empty);
    };
    let members: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(col, name)| {
            let name = name.trim();
            (!name.is_empty()).then(|| (col, name.to_string()))
        })
        .collect();
    if members.is_empty() {
        return Err(ParseError::NoMembers);
    }

    let body = &rows[1..];
    let meta_row_count = trailing_metadata_rows(body);
    let (data_rows, metadata_rows) = body.split_at(body.len() - meta_row_count);

    let mut records = Vec::new();
    for row in data_rows {
        let date = row.get(0).unwrap_or("").trim();
        if parse_month_day(date).is_none() {
            continue;
        }
        for (col, member) in &members {
            // Unknown or blank cells read as "not entered".
            let symbol = row
                .get(*col)
                .and_then(Symbol::parse)
                .unwrap_or(Symbol::Unspecified);
            records.push(AttendanceRecord {
                date: date.to_string(),
                member: member.clone(),
                symbol,
            });
        }
    }

    let mut metadata: HashMap<String, HashMap<String, String>> = HashMap::new();
    for (key, row) in [META_LAST_UPDATE, META_COMMENT].iter().zip(metadata_rows) {
        for (col, member) in &members {
            let value = row.get(*col).unwrap_or("").trim();
            if !value.is_empty() {
                metadata
                    .entry(member.clone())
                    .or_default()
                    .insert(key.to_string(), value.to_string());
            }
        }
    }

    Ok(ImportPayload { records, metadata })
}

/// The trailing metadata block is present when the last two body rows both
/// carry non-date first cells. A single trailing non-date row is an
/// ordinary skipped row, not half a metadata block.
fn trailing_metadata_rows(body: &[StringRecord]) -> usize {
    if body.len() < 2 {
        return 0;
    }
    let is_meta = |row: &StringRecord| parse_month_day(row.get(0).unwrap_or("")).is_none();
    if is_meta(&body[body.len() - 2]) && is_meta(&body[body.len() - 1]) {
        2
    } else {
        0
    }
}

fn decode_payload(bytes: &[u8]) -> String {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding: &'static encoding_rs::Encoding = detector.guess(None, true);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}
