use serde::{Deserialize, Serialize};

/// Status symbol a member enters for one date in the schedule export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// ◎ — available the whole day (day and night).
    FullDay,
    /// ○ — available in the evening.
    Evening,
    /// △ — available during the day.
    Daytime,
    /// × — unavailable.
    Unavailable,
    /// - — not entered.
    Unspecified,
}

impl Symbol {
    /// Parses a single status cell. Returns `None` for anything outside the
    /// five known symbols; callers decide how to treat unknown cells.
    pub fn parse(value: &str) -> Option<Symbol> {
        match value.trim() {
            "◎" => Some(Symbol::FullDay),
            "○" | "〇" => Some(Symbol::Evening),
            "△" => Some(Symbol::Daytime),
            "×" => Some(Symbol::Unavailable),
            "-" => Some(Symbol::Unspecified),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::FullDay => "◎",
            Symbol::Evening => "○",
            Symbol::Daytime => "△",
            Symbol::Unavailable => "×",
            Symbol::Unspecified => "-",
        }
    }
}

/// Confidence level for an extraction: which symbols count as "available".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    /// ◎ — whole-day availability required.
    FullDay,
    /// 〇 — evening availability (or better) required.
    Evening,
    /// △ — daytime availability (or better) required.
    Daytime,
    /// 〇のみ — strictly evening-only answers.
    EveningOnly,
    /// △のみ — strictly daytime-only answers.
    DaytimeOnly,
    /// 全件 — every row, no symbol disqualifies.
    All,
    /// Unknown or unset tag: any affirmative answer.
    Any,
}

impl Level {
    /// Parses a level tag from a form value. Unknown tags fall back to
    /// `Level::Any` rather than failing; the tag set is user-facing text.
    /// Both the ideographic 〇 (U+3007) and the symbol ○ (U+25CB) spellings
    /// appear in the wild.
    pub fn parse(value: &str) -> Level {
        match value.trim() {
            "◎" => Level::FullDay,
            "〇" | "○" => Level::Evening,
            "△" => Level::Daytime,
            "〇のみ" | "○のみ" => Level::EveningOnly,
            "△のみ" => Level::DaytimeOnly,
            "全件" => Level::All,
            _ => Level::Any,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::FullDay => "◎",
            Level::Evening => "〇",
            Level::Daytime => "△",
            Level::EveningOnly => "〇のみ",
            Level::DaytimeOnly => "△のみ",
            Level::All => "全件",
            Level::Any => "指定なし",
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::FullDay
    }
}

/// Symbols a member may have entered for a date to still count as available
/// at the given level.
///
/// `-` (not entered) never disqualifies a date: members who have not
/// answered yet must not block a candidate date. Callers rely on this.
pub fn acceptable_symbols(level: Level) -> &'static [Symbol] {
    match level {
        Level::FullDay => &[Symbol::FullDay, Symbol::Unspecified],
        Level::Evening => &[Symbol::FullDay, Symbol::Evening, Symbol::Unspecified],
        Level::Daytime => &[Symbol::FullDay, Symbol::Daytime, Symbol::Unspecified],
        Level::EveningOnly => &[Symbol::Evening, Symbol::Unspecified],
        Level::DaytimeOnly => &[Symbol::Daytime, Symbol::Unspecified],
        Level::All => &[
            Symbol::FullDay,
            Symbol::Evening,
            Symbol::Daytime,
            Symbol::Unavailable,
            Symbol::Unspecified,
        ],
        Level::Any => &[
            Symbol::FullDay,
            Symbol::Evening,
            Symbol::Daytime,
            Symbol::Unspecified,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_SYMBOLS: [Symbol; 5] = [
        Symbol::FullDay,
        Symbol::Evening,
        Symbol::Daytime,
        Symbol::Unavailable,
        Symbol::Unspecified,
    ];

    #[test]
    fn symbol_round_trip() {
        for symbol in ALL_SYMBOLS {
            assert_eq!(Symbol::parse(symbol.as_str()), Some(symbol));
        }
        assert_eq!(Symbol::parse(" ◎ "), Some(Symbol::FullDay));
        assert_eq!(Symbol::parse("〇"), Some(Symbol::Evening));
        assert_eq!(Symbol::parse("?"), None);
        assert_eq!(Symbol::parse(""), None);
    }

    #[test]
    fn level_parse_falls_back_to_any() {
        assert_eq!(Level::parse("◎"), Level::FullDay);
        assert_eq!(Level::parse("〇"), Level::Evening);
        assert_eq!(Level::parse("○"), Level::Evening);
        assert_eq!(Level::parse("〇のみ"), Level::EveningOnly);
        assert_eq!(Level::parse("△のみ"), Level::DaytimeOnly);
        assert_eq!(Level::parse("全件"), Level::All);
        assert_eq!(Level::parse("whatever"), Level::Any);
        assert_eq!(Level::parse(""), Level::Any);
    }

    #[test]
    fn acceptable_table_matches_policy() {
        let cases: [(Level, &[Symbol]); 7] = [
            (Level::FullDay, &[Symbol::FullDay, Symbol::Unspecified]),
            (
                Level::Evening,
                &[Symbol::FullDay, Symbol::Evening, Symbol::Unspecified],
            ),
            (
                Level::Daytime,
                &[Symbol::FullDay, Symbol::Daytime, Symbol::Unspecified],
            ),
            (Level::EveningOnly, &[Symbol::Evening, Symbol::Unspecified]),
            (Level::DaytimeOnly, &[Symbol::Daytime, Symbol::Unspecified]),
            (
                Level::All,
                &[
                    Symbol::FullDay,
                    Symbol::Evening,
                    Symbol::Daytime,
                    Symbol::Unavailable,
                    Symbol::Unspecified,
                ],
            ),
            (
                Level::Any,
                &[
                    Symbol::FullDay,
                    Symbol::Evening,
                    Symbol::Daytime,
                    Symbol::Unspecified,
                ],
            ),
        ];

        for (level, expected) in cases {
            let actual = acceptable_symbols(level);
            for symbol in ALL_SYMBOLS {
                assert_eq!(
                    actual.contains(&symbol),
                    expected.contains(&symbol),
                    "level {:?}, symbol {:?}",
                    level,
                    symbol
                );
            }
        }
    }

    #[test]
    fn unspecified_never_disqualifies() {
        for level in [
            Level::FullDay,
            Level::Evening,
            Level::Daytime,
            Level::EveningOnly,
            Level::DaytimeOnly,
            Level::All,
            Level::Any,
        ] {
            assert!(acceptable_symbols(level).contains(&Symbol::Unspecified));
        }
    }
}
