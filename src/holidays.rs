use log::warn;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;

static BUILTIN_TOML: &str = include_str!("../data/holidays.toml");

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// How an officially adjusted day differs from the plain weekday cycle:
/// a day off work or a weekend turned into a make-up workday.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum DayAdjust {
    Rest,
    Work,
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct HolidaySpan {
    label: String,
    kind: DayAdjust,
    start: Date,
    end: Date,
}

impl HolidaySpan {
    fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Published holiday adjustments, keyed by year.
///
/// The table answers point queries only; days it does not mention follow
/// the ordinary weekday cycle.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct HolidayTable {
    years: BTreeMap<i32, Vec<HolidaySpan>>,
}

#[derive(Debug, Error)]
pub(crate) enum HolidayDataError {
    #[error("holiday data is not valid TOML")]
    Toml(#[from] toml::de::Error),
    #[error("holiday span {label:?} has unparseable date {value:?}")]
    Date {
        label: String,
        value: String,
        source: time::error::Parse,
    },
    #[error("holiday span {label:?} runs backwards or crosses a year boundary")]
    Order { label: String },
}

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(default)]
    span: Vec<RawSpan>,
}

#[derive(Debug, Deserialize)]
struct RawSpan {
    label: String,
    kind: DayAdjust,
    start: String,
    #[serde(default)]
    end: Option<String>,
}

impl HolidayTable {
    pub(crate) fn builtin() -> HolidayTable {
        HolidayTable::from_toml(BUILTIN_TOML).expect("built-in holiday data should parse")
    }

    pub(crate) fn from_toml(text: &str) -> Result<HolidayTable, HolidayDataError> {
        let raw = toml::from_str::<RawTable>(text)?;
        let mut years: BTreeMap<i32, Vec<HolidaySpan>> = BTreeMap::new();
        for sp in raw.span {
            let start = parse_span_date(&sp.label, &sp.start)?;
            let end = match sp.end {
                Some(ref value) => parse_span_date(&sp.label, value)?,
                None => start,
            };
            if end < start || start.year() != end.year() {
                return Err(HolidayDataError::Order { label: sp.label });
            }
            years.entry(start.year()).or_default().push(HolidaySpan {
                label: sp.label,
                kind: sp.kind,
                start,
                end,
            });
        }
        Ok(HolidayTable { years })
    }

    /// Built-in table with any year present in the file at `path` replaced
    /// wholesale by that file's spans.  A missing file is not an error; a
    /// malformed one is reported and ignored.
    pub(crate) fn load_with_override(path: Option<&Path>) -> HolidayTable {
        let mut table = HolidayTable::builtin();
        let Some(path) = path else {
            return table;
        };
        let Ok(text) = std::fs::read_to_string(path) else {
            return table;
        };
        match HolidayTable::from_toml(&text) {
            Ok(user) => table.replace_years(user),
            Err(e) => warn!("ignoring holiday override {}: {e}", path.display()),
        }
        table
    }

    fn replace_years(&mut self, other: HolidayTable) {
        for (year, spans) in other.years {
            self.years.insert(year, spans);
        }
    }

    pub(crate) fn adjust_for(&self, date: Date) -> Option<DayAdjust> {
        self.span_for(date).map(|sp| sp.kind)
    }

    pub(crate) fn label_for(&self, date: Date) -> Option<&str> {
        self.span_for(date).map(|sp| sp.label.as_str())
    }

    fn span_for(&self, date: Date) -> Option<&HolidaySpan> {
        self.years
            .get(&date.year())?
            .iter()
            .find(|sp| sp.contains(date))
    }

    /// First and last year with any spans, for startup reporting.
    pub(crate) fn year_range(&self) -> Option<(i32, i32)> {
        let first = *self.years.keys().next()?;
        let last = *self.years.keys().next_back()?;
        Some((first, last))
    }
}

fn parse_span_date(label: &str, value: &str) -> Result<Date, HolidayDataError> {
    Date::parse(value, &YMD_FMT).map_err(|source| HolidayDataError::Date {
        label: label.to_owned(),
        value: value.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    static USER_2026: &str = concat!(
        "[[span]]\n",
        "label = \"暑休\"\n",
        "kind = \"rest\"\n",
        "start = \"2026-07-01\"\n",
        "end = \"2026-07-03\"\n",
    );

    #[test]
    fn builtin_parses() {
        let table = HolidayTable::builtin();
        let (first, last) = table.year_range().unwrap();
        assert!(first <= 2025 && 2026 <= last, "built-in data should cover 2025 and 2026");
    }

    #[test]
    fn spring_festival_rest_days() {
        let table = HolidayTable::builtin();
        assert_eq!(table.adjust_for(date!(2026 - 02 - 15)), Some(DayAdjust::Rest));
        assert_eq!(table.adjust_for(date!(2026 - 02 - 23)), Some(DayAdjust::Rest));
        assert_eq!(table.label_for(date!(2026 - 02 - 17)), Some("春节"));
    }

    #[test]
    fn makeup_workdays() {
        let table = HolidayTable::builtin();
        assert_eq!(table.adjust_for(date!(2026 - 02 - 14)), Some(DayAdjust::Work));
        assert_eq!(table.adjust_for(date!(2026 - 02 - 28)), Some(DayAdjust::Work));
        assert_eq!(table.adjust_for(date!(2025 - 04 - 27)), Some(DayAdjust::Work));
    }

    #[test]
    fn new_year_window() {
        let table = HolidayTable::builtin();
        assert_eq!(table.adjust_for(date!(2026 - 01 - 02)), Some(DayAdjust::Rest));
        assert_eq!(table.adjust_for(date!(2026 - 01 - 04)), Some(DayAdjust::Work));
        assert_eq!(table.adjust_for(date!(2026 - 01 - 05)), None);
    }

    #[test]
    fn unlisted_days_have_no_adjustment() {
        let table = HolidayTable::builtin();
        assert_eq!(table.adjust_for(date!(2026 - 03 - 01)), None);
        assert_eq!(table.adjust_for(date!(2024 - 10 - 01)), None);
    }

    #[test]
    fn missing_end_means_single_day() {
        let table = HolidayTable::from_toml(concat!(
            "[[span]]\n",
            "label = \"试\"\n",
            "kind = \"rest\"\n",
            "start = \"2030-07-01\"\n",
        ))
        .unwrap();
        assert_eq!(table.adjust_for(date!(2030 - 07 - 01)), Some(DayAdjust::Rest));
        assert_eq!(table.adjust_for(date!(2030 - 07 - 02)), None);
    }

    #[test]
    fn override_replaces_whole_year() {
        let mut table = HolidayTable::builtin();
        table.replace_years(HolidayTable::from_toml(USER_2026).unwrap());
        assert_eq!(
            table.adjust_for(date!(2026 - 02 - 16)),
            None,
            "built-in 2026 spans should be gone"
        );
        assert_eq!(table.adjust_for(date!(2026 - 07 - 02)), Some(DayAdjust::Rest));
        assert_eq!(
            table.adjust_for(date!(2025 - 10 - 01)),
            Some(DayAdjust::Rest),
            "years the override does not mention should survive"
        );
    }

    #[test]
    fn override_file_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holidays.toml");
        std::fs::write(&path, USER_2026).unwrap();
        let table = HolidayTable::load_with_override(Some(&path));
        assert_eq!(table.adjust_for(date!(2026 - 07 - 01)), Some(DayAdjust::Rest));
        assert_eq!(table.adjust_for(date!(2025 - 10 - 01)), Some(DayAdjust::Rest));
    }

    #[test]
    fn missing_override_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let table = HolidayTable::load_with_override(Some(&dir.path().join("nope.toml")));
        assert_eq!(table.adjust_for(date!(2026 - 10 - 01)), Some(DayAdjust::Rest));
    }

    #[test]
    fn backwards_span_is_rejected() {
        let r = HolidayTable::from_toml(concat!(
            "[[span]]\n",
            "label = \"bad\"\n",
            "kind = \"rest\"\n",
            "start = \"2030-07-02\"\n",
            "end = \"2030-07-01\"\n",
        ));
        assert!(
            matches!(r, Err(HolidayDataError::Order { .. })),
            "reversed span should not validate"
        );
    }

    #[test]
    fn cross_year_span_is_rejected() {
        let r = HolidayTable::from_toml(concat!(
            "[[span]]\n",
            "label = \"bad\"\n",
            "kind = \"rest\"\n",
            "start = \"2030-12-30\"\n",
            "end = \"2031-01-02\"\n",
        ));
        assert!(
            matches!(r, Err(HolidayDataError::Order { .. })),
            "span crossing a year boundary should not validate"
        );
    }

    #[test]
    fn garbage_date_is_rejected() {
        let r = HolidayTable::from_toml(concat!(
            "[[span]]\n",
            "label = \"bad\"\n",
            "kind = \"work\"\n",
            "start = \"soon\"\n",
        ));
        assert!(
            matches!(r, Err(HolidayDataError::Date { .. })),
            "non-date start should not validate"
        );
    }
}
