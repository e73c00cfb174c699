//! Typed column storage.

use chrono::NaiveDate;

use crate::coercion::{parse_day_first_date, parse_decimal};

/// A single table column.
///
/// Columns are loaded as [`Column::Text`] and converted once during
/// preprocessing to [`Column::Number`] or [`Column::Date`] for the fields
/// that need it.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Trimmed text cells; `None` for missing values.
    Text(Vec<Option<String>>),
    /// Numeric cells; `None` for missing or unparseable values.
    Number(Vec<Option<f64>>),
    /// Date cells; `None` for missing or unparseable values.
    Date(Vec<Option<NaiveDate>>),
}

impl Column {
    /// Number of cells in the column.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(v) => v.len(),
            Self::Number(v) => v.len(),
            Self::Date(v) => v.len(),
        }
    }

    /// Returns `true` if the column has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders cell `row` as text, or `None` if the cell is missing.
    ///
    /// Numbers that hold an integer value are rendered without a decimal
    /// point.
    #[must_use]
    pub fn text(&self, row: usize) -> Option<String> {
        match self {
            Self::Text(v) => v.get(row)?.clone(),
            Self::Number(v) => v.get(row).copied().flatten().map(|n| {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    #[allow(clippy::cast_possible_truncation)]
                    let i = n as i64;
                    i.to_string()
                } else {
                    n.to_string()
                }
            }),
            Self::Date(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Numeric value of cell `row`, parsing text cells on the fly.
    #[must_use]
    pub fn number(&self, row: usize) -> Option<f64> {
        match self {
            Self::Text(v) => v.get(row)?.as_deref().and_then(parse_decimal),
            Self::Number(v) => v.get(row).copied().flatten(),
            Self::Date(_) => None,
        }
    }

    /// Date value of cell `row`, parsing text cells on the fly.
    #[must_use]
    pub fn date(&self, row: usize) -> Option<NaiveDate> {
        match self {
            Self::Text(v) => v.get(row)?.as_deref().and_then(parse_day_first_date),
            Self::Date(v) => v.get(row).copied().flatten(),
            Self::Number(_) => None,
        }
    }

    /// Converts the column to [`Column::Number`].
    ///
    /// Text cells that fail to parse become `None`.
    #[must_use]
    pub fn into_numbers(self) -> Self {
        match self {
            Self::Text(v) => Self::Number(
                v.into_iter()
                    .map(|c| c.as_deref().and_then(parse_decimal))
                    .collect(),
            ),
            Self::Date(v) => Self::Number(vec![None; v.len()]),
            number @ Self::Number(_) => number,
        }
    }

    /// Converts the column to [`Column::Date`] using day-first parsing.
    #[must_use]
    pub fn into_dates(self) -> Self {
        match self {
            Self::Text(v) => Self::Date(
                v.into_iter()
                    .map(|c| c.as_deref().and_then(parse_day_first_date))
                    .collect(),
            ),
            Self::Number(v) => Self::Date(vec![None; v.len()]),
            date @ Self::Date(_) => date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[Option<&str>]) -> Column {
        Column::Text(values.iter().map(|v| v.map(str::to_string)).collect())
    }

    #[test]
    fn text_column_parses_numbers_lazily() {
        let col = text(&[Some("1,5"), None, Some("x")]);
        assert_eq!(col.number(0), Some(1.5));
        assert_eq!(col.number(1), None);
        assert_eq!(col.number(2), None);
        assert_eq!(col.number(99), None);
    }

    #[test]
    fn into_numbers_coerces_once() {
        let col = text(&[Some("10"), Some("abc"), None]).into_numbers();
        assert_eq!(col, Column::Number(vec![Some(10.0), None, None]));
    }

    #[test]
    fn into_dates_uses_day_first() {
        let col = text(&[Some("01/02/2020"), Some("??")]).into_dates();
        assert_eq!(
            col,
            Column::Date(vec![NaiveDate::from_ymd_opt(2020, 2, 1), None])
        );
    }

    #[test]
    fn integer_numbers_render_without_decimal_point() {
        let col = Column::Number(vec![Some(2.0), Some(2.5), None]);
        assert_eq!(col.text(0), Some("2".to_string()));
        assert_eq!(col.text(1), Some("2.5".to_string()));
        assert_eq!(col.text(2), None);
    }
}
