//! Strict coercion of columns to a requested [`ColumnKind`].
//!
//! Unlike a plain polars cast, a value that cannot be represented in the
//! target kind is an error rather than a silent null or a truncation:
//! `2.5` does not become the integer `2`, and `"abc"` does not become null.

use crate::error::{EdaError, Result};
use crate::types::ColumnKind;
use crate::utils::{parse_boolean_string, series_to_f64, series_to_strings};
use polars::prelude::*;

/// Convert `series` (currently `from`) into the physical storage of `to`.
pub(crate) fn coerce_series(series: &Series, from: ColumnKind, to: ColumnKind) -> Result<Series> {
    let name = series.name().clone();

    // integer to integer stays exact; overflow surfaces as a strict cast failure
    if matches!(from, ColumnKind::Integer | ColumnKind::DatePart)
        && matches!(to, ColumnKind::Integer | ColumnKind::DatePart)
    {
        return series
            .strict_cast(&to.physical_dtype())
            .map_err(|e| EdaError::TypeCoercion {
                column: name.to_string(),
                target: to.to_string(),
                reason: e.to_string(),
            });
    }

    match to {
        ColumnKind::Text | ColumnKind::Category => Ok(series.cast(&DataType::String)?),
        ColumnKind::Float => {
            let values = to_f64_values(series, from, to)?;
            Ok(Series::new(name, values))
        }
        ColumnKind::Integer => {
            let values: Vec<Option<i64>> = to_integral_values(series, from, to, i64::MIN as f64)?
                .into_iter()
                .map(|v| v.map(|f| f as i64))
                .collect();
            Ok(Series::new(name, values))
        }
        ColumnKind::DatePart => {
            let values: Vec<Option<i32>> = to_integral_values(series, from, to, i32::MIN as f64)?
                .into_iter()
                .map(|v| v.map(|f| f as i32))
                .collect();
            Ok(Series::new(name, values))
        }
        ColumnKind::Boolean => {
            let values = to_bool_values(series, from)?;
            Ok(Series::new(name, values))
        }
    }
}

fn coercion_error(series: &Series, target: ColumnKind, row: usize, value: &str) -> EdaError {
    EdaError::TypeCoercion {
        column: series.name().to_string(),
        target: target.to_string(),
        reason: format!("value '{}' at row {} cannot be represented", value, row),
    }
}

fn to_f64_values(series: &Series, from: ColumnKind, to: ColumnKind) -> Result<Vec<Option<f64>>> {
    match from {
        ColumnKind::Integer | ColumnKind::Float | ColumnKind::DatePart => Ok(series_to_f64(series)?),
        ColumnKind::Boolean => Ok(series
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| if b { 1.0 } else { 0.0 }))
            .collect()),
        ColumnKind::Text | ColumnKind::Category => series_to_strings(series)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| coercion_error(series, to, row, &s)),
            })
            .collect(),
    }
}

/// Integral values in `[min, -min)`, the range of a two's complement integer
/// whose smallest value is `min`. Both bounds are exact in f64.
fn to_integral_values(
    series: &Series,
    from: ColumnKind,
    to: ColumnKind,
    min: f64,
) -> Result<Vec<Option<f64>>> {
    let values = to_f64_values(series, from, to)?;
    for (row, value) in values.iter().enumerate() {
        if let Some(v) = value
            && (!v.is_finite() || v.fract() != 0.0 || *v < min || *v >= -min)
        {
            return Err(coercion_error(series, to, row, &v.to_string()));
        }
    }
    Ok(values)
}

fn to_bool_values(series: &Series, from: ColumnKind) -> Result<Vec<Option<bool>>> {
    match from {
        ColumnKind::Boolean => Ok(series.bool()?.into_iter().collect()),
        ColumnKind::Integer | ColumnKind::Float | ColumnKind::DatePart => series_to_f64(series)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(v) if v == 0.0 => Ok(Some(false)),
                Some(v) if v == 1.0 => Ok(Some(true)),
                Some(v) => Err(coercion_error(series, ColumnKind::Boolean, row, &v.to_string())),
            })
            .collect(),
        ColumnKind::Text | ColumnKind::Category => series_to_strings(series)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(s) => parse_boolean_string(&s)
                    .map(Some)
                    .ok_or_else(|| coercion_error(series, ColumnKind::Boolean, row, &s)),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_category_keeps_values() {
        let series = Series::new("Gender".into(), &[Some("Female"), None, Some("Male")]);
        let cast = coerce_series(&series, ColumnKind::Text, ColumnKind::Category).unwrap();
        assert_eq!(cast.dtype(), &DataType::String);
        assert_eq!(cast.null_count(), 1);
    }

    #[test]
    fn test_float_years_to_date_part() {
        let series = Series::new("Cancellation Year".into(), &[Some(2018.0), None, Some(2021.0)]);
        let cast = coerce_series(&series, ColumnKind::Float, ColumnKind::DatePart).unwrap();
        assert_eq!(cast.dtype(), &DataType::Int32);
        let values: Vec<Option<i32>> = cast.i32().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(2018), None, Some(2021)]);
    }

    #[test]
    fn test_fractional_float_to_integer_fails() {
        let series = Series::new("Salary".into(), &[1.0, 2.5]);
        let err = coerce_series(&series, ColumnKind::Float, ColumnKind::Integer).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_COERCION_FAILED");
        assert!(err.to_string().contains("'2.5' at row 1"));
    }

    #[test]
    fn test_text_to_float_parses_and_fails_on_garbage() {
        let series = Series::new("CLV".into(), &[" 3839.14", "8257"]);
        let cast = coerce_series(&series, ColumnKind::Text, ColumnKind::Float).unwrap();
        assert_eq!(cast.dtype(), &DataType::Float64);

        let bad = Series::new("CLV".into(), &["12", "abc"]);
        let err = coerce_series(&bad, ColumnKind::Text, ColumnKind::Float).unwrap_err();
        assert!(matches!(err, EdaError::TypeCoercion { ref column, .. } if column == "CLV"));
    }

    #[test]
    fn test_text_to_boolean() {
        let series = Series::new("Active".into(), &[Some("yes"), Some("No"), None]);
        let cast = coerce_series(&series, ColumnKind::Text, ColumnKind::Boolean).unwrap();
        let values: Vec<Option<bool>> = cast.bool().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(true), Some(false), None]);
    }

    #[test]
    fn test_float_at_two_pow_63_to_integer_fails() {
        // i64::MAX as f64 rounds up to 2^63, one past the largest i64
        let series = Series::new("Distance".into(), &[9.223372036854776e18]);
        let err = coerce_series(&series, ColumnKind::Float, ColumnKind::Integer).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_COERCION_FAILED");

        let bounds = Series::new("Distance".into(), &[-9.223372036854776e18, 9.007199254740992e15]);
        let cast = coerce_series(&bounds, ColumnKind::Float, ColumnKind::Integer).unwrap();
        let values: Vec<Option<i64>> = cast.i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(i64::MIN), Some(9_007_199_254_740_992)]);
    }

    #[test]
    fn test_date_part_upper_bound() {
        let fits = Series::new("Year".into(), &[2147483647.0]);
        assert!(coerce_series(&fits, ColumnKind::Float, ColumnKind::DatePart).is_ok());

        let too_big = Series::new("Year".into(), &[2147483648.0]);
        assert!(coerce_series(&too_big, ColumnKind::Float, ColumnKind::DatePart).is_err());
    }

    #[test]
    fn test_integer_out_of_date_part_range_fails() {
        let series = Series::new("Year".into(), &[i64::MAX]);
        assert!(coerce_series(&series, ColumnKind::Integer, ColumnKind::DatePart).is_err());
    }
}
