//! Small statistics over dated price series.

use crate::domain::DatedValue;

/// Simple returns between consecutive points. Skips pairs with a
/// non-positive or non-finite base.
pub fn daily_returns(series: &[DatedValue]) -> Vec<f64> {
    series
        .windows(2)
        .filter(|w| w[0].value.is_finite() && w[0].value > 0.0 && w[1].value.is_finite())
        .map(|w| w[1].value / w[0].value - 1.0)
        .collect()
}

/// Sample standard deviation (n - 1). `None` for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

/// Return from the point `lookback - 1` steps before the end to the end,
/// i.e. across the last `lookback` points.
pub fn trailing_return(series: &[DatedValue], lookback: usize) -> Option<f64> {
    if lookback < 2 || series.len() < lookback {
        return None;
    }
    let start = series[series.len() - lookback].value;
    let end = series[series.len() - 1].value;
    if !(start.is_finite() && start > 0.0 && end.is_finite()) {
        return None;
    }
    Some(end / start - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> Vec<DatedValue> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| DatedValue::new(base + chrono::Duration::days(i as i64), v))
            .collect()
    }

    #[test]
    fn returns_between_points() {
        let r = daily_returns(&series(&[100.0, 110.0, 99.0]));
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.10).abs() < 1e-12);
        assert!((r[1] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn sample_std_matches_hand_computation() {
        // mean 2, squared deviations 1+0+1 = 2, / 2 = 1
        assert!((sample_std(&[1.0, 2.0, 3.0]).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(sample_std(&[1.0]), None);
    }

    #[test]
    fn trailing_return_spans_lookback_points() {
        let s = series(&[50.0, 100.0, 105.0, 110.0]);
        assert!((trailing_return(&s, 3).unwrap() - 0.10).abs() < 1e-12);
        assert_eq!(trailing_return(&s, 5), None);
    }
}
