use crate::error::{AnalyticsError, Result};
use crate::ratios::to_f64;
use configuration::ForecastParams;
use core_types::{MonthKey, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Net cash flow (income minus expense) of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyNetFlow {
    pub period: MonthKey,
    pub net_flow: f64,
}

/// One future month's three-scenario projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub period_label: String,
    pub optimistic: f64,
    pub realistic: f64,
    pub pessimistic: f64,
    pub confidence: f64,
}

/// Builds the contiguous monthly net-flow series from `from` to `to` inclusive.
/// Months without transactions contribute a net flow of 0.
pub fn monthly_net_flows(
    transactions: &[Transaction],
    from: MonthKey,
    to: MonthKey,
) -> Result<Vec<MonthlyNetFlow>> {
    if to < from {
        return Err(AnalyticsError::InvalidInput(format!(
            "net-flow range ends ({to}) before it starts ({from})"
        )));
    }

    let mut sums: BTreeMap<MonthKey, Decimal> = BTreeMap::new();
    for tx in transactions {
        tx.validate()?;
        let key = MonthKey::from_date(tx.date);
        if key < from || key > to {
            continue;
        }
        let total = sums.entry(key).or_default();
        *total = total.checked_add(tx.signed_amount()).ok_or_else(|| {
            AnalyticsError::InvalidInput(format!("net flow of {key} overflows"))
        })?;
    }

    let months = from.months_until(&to);
    let series = (0..=months)
        .map(|offset| {
            let period = from.add_months(offset);
            MonthlyNetFlow {
                period,
                net_flow: to_f64(sums.get(&period).copied().unwrap_or_default()),
            }
        })
        .collect();
    Ok(series)
}

/// Projects a monthly net-flow history forward with widening scenario bands.
#[derive(Debug, Clone)]
pub struct CashflowForecaster {
    params: ForecastParams,
}

impl Default for CashflowForecaster {
    fn default() -> Self {
        Self {
            params: ForecastParams::default(),
        }
    }
}

impl CashflowForecaster {
    pub fn new(params: ForecastParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Produces one `ForecastPoint` per month for `horizon` months after the
    /// last period of `history`.
    ///
    /// The trend is a least-squares line through the most recent
    /// `trend_window` months, so a single month of history repeats that value.
    pub fn forecast(&self, history: &[MonthlyNetFlow], horizon: i32) -> Result<Vec<ForecastPoint>> {
        // --- 1. Validation ---
        if horizon <= 0 || horizon as u32 > self.params.max_horizon {
            return Err(AnalyticsError::InvalidHorizon(horizon));
        }
        let last = history.last().ok_or_else(|| {
            AnalyticsError::InsufficientData("cash-flow history is empty".to_string())
        })?;
        validate_history(history)?;

        // --- 2. Trend ---
        let window = self.params.trend_window.min(history.len());
        let recent = &history[history.len() - window..];
        let origin = recent[0].period;
        let points: Vec<(f64, f64)> = recent
            .iter()
            .map(|p| (f64::from(origin.months_until(&p.period)), p.net_flow))
            .collect();
        let (intercept, slope) = least_squares(&points);
        let last_x = f64::from(origin.months_until(&last.period));

        // --- 3. Projection ---
        let history_factor = 0.5 + 0.5 * window as f64 / self.params.trend_window as f64;
        let base_confidence = self.params.confidence_ceiling * history_factor;

        let forecast: Vec<ForecastPoint> = (1..=horizon)
            .map(|i| {
                let steps = f64::from(i);
                let widening = self.params.spread_growth * (steps - 1.0);
                let realistic = intercept + slope * (last_x + steps);
                let magnitude = realistic.abs();

                ForecastPoint {
                    period_label: last.period.add_months(i).to_string(),
                    optimistic: round_money(
                        realistic + magnitude * (self.params.upward_spread + widening),
                    ),
                    realistic: round_money(realistic),
                    pessimistic: round_money(
                        realistic - magnitude * (self.params.downward_spread + widening),
                    ),
                    confidence: base_confidence * self.params.confidence_decay.powi(i - 1),
                }
            })
            .collect();

        tracing::debug!(
            history = history.len(),
            window,
            horizon,
            slope,
            "Cash-flow forecast computed"
        );
        Ok(forecast)
    }
}

fn validate_history(history: &[MonthlyNetFlow]) -> Result<()> {
    if let Some(bad) = history.iter().find(|p| !p.net_flow.is_finite()) {
        return Err(AnalyticsError::InvalidInput(format!(
            "net flow for {} is not a finite number",
            bad.period
        )));
    }
    if let Some(pair) = history.windows(2).find(|pair| pair[1].period <= pair[0].period) {
        return Err(AnalyticsError::InvalidInput(format!(
            "history must be strictly chronological, {} follows {}",
            pair[1].period, pair[0].period
        )));
    }
    Ok(())
}

/// Ordinary least squares over `(x, y)` pairs, returning `(intercept, slope)`.
/// Degenerate inputs (a single point) give a flat line through the mean.
fn least_squares(points: &[(f64, f64)]) -> (f64, f64) {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
        let dx = x - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });

    if sxx == 0.0 {
        return (mean_y, 0.0);
    }
    let slope = sxy / sxx;
    (mean_y - slope * mean_x, slope)
}

fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::TransactionType;
    use rust_decimal_macros::dec;

    fn month(key: &str) -> MonthKey {
        key.parse().unwrap()
    }

    fn series(start: &str, values: &[f64]) -> Vec<MonthlyNetFlow> {
        let start = month(start);
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MonthlyNetFlow {
                period: start.add_months(i as i32),
                net_flow: *v,
            })
            .collect()
    }

    #[test]
    fn test_single_point_repeats_last_value() {
        let history = series("2024-05", &[2500.0]);
        let points = CashflowForecaster::default().forecast(&history, 3).unwrap();

        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.realistic == 2500.0));
        assert_eq!(points[0].period_label, "2024-06");
        assert_eq!(points[2].period_label, "2024-08");
        assert_eq!(points[0].optimistic, 2750.0);
        assert_eq!(points[0].pessimistic, 2125.0);
    }

    #[test]
    fn test_linear_history_extends_line_and_bands_widen() {
        let history = series("2024-01", &[1000.0, 1100.0, 1200.0]);
        let points = CashflowForecaster::default().forecast(&history, 2).unwrap();

        assert_eq!(points[0].period_label, "2024-04");
        assert_eq!(points[0].realistic, 1300.0);
        assert_eq!(points[0].optimistic, 1430.0);
        assert_eq!(points[0].pessimistic, 1105.0);

        assert_eq!(points[1].realistic, 1400.0);
        assert_eq!(points[1].optimistic, 1610.0);
        assert_eq!(points[1].pessimistic, 1120.0);
    }

    #[test]
    fn test_labels_roll_over_year_end() {
        let history = series("2024-11", &[100.0, 100.0]);
        let points = CashflowForecaster::default().forecast(&history, 2).unwrap();
        assert_eq!(points[0].period_label, "2025-01");
        assert_eq!(points[1].period_label, "2025-02");
    }

    #[test]
    fn test_negative_flows_keep_band_order() {
        let history = series("2024-01", &[-500.0, -800.0, -1100.0]);
        let points = CashflowForecaster::default().forecast(&history, 4).unwrap();
        for p in &points {
            assert!(p.optimistic >= p.realistic);
            assert!(p.realistic >= p.pessimistic);
        }
    }

    #[test]
    fn test_confidence_decays_and_respects_ceiling() {
        let history = series("2023-01", &[10.0, 12.0, 9.0, 14.0, 11.0, 13.0, 15.0]);
        let points = CashflowForecaster::default().forecast(&history, 12).unwrap();

        assert!((points[0].confidence - 0.95).abs() < 1e-12);
        assert!(points.windows(2).all(|w| w[1].confidence < w[0].confidence));
        assert!(points.iter().all(|p| p.confidence > 0.0 && p.confidence <= 0.95));

        // Short history starts lower.
        let short = CashflowForecaster::default()
            .forecast(&series("2023-01", &[10.0]), 1)
            .unwrap();
        assert!(short[0].confidence < points[0].confidence);
    }

    #[test]
    fn test_confidence_strictly_decreases_up_to_long_horizon() {
        let params = ForecastParams {
            max_horizon: 600,
            ..Default::default()
        };
        let forecaster = CashflowForecaster::new(params).unwrap();
        let points = forecaster.forecast(&series("2023-01", &[10.0]), 600).unwrap();

        assert_eq!(points.len(), 600);
        assert!(points.windows(2).all(|w| w[1].confidence < w[0].confidence));
        assert!(points[599].confidence > 0.0);

        let too_long = ForecastParams {
            max_horizon: 10_000,
            ..Default::default()
        };
        assert!(matches!(
            CashflowForecaster::new(too_long),
            Err(AnalyticsError::Configuration(_))
        ));
    }

    #[test]
    fn test_edge_cases() {
        let forecaster = CashflowForecaster::default();
        let history = series("2024-01", &[1.0]);

        assert!(matches!(
            forecaster.forecast(&history, 0),
            Err(AnalyticsError::InvalidHorizon(0))
        ));
        assert!(matches!(
            forecaster.forecast(&history, -3),
            Err(AnalyticsError::InvalidHorizon(-3))
        ));
        assert!(matches!(
            forecaster.forecast(&history, 121),
            Err(AnalyticsError::InvalidHorizon(121))
        ));
        assert!(matches!(
            forecaster.forecast(&[], 3),
            Err(AnalyticsError::InsufficientData(_))
        ));
        // Horizon is checked before history.
        assert!(matches!(
            forecaster.forecast(&[], 0),
            Err(AnalyticsError::InvalidHorizon(0))
        ));

        let mut unordered = series("2024-01", &[1.0, 2.0]);
        unordered.swap(0, 1);
        assert!(matches!(
            forecaster.forecast(&unordered, 1),
            Err(AnalyticsError::InvalidInput(_))
        ));

        let nan = series("2024-01", &[1.0, f64::NAN]);
        assert!(matches!(
            forecaster.forecast(&nan, 1),
            Err(AnalyticsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_monthly_net_flows_fills_gaps() {
        let d = |m: u32, day: u32| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
        let txs = vec![
            Transaction::new(d(1, 3), TransactionType::Income, dec!(5000), "sales"),
            Transaction::new(d(1, 9), TransactionType::Expense, dec!(1200), "rent"),
            Transaction::new(d(3, 1), TransactionType::Expense, dec!(300), "utilities"),
            // outside the range
            Transaction::new(d(5, 1), TransactionType::Income, dec!(9999), "sales"),
        ];

        let flows = monthly_net_flows(&txs, month("2024-01"), month("2024-03")).unwrap();
        let values: Vec<f64> = flows.iter().map(|f| f.net_flow).collect();
        assert_eq!(values, vec![3800.0, 0.0, -300.0]);
        assert_eq!(flows[1].period, month("2024-02"));

        assert!(monthly_net_flows(&txs, month("2024-03"), month("2024-01")).is_err());
    }

    #[test]
    fn test_monthly_net_flows_overflow_is_invalid_input() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let txs = vec![
            Transaction::new(day, TransactionType::Income, Decimal::MAX, "sales"),
            Transaction::new(day, TransactionType::Income, Decimal::MAX, "sales"),
        ];

        assert!(matches!(
            monthly_net_flows(&txs, month("2024-01"), month("2024-01")),
            Err(AnalyticsError::InvalidInput(_))
        ));
    }
}
