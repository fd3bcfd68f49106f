//! Statistical outlier detection over a population of same-type transactions.
//!
//! Population statistics use the population variance (divide by `n`). Each
//! transaction is scored against its peers, i.e. the population with that
//! transaction left out, so a single extreme entry cannot mask itself by
//! inflating the dispersion it is measured against.

use crate::error::{AnalyticsError, Result};
use crate::ratios::to_f64;
use chrono::{Months, NaiveDate};
use configuration::AnomalyParams;
use core_types::{Transaction, TransactionType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRecord {
    pub transaction_ref: Uuid,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    /// Mean of the other transactions in the population.
    pub peer_mean: f64,
    /// Dispersion the score was divided by: the peers' population std, floored
    /// at `min_relative_dispersion` of the peer mean.
    pub peer_std_dev: f64,
    /// `(amount - peer_mean) / peer_std_dev`.
    pub z_score: f64,
    pub severity: AnomalySeverity,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    pub transaction_type: TransactionType,
    pub sample_size: usize,
    pub mean: f64,
    pub std_dev: f64,
    /// Flagged transactions, largest |z| first.
    pub anomalies: Vec<AnomalyRecord>,
}

#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    params: AnomalyParams,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            params: AnomalyParams::default(),
        }
    }
}

impl AnomalyDetector {
    pub fn new(params: AnomalyParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Flags outliers in `transactions`, which must all share one type.
    ///
    /// A population smaller than `min_sample_size` is an error rather than an
    /// empty report, so callers can tell "nothing unusual" from "can't assess".
    pub fn detect(&self, transactions: &[Transaction]) -> Result<AnomalyReport> {
        // --- 1. Validation ---
        let n = transactions.len();
        if n < self.params.min_sample_size {
            tracing::warn!(
                sample_size = n,
                required = self.params.min_sample_size,
                "Population too small for anomaly detection"
            );
            return Err(AnalyticsError::InsufficientData(format!(
                "anomaly detection needs at least {} transactions, got {n}",
                self.params.min_sample_size
            )));
        }
        let kind = transactions[0].kind;
        for tx in transactions {
            tx.validate()?;
            if tx.kind != kind {
                return Err(AnalyticsError::InvalidInput(format!(
                    "population mixes {kind} and {} transactions",
                    tx.kind
                )));
            }
        }

        // --- 2. Population statistics ---
        let stats = Sums::collect(transactions)?;
        let population_mean = to_f64(stats.sum) / n as f64;
        let population_std = stats.variance_without(None).sqrt();

        let first = transactions[0].amount;
        if transactions.iter().all(|tx| tx.amount == first) {
            tracing::debug!(sample_size = n, "Zero-variance population, nothing to flag");
            return Ok(AnomalyReport {
                transaction_type: kind,
                sample_size: n,
                mean: population_mean,
                std_dev: 0.0,
                anomalies: Vec::new(),
            });
        }

        // --- 3. Scoring ---
        let mut anomalies: Vec<AnomalyRecord> = transactions
            .iter()
            .filter_map(|tx| {
                let amount = to_f64(tx.amount);
                let peer_mean = to_f64(stats.sum - tx.amount) / (n - 1) as f64;
                let floor = self.params.min_relative_dispersion * peer_mean.abs();
                let mut peer_std = stats.variance_without(Some(tx.amount)).sqrt().max(floor);
                if peer_std == 0.0 {
                    peer_std = population_std;
                }

                let z_score = (amount - peer_mean) / peer_std;
                let severity = self.classify(z_score)?;
                Some(AnomalyRecord {
                    transaction_ref: tx.id,
                    date: tx.date,
                    amount,
                    category: tx.category.clone(),
                    peer_mean,
                    peer_std_dev: peer_std,
                    z_score,
                    severity,
                    description: describe(tx, z_score),
                })
            })
            .collect();

        anomalies.sort_by(|a, b| b.z_score.abs().total_cmp(&a.z_score.abs()));

        tracing::debug!(
            kind = %kind,
            sample_size = n,
            flagged = anomalies.len(),
            "Anomaly detection finished"
        );

        Ok(AnomalyReport {
            transaction_type: kind,
            sample_size: n,
            mean: population_mean,
            std_dev: population_std,
            anomalies,
        })
    }

    /// Runs `detect` over the `kind` transactions dated in the trailing
    /// `window_months` ending at `as_of` (exclusive start, inclusive end).
    pub fn detect_trailing(
        &self,
        transactions: &[Transaction],
        kind: TransactionType,
        as_of: NaiveDate,
    ) -> Result<AnomalyReport> {
        let start = as_of
            .checked_sub_months(Months::new(self.params.window_months))
            .ok_or_else(|| {
                AnalyticsError::InvalidInput(format!("window start before {as_of} is out of range"))
            })?;

        let window: Vec<Transaction> = transactions
            .iter()
            .filter(|tx| tx.kind == kind && tx.date > start && tx.date <= as_of)
            .cloned()
            .collect();

        tracing::debug!(%start, %as_of, selected = window.len(), "Trailing anomaly window selected");
        self.detect(&window)
    }

    fn classify(&self, z_score: f64) -> Option<AnomalySeverity> {
        let magnitude = z_score.abs();
        if magnitude > self.params.high_z {
            Some(AnomalySeverity::High)
        } else if magnitude > self.params.medium_z {
            Some(AnomalySeverity::Medium)
        } else {
            None
        }
    }
}

/// Exact running sums used for the population and every leave-one-out peer set.
struct Sums {
    n: usize,
    sum: Decimal,
    sum_sq: Decimal,
}

impl Sums {
    fn collect(transactions: &[Transaction]) -> Result<Self> {
        let overflow = || AnalyticsError::InvalidInput("transaction amounts are too large".to_string());

        let mut sum = Decimal::ZERO;
        let mut sum_sq = Decimal::ZERO;
        for tx in transactions {
            sum = sum.checked_add(tx.amount).ok_or_else(overflow)?;
            let square = tx.amount.checked_mul(tx.amount).ok_or_else(overflow)?;
            sum_sq = sum_sq.checked_add(square).ok_or_else(overflow)?;
        }
        Ok(Self {
            n: transactions.len(),
            sum,
            sum_sq,
        })
    }

    /// Population variance of the whole set, or of the set without one `excluded` value.
    fn variance_without(&self, excluded: Option<Decimal>) -> f64 {
        let (count, sum, sum_sq) = match excluded {
            Some(x) => (self.n - 1, self.sum - x, self.sum_sq - x * x),
            None => (self.n, self.sum, self.sum_sq),
        };
        let count = Decimal::from(count);
        let mean = sum / count;
        let variance = sum_sq / count - mean * mean;
        to_f64(variance).max(0.0)
    }
}

fn describe(tx: &Transaction, z_score: f64) -> String {
    let direction = if z_score >= 0.0 { "above" } else { "below" };
    format!(
        "{} of {} on {} ({}) is {:.1} standard deviations {direction} comparable {} transactions",
        tx.kind,
        tx.amount.round_dp(2),
        tx.date,
        tx.category,
        z_score.abs(),
        tx.kind
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn expenses(amounts: &[Decimal]) -> Vec<Transaction> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                Transaction::new(day(i as u32 + 1), TransactionType::Expense, *amount, "supplies")
            })
            .collect()
    }

    #[test]
    fn test_reference_outlier_flagged_high() {
        let txs = expenses(&[dec!(2000), dec!(2100), dec!(1950), dec!(2050), dec!(50000)]);
        let report = AnomalyDetector::default().detect(&txs).unwrap();

        assert_eq!(report.sample_size, 5);
        assert_eq!(report.mean, 11620.0);
        assert_eq!(report.anomalies.len(), 1);
        let record = &report.anomalies[0];
        assert_eq!(record.transaction_ref, txs[4].id);
        assert_eq!(record.severity, AnomalySeverity::High);
        assert!(record.z_score > 3.0);
        assert!(record.description.contains("50000"));
        assert!(record.description.contains("2024-03-05"));
    }

    #[test]
    fn test_record_carries_peer_statistics() {
        let txs = expenses(&[dec!(2000), dec!(2100), dec!(1950), dec!(2050), dec!(50000)]);
        let report = AnomalyDetector::default().detect(&txs).unwrap();

        let record = &report.anomalies[0];
        assert_eq!(record.peer_mean, 2025.0);
        // Peers 2000, 2100, 1950, 2050: population std ~55.9.
        assert!((record.peer_std_dev - 55.9017).abs() < 1e-3);
        let recomputed = (record.amount - record.peer_mean) / record.peer_std_dev;
        assert!((record.z_score - recomputed).abs() < 1e-9);
    }

    #[test]
    fn test_zero_variance_has_no_outliers() {
        let txs = expenses(&[dec!(450); 8]);
        let report = AnomalyDetector::default().detect(&txs).unwrap();
        assert!(report.anomalies.is_empty());
        assert_eq!(report.std_dev, 0.0);
    }

    #[test]
    fn test_hundredfold_outlier_among_identical_peers() {
        let txs = expenses(&[dec!(100), dec!(100), dec!(100), dec!(100), dec!(10000)]);
        let report = AnomalyDetector::default().detect(&txs).unwrap();
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.anomalies[0].severity, AnomalySeverity::High);
    }

    #[test]
    fn test_medium_band() {
        // Peers of the last entry: mean 100, population std ~16.33; z ~ 2.45.
        let txs = expenses(&[dec!(80), dec!(120), dec!(80), dec!(120), dec!(100), dec!(100), dec!(140)]);
        let report = AnomalyDetector::default().detect(&txs).unwrap();
        assert_eq!(report.anomalies.len(), 1);
        let record = &report.anomalies[0];
        assert_eq!(record.severity, AnomalySeverity::Medium);
        assert!(record.z_score > 2.0 && record.z_score <= 3.0);
    }

    #[test]
    fn test_sorted_by_magnitude() {
        let txs = expenses(&[
            dec!(1000),
            dec!(1010),
            dec!(990),
            dec!(1005),
            dec!(995),
            dec!(1000),
            dec!(5000),
            dec!(20000),
        ]);
        let report = AnomalyDetector::default().detect(&txs).unwrap();
        let magnitudes: Vec<f64> = report.anomalies.iter().map(|a| a.z_score.abs()).collect();
        assert!(magnitudes.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(report.anomalies[0].transaction_ref, txs[7].id);
    }

    #[test]
    fn test_small_population_is_an_error() {
        let txs = expenses(&[dec!(1), dec!(2), dec!(3), dec!(400)]);
        let err = AnomalyDetector::default().detect(&txs).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData(_)));
    }

    #[test]
    fn test_mixed_types_rejected() {
        let mut txs = expenses(&[dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)]);
        txs[2].kind = TransactionType::Income;
        let err = AnomalyDetector::default().detect(&txs).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
    }

    #[test]
    fn test_trailing_window_selection() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let mut txs = Vec::new();
        for (m, amount) in [(1, dec!(100)), (2, dec!(100)), (3, dec!(100)), (4, dec!(100)), (5, dec!(100))] {
            txs.push(Transaction::new(
                NaiveDate::from_ymd_opt(2024, m, 15).unwrap(),
                TransactionType::Expense,
                amount,
                "supplies",
            ));
        }
        // Outside the six-month window ending 2024-06-30.
        txs.push(Transaction::new(
            NaiveDate::from_ymd_opt(2023, 12, 30).unwrap(),
            TransactionType::Expense,
            dec!(90000),
            "supplies",
        ));
        // Income is filtered out by type.
        txs.push(Transaction::new(as_of, TransactionType::Income, dec!(90000), "sales"));

        let report = AnomalyDetector::default()
            .detect_trailing(&txs, TransactionType::Expense, as_of)
            .unwrap();
        assert_eq!(report.sample_size, 5);
        assert!(report.anomalies.is_empty());
    }
}
