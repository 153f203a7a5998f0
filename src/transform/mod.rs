use crate::error::{EtlError, Result};
use crate::extract::BankRecord;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};
use tracing::debug;

/// A `BankRecord` with the market cap cast to a number and converted into the
/// three target currencies. Serde renames carry the canonical column names
/// into both sinks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedBankRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "MC_USD_Billion")]
    pub mc_usd_billion: f64,
    #[serde(rename = "MC_GBP_Billion")]
    pub mc_gbp_billion: f64,
    #[serde(rename = "MC_EUR_Billion")]
    pub mc_eur_billion: f64,
    #[serde(rename = "MC_INR_Billion")]
    pub mc_inr_billion: f64,
}

impl EnrichedBankRecord {
    pub const FIELDS: [&'static str; 5] = [
        "Name",
        "MC_USD_Billion",
        "MC_GBP_Billion",
        "MC_EUR_Billion",
        "MC_INR_Billion",
    ];
}

#[derive(Debug, Deserialize)]
struct RateRow {
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Rate")]
    rate: f64,
}

/// Currency code → USD-relative multiplier, loaded once per run and immutable
/// thereafter. Every derived field in a run comes from one snapshot.
#[derive(Debug, Clone)]
pub struct ExchangeRates {
    rates: BTreeMap<String, f64>,
}

impl ExchangeRates {
    pub fn new(rates: BTreeMap<String, f64>) -> Self {
        Self { rates }
    }

    /// Load the snapshot from a CSV with a `Currency,Rate` header. Rates must
    /// be positive and finite.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let mut rates = BTreeMap::new();
        for row in reader.deserialize() {
            let row: RateRow = row?;
            if !row.rate.is_finite() || row.rate <= 0.0 {
                return Err(EtlError::Parse(format!(
                    "exchange rate for {} must be a positive number, got {}",
                    row.currency, row.rate
                )));
            }
            rates.insert(row.currency, row.rate);
        }
        debug!(currencies = rates.len(), "loaded exchange rate table");
        Ok(Self { rates })
    }

    pub fn get(&self, currency: &str) -> Result<f64> {
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| EtlError::RateLookup(currency.to_string()))
    }
}

/// Round to two fractional digits, half away from zero. Applied uniformly to
/// every derived field in the run.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Cast each record's market cap to a number and derive the GBP, EUR and INR
/// columns from the rate snapshot. A single non-numeric value aborts the whole
/// set; no partial-row skipping.
pub fn transform(
    records: Vec<BankRecord>,
    rates: &ExchangeRates,
) -> Result<Vec<EnrichedBankRecord>> {
    let gbp = rates.get("GBP")?;
    let eur = rates.get("EUR")?;
    let inr = rates.get("INR")?;

    records
        .into_iter()
        .map(|record| {
            let usd: f64 = record.mc_usd_billion.parse().map_err(|_| EtlError::Cast {
                name: record.name.clone(),
                value: record.mc_usd_billion.clone(),
            })?;
            Ok(EnrichedBankRecord {
                name: record.name,
                mc_usd_billion: usd,
                mc_gbp_billion: round2(usd * gbp),
                mc_eur_billion: round2(usd * eur),
                mc_inr_billion: round2(usd * inr),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn bank(name: &str, mc_usd_billion: &str) -> BankRecord {
        BankRecord {
            name: name.to_string(),
            mc_usd_billion: mc_usd_billion.to_string(),
        }
    }

    fn sample_rates() -> ExchangeRates {
        ExchangeRates::new(BTreeMap::from([
            ("GBP".to_string(), 0.8),
            ("EUR".to_string(), 0.93),
            ("INR".to_string(), 82.1),
        ]))
    }

    #[test]
    fn derives_all_three_currencies_exactly() -> Result<()> {
        let records = vec![bank("Alpha", "100.00"), bank("Beta", "50.00")];
        let enriched = transform(records, &sample_rates())?;

        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].mc_usd_billion, 100.0);
        assert_eq!(enriched[0].mc_gbp_billion, 80.0);
        assert_eq!(enriched[0].mc_eur_billion, 93.0);
        assert_eq!(enriched[0].mc_inr_billion, 8210.0);
        assert_eq!(enriched[1].mc_gbp_billion, 40.0);
        assert_eq!(enriched[1].mc_eur_billion, 46.5);
        assert_eq!(enriched[1].mc_inr_billion, 4105.0);

        // source order preserved
        assert_eq!(enriched[0].name, "Alpha");
        assert_eq!(enriched[1].name, "Beta");
        Ok(())
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // 0.125 is exact in binary, so the tie is real: half-even would
        // give 0.12 here.
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(432.918), 432.92);
        assert_eq!(round2(1.004), 1.0);
    }

    #[test]
    fn missing_rate_code_is_a_lookup_error() {
        let rates = ExchangeRates::new(BTreeMap::from([
            ("GBP".to_string(), 0.8),
            ("EUR".to_string(), 0.93),
        ]));
        let err = transform(vec![bank("Alpha", "100.00")], &rates).unwrap_err();
        assert!(matches!(err, EtlError::RateLookup(ref code) if code == "INR"), "got {err:?}");
    }

    #[test]
    fn non_numeric_market_cap_aborts_the_whole_set() {
        let records = vec![bank("Alpha", "100.00"), bank("Beta", "n/a")];
        let err = transform(records, &sample_rates()).unwrap_err();
        assert!(matches!(err, EtlError::Cast { ref name, .. } if name == "Beta"), "got {err:?}");
    }

    #[test]
    fn loads_rate_table_from_csv() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("exchange_rate.csv");
        fs::write(&path, "Currency,Rate\nGBP,0.8\nEUR,0.93\nINR,82.1\n")?;

        let rates = ExchangeRates::load(&path)?;
        assert_eq!(rates.get("GBP")?, 0.8);
        assert_eq!(rates.get("INR")?, 82.1);
        assert!(matches!(rates.get("JPY"), Err(EtlError::RateLookup(_))));
        Ok(())
    }

    #[test]
    fn non_positive_rate_is_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("exchange_rate.csv");
        fs::write(&path, "Currency,Rate\nGBP,-0.8\n")?;

        let err = ExchangeRates::load(&path).unwrap_err();
        assert!(matches!(err, EtlError::Parse(_)), "got {err:?}");
        Ok(())
    }
}
