//! Currency conversion abstractions

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Currency every rate in a [`RateTable`] is expressed against.
pub const REFERENCE_CURRENCY: &str = "THB";

/// Built-in rates, in reference units per one unit of the currency.
const DEFAULT_RATES: [(&str, f64); 4] = [("THB", 1.0), ("USD", 36.0), ("EUR", 39.0), ("JPY", 0.24)];

/// Source of live exchange rates between two currencies.
#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64>;
}

/// Normalizes a user supplied currency code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn default_rate(code: &str) -> Option<f64> {
    DEFAULT_RATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, rate)| *rate)
}

fn check_rate(code: &str, rate: f64) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 {
        bail!("Rate for {code} must be a positive number, got {rate}");
    }
    Ok(())
}

/// Conversion factors from each currency into [`REFERENCE_CURRENCY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct RateTable {
    rates: BTreeMap<String, f64>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            rates: DEFAULT_RATES
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
        }
    }
}

impl TryFrom<BTreeMap<String, f64>> for RateTable {
    type Error = anyhow::Error;

    fn try_from(rates: BTreeMap<String, f64>) -> Result<Self> {
        Self::from_rates(rates)
    }
}

impl From<RateTable> for BTreeMap<String, f64> {
    fn from(table: RateTable) -> Self {
        table.rates
    }
}

impl RateTable {
    /// Builds a table from explicit rates. Codes are normalized and the
    /// reference currency is pinned to 1. Any other rate must be positive.
    pub fn from_rates<I>(rates: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut table = BTreeMap::new();
        for (code, rate) in rates {
            let code = normalize_code(&code);
            if code != REFERENCE_CURRENCY {
                check_rate(&code, rate)?;
            }
            table.insert(code, rate);
        }
        table.insert(REFERENCE_CURRENCY.to_string(), 1.0);
        Ok(Self { rates: table })
    }

    /// Looks up the rate for `code`, falling back to the built-in table.
    pub fn rate(&self, code: &str) -> Result<f64> {
        if let Some(rate) = self.rates.get(code) {
            return Ok(*rate);
        }
        match default_rate(code) {
            Some(rate) => {
                debug!("Using built-in rate for {code}: {rate}");
                Ok(rate)
            }
            None => Err(anyhow!("No exchange rate known for currency {code}")),
        }
    }

    /// Updates the rate of an existing or built-in currency.
    pub fn set_rate(&mut self, code: &str, rate: f64) -> Result<()> {
        let code = normalize_code(code);
        if code == REFERENCE_CURRENCY {
            bail!("The reference currency {REFERENCE_CURRENCY} is fixed at 1");
        }
        check_rate(&code, rate)?;
        debug!("Setting rate {code} = {rate}");
        self.rates.insert(code, rate);
        Ok(())
    }

    /// Registers a new user-defined currency.
    pub fn add_custom(&mut self, code: &str, rate: f64) -> Result<()> {
        let code = normalize_code(code);
        if code.is_empty() {
            bail!("Currency code must not be empty");
        }
        if self.rates.contains_key(&code) || default_rate(&code).is_some() {
            bail!("Currency {code} already exists");
        }
        check_rate(&code, rate)?;
        debug!("Adding custom currency {code} = {rate}");
        self.rates.insert(code, rate);
        Ok(())
    }

    pub fn codes(&self) -> Vec<String> {
        self.rates.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }
}

/// Converts `amount` from one currency to another through the reference
/// currency. Codes are matched case-insensitively and same-currency
/// conversions return `amount` untouched.
pub fn convert(amount: f64, from: &str, to: &str, rates: &RateTable) -> Result<f64> {
    let (from, to) = (normalize_code(from), normalize_code(to));
    if from == to {
        return Ok(amount);
    }
    let reference_amount = amount * rates.rate(&from)?;
    if to == REFERENCE_CURRENCY {
        return Ok(reference_amount);
    }
    Ok(reference_amount / rates.rate(&to)?)
}

/// Converts `amount` in `code` into the base currency.
pub fn to_base(amount: f64, code: &str, base: &str, rates: &RateTable) -> Result<f64> {
    convert(amount, code, base, rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thb_usd() -> RateTable {
        RateTable::from_rates([("THB".to_string(), 1.0), ("USD".to_string(), 36.0)]).unwrap()
    }

    #[test]
    fn test_convert_usd_thb_and_back() {
        let rates = thb_usd();
        assert_eq!(convert(100.0, "USD", "THB", &rates).unwrap(), 3600.0);
        assert_eq!(convert(3600.0, "THB", "USD", &rates).unwrap(), 100.0);
    }

    #[test]
    fn test_identity_conversion_is_exact() {
        let rates = RateTable::default();
        let amount = 0.1 + 0.2;
        assert_eq!(convert(amount, "JPY", "JPY", &rates).unwrap(), amount);
    }

    #[test]
    fn test_round_trip_between_non_reference_currencies() {
        let rates = RateTable::default();
        for amount in [0.0, 1.0, 12.34, 98765.4321] {
            let there = convert(amount, "EUR", "JPY", &rates).unwrap();
            let back = convert(there, "JPY", "EUR", &rates).unwrap();
            assert!((back - amount).abs() <= 1e-9 * amount.max(1.0));
        }
    }

    #[test]
    fn test_missing_rate_falls_back_to_defaults() {
        // Table without EUR still converts EUR through the built-in rate.
        let rates = thb_usd();
        assert_eq!(convert(1.0, "EUR", "THB", &rates).unwrap(), 39.0);
    }

    #[test]
    fn test_unknown_currency_is_an_error() {
        let rates = RateTable::default();
        let err = convert(10.0, "XYZ", "THB", &rates).unwrap_err();
        assert_eq!(err.to_string(), "No exchange rate known for currency XYZ");
        assert!(convert(10.0, "THB", "XYZ", &rates).is_err());
    }

    #[test]
    fn test_custom_currency() {
        let mut rates = RateTable::default();
        rates.add_custom("gbp", 45.0).unwrap();
        assert_eq!(rates.rate("GBP").unwrap(), 45.0);
        assert_eq!(convert(2.0, "GBP", "USD", &rates).unwrap(), 2.5);

        assert!(rates.add_custom("GBP", 46.0).is_err());
        assert!(rates.add_custom("USD", 30.0).is_err());
        assert!(rates.add_custom("NEW", 0.0).is_err());
    }

    #[test]
    fn test_set_rate_validation() {
        let mut rates = RateTable::default();
        rates.set_rate("usd", 35.5).unwrap();
        assert_eq!(rates.rate("USD").unwrap(), 35.5);

        assert!(rates.set_rate("USD", -1.0).is_err());
        assert!(rates.set_rate("USD", f64::NAN).is_err());
        assert!(rates.set_rate("THB", 2.0).is_err());
    }

    #[test]
    fn test_reference_is_pinned() {
        let rates = RateTable::from_rates([("THB".to_string(), 5.0)]).unwrap();
        assert_eq!(rates.rate("THB").unwrap(), 1.0);
    }

    #[test]
    fn test_rate_table_yaml() {
        let table: RateTable = serde_yaml::from_str("USD: 35.0\ngbp: 44.0\n").unwrap();
        assert_eq!(table.rate("USD").unwrap(), 35.0);
        assert_eq!(table.rate("GBP").unwrap(), 44.0);
        assert_eq!(table.rate("THB").unwrap(), 1.0);
        assert_eq!(table.codes(), vec!["GBP", "THB", "USD"]);
    }

    #[test]
    fn test_non_positive_rates_rejected() {
        for rate in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = RateTable::from_rates([("USD".to_string(), rate)]).unwrap_err();
            assert!(err.to_string().starts_with("Rate for USD must be a positive number"));
        }
    }

    #[test]
    fn test_rate_table_yaml_rejects_zero_rate() {
        assert!(serde_yaml::from_str::<RateTable>("USD: 0.0\n").is_err());
        assert!(serde_yaml::from_str::<RateTable>("EUR: -39.0\n").is_err());
    }

    #[test]
    fn test_convert_ignores_code_case() {
        let rates = thb_usd();
        assert_eq!(convert(1.5, "usd", "USD", &rates).unwrap(), 1.5);
        assert_eq!(convert(2.0, " usd", "thb", &rates).unwrap(), 72.0);
    }
}
