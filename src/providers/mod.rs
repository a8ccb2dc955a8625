pub mod util;
pub mod yahoo_finance;

use crate::core::currency::{CurrencyRateProvider, REFERENCE_CURRENCY};
use crate::core::state::AppState;
use futures::future::join_all;
use tracing::{debug, info};

/// Outcome of refreshing rates from a provider.
#[derive(Debug, Default)]
pub struct RateSync {
    pub updated: Vec<(String, f64)>,
    pub failed: Vec<(String, String)>,
}

/// Fetches the reference rate of every code in `codes` (the reference itself
/// is skipped) and applies the successful ones to `state`. `on_fetched` runs
/// once per finished request.
pub async fn sync_rates(
    provider: &(dyn CurrencyRateProvider + Send + Sync),
    state: &mut AppState,
    codes: &[String],
    on_fetched: &(dyn Fn() + Send + Sync),
) -> RateSync {
    let fetches = codes
        .iter()
        .filter(|code| code.as_str() != REFERENCE_CURRENCY)
        .map(|code| async move {
            let result = provider.get_rate(code, REFERENCE_CURRENCY).await;
            on_fetched();
            (code.clone(), result)
        });

    let mut outcome = RateSync::default();
    for (code, result) in join_all(fetches).await {
        match result.and_then(|rate| state.set_rate(&code, rate).map(|_| rate)) {
            Ok(rate) => {
                debug!("Updated {code} = {rate}");
                outcome.updated.push((code, rate));
            }
            Err(e) => {
                debug!("Rate sync failed for {code}: {e}");
                outcome.failed.push((code, e.to_string()));
            }
        }
    }
    info!(
        updated = outcome.updated.len(),
        failed = outcome.failed.len(),
        "Rate sync finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockCurrencyProvider {
        rates: HashMap<String, f64>,
    }

    #[async_trait]
    impl CurrencyRateProvider for MockCurrencyProvider {
        async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
            self.rates
                .get(&format!("{from}:{to}"))
                .cloned()
                .ok_or_else(|| anyhow!("Rate not found for {} to {}", from, to))
        }
    }

    #[tokio::test]
    async fn test_sync_rates_applies_successes_and_reports_failures() {
        let provider = MockCurrencyProvider {
            rates: HashMap::from([
                ("USD:THB".to_string(), 35.0),
                ("EUR:THB".to_string(), 38.5),
            ]),
        };
        let mut state = AppState::new("THB").unwrap();
        let calls = AtomicUsize::new(0);
        let codes: Vec<String> = ["THB", "USD", "EUR", "JPY"]
            .iter()
            .map(|c| c.to_string())
            .collect();

        let outcome = sync_rates(&provider, &mut state, &codes, &|| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.updated.len(), 2);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, "JPY");
        assert_eq!(state.rates().rate("USD").unwrap(), 35.0);
        assert_eq!(state.rates().rate("EUR").unwrap(), 38.5);
        assert_eq!(state.rates().rate("JPY").unwrap(), 0.24);
        assert_eq!(state.revision(), 2);
    }
}
