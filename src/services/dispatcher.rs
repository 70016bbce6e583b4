//! Concurrent fan-out of one search to several restaurant providers.
//!
//! Every provider call runs inside the caller's future with its own timeout,
//! and all of them are joined before returning. A provider that errors or
//! times out contributes an empty list; nothing here ever fails the search.
//! Dropping the returned future cancels the calls still in flight.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::models::{ProviderId, RestaurantRecord};

use super::providers::RestaurantProvider;

/// How a single provider call ended
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    Succeeded,
    Failed(String),
    TimedOut,
}

impl ProviderOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProviderOutcome::Succeeded)
    }
}

/// Results of one provider, empty unless the call succeeded
#[derive(Debug, Clone)]
pub struct ProviderResults {
    pub provider: ProviderId,
    pub restaurants: Vec<RestaurantRecord>,
    pub outcome: ProviderOutcome,
}

impl ProviderResults {
    fn empty(provider: ProviderId, outcome: ProviderOutcome) -> Self {
        Self {
            provider,
            restaurants: Vec::new(),
            outcome,
        }
    }
}

/// Queries every provider concurrently, in the order given
///
/// The output has exactly one entry per provider, in the same order.
pub async fn dispatch(
    providers: &[Arc<dyn RestaurantProvider>],
    query: &str,
    location: &str,
    timeout: Duration,
) -> Vec<ProviderResults> {
    let calls = providers.iter().map(|provider| async move {
        let provider_id = provider.id();

        match tokio::time::timeout(timeout, provider.search(query, location)).await {
            Ok(Ok(restaurants)) => {
                tracing::debug!(
                    provider = %provider_id,
                    results = restaurants.len(),
                    "Provider returned results"
                );
                ProviderResults {
                    provider: provider_id,
                    restaurants,
                    outcome: ProviderOutcome::Succeeded,
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    provider = %provider_id,
                    error = %e,
                    "Provider search failed, continuing without its results"
                );
                ProviderResults::empty(provider_id, ProviderOutcome::Failed(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(
                    provider = %provider_id,
                    timeout_ms = timeout.as_millis() as u64,
                    "Provider search timed out, continuing without its results"
                );
                ProviderResults::empty(provider_id, ProviderOutcome::TimedOut)
            }
        }
    });

    let results = join_all(calls).await;

    let failed = results.iter().filter(|r| !r.outcome.is_success()).count();
    if failed > 0 {
        tracing::warn!(
            success_count = results.len() - failed,
            error_count = failed,
            "Partial provider failure"
        );
    }
    if !results.is_empty() && failed == results.len() {
        tracing::error!(query = %query, location = %location, "All restaurant providers failed");
    }

    results
}
