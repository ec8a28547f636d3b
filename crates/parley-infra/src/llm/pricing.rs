//! Cost estimation and pricing for providers.
//!
//! Provides a hardcoded default pricing table for known models with
//! user override capability from `config.toml`. Cost estimates are
//! clearly labeled as approximate (`~$0.12`).

use parley_core::ledger::{RateTable, Rates};
use parley_types::config::ProviderPricing;
use parley_types::llm::ProviderId;

/// Internal pricing entry for the hardcoded default table.
struct PricingEntry {
    provider: ProviderId,
    model_pattern: &'static str,
    input_cost_per_million: f64,
    output_cost_per_million: f64,
    per_image_cost: f64,
}

/// Conservative fallback pricing when no model match is found.
const FALLBACK_INPUT_COST: f64 = 5.0;
const FALLBACK_OUTPUT_COST: f64 = 15.0;
const FALLBACK_IMAGE_COST: f64 = 0.04;

const fn chat(
    provider: ProviderId,
    model_pattern: &'static str,
    input_cost_per_million: f64,
    output_cost_per_million: f64,
) -> PricingEntry {
    PricingEntry {
        provider,
        model_pattern,
        input_cost_per_million,
        output_cost_per_million,
        per_image_cost: 0.0,
    }
}

const fn image(model_pattern: &'static str, per_image_cost: f64) -> PricingEntry {
    PricingEntry {
        provider: ProviderId::ImageGen,
        model_pattern,
        input_cost_per_million: 0.0,
        output_cost_per_million: 0.0,
        per_image_cost,
    }
}

/// Default prices in USD per million tokens (per image for image models).
///
/// More specific patterns come first since matching is by prefix.
const DEFAULT_PRICING: &[PricingEntry] = &[
    // OpenAI
    chat(ProviderId::OpenAi, "gpt-4o-mini", 0.15, 0.60),
    chat(ProviderId::OpenAi, "gpt-4o", 2.50, 10.0),
    chat(ProviderId::OpenAi, "gpt-4-turbo", 10.0, 30.0),
    chat(ProviderId::OpenAi, "gpt-4", 30.0, 60.0),
    chat(ProviderId::OpenAi, "gpt-3.5-turbo", 0.50, 1.50),
    // Anthropic
    chat(ProviderId::Anthropic, "claude-3-5-sonnet", 3.0, 15.0),
    chat(ProviderId::Anthropic, "claude-3-5-haiku", 0.80, 4.0),
    chat(ProviderId::Anthropic, "claude-3-opus", 15.0, 75.0),
    chat(ProviderId::Anthropic, "claude-3-haiku", 0.25, 1.25),
    chat(ProviderId::Anthropic, "claude-sonnet-4", 3.0, 15.0),
    chat(ProviderId::Anthropic, "claude-opus-4", 15.0, 75.0),
    // Image generation (standard quality, 1024x1024)
    image("dall-e-3", 0.04),
    image("dall-e-2", 0.02),
];

/// Check if a model name matches a pattern using simple prefix matching.
///
/// `"gpt-4o"` matches `"gpt-4o-2024-08-06"`.
fn matches_pattern(model: &str, pattern: &str) -> bool {
    model.starts_with(pattern)
}

/// Static rate table: user overrides, then built-in defaults, then a
/// conservative fallback.
#[derive(Debug, Clone, Default)]
pub struct StaticRateTable {
    overrides: Vec<ProviderPricing>,
}

impl StaticRateTable {
    pub fn new(overrides: Vec<ProviderPricing>) -> Self {
        Self { overrides }
    }
}

impl RateTable for StaticRateTable {
    fn rates(&self, provider: ProviderId, model: &str) -> Rates {
        // 1. User overrides from config.toml
        if let Some(p) = self
            .overrides
            .iter()
            .find(|p| p.provider == provider && matches_pattern(model, &p.model_pattern))
        {
            return Rates {
                input_per_million: p.input_cost_per_million,
                output_per_million: p.output_cost_per_million,
                per_image: p.per_image_cost,
            };
        }

        // 2. Default table
        if let Some(entry) = DEFAULT_PRICING
            .iter()
            .find(|e| e.provider == provider && matches_pattern(model, e.model_pattern))
        {
            return Rates {
                input_per_million: entry.input_cost_per_million,
                output_per_million: entry.output_cost_per_million,
                per_image: entry.per_image_cost,
            };
        }

        // 3. Conservative fallback
        tracing::debug!(%provider, model, "no pricing entry, using fallback rates");
        match provider {
            ProviderId::ImageGen => Rates {
                per_image: FALLBACK_IMAGE_COST,
                ..Rates::default()
            },
            _ => Rates {
                input_per_million: FALLBACK_INPUT_COST,
                output_per_million: FALLBACK_OUTPUT_COST,
                per_image: 0.0,
            },
        }
    }
}

/// Format a cost estimate as a human-readable string.
///
/// Always prefixed with `~` to indicate the value is an estimate.
/// - Costs below $0.01 use 3 decimal places: `~$0.001`
/// - Costs $0.01 and above use 2 decimal places: `~$0.12`
pub fn format_cost(cost: f64) -> String {
    if cost < 0.01 {
        format!("~${cost:.3}")
    } else {
        format!("~${cost:.2}")
    }
}
