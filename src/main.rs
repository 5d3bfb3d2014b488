// =============================================================================
// Oscillator Replay — evaluate stored alert rules against a candle file
// =============================================================================
//
// Reads candles (JSON array) from REPLAY_CANDLES and rules from the engine
// config at REPLAY_CONFIG, then evaluates every enabled rule on its own
// blocking task and logs the current zone and every historical trigger.
// =============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use oscillator_engine::cache::{CacheKey, IndicatorCache};
use oscillator_engine::runtime_config::EngineConfig;
use oscillator_engine::signals::{classify, detect_series, AlertRule, TriggerEvent};
use oscillator_engine::types::format_timestamp;
use oscillator_engine::{compute_kind_history, Candle, CandleSeries, EngineError, Zone};

/// Outcome of replaying one rule.
struct RuleReport {
    rule_id: String,
    indicator: String,
    latest: Option<(f64, Zone)>,
    events: Vec<TriggerEvent>,
}

fn evaluate_rule(
    rule: &AlertRule,
    candles: &CandleSeries,
    cache: &IndicatorCache,
) -> Result<RuleReport, EngineError> {
    let kind = rule.kind()?;
    let key = CacheKey {
        symbol: rule.symbol.clone(),
        timeframe: rule.timeframe.clone(),
        kind,
    };
    let points = cache.get_or_compute(key, || compute_kind_history(candles, &kind));

    let latest = points
        .last()
        .map(|p| (p.value, classify(p.value, &rule.config.levels)));

    Ok(RuleReport {
        rule_id: rule.id.clone(),
        indicator: kind.to_string(),
        latest,
        events: detect_series(&rule.config, &points),
    })
}

fn load_candles(path: &str) -> Result<CandleSeries> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read candles from {path}"))?;
    let raw: Vec<Candle> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse candles from {path}"))?;
    Ok(CandleSeries::new(raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("REPLAY_CONFIG").unwrap_or_else(|_| "engine_config.json".into());
    let config = EngineConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    // ── 2. Candles ───────────────────────────────────────────────────────
    let candles_path =
        std::env::var("REPLAY_CANDLES").context("REPLAY_CANDLES must point to a candle file")?;
    let candles = load_candles(&candles_path)?;
    info!(
        candles = candles.len(),
        dropped = candles.dropped(),
        first = %candles.candles().first().map_or_else(String::new, |c| format_timestamp(c.timestamp)),
        last = %candles.last().map_or_else(String::new, |c| format_timestamp(c.timestamp)),
        "Candles loaded"
    );

    let symbol_filter = std::env::var("REPLAY_SYMBOL").ok().map(|s| s.to_uppercase());
    let cache = Arc::new(IndicatorCache::new(config.cache_ttl()));

    // ── 3. Evaluate rules concurrently ───────────────────────────────────
    let mut tasks = JoinSet::new();
    for rule in config.enabled_rules() {
        if let Some(symbol) = &symbol_filter {
            if !rule.symbol.eq_ignore_ascii_case(symbol) {
                continue;
            }
        }
        let rule = rule.clone();
        let snapshot = candles.clone();
        let cache = Arc::clone(&cache);
        tasks.spawn_blocking(move || {
            let id = rule.id.clone();
            (id, evaluate_rule(&rule, &snapshot, &cache))
        });
    }

    if tasks.is_empty() {
        warn!("No enabled rules to evaluate");
    }

    // ── 4. Report ────────────────────────────────────────────────────────
    while let Some(joined) = tasks.join_next().await {
        let (id, outcome) = match joined {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Rule task failed");
                continue;
            }
        };

        let report = match outcome {
            Ok(report) => report,
            Err(e) => {
                warn!(rule = %id, error = %e, "Rule skipped");
                continue;
            }
        };

        match report.latest {
            Some((value, zone)) => info!(
                rule = %report.rule_id,
                indicator = %report.indicator,
                value = %format!("{value:.2}"),
                zone = %zone,
                triggers = report.events.len(),
                "Rule evaluated"
            ),
            None => info!(
                rule = %report.rule_id,
                indicator = %report.indicator,
                "Indicator not yet available"
            ),
        }

        for event in &report.events {
            info!(
                rule = %report.rule_id,
                kind = %event.kind,
                boundary = ?event.boundary,
                at = %format_timestamp(event.timestamp),
                value = %format!("{:.2}", event.value),
                "Trigger"
            );
        }
    }

    Ok(())
}
