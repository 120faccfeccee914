//! Strategy fan-out.
//!
//! Each strategy is a plain function from document bytes to a candidate
//! record. PDF strategies run on tokio's blocking pool so that a panic
//! inside a parsing library, or a pathological document, only costs that
//! strategy.

use std::any::Any;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, trace};

use super::layout::LayoutOptions;
use crate::error::StrategyError;
use crate::models::{DocfieldConfig, DocumentConfig, ExtractedPurchaseOrder, ExtractionMethod, ScoringWeights};

/// Settings shared by every strategy of one extractor.
#[derive(Debug, Clone, Default)]
pub struct ExtractionSettings {
    pub document: DocumentConfig,
    pub scoring: ScoringWeights,
}

impl ExtractionSettings {
    pub fn from_config(config: &DocfieldConfig) -> Self {
        Self {
            document: config.document.clone(),
            scoring: config.scoring.clone(),
        }
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            line_tolerance: self.document.line_tolerance,
            column_gap: self.document.column_gap,
            min_table_columns: self.document.min_table_columns,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.document.strategy_timeout_ms.map(Duration::from_millis)
    }
}

pub type StrategyResult = Result<ExtractedPurchaseOrder, StrategyError>;

/// Signature every strategy implements.
pub type StrategyFn = fn(&[u8], &ExtractionSettings) -> StrategyResult;

/// A named extraction strategy.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub method: ExtractionMethod,
    pub run: StrategyFn,
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("method", &self.method).finish()
    }
}

/// Outcome of one strategy.
#[derive(Debug)]
pub struct StrategyReport {
    pub method: ExtractionMethod,
    pub outcome: StrategyResult,
}

/// Run strategies concurrently and collect one report per strategy, in
/// strategy order.
///
/// Returns once every strategy has reported or `timeout` has elapsed;
/// strategies still running then are reported as timed out. Their blocking
/// threads cannot be interrupted and finish in the background.
pub fn run_strategies(
    strategies: &[Strategy],
    data: Arc<[u8]>,
    settings: Arc<ExtractionSettings>,
    timeout: Option<Duration>,
) -> Vec<StrategyReport> {
    let runtime = match strategy_runtime() {
        Ok(runtime) => runtime,
        Err(e) => {
            return strategies
                .iter()
                .map(|strategy| StrategyReport {
                    method: strategy.method,
                    outcome: Err(StrategyError::Io(io::Error::new(e.kind(), e.to_string()))),
                })
                .collect();
        }
    };

    let mut outcomes: Vec<Option<StrategyResult>> = strategies.iter().map(|_| None).collect();

    runtime.block_on(async {
        let mut tasks = JoinSet::new();
        for (index, strategy) in strategies.iter().enumerate() {
            let data = Arc::clone(&data);
            let settings = Arc::clone(&settings);
            let run = strategy.run;
            let handle = tokio::task::spawn_blocking(move || run(&data, &settings));
            tasks.spawn(async move { (index, handle.await) });
        }

        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let joined = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        debug!("Strategy deadline reached with {} pending", tasks.len());
                        break;
                    }
                },
                None => tasks.join_next().await,
            };

            let Some(joined) = joined else {
                break;
            };
            // The wrapper task only awaits the blocking handle.
            let Ok((index, result)) = joined else {
                continue;
            };

            trace!("Strategy {} reported", strategies[index].method);
            outcomes[index] = match result {
                Ok(outcome) => Some(outcome),
                Err(e) => panicked(e),
            };
        }
    });

    // Do not wait for blocking threads that missed the deadline.
    runtime.shutdown_background();

    let timeout_ms = timeout.map(|t| t.as_millis() as u64).unwrap_or(0);

    strategies
        .iter()
        .zip(outcomes)
        .map(|(strategy, outcome)| StrategyReport {
            method: strategy.method,
            outcome: outcome.unwrap_or_else(|| Err(StrategyError::TimedOut(timeout_ms))),
        })
        .collect()
}

fn strategy_runtime() -> io::Result<Runtime> {
    Builder::new_current_thread()
        .enable_time()
        .thread_name("docfield-strategy")
        .build()
}

/// A panicked strategy becomes an error report; a cancelled one reports nothing.
fn panicked(e: JoinError) -> Option<StrategyResult> {
    e.is_panic()
        .then(|| Err(StrategyError::Panicked(panic_message(e.into_panic().as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
