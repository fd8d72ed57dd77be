//! Bounded concurrent fan-out over pipeline units.

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinSet;

use super::unit::{self, UnitContext, UnitOutcome};

/// Runs one unit per `(link, file_name)` task with at most `max_concurrent`
/// in flight.
///
/// Keeps the set topped up as units finish and joins them all before
/// returning, in completion order. The first unit error propagates
/// immediately; dropping the set aborts the rest of the run.
pub async fn run_units_parallel(
    ctx: Arc<UnitContext>,
    tasks: Vec<(String, String)>,
    max_concurrent: usize,
) -> Result<Vec<UnitOutcome>> {
    let max_concurrent = max_concurrent.max(1);
    let mut queue = tasks.into_iter();
    let mut join_set = JoinSet::new();
    let mut outcomes = Vec::new();

    loop {
        while join_set.len() < max_concurrent {
            let Some((link, file_name)) = queue.next() else { break };
            join_set.spawn(unit::run_unit(Arc::clone(&ctx), link, file_name));
        }
        match join_set.join_next().await {
            Some(res) => {
                let outcome =
                    res.map_err(|err| anyhow::anyhow!("pipeline unit panicked: {err}"))??;
                outcomes.push(outcome);
            }
            None => break,
        }
    }

    Ok(outcomes)
}
