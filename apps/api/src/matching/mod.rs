// Matching core: category scoring, experience scoring, and the engine that
// aggregates them into ranked, classified job results. Pure computation —
// no I/O happens below `handlers`.

pub mod category;
pub mod engine;
pub mod experience;
pub mod handlers;

use serde::{Deserialize, Serialize};

/// One category's input to the overall percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryContribution {
    /// 0 – 10
    pub score: f64,
    pub contributes: bool,
}

/// Equal-weight mean over contributing categories, as an integer percentage.
///
/// Categories with `contributes == false` are ignored entirely; with none
/// contributing the result is 0.
pub fn aggregate_percentage(contributions: &[CategoryContribution]) -> u32 {
    let (sum, count) = contributions
        .iter()
        .filter(|c| c.contributes)
        .fold((0.0_f64, 0usize), |(sum, count), c| {
            (sum + c.score.clamp(0.0, 10.0) / 10.0, count + 1)
        });

    if count == 0 {
        return 0;
    }
    ((sum / count as f64) * 100.0).round().clamp(0.0, 100.0) as u32
}
