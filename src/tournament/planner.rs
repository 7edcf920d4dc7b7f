//! Expands competitors × attributes into the full list of comparison tasks.

use super::error::TournamentError;
use super::types::ComparisonTask;

/// Plan one task per ordered pair of distinct competitors per attribute.
///
/// Yields `n * (n - 1) * attributes.len()` tasks. Ordered pairs follow input
/// order (`(c0, c1), (c0, c2), ..., (c1, c0), ...`), with attributes varying
/// fastest. Duplicate attributes are kept, so repeating an attribute is how a
/// caller asks for repeated judgments of the same pair.
pub fn plan_comparisons<C: AsRef<str>, A: AsRef<str>>(
    competitors: &[C],
    attributes: &[A],
    model: &str,
) -> Result<Vec<ComparisonTask>, TournamentError> {
    if competitors.len() < 2 {
        return Err(TournamentError::InvalidInput(format!(
            "at least two competitors are required, got {}",
            competitors.len()
        )));
    }
    if attributes.is_empty() {
        return Err(TournamentError::InvalidInput(
            "at least one attribute is required".into(),
        ));
    }

    let n = competitors.len();
    let mut tasks = Vec::with_capacity(n * (n - 1) * attributes.len());

    for (i, a) in competitors.iter().enumerate() {
        for (j, b) in competitors.iter().enumerate() {
            if i == j {
                continue;
            }
            for attribute in attributes {
                tasks.push(ComparisonTask {
                    item_a: a.as_ref().to_string(),
                    item_b: b.as_ref().to_string(),
                    attribute: attribute.as_ref().to_string(),
                    model: model.to_string(),
                });
            }
        }
    }

    Ok(tasks)
}
