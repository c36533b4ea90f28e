//! Final size correction: trim an oversized deck or top up a short one
//! with basic lands.

use std::cmp::Ordering;

use crate::config::DeckConfig;
use crate::context::BuildContext;
use crate::repository::{CardRepository, RepositoryError};
use crate::stages::lands;

/// Corrects the deck to the configured size, running at most two rounds.
///
/// An oversized deck sheds its lowest-scored non-basic-land entries one
/// copy at a time; a short deck is topped up with basic lands. A second
/// round catches the case where the top-up itself could not place enough
/// lands. Whatever remains off-target afterwards is recorded as an unmet
/// condition, never an error.
pub fn run(
    context: &mut BuildContext,
    config: &DeckConfig,
    repository: &dyn CardRepository,
) -> Result<(), RepositoryError> {
    let target = config.deck.size;
    for _ in 0..2 {
        let total = context.total_cards();
        match total.cmp(&target) {
            Ordering::Greater => trim(context, total - target),
            Ordering::Less => {
                lands::basic_lands(context, config, repository, Some(target - total))?;
                // A round that placed nothing will not do better next time.
                if context.total_cards() == total {
                    break;
                }
            }
            Ordering::Equal => break,
        }
    }

    let final_size = context.total_cards();
    if final_size != target {
        context.record_unmet_condition(format!(
            "Final deck size {final_size} differs from target {target}"
        ));
        if !config.fallback_strategy.allow_less_than_target && final_size < target {
            context.log(format!(
                "Deck is short {} cards and shortfalls are not allowed",
                target - final_size
            ));
        }
    }
    Ok(())
}

/// Removes `excess` copies, lowest-scored non-basic-land entries first.
/// Ties break toward the name that sorts last, matching pruning.
fn trim(context: &mut BuildContext, excess: u32) {
    let mut remaining = excess;
    while remaining > 0 {
        let victim = context
            .cards()
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.quantity > 0 && !entry.card.is_basic_land())
            .min_by(|(_, a), (_, b)| {
                let score_a = a.score.unwrap_or(0);
                let score_b = b.score.unwrap_or(0);
                match score_a.cmp(&score_b) {
                    Ordering::Equal => b.name().cmp(a.name()),
                    other => other,
                }
            })
            .map(|(index, entry)| (index, entry.quantity));
        let Some((index, quantity)) = victim else {
            break;
        };
        let removed = remaining.min(quantity);
        context.remove_copies(index, removed, None);
        remaining -= removed;
    }
}
