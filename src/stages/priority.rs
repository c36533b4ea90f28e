//! Priority card placement.
//!
//! Named cards from the configuration are looked up against the full
//! repository (deliberately bypassing color and legality filters, so a
//! build-around commander or combo piece is never silently dropped) and
//! added before any scored selection runs.

use crate::config::DeckConfig;
use crate::context::{BuildContext, PoolCard};
use crate::repository::{CardRepository, RepositoryError};

/// Adds every configured priority card to the context. Cards the
/// repository does not know are recorded as unmet conditions; the build
/// continues without them.
pub fn run(
    context: &mut BuildContext,
    config: &DeckConfig,
    repository: &dyn CardRepository,
) -> Result<(), RepositoryError> {
    for entry in &config.priority_cards {
        match repository.find_by_name(&entry.name)? {
            Some(card) => {
                let copies = entry.min_copies.min(config.deck.max_card_copies);
                context.add_card(
                    PoolCard::from(card),
                    "Priority card",
                    "priority",
                    copies,
                    None,
                );
            }
            None => {
                context.record_unmet_condition(format!(
                    "Priority card not found: {}",
                    entry.name
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardRecord;
    use crate::config::PriorityCardEntry;
    use crate::repository::InMemoryRepository;

    fn config_with(entries: Vec<PriorityCardEntry>) -> DeckConfig {
        let mut config = DeckConfig::default();
        config.priority_cards = entries;
        config
    }

    #[test]
    fn test_places_found_priority_cards() {
        let repo = InMemoryRepository::new(vec![
            CardRecord::new("Lightning Bolt").types(&["Instant"]),
        ]);
        let config = config_with(vec![PriorityCardEntry::new("Lightning Bolt", 4)]);
        let mut context = BuildContext::new("test");

        run(&mut context, &config, &repo).unwrap();

        assert_eq!(context.card_quantity("Lightning Bolt"), 4);
        assert!(context.unmet_conditions().is_empty());
    }

    #[test]
    fn test_missing_card_records_unmet_condition() {
        let repo = InMemoryRepository::new(vec![]);
        let config = config_with(vec![PriorityCardEntry::new("Black Lotus", 1)]);
        let mut context = BuildContext::new("test");

        run(&mut context, &config, &repo).unwrap();

        assert_eq!(context.total_cards(), 0);
        assert_eq!(context.unmet_conditions().len(), 1);
        assert!(context.unmet_conditions()[0].contains("Black Lotus"));
    }

    #[test]
    fn test_min_copies_clamped_to_max_copies() {
        let repo = InMemoryRepository::new(vec![CardRecord::new("Shock").types(&["Instant"])]);
        let config = config_with(vec![PriorityCardEntry::new("Shock", 9)]);
        let mut context = BuildContext::new("test");

        run(&mut context, &config, &repo).unwrap();

        assert_eq!(context.card_quantity("Shock"), config.deck.max_card_copies);
    }
}
