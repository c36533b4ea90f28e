//! Fallback filling: last-resort slots when the categories could not
//! reach their combined target.

use crate::config::DeckConfig;
use crate::context::{BuildContext, PoolCard};
use crate::repository::RepositoryView;
use crate::scoring::{ScoredCard, score_card, sort_for_selection};

/// Fills the gap between the non-land cards selected so far and the sum of
/// the scaled category targets, drawing from the whole pool.
///
/// Only runs when `fill_with_any` is enabled. The dynamic threshold keeps
/// the stage from dredging the bottom of the pool: a fallback pick must
/// score at least `min_score_to_flag`, and strictly above the average
/// score of the cards already chosen. Cards matching a category named in
/// `fill_priority` get a one-point edge.
pub fn run(context: &mut BuildContext, config: &DeckConfig, view: &RepositoryView, budget: u32) {
    if !config.fallback_strategy.fill_with_any {
        return;
    }

    let combined_target: u32 = context
        .category_summary
        .values()
        .map(|summary| summary.target)
        .sum();
    let current = context.nonland_count();
    if current >= combined_target {
        return;
    }
    let mut wanted = (combined_target - current).min(budget.saturating_sub(current));
    if wanted == 0 {
        return;
    }

    let threshold = dynamic_threshold(context, config);
    context.log(format!(
        "Fallback filling {wanted} slots (threshold {threshold})"
    ));

    let mut candidates: Vec<ScoredCard> = view
        .cards()
        .iter()
        .filter(|card| !card.is_land())
        .filter(|card| !context.is_used(&card.name))
        .filter(|card| {
            !config
                .card_constraints
                .exclude_keywords
                .iter()
                .any(|keyword| card.has_keyword(keyword))
        })
        .map(|card| {
            let mut scored = score_card(&PoolCard::from(card.clone()), &config.scoring_rules);
            if matches_priority_category(&scored, config) {
                scored.bump(1, "fallback", "Fallback priority category");
            }
            scored
        })
        .collect();
    sort_for_selection(&mut candidates);

    for scored in &candidates {
        if wanted == 0 {
            break;
        }
        if scored.score < threshold {
            break;
        }
        let mut copies = wanted.min(config.deck.max_card_copies);
        if config.deck.owned_cards_only
            && let Some(record) = scored.card.record()
        {
            copies = copies.min(record.owned_quantity);
        }
        if copies == 0 {
            continue;
        }
        let reason = format!("Fallback fill (score {})", scored.score);
        if context.add_card(
            scored.card.clone(),
            &reason,
            "fallback",
            copies,
            Some(scored.score),
        ) {
            wanted -= copies;
        }
    }

    if wanted > 0 {
        context.record_unmet_condition(format!(
            "Fallback left {wanted} category slots unfilled"
        ));
    }
}

/// Threshold for fallback picks: at least the configured minimum, and
/// strictly above the average score of the cards already selected.
fn dynamic_threshold(context: &BuildContext, config: &DeckConfig) -> i32 {
    let scores: Vec<i32> = context
        .active_cards()
        .filter(|entry| !entry.card.is_land())
        .filter_map(|entry| entry.score)
        .collect();
    let average = if scores.is_empty() {
        0
    } else {
        scores.iter().sum::<i32>() / scores.len() as i32
    };
    config.scoring_rules.min_score_to_flag.max(average + 1)
}

fn matches_priority_category(scored: &ScoredCard, config: &DeckConfig) -> bool {
    config.fallback_strategy.fill_priority.iter().any(|name| {
        config
            .categories
            .iter()
            .filter(|category| &category.name == name)
            .any(|category| {
                category
                    .preferred_types
                    .iter()
                    .any(|tag| scored.card.matches_type(tag))
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::card::CardRecord;
    use crate::context::CategorySummary;

    fn creature(name: &str, keywords: &[&str]) -> CardRecord {
        CardRecord::new(name).types(&["Creature"]).keywords(keywords)
    }

    fn config() -> DeckConfig {
        let mut config = DeckConfig::default();
        config.fallback_strategy.fill_with_any = true;
        config
            .scoring_rules
            .keyword_abilities
            .insert("Flying".to_string(), 2);
        config
    }

    fn context_with_shortfall(target: u32) -> BuildContext {
        let mut context = BuildContext::new("test");
        context.category_summary.insert(
            "creatures".to_string(),
            CategorySummary {
                target,
                added: 0,
                remaining: target,
                scored_pool: Vec::new(),
            },
        );
        context
    }

    #[test]
    fn test_fills_shortfall_with_scoring_cards() {
        let config = config();
        let view = RepositoryView::new(vec![
            Arc::new(creature("Aven", &["Flying"])),
            Arc::new(creature("Bear", &[])),
        ]);
        let mut context = context_with_shortfall(4);

        run(&mut context, &config, &view, 36);

        // Aven scores 2, above the empty-deck threshold of 1; Bear scores 0.
        assert_eq!(context.card_quantity("Aven"), 4);
        assert_eq!(context.card_quantity("Bear"), 0);
    }

    #[test]
    fn test_disabled_without_fill_with_any() {
        let mut config = config();
        config.fallback_strategy.fill_with_any = false;
        let view = RepositoryView::new(vec![Arc::new(creature("Aven", &["Flying"]))]);
        let mut context = context_with_shortfall(4);

        run(&mut context, &config, &view, 36);

        assert_eq!(context.total_cards(), 0);
    }

    #[test]
    fn test_threshold_rises_above_selected_average() {
        let config = config();
        let view = RepositoryView::new(vec![
            Arc::new(creature("Aven", &["Flying"])),
            Arc::new(creature("Griffin", &["Flying"])),
        ]);
        let mut context = context_with_shortfall(8);
        // Already-selected cards average 4, so the bar is 5; the fliers
        // score 2 and stay out.
        context.add_card(
            creature("Angel", &["Flying"]).into(),
            "test",
            "creatures",
            4,
            Some(4),
        );

        run(&mut context, &config, &view, 36);

        assert_eq!(context.card_quantity("Aven"), 0);
        assert_eq!(context.card_quantity("Griffin"), 0);
        assert!(
            context
                .unmet_conditions()
                .iter()
                .any(|c| c.contains("Fallback"))
        );
    }

    #[test]
    fn test_fill_priority_breaks_ties() {
        let mut config = config();
        config
            .categories
            .push(crate::config::CategoryDefinition::new("creatures", 4).preferred_types(&["Creature"]));
        config.fallback_strategy.fill_priority = vec!["creatures".to_string()];
        let view = RepositoryView::new(vec![
            Arc::new(creature("Bear", &[]).keywords(&["Flying"])),
            Arc::new(CardRecord::new("Opt").types(&["Instant"]).keywords(&["Flying"])),
        ]);
        let mut context = context_with_shortfall(4);

        run(&mut context, &config, &view, 36);

        // Both score 2 from Flying; the creature's priority-category edge
        // puts it first and it takes the whole shortfall.
        assert_eq!(context.card_quantity("Bear"), 4);
        assert_eq!(context.card_quantity("Opt"), 0);
    }
}
