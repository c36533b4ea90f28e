//! Category filling: scaled targets, two-pass candidate selection and
//! quota-aware pruning.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::warn;

use crate::card::CardRecord;
use crate::config::{CategoryDefinition, DeckConfig};
use crate::context::{BuildContext, CategorySummary, PoolCard};
use crate::hooks::{BuildHooks, BuildStage, HookTiming};
use crate::repository::RepositoryView;
use crate::scoring::{ScoredCard, score_card, sort_for_selection};

/// Fills every category in declaration order, then prunes any overflow
/// back down to the non-land budget.
///
/// Targets are rescaled when their sum exceeds the slots still open (floor,
/// minimum one per non-zero target); the configuration itself is never
/// mutated. Each category gets two passes over its scored candidates: the
/// first takes only cards at or above the scoring threshold, the second
/// relaxes the threshold but requires a structural match with the category.
pub fn fill(
    context: &mut BuildContext,
    config: &DeckConfig,
    view: &RepositoryView,
    budget: u32,
    hooks: &BuildHooks,
) {
    let available = budget.saturating_sub(context.nonland_count());
    let scaled = scaled_targets(config, available);

    for category in &config.categories {
        let target = scaled.get(&category.name).copied().unwrap_or(0);
        fill_category(context, config, view, category, target, budget);

        for err in hooks.fire(
            BuildStage::Categories,
            HookTiming::After,
            Some(&category.name),
            context,
        ) {
            warn!(category = %category.name, %err, "hook failed");
            context.log(format!("Hook error in category {}: {err}", category.name));
        }
    }

    if context.nonland_count() > budget {
        prune(context, budget);
    }
}

/// Proportionally rescales category targets when their sum exceeds the
/// available slots. Non-zero targets never scale below one.
pub fn scaled_targets(config: &DeckConfig, available: u32) -> BTreeMap<String, u32> {
    let total = config.total_category_target();
    config
        .categories
        .iter()
        .map(|category| {
            let target = if total > available && category.target > 0 {
                let scaled = (category.target as u64 * available as u64 / total as u64) as u32;
                scaled.max(1)
            } else {
                category.target
            };
            (category.name.clone(), target)
        })
        .collect()
}

fn fill_category(
    context: &mut BuildContext,
    config: &DeckConfig,
    view: &RepositoryView,
    category: &CategoryDefinition,
    target: u32,
    budget: u32,
) {
    let mut candidates: Vec<ScoredCard> = view
        .cards()
        .iter()
        .filter(|card| !card.is_land())
        .filter(|card| !context.is_used(&card.name))
        .filter(|card| !is_excluded(config, card))
        .filter(|card| within_curve(config, card))
        .map(|card| {
            let mut scored = score_card(&PoolCard::from(card.clone()), &config.scoring_rules);
            apply_category_preferences(&mut scored, category);
            scored
        })
        .collect();
    sort_for_selection(&mut candidates);

    let threshold = config.scoring_rules.min_score_to_flag;
    let mut added = 0;

    // Pass one: best cards at or above the scoring threshold.
    for scored in &candidates {
        if added >= target || context.nonland_count() >= budget {
            break;
        }
        if scored.score < threshold {
            break;
        }
        added += take_copies(context, config, category, scored, target - added, budget);
    }

    // Pass two: relax the threshold for cards that structurally belong to
    // the category, so an underpowered pool can still meet its shape.
    if added < target {
        for scored in &candidates {
            if added >= target || context.nonland_count() >= budget {
                break;
            }
            if scored.score >= threshold {
                continue;
            }
            if !belongs_to_category(scored, category) {
                continue;
            }
            added += take_copies(context, config, category, scored, target - added, budget);
        }
    }

    context.category_summary.insert(
        category.name.clone(),
        CategorySummary {
            target,
            added,
            remaining: target - added.min(target),
            scored_pool: candidates
                .iter()
                .map(|s| (s.name().to_string(), s.score))
                .collect(),
        },
    );
    if added < target {
        context.record_unmet_condition(format!(
            "Category '{}' filled {added} of {target}",
            category.name
        ));
    }
}

/// Adds as many copies of a candidate as the remaining quota, the copy
/// limit, ownership and the non-land budget allow. Returns the copies added.
fn take_copies(
    context: &mut BuildContext,
    config: &DeckConfig,
    category: &CategoryDefinition,
    scored: &ScoredCard,
    wanted: u32,
    budget: u32,
) -> u32 {
    let mut copies = wanted
        .min(config.deck.max_card_copies)
        .min(budget.saturating_sub(context.nonland_count()));
    if config.deck.owned_cards_only
        && let Some(record) = scored.card.record()
    {
        copies = copies.min(record.owned_quantity);
    }
    if copies == 0 {
        return 0;
    }
    let reason = format!("Category '{}' (score {})", category.name, scored.score);
    if context.add_card(
        scored.card.clone(),
        &reason,
        &category.name,
        copies,
        Some(scored.score),
    ) {
        copies
    } else {
        0
    }
}

fn is_excluded(config: &DeckConfig, card: &CardRecord) -> bool {
    config
        .card_constraints
        .exclude_keywords
        .iter()
        .any(|keyword| card.has_keyword(keyword))
}

fn within_curve(config: &DeckConfig, card: &CardRecord) -> bool {
    match &config.deck.mana_curve {
        Some(curve) => {
            let mv = card.mana_value();
            mv >= curve.min && mv <= curve.max
        }
        None => true,
    }
}

/// Category preference bonuses on top of the global scoring rules: ordered
/// type preferences (earlier entries weigh more), preferred keywords,
/// priority text patterns and a flat bonus for matching the category at all.
fn apply_category_preferences(scored: &mut ScoredCard, category: &CategoryDefinition) {
    let type_count = category.preferred_types.len() as i32;
    for (index, tag) in category.preferred_types.iter().enumerate() {
        if scored.card.matches_type(tag) {
            let weight = type_count - index as i32;
            scored.bump(weight, "category", format!("Preferred type: {tag}"));
        }
    }
    if let Some(record) = scored.card.record().cloned() {
        for keyword in &category.preferred_keywords {
            if record.has_keyword(keyword) {
                scored.bump(1, "category", format!("Preferred keyword: {keyword}"));
            }
        }
        for pattern in &category.priority_text {
            if pattern.matches(&record.oracle_text) {
                scored.bump(1, "category", format!("Priority text: {pattern}"));
            }
        }
    }
    if belongs_to_category(scored, category) {
        scored.bump(1, "category", format!("Matches category: {}", category.name));
    }
}

/// Structural category membership, used by the relaxed second pass: any
/// preferred type, preferred keyword or priority-text match qualifies.
fn belongs_to_category(scored: &ScoredCard, category: &CategoryDefinition) -> bool {
    if category
        .preferred_types
        .iter()
        .any(|tag| scored.card.matches_type(tag))
    {
        return true;
    }
    if let Some(record) = scored.card.record() {
        if category
            .preferred_keywords
            .iter()
            .any(|keyword| record.has_keyword(keyword))
        {
            return true;
        }
        if category
            .priority_text
            .iter()
            .any(|pattern| pattern.matches(&record.oracle_text))
        {
            return true;
        }
    }
    false
}

/// Trims the in-progress deck back down to the non-land budget.
///
/// Removal is quota-aware: only categories currently holding more than
/// their recorded target give up cards, lowest score first, one copy at a
/// time, so no category is pushed below its quota. If no category has
/// slack, the lowest-scored category or fallback pick goes regardless.
/// Priority cards and lands are never pruned here.
pub fn prune(context: &mut BuildContext, budget: u32) {
    while context.nonland_count() > budget {
        let counts = source_counts(context);
        let has_slack = |source: &str| {
            context
                .category_summary
                .get(source)
                .is_some_and(|summary| counts.get(source).copied().unwrap_or(0) > summary.target)
        };

        let mut victim = select_victim(context, |entry| has_slack(&entry.source));
        if victim.is_none() {
            victim = select_victim(context, |entry| {
                entry.source != "priority" && !entry.card.is_land()
            });
        }
        let Some(index) = victim else {
            break;
        };
        context.remove_copies(index, 1, None);
    }
}

/// Active non-land quantities grouped by the stage/category that added them.
fn source_counts(context: &BuildContext) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for entry in context.active_cards() {
        if !entry.card.is_land() {
            *counts.entry(entry.source.clone()).or_insert(0) += entry.quantity;
        }
    }
    counts
}

/// Index of the lowest-scored active non-land entry passing the filter.
/// Ties break toward the name that sorts last, so the alphabetically
/// earlier pick survives, mirroring selection order.
fn select_victim(
    context: &BuildContext,
    eligible: impl Fn(&crate::context::ContextCard) -> bool,
) -> Option<usize> {
    context
        .cards()
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.quantity > 0 && !entry.card.is_land() && eligible(entry))
        .min_by(|(_, a), (_, b)| {
            let score_a = a.score.unwrap_or(0);
            let score_b = b.score.unwrap_or(0);
            match score_a.cmp(&score_b) {
                Ordering::Equal => b.name().cmp(a.name()),
                other => other,
            }
        })
        .map(|(index, _)| index)
}
