//! Mana-base stages: special (non-basic) land selection and proportional
//! basic-land distribution.

use std::collections::BTreeMap;

use crate::color::Color;
use crate::config::DeckConfig;
use crate::context::{BasicLandStub, BuildContext, PoolCard};
use crate::repository::{CardRepository, RepositoryError, RepositoryView};
use crate::scoring::{BASIC_LAND_SCORE, ScoredCard, sort_for_selection};

/// Selects up to `special_lands.count` non-basic lands from the candidate
/// pool, one copy each.
///
/// Only lands whose rules text produces mana of an allowed color qualify.
/// Prefer patterns add +1 per match, avoid patterns subtract 2; candidates
/// are ranked by net score with the usual name tiebreak.
pub fn special_lands(context: &mut BuildContext, config: &DeckConfig, view: &RepositoryView) {
    let rules = &config.mana_base.special_lands;
    if rules.count == 0 {
        return;
    }

    let symbols: Vec<String> = if config.deck.colors.is_empty() {
        vec!["add {c}".to_string()]
    } else {
        config
            .deck
            .colors
            .iter()
            .map(|c| format!("add {{{}}}", c.code().to_ascii_lowercase()))
            .collect()
    };

    let mut candidates: Vec<ScoredCard> = view
        .cards()
        .iter()
        .filter(|card| card.is_land() && !card.is_basic_land())
        .filter(|card| !context.is_used(&card.name))
        .filter(|card| {
            let text = card.oracle_text.to_lowercase();
            symbols.iter().any(|s| text.contains(s.as_str()))
        })
        .map(|card| {
            let mut scored = ScoredCard::new(PoolCard::from(card.clone()));
            for pattern in &rules.prefer {
                if pattern.matches(&card.oracle_text) {
                    scored.bump(1, "special_land", format!("Preferred land: {pattern}"));
                }
            }
            for pattern in &rules.avoid {
                if pattern.matches(&card.oracle_text) {
                    scored.bump(-2, "special_land", format!("Avoided land: {pattern}"));
                }
            }
            scored
        })
        .collect();
    sort_for_selection(&mut candidates);

    let mut added = 0;
    for scored in candidates {
        if added >= rules.count {
            break;
        }
        let reason = format!("Special land (score {})", scored.score);
        if context.add_card(
            scored.card.clone(),
            &reason,
            "special_land",
            1,
            Some(scored.score),
        ) {
            added += 1;
        }
    }
    if added < rules.count {
        context.record_unmet_condition(format!(
            "Only {added} of {} special lands available",
            rules.count
        ));
    }
}

/// Computes quantity-weighted colored-symbol counts over the non-land
/// cards selected so far and stores them on the context. Basic-land
/// distribution weights colors by these counts.
pub fn compute_mana_symbols(context: &mut BuildContext) {
    let mut symbols: BTreeMap<Color, u32> = BTreeMap::new();
    for entry in context.active_cards() {
        if entry.card.is_land() {
            continue;
        }
        let Some(record) = entry.card.record() else {
            continue;
        };
        let Some(cost) = &record.mana_cost else {
            continue;
        };
        for (color, count) in cost.colored_symbol_counts() {
            *symbols.entry(color).or_insert(0) += count * entry.quantity;
        }
    }
    context.mana_symbols = Some(symbols);
}

/// Adds basic lands, split across the deck's colors in proportion to the
/// colored-symbol counts already on the context. Explicit
/// `mana_base.color_weights` override the symbol-derived weighting.
///
/// With `extra = None` the stage fills up to the configured land count;
/// `extra = Some(n)` adds `n` more lands (the finalize top-up path).
/// Rounding residue is corrected one land at a time, heaviest color first,
/// so each color ends within one land of its exact share. Colorless decks
/// get Wastes, but only when the repository's record for it satisfies the
/// configured legalities.
pub fn basic_lands(
    context: &mut BuildContext,
    config: &DeckConfig,
    repository: &dyn CardRepository,
    extra: Option<u32>,
) -> Result<(), RepositoryError> {
    let open_slots = config.deck.size.saturating_sub(context.total_cards());
    let need = match extra {
        Some(n) => n.min(open_slots),
        None => config
            .mana_base
            .land_count
            .saturating_sub(context.land_count())
            .min(open_slots),
    };
    if need == 0 {
        return Ok(());
    }

    let colors = config.deck.colors;
    if colors.is_empty() {
        if wastes_allowed(config, repository)? {
            context.add_card(
                PoolCard::Basic(BasicLandStub::wastes()),
                "Basic land for colorless deck",
                "basic_land",
                need,
                Some(BASIC_LAND_SCORE),
            );
        } else {
            context.record_unmet_condition(format!(
                "Cannot add {need} Wastes: not legal in configured formats"
            ));
        }
        return Ok(());
    }

    let symbols = if config.mana_base.color_weights.is_empty() {
        context.mana_symbols.clone().unwrap_or_default()
    } else {
        config.mana_base.color_weights.clone()
    };
    let mut weighted: Vec<(Color, u32)> = colors
        .iter()
        .map(|color| (color, symbols.get(&color).copied().unwrap_or(0)))
        .collect();
    let total_weight: u32 = weighted.iter().map(|(_, w)| w).sum();
    if total_weight == 0 {
        // No colored pips selected yet: split evenly.
        for entry in &mut weighted {
            entry.1 = 1;
        }
    }
    let total_weight: u32 = weighted.iter().map(|(_, w)| w).sum();

    let mut counts: Vec<(Color, u32, i64)> = weighted
        .iter()
        .map(|&(color, weight)| {
            let exact = need as f64 * weight as f64 / total_weight as f64;
            (color, weight, exact.round() as i64)
        })
        .collect();

    // Correct rounding residue one land at a time, heaviest color first.
    // iter() walks WUBRG order, so the stable sort keeps ties deterministic.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    let mut residue = need as i64 - counts.iter().map(|(_, _, c)| c).sum::<i64>();
    let mut index = 0;
    while residue != 0 {
        let at = index % counts.len();
        let slot = &mut counts[at];
        if residue > 0 {
            slot.2 += 1;
            residue -= 1;
        } else if slot.2 > 0 {
            slot.2 -= 1;
            residue += 1;
        }
        index += 1;
    }

    counts.sort_by_key(|(color, _, _)| *color);
    for (color, _, count) in counts {
        if count > 0 {
            let stub = BasicLandStub::for_color(color);
            let reason = format!("Basic land for {}", color.code());
            context.add_card(
                PoolCard::Basic(stub),
                &reason,
                "basic_land",
                count as u32,
                Some(BASIC_LAND_SCORE),
            );
        }
    }
    Ok(())
}

/// Wastes is legal only where the pool's record says so. Without a record
/// the stub is allowed only when no legality constraint is configured.
fn wastes_allowed(
    config: &DeckConfig,
    repository: &dyn CardRepository,
) -> Result<bool, RepositoryError> {
    if config.deck.legalities.is_empty() {
        return Ok(true);
    }
    Ok(match repository.find_by_name("Wastes")? {
        Some(card) => config.deck.legalities.iter().all(|f| card.is_legal_in(f)),
        None => false,
    })
}
