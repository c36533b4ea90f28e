use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::config::ScoringRules;
use crate::context::PoolCard;

/// Flat score granted to basic lands so they are never starved out. No
/// other scoring rule applies to them.
pub const BASIC_LAND_SCORE: i32 = 1;

/// A card with its running score and an auditable list of contributions.
///
/// Recomputed per stage, never persisted.
#[derive(Debug, Clone)]
pub struct ScoredCard {
    pub card: PoolCard,
    pub score: i32,
    /// (reason, delta) pairs in evaluation order.
    pub contributions: Vec<(String, i32)>,
    /// Rule sources that contributed ("scoring", "category", ...).
    pub sources: BTreeSet<String>,
}

impl ScoredCard {
    pub fn new(card: PoolCard) -> Self {
        Self {
            card,
            score: 0,
            contributions: Vec::new(),
            sources: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.card.name()
    }

    /// Applies a scoring delta, recording the reason for auditability.
    pub fn bump(&mut self, delta: i32, source: &str, reason: impl Into<String>) {
        self.score += delta;
        self.contributions.push((reason.into(), delta));
        self.sources.insert(source.to_string());
    }

    /// Total order used by every selection sort: score descending, name
    /// ascending. The name tiebreak keeps builds deterministic.
    pub fn selection_order(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.name().cmp(other.name()))
    }
}

/// Sorts a candidate list into selection order (best first, ties by name).
pub fn sort_for_selection(cards: &mut [ScoredCard]) {
    cards.sort_by(|a, b| a.selection_order(b));
}

/// Scores a card against the configured rules. Pure: every contribution is
/// recorded as a (reason, delta) pair on the result.
pub fn score_card(card: &PoolCard, rules: &ScoringRules) -> ScoredCard {
    let mut scored = ScoredCard::new(card.clone());

    if card.is_basic_land() {
        scored.bump(BASIC_LAND_SCORE, "scoring", "Basic land");
        return scored;
    }

    let Some(record) = card.record() else {
        return scored;
    };

    for (keyword, weight) in &rules.keyword_abilities {
        if record.has_keyword(keyword) {
            scored.bump(*weight, "scoring", format!("Keyword ability: {keyword}"));
        }
    }
    for (keyword, weight) in &rules.keyword_actions {
        if record.has_keyword(keyword) {
            scored.bump(*weight, "scoring", format!("Keyword action: {keyword}"));
        }
    }
    for (word, weight) in &rules.ability_words {
        if record.has_keyword(word) {
            scored.bump(*weight, "scoring", format!("Ability word: {word}"));
        }
    }

    for (pattern, weight) in &rules.text_matches {
        if pattern.matches(&record.oracle_text) {
            scored.bump(*weight, "scoring", format!("Text match: {pattern}"));
        }
    }

    for (tag, weight) in &rules.type_bonus.basic_types {
        if record.types.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            scored.bump(*weight, "scoring", format!("Type bonus: {tag}"));
        }
    }
    for (tag, weight) in &rules.type_bonus.sub_types {
        if record.subtypes.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            scored.bump(*weight, "scoring", format!("Subtype bonus: {tag}"));
        }
    }
    for (tag, weight) in &rules.type_bonus.super_types {
        if record.supertypes.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            scored.bump(*weight, "scoring", format!("Supertype bonus: {tag}"));
        }
    }

    for (rarity, weight) in &rules.rarity_bonus {
        if rarity.eq_ignore_ascii_case(&record.rarity) {
            scored.bump(*weight, "scoring", format!("Rarity bonus: {rarity}"));
        }
    }

    if let Some(penalty) = &rules.mana_penalty {
        let mv = record.mana_value();
        if mv > penalty.threshold {
            let excess = (mv - penalty.threshold) as i32;
            scored.bump(
                -(excess * penalty.penalty_per_point),
                "scoring",
                format!("Mana cost penalty: {mv}"),
            );
        }
    }

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardRecord;
    use crate::color::Color;
    use crate::config::ManaPenalty;
    use crate::context::BasicLandStub;
    use crate::mana::ManaCost;
    use crate::pattern::TextPattern;

    fn rules() -> ScoringRules {
        let mut rules = ScoringRules::default();
        rules.keyword_abilities.insert("Flying".to_string(), 2);
        rules
            .text_matches
            .push((TextPattern::parse("draw a card"), 3));
        rules
            .type_bonus
            .basic_types
            .insert("Creature".to_string(), 1);
        rules.rarity_bonus.insert("rare".to_string(), 2);
        rules.mana_penalty = Some(ManaPenalty {
            threshold: 4,
            penalty_per_point: 2,
        });
        rules
    }

    fn owl() -> PoolCard {
        CardRecord::new("Scholarly Owl")
            .types(&["Creature"])
            .keywords(&["Flying"])
            .oracle_text("When this creature enters, draw a card.")
            .rarity("rare")
            .mana_cost(ManaCost::parse("{5}{U}").unwrap())
            .into()
    }

    #[test]
    fn test_bonuses_sum_independently() {
        let scored = score_card(&owl(), &rules());
        // +2 flying, +3 text, +1 creature, +2 rare, -(6-4)*2 mana penalty
        assert_eq!(scored.score, 2 + 3 + 1 + 2 - 4);
        assert_eq!(scored.contributions.len(), 5);
    }

    #[test]
    fn test_penalty_only_above_threshold() {
        let cheap: PoolCard = CardRecord::new("Bolt")
            .types(&["Instant"])
            .mana_cost(ManaCost::parse("{R}").unwrap())
            .into();
        let scored = score_card(&cheap, &rules());
        assert!(scored.contributions.iter().all(|(_, d)| *d >= 0));
    }

    #[test]
    fn test_basic_land_constant_score() {
        let forest = PoolCard::Basic(BasicLandStub::for_color(Color::Green));
        let scored = score_card(&forest, &rules());
        assert_eq!(scored.score, BASIC_LAND_SCORE);
        assert_eq!(scored.contributions.len(), 1);
    }

    #[test]
    fn test_selection_order_is_total() {
        let mut cards = vec![
            score_card(&CardRecord::new("Zeta").types(&["Creature"]).into(), &rules()),
            score_card(&CardRecord::new("Alpha").types(&["Creature"]).into(), &rules()),
            score_card(&owl(), &rules()),
        ];
        sort_for_selection(&mut cards);
        assert_eq!(cards[0].name(), "Scholarly Owl");
        // Equal scores fall back to name order.
        assert_eq!(cards[1].name(), "Alpha");
        assert_eq!(cards[2].name(), "Zeta");
    }

    #[test]
    fn test_every_contribution_recorded() {
        let scored = score_card(&owl(), &rules());
        let total: i32 = scored.contributions.iter().map(|(_, d)| d).sum();
        assert_eq!(total, scored.score);
        assert!(scored.sources.contains("scoring"));
    }
}
