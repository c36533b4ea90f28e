use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use crate::card::CardRecord;
use crate::color::{Color, ColorSet};

/// A synthesized basic-land record. Basic lands are materialized by the
/// engine from the deck's colors rather than looked up in the pool, so they
/// exist even when the repository carries no printings for them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct BasicLandStub {
    pub name: String,
    /// None for Wastes.
    pub color: Option<Color>,
}

impl BasicLandStub {
    pub fn for_color(color: Color) -> Self {
        Self {
            name: color.basic_land_name().to_string(),
            color: Some(color),
        }
    }

    pub fn wastes() -> Self {
        Self {
            name: "Wastes".to_string(),
            color: None,
        }
    }
}

/// A card-like value flowing through the build: either a real pool record
/// or a synthesized basic land. Exposes the narrow interface the stages
/// need without dynamic attribute probing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
#[cfg_attr(feature = "serialization", serde(untagged))]
pub enum PoolCard {
    Record(Arc<CardRecord>),
    Basic(BasicLandStub),
}

impl PoolCard {
    pub fn name(&self) -> &str {
        match self {
            PoolCard::Record(card) => &card.name,
            PoolCard::Basic(stub) => &stub.name,
        }
    }

    pub fn is_land(&self) -> bool {
        match self {
            PoolCard::Record(card) => card.is_land(),
            PoolCard::Basic(_) => true,
        }
    }

    pub fn is_basic_land(&self) -> bool {
        match self {
            PoolCard::Record(card) => card.is_basic_land(),
            PoolCard::Basic(_) => true,
        }
    }

    pub fn color_identity(&self) -> ColorSet {
        match self {
            PoolCard::Record(card) => card.color_identity,
            PoolCard::Basic(stub) => stub
                .color
                .map_or(ColorSet::COLORLESS, ColorSet::from_color),
        }
    }

    pub fn matches_type(&self, tag: &str) -> bool {
        match self {
            PoolCard::Record(card) => card.matches_type(tag),
            PoolCard::Basic(stub) => {
                tag.eq_ignore_ascii_case("Land")
                    || tag.eq_ignore_ascii_case("Basic")
                    || stub.name.eq_ignore_ascii_case(tag)
            }
        }
    }

    pub fn mana_value(&self) -> u32 {
        match self {
            PoolCard::Record(card) => card.mana_value(),
            PoolCard::Basic(_) => 0,
        }
    }

    pub fn rarity(&self) -> &str {
        match self {
            PoolCard::Record(card) => &card.rarity,
            PoolCard::Basic(_) => "common",
        }
    }

    /// The underlying record, if this is a real pool card.
    pub fn record(&self) -> Option<&Arc<CardRecord>> {
        match self {
            PoolCard::Record(card) => Some(card),
            PoolCard::Basic(_) => None,
        }
    }
}

impl From<Arc<CardRecord>> for PoolCard {
    fn from(card: Arc<CardRecord>) -> Self {
        PoolCard::Record(card)
    }
}

impl From<CardRecord> for PoolCard {
    fn from(card: CardRecord) -> Self {
        PoolCard::Record(Arc::new(card))
    }
}

/// One line item in the in-progress deck.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct ContextCard {
    pub card: PoolCard,
    pub quantity: u32,
    pub reason: String,
    /// The stage that added this card ("priority", "special_land", a
    /// category name, ...).
    pub source: String,
    pub score: Option<i32>,
    /// Operation counter at the moment this pick was displaced.
    pub replaced_at_op: Option<usize>,
    pub replaced_by: Option<String>,
}

impl ContextCard {
    pub fn name(&self) -> &str {
        self.card.name()
    }

    pub fn is_replaced(&self) -> bool {
        self.replaced_at_op.is_some()
    }

    pub fn add_reason(&mut self, reason: &str) {
        self.reason.push_str("; ");
        self.reason.push_str(reason);
    }
}

/// Scaled target, fill results and scored pool for one category, recorded
/// after category filling and consumed by quota-aware pruning.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct CategorySummary {
    /// The (possibly scaled) target actually used for filling.
    pub target: u32,
    pub added: u32,
    pub remaining: u32,
    /// (card name, score) for every candidate considered, sorted as walked.
    pub scored_pool: Vec<(String, i32)>,
}

/// Mutable accumulator threaded through the selection stages.
///
/// One context per build; stages run sequentially against it and the
/// orchestrator extracts the final deck when they are done.
#[derive(Debug, Default)]
pub struct BuildContext {
    pub deck_name: String,
    cards: Vec<ContextCard>,
    /// Singleton-rule enforcement; basic lands are exempt.
    used: BTreeSet<String>,
    land_count: u32,
    /// Indices into `cards` for land entries.
    land_indices: Vec<usize>,
    operations: Vec<String>,
    unmet_conditions: Vec<String>,
    pub category_summary: BTreeMap<String, CategorySummary>,
    /// Colored-symbol counts over selected non-land cards, once computed.
    pub mana_symbols: Option<BTreeMap<Color, u32>>,
    /// Diagnostic target curve, when the configuration defines one.
    pub target_curve: Option<BTreeMap<u32, u32>>,
}

impl BuildContext {
    pub fn new(deck_name: impl Into<String>) -> Self {
        Self {
            deck_name: deck_name.into(),
            ..Default::default()
        }
    }

    /// Adds a card to the in-progress deck.
    ///
    /// Returns false when the name is already used (singleton rule). Basic
    /// lands are exempt: repeated adds accumulate quantity in place.
    pub fn add_card(
        &mut self,
        card: PoolCard,
        reason: &str,
        source: &str,
        quantity: u32,
        score: Option<i32>,
    ) -> bool {
        if quantity == 0 {
            return false;
        }
        let name = card.name().to_string();
        let is_land = card.is_land();

        if card.is_basic_land() {
            if let Some(existing) = self.cards.iter_mut().find(|c| c.name() == name) {
                existing.quantity += quantity;
                existing.add_reason(reason);
                if is_land {
                    self.land_count += quantity;
                }
                let total = existing.quantity;
                self.log(format!("Incremented {name} to {total} ({reason})"));
                return true;
            }
        } else if self.used.contains(&name) {
            return false;
        }

        let index = self.cards.len();
        self.cards.push(ContextCard {
            card,
            quantity,
            reason: reason.to_string(),
            source: source.to_string(),
            score,
            replaced_at_op: None,
            replaced_by: None,
        });
        if is_land {
            self.land_count += quantity;
            self.land_indices.push(index);
        }
        self.used.insert(name.clone());
        self.log(format!("Added {quantity}x {name} ({reason})"));
        true
    }

    /// Removes `quantity` copies from the entry at `index`, marking the
    /// entry replaced when it reaches zero. The entry stays in the list so
    /// the audit trail survives pruning.
    pub fn remove_copies(&mut self, index: usize, quantity: u32, replaced_by: Option<&str>) {
        let op = self.operations.len();
        let card = &mut self.cards[index];
        let removed = quantity.min(card.quantity);
        card.quantity -= removed;
        let is_land = card.card.is_land();
        if card.quantity == 0 {
            card.replaced_at_op = Some(op);
            card.replaced_by = replaced_by.map(|s| s.to_string());
        }
        let name = card.name().to_string();
        if is_land {
            self.land_count = self.land_count.saturating_sub(removed);
        }
        self.log(format!("Removed {removed}x {name}"));
    }

    pub fn cards(&self) -> &[ContextCard] {
        &self.cards
    }

    /// Entries that still hold at least one copy.
    pub fn active_cards(&self) -> impl Iterator<Item = &ContextCard> {
        self.cards.iter().filter(|c| c.quantity > 0)
    }

    pub fn land_cards(&self) -> impl Iterator<Item = &ContextCard> {
        self.land_indices
            .iter()
            .map(|&i| &self.cards[i])
            .filter(|c| c.quantity > 0)
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    pub fn total_cards(&self) -> u32 {
        self.cards.iter().map(|c| c.quantity).sum()
    }

    pub fn land_count(&self) -> u32 {
        self.land_count
    }

    pub fn nonland_count(&self) -> u32 {
        self.total_cards() - self.land_count
    }

    pub fn card_quantity(&self, name: &str) -> u32 {
        self.cards
            .iter()
            .filter(|c| c.name() == name)
            .map(|c| c.quantity)
            .sum()
    }

    /// Quantity-weighted color identity counts over active cards.
    pub fn color_counts(&self) -> BTreeMap<Color, u32> {
        let mut counts = BTreeMap::new();
        for card in self.active_cards() {
            for color in card.card.color_identity().iter() {
                *counts.entry(color).or_insert(0) += card.quantity;
            }
        }
        counts
    }

    /// Records an operation in the build log.
    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(op = self.operations.len(), "{message}");
        self.operations.push(message);
    }

    /// Records a failed constraint. Unmet conditions are user-facing
    /// warnings, never fatal.
    pub fn record_unmet_condition(&mut self, condition: impl Into<String>) {
        let condition = condition.into();
        self.log(format!("Unmet condition: {condition}"));
        self.unmet_conditions.push(condition);
    }

    pub fn operations(&self) -> &[String] {
        &self.operations
    }

    pub fn unmet_conditions(&self) -> &[String] {
        &self.unmet_conditions
    }

    pub(crate) fn cards_mut(&mut self) -> &mut [ContextCard] {
        &mut self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardRecord;

    fn creature(name: &str) -> PoolCard {
        CardRecord::new(name).types(&["Creature"]).into()
    }

    #[test]
    fn test_singleton_rule() {
        let mut ctx = BuildContext::new("test");
        assert!(ctx.add_card(creature("Bear"), "test", "test", 4, None));
        assert!(!ctx.add_card(creature("Bear"), "again", "test", 1, None));
        assert_eq!(ctx.total_cards(), 4);
        assert_eq!(ctx.card_quantity("Bear"), 4);
    }

    #[test]
    fn test_basic_lands_accumulate() {
        let mut ctx = BuildContext::new("test");
        let forest = PoolCard::Basic(BasicLandStub::for_color(Color::Green));
        assert!(ctx.add_card(forest.clone(), "mana", "basic_land", 5, None));
        assert!(ctx.add_card(forest, "top up", "basic_land", 3, None));
        assert_eq!(ctx.total_cards(), 8);
        assert_eq!(ctx.land_count(), 8);
        assert_eq!(ctx.cards().len(), 1);
    }

    #[test]
    fn test_remove_copies_marks_replaced() {
        let mut ctx = BuildContext::new("test");
        ctx.add_card(creature("Bear"), "test", "test", 2, Some(3));
        ctx.remove_copies(0, 2, Some("Forest"));
        assert_eq!(ctx.total_cards(), 0);
        assert!(ctx.cards()[0].is_replaced());
        assert_eq!(ctx.cards()[0].replaced_by.as_deref(), Some("Forest"));
        // Name stays reserved so the card cannot be re-added.
        assert!(!ctx.add_card(creature("Bear"), "again", "test", 1, None));
    }

    #[test]
    fn test_land_count_tracking() {
        let mut ctx = BuildContext::new("test");
        let land: PoolCard = CardRecord::new("Command Tower").types(&["Land"]).into();
        ctx.add_card(land, "fixing", "special_land", 1, None);
        ctx.add_card(creature("Bear"), "body", "creatures", 4, None);
        assert_eq!(ctx.land_count(), 1);
        assert_eq!(ctx.nonland_count(), 4);
        assert_eq!(ctx.land_cards().count(), 1);
    }

    #[test]
    fn test_unmet_conditions_logged() {
        let mut ctx = BuildContext::new("test");
        ctx.record_unmet_condition("Priority card not found: Black Lotus");
        assert_eq!(ctx.unmet_conditions().len(), 1);
        assert!(ctx.operations().iter().any(|op| op.contains("Black Lotus")));
    }
}
