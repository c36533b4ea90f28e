use std::collections::BTreeMap;

use crate::color::Color;
use crate::context::{BuildContext, CategorySummary, PoolCard};

/// One line of the finished deck.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct DeckEntry {
    pub card: PoolCard,
    pub quantity: u32,
}

/// The finished deck: an ordered name -> (card, quantity) mapping in
/// selection order. Format translation (tabletop import, CSV, ...) is an
/// external collaborator's job; this type only exposes the data.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct Deck {
    pub name: String,
    entries: Vec<DeckEntry>,
}

impl Deck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, card: PoolCard, quantity: u32) {
        self.entries.push(DeckEntry { card, quantity });
    }

    pub fn entries(&self) -> &[DeckEntry] {
        &self.entries
    }

    pub fn quantity_of(&self, name: &str) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.card.name() == name)
            .map(|e| e.quantity)
            .sum()
    }

    pub fn total_cards(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    pub fn land_count(&self) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.card.is_land())
            .map(|e| e.quantity)
            .sum()
    }

    /// Quantity-weighted color identity counts.
    pub fn color_counts(&self) -> BTreeMap<Color, u32> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            for color in entry.card.color_identity().iter() {
                *counts.entry(color).or_insert(0) += entry.quantity;
            }
        }
        counts
    }

    /// Mana value -> card count over non-land entries.
    pub fn mana_value_histogram(&self) -> BTreeMap<u32, u32> {
        let mut histogram = BTreeMap::new();
        for entry in self.entries.iter().filter(|e| !e.card.is_land()) {
            *histogram.entry(entry.card.mana_value()).or_insert(0) += entry.quantity;
        }
        histogram
    }

    /// Average mana value of non-land cards, or 0.0 for an all-land deck.
    pub fn average_mana_value(&self) -> f64 {
        let mut total = 0u64;
        let mut count = 0u64;
        for entry in self.entries.iter().filter(|e| !e.card.is_land()) {
            total += (entry.card.mana_value() as u64) * (entry.quantity as u64);
            count += entry.quantity as u64;
        }
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }
}

/// Audit trail of a finished build, suitable for serialization by an
/// external reporting layer.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct BuildReport {
    pub deck_name: String,
    pub target_size: u32,
    pub final_size: u32,
    /// False only when the pool could not reach the target. Callers decide
    /// whether that is fatal via `FallbackStrategy::allow_less_than_target`.
    pub size_met: bool,
    pub operations: Vec<String>,
    pub unmet_conditions: Vec<String>,
    pub category_summary: BTreeMap<String, CategorySummary>,
    pub mana_symbols: BTreeMap<Color, u32>,
    /// Diagnostic target curve, when the configuration defines one.
    pub target_curve: Option<BTreeMap<u32, u32>>,
    pub color_counts: BTreeMap<Color, u32>,
    pub mana_value_histogram: BTreeMap<u32, u32>,
    pub average_mana_value: f64,
}

impl BuildReport {
    /// Extracts the deck and report from a finished build context.
    pub(crate) fn extract(context: BuildContext, target_size: u32) -> (Deck, BuildReport) {
        let mut deck = Deck::new(context.deck_name.clone());
        for card in context.active_cards() {
            deck.push(card.card.clone(), card.quantity);
        }
        let final_size = deck.total_cards();
        let operations = context.operations().to_vec();
        let unmet_conditions = context.unmet_conditions().to_vec();
        let report = BuildReport {
            deck_name: context.deck_name.clone(),
            target_size,
            final_size,
            size_met: final_size == target_size,
            color_counts: deck.color_counts(),
            mana_value_histogram: deck.mana_value_histogram(),
            average_mana_value: deck.average_mana_value(),
            mana_symbols: context.mana_symbols.clone().unwrap_or_default(),
            target_curve: context.target_curve.clone(),
            category_summary: context.category_summary,
            operations,
            unmet_conditions,
        };
        (deck, report)
    }
}
