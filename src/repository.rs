use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::card::CardRecord;
use crate::color::ColorSet;
use crate::config::{ColorMatchMode, DeckConfig};

/// Error surfaced by a card repository backend. The engine propagates
/// repository failures unchanged; it never masks them.
#[derive(Debug)]
pub enum RepositoryError {
    /// Backend failure (I/O, parsing, ...), wrapped at the boundary.
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        RepositoryError::Backend(Box::new(err))
    }
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::Backend(err) => write!(f, "repository backend error: {err}"),
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepositoryError::Backend(err) => Some(err.as_ref()),
        }
    }
}

/// Deck-wide pool filter applied once before the stages run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryFilter {
    pub colors: ColorSet,
    pub color_mode: ColorMatchMode,
    pub allow_colorless: bool,
    /// Cards must be legal in every listed format.
    pub legal_in: Vec<String>,
    pub owned_only: bool,
}

impl RepositoryFilter {
    pub fn from_config(config: &DeckConfig) -> Self {
        Self {
            colors: config.deck.colors,
            color_mode: config.deck.color_match_mode,
            allow_colorless: config.deck.allow_colorless,
            legal_in: config.deck.legalities.clone(),
            owned_only: config.deck.owned_cards_only,
        }
    }

    /// Returns true if the card passes every criterion.
    pub fn accepts(&self, card: &CardRecord) -> bool {
        if !card.matches_color_identity(self.colors, self.color_mode, self.allow_colorless) {
            return false;
        }
        if self.legal_in.iter().any(|f| !card.is_legal_in(f)) {
            return false;
        }
        if self.owned_only && card.owned_quantity == 0 {
            return false;
        }
        true
    }
}

/// An immutable, pre-filtered snapshot of the candidate pool. Stages read
/// from a view; they never touch the repository again except for exact-name
/// lookups.
#[derive(Debug, Clone)]
pub struct RepositoryView {
    cards: Vec<Arc<CardRecord>>,
}

impl RepositoryView {
    pub fn new(cards: Vec<Arc<CardRecord>>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[Arc<CardRecord>] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Read-only card storage capability. The engine is agnostic to the
/// backing store; implementations may wrap a database, a file snapshot or
/// an in-memory pool.
pub trait CardRepository {
    fn get_all_cards(&self) -> Result<Vec<Arc<CardRecord>>, RepositoryError>;

    fn find_by_name(&self, name: &str) -> Result<Option<Arc<CardRecord>>, RepositoryError>;

    /// Applies the deck-wide filter, returning an immutable candidate view.
    fn filter(&self, filter: &RepositoryFilter) -> Result<RepositoryView, RepositoryError> {
        let cards = self
            .get_all_cards()?
            .into_iter()
            .filter(|card| filter.accepts(card))
            .collect::<Vec<_>>();
        debug!(candidates = cards.len(), "filtered repository view");
        Ok(RepositoryView::new(cards))
    }
}

/// In-memory repository over a pre-loaded card pool. Name lookups are
/// exact and case-sensitive, matching the priority-card contract.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    cards: Vec<Arc<CardRecord>>,
    by_name: HashMap<String, usize>,
}

impl InMemoryRepository {
    pub fn new(cards: Vec<CardRecord>) -> Self {
        let cards: Vec<Arc<CardRecord>> = cards.into_iter().map(Arc::new).collect();
        let by_name = cards
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Self { cards, by_name }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CardRepository for InMemoryRepository {
    fn get_all_cards(&self) -> Result<Vec<Arc<CardRecord>>, RepositoryError> {
        Ok(self.cards.clone())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Arc<CardRecord>>, RepositoryError> {
        Ok(self.by_name.get(name).map(|&i| self.cards[i].clone()))
    }
}
