//! Deterministic deck assembly for Magic-style card games.
//!
//! Given a card pool behind the [`CardRepository`] trait and a
//! [`DeckConfig`], the [`DeckBuilder`] runs a fixed pipeline of selection
//! stages (priority cards, special lands, basic lands, category filling,
//! fallback filling, finalize) and produces a [`Deck`] plus a
//! [`BuildReport`] describing every decision it made. The same pool and
//! configuration always produce the identical deck.
//!
//! ```
//! use deckforge::{
//!     CardRecord, CategoryDefinition, ColorSet, DeckBuilder, DeckConfig, InMemoryRepository,
//! };
//!
//! let repo = InMemoryRepository::new(vec![
//!     CardRecord::new("Llanowar Elves")
//!         .types(&["Creature"])
//!         .color_identity(ColorSet::GREEN),
//! ]);
//! let mut config = DeckConfig::default();
//! config.deck.size = 40;
//! config.deck.colors = ColorSet::GREEN;
//! config.mana_base.land_count = 17;
//! config
//!     .categories
//!     .push(CategoryDefinition::new("creatures", 23).preferred_types(&["Creature"]));
//!
//! let outcome = DeckBuilder::new(config, &repo)?.build()?;
//! assert_eq!(outcome.deck.total_cards(), 40);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod card;
pub mod color;
pub mod config;
pub mod context;
pub mod curve;
pub mod deck;
pub mod hooks;
pub mod mana;
pub mod pattern;
pub mod repository;
pub mod scoring;
pub mod stages;

pub use builder::{BuildError, BuildOutcome, DeckBuilder};
pub use card::CardRecord;
pub use color::{Color, ColorSet};
pub use config::{
    CardConstraints, CategoryDefinition, ColorMatchMode, ConfigError, CurveShape, DeckConfig,
    DeckIdentity, FallbackStrategy, ManaBase, ManaCurve, ManaPenalty, PriorityCardEntry,
    ScoringRules, SpecialLands, TypeBonus,
};
pub use context::{BasicLandStub, BuildContext, CategorySummary, ContextCard, PoolCard};
pub use curve::generate_target_curve;
pub use deck::{BuildReport, Deck, DeckEntry};
pub use hooks::{BuildHooks, BuildStage, HookError, HookEvent, HookTiming};
pub use mana::{ManaCost, ManaCostParseError, ManaSymbol};
pub use pattern::TextPattern;
pub use repository::{
    CardRepository, InMemoryRepository, RepositoryError, RepositoryFilter, RepositoryView,
};
pub use scoring::{ScoredCard, score_card, sort_for_selection};
