//! The deck builder: wires the repository, configuration and hooks into
//! the fixed stage pipeline and extracts the finished deck.

use tracing::{info, warn};

use crate::config::{ConfigError, DeckConfig};
use crate::context::BuildContext;
use crate::curve::generate_target_curve;
use crate::deck::{BuildReport, Deck};
use crate::hooks::{BuildHooks, BuildStage, HookTiming};
use crate::repository::{CardRepository, RepositoryError, RepositoryFilter};
use crate::stages;

/// Fatal build failures. Everything softer (missing cards, unmet targets,
/// short decks) is reported through
/// [`BuildReport::unmet_conditions`](crate::deck::BuildReport) instead.
#[derive(Debug)]
pub enum BuildError {
    Config(ConfigError),
    Repository(RepositoryError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Config(err) => write!(f, "invalid configuration: {err}"),
            BuildError::Repository(err) => write!(f, "repository failure: {err}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Config(err) => Some(err),
            BuildError::Repository(err) => Some(err),
        }
    }
}

impl From<ConfigError> for BuildError {
    fn from(err: ConfigError) -> Self {
        BuildError::Config(err)
    }
}

impl From<RepositoryError> for BuildError {
    fn from(err: RepositoryError) -> Self {
        BuildError::Repository(err)
    }
}

/// The finished deck together with its build report.
#[derive(Debug)]
pub struct BuildOutcome {
    pub deck: Deck,
    pub report: BuildReport,
}

/// Deterministic deck assembly over a card repository.
///
/// A builder is cheap to construct and single-use per call: `build` takes
/// no mutable state from previous runs, so the same builder, configuration
/// and pool always produce the identical deck.
pub struct DeckBuilder<'a> {
    config: DeckConfig,
    repository: &'a dyn CardRepository,
    hooks: BuildHooks,
}

impl<'a> DeckBuilder<'a> {
    /// Creates a builder, validating the configuration up front.
    pub fn new(
        config: DeckConfig,
        repository: &'a dyn CardRepository,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            repository,
            hooks: BuildHooks::new(),
        })
    }

    pub fn with_hooks(mut self, hooks: BuildHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn hooks_mut(&mut self) -> &mut BuildHooks {
        &mut self.hooks
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    /// Runs the full stage pipeline: priority cards, special lands, basic
    /// lands, category filling, fallback filling, finalize.
    pub fn build(&self) -> Result<BuildOutcome, BuildError> {
        let config = &self.config;
        let filter = RepositoryFilter::from_config(config);
        let view = self.repository.filter(&filter)?;
        info!(
            deck = %config.deck.name,
            candidates = view.len(),
            "starting deck build"
        );

        let mut context = BuildContext::new(config.deck.name.clone());
        if let Some(curve) = &config.deck.mana_curve {
            let nonland_budget = config.deck.size - config.mana_base.land_count;
            context.target_curve = Some(generate_target_curve(
                curve.min,
                curve.max,
                nonland_budget,
                curve.shape,
            ));
        }
        let budget = config.deck.size - config.mana_base.land_count;

        self.fire(BuildStage::Priority, HookTiming::Before, &mut context);
        stages::priority::run(&mut context, config, self.repository)?;
        self.fire(BuildStage::Priority, HookTiming::After, &mut context);

        self.fire(BuildStage::SpecialLands, HookTiming::Before, &mut context);
        stages::lands::special_lands(&mut context, config, &view);
        self.fire(BuildStage::SpecialLands, HookTiming::After, &mut context);

        self.fire(BuildStage::BasicLands, HookTiming::Before, &mut context);
        stages::lands::compute_mana_symbols(&mut context);
        stages::lands::basic_lands(&mut context, config, self.repository, None)?;
        self.fire(BuildStage::BasicLands, HookTiming::After, &mut context);

        self.fire(BuildStage::Categories, HookTiming::Before, &mut context);
        stages::categories::fill(&mut context, config, &view, budget, &self.hooks);
        self.fire(BuildStage::Categories, HookTiming::After, &mut context);

        self.fire(BuildStage::Fallback, HookTiming::Before, &mut context);
        stages::fallback::run(&mut context, config, &view, budget);
        self.fire(BuildStage::Fallback, HookTiming::After, &mut context);

        self.fire(BuildStage::Finalize, HookTiming::Before, &mut context);
        // Symbol counts shift as categories and fallback add spells;
        // refresh before the finalize top-up distributes more basics.
        stages::lands::compute_mana_symbols(&mut context);
        stages::finalize::run(&mut context, config, self.repository)?;
        self.fire(BuildStage::Finalize, HookTiming::After, &mut context);

        let (deck, report) = BuildReport::extract(context, config.deck.size);
        info!(
            deck = %deck.name,
            size = deck.total_cards(),
            lands = deck.land_count(),
            unmet = report.unmet_conditions.len(),
            "deck build finished"
        );
        Ok(BuildOutcome { deck, report })
    }

    fn fire(&self, stage: BuildStage, timing: HookTiming, context: &mut BuildContext) {
        for err in self.hooks.fire(stage, timing, None, context) {
            warn!(stage = stage.name(), %err, "hook failed");
            context.log(format!("Hook error in stage {}: {err}", stage.name()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::card::CardRecord;
    use crate::color::ColorSet;
    use crate::config::CategoryDefinition;
    use crate::hooks::HookError;
    use crate::mana::ManaCost;
    use crate::repository::InMemoryRepository;

    fn pool() -> InMemoryRepository {
        let mut cards = Vec::new();
        for i in 0..20 {
            cards.push(
                CardRecord::new(format!("Soldier {i:02}"))
                    .types(&["Creature"])
                    .color_identity(ColorSet::WHITE)
                    .mana_cost(ManaCost::parse("{1}{W}").unwrap())
                    .keywords(&["Vigilance"]),
            );
        }
        cards.push(
            CardRecord::new("Command Bunker")
                .types(&["Land"])
                .oracle_text("{T}: Add {w}."),
        );
        InMemoryRepository::new(cards)
    }

    fn config() -> DeckConfig {
        let mut config = DeckConfig::default();
        config.deck.name = "Soldiers".to_string();
        config.deck.size = 40;
        config.deck.colors = ColorSet::WHITE;
        config.mana_base.land_count = 16;
        config.mana_base.special_lands.count = 1;
        config
            .categories
            .push(CategoryDefinition::new("creatures", 24).preferred_types(&["Creature"]));
        config
            .scoring_rules
            .keyword_abilities
            .insert("Vigilance".to_string(), 1);
        config
    }

    #[test]
    fn test_invalid_config_rejected() {
        let repo = pool();
        let mut config = config();
        config.deck.size = 0;
        assert!(DeckBuilder::new(config, &repo).is_err());
    }

    #[test]
    fn test_builds_to_target_size() {
        let repo = pool();
        let builder = DeckBuilder::new(config(), &repo).unwrap();
        let outcome = builder.build().unwrap();

        assert_eq!(outcome.deck.total_cards(), 40);
        assert_eq!(outcome.deck.land_count(), 16);
        assert!(outcome.report.size_met);
        assert_eq!(outcome.deck.quantity_of("Command Bunker"), 1);
    }

    #[test]
    fn test_build_is_deterministic() {
        let repo = pool();
        let first = DeckBuilder::new(config(), &repo).unwrap().build().unwrap();
        let second = DeckBuilder::new(config(), &repo).unwrap().build().unwrap();
        assert_eq!(first.deck.entries(), second.deck.entries());
        assert_eq!(
            first.report.unmet_conditions,
            second.report.unmet_conditions
        );
    }

    #[test]
    fn test_hooks_observe_stages() {
        let repo = pool();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let mut builder = DeckBuilder::new(config(), &repo).unwrap();
        builder.hooks_mut().on_any(move |event| {
            log.borrow_mut()
                .push((event.stage.name(), event.timing == HookTiming::Before));
            Ok(())
        });
        builder.build().unwrap();

        let seen = seen.borrow();
        assert!(seen.contains(&("priority", true)));
        assert!(seen.contains(&("finalize", false)));
        // The per-category event fires on top of the stage pair.
        assert!(
            seen.iter()
                .filter(|(stage, _)| *stage == "categories")
                .count()
                >= 3
        );
    }

    #[test]
    fn test_hook_errors_never_abort() {
        let repo = pool();
        let mut builder = DeckBuilder::new(config(), &repo).unwrap();
        builder
            .hooks_mut()
            .on_any(|_| Err(HookError("observer down".to_string())));
        let outcome = builder.build().unwrap();
        assert_eq!(outcome.deck.total_cards(), 40);
        assert!(
            outcome
                .report
                .operations
                .iter()
                .any(|op| op.contains("observer down"))
        );
    }
}
