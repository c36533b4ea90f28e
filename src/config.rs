use std::collections::BTreeMap;

use crate::color::ColorSet;
use crate::pattern::TextPattern;

/// How a card's color identity is matched against the deck's allowed colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(rename_all = "lowercase"))]
pub enum ColorMatchMode {
    /// Identity must equal the allowed set exactly.
    Exact,
    /// Identity must be contained in the allowed set.
    #[default]
    Subset,
    /// Identity must share at least one color with the allowed set.
    Any,
}

/// Deck identity: name, size, copy limits and pool-wide filters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
pub struct DeckIdentity {
    pub name: String,
    pub size: u32,
    pub max_card_copies: u32,
    pub colors: ColorSet,
    pub color_match_mode: ColorMatchMode,
    pub allow_colorless: bool,
    /// Formats every selected card must be legal in.
    pub legalities: Vec<String>,
    pub owned_cards_only: bool,
    /// Optional mana-value bounds applied to category candidates.
    pub mana_curve: Option<ManaCurve>,
}

impl Default for DeckIdentity {
    fn default() -> Self {
        Self {
            name: "Unnamed Deck".to_string(),
            size: 60,
            max_card_copies: 4,
            colors: ColorSet::COLORLESS,
            color_match_mode: ColorMatchMode::Subset,
            allow_colorless: true,
            legalities: Vec::new(),
            owned_cards_only: false,
            mana_curve: None,
        }
    }
}

/// Mana-value bounds and the shape of the diagnostic target curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
pub struct ManaCurve {
    pub min: u32,
    pub max: u32,
    pub shape: CurveShape,
}

impl Default for ManaCurve {
    fn default() -> Self {
        Self {
            min: 0,
            max: 7,
            shape: CurveShape::Linear,
        }
    }
}

/// Weight shapes for the diagnostic target mana curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(rename_all = "lowercase"))]
pub enum CurveShape {
    #[default]
    Linear,
    Bell,
    Inverse,
    Flat,
}

/// A named bucket of deck slots with its own target and preferences.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryDefinition {
    pub name: String,
    pub target: u32,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub preferred_keywords: Vec<String>,
    /// Ordered type preferences; earlier entries score higher.
    #[cfg_attr(feature = "serialization", serde(default))]
    pub preferred_types: Vec<String>,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub priority_text: Vec<TextPattern>,
}

impl CategoryDefinition {
    pub fn new(name: impl Into<String>, target: u32) -> Self {
        Self {
            name: name.into(),
            target,
            preferred_keywords: Vec::new(),
            preferred_types: Vec::new(),
            priority_text: Vec::new(),
        }
    }

    pub fn preferred_keywords(mut self, keywords: &[&str]) -> Self {
        self.preferred_keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn preferred_types(mut self, types: &[&str]) -> Self {
        self.preferred_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn priority_text(mut self, patterns: &[&str]) -> Self {
        self.priority_text = patterns.iter().map(|p| TextPattern::parse(p)).collect();
        self
    }
}

/// Mana-value penalty applied above a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
pub struct ManaPenalty {
    pub threshold: u32,
    pub penalty_per_point: i32,
}

impl Default for ManaPenalty {
    fn default() -> Self {
        Self {
            threshold: 5,
            penalty_per_point: 1,
        }
    }
}

/// Per-type-class bonuses (basic card types, subtypes, supertypes).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
pub struct TypeBonus {
    pub basic_types: BTreeMap<String, i32>,
    pub sub_types: BTreeMap<String, i32>,
    pub super_types: BTreeMap<String, i32>,
}

/// Weighted scoring rules evaluated by the scoring function.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
pub struct ScoringRules {
    pub keyword_abilities: BTreeMap<String, i32>,
    pub keyword_actions: BTreeMap<String, i32>,
    pub ability_words: BTreeMap<String, i32>,
    pub text_matches: Vec<(TextPattern, i32)>,
    pub type_bonus: TypeBonus,
    pub rarity_bonus: BTreeMap<String, i32>,
    pub mana_penalty: Option<ManaPenalty>,
    /// Category filling's first pass only takes cards at or above this score.
    pub min_score_to_flag: i32,
}

/// Special (non-basic) land selection rules.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
pub struct SpecialLands {
    pub count: u32,
    pub prefer: Vec<TextPattern>,
    pub avoid: Vec<TextPattern>,
}

/// Mana-base shape: total lands plus special-land selection rules.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
pub struct ManaBase {
    pub land_count: u32,
    pub special_lands: SpecialLands,
    /// Explicit basic-land color weights. When non-empty this overrides
    /// the symbol-derived weighting.
    pub color_weights: BTreeMap<crate::color::Color, u32>,
}

impl Default for ManaBase {
    fn default() -> Self {
        Self {
            land_count: 24,
            special_lands: SpecialLands::default(),
            color_weights: BTreeMap::new(),
        }
    }
}

/// A card that must be in the deck regardless of scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct PriorityCardEntry {
    pub name: String,
    #[cfg_attr(feature = "serialization", serde(default = "default_min_copies"))]
    pub min_copies: u32,
}

#[cfg(feature = "serialization")]
fn default_min_copies() -> u32 {
    1
}

impl PriorityCardEntry {
    pub fn new(name: impl Into<String>, min_copies: u32) -> Self {
        Self {
            name: name.into(),
            min_copies,
        }
    }
}

/// Last-resort filling policy when category targets are not met.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
pub struct FallbackStrategy {
    pub fill_with_any: bool,
    pub fill_priority: Vec<String>,
    /// When the pool cannot reach the target, true means the short deck is
    /// an acceptable result; false means the caller should treat it as a
    /// failure. Either way the build completes and reports the shortfall.
    pub allow_less_than_target: bool,
}

/// Extra pool-wide constraints on card selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
pub struct CardConstraints {
    /// Cards carrying any of these keywords are skipped by category
    /// filling and fallback.
    pub exclude_keywords: Vec<String>,
}

/// Resolved deck-building configuration.
///
/// Category targets need not sum to the deck's non-land budget; they are
/// proportionally rescaled during category filling without mutating this
/// value.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
pub struct DeckConfig {
    pub deck: DeckIdentity,
    /// Ordered: categories are filled in declaration order.
    pub categories: Vec<CategoryDefinition>,
    pub scoring_rules: ScoringRules,
    pub mana_base: ManaBase,
    pub priority_cards: Vec<PriorityCardEntry>,
    pub fallback_strategy: FallbackStrategy,
    pub card_constraints: CardConstraints,
}

impl DeckConfig {
    /// Validates the configuration. Called before any build starts; a
    /// configuration error is fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deck.size == 0 {
            return Err(ConfigError::InvalidDeckSize(self.deck.size));
        }
        if self.deck.max_card_copies == 0 {
            return Err(ConfigError::InvalidMaxCopies(self.deck.max_card_copies));
        }
        if self.mana_base.land_count > self.deck.size {
            return Err(ConfigError::LandCountExceedsSize {
                land_count: self.mana_base.land_count,
                size: self.deck.size,
            });
        }
        if let Some(curve) = &self.deck.mana_curve
            && curve.min > curve.max
        {
            return Err(ConfigError::InvalidManaCurve {
                min: curve.min,
                max: curve.max,
            });
        }
        for category in &self.categories {
            if category.name.is_empty() {
                return Err(ConfigError::EmptyCategoryName);
            }
        }
        Ok(())
    }

    /// Total category target before any scaling.
    pub fn total_category_target(&self) -> u32 {
        self.categories.iter().map(|c| c.target).sum()
    }
}

/// Fatal configuration errors, rejected before the build starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Deck size must be positive.
    InvalidDeckSize(u32),
    /// Max copies per card must be at least 1.
    InvalidMaxCopies(u32),
    /// The mana base cannot ask for more lands than the deck holds.
    LandCountExceedsSize { land_count: u32, size: u32 },
    /// Curve bounds are inverted.
    InvalidManaCurve { min: u32, max: u32 },
    /// Categories must be named.
    EmptyCategoryName,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidDeckSize(size) => {
                write!(f, "deck size must be positive, got {size}")
            }
            ConfigError::InvalidMaxCopies(copies) => {
                write!(f, "max card copies must be at least 1, got {copies}")
            }
            ConfigError::LandCountExceedsSize { land_count, size } => {
                write!(f, "land count {land_count} exceeds deck size {size}")
            }
            ConfigError::InvalidManaCurve { min, max } => {
                write!(f, "mana curve min {min} exceeds max {max}")
            }
            ConfigError::EmptyCategoryName => write!(f, "category name cannot be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(DeckConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut config = DeckConfig::default();
        config.deck.size = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidDeckSize(0)));
    }

    #[test]
    fn test_land_count_must_fit() {
        let mut config = DeckConfig::default();
        config.deck.size = 20;
        assert_eq!(
            config.validate(),
            Err(ConfigError::LandCountExceedsSize {
                land_count: 24,
                size: 20
            })
        );
    }

    #[test]
    fn test_inverted_curve_rejected() {
        let mut config = DeckConfig::default();
        config.deck.mana_curve = Some(ManaCurve {
            min: 5,
            max: 2,
            shape: CurveShape::Linear,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidManaCurve { .. })
        ));
    }

    #[test]
    fn test_total_category_target() {
        let mut config = DeckConfig::default();
        config.categories.push(CategoryDefinition::new("creatures", 20));
        config.categories.push(CategoryDefinition::new("removal", 8));
        assert_eq!(config.total_category_target(), 28);
    }

    #[cfg(feature = "serialization")]
    #[test]
    fn test_config_roundtrip_json() {
        let mut config = DeckConfig::default();
        config.deck.colors = ColorSet::from_codes("WU");
        config
            .categories
            .push(CategoryDefinition::new("removal", 8).priority_text(&["destroy", "/exile .*/"]));
        let json = serde_json::to_string(&config).unwrap();
        let back: DeckConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
