use std::collections::BTreeMap;

use crate::color::ColorSet;
use crate::config::ColorMatchMode;
use crate::mana::ManaCost;

/// Static, immutable snapshot of a card's gameplay-relevant attributes.
///
/// Records are produced by the external card repository; the engine only
/// ever reads them. Type tags are kept as free-form strings because the
/// candidate pool is arbitrary external data, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct CardRecord {
    pub name: String,
    /// Card types ("Creature", "Land", ...).
    pub types: Vec<String>,
    /// Supertypes ("Basic", "Legendary", ...).
    pub supertypes: Vec<String>,
    /// Subtypes ("Elf", "Aura", ...).
    pub subtypes: Vec<String>,
    pub color_identity: ColorSet,
    pub keywords: Vec<String>,
    pub mana_cost: Option<ManaCost>,
    pub oracle_text: String,
    pub rarity: String,
    /// Format name -> legality status ("legal", "banned", ...).
    pub legalities: BTreeMap<String, String>,
    /// Copies in the owner's collection. Only meaningful when the deck
    /// configuration enforces ownership.
    pub owned_quantity: u32,
}

impl CardRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            supertypes: Vec::new(),
            subtypes: Vec::new(),
            color_identity: ColorSet::COLORLESS,
            keywords: Vec::new(),
            mana_cost: None,
            oracle_text: String::new(),
            rarity: "common".to_string(),
            legalities: BTreeMap::new(),
            owned_quantity: 0,
        }
    }

    pub fn types(mut self, types: &[&str]) -> Self {
        self.types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn supertypes(mut self, supertypes: &[&str]) -> Self {
        self.supertypes = supertypes.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn subtypes(mut self, subtypes: &[&str]) -> Self {
        self.subtypes = subtypes.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn color_identity(mut self, colors: ColorSet) -> Self {
        self.color_identity = colors;
        self
    }

    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn mana_cost(mut self, cost: ManaCost) -> Self {
        self.mana_cost = Some(cost);
        self
    }

    pub fn oracle_text(mut self, text: impl Into<String>) -> Self {
        self.oracle_text = text.into();
        self
    }

    pub fn rarity(mut self, rarity: impl Into<String>) -> Self {
        self.rarity = rarity.into();
        self
    }

    pub fn legal_in(mut self, format: impl Into<String>) -> Self {
        self.legalities.insert(format.into(), "legal".to_string());
        self
    }

    pub fn legality(mut self, format: impl Into<String>, status: impl Into<String>) -> Self {
        self.legalities.insert(format.into(), status.into());
        self
    }

    pub fn owned(mut self, quantity: u32) -> Self {
        self.owned_quantity = quantity;
        self
    }

    /// Returns the mana value of this card (0 for cards without a cost).
    pub fn mana_value(&self) -> u32 {
        self.mana_cost.as_ref().map_or(0, |c| c.mana_value())
    }

    /// Returns true if any type, supertype or subtype matches the given tag
    /// (case-insensitive).
    pub fn matches_type(&self, tag: &str) -> bool {
        self.types
            .iter()
            .chain(self.supertypes.iter())
            .chain(self.subtypes.iter())
            .any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Returns true if this card carries the given keyword (case-insensitive).
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword))
    }

    pub fn is_land(&self) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case("Land"))
    }

    pub fn is_basic_land(&self) -> bool {
        self.is_land()
            && self
                .supertypes
                .iter()
                .any(|t| t.eq_ignore_ascii_case("Basic"))
    }

    /// Returns true if this card is marked legal in the given format
    /// (case-insensitive status comparison).
    pub fn is_legal_in(&self, format: &str) -> bool {
        self.legalities
            .iter()
            .any(|(f, status)| f.eq_ignore_ascii_case(format) && status.eq_ignore_ascii_case("legal"))
    }

    /// Checks this card's color identity against the deck's allowed colors.
    ///
    /// Colorless cards pass when `allow_colorless` is set, regardless of mode.
    pub fn matches_color_identity(
        &self,
        allowed: ColorSet,
        mode: ColorMatchMode,
        allow_colorless: bool,
    ) -> bool {
        if self.color_identity.is_empty() {
            return allow_colorless
                || match mode {
                    ColorMatchMode::Exact => allowed.is_empty(),
                    ColorMatchMode::Subset => true,
                    ColorMatchMode::Any => false,
                };
        }
        match mode {
            ColorMatchMode::Exact => self.color_identity == allowed,
            ColorMatchMode::Subset => self.color_identity.is_subset_of(allowed),
            ColorMatchMode::Any => self.color_identity.intersects(allowed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn bear() -> CardRecord {
        CardRecord::new("Grizzly Bears")
            .types(&["Creature"])
            .subtypes(&["Bear"])
            .color_identity(ColorSet::GREEN)
            .mana_cost(ManaCost::parse("{1}{G}").unwrap())
            .legal_in("standard")
    }

    #[test]
    fn test_matches_type_case_insensitive() {
        let card = bear();
        assert!(card.matches_type("creature"));
        assert!(card.matches_type("BEAR"));
        assert!(!card.matches_type("land"));
    }

    #[test]
    fn test_basic_land_detection() {
        let forest = CardRecord::new("Forest")
            .types(&["Land"])
            .supertypes(&["Basic"])
            .subtypes(&["Forest"]);
        assert!(forest.is_land());
        assert!(forest.is_basic_land());

        let dual = CardRecord::new("Tropical Island").types(&["Land"]);
        assert!(dual.is_land());
        assert!(!dual.is_basic_land());
    }

    #[test]
    fn test_legality_check() {
        let card = bear().legality("modern", "banned");
        assert!(card.is_legal_in("standard"));
        assert!(card.is_legal_in("Standard"));
        assert!(!card.is_legal_in("modern"));
        assert!(!card.is_legal_in("vintage"));
    }

    #[test]
    fn test_color_identity_modes() {
        let card = bear();
        let gw = ColorSet::GREEN.with(Color::White);
        assert!(card.matches_color_identity(gw, ColorMatchMode::Subset, false));
        assert!(!card.matches_color_identity(gw, ColorMatchMode::Exact, false));
        assert!(card.matches_color_identity(ColorSet::GREEN, ColorMatchMode::Exact, false));
        assert!(card.matches_color_identity(gw, ColorMatchMode::Any, false));
        assert!(!card.matches_color_identity(ColorSet::WHITE, ColorMatchMode::Any, false));
    }

    #[test]
    fn test_colorless_passes_with_flag() {
        let sol = CardRecord::new("Sol Ring").types(&["Artifact"]);
        assert!(sol.matches_color_identity(ColorSet::GREEN, ColorMatchMode::Subset, true));
        // Colorless identity is a subset of anything.
        assert!(sol.matches_color_identity(ColorSet::GREEN, ColorMatchMode::Subset, false));
        assert!(!sol.matches_color_identity(ColorSet::GREEN, ColorMatchMode::Exact, false));
    }
}
