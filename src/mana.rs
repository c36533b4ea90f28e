use std::collections::BTreeMap;

use crate::color::Color;

/// Atomic mana payment options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManaSymbol {
    /// White mana {W}
    White,
    /// Blue mana {U}
    Blue,
    /// Black mana {B}
    Black,
    /// Red mana {R}
    Red,
    /// Green mana {G}
    Green,
    /// Colorless mana {C}
    Colorless,
    /// Generic mana {1}, {2}, etc.
    Generic(u8),
    /// Snow mana {S}
    Snow,
    /// Life payment for Phyrexian costs
    Life(u8),
    /// Variable mana {X}
    X,
}

impl ManaSymbol {
    /// Returns the mana value contribution of this symbol.
    pub fn mana_value(&self) -> u32 {
        match self {
            ManaSymbol::White
            | ManaSymbol::Blue
            | ManaSymbol::Black
            | ManaSymbol::Red
            | ManaSymbol::Green
            | ManaSymbol::Colorless
            | ManaSymbol::Snow => 1,
            ManaSymbol::Generic(n) => *n as u32,
            ManaSymbol::Life(_) => 0, // Life payment doesn't contribute to mana value
            ManaSymbol::X => 0,       // X is 0 except on the stack
        }
    }

    /// Returns the color of this symbol, if it is a colored symbol.
    pub fn color(&self) -> Option<Color> {
        match self {
            ManaSymbol::White => Some(Color::White),
            ManaSymbol::Blue => Some(Color::Blue),
            ManaSymbol::Black => Some(Color::Black),
            ManaSymbol::Red => Some(Color::Red),
            ManaSymbol::Green => Some(Color::Green),
            _ => None,
        }
    }

    /// Creates a colored mana symbol from a Color.
    pub fn from_color(color: Color) -> Self {
        match color {
            Color::White => ManaSymbol::White,
            Color::Blue => ManaSymbol::Blue,
            Color::Black => ManaSymbol::Black,
            Color::Red => ManaSymbol::Red,
            Color::Green => ManaSymbol::Green,
        }
    }
}

/// Error produced when an oracle-syntax mana cost cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManaCostParseError(pub String);

impl std::fmt::Display for ManaCostParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid mana cost: {}", self.0)
    }
}

impl std::error::Error for ManaCostParseError {}

/// Represents a mana cost as a sequence of pips, where each pip is a list of
/// alternative payment options (disjunction).
///
/// The outer vector represents pips that must ALL be paid (conjunction).
/// Each inner vector represents alternative ways to pay that pip (disjunction).
///
/// Examples:
/// - `{2}{W}{W}` = `[[Generic(2)], [White], [White]]`
/// - `{W/U}` (hybrid) = `[[White, Blue]]`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManaCost {
    pips: Vec<Vec<ManaSymbol>>,
}

impl ManaCost {
    /// Creates an empty mana cost.
    pub fn new() -> Self {
        Self { pips: Vec::new() }
    }

    /// Creates a mana cost from a list of pips, where each pip is a list of
    /// alternative payment options.
    pub fn from_pips(pips: Vec<Vec<ManaSymbol>>) -> Self {
        Self { pips }
    }

    /// Creates a mana cost from a simple list of symbols (each becomes one pip).
    pub fn from_symbols(symbols: Vec<ManaSymbol>) -> Self {
        Self {
            pips: symbols.into_iter().map(|s| vec![s]).collect(),
        }
    }

    /// Parses an oracle-syntax mana cost string (e.g. "{2}{W}{W}", "{W/U}").
    /// Empty strings parse to an empty cost.
    pub fn parse(raw: &str) -> Result<Self, ManaCostParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(ManaCost::new());
        }

        let mut pips: Vec<Vec<ManaSymbol>> = Vec::new();
        let mut current = String::new();
        let mut in_brace = false;

        for ch in trimmed.chars() {
            if ch == '{' {
                in_brace = true;
                current.clear();
                continue;
            }
            if ch == '}' {
                if !in_brace {
                    continue;
                }
                in_brace = false;
                if current.is_empty() {
                    continue;
                }
                let alternatives = parse_symbol_group(&current)?;
                if !alternatives.is_empty() {
                    pips.push(alternatives);
                }
                continue;
            }
            if in_brace {
                current.push(ch);
            }
        }

        if in_brace {
            return Err(ManaCostParseError(format!("unterminated brace in '{raw}'")));
        }

        Ok(ManaCost::from_pips(pips))
    }

    /// Returns the mana value (formerly converted mana cost) of this cost.
    ///
    /// For each pip, uses the maximum mana value among its alternatives.
    pub fn mana_value(&self) -> u32 {
        self.pips
            .iter()
            .map(|pip| pip.iter().map(|s| s.mana_value()).max().unwrap_or(0))
            .sum()
    }

    /// Returns the pips in this mana cost.
    pub fn pips(&self) -> &[Vec<ManaSymbol>] {
        &self.pips
    }

    /// Counts colored pips per color. Every colored alternative in a pip is
    /// counted, so a hybrid {W/U} contributes one to each color.
    pub fn colored_symbol_counts(&self) -> BTreeMap<Color, u32> {
        let mut counts = BTreeMap::new();
        for pip in &self.pips {
            for symbol in pip {
                if let Some(color) = symbol.color() {
                    *counts.entry(color).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    /// Format the mana cost in oracle-style syntax (e.g., "{2}{W}{W}").
    pub fn to_oracle(&self) -> String {
        fn symbol_text(symbol: ManaSymbol) -> String {
            match symbol {
                ManaSymbol::White => "W".to_string(),
                ManaSymbol::Blue => "U".to_string(),
                ManaSymbol::Black => "B".to_string(),
                ManaSymbol::Red => "R".to_string(),
                ManaSymbol::Green => "G".to_string(),
                ManaSymbol::Colorless => "C".to_string(),
                ManaSymbol::Generic(n) => n.to_string(),
                ManaSymbol::Snow => "S".to_string(),
                ManaSymbol::Life(_) => "P".to_string(),
                ManaSymbol::X => "X".to_string(),
            }
        }

        self.pips
            .iter()
            .map(|pip| {
                let inner = pip
                    .iter()
                    .map(|s| symbol_text(*s))
                    .collect::<Vec<_>>()
                    .join("/");
                format!("{{{inner}}}")
            })
            .collect()
    }
}

#[cfg(feature = "serialization")]
impl serde::Serialize for ManaCost {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_oracle())
    }
}

#[cfg(feature = "serialization")]
impl<'de> serde::Deserialize<'de> for ManaCost {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
        ManaCost::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn parse_symbol_group(raw: &str) -> Result<Vec<ManaSymbol>, ManaCostParseError> {
    let mut alternatives = Vec::new();
    for part in raw.split('/') {
        alternatives.push(parse_symbol(part)?);
    }
    Ok(alternatives)
}

fn parse_symbol(part: &str) -> Result<ManaSymbol, ManaCostParseError> {
    let upper = part.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err(ManaCostParseError("empty mana symbol".to_string()));
    }

    if upper.chars().all(|c| c.is_ascii_digit()) {
        let value = upper
            .parse::<u8>()
            .map_err(|_| ManaCostParseError(format!("invalid generic mana symbol '{part}'")))?;
        return Ok(ManaSymbol::Generic(value));
    }

    match upper.as_str() {
        "W" => Ok(ManaSymbol::White),
        "U" => Ok(ManaSymbol::Blue),
        "B" => Ok(ManaSymbol::Black),
        "R" => Ok(ManaSymbol::Red),
        "G" => Ok(ManaSymbol::Green),
        "C" => Ok(ManaSymbol::Colorless),
        "S" => Ok(ManaSymbol::Snow),
        "X" => Ok(ManaSymbol::X),
        "P" => Ok(ManaSymbol::Life(2)),
        _ => Err(ManaCostParseError(format!(
            "unrecognized mana symbol '{part}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_cost() {
        let cost = ManaCost::parse("{2}{W}{W}").unwrap();
        assert_eq!(cost.mana_value(), 4);
        assert_eq!(cost.to_oracle(), "{2}{W}{W}");
    }

    #[test]
    fn test_parse_hybrid_cost() {
        let cost = ManaCost::parse("{W/U}").unwrap();
        assert_eq!(cost.mana_value(), 1);
        let counts = cost.colored_symbol_counts();
        assert_eq!(counts.get(&Color::White), Some(&1));
        assert_eq!(counts.get(&Color::Blue), Some(&1));
    }

    #[test]
    fn test_parse_empty_cost() {
        assert_eq!(ManaCost::parse("").unwrap(), ManaCost::new());
        assert_eq!(ManaCost::parse("  ").unwrap().mana_value(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ManaCost::parse("{Q}").is_err());
        assert!(ManaCost::parse("{2").is_err());
    }

    #[test]
    fn test_colored_symbol_counts() {
        let cost = ManaCost::parse("{1}{G}{G}{W}").unwrap();
        let counts = cost.colored_symbol_counts();
        assert_eq!(counts.get(&Color::Green), Some(&2));
        assert_eq!(counts.get(&Color::White), Some(&1));
        assert_eq!(counts.get(&Color::Red), None);
    }

    #[test]
    fn test_x_contributes_zero() {
        let cost = ManaCost::parse("{X}{R}").unwrap();
        assert_eq!(cost.mana_value(), 1);
    }
}
