#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    /// Returns the single-letter code used in deck configurations ("W", "U", ...).
    pub const fn code(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }

    /// Parses a single-letter color code (case-insensitive).
    pub fn from_code(code: char) -> Option<Color> {
        match code.to_ascii_uppercase() {
            'W' => Some(Color::White),
            'U' => Some(Color::Blue),
            'B' => Some(Color::Black),
            'R' => Some(Color::Red),
            'G' => Some(Color::Green),
            _ => None,
        }
    }

    /// Returns the standard basic land name producing this color.
    pub const fn basic_land_name(self) -> &'static str {
        match self {
            Color::White => "Plains",
            Color::Blue => "Island",
            Color::Black => "Swamp",
            Color::Red => "Mountain",
            Color::Green => "Forest",
        }
    }
}

/// A set of colors represented as bitflags for efficient operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorSet(u8);

impl ColorSet {
    pub const COLORLESS: Self = Self(0);
    pub const WHITE: Self = Self(1 << 0);
    pub const BLUE: Self = Self(1 << 1);
    pub const BLACK: Self = Self(1 << 2);
    pub const RED: Self = Self(1 << 3);
    pub const GREEN: Self = Self(1 << 4);

    /// Creates a new empty ColorSet.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Creates a ColorSet from a single color.
    pub const fn from_color(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE,
            Color::Blue => Self::BLUE,
            Color::Black => Self::BLACK,
            Color::Red => Self::RED,
            Color::Green => Self::GREEN,
        }
    }

    /// Parses a string of single-letter color codes (e.g. "WU").
    /// Unknown letters are ignored.
    pub fn from_codes(codes: &str) -> Self {
        codes.chars().filter_map(Color::from_code).collect()
    }

    /// Returns true if this set contains no colors.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this set contains the given color.
    pub const fn contains(self, color: Color) -> bool {
        self.0 & Self::from_color(color).0 != 0
    }

    /// Returns true if this set contains all colors in the other set.
    pub const fn contains_all(self, other: ColorSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if this set is a subset of the other set.
    pub const fn is_subset_of(self, other: ColorSet) -> bool {
        other.contains_all(self)
    }

    /// Returns true if the two sets share at least one color.
    pub const fn intersects(self, other: ColorSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns the union of two color sets.
    pub const fn union(self, other: ColorSet) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns the intersection of two color sets.
    pub const fn intersection(self, other: ColorSet) -> Self {
        Self(self.0 & other.0)
    }

    /// Returns the number of colors in this set.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Adds a color to this set, returning the new set.
    pub const fn with(self, color: Color) -> Self {
        self.union(Self::from_color(color))
    }

    /// Removes a color from this set, returning the new set.
    pub const fn without(self, color: Color) -> Self {
        Self(self.0 & !Self::from_color(color).0)
    }

    /// Iterates the colors in this set in WUBRG order.
    pub fn iter(self) -> impl Iterator<Item = Color> {
        Color::ALL.into_iter().filter(move |c| self.contains(*c))
    }

    /// Formats the set as letter codes in WUBRG order (e.g. "WU").
    pub fn codes(self) -> String {
        self.iter().map(Color::code).collect()
    }
}

impl From<Color> for ColorSet {
    fn from(color: Color) -> Self {
        Self::from_color(color)
    }
}

impl FromIterator<Color> for ColorSet {
    fn from_iter<T: IntoIterator<Item = Color>>(iter: T) -> Self {
        iter.into_iter()
            .fold(ColorSet::COLORLESS, |set, color| set.with(color))
    }
}

#[cfg(feature = "serialization")]
impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.code())
    }
}

#[cfg(feature = "serialization")]
impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Color::from_code(c)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown color code '{raw}'"))),
            _ => Err(serde::de::Error::custom(format!(
                "expected single-letter color code, got '{raw}'"
            ))),
        }
    }
}

#[cfg(feature = "serialization")]
impl serde::Serialize for ColorSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.codes())
    }
}

#[cfg(feature = "serialization")]
impl<'de> serde::Deserialize<'de> for ColorSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
        Ok(ColorSet::from_codes(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_set_empty() {
        let set = ColorSet::new();
        assert!(set.is_empty());
        assert_eq!(set.count(), 0);
    }

    #[test]
    fn test_color_set_from_codes() {
        let set = ColorSet::from_codes("wu");
        assert!(set.contains(Color::White));
        assert!(set.contains(Color::Blue));
        assert_eq!(set.count(), 2);
        assert_eq!(set.codes(), "WU");
    }

    #[test]
    fn test_subset_and_intersection() {
        let wu = ColorSet::WHITE.union(ColorSet::BLUE);
        let w = ColorSet::WHITE;
        assert!(w.is_subset_of(wu));
        assert!(!wu.is_subset_of(w));
        assert!(wu.intersects(ColorSet::from_codes("UB")));
        assert!(!wu.intersects(ColorSet::from_codes("RG")));
        assert!(ColorSet::COLORLESS.is_subset_of(w));
    }

    #[test]
    fn test_iter_wubrg_order() {
        let set = ColorSet::from_codes("GWB");
        let colors: Vec<Color> = set.iter().collect();
        assert_eq!(colors, vec![Color::White, Color::Black, Color::Green]);
    }

    #[test]
    fn test_basic_land_names() {
        assert_eq!(Color::White.basic_land_name(), "Plains");
        assert_eq!(Color::Green.basic_land_name(), "Forest");
    }
}
