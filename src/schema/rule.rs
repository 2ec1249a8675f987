//! Transition rule types and their textual key schema.
//!
//! A rule is stored as a dense table indexed by a canonical key index. The
//! textual keys used for import/export are fixed-width digit strings, so their
//! lexicographic order equals the canonical index order:
//!
//! - neighbour-count (`living`): `"<state><live neighbours>"`, 18 keys `00..08, 10..18`
//! - pattern: `"<center><8 neighbours clockwise from upper-left>"`, 512 keys
//!   in ascending binary value (the center symbol is the most significant bit)

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Number of cells surrounding a cell in the Moore neighbourhood.
pub const NEIGHBOURS: usize = 8;

/// Keys in a neighbour-count rule: 2 states × 9 possible live-neighbour counts.
pub const LIVING_KEY_COUNT: usize = 2 * (NEIGHBOURS + 1);

/// Keys in a pattern rule: every 9-cell neighbourhood.
pub const PATTERN_KEY_COUNT: usize = 1 << (NEIGHBOURS + 1);

/// Rule encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Keyed by (own state, number of live neighbours).
    #[default]
    Living,
    /// Keyed by the full 9-cell neighbourhood.
    Pattern,
}

impl Encoding {
    /// Size of the key domain.
    #[inline]
    pub fn key_count(self) -> usize {
        match self {
            Encoding::Living => LIVING_KEY_COUNT,
            Encoding::Pattern => PATTERN_KEY_COUNT,
        }
    }

    /// Width of a textual key in symbols.
    #[inline]
    pub fn key_width(self) -> usize {
        match self {
            Encoding::Living => 2,
            Encoding::Pattern => NEIGHBOURS + 1,
        }
    }

    /// Textual key for a canonical index.
    pub fn key(self, index: usize) -> String {
        match self {
            Encoding::Living => {
                format!("{}{}", index / (NEIGHBOURS + 1), index % (NEIGHBOURS + 1))
            }
            Encoding::Pattern => format!("{:09b}", index),
        }
    }

    /// Canonical index of a textual key.
    pub fn parse_key(self, key: &str) -> Result<usize, RuleError> {
        let unknown = || RuleError::UnknownKey(key.to_string());
        if key.len() != self.key_width() {
            return Err(unknown());
        }
        let bytes = key.as_bytes();

        match self {
            Encoding::Living => {
                let state = match bytes[0] {
                    b'0' => 0,
                    b'1' => 1,
                    _ => return Err(unknown()),
                };
                match bytes[1] {
                    b @ b'0'..=b'8' => Ok(living_index(state, b - b'0')),
                    _ => Err(unknown()),
                }
            }
            Encoding::Pattern => bytes.iter().try_fold(0usize, |acc, b| match b {
                b'0' => Ok(acc << 1),
                b'1' => Ok((acc << 1) | 1),
                _ => Err(unknown()),
            }),
        }
    }

    /// Infer the encoding from a textual key's width.
    pub fn from_key(key: &str) -> Result<Self, RuleError> {
        match key.len() {
            2 => Ok(Encoding::Living),
            9 => Ok(Encoding::Pattern),
            _ => Err(RuleError::UnknownKey(key.to_string())),
        }
    }

    /// Name used in configuration files and tables.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Living => "living",
            Encoding::Pattern => "pattern",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "living" => Ok(Encoding::Living),
            "pattern" => Ok(Encoding::Pattern),
            other => Err(RuleError::UnknownEncoding(other.to_string())),
        }
    }
}

/// Canonical index of a neighbour-count key.
#[inline]
pub fn living_index(state: u8, live_neighbours: u8) -> usize {
    state as usize * (NEIGHBOURS + 1) + live_neighbours as usize
}

/// Canonical index of a pattern key.
#[inline]
pub fn pattern_index(center: u8, neighbourhood: &[u8; NEIGHBOURS]) -> usize {
    neighbourhood
        .iter()
        .fold(center as usize, |acc, &cell| (acc << 1) | cell as usize)
}

/// A transition rule over a fixed key domain.
///
/// Neighbour-count tables are always total. Pattern tables may leave keys
/// undefined, in which case the cell keeps its current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleEntries", into = "BTreeMap<String, u8>")]
pub struct Rule {
    encoding: Encoding,
    table: Vec<Option<u8>>,
}

impl Rule {
    /// Build a total rule from values in canonical key order.
    pub fn from_table(encoding: Encoding, values: Vec<u8>) -> Result<Self, RuleError> {
        if values.len() != encoding.key_count() {
            return Err(RuleError::TableLength {
                encoding,
                expected: encoding.key_count(),
                actual: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|&v| v > 1) {
            return Err(RuleError::NonBinaryValue {
                key: encoding.key(index),
                value: values[index],
            });
        }

        Ok(Self {
            encoding,
            table: values.into_iter().map(Some).collect(),
        })
    }

    /// Build a rule from textual `(key, value)` entries.
    ///
    /// The encoding is inferred from the key width. Neighbour-count rules must
    /// define all 18 keys; pattern rules may be partial.
    pub fn from_entries<I, K>(entries: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = (K, u8)>,
        K: AsRef<str>,
    {
        let mut entries = entries.into_iter().peekable();
        let encoding = match entries.peek() {
            Some((key, _)) => Encoding::from_key(key.as_ref())?,
            None => return Err(RuleError::Empty),
        };

        let mut table = vec![None; encoding.key_count()];
        for (key, value) in entries {
            let key = key.as_ref();
            if key.len() != encoding.key_width() {
                return Err(RuleError::MixedKeys(key.to_string()));
            }
            let index = encoding.parse_key(key)?;
            if value > 1 {
                return Err(RuleError::NonBinaryValue {
                    key: key.to_string(),
                    value,
                });
            }
            if table[index].replace(value).is_some() {
                return Err(RuleError::DuplicateKey(key.to_string()));
            }
        }

        if encoding == Encoding::Living
            && let Some(index) = table.iter().position(Option::is_none)
        {
            return Err(RuleError::MissingKey(encoding.key(index)));
        }

        Ok(Self { encoding, table })
    }

    /// Rule that maps every key to the cell's own state.
    pub fn identity(encoding: Encoding) -> Self {
        let table = (0..encoding.key_count())
            .map(|index| {
                Some(match encoding {
                    Encoding::Living => (index / (NEIGHBOURS + 1)) as u8,
                    Encoding::Pattern => (index >> NEIGHBOURS) as u8,
                })
            })
            .collect();
        Self { encoding, table }
    }

    /// Conway's Game of Life (B3/S23) as a neighbour-count rule.
    pub fn conway() -> Self {
        let table = (0..LIVING_KEY_COUNT)
            .map(|index| {
                let alive = index / (NEIGHBOURS + 1) == 1;
                let neighbours = index % (NEIGHBOURS + 1);
                let next = matches!((alive, neighbours), (false, 3) | (true, 2) | (true, 3));
                Some(next as u8)
            })
            .collect();
        Self {
            encoding: Encoding::Living,
            table,
        }
    }

    /// Assemble from a raw table. Callers keep the length tied to the encoding.
    pub(crate) fn from_raw(encoding: Encoding, table: Vec<Option<u8>>) -> Self {
        debug_assert_eq!(table.len(), encoding.key_count());
        Self { encoding, table }
    }

    /// Raw table in canonical key order.
    #[inline]
    pub(crate) fn table(&self) -> &[Option<u8>] {
        &self.table
    }

    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Size of the key domain (defined or not).
    #[inline]
    pub fn key_count(&self) -> usize {
        self.table.len()
    }

    /// Whether every key has a value.
    pub fn is_total(&self) -> bool {
        self.table.iter().all(Option::is_some)
    }

    /// Value at a canonical index, if defined.
    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.table.get(index).copied().flatten()
    }

    /// Value for a textual key, if defined.
    pub fn lookup(&self, key: &str) -> Result<Option<u8>, RuleError> {
        let index = self.encoding.parse_key(key)?;
        Ok(self.table[index])
    }

    /// Next state of a cell whose neighbourhood maps to `index`.
    #[inline]
    pub fn next_state(&self, index: usize, current: u8) -> u8 {
        self.table[index].unwrap_or(current)
    }

    /// Defined `(key, value)` pairs in canonical order.
    pub fn entries(&self) -> impl Iterator<Item = (String, u8)> + '_ {
        self.table
            .iter()
            .enumerate()
            .filter_map(|(index, value)| value.map(|v| (self.encoding.key(index), v)))
    }
}

/// Raw `(key, value)` pairs of a rule object, in document order.
///
/// Unlike a map, repeated keys are kept so that validation can reject them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleEntries(pub Vec<(String, u8)>);

impl<'de> Deserialize<'de> for RuleEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RuleEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping rule keys to 0 or 1")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, u8>()? {
                    entries.push(entry);
                }
                Ok(RuleEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl TryFrom<RuleEntries> for Rule {
    type Error = RuleError;

    fn try_from(entries: RuleEntries) -> Result<Self, Self::Error> {
        Rule::from_entries(entries.0)
    }
}

impl From<Rule> for BTreeMap<String, u8> {
    fn from(rule: Rule) -> Self {
        rule.entries().collect()
    }
}

/// Rule construction and parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("Rule has no entries; encoding cannot be inferred")]
    Empty,
    #[error("Unrecognised rule key '{0}'")]
    UnknownKey(String),
    #[error("Rule key '{0}' has a different width than the first key")]
    MixedKeys(String),
    #[error("Rule key '{key}' maps to non-binary value {value}")]
    NonBinaryValue { key: String, value: u8 },
    #[error("Duplicate rule key '{0}'")]
    DuplicateKey(String),
    #[error("Neighbour-count rule is missing key '{0}'")]
    MissingKey(String),
    #[error("Table has {actual} entries, {encoding} encoding needs {expected}")]
    TableLength {
        encoding: Encoding,
        expected: usize,
        actual: usize,
    },
    #[error("Unknown encoding '{0}' (expected 'living' or 'pattern')")]
    UnknownEncoding(String),
}
