use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{CodecError, Result};

/// Longest code a 256-symbol alphabet can produce, rounded up to the storage size.
pub const MAX_CODE_LEN: usize = 256;

const WORDS: usize = MAX_CODE_LEN / 64;

/// A variable-length bit string, stored MSB first.
///
/// Bits past `len` are always zero, so equal codes hash equally.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code {
    words: [u64; WORDS],
    len: u16,
}

impl Code {
    pub fn new() -> Self {
        Code::default()
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == MAX_CODE_LEN
    }

    pub fn push(&mut self, bit: bool) {
        assert!(!self.is_full(), "code longer than {} bits", MAX_CODE_LEN);
        let index = self.len();
        if bit {
            self.words[index / 64] |= 1 << (63 - index % 64);
        }
        self.len += 1;
    }

    /// Copy of this code with one more bit appended
    pub fn with_bit(mut self, bit: bool) -> Self {
        self.push(bit);
        self
    }

    pub fn bit(&self, index: usize) -> bool {
        debug_assert!(index < self.len());
        (self.words[index / 64] >> (63 - index % 64)) & 1 == 1
    }

    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len()).map(move |i| self.bit(i))
    }

    pub fn clear(&mut self) {
        *self = Code::default();
    }

    /// True when `self` is a (non-strict) prefix of `other`
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len() <= other.len() && (0..self.len()).all(|i| self.bit(i) == other.bit(i))
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({})", self)
    }
}

impl FromStr for Code {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(CodecError::invalid_code_table("empty code"));
        }
        if s.len() > MAX_CODE_LEN {
            return Err(CodecError::invalid_code_table(format!(
                "code of {} bits exceeds the {}-bit limit",
                s.len(),
                MAX_CODE_LEN
            )));
        }
        let mut code = Code::new();
        for c in s.chars() {
            match c {
                '0' => code.push(false),
                '1' => code.push(true),
                other => {
                    return Err(CodecError::invalid_code_table(format!(
                        "unexpected character {:?} in code {:?}",
                        other, s
                    )))
                }
            }
        }
        Ok(code)
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Symbol -> code mapping derived from a Huffman tree.
///
/// Serializes as a flat JSON object keyed by the symbol's decimal string,
/// e.g. `{"0": "10", "255": "0"}`. Loading rejects keys that are not plain
/// decimal (`"07"`, `"+7"`) and symbols listed twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CodeBook {
    codes: BTreeMap<u8, Code>,
}

impl CodeBook {
    pub fn new() -> Self {
        CodeBook::default()
    }

    pub fn insert(&mut self, symbol: u8, code: Code) -> Option<Code> {
        self.codes.insert(symbol, code)
    }

    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> {
        self.codes.iter().map(|(&symbol, code)| (symbol, code))
    }

    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(Code::len).max().unwrap_or(0)
    }

    /// True when no code is a prefix of another symbol's code
    pub fn is_prefix_free(&self) -> bool {
        // after sorting, any prefix sits directly before some code it prefixes
        let mut codes: Vec<&Code> = self.codes.values().collect();
        codes.sort_by(|a, b| a.bits().cmp(b.bits()));
        codes.windows(2).all(|pair| !pair[0].is_prefix_of(pair[1]))
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CodecError::invalid_code_table(e.to_string()))
    }

    pub fn reverse(&self) -> Result<ReverseCodeBook> {
        ReverseCodeBook::from_code_book(self)
    }
}

impl<'de> Deserialize<'de> for CodeBook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(CodeBookVisitor)
    }
}

struct CodeBookVisitor;

impl<'de> de::Visitor<'de> for CodeBookVisitor {
    type Value = CodeBook;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from decimal symbol to binary code string")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<CodeBook, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        let mut codes = BTreeMap::new();
        while let Some((key, code)) = map.next_entry::<String, Code>()? {
            let symbol: u8 = key.parse().map_err(|_| {
                <A::Error as de::Error>::custom(format!("symbol {:?} is not in 0-255", key))
            })?;
            if symbol.to_string() != key {
                return Err(de::Error::custom(format!(
                    "symbol {:?} is not written as plain decimal",
                    key
                )));
            }
            if codes.insert(symbol, code).is_some() {
                return Err(de::Error::custom(format!("symbol {} is listed twice", symbol)));
            }
        }
        Ok(CodeBook { codes })
    }
}

impl FromIterator<(u8, Code)> for CodeBook {
    fn from_iter<I: IntoIterator<Item = (u8, Code)>>(iter: I) -> Self {
        CodeBook {
            codes: iter.into_iter().collect(),
        }
    }
}

/// Code -> symbol lookup used by the decoder.
#[derive(Debug, Clone)]
pub struct ReverseCodeBook {
    symbols: HashMap<Code, u8>,
    max_code_len: usize,
}

impl ReverseCodeBook {
    /// Inverts a code book, rejecting empty or duplicate codes.
    ///
    /// Debug builds also reject tables that are not prefix-free.
    pub fn from_code_book(code_book: &CodeBook) -> Result<Self> {
        let mut symbols = HashMap::with_capacity(code_book.len());
        for (symbol, code) in code_book.iter() {
            if code.is_empty() {
                return Err(CodecError::invalid_code_table(format!(
                    "symbol {} has an empty code",
                    symbol
                )));
            }
            if let Some(previous) = symbols.insert(*code, symbol) {
                return Err(CodecError::invalid_code_table(format!(
                    "code {} is shared by symbols {} and {}",
                    code, previous, symbol
                )));
            }
        }
        if cfg!(debug_assertions) && !code_book.is_prefix_free() {
            return Err(CodecError::invalid_code_table("code set is not prefix-free"));
        }

        Ok(ReverseCodeBook {
            symbols,
            max_code_len: code_book.max_code_len(),
        })
    }

    pub fn get(&self, code: &Code) -> Option<u8> {
        self.symbols.get(code).copied()
    }

    pub fn max_code_len(&self) -> usize {
        self.max_code_len
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
