use serde::{Deserialize, Serialize};
use std::fmt;

/// The set of byte values a codec accepts as symbols.
///
/// The domain is not recorded in the compressed file, so both ends of a
/// round trip must agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolDomain {
    /// 7-bit values `0..=127`, 16-byte code fields, 1-byte table size.
    #[default]
    Ascii,
    /// Every byte value, 32-byte code fields, 2-byte table size.
    Byte,
}

impl SymbolDomain {
    pub fn size(self) -> usize {
        match self {
            SymbolDomain::Ascii => 128,
            SymbolDomain::Byte => 256,
        }
    }

    pub fn contains(self, value: u8) -> bool {
        usize::from(value) < self.size()
    }

    /// Width of the sentinel-delimited code field, in bytes.
    pub fn code_field_len(self) -> usize {
        self.size() / 8
    }

    /// Width of the leading table size field, in bytes.
    pub fn table_size_len(self) -> usize {
        match self {
            SymbolDomain::Ascii => 1,
            SymbolDomain::Byte => 2,
        }
    }

    /// Bytes taken by one `(symbol, code field)` table entry.
    pub fn entry_len(self) -> usize {
        1 + self.code_field_len()
    }

    pub fn header_len(self, table_size: usize) -> usize {
        self.table_size_len() + self.entry_len() * table_size
    }
}

impl fmt::Display for SymbolDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolDomain::Ascii => f.write_str("ascii"),
            SymbolDomain::Byte => f.write_str("byte"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub domain: SymbolDomain,
}

impl CodecConfig {
    pub fn new(domain: SymbolDomain) -> Self {
        Self { domain }
    }
}
