//! Byte layout of a compressed file.
//!
//! ```text
//! table size | (symbol, code field) * table size | payload | padding count
//! ```
//!
//! A code field is `domain.size()` bits wide: a run of zeros, one sentinel
//! `1` bit, then the code itself, so codes of any length up to
//! `domain.size() - 1` bits fit without a separate length.

use bitvec::prelude::*;

use crate::config::SymbolDomain;
use crate::error::{Error, Result};
use crate::tree::Code;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub symbol: u8,
    pub code: Code,
}

/// The code table at the front of a compressed file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    pub entries: Vec<TableEntry>,
}

impl Header {
    pub fn encoded_len(&self, domain: SymbolDomain) -> usize {
        domain.header_len(self.entries.len())
    }

    pub fn write(&self, domain: SymbolDomain, out: &mut Vec<u8>) {
        let table_size = self.entries.len();
        match domain {
            SymbolDomain::Ascii => out.push(table_size as u8),
            SymbolDomain::Byte => out.extend_from_slice(&(table_size as u16).to_be_bytes()),
        }

        for entry in &self.entries {
            out.push(entry.symbol);
            out.extend_from_slice(&pack_code(&entry.code, domain));
        }
    }

    /// Reads the code table from the front of `input`, which must also hold
    /// at least the trailing padding byte past the table.
    pub fn parse(input: &[u8], domain: SymbolDomain) -> Result<Self> {
        let size_len = domain.table_size_len();
        if input.len() < size_len {
            return Err(Error::UnderflowPayload {
                expected: domain.header_len(0) + 1,
                actual: input.len(),
            });
        }

        let table_size = match domain {
            SymbolDomain::Ascii => usize::from(input[0]),
            SymbolDomain::Byte => usize::from(u16::from_be_bytes([input[0], input[1]])),
        };
        if table_size > domain.size() {
            return Err(Error::CorruptHeader(format!(
                "table lists {table_size} symbols but the {domain} domain only has {}",
                domain.size()
            )));
        }

        let header_len = domain.header_len(table_size);
        if input.len() < header_len + 1 {
            return Err(Error::UnderflowPayload {
                expected: header_len + 1,
                actual: input.len(),
            });
        }

        let mut seen = vec![false; domain.size()];
        let entries = input[size_len..header_len]
            .chunks_exact(domain.entry_len())
            .map(|chunk| {
                let symbol = chunk[0];
                if !domain.contains(symbol) {
                    return Err(Error::CorruptHeader(format!(
                        "symbol {symbol:#04x} is outside the {domain} domain"
                    )));
                }
                if std::mem::replace(&mut seen[usize::from(symbol)], true) {
                    return Err(Error::CorruptHeader(format!(
                        "symbol {symbol:#04x} appears twice in the table"
                    )));
                }

                Ok(TableEntry {
                    symbol,
                    code: unpack_code(&chunk[1..])?,
                })
            })
            .collect::<Result<_>>()?;

        Ok(Self { entries })
    }
}

/// Left-pads `code` with zeros and a sentinel `1` to the domain's field width.
pub(crate) fn pack_code(code: &BitSlice<u8, Msb0>, domain: SymbolDomain) -> Vec<u8> {
    let width = domain.code_field_len() * 8;
    debug_assert!(code.len() < width, "code of {} bits overflows field", code.len());

    let mut field = BitVec::<u8, Msb0>::repeat(false, width - 1 - code.len());
    field.push(true);
    field.extend_from_bitslice(code);
    field.into_vec()
}

/// Strips the zero run and sentinel bit from a code field.
pub fn unpack_code(field: &[u8]) -> Result<Code> {
    let bits = field.view_bits::<Msb0>();
    let sentinel = bits
        .first_one()
        .ok_or_else(|| Error::CorruptHeader("code field has no sentinel bit".to_owned()))?;

    Ok(bits[sentinel + 1..].to_bitvec())
}

/// Zero-pads `bits` to a whole number of bytes, returning the bytes and how
/// many padding bits were added.
pub(crate) fn pack_payload(mut bits: BitVec<u8, Msb0>) -> (Vec<u8>, u8) {
    let padding = (8 - bits.len() % 8) % 8;
    bits.resize(bits.len() + padding, false);
    (bits.into_vec(), padding as u8)
}

/// Splits the bytes after the header into payload and padding count.
pub(crate) fn split_trailer(body: &[u8]) -> Result<(&[u8], u8)> {
    let (&padding, payload) = body.split_last().ok_or(Error::UnderflowPayload {
        expected: 1,
        actual: 0,
    })?;

    if padding > 7 {
        return Err(Error::CorruptHeader(format!(
            "padding count {padding} is larger than 7"
        )));
    }
    if payload.is_empty() && padding != 0 {
        return Err(Error::CorruptHeader(format!(
            "padding count {padding} with an empty payload"
        )));
    }

    Ok((payload, padding))
}
