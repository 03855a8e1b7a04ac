use bitvec::prelude::*;
use log::{debug, trace};

use crate::config::{CodecConfig, SymbolDomain};
use crate::error::{Error, Result};
use crate::format::{pack_payload, split_trailer, Header, TableEntry};
use crate::symbol_table::SymbolTable;
use crate::tree::{build_tree, emission_order, CodeTable, Node};

/// Width of the repeat count stored as the payload of a single-symbol file.
const REPEAT_COUNT_LEN: usize = 8;

/// Maps symbols to their codes and concatenates them into a bit stream.
#[derive(Debug, Clone)]
pub struct Encoder {
    encode_table: CodeTable,
}

impl Encoder {
    pub fn new(root: &Node) -> Self {
        Self {
            encode_table: root.assign_codes(),
        }
    }

    pub fn code_table(&self) -> &CodeTable {
        &self.encode_table
    }

    pub fn encode(&self, input: &[u8]) -> Result<BitVec<u8, Msb0>> {
        let mut out = BitVec::new();
        for (offset, s) in input.iter().enumerate() {
            let code = self
                .encode_table
                .get(s)
                .ok_or(Error::OutOfDomainSymbol { value: *s, offset })?;
            out.extend_from_bitslice(code);
        }

        Ok(out)
    }
}

/// Walks a tree rebuilt from stored codes, one bit at a time.
#[derive(Debug, Clone)]
pub struct Decoder {
    root: Node,
}

impl Decoder {
    /// Replays every stored code as a path from an empty root.
    pub fn from_header(header: &Header) -> Result<Self> {
        let mut root = Node::empty();
        for entry in &header.entries {
            root.insert_path(entry.symbol, &entry.code)?;
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn decode(&self, input: &BitSlice<u8, Msb0>) -> Result<Vec<u8>> {
        let mut out = Vec::new();

        let mut cursor = &self.root;
        let mut depth = 0;
        for (i, bit) in input.iter().by_vals().enumerate() {
            cursor = cursor.child(bit).ok_or_else(|| {
                Error::CorruptTree(format!("bit {i} follows a branch that does not exist"))
            })?;
            depth += 1;

            if let Some(sym) = cursor.symbol() {
                out.push(sym);
                cursor = &self.root;
                depth = 0;
            }
        }

        if depth != 0 {
            return Err(Error::CorruptTree(format!(
                "payload ends {depth} bits into a code"
            )));
        }

        Ok(out)
    }
}

/// Static Huffman compressor and decompressor for one symbol domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> CodecConfig {
        self.config
    }

    fn domain(&self) -> SymbolDomain {
        self.config.domain
    }

    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let domain = self.domain();

        let mut table = SymbolTable::new(domain);
        table.count_from(input)?;
        trace!(
            "frequencies: {:?}",
            table
                .leaves()
                .filter_map(|n| Some((n.symbol()?, n.weight())))
                .collect::<Vec<_>>()
        );

        let Some(root) = build_tree(&table) else {
            let mut out = Vec::with_capacity(domain.header_len(0) + 1);
            Header::default().write(domain, &mut out);
            out.push(0);
            debug!("compressed empty input into {} bytes", out.len());
            return Ok(out);
        };

        let encoder = Encoder::new(&root);
        let codes = encoder.code_table();
        trace!("codes: {codes:?}");

        let header = Header {
            entries: emission_order(&table)
                .filter_map(|leaf| {
                    let symbol = leaf.symbol()?;
                    Some(TableEntry {
                        symbol,
                        code: codes.get(&symbol)?.clone(),
                    })
                })
                .collect(),
        };

        let (payload, padding) = if root.is_leaf() {
            // a lone code is empty, so only the repeat count is stored
            ((input.len() as u64).to_be_bytes().to_vec(), 0)
        } else {
            pack_payload(encoder.encode(input)?)
        };

        let mut out = Vec::with_capacity(header.encoded_len(domain) + payload.len() + 1);
        header.write(domain, &mut out);
        out.extend_from_slice(&payload);
        out.push(padding);

        debug!(
            "compressed {} bytes into {} ({} symbols, {} padding bits)",
            input.len(),
            out.len(),
            header.entries.len(),
            padding
        );

        Ok(out)
    }

    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let domain = self.domain();

        let header = Header::parse(input, domain)?;
        let (payload, padding) = split_trailer(&input[header.encoded_len(domain)..])?;

        if header.entries.is_empty() {
            if !payload.is_empty() {
                return Err(Error::CorruptHeader(format!(
                    "empty code table followed by {} payload bytes",
                    payload.len()
                )));
            }
            debug!("decompressed empty file");
            return Ok(Vec::new());
        }

        let decoder = Decoder::from_header(&header)?;
        let out = match decoder.root().symbol() {
            Some(symbol) => repeat_symbol(symbol, payload, padding)?,
            None => {
                let bits = payload.view_bits::<Msb0>();
                decoder.decode(&bits[..bits.len() - usize::from(padding)])?
            }
        };

        debug!(
            "decompressed {} bytes into {} ({} symbols, {} padding bits)",
            input.len(),
            out.len(),
            header.entries.len(),
            padding
        );

        Ok(out)
    }
}

fn repeat_symbol(symbol: u8, payload: &[u8], padding: u8) -> Result<Vec<u8>> {
    let count: [u8; REPEAT_COUNT_LEN] = payload.try_into().map_err(|_| {
        Error::CorruptHeader(format!(
            "single-symbol payload is {} bytes, expected {REPEAT_COUNT_LEN}",
            payload.len()
        ))
    })?;
    if padding != 0 {
        return Err(Error::CorruptHeader(format!(
            "single-symbol payload carries {padding} padding bits"
        )));
    }

    let count = u64::from_be_bytes(count);
    let len = usize::try_from(count)
        .ok()
        .filter(|&len| len <= isize::MAX as usize)
        .ok_or_else(|| {
            Error::CorruptHeader(format!("single-symbol repeat count {count} is too large"))
        })?;

    let mut out = Vec::new();
    out.try_reserve_exact(len).map_err(|e| {
        Error::CorruptHeader(format!(
            "single-symbol repeat count {count} cannot be allocated: {e}"
        ))
    })?;
    out.resize(len, symbol);

    Ok(out)
}
