use crate::config::SymbolDomain;
use crate::error::{Error, Result};
use crate::tree::Node;

/// Per-symbol occurrence counts over a fixed domain.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    domain: SymbolDomain,
    counts: Vec<u64>,
}

impl SymbolTable {
    pub fn new(domain: SymbolDomain) -> Self {
        Self {
            domain,
            counts: vec![0; domain.size()],
        }
    }

    /// Counts every byte of `input` in a single pass.
    ///
    /// Fails on the first byte outside the domain; the table is left
    /// untouched in that case.
    pub fn count_from(&mut self, input: &[u8]) -> Result<()> {
        if let Some(offset) = input.iter().position(|&b| !self.domain.contains(b)) {
            return Err(Error::OutOfDomainSymbol {
                value: input[offset],
                offset,
            });
        }

        for &b in input {
            self.counts[usize::from(b)] += 1;
        }

        Ok(())
    }

    pub fn domain(&self) -> SymbolDomain {
        self.domain
    }

    pub fn frequency(&self, symbol: u8) -> u64 {
        self.counts.get(usize::from(symbol)).copied().unwrap_or(0)
    }

    /// Number of symbols seen at least once.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Fresh leaf nodes for every symbol with a non-zero count, in symbol order.
    pub fn leaves(&self) -> impl Iterator<Item = Node> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(symbol, &count)| Node::leaf(symbol as u8, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let t = SymbolTable::new(SymbolDomain::Ascii);
        assert_eq!(t.distinct(), 0);
        assert_eq!(t.leaves().count(), 0);
    }

    #[test]
    fn counts_each_symbol() {
        let mut t = SymbolTable::new(SymbolDomain::Ascii);
        t.count_from(b"aaabbc").unwrap();

        assert_eq!(t.frequency(b'a'), 3);
        assert_eq!(t.frequency(b'b'), 2);
        assert_eq!(t.frequency(b'c'), 1);
        assert_eq!(t.frequency(b'd'), 0);
        assert_eq!(t.distinct(), 3);

        let weights: Vec<_> = t.leaves().map(|n| (n.symbol(), n.weight())).collect();
        assert_eq!(
            weights,
            vec![(Some(b'a'), 3), (Some(b'b'), 2), (Some(b'c'), 1)]
        );
    }

    #[test]
    fn rejects_out_of_domain_byte() {
        let mut t = SymbolTable::new(SymbolDomain::Ascii);
        let err = t.count_from(&[b'x', b'y', 0xC3, b'z']).unwrap_err();

        assert!(matches!(
            err,
            Error::OutOfDomainSymbol {
                value: 0xC3,
                offset: 2
            }
        ));
        assert_eq!(t.distinct(), 0);
    }

    #[test]
    fn byte_domain_accepts_everything() {
        let mut t = SymbolTable::new(SymbolDomain::Byte);
        let all: Vec<u8> = (0..=255).collect();
        t.count_from(&all).unwrap();

        assert_eq!(t.distinct(), 256);
        assert_eq!(t.frequency(255), 1);
    }
}
