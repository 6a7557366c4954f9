use std::io::{self, Read};

use crate::code::CodeTable;

/// Byte counts for one input, iterated in ascending symbol order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
}

impl FrequencyTable {
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &byte in data {
            counts[byte as usize] += 1;
        }
        Self { counts }
    }

    /// Drains `reader`, counting every byte it yields.
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut counts = [0u64; 256];
        let mut buf = [0u8; 8192];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            for &byte in &buf[..n] {
                counts[byte as usize] += 1;
            }
        }
        Ok(Self { counts })
    }

    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Present symbols with their counts, lowest symbol first.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(symbol, count)| (symbol as u8, *count))
    }

    /// Number of distinct symbols seen.
    pub fn len(&self) -> usize {
        self.counts.iter().filter(|c| **c > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|c| *c == 0)
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Exact number of bits the input occupies once packed with `codes`,
    /// before padding.
    pub fn encoded_bits(&self, codes: &CodeTable) -> u64 {
        self.iter()
            .map(|(symbol, count)| {
                let len = codes.get(symbol).map_or(0, |code| code.len() as u64);
                count * len
            })
            .sum()
    }
}

impl FromIterator<(u8, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (u8, u64)>>(iter: I) -> Self {
        let mut counts = [0u64; 256];
        for (symbol, count) in iter {
            counts[symbol as usize] += count;
        }
        Self { counts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_byte_once() {
        let table = FrequencyTable::from_bytes(b"abracadabra");
        assert_eq!(table.get(b'a'), 5);
        assert_eq!(table.get(b'b'), 2);
        assert_eq!(table.get(b'r'), 2);
        assert_eq!(table.get(b'c'), 1);
        assert_eq!(table.get(b'd'), 1);
        assert_eq!(table.get(b'z'), 0);
        assert_eq!(table.len(), 5);
        assert_eq!(table.total(), 11);
    }

    #[test]
    fn iterates_in_ascending_symbol_order() {
        let table = FrequencyTable::from_bytes(&[0xff, 0x00, 0x7f, 0x00, 0x41]);
        let symbols: Vec<u8> = table.iter().map(|(s, _)| s).collect();
        assert_eq!(symbols, vec![0x00, 0x41, 0x7f, 0xff]);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = FrequencyTable::from_bytes(&[]);
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.iter().count(), 0);
    }

    #[test]
    fn reader_matches_slice() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i * 31 % 251) as u8).collect();
        let from_reader = FrequencyTable::from_reader(io::Cursor::new(&data)).unwrap();
        assert_eq!(from_reader, FrequencyTable::from_bytes(&data));
    }

    #[test]
    fn collects_from_pairs() {
        let table: FrequencyTable = [(b'A', 5), (b'B', 9)].into_iter().collect();
        assert_eq!(table.get(b'A'), 5);
        assert_eq!(table.get(b'B'), 9);
        assert_eq!(table.total(), 14);
    }
}
