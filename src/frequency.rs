use crate::error::{CodecError, Result};

/// Occurrence counts for each of the 256 intensity values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
    total: u64,
}

impl FrequencyTable {
    /// Count every sample. Fails on empty input since no tree can be built from it.
    pub fn build(samples: &[u8]) -> Result<Self> {
        if samples.is_empty() {
            return Err(CodecError::EmptyInput);
        }

        let mut counts = [0u64; 256];
        for &sample in samples {
            counts[sample as usize] += 1;
        }

        Ok(FrequencyTable {
            counts,
            total: samples.len() as u64,
        })
    }

    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn distinct_symbols(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    /// Non-zero entries in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_counts() {
        let table = FrequencyTable::build(&[3, 1, 3, 255, 3]).unwrap();
        assert_eq!(table.count(3), 3);
        assert_eq!(table.count(1), 1);
        assert_eq!(table.count(255), 1);
        assert_eq!(table.count(0), 0);
        assert_eq!(table.total(), 5);
        assert_eq!(table.distinct_symbols(), 3);
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![(1, 1), (3, 3), (255, 1)]);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(FrequencyTable::build(&[]), Err(CodecError::EmptyInput)));
    }
}
