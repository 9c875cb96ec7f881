//! Per-position glyph tables

use rand::seq::SliceRandom;
use rand::Rng;

use super::alphabet::Alphabet;

/// One shuffled copy of the alphabet per digit, plus a shuffled
/// digit → table assignment. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionTables {
    tables: Vec<Vec<char>>,
    assignment: Vec<usize>,
}

impl PositionTables {
    /// Build tables for `digit_count` positions.
    ///
    /// Two separate shuffles: every table is an independent permutation of the
    /// alphabet, and then the order in which digits pick their table is
    /// permuted again.
    pub fn build<R: Rng + ?Sized>(alphabet: &Alphabet, digit_count: usize, rng: &mut R) -> Self {
        let tables = Self::shuffled_tables(alphabet, digit_count, rng);
        let assignment = Self::shuffled_assignment(digit_count, rng);
        Self { tables, assignment }
    }

    fn shuffled_tables<R: Rng + ?Sized>(
        alphabet: &Alphabet,
        digit_count: usize,
        rng: &mut R,
    ) -> Vec<Vec<char>> {
        (0..digit_count)
            .map(|_| {
                let mut table = alphabet.symbols().to_vec();
                table.shuffle(rng);
                table
            })
            .collect()
    }

    fn shuffled_assignment<R: Rng + ?Sized>(digit_count: usize, rng: &mut R) -> Vec<usize> {
        let mut assignment: Vec<usize> = (0..digit_count).collect();
        assignment.shuffle(rng);
        assignment
    }

    pub fn digit_count(&self) -> usize {
        self.assignment.len()
    }

    /// Table index used by each digit position
    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// Glyph table used by `digit`
    pub fn table_for(&self, digit: usize) -> &[char] {
        &self.tables[self.assignment[digit]]
    }

    /// Glyph shown for counter value `value` at position `digit`
    pub fn glyph(&self, digit: usize, value: usize) -> char {
        self.table_for(digit)[value]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sorted(chars: &[char]) -> Vec<char> {
        let mut v = chars.to_vec();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_tables_are_permutations() {
        let alphabet = Alphabet::standard();
        let mut rng = StdRng::seed_from_u64(42);
        let tables = PositionTables::build(&alphabet, 10, &mut rng);

        assert_eq!(tables.digit_count(), 10);
        for digit in 0..10 {
            assert_eq!(sorted(tables.table_for(digit)), sorted(alphabet.symbols()));
        }

        let mut assignment = tables.assignment().to_vec();
        assignment.sort_unstable();
        assert_eq!(assignment, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_seeded_build_is_reproducible() {
        let alphabet = Alphabet::standard();
        let a = PositionTables::build(&alphabet, 8, &mut StdRng::seed_from_u64(9));
        let b = PositionTables::build(&alphabet, 8, &mut StdRng::seed_from_u64(9));
        let c = PositionTables::build(&alphabet, 8, &mut StdRng::seed_from_u64(10));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_positions_get_distinct_tables() {
        let alphabet = Alphabet::standard();
        let tables = PositionTables::build(&alphabet, 6, &mut StdRng::seed_from_u64(3));
        let first = tables.table_for(0).to_vec();
        assert!((1..6).any(|d| tables.table_for(d) != first.as_slice()));
    }
}
