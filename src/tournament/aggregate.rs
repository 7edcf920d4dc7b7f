//! Reduces judgment outcomes into a dense pairwise win-count matrix.

use std::collections::{BTreeSet, HashMap};

use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::error::TournamentError;
use super::types::Outcome;

/// `wins(i, j)` = number of outcomes in which competitor `i` beat `j`,
/// summed across attributes and repeats. Indices follow the sorted,
/// deduplicated competitor list; the diagonal is always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinCountMatrix {
    competitors: Vec<String>,
    index: HashMap<String, usize>,
    /// Row-major n×n counts.
    counts: Vec<u64>,
}

impl WinCountMatrix {
    /// Build the matrix over `competitors`. Competitors that appear in no
    /// outcome keep an all-zero row and column.
    pub fn from_outcomes<S: AsRef<str>>(
        competitors: &[S],
        outcomes: &[Outcome],
    ) -> Result<Self, TournamentError> {
        let sorted: BTreeSet<&str> = competitors.iter().map(|c| c.as_ref()).collect();
        if sorted.is_empty() {
            return Err(TournamentError::InvalidInput(
                "competitor set is empty".into(),
            ));
        }

        let competitors: Vec<String> = sorted.into_iter().map(str::to_string).collect();
        let index: HashMap<String, usize> = competitors
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        let n = competitors.len();
        let mut counts = vec![0u64; n * n];

        for outcome in outcomes {
            let w = *index
                .get(&outcome.winner)
                .ok_or_else(|| TournamentError::UnknownCompetitor(outcome.winner.clone()))?;
            let l = *index
                .get(&outcome.loser)
                .ok_or_else(|| TournamentError::UnknownCompetitor(outcome.loser.clone()))?;
            if w == l {
                return Err(TournamentError::InvalidInput(format!(
                    "outcome has '{}' as both winner and loser",
                    outcome.winner
                )));
            }
            counts[w * n + l] += 1;
        }

        Ok(Self {
            competitors,
            index,
            counts,
        })
    }

    /// Build directly from a square matrix of counts. Rows and columns must be
    /// in the order of `competitors`, which must already be sorted and unique.
    pub fn from_counts<S: AsRef<str>>(
        competitors: &[S],
        rows: &[Vec<u64>],
    ) -> Result<Self, TournamentError> {
        let names: Vec<String> = competitors.iter().map(|c| c.as_ref().to_string()).collect();
        if names.is_empty() {
            return Err(TournamentError::InvalidInput(
                "competitor set is empty".into(),
            ));
        }
        if names.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TournamentError::InvalidInput(
                "competitors must be sorted and unique".into(),
            ));
        }
        let n = names.len();
        if rows.len() != n || rows.iter().any(|r| r.len() != n) {
            return Err(TournamentError::InvalidInput(format!(
                "expected a {n}x{n} count matrix"
            )));
        }
        if (0..n).any(|i| rows[i][i] != 0) {
            return Err(TournamentError::InvalidInput(
                "diagonal win counts must be zero".into(),
            ));
        }

        let index = names
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        let counts = rows.iter().flatten().copied().collect();

        Ok(Self {
            competitors: names,
            index,
            counts,
        })
    }

    pub fn competitors(&self) -> &[String] {
        &self.competitors
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn index_of(&self, competitor: &str) -> Option<usize> {
        self.index.get(competitor).copied()
    }

    /// Times competitor `i` beat competitor `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is not below [`len`](Self::len). Use
    /// [`index_of`](Self::index_of) to map names to valid indices.
    pub fn wins(&self, i: usize, j: usize) -> u64 {
        let n = self.len();
        assert!(i < n && j < n, "index ({i}, {j}) out of range for {n} competitors");
        self.counts[i * n + j]
    }

    /// Total number of recorded outcomes.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// True when no outcome has been recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    pub fn rows(&self) -> Vec<Vec<u64>> {
        self.counts
            .chunks(self.len())
            .map(|row| row.to_vec())
            .collect()
    }
}

/// Serializes as `{ "competitors": [...], "counts": [[...], ...] }`.
impl Serialize for WinCountMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("WinCountMatrix", 2)?;
        state.serialize_field("competitors", &self.competitors)?;
        state.serialize_field("counts", &self.rows())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(w: &str, l: &str) -> Outcome {
        Outcome::new(w, l, "quality", "")
    }

    #[test]
    fn indexes_competitors_lexicographically() {
        let m = WinCountMatrix::from_outcomes(&["pear", "apple", "fig", "apple"], &[]).unwrap();
        assert_eq!(m.competitors(), ["apple", "fig", "pear"]);
        assert_eq!(m.index_of("pear"), Some(2));
        assert_eq!(m.index_of("kiwi"), None);
        assert!(m.is_empty());
    }

    #[test]
    fn counts_wins_and_keeps_diagonal_zero() {
        let outcomes = vec![
            outcome("a", "b"),
            outcome("a", "b"),
            outcome("b", "c"),
            outcome("c", "a"),
        ];
        let m = WinCountMatrix::from_outcomes(&["a", "b", "c", "d"], &outcomes).unwrap();

        assert_eq!(m.wins(0, 1), 2);
        assert_eq!(m.wins(1, 2), 1);
        assert_eq!(m.wins(2, 0), 1);
        assert_eq!(m.wins(1, 0), 0);
        assert_eq!(m.total(), outcomes.len() as u64);
        for i in 0..m.len() {
            assert_eq!(m.wins(i, i), 0);
            // "d" never appears.
            assert_eq!(m.wins(3, i), 0);
            assert_eq!(m.wins(i, 3), 0);
        }
    }

    #[test]
    fn unknown_competitor_is_rejected() {
        let err = WinCountMatrix::from_outcomes(&["a", "b"], &[outcome("a", "z")]).unwrap_err();
        assert!(matches!(err, TournamentError::UnknownCompetitor(name) if name == "z"));
    }

    #[test]
    fn self_win_is_rejected() {
        let err = WinCountMatrix::from_outcomes(&["a", "b"], &[outcome("a", "a")]).unwrap_err();
        assert!(matches!(err, TournamentError::InvalidInput(_)));
    }

    #[test]
    fn from_counts_validates_shape_and_order() {
        assert!(WinCountMatrix::from_counts(&["a", "b"], &[vec![0, 1], vec![2, 0]]).is_ok());
        assert!(WinCountMatrix::from_counts(&["b", "a"], &[vec![0, 1], vec![2, 0]]).is_err());
        assert!(WinCountMatrix::from_counts(&["a", "b"], &[vec![0, 1]]).is_err());
        assert!(WinCountMatrix::from_counts(&["a", "b"], &[vec![1, 1], vec![2, 0]]).is_err());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn wins_panics_on_out_of_range_index() {
        let m = WinCountMatrix::from_outcomes(&["a", "b"], &[]).unwrap();
        m.wins(0, 2);
    }

    #[test]
    fn serializes_competitors_and_counts() {
        let m = WinCountMatrix::from_outcomes(&["b", "a"], &[outcome("a", "b")]).unwrap();
        assert_eq!(
            serde_json::to_value(&m).unwrap(),
            serde_json::json!({ "competitors": ["a", "b"], "counts": [[0, 1], [0, 0]] })
        );
    }
}
