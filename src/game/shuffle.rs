//! Per-set statement shuffle

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::StatementSet;
use crate::{Result, TtalError};

/// A statement set as shown to the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedSet {
    display_order: Vec<String>,
    lie_display_index: usize,
}

impl PresentedSet {
    pub fn statements(&self) -> &[String] {
        &self.display_order
    }

    pub fn lie_display_index(&self) -> usize {
        self.lie_display_index
    }

    pub fn lie(&self) -> &str {
        &self.display_order[self.lie_display_index]
    }

    pub fn len(&self) -> usize {
        self.display_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display_order.is_empty()
    }
}

/// Shuffle the statements uniformly and relocate the lie by value.
///
/// Statements within a set must be distinct for the relocation to be
/// unambiguous; catalogs are validated for this at load time.
pub fn shuffle_for_set<R: Rng + ?Sized>(set: &StatementSet, rng: &mut R) -> Result<PresentedSet> {
    let lie = set.lie().ok_or_else(|| {
        TtalError::InvalidCatalog(format!("lie_index {} is out of range", set.lie_index))
    })?;

    let mut display_order = set.statements.clone();
    display_order.shuffle(rng);

    let lie_display_index = display_order
        .iter()
        .position(|s| s == lie)
        .ok_or_else(|| TtalError::InvalidCatalog(format!("lie \"{}\" lost in shuffle", lie)))?;

    Ok(PresentedSet {
        display_order,
        lie_display_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_shuffle_keeps_statements_and_lie() {
        let set = StatementSet::new(["Water boils at 100C", "The moon is cheese", "Cats purr"], 1);
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..1000 {
            let presented = shuffle_for_set(&set, &mut rng).unwrap();
            let mut shown = presented.statements().to_vec();
            shown.sort();
            let mut original = set.statements.clone();
            original.sort();
            assert_eq!(shown, original);
            assert_eq!(presented.lie(), "The moon is cheese");
        }
    }

    #[test]
    fn test_every_position_is_reachable() {
        let set = StatementSet::new(["a", "b", "c"], 0);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut seen = [0usize; 3];

        for _ in 0..3000 {
            let presented = shuffle_for_set(&set, &mut rng).unwrap();
            seen[presented.lie_display_index()] += 1;
        }

        // Roughly uniform: each position near 1000
        for count in seen {
            assert!(count > 800 && count < 1200, "skewed distribution: {:?}", seen);
        }
    }

    #[test]
    fn test_out_of_range_lie_is_rejected() {
        let set = StatementSet::new(["a", "b", "c"], 4);
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(matches!(
            shuffle_for_set(&set, &mut rng),
            Err(TtalError::InvalidCatalog(_))
        ));
    }
}
