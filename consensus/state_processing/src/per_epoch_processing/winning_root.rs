use std::cmp::Ordering;
use types::*;

#[derive(Debug, Clone, PartialEq)]
pub struct WinningRoot {
    pub crosslink: Crosslink,
    /// Unslashed validators which voted for `crosslink.data_root`, sorted ascending.
    pub attesting_validator_indices: Vec<usize>,
    pub total_attesting_balance: u64,
}

impl WinningRoot {
    /// Returns `true` if `self` is a "better" candidate than `other`.
    ///
    /// A winning root is "better" than another if it has a higher `total_attesting_balance`. Ties
    /// are broken by favouring the lexicographically smaller `data_root`.
    pub fn is_better_than(&self, other: &Self) -> bool {
        match self
            .total_attesting_balance
            .cmp(&other.total_attesting_balance)
        {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.crosslink.data_root < other.crosslink.data_root,
        }
    }

    /// Returns `true` if the attesting balance is at least two thirds of `total_balance`.
    pub fn is_supermajority(&self, total_balance: u64) -> Result<bool, safe_arith::ArithError> {
        use safe_arith::SafeArith;

        Ok(self.total_attesting_balance.safe_mul(3)? >= total_balance.safe_mul(2)?)
    }
}

/// Returns the best candidate of `candidates`, if any.
pub fn select_winning_root<I>(candidates: I) -> Option<WinningRoot>
where
    I: IntoIterator<Item = WinningRoot>,
{
    let mut winning_root: Option<WinningRoot> = None;

    for candidate in candidates {
        if let Some(ref winner) = winning_root {
            if candidate.is_better_than(winner) {
                winning_root = Some(candidate);
            }
        } else {
            winning_root = Some(candidate);
        }
    }

    winning_root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(data_root: u8, total_attesting_balance: u64) -> WinningRoot {
        WinningRoot {
            crosslink: Crosslink {
                shard: 0,
                epoch: Epoch::new(0),
                data_root: Hash256::repeat_byte(data_root),
            },
            attesting_validator_indices: vec![],
            total_attesting_balance,
        }
    }

    #[test]
    fn is_better_than() {
        let worse = root(2, 42);

        let better = root(1, 42);
        assert!(better.is_better_than(&worse));
        assert!(!worse.is_better_than(&better));

        let better = root(3, 43);
        assert!(better.is_better_than(&worse));
        assert!(!worse.is_better_than(&worse));
    }

    #[test]
    fn tie_break_is_order_independent() {
        let a = root(7, 10);
        let b = root(5, 10);
        let c = root(9, 4);

        let forwards = select_winning_root(vec![a.clone(), b.clone(), c.clone()]);
        let backwards = select_winning_root(vec![c, b.clone(), a]);

        assert_eq!(forwards, Some(b.clone()));
        assert_eq!(backwards, Some(b));
        assert_eq!(select_winning_root(vec![]), None);
    }

    #[test]
    fn supermajority_boundary() {
        assert_eq!(root(0, 2).is_supermajority(3), Ok(true));
        assert_eq!(root(0, 1).is_supermajority(2), Ok(false));
        assert_eq!(root(0, 20).is_supermajority(30), Ok(true));
        assert_eq!(root(0, 19).is_supermajority(29), Ok(false));
        assert!(root(0, u64::MAX).is_supermajority(1).is_err());
    }
}
