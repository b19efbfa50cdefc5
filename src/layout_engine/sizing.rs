//! Proportional sizing along a row or column axis.
//!
//! Shares are percentages of the parent along its axis. Pixel lengths are
//! handed out in proportion to the shares, except that no child goes below
//! its minimum.

use crate::model::tree::NodeId;

/// Tolerance used when checking that shares add up to 100.
pub const SHARE_EPSILON: f64 = 0.01;

/// A corrected share for one child, produced when minimum sizes forced the
/// pixel layout away from the stored proportions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShareUpdate {
    pub node: NodeId,
    pub share: f64,
}

/// Splits `available` pixels between children with the given shares.
///
/// Children whose proportional length would fall below their minimum are
/// pinned to it and the remainder is shared among the rest. When the minimums
/// alone exceed `available`, every child gets exactly its minimum and the
/// overflow is tolerated.
pub fn distribute(available: f64, shares: &[f64], mins: &[f64]) -> Vec<f64> {
    debug_assert_eq!(shares.len(), mins.len());
    let n = shares.len();
    if n == 0 {
        return vec![];
    }
    let total_min: f64 = mins.iter().sum();
    if total_min >= available {
        return mins.to_vec();
    }

    let shares: Vec<f64> = if shares.iter().sum::<f64>() > 0.0 {
        shares.iter().map(|s| s.max(0.0)).collect()
    } else {
        vec![1.0; n]
    };

    let mut pinned = vec![false; n];
    loop {
        let free_len = available
            - (0..n).filter(|&i| pinned[i]).map(|i| mins[i]).sum::<f64>();
        let free_share: f64 = (0..n).filter(|&i| !pinned[i]).map(|i| shares[i]).sum();
        if free_share <= 0.0 {
            break;
        }
        let mut changed = false;
        for i in 0..n {
            if !pinned[i] && free_len * shares[i] / free_share < mins[i] {
                pinned[i] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let free_len = available - (0..n).filter(|&i| pinned[i]).map(|i| mins[i]).sum::<f64>();
    let free_share: f64 = (0..n).filter(|&i| !pinned[i]).map(|i| shares[i]).sum();
    (0..n)
        .map(|i| {
            if pinned[i] {
                mins[i]
            } else if free_share > 0.0 {
                free_len * shares[i] / free_share
            } else {
                0.0
            }
        })
        .collect()
}

/// Rewrites `shares` so they follow the pixel `lens` while keeping their
/// total. Only children whose share actually moves are reported.
pub fn shares_following(nodes: &[NodeId], shares: &[f64], lens: &[f64]) -> Vec<ShareUpdate> {
    let total_share: f64 = shares.iter().sum();
    let total_len: f64 = lens.iter().sum();
    if total_len <= 0.0 || total_share <= 0.0 {
        return vec![];
    }
    nodes
        .iter()
        .zip(shares)
        .zip(lens)
        .filter_map(|((&node, &old), &len)| {
            let share = total_share * len / total_len;
            ((share - old).abs() > 1e-9).then_some(ShareUpdate { node, share })
        })
        .collect()
}

/// Resolves the sizes given in a loaded layout into shares summing to 100.
///
/// Unspecified sizes split what the specified ones leave of 100. If the
/// specified sizes already exceed 100, the unspecified ones count as 50 each
/// and everything is normalized.
pub fn relative_sizes(specified: &[Option<f64>]) -> Vec<f64> {
    if specified.is_empty() {
        return vec![];
    }
    let total: f64 = specified.iter().flatten().sum();
    let unspecified = specified.iter().filter(|s| s.is_none()).count();

    if (total - 100.0).abs() < SHARE_EPSILON && unspecified == 0 {
        return specified.iter().map(|s| s.unwrap_or(0.0)).collect();
    }
    if total < 100.0 && unspecified > 0 {
        let each = (100.0 - total) / unspecified as f64;
        return specified.iter().map(|s| s.unwrap_or(each)).collect();
    }

    let filled: Vec<f64> = specified.iter().map(|s| s.unwrap_or(50.0)).collect();
    let sum: f64 = filled.iter().sum();
    if sum <= 0.0 {
        let each = 100.0 / specified.len() as f64;
        return vec![each; specified.len()];
    }
    filled.iter().map(|s| s / sum * 100.0).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn approx(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{actual:?} vs {expected:?}");
        }
    }

    mod distribute {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn follows_shares_when_minimums_fit() {
            approx(&distribute(300.0, &[50.0, 25.0, 25.0], &[10.0, 10.0, 10.0]), &[
                150.0, 75.0, 75.0,
            ]);
        }

        #[test]
        fn pins_children_below_their_minimum() {
            // The second child would get 20px but needs 60.
            let lens = distribute(200.0, &[90.0, 10.0], &[0.0, 60.0]);
            approx(&lens, &[140.0, 60.0]);
        }

        #[test]
        fn pinning_cascades() {
            let lens = distribute(100.0, &[80.0, 10.0, 10.0], &[0.0, 20.0, 15.0]);
            approx(&lens, &[65.0, 20.0, 15.0]);
        }

        #[test]
        fn overflow_lays_out_at_minimums() {
            approx(&distribute(50.0, &[50.0, 50.0], &[40.0, 30.0]), &[40.0, 30.0]);
        }

        #[test]
        fn zero_shares_split_evenly() {
            approx(&distribute(100.0, &[0.0, 0.0], &[0.0, 0.0]), &[50.0, 50.0]);
        }

        #[test]
        fn empty() {
            assert!(distribute(100.0, &[], &[]).is_empty());
        }
    }

    mod shares_following {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn keeps_the_total_and_reports_only_changes() {
            let nodes = [NodeId::default(), NodeId::default()];
            let updates = shares_following(&nodes, &[90.0, 10.0], &[140.0, 60.0]);
            assert_eq!(updates.len(), 2);
            assert!((updates[0].share - 70.0).abs() < 1e-9);
            assert!((updates[1].share - 30.0).abs() < 1e-9);

            assert!(shares_following(&nodes, &[50.0, 50.0], &[100.0, 100.0]).is_empty());
        }
    }

    mod relative_sizes {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn unspecified_share_the_rest() {
            approx(&relative_sizes(&[Some(40.0), None, None]), &[40.0, 30.0, 30.0]);
            approx(&relative_sizes(&[None, None, None, None]), &[25.0; 4]);
        }

        #[test]
        fn exact_totals_are_kept() {
            approx(&relative_sizes(&[Some(30.0), Some(70.0)]), &[30.0, 70.0]);
        }

        #[test]
        fn oversized_totals_are_normalized() {
            approx(&relative_sizes(&[Some(100.0), Some(100.0)]), &[50.0, 50.0]);
            // 150 specified plus 50 for the unspecified one.
            approx(&relative_sizes(&[Some(150.0), None]), &[75.0, 25.0]);
        }

        #[test]
        fn undersized_totals_without_gaps_are_normalized() {
            approx(&relative_sizes(&[Some(20.0), Some(30.0)]), &[40.0, 60.0]);
        }
    }
}
