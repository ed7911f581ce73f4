//! Aggregate ("other") component ledger: integer quantities moved between
//! per-status buckets.

use crate::domain::model::{AggregateComponent, BucketMove, BucketStatus, Buckets};
use crate::utils::error::TransitionError;

/// Directed transition table. Not symmetric.
pub fn permitted_targets(from: BucketStatus) -> &'static [BucketStatus] {
    match from {
        BucketStatus::Planning => &[BucketStatus::Manufactured, BucketStatus::Rejected],
        BucketStatus::Manufactured => &[
            BucketStatus::Transported,
            BucketStatus::Rejected,
            BucketStatus::Planning,
        ],
        BucketStatus::Transported => &[
            BucketStatus::Rejected,
            BucketStatus::Manufactured,
            BucketStatus::Planning,
        ],
        BucketStatus::Rejected => &[BucketStatus::Planning],
    }
}

pub fn is_permitted(from: BucketStatus, to: BucketStatus) -> bool {
    permitted_targets(from).contains(&to)
}

/// Parse a quantity typed into a form. Only whole positive numbers pass.
pub fn parse_quantity(raw: &str) -> Result<u64, TransitionError> {
    let invalid = || TransitionError::InvalidQuantity {
        quantity: raw.to_string(),
    };
    let quantity: i64 = raw.trim().parse().map_err(|_| invalid())?;
    if quantity <= 0 {
        return Err(invalid());
    }
    Ok(quantity as u64)
}

/// Validate and apply a move, returning the new bucket state. The ledger
/// passed in is never modified.
///
/// `manufactured -> transported` adds to `transported` without taking from
/// `manufactured`: along that path the manufactured bucket counts everything
/// ever produced. Every other path depletes its source bucket.
pub fn move_quantity(
    ledger: &AggregateComponent,
    from: BucketStatus,
    to: BucketStatus,
    quantity: i64,
) -> Result<Buckets, TransitionError> {
    if quantity <= 0 {
        return Err(TransitionError::InvalidQuantity {
            quantity: quantity.to_string(),
        });
    }
    let quantity = quantity as u64;

    let available = ledger.statuses.get(from);
    if quantity > available {
        return Err(TransitionError::InsufficientQuantity {
            status: from,
            requested: quantity,
            available,
        });
    }

    if !is_permitted(from, to) {
        return Err(TransitionError::InvalidTransition { from, to });
    }

    let mut statuses = ledger.statuses.clone();
    let keeps_source = from == BucketStatus::Manufactured && to == BucketStatus::Transported;
    if !keeps_source {
        statuses.set(from, available.saturating_sub(quantity));
    }
    let target = statuses
        .get(to)
        .checked_add(quantity)
        .ok_or(TransitionError::CountOverflow { status: to })?;
    statuses.set(to, target);

    Ok(statuses)
}

/// `move_quantity` for an already-built [`BucketMove`].
pub fn apply(ledger: &AggregateComponent, movement: BucketMove) -> Result<Buckets, TransitionError> {
    let quantity = i64::try_from(movement.quantity).map_err(|_| TransitionError::InvalidQuantity {
        quantity: movement.quantity.to_string(),
    })?;
    move_quantity(ledger, movement.from_status, movement.to_status, quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(planning: u64, manufactured: u64, transported: u64, rejected: u64) -> AggregateComponent {
        AggregateComponent {
            id: "7".to_string(),
            name: "Anchor bolt M16".to_string(),
            total: planning + manufactured + transported + rejected,
            statuses: Buckets::new()
                .with(BucketStatus::Planning, planning)
                .with(BucketStatus::Manufactured, manufactured)
                .with(BucketStatus::Transported, transported)
                .with(BucketStatus::Rejected, rejected),
        }
    }

    #[test]
    fn test_planning_to_manufactured() {
        let start = ledger(10, 0, 0, 0);
        let statuses = move_quantity(&start, BucketStatus::Planning, BucketStatus::Manufactured, 4).unwrap();

        assert_eq!(statuses.get(BucketStatus::Planning), 6);
        assert_eq!(statuses.get(BucketStatus::Manufactured), 4);
        assert_eq!(statuses.get(BucketStatus::Transported), 0);
        assert_eq!(statuses.get(BucketStatus::Rejected), 0);
        assert_eq!(start.statuses.get(BucketStatus::Planning), 10);
    }

    #[test]
    fn test_manufactured_to_transported_keeps_manufactured() {
        let start = ledger(0, 5, 2, 0);
        let statuses =
            move_quantity(&start, BucketStatus::Manufactured, BucketStatus::Transported, 3).unwrap();

        assert_eq!(statuses.get(BucketStatus::Manufactured), 5);
        assert_eq!(statuses.get(BucketStatus::Transported), 5);
    }

    #[test]
    fn test_other_paths_conserve_total() {
        let start = ledger(4, 5, 3, 2);
        for from in BucketStatus::ALL {
            for &to in permitted_targets(from) {
                if from == BucketStatus::Manufactured && to == BucketStatus::Transported {
                    continue;
                }
                let statuses = move_quantity(&start, from, to, 1).unwrap();
                assert_eq!(statuses.sum(), Some(start.total), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_manufactured_to_rejected_depletes_manufactured() {
        let start = ledger(0, 5, 0, 0);
        let statuses = move_quantity(&start, BucketStatus::Manufactured, BucketStatus::Rejected, 2).unwrap();
        assert_eq!(statuses.get(BucketStatus::Manufactured), 3);
        assert_eq!(statuses.get(BucketStatus::Rejected), 2);
    }

    #[test]
    fn test_target_overflow_is_refused() {
        let start = AggregateComponent {
            id: "7".to_string(),
            name: "Anchor bolt M16".to_string(),
            total: u64::MAX,
            statuses: Buckets::new()
                .with(BucketStatus::Planning, 5)
                .with(BucketStatus::Manufactured, u64::MAX),
        };
        assert_eq!(
            move_quantity(&start, BucketStatus::Planning, BucketStatus::Manufactured, 5),
            Err(TransitionError::CountOverflow {
                status: BucketStatus::Manufactured
            })
        );
    }

    #[test]
    fn test_invalid_quantity() {
        let start = ledger(10, 0, 0, 0);
        for quantity in [0, -3] {
            assert!(matches!(
                move_quantity(&start, BucketStatus::Planning, BucketStatus::Manufactured, quantity),
                Err(TransitionError::InvalidQuantity { .. })
            ));
        }
    }

    #[test]
    fn test_insufficient_quantity_for_every_source() {
        let start = ledger(1, 1, 1, 1);
        for from in BucketStatus::ALL {
            let to = permitted_targets(from)[0];
            assert_eq!(
                move_quantity(&start, from, to, 2),
                Err(TransitionError::InsufficientQuantity {
                    status: from,
                    requested: 2,
                    available: 1
                })
            );
        }
    }

    #[test]
    fn test_quantity_checked_before_transition() {
        let start = ledger(0, 0, 0, 1);
        assert!(matches!(
            move_quantity(&start, BucketStatus::Rejected, BucketStatus::Manufactured, 5),
            Err(TransitionError::InsufficientQuantity { .. })
        ));
    }

    #[test]
    fn test_pairs_outside_the_graph_fail() {
        let start = ledger(5, 5, 5, 5);
        let refused = [
            (BucketStatus::Rejected, BucketStatus::Manufactured),
            (BucketStatus::Rejected, BucketStatus::Transported),
            (BucketStatus::Planning, BucketStatus::Transported),
            (BucketStatus::Planning, BucketStatus::Planning),
        ];
        for (from, to) in refused {
            assert_eq!(
                move_quantity(&start, from, to, 1),
                Err(TransitionError::InvalidTransition { from, to })
            );
        }
    }

    #[test]
    fn test_rejected_back_to_planning() {
        let start = ledger(0, 0, 0, 3);
        let statuses = move_quantity(&start, BucketStatus::Rejected, BucketStatus::Planning, 3).unwrap();
        assert_eq!(statuses.get(BucketStatus::Rejected), 0);
        assert_eq!(statuses.get(BucketStatus::Planning), 3);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("4"), Ok(4));
        assert_eq!(parse_quantity(" 12 "), Ok(12));
        for raw in ["0", "-1", "2.5", "abc", ""] {
            assert_eq!(
                parse_quantity(raw),
                Err(TransitionError::InvalidQuantity {
                    quantity: raw.to_string()
                })
            );
        }
    }

    #[test]
    fn test_apply_bucket_move() {
        let start = ledger(10, 0, 0, 0);
        let statuses = apply(
            &start,
            BucketMove {
                from_status: BucketStatus::Planning,
                to_status: BucketStatus::Rejected,
                quantity: 10,
            },
        )
        .unwrap();
        assert_eq!(statuses.get(BucketStatus::Planning), 0);
        assert_eq!(statuses.get(BucketStatus::Rejected), 10);
    }
}
