//! Reorder planning for ordered waypoint groups.
//!
//! Validation happens here, before any transaction starts; execution of
//! the plan is the repository's transactional concern.

use waymark_core::error::AppError;
use waymark_core::result::AppResult;

/// The validated outcome of a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderPlan {
    /// The waypoint already holds the target index; persist field changes
    /// only.
    NoOp,
    /// Move one step, swapping with the waypoint at the target index.
    Adjacent {
        /// The slot being vacated by the moving waypoint.
        vacated: i32,
        /// The slot being claimed.
        target: i32,
    },
}

/// Validates a reorder of a waypoint from `current_index` to
/// `target_index` within one ordered group.
///
/// Only single-step moves are supported: any larger jump is rejected
/// outright rather than clamped or decomposed.
pub fn plan_reorder(current_index: i32, target_index: i32) -> AppResult<ReorderPlan> {
    if target_index < 0 {
        return Err(AppError::validation("Waypoint index cannot be lower than 0"));
    }

    if current_index == target_index {
        return Ok(ReorderPlan::NoOp);
    }

    if (current_index - target_index).abs() != 1 {
        return Err(AppError::validation(
            "A waypoint index can only be increased or decreased by 1",
        ));
    }

    Ok(ReorderPlan::Adjacent {
        vacated: current_index,
        target: target_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::error::ErrorKind;

    #[test]
    fn test_same_index_is_noop() {
        assert_eq!(plan_reorder(2, 2).unwrap(), ReorderPlan::NoOp);
    }

    #[test]
    fn test_adjacent_moves() {
        assert_eq!(
            plan_reorder(1, 0).unwrap(),
            ReorderPlan::Adjacent {
                vacated: 1,
                target: 0
            }
        );
        assert_eq!(
            plan_reorder(3, 4).unwrap(),
            ReorderPlan::Adjacent {
                vacated: 3,
                target: 4
            }
        );
    }

    #[test]
    fn test_negative_target_rejected() {
        let err = plan_reorder(0, -1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_non_adjacent_rejected() {
        let err = plan_reorder(0, 3).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = plan_reorder(4, 2).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
