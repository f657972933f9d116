//! Discretionary lane changing by the MOBIL criterion.
//!
//! MOBIL weighs the subject's own gain against the braking a change would
//! impose on the target lane's follower, discounted by a politeness
//! factor, with a constant bias towards the higher-index (right) lanes.

/// The hardest braking a change may impose on the new follower in m/s².
const SAFE_DECEL: f64 = -3.0;

/// The net advantage a change must exceed before it is committed, m/s².
const THRESHOLD: f64 = 0.1;

/// The keep-right incentive in m/s², added towards higher-index lanes.
const KEEP_RIGHT_BIAS: f64 = 0.2;

/// Seconds a vehicle must wait between consecutive lane changes.
pub(crate) const COOLDOWN: f64 = 3.0;

/// The accelerations relevant to one candidate lane, all computed with
/// the pure car-following model.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CandidateEvaluation {
    /// The subject's acceleration if it stays in its lane.
    pub current_acc: f64,
    /// The subject's acceleration after moving to the candidate lane.
    pub candidate_acc: f64,
    /// The acceleration imposed on the candidate lane's follower by the
    /// move, or `None` when that lane has no follower.
    pub new_follower_acc: Option<f64>,
    /// The change in the old follower's acceleration caused by the move.
    pub old_follower_delta: f64,
    /// Whether the candidate lane has a higher index than the current one.
    pub toward_right: bool,
}

impl CandidateEvaluation {
    /// Applies the MOBIL safety and incentive criteria.
    /// Returns the net advantage when the change should be made.
    pub fn decide(&self, politeness: f64) -> Option<f64> {
        if self.new_follower_acc.is_some_and(|acc| acc < SAFE_DECEL) {
            return None;
        }
        let bias = if self.toward_right {
            KEEP_RIGHT_BIAS
        } else {
            -KEEP_RIGHT_BIAS
        };
        let advantage =
            (self.candidate_acc - self.current_acc) + politeness * self.old_follower_delta + bias;
        (advantage > THRESHOLD).then_some(advantage)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn evaluation() -> CandidateEvaluation {
        CandidateEvaluation {
            current_acc: 0.0,
            candidate_acc: 0.0,
            new_follower_acc: None,
            old_follower_delta: 0.0,
            toward_right: false,
        }
    }

    #[test]
    fn unsafe_changes_are_vetoed() {
        let eval = CandidateEvaluation {
            candidate_acc: 5.0,
            new_follower_acc: Some(-3.5),
            toward_right: true,
            ..evaluation()
        };
        assert_eq!(eval.decide(0.0), None);

        let eval = CandidateEvaluation {
            new_follower_acc: Some(-2.9),
            candidate_acc: 5.0,
            ..eval
        };
        assert!(eval.decide(0.0).is_some());
    }

    #[test]
    fn with_zero_politeness_only_ego_benefit_counts() {
        // A large follower penalty changes nothing when politeness is zero.
        let eval = CandidateEvaluation {
            candidate_acc: 1.0,
            old_follower_delta: -100.0,
            toward_right: true,
            ..evaluation()
        };
        assert!(eval.decide(0.0).is_some());
        assert_eq!(eval.decide(1.0), None);
    }

    #[test]
    fn bias_favours_the_right_lane() {
        // An even swap passes to the right and fails to the left.
        let right = CandidateEvaluation {
            toward_right: true,
            ..evaluation()
        };
        let left = CandidateEvaluation {
            toward_right: false,
            ..evaluation()
        };
        assert!(right.decide(0.5).is_some());
        assert_eq!(left.decide(0.5), None);
    }

    #[test]
    fn marginal_gains_stay_below_the_threshold() {
        // Gain net of bias must exceed 0.1 m/s².
        let eval = CandidateEvaluation {
            candidate_acc: 0.25,
            ..evaluation()
        };
        assert_eq!(eval.decide(0.0), None);

        let eval = CandidateEvaluation {
            candidate_acc: 0.35,
            ..eval
        };
        assert!(eval.decide(0.0).is_some());
    }
}
