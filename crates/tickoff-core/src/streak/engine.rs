//! Daily completion streak engine.
//!
//! Pure decision logic over calendar days. The engine never reads the
//! clock and never touches storage: callers pass the resolved `today` and
//! persist the returned record themselves.
//!
//! Transitions of `current_streak` per completion, by `delta` days since the
//! last completion:
//!
//! ```text
//!   no prior completion  -> 1
//!   delta == 0           -> unchanged
//!   delta == 1           -> previous + 1
//!   delta >= 2           -> 1
//!   delta <  0           -> see BackdatePolicy
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StreakError;

/// Per-user streak bookkeeping, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub user_id: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completed_day: Option<NaiveDate>,
    pub total_completed: u64,
}

impl StreakRecord {
    /// Zero record used the first time a user is seen.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            current_streak: 0,
            longest_streak: 0,
            last_completed_day: None,
            total_completed: 0,
        }
    }
}

/// Read-only projection shown to the user.
///
/// `current` is soft-expired: it reads 0 once a full day has been missed,
/// even though the stored record keeps the old value until the next
/// completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakView {
    pub current: u32,
    pub longest: u32,
    #[serde(rename = "totalTasks")]
    pub total_completed: u64,
    #[serde(rename = "lastCompleted")]
    pub last_completed_day: Option<NaiveDate>,
}

/// What to do with a completion dated before the last recorded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackdatePolicy {
    /// Count the completion in the total, leave the streak and last day alone.
    #[default]
    CountOnly,
    /// Refuse the event.
    Reject,
}

/// Signed number of calendar days from `earlier` to `later`.
pub fn day_difference(later: NaiveDate, earlier: NaiveDate) -> i64 {
    later.signed_duration_since(earlier).num_days()
}

/// Streak state machine.
#[derive(Debug, Clone, Default)]
pub struct StreakEngine {
    backdate_policy: BackdatePolicy,
}

impl StreakEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backdate_policy(backdate_policy: BackdatePolicy) -> Self {
        Self { backdate_policy }
    }

    pub fn backdate_policy(&self) -> BackdatePolicy {
        self.backdate_policy
    }

    /// Apply one completion event on `today` and return the next record.
    ///
    /// # Errors
    /// Returns [`StreakError::Backdated`] when `today` precedes the last
    /// completion day and the policy is [`BackdatePolicy::Reject`].
    pub fn record_completion(
        &self,
        record: &StreakRecord,
        today: NaiveDate,
    ) -> Result<StreakRecord, StreakError> {
        let mut next = record.clone();
        next.total_completed = next.total_completed.saturating_add(1);

        let Some(last) = record.last_completed_day else {
            next.current_streak = 1;
            next.longest_streak = next.longest_streak.max(1);
            next.last_completed_day = Some(today);
            debug!(user_id = %record.user_id, %today, "first completion");
            return Ok(next);
        };

        let delta = day_difference(today, last);
        match delta {
            0 => {}
            1 => {
                next.current_streak = next.current_streak.saturating_add(1);
                next.last_completed_day = Some(today);
            }
            d if d > 1 => {
                next.current_streak = 1;
                next.last_completed_day = Some(today);
            }
            _ => match self.backdate_policy {
                BackdatePolicy::CountOnly => {}
                BackdatePolicy::Reject => {
                    return Err(StreakError::Backdated { today, last });
                }
            },
        }
        next.longest_streak = next.longest_streak.max(next.current_streak);

        debug!(
            user_id = %record.user_id,
            %today,
            delta,
            current = next.current_streak,
            longest = next.longest_streak,
            total = next.total_completed,
            "completion recorded"
        );
        Ok(next)
    }

    /// Project `record` for display on `today` without mutating it.
    pub fn view_status(&self, record: &StreakRecord, today: NaiveDate) -> StreakView {
        let expired = record
            .last_completed_day
            .is_some_and(|last| day_difference(today, last) > 1);

        StreakView {
            current: if expired { 0 } else { record.current_streak },
            longest: record.longest_streak,
            total_completed: record.total_completed,
            last_completed_day: record.last_completed_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn d0() -> NaiveDate {
        day(2024, 5, 10)
    }

    fn plus(days: i64) -> NaiveDate {
        d0() + chrono::Duration::days(days)
    }

    #[test]
    fn test_day_difference() {
        assert_eq!(day_difference(day(2024, 5, 11), day(2024, 5, 10)), 1);
        assert_eq!(day_difference(day(2024, 5, 10), day(2024, 5, 10)), 0);
        assert_eq!(day_difference(day(2024, 5, 8), day(2024, 5, 10)), -2);
        // Month, leap-day and year boundaries
        assert_eq!(day_difference(day(2024, 3, 1), day(2024, 2, 28)), 2);
        assert_eq!(day_difference(day(2023, 3, 1), day(2023, 2, 28)), 1);
        assert_eq!(day_difference(day(2025, 1, 1), day(2024, 12, 31)), 1);
    }

    #[test]
    fn test_first_completion() {
        let engine = StreakEngine::new();
        let rec = engine
            .record_completion(&StreakRecord::new("u1"), d0())
            .unwrap();

        assert_eq!(rec.current_streak, 1);
        assert_eq!(rec.longest_streak, 1);
        assert_eq!(rec.total_completed, 1);
        assert_eq!(rec.last_completed_day, Some(d0()));
    }

    #[test]
    fn test_first_completion_keeps_higher_longest() {
        // A record imported with history but no last day.
        let engine = StreakEngine::new();
        let mut rec = StreakRecord::new("u1");
        rec.longest_streak = 7;
        let rec = engine.record_completion(&rec, d0()).unwrap();
        assert_eq!(rec.current_streak, 1);
        assert_eq!(rec.longest_streak, 7);
    }

    #[test]
    fn test_scenario_sequence() {
        let engine = StreakEngine::new();
        let rec = StreakRecord::new("u1");

        // Day D: first completion
        let rec = engine.record_completion(&rec, d0()).unwrap();
        assert_eq!((rec.current_streak, rec.longest_streak, rec.total_completed), (1, 1, 1));

        // Day D again: second task on the same day
        let rec = engine.record_completion(&rec, d0()).unwrap();
        assert_eq!((rec.current_streak, rec.longest_streak, rec.total_completed), (1, 1, 2));
        assert_eq!(rec.last_completed_day, Some(d0()));

        // D+1: consecutive
        let rec = engine.record_completion(&rec, plus(1)).unwrap();
        assert_eq!((rec.current_streak, rec.longest_streak, rec.total_completed), (2, 2, 3));
        assert_eq!(rec.last_completed_day, Some(plus(1)));

        // Query on D+2: not yet expired
        let view = engine.view_status(&rec, plus(2));
        assert_eq!(view.current, 2);

        // Query on D+3: expired in the view, stored value untouched
        let view = engine.view_status(&rec, plus(3));
        assert_eq!(view.current, 0);
        assert_eq!(rec.current_streak, 2);

        // D+3 completion after missing D+2: reset
        let rec = engine.record_completion(&rec, plus(3)).unwrap();
        assert_eq!((rec.current_streak, rec.longest_streak, rec.total_completed), (1, 2, 4));
        assert_eq!(rec.last_completed_day, Some(plus(3)));
    }

    #[test]
    fn test_long_run_updates_longest() {
        let engine = StreakEngine::new();
        let mut rec = StreakRecord::new("u1");
        for i in 0..10 {
            rec = engine.record_completion(&rec, plus(i)).unwrap();
        }
        assert_eq!(rec.current_streak, 10);
        assert_eq!(rec.longest_streak, 10);

        rec = engine.record_completion(&rec, plus(20)).unwrap();
        assert_eq!(rec.current_streak, 1);
        assert_eq!(rec.longest_streak, 10);

        for i in 21..25 {
            rec = engine.record_completion(&rec, plus(i)).unwrap();
        }
        assert_eq!(rec.current_streak, 5);
        assert_eq!(rec.longest_streak, 10);
        assert_eq!(rec.total_completed, 15);
    }

    #[test]
    fn test_backdated_count_only() {
        let engine = StreakEngine::new();
        let rec = engine
            .record_completion(&StreakRecord::new("u1"), plus(5))
            .unwrap();
        let rec = engine.record_completion(&rec, plus(6)).unwrap();

        let next = engine.record_completion(&rec, plus(2)).unwrap();
        assert_eq!(next.total_completed, 3);
        assert_eq!(next.current_streak, 2);
        assert_eq!(next.longest_streak, 2);
        assert_eq!(next.last_completed_day, Some(plus(6)));
    }

    #[test]
    fn test_backdated_reject() {
        let engine = StreakEngine::with_backdate_policy(BackdatePolicy::Reject);
        let rec = engine
            .record_completion(&StreakRecord::new("u1"), plus(5))
            .unwrap();

        let err = engine.record_completion(&rec, plus(4)).unwrap_err();
        assert_eq!(
            err,
            StreakError::Backdated {
                today: plus(4),
                last: plus(5)
            }
        );
        // Same day still accepted under Reject
        assert!(engine.record_completion(&rec, plus(5)).is_ok());
    }

    #[test]
    fn test_view_without_history() {
        let engine = StreakEngine::new();
        let view = engine.view_status(&StreakRecord::new("u1"), d0());
        assert_eq!(
            view,
            StreakView {
                current: 0,
                longest: 0,
                total_completed: 0,
                last_completed_day: None,
            }
        );
    }

    #[test]
    fn test_view_same_day_and_backdated_query() {
        let engine = StreakEngine::new();
        let mut rec = StreakRecord::new("u1");
        rec.current_streak = 4;
        rec.longest_streak = 6;
        rec.total_completed = 30;
        rec.last_completed_day = Some(plus(3));

        assert_eq!(engine.view_status(&rec, plus(3)).current, 4);
        assert_eq!(engine.view_status(&rec, plus(1)).current, 4);

        let view = engine.view_status(&rec, plus(10));
        assert_eq!(view.current, 0);
        assert_eq!(view.longest, 6);
        assert_eq!(view.total_completed, 30);
        assert_eq!(view.last_completed_day, Some(plus(3)));
    }

    #[test]
    fn test_view_serializes_with_display_names() {
        let view = StreakView {
            current: 2,
            longest: 5,
            total_completed: 9,
            last_completed_day: Some(day(2024, 5, 11)),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["current"], 2);
        assert_eq!(json["longest"], 5);
        assert_eq!(json["totalTasks"], 9);
        assert_eq!(json["lastCompleted"], "2024-05-11");
    }

    #[test]
    fn test_backdate_policy_serde_names() {
        assert_eq!(
            serde_json::to_string(&BackdatePolicy::CountOnly).unwrap(),
            "\"count_only\""
        );
        let p: BackdatePolicy = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(p, BackdatePolicy::Reject);
    }

    proptest! {
        #[test]
        fn prop_total_increments_and_longest_dominates(
            gaps in proptest::collection::vec(0i64..4, 1..60)
        ) {
            let engine = StreakEngine::new();
            let mut rec = StreakRecord::new("p");
            let mut today = d0();

            for gap in gaps {
                today += chrono::Duration::days(gap);
                let prev = rec.clone();
                rec = engine.record_completion(&rec, today).unwrap();

                prop_assert_eq!(rec.total_completed, prev.total_completed + 1);
                prop_assert!(rec.longest_streak >= rec.current_streak);
                prop_assert!(rec.longest_streak >= prev.longest_streak);
                prop_assert!(rec.current_streak >= 1);

                match gap {
                    0 if prev.last_completed_day.is_some() => {
                        prop_assert_eq!(rec.current_streak, prev.current_streak);
                        prop_assert_eq!(rec.last_completed_day, prev.last_completed_day);
                    }
                    1 if prev.last_completed_day.is_some() => {
                        prop_assert_eq!(rec.current_streak, prev.current_streak + 1);
                    }
                    g if g >= 2 => prop_assert_eq!(rec.current_streak, 1),
                    _ => {}
                }
            }
        }

        #[test]
        fn prop_view_never_mutates_and_expires_after_gap(
            current in 0u32..50,
            extra in 0u32..50,
            total in 0u64..1000,
            offset in -5i64..10,
        ) {
            let engine = StreakEngine::new();
            let rec = StreakRecord {
                user_id: "p".into(),
                current_streak: current,
                longest_streak: current + extra,
                last_completed_day: Some(d0()),
                total_completed: total,
            };
            let before = rec.clone();
            let view = engine.view_status(&rec, plus(offset));

            prop_assert_eq!(&rec, &before);
            prop_assert_eq!(view.longest, rec.longest_streak);
            prop_assert_eq!(view.total_completed, total);
            if offset > 1 {
                prop_assert_eq!(view.current, 0);
            } else {
                prop_assert_eq!(view.current, current);
            }
        }
    }
}
