//! Notification gate.
//!
//! Decides, per task and per tick, which alerts still owe a delivery. The
//! invariant it protects: each alert fires at most once per task, and no
//! alert is silently skipped when ticks are infrequent.

use crate::task::{AlertKind, NotifiedFlags};

use super::classifier::Tier;

/// The least urgent tier at which an alert becomes due.
fn threshold(kind: AlertKind) -> Tier {
    match kind {
        AlertKind::Hour => Tier::Warning,
        AlertKind::ThirtyMin => Tier::Urgent,
        AlertKind::Overdue => Tier::Overdue,
    }
}

/// Alerts that should transition false -> true on this tick.
///
/// An alert is due iff its flag is still false and the task has reached its
/// threshold tier or any more urgent one. When a task skipped tiers between
/// ticks (scheduler paused, first evaluation after startup), every crossed,
/// still-unfired threshold is returned together, ordered hour -> thirtyMin ->
/// overdue. `Upcoming` and `NoDeadline` never fire. The caller persists the
/// flags it acts on.
pub fn due_alerts(flags: &NotifiedFlags, tier: Tier) -> Vec<AlertKind> {
    AlertKind::ALL
        .iter()
        .copied()
        .filter(|kind| tier >= threshold(*kind) && !flags.is_set(*kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upcoming_and_no_deadline_never_fire() {
        let flags = NotifiedFlags::default();
        assert!(due_alerts(&flags, Tier::NoDeadline).is_empty());
        assert!(due_alerts(&flags, Tier::Upcoming).is_empty());
    }

    #[test]
    fn warning_fires_hour_only() {
        let flags = NotifiedFlags::default();
        assert_eq!(due_alerts(&flags, Tier::Warning), vec![AlertKind::Hour]);
    }

    #[test]
    fn urgent_fires_hour_and_thirty_when_both_unfired() {
        let flags = NotifiedFlags::default();
        assert_eq!(
            due_alerts(&flags, Tier::Urgent),
            vec![AlertKind::Hour, AlertKind::ThirtyMin]
        );
    }

    #[test]
    fn overdue_catch_up_fires_all_three_in_order() {
        // A monitor whose first tick lands past every threshold must not
        // suppress the earlier alerts.
        let flags = NotifiedFlags::default();
        assert_eq!(
            due_alerts(&flags, Tier::Overdue),
            vec![AlertKind::Hour, AlertKind::ThirtyMin, AlertKind::Overdue]
        );
    }

    #[test]
    fn fired_flags_stay_quiet() {
        let mut flags = NotifiedFlags::default();
        flags.set(AlertKind::Hour);
        assert_eq!(due_alerts(&flags, Tier::Urgent), vec![AlertKind::ThirtyMin]);

        flags.set(AlertKind::ThirtyMin);
        assert!(due_alerts(&flags, Tier::Urgent).is_empty());
    }

    #[test]
    fn second_pass_with_same_tier_fires_nothing() {
        let mut flags = NotifiedFlags::default();
        for kind in due_alerts(&flags, Tier::Urgent) {
            flags.set(kind);
        }
        assert!(due_alerts(&flags, Tier::Urgent).is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_tier() -> impl Strategy<Value = Tier> {
            prop_oneof![
                Just(Tier::NoDeadline),
                Just(Tier::Upcoming),
                Just(Tier::Warning),
                Just(Tier::Urgent),
                Just(Tier::Overdue),
            ]
        }

        proptest! {
            /// Applying the gate's own output, then re-running it at the same
            /// or any earlier tier, yields nothing -- at-most-once delivery.
            #[test]
            fn applying_output_silences_gate(tiers in proptest::collection::vec(any_tier(), 1..8)) {
                let mut flags = NotifiedFlags::default();
                let mut highest = Tier::NoDeadline;
                for tier in tiers {
                    for kind in due_alerts(&flags, tier) {
                        flags.set(kind);
                    }
                    highest = highest.max(tier);
                    // Everything up to the highest tier seen so far has fired.
                    prop_assert!(due_alerts(&flags, highest).is_empty());
                }
            }
        }
    }
}
