use crate::registry::Registry;
use chrono::{Duration, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;

/// Per-reminder "done" markers. The stored value is the reset boundary
/// the completion is satisfied through: a marker is live for exactly as
/// long as it stays strictly ahead of the reminder's most recent
/// boundary.
pub type StatusMap = BTreeMap<String, NaiveDateTime>;

/// The most recent reset boundary at or before `now`: today at
/// `reset_hour:reset_minute` once that time has passed, otherwise
/// yesterday's.
pub fn most_recent_boundary(
    reset_hour: u32,
    reset_minute: u32,
    now: NaiveDateTime,
) -> NaiveDateTime {
    let reset = NaiveTime::from_hms_opt(reset_hour, reset_minute, 0).unwrap_or(NaiveTime::MIN);
    let candidate = now.date().and_time(reset);
    if now < candidate {
        candidate - Duration::days(1)
    } else {
        candidate
    }
}

/// The boundary a completion marked at `now` is satisfied through.
pub fn next_boundary(reset_hour: u32, reset_minute: u32, now: NaiveDateTime) -> NaiveDateTime {
    most_recent_boundary(reset_hour, reset_minute, now) + Duration::days(1)
}

/// Drops every marker that belongs to a past cycle, plus markers for
/// names no longer present in the registry. Returns whether anything
/// changed so callers can skip the save when nothing did. Idempotent.
pub fn reconcile(registry: &Registry, status: &mut StatusMap, now: NaiveDateTime) -> bool {
    let mut changed = false;
    status.retain(|name, marker| {
        let live = registry
            .get(name)
            .map(|def| *marker > most_recent_boundary(def.reset_hour, def.reset_minute, now))
            .unwrap_or(false);
        if !live {
            changed = true;
        }
        live
    });
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ReminderDef;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .expect("valid date")
            .and_hms_opt(h, mi, 0)
            .expect("valid time")
    }

    fn registry() -> Registry {
        Registry::from_defs(vec![
            ReminderDef {
                name: "HSR".to_string(),
                reset_hour: 3,
                reset_minute: 0,
            },
            ReminderDef {
                name: "GFL2".to_string(),
                reset_hour: 15,
                reset_minute: 0,
            },
        ])
        .expect("valid defs")
    }

    #[test]
    fn boundary_before_reset_hour_falls_on_previous_day() {
        let now = at(2026, 8, 7, 2, 0);
        assert_eq!(most_recent_boundary(3, 0, now), at(2026, 8, 6, 3, 0));
    }

    #[test]
    fn boundary_after_reset_hour_falls_on_same_day() {
        let now = at(2026, 8, 7, 4, 0);
        assert_eq!(most_recent_boundary(3, 0, now), at(2026, 8, 7, 3, 0));
    }

    #[test]
    fn boundary_at_exact_reset_instant_is_that_instant() {
        let now = at(2026, 8, 7, 3, 0);
        assert_eq!(most_recent_boundary(3, 0, now), now);
    }

    #[test]
    fn boundary_honours_reset_minute() {
        let now = at(2026, 8, 7, 3, 15);
        assert_eq!(most_recent_boundary(3, 30, now), at(2026, 8, 6, 3, 30));
        assert_eq!(most_recent_boundary(3, 10, now), at(2026, 8, 7, 3, 10));
    }

    #[test]
    fn next_boundary_is_one_day_past_most_recent() {
        let now = at(2026, 8, 7, 10, 0);
        assert_eq!(next_boundary(3, 0, now), at(2026, 8, 8, 3, 0));
        let before = at(2026, 8, 7, 2, 0);
        assert_eq!(next_boundary(3, 0, before), at(2026, 8, 7, 3, 0));
    }

    #[test]
    fn boundary_crosses_month_end() {
        let now = at(2026, 3, 1, 1, 0);
        assert_eq!(most_recent_boundary(3, 0, now), at(2026, 2, 28, 3, 0));
    }

    #[test]
    fn reconcile_keeps_current_cycle_markers() {
        let registry = registry();
        let now = at(2026, 8, 7, 10, 0);
        let mut status = StatusMap::new();
        status.insert("HSR".to_string(), next_boundary(3, 0, now));

        assert!(!reconcile(&registry, &mut status, now));
        assert!(status.contains_key("HSR"));
    }

    #[test]
    fn reconcile_clears_markers_after_rollover() {
        let registry = registry();
        let marked_at = at(2026, 8, 7, 10, 0);
        let mut status = StatusMap::new();
        status.insert("HSR".to_string(), next_boundary(3, 0, marked_at));

        let later = at(2026, 8, 8, 3, 1);
        assert!(reconcile(&registry, &mut status, later));
        assert!(status.is_empty());
    }

    #[test]
    fn reconcile_treats_marker_equal_to_boundary_as_stale() {
        let registry = registry();
        let mut status = StatusMap::new();
        status.insert("HSR".to_string(), at(2026, 8, 8, 3, 0));

        // Exactly at the boundary the new cycle has begun.
        let now = at(2026, 8, 8, 3, 0);
        assert!(reconcile(&registry, &mut status, now));
        assert!(status.is_empty());
    }

    #[test]
    fn reconcile_only_touches_rolled_over_reminders() {
        let registry = registry();
        // 04:00: HSR (reset 03:00) has rolled over since yesterday's mark,
        // GFL2 (reset 15:00) has not.
        let yesterday = at(2026, 8, 6, 20, 0);
        let mut status = StatusMap::new();
        status.insert("HSR".to_string(), next_boundary(3, 0, yesterday));
        status.insert("GFL2".to_string(), next_boundary(15, 0, yesterday));

        let now = at(2026, 8, 7, 4, 0);
        assert!(reconcile(&registry, &mut status, now));
        assert!(!status.contains_key("HSR"));
        assert!(status.contains_key("GFL2"));
    }

    #[test]
    fn reconcile_drops_entries_for_unknown_names() {
        let registry = registry();
        let now = at(2026, 8, 7, 10, 0);
        let mut status = StatusMap::new();
        status.insert("Deleted".to_string(), next_boundary(3, 0, now));

        assert!(reconcile(&registry, &mut status, now));
        assert!(status.is_empty());
    }

    #[test]
    fn reconcile_is_idempotent() {
        let registry = registry();
        let now = at(2026, 8, 8, 3, 1);
        let mut status = StatusMap::new();
        status.insert("HSR".to_string(), at(2026, 8, 8, 3, 0));
        status.insert("GFL2".to_string(), at(2026, 8, 8, 15, 0));

        reconcile(&registry, &mut status, now);
        let settled = status.clone();
        assert!(!reconcile(&registry, &mut status, now));
        assert_eq!(status, settled);
    }
}
