//! Visibility evaluator
//!
//! Pure predicate over (viewport width, current time, rule). An absent rule
//! means visible. Device and schedule constraints are AND'ed when both are
//! present. The host re-evaluates on viewport resize, not on content change.

use chrono::{DateTime, Utc};

use crate::models::{DeviceClass, VisibilityRule};

/// Decide whether a block renders at all.
pub fn should_show(
    rule: Option<&VisibilityRule>,
    viewport_width: u32,
    now: DateTime<Utc>,
) -> bool {
    let Some(rule) = rule else {
        return true;
    };

    if !rule.devices.is_empty() {
        let device = DeviceClass::classify(viewport_width);
        if !rule.devices.contains(&device) {
            return false;
        }
    }

    if let Some(schedule) = &rule.schedule {
        if let Some(start) = schedule.start_date {
            if now < start {
                return false;
            }
        }
        if let Some(end) = schedule.end_date {
            if now > end {
                return false;
            }
        }
    }

    true
}
