//! Schedule window evaluation
//!
//! A `cycle-*` policy names an on hour and an off hour. When the on hour is
//! later than the off hour the window wraps past midnight (e.g. 22 to 04),
//! and for weekday and weekly schedules the wrapped tail belongs to the day
//! the window started on, not the day it ends on.

use automanage_util::TimeContext;
use chrono::Weekday;

/// Which days a schedule window applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleKind {
    /// Every day
    Daily,
    /// Windows that open Monday to Friday
    Weekday,
    /// A window that opens on one target day
    Weekly,
}

/// Hour range `[on_hour, off_hour)`, wrapping past midnight when `on_hour > off_hour`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleWindow {
    pub on_hour: u8,
    pub off_hour: u8,
}

impl CycleWindow {
    pub fn new(on_hour: u8, off_hour: u8) -> Self {
        Self { on_hour, off_hour }
    }

    /// The window crosses midnight
    pub fn wraps(&self) -> bool {
        self.on_hour > self.off_hour
    }

    /// Equal on and off hours describe a window that is never active
    pub fn is_empty(&self) -> bool {
        self.on_hour == self.off_hour
    }

    /// Hour membership, ignoring days
    pub fn contains_hour(&self, hour: u8) -> bool {
        if self.is_empty() {
            false
        } else if self.wraps() {
            // Complement of the off period [off_hour, on_hour)
            !(self.off_hour <= hour && hour < self.on_hour)
        } else {
            self.on_hour <= hour && hour < self.off_hour
        }
    }
}

/// Decide whether `now` falls inside a schedule window.
///
/// Returns `false` when `on_hour == off_hour`; callers report that as a
/// configuration error. `target_day` is only read for [`CycleKind::Weekly`],
/// which is never active without one. Hours are expected in `0..24`; larger
/// values are compared numerically and never panic, but callers reject them
/// before getting here.
pub fn is_within_window(
    kind: CycleKind,
    on_hour: u8,
    off_hour: u8,
    target_day: Option<Weekday>,
    now: &TimeContext,
) -> bool {
    let window = CycleWindow::new(on_hour, off_hour);
    if window.is_empty() {
        return false;
    }

    let in_hours = window.contains_hour(now.hour);

    if !window.wraps() {
        return match kind {
            CycleKind::Daily => in_hours,
            CycleKind::Weekday => in_hours && now.is_weekday(),
            CycleKind::Weekly => in_hours && target_day == Some(now.day),
        };
    }

    match kind {
        CycleKind::Daily => in_hours,
        CycleKind::Weekday => match now.day {
            // Sunday night's window is not a weekday window
            Weekday::Mon => now.hour >= on_hour,
            Weekday::Tue | Weekday::Wed | Weekday::Thu | Weekday::Fri => in_hours,
            // Tail of Friday night's window
            Weekday::Sat => now.hour < off_hour,
            Weekday::Sun => false,
        },
        CycleKind::Weekly => match target_day {
            Some(target) => {
                (now.day == target && now.hour >= on_hour)
                    || (now.day == target.succ() && now.hour < off_hour)
            }
            None => false,
        },
    }
}
