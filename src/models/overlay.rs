use super::hours::WeekSchedule;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Own,
    Overlaid { snapshot: WeekSchedule },
}

/// Shows either an entity's own hours or a copy of its parent's hours
/// (a staff member following the business's hours), and restores the own
/// hours exactly when the overlay is switched off.
///
/// Edits made while overlaid apply to the copy and are discarded on `disable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleOverlay {
    current: WeekSchedule,
    mode: Mode,
}

impl ScheduleOverlay {
    pub fn new(own: WeekSchedule) -> Self {
        Self {
            current: own,
            mode: Mode::Own,
        }
    }

    pub fn is_overlaid(&self) -> bool {
        matches!(self.mode, Mode::Overlaid { .. })
    }

    pub fn current(&self) -> &WeekSchedule {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut WeekSchedule {
        &mut self.current
    }

    pub fn into_current(self) -> WeekSchedule {
        self.current
    }

    /// Re-enabling while overlaid refreshes from `parent` but keeps the first snapshot.
    pub fn enable(&mut self, parent: &WeekSchedule) {
        let shown = std::mem::replace(&mut self.current, parent.clone());
        if let Mode::Own = self.mode {
            self.mode = Mode::Overlaid { snapshot: shown };
        }
    }

    pub fn disable(&mut self) {
        if let Mode::Overlaid { snapshot } = std::mem::replace(&mut self.mode, Mode::Own) {
            self.current = snapshot;
        }
    }

    pub fn set(&mut self, overlaid: bool, parent: &WeekSchedule) {
        if overlaid {
            self.enable(parent);
        } else {
            self.disable();
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;
    use crate::models::hours::{DaySchedule, TimeOfDay};

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn own_week() -> WeekSchedule {
        let mut week = WeekSchedule::default();
        week.set_day(
            Weekday::Mon,
            DaySchedule::open(t("08:15"), t("14:00")).with_break(t("11:00"), t("11:20")),
        );
        week.set_day(Weekday::Sat, DaySchedule::open(t("10:00"), t("12:00")));
        week
    }

    fn business_week() -> WeekSchedule {
        let mut week = WeekSchedule::default();
        week.set_day(Weekday::Mon, DaySchedule::open(t("09:00"), t("18:00")));
        week.copy_day(
            Weekday::Mon,
            &[Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
        );
        week
    }

    #[test]
    fn test_starts_own() {
        let overlay = ScheduleOverlay::new(own_week());
        assert!(!overlay.is_overlaid());
        assert_eq!(*overlay.current(), own_week());
    }

    #[test]
    fn test_enable_shows_parent() {
        let mut overlay = ScheduleOverlay::new(own_week());
        overlay.enable(&business_week());
        assert!(overlay.is_overlaid());
        assert_eq!(*overlay.current(), business_week());
    }

    #[test]
    fn test_on_then_off_restores_exactly() {
        let mut overlay = ScheduleOverlay::new(own_week());
        overlay.enable(&business_week());
        overlay.disable();
        assert!(!overlay.is_overlaid());
        assert_eq!(*overlay.current(), own_week());
    }

    #[test]
    fn test_edits_while_overlaid_are_discarded() {
        let mut overlay = ScheduleOverlay::new(own_week());
        overlay.enable(&business_week());
        overlay
            .current_mut()
            .set_day(Weekday::Sun, DaySchedule::open(t("10:00"), t("11:00")));
        overlay.disable();
        assert_eq!(overlay.into_current(), own_week());
    }

    #[test]
    fn test_double_enable_keeps_first_snapshot() {
        let mut overlay = ScheduleOverlay::new(own_week());
        overlay.enable(&business_week());
        overlay.enable(&WeekSchedule::default());
        assert_eq!(*overlay.current(), WeekSchedule::default());
        overlay.disable();
        assert_eq!(*overlay.current(), own_week());
    }

    #[test]
    fn test_disable_when_own_is_noop() {
        let mut overlay = ScheduleOverlay::new(own_week());
        overlay.disable();
        assert_eq!(*overlay.current(), own_week());
    }

    #[test]
    fn test_set_toggles() {
        let mut overlay = ScheduleOverlay::new(own_week());
        overlay.set(true, &business_week());
        assert!(overlay.is_overlaid());
        overlay.set(false, &business_week());
        assert_eq!(*overlay.current(), own_week());
    }
}
