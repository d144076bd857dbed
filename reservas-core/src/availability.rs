//! Slot-availability calculator.
//!
//! Every availability decision reduces to one predicate on half-open
//! intervals: `candidate.start < existing.end && candidate.end > existing.start`.
//! Hour buttons, coworking periods and free-range selections all go through it.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use reservas_shared::Reservation;
use serde::Serialize;
use tracing::warn;

use crate::{CoreError, CoreResult};

/// Half-open `[start, end)` interval. Construction rejects `end <= start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> CoreResult<Self> {
        if end <= start {
            return Err(CoreError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// The one-hour slot starting at `hour:00` on `date`.
    pub fn hour(date: NaiveDate, hour: u32) -> CoreResult<Self> {
        let start = date
            .and_hms_opt(hour, 0, 0)
            .ok_or(CoreError::HourOutOfRange(hour))?;
        Self::new(start, start + Duration::hours(1))
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        overlaps(self, other)
    }
}

/// True iff any part of `candidate` falls inside `existing`. Touching edges do not overlap.
pub fn overlaps(candidate: &Interval, existing: &Interval) -> bool {
    candidate.start < existing.end && candidate.end > existing.start
}

/// The occupied intervals of one space.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    taken: Vec<Interval>,
}

impl Occupancy {
    /// Reservations with an unreadable time, or whose end is not after their
    /// start, occupy nothing.
    pub fn from_reservations(reservations: &[Reservation]) -> Self {
        let taken = reservations
            .iter()
            .filter_map(|r| {
                let Some((start, end)) = r.bounds() else {
                    warn!("Ignoring reservation {} without a readable start and end", r.id);
                    return None;
                };
                match Interval::new(start, end) {
                    Ok(interval) => Some(interval),
                    Err(_) => {
                        warn!("Ignoring reservation {} with empty or inverted interval", r.id);
                        None
                    }
                }
            })
            .collect();
        Self { taken }
    }

    pub fn is_occupied(&self, candidate: &Interval) -> bool {
        self.taken.iter().any(|existing| overlaps(candidate, existing))
    }

    pub fn vet(&self, candidate: &Interval) -> CoreResult<()> {
        if self.is_occupied(candidate) {
            return Err(CoreError::SlotOccupied);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourSlot {
    pub hour: u32,
    pub label: String,
    pub available: bool,
}

/// One button per hour in `first_hour..=last_hour`.
pub fn hour_grid(date: NaiveDate, first_hour: u32, last_hour: u32, occupancy: &Occupancy) -> Vec<HourSlot> {
    (first_hour..=last_hour)
        .filter_map(|hour| {
            let slot = Interval::hour(date, hour).ok()?;
            Some(HourSlot {
                hour,
                label: format!("{hour:02}:00"),
                available: !occupancy.is_occupied(&slot),
            })
        })
        .collect()
}

/// Named preset booking window offered instead of hour buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoworkingPeriod {
    pub id: u8,
    pub name: &'static str,
    pub start_hour: u32,
    pub end_hour: u32,
}

pub const PERIODS: [CoworkingPeriod; 4] = [
    CoworkingPeriod { id: 0, name: "Mañana", start_hour: 7, end_hour: 12 },
    CoworkingPeriod { id: 1, name: "Mañana", start_hour: 13, end_hour: 17 },
    CoworkingPeriod { id: 2, name: "Mañana-Tarde", start_hour: 7, end_hour: 17 },
    CoworkingPeriod { id: 3, name: "Tarde-Noche", start_hour: 17, end_hour: 22 },
];

impl CoworkingPeriod {
    pub fn find(id: u8) -> CoreResult<Self> {
        PERIODS
            .iter()
            .copied()
            .find(|p| p.id == id)
            .ok_or(CoreError::UnknownPeriod(id))
    }

    pub fn interval_on(&self, date: NaiveDate) -> CoreResult<Interval> {
        let at = |hour: u32| {
            NaiveTime::from_hms_opt(hour, 0, 0)
                .map(|t| date.and_time(t))
                .ok_or(CoreError::HourOutOfRange(hour))
        };
        Interval::new(at(self.start_hour)?, at(self.end_hour)?)
    }

    pub fn label(&self) -> String {
        format!("{:02}:00 - {:02}:00", self.start_hour, self.end_hour)
    }
}

/// `max - min + 1 == count`. The empty set counts as contiguous.
pub fn is_consecutive(hours: &BTreeSet<u32>) -> bool {
    match (hours.first(), hours.last()) {
        (Some(min), Some(max)) => u64::from(*max) - u64::from(*min) + 1 == hours.len() as u64,
        _ => true,
    }
}

/// Hours toggled by the operator. Always contiguous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HourSelection {
    hours: BTreeSet<u32>,
}

impl HourSelection {
    /// Adds `hour` if absent, removes it if present.
    ///
    /// Adding is rejected when the result would not be contiguous. Removing is
    /// only allowed at either end of the run, for the same reason.
    pub fn toggle(&mut self, hour: u32) -> CoreResult<()> {
        if self.hours.contains(&hour) {
            if self.first() != Some(hour) && self.last() != Some(hour) {
                return Err(CoreError::WouldSplitSelection);
            }
            self.hours.remove(&hour);
            return Ok(());
        }

        let mut candidate = self.hours.clone();
        candidate.insert(hour);
        if !is_consecutive(&candidate) {
            return Err(CoreError::NonConsecutiveHours);
        }
        self.hours = candidate;
        Ok(())
    }

    pub fn contains(&self, hour: u32) -> bool {
        self.hours.contains(&hour)
    }

    pub fn first(&self) -> Option<u32> {
        self.hours.first().copied()
    }

    pub fn last(&self) -> Option<u32> {
        self.hours.last().copied()
    }

    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    pub fn clear(&mut self) {
        self.hours.clear();
    }

    /// From the first selected hour to one hour past the last.
    pub fn window(&self, date: NaiveDate) -> CoreResult<Option<Interval>> {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return Ok(None);
        };
        let start = Interval::hour(date, first)?.start;
        let end = Interval::hour(date, last)?.end;
        Interval::new(start, end).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn span(from: u32, to: u32) -> Interval {
        let d = day();
        Interval::new(d.and_hms_opt(from, 0, 0).unwrap(), d.and_hms_opt(to, 0, 0).unwrap()).unwrap()
    }

    fn reservation(id: &str, from: u32, to: u32) -> Reservation {
        let d = day();
        Reservation {
            id: id.to_string(),
            title: "ocupado".into(),
            description: None,
            status: None,
            owner: None,
            space: None,
            start: d.and_hms_opt(from, 0, 0),
            end: d.and_hms_opt(to, 0, 0),
        }
    }

    #[test]
    fn test_overlap_cases() {
        // disjoint
        assert!(!overlaps(&span(7, 8), &span(9, 10)));
        // touching edges
        assert!(!overlaps(&span(8, 9), &span(9, 10)));
        assert!(!overlaps(&span(10, 11), &span(9, 10)));
        // partial
        assert!(overlaps(&span(8, 10), &span(9, 11)));
        // fully contained, either way round
        assert!(overlaps(&span(9, 10), &span(8, 12)));
        assert!(overlaps(&span(8, 12), &span(9, 10)));
        // identical
        assert!(overlaps(&span(9, 10), &span(9, 10)));
    }

    #[test]
    fn test_overlap_matches_predicate_exhaustively() {
        for a0 in 7..20 {
            for a1 in (a0 + 1)..21 {
                for b0 in 7..20 {
                    for b1 in (b0 + 1)..21 {
                        let (a, b) = (span(a0, a1), span(b0, b1));
                        assert_eq!(overlaps(&a, &b), a0 < b1 && a1 > b0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_degenerate_intervals_rejected() {
        let d = day();
        let at = d.and_hms_opt(9, 0, 0).unwrap();
        assert!(matches!(Interval::new(at, at), Err(CoreError::InvalidInterval { .. })));
        assert!(Interval::new(at, at - Duration::hours(1)).is_err());
    }

    #[test]
    fn test_occupancy_skips_inverted_reservations() {
        let mut broken = reservation("bad", 10, 10);
        broken.end = broken.start.map(|s| s - Duration::hours(2));
        let mut blank = reservation("blank", 8, 12);
        blank.start = None;
        let occupancy = Occupancy::from_reservations(&[broken, blank, reservation("ok", 13, 15)]);

        assert!(!occupancy.is_occupied(&span(8, 12)));
        assert!(occupancy.is_occupied(&span(14, 15)));
        assert_eq!(occupancy.vet(&span(12, 13)), Ok(()));
        assert_eq!(occupancy.vet(&span(12, 14)), Err(CoreError::SlotOccupied));
    }

    #[test]
    fn test_hour_grid_marks_occupied_hours() {
        let occupancy = Occupancy::from_reservations(&[reservation("r", 9, 11)]);
        let grid = hour_grid(day(), 7, 21, &occupancy);

        assert_eq!(grid.len(), 15);
        assert_eq!(grid[0].label, "07:00");
        assert_eq!(grid.last().unwrap().label, "21:00");
        let busy: Vec<u32> = grid.iter().filter(|s| !s.available).map(|s| s.hour).collect();
        assert_eq!(busy, vec![9, 10]);
    }

    #[test]
    fn test_consecutive_rule() {
        let set = |hs: &[u32]| hs.iter().copied().collect::<BTreeSet<u32>>();
        assert!(is_consecutive(&set(&[9, 10, 11])));
        assert!(is_consecutive(&set(&[14])));
        assert!(!is_consecutive(&set(&[9, 11])));
        assert!(!is_consecutive(&set(&[7, 8, 10])));
        assert!(!is_consecutive(&set(&[0, u32::MAX])));
        assert!(is_consecutive(&set(&[u32::MAX - 1, u32::MAX])));
    }

    #[test]
    fn test_toggle_far_hours_does_not_overflow() {
        let mut sel = HourSelection::default();
        sel.toggle(0).unwrap();
        assert_eq!(sel.toggle(u32::MAX), Err(CoreError::NonConsecutiveHours));
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn test_selection_toggling() {
        let mut sel = HourSelection::default();
        sel.toggle(10).unwrap();
        sel.toggle(9).unwrap();
        sel.toggle(11).unwrap();
        assert_eq!(sel.len(), 3);

        assert_eq!(sel.toggle(13), Err(CoreError::NonConsecutiveHours));
        assert_eq!(sel.toggle(10), Err(CoreError::WouldSplitSelection));
        assert_eq!(sel.len(), 3);

        sel.toggle(9).unwrap();
        assert_eq!((sel.first(), sel.last()), (Some(10), Some(11)));
    }

    #[test]
    fn test_selection_window_ends_past_last_hour() {
        let mut sel = HourSelection::default();
        assert_eq!(sel.window(day()).unwrap(), None);

        sel.toggle(9).unwrap();
        sel.toggle(10).unwrap();
        assert_eq!(sel.window(day()).unwrap(), Some(span(9, 11)));
    }

    #[test]
    fn test_periods() {
        let morning = CoworkingPeriod::find(0).unwrap();
        assert_eq!(morning.interval_on(day()).unwrap(), span(7, 12));
        assert_eq!(CoworkingPeriod::find(3).unwrap().label(), "17:00 - 22:00");
        assert_eq!(CoworkingPeriod::find(9), Err(CoreError::UnknownPeriod(9)));
    }
}
