use crate::dates::format_day_month_year;
use crate::error::ShiftError;
use crate::models::{IdGenerator, NewShift, Shift, ShiftType};
use crate::storage::{load_or, save_logged, Storage, SHIFTS_KEY};
use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use std::rc::Rc;
use tracing::debug;

pub const WEEK_DAYS: [&str; 7] = [
    "Domingo",
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
];

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Hours between two `HH:MM` times. An end before the start runs past midnight.
pub fn shift_hours(start: &str, end: &str) -> Option<f64> {
    let start = parse_time(start)?;
    let end = parse_time(end)?;
    let mut minutes = end.signed_duration_since(start).num_minutes();
    if minutes < 0 {
        minutes += 24 * 60;
    }
    Some(minutes as f64 / 60.0)
}

// Sunday-based week shown by the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Week {
    start: NaiveDate,
}

impl Week {
    pub fn containing(day: NaiveDate) -> Week {
        let offset = day.weekday().num_days_from_sunday();
        Week {
            start: day - Days::new(u64::from(offset)),
        }
    }

    pub fn start(self) -> NaiveDate {
        self.start
    }

    pub fn dates(self) -> [NaiveDate; 7] {
        std::array::from_fn(|i| self.start + Days::new(i as u64))
    }

    pub fn previous(self) -> Week {
        Week {
            start: self.start - Days::new(7),
        }
    }

    pub fn next(self) -> Week {
        Week {
            start: self.start + Days::new(7),
        }
    }

    pub fn label(self) -> String {
        format!(
            "{} - {}",
            format_day_month_year(self.start),
            format_day_month_year(self.start + Days::new(6))
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShiftStats {
    pub assigned: usize,
    pub weekly_hours: f64,
    pub morning: usize,
}

pub struct ShiftStore {
    shifts: Vec<Shift>,
    storage: Rc<dyn Storage>,
    ids: IdGenerator,
}

impl ShiftStore {
    pub fn load(storage: Rc<dyn Storage>) -> ShiftStore {
        let shifts: Vec<Shift> = load_or(storage.as_ref(), SHIFTS_KEY, Vec::new);
        debug!(count = shifts.len(), "shifts loaded");
        ShiftStore {
            shifts,
            storage,
            ids: IdGenerator::default(),
        }
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn get(&self, id: &str) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.id == id)
    }

    /// Appends a shift after checking its employee, day and times.
    pub fn add_shift(&mut self, new_shift: NewShift) -> Result<Shift, ShiftError> {
        if new_shift.employee_id.trim().is_empty() {
            return Err(ShiftError::MissingEmployee);
        }
        if usize::from(new_shift.day) >= WEEK_DAYS.len() {
            return Err(ShiftError::InvalidDay(new_shift.day));
        }
        for time in [&new_shift.start_time, &new_shift.end_time] {
            if parse_time(time).is_none() {
                return Err(ShiftError::InvalidTime(time.clone()));
            }
        }

        let shift = new_shift.into_shift(self.ids.next_id());
        let mut shifts = self.shifts.clone();
        shifts.push(shift.clone());
        self.replace(shifts);
        Ok(shift)
    }

    pub fn delete_shift(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let shifts = self.shifts.iter().filter(|s| s.id != id).cloned().collect();
        self.replace(shifts);
        true
    }

    pub fn shifts_for_day(&self, day: u8) -> Vec<&Shift> {
        self.shifts.iter().filter(|s| s.day == day).collect()
    }

    pub fn total_hours_for_employee(&self, employee_id: &str) -> f64 {
        self.shifts
            .iter()
            .filter(|s| s.employee_id == employee_id)
            .filter_map(|s| shift_hours(&s.start_time, &s.end_time))
            .sum()
    }

    pub fn stats(&self) -> ShiftStats {
        ShiftStats {
            assigned: self.shifts.len(),
            weekly_hours: self
                .shifts
                .iter()
                .filter_map(|s| shift_hours(&s.start_time, &s.end_time))
                .sum(),
            morning: self
                .shifts
                .iter()
                .filter(|s| s.shift_type == ShiftType::Morning)
                .count(),
        }
    }

    fn replace(&mut self, shifts: Vec<Shift>) {
        self.shifts = shifts;
        save_logged(self.storage.as_ref(), SHIFTS_KEY, &self.shifts);
    }
}
