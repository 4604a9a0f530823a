use anyhow::{bail, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Upper bound for the configured step; one simulated day per tick.
pub const MAX_STEP_SECS: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("Virtual clock overflowed the representable date range")]
    Overflow,
}

/// Simulated time, advanced by a fixed step once per tick. Independent of
/// wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualClock {
    current: NaiveDateTime,
    step: Duration,
}

impl VirtualClock {
    pub fn new(origin: NaiveDateTime, step: Duration) -> Self {
        Self {
            current: origin,
            step,
        }
    }

    /// Build a clock from an origin string and a step in seconds.
    pub fn from_config(origin: &str, step_secs: f64) -> Result<Self> {
        let origin = parse_origin(origin)?;
        let step = step_from_secs(step_secs)?;
        Ok(Self::new(origin, step))
    }

    pub fn now(&self) -> NaiveDateTime {
        self.current
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// The value `advance` would move to.
    pub fn next(&self) -> Result<NaiveDateTime, ClockError> {
        self.current
            .checked_add_signed(self.step)
            .ok_or(ClockError::Overflow)
    }

    pub fn advance(&mut self) -> Result<(), ClockError> {
        self.current = self.next()?;
        Ok(())
    }

    /// `anchor + k * step` for k in `0..count`.
    pub fn timestamps_from(
        &self,
        anchor: NaiveDateTime,
        count: usize,
    ) -> Result<Vec<NaiveDateTime>, ClockError> {
        let mut stamps = Vec::with_capacity(count);
        let mut current = anchor;
        for k in 0..count {
            if k > 0 {
                current = current
                    .checked_add_signed(self.step)
                    .ok_or(ClockError::Overflow)?;
            }
            stamps.push(current);
        }
        Ok(stamps)
    }
}

/// Convert a step in seconds to a whole number of microseconds, rejecting
/// steps that are non-positive, too large, or round down to zero.
pub fn step_from_secs(step_secs: f64) -> Result<Duration> {
    if !step_secs.is_finite() || step_secs <= 0.0 {
        bail!("Clock step must be positive, got {}", step_secs);
    }
    if step_secs > MAX_STEP_SECS {
        bail!(
            "Clock step must be at most {} seconds, got {}",
            MAX_STEP_SECS,
            step_secs
        );
    }

    let micros = (step_secs * 1_000_000.0).round() as i64;
    if micros == 0 {
        bail!("Clock step {} rounds to zero microseconds", step_secs);
    }
    Ok(Duration::microseconds(micros))
}

/// Accepts a bare `%H:%M:%S` (anchored at 1900-01-01) or a full
/// `%Y-%m-%d %H:%M:%S`.
pub fn parse_origin(origin: &str) -> Result<NaiveDateTime> {
    let origin = origin.trim();

    if let Ok(full) = NaiveDateTime::parse_from_str(origin, "%Y-%m-%d %H:%M:%S") {
        return Ok(full);
    }

    match NaiveTime::parse_from_str(origin, "%H:%M:%S") {
        Ok(time) => match NaiveDate::from_ymd_opt(1900, 1, 1) {
            Some(date) => Ok(date.and_time(time)),
            None => bail!("Invalid anchor date for clock origin"),
        },
        Err(e) => bail!("Invalid clock origin '{}': {}", origin, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_time() {
        let origin = parse_origin("05:00:01").unwrap();
        assert_eq!(origin.format("%H:%M:%S").to_string(), "05:00:01");
        assert_eq!(origin.format("%Y-%m-%d").to_string(), "1900-01-01");
    }

    #[test]
    fn test_parse_full_datetime() {
        let origin = parse_origin("2024-03-01 09:30:00").unwrap();
        assert_eq!(origin.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-03-01 09:30:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_origin("five o'clock").is_err());
    }

    #[test]
    fn test_advance_by_half_second() {
        let mut clock = VirtualClock::from_config("05:00:01", 0.5).unwrap();
        clock.advance().unwrap();
        clock.advance().unwrap();
        clock.advance().unwrap();
        assert_eq!(clock.now().format("%H:%M:%S%.3f").to_string(), "05:00:02.500");
    }

    #[test]
    fn test_timestamps_from_anchor() {
        let clock = VirtualClock::from_config("05:00:01", 0.5).unwrap();
        let stamps = clock.timestamps_from(clock.now(), 4).unwrap();

        assert_eq!(stamps.len(), 4);
        for pair in stamps.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::milliseconds(500));
        }
        assert_eq!(stamps[0], clock.now());
    }

    #[test]
    fn test_rejects_non_positive_step() {
        assert!(VirtualClock::from_config("05:00:01", 0.0).is_err());
        assert!(VirtualClock::from_config("05:00:01", -1.0).is_err());
    }

    #[test]
    fn test_rejects_oversized_step() {
        assert!(VirtualClock::from_config("05:00:01", 1e13).is_err());
        assert!(VirtualClock::from_config("05:00:01", MAX_STEP_SECS).is_ok());
    }

    #[test]
    fn test_rejects_step_rounding_to_zero() {
        assert!(VirtualClock::from_config("05:00:01", 1e-7).is_err());
        assert_eq!(step_from_secs(1e-6).unwrap(), Duration::microseconds(1));
    }

    #[test]
    fn test_advance_past_max_date_is_an_error() {
        let mut clock = VirtualClock::new(NaiveDateTime::MAX, Duration::seconds(1));
        assert_eq!(clock.advance(), Err(ClockError::Overflow));
        assert_eq!(clock.now(), NaiveDateTime::MAX);
        assert_eq!(
            clock.timestamps_from(NaiveDateTime::MAX, 2),
            Err(ClockError::Overflow)
        );
        assert_eq!(clock.timestamps_from(NaiveDateTime::MAX, 1).unwrap().len(), 1);
    }
}
