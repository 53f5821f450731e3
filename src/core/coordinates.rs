//! Time axes and frame conversions for the orrery
//!
//! The simulation runs on a Julian Date axis (days, f64). Element records may
//! carry their epoch as either a Julian Date or a Modified Julian Date, so the
//! conversions between the two live here together with the UTC bridge used by
//! the clock's "jump to now" action and the HUD readout.

use bevy::math::{DVec3, Vec3};
use chrono::{DateTime, Datelike, Timelike, Utc};

/// Julian Date of the J2000.0 epoch (2000-01-01 12:00 TT).
pub const J2000_JD: f64 = 2_451_545.0;

/// Offset between Julian Date and Modified Julian Date.
pub const MJD_OFFSET: f64 = 2_400_000.5;

/// Julian Date of the Unix epoch (1970-01-01 00:00 UTC).
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Compute the Julian Date (UTC) for a given timestamp.
/// Uses the standard Gregorian calendar to JD conversion.
pub fn julian_date_utc(t: DateTime<Utc>) -> f64 {
    let mut y = t.year();
    let mut m = t.month() as i32;
    let d = t.day() as i32;

    let hour = t.hour() as f64;
    let minute = t.minute() as f64;
    let sec = t.second() as f64 + (t.nanosecond() as f64) * 1e-9_f64;
    let day_fraction = (hour + (minute + sec / 60.0) / 60.0) / 24.0;

    if m <= 2 {
        y -= 1;
        m += 12;
    }

    let a = (y as f64 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    let jd0 = (365.25 * (y as f64 + 4716.0)).floor()
        + (30.6001 * ((m + 1) as f64)).floor()
        + d as f64
        + b
        - 1524.5;

    jd0 + day_fraction
}

/// Julian Date for the current wall-clock time.
pub fn julian_date_now() -> f64 {
    julian_date_utc(Utc::now())
}

/// Convert a Julian Date back to a UTC timestamp (millisecond resolution).
///
/// Returns `None` for non-finite inputs or dates chrono cannot represent.
pub fn utc_from_julian_date(jd: f64) -> Option<DateTime<Utc>> {
    if !jd.is_finite() {
        return None;
    }
    let millis = ((jd - UNIX_EPOCH_JD) * SECONDS_PER_DAY * 1000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

pub fn julian_to_modified(jd: f64) -> f64 {
    jd - MJD_OFFSET
}

/// Remap heliocentric ecliptic axes (AU) to Bevy world units.
/// Mapping: Bevy (x,y,z) = (ECL.y, ECL.z, ECL.x) * scale, so the ecliptic
/// north pole points along Bevy's +Y.
pub fn ecliptic_to_bevy_world(ecliptic_au: DVec3, au_to_world: f32) -> Vec3 {
    Vec3::new(
        ecliptic_au.y as f32,
        ecliptic_au.z as f32,
        ecliptic_au.x as f32,
    ) * au_to_world
}
