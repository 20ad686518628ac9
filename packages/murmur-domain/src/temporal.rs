use std::ops::RangeInclusive;

use crate::predicate::Predicate;

pub const HOURS_PER_DAY: i32 = 24;

/// Converts a local hour to UTC given a fixed `utc_offset_hours` (local = UTC + offset).
pub fn to_utc_hour(local_hour: u8, utc_offset_hours: i32) -> u8 {
	(i32::from(local_hour) - utc_offset_hours).rem_euclid(HOURS_PER_DAY) as u8
}

/// Inclusive UTC hour ranges covering `utc_hour ± radius`, split at midnight when needed.
pub fn window_ranges(utc_hour: u8, radius: u8) -> Vec<RangeInclusive<u8>> {
	let min = i32::from(utc_hour) - i32::from(radius);
	let max = i32::from(utc_hour) + i32::from(radius);

	if min < 0 {
		vec![(HOURS_PER_DAY + min) as u8..=23, 0..=max as u8]
	} else if max >= HOURS_PER_DAY {
		vec![min as u8..=23, 0..=(max - HOURS_PER_DAY) as u8]
	} else {
		vec![min as u8..=max as u8]
	}
}

/// Predicate over record hour of day for a caller whose local clock reads `local_hour`.
pub fn build_time_window(local_hour: u8, utc_offset_hours: i32, radius: u8) -> Predicate {
	let ranges = window_ranges(to_utc_hour(local_hour, utc_offset_hours), radius);
	let mut args: Vec<Predicate> = ranges
		.into_iter()
		.map(|range| Predicate::HourIn { start: *range.start(), end: *range.end() })
		.collect();

	if args.len() == 1 { args.remove(0) } else { Predicate::or(args) }
}
