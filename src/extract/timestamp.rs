//! Plane timestamp decoding.
//!
//! Newer files store a `TimeStampList` with a `NumberOfTimeStamps` attribute
//! and whitespace-separated hexadecimal tick values as text. Older files store
//! one `TimeStamp` element per plane with decimal `HighInteger`/`LowInteger`
//! attributes. Both decode through a [`TickConverter`].

use chrono::DateTime;
use roxmltree::Node;

use super::nav::{attribute, descendants_named, first_descendant_named, parse_hex, parse_long, text_content};
use crate::model::Timestamps;

/// Milliseconds between 1601-01-01 and 1970-01-01.
const TICK_EPOCH_OFFSET_MS: i64 = 11_644_473_600_000;

/// Converts a split 64-bit tick count into milliseconds since the tick epoch.
pub trait TickConverter {
    fn ticks_to_millis(&self, high: i64, low: i64) -> i64;
}

/// 100 ns ticks since 1601-01-01, as in Windows `FILETIME`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileTimeTicks;

impl TickConverter for FileTimeTicks {
    fn ticks_to_millis(&self, high: i64, low: i64) -> i64 {
        (high.wrapping_shl(32) | low) / 10_000
    }
}

/// Decodes at most `plane_count` timestamps in document order.
pub fn extract_timestamps(
    image: Node<'_, '_>,
    plane_count: usize,
    ticks: &dyn TickConverter,
) -> Timestamps {
    let Some(list) = first_descendant_named(image, "TimeStampList") else {
        return Timestamps::default();
    };

    let seconds: Vec<f64> = if !attribute(list, "NumberOfTimeStamps").trim().is_empty() {
        decode_hex_list(&text_content(list), plane_count, ticks)
    } else {
        descendants_named(image, "TimeStamp")
            .unwrap_or_default()
            .into_iter()
            .take(plane_count)
            .map(|stamp| {
                pair_timestamp_seconds(
                    parse_long(attribute(stamp, "HighInteger")),
                    parse_long(attribute(stamp, "LowInteger")),
                    ticks,
                )
            })
            .collect()
    };

    let acquired_date = seconds.first().copied().and_then(iso_date);
    Timestamps {
        seconds,
        acquired_date,
    }
}

fn decode_hex_list(text: &str, plane_count: usize, ticks: &dyn TickConverter) -> Vec<f64> {
    text.split_whitespace()
        .take(plane_count)
        .map(|stamp| hex_timestamp_seconds(stamp, ticks))
        .collect()
}

/// Fuzz-only entrypoint for `TimeStampList` text decoding.
#[cfg(feature = "fuzzing")]
pub fn fuzz_decode_timestamp_list(text: &str) -> Option<String> {
    decode_hex_list(text, usize::MAX, &FileTimeTicks)
        .first()
        .copied()
        .and_then(iso_date)
}

/// Decodes one hexadecimal tick value: the last 8 digits are the low word.
pub fn hex_timestamp_seconds(stamp: &str, ticks: &dyn TickConverter) -> f64 {
    let stamp = stamp.trim();
    let split = stamp.len().saturating_sub(8);
    let (high, low) = if stamp.is_char_boundary(split) {
        stamp.split_at(split)
    } else {
        (stamp, "")
    };
    let word = |text: &str| {
        parse_hex(text).unwrap_or_else(|err| {
            log::debug!("treating malformed timestamp word '{}' as 0: {}", text, err);
            0
        })
    };
    pair_timestamp_seconds(word(high), word(low), ticks)
}

/// Seconds since the tick epoch for a high/low tick pair.
pub fn pair_timestamp_seconds(high: i64, low: i64, ticks: &dyn TickConverter) -> f64 {
    ticks.ticks_to_millis(high, low) as f64 / 1000.0
}

/// ISO-8601 UTC rendering of seconds since the tick epoch.
pub fn iso_date(seconds: f64) -> Option<String> {
    let unix_ms = ((seconds * 1000.0) as i64).saturating_sub(TICK_EPOCH_OFFSET_MS);
    DateTime::from_timestamp_millis(unix_ms).map(|date| date.format("%Y-%m-%dT%H:%M:%S").to_string())
}
