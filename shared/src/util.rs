//! Id generation

use chrono::{DateTime, Utc};

/// Id epoch: 2025-01-01 00:00:00 UTC
const ID_EPOCH_MS: i64 = 1_735_689_600_000;

/// Snowflake-style submission id at `now`.
///
/// 41 bits of milliseconds since [`ID_EPOCH_MS`] followed by 12 random bits,
/// so ids stay below 2^53 and survive a round trip through JSON numbers.
/// Ordering follows the clock passed in, not the host clock.
pub fn snowflake_id(now: DateTime<Utc>) -> i64 {
    use rand::Rng;
    let ts = (now.timestamp_millis() - ID_EPOCH_MS).max(0) & 0x1FF_FFFF_FFFF;
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000);
    (ts << 12) | rand_bits
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    #[test]
    fn test_snowflake_fits_js_number() {
        let now = Utc.with_ymd_and_hms(2060, 1, 1, 0, 0, 0).unwrap();
        let id = snowflake_id(now);
        assert!(id > 0);
        assert!(id < (1_i64 << 53));
    }

    #[test]
    fn test_snowflake_follows_clock() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let a = snowflake_id(t0);
        let b = snowflake_id(t0 + TimeDelta::milliseconds(1));
        assert!(b > a);
    }

    #[test]
    fn test_snowflake_before_epoch_clamps() {
        let early = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert!(snowflake_id(early) < 0x1000);
    }
}
