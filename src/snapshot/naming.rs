//! Snapshot file names: `<adjective>-<noun>_<YYYY-MM-DD HH-MM-SS>.db`.

use chrono::{DateTime, TimeZone};
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "amber", "bold", "brave", "bright", "calm", "clever", "crimson", "dusty", "eager", "fancy",
    "gentle", "golden", "happy", "hidden", "jolly", "lively", "lucky", "misty", "noble", "proud",
    "quiet", "rapid", "silent", "silver", "swift", "tidy", "vivid", "wild", "witty", "zesty",
];

const NOUNS: &[&str] = &[
    "badger", "canyon", "comet", "falcon", "fjord", "forest", "glacier", "harbor", "heron",
    "island", "lantern", "maple", "meadow", "otter", "panda", "pebble", "pine", "raven", "river",
    "sparrow", "summit", "thunder", "tiger", "tulip", "valley", "willow", "wolf", "yak", "zebra",
];

/// A random human-readable label such as `brave-otter`.
pub fn random_label<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    format!("{adjective}-{noun}")
}

/// Snapshot file name for `label` created at `at`.
///
/// Colons are not portable in file names, so the time uses dashes.
pub fn snapshot_file_name<Tz: TimeZone>(label: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{label}_{}.db", at.format("%Y-%m-%d %H-%M-%S"))
}

/// Registry timestamp for `at`.
pub fn display_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_label_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let label = random_label(&mut rng);
        let (adjective, noun) = label.split_once('-').unwrap();
        assert!(ADJECTIVES.contains(&adjective));
        assert!(NOUNS.contains(&noun));
    }

    #[test]
    fn test_file_name_and_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 9, 1, 14, 5, 9).unwrap();
        assert_eq!(
            snapshot_file_name("brave-otter", &at),
            "brave-otter_2024-09-01 14-05-09.db"
        );
        assert_eq!(display_timestamp(&at), "2024-09-01 14:05:09");
    }
}
