use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::day::{Clock, DayKey};
use crate::store::KeyValueStore;
use crate::{PlacementBounds, Star, StoreError};

/// Stars never sit flush against the top edge.
pub const SKY_TOP_MARGIN: f64 = 50.0;
/// Fraction of the viewport height, from the top, that counts as sky.
pub const SKY_FRACTION: f64 = 0.4;

/// Result of [`StarLedger::add_star`].
#[derive(Debug, Clone, PartialEq)]
pub struct StarAdded {
    pub star: Star,
    /// Stars released today, including this one.
    pub count: usize,
}

/// Today's released stars, mirrored into a key-value store under
/// `stars-<day>`. Only one day's entry is kept.
///
/// Storage failures never surface to the caller: a failed read starts the
/// day empty, a failed write keeps the star in memory for the session.
pub struct StarLedger<S, C> {
    store: S,
    clock: C,
    rng: StdRng,
    day: DayKey,
    stars: Vec<Star>,
}

impl<S: KeyValueStore, C: Clock> StarLedger<S, C> {
    pub fn load(store: S, clock: C) -> Self {
        let day = DayKey::today(&clock);
        let mut ledger = Self {
            store,
            clock,
            rng: StdRng::from_entropy(),
            day,
            stars: Vec::new(),
        };
        ledger.stars = ledger.read_day();
        ledger.purge_other_days();

        log::info!(
            "loaded {} star(s) for {}",
            ledger.stars.len(),
            ledger.day
        );
        ledger
    }

    /// Seed star placement, for reproducible layouts.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn count(&self) -> usize {
        self.stars.len()
    }

    pub fn day(&self) -> &DayKey {
        &self.day
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Release a new star somewhere in the sky region of `bounds`.
    pub fn add_star(&mut self, bounds: PlacementBounds) -> StarAdded {
        self.refresh();

        let star = Star {
            id: uuid::Uuid::new_v4().to_string(),
            x: sample(&mut self.rng, bounds.width),
            y: sample(&mut self.rng, bounds.height * SKY_FRACTION) + SKY_TOP_MARGIN,
            created_at: self.clock.now_millis(),
        };
        self.stars.push(star.clone());

        if let Err(e) = self.persist() {
            log::warn!("failed to persist stars for {}: {e}", self.day);
        }

        StarAdded {
            star,
            count: self.stars.len(),
        }
    }

    /// Start a fresh day if the clock has crossed midnight since the last
    /// check. Returns whether a rollover happened.
    pub fn refresh(&mut self) -> bool {
        let today = DayKey::today(&self.clock);
        if today == self.day {
            return false;
        }

        log::info!("day rolled over from {} to {today}", self.day);
        let previous = std::mem::replace(&mut self.day, today);
        if let Err(e) = self.store.remove(&previous.storage_key()) {
            log::warn!("failed to remove stars for {previous}: {e}");
        }
        self.stars = self.read_day();
        self.purge_other_days();
        true
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.stars)?;
        self.store.set(&self.day.storage_key(), &json)
    }

    fn read_day(&self) -> Vec<Star> {
        let key = self.day.storage_key();
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("failed to read {key}: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Star>>(&raw) {
            Ok(stars) => stars,
            Err(e) => {
                log::warn!("ignoring malformed {key}: {e}");
                Vec::new()
            }
        }
    }

    fn purge_other_days(&mut self) {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                log::warn!("failed to list stored days: {e}");
                return;
            }
        };

        let current = self.day.storage_key();
        for key in keys {
            if key == current || DayKey::from_storage_key(&key).is_none() {
                continue;
            }
            match self.store.remove(&key) {
                Ok(()) => log::debug!("removed stale entry {key}"),
                Err(e) => log::warn!("failed to remove stale entry {key}: {e}"),
            }
        }
    }
}

fn sample(rng: &mut StdRng, extent: f64) -> f64 {
    if extent > 0.0 && extent.is_finite() {
        rng.gen_range(0.0..extent)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day::ManualClock;
    use crate::store::{FileStore, MemoryStore};

    // 2024-03-09T12:00:00Z
    const NOON: i64 = 1_709_985_600_000;
    const DAY: i64 = 86_400_000;
    const BOUNDS: PlacementBounds = PlacementBounds {
        width: 1280.0,
        height: 800.0,
    };

    fn ledger(store: MemoryStore) -> (StarLedger<MemoryStore, ManualClock>, ManualClock) {
        let clock = ManualClock::new(NOON);
        (StarLedger::load(store, clock.clone()).with_seed(1), clock)
    }

    fn persisted(ledger: &StarLedger<MemoryStore, ManualClock>) -> Vec<Star> {
        let raw = ledger
            .store()
            .get(&ledger.day().storage_key())
            .expect("get")
            .expect("entry present");
        serde_json::from_str(&raw).expect("valid json")
    }

    #[test]
    fn test_empty_store_starts_empty() {
        let (ledger, _) = ledger(MemoryStore::new());
        assert_eq!(ledger.count(), 0);
        assert!(ledger.stars().is_empty());
        assert_eq!(ledger.day().as_str(), "2024-03-09");
    }

    #[test]
    fn test_count_increments_and_matches_persisted() {
        let (mut ledger, clock) = ledger(MemoryStore::new());
        for expected in 1..=5 {
            clock.advance(1000);
            let added = ledger.add_star(BOUNDS);
            assert_eq!(added.count, expected);
            assert_eq!(ledger.count(), expected);
            assert_eq!(persisted(&ledger).len(), expected);
        }
    }

    #[test]
    fn test_added_star_placement_and_timestamp() {
        let (mut ledger, _) = ledger(MemoryStore::new());
        for _ in 0..200 {
            let star = ledger.add_star(BOUNDS).star;
            assert!((0.0..BOUNDS.width).contains(&star.x));
            assert!(star.y >= SKY_TOP_MARGIN);
            assert!(star.y <= BOUNDS.height * SKY_FRACTION + SKY_TOP_MARGIN);
            assert_eq!(star.created_at, NOON);
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let (mut ledger, _) = ledger(MemoryStore::new());
        let mut ids: Vec<String> = (0..50).map(|_| ledger.add_star(BOUNDS).star.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_persisted_value_round_trips() {
        let (mut ledger, _) = ledger(MemoryStore::new());
        let added = ledger.add_star(BOUNDS);
        assert_eq!(persisted(&ledger), vec![added.star]);
    }

    #[test]
    fn test_positions_survive_storage_exactly() {
        let (mut ledger, _) = ledger(MemoryStore::new());
        for _ in 0..1000 {
            ledger.add_star(BOUNDS);
        }
        let stored = persisted(&ledger);
        let mismatched = stored
            .iter()
            .zip(ledger.stars())
            .filter(|(a, b)| a.x.to_bits() != b.x.to_bits() || a.y.to_bits() != b.y.to_bits())
            .count();
        assert_eq!(mismatched, 0);
    }

    #[test]
    fn test_reload_same_day_restores_stars() {
        let (mut ledger, clock) = ledger(MemoryStore::new());
        ledger.add_star(BOUNDS);
        ledger.add_star(BOUNDS);
        let stars = ledger.stars().to_vec();

        let store = ledger.store().clone();
        let reloaded = StarLedger::load(store, clock);
        assert_eq!(reloaded.stars(), stars.as_slice());
        assert_eq!(reloaded.count(), 2);
    }

    #[test]
    fn test_malformed_entry_loads_empty() {
        let store = MemoryStore::new().with_entry("stars-2024-03-09", "not json");
        let (mut ledger, _) = ledger(store);
        assert_eq!(ledger.count(), 0);

        let added = ledger.add_star(BOUNDS);
        assert_eq!(added.count, 1);
        assert_eq!(persisted(&ledger).len(), 1);
    }

    #[test]
    fn test_wrong_shape_entry_loads_empty() {
        let store = MemoryStore::new().with_entry("stars-2024-03-09", r#"{"id":"1"}"#);
        let (ledger, _) = ledger(store);
        assert_eq!(ledger.count(), 0);
    }

    #[test]
    fn test_load_purges_other_days_only() {
        let store = MemoryStore::new()
            .with_entry("stars-2024-03-08", "[]")
            .with_entry("stars-Fri Mar 08 2024", "[]")
            .with_entry("stars-2024-03-09", "[]")
            .with_entry("settings", "{}");
        let (ledger, _) = ledger(store);
        assert_eq!(
            ledger.store().keys().expect("keys"),
            vec!["settings", "stars-2024-03-09"]
        );
    }

    #[test]
    fn test_new_day_starts_empty_and_removes_previous() {
        let (mut ledger, clock) = ledger(MemoryStore::new());
        ledger.add_star(BOUNDS);
        let yesterday = ledger.day().storage_key();

        clock.advance(DAY);
        let store = ledger.store().clone();
        let ledger = StarLedger::load(store, clock);
        assert_eq!(ledger.count(), 0);
        assert_eq!(ledger.store().get(&yesterday).expect("get"), None);
    }

    #[test]
    fn test_rollover_mid_session() {
        let (mut ledger, clock) = ledger(MemoryStore::new());
        ledger.add_star(BOUNDS);
        ledger.add_star(BOUNDS);
        let yesterday = ledger.day().clone();

        clock.advance(DAY);
        let added = ledger.add_star(BOUNDS);
        assert_eq!(added.count, 1);
        assert_eq!(ledger.day().as_str(), "2024-03-10");
        assert_eq!(
            ledger.store().keys().expect("keys"),
            vec!["stars-2024-03-10"]
        );
        assert_eq!(
            ledger.store().get(&yesterday.storage_key()).expect("get"),
            None
        );
    }

    #[test]
    fn test_refresh_without_rollover() {
        let (mut ledger, clock) = ledger(MemoryStore::new());
        ledger.add_star(BOUNDS);
        clock.advance(60_000);
        assert!(!ledger.refresh());
        assert_eq!(ledger.count(), 1);

        clock.advance(DAY);
        assert!(ledger.refresh());
        assert_eq!(ledger.count(), 0);
    }

    #[test]
    fn test_write_failure_keeps_star_in_memory() {
        let (mut ledger, _) = ledger(MemoryStore::new());
        ledger.store_mut().set_fail_writes(true);

        let first = ledger.add_star(BOUNDS);
        let second = ledger.add_star(BOUNDS);
        assert_eq!(first.count, 1);
        assert_eq!(second.count, 2);
        assert_eq!(ledger.stars().len(), 2);
        assert!(ledger.store().is_empty());
    }

    #[test]
    fn test_degenerate_bounds() {
        let (mut ledger, _) = ledger(MemoryStore::new());
        let star = ledger
            .add_star(PlacementBounds {
                width: 0.0,
                height: -10.0,
            })
            .star;
        assert_eq!(star.x, 0.0);
        assert_eq!(star.y, SKY_TOP_MARGIN);
    }

    #[test]
    fn test_seeded_placement_is_reproducible() {
        let (mut a, _) = ledger(MemoryStore::new());
        let (mut b, _) = ledger(MemoryStore::new());
        let sa = a.add_star(BOUNDS).star;
        let sb = b.add_star(BOUNDS).star;
        assert_eq!((sa.x, sa.y), (sb.x, sb.y));
        assert_ne!(sa.id, sb.id);
    }

    #[test]
    fn test_file_store_backed_ledger() {
        let dir = tempfile::tempdir().expect("tempdir");
        let clock = ManualClock::new(NOON);

        let mut ledger = StarLedger::load(FileStore::new(dir.path()), clock.clone());
        ledger.add_star(BOUNDS);
        ledger.add_star(BOUNDS);

        let reloaded = StarLedger::load(FileStore::new(dir.path()), clock);
        assert_eq!(reloaded.count(), 2);
        assert!(dir.path().join("stars-2024-03-09.json").exists());
    }
}
