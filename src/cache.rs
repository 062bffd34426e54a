//! On-disk cache for equilux results
//!
//! Equilux searches are pure functions of (location, timezone, year,
//! labels), so results are cached as JSON files named after the request.
//! All entries live in one directory, ~/.cache/equilux by default.
//!
//! The cache is injected where batch drivers want it; the search core never
//! sees it. Unreadable or corrupt entries are logged misses, never errors.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::warn;

use crate::almanac::Location;
use crate::equilux::{Equinox, EquiluxResult};
use crate::errors::Result;

/// Identity of one equilux request, canonicalized for use as a file name.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKey {
    latitude_deg: f64,
    longitude_deg: f64,
    timezone: String,
    year: i32,
    labels: Vec<Equinox>,
}

impl CacheKey {
    pub fn new(location: &Location, year: i32, labels: &[Equinox]) -> Self {
        let mut labels = labels.to_vec();
        labels.sort();
        labels.dedup();
        CacheKey {
            latitude_deg: location.latitude_deg,
            longitude_deg: location.longitude_deg,
            timezone: location.timezone.clone(),
            year,
            labels,
        }
    }

    /// Deterministic, filesystem-safe file name for this request.
    fn filename(&self) -> String {
        let timezone = self.timezone.replace('/', "-");
        let labels: String = self
            .labels
            .iter()
            .map(|label| match label {
                Equinox::Vernal => 'V',
                Equinox::Autumnal => 'A',
            })
            .collect();
        format!(
            "equilux-{:.4}_{:.4}-{}-{}-{}.json",
            self.latitude_deg, self.longitude_deg, timezone, self.year, labels
        )
    }
}

/// File-per-request result cache rooted at one directory.
///
/// Concurrent `put`s for distinct keys touch distinct paths, so no locking
/// is needed.
#[derive(Debug, Clone)]
pub struct ResultCache {
    root_path: PathBuf,
}

impl ResultCache {
    /// Cache at the default location, ~/.cache/equilux.
    pub fn new() -> std::io::Result<Self> {
        let home = std::env::var("HOME")
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::NotFound, "HOME not set"))?;
        let root_path = PathBuf::from(home).join(".cache").join("equilux");
        Ok(Self { root_path })
    }

    /// Cache rooted at a custom directory.
    pub fn with_path(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root_path.join(key.filename())
    }

    /// Look up a cached result map.
    ///
    /// A missing entry is a miss; an unreadable or unparsable entry is a
    /// logged miss, never an error.
    pub fn get(&self, key: &CacheKey) -> Option<BTreeMap<Equinox, EquiluxResult>> {
        let path = self.entry_path(key);

        if !path.exists() {
            return None;
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!("unreadable cache entry {}: {err}", path.display());
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(results) => Some(results),
            Err(err) => {
                warn!("corrupt cache entry {}: {err}", path.display());
                None
            }
        }
    }

    /// Store a result map, creating the cache directory if needed.
    ///
    /// Returns the path written.
    pub fn put(
        &self,
        key: &CacheKey,
        results: &BTreeMap<Equinox, EquiluxResult>,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root_path)?;

        let path = self.entry_path(key);
        let contents = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Remove every cache entry. Returns the number of entries removed.
    pub fn clear(&self) -> Result<usize> {
        if !self.root_path.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in std::fs::read_dir(&self.root_path)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_path(PathBuf::from(".equilux_cache")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::almanac::mock::MockProvider;
    use crate::almanac::{SeasonEvent, SeasonKind, SunEvent};
    use crate::equilux::EquiluxCalculator;
    use crate::timelib::Timescale;

    fn create_test_cache() -> ResultCache {
        let temp_dir = std::env::temp_dir().join(format!(
            "equilux_cache_test_{}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        ResultCache::with_path(temp_dir)
    }

    fn sample_results() -> (Location, BTreeMap<Equinox, EquiluxResult>) {
        let ts = Timescale::new();
        let location = Location::new(51.48, 0.0, "UTC");
        let provider = MockProvider::new()
            .with_seasons(vec![SeasonEvent {
                time: ts.utc_time(2025, 9, 22, 18, 19, 16.0),
                kind: SeasonKind::AutumnalEquinox,
            }])
            .with_sun_events(vec![
                SunEvent {
                    time: ts.utc_time(2025, 9, 25, 6, 0, 0.0),
                    rising: true,
                },
                SunEvent {
                    time: ts.utc_time(2025, 9, 25, 18, 1, 0.0),
                    rising: false,
                },
            ]);
        let results = EquiluxCalculator::new(provider)
            .compute(&location, 2025, &[Equinox::Autumnal])
            .unwrap();
        (location, results)
    }

    #[test]
    fn test_key_filename_is_deterministic() {
        let location = Location::new(40.7128, -74.0060, "America/New_York");
        let key = CacheKey::new(&location, 2025, &[Equinox::Autumnal, Equinox::Vernal]);
        let same = CacheKey::new(&location, 2025, &[Equinox::Vernal, Equinox::Autumnal]);

        assert_eq!(key.filename(), same.filename());
        assert_eq!(
            key.filename(),
            "equilux-40.7128_-74.0060-America-New_York-2025-VA.json"
        );
    }

    #[test]
    fn test_put_then_get_round_trips() {
        let cache = create_test_cache();
        let (location, results) = sample_results();
        let key = CacheKey::new(&location, 2025, &[Equinox::Autumnal]);

        let path = cache.put(&key, &results).unwrap();
        assert!(path.exists());

        let loaded = cache.get(&key).expect("entry should hit");
        assert_eq!(loaded, results);

        std::fs::remove_dir_all(cache.root_path()).ok();
    }

    #[test]
    fn test_get_missing_entry_is_none() {
        let cache = create_test_cache();
        let location = Location::new(0.0, 0.0, "UTC");
        let key = CacheKey::new(&location, 2030, &[Equinox::Vernal]);

        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let cache = create_test_cache();
        let (location, results) = sample_results();
        let key = CacheKey::new(&location, 2025, &[Equinox::Autumnal]);

        let path = cache.put(&key, &results).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        assert!(cache.get(&key).is_none());

        std::fs::remove_dir_all(cache.root_path()).ok();
    }

    #[test]
    fn test_distinct_requests_use_distinct_entries() {
        let cache = create_test_cache();
        let (location, results) = sample_results();
        let key_2025 = CacheKey::new(&location, 2025, &[Equinox::Autumnal]);
        let key_2026 = CacheKey::new(&location, 2026, &[Equinox::Autumnal]);

        cache.put(&key_2025, &results).unwrap();

        assert!(cache.get(&key_2025).is_some());
        assert!(cache.get(&key_2026).is_none());

        std::fs::remove_dir_all(cache.root_path()).ok();
    }

    #[test]
    fn test_clear_removes_entries() {
        let cache = create_test_cache();
        let (location, results) = sample_results();
        let key = CacheKey::new(&location, 2025, &[Equinox::Autumnal]);

        cache.put(&key, &results).unwrap();
        assert_eq!(cache.clear().unwrap(), 1);
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.clear().unwrap(), 0);

        std::fs::remove_dir_all(cache.root_path()).ok();
    }
}
