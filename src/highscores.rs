//! Best score per variant
//!
//! One integer per game, kept under the variant's storage key. Supermarket
//! Tag has no score and so no key; its `BestScore` never persists anything.

use crate::error::StoreError;
use crate::persistence::KeyValueStore;
use crate::tuning::Variant;

/// Best final score for one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestScore {
    pub variant: Variant,
    pub value: u64,
}

impl BestScore {
    pub fn new(variant: Variant) -> Self {
        Self { variant, value: 0 }
    }

    /// Load from the store; missing or unreadable values start at 0
    pub fn load(variant: Variant, store: &dyn KeyValueStore) -> Self {
        let mut best = Self::new(variant);
        let Some(key) = variant.best_score_key() else {
            return best;
        };
        match read_value(store, key) {
            Ok(Some(value)) => {
                log::info!("Loaded {} best score: {}", variant.as_str(), value);
                best.value = value;
            }
            Ok(None) => log::info!("No {} best score yet", variant.as_str()),
            Err(err) => log::warn!("Ignoring stored best score: {}", err),
        }
        best
    }

    /// Record a final score; returns true when it beats the best
    pub fn submit(&mut self, score: u64) -> bool {
        if score <= self.value || self.variant.best_score_key().is_none() {
            return false;
        }
        self.value = score;
        true
    }

    /// Write the current best
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        let Some(key) = self.variant.best_score_key() else {
            return Ok(());
        };
        store.set(key, &self.value.to_string())?;
        log::info!("{} best score saved: {}", self.variant.as_str(), self.value);
        Ok(())
    }
}

fn read_value(store: &dyn KeyValueStore, key: &str) -> Result<Option<u64>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| StoreError::Corrupt { key: key.to_string(), value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_submit_only_when_beaten() {
        let mut best = BestScore::new(Variant::PixelEscape);
        assert!(!best.submit(0));
        assert!(best.submit(12));
        assert!(!best.submit(12));
        assert!(!best.submit(5));
        assert!(best.submit(13));
        assert_eq!(best.value, 13);
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let mut best = BestScore::new(Variant::SpaceRunner);
        best.submit(321);
        best.save(&mut store).unwrap();
        assert_eq!(store.get("spaceRunnerHighScore"), Ok(Some("321".to_string())));

        let loaded = BestScore::load(Variant::SpaceRunner, &store);
        assert_eq!(loaded.value, 321);
        assert_eq!(BestScore::load(Variant::PixelEscape, &store).value, 0);
    }

    #[test]
    fn test_loads_scores_saved_by_browser_build() {
        let mut store = MemoryStore::new();
        store.set("pixelEscapeHighScore", "87").unwrap();
        store.set("spaceRunnerHighScore", "1450").unwrap();
        assert_eq!(BestScore::load(Variant::PixelEscape, &store).value, 87);
        assert_eq!(BestScore::load(Variant::SpaceRunner, &store).value, 1450);
    }

    #[test]
    fn test_corrupt_value_falls_back_to_zero() {
        let mut store = MemoryStore::new();
        store.set("pixelEscapeHighScore", "lots").unwrap();
        assert_eq!(BestScore::load(Variant::PixelEscape, &store).value, 0);
    }

    #[test]
    fn test_tag_never_persists() {
        let mut store = MemoryStore::new();
        let mut best = BestScore::new(Variant::SupermarketTag);
        assert!(!best.submit(100));
        best.save(&mut store).unwrap();
        assert!(store.is_empty());
    }
}
