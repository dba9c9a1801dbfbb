use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{LatLng, PoiCategory};
use crate::styling::BaseIcon;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Stop,
    Poi,
}

impl MarkerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Poi => "poi",
        }
    }
}

/// Identity shared by a map marker and its itinerary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerKey {
    pub kind: MarkerKind,
    pub id: i64,
}

impl MarkerKey {
    pub fn stop(id: i64) -> Self {
        Self {
            kind: MarkerKind::Stop,
            id,
        }
    }

    pub fn poi(id: i64) -> Self {
        Self {
            kind: MarkerKind::Poi,
            id,
        }
    }

    pub fn is_poi(&self) -> bool {
        self.kind == MarkerKind::Poi
    }
}

impl fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.as_str(), self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerEntry {
    pub position: LatLng,
    pub base: BaseIcon,
    pub emphasized: bool,
}

/// Render state of every marker on the map. It does not know about the
/// single-emphasis rule; callers are expected to clear the old key.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    entries: HashMap<MarkerKey, MarkerEntry>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_stop(&mut self, id: i64, position: LatLng, number: u32) {
        self.insert(MarkerKey::stop(id), position, BaseIcon::Stop { number });
    }

    pub fn register_poi(&mut self, id: i64, position: LatLng, category: PoiCategory) {
        self.insert(MarkerKey::poi(id), position, BaseIcon::Poi(category));
    }

    fn insert(&mut self, key: MarkerKey, position: LatLng, base: BaseIcon) {
        self.entries.insert(
            key,
            MarkerEntry {
                position,
                base,
                emphasized: false,
            },
        );
    }

    pub fn unregister(&mut self, key: MarkerKey) -> Option<MarkerEntry> {
        self.entries.remove(&key)
    }

    /// Removes every entry and hands back the keys that were registered.
    pub fn clear(&mut self) -> Vec<MarkerKey> {
        self.entries.drain().map(|(key, _)| key).collect()
    }

    /// Returns `true` when the flag actually flipped. Unknown keys are ignored.
    pub fn set_emphasis(&mut self, key: MarkerKey, emphasized: bool) -> bool {
        match self.entries.get_mut(&key) {
            Some(entry) if entry.emphasized != emphasized => {
                entry.emphasized = emphasized;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, key: &MarkerKey) -> Option<&MarkerEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &MarkerKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = MarkerKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn emphasized(&self) -> impl Iterator<Item = MarkerKey> + '_ {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.emphasized)
            .map(|(key, _)| *key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_replaces_existing_entry() {
        let mut registry = MarkerRegistry::new();
        registry.register_poi(7, LatLng::new(1.0, 1.0), PoiCategory::Food);
        registry.set_emphasis(MarkerKey::poi(7), true);
        registry.register_poi(7, LatLng::new(2.0, 2.0), PoiCategory::Museum);

        let entry = registry.get(&MarkerKey::poi(7)).unwrap();
        assert_eq!(entry.position, LatLng::new(2.0, 2.0));
        assert_eq!(entry.base, BaseIcon::Poi(PoiCategory::Museum));
        assert!(!entry.emphasized);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn stops_and_pois_with_same_id_are_distinct() {
        let mut registry = MarkerRegistry::new();
        registry.register_stop(1, LatLng::new(1.0, 1.0), 1);
        registry.register_poi(1, LatLng::new(1.0, 1.0), PoiCategory::Hike);
        assert_eq!(registry.len(), 2);

        registry.set_emphasis(MarkerKey::stop(1), true);
        assert_eq!(
            registry.emphasized().collect::<Vec<_>>(),
            vec![MarkerKey::stop(1)]
        );
    }

    #[test]
    fn emphasis_on_missing_key_is_ignored() {
        let mut registry = MarkerRegistry::new();
        assert!(!registry.set_emphasis(MarkerKey::poi(99), true));
        assert!(registry.is_empty());
    }

    #[test]
    fn set_emphasis_reports_changes_only() {
        let mut registry = MarkerRegistry::new();
        registry.register_stop(2, LatLng::new(0.0, 0.0), 2);
        assert!(registry.set_emphasis(MarkerKey::stop(2), true));
        assert!(!registry.set_emphasis(MarkerKey::stop(2), true));
        assert!(registry.set_emphasis(MarkerKey::stop(2), false));
    }

    #[test]
    fn unregister_and_clear() {
        let mut registry = MarkerRegistry::new();
        registry.register_stop(1, LatLng::new(0.0, 0.0), 1);
        registry.register_poi(2, LatLng::new(0.0, 0.0), PoiCategory::Shop);

        assert!(registry.unregister(MarkerKey::stop(1)).is_some());
        assert!(registry.unregister(MarkerKey::stop(1)).is_none());

        let cleared = registry.clear();
        assert_eq!(cleared, vec![MarkerKey::poi(2)]);
        assert!(registry.is_empty());
    }

    #[test]
    fn key_display_matches_dom_naming() {
        assert_eq!(MarkerKey::stop(3).to_string(), "stop-3");
        assert_eq!(MarkerKey::poi(12).to_string(), "poi-12");
    }
}
