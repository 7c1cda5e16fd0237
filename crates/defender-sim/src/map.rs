//! Play-area bounds and the per-session map registry.

use std::collections::HashMap;

use defender_core::config::MapConfig;
use defender_core::error::{SimError, SimResult};
use defender_core::types::SessionId;

/// Authoritative bounds of one session's world. Immutable once registered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Map {
    width: f64,
    x_min: f64,
    y_min: f64,
    y_max: f64,
}

impl Map {
    /// Validate a map config. Width must be positive and finite and the
    /// vertical range non-empty.
    pub fn from_config(config: &MapConfig) -> SimResult<Self> {
        let invalid = !config.width.is_finite()
            || config.width <= 0.0
            || !config.y_min.is_finite()
            || !config.y_max.is_finite()
            || config.y_min >= config.y_max;
        if invalid {
            return Err(SimError::InvalidMap {
                width: config.width,
                y_min: config.y_min,
                y_max: config.y_max,
            });
        }
        Ok(Self {
            width: config.width,
            x_min: config.x_min.unwrap_or(-config.width / 2.0),
            y_min: config.y_min,
            y_max: config.y_max,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Vertical bounds `(y_min, y_max)`.
    pub fn bounds(&self) -> (f64, f64) {
        (self.y_min, self.y_max)
    }

    /// Left edge of the explicit wrap area.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Right edge of the explicit wrap area.
    pub fn x_max(&self) -> f64 {
        self.x_min + self.width
    }
}

/// Maps each live session to its map.
///
/// Owned by the engine; populated at session start and emptied when the
/// session ends or restarts.
#[derive(Debug, Default)]
pub struct MapRegistry {
    maps: HashMap<SessionId, Map>,
}

impl MapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the map of a session.
    pub fn register(&mut self, session: SessionId, map: Map) {
        if self.maps.insert(session, map).is_some() {
            log::debug!("replaced map of {session}");
        }
    }

    /// Look up the map of a session.
    pub fn find(&self, session: SessionId) -> SimResult<&Map> {
        self.maps.get(&session).ok_or(SimError::NoActiveMap(session))
    }

    /// Drop a session's map. Returns the map if one was registered.
    pub fn unload(&mut self, session: SessionId) -> Option<Map> {
        self.maps.remove(&session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map() {
        let map = Map::from_config(&MapConfig::default()).unwrap();
        assert_eq!(map.width(), 64.0);
        assert_eq!(map.bounds(), (-8.0, 8.0));
        assert_eq!(map.x_min(), -32.0);
        assert_eq!(map.x_max(), 32.0);
    }

    #[test]
    fn test_invalid_map_rejected() {
        for config in [
            MapConfig {
                width: 0.0,
                ..Default::default()
            },
            MapConfig {
                width: f64::NAN,
                ..Default::default()
            },
            MapConfig {
                y_min: 4.0,
                y_max: 4.0,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                Map::from_config(&config),
                Err(SimError::InvalidMap { .. })
            ));
        }
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = MapRegistry::new();
        let session = SessionId(1);
        assert_eq!(
            registry.find(session).unwrap_err(),
            SimError::NoActiveMap(session)
        );

        let map = Map::from_config(&MapConfig::default()).unwrap();
        registry.register(session, map);
        assert_eq!(registry.find(session).unwrap().width(), 64.0);
        // Other sessions stay unresolved.
        assert!(registry.find(SessionId(2)).is_err());

        assert!(registry.unload(session).is_some());
        assert!(registry.unload(session).is_none());
        assert!(matches!(
            registry.find(session),
            Err(SimError::NoActiveMap(_))
        ));
    }
}
