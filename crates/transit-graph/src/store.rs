//! On-disk persistence of the transit state.
//!
//! The catalogue and router are captured together as one `TransitState`,
//! encoded with bincode and kept under a single sled key. Reading it back
//! goes through the checked restore in `persist`, so a damaged database
//! surfaces as an error rather than a half-built router.

use crate::persist::{PersistError, TransitState};
use crate::router::TransitRouter;
use sled::Db;
use std::path::Path;
use thiserror::Error;
use transit_core::TransitCatalogue;

const STATE_KEY: &str = "transit_state";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// On-disk home of the catalogue and its precomputed router.
pub struct TransitStore {
    db: Db,
}

impl TransitStore {
    /// Opens or creates a store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Saves the state, replacing whatever was stored before.
    ///
    /// The state is serialized using bincode and stored under a fixed key.
    pub fn save_state(&self, state: &TransitState) -> Result<(), StoreError> {
        let bytes = bincode::serialize(state)?;
        self.db.insert(STATE_KEY, bytes)?;
        self.db.flush()?;
        Ok(())
    }

    pub fn load_state(&self) -> Result<Option<TransitState>, StoreError> {
        if let Some(bytes) = self.db.get(STATE_KEY)? {
            let state: TransitState = bincode::deserialize(&bytes)?;
            Ok(Some(state))
        } else {
            Ok(None)
        }
    }

    /// Captures and saves a catalogue together with its router.
    pub fn save(&self, catalogue: &TransitCatalogue, router: &TransitRouter) -> Result<(), StoreError> {
        let state = TransitState::capture(catalogue, router)?;
        self.save_state(&state)
    }

    /// Loads and restores the stored catalogue and router.
    pub fn load(&self) -> Result<Option<(TransitCatalogue, TransitRouter)>, StoreError> {
        match self.load_state()? {
            Some(state) => Ok(Some(state.restore()?)),
            None => Ok(None),
        }
    }

    /// Clears the stored state.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.db.remove(STATE_KEY)?;
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::RoutingSettings;
    use tempfile::tempdir;
    use transit_core::{Coordinates, RouteKind};

    fn network() -> (TransitCatalogue, TransitRouter) {
        let mut catalogue = TransitCatalogue::new();
        catalogue.add_stop("Marushkino", Coordinates::new(55.595884, 37.209755));
        catalogue.add_stop("Rasskazovka", Coordinates::new(55.632761, 37.333324));
        catalogue.set_distance("Marushkino", "Rasskazovka", 9900);
        catalogue
            .add_bus("750", RouteKind::Return, &["Marushkino", "Rasskazovka"])
            .unwrap();

        let router = TransitRouter::build(&catalogue, RoutingSettings::new(6, 40.0).unwrap());
        (catalogue, router)
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        let dir = tempdir().unwrap();
        let store = TransitStore::open(dir.path()).unwrap();

        assert!(store.load_state().unwrap().is_none());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempdir().unwrap();
        let store = TransitStore::open(dir.path()).unwrap();
        let (catalogue, router) = network();

        store.save(&catalogue, &router).unwrap();

        let (loaded_catalogue, loaded) = store.load().unwrap().unwrap();
        assert_eq!(loaded_catalogue.stop_count(), 2);
        assert_eq!(
            loaded.build_route("Rasskazovka", "Marushkino"),
            router.build_route("Rasskazovka", "Marushkino")
        );

        store.clear().unwrap();
        assert!(store.load_state().unwrap().is_none());
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempdir().unwrap();
        let (catalogue, router) = network();
        let expected = TransitState::capture(&catalogue, &router).unwrap();

        {
            let store = TransitStore::open(dir.path()).unwrap();
            store.save_state(&expected).unwrap();
        }

        let store = TransitStore::open(dir.path()).unwrap();
        assert_eq!(store.load_state().unwrap(), Some(expected));
    }

    #[test]
    fn test_garbage_bytes_are_an_error() {
        let dir = tempdir().unwrap();
        let store = TransitStore::open(dir.path()).unwrap();
        store.db.insert(STATE_KEY, &[1u8, 2, 3][..]).unwrap();

        assert!(matches!(store.load_state(), Err(StoreError::Bincode(_))));
    }
}
