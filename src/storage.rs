use deskfolio_core::store::{KeyValueStore, StoreError};
use web_sys::Storage;

/// `window.localStorage`, looked up on every access so a store that becomes
/// unavailable mid-session only fails the affected call.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LocalStorage;

impl LocalStorage {
    fn storage(&self) -> Result<Storage, StoreError> {
        web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .ok_or(StoreError::Unavailable)
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let storage = self.storage()?;
        storage
            .get_item(key)
            .map_err(|err| StoreError::Rejected(format!("{err:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = self.storage()?;
        storage
            .set_item(key, value)
            .map_err(|err| StoreError::Rejected(format!("{err:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let storage = self.storage()?;
        storage
            .remove_item(key)
            .map_err(|err| StoreError::Rejected(format!("{err:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskfolio_core::persisted::{MediaKind, PersistedPlayer, PLAYER_SLOT_KEY};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn local_storage_round_trips_the_player_record() {
        let mut store = LocalStorage;
        let record = PersistedPlayer::new(MediaKind::Audio, 3, 17.0, "/DMC/songs-in-progress.html");
        store
            .set(PLAYER_SLOT_KEY, &record.to_json().unwrap())
            .unwrap();
        let raw = store.get(PLAYER_SLOT_KEY).unwrap().unwrap();
        assert_eq!(PersistedPlayer::from_json(&raw).unwrap(), record);
        store.remove(PLAYER_SLOT_KEY).unwrap();
        assert_eq!(store.get(PLAYER_SLOT_KEY).unwrap(), None);
    }
}
