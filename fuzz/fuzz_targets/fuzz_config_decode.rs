//! Fuzz target: stored config decoding
//!
//! Plants arbitrary bytes at the config slot of the store and loads
//! them back, asserting that:
//! - `load` never panics on arbitrary stored blobs
//! - anything `load` accepts also passes field validation
//! - a rejected blob leaves the store readable (a re-save recovers it)
//!
//! cargo fuzz run fuzz_config_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use locaware::adapters::store::{CONFIG_KEY, CONFIG_NAMESPACE, MemStore, validate_config};
use locaware::app::ports::{ConfigPort, StoragePort};
use locaware::config::AppConfig;

fuzz_target!(|data: &[u8]| {
    let mut store = MemStore::new();
    store
        .write(CONFIG_NAMESPACE, CONFIG_KEY, data)
        .expect("in-memory write cannot fail");

    // Decoding arbitrary bytes must yield a typed error or a config that
    // passes every range check — never a panic, never an invalid config.
    if let Ok(config) = store.load() {
        assert!(
            validate_config(&config).is_ok(),
            "load accepted a config that fails validation"
        );
    }

    // The slot is recoverable: a fresh save overwrites the garbage.
    store
        .save(&AppConfig::default())
        .expect("default config always saves");
    let reloaded = store.load().expect("load after save");
    assert_eq!(reloaded, AppConfig::default());
});
