//! In-memory key/value store adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`] over a namespaced
//! `HashMap`, standing in for the device's preference store.
//!
//! # Integrity
//!
//! - Config validation: all fields are range-checked on save AND on load,
//!   so a corrupted or tampered blob cannot steer outbound messages to an
//!   arbitrary recipient or disable the fix gate.
//! - Namespace isolation: each subsystem uses its own namespace prefix.
//! - Writes replace the whole value at once; there is no partial state.

use std::cell::RefCell;
use std::collections::HashMap;

use log::info;

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::{AppConfig, BODY_MAX_LEN, RECIPIENT_MAX_LEN};

/// Namespace and key under which the config blob is stored.
pub const CONFIG_NAMESPACE: &str = "locaware";
pub const CONFIG_KEY: &str = "appcfg";

/// Longest accepted provider name.
const PROVIDER_MAX_LEN: usize = 16;

pub struct MemStore {
    cells: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        info!("MemStore: in-memory backend ready");
        Self {
            cells: RefCell::new(HashMap::new()),
        }
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Range-check every config field.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let recipient = config.recipient_number.as_str();
    if recipient.is_empty() || recipient.len() > RECIPIENT_MAX_LEN {
        return Err(ConfigError::ValidationFailed(
            "recipient_number must be 1–24 characters",
        ));
    }
    let digits = recipient.strip_prefix('+').unwrap_or(recipient);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::ValidationFailed(
            "recipient_number must be digits with an optional leading +",
        ));
    }

    // Compose enforces the hard single-segment bound at send time; this
    // ceiling keeps room for the substituted coordinates.
    if config.body_template.len() > BODY_MAX_LEN - 20 {
        return Err(ConfigError::ValidationFailed(
            "body_template must be at most 140 characters",
        ));
    }
    if !config.body_template.contains("{lat}") || !config.body_template.contains("{lon}") {
        return Err(ConfigError::ValidationFailed(
            "body_template must contain {lat} and {lon}",
        ));
    }

    if config.provider.is_empty() || config.provider.len() > PROVIDER_MAX_LEN {
        return Err(ConfigError::ValidationFailed(
            "provider must be 1–16 characters",
        ));
    }

    if !(1_000..=3_600_000).contains(&config.update_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "update_interval_ms must be 1000–3600000",
        ));
    }
    if !config.min_displacement_m.is_finite() || !(0.0..=10_000.0).contains(&config.min_displacement_m)
    {
        return Err(ConfigError::ValidationFailed(
            "min_displacement_m must be 0.0–10000.0",
        ));
    }
    if !(50..=5_000).contains(&config.control_tick_ms) {
        return Err(ConfigError::ValidationFailed(
            "control_tick_ms must be 50–5000",
        ));
    }
    Ok(())
}

impl ConfigPort for MemStore {
    fn load(&self) -> Result<AppConfig, ConfigError> {
        let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
        if let Some(bytes) = self.cells.borrow().get(&key) {
            let config: AppConfig =
                postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
            validate_config(&config)?;
            info!("MemStore: loaded config from store");
            Ok(config)
        } else {
            info!("MemStore: no stored config, using defaults");
            Ok(AppConfig::default())
        }
    }

    fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        self.cells.borrow_mut().insert(key, bytes);
        info!("MemStore: config saved");
        Ok(())
    }
}

impl StoragePort for MemStore {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let composite = Self::composite_key(namespace, key);
        match self.cells.borrow().get(&composite) {
            Some(data) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                Ok(len)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let composite = Self::composite_key(namespace, key);
        self.cells.borrow_mut().insert(composite, data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        let composite = Self::composite_key(namespace, key);
        self.cells.borrow_mut().remove(&composite);
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        let composite = Self::composite_key(namespace, key);
        self.cells.borrow().contains_key(&composite)
    }
}
