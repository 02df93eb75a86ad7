use chrono::{DateTime, Utc};
use roadsafe_api::types::{
    DEBTS_PATH, FINES_PATH, LICENSES_PATH, REWARDS_PATH, VEHICLES_PATH,
};
use roadsafe_api::{ApiClient, ApiError, License, NewVehicle, Page, Reward, Vehicle};
use roadsafe_cache::TtlCache;
use roadsafe_core::{Debt, DebtSummary, Fine, SubjectType};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::keys;

/// Backend-mirrored client state.
///
/// Reads go through the cache; a miss fetches from the backend and stores
/// the raw JSON. Mutations invalidate the slice family, then refetch so the
/// caller gets fresh state.
#[derive(Clone)]
pub struct ClientStore {
    api: ApiClient,
    cache: Arc<TtlCache<Value>>,
}

impl ClientStore {
    pub fn new(api: ApiClient, cache: Arc<TtlCache<Value>>) -> Self {
        Self { api, cache }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cache(&self) -> &Arc<TtlCache<Value>> {
        &self.cache
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str, path: &str) -> Result<T, ApiError> {
        if let Some(value) = self.cache.get(key, None) {
            return decode(value);
        }
        let fresh: Value = self.api.get_json(path).await?;
        // A payload that fails to decode is not cached.
        let decoded = decode(fresh.clone())?;
        self.cache.set(key, fresh);
        Ok(decoded)
    }

    pub async fn debts(&self) -> Result<Vec<Debt>, ApiError> {
        self.cached(&keys::debts(), DEBTS_PATH).await
    }

    /// Totals over unpaid debts, late fees evaluated at `now`.
    pub async fn debt_summary(&self, now: DateTime<Utc>) -> Result<DebtSummary, ApiError> {
        let debts = self.debts().await?;
        Ok(DebtSummary::from_debts(&debts, now))
    }

    pub async fn fines(&self, page: u32) -> Result<Page<Fine>, ApiError> {
        let path = format!("{}?page={}", FINES_PATH, page);
        self.cached(&keys::fines_page(page), &path).await
    }

    pub async fn rewards(&self) -> Result<Vec<Reward>, ApiError> {
        self.cached(&keys::rewards(), REWARDS_PATH).await
    }

    pub async fn vehicles(&self) -> Result<Vec<Vehicle>, ApiError> {
        self.cached(&keys::vehicles(), VEHICLES_PATH).await
    }

    pub async fn licenses(&self) -> Result<Vec<License>, ApiError> {
        self.cached(&keys::licenses(), LICENSES_PATH).await
    }

    /// Register a vehicle and return the refreshed vehicle list.
    pub async fn register_vehicle(&self, vehicle: &NewVehicle) -> Result<Vec<Vehicle>, ApiError> {
        let _: Value = self.api.post_json(VEHICLES_PATH, vehicle).await?;
        tracing::info!(
            registration_number = %vehicle.registration_number,
            "vehicle registered"
        );
        self.cache.invalidate_pattern(keys::VEHICLES);
        self.vehicles().await
    }

    /// Remove a vehicle and return the refreshed vehicle list.
    pub async fn remove_vehicle(&self, id: &str) -> Result<Vec<Vehicle>, ApiError> {
        self.api
            .delete(&format!("{}/{}", VEHICLES_PATH, path_segment(id)))
            .await?;
        tracing::info!(vehicle_id = id, "vehicle removed");
        self.cache.invalidate_pattern(keys::VEHICLES);
        self.vehicles().await
    }

    /// Drop cached listings a settled payment has made stale.
    pub fn after_payment(&self, kind: SubjectType) {
        self.cache.invalidate_pattern(keys::family_for(kind));
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Percent-encode one path segment. `+` would read as a literal plus in a
/// path, so spaces become `%20`.
fn path_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
