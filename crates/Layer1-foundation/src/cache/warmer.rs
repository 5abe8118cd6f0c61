//! Startup cache warm-up
//!
//! Prefetches slow-changing backend data with longer TTLs. Warm-up is
//! best-effort: failures are logged and swallowed, never fatal.

use super::{employee_key, employee_list_key, health_key, Cache};
use crate::traits::BackendClient;
use std::sync::Arc;
use tracing::{debug, warn};

/// TTLs for warmed entries, in seconds
const EMPLOYEE_LIST_TTL: u64 = 600;
const EMPLOYEE_TTL: u64 = 1800;
const HEALTH_TTL: u64 = 60;

pub struct CacheWarmer {
    cache: Arc<dyn Cache>,
}

impl CacheWarmer {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    /// Prefetch the employee list, per-employee profiles, and health state
    pub async fn warm_up(&self, client: &dyn BackendClient) {
        match client.list_employees().await {
            Ok(employees) => {
                if let Ok(value) = serde_json::to_value(&employees) {
                    self.cache
                        .set(&employee_list_key(), value, Some(EMPLOYEE_LIST_TTL))
                        .await;
                }

                for employee in &employees {
                    if let Ok(value) = serde_json::to_value(employee) {
                        self.cache
                            .set(&employee_key(&employee.id), value, Some(EMPLOYEE_TTL))
                            .await;
                    }
                }

                debug!("Cache warmed with {} employee profiles", employees.len());
            }
            Err(e) => {
                warn!("Cache warm-up failed: {}", e);
                return;
            }
        }

        let health = client.health_check().await;
        if let Ok(value) = serde_json::to_value(&health) {
            self.cache.set(&health_key(), value, Some(HEALTH_TTL)).await;
        }
    }
}
