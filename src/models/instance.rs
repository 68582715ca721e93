// Credentials and instance records as exchanged with the caller

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ReportError;

/// Per-request authentication bundle. Never persisted; `Debug` redacts the secret.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("account_id", &self.account_id)
            .field("account_name", &self.account_name)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub instance_type: String,
    pub state: String,
    pub region: String,
    /// Operating-system hint, when the inventory knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default)]
    pub selected: bool,
}

impl Instance {
    /// Label used in headings and chart titles: name, or id when unnamed.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Boundary check for caller-supplied entries. `index` is the entry's position in the request.
    pub fn validate(&self, index: usize) -> Result<(), ReportError> {
        if self.id.trim().is_empty() {
            return Err(ReportError::InvalidInstance {
                index,
                reason: "id must be non-empty".into(),
            });
        }
        if self.region.trim().is_empty() {
            return Err(ReportError::InvalidInstance {
                index,
                reason: format!("instance {} has no region", self.id),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDbInstance {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub instance_class: String,
    pub engine: String,
    /// Allocated storage, e.g. "20 GB".
    pub size: String,
    pub state: String,
    pub region: String,
    #[serde(default)]
    pub selected: bool,
}

/// What one region reported.
#[derive(Debug, Clone, Default)]
pub struct RegionInventory {
    pub compute: Vec<Instance>,
    pub managed_db: Vec<ManagedDbInstance>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceListing {
    pub compute_instances: Vec<Instance>,
    pub managed_db_instances: Vec<ManagedDbInstance>,
}
