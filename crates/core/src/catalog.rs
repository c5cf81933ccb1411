//! Catalog entry model: services, plans, and the per-tier details seam.
//!
//! These types are pure data; the coupling of a service to the manager that
//! implements it lives in the engine crate.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ValidationError;
use crate::params::Parameters;
use crate::schema::InputParametersSchema;
use crate::stability::Stability;

// ──────────────────────────────────────────────
// Service properties
// ──────────────────────────────────────────────

/// Marketing/discovery metadata for a service.
#[derive(Debug, Clone, Default)]
pub struct ServiceMetadata {
    pub display_name: String,
    pub image_url: String,
    pub long_description: String,
    pub documentation_url: String,
    pub support_url: String,
}

/// Immutable catalog entry for one service.
#[derive(Debug, Clone, Default)]
pub struct ServiceProperties {
    pub id: String,
    pub name: String,
    pub description: String,
    pub metadata: ServiceMetadata,
    pub bindable: bool,
    pub tags: Vec<String>,
    /// Declared hierarchy: this service's instances require a parent instance
    /// of the named service.
    pub parent_service_id: Option<String>,
    /// Declared hierarchy: instances of the named service may claim instances
    /// of this service as their parent.
    pub child_service_id: Option<String>,
    /// Opaque per-service data read back by the owning module (e.g. the
    /// engine version the module validates against).
    pub extended: BTreeMap<String, Value>,
}

impl ServiceProperties {
    /// The string value under `key` in the extended bag, or `""`.
    pub fn extended_string(&self, key: &str) -> String {
        self.extended
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

// ──────────────────────────────────────────────
// Plan properties
// ──────────────────────────────────────────────

/// Marketing/discovery metadata for a plan.
#[derive(Debug, Clone, Default)]
pub struct ServicePlanMetadata {
    pub display_name: String,
    pub bullets: Vec<String>,
}

/// Input-parameter schemas governing what callers may pass for this plan.
#[derive(Debug, Clone, Default)]
pub struct PlanSchemas {
    pub provisioning_parameters: InputParametersSchema,
    /// Absent when the plan does not support updates.
    pub updating_parameters: Option<InputParametersSchema>,
}

/// Immutable catalog entry for one plan of a service.
#[derive(Clone, Default)]
pub struct PlanProperties {
    pub id: String,
    pub name: String,
    pub description: String,
    pub free: bool,
    pub stability: Stability,
    pub metadata: ServicePlanMetadata,
    pub schemas: PlanSchemas,
    /// The tier sizing/SKU strategy for this plan, read only by the owning
    /// module's steps. Absent for plans with no tier dimension (e.g. a
    /// DBMS-only plan).
    pub tier_details: Option<Arc<dyn PlanDetails>>,
    /// Opaque per-plan data read back by the owning module.
    pub extended: BTreeMap<String, Value>,
}

impl fmt::Debug for PlanProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanProperties")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("stability", &self.stability)
            .field("has_tier_details", &self.tier_details.is_some())
            .finish_non_exhaustive()
    }
}

/// A shared handle to one plan.
#[derive(Debug, Clone)]
pub struct Plan {
    properties: Arc<PlanProperties>,
}

impl Plan {
    pub fn new(properties: PlanProperties) -> Plan {
        Plan {
            properties: Arc::new(properties),
        }
    }

    pub fn properties(&self) -> &PlanProperties {
        &self.properties
    }

    pub fn id(&self) -> &str {
        &self.properties.id
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }

    pub fn stability(&self) -> Stability {
        self.properties.stability
    }

    pub fn schemas(&self) -> &PlanSchemas {
        &self.properties.schemas
    }

    pub fn tier_details(&self) -> Option<&Arc<dyn PlanDetails>> {
        self.properties.tier_details.as_ref()
    }
}

// ──────────────────────────────────────────────
// Per-tier details strategy
// ──────────────────────────────────────────────

/// Per-tier sizing/SKU logic behind a small capability interface.
///
/// New tiers are added by implementing this trait, never by branching engine
/// code. The two shipped shapes are DTU tiers (fixed SKU table keyed by a
/// discrete DTU count) and vCore tiers (SKU computed from a core count and
/// tier short name).
pub trait PlanDetails: Send + Sync {
    /// The provisioning-parameter schema this tier exposes.
    fn provision_schema(&self) -> InputParametersSchema;

    /// Deployment template parameters derived from the tier and the caller's
    /// provisioning parameters (SKU name, tier name, storage sizing).
    fn tier_provision_parameters(
        &self,
        provisioning: &Parameters,
    ) -> Result<serde_json::Map<String, Value>, ValidationError>;

    /// The updating-parameter schema this tier exposes.
    fn update_schema(&self) -> InputParametersSchema;

    /// Tier-specific update validation beyond the structural schema, with
    /// access to the parameters captured at provisioning time (e.g. storage
    /// monotonicity).
    fn validate_update_parameters(
        &self,
        provisioning: &Parameters,
        updating: &Parameters,
    ) -> Result<(), ValidationError>;
}
