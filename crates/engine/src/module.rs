//! The polymorphic seam between the generic engine and each service family.
//!
//! A [`ServiceManager`] implements one provisioning variant (all-in-one,
//! DBMS-only, database-only, registered, from-existing, paired); a
//! [`Module`] groups the managers of one resource family and declares their
//! services in a [`Catalog`]. The broker assembles the merged catalog from
//! all modules, filtered by the configured minimum stability.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use asb_core::{CatalogConfig, Plan, ServiceProperties, Stability, ValidationError};

use crate::instance::{DetailsMap, Instance};
use crate::pipeline::{Pipeline, PipelineError};

/// An error constructing a pipeline for a plan.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("plan {plan_id} is missing tier details")]
    MissingTierDetails { plan_id: String },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// The capability set every per-plan manager implements.
///
/// Managers are shared handles; pipeline constructors take `Arc<Self>` so
/// the returned pipeline can borrow the manager's clients for the lifetime
/// of the operation.
pub trait ServiceManager: Send + Sync {
    fn provisioner(self: Arc<Self>, plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError>;

    fn updater(self: Arc<Self>, plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError>;

    fn deprovisioner(self: Arc<Self>, plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError>;

    /// Plan/tier-specific update checks beyond the structural schema
    /// validation (e.g. storage monotonicity against the parameters captured
    /// at provisioning time).
    fn validate_updating_parameters(&self, instance: &Instance) -> Result<(), ValidationError>;

    /// The empty persisted shape of this manager's instance details.
    fn empty_instance_details(&self) -> DetailsMap;

    /// The empty persisted shape of this manager's binding details.
    fn empty_binding_details(&self) -> DetailsMap;
}

/// A catalog service coupled to the manager that implements it.
#[derive(Clone)]
pub struct Service {
    properties: Arc<ServiceProperties>,
    plans: Vec<Plan>,
    manager: Arc<dyn ServiceManager>,
}

impl Service {
    pub fn new(
        properties: ServiceProperties,
        manager: Arc<dyn ServiceManager>,
        plans: Vec<Plan>,
    ) -> Service {
        Service {
            properties: Arc::new(properties),
            plans,
            manager,
        }
    }

    pub fn properties(&self) -> &ServiceProperties {
        &self.properties
    }

    pub fn id(&self) -> &str {
        &self.properties.id
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn plan(&self, plan_id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id() == plan_id)
    }

    pub fn plan_named(&self, name: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.name() == name)
    }

    pub fn manager(&self) -> &Arc<dyn ServiceManager> {
        &self.manager
    }

    fn with_plans(&self, plans: Vec<Plan>) -> Service {
        Service {
            properties: Arc::clone(&self.properties),
            plans,
            manager: Arc::clone(&self.manager),
        }
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("id", &self.properties.id)
            .field("name", &self.properties.name)
            .field("plans", &self.plans.len())
            .finish_non_exhaustive()
    }
}

/// An error assembling a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate service id in catalog: {0}")]
    DuplicateServiceId(String),
}

/// The set of services a module (or the whole broker) offers.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    services: Vec<Service>,
}

impl Catalog {
    pub fn new(services: Vec<Service>) -> Catalog {
        Catalog { services }
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn service(&self, service_id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id() == service_id)
    }

    pub fn service_named(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name() == name)
    }

    /// Drop plans below `min_stability`, then drop services left with no
    /// plans.
    pub fn filtered(&self, min_stability: Stability) -> Catalog {
        let services = self
            .services
            .iter()
            .filter_map(|service| {
                let plans: Vec<Plan> = service
                    .plans()
                    .iter()
                    .filter(|p| p.stability() >= min_stability)
                    .cloned()
                    .collect();
                if plans.is_empty() {
                    None
                } else {
                    Some(service.with_plans(plans))
                }
            })
            .collect();
        Catalog { services }
    }
}

/// One resource family's entry point: its name, whether it is a
/// disaster-recovery offering, and the services it declares.
pub trait Module: Send + Sync {
    fn name(&self) -> &'static str;

    /// Disaster-recovery modules are only offered when
    /// [`CatalogConfig::enable_dr_services`] is set.
    fn disaster_recovery(&self) -> bool {
        false
    }

    fn catalog(&self) -> Result<Catalog, CatalogError>;
}

/// Assemble the broker's catalog from all modules, applying the configured
/// gates.
pub fn merged_catalog(
    modules: &[Arc<dyn Module>],
    config: &CatalogConfig,
) -> Result<Catalog, CatalogError> {
    let mut services = Vec::new();
    let mut seen = BTreeSet::new();
    for module in modules {
        if module.disaster_recovery() && !config.enable_dr_services {
            continue;
        }
        let catalog = module.catalog()?.filtered(config.min_stability);
        for service in catalog.services() {
            if !seen.insert(service.id().to_string()) {
                return Err(CatalogError::DuplicateServiceId(service.id().to_string()));
            }
            services.push(service.clone());
        }
    }
    Ok(Catalog::new(services))
}
