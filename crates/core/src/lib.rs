//! asb-core: catalog, plan, and parameter-schema model for the Azure
//! service broker.
//!
//! This crate carries the data model that everything else is built on:
//! service/plan catalog entries, the stability ladder that gates what a
//! catalog exposes, typed parameter containers, and the declarative
//! input-parameter schema used to validate and document caller input
//! before any provisioning step runs.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`Parameters`] -- validated key/value input with typed getters
//! - [`InputParametersSchema`] / [`PropertySchema`] -- declarative input contract
//! - [`ServiceProperties`] / [`Plan`] / [`PlanProperties`] -- catalog entries
//! - [`PlanDetails`] -- per-tier sizing/SKU strategy seam
//! - [`Stability`] / [`CatalogConfig`] -- catalog gating
//! - [`ValidationError`] -- single-property validation failure

pub mod catalog;
pub mod config;
pub mod error;
pub mod params;
pub mod schema;
pub mod stability;

// ── Convenience re-exports: key types ────────────────────────────────

pub use catalog::{
    Plan, PlanDetails, PlanProperties, PlanSchemas, ServiceMetadata, ServicePlanMetadata,
    ServiceProperties,
};
pub use config::{CatalogConfig, ConfigError};
pub use error::ValidationError;
pub use params::{
    BindingParameters, ParameterMap, Parameters, ProvisioningParameters, SecureBindingParameters,
    SecureProvisioningParameters, UpdatingParameters,
};
pub use schema::{
    ArrayPropertySchema, InputParametersSchema, IntPropertySchema, ObjectPropertySchema,
    PropertySchema, PropertyValidator, StringPropertySchema,
};
pub use stability::Stability;
