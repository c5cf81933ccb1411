//! asb-engine: the instance lifecycle orchestration engine.
//!
//! Drives multi-stage, long-running, partially-idempotent operations against
//! the cloud control plane as ordered step pipelines. A pipeline is a list of
//! uniquely named steps executed strictly in order; after every step the
//! instance's details are durably persisted, so a crashed or failed operation
//! resumes from the step it stopped at — never from the beginning.
//!
//! Layering:
//!
//! - [`instance`] -- the mutable unit of work and its typed-details codec
//! - [`step`] / [`pipeline`] -- the Provisioner/Updater/Deprovisioner model
//!   and the runner that sequences, persists, and resumes
//! - [`module`] -- the polymorphic seam each service family implements
//! - [`arm`] / [`clients`] -- external boundaries (resource-manager
//!   deployments, read/validate clients, the connectivity probe) with
//!   in-memory fakes for tests
//! - [`generate`] -- unique identifiers and generated credentials
//! - [`config`] -- subscription configuration resolved once at startup

pub mod arm;
pub mod clients;
pub mod config;
pub mod generate;
pub mod instance;
pub mod module;
pub mod pipeline;
pub mod step;

// ── Convenience re-exports: key types ────────────────────────────────

pub use arm::{ArmDeployer, ArmError, DeploymentRequest, InMemoryArmDeployer};
pub use clients::{
    ClientError, ConnectionProbe, DatabaseState, DatabasesClient, FailoverGroupState,
    FailoverGroupsClient, FakeConnectionProbe, InMemoryDatabasesClient,
    InMemoryFailoverGroupsClient, InMemoryServersClient, ProbeError, ServerState, ServersClient,
};
pub use config::AzureConfig;
pub use instance::{
    decode_details, empty_details, encode_details, DetailsError, DetailsMap, Instance,
    InstanceDetails, NoDetails,
};
pub use module::{merged_catalog, Catalog, CatalogError, Module, ModuleError, Service, ServiceManager};
pub use pipeline::{
    Pipeline, PipelineError, PipelineRunner, PipelineStep, StepCommit, StepPipeline,
};
pub use step::{
    required_detail, OperationKind, StepContext, StepError, StepFuture, StepInstance, StepOutput,
};
