//! Ordered-step pipelines and the runner that drives them.
//!
//! A [`StepPipeline`] is the typed form a service manager builds: an ordered
//! list of uniquely named steps over the module's concrete details types.
//! The object-safe [`Pipeline`] trait is what the rest of the system sees;
//! the typed wrapper owns the decode-at-entry / encode-after-step boundary
//! so modules never cast persisted state at runtime.
//!
//! Execution contract:
//! - steps run strictly in declared order; step N+1 never starts before
//!   step N's returned details are durably committed
//! - on failure the remaining sequence is abandoned and the failing step's
//!   name is surfaced with the error; there is no automatic rollback
//! - a retried operation resumes at the failed step by name, re-invoking it
//!   against the latest persisted details

use std::sync::Arc;

use async_trait::async_trait;

use asb_storage::{InstanceStatus, InstanceStore, StorageError};

use crate::instance::{encode_details, DetailsError, DetailsMap, Instance, InstanceDetails};
use crate::step::{OperationKind, StepContext, StepError, StepFuture, StepInstance};

// ──────────────────────────────────────────────
// Typed pipelines
// ──────────────────────────────────────────────

/// The borrowed-call shape of a step: a method on the manager, taking the
/// step context and the typed instance view.
pub type StepRunFn<M, D, S> =
    for<'a> fn(&'a M, &'a StepContext, &'a StepInstance<'a, D, S>) -> StepFuture<'a, D, S>;

/// One named step of a pipeline.
pub struct PipelineStep<M, D, S> {
    name: &'static str,
    run: StepRunFn<M, D, S>,
}

impl<M, D, S> PipelineStep<M, D, S> {
    pub fn new(name: &'static str, run: StepRunFn<M, D, S>) -> PipelineStep<M, D, S> {
        PipelineStep { name, run }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// An ordered list of steps bound to the manager that implements them.
/// Zero steps is legal (a no-op operation, e.g. a parameter-only update).
pub struct StepPipeline<M, D, S> {
    operation: OperationKind,
    manager: Arc<M>,
    steps: Vec<PipelineStep<M, D, S>>,
}

impl<M, D, S> StepPipeline<M, D, S>
where
    M: Send + Sync + 'static,
    D: InstanceDetails,
    S: InstanceDetails,
{
    fn new(
        operation: OperationKind,
        manager: Arc<M>,
        steps: Vec<PipelineStep<M, D, S>>,
    ) -> Result<StepPipeline<M, D, S>, PipelineError> {
        for (i, step) in steps.iter().enumerate() {
            if steps[..i].iter().any(|s| s.name == step.name) {
                return Err(PipelineError::DuplicateStep(step.name.to_string()));
            }
        }
        Ok(StepPipeline {
            operation,
            manager,
            steps,
        })
    }

    pub fn provisioner(
        manager: Arc<M>,
        steps: Vec<PipelineStep<M, D, S>>,
    ) -> Result<StepPipeline<M, D, S>, PipelineError> {
        Self::new(OperationKind::Provision, manager, steps)
    }

    pub fn updater(
        manager: Arc<M>,
        steps: Vec<PipelineStep<M, D, S>>,
    ) -> Result<StepPipeline<M, D, S>, PipelineError> {
        Self::new(OperationKind::Update, manager, steps)
    }

    pub fn deprovisioner(
        manager: Arc<M>,
        steps: Vec<PipelineStep<M, D, S>>,
    ) -> Result<StepPipeline<M, D, S>, PipelineError> {
        Self::new(OperationKind::Deprovision, manager, steps)
    }
}

// ──────────────────────────────────────────────
// Erased pipeline interface
// ──────────────────────────────────────────────

/// The encoded result of one executed step, ready to persist.
#[derive(Debug, Clone)]
pub struct StepCommit {
    pub details: DetailsMap,
    pub secure_details: DetailsMap,
}

/// An error executing or constructing a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("duplicate step name: {0}")]
    DuplicateStep(String),

    #[error("unknown step: {0}")]
    UnknownStep(String),

    /// The failing step's name and operation, with the underlying cause.
    #[error("{operation} failed at step {step}: {source}")]
    StepFailed {
        operation: OperationKind,
        step: String,
        source: StepError,
    },

    #[error(transparent)]
    Details(#[from] DetailsError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The object-safe pipeline interface the engine and the lifecycle layer
/// consume. Implemented by [`StepPipeline`] for every details type.
#[async_trait]
pub trait Pipeline: Send + Sync {
    fn operation(&self) -> OperationKind;

    /// Step names in execution order.
    fn step_names(&self) -> Vec<&'static str>;

    /// Execute the named step against the instance's current state and
    /// return the encoded details to persist. Does not persist anything
    /// itself.
    async fn execute_step(
        &self,
        ctx: &StepContext,
        instance: &Instance,
    ) -> Result<StepCommit, PipelineError>;
}

#[async_trait]
impl<M, D, S> Pipeline for StepPipeline<M, D, S>
where
    M: Send + Sync + 'static,
    D: InstanceDetails,
    S: InstanceDetails,
{
    fn operation(&self) -> OperationKind {
        self.operation
    }

    fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name).collect()
    }

    async fn execute_step(
        &self,
        ctx: &StepContext,
        instance: &Instance,
    ) -> Result<StepCommit, PipelineError> {
        let step = self
            .steps
            .iter()
            .find(|s| s.name == ctx.step)
            .ok_or_else(|| PipelineError::UnknownStep(ctx.step.clone()))?;

        let typed: StepInstance<'_, D, S> = StepInstance::decode(instance)?;
        let output =
            (step.run)(self.manager.as_ref(), ctx, &typed)
                .await
                .map_err(|source| PipelineError::StepFailed {
                    operation: self.operation,
                    step: step.name.to_string(),
                    source,
                })?;

        Ok(StepCommit {
            details: encode_details(&output.details)?,
            secure_details: encode_details(&output.secure_details)?,
        })
    }
}

// ──────────────────────────────────────────────
// Runner
// ──────────────────────────────────────────────

/// Drives a pipeline step by step against one instance, persisting details
/// after every step and recording status transitions.
///
/// The runner assumes the persistence layer grants it exclusive access to
/// the instance for the duration of the operation (at most one in-flight
/// operation per instance ID).
pub struct PipelineRunner<'a> {
    store: &'a dyn InstanceStore,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(store: &'a dyn InstanceStore) -> PipelineRunner<'a> {
        PipelineRunner { store }
    }

    /// Execute `pipeline` against `instance`, starting at `resume_from` when
    /// given (the named step must exist) or at the first step otherwise.
    ///
    /// On success the terminal status is recorded: `Provisioned` for
    /// provision/update pipelines, record deletion for deprovision. On step
    /// failure the instance is left in `Failed` status carrying the step
    /// name, and the error is returned; the only forward path is a retry
    /// from that step or abandonment.
    pub async fn run(
        &self,
        pipeline: &dyn Pipeline,
        instance: &mut Instance,
        resume_from: Option<&str>,
    ) -> Result<(), PipelineError> {
        let names = pipeline.step_names();
        let start = match resume_from {
            Some(name) => names
                .iter()
                .position(|n| *n == name)
                .ok_or_else(|| PipelineError::UnknownStep(name.to_string()))?,
            None => 0,
        };
        let operation = pipeline.operation();

        for name in &names[start..] {
            let ctx = StepContext {
                instance_id: instance.instance_id.clone(),
                operation,
                step: (*name).to_string(),
            };
            self.store
                .set_status(&instance.instance_id, in_flight_status(operation, name))
                .await?;
            tracing::info!(
                instance_id = %instance.instance_id,
                operation = %operation,
                step = *name,
                "executing step"
            );

            match pipeline.execute_step(&ctx, instance).await {
                Ok(commit) => {
                    instance.details = commit.details;
                    instance.secure_details = commit.secure_details;
                    self.store
                        .update_details(
                            &instance.instance_id,
                            &instance.details,
                            &instance.secure_details,
                            in_flight_status(operation, name),
                        )
                        .await?;
                }
                Err(err) => {
                    tracing::warn!(
                        instance_id = %instance.instance_id,
                        operation = %operation,
                        step = *name,
                        error = %err,
                        "step failed"
                    );
                    self.store
                        .set_status(
                            &instance.instance_id,
                            InstanceStatus::Failed {
                                operation: operation.to_string(),
                                step: (*name).to_string(),
                                message: err.to_string(),
                            },
                        )
                        .await?;
                    return Err(err);
                }
            }
        }

        match operation {
            OperationKind::Provision | OperationKind::Update => {
                self.store
                    .set_status(&instance.instance_id, InstanceStatus::Provisioned)
                    .await?;
            }
            OperationKind::Deprovision => {
                self.store.delete(&instance.instance_id).await?;
            }
        }
        Ok(())
    }
}

fn in_flight_status(operation: OperationKind, step: &str) -> InstanceStatus {
    match operation {
        OperationKind::Provision => InstanceStatus::Provisioning {
            step: step.to_string(),
        },
        OperationKind::Update => InstanceStatus::Updating {
            step: step.to_string(),
        },
        OperationKind::Deprovision => InstanceStatus::Deprovisioning {
            step: step.to_string(),
        },
    }
}
