//! Runner semantics: strict ordering, per-step persistence, failure
//! attribution, and resume-from-named-step.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use asb_core::{Plan, PlanProperties, ServiceProperties, Stability, ValidationError};
use asb_engine::{
    empty_details, Instance, ModuleError, NoDetails, OperationKind, Pipeline, PipelineError,
    PipelineRunner, PipelineStep, Service, ServiceManager, StepContext, StepError, StepFuture,
    StepInstance, StepOutput, StepPipeline,
};
use asb_storage::{InstanceStatus, InstanceStore, MemoryStore};

// ──────────────────────────────────────────────
// A minimal manager that records which steps ran
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct TraceDetails {
    #[serde(rename = "stepsRun")]
    steps_run: Vec<String>,
}

#[derive(Default)]
struct TraceManager {
    /// Number of times the `flaky` step should still fail.
    failures_remaining: AtomicU32,
}

type Inst<'a> = StepInstance<'a, TraceDetails, NoDetails>;

impl TraceManager {
    fn record<'a>(
        &'a self,
        ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> StepFuture<'a, TraceDetails, NoDetails> {
        Box::pin(async move {
            let mut details = instance.details.clone();
            details.steps_run.push(ctx.step.clone());
            Ok(StepOutput::new(details, NoDetails {}))
        })
    }

    fn flaky<'a>(
        &'a self,
        ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> StepFuture<'a, TraceDetails, NoDetails> {
        Box::pin(async move {
            if self.failures_remaining.load(Ordering::SeqCst) > 0 {
                self.failures_remaining.fetch_sub(1, Ordering::SeqCst);
                return Err(StepError::other("transient failure"));
            }
            let mut details = instance.details.clone();
            details.steps_run.push(ctx.step.clone());
            Ok(StepOutput::new(details, NoDetails {}))
        })
    }
}

impl ServiceManager for TraceManager {
    fn provisioner(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::provisioner(
            self,
            vec![
                PipelineStep::new("first", Self::record),
                PipelineStep::new("flaky", Self::flaky),
                PipelineStep::new("last", Self::record),
            ],
        )?))
    }

    fn updater(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::<Self, TraceDetails, NoDetails>::updater(self, vec![])?))
    }

    fn deprovisioner(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::deprovisioner(
            self,
            vec![PipelineStep::new("teardown", Self::record)],
        )?))
    }

    fn validate_updating_parameters(&self, _instance: &Instance) -> Result<(), ValidationError> {
        Ok(())
    }

    fn empty_instance_details(&self) -> asb_engine::DetailsMap {
        empty_details::<TraceDetails>()
    }

    fn empty_binding_details(&self) -> asb_engine::DetailsMap {
        empty_details::<NoDetails>()
    }
}

fn test_service(manager: Arc<dyn ServiceManager>) -> Service {
    Service::new(
        ServiceProperties {
            id: "svc-1".to_string(),
            name: "trace-service".to_string(),
            ..Default::default()
        },
        manager,
        vec![Plan::new(PlanProperties {
            id: "plan-1".to_string(),
            name: "trace".to_string(),
            stability: Stability::Stable,
            ..Default::default()
        })],
    )
}

fn new_instance(manager: &Arc<TraceManager>) -> Instance {
    let service = test_service(manager.clone() as Arc<dyn ServiceManager>);
    let plan = service.plans()[0].clone();
    Instance {
        instance_id: "inst-1".to_string(),
        service,
        plan,
        provisioning_parameters: Default::default(),
        secure_provisioning_parameters: Default::default(),
        updating_parameters: None,
        details: empty_details::<TraceDetails>(),
        secure_details: empty_details::<NoDetails>(),
        parent: None,
    }
}

async fn seed(store: &MemoryStore, instance: &Instance) {
    store
        .save(instance.to_record(InstanceStatus::Provisioning {
            step: "first".to_string(),
        }))
        .await
        .unwrap();
}

fn steps_run(instance: &Instance) -> Vec<String> {
    instance.decode_details::<TraceDetails>().unwrap().steps_run
}

// ──────────────────────────────────────────────
// Scenarios
// ──────────────────────────────────────────────

#[tokio::test]
async fn steps_execute_in_declared_order() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let manager = Arc::new(TraceManager::default());
    let store = MemoryStore::new();
    let mut instance = new_instance(&manager);
    seed(&store, &instance).await;

    let pipeline = manager.clone().provisioner(&instance.plan.clone()).unwrap();
    PipelineRunner::new(&store)
        .run(pipeline.as_ref(), &mut instance, None)
        .await
        .unwrap();

    assert_eq!(steps_run(&instance), vec!["first", "flaky", "last"]);
    let record = store.get("inst-1").await.unwrap();
    assert_eq!(record.status, InstanceStatus::Provisioned);
    assert_eq!(record.details, instance.details);
}

#[tokio::test]
async fn failure_aborts_and_attributes_the_step() {
    let manager = Arc::new(TraceManager::default());
    manager.failures_remaining.store(1, Ordering::SeqCst);
    let store = MemoryStore::new();
    let mut instance = new_instance(&manager);
    seed(&store, &instance).await;

    let pipeline = manager.clone().provisioner(&instance.plan.clone()).unwrap();
    let err = PipelineRunner::new(&store)
        .run(pipeline.as_ref(), &mut instance, None)
        .await
        .unwrap_err();

    match err {
        PipelineError::StepFailed {
            operation, step, ..
        } => {
            assert_eq!(operation, OperationKind::Provision);
            assert_eq!(step, "flaky");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Work completed before the failure is durable; the failed step is not.
    assert_eq!(steps_run(&instance), vec!["first"]);
    let record = store.get("inst-1").await.unwrap();
    match record.status {
        InstanceStatus::Failed { step, .. } => assert_eq!(step, "flaky"),
        other => panic!("unexpected status: {other:?}"),
    }
}

#[tokio::test]
async fn retry_resumes_from_the_failed_step_only() {
    let manager = Arc::new(TraceManager::default());
    manager.failures_remaining.store(1, Ordering::SeqCst);
    let store = MemoryStore::new();
    let mut instance = new_instance(&manager);
    seed(&store, &instance).await;

    let pipeline = manager.clone().provisioner(&instance.plan.clone()).unwrap();
    let runner = PipelineRunner::new(&store);
    runner
        .run(pipeline.as_ref(), &mut instance, None)
        .await
        .unwrap_err();

    // Re-run from the failed step with the persisted details: earlier steps
    // are not re-invoked, and the remaining sequence is reproduced.
    runner
        .run(pipeline.as_ref(), &mut instance, Some("flaky"))
        .await
        .unwrap();

    assert_eq!(steps_run(&instance), vec!["first", "flaky", "last"]);
    let record = store.get("inst-1").await.unwrap();
    assert_eq!(record.status, InstanceStatus::Provisioned);
}

#[tokio::test]
async fn resume_from_unknown_step_is_rejected() {
    let manager = Arc::new(TraceManager::default());
    let store = MemoryStore::new();
    let mut instance = new_instance(&manager);
    seed(&store, &instance).await;

    let pipeline = manager.clone().provisioner(&instance.plan.clone()).unwrap();
    let err = PipelineRunner::new(&store)
        .run(pipeline.as_ref(), &mut instance, Some("notAStep"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnknownStep(name) if name == "notAStep"));
}

#[tokio::test]
async fn zero_step_pipeline_is_a_legal_noop() {
    let manager = Arc::new(TraceManager::default());
    let store = MemoryStore::new();
    let mut instance = new_instance(&manager);
    seed(&store, &instance).await;

    let updater = manager.clone().updater(&instance.plan.clone()).unwrap();
    assert!(updater.step_names().is_empty());
    PipelineRunner::new(&store)
        .run(updater.as_ref(), &mut instance, None)
        .await
        .unwrap();
    let record = store.get("inst-1").await.unwrap();
    assert_eq!(record.status, InstanceStatus::Provisioned);
}

#[tokio::test]
async fn deprovision_completion_deletes_the_record() {
    let manager = Arc::new(TraceManager::default());
    let store = MemoryStore::new();
    let mut instance = new_instance(&manager);
    seed(&store, &instance).await;

    let deprovisioner = manager
        .clone()
        .deprovisioner(&instance.plan.clone())
        .unwrap();
    PipelineRunner::new(&store)
        .run(deprovisioner.as_ref(), &mut instance, None)
        .await
        .unwrap();

    assert!(store.get("inst-1").await.is_err());
}

#[tokio::test]
async fn duplicate_step_names_are_rejected_at_construction() {
    let manager = Arc::new(TraceManager::default());
    let result = StepPipeline::provisioner(
        manager,
        vec![
            PipelineStep::new("preProvision", TraceManager::record),
            PipelineStep::new("preProvision", TraceManager::record),
        ],
    );
    assert!(matches!(result, Err(PipelineError::DuplicateStep(name)) if name == "preProvision"));
}

#[tokio::test]
async fn mismatched_details_shape_fails_the_operation() {
    let manager = Arc::new(TraceManager::default());
    let store = MemoryStore::new();
    let mut instance = new_instance(&manager);
    // Corrupt the persisted shape: stepsRun must be an array.
    instance
        .details
        .insert("stepsRun".to_string(), json!("not-an-array"));
    seed(&store, &instance).await;

    let pipeline = manager.clone().provisioner(&instance.plan.clone()).unwrap();
    let err = PipelineRunner::new(&store)
        .run(pipeline.as_ref(), &mut instance, None)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Details(_)));
}
