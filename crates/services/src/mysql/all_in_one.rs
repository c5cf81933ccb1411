//! The MySQL all-in-one manager: a server and a single database provisioned
//! as one unit, with generated server name and administrator credentials.

use std::sync::Arc;

use serde_json::{json, Value};

use asb_core::{Parameters, Plan, ValidationError};
use asb_engine::{
    empty_details, generate, ArmDeployer, DeploymentRequest, DetailsMap, Instance, ModuleError,
    NoDetails, Pipeline, PipelineStep, ServiceManager, StepContext, StepError, StepFuture,
    StepInstance, StepOutput, StepPipeline,
};

use crate::common::{merged_update_parameters, tags_from, tier_details};

use super::common::{dbms_template_parameters, ALL_IN_ONE_TEMPLATE};
use super::details::{AllInOneInstanceDetails, SecureDbmsInstanceDetails};

type Details = AllInOneInstanceDetails;
type Secure = SecureDbmsInstanceDetails;
type Inst<'a> = StepInstance<'a, Details, Secure>;
type Step<'a> = StepFuture<'a, Details, Secure>;

pub struct AllInOneManager {
    arm: Arc<dyn ArmDeployer>,
}

impl AllInOneManager {
    pub fn new(arm: Arc<dyn ArmDeployer>) -> AllInOneManager {
        AllInOneManager { arm }
    }

    fn pre_provision<'a>(&'a self, _ctx: &'a StepContext, _instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            Ok(StepOutput::new(
                AllInOneInstanceDetails {
                    arm_deployment_name: generate::deployment_name(),
                    server_name: generate::server_name(),
                    administrator_login: generate::identifier(),
                    fully_qualified_domain_name: None,
                    database_name: generate::identifier(),
                },
                SecureDbmsInstanceDetails {
                    administrator_login_password: generate::password(),
                },
            ))
        })
    }

    fn deploy_arm_template<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            self.deploy(instance, instance.provisioning_parameters())
                .await
        })
    }

    fn update_arm_template<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            let pp = merged_update_parameters(
                instance.provisioning_parameters(),
                instance.updating_parameters(),
            );
            self.deploy(instance, &pp).await
        })
    }

    async fn deploy<'a>(
        &self,
        instance: &'a Inst<'a>,
        pp: &Parameters,
    ) -> Result<StepOutput<Details, Secure>, StepError> {
        let dt = &instance.details;
        let version = instance.service_properties().extended_string("version");
        let mut params = dbms_template_parameters(
            &dt.server_name,
            &dt.administrator_login,
            &instance.secure_details.administrator_login_password,
            pp,
            &version,
        );
        params.insert("databaseName".to_string(), json!(dt.database_name));
        for (key, value) in tier_details(instance.plan())?.tier_provision_parameters(pp)? {
            params.insert(key, value);
        }

        let resource_group = pp.get_string("resourceGroup");
        let location = pp.get_string("location");
        let outputs = self
            .arm
            .deploy(DeploymentRequest {
                deployment_name: &dt.arm_deployment_name,
                resource_group: &resource_group,
                location: &location,
                template: ALL_IN_ONE_TEMPLATE,
                template_parameters: params,
                arm_parameters: serde_json::Map::new(),
                tags: tags_from(pp),
            })
            .await?;

        let mut details = dt.clone();
        details.fully_qualified_domain_name = outputs
            .get("fullyQualifiedDomainName")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or(details.fully_qualified_domain_name);
        Ok(StepOutput::new(details, instance.secure_details.clone()))
    }

    fn delete_arm_deployment<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(async move {
            let pp = instance.provisioning_parameters();
            self.arm
                .delete(
                    &instance.details.arm_deployment_name,
                    &pp.get_string("resourceGroup"),
                )
                .await?;
            Ok(instance.unchanged())
        })
    }
}

impl ServiceManager for AllInOneManager {
    fn provisioner(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::provisioner(
            self,
            vec![
                PipelineStep::new("preProvision", Self::pre_provision),
                PipelineStep::new("deployARMTemplate", Self::deploy_arm_template),
            ],
        )?))
    }

    fn updater(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::updater(
            self,
            vec![PipelineStep::new(
                "updateARMTemplate",
                Self::update_arm_template,
            )],
        )?))
    }

    fn deprovisioner(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::deprovisioner(
            self,
            vec![PipelineStep::new(
                "deleteARMDeployment",
                Self::delete_arm_deployment,
            )],
        )?))
    }

    fn validate_updating_parameters(&self, instance: &Instance) -> Result<(), ValidationError> {
        crate::common::validate_tier_update(instance)
    }

    fn empty_instance_details(&self) -> DetailsMap {
        empty_details::<Details>()
    }

    fn empty_binding_details(&self) -> DetailsMap {
        empty_details::<NoDetails>()
    }
}
