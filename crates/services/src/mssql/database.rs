//! The database-only manager: creates a database (generated name) on its
//! parent DBMS instance's server.

use std::sync::Arc;

use serde_json::json;

use asb_core::{Parameters, Plan, ValidationError};
use asb_engine::{
    empty_details, generate, required_detail, ArmDeployer, DeploymentRequest, DetailsMap,
    Instance, ModuleError, NoDetails, Pipeline, PipelineStep, ServiceManager, StepContext,
    StepError, StepFuture, StepInstance, StepOutput, StepPipeline,
};

use crate::common::{merged_update_parameters, tags_from, tier_details};

use super::common::DATABASE_TEMPLATE;
use super::details::{DatabaseInstanceDetails, DbmsInstanceDetails};

type Details = DatabaseInstanceDetails;
type Inst<'a> = StepInstance<'a, Details, NoDetails>;
type Step<'a> = StepFuture<'a, Details, NoDetails>;

pub struct DatabaseManager {
    arm: Arc<dyn ArmDeployer>,
}

impl DatabaseManager {
    pub fn new(arm: Arc<dyn ArmDeployer>) -> DatabaseManager {
        DatabaseManager { arm }
    }

    fn pre_provision<'a>(&'a self, _ctx: &'a StepContext, _instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            Ok(StepOutput::new(
                DatabaseInstanceDetails {
                    arm_deployment_name: generate::deployment_name(),
                    database_name: generate::identifier(),
                },
                NoDetails {},
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
    ) -> Result<StepOutput<Details, NoDetails>, StepError> {
        let dt = &instance.details;
        let pdt: DbmsInstanceDetails = instance.parent_details()?;
        let server_name = required_detail("server", &pdt.server_name)?;
        let ppp = instance.parent_provisioning_parameters()?;

        let mut params = tier_details(instance.plan())?.tier_provision_parameters(pp)?;
        params.insert("serverName".to_string(), json!(server_name));
        params.insert("databaseName".to_string(), json!(dt.database_name));
        params.insert(
            "location".to_string(),
            json!(ppp.get_string("location")),
        );

        let resource_group = ppp.get_string("resourceGroup");
        let location = ppp.get_string("location");
        self.arm
            .deploy(DeploymentRequest {
                deployment_name: &dt.arm_deployment_name,
                resource_group: &resource_group,
                location: &location,
                template: DATABASE_TEMPLATE,
                template_parameters: params,
                arm_parameters: serde_json::Map::new(),
                tags: tags_from(instance.provisioning_parameters()),
            })
            .await?;
        Ok(instance.unchanged())
    }

    fn delete_arm_deployment<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(async move {
            let ppp = instance.parent_provisioning_parameters()?;
            self.arm
                .delete(
                    &instance.details.arm_deployment_name,
                    &ppp.get_string("resourceGroup"),
                )
                .await?;
            Ok(instance.unchanged())
        })
    }
}

impl ServiceManager for DatabaseManager {
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
