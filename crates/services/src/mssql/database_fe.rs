//! The database-from-existing manager: adopts a pre-existing database on the
//! parent DBMS instance's server instead of creating one.

use std::sync::Arc;

use serde_json::json;

use asb_core::{Plan, ValidationError};
use asb_engine::{
    empty_details, generate, required_detail, ArmDeployer, DatabasesClient, DeploymentRequest,
    DetailsMap, Instance, ModuleError, NoDetails, Pipeline, PipelineStep, ServiceManager,
    StepContext, StepFuture, StepInstance, StepOutput, StepPipeline,
};

use crate::common::{require_database, tags_from};

use super::common::DATABASE_FE_TEMPLATE;
use super::details::{DatabaseInstanceDetails, DbmsInstanceDetails};

type Details = DatabaseInstanceDetails;
type Inst<'a> = StepInstance<'a, Details, NoDetails>;
type Step<'a> = StepFuture<'a, Details, NoDetails>;

pub struct DatabaseFromExistingManager {
    arm: Arc<dyn ArmDeployer>,
    databases: Arc<dyn DatabasesClient>,
}

impl DatabaseFromExistingManager {
    pub fn new(
        arm: Arc<dyn ArmDeployer>,
        databases: Arc<dyn DatabasesClient>,
    ) -> DatabaseFromExistingManager {
        DatabaseFromExistingManager { arm, databases }
    }

    fn pre_provision<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            Ok(StepOutput::new(
                DatabaseInstanceDetails {
                    arm_deployment_name: generate::deployment_name(),
                    database_name: instance.provisioning_parameters().get_string("database"),
                },
                NoDetails {},
            ))
        })
    }

    fn get_database<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            let dt = &instance.details;
            let pdt: DbmsInstanceDetails = instance.parent_details()?;
            let server_name = required_detail("server", &pdt.server_name)?;
            let ppp = instance.parent_provisioning_parameters()?;
            require_database(
                self.databases.as_ref(),
                &ppp.get_string("resourceGroup"),
                server_name,
                &dt.database_name,
            )
            .await?;
            Ok(instance.unchanged())
        })
    }

    fn deploy_arm_template<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            let dt = &instance.details;
            let pdt: DbmsInstanceDetails = instance.parent_details()?;
            let server_name = required_detail("server", &pdt.server_name)?;
            let ppp = instance.parent_provisioning_parameters()?;

            let mut params = serde_json::Map::new();
            params.insert("serverName".to_string(), json!(server_name));
            params.insert("databaseName".to_string(), json!(dt.database_name));
            params.insert("location".to_string(), json!(ppp.get_string("location")));

            let resource_group = ppp.get_string("resourceGroup");
            let location = ppp.get_string("location");
            self.arm
                .deploy(DeploymentRequest {
                    deployment_name: &dt.arm_deployment_name,
                    resource_group: &resource_group,
                    location: &location,
                    template: DATABASE_FE_TEMPLATE,
                    template_parameters: params,
                    arm_parameters: serde_json::Map::new(),
                    tags: tags_from(instance.provisioning_parameters()),
                })
                .await?;
            Ok(instance.unchanged())
        })
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

impl ServiceManager for DatabaseFromExistingManager {
    fn provisioner(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::provisioner(
            self,
            vec![
                PipelineStep::new("preProvision", Self::pre_provision),
                PipelineStep::new("getDatabase", Self::get_database),
                PipelineStep::new("deployARMTemplate", Self::deploy_arm_template),
            ],
        )?))
    }

    fn updater(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::<Self, Details, NoDetails>::updater(self, vec![])?))
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

    fn validate_updating_parameters(&self, _instance: &Instance) -> Result<(), ValidationError> {
        Ok(())
    }

    fn empty_instance_details(&self) -> DetailsMap {
        empty_details::<Details>()
    }

    fn empty_binding_details(&self) -> DetailsMap {
        empty_details::<NoDetails>()
    }
}
