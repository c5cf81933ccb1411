//! The database-pair-from-existing manager: adopts an existing primary
//! database and builds out the rest of the pair — the secondary database and
//! the failover group.

use std::sync::Arc;

use asb_core::{Plan, ValidationError};
use asb_engine::{
    empty_details, generate, required_detail, ArmDeployer, DatabasesClient, DetailsMap, Instance,
    ModuleError, NoDetails, Pipeline, PipelineStep, ServiceManager, StepContext, StepFuture,
    StepInstance, StepOutput, StepPipeline,
};

use crate::common::{require_database, tags_from, tier_details};

use super::common::{deploy_database, deploy_failover_group};
use super::details::{DatabasePairFeInstanceDetails, DbmsPairInstanceDetails};

type Details = DatabasePairFeInstanceDetails;
type Inst<'a> = StepInstance<'a, Details, NoDetails>;
type Step<'a> = StepFuture<'a, Details, NoDetails>;

pub struct DatabasePairFromExistingManager {
    arm: Arc<dyn ArmDeployer>,
    databases: Arc<dyn DatabasesClient>,
}

impl DatabasePairFromExistingManager {
    pub fn new(
        arm: Arc<dyn ArmDeployer>,
        databases: Arc<dyn DatabasesClient>,
    ) -> DatabasePairFromExistingManager {
        DatabasePairFromExistingManager { arm, databases }
    }

    fn pre_provision<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            let pp = instance.provisioning_parameters();
            Ok(StepOutput::new(
                DatabasePairFeInstanceDetails {
                    sec_arm_deployment_name: generate::deployment_name(),
                    fg_arm_deployment_name: generate::deployment_name(),
                    failover_group_name: pp.get_string("failoverGroup"),
                    database_name: pp.get_string("database"),
                },
                NoDetails {},
            ))
        })
    }

    fn get_pri_database<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            let pdt: DbmsPairInstanceDetails = instance.parent_details()?;
            let ppp = instance.parent_provisioning_parameters()?;
            require_database(
                self.databases.as_ref(),
                &ppp.get_string("primaryResourceGroup"),
                required_detail("primaryServer", &pdt.pri_server_name)?,
                &instance.details.database_name,
            )
            .await?;
            Ok(instance.unchanged())
        })
    }

    fn deploy_sec_arm_template<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(async move {
            let dt = &instance.details;
            let pdt: DbmsPairInstanceDetails = instance.parent_details()?;
            let ppp = instance.parent_provisioning_parameters()?;
            deploy_database(
                self.arm.as_ref(),
                &dt.sec_arm_deployment_name,
                &ppp.get_string("secondaryResourceGroup"),
                &ppp.get_string("secondaryLocation"),
                required_detail("secondaryServer", &pdt.sec_server_name)?,
                &dt.database_name,
                instance.provisioning_parameters(),
                tier_details(instance.plan())?,
                tags_from(instance.provisioning_parameters()),
            )
            .await?;
            Ok(instance.unchanged())
        })
    }

    fn deploy_fg_arm_template<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(async move {
            let dt = &instance.details;
            let pdt: DbmsPairInstanceDetails = instance.parent_details()?;
            let ppp = instance.parent_provisioning_parameters()?;
            deploy_failover_group(
                self.arm.as_ref(),
                &dt.fg_arm_deployment_name,
                &ppp.get_string("primaryResourceGroup"),
                &ppp.get_string("primaryLocation"),
                required_detail("primaryServer", &pdt.pri_server_name)?,
                required_detail("secondaryServer", &pdt.sec_server_name)?,
                &dt.failover_group_name,
                &dt.database_name,
                tags_from(instance.provisioning_parameters()),
            )
            .await?;
            Ok(instance.unchanged())
        })
    }

    fn delete_fg_arm_deployment<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(async move {
            let ppp = instance.parent_provisioning_parameters()?;
            self.arm
                .delete(
                    &instance.details.fg_arm_deployment_name,
                    &ppp.get_string("primaryResourceGroup"),
                )
                .await?;
            Ok(instance.unchanged())
        })
    }

    fn delete_sec_arm_deployment<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(async move {
            let ppp = instance.parent_provisioning_parameters()?;
            self.arm
                .delete(
                    &instance.details.sec_arm_deployment_name,
                    &ppp.get_string("secondaryResourceGroup"),
                )
                .await?;
            Ok(instance.unchanged())
        })
    }
}

impl ServiceManager for DatabasePairFromExistingManager {
    fn provisioner(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::provisioner(
            self,
            vec![
                PipelineStep::new("preProvision", Self::pre_provision),
                PipelineStep::new("getPriDatabase", Self::get_pri_database),
                PipelineStep::new("deploySecARMTemplate", Self::deploy_sec_arm_template),
                PipelineStep::new("deployFgARMTemplate", Self::deploy_fg_arm_template),
            ],
        )?))
    }

    fn updater(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::<Self, Details, NoDetails>::updater(self, vec![])?))
    }

    fn deprovisioner(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::deprovisioner(
            self,
            vec![
                PipelineStep::new("deleteFgARMDeployment", Self::delete_fg_arm_deployment),
                PipelineStep::new("deleteSecARMDeployment", Self::delete_sec_arm_deployment),
            ],
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
