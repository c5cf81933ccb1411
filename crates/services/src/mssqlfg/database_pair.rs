//! The database-pair manager: deploys the named database on both servers of
//! a registered pair, then the failover group joining them. Name
//! availability is checked up front — the database and failover group names
//! must still be absent on both sides.

use std::sync::Arc;

use asb_core::{Plan, ValidationError};
use asb_engine::{
    empty_details, generate, required_detail, ArmDeployer, DatabasesClient, DetailsMap,
    FailoverGroupsClient, Instance, ModuleError, NoDetails, Pipeline, PipelineStep,
    ServiceManager, StepContext, StepError, StepFuture, StepInstance, StepOutput, StepPipeline,
};

use crate::common::{
    merged_update_parameters, require_database_absent, require_failover_group_absent, tags_from,
    tier_details,
};

use super::common::{deploy_database, deploy_failover_group};
use super::details::{DatabasePairInstanceDetails, DbmsPairInstanceDetails};

type Details = DatabasePairInstanceDetails;
type Inst<'a> = StepInstance<'a, Details, NoDetails>;
type Step<'a> = StepFuture<'a, Details, NoDetails>;

pub struct DatabasePairManager {
    arm: Arc<dyn ArmDeployer>,
    databases: Arc<dyn DatabasesClient>,
    failover_groups: Arc<dyn FailoverGroupsClient>,
}

impl DatabasePairManager {
    pub fn new(
        arm: Arc<dyn ArmDeployer>,
        databases: Arc<dyn DatabasesClient>,
        failover_groups: Arc<dyn FailoverGroupsClient>,
    ) -> DatabasePairManager {
        DatabasePairManager {
            arm,
            databases,
            failover_groups,
        }
    }

    fn check_name_availability<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(async move {
            let pp = instance.provisioning_parameters();
            let ppp = instance.parent_provisioning_parameters()?;
            let pdt: DbmsPairInstanceDetails = instance.parent_details()?;
            let pri_server = required_detail("primaryServer", &pdt.pri_server_name)?;
            let sec_server = required_detail("secondaryServer", &pdt.sec_server_name)?;
            let database = pp.get_string("database");
            let failover_group = pp.get_string("failoverGroup");

            require_database_absent(
                self.databases.as_ref(),
                &ppp.get_string("primaryResourceGroup"),
                pri_server,
                &database,
            )
            .await?;
            require_database_absent(
                self.databases.as_ref(),
                &ppp.get_string("secondaryResourceGroup"),
                sec_server,
                &database,
            )
            .await?;
            require_failover_group_absent(
                self.failover_groups.as_ref(),
                &ppp.get_string("primaryResourceGroup"),
                pri_server,
                &failover_group,
            )
            .await?;
            Ok(instance.unchanged())
        })
    }

    fn pre_provision<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            let pp = instance.provisioning_parameters();
            Ok(StepOutput::new(
                DatabasePairInstanceDetails {
                    pri_arm_deployment_name: generate::deployment_name(),
                    sec_arm_deployment_name: generate::deployment_name(),
                    fg_arm_deployment_name: generate::deployment_name(),
                    failover_group_name: pp.get_string("failoverGroup"),
                    database_name: pp.get_string("database"),
                },
                NoDetails {},
            ))
        })
    }

    async fn deploy_database_side<'a>(
        &self,
        instance: &'a Inst<'a>,
        primary: bool,
        update: bool,
    ) -> Result<StepOutput<Details, NoDetails>, StepError> {
        let dt = &instance.details;
        let pdt: DbmsPairInstanceDetails = instance.parent_details()?;
        let ppp = instance.parent_provisioning_parameters()?;
        let pp = if update {
            merged_update_parameters(
                instance.provisioning_parameters(),
                instance.updating_parameters(),
            )
        } else {
            instance.provisioning_parameters().clone()
        };
        let tier = tier_details(instance.plan())?;

        let (deployment_name, resource_group, location, server_name) = if primary {
            (
                &dt.pri_arm_deployment_name,
                ppp.get_string("primaryResourceGroup"),
                ppp.get_string("primaryLocation"),
                required_detail("primaryServer", &pdt.pri_server_name)?.to_string(),
            )
        } else {
            (
                &dt.sec_arm_deployment_name,
                ppp.get_string("secondaryResourceGroup"),
                ppp.get_string("secondaryLocation"),
                required_detail("secondaryServer", &pdt.sec_server_name)?.to_string(),
            )
        };

        deploy_database(
            self.arm.as_ref(),
            deployment_name,
            &resource_group,
            &location,
            &server_name,
            &dt.database_name,
            &pp,
            tier,
            tags_from(instance.provisioning_parameters()),
        )
        .await?;
        Ok(instance.unchanged())
    }

    fn deploy_pri_arm_template<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(self.deploy_database_side(instance, true, false))
    }

    fn deploy_sec_arm_template<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(self.deploy_database_side(instance, false, false))
    }

    fn update_pri_arm_template<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(self.deploy_database_side(instance, true, true))
    }

    fn update_sec_arm_template<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(self.deploy_database_side(instance, false, true))
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

    async fn delete_deployment<'a>(
        &self,
        instance: &'a Inst<'a>,
        pick: fn(&Details) -> &String,
        primary_side: bool,
    ) -> Result<StepOutput<Details, NoDetails>, StepError> {
        let ppp = instance.parent_provisioning_parameters()?;
        let resource_group = if primary_side {
            ppp.get_string("primaryResourceGroup")
        } else {
            ppp.get_string("secondaryResourceGroup")
        };
        self.arm
            .delete(pick(&instance.details), &resource_group)
            .await?;
        Ok(instance.unchanged())
    }

    fn delete_fg_arm_deployment<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(self.delete_deployment(instance, |dt| &dt.fg_arm_deployment_name, true))
    }

    fn delete_sec_arm_deployment<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(self.delete_deployment(instance, |dt| &dt.sec_arm_deployment_name, false))
    }

    fn delete_pri_arm_deployment<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(self.delete_deployment(instance, |dt| &dt.pri_arm_deployment_name, true))
    }
}

impl ServiceManager for DatabasePairManager {
    fn provisioner(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::provisioner(
            self,
            vec![
                PipelineStep::new("checkNameAvailability", Self::check_name_availability),
                PipelineStep::new("preProvision", Self::pre_provision),
                PipelineStep::new("deployPriARMTemplate", Self::deploy_pri_arm_template),
                PipelineStep::new("deploySecARMTemplate", Self::deploy_sec_arm_template),
                PipelineStep::new("deployFgARMTemplate", Self::deploy_fg_arm_template),
            ],
        )?))
    }

    fn updater(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::updater(
            self,
            vec![
                PipelineStep::new("updatePriARMTemplate", Self::update_pri_arm_template),
                PipelineStep::new("updateSecARMTemplate", Self::update_sec_arm_template),
            ],
        )?))
    }

    fn deprovisioner(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        // Teardown order is the reverse of creation: the failover group
        // first, then the secondary, then the primary.
        Ok(Arc::new(StepPipeline::deprovisioner(
            self,
            vec![
                PipelineStep::new("deleteFgARMDeployment", Self::delete_fg_arm_deployment),
                PipelineStep::new("deleteSecARMDeployment", Self::delete_sec_arm_deployment),
                PipelineStep::new("deletePriARMDeployment", Self::delete_pri_arm_deployment),
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
