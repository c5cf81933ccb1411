//! The registered database-pair manager: adopts an existing database on both
//! servers and the failover group joining them. Nothing is deployed and
//! nothing is torn down — deprovisioning only releases the instance record.

use std::sync::Arc;

use asb_core::{InputParametersSchema, Plan, ValidationError};
use asb_engine::{
    empty_details, required_detail, DatabasesClient, DetailsMap, FailoverGroupsClient, Instance,
    ModuleError, NoDetails, Pipeline, PipelineStep, ServiceManager, StepContext, StepFuture,
    StepInstance, StepOutput, StepPipeline,
};

use std::collections::BTreeMap;

use crate::common::{require_database, require_failover_group, string_property};

use super::details::{DatabasePairRegisteredInstanceDetails, DbmsPairInstanceDetails};

type Details = DatabasePairRegisteredInstanceDetails;
type Inst<'a> = StepInstance<'a, Details, NoDetails>;
type Step<'a> = StepFuture<'a, Details, NoDetails>;

pub struct DatabasePairRegisteredManager {
    databases: Arc<dyn DatabasesClient>,
    failover_groups: Arc<dyn FailoverGroupsClient>,
}

impl DatabasePairRegisteredManager {
    pub fn new(
        databases: Arc<dyn DatabasesClient>,
        failover_groups: Arc<dyn FailoverGroupsClient>,
    ) -> DatabasePairRegisteredManager {
        DatabasePairRegisteredManager {
            databases,
            failover_groups,
        }
    }

    pub(crate) fn provision_schema() -> InputParametersSchema {
        InputParametersSchema {
            required_properties: vec!["failoverGroup".to_string(), "database".to_string()],
            property_schemas: BTreeMap::from([
                (
                    "failoverGroup".to_string(),
                    string_property("The name of the existing failover group"),
                ),
                (
                    "database".to_string(),
                    string_property("The name of the existing database"),
                ),
            ]),
            ..Default::default()
        }
    }

    fn pre_provision<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            let pp = instance.provisioning_parameters();
            Ok(StepOutput::new(
                DatabasePairRegisteredInstanceDetails {
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

    fn get_sec_database<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            let pdt: DbmsPairInstanceDetails = instance.parent_details()?;
            let ppp = instance.parent_provisioning_parameters()?;
            require_database(
                self.databases.as_ref(),
                &ppp.get_string("secondaryResourceGroup"),
                required_detail("secondaryServer", &pdt.sec_server_name)?,
                &instance.details.database_name,
            )
            .await?;
            Ok(instance.unchanged())
        })
    }

    fn get_failover_group<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(async move {
            let pdt: DbmsPairInstanceDetails = instance.parent_details()?;
            let ppp = instance.parent_provisioning_parameters()?;
            require_failover_group(
                self.failover_groups.as_ref(),
                &ppp.get_string("primaryResourceGroup"),
                required_detail("primaryServer", &pdt.pri_server_name)?,
                &instance.details.failover_group_name,
            )
            .await?;
            Ok(instance.unchanged())
        })
    }
}

impl ServiceManager for DatabasePairRegisteredManager {
    fn provisioner(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::provisioner(
            self,
            vec![
                PipelineStep::new("preProvision", Self::pre_provision),
                PipelineStep::new("getPriDatabase", Self::get_pri_database),
                PipelineStep::new("getSecDatabase", Self::get_sec_database),
                PipelineStep::new("getFailoverGroup", Self::get_failover_group),
            ],
        )?))
    }

    fn updater(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::<Self, Details, NoDetails>::updater(self, vec![])?))
    }

    fn deprovisioner(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::<Self, Details, NoDetails>::deprovisioner(self, vec![])?))
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
