//! The registered server-pair manager: adopts a pre-existing primary and
//! secondary server, validating both and probing connectivity on each before
//! registering the deployments.

use std::sync::Arc;

use serde_json::json;

use asb_core::{Plan, ValidationError};
use asb_engine::{
    empty_details, generate, ArmDeployer, ConnectionProbe, DeploymentRequest, DetailsMap,
    Instance, ModuleError, NoDetails, Pipeline, PipelineStep, ServersClient, ServiceManager,
    StepContext, StepError, StepFuture, StepInstance, StepOutput, StepPipeline,
};

use crate::common::{tags_from, validate_server};

use super::common::DBMS_PAIR_REGISTERED_TEMPLATE;
use super::details::{DbmsPairInstanceDetails, SecureDbmsPairInstanceDetails};

type Details = DbmsPairInstanceDetails;
type Secure = SecureDbmsPairInstanceDetails;
type Inst<'a> = StepInstance<'a, Details, Secure>;
type Step<'a> = StepFuture<'a, Details, Secure>;

/// Which half of the pair a step operates on.
#[derive(Clone, Copy)]
enum Side {
    Primary,
    Secondary,
}

pub struct DbmsPairRegisteredManager {
    arm: Arc<dyn ArmDeployer>,
    servers: Arc<dyn ServersClient>,
    probe: Arc<dyn ConnectionProbe>,
    dns_suffix: String,
}

impl DbmsPairRegisteredManager {
    pub fn new(
        arm: Arc<dyn ArmDeployer>,
        servers: Arc<dyn ServersClient>,
        probe: Arc<dyn ConnectionProbe>,
        dns_suffix: impl Into<String>,
    ) -> DbmsPairRegisteredManager {
        DbmsPairRegisteredManager {
            arm,
            servers,
            probe,
            dns_suffix: dns_suffix.into(),
        }
    }

    fn pre_provision<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            let pp = instance.provisioning_parameters();
            let spp = instance.secure_provisioning_parameters();
            Ok(StepOutput::new(
                DbmsPairInstanceDetails {
                    pri_arm_deployment_name: generate::deployment_name(),
                    pri_server_name: pp.get_string("primaryServer"),
                    pri_administrator_login: pp.get_string("primaryAdministratorLogin"),
                    pri_fully_qualified_domain_name: None,
                    sec_arm_deployment_name: generate::deployment_name(),
                    sec_server_name: pp.get_string("secondaryServer"),
                    sec_administrator_login: pp.get_string("secondaryAdministratorLogin"),
                    sec_fully_qualified_domain_name: None,
                },
                SecureDbmsPairInstanceDetails {
                    pri_administrator_login_password: spp
                        .get_string("primaryAdministratorLoginPassword"),
                    sec_administrator_login_password: spp
                        .get_string("secondaryAdministratorLoginPassword"),
                },
            ))
        })
    }

    async fn get_server_side<'a>(
        &self,
        instance: &'a Inst<'a>,
        side: Side,
    ) -> Result<StepOutput<Details, Secure>, StepError> {
        let pp = instance.provisioning_parameters();
        let dt = &instance.details;
        let expected_version = instance.service_properties().extended_string("version");
        let (resource_group, location, server_name) = match side {
            Side::Primary => (
                pp.get_string("primaryResourceGroup"),
                pp.get_string("primaryLocation"),
                &dt.pri_server_name,
            ),
            Side::Secondary => (
                pp.get_string("secondaryResourceGroup"),
                pp.get_string("secondaryLocation"),
                &dt.sec_server_name,
            ),
        };
        validate_server(
            self.servers.as_ref(),
            &resource_group,
            server_name,
            &expected_version,
            Some(&location),
        )
        .await?;
        Ok(instance.unchanged())
    }

    fn get_pri_server<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(self.get_server_side(instance, Side::Primary))
    }

    fn get_sec_server<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(self.get_server_side(instance, Side::Secondary))
    }

    async fn test_connection_side<'a>(
        &self,
        instance: &'a Inst<'a>,
        side: Side,
    ) -> Result<StepOutput<Details, Secure>, StepError> {
        let dt = &instance.details;
        let secure = &instance.secure_details;
        let (server_name, login, password) = match side {
            Side::Primary => (
                &dt.pri_server_name,
                &dt.pri_administrator_login,
                &secure.pri_administrator_login_password,
            ),
            Side::Secondary => (
                &dt.sec_server_name,
                &dt.sec_administrator_login,
                &secure.sec_administrator_login_password,
            ),
        };
        let fqdn = format!("{}.{}", server_name, self.dns_suffix);
        self.probe
            .verify_administrator(&fqdn, login, password)
            .await?;
        Ok(instance.unchanged())
    }

    fn test_pri_connection<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(self.test_connection_side(instance, Side::Primary))
    }

    fn test_sec_connection<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(self.test_connection_side(instance, Side::Secondary))
    }

    async fn deploy_side<'a>(
        &self,
        instance: &'a Inst<'a>,
        side: Side,
    ) -> Result<StepOutput<Details, Secure>, StepError> {
        let pp = instance.provisioning_parameters();
        let dt = &instance.details;
        let (deployment_name, resource_group, location, server_name) = match side {
            Side::Primary => (
                &dt.pri_arm_deployment_name,
                pp.get_string("primaryResourceGroup"),
                pp.get_string("primaryLocation"),
                &dt.pri_server_name,
            ),
            Side::Secondary => (
                &dt.sec_arm_deployment_name,
                pp.get_string("secondaryResourceGroup"),
                pp.get_string("secondaryLocation"),
                &dt.sec_server_name,
            ),
        };

        let mut params = serde_json::Map::new();
        params.insert("serverName".to_string(), json!(server_name));
        params.insert("location".to_string(), json!(location));
        let outputs = self
            .arm
            .deploy(DeploymentRequest {
                deployment_name,
                resource_group: &resource_group,
                location: &location,
                template: DBMS_PAIR_REGISTERED_TEMPLATE,
                template_parameters: params,
                arm_parameters: serde_json::Map::new(),
                tags: tags_from(pp),
            })
            .await?;

        let fqdn = outputs
            .get("fullyQualifiedDomainName")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        let mut details = dt.clone();
        match side {
            Side::Primary => details.pri_fully_qualified_domain_name = fqdn,
            Side::Secondary => details.sec_fully_qualified_domain_name = fqdn,
        }
        Ok(StepOutput::new(details, instance.secure_details.clone()))
    }

    fn deploy_pri_arm_template<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(self.deploy_side(instance, Side::Primary))
    }

    fn deploy_sec_arm_template<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(self.deploy_side(instance, Side::Secondary))
    }

    async fn delete_side<'a>(
        &self,
        instance: &'a Inst<'a>,
        side: Side,
    ) -> Result<StepOutput<Details, Secure>, StepError> {
        let pp = instance.provisioning_parameters();
        let dt = &instance.details;
        let (deployment_name, resource_group) = match side {
            Side::Primary => (
                &dt.pri_arm_deployment_name,
                pp.get_string("primaryResourceGroup"),
            ),
            Side::Secondary => (
                &dt.sec_arm_deployment_name,
                pp.get_string("secondaryResourceGroup"),
            ),
        };
        self.arm.delete(deployment_name, &resource_group).await?;
        Ok(instance.unchanged())
    }

    fn delete_pri_arm_deployment<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(self.delete_side(instance, Side::Primary))
    }

    fn delete_sec_arm_deployment<'a>(
        &'a self,
        _ctx: &'a StepContext,
        instance: &'a Inst<'a>,
    ) -> Step<'a> {
        Box::pin(self.delete_side(instance, Side::Secondary))
    }
}

impl ServiceManager for DbmsPairRegisteredManager {
    fn provisioner(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::provisioner(
            self,
            vec![
                PipelineStep::new("preProvision", Self::pre_provision),
                PipelineStep::new("getPriServer", Self::get_pri_server),
                PipelineStep::new("getSecServer", Self::get_sec_server),
                PipelineStep::new("testPriConnection", Self::test_pri_connection),
                PipelineStep::new("testSecConnection", Self::test_sec_connection),
                PipelineStep::new("deployPriARMTemplate", Self::deploy_pri_arm_template),
                PipelineStep::new("deploySecARMTemplate", Self::deploy_sec_arm_template),
            ],
        )?))
    }

    fn updater(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::<Self, Details, Secure>::updater(self, vec![])?))
    }

    fn deprovisioner(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::deprovisioner(
            self,
            vec![
                PipelineStep::new("deletePriARMDeployment", Self::delete_pri_arm_deployment),
                PipelineStep::new("deleteSecARMDeployment", Self::delete_sec_arm_deployment),
            ],
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
