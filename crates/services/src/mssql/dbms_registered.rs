//! The registered DBMS manager: adopts a pre-existing, externally created
//! server instead of creating one. Provisioning validates the server's
//! existence and engine version, then probes connectivity with the supplied
//! administrator credentials before registering the deployment.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;

use asb_core::{InputParametersSchema, Plan, ValidationError};
use asb_engine::{
    empty_details, generate, ArmDeployer, ConnectionProbe, DeploymentRequest, DetailsMap,
    Instance, ModuleError, NoDetails, Pipeline, PipelineStep, ServersClient, ServiceManager,
    StepContext, StepFuture, StepInstance, StepOutput, StepPipeline,
};

use crate::common::{string_property, tags_from, tags_schema, validate_server};

use super::common::{fqdn_output, DBMS_REGISTERED_TEMPLATE};
use super::details::{DbmsInstanceDetails, SecureDbmsInstanceDetails};

type Details = DbmsInstanceDetails;
type Secure = SecureDbmsInstanceDetails;
type Inst<'a> = StepInstance<'a, Details, Secure>;
type Step<'a> = StepFuture<'a, Details, Secure>;

pub struct DbmsRegisteredManager {
    arm: Arc<dyn ArmDeployer>,
    servers: Arc<dyn ServersClient>,
    probe: Arc<dyn ConnectionProbe>,
    dns_suffix: String,
}

impl DbmsRegisteredManager {
    pub fn new(
        arm: Arc<dyn ArmDeployer>,
        servers: Arc<dyn ServersClient>,
        probe: Arc<dyn ConnectionProbe>,
        dns_suffix: impl Into<String>,
    ) -> DbmsRegisteredManager {
        DbmsRegisteredManager {
            arm,
            servers,
            probe,
            dns_suffix: dns_suffix.into(),
        }
    }

    pub(crate) fn provision_schema() -> InputParametersSchema {
        InputParametersSchema {
            required_properties: vec![
                "resourceGroup".to_string(),
                "location".to_string(),
                "server".to_string(),
                "administratorLogin".to_string(),
                "administratorLoginPassword".to_string(),
            ],
            secure_properties: vec!["administratorLoginPassword".to_string()],
            property_schemas: BTreeMap::from([
                (
                    "resourceGroup".to_string(),
                    string_property("Specifies the resource group of the existing server"),
                ),
                (
                    "location".to_string(),
                    string_property("Specifies the location of the existing server"),
                ),
                (
                    "server".to_string(),
                    string_property("Specifies the name of the existing server"),
                ),
                (
                    "administratorLogin".to_string(),
                    string_property(
                        "Specifies the administrator login name of the existing server",
                    ),
                ),
                (
                    "administratorLoginPassword".to_string(),
                    string_property(
                        "Specifies the administrator login password of the existing server",
                    ),
                ),
                ("tags".to_string(), tags_schema()),
            ]),
            ..Default::default()
        }
    }

    fn pre_provision<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            let pp = instance.provisioning_parameters();
            let spp = instance.secure_provisioning_parameters();
            Ok(StepOutput::new(
                DbmsInstanceDetails {
                    arm_deployment_name: generate::deployment_name(),
                    server_name: pp.get_string("server"),
                    administrator_login: pp.get_string("administratorLogin"),
                    fully_qualified_domain_name: None,
                },
                SecureDbmsInstanceDetails {
                    administrator_login_password: spp.get_string("administratorLoginPassword"),
                },
            ))
        })
    }

    fn get_server<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            let pp = instance.provisioning_parameters();
            let expected_version = instance.service_properties().extended_string("version");
            validate_server(
                self.servers.as_ref(),
                &pp.get_string("resourceGroup"),
                &instance.details.server_name,
                &expected_version,
                None,
            )
            .await?;
            Ok(instance.unchanged())
        })
    }

    fn test_connection<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            let dt = &instance.details;
            let fqdn = format!("{}.{}", dt.server_name, self.dns_suffix);
            self.probe
                .verify_administrator(
                    &fqdn,
                    &dt.administrator_login,
                    &instance.secure_details.administrator_login_password,
                )
                .await?;
            Ok(instance.unchanged())
        })
    }

    fn deploy_arm_template<'a>(&'a self, _ctx: &'a StepContext, instance: &'a Inst<'a>) -> Step<'a> {
        Box::pin(async move {
            let dt = &instance.details;
            let pp = instance.provisioning_parameters();
            let mut params = serde_json::Map::new();
            params.insert("serverName".to_string(), json!(dt.server_name));
            params.insert("location".to_string(), json!(pp.get_string("location")));

            let resource_group = pp.get_string("resourceGroup");
            let location = pp.get_string("location");
            let outputs = self
                .arm
                .deploy(DeploymentRequest {
                    deployment_name: &dt.arm_deployment_name,
                    resource_group: &resource_group,
                    location: &location,
                    template: DBMS_REGISTERED_TEMPLATE,
                    template_parameters: params,
                    arm_parameters: serde_json::Map::new(),
                    tags: tags_from(pp),
                })
                .await?;

            let mut details = dt.clone();
            details.fully_qualified_domain_name = Some(fqdn_output(&outputs)?);
            Ok(StepOutput::new(details, instance.secure_details.clone()))
        })
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

impl ServiceManager for DbmsRegisteredManager {
    fn provisioner(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::provisioner(
            self,
            vec![
                PipelineStep::new("preProvision", Self::pre_provision),
                PipelineStep::new("getServer", Self::get_server),
                PipelineStep::new("testConnection", Self::test_connection),
                PipelineStep::new("deployARMTemplate", Self::deploy_arm_template),
            ],
        )?))
    }

    fn updater(self: Arc<Self>, _plan: &Plan) -> Result<Arc<dyn Pipeline>, ModuleError> {
        Ok(Arc::new(StepPipeline::<Self, Details, Secure>::updater(self, vec![])?))
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
