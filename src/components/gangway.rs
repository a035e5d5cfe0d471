//! Gangway, the kubectl login gateway in front of an OIDC provider.

use hcl::Body;
use hcl::eval::Context;
use serde::Serialize;

use super::{Component, DEFAULT_CLUSTER_ISSUER, Metadata, render_component_chart};
use crate::chart::RenderedManifests;
use crate::decode::{BodyDecoder, Decode, Diagnostics, component_subject, decode_body};
use crate::error::{RenderError, Result};

pub const NAME: &str = "gangway";
const NAMESPACE: &str = "gangway";

const DEFAULT_SCOPES: &[&str] = &["openid", "profile", "email", "offline_access"];
const DEFAULT_USERNAME_CLAIM: &str = "email";

pub(super) fn factory() -> Box<dyn Component> {
    Box::new(Gangway::new())
}

/// Decoded `component "gangway"` configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GangwayConfig {
    pub cluster_name: String,
    pub ingress_host: String,
    pub session_key: String,
    pub api_server_url: String,
    pub authorize_url: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub certmanager_cluster_issuer: String,
    pub scopes: Vec<String>,
    pub username_claim: String,
}

impl Decode for GangwayConfig {
    fn decode(decoder: &mut BodyDecoder<'_>) -> Self {
        Self {
            cluster_name: decoder.required_string("cluster_name"),
            ingress_host: decoder.required_string("ingress_host"),
            session_key: decoder.required_string("session_key"),
            api_server_url: decoder.required_string("api_server_url"),
            authorize_url: decoder.required_string("authorize_url"),
            token_url: decoder.required_string("token_url"),
            client_id: decoder.required_string("client_id"),
            client_secret: decoder.required_string("client_secret"),
            redirect_url: decoder.required_string("redirect_url"),
            certmanager_cluster_issuer: decoder
                .string_or("certmanager_cluster_issuer", DEFAULT_CLUSTER_ISSUER),
            scopes: decoder
                .optional_string_list("scopes")
                .unwrap_or_else(|| DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()),
            username_claim: decoder.string_or("username_claim", DEFAULT_USERNAME_CLAIM),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValuesOverlay<'a> {
    ingress: IngressValues<'a>,
    session_key: &'a str,
    client_secret: &'a str,
    config: ConfigValues<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IngressValues<'a> {
    host: &'a str,
    cluster_issuer: &'a str,
}

#[derive(Serialize)]
struct ConfigValues<'a> {
    #[serde(rename = "clusterName")]
    cluster_name: &'a str,
    #[serde(rename = "apiServerURL")]
    api_server_url: &'a str,
    #[serde(rename = "authorizeURL")]
    authorize_url: &'a str,
    #[serde(rename = "tokenURL")]
    token_url: &'a str,
    #[serde(rename = "clientID")]
    client_id: &'a str,
    #[serde(rename = "redirectURL")]
    redirect_url: &'a str,
    scopes: &'a [String],
    #[serde(rename = "usernameClaim")]
    username_claim: &'a str,
}

impl GangwayConfig {
    fn values_overlay(&self) -> std::result::Result<String, RenderError> {
        let overlay = ValuesOverlay {
            ingress: IngressValues {
                host: &self.ingress_host,
                cluster_issuer: &self.certmanager_cluster_issuer,
            },
            session_key: &self.session_key,
            client_secret: &self.client_secret,
            config: ConfigValues {
                cluster_name: &self.cluster_name,
                api_server_url: &self.api_server_url,
                authorize_url: &self.authorize_url,
                token_url: &self.token_url,
                client_id: &self.client_id,
                redirect_url: &self.redirect_url,
                scopes: &self.scopes,
                username_claim: &self.username_claim,
            },
        };
        Ok(serde_yaml::to_string(&overlay)?)
    }
}

/// The gangway component.
#[derive(Debug, Clone, Default)]
pub struct Gangway {
    config: GangwayConfig,
}

impl Gangway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &GangwayConfig {
        &self.config
    }
}

impl Component for Gangway {
    fn load_config(&mut self, body: Option<&Body>, ctx: Option<&Context<'_>>) -> Diagnostics {
        let (config, diagnostics) = decode_body(body, ctx, &component_subject(NAME));
        self.config = config;
        diagnostics
    }

    fn render_manifests(&self) -> Result<RenderedManifests> {
        let overlay = self.config.values_overlay()?;
        render_component_chart(&self.metadata(), &overlay)
    }

    fn metadata(&self) -> Metadata {
        Metadata::new(NAME, NAMESPACE)
    }
}
