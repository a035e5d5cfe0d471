//! Dex, the OpenID Connect identity broker.
//!
//! ```hcl
//! component "dex" {
//!   ingress_host = "dex.example.com"
//!   issuer_host  = "dex.example.com"
//!
//!   connector "github" {
//!     id   = "github"
//!     name = "GitHub"
//!     config {
//!       client_id       = "..."
//!       client_secret   = "..."
//!       redirect_uri    = "https://dex.example.com/callback"
//!       team_name_field = "slug"
//!       org {
//!         name  = "example"
//!         teams = ["admins"]
//!       }
//!     }
//!   }
//!
//!   static_client {
//!     id            = "gangway"
//!     name          = "gangway"
//!     secret        = "..."
//!     redirect_uris = ["https://gangway.example.com/callback"]
//!   }
//! }
//! ```

use hcl::Body;
use hcl::eval::Context;
use serde::Serialize;

use super::{Component, DEFAULT_CLUSTER_ISSUER, Metadata, render_component_chart};
use crate::chart::RenderedManifests;
use crate::decode::{BodyDecoder, Decode, Diagnostics, component_subject, decode_body};
use crate::error::{RenderError, Result};

pub const NAME: &str = "dex";
const NAMESPACE: &str = "dex";

const CONNECTOR_BLOCK: &str = "connector";
const CONNECTOR_TYPES: &[&str] = &["github", "oidc", "google"];
const DEFAULT_SERVICE_ACCOUNT_FILE_PATH: &str = "/etc/dex/gsuite/credentials.json";

pub(super) fn factory() -> Box<dyn Component> {
    Box::new(Dex::new())
}

/// Decoded `component "dex"` configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DexConfig {
    pub ingress_host: String,
    pub issuer_host: String,
    pub certmanager_cluster_issuer: String,
    pub connectors: Vec<Connector>,
    pub static_clients: Vec<StaticClient>,
}

/// An upstream identity provider, selected by the `connector` block label.
///
/// Serializes to dex's own connector format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Connector {
    Github(ConnectorSpec<GithubConfig>),
    Oidc(ConnectorSpec<OidcConfig>),
    Google(ConnectorSpec<GoogleConfig>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConnectorSpec<C> {
    pub id: String,
    pub name: String,
    pub config: C,
}

impl<C: Decode + Default> Decode for ConnectorSpec<C> {
    fn decode(decoder: &mut BodyDecoder<'_>) -> Self {
        Self {
            id: decoder.required_string("id"),
            name: decoder.required_string("name"),
            config: decoder.decode_required_block("config").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GithubConfig {
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    #[serde(rename = "redirectURI")]
    pub redirect_uri: String,
    #[serde(rename = "teamNameField")]
    pub team_name_field: String,
    #[serde(rename = "loadAllGroups")]
    pub load_all_groups: bool,
    #[serde(rename = "useLoginAsID")]
    pub use_login_as_id: bool,
    pub orgs: Vec<Org>,
}

impl Decode for GithubConfig {
    fn decode(decoder: &mut BodyDecoder<'_>) -> Self {
        Self {
            client_id: decoder.required_string("client_id"),
            client_secret: decoder.required_string("client_secret"),
            redirect_uri: decoder.required_string("redirect_uri"),
            team_name_field: decoder.required_string("team_name_field"),
            load_all_groups: decoder.optional_bool("load_all_groups"),
            use_login_as_id: decoder.optional_bool("use_login_as_id"),
            orgs: decoder.decode_blocks("org"),
        }
    }
}

/// GitHub organization whose teams map to groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Org {
    pub name: String,
    pub teams: Vec<String>,
}

impl Decode for Org {
    fn decode(decoder: &mut BodyDecoder<'_>) -> Self {
        Self {
            name: decoder.required_string("name"),
            teams: decoder.required_string_list("teams"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OidcConfig {
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    #[serde(rename = "redirectURI")]
    pub redirect_uri: String,
    pub issuer: String,
    #[serde(rename = "basicAuthUnsupported")]
    pub basic_auth_unsupported: bool,
    #[serde(rename = "insecureSkipEmailVerified")]
    pub insecure_skip_email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    #[serde(rename = "userIDKey", skip_serializing_if = "Option::is_none")]
    pub user_id_key: Option<String>,
    #[serde(rename = "userNameKey", skip_serializing_if = "Option::is_none")]
    pub user_name_key: Option<String>,
}

impl Decode for OidcConfig {
    fn decode(decoder: &mut BodyDecoder<'_>) -> Self {
        Self {
            client_id: decoder.required_string("client_id"),
            client_secret: decoder.required_string("client_secret"),
            redirect_uri: decoder.required_string("redirect_uri"),
            issuer: decoder.required_string("issuer"),
            basic_auth_unsupported: decoder.optional_bool("basic_auth_unsupported"),
            insecure_skip_email_verified: decoder.optional_bool("insecure_skip_email_verified"),
            scopes: decoder.optional_string_list("scopes"),
            user_id_key: decoder.optional_string("user_id_key"),
            user_name_key: decoder.optional_string("user_name_key"),
        }
    }
}

/// Google connector. Group lookups use a G Suite service account whose
/// credentials are mounted from the `dex-gsuite-credentials` secret.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GoogleConfig {
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    #[serde(rename = "redirectURI")]
    pub redirect_uri: String,
    #[serde(rename = "adminEmail")]
    pub admin_email: String,
    #[serde(rename = "hostedDomains", skip_serializing_if = "Vec::is_empty")]
    pub hosted_domains: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(rename = "serviceAccountFilePath")]
    pub service_account_file_path: String,
}

impl Decode for GoogleConfig {
    fn decode(decoder: &mut BodyDecoder<'_>) -> Self {
        Self {
            client_id: decoder.required_string("client_id"),
            client_secret: decoder.required_string("client_secret"),
            redirect_uri: decoder.required_string("redirect_uri"),
            admin_email: decoder.required_string("admin_email"),
            hosted_domains: decoder
                .optional_string_list("hosted_domains")
                .unwrap_or_default(),
            groups: decoder.optional_string_list("groups").unwrap_or_default(),
            service_account_file_path: decoder.string_or(
                "service_account_file_path",
                DEFAULT_SERVICE_ACCOUNT_FILE_PATH,
            ),
        }
    }
}

/// OAuth2 client registered with dex, e.g. gangway.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StaticClient {
    pub id: String,
    pub name: String,
    pub secret: String,
    #[serde(rename = "redirectURIs")]
    pub redirect_uris: Vec<String>,
}

impl Decode for StaticClient {
    fn decode(decoder: &mut BodyDecoder<'_>) -> Self {
        Self {
            id: decoder.required_string("id"),
            name: decoder.required_string("name"),
            secret: decoder.required_string("secret"),
            redirect_uris: decoder.required_string_list("redirect_uris"),
        }
    }
}

impl Decode for DexConfig {
    fn decode(decoder: &mut BodyDecoder<'_>) -> Self {
        let ingress_host = decoder.required_string("ingress_host");
        let issuer_host = decoder.required_string("issuer_host");
        let certmanager_cluster_issuer =
            decoder.string_or("certmanager_cluster_issuer", DEFAULT_CLUSTER_ISSUER);

        let blocks = decoder.blocks(CONNECTOR_BLOCK);
        if blocks.is_empty() {
            decoder.error(
                "Missing connector block",
                "At least one connector block is required.",
            );
        }

        let mut connectors = Vec::with_capacity(blocks.len());
        for block in blocks {
            let Some(kind) = decoder.single_label(block) else {
                continue;
            };
            let connector = match kind {
                "github" => Connector::Github(decoder.decode_block_body(block)),
                "oidc" => Connector::Oidc(decoder.decode_block_body(block)),
                "google" => Connector::Google(decoder.decode_block_body(block)),
                other => {
                    decoder.error(
                        "Unsupported connector type",
                        format!(
                            "Connector type \"{}\" is not supported. Valid types are: {}.",
                            other,
                            CONNECTOR_TYPES.join(", ")
                        ),
                    );
                    continue;
                }
            };
            connectors.push(connector);
        }

        Self {
            ingress_host,
            issuer_host,
            certmanager_cluster_issuer,
            connectors,
            static_clients: decoder.decode_blocks("static_client"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValuesOverlay<'a> {
    ingress: IngressValues<'a>,
    gsuite: GsuiteValues,
    config: ConfigValues<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IngressValues<'a> {
    host: &'a str,
    cluster_issuer: &'a str,
}

#[derive(Serialize)]
struct GsuiteValues {
    enabled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigValues<'a> {
    issuer: String,
    connectors: &'a [Connector],
    static_clients: &'a [StaticClient],
}

impl DexConfig {
    fn values_overlay(&self) -> std::result::Result<String, RenderError> {
        let overlay = ValuesOverlay {
            ingress: IngressValues {
                host: &self.ingress_host,
                cluster_issuer: &self.certmanager_cluster_issuer,
            },
            gsuite: GsuiteValues {
                enabled: self
                    .connectors
                    .iter()
                    .any(|c| matches!(c, Connector::Google(_))),
            },
            config: ConfigValues {
                issuer: format!("https://{}", self.issuer_host),
                connectors: &self.connectors,
                static_clients: &self.static_clients,
            },
        };
        Ok(serde_yaml::to_string(&overlay)?)
    }
}

/// The dex component.
#[derive(Debug, Clone, Default)]
pub struct Dex {
    config: DexConfig,
}

impl Dex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &DexConfig {
        &self.config
    }
}

impl Component for Dex {
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
