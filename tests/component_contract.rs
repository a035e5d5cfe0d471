use std::path::Path;

use cluster_addons::components::ComponentRegistry;
use cluster_addons::RenderedManifests;
use serde::Deserialize;
use cluster_addons::decode::{component_body, eval_context, get_component_body, load_documents, parse_document};

fn registry() -> ComponentRegistry {
    ComponentRegistry::with_builtin_components().unwrap()
}

/// Every manifest must parse as a stream of YAML mappings.
fn assert_well_formed(manifests: &RenderedManifests) {
    for (path, manifest) in manifests {
        let mut documents = 0;
        for document in serde_yaml::Deserializer::from_str(manifest) {
            let value = serde_yaml::Value::deserialize(document)
                .unwrap_or_else(|e| panic!("{} is not valid YAML: {}\n{}", path, e, manifest));
            assert!(value.is_mapping(), "{}: document is not a mapping", path);
            documents += 1;
        }
        assert!(documents > 0, "{}: no YAML documents", path);
    }
}

#[test]
fn metadata_is_stable_and_needs_no_config() {
    let registry = registry();
    for name in registry.names() {
        let first = registry.create(name).unwrap().metadata();
        let second = registry.create(name).unwrap().metadata();
        assert_eq!(first, second, "{}: metadata changed between instances", name);
        assert_eq!(first.name, name);
        assert!(!first.namespace.name.is_empty(), "{}: empty namespace", name);
    }
}

#[test]
fn valid_cluster_config_renders_every_component() {
    let document = load_documents(Path::new("tests/fixtures/cluster"), "lokocfg").unwrap();
    let vars = parse_document(&std::fs::read_to_string("tests/fixtures/cluster/vars.hcl").unwrap())
        .unwrap();
    let (ctx, diagnostics) = eval_context(&document, Some(&vars));
    assert!(diagnostics.is_empty(), "{}", diagnostics);

    let registry = registry();
    for name in registry.names() {
        let body = component_body(&document, name).unwrap();
        let mut component = registry.create(name).unwrap();
        let diagnostics = component.load_config(body.as_ref(), Some(&ctx));
        assert!(diagnostics.is_empty(), "{}: {}", name, diagnostics);

        let manifests = component
            .render_manifests()
            .unwrap_or_else(|e| panic!("{}: render failed: {}", name, e));
        assert!(!manifests.is_empty(), "{}: no manifests", name);
        assert_well_formed(&manifests);
        for (path, manifest) in &manifests {
            assert!(path.starts_with(&format!("{}/templates/", name)), "{}", path);
            assert!(!manifest.trim().is_empty(), "{}: empty manifest", path);
        }
    }
}

#[test]
fn variables_flow_into_rendered_manifests() {
    let document = load_documents(Path::new("tests/fixtures/cluster"), "lokocfg").unwrap();
    let vars = parse_document("gangway_secret = \"from-vars\"").unwrap();
    let (ctx, _) = eval_context(&document, Some(&vars));

    let mut dex = registry().create("dex").unwrap();
    let body = component_body(&document, "dex").unwrap();
    assert!(dex.load_config(body.as_ref(), Some(&ctx)).is_empty());

    let manifests = dex.render_manifests().unwrap();
    let secret = &manifests["dex/templates/secret.yaml"];
    assert!(secret.contains("secret: from-vars"));
    assert!(secret.contains("redirectURI: https://dex.example.com/callback"));
}

#[test]
fn missing_variable_is_reported() {
    let document = load_documents(Path::new("tests/fixtures/cluster"), "lokocfg").unwrap();
    let (_, diagnostics) = eval_context(&document, None);
    assert!(diagnostics.has_errors());
    assert!(diagnostics.to_string().contains("gangway_secret"));
}

#[test]
fn invalid_configs_report_diagnostics() {
    let src = std::fs::read_to_string("tests/fixtures/invalid/cluster.lokocfg").unwrap();
    let registry = registry();
    for name in ["dex", "gangway"] {
        let body = get_component_body(&src, name).unwrap();
        let mut component = registry.create(name).unwrap();
        let diagnostics = component.load_config(body.as_ref(), None);
        assert!(diagnostics.has_errors(), "{}: expected diagnostics", name);
    }
}

#[test]
fn schema_violations_are_accumulated() {
    let src = r#"
component "dex" {
  ingress_host = "foo"
  unknown      = "value"
  connector "github" {
    id   = "github"
    name = "GitHub"
    config {
      client_id       = "a"
      client_secret   = "b"
      redirect_uri    = "c"
    }
  }
}
"#;
    let body = get_component_body(src, "dex").unwrap();
    let mut dex = registry().create("dex").unwrap();
    let diagnostics = dex.load_config(body.as_ref(), None);

    // issuer_host, team_name_field and the unknown argument.
    assert_eq!(diagnostics.errors().count(), 3, "{}", diagnostics);
    let rendered = diagnostics.to_string();
    assert!(rendered.contains("issuer_host"));
    assert!(rendered.contains("team_name_field"));
    assert!(rendered.contains("unknown"));
}

#[test]
fn duplicate_component_block_is_reported() {
    let src = r#"
component "gangway" {}
component "gangway" {}
"#;
    let diagnostics = get_component_body(src, "gangway").unwrap_err();
    assert!(diagnostics.has_errors());
}

#[test]
fn user_values_needing_yaml_quoting_render_well_formed() {
    let src = r#"
component "dex" {
  ingress_host               = "*.example.com"
  issuer_host                = "dex.example.com"
  certmanager_cluster_issuer = "issuer: #staging"
  connector "github" {
    id   = "github"
    name = "GitHub: main"
    config {
      client_id       = "a"
      client_secret   = "b: c"
      redirect_uri    = "c"
      team_name_field = "slug"
    }
  }
}

component "gangway" {
  cluster_name               = "lokomotive"
  ingress_host               = "*.example.com"
  certmanager_cluster_issuer = "issuer: #staging"
  session_key                = "key: #1"
  api_server_url             = "apiserverurl"
  authorize_url              = "authorizeurl"
  token_url                  = "tokenurl"
  client_id                  = "clientid"
  client_secret              = "- secret"
  redirect_url               = "redirecturl"
}
"#;
    let registry = registry();
    for name in ["dex", "gangway"] {
        let body = get_component_body(src, name).unwrap();
        let mut component = registry.create(name).unwrap();
        let diagnostics = component.load_config(body.as_ref(), None);
        assert!(diagnostics.is_empty(), "{}: {}", name, diagnostics);

        let manifests = component.render_manifests().unwrap();
        assert_well_formed(&manifests);

        let ingress: serde_yaml::Value =
            serde_yaml::from_str(&manifests[&format!("{}/templates/ingress.yaml", name)]).unwrap();
        assert_eq!(ingress["spec"]["rules"][0]["host"].as_str(), Some("*.example.com"));
        assert_eq!(
            ingress["metadata"]["annotations"]["cert-manager.io/cluster-issuer"].as_str(),
            Some("issuer: #staging")
        );
    }
}

#[test]
fn absent_optional_component_config_is_accepted() {
    let mut component = registry().create("flatcar-linux-update-operator").unwrap();
    assert!(component.load_config(None, None).is_empty());
    let manifests = component.render_manifests().unwrap();
    assert!(!manifests.is_empty());
    assert_well_formed(&manifests);
}
