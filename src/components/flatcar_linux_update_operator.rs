//! Flatcar Linux update operator: coordinates node reboots after OS updates.
//!
//! The component takes no configuration.

use hcl::Body;
use hcl::eval::Context;

use super::{Component, Metadata, render_component_chart};
use crate::chart::RenderedManifests;
use crate::decode::{BodyDecoder, Decode, Diagnostics, component_subject, decode_body};
use crate::error::Result;

pub const NAME: &str = "flatcar-linux-update-operator";
const NAMESPACE: &str = "reboot-coordinator";

pub(super) fn factory() -> Box<dyn Component> {
    Box::new(FlatcarLinuxUpdateOperator)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlatcarLinuxUpdateOperator;

impl Decode for FlatcarLinuxUpdateOperator {
    // Empty schema: anything in the body is reported when the decoder finishes.
    fn decode(_decoder: &mut BodyDecoder<'_>) -> Self {
        Self
    }
}

impl Component for FlatcarLinuxUpdateOperator {
    fn load_config(&mut self, body: Option<&Body>, ctx: Option<&Context<'_>>) -> Diagnostics {
        let Some(body) = body else {
            return Diagnostics::new();
        };
        let (_, diagnostics): (Self, _) = decode_body(Some(body), ctx, &component_subject(NAME));
        diagnostics
    }

    fn render_manifests(&self) -> Result<RenderedManifests> {
        render_component_chart(&self.metadata(), "")
    }

    fn metadata(&self) -> Metadata {
        Metadata::new(NAME, NAMESPACE)
    }
}
