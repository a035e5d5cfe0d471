//! Decoding of declarative HCL configuration into typed component configs.
//!
//! - `document` - parsing, component block lookup, variables
//! - `body` - the closed-schema [`BodyDecoder`] and the [`Decode`] trait
//! - `diagnostics` - accumulated, structured problems

pub mod body;
pub mod diagnostics;
pub mod document;

pub use body::{BodyDecoder, Decode};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use document::{
    component_body, component_names, eval_context, get_component_body, load_documents,
    parse_document,
};

use hcl::Body;
use hcl::eval::Context;

/// Decode an optional body into `T`.
///
/// An absent body decodes like an empty one, so components without
/// mandatory fields accept a missing configuration while components with
/// mandatory fields report each missing field.
pub fn decode_body<T: Decode>(
    body: Option<&Body>,
    ctx: Option<&Context<'_>>,
    subject: &str,
) -> (T, Diagnostics) {
    let empty_body = Body::default();
    let empty_ctx = Context::new();
    let body = body.unwrap_or(&empty_body);
    let ctx = ctx.unwrap_or(&empty_ctx);

    let mut decoder = BodyDecoder::new(body, ctx, subject);
    let value = T::decode(&mut decoder);
    let diagnostics = decoder.finish();

    log::debug!(
        "Decoded {} with {} diagnostic(s)",
        subject,
        diagnostics.len()
    );

    (value, diagnostics)
}

/// Subject string for a component's top-level body.
pub fn component_subject(name: &str) -> String {
    format!("{} \"{}\"", document::COMPONENT_BLOCK, name)
}
