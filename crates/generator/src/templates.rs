//! Template loading and management

use swagger2proto_common::{GeneratorError, Result};
use tera::Tera;

/// Name of the proto file layout template
pub const PROTO_TEMPLATE: &str = "proto";

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();
    // blocks are already escaped by the renderer
    tera.autoescape_on(vec![]);

    tera.add_raw_template(PROTO_TEMPLATE, include_str!("../templates/proto.tera"))
        .map_err(|e| GeneratorError::Generation(format!("Failed to load proto template: {}", e)))?;

    Ok(tera)
}
