//! Node type keys.
//!
//! Node types have no entity of their own; they are strings of the form
//! `{layer}.{type}`. The type part may itself contain separators.

/// Separator between the layer and the type name of a node type key.
pub const NODE_TYPE_SEPARATOR: char = '.';

/// Returns the layer segment of a node type key.
///
/// Keys without a separator are treated as their own layer.
pub fn layer_of(node_type: &str) -> &str {
    node_type
        .split_once(NODE_TYPE_SEPARATOR)
        .map(|(layer, _)| layer)
        .unwrap_or(node_type)
}

/// Returns the type-name portion of a node type key (after the first separator).
pub fn type_name_of(node_type: &str) -> &str {
    node_type
        .split_once(NODE_TYPE_SEPARATOR)
        .map(|(_, name)| name)
        .unwrap_or(node_type)
}
