//! Flat record form of a device, as exchanged with loaders and stores.

use serde::{Deserialize, Serialize};

use super::attribute_value::Details;

/// A device as described by configuration.
///
/// Field names follow the stored format (`tipo`, `nome`, `estado`,
/// `atributos`); the English names are accepted on input. The type is kept
/// as a raw string so an unknown type fails that one record, not the whole
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: String,
    #[serde(rename = "tipo", alias = "type")]
    pub kind: String,
    #[serde(
        rename = "nome",
        alias = "name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        rename = "estado",
        alias = "initial_state",
        alias = "state",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<String>,
    #[serde(
        rename = "atributos",
        alias = "attributes",
        default,
        skip_serializing_if = "Details::is_empty"
    )]
    pub attributes: Details,
}

impl DeviceRecord {
    /// A record with no name, state or attributes.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: None,
            state: None,
            attributes: Details::new(),
        }
    }
}
