//! Routines — stored automation the hub runs on demand or in reaction to events.
//!
//! Two shapes exist:
//! - an [`ActionList`], an ordered list of commands run by id;
//! - a [`ReactiveRule`], bound to its origin device's bus for the lifetime of
//!   that device.
//!
//! Both are collected in a [`RoutineBook`], loaded once when the hub is built.

mod action_list;
mod rule;

pub use action_list::{ActionList, ActionListBuilder, RoutineAction};
pub use rule::ReactiveRule;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SmartHubError;
use crate::id::RoutineId;
use action_list::ActionListBody;

/// Every stored action list (by id, in load order) and reactive rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoutineDocument")]
pub struct RoutineBook {
    #[serde(rename = "rotinas", serialize_with = "serialize_routines")]
    routines: IndexMap<RoutineId, ActionList>,
    #[serde(rename = "regras")]
    rules: Vec<ReactiveRule>,
}

impl RoutineBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an action list.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::DuplicateRoutineId`] when the id is taken;
    /// the book is left unchanged.
    pub fn insert_routine(&mut self, routine: ActionList) -> Result<(), SmartHubError> {
        if self.routines.contains_key(&routine.id) {
            return Err(SmartHubError::DuplicateRoutineId(routine.id.to_string()));
        }
        self.routines.insert(routine.id.clone(), routine);
        Ok(())
    }

    pub fn push_rule(&mut self, rule: ReactiveRule) {
        self.rules.push(rule);
    }

    #[must_use]
    pub fn routine(&self, id: &str) -> Option<&ActionList> {
        self.routines.get(id)
    }

    pub fn routines(&self) -> impl Iterator<Item = &ActionList> {
        self.routines.values()
    }

    #[must_use]
    pub fn rules(&self) -> &[ReactiveRule] {
        &self.rules
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routines.is_empty() && self.rules.is_empty()
    }
}

/// `{"rotinas": [...], "regras": [...]}`
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SectionedDocument {
    #[serde(default, alias = "routines")]
    rotinas: Vec<ActionListBody>,
    #[serde(default, alias = "rules")]
    regras: Vec<ReactiveRule>,
}

/// The two accepted routine file layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum RoutineDocument {
    Sectioned(SectionedDocument),
    /// `{"<routine id>": {"nome": ..., "acoes": [...]}, ...}`
    ById(IndexMap<String, ActionListBody>),
}

impl TryFrom<RoutineDocument> for RoutineBook {
    type Error = SmartHubError;

    fn try_from(document: RoutineDocument) -> Result<Self, Self::Error> {
        let mut book = Self::new();
        match document {
            RoutineDocument::Sectioned(SectionedDocument { rotinas, regras }) => {
                for body in rotinas {
                    book.insert_routine(body.into_action_list(None)?)?;
                }
                for rule in regras {
                    book.push_rule(rule);
                }
            }
            RoutineDocument::ById(bodies) => {
                for (id, body) in bodies {
                    book.insert_routine(body.into_action_list(Some(&id))?)?;
                }
            }
        }
        Ok(book)
    }
}

fn serialize_routines<S: serde::Serializer>(
    routines: &IndexMap<RoutineId, ActionList>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(routines.values())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::DeviceId;

    #[test]
    fn should_load_sectioned_document() {
        let json = r#"{
            "rotinas": [
                {"id": "boa_noite", "nome": "Boa noite", "acoes": [
                    {"id_dispositivo": "luz_sala", "comando": "desligar"},
                    {"id_dispositivo": "porta", "comando": "trancar"}
                ]}
            ],
            "regras": [
                {"quando": "ativar", "origem": "sensor_sala", "acao": "ligar", "alvo": "luz_sala"}
            ]
        }"#;
        let book: RoutineBook = serde_json::from_str(json).unwrap();
        assert_eq!(book.routine("boa_noite").unwrap().actions.len(), 2);
        assert_eq!(book.rules().len(), 1);
    }

    #[test]
    fn should_load_map_of_routines_by_id() {
        let json = r#"{
            "manha": {"nome": "Bom dia", "acoes": [{"id_dispositivo": "cafeteira", "comando": "ligar"}]},
            "saida": {"comandos": [{"id_dispositivo": "porta", "comando": "trancar"}]}
        }"#;
        let book: RoutineBook = serde_json::from_str(json).unwrap();
        let ids: Vec<_> = book.routines().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["manha", "saida"]);
        assert_eq!(book.routine("saida").unwrap().name, "saida");
        assert!(book.rules().is_empty());
    }

    #[test]
    fn should_load_empty_document_as_empty_book() {
        let book: RoutineBook = serde_json::from_str("{}").unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn should_reject_duplicate_routine_ids() {
        let json = r#"{"rotinas": [
            {"id": "r", "acoes": [{"id_dispositivo": "a", "comando": "ligar"}]},
            {"id": "r", "acoes": [{"id_dispositivo": "b", "comando": "ligar"}]}
        ]}"#;
        assert!(serde_json::from_str::<RoutineBook>(json).is_err());
    }

    #[test]
    fn should_keep_first_routine_when_id_is_inserted_twice() {
        let mut book = RoutineBook::new();
        let first = ActionList::builder()
            .id(RoutineId::new("r").unwrap())
            .step(DeviceId::new("a").unwrap(), "ligar")
            .build()
            .unwrap();
        let second = ActionList::builder()
            .id(RoutineId::new("r").unwrap())
            .step(DeviceId::new("b").unwrap(), "ligar")
            .build()
            .unwrap();
        book.insert_routine(first.clone()).unwrap();
        let err = book.insert_routine(second).unwrap_err();
        assert_eq!(err, SmartHubError::DuplicateRoutineId("r".to_string()));
        assert_eq!(book.routine("r"), Some(&first));
    }

    #[test]
    fn should_serialize_in_sectioned_layout() {
        let mut book = RoutineBook::new();
        book.push_rule(ReactiveRule::new(
            "abrir",
            DeviceId::new("porta").unwrap(),
            "ligar",
            DeviceId::new("luz").unwrap(),
        ));
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["rotinas"], serde_json::json!([]));
        assert_eq!(json["regras"][0]["alvo"], "luz");
    }
}
