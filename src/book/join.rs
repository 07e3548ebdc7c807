use serde::Deserialize;
use std::collections::BTreeMap;

/// One endpoint of a join declaration.
#[derive(Clone, Debug, Deserialize)]
pub struct JoinSpec {
    #[serde(rename = "sheetId")]
    pub sheet_id: String,
    #[serde(rename = "fieldKey")]
    pub field_key: String,
}

/// A declared relation between a field on one sheet and a field on another.
#[derive(Clone, Debug, Deserialize)]
pub struct JoinDef {
    #[serde(rename = "_id")]
    pub id: String,
    pub left: JoinSpec,
    pub right: JoinSpec,
}

/// Identifier of a record on one side of a realized link.
#[derive(Clone, Debug, Deserialize)]
pub struct RecordRef {
    #[serde(rename = "_id")]
    pub id: String,
}

/// A realized link between two records for one join (a "symref").
#[derive(Clone, Debug, Deserialize)]
pub struct JoinRef {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "joinId", default)]
    pub join_id: Option<String>,
    pub left: RecordRef,
    pub right: RecordRef,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct JoinEffects {
    #[serde(default)]
    pub symrefs: Vec<JoinRef>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SideEffectSet {
    #[serde(rename = "Join", default)]
    pub join: BTreeMap<String, JoinEffects>,
}

/// The book's record of which specific records are linked, per join id.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SideEffects {
    #[serde(default)]
    pub set: SideEffectSet,
}
