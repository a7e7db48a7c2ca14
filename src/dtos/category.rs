use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct OptionsQuery {
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AddOptionRequest {
    pub name: String,
    pub parent_id: Option<Uuid>,
}
