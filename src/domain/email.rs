use serde::{Deserialize, Serialize};

use super::types::Label;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParsedEmail {
    pub filename: String,
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub subject: Option<String>,
    #[serde(default)]
    pub body: String,
    pub label: Option<Label>,
}
