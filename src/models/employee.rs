use serde::{Deserialize, Serialize};

/// Everything the model is allowed to see about one employee.
///
/// Serialized verbatim into the `getEmployeeInformation` tool result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeBundle {
    pub name: String,
    pub role: String,
    pub rank: String,
    pub skills: Vec<String>,
    pub documents: Vec<EmployeeDocument>,
    pub self_assessments: Vec<String>,
    pub peer_feedback: Vec<PeerFeedback>,
    pub manager_evaluations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDocument {
    pub filename: String,
    pub extracted_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerFeedback {
    pub rating: i32,
    pub comment: String,
    pub reviewer: String,
}
