use serde::{Deserialize, Serialize};

/// Move record as returned by the data service.
///
/// Power and accuracy are optional on the service side: status moves carry no
/// power and some moves never miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub name: String,
    #[serde(default)]
    pub power: Option<u32>,
    #[serde(default)]
    pub accuracy: Option<u8>,
    #[serde(default)]
    pub priority: i8,
    #[serde(default)]
    pub move_type: String,
}
