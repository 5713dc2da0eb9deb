//! JSON request/response shapes for the `identify` operation.

use serde::{Deserialize, Deserializer, Serialize};

use super::view::ConsolidatedView;

/// Inbound identify request.
///
/// `phoneNumber` may arrive as a JSON string or number; `null` and `""` mean absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub phone_number: Option<String>,
}

impl IdentifyRequest {
    pub fn new(email: Option<&str>, phone_number: Option<&str>) -> Self {
        Self {
            email: email.map(str::to_string),
            phone_number: phone_number.map(str::to_string),
        }
    }

    /// Email with empty strings folded to `None`.
    pub fn email(&self) -> Option<&str> {
        non_empty(self.email.as_deref())
    }

    /// Phone number with empty strings folded to `None`.
    pub fn phone_number(&self) -> Option<&str> {
        non_empty(self.phone_number.as_deref())
    }

    /// True when neither identity attribute is usable.
    pub fn is_blank(&self) -> bool {
        self.email().is_none() && self.phone_number().is_none()
    }
}

/// Outbound identify response: `{ "contact": { ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyResponse {
    pub contact: ConsolidatedView,
}

impl From<ConsolidatedView> for IdentifyResponse {
    fn from(contact: ConsolidatedView) -> Self {
        Self { contact }
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Unsigned(u64),
    Signed(i64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        StringOrNumber::Str(s) => s,
        StringOrNumber::Unsigned(n) => n.to_string(),
        StringOrNumber::Signed(n) => n.to_string(),
    }))
}
