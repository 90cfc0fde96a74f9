//! Inbound and outbound documents of the releases API.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::cascade::UpdateFailure;
use crate::error::{DomainError, DomainResult};
use crate::id::{PurchaseRequisitionId, PurchaseRequisitionItemId};
use crate::requisition::{Header, Item, ReleaseFlag};

/// Entity type an accepter entry may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Header,
    Item,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Header => "Header",
            EntityKind::Item => "Item",
        }
    }

    /// Name of the SQL executor function that applies rows of this kind.
    pub fn function_name(&self) -> &'static str {
        match self {
            EntityKind::Header => "PurchaseRequisitionHeader",
            EntityKind::Item => "PurchaseRequisitionItem",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Header" => Ok(EntityKind::Header),
            "Item" => Ok(EntityKind::Item),
            other => Err(DomainError::unknown_entity(other)),
        }
    }
}

/// API operations served by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiType {
    Releases,
}

impl ApiType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiType::Releases => "releases",
        }
    }
}

impl FromStr for ApiType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "releases" => Ok(ApiType::Releases),
            other => Err(DomainError::unknown_api_type(other)),
        }
    }
}

/// Item entry of an inbound change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemInput {
    pub purchase_requisition_item: PurchaseRequisitionItemId,
    #[serde(default)]
    pub is_released: ReleaseFlag,
}

/// Header payload of an inbound change, including its item entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HeaderInput {
    pub purchase_requisition: PurchaseRequisitionId,
    #[serde(default)]
    pub is_released: ReleaseFlag,
    #[serde(default)]
    pub item: Vec<ItemInput>,
}

/// Inbound change descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInput {
    pub api_type: String,
    pub runtime_session_id: String,
    #[serde(default)]
    pub accepter: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_partner: Option<i32>,
    pub header: HeaderInput,
}

impl ReleaseInput {
    pub fn parsed_api_type(&self) -> DomainResult<ApiType> {
        self.api_type.parse()
    }

    /// Accepter entries parsed in order. Unknown names come back as errors so the
    /// caller can decide whether to log and skip them.
    pub fn entity_kinds(&self) -> impl Iterator<Item = DomainResult<EntityKind>> + '_ {
        self.accepter.iter().map(|name| name.parse())
    }

    pub fn purchase_requisition(&self) -> PurchaseRequisitionId {
        self.header.purchase_requisition
    }
}

/// Rows written by one release pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReleaseMessage {
    pub header: Option<Header>,
    pub item: Vec<Item>,
}

/// Outbound result document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseOutput {
    pub runtime_session_id: String,
    pub api_type: String,
    pub accepter: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_partner: Option<i32>,
    pub message: Option<ReleaseMessage>,
    pub sql_update_result: Option<bool>,
    pub sql_update_error: Option<String>,
}

impl ReleaseOutput {
    /// Start an output that echoes the routing fields of `input`.
    pub fn for_input(input: &ReleaseInput) -> Self {
        Self {
            runtime_session_id: input.runtime_session_id.clone(),
            api_type: input.api_type.clone(),
            accepter: input.accepter.clone(),
            service_label: input.service_label.clone(),
            business_partner: input.business_partner,
            message: None,
            sql_update_result: None,
            sql_update_error: None,
        }
    }

    /// Mark the pass as failed. The most recent failure wins the error text.
    pub fn record_failure(&mut self, failure: UpdateFailure) {
        self.sql_update_result = Some(false);
        self.sql_update_error = Some(failure.message().to_string());
    }

    pub fn has_failed(&self) -> bool {
        self.sql_update_result == Some(false)
    }

    /// Attach the result message. A pass that produced a message with no recorded
    /// failure is marked successful; no message leaves the status unset.
    pub fn finish(&mut self, message: Option<ReleaseMessage>) {
        if message.is_some() && self.sql_update_result.is_none() {
            self.sql_update_result = Some(true);
        }
        self.message = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_input() -> ReleaseInput {
        serde_json::from_value(json!({
            "api_type": "releases",
            "runtime_session_id": "session-1",
            "accepter": ["Header", "Item", "Partner"],
            "header": {
                "PurchaseRequisition": 100,
                "IsReleased": true,
                "Item": [
                    { "PurchaseRequisitionItem": 10, "IsReleased": false },
                    { "PurchaseRequisitionItem": 20 }
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn input_parses_nested_header_and_items() {
        let input = sample_input();
        assert_eq!(input.purchase_requisition().get(), 100);
        assert_eq!(input.header.is_released, Some(true));
        assert_eq!(input.header.item.len(), 2);
        assert_eq!(input.header.item[0].is_released, Some(false));
        assert_eq!(input.header.item[1].is_released, None);
    }

    #[test]
    fn entity_kinds_preserve_order_and_flag_unknown_names() {
        let input = sample_input();
        let kinds: Vec<_> = input.entity_kinds().collect();
        assert_eq!(kinds[0], Ok(EntityKind::Header));
        assert_eq!(kinds[1], Ok(EntityKind::Item));
        assert_eq!(kinds[2], Err(DomainError::unknown_entity("Partner")));
    }

    #[test]
    fn api_type_only_accepts_releases() {
        assert_eq!("releases".parse::<ApiType>(), Ok(ApiType::Releases));
        assert!(matches!(
            "deletes".parse::<ApiType>(),
            Err(DomainError::UnknownApiType(name)) if name == "deletes"
        ));
    }

    #[test]
    fn function_names_match_sql_executor_tables() {
        assert_eq!(EntityKind::Header.function_name(), "PurchaseRequisitionHeader");
        assert_eq!(EntityKind::Item.function_name(), "PurchaseRequisitionItem");
    }

    #[test]
    fn finish_marks_success_only_without_prior_failure() {
        let input = sample_input();

        let mut ok = ReleaseOutput::for_input(&input);
        ok.finish(Some(ReleaseMessage::default()));
        assert_eq!(ok.sql_update_result, Some(true));
        assert_eq!(ok.sql_update_error, None);

        let mut failed = ReleaseOutput::for_input(&input);
        failed.record_failure(UpdateFailure::Item);
        failed.finish(Some(ReleaseMessage::default()));
        assert!(failed.has_failed());
        assert_eq!(failed.sql_update_error.as_deref(), Some("Item Data cannot release"));

        let mut skipped = ReleaseOutput::for_input(&input);
        skipped.finish(None);
        assert_eq!(skipped.sql_update_result, None);
    }

    #[test]
    fn output_echoes_routing_fields() {
        let mut input = sample_input();
        input.service_label = Some("PURCHASE_REQUISITION".to_string());
        input.business_partner = Some(201);

        let output = ReleaseOutput::for_input(&input);
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["runtime_session_id"], "session-1");
        assert_eq!(value["service_label"], "PURCHASE_REQUISITION");
        assert_eq!(value["business_partner"], 201);
        assert_eq!(value["accepter"], json!(["Header", "Item", "Partner"]));
        assert_eq!(value["message"], serde_json::Value::Null);
    }
}
