// ── Payment domain type ──

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::{lenient, validate};
use crate::error::CoreError;
use crate::resource::{Draft, Resource, ResourceKind, number_cell, text_cell};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PaymentMethod {
    Card,
    Cash,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: EntityId,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub transaction_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub card_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub reservation_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Resource for Payment {
    type Draft = PaymentDraft;
    type Update = PaymentDraft;

    const KIND: ResourceKind = ResourceKind::Payments;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![Cow::Owned(self.id.to_string())];
        fields.extend(
            [
                &self.payment_method,
                &self.payment_status,
                &self.transaction_id,
            ]
            .into_iter()
            .flatten()
            .map(|s| Cow::Borrowed(s.as_str())),
        );
        if let Some(amount) = self.amount {
            fields.push(Cow::Owned(amount.to_string()));
        }
        fields
    }

    fn category(&self) -> Option<&str> {
        self.payment_status.as_deref()
    }

    fn cell(&self, column: &str) -> String {
        match column {
            "id" => self.id.to_string(),
            "amount" => number_cell(self.amount),
            "payment_method" => text_cell(self.payment_method.as_deref()),
            "payment_status" => text_cell(self.payment_status.as_deref()),
            "transaction_id" => text_cell(self.transaction_id.as_deref()),
            "card_id" => text_cell(self.card_id.as_deref()),
            "reservation_id" => text_cell(self.reservation_id.as_deref()),
            "created_at" => text_cell(self.created_at.as_deref()),
            _ => String::new(),
        }
    }
}

/// `POST /payments` and `PUT /payments/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    pub reservation_id: String,
}

impl Draft for PaymentDraft {
    fn validate(&self) -> Result<(), CoreError> {
        validate::non_negative("amount", self.amount)?;
        validate::required("transaction_id", &self.transaction_id)?;
        validate::required("reservation_id", &self.reservation_id)?;
        Ok(())
    }
}
