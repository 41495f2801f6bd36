// checkflow/src/record.rs

//! The transient check record: parsed from the trigger id, enriched by the
//! OCR step, and flattened into the destination document for the final write.

use serde::{Deserialize, Serialize};

use crate::error::{CheckError, CheckResult};

/// Delimiter joining the two halves of a trigger id: `<toAccount>^<amount>`.
pub const TRIGGER_DELIMITER: char = '^';

/// A check moving through the pipeline.
///
/// `from_account` and `routing_number` are `Some` if and only if the OCR step
/// has completed successfully. The record never persists in this form: the
/// write step flattens it into a [`ProcessedCheck`] document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRecord {
  /// Opaque id of the record that triggered this invocation. Doubles as the
  /// attachment name in both stores.
  pub id: String,
  /// Destination account, parsed from the trigger id.
  pub to_account: String,
  /// Amount, parsed from the trigger id. Kept as the string the trigger
  /// carried; no numeric validation is applied.
  pub amount: String,
  /// Source account, extracted from the check image by the OCR action.
  pub from_account: Option<String>,
  /// Routing number, extracted from the check image by the OCR action.
  pub routing_number: Option<String>,
}

impl CheckRecord {
  /// Parses a trigger id of the form `<toAccount>^<amount>`.
  ///
  /// Exactly one delimiter with a non-empty part on each side is required;
  /// anything else is `CheckError::Parse` and no downstream step runs.
  pub fn parse(trigger_id: &str) -> CheckResult<Self> {
    let mut parts = trigger_id.split(TRIGGER_DELIMITER);
    let to_account = parts.next().unwrap_or_default();
    let amount = match parts.next() {
      Some(amount) => amount,
      None => {
        return Err(CheckError::Parse {
          trigger_id: trigger_id.to_string(),
          reason: "missing '^' delimiter",
        });
      }
    };
    if parts.next().is_some() {
      return Err(CheckError::Parse {
        trigger_id: trigger_id.to_string(),
        reason: "more than one '^' delimiter",
      });
    }
    if to_account.is_empty() {
      return Err(CheckError::Parse {
        trigger_id: trigger_id.to_string(),
        reason: "empty destination account",
      });
    }
    if amount.is_empty() {
      return Err(CheckError::Parse {
        trigger_id: trigger_id.to_string(),
        reason: "empty amount",
      });
    }

    Ok(Self {
      id: trigger_id.to_string(),
      to_account: to_account.to_string(),
      amount: amount.to_string(),
      from_account: None,
      routing_number: None,
    })
  }

  /// Merges the OCR result into the record.
  pub fn merge_ocr(&mut self, account: String, routing: String) {
    self.from_account = Some(account);
    self.routing_number = Some(routing);
  }

  /// Flattens the record into the destination document.
  ///
  /// All four business fields must be non-empty at this point. The original
  /// system wrote whatever it had; refusing incomplete records here is a
  /// deliberate tightening, surfaced as `CheckError::IncompleteRecord`.
  pub fn to_document(&self) -> CheckResult<ProcessedCheck> {
    let incomplete = |field: &'static str| CheckError::IncompleteRecord {
      record_id: self.id.clone(),
      field,
    };

    let from_account = match self.from_account.as_deref() {
      Some(s) if !s.is_empty() => s.to_string(),
      _ => return Err(incomplete("fromAccount")),
    };
    let routing_number = match self.routing_number.as_deref() {
      Some(s) if !s.is_empty() => s.to_string(),
      _ => return Err(incomplete("routingNumber")),
    };
    if self.to_account.is_empty() {
      return Err(incomplete("toAccount"));
    }
    if self.amount.is_empty() {
      return Err(incomplete("amount"));
    }

    Ok(ProcessedCheck {
      id: self.id.clone(),
      from_account,
      routing_number,
      to_account: self.to_account.clone(),
      amount: self.amount.clone(),
    })
  }
}

/// The document inserted into the destination store, keyed by the trigger id
/// and accompanied by one resized-image attachment.
///
/// Field names on the wire match what downstream automation already consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedCheck {
  #[serde(rename = "_id")]
  pub id: String,
  #[serde(rename = "fromAccount")]
  pub from_account: String,
  #[serde(rename = "routingNumber")]
  pub routing_number: String,
  #[serde(rename = "toAccount")]
  pub to_account: String,
  pub amount: String,
}
