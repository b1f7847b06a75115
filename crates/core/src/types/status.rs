//! Order lifecycle and payment vocabulary.
//!
//! Shared by every surface that reads or writes order documents. The wire
//! strings are the exact values stored in the document database, so the
//! serde renames here are load-bearing.

use serde::{Deserialize, Serialize};

/// Order fulfillment stage, in lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStage {
    #[default]
    Pending,
    Confirmed,
    #[serde(rename = "To Be Received")]
    ToBeReceived,
    Delivered,
    Declined,
    Cancelled,
}

impl OrderStage {
    /// All stages, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::ToBeReceived,
        Self::Delivered,
        Self::Declined,
        Self::Cancelled,
    ];

    /// Whether the order can no longer progress.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Declined | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Confirmed => write!(f, "Confirmed"),
            Self::ToBeReceived => write!(f, "To Be Received"),
            Self::Delivered => write!(f, "Delivered"),
            Self::Declined => write!(f, "Declined"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "To Be Received" => Ok(Self::ToBeReceived),
            "Delivered" => Ok(Self::Delivered),
            "Declined" => Ok(Self::Declined),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order stage: {s}")),
        }
    }
}

/// Accepted payment methods.
///
/// Cash on delivery is gated per-account by the `codUnlocked` profile
/// field; the other methods are always available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "COD")]
    Cod,
    Card,
    #[serde(rename = "GCash")]
    Gcash,
    #[serde(rename = "PayMaya")]
    Paymaya,
}

impl PaymentMethod {
    /// All accepted payment methods.
    pub const ALL: [Self; 4] = [Self::Cod, Self::Card, Self::Gcash, Self::Paymaya];

    /// Whether this method pays cash on delivery.
    #[must_use]
    pub const fn is_cod(self) -> bool {
        matches!(self, Self::Cod)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cod => write!(f, "COD"),
            Self::Card => write!(f, "Card"),
            Self::Gcash => write!(f, "GCash"),
            Self::Paymaya => write!(f, "PayMaya"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(Self::Cod),
            "Card" => Ok(Self::Card),
            "GCash" => Ok(Self::Gcash),
            "PayMaya" => Ok(Self::Paymaya),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn order_stage_wire_strings() {
        assert_eq!(
            serde_json::to_string(&OrderStage::ToBeReceived).unwrap(),
            "\"To Be Received\""
        );
        let stage: OrderStage = serde_json::from_str("\"Cancelled\"").unwrap();
        assert_eq!(stage, OrderStage::Cancelled);
    }

    #[test]
    fn order_stage_display_matches_wire() {
        for stage in OrderStage::ALL {
            let wire = serde_json::to_string(&stage).unwrap();
            assert_eq!(wire, format!("\"{stage}\""));
            assert_eq!(stage.to_string().parse::<OrderStage>().unwrap(), stage);
        }
    }

    #[test]
    fn terminal_stages() {
        assert!(!OrderStage::Pending.is_terminal());
        assert!(!OrderStage::ToBeReceived.is_terminal());
        assert!(OrderStage::Delivered.is_terminal());
        assert!(OrderStage::Cancelled.is_terminal());
    }

    #[test]
    fn payment_method_wire_strings() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Cod).unwrap(), "\"COD\"");
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Gcash).unwrap(),
            "\"GCash\""
        );
        let method: PaymentMethod = serde_json::from_str("\"PayMaya\"").unwrap();
        assert_eq!(method, PaymentMethod::Paymaya);
    }

    #[test]
    fn only_cod_is_cod() {
        for method in PaymentMethod::ALL {
            assert_eq!(method.is_cod(), method == PaymentMethod::Cod);
        }
    }
}
