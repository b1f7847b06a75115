//! Product listing documents.

use serde::{Deserialize, Serialize};

use pharma_direct_core::{Peso, Uid};

/// A product document, kept in the `products` collection.
///
/// Listings are owned by the pharmacy whose UID matches `pharmacy_id`;
/// the store's security rules reject writes from anyone else, which is
/// exactly what the permissions probe exercises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductRecord {
    /// Product display name.
    pub name: String,
    /// UID of the owning pharmacy. Absent on malformed listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pharmacy_id: Option<Uid>,
    /// Unit price.
    pub price: Peso,
    /// Units in stock.
    pub stock: i64,
    /// Last update time in milliseconds since the Unix epoch, once the
    /// listing has been touched after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl ProductRecord {
    /// A fresh listing owned by `pharmacy_id`.
    #[must_use]
    pub fn new(name: impl Into<String>, pharmacy_id: Uid, price: Peso, stock: i64) -> Self {
        Self {
            name: name.into(),
            pharmacy_id: Some(pharmacy_id),
            price,
            stock,
            updated_at: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::backend::{decode, encode};

    #[test]
    fn listing_serializes_with_camel_case_owner() {
        let record = ProductRecord::new(
            "Biogesic 500mg",
            Uid::new("ph-1"),
            Peso::new(Decimal::new(1250, 2)),
            40,
        );
        let fields = encode(&record).unwrap();

        assert_eq!(fields.get("pharmacyId"), Some(&json!("ph-1")));
        assert_eq!(fields.get("price"), Some(&json!(12.5)));
        assert!(fields.get("updatedAt").is_none());
    }

    #[test]
    fn listing_without_an_owner_still_decodes() {
        let fields = json!({ "name": "Orphan", "stock": 3 })
            .as_object()
            .unwrap()
            .clone();
        let record: ProductRecord = decode(fields).unwrap();

        assert!(record.pharmacy_id.is_none());
        assert_eq!(record.stock, 3);
        assert!(record.price.is_zero());
    }
}
