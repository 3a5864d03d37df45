use serde::{Deserialize, Serialize};

/// Backorder line awaiting stock, as listed in the backorder table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackorderLine {
    pub line_id: String,
    pub order_id: String,
    /// Order number shown to operators, e.g. "SO-10231"
    pub order_number: String,
    pub product_variant_id: String,
    pub quantity: i64,
    pub sku: String,
    pub product_name: String,
    pub store_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backorder_line_from_api_json() {
        let raw = r#"{
            "lineId": "l-1",
            "orderId": "o-1",
            "orderNumber": "SO-1001",
            "productVariantId": "v-9",
            "quantity": 4,
            "sku": "TSHIRT-M-RED",
            "productName": "T-shirt",
            "storeId": null
        }"#;
        let line: BackorderLine = serde_json::from_str(raw).unwrap();

        assert_eq!(line.line_id, "l-1");
        assert_eq!(line.quantity, 4);
        assert!(line.store_id.is_none());
    }
}
