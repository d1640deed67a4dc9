//! Vendor cart links and price estimates for a bill of materials.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::circuit::{resolve_circuit_schema, CircuitSchema, FallbackSpec};
use crate::config::{Settings, Vendor};
use crate::core::ArduinoMcpError;

pub const DELIVERY_TIME: &str = "3-7 business days";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomItem {
    pub name: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
}

impl BomItem {
    /// Search term sent to vendors: part number when known, else the name.
    pub fn search_term(&self) -> &str {
        self.part_number.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub bom_list: Vec<BomItem>,
    #[serde(default)]
    pub circuit_schema: Option<Value>,
    #[serde(default)]
    pub preferred_vendor: Option<Vendor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLink {
    pub vendor: Vendor,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderQuote {
    pub bom_used: Vec<BomItem>,
    pub cart_links: Vec<CartLink>,
    pub total_price_estimate_usd: f64,
    pub delivery_time: String,
}

/// BOM lines derived from a schema's parts.
pub fn bom_from_schema(schema: &CircuitSchema) -> Vec<BomItem> {
    schema
        .parts
        .iter()
        .map(|part| BomItem {
            name: part.name.clone(),
            quantity: part.quantity,
            part_number: part.mpn.clone(),
        })
        .collect()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Cart links for every vendor the filter accepts, in a fixed order.
pub fn cart_links(bom: &[BomItem], filter: Vendor) -> Vec<CartLink> {
    let terms: Vec<&str> = bom.iter().map(BomItem::search_term).collect();
    let query = urlencoding::encode(&terms.join(" ")).into_owned();

    [
        (Vendor::Mouser, format!("https://www.mouser.com/c/?q={query}")),
        (
            Vendor::Digikey,
            format!("https://www.digikey.com/en/products/result?s={query}"),
        ),
    ]
    .into_iter()
    .filter(|(vendor, _)| filter.accepts(*vendor))
    .map(|(vendor, url)| CartLink { vendor, url })
    .collect()
}

/// Quote an order. An explicit BOM wins; otherwise one line per schema part.
pub fn order_parts(request: &OrderRequest, settings: &Settings) -> Result<OrderQuote, ArduinoMcpError> {
    if let Some(item) = request.bom_list.iter().find(|item| item.quantity == 0) {
        return Err(ArduinoMcpError::InvalidArguments {
            tool: "order_parts".to_string(),
            message: format!("quantity for {} must be positive", item.name),
        });
    }

    let bom_used = if request.bom_list.is_empty() {
        let schema = resolve_circuit_schema(
            request.circuit_schema.as_ref(),
            None,
            &FallbackSpec::default(),
        );
        bom_from_schema(&schema)
    } else {
        request.bom_list.clone()
    };

    let vendor = request.preferred_vendor.unwrap_or(settings.default_vendor);
    let units: u64 = bom_used.iter().map(|item| u64::from(item.quantity)).sum();

    tracing::debug!(lines = bom_used.len(), units, vendor = vendor.as_str(), "order quoted");

    Ok(OrderQuote {
        cart_links: cart_links(&bom_used, vendor),
        total_price_estimate_usd: round_cents(units as f64 * settings.price_per_unit_usd),
        delivery_time: DELIVERY_TIME.to_string(),
        bom_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, quantity: u32, part_number: Option<&str>) -> BomItem {
        BomItem {
            name: name.to_string(),
            quantity,
            part_number: part_number.map(str::to_string),
        }
    }

    #[test]
    fn test_explicit_bom_and_both_vendors() {
        let request = OrderRequest {
            bom_list: vec![item("Arduino Uno R3", 1, Some("A000066")), item("LED", 3, None)],
            ..Default::default()
        };
        let quote = order_parts(&request, &Settings::default()).unwrap();

        assert_eq!(quote.total_price_estimate_usd, 5.0);
        assert_eq!(quote.delivery_time, "3-7 business days");
        assert_eq!(quote.cart_links.len(), 2);
        assert_eq!(quote.cart_links[0].url, "https://www.mouser.com/c/?q=A000066%20LED");
        assert_eq!(
            quote.cart_links[1].url,
            "https://www.digikey.com/en/products/result?s=A000066%20LED"
        );
    }

    #[test]
    fn test_bom_derived_from_default_schema() {
        let request = OrderRequest {
            preferred_vendor: Some(Vendor::Digikey),
            ..Default::default()
        };
        let quote = order_parts(&request, &Settings::default()).unwrap();

        let names: Vec<&str> = quote.bom_used.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Arduino Uno R3", "220 Ohm Resistor", "LED"]);
        assert_eq!(quote.total_price_estimate_usd, 3.75);
        assert_eq!(quote.cart_links.len(), 1);
        assert_eq!(quote.cart_links[0].vendor, Vendor::Digikey);
    }

    #[test]
    fn test_price_from_settings_rounded() {
        let settings = Settings {
            price_per_unit_usd: 0.333,
            ..Default::default()
        };
        let request = OrderRequest {
            bom_list: vec![item("Jumper wire", 7, None)],
            ..Default::default()
        };
        let quote = order_parts(&request, &settings).unwrap();
        assert_eq!(quote.total_price_estimate_usd, 2.33);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let request = OrderRequest {
            bom_list: vec![item("LED", 0, None)],
            ..Default::default()
        };
        let err = order_parts(&request, &Settings::default()).unwrap_err();
        assert!(matches!(err, ArduinoMcpError::InvalidArguments { .. }));
    }
}
