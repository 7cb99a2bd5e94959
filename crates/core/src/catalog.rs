//! Catalog records and query semantics.
//!
//! Field names follow the upstream catalog plugin's wire format
//! (`Product_id`, `Country_Code`, ...) so records round-trip through the
//! gateway without renaming. Records are immutable once fetched and are
//! replaced wholesale on each refresh.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::parse_gb;

/// A purchasable eSIM product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "Product_id")]
    pub product_id: String,
    #[serde(rename = "Product_name")]
    pub product_name: String,
    /// Data allowance in string form, e.g. `"5GB"`.
    #[serde(rename = "GB")]
    pub data_amount: String,
    /// Validity period in days, as the upstream serves it (a string).
    #[serde(rename = "Days")]
    pub validity_days: String,
    #[serde(rename = "Price_group")]
    pub price_group: String,
    #[serde(rename = "Price_USD_5", default, skip_serializing_if = "Option::is_none")]
    pub price_usd_5: Option<String>,
    #[serde(rename = "Price_USD_10", default, skip_serializing_if = "Option::is_none")]
    pub price_usd_10: Option<String>,
    #[serde(rename = "Price_USD_15", default, skip_serializing_if = "Option::is_none")]
    pub price_usd_15: Option<String>,
    #[serde(rename = "Price_USD_20", default, skip_serializing_if = "Option::is_none")]
    pub price_usd_20: Option<String>,
    #[serde(rename = "Price_USD_25", default, skip_serializing_if = "Option::is_none")]
    pub price_usd_25: Option<String>,
    #[serde(rename = "Provider_type", default, skip_serializing_if = "Option::is_none")]
    pub provider_type: Option<String>,
    #[serde(rename = "Provider_name", default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(rename = "Provider_id", default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_refill: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_field1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_field2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_field3: Option<String>,
}

/// A country (or aggregate region) the catalog prices for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Country {
    #[serde(rename = "Country_Code")]
    pub country_code: String,
    #[serde(rename = "Country_Region")]
    pub country_region: String,
    /// Boolean-as-integer flag marking an aggregate region entry.
    #[serde(rename = "IS_REGION")]
    pub is_region: i64,
    #[serde(rename = "Price_group", default, skip_serializing_if = "Option::is_none")]
    pub price_group: Option<String>,
    #[serde(rename = "Continent", default, skip_serializing_if = "Option::is_none")]
    pub continent: Option<String>,
    #[serde(rename = "Provider_id", default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(rename = "Notes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Product filter criteria. All present criteria are ANDed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub country_code: Option<String>,
    pub price_group: Option<String>,
    pub min_days: Option<i64>,
    pub max_days: Option<i64>,
    pub min_gb: Option<f64>,
    pub max_gb: Option<f64>,
    pub provider_id: Option<String>,
}

/// Find a product by its id.
#[must_use]
pub fn find_product<'a>(products: &'a [Product], product_id: &str) -> Option<&'a Product> {
    products.iter().find(|p| p.product_id == product_id)
}

/// Apply a [`ProductFilter`] against the current catalog.
///
/// A `country_code` criterion resolves to that country's price group first;
/// when no country matches, or the matched country carries no price group,
/// the result is empty regardless of the remaining criteria. Day bounds
/// require `Days` to parse as an integer (products with an unreadable day
/// count are excluded from bounded queries); GB bounds go through
/// [`parse_gb`]. All numeric bounds are inclusive.
#[must_use]
pub fn filter_products(
    products: &[Product],
    countries: &[Country],
    filter: &ProductFilter,
) -> Vec<Product> {
    let mut matched: Vec<Product> = products.to_vec();

    // Empty-string criteria are treated as absent, like the rest of the
    // surface treats blank query parameters.
    if let Some(code) = filter.country_code.as_deref().filter(|s| !s.is_empty()) {
        let Some(group) = countries
            .iter()
            .find(|c| c.country_code == code)
            .and_then(|c| c.price_group.as_deref())
            .filter(|g| !g.is_empty())
        else {
            return Vec::new();
        };
        matched.retain(|p| p.price_group == group);
    }

    if let Some(group) = filter.price_group.as_deref().filter(|s| !s.is_empty()) {
        matched.retain(|p| p.price_group == group);
    }

    if let Some(min) = filter.min_days {
        matched.retain(|p| parse_days(p).is_some_and(|d| d >= min));
    }
    if let Some(max) = filter.max_days {
        matched.retain(|p| parse_days(p).is_some_and(|d| d <= max));
    }

    if let Some(min) = filter.min_gb {
        matched.retain(|p| parse_gb(&p.data_amount) >= min);
    }
    if let Some(max) = filter.max_gb {
        matched.retain(|p| parse_gb(&p.data_amount) <= max);
    }

    if let Some(provider) = filter.provider_id.as_deref().filter(|s| !s.is_empty()) {
        matched.retain(|p| p.provider_id.as_deref() == Some(provider));
    }

    matched
}

fn parse_days(product: &Product) -> Option<i64> {
    product.validity_days.trim().parse().ok()
}

/// The distinct non-empty price groups across the catalog, sorted.
#[must_use]
pub fn price_groups(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .filter(|p| !p.price_group.is_empty())
        .map(|p| p.price_group.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Countries whose region matches `region_code` exactly.
#[must_use]
pub fn countries_in_region(countries: &[Country], region_code: &str) -> Vec<Country> {
    countries
        .iter()
        .filter(|c| c.country_region == region_code)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, gb: &str, days: &str, group: &str) -> Product {
        Product {
            product_id: id.to_string(),
            product_name: format!("eSIM {gb}"),
            data_amount: gb.to_string(),
            validity_days: days.to_string(),
            price_group: group.to_string(),
            ..Product::default()
        }
    }

    fn country(code: &str, group: Option<&str>) -> Country {
        Country {
            country_code: code.to_string(),
            country_region: "Europe".to_string(),
            is_region: 0,
            price_group: group.map(str::to_string),
            ..Country::default()
        }
    }

    #[test]
    fn test_find_product() {
        let products = vec![product("p1", "5GB", "30", "1")];
        assert!(find_product(&products, "p1").is_some());
        assert!(find_product(&products, "p2").is_none());
    }

    #[test]
    fn test_country_filter_resolves_price_group() {
        let products = vec![product("p1", "5GB", "30", "1"), product("p2", "10GB", "30", "2")];
        let countries = vec![country("US", Some("1"))];
        let filter = ProductFilter {
            country_code: Some("US".to_string()),
            ..ProductFilter::default()
        };
        let result = filter_products(&products, &countries, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result.first().map(|p| p.product_id.as_str()), Some("p1"));
    }

    #[test]
    fn test_unknown_country_short_circuits_to_empty() {
        let products = vec![product("p1", "5GB", "30", "1")];
        let countries = vec![country("US", Some("1"))];
        let filter = ProductFilter {
            country_code: Some("ZZ".to_string()),
            min_gb: Some(1.0),
            ..ProductFilter::default()
        };
        assert!(filter_products(&products, &countries, &filter).is_empty());
    }

    #[test]
    fn test_country_without_price_group_short_circuits() {
        let products = vec![product("p1", "5GB", "30", "1")];
        let countries = vec![country("AQ", None), country("BV", Some(""))];
        for code in ["AQ", "BV"] {
            let filter = ProductFilter {
                country_code: Some(code.to_string()),
                ..ProductFilter::default()
            };
            assert!(filter_products(&products, &countries, &filter).is_empty());
        }
    }

    #[test]
    fn test_gb_bounds_inclusive() {
        let products = vec![product("p1", "5GB", "30", "1"), product("p2", "10GB", "30", "1")];
        let filter = ProductFilter {
            min_gb: Some(10.0),
            ..ProductFilter::default()
        };
        let result = filter_products(&products, &[], &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result.first().map(|p| p.product_id.as_str()), Some("p2"));
    }

    #[test]
    fn test_day_bounds_exclude_unparsable() {
        let products = vec![
            product("p1", "5GB", "30", "1"),
            product("p2", "5GB", "", "1"),
            product("p3", "5GB", "soon", "1"),
        ];
        let filter = ProductFilter {
            min_days: Some(7),
            ..ProductFilter::default()
        };
        let result = filter_products(&products, &[], &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result.first().map(|p| p.product_id.as_str()), Some("p1"));
    }

    #[test]
    fn test_criteria_are_anded() {
        let products = vec![
            product("p1", "5GB", "30", "1"),
            product("p2", "10GB", "30", "1"),
            product("p3", "10GB", "7", "1"),
        ];
        let filter = ProductFilter {
            min_gb: Some(10.0),
            min_days: Some(14),
            ..ProductFilter::default()
        };
        let result = filter_products(&products, &[], &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result.first().map(|p| p.product_id.as_str()), Some("p2"));
    }

    #[test]
    fn test_empty_string_criteria_are_ignored() {
        let products = vec![product("p1", "5GB", "30", "1")];
        let filter = ProductFilter {
            country_code: Some(String::new()),
            price_group: Some(String::new()),
            ..ProductFilter::default()
        };
        assert_eq!(filter_products(&products, &[], &filter).len(), 1);
    }

    #[test]
    fn test_provider_filter() {
        let mut p1 = product("p1", "5GB", "30", "1");
        p1.provider_id = Some("prov_a".to_string());
        let p2 = product("p2", "5GB", "30", "1");
        let filter = ProductFilter {
            provider_id: Some("prov_a".to_string()),
            ..ProductFilter::default()
        };
        let result = filter_products(&[p1, p2], &[], &filter);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_price_groups_sorted_distinct_non_empty() {
        let products = vec![
            product("p1", "5GB", "30", "2"),
            product("p2", "5GB", "30", "1"),
            product("p3", "5GB", "30", "2"),
            product("p4", "5GB", "30", ""),
        ];
        assert_eq!(price_groups(&products), vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_countries_in_region_exact_match() {
        let countries = vec![country("GB", Some("2")), country("DE", Some("2"))];
        assert_eq!(countries_in_region(&countries, "Europe").len(), 2);
        assert!(countries_in_region(&countries, "europe").is_empty());
    }

    #[test]
    fn test_product_serde_wire_names() {
        let json = r#"{"Product_id":"p1","Product_name":"eSIM 5GB","GB":"5GB","Days":"30","Price_group":"1","Price_USD_5":"29.99"}"#;
        let parsed: Product = serde_json::from_str(json).expect("product should parse");
        assert_eq!(parsed.product_id, "p1");
        assert_eq!(parsed.data_amount, "5GB");
        assert_eq!(parsed.price_usd_5.as_deref(), Some("29.99"));

        let back = serde_json::to_value(&parsed).expect("product should serialize");
        assert_eq!(back["Product_id"], "p1");
        assert!(back.get("Price_USD_10").is_none());
    }
}
