//! Built-in sample data.
//!
//! Served when the gateway runs in sample-data mode, or as a last-resort
//! substitute when every live source fails and the fallback is explicitly
//! permitted.

use crate::catalog::{Country, Product};

/// The fixture product set.
#[must_use]
pub fn sample_products() -> Vec<Product> {
    vec![
        Product {
            product_id: "prod001".to_string(),
            product_name: "eSIM 5GB Global".to_string(),
            data_amount: "5GB".to_string(),
            validity_days: "30".to_string(),
            price_group: "1".to_string(),
            price_usd_5: Some("29.99".to_string()),
            ..Product::default()
        },
        Product {
            product_id: "prod002".to_string(),
            product_name: "eSIM 10GB Global".to_string(),
            data_amount: "10GB".to_string(),
            validity_days: "30".to_string(),
            price_group: "2".to_string(),
            price_usd_10: Some("49.99".to_string()),
            ..Product::default()
        },
        Product {
            product_id: "prod003".to_string(),
            product_name: "eSIM 3GB Europe".to_string(),
            data_amount: "3GB".to_string(),
            validity_days: "7".to_string(),
            price_group: "1".to_string(),
            price_usd_5: Some("19.99".to_string()),
            ..Product::default()
        },
        Product {
            product_id: "prod004".to_string(),
            product_name: "eSIM 20GB USA".to_string(),
            data_amount: "20GB".to_string(),
            validity_days: "14".to_string(),
            price_group: "3".to_string(),
            price_usd_15: Some("39.99".to_string()),
            ..Product::default()
        },
    ]
}

/// The fixture country set.
#[must_use]
pub fn sample_countries() -> Vec<Country> {
    [
        ("US", "North America", "1", "North America"),
        ("CA", "North America", "1", "North America"),
        ("GB", "Europe", "2", "Europe"),
        ("DE", "Europe", "2", "Europe"),
        ("FR", "Europe", "2", "Europe"),
        ("JP", "Asia", "3", "Asia"),
        ("CN", "Asia", "3", "Asia"),
    ]
    .into_iter()
    .map(|(code, region, group, continent)| Country {
        country_code: code.to_string(),
        country_region: region.to_string(),
        is_region: 0,
        price_group: Some(group.to_string()),
        continent: Some(continent.to_string()),
        ..Country::default()
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ProductFilter, filter_products, price_groups};

    #[test]
    fn test_sample_catalog_is_internally_consistent() {
        let products = sample_products();
        let countries = sample_countries();

        // Every country's price group has at least one product priced for it.
        let groups = price_groups(&products);
        for country in &countries {
            let group = country.price_group.as_deref().unwrap_or_default();
            assert!(groups.iter().any(|g| g == group), "no products for {group}");
        }
    }

    #[test]
    fn test_sample_us_filter() {
        let products = sample_products();
        let countries = sample_countries();
        let filter = ProductFilter {
            country_code: Some("US".to_string()),
            ..ProductFilter::default()
        };
        let matched = filter_products(&products, &countries, &filter);
        assert!(matched.iter().all(|p| p.price_group == "1"));
        assert_eq!(matched.len(), 2);
    }
}
