//! Pure matching and payload building. Title equality is the only join key
//! between the two systems.

use crate::domain::model::{
    PricePayload, ProductPayload, SourceProduct, TargetProduct, VariantPayload,
};
use std::collections::HashSet;

/// First candidate whose title is exactly `name`.
///
/// Medusa's `q` search is fuzzy, so its results are only candidates.
pub fn find_exact_match<'a>(name: &str, candidates: &'a [TargetProduct]) -> Option<&'a TargetProduct> {
    candidates.iter().find(|p| p.title == name)
}

/// Target products whose title matches none of `source_names`, in target order.
pub fn plan_deletions<'a, 'n>(
    source_names: impl IntoIterator<Item = &'n str>,
    targets: &'a [TargetProduct],
) -> Vec<&'a TargetProduct> {
    let names: HashSet<&str> = source_names.into_iter().collect();
    targets
        .iter()
        .filter(|t| !names.contains(t.title.as_str()))
        .collect()
}

pub fn minor_units(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

pub fn build_create_payload(
    product: &SourceProduct,
    image_urls: Vec<String>,
    currency_code: &str,
) -> ProductPayload {
    ProductPayload {
        title: product.name.clone(),
        description: product.description.clone(),
        images: image_urls,
        variants: Some(vec![VariantPayload {
            prices: vec![PricePayload {
                amount: minor_units(product.price),
                currency_code: currency_code.to_lowercase(),
            }],
        }]),
    }
}

/// Variants and prices are left alone on update.
pub fn build_update_payload(product: &SourceProduct, image_urls: Vec<String>) -> ProductPayload {
    ProductPayload {
        title: product.name.clone(),
        description: product.description.clone(),
        images: image_urls,
        variants: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str) -> SourceProduct {
        SourceProduct {
            id: None,
            name: name.to_string(),
            description: format!("{} description", name),
            price: 12.5,
            images: vec![],
        }
    }

    fn target(id: &str, title: &str) -> TargetProduct {
        TargetProduct {
            id: id.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_exact_match_ignores_fuzzy_hits() {
        let candidates = vec![
            target("prod_1", "Linen Shirt XL"),
            target("prod_2", "linen shirt"),
            target("prod_3", "Linen Shirt"),
        ];
        let found = find_exact_match("Linen Shirt", &candidates).unwrap();
        assert_eq!(found.id, "prod_3");
        assert!(find_exact_match("Wool Shirt", &candidates).is_none());
    }

    #[test]
    fn test_plan_deletions_uses_full_source_set() {
        let source = vec![source("Mug"), source("Shirt")];
        let targets = vec![
            target("prod_1", "Mug"),
            target("prod_2", "Poster"),
            target("prod_3", "Shirt"),
            target("prod_4", "Mug "),
        ];

        let ids: Vec<&str> = plan_deletions(source.iter().map(|p| p.name.as_str()), &targets)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["prod_2", "prod_4"]);
    }

    #[test]
    fn test_plan_deletions_empty_source_deletes_everything() {
        let targets = vec![target("prod_1", "Mug")];
        assert_eq!(plan_deletions(std::iter::empty(), &targets).len(), 1);
    }

    #[test]
    fn test_minor_units_rounds() {
        assert_eq!(minor_units(19.99), 1999);
        assert_eq!(minor_units(0.29), 29);
        assert_eq!(minor_units(10.0), 1000);
    }

    #[test]
    fn test_create_payload_has_single_priced_variant() {
        let payload = build_create_payload(&source("Mug"), vec!["u1".to_string()], "USD");
        let variants = payload.variants.unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].prices[0].amount, 1250);
        assert_eq!(variants[0].prices[0].currency_code, "usd");
        assert_eq!(payload.images, vec!["u1".to_string()]);
    }
}
