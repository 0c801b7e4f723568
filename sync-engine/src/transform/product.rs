use serde_json::Value;
use shared::{SourceProduct, StoreCategoryRef, StoreDimensions, StoreImage, StoreProduct};
use std::collections::HashMap;

/// Image name the storefront shows for the inventory's medium image
const MEDIUM_IMAGE_NAME: &str = "inventory_img_med";

/// A product payload plus the category ids that could not be attached
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPayload {
    pub product: StoreProduct,
    pub unmapped_categories: Vec<String>,
}

/// Build a create (`destination_id = None`) or update payload for `item`
///
/// `sku` carries the source id so create responses can be correlated.
/// Categories without an entry in `category_ids` are left off the payload
/// and returned in `unmapped_categories`.
pub fn to_store_product(
    item: &SourceProduct,
    destination_id: Option<i64>,
    category_ids: &HashMap<String, i64>,
) -> ProductPayload {
    let mut categories = Vec::with_capacity(item.category_ids.len());
    let mut unmapped_categories = Vec::new();
    for source_id in &item.category_ids {
        match category_ids.get(source_id) {
            Some(id) => {
                if !categories.iter().any(|c: &StoreCategoryRef| c.id == *id) {
                    categories.push(StoreCategoryRef { id: *id });
                }
            }
            None => unmapped_categories.push(source_id.clone()),
        }
    }

    let dimensions = StoreDimensions {
        length: field_text(item, "length"),
        width: field_text(item, "width"),
        height: field_text(item, "height"),
    };

    let images = field_text(item, "img_med")
        .map(|src| StoreImage {
            id: None,
            src: Some(src),
            name: Some(MEDIUM_IMAGE_NAME.to_string()),
        })
        .into_iter()
        .collect();

    let product = StoreProduct {
        id: destination_id,
        slug: field_text(item, "short_code"),
        sku: Some(item.id.clone()),
        name: field_text(item, "item_desc"),
        regular_price: field_text(item, "list_price"),
        stock_quantity: field_int(item, "qty_avail"),
        description: description(item),
        dimensions: (!dimensions.is_empty()).then_some(dimensions),
        categories,
        images,
        ..Default::default()
    };

    ProductPayload {
        product,
        unmapped_categories,
    }
}

/// `extended_desc`, then `links` rendered as `name: url` joined by `, `
fn description(item: &SourceProduct) -> Option<String> {
    let extended = field_text(item, "extended_desc");

    let links: Vec<String> = item
        .fields
        .get("links")
        .and_then(Value::as_array)
        .map(|links| {
            links
                .iter()
                .filter_map(|link| {
                    let name = link.get("name")?.as_str()?;
                    let url = link.get("url")?.as_str()?;
                    Some(format!("{name}: {url}"))
                })
                .collect()
        })
        .unwrap_or_default();

    match (extended, links.is_empty()) {
        (None, true) => None,
        (Some(text), true) => Some(text),
        (None, false) => Some(links.join(", ")),
        (Some(text), false) => Some(format!("{text}\n{}", links.join(", "))),
    }
}

/// Field as text; numbers are rendered, blanks and nulls are absent
fn field_text(item: &SourceProduct, key: &str) -> Option<String> {
    match item.fields.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field_int(item: &SourceProduct, key: &str) -> Option<i64> {
    match item.fields.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.trunc() as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_item() -> SourceProduct {
        SourceProduct::new("118748", vec!["4".into(), "9".into()])
            .with_field("item_desc", "Brass fitting 1/2\"")
            .with_field("short_code", "BF-12")
            .with_field("list_price", 12.5)
            .with_field("qty_avail", "14")
            .with_field("extended_desc", "Lead free brass.")
            .with_field(
                "links",
                json!([
                    {"name": "Spec sheet", "url": "https://docs.example.com/bf12.pdf"},
                    {"name": "Video", "url": "https://video.example.com/bf12"}
                ]),
            )
            .with_field("length", 3)
            .with_field("width", "1.5")
            .with_field("img_med", "https://img.example.com/bf12_med.jpg")
    }

    #[test]
    fn test_create_payload() {
        let categories = HashMap::from([("4".to_string(), 40)]);
        let payload = to_store_product(&full_item(), None, &categories);
        let product = payload.product;

        assert_eq!(product.product_type, "simple");
        assert_eq!(product.id, None);
        assert_eq!(product.sku.as_deref(), Some("118748"));
        assert_eq!(product.slug.as_deref(), Some("BF-12"));
        assert_eq!(product.name.as_deref(), Some("Brass fitting 1/2\""));
        assert_eq!(product.regular_price.as_deref(), Some("12.5"));
        assert_eq!(product.stock_quantity, Some(14));
        assert_eq!(
            product.description.as_deref(),
            Some(
                "Lead free brass.\nSpec sheet: https://docs.example.com/bf12.pdf, Video: https://video.example.com/bf12"
            )
        );

        let dimensions = product.dimensions.unwrap();
        assert_eq!(dimensions.length.as_deref(), Some("3"));
        assert_eq!(dimensions.width.as_deref(), Some("1.5"));
        assert_eq!(dimensions.height, None);

        assert_eq!(product.images.len(), 1);
        assert_eq!(product.images[0].name.as_deref(), Some("inventory_img_med"));

        assert_eq!(product.categories, vec![StoreCategoryRef { id: 40 }]);
        assert_eq!(payload.unmapped_categories, vec!["9".to_string()]);
    }

    #[test]
    fn test_update_payload_carries_destination_id() {
        let payload = to_store_product(&full_item(), Some(555), &HashMap::new());
        assert_eq!(payload.product.id, Some(555));
        assert!(payload.product.categories.is_empty());
        assert_eq!(payload.unmapped_categories.len(), 2);
    }

    #[test]
    fn test_sparse_item() {
        let item = SourceProduct::new("1", vec![]).with_field("item_desc", "Plain");
        let product = to_store_product(&item, None, &HashMap::new()).product;

        assert_eq!(product.description, None);
        assert_eq!(product.dimensions, None);
        assert!(product.images.is_empty());
        assert_eq!(product.regular_price, None);

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["type"], "simple");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_duplicate_category_mappings_collapse() {
        let item = SourceProduct::new("1", vec!["4".into(), "5".into()]);
        let categories = HashMap::from([("4".to_string(), 40), ("5".to_string(), 40)]);
        let product = to_store_product(&item, None, &categories).product;
        assert_eq!(product.categories.len(), 1);
    }
}
