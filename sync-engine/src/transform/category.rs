use shared::{SourceCategory, StoreCategory, StoreImage};

/// Build a create payload for `category`
///
/// `slug` carries the source id so the create response can be correlated.
/// `parent` is the destination id of the mapped parent, `None` for roots.
pub fn to_store_category(category: &SourceCategory, parent: Option<i64>) -> StoreCategory {
    let image = category
        .image_ref
        .as_ref()
        .filter(|src| !src.trim().is_empty())
        .map(|src| StoreImage {
            id: None,
            src: Some(src.clone()),
            name: Some(category.title.clone()),
        });

    StoreCategory {
        id: None,
        name: category.title.clone(),
        slug: category.id.clone(),
        parent,
        image,
    }
}
