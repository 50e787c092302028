//! GROQ queries used by the storefront.

/// Every product, alphabetical.
pub const ALL_PRODUCTS: &str = r#"*[_type == "product"] | order(name asc)"#;

/// Products listed under a home-page tab. Params: `$variant`.
pub const PRODUCTS_BY_VARIANT: &str =
    r#"*[_type == "product" && variant == $variant] | order(name asc)"#;

/// Products referencing a category by slug. Params: `$slug`.
pub const PRODUCTS_BY_CATEGORY: &str = r#"*[_type == "product" && references(*[_type == "category" && slug.current == $slug]._id)] | order(name asc)"#;

/// A single product by slug. Params: `$slug`.
pub const PRODUCT_BY_SLUG: &str =
    r#"*[_type == "product" && slug.current == $slug] | order(name asc) [0]"#;

/// Name search; `$search` carries a trailing `*` for prefix matching.
pub const SEARCH_PRODUCTS: &str =
    r#"*[_type == "product" && name match $search] | order(name asc)"#;

/// A user's orders, newest first, with products dereferenced. Params: `$userId`.
pub const MY_ORDERS: &str = r#"*[_type == "order" && clerkUserId == $userId] | order(orderDate desc){
  ...,products[]{
    ...,product->
  }
}"#;

/// Categories, alphabetical, optionally limited to the first `limit`.
#[must_use]
pub fn all_categories(limit: Option<usize>) -> String {
    let base = r#"*[_type == "category"] | order(name asc)"#;
    match limit {
        Some(n) => format!("{base}[0...{n}]"),
        None => base.to_string(),
    }
}

/// Search parameter for a prefix match on the user's text.
#[must_use]
pub fn search_pattern(text: &str) -> String {
    format!("{}*", text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_categories_limit() {
        assert!(all_categories(Some(6)).ends_with("[0...6]"));
        assert!(!all_categories(None).contains("[0..."));
    }

    #[test]
    fn test_search_pattern() {
        assert_eq!(search_pattern(" camis "), "camis*");
    }
}
