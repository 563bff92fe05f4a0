//! Record-level sanitizers for user registration and product data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::sanitizer::sanitize_input;

/// Longest accepted display name
pub const MAX_NAME_LENGTH: usize = 100;
/// Longest accepted product title
pub const MAX_TITLE_LENGTH: usize = 200;
/// Longest accepted product description
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// Registration form record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistration {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Password, never altered
    pub password: String,
    /// Optional phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Clean every text field of a registration; the password passes through
/// byte-for-byte.
pub fn sanitize_user_input(user: &UserRegistration) -> UserRegistration {
    UserRegistration {
        name: sanitize_input(&user.name, MAX_NAME_LENGTH),
        email: sanitize_input(&user.email, super::MAX_EMAIL_LENGTH),
        password: user.password.clone(),
        phone: user.phone.as_deref().map(|p| sanitize_input(p, 32)),
    }
}

/// Uploaded image metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUpload {
    /// Original file name
    pub file_name: String,
    /// MIME type
    pub content_type: String,
    /// Size in bytes
    pub size: u64,
}

/// Product record with only well-typed fields kept
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
    /// Title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unit price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Stock quantity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    /// Category identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    /// Product image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageUpload>,
}

/// Clean a loosely-typed product record.
///
/// Text fields are sanitized. Numeric, UUID and image fields are kept only
/// when they already have the expected type; anything else, including
/// unknown keys, is dropped.
pub fn sanitize_product_data(raw: &Value) -> ProductData {
    let Some(map) = raw.as_object() else {
        return ProductData::default();
    };

    let text = |key: &str, max: usize| {
        map.get(key)
            .and_then(Value::as_str)
            .map(|s| sanitize_input(s, max))
    };

    ProductData {
        title: text("title", MAX_TITLE_LENGTH),
        description: text("description", MAX_DESCRIPTION_LENGTH),
        price: map
            .get("price")
            .and_then(Value::as_f64)
            .filter(|p| p.is_finite()),
        quantity: map.get("quantity").and_then(Value::as_i64),
        category_id: map
            .get("category_id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok()),
        image: map
            .get("image")
            .filter(|v| v.is_object())
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_password_untouched() {
        let user = UserRegistration {
            name: "  Jane <script>x</script> ".to_string(),
            email: " jane@example.com".to_string(),
            password: " p<script>alert(1)</script>'; --".to_string(),
            phone: None,
        };
        let clean = sanitize_user_input(&user);
        assert_eq!(clean.name, "Jane");
        assert_eq!(clean.email, "jane@example.com");
        assert_eq!(clean.password, user.password);
    }

    #[test]
    fn test_product_drops_wrong_types() {
        let raw = json!({
            "title": "X<script>alert(1)</script>",
            "price": "abc",
            "quantity": 5,
        });
        let product = sanitize_product_data(&raw);
        assert_eq!(product.title.as_deref(), Some("X"));
        assert_eq!(product.price, None);
        assert_eq!(product.quantity, Some(5));

        let out = serde_json::to_value(&product).unwrap();
        assert!(out.get("price").is_none());
        assert_eq!(out["quantity"], 5);
    }

    #[test]
    fn test_product_typed_fields() {
        let id = Uuid::new_v4();
        let raw = json!({
            "price": 19.99,
            "quantity": 2.5,
            "category_id": id.to_string(),
            "image": {"file_name": "a.png", "content_type": "image/png", "size": 1024},
            "owner": "ignored",
        });
        let product = sanitize_product_data(&raw);
        assert_eq!(product.price, Some(19.99));
        assert_eq!(product.quantity, None);
        assert_eq!(product.category_id, Some(id));
        assert_eq!(product.image.unwrap().size, 1024);
    }

    #[test]
    fn test_product_bad_uuid_and_image() {
        let raw = json!({"category_id": "not-a-uuid", "image": "a.png"});
        let product = sanitize_product_data(&raw);
        assert_eq!(product, ProductData::default());
    }

    #[test]
    fn test_product_non_object() {
        assert_eq!(sanitize_product_data(&json!([1, 2])), ProductData::default());
    }
}
