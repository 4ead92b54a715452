//! Schema tables for each validated collection.

use std::sync::LazyLock;

use super::{FieldRule, Schema};
use crate::types::City;

/// Order documents, checked at checkout.
pub static ORDER_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("orders")
        .field(
            FieldRule::number("finalPrice")
                .min(0, "Final price can't be negative")
                .max(10_000, "Final price can't exceed 10,000")
                .invalid("Final price must be a number"),
        )
        .field(
            FieldRule::text("deliveryCity")
                .required("Missing delivery city")
                .min_length(2, "Delivery city too short")
                .max_length(50, "Delivery city too long")
                .one_of(City::names(), "Delivery city is not a supported city"),
        )
        .field(
            FieldRule::trimmed("deliveryStreet")
                .required("Missing delivery street")
                .min_length(2, "Delivery street too short")
                .max_length(100, "Delivery street too long"),
        )
        .field(
            FieldRule::date("deliveryDate")
                .required("Missing delivery date")
                .invalid("Delivery date is not a valid date"),
        )
        .field(
            FieldRule::trimmed("creditCard")
                .required("Missing credit card")
                .pattern(
                    r"^[0-9]{14,16}$",
                    "Credit card must be a minimum of 14 numbers and max 16 numbers",
                )
                .invalid("Credit card must be a minimum of 14 numbers and max 16 numbers"),
        )
        .field(FieldRule::reference("userId").invalid("User id is not valid"))
        .field(
            FieldRule::reference("cartId")
                .required("Missing cart id")
                .invalid("Cart id is not valid"),
        )
});

/// Product documents, checked on admin create and update.
pub static PRODUCT_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("products")
        .field(
            FieldRule::trimmed("name")
                .required("Missing product name")
                .min_length(2, "Product name too short")
                .max_length(100, "Product name too long"),
        )
        .field(
            FieldRule::number("price")
                .required("Missing price")
                .min(0, "Price can't be negative")
                .max(1_000, "Price can't exceed 1,000")
                .invalid("Price must be a number"),
        )
        .field(
            FieldRule::reference("categoryId")
                .required("Missing category")
                .invalid("Category id is not valid"),
        )
});

/// Fields collected by the first registration step.
pub const USER_IDENTITY_FIELDS: [&str; 3] = ["idNumber", "username", "password"];

/// Fields collected by the second registration step.
pub const USER_PROFILE_FIELDS: [&str; 4] = ["firstName", "lastName", "city", "street"];

/// User documents, checked at registration.
pub static USER_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("users")
        .field(
            FieldRule::trimmed("idNumber")
                .required("Missing id number")
                .pattern(r"^[0-9]{9}$", "Id number must be exactly 9 digits"),
        )
        .field(
            FieldRule::trimmed("username")
                .required("Missing username")
                .min_length(4, "Username too short")
                .max_length(100, "Username too long"),
        )
        .field(
            FieldRule::text("password")
                .required("Missing password")
                .min_length(4, "Password too short")
                .max_length(128, "Password too long"),
        )
        .field(
            FieldRule::trimmed("firstName")
                .required("Missing first name")
                .min_length(2, "First name too short")
                .max_length(50, "First name too long"),
        )
        .field(
            FieldRule::trimmed("lastName")
                .required("Missing last name")
                .min_length(2, "Last name too short")
                .max_length(50, "Last name too long"),
        )
        .field(
            FieldRule::text("city")
                .required("Missing city")
                .one_of(City::names(), "City is not a supported city"),
        )
        .field(
            FieldRule::trimmed("street")
                .required("Missing street")
                .min_length(2, "Street too short")
                .max_length(100, "Street too long"),
        )
});

/// Cart item documents, checked when adding to a cart.
pub static CART_ITEM_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("cart_items")
        .field(
            FieldRule::reference("productId")
                .required("Missing product id")
                .invalid("Product id is not valid"),
        )
        .field(
            FieldRule::number("quantity")
                .required("Missing quantity")
                .min(1, "Quantity must be at least 1")
                .max(100, "Quantity can't exceed 100")
                .invalid("Quantity must be a number"),
        )
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn valid_order() -> Value {
        json!({
            "finalPrice": 120,
            "deliveryCity": "Haifa",
            "deliveryStreet": "Herzl 10",
            "deliveryDate": "2026-11-02",
            "creditCard": "1234567890123456",
            "userId": "5f0c8a8e-4d57-4e5e-9a43-31c0d3d9b0a1",
            "cartId": "0b7e4a4e-0c0f-4a57-8bd5-3f0f4f3c1c2d"
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut payload = valid_order();
        payload[field] = value;
        payload
    }

    fn without(field: &str) -> Value {
        let mut payload = valid_order();
        payload.as_object_mut().unwrap().remove(field);
        payload
    }

    #[test]
    fn test_valid_order_passes() {
        assert!(ORDER_SCHEMA.validate(&valid_order()).is_ok());
    }

    #[test]
    fn test_missing_required_order_fields() {
        let cases = [
            ("deliveryCity", "Missing delivery city"),
            ("deliveryStreet", "Missing delivery street"),
            ("deliveryDate", "Missing delivery date"),
            ("creditCard", "Missing credit card"),
        ];
        for (field, message) in cases {
            let err = ORDER_SCHEMA.validate(&without(field)).unwrap_err();
            assert_eq!(err.message_for(field), Some(message), "field {field}");
            assert_eq!(err.errors.len(), 1, "field {field}");
        }
    }

    #[test]
    fn test_credit_card_pattern() {
        let message = "Credit card must be a minimum of 14 numbers and max 16 numbers";
        for bad in ["123", "12345678901234567", "1234abcd901234"] {
            let err = ORDER_SCHEMA.validate(&with("creditCard", json!(bad))).unwrap_err();
            assert_eq!(err.message_for("creditCard"), Some(message), "value {bad}");
        }
        for good in ["12345678901234", "1234567890123456"] {
            assert!(ORDER_SCHEMA.validate(&with("creditCard", json!(good))).is_ok());
        }
        // Numeric input is read as its digits
        assert!(
            ORDER_SCHEMA
                .validate(&with("creditCard", json!(12_345_678_901_234_u64)))
                .is_ok()
        );
    }

    #[test]
    fn test_final_price_bounds() {
        let err = ORDER_SCHEMA.validate(&with("finalPrice", json!(-1))).unwrap_err();
        assert_eq!(
            err.message_for("finalPrice"),
            Some("Final price can't be negative")
        );

        assert!(ORDER_SCHEMA.validate(&with("finalPrice", json!(10_000))).is_ok());

        let err = ORDER_SCHEMA
            .validate(&with("finalPrice", json!(10_001)))
            .unwrap_err();
        assert_eq!(
            err.message_for("finalPrice"),
            Some("Final price can't exceed 10,000")
        );
    }

    #[test]
    fn test_delivery_city_must_be_known() {
        let err = ORDER_SCHEMA
            .validate(&with("deliveryCity", json!("Gotham")))
            .unwrap_err();
        assert_eq!(
            err.message_for("deliveryCity"),
            Some("Delivery city is not a supported city")
        );
        let err = ORDER_SCHEMA
            .validate(&with("deliveryCity", json!("X")))
            .unwrap_err();
        assert_eq!(err.message_for("deliveryCity"), Some("Delivery city too short"));
    }

    #[test]
    fn test_delivery_street_is_trimmed() {
        let err = ORDER_SCHEMA
            .validate(&with("deliveryStreet", json!("  a  ")))
            .unwrap_err();
        assert_eq!(
            err.message_for("deliveryStreet"),
            Some("Delivery street too short")
        );
        let long = "x".repeat(101);
        let err = ORDER_SCHEMA
            .validate(&with("deliveryStreet", json!(long)))
            .unwrap_err();
        assert_eq!(
            err.message_for("deliveryStreet"),
            Some("Delivery street too long")
        );
    }

    #[test]
    fn test_delivery_date_must_parse() {
        let err = ORDER_SCHEMA
            .validate(&with("deliveryDate", json!("someday")))
            .unwrap_err();
        assert_eq!(
            err.message_for("deliveryDate"),
            Some("Delivery date is not a valid date")
        );
    }

    #[test]
    fn test_multiple_violations_reported_together() {
        let mut payload = without("deliveryCity");
        payload["creditCard"] = json!("123");
        let err = ORDER_SCHEMA.validate(&payload).unwrap_err();
        assert_eq!(err.errors.len(), 2);
    }

    #[test]
    fn test_user_identity_subset() {
        let identity = USER_SCHEMA.only(&USER_IDENTITY_FIELDS);
        assert!(
            identity
                .validate(&json!({
                    "idNumber": "123456789",
                    "username": "dana@example.com",
                    "password": "secret1"
                }))
                .is_ok()
        );
        let err = identity
            .validate(&json!({ "idNumber": "12", "username": "dana", "password": "x" }))
            .unwrap_err();
        assert_eq!(
            err.message_for("idNumber"),
            Some("Id number must be exactly 9 digits")
        );
        assert_eq!(err.message_for("password"), Some("Password too short"));
    }

    #[test]
    fn test_product_price_bounds() {
        let base = json!({
            "name": "Apples",
            "price": "4.90",
            "categoryId": "0b7e4a4e-0c0f-4a57-8bd5-3f0f4f3c1c2d"
        });
        assert!(PRODUCT_SCHEMA.validate(&base).is_ok());

        let mut expensive = base.clone();
        expensive["price"] = json!("1000.01");
        let err = PRODUCT_SCHEMA.validate(&expensive).unwrap_err();
        assert_eq!(err.message_for("price"), Some("Price can't exceed 1,000"));
    }

    #[test]
    fn test_cart_item_quantity() {
        let err = CART_ITEM_SCHEMA
            .validate(&json!({
                "productId": "0b7e4a4e-0c0f-4a57-8bd5-3f0f4f3c1c2d",
                "quantity": 0
            }))
            .unwrap_err();
        assert_eq!(
            err.message_for("quantity"),
            Some("Quantity must be at least 1")
        );
    }
}
