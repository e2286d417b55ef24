use serde::{Deserialize, Serialize};
use vitrine_db::DocumentId;

pub const TITLE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

/// A catalog product.
///
/// Every `Product` is validated when it is built, including when it is read
/// back from the store, so `is_valid` and `validation_result` always describe
/// the current field values. Fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProductRecord", into = "ProductRecord")]
pub struct Product {
    id: Option<DocumentId>,
    title: String,
    description: String,
    price: f64,
    active: bool,
    validation_result: Vec<String>,
}

impl Product {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        active: bool,
    ) -> Self {
        let mut product = Self {
            id: None,
            title: title.into(),
            description: description.into(),
            price,
            active,
            validation_result: Vec::new(),
        };
        product.validation_result = product.validate();
        product
    }

    /// Same product under an existing identity.
    pub fn with_id(mut self, id: Option<DocumentId>) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> Option<DocumentId> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn is_valid(&self) -> bool {
        self.validation_result.is_empty()
    }

    /// Failed rule messages, in rule order. Empty when valid.
    pub fn validation_result(&self) -> &[String] {
        &self.validation_result
    }

    pub(crate) fn set_id(&mut self, id: DocumentId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Vec<String> {
        let mut failures = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            failures.push("Title is required.".to_string());
        } else if title.chars().count() > TITLE_MAX_LEN {
            failures.push(format!(
                "Title must be at most {} characters.",
                TITLE_MAX_LEN
            ));
        }

        if self.description.chars().count() > DESCRIPTION_MAX_LEN {
            failures.push(format!(
                "Description must be at most {} characters.",
                DESCRIPTION_MAX_LEN
            ));
        }

        if !self.price.is_finite() {
            failures.push("Price must be a finite number.".to_string());
        } else if self.price < 0.0 {
            failures.push("Price must not be negative.".to_string());
        }

        failures
    }
}

/// Stored shape of a product document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProductRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<DocumentId>,
    title: String,
    #[serde(default)]
    description: String,
    price: f64,
    #[serde(default)]
    active: bool,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Product::new(record.title, record.description, record.price, record.active)
            .with_id(record.id)
    }
}

impl From<Product> for ProductRecord {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            description: product.description,
            price: product.price,
            active: product.active,
        }
    }
}

/// Public JSON view of a stored product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub active: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.map(|id| id.to_string()),
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price,
            active: product.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_input_yields_valid_product() {
        let product = Product::new("Widget", "A widget", 9.99, true);
        assert!(product.is_valid());
        assert!(product.validation_result().is_empty());
        assert!(product.id().is_none());
    }

    #[test]
    fn zero_price_is_allowed() {
        assert!(Product::new("Freebie", "", 0.0, false).is_valid());
    }

    #[test]
    fn empty_or_blank_title_is_rejected() {
        for title in ["", "   "] {
            let product = Product::new(title, "desc", 1.0, true);
            assert!(!product.is_valid());
            assert!(product.validation_result().iter().any(|m| m.contains("Title")));
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        let product = Product::new("Widget", "", -0.01, true);
        assert_eq!(product.validation_result(), ["Price must not be negative."]);
    }

    #[test]
    fn non_finite_price_is_rejected() {
        let product = Product::new("Widget", "", f64::NAN, true);
        assert_eq!(product.validation_result(), ["Price must be a finite number."]);
    }

    #[test]
    fn length_limits_apply() {
        let product = Product::new(
            "t".repeat(TITLE_MAX_LEN + 1),
            "d".repeat(DESCRIPTION_MAX_LEN + 1),
            1.0,
            true,
        );
        assert_eq!(product.validation_result().len(), 2);

        let at_limit = Product::new("t".repeat(TITLE_MAX_LEN), "d".repeat(DESCRIPTION_MAX_LEN), 1.0, true);
        assert!(at_limit.is_valid());
    }

    #[test]
    fn failures_accumulate_in_rule_order() {
        let product = Product::new("", "", -1.0, true);
        assert_eq!(
            product.validation_result(),
            ["Title is required.", "Price must not be negative."]
        );
    }

    #[test]
    fn stored_shape_uses_underscore_id() {
        let id = DocumentId::generate();
        let product = Product::new("Widget", "A widget", 9.99, true).with_id(Some(id));
        let json = serde_json::to_value(&product).unwrap();

        assert_eq!(json["_id"], serde_json::json!(id.to_string()));
        assert_eq!(json["title"], "Widget");
        assert!(json.get("validation_result").is_none());

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn deserialized_products_are_revalidated() {
        let product: Product =
            serde_json::from_value(serde_json::json!({"title": "", "price": 1.0})).unwrap();
        assert!(!product.is_valid());
    }
}
