use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Sweet entity - a catalog item stored in MongoDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Sweet {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Display name, unique ignoring case
    pub name: String,
    /// Free-form category, e.g. "Nut-Based"
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Units in stock, never negative
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new sweet
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSweet {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "not_blank", message = "Name is required")
    )]
    pub name: String,
    #[validate(
        length(min = 1, max = 50, message = "Category must be between 1 and 50 characters"),
        custom(function = "not_blank", message = "Category is required")
    )]
    pub category: String,
    #[validate(range(min = 0.0, message = "Price must be a non-negative number"))]
    pub price: f64,
    #[validate(range(min = 0, message = "Quantity must be a non-negative integer"))]
    pub quantity: i64,
}

/// DTO for a partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
pub struct UpdateSweet {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "not_blank", message = "Name is required")
    )]
    pub name: Option<String>,
    #[validate(
        length(min = 1, max = 50, message = "Category must be between 1 and 50 characters"),
        custom(function = "not_blank", message = "Category is required")
    )]
    pub category: Option<String>,
    #[validate(range(min = 0.0, message = "Price must be a non-negative number"))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "Quantity must be a non-negative integer"))]
    pub quantity: Option<i64>,
}

impl UpdateSweet {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
    }

    /// Trim string fields in place.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|n| n.trim().to_string());
        self.category = self.category.map(|c| c.trim().to_string());
        self
    }
}

/// Body of `POST /{id}/purchase`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PurchaseRequest {
    #[validate(range(min = 1, message = "Invalid quantity"))]
    pub quantity: i64,
}

/// Body of `PATCH /{id}/restock`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RestockRequest {
    #[validate(range(min = 1, message = "Invalid quantity"))]
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseResponse {
    pub message: String,
    pub sweet: Sweet,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteSweetResponse {
    pub message: String,
}

/// Fields the list endpoint can sort by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Price,
    Quantity,
    Category,
    #[default]
    CreatedAt,
}

impl SortField {
    /// Stored document field backing this sort key.
    pub fn document_field(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::Quantity => "quantity",
            SortField::Category => "category",
            SortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn direction(self) -> i32 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

/// Query parameters for `GET /api/sweets`
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Case-insensitive substring of the sweet name
    pub name: Option<String>,
    /// Case-insensitive exact category
    pub category: Option<String>,
    /// Sort key, defaults to `createdAt`
    #[serde(default)]
    #[param(inline)]
    pub sort_by: SortField,
    /// Sort direction, defaults to `desc` for `createdAt` and `asc` otherwise
    #[param(inline)]
    pub order: Option<SortOrder>,
    /// 1-based page number
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: u64,
    /// Page size
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            name: None,
            category: None,
            sort_by: SortField::default(),
            order: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListQuery {
    pub fn effective_order(&self) -> SortOrder {
        self.order.unwrap_or(match self.sort_by {
            SortField::CreatedAt => SortOrder::Desc,
            _ => SortOrder::Asc,
        })
    }

    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Non-empty, trimmed name filter.
    pub fn name_filter(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Non-empty, trimmed category filter.
    pub fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Paginated list response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweetListResponse {
    pub sweets: Vec<Sweet>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl SweetListResponse {
    pub fn new(sweets: Vec<Sweet>, total: u64, query: &ListQuery) -> Self {
        Self {
            sweets,
            total,
            page: query.page,
            limit: query.limit,
            total_pages: total.div_ceil(query.limit.max(1)),
        }
    }
}

impl Sweet {
    /// Create a new sweet from the CreateSweet DTO
    pub fn new(input: CreateSweet) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            category: input.category.trim().to_string(),
            price: input.price,
            quantity: input.quantity,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply updates from the UpdateSweet DTO
    pub fn apply_update(&mut self, update: UpdateSweet) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str) -> CreateSweet {
        CreateSweet {
            name: name.to_string(),
            category: "Nut-Based".to_string(),
            price: 50.0,
            quantity: 10,
        }
    }

    #[test]
    fn test_new_sweet_trims_fields() {
        let mut input = create("  Kaju Katli ");
        input.category = " Nut-Based ".to_string();
        let sweet = Sweet::new(input);
        assert_eq!(sweet.name, "Kaju Katli");
        assert_eq!(sweet.category, "Nut-Based");
        assert_eq!(sweet.created_at, sweet.updated_at);
    }

    #[test]
    fn test_create_validation() {
        assert!(create("Ladoo").validate().is_ok());
        assert!(create("   ").validate().is_err());

        let mut negative = create("Ladoo");
        negative.quantity = -1;
        assert!(negative.validate().is_err());

        let mut cheap = create("Ladoo");
        cheap.price = -0.5;
        assert!(cheap.validate().is_err());

        assert!(create(&"x".repeat(101)).validate().is_err());
    }

    #[test]
    fn test_purchase_requires_positive_quantity() {
        let err = PurchaseRequest { quantity: 0 }.validate().unwrap_err();
        let fields = err.field_errors();
        assert_eq!(
            fields["quantity"][0].message.as_deref(),
            Some("Invalid quantity")
        );
        assert!(RestockRequest { quantity: 3 }.validate().is_ok());
    }

    #[test]
    fn test_apply_update_is_partial() {
        let mut sweet = Sweet::new(create("Barfi"));
        sweet.apply_update(UpdateSweet {
            price: Some(65.0),
            ..Default::default()
        });
        assert_eq!(sweet.name, "Barfi");
        assert_eq!(sweet.price, 65.0);
        assert_eq!(sweet.quantity, 10);
    }

    #[test]
    fn test_default_order_depends_on_sort_field() {
        let mut query = ListQuery::default();
        assert_eq!(query.effective_order(), SortOrder::Desc);

        query.sort_by = SortField::Price;
        assert_eq!(query.effective_order(), SortOrder::Asc);

        query.order = Some(SortOrder::Desc);
        assert_eq!(query.effective_order(), SortOrder::Desc);
    }

    #[test]
    fn test_list_query_deserializes_camel_case() {
        let query: ListQuery =
            serde_json::from_str(r#"{"sortBy":"createdAt","order":"asc","page":3,"limit":20}"#)
                .unwrap();
        assert_eq!(query.sort_by, SortField::CreatedAt);
        assert_eq!(query.order, Some(SortOrder::Asc));
        assert_eq!(query.skip(), 40);
    }

    #[test]
    fn test_list_query_bounds() {
        let query = ListQuery {
            limit: 101,
            ..Default::default()
        };
        assert!(query.validate().is_err());

        let query = ListQuery {
            page: 0,
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let query = ListQuery {
            name: Some("  ".into()),
            category: Some(" Milk-Based ".into()),
            ..Default::default()
        };
        assert_eq!(query.name_filter(), None);
        assert_eq!(query.category_filter(), Some("Milk-Based"));
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let query = ListQuery {
            limit: 2,
            ..Default::default()
        };
        assert_eq!(SweetListResponse::new(vec![], 5, &query).total_pages, 3);
        assert_eq!(SweetListResponse::new(vec![], 0, &query).total_pages, 0);
    }
}
