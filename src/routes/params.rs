use std::str::FromStr;

use sea_orm::Order;
use serde::{Deserialize, Deserializer};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Pages past this are always empty; the cap keeps the offset in range.
const MAX_PAGE: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(()),
        }
    }
}

impl SortOrder {
    pub fn as_order(&self) -> Order {
        match self {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    #[default]
    Name,
    Price,
    Rating,
    Created,
}

impl FromStr for ProductSortBy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(ProductSortBy::Name),
            "price" => Ok(ProductSortBy::Price),
            "rating" => Ok(ProductSortBy::Rating),
            "created" | "created_at" | "createdat" => Ok(ProductSortBy::Created),
            _ => Err(()),
        }
    }
}

/// Unknown sort keys fall back to the default ordering rather than failing
/// the whole listing.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse().ok()))
}

/// Product listing filter. Pagination fields sit inline because query
/// strings cannot be flattened into numeric fields.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub search_term: Option<String>,
    pub category_id: Option<Uuid>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_rating: Option<f64>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub is_on_sale: Option<bool>,
    pub is_featured: Option<bool>,
    pub in_stock: Option<bool>,
    pub is_active: Option<bool>,
    #[param(inline)]
    #[serde(default, deserialize_with = "lenient")]
    pub sort_by: Option<ProductSortBy>,
    #[param(inline)]
    #[serde(default, deserialize_with = "lenient")]
    pub sort_order: Option<SortOrder>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CountQuery {
    pub count: Option<u64>,
}

impl CountQuery {
    pub fn or(&self, default: u64) -> u64 {
        self.count.unwrap_or(default).clamp(1, 100)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StockNotificationQuery {
    pub unread_only: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination {
            page: Some(0),
            per_page: Some(500),
        };
        assert_eq!(p.normalize(), (1, 100, 0));

        let p = Pagination {
            page: Some(3),
            per_page: None,
        };
        assert_eq!(p.normalize(), (3, 20, 40));
    }

    #[test]
    fn huge_page_does_not_overflow_offset() {
        let p = Pagination {
            page: Some(i64::MAX),
            per_page: Some(i64::MAX),
        };
        let (page, per_page, offset) = p.normalize();
        assert_eq!((page, per_page), (MAX_PAGE, 100));
        assert_eq!(offset, (MAX_PAGE - 1) * 100);

        let p = Pagination {
            page: Some(i64::MIN),
            per_page: Some(i64::MIN),
        };
        assert_eq!(p.normalize(), (1, 1, 0));
    }

    #[test]
    fn unknown_sort_keys_fall_back() {
        let query: ProductQuery =
            serde_json::from_value(serde_json::json!({"sort_by": "bogus", "sort_order": "sideways"}))
                .expect("query");
        assert!(query.sort_by.is_none());
        assert!(query.sort_order.is_none());

        let query: ProductQuery =
            serde_json::from_value(serde_json::json!({"sort_by": "Price", "sort_order": "desc"}))
                .expect("query");
        assert!(matches!(query.sort_by, Some(ProductSortBy::Price)));
        assert!(matches!(query.sort_order, Some(SortOrder::Desc)));
    }

    #[test]
    fn count_defaults_and_clamps() {
        assert_eq!(CountQuery { count: None }.or(10), 10);
        assert_eq!(CountQuery { count: Some(0) }.or(10), 1);
        assert_eq!(CountQuery { count: Some(1000) }.or(10), 100);
    }
}
