use utoipa::{
    Modify, OpenApi,
    openapi::{
        self, OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::AuthResponse,
        coupons::CouponValidation,
        products::{BulkResult, BulkUploadResult, CategoryCounts},
        wishlist::WishlistCheck,
    },
    models::{
        CartItem, Category, Coupon, DiscountType, Order, OrderItem, OrderStatus, Product,
        ProductImage, Review, Role, StockNotification, User, WishlistItem,
    },
    pricing::CartSummary,
    response::{ApiResponse, Meta},
    routes::{auth, cart, categories, coupons, health, orders, products, reviews, wishlist},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::get_profile,
        auth::update_profile,
        auth::change_password,
        auth::refresh_token,
        products::list_products,
        products::search_products,
        products::get_product,
        products::get_product_by_sku,
        products::featured_products,
        products::products_by_category,
        products::related_products,
        products::top_rated_products,
        products::best_selling_products,
        products::list_reviews,
        products::create_review,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::update_stock,
        products::low_stock_products,
        products::add_image,
        products::delete_image,
        products::set_primary_image,
        products::bulk_upload,
        products::bulk_update_status,
        products::bulk_delete,
        products::category_count,
        products::list_stock_notifications,
        products::mark_notification_read,
        categories::list_categories,
        categories::get_category,
        categories::category_products,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_cart_item,
        cart::clear_cart,
        cart::cart_summary,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        wishlist::move_to_cart,
        wishlist::check_wishlist,
        orders::checkout,
        orders::list_orders,
        orders::get_order,
        orders::list_all_orders,
        orders::update_order_status,
        coupons::create_coupon,
        coupons::list_coupons,
        coupons::validate_coupon,
        reviews::approve_review
    ),
    components(
        schemas(
            User,
            Role,
            Category,
            Product,
            ProductImage,
            CartItem,
            CartSummary,
            WishlistItem,
            WishlistCheck,
            Order,
            OrderItem,
            OrderStatus,
            Coupon,
            CouponValidation,
            DiscountType,
            Review,
            StockNotification,
            AuthResponse,
            BulkResult,
            BulkUploadResult,
            CategoryCounts,
            Meta,
            ApiResponse<Product>,
            ApiResponse<Order>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and profile"),
        (name = "Products", description = "Catalog browsing and administration"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Coupons", description = "Discount coupons"),
        (name = "Reviews", description = "Product reviews"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
