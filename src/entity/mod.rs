pub mod audit_logs;
pub mod cart_items;
pub mod categories;
pub mod discount_coupons;
pub mod order_items;
pub mod orders;
pub mod product_images;
pub mod product_reviews;
pub mod products;
pub mod stock_notifications;
pub mod user_coupons;
pub mod users;
pub mod wishlist_items;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use discount_coupons::Entity as DiscountCoupons;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_images::Entity as ProductImages;
pub use product_reviews::Entity as ProductReviews;
pub use products::Entity as Products;
pub use stock_notifications::Entity as StockNotifications;
pub use user_coupons::Entity as UserCoupons;
pub use users::Entity as Users;
pub use wishlist_items::Entity as WishlistItems;
