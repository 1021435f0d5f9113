//! Typed HTTP client that mirrors the shopper's server-side state.
//!
//! The auth token, the category list, the cart and the wishlist are cached
//! locally. Every mutation goes to the server first and then reloads the
//! affected cache, so the cache never holds state the server has not accepted.

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    dto::{
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        cart::{AddToCartRequest, UpdateCartItemRequest},
        categories::CategoryRequest,
        wishlist::{AddToWishlistRequest, MoveToCartRequest},
    },
    models::{CartItem, Category, Role, User, WishlistItem},
    response::ApiResponse,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Response carried no data")]
    EmptyResponse,

    #[error("Not signed in")]
    NotAuthenticated,
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone)]
struct Session {
    token: String,
    user: User,
}

#[derive(Default)]
struct Caches {
    categories: Option<Vec<Category>>,
    cart: Option<Vec<CartItem>>,
    wishlist: Option<Vec<WishlistItem>>,
}

pub struct ShopClient {
    http: Client,
    base_url: String,
    session: RwLock<Option<Session>>,
    caches: RwLock<Caches>,
}

impl ShopClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            session: RwLock::new(None),
            caches: RwLock::new(Caches::default()),
        }
    }

    // auth

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self
            .send(Method::POST, "/api/auth/login", Some(&body))
            .await?;
        Ok(self.start_session(auth).await)
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<User> {
        let auth: AuthResponse = self
            .send(Method::POST, "/api/auth/register", Some(request))
            .await?;
        Ok(self.start_session(auth).await)
    }

    /// Drops the token and every cached collection.
    pub async fn logout(&self) {
        *self.session.write().await = None;
        *self.caches.write().await = Caches::default();
        tracing::debug!("client session cleared");
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    pub async fn is_admin(&self) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .is_some_and(|s| Role::parse(&s.user.role) == Role::Admin)
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    async fn ensure_signed_in(&self) -> ClientResult<()> {
        if self.is_authenticated().await {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }

    async fn start_session(&self, auth: AuthResponse) -> User {
        let user = auth.user.clone();
        *self.session.write().await = Some(Session {
            token: auth.token,
            user: auth.user,
        });
        *self.caches.write().await = Caches::default();
        user
    }

    // categories

    /// Loaded from the server on first use, then served from the cache.
    pub async fn categories(&self) -> ClientResult<Vec<Category>> {
        if let Some(cached) = &self.caches.read().await.categories {
            return Ok(cached.clone());
        }
        self.reload_categories().await
    }

    pub async fn reload_categories(&self) -> ClientResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .send(Method::GET, "/api/categories", None::<&()>)
            .await?;
        self.caches.write().await.categories = Some(categories.clone());
        Ok(categories)
    }

    pub async fn create_category(&self, request: &CategoryRequest) -> ClientResult<Vec<Category>> {
        self.send_discard(Method::POST, "/api/categories", Some(request))
            .await?;
        self.reload_categories().await
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        request: &CategoryRequest,
    ) -> ClientResult<Vec<Category>> {
        self.send_discard(Method::PUT, &format!("/api/categories/{id}"), Some(request))
            .await?;
        self.reload_categories().await
    }

    pub async fn delete_category(&self, id: Uuid) -> ClientResult<Vec<Category>> {
        self.send_discard(Method::DELETE, &format!("/api/categories/{id}"), None::<&()>)
            .await?;
        self.reload_categories().await
    }

    // cart

    pub async fn cart_items(&self) -> ClientResult<Vec<CartItem>> {
        if let Some(cached) = &self.caches.read().await.cart {
            return Ok(cached.clone());
        }
        self.reload_cart().await
    }

    pub async fn reload_cart(&self) -> ClientResult<Vec<CartItem>> {
        self.ensure_signed_in().await?;
        let items: Vec<CartItem> = self.send(Method::GET, "/api/cart", None::<&()>).await?;
        self.caches.write().await.cart = Some(items.clone());
        Ok(items)
    }

    pub async fn add_to_cart(&self, product_id: Uuid, quantity: i32) -> ClientResult<Vec<CartItem>> {
        let body = AddToCartRequest {
            product_id,
            quantity,
        };
        self.send_discard(Method::POST, "/api/cart", Some(&body))
            .await?;
        self.reload_cart().await
    }

    pub async fn update_cart_item(
        &self,
        item_id: Uuid,
        quantity: i32,
    ) -> ClientResult<Vec<CartItem>> {
        let body = UpdateCartItemRequest { quantity };
        self.send_discard(Method::PUT, &format!("/api/cart/{item_id}"), Some(&body))
            .await?;
        self.reload_cart().await
    }

    pub async fn remove_cart_item(&self, item_id: Uuid) -> ClientResult<Vec<CartItem>> {
        self.send_discard(Method::DELETE, &format!("/api/cart/{item_id}"), None::<&()>)
            .await?;
        self.reload_cart().await
    }

    pub async fn clear_cart(&self) -> ClientResult<()> {
        self.send_discard(Method::DELETE, "/api/cart/clear", None::<&()>)
            .await?;
        self.caches.write().await.cart = Some(Vec::new());
        Ok(())
    }

    /// Total units across cached cart lines.
    pub async fn cart_item_count(&self) -> i64 {
        self.caches
            .read()
            .await
            .cart
            .as_deref()
            .map_or(0, |items| items.iter().map(|i| i64::from(i.quantity)).sum())
    }

    /// Sum of cached line totals, in cents.
    pub async fn cart_subtotal(&self) -> i64 {
        self.caches
            .read()
            .await
            .cart
            .as_deref()
            .map_or(0, |items| items.iter().map(|i| i.total_price).sum())
    }

    pub async fn is_in_cart(&self, product_id: Uuid) -> bool {
        self.cached_cart_line(product_id).await.is_some()
    }

    /// Bumps an existing line by `quantity`, or adds a new one.
    pub async fn quick_add_to_cart(
        &self,
        product_id: Uuid,
        quantity: i32,
    ) -> ClientResult<Vec<CartItem>> {
        match self.cached_cart_line(product_id).await {
            Some(line) => {
                self.update_cart_item(line.id, line.quantity + quantity)
                    .await
            }
            None => self.add_to_cart(product_id, quantity).await,
        }
    }

    async fn cached_cart_line(&self, product_id: Uuid) -> Option<CartItem> {
        self.caches
            .read()
            .await
            .cart
            .as_deref()
            .and_then(|items| items.iter().find(|i| i.product_id == product_id).cloned())
    }

    // wishlist

    pub async fn wishlist_items(&self) -> ClientResult<Vec<WishlistItem>> {
        if let Some(cached) = &self.caches.read().await.wishlist {
            return Ok(cached.clone());
        }
        self.reload_wishlist().await
    }

    pub async fn reload_wishlist(&self) -> ClientResult<Vec<WishlistItem>> {
        self.ensure_signed_in().await?;
        let items: Vec<WishlistItem> = self
            .send(Method::GET, "/api/wishlist", None::<&()>)
            .await?;
        self.caches.write().await.wishlist = Some(items.clone());
        Ok(items)
    }

    pub async fn add_to_wishlist(&self, product_id: Uuid) -> ClientResult<Vec<WishlistItem>> {
        let body = AddToWishlistRequest { product_id };
        self.send_discard(Method::POST, "/api/wishlist", Some(&body))
            .await?;
        self.reload_wishlist().await
    }

    pub async fn remove_from_wishlist(&self, item_id: Uuid) -> ClientResult<Vec<WishlistItem>> {
        self.send_discard(Method::DELETE, &format!("/api/wishlist/{item_id}"), None::<&()>)
            .await?;
        self.reload_wishlist().await
    }

    /// Moves a wishlist entry into the cart and refreshes both caches.
    pub async fn move_to_cart(&self, item_id: Uuid, quantity: i32) -> ClientResult<()> {
        let body = MoveToCartRequest { quantity };
        self.send_discard(
            Method::POST,
            &format!("/api/wishlist/{item_id}/move-to-cart"),
            Some(&body),
        )
        .await?;
        self.reload_wishlist().await?;
        self.reload_cart().await?;
        Ok(())
    }

    /// Returns whether the product is wishlisted afterwards.
    pub async fn toggle_wishlist(&self, product_id: Uuid) -> ClientResult<bool> {
        let existing = self.cached_wishlist_entry(product_id).await;
        match existing {
            Some(entry) => {
                self.remove_from_wishlist(entry.id).await?;
                Ok(false)
            }
            None => {
                self.add_to_wishlist(product_id).await?;
                Ok(true)
            }
        }
    }

    pub async fn is_in_wishlist(&self, product_id: Uuid) -> bool {
        self.cached_wishlist_entry(product_id).await.is_some()
    }

    async fn cached_wishlist_entry(&self, product_id: Uuid) -> Option<WishlistItem> {
        self.caches
            .read()
            .await
            .wishlist
            .as_deref()
            .and_then(|items| items.iter().find(|i| i.product_id == product_id).cloned())
    }

    // transport

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match self.session.read().await.as_ref() {
            Some(session) => builder.bearer_auth(&session.token),
            None => builder,
        }
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<reqwest::Response> {
        let mut builder = self.request(method, path).await;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&text)
            .map(|envelope| envelope.message)
            .unwrap_or(text);
        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!(path, "server rejected the session token");
        }
        Err(ClientError::Api { status, message })
    }

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.execute(method, path, body).await?;
        let envelope: ApiResponse<T> = response.json().await?;
        envelope.data.ok_or(ClientError::EmptyResponse)
    }

    async fn send_discard<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<()> {
        self.execute(method, path, body).await?;
        Ok(())
    }
}
