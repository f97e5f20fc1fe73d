//! Root context.
//!
//! [`Storefront`] is created once by the application and handed to every
//! view. It owns the API client, the session and both collections, and is
//! the only place identity changes are pushed to the collections.

use secrecy::SecretString;
use shopfront_core::{Identity, NewOrder, Order, OrderId, OrderLine};
use tracing::{info, instrument};

use crate::api::ApiClient;
use crate::collection::{CartState, WishlistState};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::notice::Notices;
use crate::routes::{self, Access, Requirement, Route};
use crate::session::Session;

const LOGIN_TO_ORDER: &str = "Please login to place an order";
const LOGIN_TO_MANAGE_ORDERS: &str = "Please login to manage your orders";
const ADDRESS_REQUIRED: &str = "Shipping address is required";
const CART_EMPTY: &str = "Your cart is empty";
const ORDER_PLACED: &str = "Order placed successfully!";
const ORDER_FAILED: &str = "Failed to place order";
const ORDER_CANCELLED: &str = "Order cancelled successfully!";
const CANCEL_FAILED: &str = "Failed to cancel order";

/// Application root: session, collections and notices.
#[derive(Clone)]
pub struct Storefront {
    api: ApiClient,
    session: Session,
    cart: CartState,
    wishlist: WishlistState,
    notices: Notices,
}

impl Storefront {
    /// Build the context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::with_client(ApiClient::new(config)?))
    }

    #[must_use]
    pub fn with_client(api: ApiClient) -> Self {
        let notices = Notices::new();
        Self {
            session: Session::new(api.clone(), notices.clone()),
            cart: CartState::new(api.clone(), notices.clone()),
            wishlist: WishlistState::new(api.clone(), notices.clone()),
            api,
            notices,
        }
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn cart(&self) -> &CartState {
        &self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &WishlistState {
        &self.wishlist
    }

    #[must_use]
    pub const fn notices(&self) -> &Notices {
        &self.notices
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.session.identity()
    }

    // =========================================================================
    // Session transitions
    // =========================================================================

    pub async fn login(&self, email: &str, password: &SecretString) -> bool {
        let ok = self.session.login(email, password).await;
        self.sync_identity().await;
        ok
    }

    pub async fn register(
        &self,
        email: &str,
        username: &str,
        full_name: &str,
        password: &SecretString,
    ) -> bool {
        self.session
            .register(email, username, full_name, password)
            .await
    }

    pub async fn restore(&self, token: SecretString) -> bool {
        let ok = self.session.restore(token).await;
        self.sync_identity().await;
        ok
    }

    pub async fn refresh(&self) -> bool {
        let ok = self.session.refresh().await;
        self.sync_identity().await;
        ok
    }

    pub async fn logout(&self) {
        self.session.logout().await;
        self.sync_identity().await;
    }

    async fn sync_identity(&self) {
        let identity = self.session.identity();
        tokio::join!(
            self.cart.on_identity_change(identity.as_ref()),
            self.wishlist.on_identity_change(identity.as_ref()),
        );
    }

    // =========================================================================
    // Guard
    // =========================================================================

    /// Decide whether the current identity may open `route`.
    #[must_use]
    pub fn authorize(&self, route: &Route) -> Access {
        routes::authorize(route, self.session.identity().as_ref())
    }

    fn guard(&self, message: &str) -> bool {
        let allowed = routes::check(self.session.identity().as_ref(), Requirement::Authenticated)
            .is_allowed();
        if !allowed {
            self.notices.error(message);
        }
        allowed
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order for everything in the cart.
    ///
    /// The server empties the cart, so the cart is re-read afterwards.
    #[instrument(skip_all)]
    pub async fn checkout(&self, shipping_address: &str) -> Option<Order> {
        if !self.guard(LOGIN_TO_ORDER) {
            return None;
        }
        let shipping_address = shipping_address.trim();
        if shipping_address.is_empty() {
            self.notices.error(ADDRESS_REQUIRED);
            return None;
        }
        let lines = self.cart.items();
        if lines.is_empty() {
            self.notices.error(CART_EMPTY);
            return None;
        }

        let order = NewOrder {
            items: lines
                .iter()
                .map(|line| OrderLine {
                    product_id: line.product_id.clone(),
                    quantity: line.quantity,
                })
                .collect(),
            shipping_address: shipping_address.to_string(),
            total_amount: self.cart.total().amount(),
        };

        match self.api.create_order(&order).await {
            Ok(order) => {
                info!(order_id = %order.id, total = %order.total_amount, "Order placed");
                self.cart.fetch().await;
                self.notices.success(ORDER_PLACED);
                Some(order)
            }
            Err(err) => {
                self.notices.error(err.user_message(ORDER_FAILED));
                None
            }
        }
    }

    /// Cancel a pending order.
    #[instrument(skip_all, fields(order_id = %id))]
    pub async fn cancel_order(&self, id: &OrderId) -> bool {
        if !self.guard(LOGIN_TO_MANAGE_ORDERS) {
            return false;
        }
        match self.api.cancel_order(id).await {
            Ok(_) => {
                self.notices.success(ORDER_CANCELLED);
                true
            }
            Err(err) => {
                self.notices.error(err.user_message(CANCEL_FAILED));
                false
            }
        }
    }
}
