//! Route table and access guard.
//!
//! Views are addressed by path. Some routes require a logged-in identity,
//! `/admin/*` requires an administrator. [`authorize`] is the single place
//! that decision is made; protected commands run the same [`check`].

use shopfront_core::{Identity, ProductId};

/// Application routes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    Products,
    ProductDetail(ProductId),
    Login,
    Register,
    Cart,
    Wishlist,
    Orders,
    /// Admin dashboard; carries the sub-path after `/admin/` (may be empty).
    Admin(String),
    NotFound,
}

/// What a route demands of the current identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    Administrator,
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// Not logged in: send the user to this route (always [`Route::Login`]).
    Redirect(Route),
    /// Logged in without the required role.
    Forbidden,
}

impl Access {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl Route {
    /// Parse a URL path. Query strings, fragments and trailing slashes are ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        match (segments.next(), segments.next(), segments.next()) {
            (None, _, _) => Self::Home,
            (Some("products"), None, _) => Self::Products,
            (Some("products"), Some(id), None) => Self::ProductDetail(ProductId::new(id)),
            (Some("login"), None, _) => Self::Login,
            (Some("register"), None, _) => Self::Register,
            (Some("cart"), None, _) => Self::Cart,
            (Some("wishlist"), None, _) => Self::Wishlist,
            (Some("orders"), None, _) => Self::Orders,
            (Some("admin"), _, _) => {
                let rest = path
                    .trim_start_matches('/')
                    .strip_prefix("admin")
                    .unwrap_or_default()
                    .trim_start_matches('/');
                Self::Admin(rest.to_string())
            }
            _ => Self::NotFound,
        }
    }

    /// The canonical path for this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Products => "/products".to_string(),
            Self::ProductDetail(id) => format!("/products/{id}"),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Cart => "/cart".to_string(),
            Self::Wishlist => "/wishlist".to_string(),
            Self::Orders => "/orders".to_string(),
            Self::Admin(rest) if rest.is_empty() => "/admin".to_string(),
            Self::Admin(rest) => format!("/admin/{rest}"),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// The guard this route sits behind, if any.
    #[must_use]
    pub const fn requirement(&self) -> Option<Requirement> {
        match self {
            Self::Cart | Self::Wishlist | Self::Orders => Some(Requirement::Authenticated),
            Self::Admin(_) => Some(Requirement::Administrator),
            Self::Home
            | Self::Products
            | Self::ProductDetail(_)
            | Self::Login
            | Self::Register
            | Self::NotFound => None,
        }
    }
}

/// Check an identity against a requirement.
#[must_use]
pub fn check(identity: Option<&Identity>, requirement: Requirement) -> Access {
    match (identity, requirement) {
        (None, _) => Access::Redirect(Route::Login),
        (Some(identity), Requirement::Administrator) if !identity.is_admin() => Access::Forbidden,
        (Some(_), _) => Access::Allow,
    }
}

/// Decide whether `identity` may open `route`.
#[must_use]
pub fn authorize(route: &Route, identity: Option<&Identity>) -> Access {
    route
        .requirement()
        .map_or(Access::Allow, |requirement| check(identity, requirement))
}
