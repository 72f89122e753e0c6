use std::fmt;

use log::debug;

use crate::errors::RegistryError;
use crate::implementations::session_store::SessionStore;

/// Views of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    ForgotPassword,
    Dashboard,
    Properties,
    PropertyDetail(String),
    Search,
    RegisterProperty,
    Transfer(String),
    Verification(String),
    Profile,
    Settings,
}

impl Route {
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::Register | Route::ForgotPassword)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Properties => "/properties".to_string(),
            Route::PropertyDetail(id) => format!("/properties/{}", id),
            Route::Search => "/search".to_string(),
            Route::RegisterProperty => "/properties/register".to_string(),
            Route::Transfer(id) => format!("/properties/{}/transfer", id),
            Route::Verification(id) => format!("/verification/{}", id),
            Route::Profile => "/profile".to_string(),
            Route::Settings => "/settings".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect {
        to: Route,
        from: Route,
    },
}

/// Gates protected views on session presence. Never contacts the server:
/// an expired token is only discovered by the next failing call.
#[derive(Clone)]
pub struct RouteGuard {
    session: SessionStore,
}

impl RouteGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    pub fn resolve(&self, route: Route) -> Navigation {
        if route.is_protected() && !self.session.is_authenticated() {
            debug!("No session, redirecting {} to login", route);
            return Navigation::Redirect { to: Route::Login, from: route };
        }
        Navigation::Render(route)
    }

    /// Where to go after a call on `route` failed. Only a rejected session
    /// changes the view.
    pub fn after_failure(&self, route: Route, err: &RegistryError) -> Option<Navigation> {
        if err.is_unauthorized() {
            return Some(Navigation::Redirect { to: Route::Login, from: route });
        }
        None
    }
}
