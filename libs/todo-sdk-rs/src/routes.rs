//! Client routes and the access rules between them.

use std::fmt;

use crate::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    SignIn,
    SignUp,
    Tasks,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::SignIn => "/signin",
            Route::SignUp => "/signup",
            Route::Tasks => "/tasks",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" | "" => Some(Route::Home),
            "/signin" => Some(Route::SignIn),
            "/signup" => Some(Route::SignUp),
            "/tasks" => Some(Route::Tasks),
            _ => None,
        }
    }

    /// Sign-in and sign-up pages never redirect away on a 401.
    pub fn is_auth_page(self) -> bool {
        matches!(self, Route::SignIn | Route::SignUp)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    /// Session not resolved yet.
    Wait,
    Redirect(Route),
}

pub fn guard(route: Route, state: &SessionState) -> RouteDecision {
    let authenticated = match state {
        SessionState::Uninitialized | SessionState::Loading => return RouteDecision::Wait,
        SessionState::Authenticated(_) => true,
        SessionState::Unauthenticated => false,
    };

    match route {
        Route::Home if authenticated => RouteDecision::Redirect(Route::Tasks),
        Route::Home => RouteDecision::Redirect(Route::SignIn),
        Route::Tasks if !authenticated => RouteDecision::Redirect(Route::SignIn),
        Route::Tasks | Route::SignIn | Route::SignUp => RouteDecision::Allow,
    }
}
