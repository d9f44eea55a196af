//! Terminal renditions of the session's navigation and notification hooks.
//!
//! A CLI has no pages to move between, so a navigation request becomes a hint
//! naming the command that leads there.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use todo_sdk::{Navigator, Notifier, Route};

pub fn hint_for(route: Route) -> &'static str {
    match route {
        Route::SignIn => "You are signed out. Run `todo signin` to continue.",
        Route::SignUp => "Run `todo signup` to create an account.",
        Route::Tasks => "Run `todo list` to see your tasks.",
        Route::Home => "Run `todo --help` to see what you can do.",
    }
}

/// Tracks the route of the running command and prints hints on redirects.
pub struct ConsoleNavigator {
    current: Mutex<Route>,
}

impl ConsoleNavigator {
    pub fn new(route: Route) -> Self {
        Self {
            current: Mutex::new(route),
        }
    }

    pub fn current(&self) -> Route {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for ConsoleNavigator {
    fn current_path(&self) -> String {
        self.current().path().to_string()
    }

    fn navigate(&self, route: Route) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = route;
        eprintln!("{}", hint_for(route));
    }
}

/// Prints warnings to stderr. The display duration has no meaning here.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn warning(&self, message: &str, _display_for: Duration) {
        eprintln!("warning: {message}");
    }
}
