//! Splash → landing/main routing

use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::session::{self, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Splash,
    Landing,
    Main,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Route::Splash => "splash",
            Route::Landing => "landing",
            Route::Main => "main",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteEvent {
    SplashFinished { session_present: bool },
    Authenticated,
    LoggedOut,
}

/// Route chosen once the splash screen is done
pub fn initial_route<S: KeyValueStore + ?Sized>(store: &S) -> Route {
    if session::has_session(store) {
        Route::Main
    } else {
        Route::Landing
    }
}

#[derive(Debug)]
pub struct RouteController {
    route: Route,
    splash_duration: Duration,
}

impl RouteController {
    pub fn new(splash_duration: Duration) -> Self {
        Self {
            route: Route::Splash,
            splash_duration,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Apply an event. Events that don't apply to the current route are
    /// ignored.
    pub fn handle(&mut self, event: RouteEvent) -> Route {
        let next = match (self.route, event) {
            (Route::Splash, RouteEvent::SplashFinished { session_present: true }) => Route::Main,
            (Route::Splash, RouteEvent::SplashFinished { session_present: false }) => Route::Landing,
            (Route::Landing, RouteEvent::Authenticated) => Route::Main,
            (Route::Main, RouteEvent::LoggedOut) => Route::Landing,
            (current, event) => {
                warn!(route = %current, ?event, "ignoring event for current route");
                current
            }
        };

        if next != self.route {
            info!(from = %self.route, to = %next, "route changed");
            self.route = next;
        }
        next
    }

    /// Hold the splash for its display duration, then route on session
    /// presence.
    pub async fn finish_splash<S: KeyValueStore + ?Sized>(&mut self, store: &S) -> Route {
        if self.route != Route::Splash {
            debug!(route = %self.route, "splash already finished");
            return self.route;
        }
        sleep(self.splash_duration).await;
        let session_present = session::has_session(store);
        self.handle(RouteEvent::SplashFinished { session_present })
    }

    /// Store the session produced by a successful sign-in and move to main
    pub fn authenticated<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        wallet_address: &str,
        access_token: &str,
    ) -> Result<Route> {
        if self.route != Route::Landing {
            return Ok(self.handle(RouteEvent::Authenticated));
        }
        session::sign_in(store, wallet_address, access_token)?;
        Ok(self.handle(RouteEvent::Authenticated))
    }

    pub fn logged_out<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<Route> {
        if self.route != Route::Main {
            return Ok(self.handle(RouteEvent::LoggedOut));
        }
        session::sign_out(store)?;
        Ok(self.handle(RouteEvent::LoggedOut))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryStore, ACCESS_TOKEN_KEY, WALLET_ADDRESS_KEY};

    fn controller() -> RouteController {
        RouteController::new(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_no_session_routes_to_landing() {
        let store = MemoryStore::new();
        let mut controller = controller();
        assert_eq!(controller.route(), Route::Splash);
        assert_eq!(controller.finish_splash(&store).await, Route::Landing);
    }

    #[tokio::test]
    async fn test_full_session_routes_to_main() {
        let mut store = MemoryStore::new();
        store.set(WALLET_ADDRESS_KEY, "0xabc").unwrap();
        store.set(ACCESS_TOKEN_KEY, "token").unwrap();

        let mut controller = controller();
        assert_eq!(controller.finish_splash(&store).await, Route::Main);
    }

    #[tokio::test]
    async fn test_partial_session_routes_to_landing() {
        let mut wallet_only = MemoryStore::new();
        wallet_only.set(WALLET_ADDRESS_KEY, "0xabc").unwrap();
        assert_eq!(controller().finish_splash(&wallet_only).await, Route::Landing);

        let mut token_only = MemoryStore::new();
        token_only.set(ACCESS_TOKEN_KEY, "token").unwrap();
        assert_eq!(controller().finish_splash(&token_only).await, Route::Landing);
    }

    #[tokio::test]
    async fn test_login_logout_cycle() -> Result<()> {
        let mut store = MemoryStore::new();
        let mut controller = controller();
        controller.finish_splash(&store).await;

        assert_eq!(controller.authenticated(&mut store, "0xabc", "token")?, Route::Main);
        assert_eq!(initial_route(&store), Route::Main);

        assert_eq!(controller.logged_out(&mut store)?, Route::Landing);
        assert_eq!(initial_route(&store), Route::Landing);

        assert_eq!(controller.authenticated(&mut store, "0xdef", "token2")?, Route::Main);
        Ok(())
    }

    #[test]
    fn test_inapplicable_events_are_ignored() {
        let mut controller = controller();
        assert_eq!(controller.handle(RouteEvent::LoggedOut), Route::Splash);
        assert_eq!(controller.handle(RouteEvent::Authenticated), Route::Splash);

        controller.handle(RouteEvent::SplashFinished { session_present: false });
        assert_eq!(controller.handle(RouteEvent::LoggedOut), Route::Landing);
        assert_eq!(
            controller.handle(RouteEvent::SplashFinished { session_present: true }),
            Route::Landing
        );
    }

    #[test]
    fn test_authenticated_outside_landing_leaves_store_alone() -> Result<()> {
        let mut store = MemoryStore::new();
        let mut controller = controller();

        assert_eq!(controller.authenticated(&mut store, "0xabc", "token")?, Route::Splash);
        assert!(!session::has_session(&store));
        Ok(())
    }
}
