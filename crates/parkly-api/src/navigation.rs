// Navigation boundary between the authenticated console and the login flow.

use tokio::sync::watch;
use tracing::debug;

/// Top-level destinations the gateway and login flow can send the operator to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Route {
    Login,
    Dashboard,
}

/// Broadcasts the current [`Route`] to whoever renders the console.
#[derive(Debug)]
pub struct Navigator {
    route: watch::Sender<Route>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (route, _) = watch::channel(initial);
        Self { route }
    }

    pub fn redirect(&self, to: Route) {
        let from = self.route.send_replace(to);
        debug!(%from, %to, "navigate");
    }

    pub fn current(&self) -> Route {
        *self.route.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.route.subscribe()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Dashboard)
    }
}
