use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::error::AppError;
use crate::store::seed::{load_seed_dir, sample_store};
use crate::store::InMemoryStore;
use crate::workflows::console::{
    ConsolePorts, Navigator, NoticeKind, Notifier, Route, SessionControl, SessionError,
};

/// Seeded store from `seed_dir`, or the bundled sample showroom when none is given.
pub(crate) fn open_store(seed_dir: Option<&Path>) -> Result<Arc<InMemoryStore>, AppError> {
    let store = match seed_dir {
        Some(dir) => {
            let store = InMemoryStore::admin_schema();
            let summary = load_seed_dir(&store, dir)?;
            info!(
                brands = summary.brands,
                cars = summary.cars,
                listings = summary.listings,
                "store seeded from directory"
            );
            store
        }
        None => sample_store()?,
    };
    Ok(Arc::new(store))
}

/// Prints notices the way the browser console would toast them.
#[derive(Debug, Default)]
pub(crate) struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => println!("  [ok] {message}"),
            NoticeKind::Error => println!("  [error] {message}"),
        }
    }
}

/// Remembers the last route so the demo can follow redirects.
#[derive(Debug, Default)]
pub(crate) struct TrailNavigator {
    trail: Mutex<Vec<Route>>,
}

impl TrailNavigator {
    pub(crate) fn last(&self) -> Option<Route> {
        self.trail
            .lock()
            .ok()
            .and_then(|trail| trail.last().cloned())
    }
}

impl Navigator for TrailNavigator {
    fn navigate_to(&self, route: Route) {
        println!("  -> {}", route.path());
        if let Ok(mut trail) = self.trail.lock() {
            trail.push(route);
        }
    }
}

/// Sessions are held by the browser; signing out locally always succeeds.
#[derive(Debug, Default)]
pub(crate) struct LocalSession;

#[async_trait]
impl SessionControl for LocalSession {
    async fn sign_out(&self) -> Result<(), SessionError> {
        info!("operator signed out");
        Ok(())
    }
}

pub(crate) fn console_ports(navigator: Arc<TrailNavigator>) -> ConsolePorts {
    ConsolePorts::new(Arc::new(StdoutNotifier), navigator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tables::{BRANDS, CARS};
    use crate::store::{DataStoreGateway, QuerySpec};

    #[tokio::test]
    async fn open_store_defaults_to_sample_showroom() {
        let store = open_store(None).expect("sample store");
        let brands = store.query(&QuerySpec::from(BRANDS)).await.expect("brands");
        let cars = store.query(&QuerySpec::from(CARS)).await.expect("cars");
        assert_eq!(brands.len(), 3);
        assert_eq!(cars.len(), 3);
    }

    #[tokio::test]
    async fn open_store_with_empty_dir_has_no_rows() {
        let dir = std::env::temp_dir().join(format!("showroom-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");

        let store = open_store(Some(&dir)).expect("empty dir seeds nothing");
        let cars = store.query(&QuerySpec::from(CARS)).await.expect("cars");
        assert!(cars.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn trail_navigator_tracks_last_route() {
        let navigator = TrailNavigator::default();
        assert!(navigator.last().is_none());
        navigator.navigate_to(Route::Dashboard);
        navigator.navigate_to(Route::Login);
        assert_eq!(navigator.last(), Some(Route::Login));
    }
}
