use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::store::seed::sample_store;
use crate::store::{DataStoreGateway, InMemoryStore, QuerySpec, Row, StoreError};
use crate::workflows::catalog::{BrandId, CatalogRepository, VehicleChanges, VehicleId};
use crate::workflows::console::{
    ConsolePorts, Navigator, NoticeKind, Notifier, Route, ScreenLifetime, SessionControl,
    SessionError,
};
use crate::workflows::moderation::ModerationWorkflow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Fault {
    Query(&'static str),
    Update,
    Delete,
    Procedure,
}

/// Sample store wrapped with injectable faults and an optional abandon hook.
#[derive(Default)]
pub(super) struct ScriptedGateway {
    pub(super) inner: InMemoryStore,
    faults: Mutex<Vec<Fault>>,
    abandon_on_query: Mutex<Option<ScreenLifetime>>,
}

impl ScriptedGateway {
    pub(super) fn sample() -> Arc<Self> {
        Arc::new(Self {
            inner: sample_store().expect("sample store loads"),
            ..Self::default()
        })
    }

    pub(super) fn fail(&self, fault: Fault) {
        self.faults.lock().expect("fault mutex").push(fault);
    }

    pub(super) fn clear_faults(&self) {
        self.faults.lock().expect("fault mutex").clear();
    }

    pub(super) fn abandon_during_next_query(&self, lifetime: ScreenLifetime) {
        *self.abandon_on_query.lock().expect("hook mutex") = Some(lifetime);
    }

    fn check(&self, matches: impl Fn(&Fault) -> bool) -> Result<(), StoreError> {
        let faults = self.faults.lock().expect("fault mutex");
        match faults.iter().find(|fault| matches(fault)) {
            Some(fault) => Err(StoreError::Unavailable(format!("injected {fault:?}"))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DataStoreGateway for ScriptedGateway {
    async fn query(&self, spec: &QuerySpec) -> Result<Vec<Row>, StoreError> {
        let hook = self.abandon_on_query.lock().expect("hook mutex").take();
        if let Some(lifetime) = hook {
            lifetime.abandon();
        }
        self.check(|fault| matches!(fault, Fault::Query(table) if *table == spec.table))?;
        self.inner.query(spec).await
    }

    async fn update(&self, table: &str, id: &str, fields: Row) -> Result<(), StoreError> {
        self.check(|fault| *fault == Fault::Update)?;
        self.inner.update(table, id, fields).await
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        self.check(|fault| *fault == Fault::Delete)?;
        self.inner.delete(table, id).await
    }

    async fn call_procedure(&self, name: &str, args: Row) -> Result<(), StoreError> {
        self.check(|fault| *fault == Fault::Procedure)?;
        self.inner.call_procedure(name, args).await
    }
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeKind, String)>>,
}

impl RecordingNotifier {
    pub(super) fn notices(&self) -> Vec<(NoticeKind, String)> {
        self.notices.lock().expect("notice mutex").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        self.notices
            .lock()
            .expect("notice mutex")
            .push((kind, message.to_string()));
    }
}

#[derive(Default)]
pub(super) struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub(super) fn routes(&self) -> Vec<Route> {
        self.routes.lock().expect("route mutex").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, route: Route) {
        self.routes.lock().expect("route mutex").push(route);
    }
}

pub(super) struct StaticSession {
    pub(super) fail: bool,
}

#[async_trait]
impl SessionControl for StaticSession {
    async fn sign_out(&self) -> Result<(), SessionError> {
        if self.fail {
            Err(SessionError::SignOut("auth service offline".to_string()))
        } else {
            Ok(())
        }
    }
}

pub(super) struct Harness {
    pub(super) gateway: Arc<ScriptedGateway>,
    pub(super) notifier: Arc<RecordingNotifier>,
    pub(super) navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub(super) fn new() -> Self {
        Self {
            gateway: ScriptedGateway::sample(),
            notifier: Arc::new(RecordingNotifier::default()),
            navigator: Arc::new(RecordingNavigator::default()),
        }
    }

    pub(super) fn ports(&self) -> ConsolePorts {
        ConsolePorts::new(self.notifier.clone(), self.navigator.clone())
    }

    pub(super) fn catalog(&self) -> CatalogRepository<ScriptedGateway> {
        CatalogRepository::new(self.gateway.clone())
    }

    pub(super) fn moderation(&self) -> ModerationWorkflow<ScriptedGateway> {
        ModerationWorkflow::new(self.gateway.clone())
    }

    pub(super) fn errors(&self) -> Vec<String> {
        self.notices_of(NoticeKind::Error)
    }

    pub(super) fn successes(&self) -> Vec<String> {
        self.notices_of(NoticeKind::Success)
    }

    fn notices_of(&self, wanted: NoticeKind) -> Vec<String> {
        self.notifier
            .notices()
            .into_iter()
            .filter(|(kind, _)| *kind == wanted)
            .map(|(_, message)| message)
            .collect()
    }
}

pub(super) fn xc60() -> VehicleId {
    VehicleId("car-xc60".to_string())
}

pub(super) fn xc60_changes() -> VehicleChanges {
    VehicleChanges {
        brand_id: BrandId("brand-volvo".to_string()),
        make: "Volvo".to_string(),
        model: "XC60 Recharge".to_string(),
        year: 2021,
        price: 36500,
        mileage: 42500,
        fuel_type: Some("hybrid".to_string()),
        transmission: Some("automatic".to_string()),
        description: Some("Price reduced".to_string()),
        image_url: None,
    }
}
