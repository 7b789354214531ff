use async_trait::async_trait;
use serde_json::Value;
use showroom_admin::store::seed::{load_table, SeedTable};
use showroom_admin::store::tables::{CARS, PRIVATE_LISTINGS, PROCESS_PRIVATE_LISTING};
use showroom_admin::store::{DataStoreGateway, InMemoryStore, QuerySpec, Row, StoreError};
use showroom_admin::workflows::moderation::{
    ListingId, ListingStatus, ModerationDecision, ModerationWorkflow, PrivateListing,
};
use showroom_admin::workflows::WorkflowError;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

const BRANDS_CSV: &str = "\
id,name,logo_url
brand-volvo,Volvo,
brand-kia,Kia,
";

// L1 pending t=3, L2 approved t=1, L3 pending t=2, inserted out of display order.
const LISTINGS_CSV: &str = "\
id,brand_id,make,model,year,price,mileage,description,seller_name,seller_email,seller_phone,status,created_at
L2,brand-volvo,Volvo,V90,2019,27500,76000,,Ada Holm,ada@example.com,,approved,2025-10-01T09:00:00Z
L3,brand-kia,Kia,Ceed,2020,14900,51000,Towbar fitted,Bo Lund,bo@example.com,,pending,2025-10-02T09:00:00Z
L1,brand-volvo,Volvo,XC40,2022,33000,18000,,Cy Nyberg,cy@example.com,+4670555,pending,2025-10-03T09:00:00Z
";

fn scenario_store() -> InMemoryStore {
    let store = InMemoryStore::admin_schema();
    load_table(&store, SeedTable::Brands, Cursor::new(BRANDS_CSV)).expect("brands load");
    load_table(&store, SeedTable::PrivateListings, Cursor::new(LISTINGS_CSV))
        .expect("listings load");
    store
}

fn ids(listings: &[PrivateListing]) -> Vec<&str> {
    listings.iter().map(|listing| listing.id.0.as_str()).collect()
}

fn status_of(listings: &[PrivateListing], id: &str) -> ListingStatus {
    listings
        .iter()
        .find(|listing| listing.id.0 == id)
        .map(|listing| listing.status)
        .expect("listing present")
}

/// Records the order of gateway calls on top of a real store.
struct Journal {
    inner: InMemoryStore,
    calls: Mutex<Vec<String>>,
}

impl Journal {
    fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("journal mutex").clone()
    }

    fn record(&self, entry: String) {
        self.calls.lock().expect("journal mutex").push(entry);
    }
}

#[async_trait]
impl DataStoreGateway for Journal {
    async fn query(&self, spec: &QuerySpec) -> Result<Vec<Row>, StoreError> {
        self.record(format!("query:{}", spec.table));
        self.inner.query(spec).await
    }

    async fn update(&self, table: &str, id: &str, fields: Row) -> Result<(), StoreError> {
        self.record(format!("update:{table}:{id}"));
        self.inner.update(table, id, fields).await
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        self.record(format!("delete:{table}:{id}"));
        self.inner.delete(table, id).await
    }

    async fn call_procedure(&self, name: &str, args: Row) -> Result<(), StoreError> {
        let listing = args.get("p_listing_id").and_then(Value::as_str).unwrap_or("");
        let status = args.get("p_status").and_then(Value::as_str).unwrap_or("");
        self.record(format!("call:{name}:{listing}:{status}"));
        self.inner.call_procedure(name, args).await
    }
}

#[tokio::test]
async fn queue_is_newest_first_and_stable() {
    let workflow = ModerationWorkflow::new(Arc::new(scenario_store()));

    let first = workflow.list_queue().await.expect("queue loads");
    let second = workflow.list_queue().await.expect("queue loads");

    assert_eq!(ids(&first), vec!["L1", "L3", "L2"]);
    assert_eq!(first, second);
    assert_eq!(
        first[1].brand.as_ref().map(|brand| brand.name.as_str()),
        Some("Kia")
    );
}

#[tokio::test]
async fn rejecting_the_newest_listing_keeps_the_order() {
    let workflow = ModerationWorkflow::new(Arc::new(scenario_store()));

    let receipt = workflow
        .transition(&ListingId("L1".to_string()), ModerationDecision::Rejected)
        .await
        .expect("transition applies");
    let queue = receipt.queue.expect("queue reloads");

    assert_eq!(ids(&queue), vec!["L1", "L3", "L2"]);
    assert_eq!(status_of(&queue, "L1"), ListingStatus::Rejected);
    assert_eq!(status_of(&queue, "L3"), ListingStatus::Pending);
}

#[tokio::test]
async fn approved_listing_never_shows_pending_and_joins_the_catalog() {
    let store = scenario_store();
    let workflow = ModerationWorkflow::new(Arc::new(store.clone()));

    workflow
        .transition(&ListingId("L3".to_string()), ModerationDecision::Approved)
        .await
        .expect("transition applies");
    let queue = workflow.list_queue().await.expect("queue loads");

    assert_eq!(status_of(&queue, "L3"), ListingStatus::Approved);
    let cars = store
        .query(&QuerySpec::from(CARS).eq("model", "Ceed"))
        .await
        .expect("cars query");
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0].get("is_sold"), Some(&Value::Bool(false)));
    assert_eq!(cars[0].get("brand_id"), Some(&Value::from("brand-kia")));
}

#[tokio::test]
async fn procedure_runs_once_before_the_reload() {
    let journal = Arc::new(Journal::new(scenario_store()));
    let workflow = ModerationWorkflow::new(journal.clone());

    workflow
        .transition(&ListingId("L1".to_string()), ModerationDecision::Approved)
        .await
        .expect("transition applies");

    assert_eq!(
        journal.calls(),
        vec![
            format!("call:{PROCESS_PRIVATE_LISTING}:L1:approved"),
            format!("query:{PRIVATE_LISTINGS}"),
        ]
    );
}

#[tokio::test]
async fn terminal_listing_is_rejected_by_the_store_without_reload() {
    let journal = Arc::new(Journal::new(scenario_store()));
    let workflow = ModerationWorkflow::new(journal.clone());
    let before = workflow.list_queue().await.expect("queue loads");

    let err = workflow
        .transition(&ListingId("L2".to_string()), ModerationDecision::Rejected)
        .await
        .expect_err("L2 is already approved");

    assert!(
        matches!(err, WorkflowError::Store(StoreError::Rejected { .. })),
        "got {err:?}"
    );
    let calls = journal.calls();
    assert_eq!(calls.len(), 2, "one load, one procedure call, no reload");
    assert!(calls[1].starts_with("call:"));

    let after = workflow.list_queue().await.expect("queue loads");
    assert_eq!(before, after);
}

#[tokio::test]
async fn unknown_listing_fails_in_the_procedure() {
    let workflow = ModerationWorkflow::new(Arc::new(scenario_store()));

    let err = workflow
        .transition(&ListingId("L404".to_string()), ModerationDecision::Approved)
        .await
        .expect_err("no such listing");

    assert!(matches!(
        err,
        WorkflowError::Store(StoreError::Rejected { .. })
    ));
}

#[tokio::test]
async fn empty_queue_is_valid() {
    let workflow = ModerationWorkflow::new(Arc::new(InMemoryStore::admin_schema()));
    assert!(workflow.list_queue().await.expect("loads").is_empty());
}

#[tokio::test]
async fn undecodable_listing_fails_the_whole_queue() {
    let store = scenario_store();
    let row = serde_json::json!({
        "id": "L9",
        "make": "Saab",
        "model": "9-3",
        "status": "archived",
        "created_at": "2025-10-04T09:00:00Z",
    });
    let Value::Object(row) = row else {
        panic!("listing literal is an object");
    };
    store.insert(PRIVATE_LISTINGS, row).expect("listing inserted");
    let workflow = ModerationWorkflow::new(Arc::new(store));

    let err = workflow.list_queue().await.expect_err("status is unknown");

    assert!(
        matches!(
            err,
            WorkflowError::Store(StoreError::Malformed { ref table, .. }) if table == PRIVATE_LISTINGS
        ),
        "got {err:?}"
    );
}
