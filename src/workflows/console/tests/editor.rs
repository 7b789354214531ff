use super::common::*;
use crate::workflows::catalog::VehicleId;
use crate::workflows::console::{Route, ScreenState, VehicleEditorScreen};

#[tokio::test]
async fn enter_loads_vehicle_with_sorted_brands() {
    let harness = Harness::new();
    let mut screen = VehicleEditorScreen::new(harness.catalog(), harness.ports(), xc60());
    assert!(screen.state().is_loading());

    screen.enter(true).await;

    let context = match screen.state() {
        ScreenState::Ready(context) => context,
        other => panic!("expected ready state, got {other:?}"),
    };
    assert_eq!(context.vehicle.brand.name, "Volvo");
    let feature_names: Vec<&str> = context
        .vehicle
        .features
        .iter()
        .map(|feature| feature.name.as_str())
        .collect();
    assert_eq!(
        feature_names,
        vec!["Adaptive cruise control", "Panoramic roof", "Tow bar"]
    );
    let brand_names: Vec<&str> = context.brands.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(brand_names, vec!["Audi", "Skoda", "Volvo"]);
    assert!(harness.notifier.notices().is_empty());
    assert!(harness.navigator.routes().is_empty());
}

#[tokio::test]
async fn enter_without_session_redirects_to_login() {
    let harness = Harness::new();
    let mut screen = VehicleEditorScreen::new(harness.catalog(), harness.ports(), xc60());

    screen.enter(false).await;

    assert!(screen.state().is_loading());
    assert_eq!(harness.navigator.routes(), vec![Route::Login]);
    assert!(harness.notifier.notices().is_empty());
}

#[tokio::test]
async fn missing_vehicle_notifies_once_and_returns_to_dashboard() {
    let harness = Harness::new();
    let mut screen = VehicleEditorScreen::new(
        harness.catalog(),
        harness.ports(),
        VehicleId("car-missing".to_string()),
    );

    screen.enter(true).await;

    assert!(screen.state().error().is_some());
    assert_eq!(harness.errors(), vec!["Failed to load car details"]);
    assert_eq!(harness.navigator.routes(), vec![Route::Dashboard]);
}

#[tokio::test]
async fn brand_fault_aborts_the_whole_load() {
    let harness = Harness::new();
    harness.gateway.fail(Fault::Query("brands"));
    let mut screen = VehicleEditorScreen::new(harness.catalog(), harness.ports(), xc60());

    screen.enter(true).await;

    match screen.state() {
        ScreenState::Failed { retained, .. } => assert!(retained.is_none()),
        other => panic!("expected failed state, got {other:?}"),
    }
    assert_eq!(harness.errors().len(), 1);
    assert_eq!(harness.navigator.routes(), vec![Route::Dashboard]);
}

#[tokio::test]
async fn save_stores_changes_and_returns_to_dashboard() {
    let harness = Harness::new();
    let mut screen = VehicleEditorScreen::new(harness.catalog(), harness.ports(), xc60());
    screen.enter(true).await;

    assert!(screen.save(xc60_changes()).await);

    assert_eq!(harness.successes(), vec!["Car updated successfully"]);
    assert_eq!(harness.navigator.routes(), vec![Route::Dashboard]);
    let stored = harness
        .catalog()
        .load_vehicle_for_edit(&xc60())
        .await
        .expect("vehicle reloads");
    assert_eq!(stored.model, "XC60 Recharge");
    assert_eq!(stored.price, 36500);
    assert_eq!(stored.features.len(), 3, "features untouched by field edits");
}

#[tokio::test]
async fn invalid_changes_stay_on_screen() {
    let harness = Harness::new();
    let mut screen = VehicleEditorScreen::new(harness.catalog(), harness.ports(), xc60());
    screen.enter(true).await;

    let mut changes = xc60_changes();
    changes.make = String::new();
    assert!(!screen.save(changes).await);

    let errors = harness.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("make is required"));
    assert!(harness.navigator.routes().is_empty());
    assert!(matches!(screen.state(), ScreenState::Ready(_)));
}

#[tokio::test]
async fn results_arriving_after_abandonment_are_dropped() {
    let harness = Harness::new();
    let mut screen = VehicleEditorScreen::new(harness.catalog(), harness.ports(), xc60());
    harness
        .gateway
        .abandon_during_next_query(screen.lifetime());

    screen.enter(true).await;

    assert!(screen.state().is_loading());
    assert!(harness.notifier.notices().is_empty());
    assert!(harness.navigator.routes().is_empty());
}
