use crate::error::AppError;
use crate::infra::{console_ports, open_store, LocalSession, TrailNavigator};
use crate::workflows::catalog::{CatalogRepository, Vehicle, VehicleChanges};
use crate::workflows::console::{DashboardScreen, ModerationQueueScreen, Route, VehicleEditorScreen};
use crate::workflows::moderation::{
    ListingId, ModerationDecision, ModerationWorkflow, PrivateListing,
};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Directory of seed CSV files. Defaults to the bundled sample showroom.
    #[arg(long)]
    pub(crate) seed_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct QueueArgs {
    /// Directory of seed CSV files. Defaults to the bundled sample showroom.
    #[arg(long)]
    pub(crate) seed_dir: Option<PathBuf>,
    /// Listing to decide on before printing the queue
    #[arg(long, requires = "decision")]
    pub(crate) listing: Option<String>,
    /// Decision for --listing: approve or reject
    #[arg(long, requires = "listing")]
    pub(crate) decision: Option<ModerationDecision>,
}

pub(crate) async fn run_queue(args: QueueArgs) -> Result<(), AppError> {
    let QueueArgs {
        seed_dir,
        listing,
        decision,
    } = args;

    let store = open_store(seed_dir.as_deref())?;
    let workflow = ModerationWorkflow::new(store);

    let listings = match (listing, decision) {
        (Some(listing), Some(decision)) => {
            let listing_id = ListingId(listing);
            let receipt = workflow.transition(&listing_id, decision).await?;
            println!("Listing {} {}", receipt.listing_id, receipt.decision.label());
            receipt.queue?
        }
        _ => workflow.list_queue().await?,
    };

    println!("Moderation queue ({} listings)", listings.len());
    render_listings(&listings);
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = open_store(args.seed_dir.as_deref())?;
    let navigator = Arc::new(TrailNavigator::default());
    let ports = console_ports(navigator.clone());
    let catalog = CatalogRepository::new(store.clone());

    println!("Showroom admin demo");

    println!("\nDashboard");
    let mut dashboard =
        DashboardScreen::new(catalog.clone(), ports.clone(), Arc::new(LocalSession));
    dashboard.enter(true).await;
    render_vehicles(dashboard.vehicles());

    let unsold = dashboard
        .vehicles()
        .iter()
        .find(|vehicle| !vehicle.is_sold)
        .map(|vehicle| vehicle.id.clone());
    if let Some(vehicle_id) = unsold {
        println!("Marking {vehicle_id} as sold");
        dashboard.set_sold(&vehicle_id, true).await;
    }

    println!("\nVehicle editor");
    let newest = dashboard.vehicles().first().map(|vehicle| vehicle.id.clone());
    if let Some(vehicle_id) = newest {
        let mut editor = VehicleEditorScreen::new(catalog, ports.clone(), vehicle_id);
        editor.enter(true).await;
        if let Some(context) = editor.state().data() {
            println!(
                "  editing {} ({} brands to choose from)",
                context.vehicle.title(),
                context.brands.len()
            );
            let mut changes = VehicleChanges::from_vehicle(&context.vehicle);
            changes.price = changes.price.saturating_sub(500);
            println!("  reducing price to {}", changes.price);
            editor.save(changes).await;
        }
    }

    println!("\nPrivate listings");
    let mut queue = ModerationQueueScreen::new(ModerationWorkflow::new(store), ports);
    queue.enter(true).await;
    render_listings(queue.listings());

    let pending: Vec<ListingId> = queue
        .listings()
        .iter()
        .filter(|listing| !listing.status.is_terminal())
        .map(|listing| listing.id.clone())
        .collect();
    let decisions = [ModerationDecision::Approved, ModerationDecision::Rejected];
    for (listing_id, decision) in pending.iter().zip(decisions) {
        println!("Deciding {listing_id}: {decision}");
        queue.decide(listing_id, decision).await;
    }
    render_listings(queue.listings());

    println!("\nDashboard after moderation");
    dashboard.reload().await;
    render_vehicles(dashboard.vehicles());

    dashboard.logout().await;
    if navigator.last() == Some(Route::Login) {
        println!("Session closed");
    }

    Ok(())
}

fn render_vehicles(vehicles: &[Vehicle]) {
    if vehicles.is_empty() {
        println!("  (no vehicles)");
        return;
    }
    for vehicle in vehicles {
        println!(
            "  - {} [{}] | {} | {} km | {} | {} features",
            vehicle.title(),
            vehicle.brand.name,
            vehicle.price,
            vehicle.mileage,
            vehicle.sale_label(),
            vehicle.features.len()
        );
    }
}

fn render_listings(listings: &[PrivateListing]) {
    if listings.is_empty() {
        println!("  (queue empty)");
        return;
    }
    for listing in listings {
        let brand = listing
            .brand
            .as_ref()
            .map(|brand| brand.name.as_str())
            .unwrap_or("unknown brand");
        println!(
            "  - {} {} [{}] | {} | seller {} | submitted {}",
            listing.id,
            listing.title(),
            brand,
            listing.status.label(),
            listing.seller_name,
            listing.created_at.format("%Y-%m-%d")
        );
    }
}
