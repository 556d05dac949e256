mod actors;
mod app_system;
mod clients;
mod config;
mod domain;
mod error;
mod guard;
mod latency;
mod messages;
mod registry;
mod session;
mod store;

#[cfg(test)]
mod mock_framework;

use tracing::{error, info, warn, Instrument};

use crate::app_system::{setup_tracing, MarketplaceSystem};
use crate::config::Config;
use crate::domain::{ActorCreate, ActorPatch, Role, ServiceRequestCreate, ServiceStatus};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = Config::from_env();
    info!(?config, "Starting servicehub");

    let system = MarketplaceSystem::new(&config);
    let session = system.session_client.clone();
    let registry = system.registry_client.clone();

    // Whatever survived the last run is dropped so the walkthrough starts clean.
    if let Some(actor) = session.current_actor().await? {
        info!(actor_id = %actor.id, "Found a restored session, signing it out");
        session.sign_out().await?;
    }

    let customer = async {
        let outcome = session
            .sign_up_deferred(ActorCreate {
                name: "Carla Mendes".into(),
                email: "carla@example.com".into(),
                password: "correct horse".into(),
                role: Role::Customer,
            })
            .outcome()
            .await?;
        info!(redirect = %outcome.redirect, "{}", outcome.notice);
        Ok::<_, Box<dyn std::error::Error>>(outcome.actor)
    }
    .instrument(tracing::info_span!("customer_sign_up"))
    .await?;

    let mut submitted = Vec::new();
    for (title, category) in [
        ("Fix Leaking Bathroom Faucet", "Plumbing"),
        ("Paint Living Room Walls", "Painting"),
    ] {
        let request = registry
            .create_request_deferred(
                customer.clone(),
                ServiceRequestCreate {
                    title: title.into(),
                    description: format!("{} as soon as possible.", title),
                    category: category.into(),
                    location: "Brooklyn, NY".into(),
                    date: "2023-06-10".into(),
                },
            )
            .outcome()
            .instrument(tracing::info_span!("service_submission"))
            .await?;
        info!(request_id = %request.id, status = request.status.label(Role::Customer), "Request submitted");
        submitted.push(request);
    }
    let (faucet, walls) = (submitted[0].id.clone(), submitted[1].id.clone());

    session.sign_out().await?;

    // A new worker can reach nothing but profile setup until it is finished.
    let newcomer = session
        .sign_up_deferred(ActorCreate {
            name: "Walt Reyes".into(),
            email: "walt@example.com".into(),
            password: "hammer time".into(),
            role: Role::Worker,
        })
        .outcome()
        .await?;
    info!(redirect = %newcomer.redirect, "{}", newcomer.notice);
    let decision = session.authorize("/worker-dashboard".to_string()).await?;
    info!(?decision, "Guard decision before profile completion");

    let completed_profile = session
        .complete_profile(ActorPatch {
            location: Some("Queens, NY".into()),
            skills: Some(vec!["Painting".into(), "Carpentry".into()]),
            ..Default::default()
        })
        .await?;
    info!(redirect = %completed_profile.redirect, "{}", completed_profile.notice);

    let passed = registry.pass(walls.clone(), completed_profile.actor.clone()).await?;
    info!("{}", passed.notice);
    let visible = registry.visible_to(completed_profile.actor.clone()).await?;
    info!(visible = visible.len(), "Requests visible to the new worker");
    session.sign_out().await?;

    let worker = session
        .sign_in_deferred("worker@example.com".into(), "password".into())
        .outcome()
        .instrument(tracing::info_span!("worker_sign_in"))
        .await?;
    info!(redirect = %worker.redirect, "{}", worker.notice);
    let worker = worker.actor;

    for path in ["/worker-dashboard", "/service-request", "/login"] {
        let decision = session.authorize(path.to_string()).await?;
        info!(path, ?decision, "Guard decision");
    }

    let available = registry.by_status(ServiceStatus::Open).await?;
    info!(available = available.len(), "Open requests");

    let accepted = registry.accept(faucet.clone(), worker.clone()).await?;
    info!("{}", accepted.notice);
    let completed = registry.complete(faucet.clone(), worker.clone()).await?;
    info!("{}", completed.notice);

    match registry.cancel(faucet.clone(), customer.clone()).await {
        Ok(_) => error!("Completed request was cancelled"),
        Err(e) => warn!(error = %e, "Cancel after completion rejected as expected"),
    }

    let dashboard = registry.dashboard(worker.clone()).await?;
    let (open, active, done) = dashboard.counts();
    info!(open, active, done, "Worker dashboard");

    let profile = session
        .update_profile(ActorPatch {
            location: Some("Brooklyn, NY".into()),
            ..Default::default()
        })
        .await?;
    info!(actor_id = %profile.id, "Profile updated");

    if let Some(request) = registry.get(walls.clone()).await? {
        info!(request_id = %request.id, status = request.status.label(Role::Worker), "Still open for other workers");
    }
    info!(total = registry.snapshot().await?.len(), "Requests in registry");

    let redirect = session.sign_out().await?;
    info!(%redirect, "Logged out successfully");

    system.shutdown().await?;
    info!("servicehub completed successfully");
    Ok(())
}
