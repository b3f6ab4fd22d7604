#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use leave_planner::{JsonPlanStore, PlanModel, PlanStore, PlannerConfig, http_api};
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let config = PlannerConfig::load()?.with_env_overrides();
    let addr: SocketAddr = config.http_addr.parse()?;

    let stored = match config.resolved_plan_path() {
        Some(path) => JsonPlanStore::new(path).load_plan()?,
        None => None,
    };
    let plan = match stored {
        Some(plan) => plan,
        None => {
            let today = chrono::Local::now().date_naive();
            PlanModel::new(today, &config.first_caregiver, &config.second_caregiver)?
        }
    };

    tracing::info!(%addr, "leave-planner HTTP API listening");
    println!("leave-planner HTTP API listening on http://{addr}");
    http_api::serve(addr, plan).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
