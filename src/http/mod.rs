//! HTTP server exposing the prediction and spec endpoints.
//!
//! ```text
//! POST /api/predict   {carId, modIds[]} -> Estimate
//! GET  /api/specs     ?year&make&model&trim -> CarSpecs
//! POST /api/specs     SpecSubmission -> 201
//! GET  /health
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;

use crate::utils::error::Result;

/// Binds `addr` and serves until the process receives Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 ModCalc listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}
