use axum::{
    Extension, Router,
    routing::{get, post},
};
use std::{net::SocketAddr, str::FromStr};

use crate::{api, config, error};

pub async fn start_server(ctx: api::SharedContext) {
    let app = Router::new()
        .route("/", get(api::index))
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .route("/playlist", post(api::select_playlist))
        .route("/recommend", post(api::recommend))
        .route("/play", post(api::play))
        .route("/stop", post(api::stop))
        .route("/add", post(api::track_add))
        .route("/remove", post(api::remove))
        .route("/advance", post(api::advance))
        .route("/signout", post(api::signout))
        .layer(Extension(ctx));

    let addr = match SocketAddr::from_str(&config::server_addr()) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind {}: {}", addr, e),
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server terminated: {}", e);
    }
}
