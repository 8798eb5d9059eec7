#![deny(clippy::all)]

pub mod config;
pub mod errors;
pub mod routes;

use crate::config::Config;

use judgekit_client::CodeJudge;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

pub const SERVICE_NAME: &str = "judgekit";

pub struct App {
    pub judge: CodeJudge,
    pub config: Arc<Config>,
}

impl App {
    pub fn new(config: Arc<Config>) -> Self {
        let judge = CodeJudge::new(Arc::new(config.client.clone()));
        if judge.is_degraded() {
            warn!("no judge credential configured, every execution is heuristic");
        }
        Self { judge, config }
    }
}

pub async fn run(config: Arc<Config>) -> Result<()> {
    let app = {
        info!("initializing judge module");
        let app = App::new(config.clone());
        info!("judge module is initialized");
        Arc::new(app)
    };

    let host: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);

    let routes = crate::routes::routes(app);
    info!("server is listening {}", addr);
    warp::serve(routes).run(addr).await;

    Ok(())
}
