use std::io::Read;
use std::sync::Arc;

use landsat_tiler::config::Config;
use landsat_tiler::landsat::{self, ReplyCache, UnavailableBackend};
use landsat_tiler::{logger, server, Api};

/// `landsat-tiler`          serve HTTP on the configured address
/// `landsat-tiler invoke`   read one gateway event from stdin, print the response
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;

    let api = landsat::build_api_with_cache(
        &cfg.app.name,
        Arc::new(UnavailableBackend),
        ReplyCache::new(cfg.cache.size),
    )?;

    if std::env::args().nth(1).as_deref() == Some("invoke") {
        return invoke_once(&api);
    }

    // Create Tokio runtime, sizing workers from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, api))
}

async fn async_main(cfg: Config, api: Api) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::bind(addr, server::ListenOptions::from_config(&cfg.server))?;
    logger::log_server_start(&addr, &cfg);

    server::run(listener, Arc::new(api), Arc::new(cfg)).await?;
    Ok(())
}

/// Lambda-style one-shot invocation
fn invoke_once(api: &Api) -> Result<(), Box<dyn std::error::Error>> {
    let mut payload = String::new();
    std::io::stdin().read_to_string(&mut payload)?;
    println!("{}", api.dispatch_json(&payload).to_json());
    Ok(())
}
