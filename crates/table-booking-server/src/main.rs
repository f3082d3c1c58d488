//! Server implementation

#![warn(missing_docs)]

mod assets;
mod http;

use std::path::PathBuf;
use std::thread;

use assets::Assets;
use clap::Parser;
use eyre::{eyre, Result, WrapErr};
use table_booking_core::{Config, RequestHandler};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Command line options
#[derive(Parser, Debug)]
#[command(name = "table-booking-server")]
#[command(about = "Reservation service for a restaurant's tables")]
struct Opts {
    /// Address for the HTTP server to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port for the HTTP server to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Number of HTTP worker threads
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
    threads: u32,

    /// TOML file with the `[[tables]]` to seed, the built-in five tables otherwise
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Directory the browser front end is served from
    #[arg(long, default_value = "public")]
    assets: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Opts {
    fn config(&self) -> Result<Config> {
        let Some(path) = &self.tables else {
            return Ok(Config::default());
        };

        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("could not read {}", path.display()))?;
        Config::from_toml_str(&contents).wrap_err_with(|| format!("in {}", path.display()))
    }
}

/// Log directives used when `RUST_LOG` is not set
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "table_booking_server=debug,table_booking_ledger=debug,info"
    } else {
        "table_booking_server=info,table_booking_ledger=info"
    }
}

fn init_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}

fn http_loop<H: RequestHandler>(server: &tiny_http::Server, handler: &H, assets: &Assets) {
    loop {
        let rq = match server.recv() {
            Ok(rq) => rq,
            Err(err) => {
                error!(%err, "HTTP receive failed");
                return;
            }
        };
        if let Some(rq) = http::parse(rq, assets) {
            handler.handle(rq);
        }
    }
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    init_logger(opts.verbose);

    let config = opts.config()?;
    let dispatcher = table_booking_ledger::launch(&config)?;

    let server = tiny_http::Server::http((opts.host.as_str(), opts.port))
        .map_err(|err| eyre!("could not listen on {}:{}: {err}", opts.host, opts.port))?;
    let assets = Assets::new(&opts.assets);

    info!(
        threads = opts.threads,
        assets = %opts.assets.display(),
        "Server running on http://{}:{}",
        opts.host,
        opts.port
    );

    thread::scope(|s| -> Result<()> {
        for i in 0..opts.threads {
            thread::Builder::new()
                .name(format!("http_{i}"))
                .spawn_scoped(s, || http_loop(&server, &dispatcher, &assets))
                .wrap_err("could not spawn HTTP worker")?;
        }
        Ok(())
    })?;

    dispatcher.shutdown();
    Ok(())
}
