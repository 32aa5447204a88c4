use clap::Parser;
use keel::echo::EchoServer;
use keel::net::ListenOptions;
use keel::{Handle, RuntimeBuilder};
use tracing::Level;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::process::ExitCode;
use std::time::Duration;

/// TCP echo server: every byte a client sends is written back to it.
#[derive(clap::Parser, Clone, Debug)]
#[command(version, about)]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    address: IpAddr,

    /// Port to listen on.
    #[arg(long, default_value_t = 1234)]
    port: u16,

    /// Enable SO_REUSEADDR on the listening socket.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    reuse_address: bool,

    /// Time slice in microseconds after which connection loops yield.
    #[arg(long, default_value_t = 500)]
    task_quota_us: u64,

    /// Maximum log level.
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn tracing_init(level: Level) {
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_max_level(level)
            .without_time()
            .finish(),
    )
    .unwrap();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_init(cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("exception caught: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> keel::Result<()> {
    let runtime = RuntimeBuilder::new()
        .task_quota(Duration::from_micros(cli.task_quota_us))
        .build()?;

    let address = SocketAddr::new(cli.address, cli.port);
    let options = ListenOptions::new().reuse_address(cli.reuse_address);

    runtime.run(|handle: &Handle| match EchoServer::bind(handle, address, options) {
        Ok(server) => server.serve(),
        Err(err) => handle.failed(err),
    })
}
