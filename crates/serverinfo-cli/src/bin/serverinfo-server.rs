//! serverinfo-server — serve this host's network speed over HTTP.

use clap::Parser;
use serverinfo_core::{DEFAULT_PORT, RateEstimator};

#[derive(Parser)]
#[command(name = "serverinfo-server")]
#[command(about = "Report this host's incoming/outgoing network speed over HTTP")]
#[command(version = serverinfo_core::VERSION)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let base = format!("http://{}:{}", args.host, args.port);

    println!("📡 serverinfo server v{}", serverinfo_core::VERSION);
    println!("   {base}");
    println!();
    println!("   Endpoints:");
    println!("     GET /            Usage message");
    println!("     GET /speed       Speed in B/s");
    println!("     GET /speed/kb    Speed in KB/s");
    println!("     GET /speed/mb    Speed in MB/s");
    println!();
    println!("   Example:");
    println!("     curl {base}/speed");
    println!();

    let mut estimator = RateEstimator::system();
    estimator.prime();

    let result = tokio::runtime::Runtime::new().and_then(|rt| {
        rt.block_on(serverinfo_server::run_server(
            estimator,
            &args.host,
            args.port,
        ))
    });

    if let Err(e) = result {
        eprintln!("Error: cannot serve on {base}: {e}");
        std::process::exit(1);
    }
}
