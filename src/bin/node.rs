use chunkstore::node::server::NodeServer;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 5 {
        eprintln!("Usage: {} --dir <storage_dir> --bind <addr:port>", args[0]);
        eprintln!("Example: {} --dir ./dfs1 --bind 127.0.0.1:10001", args[0]);
        std::process::exit(1);
    }

    let mut storage_dir: Option<PathBuf> = None;
    let mut bind_addr: Option<SocketAddr> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--dir" => {
                storage_dir = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--bind" => {
                bind_addr = Some(args[i + 1].parse()?);
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let (Some(storage_dir), Some(bind_addr)) = (storage_dir, bind_addr) else {
        eprintln!("Both --dir and --bind are required");
        std::process::exit(1);
    };

    let listener = TcpListener::bind(bind_addr).await?;
    let server = Arc::new(NodeServer::new(storage_dir));

    tokio::select! {
        result = server.run(listener) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received interrupt signal, shutting down");
            Ok(())
        }
    }
}
