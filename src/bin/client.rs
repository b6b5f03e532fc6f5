use chunkstore::client::config::ClusterConfig;
use chunkstore::client::coordinator::{Coordinator, GetStatus};
use std::path::Path;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <command> [filename] ... [filename]", program);
    eprintln!("Commands: ls | get <files...> | put <files...>");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        usage(&args[0]);
    }
    let command = args[1].as_str();
    let files = &args[2..];
    if matches!(command, "get" | "put") && files.is_empty() {
        eprintln!("Specify filename(s)");
        std::process::exit(1);
    }
    if !matches!(command, "ls" | "get" | "put") {
        eprintln!("Invalid command. Please retry.");
        std::process::exit(1);
    }

    let config_path = ClusterConfig::default_path()?;
    let config = ClusterConfig::load(&config_path)?;
    let mut coordinator = Coordinator::connect(&config).await;

    // Per-file failures are reported and skipped; only misuse exits
    // non-zero.
    match command {
        "ls" => {
            for status in coordinator.ls().await? {
                if status.complete {
                    println!("{}", status.filename);
                } else {
                    println!("{}[incomplete]", status.filename);
                }
            }
        }
        "get" => {
            for filename in files {
                match coordinator.get(filename, Path::new(filename)).await {
                    Ok(GetStatus::Complete) => {}
                    Ok(GetStatus::Incomplete) => println!("{} is incomplete.", filename),
                    Err(e) => eprintln!("{} get failed: {:#}", filename, e),
                }
            }
        }
        "put" => {
            for filename in files {
                if let Err(e) = coordinator.put(Path::new(filename)).await {
                    eprintln!("{} put failed: {:#}", filename, e);
                }
            }
        }
        _ => usage(&args[0]),
    }

    Ok(())
}
