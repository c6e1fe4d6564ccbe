//! Subcommands: a storage-server binary (`serve`) and client-facing
//! operations (`put`/`get`/`delete`/`ring`).

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

/// Default storage-server port, matching the system this was ported from.
const DEFAULT_PORT: u16 = 4567;
const DEFAULT_DATA_DIR: &str = "/tmp/pentadb";

#[derive(Parser, Debug)]
#[command(name = "pdb", version, about = "Consistent-hash key/value store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a storage server.
    Serve {
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(short = 'a', long = "data-dir", default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
    /// Write a key/value pair through the client coordinator.
    Put {
        #[arg(long, value_delimiter = ',', required = true)]
        servers: Vec<String>,
        #[arg(long, default_value_t = 1)]
        replicas: usize,
        key: String,
        value: String,
    },
    /// Read a key through the client coordinator.
    Get {
        #[arg(long, value_delimiter = ',', required = true)]
        servers: Vec<String>,
        #[arg(long, default_value_t = 1)]
        replicas: usize,
        key: String,
    },
    /// Delete a key through the client coordinator.
    Delete {
        #[arg(long, value_delimiter = ',', required = true)]
        servers: Vec<String>,
        #[arg(long, default_value_t = 1)]
        replicas: usize,
        key: String,
    },
    /// Print a diagnostic description of the ring formed by `servers`.
    Ring {
        #[arg(long, value_delimiter = ',', required = true)]
        servers: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        weights: Option<Vec<u32>>,
        #[arg(long, default_value_t = 1)]
        replicas: usize,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { port, data_dir } => run_serve(port, data_dir).await,
            Command::Put { servers, replicas, key, value } => {
                let client = client::Client::new(servers, None, replicas).await?;
                client.put(key.as_bytes(), value.as_bytes()).await;
                Ok(())
            }
            Command::Get { servers, replicas, key } => {
                let client = client::Client::new(servers, None, replicas).await?;
                match client.get(key.as_bytes()).await {
                    Some(value) => println!("{}", String::from_utf8_lossy(&value)),
                    None => println!("(nil)"),
                }
                Ok(())
            }
            Command::Delete { servers, replicas, key } => {
                let client = client::Client::new(servers, None, replicas).await?;
                client.delete(key.as_bytes()).await;
                Ok(())
            }
            Command::Ring { servers, weights, replicas } => {
                let client = client::Client::new(servers, weights, replicas).await?;
                print!("{}", client.describe().await);
                Ok(())
            }
        }
    }
}

async fn run_serve(port: u16, data_dir: PathBuf) -> anyhow::Result<()> {
    std::fs::create_dir_all(&data_dir)?;
    let store = Arc::new(server::SledStore::open(&data_dir)?);
    let addr = format!("0.0.0.0:{port}");
    let handler = Arc::new(server::Handler::new(addr.clone(), store));
    server::serve(&addr, handler).await?;
    Ok(())
}
