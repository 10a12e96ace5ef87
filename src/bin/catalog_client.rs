//! Catalog Client CLI
//!
//! Registers types, stores and fetches entities, and runs the device-info
//! round trip against a simulated catalog.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use entity_catalog::config::{Backend, ClientConfig, OutputFormat};
use entity_catalog::{
    deserialize_type, CatalogClient, DeviceInfo, DirectoryCatalog, EntityId, InMemoryCatalog,
    MetadataClient,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog-client")]
#[command(about = "Schema-driven entity catalog client")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory catalog to use (overrides the configured backend)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a sample device and read it back
    Roundtrip,

    /// Register a type definition document
    Register {
        /// Path to the type document (JSON)
        file: PathBuf,
    },

    /// Create an entity from an instance document
    Create {
        /// Path to the instance document (JSON)
        file: PathBuf,
    },

    /// Print a stored entity
    Get {
        /// Entity id
        id: String,
    },

    /// List registered types
    Types,

    /// Show the effective configuration
    Config {
        /// Write it to this path as TOML
        #[arg(long)]
        save: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(path) = cli.catalog {
        config.catalog.backend = Backend::Directory;
        config.catalog.path = path;
    }

    if let Commands::Config { save } = &cli.command {
        println!("{}", toml::to_string_pretty(&config)?);
        if let Some(path) = save {
            config.save(path)?;
            println!("✅ Saved configuration to {}", path);
        }
        return Ok(());
    }

    match config.catalog.backend {
        Backend::Memory => execute(InMemoryCatalog::new(), &config, cli.command),
        Backend::Directory => {
            let catalog = DirectoryCatalog::open_with(config.catalog_path(), config.output.format)?;
            execute(catalog, &config, cli.command)
        }
    }
}

fn execute<C: CatalogClient>(catalog: C, config: &ClientConfig, command: Commands) -> anyhow::Result<()> {
    let mut client = MetadataClient::new(catalog).strict_registration(config.catalog.strict_registration);

    match command {
        Commands::Roundtrip => {
            let definition = DeviceInfo::entity_type()?;
            client.register_type(&definition)?;

            let device = DeviceInfo::sample();
            println!("📦 Storing {}", device);
            let id = client.create(&device, &definition)?;
            println!("🆔 Entity id: {}", id);

            let stored: DeviceInfo = client.get(&id, &definition)?;
            println!("📥 Fetched {}", stored);

            if stored != device {
                bail!("round trip changed the device");
            }
            println!("✅ Round trip preserved every field");
        }

        Commands::Register { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let definition = deserialize_type(&text)?;
            match client.register_type(&definition)? {
                Some(handle) => println!("✅ Registered {} ({})", handle.type_name, handle.checksum.short()),
                None => println!("ℹ️  {} is already registered", definition.type_name()),
            }
        }

        Commands::Create { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let mut catalog = client.into_inner();
            let id = catalog.create_entity(&text)?;
            println!("{}", id);
        }

        Commands::Get { id } => {
            let id = EntityId::parse(&id).with_context(|| format!("invalid entity id '{}'", id))?;
            let text = client.catalog().get_entity(&id)?;
            match config.output.format {
                OutputFormat::Compact => println!("{}", text),
                OutputFormat::Pretty => {
                    let value: serde_json::Value = serde_json::from_str(&text)?;
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
            }
        }

        Commands::Types => {
            let names = client.catalog().type_names();
            if names.is_empty() {
                println!("No types registered yet.");
            } else {
                println!("📚 Registered types:");
                for name in names {
                    println!("  {}", name);
                }
            }
        }

        Commands::Config { .. } => unreachable!("handled before the catalog is opened"),
    }

    Ok(())
}
