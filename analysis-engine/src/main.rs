use std::path::PathBuf;

use analysis_engine::catalog::DEFAULT_DATASET;
use analysis_engine::relay_client::DEFAULT_RELAY_URL;
use analysis_engine::{
    ChatSession, DataContext, DataTable, DatasetCatalog, RelayClient, Role, UploadSimulator,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "analysis-engine")]
#[command(about = "Dataset statistics and AI chat from the command line")]
#[command(version)]
struct Cli {
    /// Base URL of the chat relay
    #[arg(long, global = true, env = "RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    relay_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in datasets
    Datasets,

    /// Summary statistics for a built-in dataset
    Analyze {
        #[arg(default_value = DEFAULT_DATASET)]
        dataset: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Describe a CSV file and summarise its numeric columns
    Inspect {
        file: PathBuf,

        /// Only summarise this column
        #[arg(long, short = 'c')]
        column: Option<String>,
    },

    /// Ask the assistant a question about a CSV file
    Chat { file: PathBuf, question: String },

    /// Request a structured summary and anomaly list
    Insight { prompt: String },

    /// Run the upload progress simulation
    Upload,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "analysis_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let catalog = DatasetCatalog::builtin();

    match cli.command {
        Command::Datasets => {
            for entry in catalog.entries() {
                println!(
                    "{:<14} {:<20} {}",
                    entry.id,
                    entry.label,
                    catalog.preview(entry.id)?
                );
            }
        }
        Command::Analyze { dataset, json } => {
            let report = catalog.analyze(&dataset)?.report();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", catalog.label(&dataset));
                println!("{}", report);
            }
        }
        Command::Inspect { file, column } => {
            let table = DataTable::from_csv_path(&file)?;
            let summary = table.summary();
            println!(
                "{} rows x {} columns",
                summary.total_rows, summary.total_columns
            );

            let columns: Vec<String> = match column {
                Some(c) => vec![c],
                None => table
                    .numeric_columns()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            };
            for name in columns {
                match table.column_statistics(&name) {
                    Ok(stats) => println!("\n[{}]\n{}", name, stats.report()),
                    Err(e) => println!("\n[{}]\n{}", name, e),
                }
            }
        }
        Command::Chat { file, question } => {
            let table = DataTable::from_csv_path(&file)?;
            let context = DataContext::from_table(&table).to_prompt_text()?;
            let client = RelayClient::new(cli.relay_url);

            let mut session = ChatSession::new();
            session.send(&client, &question, &context).await?;

            for message in session.messages() {
                let who = match message.role {
                    Role::User => "you",
                    Role::Assistant => "assistant",
                };
                println!(
                    "[{}] {}:\n{}\n",
                    message.timestamp.format("%H:%M:%S"),
                    who,
                    message.content
                );
            }
        }
        Command::Insight { prompt } => {
            let client = RelayClient::new(cli.relay_url);
            let insight = client.insight(&prompt).await?;
            println!("{}", insight.summary);
            for anomaly in &insight.anomalies {
                println!("  - {}", anomaly);
            }
        }
        Command::Upload => {
            let mut simulator = UploadSimulator::new();
            let mut updates = simulator.subscribe();
            simulator.start();

            while updates.changed().await.is_ok() {
                let progress = *updates.borrow_and_update();
                println!("{:>3}% {:?}", progress.rounded(), progress.status());
                if !progress.uploading {
                    break;
                }
            }
            info!("Upload finished");
        }
    }

    Ok(())
}
