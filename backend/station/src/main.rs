use std::path::PathBuf;

use anyhow::Error;
use clap::{ArgAction, Parser, Subcommand};
use readings::{
    Readings,
    account::{Credentials, Registration},
    evaluate,
};
use station::{
    client::{ApiClient, DEFAULT_API},
    listen, load_image, print_record, print_summary, simulate, submit,
};
use tokio::io::{AsyncBufRead, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the inspection server.
    #[arg(long, env = "STATION_API", default_value = DEFAULT_API)]
    api: String,

    /// Bearer token from `login`.
    #[arg(long, env = "STATION_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Submit one package.
    Submit {
        #[arg(long, allow_negative_numbers = true)]
        temperature: f64,
        #[arg(long, allow_negative_numbers = true)]
        weight: f64,
        #[arg(long, action = ArgAction::Set)]
        sealed: bool,
        #[arg(long)]
        package_id: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
        /// Print the verdict without submitting.
        #[arg(long)]
        dry_run: bool,
    },

    /// Submit every reading the sensor device writes.
    Listen {
        /// Device path, `-` for stdin.
        #[arg(long, default_value = "-")]
        device: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Submit random readings.
    Simulate {
        #[arg(long, default_value_t = 1)]
        count: u32,
        #[arg(long)]
        image: Option<PathBuf>,
    },

    List,

    Stats,

    Delete { id: String },
}

async fn open_device(device: &str) -> Result<Box<dyn AsyncBufRead + Unpin + Send>, Error> {
    if device == "-" {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }

    let file = tokio::fs::File::open(device).await?;

    Ok(Box::new(BufReader::new(file)))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    let api = ApiClient::new(&args.api, args.token);

    match args.command {
        Command::Register {
            name,
            email,
            password,
        } => {
            let session = api
                .register(&Registration {
                    name,
                    email,
                    password,
                })
                .await?;
            println!("Registered {} ({})", session.profile.name, session.profile.email);
            println!("{}", session.token);
        }
        Command::Login { email, password } => {
            let session = api.login(&Credentials { email, password }).await?;
            println!("{}", session.token);
        }
        Command::Submit {
            temperature,
            weight,
            sealed,
            package_id,
            image,
            dry_run,
        } => {
            let readings = Readings {
                temperature,
                weight,
                is_sealed: sealed,
            };

            if dry_run {
                let verdict = evaluate(&readings);
                println!("{}: {}", verdict.status, verdict.reason);
                return Ok(());
            }

            let image_data = load_image(image.as_deref())?;
            let record = submit(&api, readings, package_id, image_data).await?;
            print_record(&record);
        }
        Command::Listen { device, image } => {
            let image_data = load_image(image.as_deref())?;
            let reader = open_device(&device).await?;

            println!("Listening on {device}");
            let summary = listen(&api, reader, image_data).await?;
            print_summary(&summary);
        }
        Command::Simulate { count, image } => {
            let image_data = load_image(image.as_deref())?;
            let summary = simulate(&api, count, image_data).await?;
            print_summary(&summary);
        }
        Command::List => {
            for record in api.list().await? {
                print_record(&record);
            }
        }
        Command::Stats => {
            let stats = api.stats().await?;
            println!("Total: {}", stats.total_packages);
            println!("Passed: {}", stats.passed_packages);
            println!("Rejected: {}", stats.rejected_packages);
            println!("Sealed: {}", stats.sealed_packages);
            println!("Unsealed: {}", stats.unsealed_packages);
        }
        Command::Delete { id } => {
            println!("{}", api.delete(&id).await?);
        }
    }

    Ok(())
}
