//! `family-tree` command-line entry point.
//!
//! Wires configuration, the PostgreSQL pool, and the domain services, then
//! runs one command. Tree commands authenticate with `--username` and
//! `--password` first and act only on that user's tree.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig as _;
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use family_tree::config::AppSettings;
use family_tree::domain::ports::{FamilyTreeCommand, FamilyTreeQuery, IdentityService};
use family_tree::domain::{
    AccountService, FamilyTreeService, IndividualDetails, IndividualId, LoginCredentials,
    Registration, RelationshipDetails, RelationshipId, UserId,
};
use family_tree::outbound::persistence::{
    DbPool, DieselFamilyTreeRepository, DieselGenealogyRepository, DieselUserRepository,
    PoolConfig, run_migrations,
};

/// `family-tree` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "family-tree",
    about = "Manage a personal family tree stored in PostgreSQL",
    version
)]
struct Cli {
    /// Database connection URL. Overrides `FAMILY_TREE_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url", global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct Account {
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Create an account.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Check credentials and print the user id.
    Login(Account),
    /// Print the tree summary, creating the tree on first use.
    Tree(Account),
    /// Add a person to the tree.
    AddIndividual {
        #[command(flatten)]
        account: Account,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        gender: String,
        #[arg(long)]
        birth_date: String,
        #[arg(long)]
        death_date: Option<String>,
        #[arg(long)]
        occupation: String,
    },
    /// Remove a person and every relationship naming them.
    DeleteIndividual {
        #[command(flatten)]
        account: Account,
        #[arg(long)]
        id: IndividualId,
    },
    /// Link two people of the tree.
    AddRelationship {
        #[command(flatten)]
        account: Account,
        #[arg(long = "from")]
        individual_id1: IndividualId,
        #[arg(long = "to")]
        individual_id2: IndividualId,
        #[arg(long = "type")]
        relationship_type: String,
        #[arg(long)]
        start_date: String,
        #[arg(long)]
        end_date: Option<String>,
    },
    /// Remove a relationship.
    DeleteRelationship {
        #[command(flatten)]
        account: Account,
        #[arg(long)]
        id: RelationshipId,
    },
    /// Print individuals and relationships as JSON.
    List(Account),
    /// Print the visualisation payload as JSON.
    Graph(Account),
}

type TreeService = FamilyTreeService<DieselFamilyTreeRepository, DieselGenealogyRepository>;

struct Services {
    identity: AccountService<DieselUserRepository>,
    trees: TreeService,
}

impl Services {
    async fn connect(settings: &AppSettings) -> Result<Self> {
        let pool = DbPool::new(PoolConfig::from(settings))
            .await
            .wrap_err("create database pool")?;
        let clock = Arc::new(DefaultClock);
        Ok(Self {
            identity: AccountService::new(Arc::new(DieselUserRepository::new(pool.clone()))),
            trees: FamilyTreeService::new(
                Arc::new(DieselFamilyTreeRepository::new(pool.clone())),
                Arc::new(DieselGenealogyRepository::new(pool)),
                clock,
            ),
        })
    }

    /// Connect and authenticate `account`, returning its user id.
    async fn signed_in(settings: &AppSettings, account: &Account) -> Result<(Self, UserId)> {
        let credentials = LoginCredentials::try_from_parts(&account.username, &account.password)
            .wrap_err("invalid credentials")?;
        let services = Self::connect(settings).await?;
        let user = services.identity.verify_credentials(&credentials).await?;
        Ok((services, user.id()))
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(cli))
}

fn load_settings(database_url: Option<String>) -> Result<AppSettings> {
    if database_url.as_deref().is_some_and(|url| url.trim().is_empty()) {
        return Err(eyre!("--database-url must not be empty when provided"));
    }
    let mut settings = AppSettings::load_from_iter([OsString::from("family-tree")])
        .map_err(|err| eyre!("load configuration: {err}"))?;
    if database_url.is_some() {
        settings.database_url = database_url;
    }
    Ok(settings)
}

async fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.database_url)?;

    match cli.command {
        Command::Migrate => {
            let applied = run_migrations(settings.database_url()).await?;
            println!("applied {} migration(s)", applied.len());
            Ok(())
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            let registration = Registration::try_from_parts(&username, &email, &password)
                .wrap_err("invalid registration")?;
            let services = Services::connect(&settings).await?;
            let id = services.identity.register(&registration).await?;
            println!("registered user {id}");
            Ok(())
        }
        Command::Login(account) => {
            let (_, id) = Services::signed_in(&settings, &account).await?;
            println!("authenticated as user {id}");
            Ok(())
        }
        Command::Tree(account) => {
            let (services, owner) = Services::signed_in(&settings, &account).await?;
            print_json(&services.trees.tree(owner).await?)
        }
        Command::AddIndividual {
            account,
            first_name,
            last_name,
            gender,
            birth_date,
            death_date,
            occupation,
        } => {
            let details = IndividualDetails::builder(first_name, last_name)
                .gender(gender)
                .birth_date(birth_date)
                .death_date(death_date)
                .occupation(occupation)
                .build()
                .wrap_err("invalid individual")?;
            let (services, owner) = Services::signed_in(&settings, &account).await?;
            print_json(&services.trees.add_individual(owner, details).await?)
        }
        Command::DeleteIndividual { account, id } => {
            let (services, owner) = Services::signed_in(&settings, &account).await?;
            let removal = services.trees.delete_individual(owner, id).await?;
            println!(
                "deleted individual {id} and {} relationship(s)",
                removal.removed_relationships
            );
            Ok(())
        }
        Command::AddRelationship {
            account,
            individual_id1,
            individual_id2,
            relationship_type,
            start_date,
            end_date,
        } => {
            let details = RelationshipDetails::try_new(
                individual_id1,
                individual_id2,
                relationship_type,
                start_date,
                end_date,
            )
            .wrap_err("invalid relationship")?;
            let (services, owner) = Services::signed_in(&settings, &account).await?;
            print_json(&services.trees.add_relationship(owner, details).await?)
        }
        Command::DeleteRelationship { account, id } => {
            let (services, owner) = Services::signed_in(&settings, &account).await?;
            services.trees.delete_relationship(owner, id).await?;
            println!("deleted relationship {id}");
            Ok(())
        }
        Command::List(account) => {
            let (services, owner) = Services::signed_in(&settings, &account).await?;
            print_json(&services.trees.tree_view(owner).await?)
        }
        Command::Graph(account) => {
            let (services, owner) = Services::signed_in(&settings, &account).await?;
            print_json(&services.trees.graph(owner).await?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).wrap_err("serialise output")?;
    println!("{rendered}");
    Ok(())
}
