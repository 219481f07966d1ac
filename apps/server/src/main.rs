use anyhow::Context;
use clap::{Parser, Subcommand};
use nexus_api::{build_router, AppState};
use nexus_auth::{Authenticator, UserRole};
use nexus_config::load as load_config;
use nexus_database::initialize_database;
use nexus_mailer::Mailer;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tracing::info;

mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Parser)]
#[command(name = "nexusconnect-server")]
#[command(about = "NexusConnect marketplace backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Seed the database with sample accounts
    SeedData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::SeedData => seed_data().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting NexusConnect backend");

    let config = load_config().context("failed to load configuration")?;

    let pool = initialize_database(&config.database)
        .await
        .context("failed to initialise database")?;

    let authenticator = Authenticator::new(pool.clone(), &config.auth);
    let mailer = Mailer::new(&config.email);
    let state = AppState::new(pool, authenticator, mailer);
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}

struct SeedUser {
    name: &'static str,
    email: &'static str,
    role: UserRole,
    bio: &'static str,
    interests: &'static [&'static str],
    portfolio: &'static [(&'static str, &'static str)],
    startup_name: Option<&'static str>,
    startup_description: Option<&'static str>,
    funding_needs: Option<&'static str>,
}

const SEED_PASSWORD: &str = "password123!";

const SEED_USERS: &[SeedUser] = &[
    SeedUser {
        name: "Alice Johnson",
        email: "alice@example.com",
        role: UserRole::Investor,
        bio: "Seasoned investor in early-stage SaaS and fintech startups. Looking for disruptive ideas with strong founding teams.",
        interests: &["SaaS", "Fintech", "AI", "HealthTech"],
        portfolio: &[("Innovate Inc.", "#"), ("FinTech Solutions", "#")],
        startup_name: None,
        startup_description: None,
        funding_needs: None,
    },
    SeedUser {
        name: "Bob Smith",
        email: "bob@example.com",
        role: UserRole::Entrepreneur,
        bio: "Founder of ConnectSphere, a social networking platform for professionals. Former software engineer at a FAANG company.",
        interests: &[],
        portfolio: &[],
        startup_name: Some("ConnectSphere"),
        startup_description: Some("A revolutionary AI-powered platform designed to enhance professional networking by suggesting meaningful connections based on skills, experience, and career goals."),
        funding_needs: Some("$500,000 for 10% equity. Funds will be used for marketing and scaling our engineering team."),
    },
    SeedUser {
        name: "Charlie Brown",
        email: "charlie@example.com",
        role: UserRole::Investor,
        bio: "Venture capitalist with a focus on deep tech and renewable energy. Passionate about supporting technology that makes a positive impact on the world.",
        interests: &["Deep Tech", "Renewable Energy", "Sustainability"],
        portfolio: &[("QuantumLeap", "#"), ("Solaris", "#")],
        startup_name: None,
        startup_description: None,
        funding_needs: None,
    },
    SeedUser {
        name: "Diana Prince",
        email: "diana@example.com",
        role: UserRole::Entrepreneur,
        bio: "CEO of Healthera, a digital health platform providing personalized wellness plans. Background in medicine and public health.",
        interests: &[],
        portfolio: &[],
        startup_name: Some("Healthera"),
        startup_description: Some("A mobile-first platform that uses AI to create personalized fitness and nutrition plans, connecting users with certified coaches and a supportive community."),
        funding_needs: Some("$1.2M for clinical trials and market expansion."),
    },
    SeedUser {
        name: "Ethan Hunt",
        email: "ethan@example.com",
        role: UserRole::Entrepreneur,
        bio: "Creator of EcoTrack, an app helping consumers make sustainable purchasing decisions.",
        interests: &[],
        portfolio: &[],
        startup_name: Some("EcoTrack"),
        startup_description: Some("EcoTrack scans product barcodes to provide a comprehensive sustainability score, empowering consumers to make environmentally conscious choices."),
        funding_needs: Some("$300,000 for product development and user acquisition."),
    },
    SeedUser {
        name: "Fiona Glenanne",
        email: "fiona@example.com",
        role: UserRole::Investor,
        bio: "Angel investor specializing in consumer goods and e-commerce. Enjoys working with first-time founders.",
        interests: &["E-commerce", "Consumer Goods", "Marketplaces"],
        portfolio: &[("ShopEasy", "#"), ("DirectStyle", "#")],
        startup_name: None,
        startup_description: None,
        funding_needs: None,
    },
    SeedUser {
        name: "Platform Admin",
        email: "admin@example.com",
        role: UserRole::Admin,
        bio: "",
        interests: &[],
        portfolio: &[],
        startup_name: None,
        startup_description: None,
        funding_needs: None,
    },
];

async fn seed_data() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("seeding database with sample accounts");

    let config = load_config().context("failed to load configuration")?;
    let pool = initialize_database(&config.database)
        .await
        .context("failed to initialise database")?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        info!(existing, "users table is not empty, skipping seed");
        return Ok(());
    }

    let authenticator = Authenticator::new(pool.clone(), &config.auth);
    for user in SEED_USERS {
        let account = authenticator
            .register(user.name, user.email, SEED_PASSWORD, user.role)
            .await
            .with_context(|| format!("failed to register seed user {}", user.email))?;
        complete_seed_profile(&pool, account.user_id, user).await?;
        info!(email = user.email, role = %user.role, "seeded account");
    }

    info!(count = SEED_USERS.len(), "seed complete, all accounts share the sample password");
    Ok(())
}

async fn complete_seed_profile(
    pool: &SqlitePool,
    user_id: i64,
    user: &SeedUser,
) -> anyhow::Result<()> {
    let interests = serde_json::to_string(user.interests)?;
    let portfolio = serde_json::to_string(
        &user
            .portfolio
            .iter()
            .map(|(name, url)| serde_json::json!({"name": name, "url": url}))
            .collect::<Vec<_>>(),
    )?;

    sqlx::query(
        r#"
        UPDATE users SET
            bio = ?, avatar_url = ?, has_completed_onboarding = TRUE,
            startup_name = ?, startup_description = ?, funding_needs = ?,
            investment_interests = ?, portfolio_companies = ?
        WHERE id = ?
        "#,
    )
    .bind(user.bio)
    .bind("https://placehold.co/100x100.png")
    .bind(user.startup_name)
    .bind(user.startup_description)
    .bind(user.funding_needs)
    .bind(&interests)
    .bind(&portfolio)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}
