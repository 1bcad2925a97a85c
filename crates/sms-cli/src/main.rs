use clap::{Parser, Subcommand};
use dialoguer::{Input, MultiSelect};
use dotenvy::dotenv;
use sms_cli::seeder::{self, SeedConfig};
use sms_config::JwtConfig;
use sms_core::Role;
use sms_db::{PgPool, init_db_pool, run_migrations};

const ROLES: [Role; 3] = [Role::Admin, Role::Manager, Role::Guest];

#[derive(Parser)]
#[command(name = "sms-cli")]
#[command(about = "SMS CLI - Development tools for the student management service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the database with fake students, tickets, modules and enrollments
    Seed {
        /// Number of students to create
        #[arg(short = 's', long, default_value = "50")]
        students: usize,

        /// Number of tickets per student
        #[arg(short = 't', long, default_value = "2")]
        tickets: usize,

        /// Number of module enrollments per student
        #[arg(short = 'm', long, default_value = "3")]
        modules: usize,
    },
    /// Delete all students, tickets, modules and enrollments
    ClearSeed,
    /// Mint an access token for local use
    IssueToken {
        /// Subject (user id) claim
        #[arg(long)]
        subject: Option<String>,

        /// Email claim
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Role to grant; repeat for several (prompted if omitted)
        #[arg(short = 'r', long = "role")]
        roles: Vec<Role>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Seed {
            students,
            tickets,
            modules,
        } => {
            let pool = connect().await;
            let config = SeedConfig::new(students)
                .with_tickets(tickets)
                .with_modules(modules);
            if let Err(e) = seeder::seed_all(&pool, config).await {
                eprintln!("\n❌ Error seeding database: {}", e);
                std::process::exit(1);
            }
        }
        Commands::ClearSeed => {
            let pool = connect().await;
            if let Err(e) = seeder::clear_all(&pool).await {
                eprintln!("\n❌ Error clearing seeded data: {}", e);
                std::process::exit(1);
            }
        }
        Commands::IssueToken {
            subject,
            email,
            roles,
        } => handle_issue_token(subject, email, roles),
    }
}

async fn connect() -> PgPool {
    let pool = match init_db_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        eprintln!("❌ Failed to apply migrations: {}", e);
        std::process::exit(1);
    }
    pool
}

fn handle_issue_token(subject: Option<String>, email: Option<String>, roles: Vec<Role>) {
    let email = email.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Email address")
            .default("staff@sms.test".to_string())
            .interact_text()
            .expect("Failed to read email")
    });

    let roles = if roles.is_empty() {
        let selected = MultiSelect::new()
            .with_prompt("Roles (space to select)")
            .items(&ROLES.map(|r| r.as_str()))
            .interact()
            .expect("Failed to read roles");
        selected.into_iter().map(|i| ROLES[i]).collect()
    } else {
        roles
    };

    let subject = subject.unwrap_or_else(|| email.clone());
    let config = JwtConfig::from_env();
    let role_names: Vec<String> = roles.iter().map(|r| r.to_string()).collect();

    match sms_auth::create_access_token(&subject, &email, role_names.clone(), &config) {
        Ok(token) => {
            println!("\n✅ Token issued for {} [{}]", email, role_names.join(", "));
            println!("   Expires in {} seconds\n", config.access_token_expiry);
            println!("{}", token);
        }
        Err(e) => {
            eprintln!("\n❌ Error issuing token: {}", e.error);
            std::process::exit(1);
        }
    }
}
