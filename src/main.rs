use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tracing::info;

use nameless::config::Config;
use nameless::db::models::{NewCourse, NewMessage, NewTeacher, Semester};
use nameless::db::Database;
use nameless::mail::RelayMailer;
use nameless::output::terminal;
use nameless::pipeline::{DeliveryPipeline, DeliveryResult};
use nameless::toxicity::PerspectiveClassifier;

/// Nameless: anonymous feedback from students to teachers.
///
/// Every message is screened for abusive content before it is emailed.
/// Abusive messages are held back and counted against the sender.
#[derive(Parser)]
#[command(name = "nameless", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Register a student account (Northeastern email required)
    Register {
        /// first.last@northeastern.edu or first.last@husky.neu.edu
        email: String,

        #[arg(long)]
        password: String,

        /// Create an administrator account
        #[arg(long)]
        superuser: bool,
    },

    /// Add a teacher to the directory
    AddTeacher {
        name: String,

        #[arg(long)]
        college: String,

        #[arg(long)]
        email: String,
    },

    /// Add a course to the directory
    AddCourse {
        name: String,

        /// FA, SP, S1 or S2
        #[arg(long)]
        semester: String,

        #[arg(long)]
        year: Option<i32>,

        /// Course number, e.g. 3500
        #[arg(long)]
        number: Option<i32>,

        #[arg(long)]
        subject: String,

        /// Teacher id(s) who run this course (repeatable)
        #[arg(long = "teacher")]
        teachers: Vec<i64>,
    },

    /// Find teachers by partial name (e.g. "jo sm")
    SearchTeacher {
        /// Name fragments, matched in order, case-insensitive
        query: Vec<String>,
    },

    /// Find courses by partial name
    SearchCourse {
        query: Vec<String>,
    },

    /// Show a teacher by id
    Teacher { id: i64 },

    /// Send an anonymous message to a teacher
    Send {
        /// Sending student's account id
        #[arg(long)]
        from: i64,

        /// Recipient teacher id
        #[arg(long)]
        to: i64,

        /// Message text
        body: String,
    },

    /// Send every message in a JSON file ([{student_id, teacher_id, body}, ...])
    SendBatch {
        file: String,

        /// Number of messages to screen in parallel (default: 4)
        #[arg(long, default_value = "4")]
        concurrency: u32,
    },

    /// Show a student account's infraction count
    Infractions { account_id: i64 },

    /// Show system status (DB stats, message outcomes)
    Status,

    /// Start the HTTP API
    #[cfg(feature = "web")]
    Serve {
        #[arg(long, default_value = "3000")]
        port: u16,

        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("nameless=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing database...");
            let db = init_database(&config)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext: add teachers with `nameless add-teacher`, then register students.");
        }

        Commands::Register {
            email,
            password,
            superuser,
        } => {
            let db = open_database(&config)?;
            let account =
                nameless::accounts::register(db.as_ref(), &email, &password, superuser).await?;
            println!(
                "{} Registered {} (account id {})",
                "✓".green().bold(),
                account.email,
                account.id
            );
        }

        Commands::AddTeacher {
            name,
            college,
            email,
        } => {
            let db = open_database(&config)?;
            let teacher = db
                .create_teacher(&NewTeacher {
                    name,
                    college,
                    email,
                })
                .await?;
            println!("Added teacher #{}: {}", teacher.id, teacher.name);
        }

        Commands::AddCourse {
            name,
            semester,
            year,
            number,
            subject,
            teachers,
        } => {
            let semester = Semester::from_code(&semester).with_context(|| {
                format!("Unknown semester {semester:?}; use FA, SP, S1 or S2")
            })?;
            let db = open_database(&config)?;
            let course = db
                .create_course(&NewCourse {
                    name,
                    semester,
                    year,
                    course_num: number,
                    subject,
                })
                .await?;
            for teacher_id in teachers {
                if db.get_teacher(teacher_id).await?.is_none() {
                    anyhow::bail!("No teacher with id {teacher_id}");
                }
                db.link_course_teacher(course.id, teacher_id).await?;
            }
            println!("Added course #{}: {}", course.id, course.label());
        }

        Commands::SearchTeacher { query } => {
            let query = query.join(" ");
            let db = open_database(&config)?;
            let teachers = nameless::search::search_teachers(db.as_ref(), &query).await?;
            terminal::display_teachers(&query, &teachers);
        }

        Commands::SearchCourse { query } => {
            let query = query.join(" ");
            let db = open_database(&config)?;
            let courses = nameless::search::search_courses(db.as_ref(), &query).await?;
            let mut with_teachers = Vec::with_capacity(courses.len());
            for course in courses {
                let teachers = db.get_course_teachers(course.id).await?;
                with_teachers.push((course, teachers));
            }
            terminal::display_courses(&query, &with_teachers);
        }

        Commands::Teacher { id } => {
            let db = open_database(&config)?;
            match db.get_teacher(id).await? {
                Some(teacher) => terminal::display_teacher_detail(&teacher),
                None => anyhow::bail!("No teacher with id {id}"),
            }
        }

        Commands::Send { from, to, body } => {
            let db = open_database(&config)?;
            let pipeline = build_pipeline(&config, db)?;
            let result = pipeline
                .submit(NewMessage {
                    student_id: from,
                    teacher_id: to,
                    body,
                })
                .await?;
            terminal::display_delivery(&result);
        }

        Commands::SendBatch { file, concurrency } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {file}"))?;
            let messages: Vec<NewMessage> = serde_json::from_str(&raw)
                .with_context(|| format!("{file} is not a JSON array of messages"))?;

            let db = open_database(&config)?;
            let pipeline = build_pipeline(&config, db)?;

            println!(
                "Screening {} messages ({} concurrent)...",
                messages.len(),
                concurrency
            );
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("  {spinner} {msg} ({elapsed})")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message("Classifying");
            pb.enable_steady_tick(std::time::Duration::from_millis(120));

            let results = pipeline
                .submit_batch(messages, concurrency as usize)
                .await;
            pb.finish_and_clear();

            let (mut delivered, mut rejected, mut failed) = (0, 0, 0);
            for (i, result) in results.iter().enumerate() {
                match result {
                    Ok(DeliveryResult::Delivered { .. }) => delivered += 1,
                    Ok(DeliveryResult::Rejected { .. }) => rejected += 1,
                    Err(e) => {
                        failed += 1;
                        println!("  {} message {}: {}", "Error:".red(), i + 1, e);
                    }
                }
            }

            println!("\n{}", "Batch complete.".bold());
            println!("  Delivered: {delivered}");
            println!("  Rejected:  {rejected}");
            println!("  Failed:    {failed}");
        }

        Commands::Infractions { account_id } => {
            let db = open_database(&config)?;
            match db.get_account(account_id).await? {
                Some(account) => terminal::display_account(&account),
                None => anyhow::bail!("No student account with id {account_id}"),
            }
        }

        Commands::Status => {
            if !nameless::status::is_initialized(&config.db_path) {
                println!("Database: not initialized");
                println!("\nRun `nameless init` to set up the database.");
                return Ok(());
            }
            let db = open_database(&config)?;
            nameless::status::show(&db, &config.db_path).await?;
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let db = init_database(&config)?;
            let pipeline = build_pipeline(&config, db.clone())?;
            nameless::web::run_server(db, pipeline, port, &bind).await?;
        }
    }

    Ok(())
}

/// Open the existing database behind the Database trait.
fn open_database(config: &Config) -> Result<Arc<dyn Database>> {
    let conn = nameless::db::open(&config.db_path)?;
    Ok(Arc::new(nameless::db::SqliteDatabase::new(conn)))
}

/// Create (or migrate) the database behind the Database trait.
fn init_database(config: &Config) -> Result<Arc<dyn Database>> {
    let conn = nameless::db::initialize(&config.db_path)?;
    Ok(Arc::new(nameless::db::SqliteDatabase::new(conn)))
}

/// Wire the Perspective classifier and the mail relay into a pipeline.
fn build_pipeline(config: &Config, db: Arc<dyn Database>) -> Result<DeliveryPipeline> {
    config.require_perspective()?;
    let relay_url = config.require_mail_relay()?;
    let classifier = PerspectiveClassifier::new(
        &config.perspective_url,
        config.perspective_api_key.clone(),
        config.classifier_timeout,
    )?;

    info!(relay = %relay_url, "Using HTTP mail relay");
    let mailer = RelayMailer::new(
        relay_url,
        config.mail_relay_token.clone(),
        config.mail_from.clone(),
        config.mail_timeout,
    )?;

    Ok(DeliveryPipeline::new(db, Arc::new(classifier), Arc::new(mailer)))
}
