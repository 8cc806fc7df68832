use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use roster::config::{ApiConfig, ConfigError};
use roster::net::api::{ApiError, HttpUserApi};
use roster::net::types::{Field, UserId};
use roster::state::app::App;
use roster::state::form::{FormError, FormState};
use roster::state::table::{EMPTY_PLACEHOLDER, TableState};
use roster::state::upload::{UploadError, UploadState};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("no user with id {0}")]
    UnknownUser(UserId),
}

#[derive(Parser, Debug)]
#[command(name = "roster", about = "User management client")]
struct Cli {
    /// Backend origin; overrides `ROSTER_BASE_URL` from the environment.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every user, PAN masked.
    List,
    /// Create a user.
    Create(CreateArgs),
    /// Edit an existing user; omitted fields keep their current value.
    Update {
        id: UserId,
        #[command(flatten)]
        fields: UpdateArgs,
    },
    /// Delete a user after confirmation.
    Delete {
        id: UserId,
        /// Skip the interactive confirmation.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// Bulk-create users from an .xlsx spreadsheet.
    Upload { file: PathBuf },
    /// Save the sample spreadsheet.
    Template {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    pan: String,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    pan: Option<String>,
}

impl CreateArgs {
    fn into_fields(self) -> [(Field, String); 5] {
        [
            (Field::FirstName, self.first_name),
            (Field::LastName, self.last_name),
            (Field::Email, self.email),
            (Field::Phone, self.phone),
            (Field::Pan, self.pan),
        ]
    }
}

impl UpdateArgs {
    fn into_fields(self) -> impl Iterator<Item = (Field, String)> {
        [
            (Field::FirstName, self.first_name),
            (Field::LastName, self.last_name),
            (Field::Email, self.email),
            (Field::Phone, self.phone),
            (Field::Pan, self.pan),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let mut config = ApiConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    tracing::debug!(base_url = %config.base_url, "using backend");

    let mut app = App::new(HttpUserApi::new(&config)?);

    match cli.command {
        Command::List => run_list(&mut app).await,
        Command::Create(args) => run_create(&mut app, args).await,
        Command::Update { id, fields } => run_update(&mut app, id, fields).await,
        Command::Delete { id, yes } => run_delete(&mut app, id, yes).await,
        Command::Upload { file } => run_upload(&mut app, file).await,
        Command::Template { output } => {
            let dest = output.unwrap_or(config.template_path);
            let written = app.download_template(&dest).await?;
            println!("saved {written} bytes to {}", dest.display());
            Ok(())
        }
    }
}

async fn run_list(app: &mut App<HttpUserApi>) -> Result<(), CliError> {
    app.reload().await?;
    print_table(&app.table);
    Ok(())
}

async fn run_create(app: &mut App<HttpUserApi>, args: CreateArgs) -> Result<(), CliError> {
    for (field, value) in args.into_fields() {
        app.form.set_field(field, value);
    }
    submit(app).await
}

async fn run_update(app: &mut App<HttpUserApi>, id: UserId, fields: UpdateArgs) -> Result<(), CliError> {
    app.reload().await?;
    if !app.edit(id) {
        return Err(CliError::UnknownUser(id));
    }
    for (field, value) in fields.into_fields() {
        app.form.set_field(field, value);
    }
    submit(app).await
}

async fn submit(app: &mut App<HttpUserApi>) -> Result<(), CliError> {
    let result = app.submit_form().await;
    print_form_messages(&app.form);
    let record = result?;
    println!("id={}", record.id);
    Ok(())
}

async fn run_delete(app: &mut App<HttpUserApi>, id: UserId, yes: bool) -> Result<(), CliError> {
    app.reload().await?;
    let confirm = |prompt: &str| yes || ask(prompt);
    if app.delete(id, &confirm).await? {
        println!("deleted user {id}");
        print_table(&app.table);
    } else {
        println!("cancelled");
    }
    Ok(())
}

async fn run_upload(app: &mut App<HttpUserApi>, file: PathBuf) -> Result<(), CliError> {
    app.upload.select_file(file);
    let result = app.upload().await;
    print_upload_messages(&app.upload);
    result?;
    print_table(&app.table);
    Ok(())
}

/// Read a yes/no answer from stdin; anything but `y`/`yes` declines.
fn ask(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn print_form_messages(form: &FormState) {
    if let Some(success) = form.success() {
        println!("{success}");
    }
    if let Some(error) = form.error() {
        eprintln!("{error}");
    }
}

fn print_upload_messages(panel: &UploadState) {
    if let Some(message) = &panel.message {
        println!("{message}");
    }
    if !panel.errors.is_empty() {
        eprintln!("Errors:");
        for line in panel.error_lines() {
            eprintln!("  {line}");
        }
    }
}

fn print_table(table: &TableState) {
    if table.is_empty() {
        println!("{EMPTY_PLACEHOLDER}");
        return;
    }
    println!("{:<6} {:<16} {:<16} {:<28} {:<12} PAN", "ID", "First", "Last", "Email", "Phone");
    for row in table.rows() {
        println!(
            "{:<6} {:<16} {:<16} {:<28} {:<12} {}",
            row.id, row.first_name, row.last_name, row.email, row.phone, row.pan
        );
    }
}
