mod error;
mod signup;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use log::{debug, info};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use verdict::prelude::*;

use crate::error::CliError;
use crate::signup::Signup;

const EMBEDDED_MESSAGES: &str = include_str!("../messages.json");

/// Delay between simulated keystrokes.
const KEYSTROKE: Duration = Duration::from_millis(80);

/// Debounce applied while the user is typing.
const DEBOUNCE: Duration = Duration::from_millis(300);

/// Walks a signup form through submit, debounced typing and resubmit
#[derive(Parser, Debug)]
#[command(name = "verdict")]
#[command(version, about, long_about = None)]
struct Args {
    /// Message catalog to load instead of the embedded one
    catalog: Option<PathBuf>,

    /// Log job promotion and settlement
    #[arg(short, long)]
    verbose: bool,
}

fn load_catalog(path: Option<&Path>) -> Result<MessageCatalog, CliError> {
    match path {
        Some(path) => Ok(MessageCatalog::load(path)?),
        None => Ok(MessageCatalog::from_json(EMBEDDED_MESSAGES)?),
    }
}

fn report(title: &str, validator: &Validator<Signup>, catalog: &MessageCatalog) {
    println!("{} [{}]", title, validator.kind());
    for (field, state) in validator.fields() {
        let message = validator
            .message(field, catalog, MessageOptions::new())
            .unwrap_or_else(|| if state.passed() { "ok".into() } else { String::new() });
        println!("  {:<10} {:<12} {}", field, state.kind().as_str(), message);
    }
}

/// Types `text` into the email field one character at a time, debounced.
async fn type_email(
    driver: &mut Driver,
    mut validator: Validator<Signup>,
    record: &mut Signup,
    text: &str,
) -> Validator<Signup> {
    for ch in text.chars() {
        record.email.push(ch);
        debug!("Typed {:?}", record.email);
        validator = validator.validate_with(record, ValidateRequest::field("email").delay(DEBOUNCE));
        validator = driver.step(&validator);
        tokio::time::sleep(KEYSTROKE).await;
    }
    validator
}

async fn run(args: Args) -> Result<(), CliError> {
    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    let catalog = load_catalog(args.catalog.as_deref())?;
    info!("Loaded {} messages", catalog.len());

    let mut driver = Driver::new()?;
    let config = ValidatorConfig::default().with_cancel_policy(CancelPolicy::Abort);
    let validator = Validator::with_config(signup::schema(), config);

    let mut record = Signup {
        name: "a1!".into(),
        password: "hunter2".into(),
        password_confirmation: "hunter3".into(),
        ..Signup::default()
    };

    let submitted = driver.settle(validator.validate(&record)).await;
    report("First submit", &submitted, &catalog);

    record.email.clear();
    let typed = type_email(&mut driver, submitted, &mut record, "ada@example.com").await;
    let typed = driver.settle(typed).await;
    report("After typing a taken email", &typed, &catalog);

    record = Signup {
        name: "Ada".into(),
        email: "lovelace@example.com".into(),
        password: "correct horse".into(),
        password_confirmation: "correct horse".into(),
        accept: true,
    };
    let fixed = driver.settle(typed.validate(&record)).await;
    report("Second submit", &fixed, &catalog);

    if fixed.any_error() {
        info!("Form still has errors");
    } else {
        info!("Form is valid");
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Args::parse()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
