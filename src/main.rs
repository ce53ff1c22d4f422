use clap::{Args, Parser, Subcommand};
use credgate::config::{
    delete_session_token, ensure_initialized, load_config, session_token, set_session_token,
};
use credgate::error::AppError;
use credgate::logging;
use credgate::models::{CredentialField, ProviderId, SlotKind};
use credgate::params::{ParamUpdate, ParameterBlock};
use credgate::service::ConfigService;
use credgate::slot::CredentialSlot;
use credgate::store::ConfigurationStore;
use credgate::tester::TestOutcome;
use serde::Serialize;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "credgate")]
#[command(about = "Verify and save workflow and LLM provider credentials")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Init,
    /// Store the backend session token in the system keychain.
    Login {
        #[arg(long)]
        token: String,
    },
    Logout,
    Show {
        #[arg(long)]
        json: bool,
    },
    Configure(ConfigureArgs),
}

#[derive(Debug, Args)]
struct ConfigureArgs {
    #[arg(long)]
    dify_url: String,
    #[arg(long)]
    dify_key: String,
    #[arg(long, value_parser = parse_provider)]
    provider: ProviderId,
    /// Defaults to the provider's public endpoint.
    #[arg(long)]
    llm_url: Option<String>,
    #[arg(long)]
    llm_key: String,
    #[arg(long, allow_negative_numbers = true)]
    temperature: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    top_p: Option<f64>,
    #[arg(long)]
    max_tokens: Option<u32>,
    /// Test both connections but do not save.
    #[arg(long)]
    no_save: bool,
}

#[derive(Serialize)]
struct ShowView<'a> {
    dify: &'a CredentialSlot,
    generic_llm: &'a CredentialSlot,
    params: &'a ParameterBlock,
    can_save: bool,
}

fn parse_provider(raw: &str) -> Result<ProviderId, String> {
    raw.parse()
}

impl ConfigureArgs {
    fn llm_url(&self) -> &str {
        self.llm_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    fn param_update(&self) -> ParamUpdate {
        ParamUpdate {
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
        }
    }
}

/// Applies the command-line values to `store` and submits both slots.
fn apply_edits(store: &mut ConfigurationStore, args: &ConfigureArgs) -> Result<(), AppError> {
    store.select_variant(args.provider);
    let edits = [
        (SlotKind::Dify, args.dify_url.as_str(), args.dify_key.as_str()),
        (SlotKind::GenericLlm, args.llm_url(), args.llm_key.as_str()),
    ];

    let mut problems = Vec::new();
    for (kind, address, key) in edits {
        store.edit_field(kind, CredentialField::Address, address);
        store.edit_field(kind, CredentialField::Key, key);
        if !store.submit(kind).success {
            problems.extend(
                store
                    .slot(kind)
                    .field_errors()
                    .messages()
                    .into_iter()
                    .map(|m| format!("{kind} {m}")),
            );
        }
    }

    store.set_params(args.param_update());
    problems.extend(store.param_errors().messages());

    if problems.is_empty() {
        Ok(())
    } else {
        for p in &problems {
            eprintln!("error: {p}");
        }
        Err(AppError::Validation(problems.join("; ")))
    }
}

fn slot_line(slot: &CredentialSlot) -> String {
    let address = if slot.service_address().is_empty() {
        "-"
    } else {
        slot.service_address()
    };
    let mut line = format!("{:<12} {:<8} {}", slot.kind(), slot.status(), address);
    if let Some(provider) = slot.variant() {
        line.push_str(&format!(" ({provider})"));
    }
    if let Some(masked) = slot.masked_key() {
        line.push_str(&format!(" key={masked}"));
    }
    line
}

fn print_outcome(outcome: &TestOutcome) {
    let verdict = if outcome.success { "ok" } else { "failed" };
    println!(
        "{:<12} {verdict:<8} {} ({} ms)",
        outcome.slot, outcome.message, outcome.duration_ms
    );
    if let Some(models) = &outcome.models {
        println!("{:<12} {} models available", "", models.len());
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Init => {
            ensure_initialized()?;
            println!("Initialized credgate config directory.");
        }
        Commands::Login { token } => {
            if token.trim().is_empty() {
                return Err(AppError::Validation("token must not be empty".into()));
            }
            set_session_token(&token)?;
            println!("Session token stored.");
        }
        Commands::Logout => {
            delete_session_token()?;
            println!("Session token removed.");
        }
        Commands::Show { json } => {
            ensure_initialized()?;
            let cfg = load_config()?;
            logging::init(&cfg.log_level);
            let service = ConfigService::connect(&cfg, session_token())?;
            let mut store = ConfigurationStore::new();
            service.hydrate(&mut store).await?;

            if json {
                let view = ShowView {
                    dify: store.dify(),
                    generic_llm: store.generic_llm(),
                    params: store.params(),
                    can_save: store.can_save(),
                };
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("{}", slot_line(store.dify()));
                println!("{}", slot_line(store.generic_llm()));
                let params = store.params();
                println!(
                    "temperature={} top_p={} max_tokens={}",
                    params.temperature, params.top_p, params.max_tokens
                );
            }
        }
        Commands::Configure(args) => {
            ensure_initialized()?;
            let cfg = load_config()?;
            logging::init(&cfg.log_level);

            let mut scratch = ConfigurationStore::new();
            apply_edits(&mut scratch, &args)?;

            let token = session_token();
            let service = ConfigService::connect(&cfg, token.clone())?;
            let mut store = ConfigurationStore::new();
            if token.is_some() {
                service.hydrate(&mut store).await?;
            }
            apply_edits(&mut store, &args)?;

            let (dify, generic) = service.tester().test_both(&mut store).await?;
            print_outcome(&dify);
            print_outcome(&generic);

            if args.no_save {
                println!("Skipped save (--no-save).");
            } else if store.can_save() {
                let message = service.save(&mut store).await?;
                println!("{message}");
            } else {
                return Err(AppError::IncompleteConfiguration);
            }
        }
    }

    Ok(())
}
