use clap::{Arg, ArgMatches, Command};
use dualpane_mt::{
    CommittedSnapshot, Config, CredentialProvider, Credentials, ProviderKind, ReverseInput,
    ReverseMode, reconcile_english, reconcile_japanese,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn file_arg() -> Arg {
    Arg::new("file")
        .help("Text file to reconcile")
        .required(true)
        .index(1)
}

fn cli() -> Command {
    Command::new("dualpane")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Keep an English and a Japanese text in sync")
        .subcommand_required(true)
        .subcommand(
            Command::new("en2ja")
                .about("Reconcile the Japanese text with an edited English file")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("ja2en")
                .about("Reconcile the English text with an edited Japanese file")
                .arg(file_arg()),
        )
        .arg(
            Arg::new("state")
                .long("state")
                .global(true)
                .help("Committed state carried between runs")
                .default_value(".dualpane-state.json"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML configuration file")
                .default_value("dualpane.toml"),
        )
        .arg(
            Arg::new("api-key")
                .long("api-key")
                .short('k')
                .global(true)
                .help("API key for the configured provider (overrides stored and environment keys)"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .global(true)
                .help("Use the offline mock translator")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Log per-line reconciliation decisions")
                .action(clap::ArgAction::SetTrue),
        )
}

fn load_state(path: &Path) -> Result<CommittedSnapshot, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Ok(CommittedSnapshot::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_state(path: &Path, snapshot: &CommittedSnapshot) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, serde_json::to_string_pretty(snapshot)?)?;
    Ok(())
}

fn load_config(matches: &ArgMatches) -> Result<Config, Box<dyn std::error::Error>> {
    let path = matches
        .get_one::<String>("config")
        .ok_or("missing --config")?;
    let mut config = Config::load_from_path(path)?.unwrap_or_default();
    if matches.get_flag("mock") {
        config.provider = ProviderKind::Mock;
    }
    Ok(config)
}

fn credentials(matches: &ArgMatches, provider: ProviderKind) -> Arc<dyn CredentialProvider> {
    let mut credentials = Credentials::new();
    if let (Some(key), Some(service)) = (matches.get_one::<String>("api-key"), provider.service()) {
        credentials = credentials.with_explicit(service, key);
    }
    Arc::new(credentials)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let (direction, sub) = matches.subcommand().ok_or("missing subcommand")?;
    let file = sub.get_one::<String>("file").ok_or("missing file")?;
    let state_path = PathBuf::from(
        matches
            .get_one::<String>("state")
            .ok_or("missing --state")?,
    );

    let config = load_config(&matches)?;
    let translator = config.build_translator(credentials(&matches, config.provider))?;
    let snapshot = load_state(&state_path)?;
    let text = std::fs::read_to_string(file)?;

    tracing::info!(
        provider = translator.provider_name(),
        direction,
        file = %file,
        "reconciling"
    );

    let next = match direction {
        "en2ja" => {
            let outcome = reconcile_english(&text, &snapshot, translator.as_ref()).await?;
            tracing::info!(
                mode = ?outcome.mode,
                translated = outcome.translated_lines,
                "forward reconciliation done"
            );
            println!("{}", outcome.japanese);
            outcome.snapshot
        }
        "ja2en" => {
            let input = ReverseInput::from_snapshot(&text, &snapshot);
            let outcome = reconcile_japanese(&input, translator.as_ref(), config.patch_limit).await?;
            tracing::info!(mode = ?outcome.mode, "reverse reconciliation done");
            println!("{}", outcome.english);
            match outcome.mode {
                ReverseMode::Unchanged => snapshot,
                ReverseMode::Cleared => CommittedSnapshot::default(),
                ReverseMode::Patched(_) | ReverseMode::Full => {
                    CommittedSnapshot::from_texts(&outcome.english, &text)
                }
            }
        }
        other => return Err(format!("unknown command: {}", other).into()),
    };

    save_state(&state_path, &next)?;
    Ok(())
}
