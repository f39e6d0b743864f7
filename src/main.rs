use devprobe::cli::{Cli, Command, PresetCommand, RequestArgs};
use devprobe::config::Config;
use devprobe::core::db::{database_registry, TestRunner};
use devprobe::core::debug_logger::{get_debug_logger, DebugLogger};
use devprobe::core::http::{ApiTestRequest, ApiTester, RequestForwarder};
use devprobe::presets::{JsonPresetStore, NewPreset, PresetRepository};
use serde::Serialize;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();

    // Handle configuration commands
    if cli.init {
        let path = Config::init()?;
        println!("Created config at {}", path.display());
        return Ok(());
    }

    if cli.print {
        let config = Config::load().unwrap_or_else(|_| Config::default());
        config.print()?;
        return Ok(());
    }

    if cli.check {
        let config = Config::load()?;
        config.check()?;
        println!("✓ Configuration valid");
        return Ok(());
    }

    let Some(command) = cli.command else {
        eprintln!("No command given. Run `devprobe --help` for usage.");
        std::process::exit(2);
    };

    let mut config = Config::load()?;
    config.check()?;
    let logger = Arc::new(get_debug_logger());

    match command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            config.check()?;
            devprobe::server::serve(&config, logger).await?;
        }
        Command::Request(args) => {
            let request = args.to_request()?;
            let checks = resolve_checks(&args);
            run_request(&config, logger, &request, &checks).await?;
        }
        Command::Db {
            connection_string,
            tests,
        } => {
            let registry = database_registry(config.database.sample_limit);
            let tests: Vec<String> = if tests.is_empty() {
                registry.names().into_iter().map(str::to_string).collect()
            } else {
                tests
            };
            let runner = TestRunner::new()
                .with_registry(registry)
                .with_connect_timeout(config.connect_timeout())
                .with_logger(logger);

            let report = runner.run(&connection_string, &tests).await?;
            print_json(&report)?;
            if !report.all_passed() {
                std::process::exit(1);
            }
        }
        Command::Preset(preset) => {
            let store = JsonPresetStore::new(config.presets_path());
            match preset {
                PresetCommand::List => print_json(&store.list()?)?,
                PresetCommand::Add { name, request } => {
                    let saved = store.add(new_preset(name, &request)?)?;
                    println!("Saved preset {} ({})", saved.name, saved.id);
                }
                PresetCommand::Remove { id } => {
                    let removed = store.remove(id)?;
                    println!("Removed preset {} ({})", removed.name, removed.id);
                }
                PresetCommand::Run { id } => {
                    let saved = store.get(id)?;
                    let checks = if saved.checks.is_empty() {
                        all_api_checks()
                    } else {
                        saved.checks.clone()
                    };
                    run_request(&config, logger, &saved.to_request(), &checks).await?;
                }
            }
        }
    }

    Ok(())
}

async fn run_request(
    config: &Config,
    logger: Arc<DebugLogger>,
    request: &ApiTestRequest,
    checks: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let forwarder = RequestForwarder::new()?.with_logger(logger);
    let tester = ApiTester::new(Arc::new(forwarder))
        .with_slow_threshold_ms(config.http.slow_threshold_ms);

    let report = tester.run(request, checks).await?;
    print_json(&report)?;
    if !report.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn resolve_checks(args: &RequestArgs) -> Vec<String> {
    if args.checks.is_empty() {
        all_api_checks()
    } else {
        args.checks.clone()
    }
}

fn all_api_checks() -> Vec<String> {
    devprobe::core::http::api_registry()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn new_preset(name: String, args: &RequestArgs) -> Result<NewPreset, Box<dyn std::error::Error>> {
    let request = args.to_request()?;
    Ok(NewPreset {
        name,
        url: request.url,
        method: request.method.unwrap_or_else(|| "GET".to_string()),
        request_body: request.body.unwrap_or_default(),
        expected_status: request.expected_status,
        headers: request.headers,
        auth: request.auth,
        checks: args.checks.clone(),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
