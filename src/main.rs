use anyhow::Context;
use clap::Parser;
use precast_tracker::adapters::{qr, report};
use precast_tracker::core::lifecycle;
use precast_tracker::core::stats::{to_rows, StatusStat};
use precast_tracker::core::{ComponentApi, ConfigProvider};
use precast_tracker::utils::error::{ErrorSeverity, Result};
use precast_tracker::utils::{logger, validation};
use precast_tracker::{
    CliConfig, Command, HttpComponentApi, LocalStorage, Session, StatusService, TomlConfig,
};
use std::fmt::Display;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli.command);

    let provider: Box<dyn ConfigProvider> = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let config = TomlConfig::from_file(path)
                .with_context(|| format!("failed to load config file '{}'", path))?;
            Box::new(config)
        }
        None => Box::new(cli.clone()),
    };

    if let Err(e) = validation::validate_provider(provider.as_ref()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let api = HttpComponentApi::from_config(provider.as_ref())
        .context("failed to build API client")?;
    let service = StatusService::new(api);

    if let Err(e) = run(&cli, provider.as_ref(), &service).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run<A: ComponentApi>(
    cli: &CliConfig,
    provider: &dyn ConfigProvider,
    service: &StatusService<A>,
) -> Result<()> {
    match &cli.command {
        Command::Advance { id } => {
            let session = session(cli, provider, service).await?;
            let component = service.advance(id, &session).await?;
            println!("✅ {} ({}) is now {}", component.name, component.id, component.status);
        }
        Command::Reject { id } => {
            let session = session(cli, provider, service).await?;
            let component = service.reject(id, &session).await?;
            println!("✅ {} ({}) rejected", component.name, component.id);
        }
        Command::Actions { id } => {
            let session = session(cli, provider, service).await?;
            let component = service.api().fetch_component(id).await?;
            let actions = lifecycle::available_actions(&component, session.actor());
            println!("{} ({}): {}", component.name, component.id, component.status);
            match actions.advance_to {
                Some(next) => println!("  advance -> {}", next),
                None => println!("  advance: not available"),
            }
            println!(
                "  reject: {}",
                if actions.can_reject { "available" } else { "not available" }
            );
        }
        Command::History { id } => {
            let component = service.api().fetch_component(id).await?;
            println!("{} ({}): {}", component.name, component.id, component.status);
            let history = component.history();
            if history.is_empty() {
                println!("  no recorded status changes");
            }
            for entry in history {
                println!("  {}  {}", entry.timestamp.format("%Y-%m-%d %H:%M"), entry.status);
            }
        }
        Command::Projects => {
            let session = session(cli, provider, service).await?;
            for project in service.visible_projects(&session).await? {
                println!(
                    "{:<6} {:<10} {}",
                    project.id,
                    project.code.as_deref().unwrap_or("-"),
                    project.name
                );
            }
        }
        Command::Move {
            id,
            from,
            to,
            quantity,
        } => {
            session(cli, provider, service).await?;
            let quantity = precast_tracker::core::ledger::parse_quantity(quantity)?;
            let ledger = service
                .move_quantity(id, *from, *to, quantity as i64)
                .await?;
            println!("✅ {} (total {})", ledger.name, ledger.total);
            for (status, count) in ledger.statuses.iter() {
                println!("  {:<13} {}", status, count);
            }
        }
        Command::Stats { project, aggregate } => {
            if let Some(project_id) = project {
                let session = session(cli, provider, service).await?;
                print_stats(&service.project_stats(project_id, &session).await?);
            } else if let Some(aggregate_id) = aggregate {
                print_stats(&service.aggregate_stats(aggregate_id).await?);
            }
        }
        Command::Report { project } => {
            let session = session(cli, provider, service).await?;
            let storage = LocalStorage::new(provider.output_path().to_string());
            let location = service
                .write_project_report(project, &session, &storage)
                .await?;
            println!("📁 Report saved to: {}", location);
        }
        Command::Qr { id, project } => {
            let link = qr::component_link(provider.qr_link_base(), id)?;
            println!("{}", link);

            if let Some(project_id) = project {
                let session = session(cli, provider, service).await?;
                let project = service.open_project(project_id, &session).await?;
                let component = service.api().fetch_component(id).await?;
                let section = component
                    .section_id
                    .as_deref()
                    .and_then(|section_id| project.section(section_id));
                for line in qr::label_lines(&project, section, &component) {
                    println!("{}", line);
                }
            }
        }
    }

    Ok(())
}

async fn session<A: ComponentApi>(
    cli: &CliConfig,
    provider: &dyn ConfigProvider,
    service: &StatusService<A>,
) -> Result<Session> {
    let username = cli.username.clone().or_else(|| provider.username().map(str::to_string));
    let username = validation::validate_required_field("session.username", &username)?;
    service.verify_user(username).await
}

fn print_stats<S: Display>(stats: &[StatusStat<S>]) {
    println!("{:<13} {:>7} {:>8}", report::HEADER[0], report::HEADER[1], report::HEADER[2]);
    for [status, count, percent] in to_rows(stats) {
        println!("{:<13} {:>7} {:>7}%", status, count, percent);
    }
}
