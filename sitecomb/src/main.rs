use commands::command_argument_builder;
use sitecomb_core::print_banner;
use sitecomb_crawler::AuditMode;
use tracing_subscriber::EnvFilter;

mod commands;
mod handlers;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    let result = match chosen_command.subcommand() {
        Some(("status", sub_matches)) => {
            handlers::handle_audit(sub_matches, AuditMode::Status, quiet).await
        }
        Some(("broken", sub_matches)) => handlers::handle_broken(sub_matches, quiet).await,
        Some(("readability", sub_matches)) => {
            handlers::handle_audit(sub_matches, AuditMode::Readability, quiet).await
        }
        Some(("sitemap", sub_matches)) => handlers::handle_sitemap(sub_matches, quiet).await,
        Some(("match", sub_matches)) => handlers::handle_match(sub_matches),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
