use colored::Colorize;

pub mod audit;
pub mod matcher;
pub mod report;

pub fn print_banner() {
    let banner = r#"
███████╗ ██╗ ████████╗ ███████╗  ██████╗  ██████╗  ███╗   ███╗ ██████╗
██╔════╝ ██║ ╚══██╔══╝ ██╔════╝ ██╔════╝ ██╔═══██╗ ████╗ ████║ ██╔══██╗
███████╗ ██║    ██║    █████╗   ██║      ██║   ██║ ██╔████╔██║ ██████╔╝
╚════██║ ██║    ██║    ██╔══╝   ██║      ██║   ██║ ██║╚██╔╝██║ ██╔══██╗
███████║ ██║    ██║    ███████╗ ╚██████╗ ╚██████╔╝ ██║ ╚═╝ ██║ ██████╔╝
╚══════╝ ╚═╝    ╚═╝    ╚══════╝  ╚═════╝  ╚═════╝  ╚═╝     ╚═╝ ╚═════╝
"#;

    println!("{}", banner.cyan());
    println!(
        "  {} {}",
        "SEO and content auditing crawler".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!();
}
