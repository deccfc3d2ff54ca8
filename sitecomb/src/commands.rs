use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitecomb")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitecomb")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and progress output").required(false))
        .subcommand_required(false)
        .subcommand(
            crawl_arguments(
                command!("status")
                    .about("Audit the HTTP status code of every page reachable from a seed URL"),
            )
            .arg(
                arg!(-o --"output" <PATH>)
                    .required(false)
                    .help("Save the report to a file (default: print to screen)"),
            )
            .arg(
                arg!(-f --"format" <FORMAT>)
                    .required(false)
                    .help("Report format: csv, json, text")
                    .value_parser(["csv", "json", "text"])
                    .default_value("csv"),
            ),
        )
        .subcommand(
            crawl_arguments(
                command!("broken")
                    .about("Crawl a site and list only the pages that answer 404 Not Found"),
            )
            .arg(
                arg!(-o --"output" <PATH>)
                    .required(false)
                    .help("Save the broken page list to a file, one URL per line"),
            ),
        )
        .subcommand(
            crawl_arguments(command!("readability").about(
                "Score the Flesch-Kincaid reading grade level of every page's visible text",
            ))
            .arg(
                arg!(-o --"output" <PATH>)
                    .required(false)
                    .help("Save the report to a file (default: print to screen)"),
            )
            .arg(
                arg!(-f --"format" <FORMAT>)
                    .required(false)
                    .help("Report format: csv, json, text")
                    .value_parser(["csv", "json", "text"])
                    .default_value("csv"),
            ),
        )
        .subcommand(
            crawl_arguments(
                command!("sitemap")
                    .about("Crawl a site and emit a sitemap-protocol XML document"),
            )
            .arg(
                arg!(-o --"output" <PATH>)
                    .required(false)
                    .help("File to write the sitemap to")
                    .default_value("sitemap.xml"),
            ),
        )
        .subcommand(
            command!("match")
                .about(
                    "Match staging URLs to their closest public URLs by keyword similarity, \
                for building redirect maps.",
                )
                .arg(
                    arg!(-i --"input" <CSV>)
                        .required(true)
                        .help("CSV file whose first two columns are staging and public URLs"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the match table to a file (default: print to screen)"),
                ),
        )
}

fn crawl_arguments(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-u --"url" <URL>)
            .required(true)
            .help("The seed URL to crawl"),
    )
    .arg(
        arg!(--"delay" <SECONDS>)
            .required(false)
            .help("Politeness delay between requests in seconds (0 disables)")
            .value_parser(clap::value_parser!(u64))
            .default_value("1"),
    )
    .arg(
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Request timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("5"),
    )
    .arg(
        arg!(--"max-pages" <COUNT>)
            .required(false)
            .help("Stop the crawl after visiting this many pages")
            .value_parser(clap::value_parser!(usize)),
    )
    .arg(
        arg!(--"skip-ext" <EXTENSIONS>)
            .required(false)
            .help("Comma-separated resource extensions to skip (an empty string disables skipping)")
            .default_value(".pdf,.jpg,.jpeg,.png,.gif,.css,.js"),
    )
}
