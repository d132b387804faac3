use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("agelens")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("agelens")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("audit")
                .about(
                    "Audit one or more pages for age-inclusive accessibility and print a \
                scored report.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The URL to audit (seed of a same-domain crawl)")
                        .value_parser(clap::value_parser!(Url))
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of URLs to audit")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-p --"pages" <NUM_PAGES>)
                        .required(false)
                        .help("Maximum number of same-domain pages to audit per seed URL")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    arg!(-t --"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("20"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown")
                        .value_parser(["text", "json", "markdown"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)"),
                ),
        )
        .subcommand(
            command!("clone")
                .about(
                    "Fetch a single page and produce an age-friendly rewritten copy plus a \
                change log.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The URL to clone")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(--"scale" <FACTOR>)
                        .required(false)
                        .help("Text scale factor (1.0 - 1.6)")
                        .value_parser(clap::value_parser!(f32))
                        .default_value("1.25"),
                )
                .arg(
                    arg!(--"font-stack" <FONTS>)
                        .required(false)
                        .help("CSS font stack for the rewritten page"),
                )
                .arg(
                    arg!(--"no-underline")
                        .required(false)
                        .help("Do not force underlined links")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"no-min-targets")
                        .required(false)
                        .help("Do not enforce 44x44 touch targets")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"no-focus-outline")
                        .required(false)
                        .help("Do not add a strong focus outline")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"no-reduced-motion")
                        .required(false)
                        .help("Do not add the reduced-motion override")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-t --"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("20"),
                )
                .arg(
                    arg!(-o --"output" <DIR>)
                        .required(false)
                        .help("Directory to write the rewritten page and change log into")
                        .default_value("./agelens_clone"),
                ),
        )
        .subcommand(
            command!("batch")
                .about(
                    "Crawl same-domain pages, rewrite each one age-friendly, and write the \
                results to a directory.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("Start URL for the same-domain crawl")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-p --"pages" <NUM_PAGES>)
                        .required(false)
                        .help("Maximum number of pages to clone")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("5"),
                )
                .arg(
                    arg!(--"scale" <FACTOR>)
                        .required(false)
                        .help("Text scale factor (1.0 - 1.6)")
                        .value_parser(clap::value_parser!(f32))
                        .default_value("1.25"),
                )
                .arg(
                    arg!(-t --"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("20"),
                )
                .arg(
                    arg!(-o --"output" <DIR>)
                        .required(false)
                        .help("Directory to write cloned pages and change logs into")
                        .default_value("./agelens_batch"),
                ),
        )
}
