use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("bods-poll")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watch long-running Bus Open Data Service jobs from the terminal")
        .long_about("bods-poll polls the BODS publish portal for dataset upload progress, data quality review status and session expiry, and renders each widget as a progress bar, an SVG arc or JSON lines.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("Portal base URL (overrides config)")
                .global(true),
        )
        .arg(
            Arg::new("cookie")
                .long("cookie")
                .help("Cookie header carrying the portal session (overrides config)")
                .global(true),
        )
        .arg(
            Arg::new("page-url")
                .long("page-url")
                .help("Page the widget lives on; its 'tab' parameter controls view links")
                .global(true),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("How to render progress")
                .value_parser(["bar", "arc", "json"])
                .default_value("bar")
                .global(true),
        )
        .arg(
            Arg::new("interval-ms")
                .long("interval-ms")
                .help("Polling interval in milliseconds (overrides config)")
                .value_parser(clap::value_parser!(u64))
                .global(true),
        )
        .arg(
            Arg::new("request-timeout-ms")
                .long("request-timeout-ms")
                .help("Per-request timeout in milliseconds (overrides config, default: none)")
                .value_parser(clap::value_parser!(u64))
                .global(true),
        )
        .arg(
            Arg::new("sequencing")
                .long("sequencing")
                .help("Drop responses older than the newest one already applied")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("watch")
                .about("Follow one dataset upload until it finishes")
                .arg(
                    Arg::new("dataset")
                        .help("Numeric dataset id")
                        .required(true)
                        .index(1)
                )
        )
        .subcommand(
            Command::new("list")
                .about("Follow several dataset uploads at once")
                .arg(
                    Arg::new("datasets")
                        .help("Numeric dataset ids")
                        .required(true)
                        .num_args(1..)
                        .index(1)
                )
        )
        .subcommand(
            Command::new("dqs")
                .about("Wait for a data quality report to finish generating")
                .arg(
                    Arg::new("revision")
                        .help("Revision id")
                        .required(true)
                        .value_parser(clap::value_parser!(u64))
                        .index(1)
                )
                .arg(
                    Arg::new("resource-class")
                        .long("resource-class")
                        .help("API resource the revision belongs to (default: dataset_revision)")
                )
        )
        .subcommand(
            Command::new("suppress")
                .about("Suppress or restore observations in a review table")
                .long_about("Suppress or restore observations in a review table. With --page-url the request goes to the review page's own suppress-observation endpoint; otherwise each row is sent to the data host's app API, which needs --organisation, --revision and --report.")
                .arg(
                    Arg::new("organisation")
                        .long("organisation")
                        .help("Organisation id (data host API only)")
                        .value_parser(clap::value_parser!(u64))
                )
                .arg(
                    Arg::new("revision")
                        .long("revision")
                        .help("Revision id (data host API only)")
                        .value_parser(clap::value_parser!(u64))
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .help("Report id (data host API only)")
                        .value_parser(clap::value_parser!(u64))
                )
                .arg(
                    Arg::new("check")
                        .long("check")
                        .help("Observation check name")
                        .required(true)
                )
                .arg(
                    Arg::new("row")
                        .long("row")
                        .help("Service line as SERVICE_CODE=LINE_NAME (repeatable)")
                        .action(ArgAction::Append)
                        .conflicts_with("all")
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help("Send one request for every row of the check (needs --page-url)")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("restore")
                        .long("restore")
                        .help("Restore the rows instead of suppressing them")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("feedback")
                        .long("feedback")
                        .help("Target feedback entries instead of observations (needs --page-url)")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("detail")
                        .long("detail")
                        .help("The page sits one level below the report (needs --page-url)")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("row-id")
                        .long("row-id")
                        .help("Row identifier on a detail page; needs exactly one --row")
                        .value_parser(clap::value_parser!(u64))
                        .requires("row")
                )
                .arg(
                    Arg::new("csrf")
                        .long("csrf")
                        .help("Where to read the CSRF token from (overrides config)")
                        .value_parser(["cookie", "field"])
                )
        )
        .subcommand(
            Command::new("session-timeout")
                .about("Count down to session expiry")
                .arg(
                    Arg::new("auto-extend")
                        .long("auto-extend")
                        .help("Extend the session whenever the warning appears")
                        .action(ArgAction::SetTrue)
                )
        )
}
