use std::io;
use std::sync::Arc;

use clap::ArgMatches;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use bods_poll_core::config::BodsConfig;
use bods_poll_core::dqs::{self, DEFAULT_RESOURCE_CLASS};
use bods_poll_core::events;
use bods_poll_core::http::{CsrfStrategy, HttpClient};
use bods_poll_core::observations::{
    self, BulkSuppressRequest, ObservationRow, ObservationScope, RowSuppressRequest,
};
use bods_poll_core::poller::{self, PollReport};
use bods_poll_core::timeout::{
    CsrfKeepAlive, JsonTimeoutView, SessionTimeout, TextTimeoutView, TimeoutView,
};
use bods_poll_core::view::{ArcView, BarView, JsonView, StatusView};
use bods_poll_core::{PageContext, SessionStatus};

/// Arc geometry of the dataset list spinner.
const ARC_CENTER: f64 = 25.0;
const ARC_STROKE_WIDTH: f64 = 5.0;

type BoxedView = Box<dyn StatusView + Send>;

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
fn load_config_with_warning() -> BodsConfig {
    match BodsConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.bods/config.toml and ./.bods/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            BodsConfig::default()
        }
    }
}

/// Load config and apply the global CLI overrides on top.
fn load_config(matches: &ArgMatches) -> Result<BodsConfig, Box<dyn std::error::Error>> {
    let mut config = load_config_with_warning();

    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.portal.base_url = Some(base_url.clone());
    }
    if let Some(cookie) = matches.get_one::<String>("cookie") {
        config.portal.cookie = Some(cookie.clone());
    }
    if let Some(interval_ms) = matches.get_one::<u64>("interval-ms") {
        config.poll.interval_ms = Some(*interval_ms);
        config.poll.dqs_interval_ms = Some(*interval_ms);
    }
    if let Some(timeout_ms) = matches.get_one::<u64>("request-timeout-ms") {
        config.poll.request_timeout_ms = Some(*timeout_ms);
    }
    if matches.get_flag("sequencing") {
        config.poll.sequencing = Some(true);
    }

    config.validate()?;
    Ok(config)
}

/// Page the widget is embedded in. Defaults to the dataset list.
fn page_context(
    matches: &ArgMatches,
    config: &BodsConfig,
) -> Result<PageContext, Box<dyn std::error::Error>> {
    let url = match matches.get_one::<String>("page-url") {
        Some(url) => url.clone(),
        None => format!("{}/dataset/", config.portal.base_url().trim_end_matches('/')),
    };
    Ok(PageContext::parse(&url)?)
}

fn make_view(matches: &ArgMatches, label: &str) -> BoxedView {
    match matches.get_one::<String>("format").map(String::as_str) {
        Some("arc") => Box::new(ArcView::new(io::stdout(), ARC_CENTER, ARC_STROKE_WIDTH)),
        Some("json") => Box::new(JsonView::new(io::stdout(), label)),
        _ => Box::new(BarView::new(io::stdout(), label)),
    }
}

fn runtime() -> io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

/// Parse a `SERVICE_CODE=LINE_NAME` row argument.
fn parse_row(value: &str) -> Result<ObservationRow, String> {
    match value.split_once('=') {
        Some((service_code, line_name)) if !service_code.is_empty() && !line_name.is_empty() => {
            Ok(ObservationRow {
                service_code: service_code.to_string(),
                line_name: line_name.to_string(),
            })
        }
        _ => Err(format!(
            "Invalid row '{}'. Expected SERVICE_CODE=LINE_NAME",
            value
        )),
    }
}

/// Turn a finished session into the process result.
fn report_result(report: &PollReport) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = &report.outcome;
    events::log_session_outcome(outcome);
    match outcome.status {
        SessionStatus::Succeeded => Ok(()),
        SessionStatus::Failed => Err(format!("{} failed", outcome.session).into()),
        _ => match &outcome.cause {
            Some(cause) => {
                Err(format!("{} ended in an unknown state: {}", outcome.session, cause).into())
            }
            None => Err(format!("{} ended in an unknown state", outcome.session).into()),
        },
    }
}

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    let result = match matches.subcommand() {
        Some(("watch", sub_matches)) => handle_watch_command(matches, sub_matches),
        Some(("list", sub_matches)) => handle_list_command(matches, sub_matches),
        Some(("dqs", sub_matches)) => handle_dqs_command(matches, sub_matches),
        Some(("suppress", sub_matches)) => handle_suppress_command(matches, sub_matches),
        Some(("session-timeout", sub_matches)) => {
            handle_session_timeout_command(matches, sub_matches)
        }
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };

    if let Err(e) = &result {
        events::log_app_error(&**e);
    }
    events::log_app_shutdown();
    result
}

fn handle_watch_command(
    matches: &ArgMatches,
    sub_matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset_id = sub_matches
        .get_one::<String>("dataset")
        .ok_or("Dataset argument is required")?;

    let config = load_config(matches)?;
    let page = page_context(matches, &config)?;

    info!(event = "cli.watch_started", dataset_id = dataset_id);

    let session = match poller::dataset_session(dataset_id, &config.poll, page) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("❌ Failed to watch dataset '{}': {}", dataset_id, e);
            error!(event = "cli.watch_failed", dataset_id = dataset_id, error = %e);
            events::log_bods_error(&e);
            return Err(e.into());
        }
    };

    let client = Arc::new(HttpClient::from_config(&config)?);
    let mut view = make_view(matches, session.name());
    let report = runtime()?.block_on(session.run(client, &mut view));

    info!(
        event = "cli.watch_completed",
        dataset_id = dataset_id,
        status = %report.outcome.status,
        requests = report.requests
    );

    report_result(&report)
}

fn handle_list_command(
    matches: &ArgMatches,
    sub_matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset_ids: Vec<String> = sub_matches
        .get_many::<String>("datasets")
        .ok_or("At least one dataset id is required")?
        .cloned()
        .collect();

    let config = load_config(matches)?;
    let page = page_context(matches, &config)?;

    info!(event = "cli.list_started", count = dataset_ids.len());

    let mut sessions = Vec::with_capacity(dataset_ids.len());
    for dataset_id in &dataset_ids {
        let session = poller::dataset_session(dataset_id, &config.poll, page.clone())?;
        let view = make_view(matches, session.name());
        sessions.push((session, view));
    }

    let client = Arc::new(HttpClient::from_config(&config)?);
    let reports = runtime()?.block_on(poller::run_all(sessions, client));

    let mut failed = Vec::new();
    for (report, _view) in &reports {
        events::log_session_outcome(&report.outcome);
        if report.outcome.status != SessionStatus::Succeeded {
            failed.push(format!("{} ({})", report.outcome.session, report.outcome.status));
        }
    }

    info!(
        event = "cli.list_completed",
        count = reports.len(),
        failed = failed.len()
    );

    if failed.is_empty() {
        Ok(())
    } else {
        eprintln!("❌ {} of {} datasets did not succeed:", failed.len(), reports.len());
        for entry in &failed {
            eprintln!("   {}", entry);
        }
        Err(format!("{} dataset(s) did not succeed", failed.len()).into())
    }
}

fn handle_dqs_command(
    matches: &ArgMatches,
    sub_matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let revision_id = *sub_matches
        .get_one::<u64>("revision")
        .ok_or("Revision argument is required")?;
    let resource_class = sub_matches
        .get_one::<String>("resource-class")
        .map(String::as_str)
        .unwrap_or(DEFAULT_RESOURCE_CLASS);

    let config = load_config(matches)?;
    let page = page_context(matches, &config)?;

    info!(
        event = "cli.dqs_started",
        revision_id = revision_id,
        resource_class = resource_class
    );

    let session = dqs::dqs_session(&config, resource_class, revision_id, page)?;
    let client = Arc::new(HttpClient::from_config(&config)?);
    let mut view = make_view(matches, session.name());
    let report = runtime()?.block_on(session.run(client, &mut view));

    info!(
        event = "cli.dqs_completed",
        revision_id = revision_id,
        status = %report.outcome.status
    );

    report_result(&report)
}

/// Where a suppress command sends its requests.
#[derive(Debug)]
enum SuppressTarget {
    /// The review page's own `suppress-observation/` endpoint.
    Page {
        page: PageContext,
        is_detail: bool,
        is_feedback: bool,
        row_id: Option<u64>,
        all: bool,
    },
    /// The data host's app API, one request per row.
    DataHost(ObservationScope),
}

fn suppress_target(
    matches: &ArgMatches,
    sub_matches: &ArgMatches,
    check: &str,
) -> Result<SuppressTarget, Box<dyn std::error::Error>> {
    let all = sub_matches.get_flag("all");
    let is_detail = sub_matches.get_flag("detail");
    let is_feedback = sub_matches.get_flag("feedback");
    let row_id = sub_matches.get_one::<u64>("row-id").copied();

    if let Some(url) = matches.get_one::<String>("page-url") {
        return Ok(SuppressTarget::Page {
            page: PageContext::parse(url)?,
            is_detail,
            is_feedback,
            row_id,
            all,
        });
    }

    if all || is_detail || is_feedback || row_id.is_some() {
        return Err("--all, --feedback, --detail and --row-id need --page-url".into());
    }
    Ok(SuppressTarget::DataHost(ObservationScope {
        organisation_id: *sub_matches
            .get_one::<u64>("organisation")
            .ok_or("Organisation argument is required without --page-url")?,
        revision_id: *sub_matches
            .get_one::<u64>("revision")
            .ok_or("Revision argument is required without --page-url")?,
        report_id: *sub_matches
            .get_one::<u64>("report")
            .ok_or("Report argument is required without --page-url")?,
        check: check.to_string(),
    }))
}

fn handle_suppress_command(
    matches: &ArgMatches,
    sub_matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let check = sub_matches
        .get_one::<String>("check")
        .ok_or("Check argument is required")?
        .clone();
    let target = suppress_target(matches, sub_matches, &check)?;
    let rows = match sub_matches.get_many::<String>("row") {
        Some(values) => values
            .map(|value| parse_row(value))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    let is_suppressed = !sub_matches.get_flag("restore");

    match &target {
        SuppressTarget::Page { all: true, .. } => {}
        SuppressTarget::Page { row_id: Some(_), .. } if rows.len() != 1 => {
            return Err("--row-id needs exactly one --row".into());
        }
        _ if rows.is_empty() => {
            return Err("At least one row is required (or --all with --page-url)".into());
        }
        _ => {}
    }

    let mut config = load_config(matches)?;
    if let Some(strategy) = sub_matches.get_one::<String>("csrf") {
        config.csrf.strategy = Some(strategy.clone());
    }
    let strategy = CsrfStrategy::from_config(&config.csrf)?;

    info!(
        event = "cli.suppress_started",
        rows = rows.len(),
        is_suppressed = is_suppressed,
        csrf_strategy = strategy.kind()
    );

    let rt = runtime()?;
    let client = rt.block_on(async {
        let client = HttpClient::from_config(&config)?;
        let token = client
            .resolve_csrf(&strategy, config.csrf.form_path())
            .await?;
        Ok::<_, Box<dyn std::error::Error>>(client.with_csrf_token(token))
    })?;

    let results = match target {
        SuppressTarget::Page {
            page,
            is_detail,
            is_feedback,
            all: true,
            ..
        } => {
            // The page derives the direction from the label it currently shows.
            let shown = observations::bulk_button_label(&[!is_suppressed]);
            let request = BulkSuppressRequest::from_button(check.as_str(), shown, is_feedback);
            rt.block_on(observations::suppress_check(&client, &page, is_detail, &request))?;
            println!("{}: {}", check, observations::bulk_button_label(&[is_suppressed]));
            info!(event = "cli.suppress_completed", rows = 0, failed = 0);
            return Ok(());
        }
        SuppressTarget::Page {
            page,
            is_detail,
            is_feedback,
            row_id,
            ..
        } => rt.block_on(async {
            let mut results = Vec::with_capacity(rows.len());
            for row in &rows {
                let request = RowSuppressRequest {
                    service_code: row.service_code.clone(),
                    line_name: row.line_name.clone(),
                    check: check.clone(),
                    is_suppressed,
                    is_feedback,
                    row_id,
                };
                let result = observations::suppress_row(&client, &page, is_detail, &request).await;
                results.push((row.clone(), result));
            }
            results
        }),
        SuppressTarget::DataHost(scope) => {
            rt.block_on(observations::suppress_all(&client, &scope, &rows, is_suppressed))
        }
    };

    let mut states = Vec::with_capacity(results.len());
    let mut failures = 0;
    for (row, result) in &results {
        match result {
            Ok(_) => {
                states.push(is_suppressed);
                println!(
                    "{} {}: {}",
                    row.service_code,
                    row.line_name,
                    observations::row_label(is_suppressed)
                );
            }
            Err(e) => {
                failures += 1;
                states.push(!is_suppressed);
                eprintln!("❌ {} {}: {}", row.service_code, row.line_name, e);
            }
        }
    }
    println!("{}", observations::bulk_button_label(&states));

    info!(
        event = "cli.suppress_completed",
        rows = results.len(),
        failed = failures
    );

    if failures == 0 {
        Ok(())
    } else {
        Err(format!("{} of {} rows failed", failures, results.len()).into())
    }
}

fn make_timeout_view(matches: &ArgMatches) -> Box<dyn TimeoutView> {
    match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => Box::new(JsonTimeoutView::new(io::stdout())),
        Some("arc") => {
            eprintln!("Warning: the arc format has no countdown; using text.");
            Box::new(TextTimeoutView::new(io::stdout()))
        }
        _ => Box::new(TextTimeoutView::new(io::stdout())),
    }
}

fn handle_session_timeout_command(
    matches: &ArgMatches,
    sub_matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let auto_extend = sub_matches.get_flag("auto-extend");
    let config = load_config(matches)?;
    let countdown = SessionTimeout::from_config(&config)?.with_auto_extend(auto_extend);
    // The CSRF token is fetched on the first extension, not up front.
    let keep_alive = Arc::new(CsrfKeepAlive::from_config(&config)?);
    let mut view = make_timeout_view(matches);

    info!(event = "cli.session_timeout_started", auto_extend = auto_extend);
    eprintln!("Press Enter to stay signed in.");

    let rt = runtime()?;
    let report = rt.block_on(async {
        let handle = countdown.handle();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(_)) = lines.next_line().await {
                if !handle.extend() {
                    break;
                }
            }
        });

        countdown.run(keep_alive, view.as_mut()).await
    });
    // The stdin reader never finishes on its own.
    rt.shutdown_background();

    info!(
        event = "cli.session_timeout_completed",
        extensions = report.extensions
    );
    Ok(())
}
