//! app-rollout - iOS app deployment reporting for Jamf Pro
//!
//! Usage:
//!   app-rollout report --appname "Retail App"                 # catalog version, conventional group
//!   app-rollout report --appname "Retail App" --appversion 2.0 --smartdevicegroup "Pilot iPads"
//!   app-rollout report --appname "Retail App" --email         # also email report + log
//!   app-rollout report --appname "Retail App" -f csv > out.csv  # spreadsheet of device results
//!   app-rollout app --appname "Retail App"                    # show the catalog entry

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use rollout_core::commands::{AppLookupCommand, ReportCommand, ReportOptions};
use rollout_core::config::{ConfigError, ConfigStore, JamfOverrides};
use rollout_core::context::AppContext;
use rollout_core::error::RolloutError;
use rollout_core::logging::LogSink;
use rollout_core::notify::{deliver_best_effort, email_subject};
use rollout_core::report::{
    action_label, device_columns, header_lines, render_csv, render_json, render_text,
    status_text, summary_line, table_header,
};
use rollout_core::status::{Classification, DeploymentReport, RecommendedAction, ResolverOptions};
use rollout_core::types::AppRecord;

const EXIT_DIRECTORY: i32 = 2;
const EXIT_CONFIG: i32 = 3;

#[derive(Parser)]
#[command(name = "app-rollout")]
#[command(about = "Produce iOS app deployment reporting using Jamf Pro", long_about = None)]
struct Cli {
    /// Jamf Server URL
    #[arg(long = "jamfserver", global = true)]
    jamf_server: Option<String>,

    /// Jamf Server Username
    #[arg(long = "jamfuser", global = true)]
    jamf_user: Option<String>,

    /// Jamf Server Password
    #[arg(long = "jamfpass", global = true)]
    jamf_pass: Option<String>,

    /// Config file (defaults to <config dir>/app-rollout/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debugging output
    #[arg(long, global = true, overrides_with = "no_debug")]
    debug: bool,

    /// Disable debugging output
    #[arg(long = "no-debug", global = true, overrides_with = "debug")]
    no_debug: bool,

    /// Append-only log file for this run
    #[arg(long, global = true, default_value = "app_rollout.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report deployment status of an app across a device group
    Report(ReportArgs),

    /// Show the catalog entry for an app
    App {
        /// iOS App Name
        #[arg(long = "appname")]
        app_name: String,

        /// Resolve against a JSON directory snapshot instead of Jamf
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct ReportArgs {
    /// iOS App Name
    #[arg(long = "appname")]
    app_name: String,

    /// iOS App Version (defaults to the catalog version)
    #[arg(long = "appversion")]
    app_version: Option<String>,

    /// Minimum Required iOS Version
    #[arg(long = "mininumiosversion")]
    minimum_ios_version: Option<String>,

    /// App Bundle Identifier
    #[arg(long = "bundleidentifier")]
    bundle_identifier: Option<String>,

    /// Smart Device Group (defaults to "<app> Deployment Group <version>")
    #[arg(long = "smartdevicegroup")]
    smart_device_group: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    format: ReportFormat,

    /// Email the report and run log to the configured recipient
    #[arg(long)]
    email: bool,

    /// Resolve against a JSON directory snapshot instead of Jamf
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Treat an unreadable app listing as "app not found"
    #[arg(long)]
    tolerate_missing_app_list: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum, Default)]
enum ReportFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// Only print the recommended action
    Quiet,
    /// One spreadsheet row per device
    Csv,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// Only print the recommended action
    Quiet,
}

impl Cli {
    fn debug_enabled(&self) -> bool {
        self.debug && !self.no_debug
    }

    fn overrides(&self) -> JamfOverrides {
        JamfOverrides {
            server: self.jamf_server.clone(),
            user: self.jamf_user.clone(),
            password: self.jamf_pass.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let sink = LogSink::new();
    let _guard = init_tracing(cli.debug_enabled(), &cli.log_file, &sink);

    if cli.debug_enabled() {
        tracing::debug!("Debug logging enabled.");
    }

    if let Err(err) = run(cli, &sink) {
        tracing::error!("{:#}", err);
        std::process::exit(exit_code(&err));
    }
}

/// Console (stderr), append-only file and in-memory capture layers.
fn init_tracing(debug: bool, log_file: &Path, sink: &LogSink) -> Option<WorkerGuard> {
    let default_directive = if debug {
        "rollout_core=debug,app_rollout=debug,info"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let (file_writer, guard) = match open_log_file(log_file) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        Err(e) => {
            eprintln!(
                "{} Failed to open log file {}: {}",
                style("Warning:").yellow().bold(),
                log_file.display(),
                e
            );
            (None, None)
        }
    };

    let file_layer = file_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(sink.clone())
                .with_ansi(false)
                .with_target(false),
        )
        .init();

    guard
}

fn open_log_file(log_file: &Path) -> Result<RollingFileAppender> {
    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = log_file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log file name: {}", log_file.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)?;
    Ok(appender)
}

fn run(cli: Cli, sink: &LogSink) -> Result<()> {
    let store = match &cli.config {
        Some(path) => ConfigStore::from_path(path),
        None => ConfigStore::from_default_location().map_err(config_error)?,
    };
    let ctx = AppContext::load(&store, cli.overrides()).map_err(config_error)?;

    match cli.command {
        Commands::Report(args) => run_report(&ctx, args, sink),
        Commands::App {
            app_name,
            snapshot,
            format,
        } => run_app(&ctx, &app_name, snapshot.as_deref(), format),
    }
}

fn run_report(ctx: &AppContext, args: ReportArgs, sink: &LogSink) -> Result<()> {
    let result = resolve_report(ctx, &args);

    // The log is mailed whether or not resolution succeeded
    if args.email {
        let (subject, body) = report_email(&args, &result, &sink.contents());
        match ctx.mail_notifier(subject) {
            Ok(notifier) => {
                deliver_best_effort(&notifier, &body);
            }
            Err(err) => tracing::error!(
                "Unable to email log file because email is not properly set up: {}",
                err
            ),
        }
    }

    let report = result?;
    match args.format {
        ReportFormat::Table => print_table(&report),
        ReportFormat::Json => println!("{}", render_json(&report)?),
        ReportFormat::Quiet => println!("{}", action_label(report.action())),
        ReportFormat::Csv => print!("{}", render_csv(&report)?),
    }
    Ok(())
}

fn resolve_report(ctx: &AppContext, args: &ReportArgs) -> Result<DeploymentReport> {
    let directory = ctx.directory(args.snapshot.as_deref())?;

    let mut options = ReportOptions::new(&args.app_name).with_resolver_options(ResolverOptions {
        tolerate_missing_app_list: args.tolerate_missing_app_list,
    });
    if let Some(version) = &args.app_version {
        options = options.with_version(version);
    }
    if let Some(group) = &args.smart_device_group {
        options = options.with_group(group);
    }
    if let Some(min_os) = &args.minimum_ios_version {
        options = options.with_minimum_os_version(min_os);
    }
    if let Some(bundle_id) = &args.bundle_identifier {
        options = options.with_bundle_identifier(bundle_id);
    }

    Ok(ReportCommand::new(directory).execute(&options)?)
}

/// Subject and body for the `--email` message.
fn report_email(
    args: &ReportArgs,
    result: &Result<DeploymentReport>,
    log: &str,
) -> (String, String) {
    let version = match result {
        Ok(report) => Some(report.target_version().to_string()),
        Err(_) => args.app_version.clone(),
    };
    let subject = email_subject(Some(args.app_name.as_str()), version.as_deref());

    let mut body = String::new();
    match result {
        Ok(report) => body.push_str(&render_text(report)),
        Err(err) => body.push_str(&format!("Report failed: {err:#}\n")),
    }
    body.push_str("\n--- Log ---\n");
    body.push_str(log);
    (subject, body)
}

fn run_app(
    ctx: &AppContext,
    app_name: &str,
    snapshot: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let directory = ctx.directory(snapshot)?;
    let app = AppLookupCommand::new(directory).execute(app_name)?;

    match format {
        OutputFormat::Table => print_app(&app),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&app)?),
        OutputFormat::Quiet => println!("{}", app.version),
    }
    Ok(())
}

// =============================================================================
// Output
// =============================================================================

fn print_table(report: &DeploymentReport) {
    println!("{}", header_lines(report));

    if report.devices().is_empty() {
        println!("No devices in group.");
    } else {
        println!("{}", table_header());
        for device in report.devices() {
            println!(
                "{}{}",
                device_columns(device),
                styled_status(device.classification, status_text(device))
            );
        }
    }

    println!();
    println!("{}", summary_line(report.counts()));
    println!("Recommended action: {}", styled_action(report.action()));
}

fn print_app(app: &AppRecord) {
    println!("Name:      {}", app.name);
    println!("ID:        {}", app.id);
    println!("Version:   {}", app.version);
    println!("Bundle ID: {}", app.bundle_id);
}

fn styled_status(classification: Classification, text: String) -> console::StyledObject<String> {
    match classification {
        Classification::UpToDate => style(text).green(),
        Classification::Outdated => style(text).yellow(),
        Classification::Missing => style(text).red(),
        Classification::Unknown => style(text).dim(),
    }
}

fn styled_action(action: RecommendedAction) -> console::StyledObject<&'static str> {
    let label = action_label(action);
    match action {
        RecommendedAction::RolloutComplete => style(label).green().bold(),
        RecommendedAction::NoOp => style(label).dim(),
        RecommendedAction::BeginRollout | RecommendedAction::ContinueRollout => {
            style(label).cyan().bold()
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn config_error(err: anyhow::Error) -> anyhow::Error {
    ConfigError::Invalid(format!("{err:#}")).into()
}

fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(rollout) = err.downcast_ref::<RolloutError>() {
        return rollout.exit_code();
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return EXIT_CONFIG;
    }
    EXIT_DIRECTORY
}

#[cfg(test)]
mod tests {
    use super::{
        Cli, Commands, EXIT_CONFIG, EXIT_DIRECTORY, ReportArgs, ReportFormat, exit_code,
        report_email, resolve_report,
    };
    use clap::Parser;
    use rollout_core::config::{ConfigError, JamfOverrides, RolloutConfig};
    use rollout_core::context::AppContext;
    use rollout_core::error::{DirectoryError, DirectoryScope, LookupKind, RolloutError};

    #[test]
    fn report_requires_appname() {
        let result = Cli::try_parse_from(["app-rollout", "report"]);
        assert!(result.is_err());
    }

    #[test]
    fn report_accepts_all_flags() {
        let args = [
            "app-rollout",
            "--jamfserver",
            "https://acme.jamfcloud.com",
            "--jamfuser",
            "api",
            "--jamfpass",
            "secret",
            "report",
            "--appname",
            "Retail App",
            "--appversion",
            "2.0",
            "--mininumiosversion",
            "16.0",
            "--bundleidentifier",
            "com.example.retail",
            "--smartdevicegroup",
            "Retail App Deployment Group 2.0",
            "--debug",
        ];

        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.debug_enabled());
        assert_eq!(cli.jamf_server.as_deref(), Some("https://acme.jamfcloud.com"));
        match cli.command {
            Commands::Report(report) => {
                assert_eq!(report.app_name, "Retail App");
                assert_eq!(report.app_version.as_deref(), Some("2.0"));
                assert_eq!(report.minimum_ios_version.as_deref(), Some("16.0"));
                assert_eq!(
                    report.smart_device_group.as_deref(),
                    Some("Retail App Deployment Group 2.0")
                );
                assert!(!report.email);
            }
            Commands::App { .. } => panic!("expected report command"),
        }
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let args = [
            "app-rollout",
            "app",
            "--appname",
            "Retail App",
            "--jamfserver",
            "acme.jamfcloud.com",
            "--log-file",
            "/tmp/rollout.log",
        ];

        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.jamf_server.as_deref(), Some("acme.jamfcloud.com"));
        assert_eq!(cli.log_file, std::path::PathBuf::from("/tmp/rollout.log"));
    }

    #[test]
    fn no_debug_wins_when_last() {
        let cli = Cli::try_parse_from([
            "app-rollout",
            "--debug",
            "--no-debug",
            "app",
            "--appname",
            "Retail App",
        ])
        .unwrap();
        assert!(!cli.debug_enabled());
    }

    #[test]
    fn default_log_file() {
        let cli = Cli::try_parse_from(["app-rollout", "app", "--appname", "X"]).unwrap();
        assert_eq!(cli.log_file, std::path::PathBuf::from("app_rollout.log"));
        assert!(!cli.debug_enabled());
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        let not_found: anyhow::Error = RolloutError::not_found(LookupKind::App, "Retail App").into();
        assert_eq!(exit_code(&not_found), 1);

        let directory: anyhow::Error = RolloutError::directory(
            DirectoryScope::GroupLookup,
            DirectoryError::UnknownGroup(56),
        )
        .into();
        assert_eq!(exit_code(&directory), EXIT_DIRECTORY);

        let config: anyhow::Error = ConfigError::Invalid("bad".to_string()).into();
        assert_eq!(exit_code(&config), EXIT_CONFIG);
    }

    fn report_args(extra: &[&str]) -> ReportArgs {
        let mut argv = vec!["app-rollout", "report", "--appname", "Retail App"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Report(args) => args,
            Commands::App { .. } => panic!("expected report command"),
        }
    }

    fn empty_context() -> AppContext {
        AppContext::with_config(RolloutConfig::default(), JamfOverrides::default())
    }

    #[test]
    fn report_without_group_uses_naming_convention() {
        let args = report_args(&["--appversion", "2.0"]);

        assert!(args.smart_device_group.is_none());
        assert_eq!(args.format, ReportFormat::Table);
    }

    #[test]
    fn report_accepts_csv_format() {
        let args = report_args(&["--format", "csv"]);
        assert_eq!(args.format, ReportFormat::Csv);

        let args = report_args(&["-f", "quiet"]);
        assert_eq!(args.format, ReportFormat::Quiet);
    }

    #[test]
    fn failed_snapshot_load_still_produces_email() {
        let args = report_args(&["--snapshot", "/nonexistent/snapshot.json", "--email"]);

        let result = resolve_report(&empty_context(), &args);
        assert!(result.is_err());

        let (subject, body) = report_email(&args, &result, "INFO Using directory snapshot\n");
        assert_eq!(subject, "App Deployment: Retail App");
        assert!(body.starts_with("Report failed: directory error during listing"));
        assert!(body.contains("--- Log ---\nINFO Using directory snapshot"));
    }

    #[test]
    fn successful_report_email_carries_rendered_report() {
        let temp = std::env::temp_dir().join(format!("app-rollout-{}.json", std::process::id()));
        std::fs::write(
            &temp,
            r#"{
                "apps": [{"id": 12, "name": "Retail App", "version": "2.0", "bundle_id": "com.example.retail"}],
                "groups": [{"id": 56, "name": "Retail App Deployment Group 2.0", "members": []}]
            }"#,
        )
        .unwrap();
        let args = report_args(&["--snapshot", temp.to_str().unwrap()]);

        let result = resolve_report(&empty_context(), &args);
        let (subject, body) = report_email(&args, &result, "");
        std::fs::remove_file(&temp).unwrap();

        assert_eq!(subject, "App Deployment: Retail App 2.0");
        assert!(body.contains("No devices in group."));
        assert!(body.contains("Recommended action: No action"));
        assert!(body.ends_with("--- Log ---\n"));
    }
}
