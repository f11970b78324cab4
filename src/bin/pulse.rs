//! Pulse CLI - Command-line interface for Pulse Score
//!
//! Commands:
//! - score: Score log records into a weekly summary or report
//! - validate: Validate log record schema
//! - doctor: Diagnose engine health and configuration
//! - schema: Print input/output schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use pulse_score::config::ScoreConfig;
use pulse_score::pipeline::{parse_reference_date, ScoreEngine};
use pulse_score::schema::{LogRecord, LogRecordAdapter, SCHEMA_VERSION};
use pulse_score::{PRODUCER_NAME, SCORE_VERSION};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Pulse - On-device health score aggregation and trend engine
#[derive(Parser)]
#[command(name = "pulse")]
#[command(author = "Pulse Health")]
#[command(version = SCORE_VERSION)]
#[command(about = "Turn health log entries into weekly scores and insights", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score log records into a weekly summary
    Score {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Last day of the current window (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        reference_date: Option<String>,

        /// Subject the records belong to
        #[arg(long, default_value = "unknown")]
        subject_id: String,

        /// Only score records logged for this family member
        #[arg(long)]
        member_id: Option<String>,

        /// Goals configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Emit the bare summary without the report envelope
        #[arg(long)]
        summary_only: bool,
    },

    /// Validate log record schema
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose engine health and configuration
    Doctor {
        /// Check a goals configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (pulse.health_log.v1)
    Input,
    /// Output schema (pulse.score_report.v1)
    Output,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PulseCliError> {
    match cli.command {
        Commands::Score {
            input,
            output,
            input_format,
            output_format,
            reference_date,
            subject_id,
            member_id,
            config,
            summary_only,
        } => cmd_score(ScoreArgs {
            input: &input,
            output: &output,
            input_format,
            output_format,
            reference_date: reference_date.as_deref(),
            subject_id: &subject_id,
            member_id: member_id.as_deref(),
            config: config.as_deref(),
            summary_only,
        }),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

struct ScoreArgs<'a> {
    input: &'a Path,
    output: &'a Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    reference_date: Option<&'a str>,
    subject_id: &'a str,
    member_id: Option<&'a str>,
    config: Option<&'a Path>,
    summary_only: bool,
}

fn cmd_score(args: ScoreArgs<'_>) -> Result<(), PulseCliError> {
    let engine = match args.config {
        Some(path) => ScoreEngine::from_config_json(&fs::read_to_string(path)?)?,
        None => ScoreEngine::new(),
    };

    let reference_date: NaiveDate = match args.reference_date {
        Some(raw) => parse_reference_date(raw)?,
        None => Local::now().date_naive(),
    };

    let records = read_records(args.input, &args.input_format)?;
    if records.is_empty() {
        return Err(PulseCliError::NoRecords);
    }

    let entries = LogRecordAdapter::to_entries(&records, args.subject_id);
    info!(
        records = records.len(),
        entries = entries.len(),
        %reference_date,
        "scoring log entries"
    );

    let output_data = if args.summary_only {
        let summary = engine.summarize_member(&entries, reference_date, args.member_id);
        format_output(&summary, &args.output_format)?
    } else {
        let report = engine.report(&entries, reference_date, args.subject_id, args.member_id);
        format_output(&report, &args.output_format)?
    };

    write_output(args.output, &output_data)
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), PulseCliError> {
    let records = read_records(input, &input_format)?;
    let results = LogRecordAdapter::validate_records(&records);
    info!(records = records.len(), problems = results.len(), "validated log records");

    let dropped = results.iter().filter(|r| r.error.drops_record()).count();
    let report = ValidationReport {
        total_records: records.len(),
        scorable_records: records.len() - dropped,
        dropped_records: dropped,
        ignored_values: results.len() - dropped,
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                category: r.category.clone(),
                dropped: r.error.drops_record(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:    {}", report.total_records);
        println!("Scorable records: {}", report.scorable_records);
        println!("Dropped records:  {}", report.dropped_records);
        println!("Ignored values:   {}", report.ignored_values);

        if !report.errors.is_empty() {
            println!("\nProblems:");
            for err in &report.errors {
                println!(
                    "  - {} record {} ({}): {}",
                    if err.dropped { "[DROP]" } else { "[SKIP]" },
                    err.index,
                    err.category.as_deref().unwrap_or("unknown"),
                    err.error
                );
            }
        }
    }

    if report.dropped_records > 0 {
        Err(PulseCliError::ValidationFailed(report.dropped_records))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), PulseCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "score_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Pulse Score version {}", SCORE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", SCHEMA_VERSION),
    });

    if let Some(config_path) = config {
        checks.push(check_config(config_path));
    } else {
        let defaults = ScoreConfig::default();
        checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Using default goals (steps {}, water {}, calories {}, sleep {})",
                defaults.step_goal, defaults.water_goal, defaults.calorie_goal, defaults.sleep_goal
            ),
        });
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready for --input -)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: SCORE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Pulse Doctor Report");
        println!("===================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(PulseCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn check_config(path: &Path) -> DoctorCheck {
    if !path.exists() {
        return DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "Config file does not exist".to_string(),
        };
    }

    match fs::read_to_string(path) {
        Ok(content) => match ScoreConfig::from_json(&content) {
            Ok(config) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Config valid (step goal {}, calorie goal {})",
                    config.step_goal, config.calorie_goal
                ),
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        },
        Err(e) => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Error,
            message: format!("Cannot read config file: {}", e),
        },
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), PulseCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("Each log record contains:");
                println!();
                println!("- category: steps, water, calories, sleep, heartRate,");
                println!("            weight, bloodPressure, temperature, sugar");
                println!("- value: number or numeric string (bloodPressure as \"120/80\")");
                println!("- timestamp: ISO 8601 date-time; its own offset picks the day");
                println!("- memberId: optional family member the record belongs to");
                println!();
                println!("Records with an unknown category or timestamp are dropped.");
                println!("Unreadable values are ignored for that day.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: pulse.score_report.v1");
                println!();
                println!("The score report contains:");
                println!();
                println!("- reportVersion: Envelope version");
                println!("- producer: {{ name, version, instanceId }}");
                println!("- subject: {{ subjectId, memberId }}");
                println!("- referenceDate, computedAtUtc");
                println!("- summary:");
                println!("  - dailyScores: 7 daily composites in [0, 1], oldest first");
                println!("  - labels: day-of-month labels");
                println!("  - balanceVector: fitness, nutrition, sleep, mental, hydration, vitals");
                println!("  - overallScore: 0..100, scoreDelta: -100..100");
                println!("  - insights: {{ kind, title, description, magnitude, directionality }}");
                println!("  - latestVitals: {{ weight, bloodPressure, temperature, sugar }}");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, PulseCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_records(input: &Path, format: &InputFormat) -> Result<Vec<LogRecord>, PulseCliError> {
    let input_data = read_input(input)?;
    let records = match format {
        InputFormat::Ndjson => LogRecordAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => LogRecordAdapter::parse_array(&input_data)?,
    };
    Ok(records)
}

fn write_output(output: &Path, data: &str) -> Result<(), PulseCliError> {
    if output.to_string_lossy() == "-" {
        println!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn format_output<T: serde::Serialize>(
    value: &T,
    format: &OutputFormat,
) -> Result<String, PulseCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(value)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
    }
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://pulsehealth.app/schemas/pulse.health_log.v1.json",
        "title": SCHEMA_VERSION,
        "description": "Pulse health log record",
        "type": "object",
        "required": ["category", "value", "timestamp"],
        "properties": {
            "category": {
                "type": "string",
                "enum": [
                    "steps", "water", "calories", "sleep", "heartRate",
                    "weight", "bloodPressure", "temperature", "sugar"
                ]
            },
            "value": { "type": ["number", "string", "null"] },
            "timestamp": { "type": "string", "format": "date-time" },
            "memberId": { "type": ["string", "null"] }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    let unit_number = serde_json::json!({ "type": "number", "minimum": 0, "maximum": 1 });
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://pulsehealth.app/schemas/pulse.score_report.v1.json",
        "title": "pulse.score_report.v1",
        "description": "Pulse weekly score report",
        "type": "object",
        "required": ["reportVersion", "producer", "subject", "referenceDate", "computedAtUtc", "summary"],
        "properties": {
            "reportVersion": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instanceId": { "type": "string" }
                }
            },
            "subject": {
                "type": "object",
                "properties": {
                    "subjectId": { "type": "string" },
                    "memberId": { "type": "string" }
                }
            },
            "referenceDate": { "type": "string", "format": "date" },
            "computedAtUtc": { "type": "string", "format": "date-time" },
            "summary": {
                "type": "object",
                "required": ["dailyScores", "labels", "balanceVector", "overallScore", "scoreDelta", "insights"],
                "properties": {
                    "dailyScores": { "type": "array", "items": unit_number, "minItems": 7, "maxItems": 7 },
                    "labels": { "type": "array", "items": { "type": "string" }, "minItems": 7, "maxItems": 7 },
                    "balanceVector": { "type": "array", "items": unit_number, "minItems": 6, "maxItems": 6 },
                    "overallScore": { "type": "integer", "minimum": 0, "maximum": 100 },
                    "scoreDelta": { "type": "integer", "minimum": -100, "maximum": 100 },
                    "insights": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "kind": {
                                    "type": "string",
                                    "enum": ["stepGoalAchieved", "hydrationTrend", "calorieGoalExceeded"]
                                },
                                "title": { "type": "string" },
                                "description": { "type": "string" },
                                "magnitude": { "type": "integer", "minimum": 0 },
                                "directionality": { "type": "string", "enum": ["improved", "declined"] }
                            }
                        }
                    },
                    "latestVitals": { "type": "object" }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum PulseCliError {
    Io(io::Error),
    Compute(pulse_score::ComputeError),
    Json(serde_json::Error),
    NoRecords,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for PulseCliError {
    fn from(e: io::Error) -> Self {
        PulseCliError::Io(e)
    }
}

impl From<pulse_score::ComputeError> for PulseCliError {
    fn from(e: pulse_score::ComputeError) -> Self {
        PulseCliError::Compute(e)
    }
}

impl From<serde_json::Error> for PulseCliError {
    fn from(e: serde_json::Error) -> Self {
        PulseCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PulseCliError> for CliError {
    fn from(e: PulseCliError) -> Self {
        use pulse_score::ComputeError;

        match e {
            PulseCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PulseCliError::Compute(e) => {
                let (code, hint) = match &e {
                    ComputeError::InvalidConfig(_) => {
                        ("CONFIG_ERROR", "Goals must be positive, finite numbers")
                    }
                    ComputeError::DateParseError(_) => {
                        ("DATE_ERROR", "Use YYYY-MM-DD for --reference-date")
                    }
                    _ => ("PARSE_ERROR", "Ensure input matches pulse.health_log.v1 schema"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            PulseCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PulseCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No log records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            PulseCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records would be dropped", count),
                hint: Some("Fix category and timestamp fields and retry".to_string()),
            },
            PulseCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    scorable_records: usize,
    dropped_records: usize,
    ignored_values: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    category: Option<String>,
    dropped: bool,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
