//! SmartCare CLI
//!
//! Command-line client for a running SmartCare API:
//! - Register babies
//! - Log feedings, sleeps and growth measurements
//! - Show Smart Care predictions and rate them
//! - Load demo data

use anyhow::{bail, Context};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

use smartcare::seed::{demo_events, demo_subject};
use smartcare::storage::{
    EventPayload, FeedingDetails, FeedingMethod, GrowthDetails, InsightType, SleepDetails,
    SleepType, Subject,
};

#[derive(Parser)]
#[command(name = "smartcare")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Baby-care tracking with Smart Care predictions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage baby profiles
    Subject {
        #[command(subcommand)]
        action: SubjectCommand,
    },

    /// Log a care event
    Log {
        #[command(subcommand)]
        event: LogCommand,
    },

    /// Show feeding, nap and growth predictions
    Insights {
        subject: String,
    },

    /// Rate a prediction type as accurate (up) or not (down)
    Feedback {
        subject: String,
        /// feeding, sleep or growth
        insight_type: String,
        vote: Vote,
        /// Who is submitting (default: anonymous)
        #[arg(long)]
        by: Option<String>,
    },

    /// Register the demo baby and a few days of history
    Seed,

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum SubjectCommand {
    /// Register a baby
    Add {
        id: String,
        name: String,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        born: Option<NaiveDate>,
        /// IANA timezone, e.g. Asia/Kolkata (default: UTC)
        #[arg(long)]
        timezone: Option<String>,
    },
    /// Show one profile
    Show { id: String },
    /// List all profiles
    List,
}

#[derive(Subcommand)]
pub enum LogCommand {
    Feeding {
        subject: String,
        #[arg(long)]
        amount_ml: Option<f64>,
        #[arg(long)]
        duration_minutes: Option<f64>,
        #[arg(long, value_enum)]
        method: Option<Method>,
        #[arg(long)]
        notes: Option<String>,
        /// When it happened: "now", RFC 3339, or an age such as 90m, 2h, 1d
        #[arg(short, long)]
        time: Option<String>,
    },
    Sleep {
        subject: String,
        #[arg(long, value_enum, default_value = "nap")]
        kind: SleepKind,
        /// When the sleep ended, same formats as --time
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        quality: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// When the sleep started
        #[arg(short, long)]
        time: Option<String>,
    },
    Growth {
        subject: String,
        #[arg(long)]
        weight_kg: Option<f64>,
        #[arg(long)]
        height_cm: Option<f64>,
        #[arg(long)]
        head_cm: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(short, long)]
        time: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Vote {
    Up,
    Down,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Method {
    Breast,
    Bottle,
    Solid,
}

impl From<Method> for FeedingMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Breast => FeedingMethod::Breast,
            Method::Bottle => FeedingMethod::Bottle,
            Method::Solid => FeedingMethod::Solid,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SleepKind {
    Nap,
    Night,
}

impl From<SleepKind> for SleepType {
    fn from(kind: SleepKind) -> Self {
        match kind {
            SleepKind::Nap => SleepType::Nap,
            SleepKind::Night => SleepType::Night,
        }
    }
}

/// Thin wrapper over the REST API
struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    fn new(base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, path: &str) -> anyhow::Result<Value> {
        let response = self
            .http
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .with_context(|| format!("cannot reach SmartCare API at {}", self.base))?;
        Self::read(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> anyhow::Result<Value> {
        let response = self
            .http
            .post(format!("{}{}", self.base, path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("cannot reach SmartCare API at {}", self.base))?;
        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> anyhow::Result<Value> {
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string());
            bail!("request failed ({}): {}", status, message);
        }

        Ok(body)
    }

    async fn log_event(
        &self,
        subject: &str,
        occurred_at: DateTime<Utc>,
        payload: &EventPayload,
    ) -> anyhow::Result<Value> {
        self.post(
            &format!("/api/v1/subjects/{}/events", subject),
            &event_body(occurred_at, payload)?,
        )
        .await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let api = ApiClient::new(&cli.api_url);
    let json_output = cli.format == "json";

    match cli.command {
        Commands::Subject { action } => match action {
            SubjectCommand::Add {
                id,
                name,
                born,
                timezone,
            } => {
                let mut body = serde_json::json!({ "id": id, "name": name });
                if let Some(born) = born {
                    body["date_of_birth"] = Value::String(born.to_string());
                }
                if let Some(tz) = timezone {
                    body["timezone"] = Value::String(tz);
                }

                let subject = api.post("/api/v1/subjects", &body).await?;
                println!(
                    "Registered {} ({})",
                    subject["name"].as_str().unwrap_or("-"),
                    subject["id"].as_str().unwrap_or("-")
                );
            }
            SubjectCommand::Show { id } => {
                let subject = api.get(&format!("/api/v1/subjects/{}", id)).await?;
                if json_output {
                    println!("{}", serde_json::to_string_pretty(&subject)?);
                } else {
                    print_subject(&subject);
                }
            }
            SubjectCommand::List => {
                let list = api.get("/api/v1/subjects").await?;
                if json_output {
                    println!("{}", serde_json::to_string_pretty(&list)?);
                } else {
                    print_subject_table(&list);
                }
            }
        },

        Commands::Log { event } => {
            let (subject, occurred_at, payload) = build_event(event, Utc::now())?;
            let logged = api.log_event(&subject, occurred_at, &payload).await?;
            println!(
                "Logged {} for {} at {}",
                payload.kind(),
                subject,
                logged["occurred_at"].as_str().unwrap_or("-")
            );
        }

        Commands::Insights { subject } => {
            let snapshot = api.get(&format!("/api/v1/insights/{}", subject)).await?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_insights(&snapshot);
            }
        }

        Commands::Feedback {
            subject,
            insight_type,
            vote,
            by,
        } => {
            let insight_type: InsightType = insight_type
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;

            let mut body = serde_json::json!({
                "subject_id": subject,
                "insight_type": insight_type,
                "accurate": matches!(vote, Vote::Up),
            });
            if let Some(by) = by {
                body["submitted_by"] = Value::String(by);
            }

            let result = api.post("/api/v1/feedback", &body).await?;
            println!(
                "{} ({})",
                result["message"].as_str().unwrap_or("Feedback recorded"),
                result["feedback_id"].as_str().unwrap_or("-")
            );
        }

        Commands::Seed => {
            let subject = demo_subject();
            match api.post("/api/v1/subjects", &subject_body(&subject)).await {
                Ok(_) => println!("Registered {} ({})", subject.name, subject.id),
                Err(e) if e.to_string().contains("409") => {
                    println!("{} already exists, nothing to do", subject.id);
                    return Ok(());
                }
                Err(e) => return Err(e),
            }

            let events = demo_events(Utc::now());
            for (occurred_at, payload) in &events {
                api.log_event(&subject.id, *occurred_at, payload).await?;
            }
            println!("Logged {} demo events", events.len());
            println!();
            println!("Try: smartcare insights {}", subject.id);
        }

        Commands::Status => {
            let health = api.get("/health").await.map_err(|e| {
                e.context("make sure the server is running: cargo run --bin smartcare-api")
            })?;

            println!("SmartCare v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));
            println!("Store: {}", health["storage"].as_str().unwrap_or("unknown"));
            if let Some(uptime) = health["uptime_seconds"].as_u64() {
                println!("Uptime: {}", format_duration(uptime));
            }
        }

        Commands::Config { output } => {
            let config = smartcare::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn subject_body(subject: &Subject) -> Value {
    serde_json::json!({
        "id": subject.id,
        "name": subject.name,
        "date_of_birth": subject.date_of_birth,
        "timezone": subject.timezone,
    })
}

/// Request body for the event endpoint: the payload plus `occurred_at`
fn event_body(occurred_at: DateTime<Utc>, payload: &EventPayload) -> anyhow::Result<Value> {
    let mut body = serde_json::to_value(payload)?;
    match body.as_object_mut() {
        Some(fields) => {
            fields.insert("occurred_at".to_string(), serde_json::to_value(occurred_at)?);
        }
        None => bail!("event payload did not serialize to an object"),
    }
    Ok(body)
}

fn build_event(
    event: LogCommand,
    now: DateTime<Utc>,
) -> anyhow::Result<(String, DateTime<Utc>, EventPayload)> {
    Ok(match event {
        LogCommand::Feeding {
            subject,
            amount_ml,
            duration_minutes,
            method,
            notes,
            time,
        } => (
            subject,
            parse_time(time.as_deref(), now)?,
            EventPayload::Feeding(FeedingDetails {
                amount_ml,
                duration_minutes,
                method: method.map(Into::into),
                notes,
            }),
        ),
        LogCommand::Sleep {
            subject,
            kind,
            end,
            quality,
            notes,
            time,
        } => {
            let ended_at = end.as_deref().map(|e| parse_time(Some(e), now)).transpose()?;
            (
                subject,
                parse_time(time.as_deref(), now)?,
                EventPayload::Sleep(SleepDetails {
                    ended_at,
                    sleep_type: Some(kind.into()),
                    quality,
                    notes,
                }),
            )
        }
        LogCommand::Growth {
            subject,
            weight_kg,
            height_cm,
            head_cm,
            notes,
            time,
        } => (
            subject,
            parse_time(time.as_deref(), now)?,
            EventPayload::Growth(GrowthDetails {
                weight_kg,
                height_cm,
                head_circumference_cm: head_cm,
                notes,
            }),
        ),
    })
}

/// "now", an RFC 3339 timestamp, or an age like "45m", "3h", "2d"
fn parse_time(input: Option<&str>, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let s = match input.map(str::trim) {
        None | Some("now") | Some("") => return Ok(now),
        Some(s) => s,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let split = s.char_indices().last().map(|(i, _)| i).unwrap_or(0);
    let (number, unit) = s.split_at(split);
    let amount: i64 = number
        .parse()
        .with_context(|| format!("invalid time '{}'. Use: now, 2024-03-01T09:00:00Z, 90m, 2h, 1d", s))?;

    let ago = match unit {
        "m" => Duration::minutes(amount),
        "h" => Duration::hours(amount),
        "d" => Duration::days(amount),
        _ => bail!("invalid time '{}'. Use: now, 2024-03-01T09:00:00Z, 90m, 2h, 1d", s),
    };

    Ok(now - ago)
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn percent(confidence: &Value) -> String {
    confidence
        .as_f64()
        .map(|c| format!("{:.0}%", c * 100.0))
        .unwrap_or_else(|| "-".to_string())
}

fn print_subject(subject: &Value) {
    println!("{} ({})", subject["name"].as_str().unwrap_or("-"), subject["id"].as_str().unwrap_or("-"));
    println!("  Born:     {}", subject["date_of_birth"].as_str().unwrap_or("-"));
    if let Some(days) = subject["age_days"].as_i64() {
        println!("  Age:      {} days", days);
    }
    println!("  Timezone: {}", subject["timezone"].as_str().unwrap_or("UTC"));
}

fn print_subject_table(list: &Value) {
    let subjects = match list["subjects"].as_array() {
        Some(s) if !s.is_empty() => s,
        _ => {
            println!("No subjects registered yet.");
            println!();
            println!("Add one with:");
            println!("  smartcare subject add baby_001 \"Emma Johnson\" --timezone Asia/Kolkata");
            return;
        }
    };

    println!("{:<16} {:<24} {:<12} {}", "ID", "Name", "Born", "Timezone");
    println!("{}", "-".repeat(70));
    for subject in subjects {
        println!(
            "{:<16} {:<24} {:<12} {}",
            subject["id"].as_str().unwrap_or("-"),
            subject["name"].as_str().unwrap_or("-"),
            subject["date_of_birth"].as_str().unwrap_or("-"),
            subject["timezone"].as_str().unwrap_or("-"),
        );
    }
}

fn print_insights(snapshot: &Value) {
    println!(
        "Smart Care for {} (generated {})",
        snapshot["subject_id"].as_str().unwrap_or("-"),
        snapshot["generated_at"].as_str().unwrap_or("-")
    );
    println!();

    let feeding = &snapshot["feeding"];
    println!("Feeding  [{}]", percent(&feeding["confidence"]));
    println!("  {}", feeding["message"].as_str().unwrap_or("-"));
    if let Some(next) = feeding["next_feeding"].as_str() {
        println!("  Next: {}", next);
    }

    let sleep = &snapshot["sleep"];
    println!("Sleep    [{}]", percent(&sleep["confidence"]));
    println!("  {}", sleep["message"].as_str().unwrap_or("-"));
    if let Some(next) = sleep["next_nap"].as_str() {
        println!("  Next nap: {}", next);
    }

    let growth = &snapshot["growth"];
    println!("Growth   [{}]", percent(&growth["confidence"]));
    println!("  {}", growth["message"].as_str().unwrap_or("-"));
}
