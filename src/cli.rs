use std::{
    env,
    io::{self, Write},
    process::{Command, Stdio},
};

use chrono::{DateTime, Local, NaiveDate, TimeZone};

use calstrip::{
    calendar::{merge_events, CalEvent},
    storage::config::Config,
    sync::{GoogleCalendarClient, SessionTokens, SyncEngine, TimeWindow},
    timeline::{LogicalTimeline, TimelineIndex},
};

#[derive(Clone, Copy)]
pub enum CliMode {
    Default { sample: bool },
    AgendaDate(NaiveDate),
}

pub fn parse_cli_mode() -> Result<CliMode, String> {
    parse_args(env::args().skip(1), Local::now().date_naive())
}

fn parse_args(args: impl Iterator<Item = String>, today: NaiveDate) -> Result<CliMode, String> {
    let mut sample = false;
    let mut agenda_date = None;
    let mut args = args.peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sample" => {
                sample = true;
            }
            "--agenda" => {
                let target_date = match args.next_if(|next| !next.starts_with("--")) {
                    Some(date_str) => NaiveDate::parse_from_str(&date_str, "%Y/%m/%d")
                        .map_err(|_| format!("Invalid date '{}'. Use YYYY/MM/DD.", date_str))?,
                    None => today,
                };
                agenda_date = Some(target_date);
            }
            "--help" => {
                println!("Usage: calstrip [--sample] [--agenda [YYYY/MM/DD]]");
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    if let Some(date) = agenda_date {
        Ok(CliMode::AgendaDate(date))
    } else {
        Ok(CliMode::Default { sample })
    }
}

pub async fn run_agenda_mode(config: &Config, tokens: &SessionTokens, date: NaiveDate) -> anyhow::Result<()> {
    let timeline = LogicalTimeline::new(date, 0, 0);
    let window = TimeWindow::for_timeline(&timeline, &Local)
        .ok_or_else(|| anyhow::anyhow!("Cannot build a fetch window for {}", date))?;

    let client = GoogleCalendarClient::from_accounts(&config.accounts, config.sync.page_size);
    let engine = SyncEngine::new(client, config.accounts.enabled());
    let outcome = engine.fetch_all(tokens, &window, &Local).await;

    for error in &outcome.errors {
        eprintln!("{}", error);
    }

    let events = merge_events(outcome.fetched.into_iter().map(|(_, events)| events));
    let index = TimelineIndex::build(&timeline, &events, &Local);
    let agenda = format_agenda_text(date, &index, &Local);
    display_with_pager(&agenda)?;
    Ok(())
}

fn format_agenda_text<Tz: TimeZone>(date: NaiveDate, index: &TimelineIndex, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut lines = Vec::new();
    lines.push(format!("Agenda – {}", date.format("%A, %B %d, %Y")));
    lines.push(String::new());

    let spans = index.spans_in_window(0, 1);
    let day_events = index.events_for_day(0);

    if spans.is_empty() && day_events.is_empty() {
        lines.push("No events scheduled.".to_string());
    }
    for span in spans {
        let days = span.end_day - span.start_day + 1;
        lines.push(format!("- {:<13} {} [{}]", format!("{} days", days), span.event.title, span.event.account_id));
    }
    for event in day_events {
        lines.push(format!("- {}", build_agenda_line(event, tz)));
    }

    lines.join("\n")
}

fn build_agenda_line<Tz: TimeZone>(event: &CalEvent, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let clock = |ts: i64| {
        DateTime::from_timestamp_millis(ts)
            .map(|dt| dt.with_timezone(tz).format("%H:%M").to_string())
            .unwrap_or_default()
    };
    let time_label = if event.all_day {
        "All Day".to_string()
    } else {
        format!("{}-{}", clock(event.start_ts), clock(event.end_ts))
    };

    format!("{:<13} {} [{}]", time_label, event.title, event.account_id)
}

fn display_with_pager(text: &str) -> Result<(), io::Error> {
    let pager_value = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let mut parts = pager_value.split_whitespace();
    let cmd = match parts.next() {
        Some(c) => c,
        None => {
            print!("{text}");
            return Ok(());
        }
    };
    let args: Vec<&str> = parts.collect();

    match Command::new(cmd)
        .args(&args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(stdin) = child.stdin.as_mut() {
                stdin.write_all(text.as_bytes())?;
            }
            let _ = child.wait();
        }
        Err(_) => {
            print!("{text}");
        }
    }

    Ok(())
}
