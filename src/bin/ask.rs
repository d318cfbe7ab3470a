// Command-line client for the query API
// Usage: cargo run --bin ask -- [--chart <kind>] [--api-url <url>] <question...>

use anyhow::{anyhow, Result};
use clap::Parser;
use std::env;

use servicedesk_insights::{
    models::chart::ChartKind,
    services::{
        presentation::cell_text,
        query_session::SessionState,
        QueryClient, QuerySession,
    },
};

#[derive(Parser, Debug)]
#[command(version, about = "Ask the service desk insights API a question", long_about = None)]
struct Args {
    #[arg(
        short,
        long = "chart",
        default_value = "line",
        help = "Chart type: line, bar, pie, doughnut, radar or polar-area"
    )]
    chart_kind: ChartKind,

    #[arg(
        long,
        env = "INSIGHTS_API_URL",
        default_value = "http://localhost:8080",
        help = "Base URL of the insights API"
    )]
    api_url: String,

    #[arg(required = true, num_args = 1.., help = "The question, in plain language")]
    question: Vec<String>,
}

impl Args {
    fn question(&self) -> String {
        self.question.join(" ")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .init();

    let args = Args::parse();
    let question = args.question();
    if question.trim().is_empty() {
        return Err(anyhow!("question must not be blank"));
    }
    let client = QueryClient::new(args.api_url.clone());

    let mut session = QuerySession::default();
    session.set_chart_kind(args.chart_kind);

    let ticket = session.begin_submit();
    let response = client.query(&question).await;
    session.complete(ticket, response);

    if let Some(sql) = session.sql_query() {
        println!("SQL: {}\n", sql);
    }

    if session.state() == SessionState::Failed {
        return Err(anyhow!(session.error().unwrap_or("Query failed").to_string()));
    }

    match session.chart() {
        Some(chart) => println!("{}\n", serde_json::to_string_pretty(&chart)?),
        None => {
            if let Some(reason) = session.chart_error() {
                eprintln!("No chart: {}\n", reason);
            }
        }
    }

    if let Some(table) = session.table() {
        let headers: Vec<&str> = table.columns.iter().map(|c| c.header.as_str()).collect();
        println!("{}", headers.join("\t"));
        for row in &table.rows {
            let cells: Vec<String> = table.columns.iter().map(|c| cell_text(row, c)).collect();
            println!("{}", cells.join("\t"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parses_chart_and_question() {
        let args = Args::try_parse_from([
            "ask", "--chart", "polar-area", "open", "requests", "by", "city",
        ])
        .unwrap();
        assert_eq!(args.chart_kind, ChartKind::PolarArea);
        assert_eq!(args.question(), "open requests by city");
    }

    #[test]
    fn test_chart_defaults_to_line() {
        let args = Args::try_parse_from(["ask", "-c", "BAR", "totals"]).unwrap();
        assert_eq!(args.chart_kind, ChartKind::Bar);

        let args = Args::try_parse_from(["ask", "totals"]).unwrap();
        assert_eq!(args.chart_kind, ChartKind::Line);
    }

    #[test]
    fn test_rejects_unknown_flags_and_chart_kinds() {
        assert!(Args::try_parse_from(["ask", "--bogus", "hi"]).is_err());
        assert!(Args::try_parse_from(["ask", "--chart", "scatter", "hi"]).is_err());
        assert!(Args::try_parse_from(["ask"]).is_err());
    }
}
