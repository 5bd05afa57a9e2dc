use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use venuelink_wire::Message;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct SessionOutput<'a> {
    name: &'a str,
    upstream: String,
    downstream: String,
    token_issued: bool,
}

/// Print the post-handshake session summary. The token value itself never
/// reaches stdout, only whether one was issued.
pub fn print_session(
    name: &str,
    upstream: String,
    downstream: String,
    token_issued: bool,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = SessionOutput {
                name,
                upstream,
                downstream,
                token_issued,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["NAME", "UPSTREAM", "DOWNSTREAM", "TOKEN"])
                .add_row(vec![
                    name.to_string(),
                    upstream,
                    downstream,
                    if token_issued { "issued" } else { "none" }.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "session ready: name={name} upstream={upstream} downstream={downstream} token={}",
                if token_issued { "issued" } else { "none" }
            );
        }
    }
}

/// Print one decoded downstream message.
pub fn print_message(msg: &Message, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(msg).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["MESSAGE", "DETAIL"])
                .add_row(vec![msg.name().to_string(), describe(msg)]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{} {}", msg.name(), describe(msg));
        }
    }
}

fn describe(msg: &Message) -> String {
    match msg {
        Message::LoginRequest(m) => format!("name={}", m.name),
        Message::TokenBindRequest(_) => "token=<redacted>".to_string(),
        Message::LoginResponse(m) => {
            if m.ok {
                "ok".to_string()
            } else {
                format!("rejected: {}", m.error)
            }
        }
        Message::Order(m) => format!(
            "id={} ticker={} qty={} price={} action={}",
            m.id, m.ticker, m.quantity, m.price, m.action
        ),
        Message::OrderStatus(m) => format!(
            "order_id={} state={} fill_price={} qty={}",
            m.order_id, m.state, m.fill_price, m.quantity
        ),
        Message::TickerPrice(m) => format!("ticker={} price={}", m.ticker, m.price),
    }
}
