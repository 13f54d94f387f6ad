//! Command-line entry of orders and control commands.
//!
//! Parsing only checks types and ranges the user can fix by retyping; the
//! coordinator re-checks bounds on its own.

use pricemon_core::{Order, OrderSide};
use std::time::Duration;
use thiserror::Error;

/// A parsed prompt command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `order <index> <bid|ask> <price> <quantity>`
    Order { index: usize, order: Order },
    /// `period <ms>`
    Period(Duration),
    Start,
    Stop,
    /// `test on|off`
    TestMode(bool),
    Reset,
    /// `show [index]`
    Show(Option<usize>),
    Stats,
    Metrics,
    Help,
    Quit,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EntryError {
    #[error("Missing {0}")]
    Missing(&'static str),

    #[error("Instrument nb must be a number inferior to: {count}")]
    InvalidInstrument { count: usize },

    #[error("Side must be 'bid' or 'ask', got '{0}'")]
    InvalidSide(String),

    #[error("Price must be a number")]
    InvalidPrice,

    #[error("Quantity must be a positive integer")]
    InvalidQuantity,

    #[error("Period must be a whole number of milliseconds")]
    InvalidPeriod,

    #[error("Expected 'on' or 'off', got '{0}'")]
    InvalidToggle(String),

    #[error("Unexpected argument '{0}'")]
    UnexpectedArgument(String),

    #[error("Unknown command '{0}', type 'help'")]
    UnknownCommand(String),
}

pub const HELP: &str = "\
commands:
  order <index> <bid|ask> <price> <qty>   apply a manual order
  period <ms>                              set the refresh period
  start | stop                             start or stop the quote feed
  test on|off                              enter or leave test mode
  reset                                    zero every instrument
  show [index]                             print instrument state
  stats                                    print dispatch counters
  metrics                                  print prometheus metrics
  help | quit";

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str, instrument_count: usize) -> Result<Option<Command>, EntryError> {
    let mut args = line.split_whitespace();
    let Some(name) = args.next() else {
        return Ok(None);
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "order" | "o" => {
            let index = parse_index(args.next(), instrument_count)?;
            let side = parse_side(args.next())?;
            let price = parse_price(args.next())?;
            let quantity = parse_quantity(args.next())?;
            Command::Order {
                index,
                order: Order::new(price, quantity, side),
            }
        }
        "period" => {
            let ms = args
                .next()
                .ok_or(EntryError::Missing("period"))?
                .parse::<u64>()
                .map_err(|_| EntryError::InvalidPeriod)?;
            Command::Period(Duration::from_millis(ms))
        }
        "start" => Command::Start,
        "stop" => Command::Stop,
        "test" => match args.next() {
            Some("on") => Command::TestMode(true),
            Some("off") => Command::TestMode(false),
            Some(other) => return Err(EntryError::InvalidToggle(other.to_string())),
            None => return Err(EntryError::Missing("on|off")),
        },
        "reset" => Command::Reset,
        "show" => match args.next() {
            Some(raw) => Command::Show(Some(parse_index(Some(raw), instrument_count)?)),
            None => Command::Show(None),
        },
        "stats" => Command::Stats,
        "metrics" => Command::Metrics,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(EntryError::UnknownCommand(other.to_string())),
    };

    if let Some(extra) = args.next() {
        return Err(EntryError::UnexpectedArgument(extra.to_string()));
    }
    Ok(Some(command))
}

fn parse_index(raw: Option<&str>, count: usize) -> Result<usize, EntryError> {
    let raw = raw.ok_or(EntryError::Missing("instrument"))?;
    raw.parse::<usize>()
        .ok()
        .filter(|i| *i < count)
        .ok_or(EntryError::InvalidInstrument { count })
}

fn parse_side(raw: Option<&str>) -> Result<OrderSide, EntryError> {
    let raw = raw.ok_or(EntryError::Missing("side"))?;
    match raw.to_ascii_lowercase().as_str() {
        "bid" | "b" | "buy" => Ok(OrderSide::Bid),
        "ask" | "a" | "sell" => Ok(OrderSide::Ask),
        _ => Err(EntryError::InvalidSide(raw.to_string())),
    }
}

fn parse_price(raw: Option<&str>) -> Result<f64, EntryError> {
    let raw = raw.ok_or(EntryError::Missing("price"))?;
    raw.parse::<f64>()
        .ok()
        .filter(|px| px.is_finite())
        .ok_or(EntryError::InvalidPrice)
}

fn parse_quantity(raw: Option<&str>) -> Result<i64, EntryError> {
    let raw = raw.ok_or(EntryError::Missing("quantity"))?;
    raw.parse::<i64>()
        .ok()
        .filter(|q| *q > 0)
        .ok_or(EntryError::InvalidQuantity)
}
