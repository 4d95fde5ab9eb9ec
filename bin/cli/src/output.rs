use std::collections::HashMap;
use std::io::Write;

use anyhow::Result;
use lazy_static::lazy_static;
use serde::Serialize;
use sitesmith_cli::enums::{parse_enum, EnumError};

lazy_static! {
    static ref OUTPUT_TYPES: HashMap<&'static str, Output> = {
        let mut map = HashMap::new();
        map.insert("json", Output::Json);
        map.insert("text", Output::Text);
        map
    };
}

#[remain::sorted]
#[derive(Debug, Copy, Clone, Default)]
pub enum Output {
    /// JSON is the default output format.
    #[default]
    Json,

    /// Human readable lines. Listings are tab-delimited so they work with grep, awk and cut.
    Text,
}

pub(crate) fn parse_output(src: &str) -> Result<Output, EnumError> {
    parse_enum(&OUTPUT_TYPES, src)
}

pub(crate) fn print_output<A: std::fmt::Display + Serialize>(
    output: Output,
    value: A,
) -> Result<()> {
    match output {
        Output::Json => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &value)?;
            writeln!(stdout)?;
            Ok(())
        }
        Output::Text => {
            println!("{value}");
            Ok(())
        }
    }
}
