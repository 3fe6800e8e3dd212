use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use tiorelay_map::{Direction, TranslationTables};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
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

#[derive(Debug, Serialize, PartialEq, Eq, PartialOrd, Ord)]
struct MappingOutput<'a> {
    direction: Direction,
    key: &'a str,
    translation: &'a str,
}

#[derive(Debug, Serialize)]
struct TablesOutput<'a> {
    source: &'a str,
    gui_count: usize,
    micro_count: usize,
    mappings: Vec<MappingOutput<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TranslationOutput<'a> {
    pub direction: Direction,
    pub input: &'a str,
    pub output: &'a str,
    pub mapped: bool,
}

#[derive(Debug, Serialize)]
pub struct ReplyOutput<'a> {
    pub socket: &'a str,
    pub sent: &'a str,
    pub reply: Option<&'a str>,
}

/// Both tables, sorted by direction then key.
fn sorted_mappings(tables: &TranslationTables) -> Vec<MappingOutput<'_>> {
    let mut mappings: Vec<_> = [&tables.gui, &tables.micro]
        .into_iter()
        .flat_map(|table| {
            table.iter().map(move |(key, translation)| MappingOutput {
                direction: table.direction(),
                key,
                translation,
            })
        })
        .collect();
    mappings.sort();
    mappings
}

pub fn print_tables(tables: &TranslationTables, source: &str, format: OutputFormat) {
    let mappings = sorted_mappings(tables);
    match format {
        OutputFormat::Json => {
            let out = TablesOutput {
                source,
                gui_count: tables.gui.len(),
                micro_count: tables.micro.len(),
                mappings,
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DIRECTION", "KEY", "TRANSLATION"]);
            for m in &mappings {
                table.add_row(vec![
                    m.direction.to_string(),
                    m.key.to_string(),
                    m.translation.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!(
                "{source}: {} gui, {} micro",
                tables.gui.len(),
                tables.micro.len()
            );
            for m in &mappings {
                println!("{:<5} {} -> {}", m.direction.label(), m.key, m.translation);
            }
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}
