use std::borrow::Cow;

use tiorelay_map::{load_from_path, Direction};

use crate::cmd::TranslateArgs;
use crate::exit::{map_error, CliResult, SUCCESS};
use crate::output::{print_json, print_raw, OutputFormat, TranslationOutput};

pub fn run(args: TranslateArgs, format: OutputFormat) -> CliResult<i32> {
    let tables =
        load_from_path(&args.map).map_err(|err| map_error("translation map load failed", err))?;
    let direction = Direction::from(args.direction);
    let translated = tables.table(direction).translate(&args.message);

    match format {
        OutputFormat::Json => print_json(&TranslationOutput {
            direction,
            input: &args.message,
            output: &translated,
            mapped: matches!(translated, Cow::Owned(_)),
        }),
        OutputFormat::Raw => print_raw(translated.as_bytes()),
        OutputFormat::Table | OutputFormat::Pretty => println!("{translated}"),
    }
    Ok(SUCCESS)
}
