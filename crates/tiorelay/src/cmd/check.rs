use tiorelay_map::load_from_path;

use crate::cmd::CheckArgs;
use crate::exit::{map_error, CliResult, SUCCESS};
use crate::output::{print_tables, OutputFormat};

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let tables =
        load_from_path(&args.map).map_err(|err| map_error("translation map load failed", err))?;
    print_tables(&tables, &args.map.display().to_string(), format);
    Ok(SUCCESS)
}
