use clap::{ArgMatches, CommandFactory, FromArgMatches};

use podchurn::args::ChurnArgs;
use podchurn::config::{apply_config, load_config};
use podchurn::error::AppResult;

use crate::app;

pub(crate) fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(app::run(&args))
}

fn parse_args() -> AppResult<(ChurnArgs, ArgMatches)> {
    let matches = ChurnArgs::command().get_matches();
    let args = ChurnArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}
