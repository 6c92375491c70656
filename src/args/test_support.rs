use clap::Parser;

use crate::error::{AppError, AppResult};

use super::ChurnArgs;

pub(crate) fn parse_test_args<I, T>(args: I) -> AppResult<ChurnArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    ChurnArgs::try_parse_from(args).map_err(AppError::from)
}
