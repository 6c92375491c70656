mod app;
mod entry;
mod logger;
mod shutdown_handlers;

use podchurn::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
