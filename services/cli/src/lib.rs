mod cli;
mod commands;

use jobhound::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
