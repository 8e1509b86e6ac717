//! vsdx-shrink binary entry point.

use std::process::ExitCode;

use vsdx_shrink::cli;
use vsdx_shrink::engine::EngineError;
use vsdx_shrink::ui::output;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(&err);
            let code = err
                .downcast_ref::<EngineError>()
                .map_or(1, EngineError::exit_code);
            ExitCode::from(code)
        }
    }
}
