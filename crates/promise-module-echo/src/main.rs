//! Binary entrypoint for the echo promise module.

use std::io::{self, BufReader, Write};

use ortho_config::OrthoConfig;
use promise_module::telemetry;
use promise_module_config::TelemetrySettings;
use promise_module_echo::{MODULE_NAME, MODULE_VERSION, run};
use tracing::debug;

fn main() {
    let settings = match TelemetrySettings::load_from_iter(std::env::args_os()) {
        Ok(settings) => settings,
        Err(error) => exit_with(&*error),
    };
    if let Err(error) = telemetry::initialise(&settings) {
        exit_with(&error);
    }
    debug!(module = MODULE_NAME, version = MODULE_VERSION, "module started");

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    match run(&mut reader, &mut writer) {
        Ok(summary) => debug!(
            lines_read = summary.lines_read(),
            responses_written = summary.responses_written(),
            "module finished"
        ),
        Err(error) => exit_with(&error),
    }
}

fn exit_with(error: &dyn std::error::Error) -> ! {
    writeln!(io::stderr().lock(), "{error}").ok();
    std::process::exit(1);
}
