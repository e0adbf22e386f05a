#![deny(clippy::all, clippy::pedantic)]
//! cvtsudoers: convert a sudoers policy to JSON.

use std::io;

use cvtsudoers::context::OsProbe;
use cvtsudoers::export::{Exporters, JsonExporter};
use cvtsudoers::policy_host::CliHost;
use cvtsudoers::Driver;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let json = JsonExporter::new(CliHost);
    let driver = Driver {
        probe: &OsProbe,
        exporters: Exporters { json: &json },
    };

    let outcome = driver.run(std::env::args_os(), &mut io::stdout(), &mut io::stderr());
    log::debug!("finished with {outcome:?}");
    std::process::exit(outcome.exit_code());
}
