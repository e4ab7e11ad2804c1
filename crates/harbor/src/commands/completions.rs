use clap::ArgMatches;
use clap_complete::Shell;

use crate::app;

pub fn handle_completions_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let shell = *matches
        .get_one::<Shell>("shell")
        .expect("shell is required");
    let mut cli = app::build_cli();
    clap_complete::generate(shell, &mut cli, "harbor", &mut std::io::stdout());
    Ok(())
}
