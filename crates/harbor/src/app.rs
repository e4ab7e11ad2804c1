use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("harbor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run guest apps as hosted sub-processes in multitask windows")
        .long_about("Harbor launches independently-packaged guest apps as hosted sub-processes and presents them concurrently in resizable floating windows. Installed bundles live in the Harbor library; a refresh operation re-stages and re-signs them via a helper process.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Launch one or more guest apps and run them until they exit")
                .arg(
                    Arg::new("bundle-id")
                        .help("Bundle ids of the guest apps to launch")
                        .required(true)
                        .num_args(1..)
                )
                .arg(
                    Arg::new("container")
                        .long("container")
                        .short('c')
                        .help("Container id for guest data (overrides config)")
                )
                .arg(
                    Arg::new("maximized")
                        .long("maximized")
                        .help("Open guest windows maximized")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("apps")
                .about("List installed guest app bundles")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("install")
                .about("Install a bundle directory into the Harbor library")
                .arg(
                    Arg::new("path")
                        .help("Path to a bundle directory containing bundle.toml")
                        .required(true)
                        .index(1)
                )
                .arg(
                    Arg::new("id")
                        .long("id")
                        .help("Bundle id to install under (defaults to the directory name)")
                )
        )
        .subcommand(
            Command::new("refresh")
                .about("Refresh all installed apps via the helper process")
        )
        .subcommand(
            Command::new("refresh-worker")
                .about("Internal refresh helper entry point")
                .hide(true)
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .help("Shell to generate completions for")
                        .required(true)
                        .value_parser(clap::value_parser!(clap_complete::Shell))
                )
        )
}
