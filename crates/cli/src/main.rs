use clap::{Args, Parser, Subcommand};
use hms_core::config::{resolve_data_dir, seed_mode_from_env_value};
use hms_core::{CoreConfig, Identity, Role};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{
    AppointmentCmd, DashboardArgs, DoctorCmd, NotificationCmd, NurseCmd, PatientCmd, PostCmd,
    TemplateCmd, TransferCmd, WaitlistCmd,
};

#[derive(Parser)]
#[command(name = "hms")]
#[command(about = "Hospital administration store CLI")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GlobalArgs {
    /// Directory holding the JSON collections
    #[arg(long, env = "HMS_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,
    /// Fallback data for missing collections: demo or empty
    #[arg(long, env = "HMS_SEED", global = true)]
    seed: Option<String>,
    /// Role to act as: admin or clerk
    #[arg(long, env = "HMS_ROLE", default_value = "clerk", global = true)]
    role: String,
    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage patients
    #[command(subcommand)]
    Patients(PatientCmd),
    /// Manage doctors
    #[command(subcommand)]
    Doctors(DoctorCmd),
    /// Manage nurses
    #[command(subcommand)]
    Nurses(NurseCmd),
    /// Book, edit and cancel appointments
    #[command(subcommand)]
    Appointments(AppointmentCmd),
    /// Show free slots of a doctor on a date
    Slots {
        /// Doctor id
        doctor: String,
        /// Date (YYYY-MM-DD)
        #[arg(value_parser = commands::date_arg)]
        date: chrono::NaiveDate,
    },
    /// Show or replace a doctor's slot template
    #[command(subcommand)]
    Template(TemplateCmd),
    /// Show the dashboard summary
    Dashboard(DashboardArgs),
    /// Manage the waitlist
    #[command(subcommand)]
    Waitlist(WaitlistCmd),
    /// Manage transfer requests
    #[command(subcommand)]
    Transfers(TransferCmd),
    /// Community posts
    #[command(subcommand)]
    Posts(PostCmd),
    /// Staff notifications
    #[command(subcommand)]
    Notifications(NotificationCmd),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hms_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'hms --help' for commands");
        return Ok(());
    };

    let global = cli.global;
    let role: Role = global.role.parse()?;
    let identity = Identity::new(format!("cli-{}", role), role);
    let cfg = CoreConfig::new(
        resolve_data_dir(global.data_dir.map(|d| d.display().to_string())),
        seed_mode_from_env_value(global.seed)?,
    )?;
    let mut store = cfg.open_store()?;
    let out = commands::Output { json: global.json };

    match command {
        Commands::Patients(cmd) => commands::patients(&mut store, &identity, &out, cmd)?,
        Commands::Doctors(cmd) => commands::doctors(&mut store, &identity, &out, cmd)?,
        Commands::Nurses(cmd) => commands::nurses(&mut store, &identity, &out, cmd)?,
        Commands::Appointments(cmd) => commands::appointments(&mut store, &identity, &out, cmd)?,
        Commands::Slots { doctor, date } => commands::slots(&store, &out, &doctor, date)?,
        Commands::Template(cmd) => commands::template(&mut store, &identity, &out, cmd)?,
        Commands::Dashboard(args) => commands::dashboard(&store, &out, args)?,
        Commands::Waitlist(cmd) => commands::waitlist(&mut store, &identity, &out, cmd)?,
        Commands::Transfers(cmd) => commands::transfers(&mut store, &identity, &out, cmd)?,
        Commands::Posts(cmd) => commands::posts(&mut store, &identity, &out, cmd)?,
        Commands::Notifications(cmd) => commands::notifications(&mut store, &identity, &out, cmd)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_nested_subcommand_with_global_flags() {
        let cli = Cli::try_parse_from([
            "hms",
            "appointments",
            "cancel",
            "A-001",
            "--waitlist",
            "--role",
            "admin",
            "--data-dir",
            "/tmp/hms",
        ])
        .unwrap();

        assert_eq!(cli.global.role, "admin");
        assert_eq!(cli.global.data_dir, Some(PathBuf::from("/tmp/hms")));
        assert!(matches!(
            cli.command,
            Some(Commands::Appointments(AppointmentCmd::Cancel { waitlist: true, .. }))
        ));
    }

    #[test]
    fn test_rejects_malformed_date() {
        let parsed = Cli::try_parse_from(["hms", "slots", "D-001", "20/12/2025"]);
        assert!(parsed.is_err());
    }
}
