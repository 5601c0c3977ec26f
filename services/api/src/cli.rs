use crate::report::{run_capture, run_score, run_trends, CaptureArgs, ScoreArgs, TrendsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hiring_scorecard::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "hiring-scorecard",
    about = "Score recruiter and hiring manager SLA performance from ATS exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score an ATS export and print the scorecard
    Score(ScoreArgs),
    /// Record and compare scorecard snapshots over time
    Snapshot {
        #[command(subcommand)]
        command: SnapshotCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SnapshotCommand {
    /// Score an export and append it to a snapshot history file
    Capture(CaptureArgs),
    /// Compare snapshots in a history file
    Trends(TrendsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Snapshot {
            command: SnapshotCommand::Capture(args),
        } => run_capture(args),
        Command::Snapshot {
            command: SnapshotCommand::Trends(args),
        } => run_trends(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["hiring-scorecard"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_snapshot_capture() {
        let cli = Cli::try_parse_from([
            "hiring-scorecard",
            "snapshot",
            "capture",
            "--csv",
            "export.csv",
            "--history",
            "history.json",
            "--date",
            "2025-02-15",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Snapshot {
                command: SnapshotCommand::Capture(args),
            }) => {
                assert_eq!(args.csv, std::path::PathBuf::from("export.csv"));
                assert_eq!(
                    args.date,
                    chrono::NaiveDate::from_ymd_opt(2025, 2, 15)
                );
                assert!(args.cadence.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_as_of() {
        let parsed = Cli::try_parse_from([
            "hiring-scorecard",
            "score",
            "--csv",
            "export.csv",
            "--as-of",
            "01/02/2025",
        ]);
        assert!(parsed.is_err());
    }
}
