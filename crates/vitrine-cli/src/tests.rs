use std::path::PathBuf;

use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["vitrine-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["vitrine-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn db_seed_defaults_to_configured_file() {
    let cli = Cli::try_parse_from(["vitrine-cli", "db", "seed"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Seed {
                file: None,
                dry_run: false
            }
        })
    ));
}

#[test]
fn db_seed_accepts_file_and_dry_run() {
    let cli = Cli::try_parse_from([
        "vitrine-cli",
        "db",
        "seed",
        "--file",
        "demo/catalog.yaml",
        "--dry-run",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Db {
            command: DbCommands::Seed { file, dry_run },
        }) => {
            assert_eq!(file, Some(PathBuf::from("demo/catalog.yaml")));
            assert!(dry_run);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn users_create_takes_password_flag() {
    let cli = Cli::try_parse_from([
        "vitrine-cli",
        "users",
        "create",
        "--email",
        "ada@shop.test",
        "--password",
        "correct horse",
        "--first-name",
        "Ada",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Users {
            command:
                UsersCommands::Create {
                    email,
                    password,
                    username,
                    first_name,
                    ..
                },
        }) => {
            assert_eq!(email, "ada@shop.test");
            assert_eq!(password, "correct horse");
            assert_eq!(username, "");
            assert_eq!(first_name, "Ada");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn users_create_requires_email() {
    assert!(Cli::try_parse_from(["vitrine-cli", "users", "create", "--password", "x"]).is_err());
}

#[test]
fn parses_stock_report_flags() {
    let cli = Cli::try_parse_from(["vitrine-cli", "stock", "report", "--reorder-only"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Stock {
            command: StockCommands::Report {
                reorder_only: true,
                json: false
            }
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["vitrine-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}
