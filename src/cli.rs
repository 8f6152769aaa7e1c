use std::path::Path;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;

use crate::config;
use crate::files::service::FileService;
use crate::model::entity::EntityKey;
use crate::model::local_file::LocalFile;
use crate::remote;

#[derive(Debug, PartialEq)]
pub enum Command {
    Open { key: EntityKey, edit: bool },
    Fetch { key: EntityKey },
    Save { key: EntityKey },
    Unlink { key: EntityKey },
    Status { key: Option<EntityKey> },
    List,
    Help,
}

/// Parse the subcommand forms:
///   ytf open <KEY> [-n|--no-edit]
///   ytf fetch|save|unlink <KEY>
///   ytf status [KEY]
///   ytf list
pub fn parse_command(args: &[String]) -> Result<Command> {
    let Some((command, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };
    match command.as_str() {
        "open" => {
            let mut key = None;
            let mut edit = true;
            for arg in rest {
                match arg.as_str() {
                    "-n" | "--no-edit" => edit = false,
                    other if key.is_none() => key = Some(other.parse()?),
                    other => bail!("Unexpected argument '{other}'"),
                }
            }
            let Some(key) = key else {
                bail!("Usage: ytf open <KEY> [--no-edit]");
            };
            Ok(Command::Open { key, edit })
        }
        "fetch" => Ok(Command::Fetch { key: single_key(rest, "fetch")? }),
        "save" => Ok(Command::Save { key: single_key(rest, "save")? }),
        "unlink" => Ok(Command::Unlink { key: single_key(rest, "unlink")? }),
        "status" => match rest {
            [] => Ok(Command::Status { key: None }),
            [key] => Ok(Command::Status { key: Some(key.parse()?) }),
            _ => bail!("Usage: ytf status [KEY]"),
        },
        "list" => {
            if !rest.is_empty() {
                bail!("Usage: ytf list");
            }
            Ok(Command::List)
        }
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => bail!("Unknown command '{other}'. Run 'ytf help' for usage."),
    }
}

fn single_key(rest: &[String], command: &str) -> Result<EntityKey> {
    match rest {
        [key] => key.parse(),
        _ => bail!("Usage: ytf {command} <KEY>"),
    }
}

pub async fn run(args: &[String]) -> Result<()> {
    let command = parse_command(args)?;
    if command == Command::Help {
        print_help();
        return Ok(());
    }

    let config = config::load_config()?;
    let tracker = remote::create_tracker(&config);
    let (changes_tx, _changes) = mpsc::unbounded_channel();
    let mut service = FileService::new(config.files_dir(), tracker, changes_tx);
    service.rescan();

    match command {
        Command::Open { key, edit } => {
            let path = service.open_for_edit(&key).await?;
            println!("{}", path.display());
            if edit {
                spawn_editor(&path)?;
            }
        }
        Command::Fetch { key } => {
            service.fetch(key.as_str()).await?;
            println!("{key} refreshed from remote");
        }
        Command::Save { key } => {
            service.save(key.as_str()).await?;
            println!("{key} saved to remote");
        }
        Command::Unlink { key } => {
            service.unlink(key.as_str())?;
            println!("{key} unlinked");
        }
        Command::Status { key } => print_status(&service, key.as_ref()).await?,
        Command::List => print_list(&service),
        Command::Help => {}
    }
    Ok(())
}

async fn print_status(service: &FileService, key: Option<&EntityKey>) -> Result<()> {
    if !service.is_connected() {
        bail!("Not connected to YouTrack. Add [youtrack] base_url and token to ~/.yt-files/config.toml");
    }
    match key {
        Some(key) => {
            let file = service
                .get(key.as_str())
                .with_context(|| format!("{key} is not tracked locally"))?;
            print_status_line(service, file).await;
        }
        None => {
            let tracked = service.tracked();
            if tracked.is_empty() {
                println!("No tracked files in {}", service.dir().display());
                return Ok(());
            }
            for file in tracked {
                print_status_line(service, file).await;
            }
        }
    }
    Ok(())
}

async fn print_status_line(service: &FileService, file: &LocalFile) {
    match service.status_of(file).await {
        Ok(status) => println!(
            "{:<12} {:<9} {}",
            file.key.as_str(),
            status.as_str(),
            file.metadata.summary
        ),
        Err(e) => println!("{:<12} {:<9} {e}", file.key.as_str(), "error"),
    }
}

fn print_list(service: &FileService) {
    let tracked = service.tracked();
    if tracked.is_empty() {
        println!("No tracked files in {}", service.dir().display());
        return;
    }
    for file in tracked {
        println!(
            "{:<12} {:<8} {}",
            file.key.as_str(),
            file.key.kind().as_str(),
            file.path.display()
        );
    }
}

/// Launch `$VISUAL`/`$EDITOR` (falling back to vi) on the file and wait
/// for it to exit.
pub fn spawn_editor(path: &Path) -> Result<()> {
    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());
    let status = std::process::Command::new(&editor)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to spawn {editor}"))?;
    if !status.success() {
        bail!("{editor} exited with {status}");
    }
    Ok(())
}

pub fn print_help() {
    println!("ytf — YouTrack issues and articles as local files\n");
    println!("USAGE:");
    println!("  ytf                Launch the TUI");
    println!("  ytf open <KEY>     Track an entity and open its file in $EDITOR");
    println!("  ytf fetch <KEY>    Overwrite the local file with the remote state");
    println!("  ytf save <KEY>     Push the local file to YouTrack");
    println!("  ytf unlink <KEY>   Delete the local file and stop tracking it");
    println!("  ytf status [KEY]   Show sync status for one or all tracked files");
    println!("  ytf list           List tracked files");
    println!();
    println!("OPEN OPTIONS:");
    println!("  -n, --no-edit      Only print the file path, do not launch $EDITOR");
    println!();
    println!("KEYS:");
    println!("  TEST-123           An issue in project TEST");
    println!("  TEST-A-123         An article in project TEST");
    println!();
    println!("Config lives in ~/.yt-files/config.toml");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_args_shows_help() {
        assert_eq!(parse_command(&[]).unwrap(), Command::Help);
    }

    #[test]
    fn parse_open() {
        let cmd = parse_command(&args(&["open", "TEST-1"])).unwrap();
        let Command::Open { key, edit } = cmd else {
            panic!("expected open");
        };
        assert_eq!(key.as_str(), "TEST-1");
        assert!(edit);
    }

    #[test]
    fn parse_open_no_edit() {
        let cmd = parse_command(&args(&["open", "TEST-1", "--no-edit"])).unwrap();
        let Command::Open { edit, .. } = cmd else {
            panic!("expected open");
        };
        assert!(!edit);
    }

    #[test]
    fn parse_open_flag_before_key() {
        let cmd = parse_command(&args(&["open", "-n", "TEST-1"])).unwrap();
        let Command::Open { key, edit } = cmd else {
            panic!("expected open");
        };
        assert_eq!(key.as_str(), "TEST-1");
        assert!(!edit);
    }

    #[test]
    fn parse_open_without_key_fails() {
        let result = parse_command(&args(&["open"]));
        assert!(result.unwrap_err().to_string().contains("Usage"));
    }

    #[test]
    fn parse_open_with_extra_argument_fails() {
        let result = parse_command(&args(&["open", "TEST-1", "TEST-2"]));
        assert!(result.unwrap_err().to_string().contains("Unexpected"));
    }

    #[test]
    fn parse_open_normalizes_the_key() {
        let cmd = parse_command(&args(&["open", "test-a-7"])).unwrap();
        let Command::Open { key, .. } = cmd else {
            panic!("expected open");
        };
        assert_eq!(key.as_str(), "TEST-A-7");
    }

    #[test]
    fn parse_fetch_save_unlink() {
        let fetch = parse_command(&args(&["fetch", "TEST-1"])).unwrap();
        assert!(matches!(fetch, Command::Fetch { .. }));
        let save = parse_command(&args(&["save", "TEST-1"])).unwrap();
        assert!(matches!(save, Command::Save { .. }));
        let unlink = parse_command(&args(&["unlink", "TEST-1"])).unwrap();
        assert!(matches!(unlink, Command::Unlink { .. }));
    }

    #[test]
    fn parse_save_without_key_fails() {
        let result = parse_command(&args(&["save"]));
        assert!(result.unwrap_err().to_string().contains("Usage: ytf save"));
    }

    #[test]
    fn parse_status_with_and_without_key() {
        assert_eq!(
            parse_command(&args(&["status"])).unwrap(),
            Command::Status { key: None }
        );
        let cmd = parse_command(&args(&["status", "TEST-1"])).unwrap();
        let Command::Status { key: Some(key) } = cmd else {
            panic!("expected keyed status");
        };
        assert_eq!(key.as_str(), "TEST-1");
    }

    #[test]
    fn parse_list() {
        assert_eq!(parse_command(&args(&["list"])).unwrap(), Command::List);
        assert!(parse_command(&args(&["list", "extra"])).is_err());
    }

    #[test]
    fn parse_help_flags() {
        for form in ["help", "--help", "-h"] {
            assert_eq!(parse_command(&args(&[form])).unwrap(), Command::Help);
        }
    }

    #[test]
    fn parse_bad_key_fails() {
        assert!(parse_command(&args(&["open", "not-a-key"])).is_err());
        assert!(parse_command(&args(&["status", "123"])).is_err());
    }

    #[test]
    fn parse_unknown_command_fails() {
        let result = parse_command(&args(&["frobnicate"]));
        assert!(result.unwrap_err().to_string().contains("Unknown command"));
    }
}
