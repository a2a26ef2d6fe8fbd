use super::*;

#[test]
fn parses_run_defaults() {
    let cli = Cli::try_parse_from(["batnews-cli", "run"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Run {
            dry_run: false,
            output_dir: None
        }
    ));
}

#[test]
fn parses_run_with_dry_run_and_output_dir() {
    let cli = Cli::try_parse_from(["batnews-cli", "run", "--dry-run", "--output-dir", "/tmp/out"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Run {
            dry_run: true,
            output_dir: Some(ref dir)
        } if dir == &PathBuf::from("/tmp/out")
    ));
}

#[test]
fn parses_preview_with_provider() {
    let cli = Cli::try_parse_from(["batnews-cli", "preview", "--provider", "google"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Preview {
            provider: Provider::Google,
            top_k: 10
        }
    ));
}

#[test]
fn parses_preview_top_k() {
    let cli = Cli::try_parse_from([
        "batnews-cli",
        "preview",
        "--provider",
        "NAVER",
        "--top-k",
        "5",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Preview {
            provider: Provider::Naver,
            top_k: 5
        }
    ));
}

#[test]
fn preview_requires_provider() {
    assert!(Cli::try_parse_from(["batnews-cli", "preview"]).is_err());
}

#[test]
fn rejects_unknown_provider() {
    assert!(Cli::try_parse_from(["batnews-cli", "preview", "--provider", "bing"]).is_err());
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["batnews-cli"]).is_err());
}
