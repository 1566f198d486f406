use std::path::PathBuf;

use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["brandpulse"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn analyze_without_flags_leaves_defaults_to_config() {
    let cli = Cli::try_parse_from(["brandpulse", "analyze"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Analyze {
            brand: None,
            window_days: None,
            no_expand: false,
            run_id: None,
            output: None,
        })
    ));
}

#[test]
fn analyze_accepts_all_flags() {
    let cli = Cli::try_parse_from([
        "brandpulse",
        "analyze",
        "--brand",
        "Acme X1",
        "--window-days",
        "14",
        "--no-expand",
        "--run-id",
        "run-42",
        "--output",
        "report.json",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Analyze {
        brand,
        window_days,
        no_expand,
        run_id,
        output,
    }) = cli.command
    else {
        panic!("expected analyze command");
    };
    assert_eq!(brand.as_deref(), Some("Acme X1"));
    assert_eq!(window_days, Some(14));
    assert!(no_expand);
    assert_eq!(run_id.as_deref(), Some("run-42"));
    assert_eq!(output, Some(PathBuf::from("report.json")));
}

#[test]
fn directed_brand_is_passed_through_verbatim() {
    let cli = Cli::try_parse_from(["brandpulse", "analyze", "--brand", "X site:forum.example.com"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Analyze { brand: Some(ref b), .. }) if b == "X site:forum.example.com"
    ));
}

#[test]
fn analyze_rejects_non_numeric_window() {
    let result = Cli::try_parse_from(["brandpulse", "analyze", "--window-days", "soon"]);
    assert!(result.is_err());
}

#[test]
fn parses_profile_command() {
    let cli = Cli::try_parse_from(["brandpulse", "profile"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Profile)));
}

#[test]
fn time_run_id_is_timestamp_shaped() {
    let id = analyze::time_run_id();
    let parts: Vec<&str> = id.split('-').collect();
    assert_eq!(parts.len(), 3, "unexpected run id {id}");
    assert_eq!(parts[0].len(), 8);
    assert_eq!(parts[1].len(), 6);
    assert_eq!(parts[2].len(), 3);
    assert!(id.chars().all(|c| c.is_ascii_digit() || c == '-'));
}
