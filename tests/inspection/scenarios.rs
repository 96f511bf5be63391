use std::path::PathBuf;

use clap::Parser;
use siginspect::app::{self, run_with_config};
use siginspect::cli::Cli;
use siginspect::config::{Config, Palette};
use siginspect::discovery::discover;
use siginspect::error::SigInspectError;
use siginspect::inspect::{InspectionOutcome, Inspector};

use crate::common::test_utils::{create_tree, FakeService};

fn parse(args: &[&str]) -> Cli {
    Cli::parse_from(std::iter::once("siginspect").chain(args.iter().copied()))
}

fn console_text(console: Vec<u8>) -> String {
    String::from_utf8(console).unwrap()
}

#[test]
fn test_missing_root_processes_nothing() {
    let dir = create_tree(&["a.exe"]);
    let missing = dir.path().join("not-here");
    let service = FakeService::signing(&["a.exe"]);

    let mut console = Vec::new();
    let err = app::run(&parse(&[missing.to_str().unwrap()]), &service, &mut console).unwrap_err();

    assert!(matches!(err, SigInspectError::PathNotFound(ref p) if *p == missing));
    assert_eq!(
        err.to_string(),
        format!("\"{}\" is not a file nor directory.", missing.display())
    );
    assert!(service.calls().is_empty());
    assert!(console.is_empty());
}

#[test]
fn test_binaries_only_top_level() {
    let dir = create_tree(&["a.exe", "b.txt"]);
    let service = FakeService::signing(&["a.exe"]);
    let config = Config {
        binaries_only: true,
        ..Config::default()
    };

    let mut console = Vec::new();
    let summary = run_with_config(dir.path(), &config, &service, &mut console).unwrap();

    assert_eq!(service.calls(), vec![dir.path().join("a.exe")]);
    assert_eq!(summary.count, 1);
    assert!(console_text(console).ends_with("Certificates found: 1\n"));
}

#[test]
fn test_recursive_finds_nested_files() {
    let dir = create_tree(&["a.exe", "b.txt", "sub/c.dll"]);
    let service = FakeService::signing(&["a.exe", "c.dll"]);
    let config = Config {
        recursive: true,
        ..Config::default()
    };

    let summary = run_with_config(dir.path(), &config, &service, Vec::new()).unwrap();

    let calls = service.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.contains(&dir.path().join("sub").join("c.dll")));
    assert_eq!(calls.last(), Some(&dir.path().join("sub").join("c.dll")));
    assert_eq!(summary.count, 2);
    assert_eq!(summary.certificate_failures, 1);
}

#[test]
fn test_unsigned_file_diagnostic_needs_exceptions() {
    let dir = create_tree(&["signed.exe", "unsigned.exe"]);
    let service = FakeService::signing(&["signed.exe"]);
    let unsigned = dir.path().join("unsigned.exe");

    let mut quiet = Vec::new();
    let summary = run_with_config(dir.path(), &Config::default(), &service, &mut quiet).unwrap();
    assert_eq!(summary.count, 1);
    assert!(!console_text(quiet).contains("unsigned.exe"));

    let config = Config {
        show_exceptions: true,
        ..Config::default()
    };
    let mut loud = Vec::new();
    let summary = run_with_config(dir.path(), &config, &service, &mut loud).unwrap();
    assert_eq!(summary.count, 1);
    assert!(console_text(loud).contains(&format!(
        "{}: Failed to load certificate.\n\n",
        unsigned.display()
    )));
}

#[test]
fn test_count_ignores_formatting_flags() {
    let dir = create_tree(&["a.exe", "b.dll", "c.txt", "sub/d.exe", "sub/e.msi"]);
    let service = FakeService::signing(&["a.exe", "d.exe", "e.msi", "c.txt"]);
    let out_dir = tempfile::TempDir::new().unwrap();

    let base = Config {
        recursive: true,
        ..Config::default()
    };
    let variants = [
        base.clone(),
        Config {
            verbose: true,
            ..base.clone()
        },
        Config {
            show_exceptions: true,
            verbose: true,
            ..base.clone()
        },
        Config {
            style: Some(Palette::default()),
            ..base.clone()
        },
        Config {
            output: Some(out_dir.path().join("o.txt")),
            style: Some(Palette::default()),
            verbose: true,
            ..base.clone()
        },
    ];

    for config in &variants {
        let summary = run_with_config(dir.path(), config, &service, Vec::new()).unwrap();
        assert_eq!(summary.count, 4, "{config:?}");
    }
}

#[test]
fn test_count_equals_successes() {
    let dir = create_tree(&["a.exe", "b.exe", "c.exe", "d.txt"]);
    let service = FakeService::signing(&["b.exe", "d.txt"]);
    let inspector = Inspector::new(&service);

    let mut outcomes: Vec<InspectionOutcome> = Vec::new();
    let summary = inspector
        .run(discover(dir.path(), false, false), &mut |o: &InspectionOutcome| {
            outcomes.push(o.clone());
            Ok(())
        })
        .unwrap();

    assert_eq!(outcomes.len(), 4);
    let successes = outcomes.iter().filter(|o| o.is_success()).count() as u64;
    assert_eq!(summary.count, successes);
    assert_eq!(summary.count, 2);
}

#[test]
fn test_output_file_receives_reports() {
    let dir = create_tree(&["a.exe"]);
    let out_dir = tempfile::TempDir::new().unwrap();
    let report: PathBuf = out_dir.path().join("report.txt");
    let service = FakeService::signing(&["a.exe"]);

    let cli = parse(&[
        dir.path().to_str().unwrap(),
        "-o",
        report.to_str().unwrap(),
    ]);
    let mut console = Vec::new();
    app::run(&cli, &service, &mut console).unwrap();

    let written = std::fs::read_to_string(&report).unwrap();
    assert!(written.contains(&format!("Path: {}\n", dir.path().join("a.exe").display())));
    assert!(written.contains("Issuer: CN=Fake Issuer, O=Tests\n"));
    assert_eq!(console_text(console), "Certificates found: 1\n");
}
