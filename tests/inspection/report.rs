use std::fs;
use std::path::Path;

use siginspect::app::run_with_config;
use siginspect::config::{Config, Palette};
use siginspect::error::FailureKind;
use siginspect::inspect::{Failure, Stage};
use siginspect::report::{format::BORDER, Reporter};

use crate::common::test_utils::{create_tree, fake_record, FakeService};

#[test]
fn test_reports_are_separated_by_blank_lines() {
    let mut reporter = Reporter::new(&Config::default(), Vec::new()).unwrap();
    reporter.emit(&fake_record(Path::new("one.exe"))).unwrap();
    reporter.emit(&fake_record(Path::new("two.exe"))).unwrap();
    reporter.finish(2).unwrap();

    let text = String::from_utf8(reporter.into_console()).unwrap();
    let blocks: Vec<_> = text.split("\n\n").collect();
    assert_eq!(blocks.len(), 3, "{text:?}");
    assert!(blocks[0].starts_with("Path: one.exe\n"));
    assert!(blocks[1].starts_with("Path: two.exe\n"));
    assert_eq!(blocks[2], "Certificates found: 2\n");
}

#[test]
fn test_styled_console_has_borders() {
    let config = Config {
        style: Some(Palette::default()),
        ..Config::default()
    };
    let mut reporter = Reporter::new(&config, Vec::new()).unwrap();
    reporter.emit(&fake_record(Path::new("a.exe"))).unwrap();

    let text = String::from_utf8(reporter.into_console()).unwrap();
    assert_eq!(text.matches(BORDER).count(), 2);
    assert!(text.contains("Path: a.exe"));
    assert!(text.contains("Active from: 2021-03-04 05:06:07 UTC"));
    assert!(text.contains("Certificate is valid"));
}

#[test]
fn test_verbose_file_report_layout() {
    let dir = create_tree(&["a.exe"]);
    let out = tempfile::TempDir::new().unwrap();
    let report = out.path().join("o.txt");
    let config = Config {
        output: Some(report.clone()),
        verbose: true,
        ..Config::default()
    };

    run_with_config(dir.path(), &config, FakeService::signing(&["a.exe"]), Vec::new()).unwrap();

    let expected = format!(
        "Path: {}\n\
         Issuer: CN=Fake Issuer, O=Tests\n\
         Active from: 2021-03-04 05:06:07 UTC\n\
         Active until: 2031-03-04 05:06:07 UTC\n\
         Subject: CN=Fake Subject, O=Tests\n\
         Serial number: 0A0B0C\n\
         Thumbprint: {}\n\
         Handle: 1024\n\
         Version: 3\n\
         Certificate is not archived\n\
         Certificate is valid\n\
         \n",
        dir.path().join("a.exe").display(),
        "12".repeat(20)
    );
    assert_eq!(fs::read_to_string(&report).unwrap(), expected);
}

#[test]
fn test_discovery_failures_always_shown() {
    let mut reporter = Reporter::new(&Config::default(), Vec::new()).unwrap();
    reporter
        .diagnostic(&Failure {
            path: "locked".into(),
            stage: Stage::Discovery,
            kind: FailureKind::AccessDenied,
            detail: "Permission denied (os error 13)".into(),
        })
        .unwrap();

    let text = String::from_utf8(reporter.into_console()).unwrap();
    assert_eq!(text, "locked: Access to file was denied.\n\n");
}
