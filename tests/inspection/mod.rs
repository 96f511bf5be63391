//! End-to-end tests of discovery, inspection and reporting.

mod discovery;
mod fixtures;
mod report;
mod scenarios;
