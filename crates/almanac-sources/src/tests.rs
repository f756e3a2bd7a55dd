//! Tests for response parsing, deposit classification, and the registry.

use std::str::FromStr;

use crate::{
  config::{PartnerJournal, SourcesConfig},
  github::Issue,
  opencitations::{
    DepositStatus, filter_contributions, parse_deposit_issue, summarize_contributions,
  },
  wikidata::{SparqlResponse, escape_literal, extract_count, journal_match},
};

fn issue(raw: &str) -> Issue { serde_json::from_str(raw).unwrap() }

fn deposit_issue(number: u64, login: &str, labels: &[&str], title: &str) -> Issue {
  let labels: Vec<serde_json::Value> =
    labels.iter().map(|l| serde_json::json!({ "name": l })).collect();
  issue(
    &serde_json::json!({
      "number": number,
      "title": title,
      "state": "closed",
      "labels": labels,
      "user": { "login": login },
      "created_at": "2024-03-01T08:30:00Z",
      "closed_at": "2024-03-04T10:00:00Z",
      "html_url": format!("https://github.com/opencitations/crowdsourcing/issues/{number}"),
    })
    .to_string(),
  )
}

// ─── SPARQL parsing ──────────────────────────────────────────────────────────

#[test]
fn count_response_parses_and_extracts() {
  let raw = r#"{
    "head": { "vars": ["count"] },
    "results": { "bindings": [
      { "count": { "type": "literal",
                   "datatype": "http://www.w3.org/2001/XMLSchema#integer",
                   "value": "14" } }
    ] }
  }"#;

  let response: SparqlResponse = serde_json::from_str(raw).unwrap();
  assert_eq!(response.head.vars, ["count"]);
  assert_eq!(extract_count(&response).unwrap(), 14);
}

#[test]
fn empty_bindings_are_a_malformed_count() {
  let raw = r#"{ "results": { "bindings": [] } }"#;
  let response: SparqlResponse = serde_json::from_str(raw).unwrap();
  assert!(extract_count(&response).is_err());
}

#[test]
fn non_numeric_count_is_malformed() {
  let raw = r#"{ "results": { "bindings": [
    { "count": { "type": "literal", "value": "many" } }
  ] } }"#;
  let response: SparqlResponse = serde_json::from_str(raw).unwrap();
  assert!(extract_count(&response).is_err());
}

#[test]
fn journal_match_takes_qid_from_item_uri() {
  let raw = r#"{ "results": { "bindings": [
    { "item":      { "type": "uri", "value": "http://www.wikidata.org/entity/Q50814880" },
      "itemLabel": { "type": "literal", "value": "Journal of Spatial Information Science" },
      "issn":      { "type": "literal", "value": "1948-660X" } }
  ] } }"#;

  let response: SparqlResponse = serde_json::from_str(raw).unwrap();
  let m = journal_match(&response.results.bindings[0]).unwrap();
  assert_eq!(m.qid, "Q50814880");
  assert_eq!(m.label.as_deref(), Some("Journal of Spatial Information Science"));
  assert_eq!(m.issn.as_deref(), Some("1948-660X"));
}

#[test]
fn literals_are_escaped_for_sparql() {
  assert_eq!(escape_literal(r#"The "Best" Journal"#), r#"The \"Best\" Journal"#);
  assert_eq!(escape_literal(r"back\slash"), r"back\\slash");
}

// ─── Deposit issues ──────────────────────────────────────────────────────────

#[test]
fn deposit_title_splits_into_domain_and_identifier() {
  let parsed = parse_deposit_issue(&deposit_issue(
    17,
    "alice",
    &["done"],
    "deposit journals.example.org doi:10.1000/182",
  ));

  assert_eq!(parsed.number, 17);
  assert_eq!(parsed.domain.as_deref(), Some("journals.example.org"));
  assert_eq!(parsed.identifier.as_deref(), Some("doi:10.1000/182"));
  assert_eq!(parsed.status, DepositStatus::Done);
  assert_eq!(parsed.creator.as_deref(), Some("alice"));
  assert!(parsed.created_at.is_some());
}

#[test]
fn short_titles_leave_fields_empty() {
  let parsed = parse_deposit_issue(&deposit_issue(1, "alice", &[], "deposit"));
  assert_eq!(parsed.domain, None);
  assert_eq!(parsed.identifier, None);
  assert_eq!(parsed.status, DepositStatus::Unknown);
}

#[test]
fn status_precedence_prefers_done() {
  let parsed =
    parse_deposit_issue(&deposit_issue(2, "alice", &["to be processed", "done"], "deposit x y"));
  assert_eq!(parsed.status, DepositStatus::Done);

  let parsed = parse_deposit_issue(&deposit_issue(3, "alice", &["rejected"], "deposit x y"));
  assert_eq!(parsed.status, DepositStatus::Rejected);
}

#[test]
fn status_names_round_trip() {
  assert_eq!(DepositStatus::ToBeProcessed.to_string(), "to_be_processed");
  assert_eq!(DepositStatus::from_str("to_be_processed").unwrap(), DepositStatus::ToBeProcessed);
}

#[test]
fn contributions_filter_by_login() {
  let issues = vec![
    deposit_issue(1, "alice", &["done"], "deposit a 1"),
    deposit_issue(2, "mallory", &["done"], "deposit b 2"),
    deposit_issue(3, "alice", &["invalid"], "deposit c 3"),
  ];

  let ours = filter_contributions(&issues, &["alice".to_owned()]);
  assert_eq!(ours.len(), 2);
  assert!(ours.iter().all(|i| i.creator() == Some("alice")));
}

#[test]
fn summary_counts_by_status_creator_and_domain() {
  let issues = vec![
    deposit_issue(1, "alice", &["done"], "deposit doi 10.1/a"),
    deposit_issue(2, "alice", &["done"], "deposit doi 10.1/b"),
    deposit_issue(3, "bob", &["to be processed"], "deposit issn 1234-5678"),
  ];

  let summary = summarize_contributions(&issues);
  assert_eq!(summary.total_issues, 3);
  assert_eq!(summary.count_for(DepositStatus::Done), 2);
  assert_eq!(summary.count_for(DepositStatus::ToBeProcessed), 1);
  assert_eq!(summary.count_for(DepositStatus::Rejected), 0);
  assert_eq!(summary.by_creator["alice"], 2);
  assert_eq!(summary.by_creator["bob"], 1);
  assert_eq!(summary.by_domain["doi"], 2);
}

#[test]
fn pull_requests_are_excluded_from_summaries() {
  let pr = issue(
    r#"{
      "number": 9,
      "title": "deposit doi 10.1/x",
      "state": "open",
      "labels": [],
      "user": { "login": "alice" },
      "created_at": null,
      "closed_at": null,
      "html_url": "https://github.com/opencitations/crowdsourcing/pull/9",
      "pull_request": { "url": "https://api.github.com/repos/opencitations/crowdsourcing/pulls/9" }
    }"#,
  );
  assert!(pr.is_pull_request());

  let issues = vec![pr, deposit_issue(10, "alice", &["done"], "deposit doi 10.1/y")];
  let summary = summarize_contributions(&issues);
  assert_eq!(summary.total_issues, 1);
  assert_eq!(summary.deposits[0].number, 10);
}

// ─── Registry ────────────────────────────────────────────────────────────────

fn registry() -> SourcesConfig {
  SourcesConfig {
    contributors: vec!["alice".to_owned()],
    journals: vec![
      PartnerJournal {
        name: "Journal of Spatial Information Science".to_owned(),
        partner: "JOSIS / TU Dresden".to_owned(),
        url: Some("https://josis.org".to_owned()),
        wikidata_qid: Some("Q50814880".to_owned()),
        issn: None,
        ojs_version: Some("3.3.0.6".to_owned()),
      },
      PartnerJournal {
        name: "The Byzantine Review".to_owned(),
        partner: "WWU Münster".to_owned(),
        url: None,
        wikidata_qid: None,
        issn: None,
        ojs_version: None,
      },
    ],
    ..SourcesConfig::default()
  }
}

#[test]
fn registry_partitions_journals_by_qid() {
  let cfg = registry();
  assert_eq!(cfg.qids(), ["Q50814880"]);
  assert_eq!(cfg.journals_with_qid().count(), 1);
  assert_eq!(
    cfg.journals_without_qid().next().unwrap().name,
    "The Byzantine Review"
  );
}

#[test]
fn default_config_points_at_public_endpoints() {
  let cfg = SourcesConfig::default();
  assert_eq!(cfg.wikidata_endpoint, "https://query.wikidata.org/sparql");
  assert_eq!(cfg.opencitations_repo, "opencitations/crowdsourcing");
  assert!(cfg.user_agent.starts_with("almanac/"));
}

#[test]
fn registry_deserialises_from_toml() {
  let raw = r#"
    contributors = ["alice"]

    [[journals]]
    name = "Journal of Applied Botany and Food Quality"
    partner = "Julius Kühn-Institut"
    wikidata_qid = "Q15764825"
    ojs_version = "3.3.0.8"
  "#;

  let cfg: SourcesConfig = toml::from_str(raw).unwrap();
  assert_eq!(cfg.journals.len(), 1);
  assert_eq!(cfg.journals[0].wikidata_qid.as_deref(), Some("Q15764825"));
  // Unset endpoint fields fall back to the public defaults.
  assert_eq!(cfg.github_api_base, "https://api.github.com");
}
