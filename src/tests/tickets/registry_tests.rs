use super::*;
use crate::model::{FileConfig, LinearConfig};

fn ticket(display_key: &str, summary: &str) -> Ticket {
    Ticket {
        key: display_key.to_string(),
        display_key: display_key.to_string(),
        status: "To Do".to_string(),
        summary: summary.to_string(),
    }
}

#[test]
fn bookmark_name_slugs_key_and_summary() {
    assert_eq!(
        bookmark_name_for(&ticket("ENG-142", "Fix: crash on empty repo!")),
        "eng-142-fix-crash-on-empty-repo"
    );
    assert_eq!(bookmark_name_for(&ticket("#17", "  spaces  ")), "17-spaces");
}

#[test]
fn bookmark_name_is_bounded() {
    let name = bookmark_name_for(&ticket("ENG-1", &"word ".repeat(40)));
    assert!(name.len() <= 48);
    assert!(!name.ends_with('-'));
}

#[test]
fn registry_selects_nothing_when_disabled() {
    let settings = Settings::default();
    assert!(from_settings(&settings).unwrap().is_none());
}

#[test]
fn registry_reports_missing_credentials() {
    let settings = Settings::from_layers(FileConfig {
        ticket_provider: Some(TicketProviderKind::Jira),
        ..FileConfig::default()
    });
    let err = from_settings(&settings).err().unwrap();
    assert_eq!(
        err,
        GraftError::Validation("ticket provider needs `jira.base_url`".into())
    );
}

#[test]
fn registry_builds_the_configured_provider() {
    let settings = Settings::from_layers(FileConfig {
        ticket_provider: Some(TicketProviderKind::Linear),
        linear: Some(LinearConfig {
            api_key: Some("lin_api_x".into()),
        }),
        ..FileConfig::default()
    });
    let provider = from_settings(&settings).unwrap().unwrap();
    assert_eq!(provider.name(), "linear");
}
