use super::*;

#[test]
fn settings_form_round_trips_resolved_values() {
    let settings = Settings::default();
    let form = SettingsForm::from_settings(&settings);
    let cfg = form.to_file_config().unwrap();
    assert_eq!(cfg.auto_refresh_secs, Some(3));
    assert_eq!(cfg.pr_refresh_secs, Some(30));
    assert_eq!(cfg.default_base_branch.as_deref(), Some("main"));
    assert_eq!(cfg.ticket_provider, Some(TicketProviderKind::None));
    assert_eq!(cfg.github_token, None);
    assert_eq!(cfg.jira, None);
}

#[test]
fn settings_form_rejects_bad_numbers_and_providers() {
    let mut form = SettingsForm::from_settings(&Settings::default());
    form.fields[0].1.set("soon".into());
    assert!(form.to_file_config().unwrap_err().contains("whole number"));

    let mut form = SettingsForm::from_settings(&Settings::default());
    let idx = form
        .fields
        .iter()
        .position(|(k, _)| *k == SettingKey::TicketProvider)
        .unwrap();
    form.fields[idx].1.set("trello".into());
    assert!(form.to_file_config().unwrap_err().contains("trello"));
}

#[test]
fn settings_form_fills_provider_sections() {
    let mut form = SettingsForm::from_settings(&Settings::default());
    for (key, input) in form.fields.iter_mut() {
        match key {
            SettingKey::TicketProvider => input.set("jira".into()),
            SettingKey::JiraBaseUrl => input.set("https://acme.atlassian.net".into()),
            SettingKey::JiraEmail => input.set("dev@acme.test".into()),
            _ => {}
        }
    }
    let cfg = form.to_file_config().unwrap();
    assert_eq!(cfg.ticket_provider, Some(TicketProviderKind::Jira));
    let jira = cfg.jira.unwrap();
    assert_eq!(jira.base_url.as_deref(), Some("https://acme.atlassian.net"));
    assert_eq!(jira.token, None);
}

#[test]
fn pr_form_cycles_fields_both_ways() {
    let mut form = Form::CreatePr(PrForm {
        bookmark: "b".into(),
        rev: "r".into(),
        move_bookmark: false,
        title: Input::default(),
        body: Input::default(),
        base: Input::default(),
        focus: PrField::Title,
        submitting: false,
    });
    form.next_field(true);
    assert!(matches!(&form, Form::CreatePr(f) if f.focus == PrField::Body));
    assert!(form.accepts_newline());
    form.next_field(true);
    form.next_field(true);
    assert!(matches!(&form, Form::CreatePr(f) if f.focus == PrField::Title));
    form.next_field(false);
    assert!(matches!(&form, Form::CreatePr(f) if f.focus == PrField::Base));
}
