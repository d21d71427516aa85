use super::*;
use crate::config::UserEntry;

fn roster() -> UserRoster {
    UserRoster::new(vec![
        UserEntry {
            username: "Milan".into(),
            password: "1234".into(),
        },
        UserEntry {
            username: "Gast".into(),
            password: String::new(),
        },
    ])
}

#[test]
fn display_name_falls_back_to_unknown() {
    assert_eq!(Session::anonymous().display_name(), "Unknown");
    assert_eq!(Session::new("   ").display_name(), "Unknown");
    assert_eq!(Session::new("Milan").display_name(), "Milan");
}

#[test]
fn is_user_matches_exactly() {
    let session = Session::new("Milan");
    assert!(session.is_user("Milan"));
    assert!(!session.is_user("milan"));
    assert!(!Session::anonymous().is_user("Unknown"));
}

#[test]
fn padded_name_is_kept_verbatim() {
    let session = UserRoster::default()
        .authenticate(Some(" Milan"), "")
        .unwrap();
    assert_eq!(session.current_user(), Some(" Milan"));
    assert!(!session.is_user("Milan"));
}

#[test]
fn empty_roster_accepts_any_name() {
    let empty = UserRoster::default();
    assert_eq!(
        empty.authenticate(Some("Eve"), "whatever").unwrap(),
        Session::new("Eve")
    );
    assert_eq!(empty.authenticate(None, "").unwrap(), Session::anonymous());
}

#[test]
fn roster_checks_password() {
    let roster = roster();
    assert_eq!(
        roster.authenticate(Some("Milan"), "1234").unwrap(),
        Session::new("Milan")
    );
    assert_eq!(
        roster.authenticate(Some("Milan"), "nope"),
        Err(LoginError::WrongPassword("Milan".into()))
    );
    assert_eq!(
        roster.authenticate(Some("Eve"), ""),
        Err(LoginError::UnknownUser("Eve".into()))
    );
}

#[test]
fn missing_name_uses_preselected_user() {
    let roster = roster();
    assert_eq!(roster.default_user(), Some("Milan"));
    assert_eq!(
        roster.authenticate(None, "1234").unwrap(),
        Session::new("Milan")
    );
    assert_eq!(roster.usernames().collect::<Vec<_>>(), vec!["Milan", "Gast"]);
}
