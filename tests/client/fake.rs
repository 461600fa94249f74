//! Fake GitHub API integration tests
//!
//! Exercises the typed client against the in-memory API.

use chrono::{TimeZone, Utc};
use verdict_client::{FakeApi, Octo, QuotaAwareClient, QuotaConfig};

fn octo(api: FakeApi) -> Octo {
    Octo::new(Box::new(api), QuotaConfig::default())
}

#[test]
fn lookups_round_trip_between_names_and_ids() {
    let octo = octo(FakeApi::new().with_repository_id("acme/widgets", 77));
    let id = octo.repo_id_by_name("acme/widgets").unwrap();
    assert_eq!(id, 77);
    assert_eq!(octo.repo_name_by_id(id).unwrap(), "acme/widgets");
}

#[test]
fn unknown_entities_are_not_found() {
    let octo = octo(FakeApi::new());
    assert!(octo.user_name_by_id(1).unwrap_err().is_not_found());
    assert!(octo.repo_id_by_name("nobody/nothing").unwrap_err().is_not_found());
    assert!(octo.repo_name_by_id(3).unwrap_err().is_not_found());
}

#[test]
fn bots_are_recognised() {
    let octo = octo(FakeApi::new().with_bot(7, "dependabot[bot]"));
    assert!(octo.user(7).unwrap().is_bot());
    assert!(!octo.user(444).unwrap().is_bot());
    assert!(octo.user(29_139_614).unwrap().is_bot());
}

#[test]
fn organization_listing() {
    let octo = octo(FakeApi::new());
    let mut names: Vec<_> = octo
        .repositories("yegor256")
        .unwrap()
        .into_iter()
        .map(|r| r.full_name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["yegor256/judges", "yegor256/test"]);
}

#[test]
fn events_are_reproducible_with_a_fixed_clock() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let times = |seed| -> Vec<_> {
        octo(FakeApi::new().with_clock(now).with_seed(seed))
            .repository_events("torvalds/linux")
            .unwrap()
            .into_iter()
            .map(|e| e.created_at)
            .collect()
    };
    let first = times(7);
    assert_eq!(first.len(), 3);
    assert_eq!(first, times(7));
    assert!(first.iter().all(|t| *t <= now));
}

#[test]
fn comments_get_fresh_ids() {
    let octo = octo(FakeApi::new());
    let a = octo.add_comment("yegor256/judges", 1, "first").unwrap();
    let b = octo.add_comment("yegor256/judges", 1, "second").unwrap();
    assert_ne!(a.id, b.id);
    assert!(octo.add_comment("nobody/nothing", 1, "x").unwrap_err().is_not_found());
}

#[test]
fn search_returns_issues() {
    let octo = octo(FakeApi::new());
    let found = octo.search_issues("repo:yegor256/judges is:open label:bug").unwrap();
    assert_eq!(found.total_count, 1);
    assert_eq!(found.items[0].labels[0].name, "bug");
}
