use scroll_reveal_core::{Config, Phase, RevealController, SetupOutcome};
use scroll_reveal_test_fixtures::{memory_page, page, page_names};

#[test]
fn manifest_lists_every_page() {
    let names = page_names();
    assert!(names.contains(&"landing"));
    assert!(names.contains(&"four-cards"));
    for name in names {
        page(name).unwrap_or_else(|e| panic!("fixture {name}: {e:#}"));
    }
    assert!(page("missing").is_err());
}

#[test]
fn setup_invariants_hold_on_every_fixture() {
    for name in page_names() {
        let fixture = page(name).unwrap();
        let mut host = memory_page(name).unwrap();
        let mut ctl = RevealController::new(Config::default());
        let outcome = ctl.start(&mut host).unwrap();

        match outcome {
            SetupOutcome::Watching { targets, .. } => {
                assert!(targets > 0, "{name}");
                assert!(host.root_has_class("reveal-init"), "{name}");
                assert!(host.watcher_installed(), "{name}");
                assert_eq!(host.observe_calls(), targets, "{name}");
            }
            SetupOutcome::ReducedMotion | SetupOutcome::NoTargets => {
                assert!(!host.root_has_class("reveal-init"), "{name}");
                assert!(!host.watcher_installed(), "{name}");
                assert!(host.with_class("reveal").is_empty(), "{name}");
                assert!(matches!(ctl.phase(), Phase::Skipped(_)), "{name}");
            }
        }
        if fixture.reduced_motion {
            assert_eq!(outcome, SetupOutcome::ReducedMotion, "{name}");
        }

        let mut seen = Vec::new();
        for t in ctl.targets() {
            assert!(t.delay_ms <= 240, "{name}");
            assert_eq!(t.delay_ms % 60, 0, "{name}");
            if !seen.contains(&t.group_index) {
                assert_eq!(t.delay_ms, 0, "{name}: group starts at 0ms");
                seen.push(t.group_index);
            }
            assert!(host.has_class(t.element, "reveal"), "{name}");
            assert!(!host.has_class(t.element, "in"), "{name}");
        }
    }
}
