#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::announcer::{
        announcement_text, global, install, shutdown, AnnouncementSink, Announcer,
        AnnouncerConfig, AnnouncerState, LiveRegion, Politeness, Transition,
    };
    use crate::error::AnnouncerError;
    use crate::navigator::Navigator;
    use crate::test_fixtures::{heading, set_tree, GatedSink, RecordingSink};
    use crate::tree::PageNode;

    fn page(name: &'static str) -> PageNode {
        PageNode::new(format!("/{}", name), name, heading(name))
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ANNOUNCEMENT TEXT
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_text_prefers_marked_element() {
        let config = AnnouncerConfig::default();
        let markup = r#"<h1>Heading</h1><p data-route-announcement>Order <b>#42</b>
            placed</p>"#;
        assert_eq!(
            announcement_text(&config, &page("orders"), markup),
            "Order #42 placed"
        );
    }

    #[test]
    fn test_text_falls_back_to_first_heading() {
        let config = AnnouncerConfig::default();
        let markup = "<div><h1 class=\"title\">  Child <em>B</em> </h1><h1>Second</h1></div>";
        assert_eq!(announcement_text(&config, &page("b"), markup), "Child B");
    }

    #[test]
    fn test_text_falls_back_to_title_then_path() {
        let config = AnnouncerConfig::default();
        let titled = page("settings").title("Account settings");
        assert_eq!(
            announcement_text(&config, &titled, "<p>no heading</p>"),
            "Account settings"
        );
        assert_eq!(
            announcement_text(&config, &page("settings"), "<h1> </h1>"),
            "new page at /settings"
        );

        let custom = AnnouncerConfig {
            fallback_prefix: "navigated to".to_string(),
            ..AnnouncerConfig::default()
        };
        assert_eq!(
            announcement_text(&custom, &page("x"), ""),
            "navigated to /x"
        );
    }

    #[test]
    fn test_text_decodes_entities() {
        let config = AnnouncerConfig::default();
        assert_eq!(
            announcement_text(&config, &page("tj"), "<h1>Tom &amp; Jerry &lt;3</h1>"),
            "Tom & Jerry <3"
        );
        assert_eq!(
            announcement_text(&config, &page("q"), "<p data-route-announcement>&quot;Saved&quot;&nbsp;</p>"),
            "\"Saved\""
        );
    }

    #[test]
    fn test_attribute_name_inside_a_value_is_not_a_marker() {
        let config = AnnouncerConfig::default();
        let markup = r#"<a href="/docs/data-route-announcement">Docs</a><h1>Real Heading</h1>"#;
        assert_eq!(announcement_text(&config, &page("docs"), markup), "Real Heading");
    }

    #[test]
    fn test_longer_attribute_name_is_not_a_marker() {
        let config = AnnouncerConfig::default();
        let markup = "<p data-route-announcement-foo>Nope</p><h1>Real Heading</h1>";
        assert_eq!(announcement_text(&config, &page("docs"), markup), "Real Heading");
    }

    #[test]
    fn test_marked_element_keeps_nested_same_tag_text() {
        let config = AnnouncerConfig::default();
        let markup = "<div data-route-announcement=\"\"><div>a</div> b</div><h1>H</h1>";
        assert_eq!(announcement_text(&config, &page("n"), markup), "a b");
    }

    #[test]
    fn test_custom_attribute_is_matched_case_insensitively() {
        let config = AnnouncerConfig {
            announcement_attribute: "Data-Announce".to_string(),
            ..AnnouncerConfig::default()
        };
        let markup = "<h1>Heading</h1><span DATA-ANNOUNCE>Marked</span>";
        assert_eq!(announcement_text(&config, &page("c"), markup), "Marked");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // STATE MACHINE
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_same_page_is_not_announced() {
        let sink = Arc::new(RecordingSink::default());
        let mut announcer = Announcer::new(sink.clone(), AnnouncerConfig::default());
        let a = page("a");

        let first = announcer.observe(Transition {
            from: None,
            to: &a,
            page_markup: "<h1>A</h1>",
        });
        assert_eq!(first.map(|a| a.text).as_deref(), Some("A"));

        let again = announcer.observe(Transition {
            from: Some("a"),
            to: &a,
            page_markup: "<h1>A</h1>",
        });
        assert!(again.is_none());
        assert_eq!(sink.messages(), vec!["A".to_string()]);
        assert_eq!(announcer.state(), &AnnouncerState::Idle);
    }

    #[test]
    fn test_each_distinct_transition_announces_once() {
        let sink = Arc::new(RecordingSink::default());
        let mut announcer = Announcer::new(sink.clone(), AnnouncerConfig::default());
        let (a, b) = (page("a"), page("b"));

        announcer.observe(Transition {
            from: Some("a"),
            to: &b,
            page_markup: "<h1>B</h1>",
        });
        announcer.observe(Transition {
            from: Some("b"),
            to: &a,
            page_markup: "<h1>A</h1>",
        });
        assert_eq!(sink.messages(), vec!["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn test_refused_announcement_is_held_until_delivered() {
        let sink = Arc::new(GatedSink::default());
        let mut announcer = Announcer::new(sink.clone(), AnnouncerConfig::default());
        let (a, b) = (page("a"), page("b"));

        let announced = announcer.observe(Transition {
            from: None,
            to: &a,
            page_markup: "<h1>A</h1>",
        });
        assert_eq!(announced.map(|x| x.text).as_deref(), Some("A"));
        assert_eq!(
            announcer.state(),
            &AnnouncerState::Announcing {
                page: "a".to_string(),
                text: "A".to_string()
            }
        );
        assert!(!announcer.retry());

        // a newer page replaces the held message instead of queueing behind it
        announcer.observe(Transition {
            from: Some("a"),
            to: &b,
            page_markup: "<h1>B</h1>",
        });
        assert!(matches!(announcer.state(), AnnouncerState::Announcing { page, .. } if page == "b"));

        sink.open();
        assert!(announcer.retry());
        assert_eq!(announcer.state(), &AnnouncerState::Idle);
        assert_eq!(sink.messages(), vec!["B".to_string()]);

        // nothing left to deliver
        assert!(announcer.retry());
        assert_eq!(sink.messages().len(), 1);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // LIVE REGION
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_live_region_keeps_latest_message() {
        let region = LiveRegion::new(AnnouncerConfig::default());
        assert_eq!(region.current(), None);

        assert!(region.announce("first"));
        assert!(region.announce("second"));
        assert_eq!(region.current().as_deref(), Some("second"));
        assert_eq!(region.emitted(), 2);
    }

    #[test]
    fn test_live_region_attributes() {
        let region = LiveRegion::new(AnnouncerConfig {
            region_id: "announcer".to_string(),
            politeness: Politeness::Polite,
            ..AnnouncerConfig::default()
        });
        let attrs = region.attributes();
        assert!(attrs.contains(&("role", "alert".to_string())));
        assert!(attrs.contains(&("aria-live", "polite".to_string())));
        assert!(attrs.contains(&("aria-atomic", "true".to_string())));
        assert!(attrs.contains(&("id", "announcer".to_string())));
        let style = &attrs.iter().find(|(k, _)| *k == "style").unwrap().1;
        assert!(style.contains("width: 1px; height: 1px"));
        assert!(!style.contains("display: none"));
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let config: AnnouncerConfig =
            serde_json::from_str(r#"{ "regionId": "sr-live", "politeness": "polite" }"#).unwrap();
        assert_eq!(config.region_id, "sr-live");
        assert_eq!(config.politeness, Politeness::Polite);
        assert!(config.atomic);
        assert_eq!(config.announcement_attribute, "data-route-announcement");
    }

    #[test]
    fn test_config_accepts_selector_alias_and_rejects_unknown_keys() {
        let config: AnnouncerConfig =
            serde_json::from_str(r#"{ "announcementSelector": "data-announce" }"#).unwrap();
        assert_eq!(config.announcement_attribute, "data-announce");

        let config: AnnouncerConfig =
            serde_json::from_str(r#"{ "announcementAttribute": "data-title" }"#).unwrap();
        assert_eq!(config.announcement_attribute, "data-title");

        let err = serde_json::from_str::<AnnouncerConfig>(r#"{ "regionID": "typo" }"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"), "{}", err);
    }

    /// The only test touching the process-wide region.
    #[test]
    fn test_process_wide_region_lifecycle() {
        let tree = Arc::new(set_tree());
        assert!(matches!(
            Navigator::with_global_region(tree.clone()),
            Err(AnnouncerError::NotInstalled)
        ));

        let region = install(AnnouncerConfig::default()).unwrap();
        assert_eq!(
            install(AnnouncerConfig::default()).unwrap_err(),
            AnnouncerError::AlreadyInstalled("route-announcer".to_string())
        );
        assert!(Arc::ptr_eq(&region, &global().unwrap()));

        let mut navigator = Navigator::with_global_region(tree).unwrap();
        let pending = navigator
            .navigate(&crate::resolve::RouteMatch::named("childB"))
            .unwrap();
        navigator.commit(pending.ticket, "<h1>ChildB</h1>");
        assert_eq!(region.current().as_deref(), Some("ChildB"));

        let removed = shutdown().unwrap();
        assert!(Arc::ptr_eq(&region, &removed));
        assert!(global().is_none());
        assert_eq!(shutdown().unwrap_err(), AnnouncerError::NotInstalled);
    }
}
