//! Tests for the search parser and end-to-end search properties.

use super::*;
use crate::record::{PaperRow, PaperTag, PaperViewer};

struct Fixture {
    topics: TopicTable,
    decisions: LabelTable,
    rounds: LabelTable,
}

impl Fixture {
    fn new() -> Self {
        Self {
            topics: TopicTable::new([(1, "Networking"), (2, "Security"), (3, "Databases")]),
            decisions: LabelTable::new([("accept", 1), ("reject", -1)]),
            rounds: LabelTable::new([("R1", 1), ("R2", 2)]),
        }
    }

    fn context(&self) -> SearchContext<'_> {
        SearchContext::new(&self.topics, &self.decisions, &self.rounds)
    }

    fn parse(&self, text: &str) -> (SearchTerm, SearchWarnings) {
        Search::parse(text, &self.context()).into_parts()
    }

    fn parse_clean(&self, text: &str) -> SearchTerm {
        let (term, warnings) = self.parse(text);
        assert!(warnings.is_empty(), "unexpected warnings for {text:?}: {warnings:?}");
        term
    }
}

fn accepted() -> SearchTerm {
    DecisionTerm::new(CountMatcher::equals(1)).into()
}

fn topic(ids: &[i64]) -> SearchTerm {
    TopicTerm::new(TopicSet::Ids(ids.iter().copied().collect()), false).into()
}

fn fixture_papers() -> Vec<PaperRow> {
    let mut papers: Vec<PaperRow> = (1..=6).map(PaperRow::new).collect();
    papers[0].outcome = 1;
    papers[0].topics = vec![1];
    papers[0].title = "Congestion control".to_string();
    papers[1].outcome = -1;
    papers[1].topics = vec![2];
    papers[1].tags = vec![PaperTag {
        tag: "award".to_string(),
        value: 3,
    }];
    papers[2].outcome = 1;
    papers[2].topics = vec![3];
    papers[2].review_rounds = vec![1, 2, 2];
    papers[3].time_withdrawn = 5;
    papers[4].authors = "Grace Hopper".to_string();
    papers[5].abstract_text = "Query optimization for networks".to_string();
    papers
}

// ==================== Word Dispatch Tests ====================

#[test]
fn test_parse_decision_word() {
    let fixture = Fixture::new();
    assert_eq!(fixture.parse_clean("dec:accept"), accepted());
    assert_eq!(fixture.parse_clean("decision:accept"), accepted());
    assert_eq!(fixture.parse_clean("DEC:Accept"), accepted());
}

#[test]
fn test_parse_paper_ids() {
    let fixture = Fixture::new();
    let id = |m: CountMatcher| SearchTerm::from(PaperIdTerm::new(m));

    assert_eq!(fixture.parse_clean("12"), id(CountMatcher::equals(12)));
    assert_eq!(fixture.parse_clean("#12"), id(CountMatcher::equals(12)));
    assert_eq!(
        fixture.parse_clean("3-9"),
        id(CountMatcher::range(3, 9).unwrap())
    );
    assert_eq!(
        fixture.parse_clean("pid:>100"),
        id(CountMatcher::new(CompareOp::Gt, 100))
    );
}

#[test]
fn test_parse_tag_words() {
    let fixture = Fixture::new();
    assert_eq!(fixture.parse_clean("#award"), TagTerm::new("award", None).into());
    assert_eq!(
        fixture.parse_clean("tag:order#>=2"),
        TagTerm::new("order", Some(CountMatcher::new(CompareOp::Ge, 2))).into()
    );
}

#[test]
fn test_parse_text_words() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.parse_clean(r#"ti:"congestion control""#),
        TextTerm::new(TextField::Title, "congestion control").into()
    );
    assert_eq!(
        fixture.parse_clean("au:hopper"),
        TextTerm::new(TextField::Authors, "hopper").into()
    );

    let bare = fixture.parse_clean("graph");
    assert_eq!(bare.kind(), "or");
    let fields: Vec<ConditionNode> = bare
        .children()
        .iter()
        .map(SearchTerm::compile_condition)
        .collect();
    assert_eq!(
        fields,
        vec![
            ConditionNode::Text { field: TextField::Title, text: "graph".into() },
            ConditionNode::Text { field: TextField::Abstract, text: "graph".into() },
            ConditionNode::Text { field: TextField::Authors, text: "graph".into() },
        ]
    );
}

#[test]
fn test_parse_phrase_searches_text() {
    let fixture = Fixture::new();
    let term = fixture.parse_clean(r#""dec:accept""#);
    assert_eq!(term.kind(), "or");
    assert_eq!(term.children()[0], TextTerm::new(TextField::Title, "dec:accept").into());
}

#[test]
fn test_parse_review_words() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.parse_clean("re:>=2"),
        ReviewCountTerm::new(CountMatcher::new(CompareOp::Ge, 2)).into()
    );
    assert_eq!(fixture.parse_clean("round:R2"), RoundTerm::new(2).into());
    assert_eq!(
        fixture.parse_clean("is:withdrawn"),
        StatusTerm::new(PaperStatus::Withdrawn).into()
    );
}

#[test]
fn test_parse_unknown_keyword() {
    let fixture = Fixture::new();
    let (term, warnings) = fixture.parse("foo:bar");
    assert_eq!(term, SearchTerm::False);
    assert_eq!(warnings.len(), 1);
    assert!(warnings.messages()[0].contains("foo:"));
}

#[test]
fn test_parse_unknown_keyword_suggests() {
    let fixture = Fixture::new();
    let (_, warnings) = fixture.parse("topc:net");
    assert_eq!(
        warnings.messages(),
        vec!["Unknown search keyword \"topc:\". Did you mean \"topic:\"?"]
    );
}

// ==================== Grammar Tests ====================

#[test]
fn test_parse_empty_is_true() {
    let fixture = Fixture::new();
    assert_eq!(fixture.parse_clean(""), SearchTerm::True);
    assert_eq!(fixture.parse_clean("   "), SearchTerm::True);
}

#[test]
fn test_parse_juxtaposition_is_and() {
    let fixture = Fixture::new();
    let expected = SearchTerm::And(vec![accepted(), topic(&[1])]);
    assert_eq!(fixture.parse_clean("dec:accept topic:net"), expected);
    assert_eq!(fixture.parse_clean("dec:accept AND topic:net"), expected);
    assert_eq!(fixture.parse_clean("dec:accept && topic:net"), expected);
}

#[test]
fn test_parse_or() {
    let fixture = Fixture::new();
    let expected = SearchTerm::Or(vec![accepted(), topic(&[1])]);
    assert_eq!(fixture.parse_clean("dec:accept OR topic:net"), expected);
    assert_eq!(fixture.parse_clean("dec:accept | topic:net"), expected);
}

#[test]
fn test_parse_precedence() {
    let fixture = Fixture::new();
    let term = fixture.parse_clean("dec:accept topic:net OR topic:sec");
    assert_eq!(
        term,
        SearchTerm::Or(vec![
            SearchTerm::And(vec![accepted(), topic(&[1])]),
            topic(&[2]),
        ])
    );
}

#[test]
fn test_parse_parentheses() {
    let fixture = Fixture::new();
    let term = fixture.parse_clean("dec:accept (topic:net OR topic:sec)");
    assert_eq!(
        term,
        SearchTerm::And(vec![
            accepted(),
            SearchTerm::Or(vec![topic(&[1]), topic(&[2])]),
        ])
    );
}

#[test]
fn test_parse_negation_forms() {
    let fixture = Fixture::new();
    let expected = SearchTerm::negate(accepted());
    assert_eq!(fixture.parse_clean("-dec:accept"), expected);
    assert_eq!(fixture.parse_clean("!dec:accept"), expected);
    assert_eq!(fixture.parse_clean("NOT dec:accept"), expected);
}

#[test]
fn test_parse_negated_unknown_word_matches_everything() {
    let fixture = Fixture::new();
    let (term, warnings) = fixture.parse("-foo:bar");
    assert_eq!(term, SearchTerm::negate(SearchTerm::False));
    assert_eq!(warnings.len(), 1);
    assert!(term.evaluate(&PaperRow::new(1), &PaperViewer::committee_member()));
}

#[test]
fn test_parse_missing_close_paren() {
    let fixture = Fixture::new();
    let (term, warnings) = fixture.parse("(dec:accept OR topic:net");
    assert_eq!(term, SearchTerm::Or(vec![accepted(), topic(&[1])]));
    assert_eq!(warnings.messages(), vec!["Missing \")\"."]);
}

#[test]
fn test_parse_unmatched_close_paren() {
    let fixture = Fixture::new();
    let (term, warnings) = fixture.parse("dec:accept) topic:net");
    assert_eq!(term, SearchTerm::And(vec![accepted(), topic(&[1])]));
    assert_eq!(warnings.messages(), vec!["Ignoring unmatched \")\"."]);
}

#[test]
fn test_parse_dangling_operators() {
    let fixture = Fixture::new();

    let (term, warnings) = fixture.parse("dec:accept OR");
    assert_eq!(term, accepted());
    assert_eq!(warnings.len(), 1);

    let (term, warnings) = fixture.parse("AND dec:accept");
    assert_eq!(term, accepted());
    assert_eq!(warnings.len(), 1);

    let (term, warnings) = fixture.parse("dec:accept NOT");
    assert_eq!(term, accepted());
    assert_eq!(warnings.len(), 1);
}

#[test]
fn test_parse_unterminated_quote_warns() {
    let fixture = Fixture::new();
    let (term, warnings) = fixture.parse(r#"ti:"open"#);
    assert_eq!(term, TextTerm::new(TextField::Title, "open").into());
    assert_eq!(warnings.len(), 1);
}

#[test]
fn test_parse_truncates_long_searches() {
    let fixture = Fixture::new();
    let context = fixture.context().with_max_terms(2);
    let search = Search::parse("1 2 3 4", &context);

    assert_eq!(search.warnings().len(), 1);
    assert_eq!(search.term().children().len(), 2);
}

fn count_depth_warnings(warnings: &SearchWarnings) -> usize {
    warnings
        .messages()
        .iter()
        .filter(|m| m.contains("nested too deeply"))
        .count()
}

#[test]
fn test_parse_deep_nesting_warns() {
    let fixture = Fixture::new();
    let text = format!("{}dec:accept", "(".repeat(5_000));
    let (term, warnings) = fixture.parse(&text);

    assert_eq!(term, SearchTerm::False);
    assert_eq!(count_depth_warnings(&warnings), 1);
}

#[test]
fn test_parse_deep_negation_warns() {
    let fixture = Fixture::new();
    let text = format!("{}dec:accept", "!".repeat(5_000));
    let (term, warnings) = fixture.parse(&text);

    assert_eq!(count_depth_warnings(&warnings), 1);
    let viewer = PaperViewer::omniscient();
    assert!(fixture_papers().iter().all(|p| !term.evaluate(p, &viewer)));
}

#[test]
fn test_parse_nesting_at_depth_limit() {
    let fixture = Fixture::new();
    let context = fixture.context().with_max_depth(2);

    let search = Search::parse("((dec:accept))", &context);
    assert!(search.warnings().is_empty());
    assert_eq!(*search.term(), accepted());

    let search = Search::parse("(((dec:accept))) OR 12", &context);
    assert_eq!(count_depth_warnings(search.warnings()), 1);
    assert_eq!(search.warnings().len(), 1);
    assert_eq!(
        *search.term(),
        SearchTerm::from(PaperIdTerm::new(CountMatcher::equals(12)))
    );

    let context = fixture.context().with_max_depth(1);
    let search = Search::parse("!!dec:accept", &context);
    assert_eq!(search.warnings().len(), 1);
    assert_eq!(*search.term(), SearchTerm::negate(SearchTerm::False));
}

#[test]
fn test_parse_warning_order() {
    let fixture = Fixture::new();
    let (_, warnings) = fixture.parse("topic:zzz dec:zzz is:zzz");
    let messages = warnings.messages();
    assert_eq!(messages.len(), 3);
    assert!(messages[0].starts_with("No topics match"));
    assert!(messages[1].starts_with("Unknown decision"));
    assert!(messages[2].starts_with("Unknown paper status"));
}

// ==================== Search Property Tests ====================

#[test]
fn test_unknown_topic_compiles_and_matches_nothing() {
    let fixture = Fixture::new();
    let (term, warnings) = fixture.parse("topic:doesnotexist");

    assert_eq!(warnings.len(), 1);
    assert!(warnings.messages()[0].contains("doesnotexist"));

    let compiled = SearchCompiler::compile(term);
    let viewer = PaperViewer::omniscient();
    for paper in fixture_papers() {
        assert!(!compiled.term().evaluate(&paper, &viewer));
    }
    assert_eq!(compiled.where_clause(), Some("false"));
}

#[test]
fn test_negation_involution() {
    let fixture = Fixture::new();
    let viewers = [
        PaperViewer::omniscient(),
        PaperViewer::committee_member(),
        PaperViewer::omniscient().with_conflict(2),
    ];

    for text in ["dec:accept", "#award", "topic:net", "au:hopper", "re:>1", "is:withdrawn"] {
        let term = fixture.parse_clean(text);
        let twice = SearchTerm::negate(SearchTerm::negate(term.clone()));
        for viewer in &viewers {
            for paper in fixture_papers() {
                assert_eq!(
                    term.evaluate(&paper, viewer),
                    twice.evaluate(&paper, viewer),
                    "{text} on paper {}",
                    paper.paper_id
                );
            }
        }
    }
}

#[test]
fn test_empty_combinator_laws() {
    let viewer = PaperViewer::omniscient();
    for paper in fixture_papers() {
        assert!(SearchTerm::And(vec![]).evaluate(&paper, &viewer));
        assert!(!SearchTerm::Or(vec![]).evaluate(&paper, &viewer));
    }
    assert_eq!(SearchTerm::And(vec![]).sql_fragment(), Ok("true".to_string()));
    assert_eq!(SearchTerm::Or(vec![]).sql_fragment(), Ok("false".to_string()));
}

#[test]
fn test_declare_columns_across_short_circuit() {
    let fixture = Fixture::new();
    let left = fixture.parse_clean("dec:accept");
    let both = SearchTerm::Or(vec![
        left.clone(),
        fixture.parse_clean("re:>1"),
    ]);

    let mut left_info = SearchQueryInfo::new();
    left.declare_columns(&mut left_info);
    let mut both_info = SearchQueryInfo::new();
    both.declare_columns(&mut both_info);

    assert!(left_info.columns().is_subset(both_info.columns()));
    assert!(both_info.joins().contains(&Join::Reviews));
    assert!(both_info.has_column("PaperReviews.reviewCount"));
}

#[test]
fn test_condition_export_depth_three() {
    let term = SearchTerm::And(vec![
        SearchTerm::Or(vec![
            SearchTerm::negate(accepted()),
            TagTerm::new("award", None).into(),
        ]),
        topic(&[2]),
    ]);

    let condition = term.compile_condition();
    assert_eq!(condition.kind(), "and");
    let level_one: Vec<&str> = condition.children().iter().map(ConditionNode::kind).collect();
    assert_eq!(level_one, vec!["or", "topic"]);
    let level_two: Vec<&str> = condition.children()[0]
        .children()
        .iter()
        .map(ConditionNode::kind)
        .collect();
    assert_eq!(level_two, vec!["not", "tag"]);
    assert_eq!(condition.children()[0].children()[0].children()[0].kind(), "dec");

    let json = condition.to_json().unwrap();
    let back: ConditionNode = serde_json::from_value(json).unwrap();
    assert_eq!(back, condition);
}

#[test]
fn test_condition_agrees_with_evaluate_for_full_view() {
    let fixture = Fixture::new();
    let viewer = PaperViewer::omniscient();
    for text in [
        "dec:accept topic:net",
        "-#award OR re:>=2",
        "round:R2 | is:withdrawn",
        "hopper OR optimization",
        "3-5 -dec:reject",
    ] {
        let term = fixture.parse_clean(text);
        let condition = term.compile_condition();
        for paper in fixture_papers() {
            assert_eq!(
                condition.matches(&paper),
                term.evaluate(&paper, &viewer),
                "{text} on paper {}",
                paper.paper_id
            );
        }
    }
}

#[test]
fn test_decision_label_end_to_end() {
    let fixture = Fixture::new();
    let term = fixture.parse_clean("dec:accept");
    assert_eq!(term.sql_fragment(), Ok("outcome = 1".to_string()));

    let omniscient = PaperViewer::omniscient();
    let matches: Vec<i64> = fixture_papers()
        .iter()
        .filter(|p| term.evaluate(*p, &omniscient))
        .map(|p| p.paper_id)
        .collect();
    assert_eq!(matches, vec![1, 3]);

    let blind = PaperViewer::committee_member();
    assert!(fixture_papers().iter().all(|p| !term.evaluate(p, &blind)));
}

#[test]
fn test_topic_any_and_none_on_topicless_paper() {
    let fixture = Fixture::new();
    let any = fixture.parse_clean("topic:any");
    let none = fixture.parse_clean("topic:none");
    assert_ne!(any, none);

    let viewer = PaperViewer::committee_member();
    let topicless = PaperRow::new(9);
    assert!(!any.evaluate(&topicless, &viewer));
    assert!(none.evaluate(&topicless, &viewer));
}

#[test]
fn test_compile_strategies_from_text() {
    let fixture = Fixture::new();
    let strategy = |text: &str| SearchCompiler::compile(fixture.parse_clean(text)).strategy();

    assert_eq!(strategy("topic:net ti:graph"), Strategy::SqlExact);
    assert_eq!(strategy("topic:net dec:accept"), Strategy::SqlPrefilter);
    assert_eq!(strategy("topic:net -dec:accept"), Strategy::InMemory);
    assert_eq!(strategy("-topic:net"), Strategy::SqlExact);
}
