//! End-to-end streaming tests
//!
//! Drive the bundled grammars through the streaming adapter and check the
//! event stream a consumer sees.

mod common;

use common::{
    assert_balanced, first_sublanguage, record, sublanguage_bounds, sublanguages, text_between,
};
use hlstream::engine::tracing_emitter::TracingEmitter;
use hlstream::engine::{Emitter, EmitterFactory, EngineError, HighlightOptions};
use hlstream::stream::{AdapterError, Replayable, StreamingSession};
use hlstream::{highlight, HighlightError, Operation, OperationLog, StreamingEmitter, StreamingHighlighter};

const SCRIPT_PAGE: &str = "<script>function add(x, y) { return x + y }</script>";
const SCRIPT_BODY: &str = "function add(x, y) { return x + y }";

/// Counts every call it receives
#[derive(Default)]
struct CallCounter {
    calls: usize,
}

impl StreamingEmitter for CallCounter {
    fn begin_scope(&mut self, _name: &str) {
        self.calls += 1;
    }

    fn end_scope(&mut self) {
        self.calls += 1;
    }

    fn emit_text(&mut self, _text: &str) {
        self.calls += 1;
    }

    fn begin_sublanguage(&mut self, _name: &str) {
        self.calls += 1;
    }

    fn end_sublanguage(&mut self) {
        self.calls += 1;
    }
}

// ========================================================================
// Sub-language replay
// ========================================================================

#[test]
fn test_script_element_streams_one_sublanguage() {
    let log = record(SCRIPT_PAGE, "html");

    assert_eq!(sublanguages(&log), vec!["javascript"]);
    let end_markers = log
        .iter()
        .filter(|op| matches!(op, Operation::EndSublanguage))
        .count();
    assert_eq!(end_markers, 1);
    assert_eq!(log.text(), SCRIPT_PAGE);
    assert_balanced(&log);
}

#[test]
fn test_tag_scopes_surround_sublanguage() {
    let log = record(SCRIPT_PAGE, "html");
    let ops = log.operations();
    let (start, end) = sublanguage_bounds(&log, "javascript")[0];

    let tag_before = ops[..start].windows(2).any(|pair| {
        matches!(&pair[0], Operation::BeginScope { name } if name == "tag")
            && matches!(&pair[1], Operation::EmitText { text } if text == "script")
    });
    let tag_after = ops[end..].windows(2).any(|pair| {
        matches!(&pair[0], Operation::BeginScope { name } if name == "tag")
            && matches!(&pair[1], Operation::EmitText { text } if text == "script")
    });

    assert!(tag_before, "opening tag not scoped: {:?}", &ops[..start]);
    assert!(tag_after, "closing tag not scoped: {:?}", &ops[end..]);
}

#[test]
fn test_replayed_sublanguage_matches_direct_highlight() {
    let page = record(SCRIPT_PAGE, "html");
    let direct = record(SCRIPT_BODY, "javascript");
    let (start, end) = sublanguage_bounds(&page, "javascript")[0];

    assert_eq!(&page.operations()[start + 1..end], direct.operations());
    assert!(direct
        .iter()
        .any(|op| matches!(op, Operation::BeginScope { name } if name == "keyword")));
}

#[test]
fn test_style_element_streams_css() {
    let page = "<style>body { color: red; }</style>";
    let log = record(page, "html");

    assert_eq!(sublanguages(&log), vec!["css"]);
    assert_eq!(log.text(), page);
    assert_balanced(&log);
}

#[test]
fn test_nested_sublanguages_are_bracketed_in_order() {
    let page = "<script>const rule = css`color: red`</script>";
    let log = record(page, "html");

    assert_eq!(sublanguages(&log), vec!["javascript", "css"]);

    let (js_start, js_end) = sublanguage_bounds(&log, "javascript")[0];
    // css sits inside javascript, so it is not a top-level bracket
    assert!(sublanguage_bounds(&log, "css").is_empty());
    let (css_start, css_end) = first_sublanguage(&log, "css").unwrap();
    assert!(js_start < css_start && css_end < js_end);
    assert_eq!(text_between(&log, css_start, css_end), "color: red");

    assert_eq!(log.text(), page);
    assert_balanced(&log);
}

#[test]
fn test_css_template_delimiters_stay_in_javascript() {
    let code = "const rule = css`color: red`";
    let log = record(code, "js");

    let bounds = sublanguage_bounds(&log, "css");
    assert_eq!(bounds.len(), 1);
    let (start, end) = bounds[0];
    let ops = log.operations();

    let before = OperationLog::from(ops[..start].to_vec()).text();
    let after = OperationLog::from(ops[end + 1..].to_vec()).text();
    assert_eq!(before, "const rule = css`");
    assert_eq!(text_between(&log, start, end), "color: red");
    assert_eq!(after, "`");
}

#[test]
fn test_css_template_with_substitution_injects_each_fragment() {
    let code = "const rule = css`color: ${c}; margin: 0`";
    let log = record(code, "js");

    let fragments: Vec<String> = sublanguage_bounds(&log, "css")
        .into_iter()
        .map(|(start, end)| text_between(&log, start, end))
        .collect();
    assert_eq!(fragments, vec!["color: ", "; margin: 0"]);
    assert_eq!(log.text(), code);
    assert_balanced(&log);
}

#[test]
fn test_multiple_scripts_replay_independently() {
    let page = "<script>let a = 1</script><p>x</p><script>let b = 2</script>";
    let log = record(page, "html");

    assert_eq!(sublanguages(&log), vec!["javascript", "javascript"]);
    assert_eq!(sublanguage_bounds(&log, "javascript").len(), 2);
    assert_eq!(log.text(), page);
    assert_balanced(&log);
}

// ========================================================================
// Driver behaviour
// ========================================================================

#[test]
fn test_repeated_calls_stream_identically() {
    let highlighter = StreamingHighlighter::new().unwrap();
    let mut first = OperationLog::new();
    let mut second = OperationLog::new();

    highlighter.highlight(SCRIPT_PAGE, Some("html"), &mut first).unwrap();
    highlighter.highlight(SCRIPT_PAGE, Some("html"), &mut second).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_language_lookup_ignores_case_and_accepts_aliases() {
    assert_eq!(record(SCRIPT_PAGE, "HTML"), record(SCRIPT_PAGE, "html"));
    assert_eq!(record(SCRIPT_BODY, "js"), record(SCRIPT_BODY, "javascript"));
}

#[test]
fn test_plaintext_is_a_single_text_run() {
    let log = record("a < b", "text");
    assert_eq!(
        log.operations(),
        &[Operation::EmitText {
            text: "a < b".to_string()
        }]
    );
}

#[test]
fn test_unknown_language_makes_no_consumer_calls() {
    let mut counter = CallCounter::default();
    let err = highlight(SCRIPT_PAGE, Some("cobol"), &mut counter).unwrap_err();

    assert!(matches!(err, HighlightError::UnknownLanguage(_)));
    assert_eq!(counter.calls, 0);
}

#[test]
fn test_syntax_errors_still_stream_every_byte() {
    let page = "<script>if (</script><div";
    let log = record(page, "html");

    assert_eq!(log.text(), page);
    assert_balanced(&log);
}

// ========================================================================
// Adapter errors
// ========================================================================

#[test]
fn test_session_without_consumer_is_missing_consumer() {
    let highlighter = StreamingHighlighter::new().unwrap();
    let mut session = StreamingSession::default();
    let options = HighlightOptions::new("html");

    let err = highlighter
        .engine()
        .highlight(SCRIPT_PAGE, &options, &mut session)
        .unwrap_err();
    assert!(matches!(err, EngineError::Emitter(_)));

    let err = HighlightError::from(err);
    assert_eq!(err.adapter_error(), Some(&AdapterError::MissingConsumer));
}

/// Streams the root level but hands out logging emitters for nested passes
struct MixedFactory<'a> {
    session: StreamingSession<'a>,
    created: u32,
}

impl<'a> EmitterFactory<'a> for MixedFactory<'a> {
    fn create_emitter(&mut self) -> anyhow::Result<Box<dyn Emitter + 'a>> {
        self.created += 1;
        if self.created == 1 {
            self.session.create_emitter()
        } else {
            Ok(Box::new(TracingEmitter::new(self.created)))
        }
    }
}

#[test]
fn test_foreign_nested_emitter_raises_mismatch() {
    let highlighter = StreamingHighlighter::new().unwrap();
    let mut log = OperationLog::new();
    let result = {
        let mut factory = MixedFactory {
            session: StreamingSession::new(&mut log),
            created: 0,
        };
        highlighter
            .engine()
            .highlight(SCRIPT_PAGE, &HighlightOptions::new("html"), &mut factory)
            .unwrap()
    };

    let raised = result.error_raised.expect("mismatch should be raised");
    let cause = raised
        .chain()
        .find_map(|cause| cause.downcast_ref::<AdapterError>());
    assert_eq!(
        cause,
        Some(&AdapterError::EmitterMismatch {
            sublanguage: "javascript".to_string()
        })
    );

    // Events before the failure stay delivered
    assert_eq!(log.text(), "<script>");
    assert!(sublanguages(&log).is_empty());
}
