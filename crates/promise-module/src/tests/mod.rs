//! Crate-level integration and BDD tests.

use std::io::Cursor;

use crate::module::{EvaluationError, ModuleConfig, PromiseModule, Validation};
use crate::outcome::{Outcome, PromiseResult};
use crate::protocol::{Attributes, EnrichedResponse};
use crate::session::{Session, SessionEnd};


struct AlwaysRepaired;

impl PromiseModule for AlwaysRepaired {
    fn validate_promiser(&self, _promiser: &str) -> Validation {
        Validation::valid("ok")
    }

    fn validate_attributes(&self, _attributes: &Attributes) -> Validation {
        Validation::valid("ok")
    }

    fn evaluate(
        &self,
        promiser: &str,
        _attributes: &Attributes,
    ) -> Result<PromiseResult, EvaluationError> {
        Ok(PromiseResult::repaired(format!("repaired {promiser}")))
    }
}

#[test]
fn end_to_end_session_with_stub_module() {
    let config = ModuleConfig::new("stub", "2.3.4", AlwaysRepaired).expect("config");
    let script = concat!(
        "cf-agent 3.21.0 v1\n",
        r#"{"operation":"evaluate_promise","promiser":"svc","attributes":{"state":"running"}}"#,
        "\n",
        r#"{"operation":"terminate"}"#,
        "\n",
    );
    let mut input = Cursor::new(script);
    let mut output = Vec::new();

    let summary = Session::new(config)
        .run(&mut input, &mut output)
        .expect("session");
    assert_eq!(summary.end(), SessionEnd::Terminated);

    let text = String::from_utf8(output).expect("utf8");
    let mut replies = text.split_terminator("\n\n");
    assert_eq!(replies.next(), Some("stub 2.3.4 v1 json_based"));

    let evaluated: EnrichedResponse =
        serde_json::from_str(replies.next().expect("evaluate reply")).expect("json");
    assert_eq!(evaluated.result().outcome(), Outcome::Repaired);
    assert_eq!(evaluated.promiser(), Some("svc"));

    let terminated: EnrichedResponse =
        serde_json::from_str(replies.next().expect("terminate reply")).expect("json");
    assert_eq!(terminated.result().outcome(), Outcome::Success);
    assert_eq!(replies.next(), None);
}
