//! Tool-call extraction from model responses.

use gemini::{Content, GenerateContentResponse, PartKind};
use transcript::ToolCall;

/// Collect the tool calls the model made while producing `response`.
///
/// Calls are read from the automatic function-calling history, model turns
/// only, in the order they were made. A response without history yields no
/// calls; a call without arguments gets an empty parameter map.
pub fn extract_function_calls(response: &GenerateContentResponse) -> Vec<ToolCall> {
    let Some(history) = &response.automatic_function_calling_history else {
        return Vec::new();
    };

    history
        .iter()
        .filter(|content| content.is_model())
        .flat_map(calls_in)
        .collect()
}

fn calls_in(content: &Content) -> impl Iterator<Item = ToolCall> + '_ {
    content.parts.iter().filter_map(|part| match part.kind() {
        PartKind::FunctionCall(call) => Some(ToolCall::new(
            call.name.clone(),
            call.args.clone().unwrap_or_default(),
        )),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemini::{FunctionCall, FunctionResponse, Part, Role};
    use serde_json::{Map, Value, json};

    fn call(name: &str, args: Option<Value>) -> Part {
        Part::function_call(FunctionCall {
            id: None,
            name: name.into(),
            args: args.and_then(|v| v.as_object().cloned()),
        })
    }

    fn content(role: Role, parts: Vec<Part>) -> Content {
        Content {
            role: Some(role),
            parts,
        }
    }

    fn with_history(history: Option<Vec<Content>>) -> GenerateContentResponse {
        GenerateContentResponse {
            automatic_function_calling_history: history,
            ..Default::default()
        }
    }

    #[test]
    fn missing_history_yields_nothing() {
        assert!(extract_function_calls(&with_history(None)).is_empty());
        assert!(extract_function_calls(&with_history(Some(Vec::new()))).is_empty());
    }

    #[test]
    fn only_model_turns_count() {
        let response = with_history(Some(vec![
            content(Role::User, vec![call("from_user", None)]),
            content(Role::Other, vec![call("from_elsewhere", None)]),
            content(Role::Model, vec![call("search_contacts", None)]),
        ]));

        let calls = extract_function_calls(&response);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function_name, "search_contacts");
    }

    #[test]
    fn missing_args_become_empty_parameters() {
        let response = with_history(Some(vec![content(Role::Model, vec![call("list_tasks", None)])]));

        let calls = extract_function_calls(&response);
        assert_eq!(calls[0].parameters, Map::new());
    }

    #[test]
    fn calls_are_flattened_in_order() {
        let response = with_history(Some(vec![
            content(Role::User, vec![Part::text("Email Alice and Bob")]),
            content(
                Role::Model,
                vec![
                    Part::text("Looking them up."),
                    call("search_contacts", Some(json!({"query": "Alice"}))),
                    call("search_contacts", Some(json!({"query": "Bob"}))),
                ],
            ),
            content(
                Role::User,
                vec![Part::function_response(FunctionResponse {
                    id: None,
                    name: "search_contacts".into(),
                    response: json!({"result": "ok"}),
                })],
            ),
            content(
                Role::Model,
                vec![call("send_email", Some(json!({"to": ["alice@x", "bob@x"]})))],
            ),
        ]));

        let calls = extract_function_calls(&response);
        let names: Vec<&str> = calls.iter().map(|c| c.function_name.as_str()).collect();
        assert_eq!(names, ["search_contacts", "search_contacts", "send_email"]);
        assert_eq!(calls[1].parameters["query"], "Bob");
        assert_eq!(calls[2].parameters["to"], json!(["alice@x", "bob@x"]));
    }
}
