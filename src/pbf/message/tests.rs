use crate::pbf::{Child, ErrorKind, Field, MessageField, SchemaIndex, Value};

const SCHEMA: &str = r#"{
	"nested": {
		"Employee": {
			"fields": {
				"name": {"id": 1, "type": "string"},
				"city": {"id": 2, "type": "string"},
				"salary": {"id": 4, "type": "double"},
				"occupation": {"id": 5, "type": "Occupation"}
			},
			"nested": {
				"Occupation": {"values": {"web developer": 1, "dentist": 2, "waiter": 4}}
			}
		},
		"Task": {
			"fields": {
				"description": {"id": 1, "type": "string"},
				"difficult": {"id": 2, "type": "bool"},
				"employee": {"id": 3, "type": "Employee"}
			}
		},
		"Library": {
			"fields": {
				"lender": {"id": 1, "type": "string"},
				"book": {"id": 3, "type": "Book"}
			},
			"reserved": [[4, 6]],
			"nested": {
				"Book": {
					"fields": {
						"title": {"id": 1, "type": "string"},
						"author": {"id": 2, "type": "string"},
						"index": {"id": 3, "type": "double"}
					}
				}
			}
		},
		"Location": {
			"fields": {
				"lat": {"id": 1, "type": "double"},
				"lng": {"id": 2, "type": "double"},
				"address": {"id": 3, "type": "Address"}
			}
		},
		"Address": {
			"fields": {
				"building": {"id": 1, "type": "Building"}
			},
			"nested": {
				"Building": {
					"fields": {
						"code": {"id": 1, "type": "string"},
						"level": {"id": 3, "type": "Level"}
					}
				},
				"Level": {"values": {"GROUND": 1, "FIRST": 2}}
			}
		},
		"Query": {
			"fields": {
				"byName": {"id": 1, "type": "string"},
				"byId": {"id": 2, "type": "int32"},
				"limit": {"id": 3, "type": "uint32"},
				"nickname": {"id": 4, "type": "string"}
			},
			"oneofs": {
				"query": {"oneof": ["byName", "byId"]},
				"_nickname": {"oneof": ["nickname"]}
			}
		},
		"Person": {
			"fields": {
				"name": {"id": 1, "type": "string", "rule": "required"},
				"age": {"id": 2, "type": "int32"}
			}
		},
		"Envelope": {
			"fields": {
				"person": {"id": 1, "type": "Person"},
				"note": {"id": 2, "type": "string"}
			}
		},
		"Team": {
			"fields": {
				"members": {"id": 1, "type": "Employee", "rule": "repeated"},
				"title": {"id": 2, "type": "string"},
				"scores": {"id": 3, "type": "sint32", "rule": "repeated"}
			}
		},
		"Blob": {
			"fields": {
				"delta": {"id": 1, "type": "int32"},
				"data": {"id": 2, "type": "bytes"},
				"ratio": {"id": 3, "type": "double"}
			}
		},
		"Broken": {
			"fields": {
				"first": {"id": 1, "type": "string"},
				"second": {"id": 1, "type": "string"},
				"noid": {"type": "string"},
				"ghost": {"id": 3, "type": "Ghost"}
			}
		}
	}
}"#;

fn schema() -> SchemaIndex {
	SchemaIndex::from_json_str(SCHEMA).expect("schema parses")
}

fn employee_value() -> Value {
	Value::message([
		("name", Value::from("Alice Bob Citizen")),
		("city", Value::from("N'Djamena")),
		("salary", Value::from(123456)),
		("occupation", Value::from("waiter")),
	])
}

const EMPLOYEE_URL: &str = "!1sAlice%20Bob%20Citizen!2sN'Djamena!4d123456!5e4";

fn task() -> MessageField {
	let mut task = schema().create("Task").expect("task builds");
	task.set_value(Value::message([
		("description", Value::from("become president")),
		("difficult", Value::from(true)),
		("employee", employee_value()),
	]))
	.expect("task value accepted");
	task
}

mod encoding {
	use super::*;

	#[test]
	fn employee_encodes_to_array_and_url() {
		let mut employee = schema().create("Employee").expect("employee builds");
		employee.set_value(employee_value()).expect("value accepted");

		assert_eq!(employee.to_array().expect("array"), Some(serde_json::json!(["Alice Bob Citizen", "N'Djamena", null, 123456, 4])));
		assert_eq!(employee.to_url().expect("url"), EMPLOYEE_URL);
		assert_eq!(employee.get("occupation").expect("declared"), Value::from("waiter"));
	}

	#[test]
	fn nested_message_announces_its_token_count() {
		let task = task();
		assert_eq!(task.to_url().expect("url"), format!("!1sbecome%20president!2btrue!3m4{EMPLOYEE_URL}"));
		assert_eq!(task.field_count(), 7);
		assert_eq!(
			task.to_array().expect("array"),
			Some(serde_json::json!(["become president", true, ["Alice Bob Citizen", "N'Djamena", null, 123456, 4]]))
		);
	}

	#[test]
	fn field_count_includes_grandchildren() {
		let mut location = schema().create("Location").expect("location builds");
		location
			.set_value(Value::message([
				("lat", Value::from(1.0)),
				("lng", Value::from(2.0)),
				("address", Value::message([("building", Value::message([("code", Value::from("nl")), ("level", Value::from("GROUND"))]))])),
			]))
			.expect("value accepted");
		assert_eq!(location.to_url().expect("url"), "!1d1!2d2!3m3!1m2!1snl!3e1");
	}

	#[test]
	fn tokens_are_emitted_in_field_number_order() {
		let mut employee = schema().create("Employee").expect("employee builds");
		employee.set("occupation", Value::from("dentist")).expect("set");
		employee.set("name", Value::from("Zed")).expect("set");
		assert_eq!(employee.to_url().expect("url"), "!1sZed!5e2");
	}

	#[test]
	fn empty_message_encodes_to_nothing() {
		let employee = schema().create("Employee").expect("employee builds");
		assert_eq!(employee.to_url().expect("url"), "");
		assert_eq!(employee.to_array().expect("array"), None);
		assert_eq!(employee.value(), Value::message(Vec::<(String, Value)>::new()));
	}

	#[test]
	fn delimiter_change_reaches_every_child() {
		let mut task = task();
		task.set_delimiter(Some('&')).expect("punctuation accepted");
		let url = task.to_url().expect("url");
		assert_eq!(url, format!("&1sbecome%20president&2btrue&3m4{}", EMPLOYEE_URL.replace('!', "&")));
		assert!(task.set_delimiter(Some('x')).is_err());

		let mut decoded = schema().create("Task").expect("task builds");
		decoded.set_delimiter(Some('&')).expect("punctuation accepted");
		decoded.from_url(&url).expect("decodes");
		assert_eq!(decoded.value(), task.value());
	}

	#[test]
	fn signed_and_binary_payloads_survive_a_custom_delimiter() {
		let mut blob = schema().create("Blob").expect("blob builds");
		for delimiter in ['-', '_', '.'] {
			assert_eq!(blob.set_delimiter(Some(delimiter)).expect_err("payload character").kind(), ErrorKind::Validation);
		}
		blob.set_delimiter(Some('~')).expect("punctuation accepted");
		blob.set_value(Value::message([("delta", Value::from(-5)), ("data", Value::Bytes(vec![0xfb, 0xff])), ("ratio", Value::from(-0.5))]))
			.expect("value accepted");

		let url = blob.to_url().expect("url");
		assert_eq!(url, "~1i-5~2b-_8~3d-0.5");

		let mut decoded = schema().create("Blob").expect("blob builds");
		decoded.set_delimiter(Some('~')).expect("punctuation accepted");
		decoded.from_url(&url).expect("decodes");
		assert_eq!(decoded.value(), blob.value());
	}
}

mod decoding {
	use super::*;

	#[test]
	fn nested_url_decodes() {
		let mut library = schema().create("Library").expect("library builds");
		library.from_url("!1sJohnny!3m3!1sAlice!2sRobert!3d100").expect("decodes");
		assert_eq!(library.get("lender").expect("declared"), Value::from("Johnny"));
		assert_eq!(
			library.get("book").expect("declared"),
			Value::message([("title", Value::from("Alice")), ("author", Value::from("Robert")), ("index", Value::from(100.0))])
		);
	}

	#[test]
	fn url_round_trips() {
		let task = task();
		let mut decoded = schema().create("Task").expect("task builds");
		decoded.from_url(&task.to_url().expect("url")).expect("decodes");
		assert_eq!(decoded.value(), task.value());
		assert_eq!(decoded.to_url().expect("url"), task.to_url().expect("url"));
	}

	#[test]
	fn array_round_trips() {
		let task = task();
		let mut decoded = schema().create("Task").expect("task builds");
		decoded.from_array(&task.to_array().expect("array").expect("non-empty")).expect("decodes");
		assert_eq!(decoded.value(), task.value());
	}

	#[test]
	fn decoding_replaces_previous_contents() {
		let mut library = schema().create("Library").expect("library builds");
		library.from_url("!1sJohnny!3m1!1sAlice").expect("decodes");
		library.from_url("!1sMary").expect("decodes");
		assert_eq!(library.value(), Value::message([("lender", Value::from("Mary"))]));
	}

	#[test]
	fn empty_string_survives_url_round_trip() {
		let mut library = schema().create("Library").expect("library builds");
		library.set("lender", Value::from("")).expect("set");
		let url = library.to_url().expect("url");
		assert_eq!(url, "!1s");
		let mut decoded = schema().create("Library").expect("library builds");
		decoded.from_url(&url).expect("decodes");
		assert_eq!(decoded.get("lender").expect("declared"), Value::from(""));
	}

	#[test]
	fn unknown_tokens_are_skipped() {
		let mut library = schema().create("Library").expect("library builds");
		library.from_url("!9m1!1sx!1sJohnny!8sextra").expect("unknown numbers skipped");
		assert_eq!(library.value(), Value::message([("lender", Value::from("Johnny"))]));
	}

	#[test]
	fn malformed_urls_are_format_errors() {
		let mut library = schema().create("Library").expect("library builds");
		assert_eq!(library.from_url("!1sa!1sb").expect_err("repeated token").kind(), ErrorKind::Format);
		assert_eq!(library.from_url("!3m5!1sx").expect_err("truncated").kind(), ErrorKind::Format);
		assert_eq!(library.from_url("!1dx").expect_err("letter").kind(), ErrorKind::Format);
		assert_eq!(library.from_url("!3mx").expect_err("count").kind(), ErrorKind::Format);
		assert_eq!(library.from_url("junk").expect_err("no token").kind(), ErrorKind::Format);
	}

	#[test]
	fn unmapped_array_slots_are_skipped() {
		let mut library = schema().create("Library").expect("library builds");
		library.from_array(&serde_json::json!(["Johnny", "unknown", null, "reserved", null, null, 7])).expect("decodes");
		assert_eq!(library.value(), Value::message([("lender", Value::from("Johnny"))]));
		assert_eq!(library.from_array(&serde_json::json!("flat")).expect_err("not an array").kind(), ErrorKind::Format);
	}
}

mod invariants {
	use super::*;

	#[test]
	fn oneof_conflicts_fail_fast() {
		let mut query = schema().create("Query").expect("query builds");
		query.set("byName", Value::from("alice")).expect("first member");
		let err = query.set("byId", Value::from(7)).expect_err("second member");
		assert_eq!(err.kind(), ErrorKind::Validation);
		assert_eq!(query.get("byName").expect("declared"), Value::from("alice"));
		assert_eq!(query.get("byId").expect("declared"), Value::Null);

		query.set("byName", Value::Null).expect("clearing is always allowed");
		query.set("byId", Value::from(7)).expect("group free again");
		query.validate().expect("exactly one member");
	}

	#[test]
	fn oneof_conflicts_are_checked_while_decoding() {
		let mut query = schema().create("Query").expect("query builds");
		assert_eq!(query.from_url("!1salice!2i7").expect_err("two members").kind(), ErrorKind::Validation);
		assert_eq!(query.from_array(&serde_json::json!(["alice", 7])).expect_err("two members").kind(), ErrorKind::Validation);
	}

	#[test]
	fn oneof_needs_exactly_one_member_once_non_empty() {
		let mut query = schema().create("Query").expect("query builds");
		query.validate().expect("absent message is exempt");
		query.set("limit", Value::from(10)).expect("set");
		assert_eq!(query.check_oneofs().expect_err("no member").kind(), ErrorKind::Validation);
		assert!(query.to_url().is_err());
		query.set("byId", Value::from(3)).expect("set");
		query.validate().expect("synthetic oneof needs no member");
		assert_eq!(query.to_url().expect("url"), "!2i3!3u10");
	}

	#[test]
	fn required_fields_apply_only_to_present_messages() {
		let mut envelope = schema().create("Envelope").expect("envelope builds");
		envelope.set("note", Value::from("hi")).expect("set");
		envelope.field_mut("person").expect("created");
		envelope.validate().expect("absent person is exempt");
		assert_eq!(envelope.to_url().expect("url"), "!2shi");

		envelope.set("person", Value::message([("age", Value::from(30))])).expect("set");
		let err = envelope.validate().expect_err("name missing");
		assert_eq!(err.kind(), ErrorKind::Validation);
		assert!(err.to_string().contains("Envelope.person.name"));
		assert_eq!(envelope.validate().expect_err("same error").to_string(), err.to_string());
	}

	#[test]
	fn validation_is_idempotent_on_messages() {
		let mut query = schema().create("Query").expect("query builds");
		query.set("limit", Value::from(10)).expect("set");
		let first = query.validate().expect_err("no oneof member");
		let second = query.validate().expect_err("still no oneof member");
		assert_eq!(first.kind(), second.kind());
		assert_eq!(first.to_string(), second.to_string());
		assert!(query.field("byId").is_none());
	}

	#[test]
	fn duplicate_numbers_are_rejected() {
		let mut employee = schema().create("Employee").expect("employee builds");
		employee.set("name", Value::from("a")).expect("set");
		let city = employee.field_mut("city").expect("created").as_field_mut();
		assert!(city.is_field_number_locked());
		assert!(city.set_field_number(1).is_err());
		city.unlock_field_number();
		city.set_field_number(1).expect("renumbered");
		assert_eq!(employee.validate().expect_err("duplicate").kind(), ErrorKind::Validation);
	}

	#[test]
	fn schema_problems_are_schema_errors() {
		let mut broken = schema().create("Broken").expect("broken builds");
		broken.set("first", Value::from("a")).expect("set");
		assert_eq!(broken.set("second", Value::from("b")).expect_err("shared number").kind(), ErrorKind::Schema);
		assert_eq!(broken.set("noid", Value::from("c")).expect_err("no id").kind(), ErrorKind::Schema);
		assert_eq!(broken.set("ghost", Value::from("d")).expect_err("unknown type").kind(), ErrorKind::Schema);
		assert_eq!(broken.set("missing", Value::from("e")).expect_err("unknown field").kind(), ErrorKind::Schema);
		assert_eq!(broken.get("missing").expect_err("unknown field").kind(), ErrorKind::Schema);
		assert_eq!(broken.resize("first", 2).expect_err("not a list").kind(), ErrorKind::Schema);
	}

	#[test]
	fn clearing_keeps_children() {
		let mut task = task();
		task.set_value(Value::Null).expect("cleared");
		assert!(task.is_undefined());
		assert!(task.field("employee").is_some());
		assert_eq!(task.to_url().expect("url"), "");
		assert!(task.set_value(Value::from("flat")).is_err());
	}
}

mod repeated {
	use super::*;

	fn team() -> MessageField {
		let mut team = schema().create("Team").expect("team builds");
		team.set_value(Value::message([
			("members", Value::list([Value::message([("name", Value::from("A"))]), Value::message([("name", Value::from("B"))])])),
			("title", Value::from("T")),
		]))
		.expect("value accepted");
		team
	}

	#[test]
	fn repeated_messages_encode_as_nested_arrays() {
		let team = team();
		assert_eq!(team.to_array().expect("array"), Some(serde_json::json!([[["A"], ["B"]], "T"])));
		assert_eq!(team.to_url().expect_err("no url form").kind(), ErrorKind::Unsupported);

		let mut decoded = schema().create("Team").expect("team builds");
		decoded.from_array(&serde_json::json!([[["A"], ["B"]], "T"])).expect("decodes");
		assert_eq!(decoded.value(), team.value());
	}

	#[test]
	fn lists_resize_to_match_input() {
		let mut team = team();
		team.resize("members", 1).expect("shrinks");
		let Some(Child::List(members)) = team.field("members") else {
			panic!("members is a list");
		};
		assert_eq!(members.len(), 1);
		assert_eq!(members.items()[0].name(), "Team.members[0]");

		team.set("members", Value::message([("city", Value::from("Oslo"))])).expect("single value wraps");
		assert_eq!(team.get("members").expect("declared"), Value::list([Value::message([("city", Value::from("Oslo"))])]));

		team.resize("members", 3).expect("grows");
		assert_eq!(team.field("members").and_then(Child::as_list).map(|list| list.len()), Some(3));
		assert_eq!(team.to_array().expect("array"), Some(serde_json::json!([[[null, "Oslo"], null, null], "T"])));
	}

	#[test]
	fn emptied_member_list_leaves_nothing_to_encode() {
		let mut team = schema().create("Team").expect("team builds");
		team.set("title", Value::from("a")).expect("set");
		assert_eq!(team.to_array().expect("array"), Some(serde_json::json!([null, "a"])));

		team.resize("members", 0).expect("empty list");
		assert_eq!(team.to_array().expect("array"), None);

		team.resize("members", 1).expect("grows");
		team.set("members", Value::list([Value::message([("name", Value::from("A"))])])).expect("set");
		assert_eq!(team.to_array().expect("array"), Some(serde_json::json!([[["A"]], "a"])));
	}

	#[test]
	fn repeated_message_tokens_cannot_be_url_decoded() {
		let mut team = schema().create("Team").expect("team builds");
		assert_eq!(team.from_url("!1m1!1sA").expect_err("list child").kind(), ErrorKind::Unsupported);
	}

	#[test]
	fn repeated_scalars_inside_messages() {
		let mut team = schema().create("Team").expect("team builds");
		team.set("scores", Value::list([3, -4])).expect("set");
		assert_eq!(team.to_array().expect("array"), Some(serde_json::json!([null, null, [3, -4]])));
		assert_eq!(team.to_url().expect_err("no url form").kind(), ErrorKind::Unsupported);
	}
}
