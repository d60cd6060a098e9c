use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::{ContextKeyExpr, ContextParseError, ContextSnapshot, ContextValue};

fn parse(text: &str) -> ContextKeyExpr {
	text.parse().unwrap_or_else(|e| panic!("{text:?} failed to parse: {e}"))
}

#[test]
fn and_flattens_and_drops_absent_operands() {
	let expr = ContextKeyExpr::and([
		Some(ContextKeyExpr::has("a")),
		None,
		ContextKeyExpr::and([Some(ContextKeyExpr::has("b")), Some(ContextKeyExpr::has("a"))]),
		Some(ContextKeyExpr::True),
	]);
	assert_eq!(
		expr,
		Some(ContextKeyExpr::And(vec![ContextKeyExpr::has("a"), ContextKeyExpr::has("b")]))
	);
	assert_eq!(ContextKeyExpr::and([None, None]), None);
	assert_eq!(
		ContextKeyExpr::and([Some(ContextKeyExpr::has("a")), None]),
		Some(ContextKeyExpr::has("a"))
	);
}

#[test]
fn false_operand_collapses_conjunction() {
	let expr = ContextKeyExpr::and([Some(ContextKeyExpr::has("a")), Some(ContextKeyExpr::False)]);
	assert_eq!(expr, Some(ContextKeyExpr::False));
	let expr = ContextKeyExpr::or([Some(ContextKeyExpr::has("a")), Some(ContextKeyExpr::True)]);
	assert_eq!(expr, Some(ContextKeyExpr::True));
}

#[test]
fn truthiness_of_bare_keys() {
	let ctx = ContextSnapshot::new()
		.with("focused", true)
		.with("count", 0)
		.with("lang", "")
		.with("mode", "insert");

	assert!(ContextKeyExpr::has("focused").evaluate(&ctx));
	assert!(!ContextKeyExpr::has("count").evaluate(&ctx));
	assert!(!ContextKeyExpr::has("lang").evaluate(&ctx));
	assert!(!ContextKeyExpr::has("missing").evaluate(&ctx));
	assert!(ContextKeyExpr::not("missing").evaluate(&ctx));
	assert!(ContextKeyExpr::has("mode").evaluate(&ctx));
}

#[test]
fn equality_is_loose_between_numbers_and_literals() {
	let ctx = ContextSnapshot::new().with("tabSize", 4).with("mode", "normal");
	assert!(parse("tabSize == 4").evaluate(&ctx));
	assert!(parse("tabSize != '8'").evaluate(&ctx));
	assert!(parse("mode == normal").evaluate(&ctx));
	assert!(!parse("mode == insert").evaluate(&ctx));
	assert!(parse("missing != anything").evaluate(&ctx));
}

#[test]
fn parses_precedence_and_grouping() {
	let ctx = ContextSnapshot::new().with("a", true).with("c", true);
	assert!(parse("a && b || c").evaluate(&ctx));
	assert!(!parse("a && (b || !c)").evaluate(&ctx));
	assert_eq!(
		parse("a && b || c"),
		ContextKeyExpr::Or(vec![
			ContextKeyExpr::And(vec![ContextKeyExpr::has("a"), ContextKeyExpr::has("b")]),
			ContextKeyExpr::has("c"),
		])
	);
}

#[test]
fn boolean_literals_fold_into_bare_keys() {
	assert_eq!(parse("readonly == true"), ContextKeyExpr::has("readonly"));
	assert_eq!(parse("readonly == false"), ContextKeyExpr::not("readonly"));
	assert_eq!(parse("readonly != true"), ContextKeyExpr::not("readonly"));
	assert_eq!(parse("!!readonly"), ContextKeyExpr::has("readonly"));
}

#[test]
fn regex_match_with_flags() {
	let expr = parse("resourceFilename =~ /\\.RS$/i");
	let ctx = ContextSnapshot::new().with("resourceFilename", "main.rs");
	assert!(expr.evaluate(&ctx));
	assert!(!expr.evaluate(&ContextSnapshot::new()));
}

#[test]
fn serialize_is_parseable() {
	let text = "editorTextFocus && !editorReadonly && (langId == 'rust' || langId == 'toml')";
	let expr = parse(text);
	assert_eq!(expr.serialize(), text);
	assert_eq!(parse(&expr.serialize()), expr);

	let negated = parse("!(a && b)");
	assert_eq!(negated.serialize(), "!(a && b)");
}

#[test]
fn reports_malformed_input() {
	assert!(matches!(
		"a &&".parse::<ContextKeyExpr>(),
		Err(ContextParseError::UnexpectedEnd { position: 4 })
	));
	assert!(matches!(
		"a == 'open".parse::<ContextKeyExpr>(),
		Err(ContextParseError::Unterminated { what: "string", .. })
	));
	assert!(matches!("a b".parse::<ContextKeyExpr>(), Err(ContextParseError::Unexpected { position: 2, .. })));
	assert!(matches!("x =~ /(/".parse::<ContextKeyExpr>(), Err(ContextParseError::InvalidRegex { .. })));
}

#[test]
fn layered_snapshot_shadows_parent() {
	let global = ContextSnapshot::new().with("mode", "normal").with("sidebarVisible", true);
	let scoped = global.layered(&ContextSnapshot::new().with("mode", "insert"));
	assert_eq!(scoped.get("mode"), Some(&ContextValue::from("insert")));
	assert_eq!(scoped.get("sidebarVisible"), Some(&ContextValue::Bool(true)));
	assert_eq!(global.get("mode"), Some(&ContextValue::from("normal")));
}

#[test]
fn backslashes_survive_serialization() {
	let path = ContextKeyExpr::equals("path", "C:\\");
	assert_eq!(path.serialize(), r"path == 'C:\\'");
	assert_eq!(parse(&path.serialize()), path);

	let quoted = ContextKeyExpr::not_equals("title", r"it\'s");
	assert_eq!(parse(&quoted.serialize()), quoted);

	let re = ContextKeyExpr::regex("resource", r"^/tmp/.*\\").unwrap();
	assert_eq!(re.serialize(), r"resource =~ /^\/tmp\/.*\\\\/");
	assert_eq!(parse(&re.serialize()), re);
}

#[test]
fn hand_written_regex_escapes_are_kept() {
	let expr = parse(r"name =~ /\d+\.rs$/");
	assert!(expr.evaluate(&ContextSnapshot::new().with("name", "42.rs")));
	assert!(!expr.evaluate(&ContextSnapshot::new().with("name", "ab.rs")));
}

proptest! {
	#[test]
	fn string_literals_round_trip(value in any::<String>()) {
		let expr = ContextKeyExpr::equals("key", value.as_str());
		let reparsed: ContextKeyExpr = expr.serialize().parse().unwrap();
		prop_assert_eq!(reparsed, expr);
	}
}
