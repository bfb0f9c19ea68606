use std::sync::Arc;

use rstest::rstest;
use serde_json::json;
use similar_asserts::assert_eq;
use tracing_test::traced_test;

use super::__fixtures::*;
use super::*;
use crate::rules::CALLOUT_TYPES;
use crate::rules::CalloutRule;
use crate::rules::QuizRule;
use crate::rules::SnippetRule;

#[test]
fn parse_block_with_text() -> GinkoResult<()> {
	let ast = parse("::note\nHello\n::")?;
	let expected = Node::document(vec![
		Block::new("note")
			.with_children(vec![Node::text("Hello\n")])
			.into(),
	]);
	assert_eq!(ast, expected);

	Ok(())
}

#[test]
fn parse_properties() -> GinkoResult<()> {
	let ast = parse("::note(title=\"Hi \\\"there\\\"\" collapsed, count=2 flag=false raw='a\\b')\n::\n")?;
	let Node::Document { children } = ast else {
		panic!("expected a document");
	};
	let Node::Block(block) = &children[0] else {
		panic!("expected a block");
	};

	let expected = Properties::new()
		.with("title", "Hi \"there\"")
		.with("collapsed", true)
		.with("count", "2")
		.with("flag", false)
		.with("raw", "a\\b");
	assert_eq!(block.properties, expected);

	Ok(())
}

#[test]
fn parse_duplicate_property_replaces_in_place() -> GinkoResult<()> {
	let ast = parse(":snippet{id=\"a\" lang=\"en\" id=\"b\"}\n")?;
	let expected = Node::document(vec![
		InlineBlock::new(
			"snippet",
			Properties::new().with("id", "b").with("lang", "en"),
		)
		.into(),
	]);
	assert_eq!(ast, expected);

	Ok(())
}

#[test]
fn parse_inner_close_does_not_close_outer_block() -> GinkoResult<()> {
	let ast = parse("::tabs\n--tab A\n::note\nx\n::\nafter\n::\n")?;
	let note = Block::new("note").with_children(vec![Node::text("x\n")]);
	let tab = DashElement::new("tab")
		.with_label("A")
		.with_children(vec![note.into(), Node::text("after\n")]);
	let expected = Node::document(vec![Block::new("tabs").with_children(vec![tab.into()]).into()]);
	assert_eq!(ast, expected);

	Ok(())
}

#[test]
fn parse_dash_elements_close_each_other() -> GinkoResult<()> {
	let ast = parse("::steps\nintro\n--step One\nA\n--step(id=\"two\")\nB\n::\n")?;
	let expected = Node::document(vec![
		Block::new("steps")
			.with_children(vec![
				Node::text("intro\n"),
				DashElement::new("step")
					.with_label("One")
					.with_children(vec![Node::text("A\n")])
					.into(),
				DashElement::new("step")
					.with_properties(Properties::new().with("id", "two"))
					.with_children(vec![Node::text("B\n")])
					.into(),
			])
			.into(),
	]);
	assert_eq!(ast, expected);

	Ok(())
}

#[rstest]
#[case::dash_outside_block("--tab A\n")]
#[case::stray_close("::\n")]
#[case::opener_with_trailing_text("::note this is prose\n")]
#[case::inline_without_properties(":note\n")]
#[case::inline_with_trailing_text(":note{a} more\n")]
#[case::inline_with_unbalanced_properties(":D(smile\n")]
fn parse_prose_lines(#[case] input: &str) -> GinkoResult<()> {
	let ast = parse(input)?;
	assert_eq!(ast, Node::document(vec![Node::text(input)]));

	Ok(())
}

#[test]
fn parse_code_block_is_verbatim() -> GinkoResult<()> {
	let ast = parse("::note\n````md\n::tabs\n```\n--tab\n````\n::\n")?;
	let code = Node::CodeBlock(CodeBlock {
		language: Some("md".to_string()),
		fence: "````".to_string(),
		content: "::tabs\n```\n--tab\n".to_string(),
	});
	let expected = Node::document(vec![Block::new("note").with_children(vec![code]).into()]);
	assert_eq!(ast, expected);

	Ok(())
}

#[test]
fn parse_inline_code() -> GinkoResult<()> {
	let ast = parse("Use `::tabs` or ``a`b`` or `` `x ``, ` y ` here\n")?;
	let expected = Node::document(vec![
		Node::text("Use "),
		Node::inline_code("::tabs"),
		Node::text(" or "),
		Node::inline_code("a`b"),
		Node::text(" or "),
		Node::inline_code("`x"),
		Node::text(", "),
		Node::inline_code(" y "),
		Node::text(" here\n"),
	]);
	assert_eq!(ast, expected);

	Ok(())
}

#[test]
fn parse_table_and_divider() -> GinkoResult<()> {
	let ast = parse("| a | `b|c` |\n| --- | :-: |\n| 1 | 2 \\| 3 |\n---\n")?;
	let cell = |children: Vec<Node>| TableCell { children };
	let table = Table {
		rows: vec![
			TableRow {
				cells: vec![
					cell(vec![Node::text("a")]),
					cell(vec![Node::inline_code("b|c")]),
				],
			},
			TableRow {
				cells: vec![cell(vec![Node::text("1")]), cell(vec![Node::text("2 | 3")])],
			},
		],
		delimiters: vec!["---".to_string(), ":-:".to_string()],
	};
	assert_eq!(ast, Node::document(vec![Node::Table(table), Node::Divider]));

	Ok(())
}

#[test]
fn parse_normalizes_crlf() -> GinkoResult<()> {
	assert_eq!(parse("::note\r\nHi\r\n::\r\n")?, parse("::note\nHi\n::\n")?);

	Ok(())
}

#[rstest]
#[case::unterminated_block("::note\nHello", "unterminated_block")]
#[case::unterminated_nested_block("::tabs\n::note\n::\n", "unterminated_block")]
#[case::unterminated_dash_element("::tabs\n--tab A\nbody\n", "unterminated_dash_element")]
#[case::unterminated_code_block("```rust\nfn main() {}\n", "unterminated_code_block")]
#[case::unclosed_property_list("::note(title=\"x\"\n::\n", "malformed_properties")]
#[case::unterminated_string("::note(title=\"x)\n::\n", "malformed_properties")]
#[case::missing_value("::note(title=)\n::\n", "malformed_properties")]
#[case::stray_token("::note(=x)\n::\n", "malformed_properties")]
#[case::unclosed_dash_properties("::tabs\n--tab(icon=\"x\"\n::\n", "malformed_properties")]
fn parse_errors(#[case] input: &str, #[case] code: &str) {
	let error = parse(input).unwrap_err();
	assert!(error.is_parse_error(), "{error:?}");
	let actual = miette::Diagnostic::code(&error).map(|code| code.to_string());
	assert_eq!(actual, Some(format!("ginko::{code}")));
}

#[test]
fn parse_error_reports_innermost_open_element() {
	let error = parse("::tabs\n--tab A\nbody\n").unwrap_err();
	assert!(matches!(
		error,
		GinkoError::UnterminatedDashElement { ref name, line: 2 } if name == "tab"
	));

	let error = parse("::note\nHello").unwrap_err();
	assert!(matches!(
		error,
		GinkoError::UnterminatedBlock { ref name, line: 1 } if name == "note"
	));
}

#[test]
fn parse_nesting_limit() {
	let options = ParseOptions { max_depth: 2 };
	let nested = "::a\n::b\n::\n::\n";
	assert!(parse_with_options(nested, &options).is_ok());

	let error = parse_with_options("::a\n::b\n::c\n::\n::\n::\n", &options).unwrap_err();
	assert!(matches!(
		error,
		GinkoError::NestingTooDeep { line: 3, limit: 2 }
	));
}

#[test]
fn parse_deep_nesting_does_not_overflow() {
	let depth = DEFAULT_MAX_DEPTH * 4;
	let input = format!("{}{}", "::a\n".repeat(depth), "::\n".repeat(depth));
	let error = parse(&input).unwrap_err();
	assert!(matches!(error, GinkoError::NestingTooDeep { .. }));
}

#[test]
fn ast_serializes_to_tagged_json() -> GinkoResult<()> {
	let ast = parse("::note(a)\nHi\n::\n")?;
	let value = serde_json::to_value(&ast)?;
	let expected = json!({
		"kind": "document",
		"children": [{
			"kind": "block",
			"name": "note",
			"properties": [{ "key": "a", "value": true }],
			"children": [{ "kind": "text", "value": "Hi\n" }]
		}]
	});
	assert_eq!(value, expected);

	Ok(())
}

#[rstest]
#[case::note("::note\nHello\n::", "::ginko-callout{type=\"note\"}\nHello\n::\n")]
#[case::collapsed("::info-\nBody\n::", "::ginko-callout{type=\"info\" collapsed}\nBody\n::\n")]
#[case::title(
	"::tip(icon=\"bulb\" collapsed)\n--title Read me\nBody\n::\n",
	"::ginko-callout{type=\"tip\" title=\"Read me\" icon=\"bulb\"}\nBody\n::\n"
)]
#[case::empty_title(
	"::note\n--title\nBody\n::\n",
	"::ginko-callout{type=\"note\"}\nBody\n::\n"
)]
#[case::steps(
	"::steps\n--step Step 1\nA\n--step Step 2\nB\n::",
	"::ginko-steps\n::ginko-step{label=\"Step 1\" step=\"1\"}\nA\n::\n::ginko-step{label=\"Step 2\" step=\"2\"}\nB\n::\n::\n"
)]
#[case::tabs(
	"::tabs(sync)\n--tab Rust\nfn main\n--tab\nNo label\n::\n",
	"::ginko-tabs{sync}\n::ginko-tab{label=\"Rust\"}\nfn main\n::\n::ginko-tab\nNo label\n::\n::\n"
)]
#[case::tab_properties_before_label(
	"::tabs\n--tab(icon=\"rs\") Rust\nx\n::\n",
	"::ginko-tabs\n::ginko-tab{icon=\"rs\" label=\"Rust\"}\nx\n::\n::\n"
)]
#[case::nested_callout_in_tab(
	"::tabs\n--tab A\n::note\nx\n::\n::\n",
	"::ginko-tabs\n::ginko-tab{label=\"A\"}\n::ginko-callout{type=\"note\"}\nx\n::\n::\n::\n"
)]
#[case::single_column("::layout\n--col\nCentered\n::\n", "::ginko-center\nCentered\n::\n")]
#[case::columns(
	"::layout\n--col Left\nA\n--col(width=\"40\") Right\nB\n::\n",
	"::ginko-layout\n::ginko-column\nLeft\nA\n::\n::ginko-column{width=\"40\"}\nRight\nB\n::\n::\n"
)]
#[case::snippets(
	"::snippet(id=\"intro\" lang=\"en\")\nHello\n::\n:snippet{id=\"intro\" extra}\n",
	"::ginko-snippet-source{id=\"intro\"}\nHello\n::\n:ginko-snippet{id=\"intro\"}\n"
)]
#[case::file_tree(
	"::file-tree(expand no-icons)\n- src/\n    - main.rs\n- Cargo.toml\n::\n",
	"::ginko-file-tree{expanded}\nsrc/\n  main.rs\nCargo.toml\n::\n"
)]
#[case::file_tree_folders_from_children(
	"::filetree(icons)\ndocs\n\tguide.md\n\t\tpart.md\nreadme.md\n::\n",
	"::ginko-file-tree{icons}\ndocs/\n  guide.md/\n    part.md\nreadme.md\n::\n"
)]
#[case::code_untouched(
	"::note\n```rust\n::tabs\n```\n::\n",
	"::ginko-callout{type=\"note\"}\n```rust\n::tabs\n```\n::\n"
)]
#[case::unknown_block_kept("::custom(a=\"1\")\n--item x\nbody\n::\n", "::custom{a=\"1\"}\n--item x\nbody\n::\n")]
#[case::prose_untouched("Hello *world*\n\n---\nBye\n", "Hello *world*\n\n---\nBye\n")]
#[case::table_untouched(
	"| a | b |\n| --- | :-: |\n| 1 | 2 \\| 3 |\n",
	"| a | b |\n| --- | :-: |\n| 1 | 2 \\| 3 |\n"
)]
fn convert_documents(#[case] input: &str, #[case] expected: &str) -> GinkoResult<()> {
	let output = sequential_converter().convert(input)?;
	assert_eq!(output, expected);

	Ok(())
}

#[rstest]
fn callout_names(
	#[values("", "-")] suffix: &str,
	#[values(0, 1, 2, 3, 4, 5, 6)] index: usize,
) -> GinkoResult<()> {
	let kind = CALLOUT_TYPES[index];
	let block = Node::from(Block::new(format!("{kind}{suffix}")));
	assert!(CalloutRule.can_handle(&block));

	let Node::Block(callout) = CalloutRule.apply(block)? else {
		panic!("expected a block");
	};
	assert_eq!(callout.name, "ginko-callout");
	assert_eq!(callout.properties.get_str("type"), Some(kind));
	assert_eq!(callout.properties.flag("collapsed"), suffix == "-");

	Ok(())
}

#[rstest]
#[case::unknown_name("notice")]
#[case::double_suffix("note--")]
#[case::canonical("ginko-callout")]
fn callout_ignores(#[case] name: &str) {
	assert!(!CalloutRule.can_handle(&Block::new(name).into()));
}

#[test]
fn tabs_promote_every_dash_element_in_order() -> GinkoResult<()> {
	let labels = ["One", "", "Three", "Four"];
	let mut input = String::from("::tabs\n");
	for label in labels {
		input.push_str(&format!("--tab {label}\nbody\n"));
	}
	input.push_str("::\n");

	let ast = sequential_pipeline().modify(parse(&input))?;
	let tabs = &ast.children()[0];
	assert_eq!(tabs.name(), Some("ginko-tabs"));
	assert_eq!(tabs.children().len(), labels.len());

	for (tab, label) in tabs.children().iter().zip(labels) {
		let Node::Block(tab) = tab else {
			panic!("expected a block");
		};
		assert_eq!(tab.name, "ginko-tab");
		let expected = (!label.is_empty()).then_some(label);
		assert_eq!(tab.properties.get_str("label"), expected);
	}

	Ok(())
}

#[test]
fn snippet_without_id_is_a_rule_error() {
	let error = convert(":snippet{lang=\"en\"}\n").unwrap_err();
	assert!(error.is_rule_error());
	assert!(matches!(
		error,
		GinkoError::MissingProperty { ref rule, ref property } if rule == "snippet" && property == "id"
	));

	let block = Block::new("snippet")
		.with_properties(Properties::new().with("id", true))
		.into();
	assert!(SnippetRule.apply(block).is_err());
}

#[test]
fn faq_bullets() -> GinkoResult<()> {
	let input = "::faq\n- Is it free?\n  - Yes.\n- Can I self host?\n  - Yes, with Docker.\n  - Or bare metal.\n::\n";
	let items = payload(input, "items")?;
	let expected = json!([
		{ "id": "faq-1", "question": "Is it free?", "answer": "Yes." },
		{ "id": "faq-2", "question": "Can I self host?", "answer": "Yes, with Docker.\nOr bare metal." }
	]);
	assert_eq!(items, expected);

	Ok(())
}

#[test]
fn faq_headings() -> GinkoResult<()> {
	let input = "::faq\nIntro is ignored.\n## What is it?\nA converter.\n\nIt is fast.\n## Why?\nBecause.\n::\n";
	let items = payload(input, "items")?;
	let expected = json!([
		{ "id": "faq-1", "question": "What is it?", "answer": "A converter.\n\nIt is fast." },
		{ "id": "faq-2", "question": "Why?", "answer": "Because." }
	]);
	assert_eq!(items, expected);

	Ok(())
}

#[test]
#[traced_test]
fn faq_drops_unanswered_questions() -> GinkoResult<()> {
	let items = payload("::faq\n- Asked\n- Answered\n  - Here\n::\n", "items")?;
	let expected = json!([{ "id": "faq-1", "question": "Answered", "answer": "Here" }]);
	assert_eq!(items, expected);
	assert!(logs_contain("dropping faq item"));

	Ok(())
}

#[test]
fn faq_bullet_answers_keep_code_blocks() -> GinkoResult<()> {
	let input = "::faq\n- How do I install it?\n  - Run this:\n```sh\n# install it\n- [x] cargo install ginko\n```\n- Is it free?\n  - Yes.\n::\n";
	let items = payload(input, "items")?;
	let expected = json!([
		{
			"id": "faq-1",
			"question": "How do I install it?",
			"answer": "Run this:\n```sh\n# install it\n- [x] cargo install ginko\n```"
		},
		{ "id": "faq-2", "question": "Is it free?", "answer": "Yes." }
	]);
	assert_eq!(items, expected);

	Ok(())
}

#[test]
fn faq_heading_answers_keep_nested_blocks() -> GinkoResult<()> {
	let input = "::faq\n## Setup\nInstall it.\n::tip\nUse the installer.\n::\n```md\n## Not a question\n```\n## Why?\nBecause.\n::\n";
	let items = payload(input, "items")?;
	let expected = json!([
		{
			"id": "faq-1",
			"question": "Setup",
			"answer": "Install it.\n::tip\nUse the installer.\n::\n```md\n## Not a question\n```"
		},
		{ "id": "faq-2", "question": "Why?", "answer": "Because." }
	]);
	assert_eq!(items, expected);

	Ok(())
}

#[test]
fn faq_output_is_single_quoted_json() -> GinkoResult<()> {
	let output = sequential_converter().convert("::faq\n- What's \"new\"?\n  - Ids.\n::\n")?;
	assert_eq!(
		output,
		":ginko-faq{items='[{\"id\":\"faq-1\",\"question\":\"What&apos;s &quot;new&quot;?\",\"answer\":\"Ids.\"}]'}\n"
	);

	Ok(())
}

#[test]
fn quiz_select() -> GinkoResult<()> {
	let input = quiz(
		"--select Which are prime?\n- [x] 2\n- [ ] 4\n- [X] 3\n=> Well done\n=< Think about divisors\n=> Ignored\n",
	);
	let questions = payload(&input, "questions")?;
	let expected = json!([{
		"question": "Which are prime?",
		"type": "select",
		"options": [
			{ "text": "2", "correct": true },
			{ "text": "4", "correct": false },
			{ "text": "3", "correct": true }
		],
		"difficulty": "medium",
		"feedback": "Well done",
		"hint": "Think about divisors"
	}]);
	assert_eq!(questions, expected);

	Ok(())
}

#[rstest]
#[case::one(1)]
#[case::three(3)]
#[case::ten(10)]
fn quiz_select_option_count(#[case] count: usize) -> GinkoResult<()> {
	let mut body = String::from("--select Pick\n");
	for index in 0..count {
		let mark = if index % 2 == 0 { "x" } else { " " };
		body.push_str(&format!("- [{mark}] option {index}\n"));
	}

	let questions = payload(&quiz(&body), "questions")?;
	let options = questions[0]["options"]
		.as_array()
		.unwrap_or_else(|| panic!("no options"));
	assert_eq!(options.len(), count);
	for (index, option) in options.iter().enumerate() {
		assert_eq!(option["correct"], json!(index % 2 == 0));
	}

	Ok(())
}

#[test]
fn quiz_select_ignores_code_blocks() -> GinkoResult<()> {
	let input = quiz(
		"--select Which command lists files?\n```sh\n- [x] rm -rf /\n=> Not this one\n```\n- [x] ls\n- [ ] cd\n=> Right\n",
	);
	let questions = payload(&input, "questions")?;
	let expected = json!([{
		"question": "Which command lists files?",
		"type": "select",
		"options": [
			{ "text": "ls", "correct": true },
			{ "text": "cd", "correct": false }
		],
		"difficulty": "medium",
		"feedback": "Right"
	}]);
	assert_eq!(questions, expected);

	Ok(())
}

#[test]
#[traced_test]
fn quiz_drops_questions_without_answers() -> GinkoResult<()> {
	let inputs = [
		"--select Nothing to pick\n",
		"--select Only prose\nNo checkboxes here.\n",
		"--choose(options=\"a|b\") No markers\nNothing is marked.\n",
		"--blank\nThe marker is only in code: `++x++`.\n",
	];

	for input in inputs {
		let questions = payload(&quiz(&format!("{input}--select Kept\n- [x] yes\n")), "questions")?;
		assert_eq!(questions.as_array().map(Vec::len), Some(1), "{input}");
		assert_eq!(questions[0]["question"], json!("Kept"));
	}
	assert!(logs_contain("dropping quiz question"));

	Ok(())
}

#[test]
fn quiz_blank_and_find() -> GinkoResult<()> {
	let input = quiz(
		"--blank\nFill in the gap.\nThe capital of France is ++Paris++.\n--find Find the verbs\nThe cat ++runs++ and ++jumps++.\n",
	);
	let questions = payload(&input, "questions")?;
	let expected = json!([
		{
			"question": "Fill in the gap.",
			"type": "blank",
			"content": "The capital of France is ___.",
			"answers": ["Paris"],
			"difficulty": "medium"
		},
		{
			"question": "Find the verbs",
			"type": "find",
			"content": "The cat runs and jumps.",
			"answers": ["runs", "jumps"],
			"difficulty": "medium"
		}
	]);
	assert_eq!(questions, expected);

	Ok(())
}

#[test]
fn quiz_blank_keeps_code_and_nested_blocks() -> GinkoResult<()> {
	let input = quiz(
		"--blank\nFill in the gap.\nRust files end in ++.rs++, see `++x++`.\n```text\nnot ++an answer++\n```\n::note\nKeep ++this++ as written.\n::\n",
	);
	let questions = payload(&input, "questions")?;
	let expected = json!([{
		"question": "Fill in the gap.",
		"type": "blank",
		"content": "Rust files end in ___, see `++x++`.\n```text\nnot ++an answer++\n```\n::note\nKeep ++this++ as written.\n::",
		"answers": [".rs"],
		"difficulty": "medium"
	}]);
	assert_eq!(questions, expected);

	Ok(())
}

#[test]
fn quiz_choose_merges_options_and_answers() -> GinkoResult<()> {
	let input = quiz(
		"--choose(options=\"Berlin|Paris|Rome\" difficulty=\"easy\") Pick the city\nThe capital of France is ++Paris++, not ++Lyon++.\n",
	);
	let questions = payload(&input, "questions")?;
	let expected = json!([{
		"question": "Pick the city",
		"type": "choose",
		"content": "The capital of France is ___, not ___.",
		"options": ["Berlin", "Paris", "Rome", "Lyon"],
		"answers": ["Paris", "Lyon"],
		"difficulty": "easy"
	}]);
	assert_eq!(questions, expected);

	Ok(())
}

#[test]
fn quiz_sort_order_and_pair() -> GinkoResult<()> {
	let input = quiz(
		"--sort Smallest first\n1. one\n2. two\n- three\n--order(difficulty=\"hard\") Oldest first\n2. Rome\n1. Athens\n--pair\nMatch halves\n- bread | butter\n- salt | pepper\n- bread | butter\n",
	);
	let questions = payload(&input, "questions")?;
	let expected = json!([
		{
			"question": "Smallest first",
			"type": "sort",
			"items": ["one", "two", "three"],
			"difficulty": "medium"
		},
		{
			"question": "Oldest first",
			"type": "order",
			"items": [
				{ "text": "Rome", "position": 2 },
				{ "text": "Athens", "position": 1 }
			],
			"difficulty": "hard"
		},
		{
			"question": "Match halves",
			"type": "pair",
			"pairs": [
				{ "left": "bread", "right": "butter" },
				{ "left": "salt", "right": "pepper" }
			],
			"difficulty": "medium"
		}
	]);
	assert_eq!(questions, expected);

	Ok(())
}

#[test]
fn quiz_order_without_numbers_uses_document_position() -> GinkoResult<()> {
	let questions = payload(&quiz("--order First to last\n- a\n- b\n- c\n"), "questions")?;
	let expected = json!([
		{ "text": "a", "position": 1 },
		{ "text": "b", "position": 2 },
		{ "text": "c", "position": 3 }
	]);
	assert_eq!(questions[0]["items"], expected);

	Ok(())
}

#[test]
fn quiz_match_table() -> GinkoResult<()> {
	let input = quiz(
		"--match\n| Term | Capital |\n| --- | --- |\n| Match the capitals | |\n| France | Paris |\n| Italy | ![Rome](rome.png) |\n| Spain | ![[madrid.png\\|Madrid]] |\n| France | Paris |\n",
	);
	let questions = payload(&input, "questions")?;
	let expected = json!([{
		"question": "Match the capitals",
		"type": "match",
		"pairs": [
			{ "term": "France", "definition": "Paris" },
			{ "term": "Italy", "definition": { "src": "rome.png", "figure": "Rome" } },
			{ "term": "Spain", "definition": { "src": "madrid.png", "figure": "Madrid" } }
		],
		"difficulty": "medium"
	}]);
	assert_eq!(questions, expected);

	Ok(())
}

#[rstest]
#[case::two(2)]
#[case::four(4)]
#[case::seven(7)]
fn quiz_match_table_has_one_pair_per_row_after_the_question(#[case] rows: usize) -> GinkoResult<()> {
	let mut body = String::from("--match\n| Term | Definition |\n| --- | --- |\n| Match them | |\n");
	for index in 1..rows {
		body.push_str(&format!("| term {index} | definition {index} |\n"));
	}

	let questions = payload(&quiz(&body), "questions")?;
	assert_eq!(questions[0]["question"], json!("Match them"));
	let pairs = questions[0]["pairs"]
		.as_array()
		.unwrap_or_else(|| panic!("no pairs"));
	assert_eq!(pairs.len(), rows - 1);
	assert_eq!(pairs[0], json!({ "term": "term 1", "definition": "definition 1" }));

	Ok(())
}

#[test]
fn quiz_match_table_with_label_skips_question_row() -> GinkoResult<()> {
	let input = quiz("--match Capitals\n| Term | Capital |\n| --- | --- |\n| Match them | |\n| France | Paris |\n");
	let questions = payload(&input, "questions")?;
	assert_eq!(questions[0]["question"], json!("Capitals"));
	assert_eq!(
		questions[0]["pairs"],
		json!([{ "term": "France", "definition": "Paris" }])
	);

	Ok(())
}

#[test]
fn quiz_match_bullets() -> GinkoResult<()> {
	let input = quiz("--match Pair them\n- Rust\n  - Ferris\n- Go\n  - Gopher\n  - Gopher\n");
	let questions = payload(&input, "questions")?;
	let expected = json!([
		{ "term": "Rust", "definition": "Ferris" },
		{ "term": "Go", "definition": "Gopher" }
	]);
	assert_eq!(questions[0]["pairs"], expected);
	assert_eq!(questions[0]["question"], json!("Pair them"));

	Ok(())
}

#[test]
#[traced_test]
fn quiz_skips_unknown_kinds() -> GinkoResult<()> {
	let input = quiz("--essay Write something\nAnything.\n--select Pick\n- [x] a\n");
	let questions = payload(&input, "questions")?;
	assert_eq!(questions.as_array().map(Vec::len), Some(1));
	assert_eq!(questions[0]["type"], json!("select"));
	assert!(logs_contain("unknown kind"));

	Ok(())
}

#[test]
fn quiz_default_difficulty_comes_from_config() -> GinkoResult<()> {
	let config = GinkoConfig::from_toml("[quiz]\ndefault_difficulty = \"hard\"\n")?;
	let converter = Converter::from_config(&config);
	let output = converter.convert(&quiz("--select Pick\n- [x] a\n"))?;
	assert!(output.contains("\"difficulty\":\"hard\""), "{output}");

	let rule = QuizRule::new("easy");
	let Node::InlineBlock(inline) = rule.apply(parse(quiz("--select Pick\n- [x] a\n"))?.children()[0].clone())? else {
		panic!("expected an inline block");
	};
	assert_eq!(json_property(&inline, "questions")[0]["difficulty"], json!("easy"));

	Ok(())
}

#[test]
fn quiz_output_escapes_quotes() -> GinkoResult<()> {
	let output = sequential_converter().convert(&quiz("--select What's \"it\"?\n- [x] yes\n"))?;
	assert_eq!(
		output,
		":ginko-quiz{questions='[{\"question\":\"What&apos;s &quot;it&quot;?\",\"type\":\"select\",\"options\":[{\"text\":\"yes\",\"correct\":true}],\"difficulty\":\"medium\"}]'}\n"
	);

	Ok(())
}

#[test]
fn serializer_properties() {
	let inline = InlineBlock::new(
		"x",
		Properties::new()
			.with("flag", true)
			.with("hidden", false)
			.with("text", "a \"b\"\\\nc")
			.with("data", json!({ "k": "it's" })),
	);
	assert_eq!(
		serialize(&inline.into()),
		":x{flag text=\"a \\\"b\\\"\\\\\\nc\" data='{\"k\":\"it&apos;s\"}'}\n"
	);

	let empty = InlineBlock::new("y", Properties::new().with("off", false));
	assert_eq!(serialize(&empty.into()), ":y\n");
}

#[rstest]
#[case::plain("code", "`code`")]
#[case::backtick("a`b", "``a`b``")]
#[case::double_backtick("a``b", "```a``b```")]
#[case::leading_backtick("`a", "`` `a ``")]
#[case::trailing_backtick("a`", "`` a` ``")]
#[case::only_backtick("`", "`` ` ``")]
fn serializer_inline_code(#[case] content: &str, #[case] expected: &str) -> GinkoResult<()> {
	let rendered = serialize(&Node::inline_code(content));
	assert_eq!(rendered, expected);
	assert_eq!(parse(&rendered)?, Node::document(vec![Node::inline_code(content)]));

	Ok(())
}

#[test]
fn serializer_starts_structural_nodes_on_new_lines() {
	let document = Node::document(vec![
		Node::text("no newline"),
		Block::new("b").with_children(vec![Node::text("body")]).into(),
		Node::Divider,
	]);
	assert_eq!(serialize(&document), "no newline\n::b\nbody\n::\n---\n");
}

#[test]
fn escape_attribute_rewrites_quotes() {
	assert_eq!(
		escape_attribute(r#"{"a":"it's \"x\""}"#),
		r#"{"a":"it&apos;s &quot;x&quot;"}"#
	);
}

#[test]
fn pipeline_passes_errors_through() {
	let error = Pipeline::standard()
		.modify(Err(GinkoError::UnterminatedBlock {
			name: "note".to_string(),
			line: 3,
		}))
		.unwrap_err();
	assert!(matches!(
		error,
		GinkoError::UnterminatedBlock { ref name, line: 3 } if name == "note"
	));
}

#[rstest]
#[case::text_root(Node::text("x"))]
#[case::nested_document(Node::document(vec![Node::document(vec![])]))]
#[case::loose_dash_element(Node::document(vec![DashElement::new("tab").into()]))]
#[case::block_in_table_cell(Node::document(vec![Node::Table(Table {
	rows: vec![TableRow { cells: vec![TableCell { children: vec![Block::new("note").into()] }] }],
	delimiters: vec!["---".to_string()],
})]))]
fn pipeline_replaces_malformed_trees(#[case] tree: Node) -> GinkoResult<()> {
	let result = Pipeline::standard().modify(Ok(tree))?;
	assert_eq!(result, Node::document(vec![]));

	Ok(())
}

#[test]
#[traced_test]
fn pipeline_logs_malformed_trees() -> GinkoResult<()> {
	Pipeline::standard().modify(Ok(Node::text("x")))?;
	assert!(logs_contain("not a well formed document"));

	Ok(())
}

#[test]
fn pipeline_fails_fast() {
	let input = "::note\nfine\n::\n::snippet\nNo id\n::\n";
	let result = sequential_pipeline().modify(parse(input));
	assert!(matches!(result, Err(GinkoError::MissingProperty { .. })));
}

#[test]
fn pipeline_is_idempotent() -> GinkoResult<()> {
	let pipeline = sequential_pipeline();
	let once = pipeline.modify(parse(KITCHEN_SINK))?;
	let twice = pipeline.modify(Ok(once.clone()))?;
	assert_eq!(twice, once);

	Ok(())
}

#[test]
fn pipeline_rule_order_and_config() -> GinkoResult<()> {
	assert_eq!(
		Pipeline::standard().rule_names(),
		vec!["callout", "tabs", "steps", "layout", "snippet", "file-tree", "faq", "quiz"]
	);

	let config = GinkoConfig::from_toml("[rules]\ndisabled = [\"quiz\", \"file-tree\"]\n")?;
	let pipeline = Pipeline::from_config(&config);
	assert_eq!(
		pipeline.rule_names(),
		vec!["callout", "tabs", "steps", "layout", "snippet", "faq"]
	);

	let input = quiz("--select Q\n- [x] a\n");
	let output = serialize(&pipeline.modify(parse(&input))?);
	assert_eq!(output, input);

	Ok(())
}

/// Upper-cases text everywhere.
struct Shout;

impl Rule for Shout {
	fn name(&self) -> &'static str {
		"shout"
	}

	fn can_handle(&self, node: &Node) -> bool {
		matches!(node, Node::Text { .. })
	}

	fn apply(&self, node: Node) -> GinkoResult<Node> {
		match node {
			Node::Text { value } => Ok(Node::text(value.to_uppercase())),
			other => Ok(other),
		}
	}
}

#[test]
fn pipeline_custom_rules_run_after_builtin_rules() -> GinkoResult<()> {
	assert_eq!(
		Pipeline::new().modify(parse("::note\nhi\n::\n"))?,
		parse("::note\nhi\n::\n")?
	);

	let pipeline = Pipeline::new().with_rule(CalloutRule).with_rule(Shout);
	let output = serialize(&pipeline.modify(parse("::note\nhi `code`\n::\n"))?);
	assert_eq!(output, "::ginko-callout{type=\"note\"}\nHI `code`\n::\n");

	Ok(())
}

#[test]
fn converter_kitchen_sink() -> GinkoResult<()> {
	let output = sequential_converter().convert(KITCHEN_SINK)?;
	insta::assert_snapshot!(output, @r#"
	# Getting started

	::ginko-callout{type="note"}
	Plain callout.
	::

	::ginko-callout{type="warning" collapsed title="Careful" icon="alert"}
	Collapsed by default.
	::

	::ginko-tabs
	::ginko-tab{label="Rust"}
	```rust
	fn main() {}
	```
	::
	::ginko-tab{label="Go"}
	::ginko-callout{type="tip"}
	Nested callout.
	::
	::
	::

	::ginko-steps
	::ginko-step{label="Install" step="1"}
	Run the installer.
	::
	::ginko-step{label="Configure" step="2"}
	Edit `ginko.toml`.
	::
	::

	::ginko-layout
	::ginko-column
	Left
	A
	::
	::ginko-column
	Right
	B
	::
	::

	::ginko-file-tree{expanded icons}
	src/
	  lib.rs
	Cargo.toml
	::

	:ginko-faq{items='[{"id":"faq-1","question":"Is it free?","answer":"Yes."}]'}

	:ginko-quiz{questions='[{"question":"Pick one","type":"select","options":[{"text":"right","correct":true},{"text":"wrong","correct":false}],"difficulty":"medium"}]'}

	| Term | Meaning |
	| --- | --- |
	| AST | tree |

	---
	The end.
	"#);

	Ok(())
}

#[test]
fn converter_is_shareable_across_threads() -> GinkoResult<()> {
	let converter = &sequential_converter();
	let inputs: Vec<String> = (0..8)
		.map(|index| format!("::note\nDocument {index}\n::\n"))
		.collect();

	let outputs = std::thread::scope(|scope| {
		let handles: Vec<_> = inputs
			.iter()
			.map(|input| scope.spawn(move || converter.convert(input)))
			.collect();
		handles
			.into_iter()
			.map(|handle| handle.join().unwrap_or_else(|_| panic!("thread panicked")))
			.collect::<GinkoResult<Vec<_>>>()
	})?;

	for (index, output) in outputs.iter().enumerate() {
		assert_eq!(
			output,
			&format!("::ginko-callout{{type=\"note\"}}\nDocument {index}\n::\n")
		);
	}

	Ok(())
}

#[test]
fn converter_applies_parser_config() -> GinkoResult<()> {
	let config = GinkoConfig::from_toml("[parser]\nmax_depth = 1\n")?;
	let converter = Converter::from_config(&config);
	assert_eq!(converter.options().max_depth, 1);
	assert!(converter.convert("::note\n::\n").is_ok());
	assert!(matches!(
		converter.convert("::note\n::tip\n::\n::\n"),
		Err(GinkoError::NestingTooDeep { line: 2, limit: 1 })
	));

	Ok(())
}

#[test]
fn config_defaults() -> GinkoResult<()> {
	let config = GinkoConfig::from_toml("")?;
	assert_eq!(config, GinkoConfig::default());
	assert_eq!(config.parser.max_depth, DEFAULT_MAX_DEPTH);
	assert_eq!(config.quiz.default_difficulty, DEFAULT_DIFFICULTY);
	assert_eq!(config.faq.id_length, DEFAULT_ID_LENGTH);
	assert!(config.rules.is_enabled("quiz"));

	Ok(())
}

#[test]
fn config_rejects_invalid_toml() {
	let error = GinkoConfig::from_toml("[parser]\nmax_depth = \"deep\"\n").unwrap_err();
	assert!(matches!(error, GinkoError::ConfigParse(_)));
}

#[rstest]
#[case::root("ginko.toml")]
#[case::hidden(".ginko.toml")]
#[case::config_dir(".config/ginko.toml")]
fn config_discovery(#[case] location: &str) -> AnyEmptyResult {
	let root = tempfile::tempdir()?;
	assert!(GinkoConfig::load(root.path())?.is_none());

	let path = root.path().join(location);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(&path, "[faq]\nid_length = 6\n")?;

	assert_eq!(GinkoConfig::resolve_path(root.path()), Some(path));
	let config = GinkoConfig::load(root.path())?.unwrap_or_default();
	assert_eq!(config.faq.id_length, 6);

	Ok(())
}

#[test]
fn config_discovery_precedence() -> AnyEmptyResult {
	let root = tempfile::tempdir()?;
	std::fs::create_dir_all(root.path().join(".config"))?;
	std::fs::write(root.path().join(".config/ginko.toml"), "")?;
	std::fs::write(root.path().join("ginko.toml"), "")?;

	assert_eq!(
		GinkoConfig::resolve_path(root.path()),
		Some(root.path().join("ginko.toml"))
	);

	Ok(())
}

#[test]
fn sequential_ids() {
	let ids = SequentialIdSource::new("item");
	assert_eq!(ids.next_id(), "item-1");
	assert_eq!(ids.next_id(), "item-2");
}

#[test]
fn nanoid_ids() {
	let ids = NanoIdSource::new(8);
	let first = ids.next_id();
	assert_eq!(first.len(), 8);
	assert!(
		first
			.chars()
			.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
	);
	assert_ne!(first, ids.next_id());
}

#[test]
fn faq_ids_come_from_the_injected_source() -> GinkoResult<()> {
	let pipeline = Pipeline::standard_with_ids(Arc::new(SequentialIdSource::new("q")));
	let input = "::faq\n- A?\n  - a\n::\n::faq\n- B?\n  - b\n::\n";
	let ast = pipeline.modify(parse(input))?;
	let ids: Vec<serde_json::Value> = ast
		.children()
		.iter()
		.filter_map(|child| {
			match child {
				Node::InlineBlock(inline) => Some(json_property(inline, "items")[0]["id"].clone()),
				_ => None,
			}
		})
		.collect();
	assert_eq!(ids, vec![json!("q-1"), json!("q-2")]);

	Ok(())
}
