use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

const EPS_DP: &str = r#"/**
 * @file Eps_dp_struct.h
 * @brief EPS Component Module DataPool structure definition.
 *
 * @version 0.1
 */

#include <stdint.h>
#include "system/kernel/Kernel_errors.h"
#include "components/eps/Eps_public.h"

typedef struct _Eps_Dp {

    /**
     * @brief Flag indicating whether or not the Eps has been initialised.
     *
     * @dp 1
     */
    bool INITIALISED;

    /**
     * @brief Flag indicating that there's a new request to send to the
     * EPS.
     *
     * TODO: remove
     * @dp 5
     */
    bool NEW_REQUEST;

    /**
     * @brief The request to be sent.
     *
     * @dp 0x6
     */
    uint8_t EPS_REQUEST[EPS_MAX_UART_FRAME_LENGTH];
} Eps_Dp;
"#;

#[test]
fn doc_block_joins_brief_continuation_lines() {
	let doc = DocBlock::parse("\n * @brief First line\n * second line.\n *\n * @dp 3\n ", 1).unwrap();
	assert_eq!(doc.brief.as_deref(), Some("First line second line."));
	assert_eq!(doc.dp, Some(3));
	assert_eq!(doc.dp_module, None);
}

#[test]
fn doc_block_brief_ends_at_next_directive() {
	let doc = DocBlock::parse(" @brief Reference to the EPS block\n * @dp_module EPS\n", 1).unwrap();
	assert_eq!(doc.brief.as_deref(), Some("Reference to the EPS block"));
	assert_eq!(doc.dp_module.as_deref(), Some("EPS"));
	assert!(!doc.is_unannotated());
}

#[rstest]
#[case(" @brief Init flag. @dp 1 ", Some("Init flag."), Some(1), None)]
#[case(" @dp 7 @brief Trailing brief. ", Some("Trailing brief."), Some(7), None)]
#[case(" @brief EPS block @dp_module EPS ", Some("EPS block"), None, Some("EPS"))]
#[case("\n * @brief Mail ops@example.org\n * @dp 2\n", Some("Mail ops@example.org"), Some(2), None)]
#[case(" @brief Ends here @author Someone ", Some("Ends here"), None, None)]
fn doc_block_reads_inline_directives(
	#[case] body: &str,
	#[case] brief: Option<&str>,
	#[case] dp: Option<u32>,
	#[case] dp_module: Option<&str>,
) {
	let doc = DocBlock::parse(body, 1).unwrap();
	assert_eq!(doc.brief.as_deref(), brief);
	assert_eq!(doc.dp, dp);
	assert_eq!(doc.dp_module.as_deref(), dp_module);
}

#[test]
fn inline_version_is_read() {
	let doc = DocBlock::parse(" @file X.h @version 2.1 ", 1).unwrap();
	assert_eq!(doc.version.as_deref(), Some("2.1"));
}

#[test]
fn doc_block_ignores_unknown_tags() {
	let doc = DocBlock::parse("\n * @author Someone\n * @date 2021-02-15\n", 1).unwrap();
	assert_eq!(doc, DocBlock::default());
	assert!(doc.is_unannotated());
}

#[rstest]
#[case("@dp seven", "seven")]
#[case("@dp -1", "-1")]
#[case("@dp", "")]
fn doc_block_rejects_bad_index(#[case] body: &str, #[case] value: &str) {
	let err = DocBlock::parse(body, 12).unwrap_err();
	assert_eq!(
		err,
		AnnotationError::InvalidDirective {
			tag: "dp",
			value: value.to_string(),
			line: 12,
		}
	);
}

#[test]
fn doc_block_rejects_bad_module_reference() {
	let err = DocBlock::parse("\n * @dp_module 9lives\n", 4).unwrap_err();
	assert_eq!(err.line(), Some(5));
}

#[rstest]
#[case("10", Some(10))]
#[case("0x22", Some(0x22))]
#[case("0X1f", Some(0x1f))]
#[case("3u", Some(3))]
#[case("abc", None)]
#[case("", None)]
fn int_literals(#[case] text: &str, #[case] expected: Option<u32>) {
	assert_eq!(parse_int_literal(text), expected);
}

#[test]
fn lexer_tracks_lines_and_kinds() {
	let tokens = tokenize("/** doc */\n// plain\nint x; /* c */\n#define A (1)\n").unwrap();
	let kinds: Vec<_> = tokens.iter().map(|t| (t.kind.clone(), t.line)).collect();
	assert_eq!(
		kinds,
		vec![
			(TokenKind::DocComment(" doc ".to_string()), 1),
			(TokenKind::Comment(" plain".to_string()), 2),
			(TokenKind::Ident("int".to_string()), 3),
			(TokenKind::Ident("x".to_string()), 3),
			(TokenKind::Punct(';'), 3),
			(TokenKind::Comment(" c ".to_string()), 3),
			(TokenKind::Directive("define A (1)".to_string()), 4),
		]
	);
}

#[test]
fn lexer_joins_directive_continuations_and_drops_comments() {
	let tokens = tokenize("#define LONG (1 | \\\n  2) /* note */\nx").unwrap();
	assert_eq!(tokens[0].kind, TokenKind::Directive("define LONG (1 |    2)".to_string()));
	assert_eq!(tokens[1].line, 3);
}

#[test]
fn lexer_reports_unterminated_comment() {
	let err = tokenize("int a;\n/** never closed\n").unwrap_err();
	assert_eq!(
		err,
		AnnotationError::Unterminated {
			what: "comment",
			line: 2,
		}
	);
}

#[test]
fn declarations_pair_doc_comments_with_members() {
	let decls: Vec<_> = declarations(EPS_DP).collect::<Result<_, _>>().unwrap();
	let summary: Vec<_> = decls
		.iter()
		.map(|d| (d.ty.as_str(), d.symbol.as_str(), d.terminator, d.doc.dp))
		.collect();
	assert_eq!(
		summary,
		vec![
			("bool", "INITIALISED", Terminator::Semicolon, Some(1)),
			("bool", "NEW_REQUEST", Terminator::Semicolon, Some(5)),
			("uint8_t", "EPS_REQUEST", Terminator::Semicolon, Some(6)),
		]
	);
	assert_eq!(decls[2].array.as_deref(), Some("[EPS_MAX_UART_FRAME_LENGTH]"));
	assert_eq!(
		decls[1].doc.brief.as_deref(),
		Some("Flag indicating that there's a new request to send to the EPS.")
	);
}

#[test]
fn declarations_report_type_openers() {
	let text = "/**\n * @brief The pool.\n */\ntypedef struct _DataPool {\n /** @dp 1 */\n bool A;\n} DataPool;\n";
	let decls: Vec<_> = declarations(text).collect::<Result<_, _>>().unwrap();
	assert_eq!(decls.len(), 2);
	assert_eq!(decls[0].terminator, Terminator::Brace);
	assert_eq!(decls[0].symbol, "_DataPool");
	assert_eq!(decls[0].depth, 0);
	assert_eq!(decls[1].symbol, "A");
	assert_eq!(decls[1].depth, 1);
	assert_eq!(decls[1].line, 6);
}

#[test]
fn declarations_skip_prototypes_and_macros() {
	let text = "/** @brief Init. */\nbool Eps_init(void);\n/** @brief Max. */\n#define MAX (4)\n/** @dp 2 */\nint X;\n";
	let decls: Vec<_> = declarations(text).collect::<Result<_, _>>().unwrap();
	assert_eq!(decls.len(), 1);
	assert_eq!(decls[0].symbol, "X");
	assert_eq!(decls[0].doc.dp, Some(2));
}

#[test]
fn pointer_types_are_kept_in_the_type_token() {
	let decls: Vec<_> = declarations("/** @dp 1 */ const char *NAME;").collect::<Result<_, _>>().unwrap();
	assert_eq!(decls[0].ty, "const char*");
	assert_eq!(decls[0].symbol, "NAME");
}

#[test]
fn header_version_comes_from_the_first_doc_comment() {
	assert_eq!(header_version(EPS_DP).unwrap(), "0.1");
}

#[test]
fn header_version_is_mandatory() {
	let text = "/**\n * @file Foo.h\n */\n/** @version 2 */\nint x;\n";
	assert_eq!(header_version(text).unwrap_err(), AnnotationError::MissingVersion);
	assert!(AnnotationError::MissingVersion.is_schema());
	assert_eq!(header_version("int x;").unwrap_err(), AnnotationError::MissingVersion);
}

#[test]
fn includes_are_quoted_and_deduplicated() {
	let text = "#include <stdint.h>\n#include \"a/b.h\"\n#include \"c.h\" /* why */\n#include \"a/b.h\"\n";
	assert_eq!(includes(text).unwrap(), vec!["a/b.h".to_string(), "c.h".to_string()]);
}

#[test]
fn struct_bodies_find_typedef_and_plain_structs() {
	let text = "typedef struct _A { int x; struct { int y; } inner; } A;\nstruct B { int z; };\nstruct C;\n";
	let defs = struct_bodies(text).unwrap();
	let names: Vec<_> = defs.iter().map(|d| (d.name.as_str(), d.tag.as_deref())).collect();
	assert_eq!(names, vec![("A", Some("_A")), ("B", Some("B"))]);
	assert_eq!(defs[1].body.trim(), "int z;");
}

#[test]
fn struct_members_require_at_least_one_declaration() {
	let defs = struct_bodies(EPS_DP).unwrap();
	assert_eq!(defs.len(), 1);
	assert_eq!(defs[0].members().unwrap().len(), 3);

	let empty = struct_bodies("typedef struct { int undocumented; } Empty;").unwrap();
	assert_eq!(
		empty[0].members().unwrap_err(),
		AnnotationError::NoDeclarations {
			name: "Empty".to_string(),
			line: 1,
		}
	);
}

#[test]
fn struct_members_skip_nested_bodies() {
	let text = "typedef struct {\n /** @dp 1 */ int A;\n /** @brief nested */ struct {\n  /** @dp 9 */ int HIDDEN;\n } B;\n} Outer;\n";
	let defs = struct_bodies(text).unwrap();
	let members = defs[0].members().unwrap();
	let symbols: Vec<_> = members.iter().map(|m| m.symbol.as_str()).collect();
	assert_eq!(symbols, vec!["A"]);
}

#[test]
fn unbalanced_struct_is_an_error() {
	let err = struct_bodies("typedef struct _X {\n int a;\n").unwrap_err();
	assert_eq!(
		err,
		AnnotationError::UnbalancedBraces {
			name: "_X".to_string(),
			line: 1,
		}
	);
}

#[test]
fn defines_carry_their_preceding_comment() {
	let text = "/**\n * @brief Event fired on completion.\n */\n#define EVT_DONE ((Event)(MOD_ID_EPS | 1))\n\n#define H_GUARD\n#define FN(x) (x)\n/* Eps module (components group) */\n#define MOD_ID_EPS (0x22)\n";
	let defs = defines(text).unwrap();
	assert_eq!(defs.len(), 3);
	assert_eq!(defs[0].name, "EVT_DONE");
	assert_eq!(defs[0].body, "((Event)(MOD_ID_EPS | 1))");
	assert_eq!(
		defs[0].doc.as_ref().and_then(|d| d.brief.as_deref()),
		Some("Event fired on completion.")
	);
	assert_eq!(defs[1].name, "H_GUARD");
	assert_eq!(defs[1].body, "");
	assert_eq!(defs[1].comment, None);
	assert_eq!(defs[2].comment.as_deref(), Some(" Eps module (components group) "));
	assert_eq!(defs[2].doc, None);
}
