//! Whole-line grammar scenarios across lexer and parser.

use core_lang::{parse, Argument, RedirTarget};

fn no_vars(_: &str) -> Option<String> {
    None
}

#[test]
fn mixed_statement_with_everything() {
    let line = "اطبع -فاصل ', ' a \"b c\" $(المسار) > out.txt 2>&1; اعرض -مخفي";
    let out = parse(line, &no_vars).expect("line parses");
    assert_eq!(out.statements.len(), 2);

    let first = &out.statements[0][0];
    assert_eq!(first.name, "اطبع");
    assert_eq!(first.params.len(), 1);
    assert_eq!(first.params[0].0, "فاصل");
    assert_eq!(first.params[0].1, Some(Argument::Literal(", ".into())));
    assert_eq!(first.args.len(), 3);
    assert!(matches!(first.args[2], Argument::SubExpr(_)));
    assert_eq!(first.redirections.len(), 2);
    assert!(matches!(
        first.redirections[0].target,
        RedirTarget::File { ref path, append: false } if path == "out.txt"
    ));
    assert!(first.merges_err_into_out());

    let second = &out.statements[1][0];
    assert_eq!(second.name, "اعرض");
    assert_eq!(second.params[0], ("مخفي".to_string(), None));
}

#[test]
fn comment_terminates_parsing_outside_quotes() {
    let out = parse("اطبع مرحبا # اطبع ثانية", &no_vars).unwrap();
    assert_eq!(out.statements.len(), 1);
    assert_eq!(out.statements[0][0].args.len(), 1);
}

#[test]
fn nested_subexpressions() {
    let out = parse("اطبع $(اطبع $(المسار))", &no_vars).unwrap();
    let Argument::SubExpr(outer) = &out.statements[0][0].args[0] else {
        panic!("outer sub-expression expected");
    };
    let Argument::SubExpr(inner) = &outer[0][0].args[0] else {
        panic!("inner sub-expression expected");
    };
    assert_eq!(inner[0][0].name, "المسار");
}

#[test]
fn pipeline_with_input_redirection() {
    let out = parse("اطبع < in.txt | اطبع > out.txt", &no_vars).unwrap();
    let statement = &out.statements[0];
    assert_eq!(statement.len(), 2);
    assert_eq!(statement[0].input_redirect.as_deref(), Some("in.txt"));
    assert_eq!(statement[1].file_target(1), Some(("out.txt", false)));
}
