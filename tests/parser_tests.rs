//! Parser tests

use modelphy::ModelError;
use modelphy::ast::*;
use modelphy::lexer::lex;
use modelphy::parser::{parse, parse_with_sink};

fn parse_source(source: &str) -> Program {
    let tokens = lex(source).unwrap();
    parse(&tokens, source).unwrap()
}

fn parse_errors(source: &str) -> (Program, Vec<modelphy::SyntaxError>) {
    let tokens = lex(source).unwrap();
    let mut errors = Vec::new();
    let program = parse_with_sink(&tokens, source, &mut errors);
    (program, errors)
}

fn single(source: &str) -> Stmt {
    let mut program = parse_source(source);
    assert_eq!(program.statements.len(), 1, "expected one statement");
    program.statements.remove(0)
}

#[test]
fn test_parse_empty() {
    assert!(parse_source("").statements.is_empty());
}

#[test]
fn test_parse_declaration() {
    match single("Real r;") {
        Stmt::Declaration { ty, id, init, .. } => {
            assert_eq!(ty.name, "Real");
            assert_eq!(id.name, "r");
            assert!(init.is_none());
        }
        other => panic!("Expected declaration, got {other:?}"),
    }
}

#[test]
fn test_parse_literal_initializers_are_declarations() {
    for source in [
        "Integer n = 10;",
        "Real x = (2.5);",
        "Vector v = [1, 2.0, [3]];",
        "Boolean b = true;",
        "Text s = \"abc\";",
    ] {
        assert!(
            matches!(single(source), Stmt::Declaration { init: Some(_), .. }),
            "{source} should be a declaration"
        );
    }
}

#[test]
fn test_parse_non_literal_initializers_are_deterministic() {
    for source in [
        "QMatrix Q = HKY(kappa=kappa);",
        "Real y = x;",
        "Vector v = [1, x];",
        "Real z = (x);",
    ] {
        assert!(
            matches!(single(source), Stmt::Deterministic { .. }),
            "{source} should be deterministic"
        );
    }
}

#[test]
fn test_parse_stochastic_variable() {
    match single("Real kappa ~ LogNormal(mean=1.0, sigma=0.5);") {
        Stmt::Stochastic {
            target: StochasticTarget::Variable { ty, id },
            distribution,
            span,
        } => {
            assert_eq!(ty.name, "Real");
            assert_eq!(id.name, "kappa");
            assert_eq!(distribution.name.name, "LogNormal");
            assert_eq!(distribution.args.len(), 2);
            let names: Vec<_> = distribution
                .args
                .iter()
                .map(|a| a.name.as_ref().unwrap().name.as_str())
                .collect();
            assert_eq!(names, vec!["mean", "sigma"]);
            assert_eq!((span.start, span.end), (0, 44));
        }
        other => panic!("Expected stochastic assignment, got {other:?}"),
    }
}

#[test]
fn test_parse_calibration() {
    match single("mrca(taxa=[human, chimp]) ~ LogNormal(mean=2.0, sigma=0.1);") {
        Stmt::Stochastic {
            target: StochasticTarget::Call(call),
            distribution,
            ..
        } => {
            assert_eq!(call.name.name, "mrca");
            match &call.args[0].value {
                Expr::Array { elements, .. } => {
                    assert_eq!(elements.len(), 2);
                    assert!(matches!(&elements[0], Expr::Ident(id) if id.name == "human"));
                }
                other => panic!("Expected array, got {other:?}"),
            }
            assert_eq!(distribution.name.name, "LogNormal");
        }
        other => panic!("Expected calibration, got {other:?}"),
    }
}

#[test]
fn test_parse_positional_and_nested_arguments() {
    match single("QMatrix Q = GTR(er, normalize(x, 2), rates=[a, b]);") {
        Stmt::Deterministic {
            expr: Expr::Call(call),
            ..
        } => {
            assert_eq!(call.args.len(), 3);
            assert!(call.args[0].name.is_none());
            assert!(matches!(&call.args[1].value, Expr::Call(inner) if inner.args.len() == 2));
            assert_eq!(call.args[2].name.as_ref().unwrap().name, "rates");
        }
        other => panic!("Expected call, got {other:?}"),
    }
}

#[test]
fn test_parse_constraint() {
    match single("constraint c = mrca(taxa=[a, b]);") {
        Stmt::Constraint { id, call, .. } => {
            assert_eq!(id.name, "c");
            assert_eq!(call.name.name, "mrca");
        }
        other => panic!("Expected constraint, got {other:?}"),
    }
}

#[test]
fn test_parse_observe_file() {
    match single("observe seq from \"data.fasta\";") {
        Stmt::Observe {
            id,
            source: ObservationSource::File { literal, .. },
            ..
        } => {
            assert_eq!(id.name, "seq");
            assert_eq!(literal, "\"data.fasta\"");
        }
        other => panic!("Expected file observation, got {other:?}"),
    }
}

#[test]
fn test_parse_observe_inline() {
    match single("observe seq [ human = sequence(str=\"ACGT\"), n = 4, ];") {
        Stmt::Observe {
            source: ObservationSource::KeyValues(pairs),
            ..
        } => {
            assert_eq!(pairs.len(), 2);
            assert_eq!(pairs[0].key.name, "human");
            assert!(matches!(&pairs[0].value, Expr::Call(c) if c.name.name == "sequence"));
            assert!(matches!(
                &pairs[1].value,
                Expr::Literal { kind: LiteralKind::Integer, text, .. } if text == "4"
            ));
        }
        other => panic!("Expected inline observation, got {other:?}"),
    }
}

#[test]
fn test_parse_reports_every_error() {
    let source = "Real x ~ ;\nReal y ~ Normal(mean=0.0);\nReal z = ;\n";
    let (program, errors) = parse_errors(source);

    assert_eq!(program.statements.len(), 1);
    assert_eq!(errors.len(), 2);
    assert_eq!((errors[0].line, errors[0].column), (1, 10));
    assert_eq!(
        errors[0].message,
        "expected a function or distribution name, found `;`"
    );
    assert_eq!((errors[1].line, errors[1].column), (3, 10));
    assert_eq!(errors[1].message, "expected an expression, found `;`");
}

#[test]
fn test_parse_missing_semicolon_skips_to_next() {
    let (program, errors) = parse_errors("Real x ~ Normal() Real y;\nReal z;");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "expected `;`, found `Real`");
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn test_parse_unexpected_end_of_file() {
    let (_, errors) = parse_errors("Real x");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "expected `;`, `~` or `=`, found end of file");
    assert_eq!((errors[0].line, errors[0].column), (1, 7));
}

#[test]
fn test_parse_fails_with_all_errors() {
    let source = "42;\nobserve x;";
    let tokens = lex(source).unwrap();
    match parse(&tokens, source) {
        Err(ModelError::Syntax { errors }) => {
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[0].message, "expected a statement, found `42`");
            assert_eq!(errors[1].message, "expected `from` or `[`, found `;`");
        }
        other => panic!("Expected syntax errors, got {other:?}"),
    }
}
