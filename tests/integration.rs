//! Integration tests for the full pipeline

use modelphy::analysis::{Diagnostic, Severity, analyze};
use modelphy::config::ConvertConfig;
use modelphy::{ModelError, SourceFile, build, parse, translate};

const HKY_MODEL: &str = r#"
// Primate divergence with an HKY substitution model
Real kappa ~ LogNormal(mean=1.0, sigma=0.5);
Simplex pi ~ Dirichlet(alpha=[2, 2, 2, 2]);
QMatrix Q = HKY(kappa=kappa, baseFrequencies=pi);

/* Tree prior */
Real lambda ~ Exponential(mean=10.0);
TimeTree psi ~ BirthDeath(birthrate=lambda, deathrate=0.1, n=4);

Alignment seq ~ PhyloCTMC(tree=psi, substmodel=Q);
observe seq from "primates.fasta";

mrca(taxa=[human, chimp]) ~ LogNormal(mean=2.0, sigma=0.1);
"#;

#[test]
fn test_parse_minimal() {
    let program = parse(HKY_MODEL).expect("Parse failed");
    assert_eq!(program.statements.len(), 8);
}

#[test]
fn test_build_and_translate() {
    let model = build(HKY_MODEL).expect("Build failed");
    assert!(model.is_valid());
    assert_eq!(model.len(), 6);

    let doc = translate(HKY_MODEL, &ConvertConfig::default()).expect("Translate failed");
    assert_eq!(doc.model, "seq_model");
    assert_eq!(doc.random_variables.len(), 5);
    assert_eq!(doc.deterministic_functions.len(), 1);
    assert_eq!(doc.constraints.len(), 1);
    assert_eq!(doc.random_variables["psi"].distribution.generates, "TREE");
}

#[test]
fn test_translate_with_toml_config() {
    let config = ConvertConfig::from_toml_str(
        r#"
title = "Primates"
extra_tags = ["primates"]
"#,
    )
    .unwrap();
    let doc = translate(HKY_MODEL, &config).unwrap();
    assert_eq!(doc.metadata.title, "Primates");
    assert!(doc.metadata.tags.iter().any(|t| t == "primates"));
    assert!(doc.metadata.tags.iter().any(|t| t == "hky"));
}

#[test]
fn test_syntax_errors_stop_the_pipeline() {
    let err = translate("Real x ~ ;", &ConvertConfig::default()).unwrap_err();
    assert!(matches!(err, ModelError::Syntax { ref errors } if errors.len() == 1));
}

#[test]
fn test_report_renders_with_source() {
    let source = SourceFile::new("model.mphy", "observe x from \"f\";");
    let err = build(&source.content).unwrap_err();
    let rendered = format!("{:?}", source.report(err));
    assert!(rendered.contains("Unresolved variable `x`"));
}

#[test]
fn test_analyze_valid_model_is_clean() {
    assert_eq!(analyze(HKY_MODEL), Vec::<Diagnostic>::new());
}

#[test]
fn test_analyze_reports_all_syntax_errors() {
    let diagnostics = analyze("Real x ~ ;\nReal y;\nReal z = ;\n");
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Error));
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (1, 10));
    assert_eq!((diagnostics[1].line, diagnostics[1].column), (3, 10));
    assert_eq!((diagnostics[1].end_line, diagnostics[1].end_column), (3, 11));
}

#[test]
fn test_analyze_unresolved_observation() {
    let diagnostics = analyze("Real y;\nobserve x from \"f.txt\";");
    assert_eq!(diagnostics.len(), 1);
    let d = &diagnostics[0];
    assert_eq!(d.severity, Severity::Error);
    assert_eq!((d.line, d.column), (2, 9));
    assert_eq!(d.message, "Unresolved variable `x`");
}

#[test]
fn test_analyze_warnings() {
    let diagnostics = analyze("Real x ~ Normal(mean=m);");
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Warning));
    assert_eq!(
        diagnostics[0].message,
        "`x` refers to undeclared variable `m`"
    );
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (1, 6));
    assert_eq!(
        diagnostics[1].message,
        "incomplete model: missing tree, substitution model, alignment"
    );
}

#[test]
fn test_analyze_never_panics_on_garbage() {
    for source in ["~~~", "observe", "(((", "\"unterminated", "Real x = [1, ;", "@#$"] {
        let diagnostics = analyze(source);
        assert!(!diagnostics.is_empty(), "{source:?} should produce diagnostics");
    }
}

#[test]
fn test_block_comment_ending_in_stars() {
    let model = build("/* prior **/\nReal x ~ Normal(mean=0.0);\n/***/").unwrap();
    assert!(model.contains("x"));
    assert_eq!(
        analyze("/* a **/ Real x;"),
        vec![Diagnostic {
            line: 1,
            column: 1,
            end_line: 1,
            end_column: 1,
            severity: Severity::Warning,
            message: "incomplete model: missing tree, substitution model, alignment".to_string(),
        }]
    );
}

#[test]
fn test_analyze_columns_count_characters() {
    let diagnostics = analyze("/* é */ Real ;");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "expected a variable name, found `;`");
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (1, 14));
}
