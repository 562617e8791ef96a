use std::path::PathBuf;
use std::str::FromStr;

use itertools::Itertools;
use pretty_assertions::assert_eq;
use rayon::iter::ParallelIterator;
use rayon::prelude::IntoParallelRefIterator;
use sqlmorph_lib_core::ast::Expr;
use sqlmorph_lib_core::dialects::Dialect;
use sqlmorph_lib_core::dialects::init::DialectKind;
use sqlmorph_lib_core::generator::Generator;
use sqlmorph_lib_core::helpers;
use sqlmorph_lib_core::parser::Parser;
use sqlmorph_lib_dialects::kind_to_dialect;
use strum::IntoEnumIterator;

fn parse(dialect: &Dialect, sql: &str) -> Vec<Expr> {
    let tokens = dialect.lexer().lex(sql).unwrap();
    Parser::new(dialect, tokens).parse().unwrap()
}

/// Renders every statement on its own line, terminated by `;`.
fn render(dialect: &Dialect, statements: &[Expr]) -> String {
    let generator = Generator::new(dialect);
    statements
        .iter()
        .map(|statement| format!("{};\n", generator.sql(statement).unwrap()))
        .collect()
}

// Each fixture is written in the generator's canonical form, so rendering
// what was parsed must give back the fixture text, and parsing that text
// again must give back the same tree.
fn main() {
    let args = std::env::args().skip(1).collect::<Vec<String>>();

    let arg_dialect = match args.as_slice() {
        [name] => Some(DialectKind::from_str(name).unwrap()),
        _ => None,
    };

    let dialects_dir = std::path::Path::new("test/fixtures/dialects");

    for dialect_kind in DialectKind::iter() {
        if arg_dialect.is_some_and(|kind| kind != dialect_kind) {
            continue;
        }

        let dialect_name = dialect_kind.as_ref();
        assert!(
            dialects_dir.join(dialect_name).is_dir(),
            "no fixtures for {dialect_name}"
        );

        let Some(dialect) = kind_to_dialect(&dialect_kind, None) else {
            println!("{dialect_name} disabled");
            continue;
        };

        let path = format!("test/fixtures/dialects/{dialect_name}/*.sql");
        let files: Vec<PathBuf> = glob::glob(&path).unwrap().flatten().collect_vec();

        println!("For dialect: {dialect_name}, found {} files", files.len());
        assert!(!files.is_empty());

        files.par_iter().for_each(|file| {
            let _panic = helpers::enter_panic(file.display().to_string());

            let sql = std::fs::read_to_string(file).unwrap();
            let statements = parse(&dialect, &sql);
            assert!(!statements.is_empty());

            let actual = render(&dialect, &statements);
            assert_eq!(actual, sql);

            let reparsed = parse(&dialect, &actual);
            assert_eq!(reparsed, statements);
        });
    }
}
