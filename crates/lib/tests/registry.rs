#![cfg(all(feature = "bigquery", feature = "clickhouse"))]

use std::borrow::Cow;
use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use rayon::prelude::*;
use sqlmorph_lib::registry::DialectRegistry;
use sqlmorph_lib::{parse_one, transpile};
use sqlmorph_lib_core::ast::Expr;
use sqlmorph_lib_core::dialects::init::DialectKind;
use sqlmorph_lib_core::helpers::{Config, ToFunctionParser};
use sqlmorph_lib_core::parser::function::StructParser;
use sqlmorph_lib_dialects::ansi;

#[test]
fn overriding_one_registry_leaves_the_other_alone() {
    let builtin = DialectRegistry::builtin(None);
    let mut custom = DialectRegistry::builtin(None);

    // Left unexpanded, registration expands it.
    let patched = ansi::raw_dialect().config(|this| {
        this.add_function_parsers([(Cow::Borrowed("TUPLE"), StructParser.to_function_parser())]);
    });
    assert!(custom.register(patched).is_some());

    let sql = "tuple(a AS x)";
    assert!(matches!(
        parse_one(sql, custom.get(DialectKind::Ansi).unwrap()),
        Ok(Expr::Struct(_))
    ));
    assert!(parse_one(sql, builtin.get(DialectKind::Ansi).unwrap()).is_err());

    // Neighbouring dialects in the same registry are untouched too.
    assert!(parse_one(sql, custom.get(DialectKind::Bigquery).unwrap()).is_err());
    assert!(matches!(
        parse_one(sql, custom.get(DialectKind::Clickhouse).unwrap()),
        Ok(Expr::Struct(_))
    ));
}

#[test]
fn dialects_are_shared_across_threads() {
    let registry = Arc::new(DialectRegistry::builtin(None));

    let handles = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let clickhouse = registry.get(DialectKind::Clickhouse).unwrap();
                let bigquery = registry.get(DialectKind::Bigquery).unwrap();
                transpile(&format!("SELECT tuple(a{i} AS x{i})"), clickhouse, bigquery)
            })
        })
        .collect::<Vec<_>>();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(
            handle.join().unwrap().unwrap(),
            [format!("SELECT STRUCT(a{i} AS x{i})")]
        );
    }
}

#[test]
fn parallel_transpilation_is_deterministic() {
    let registry = DialectRegistry::builtin(None);
    let clickhouse = registry.get(DialectKind::Clickhouse).unwrap();
    let ansi = registry.get(DialectKind::Ansi).unwrap();

    let inputs = (0..64)
        .map(|i| format!("SELECT uniq(c{i}), tuple(c{i}) FROM t{i}"))
        .collect::<Vec<_>>();

    let outputs = inputs
        .par_iter()
        .map(|sql| transpile(sql, clickhouse, ansi).map(|mut out| out.remove(0)))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    for (i, output) in outputs.iter().enumerate() {
        assert_eq!(output, &format!("SELECT APPROX_DISTINCT(c{i}), STRUCT(c{i}) FROM t{i}"));
    }
}
