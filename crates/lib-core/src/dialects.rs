pub mod init;

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};

use crate::ast::ExprKind;
use crate::dialects::init::DialectKind;
use crate::generator::{GeneratorConfig, Transform};
use crate::helpers::is_simple_identifier;
use crate::parser::TableModifier;
use crate::parser::function::{FunctionBuilder, FunctionParser};
use crate::parser::lexer::{Lexer, Matcher};

/// Everything a dialect contributes to the pipeline: its lexer configuration
/// and keyword sets, the function parser overrides, the canonical function
/// builders, table modifiers, type names and the generator transforms.
///
/// Dialects are built by taking a base dialect and layering entries over
/// it; on key collision the later entry wins. A dialect must be
/// [expanded](Dialect::expand) before it parses anything. Registering parser
/// entries on an expanded dialect expands it again, so every registration is
/// validated.
#[derive(Clone, Default)]
pub struct Dialect {
    pub name: DialectKind,
    lexer_matchers: Option<Vec<Matcher>>,
    sets: AHashMap<&'static str, AHashSet<&'static str>>,
    function_parsers: AHashMap<Cow<'static, str>, Arc<dyn FunctionParser>>,
    function_builders: AHashMap<Cow<'static, str>, FunctionBuilder>,
    table_modifiers: AHashMap<Cow<'static, str>, TableModifier>,
    type_aliases: AHashMap<&'static str, &'static str>,
    type_names: AHashMap<&'static str, &'static str>,
    transforms: AHashMap<ExprKind, Arc<dyn Transform>>,
    pub generator_config: GeneratorConfig,
    lexer: Option<Lexer>,
}

impl PartialEq for Dialect {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut function_parsers = self.function_parsers.keys().collect::<Vec<_>>();
        function_parsers.sort();
        let mut transforms = self.transforms.keys().map(ExprKind::to_string).collect::<Vec<_>>();
        transforms.sort();

        f.debug_struct("Dialect")
            .field("name", &self.name)
            .field("function_parsers", &function_parsers)
            .field("function_builders", &self.function_builders.len())
            .field("table_modifiers", &self.table_modifiers.len())
            .field("type_names", &self.type_names.len())
            .field("transforms", &transforms)
            .field("generator_config", &self.generator_config)
            .finish_non_exhaustive()
    }
}

impl Dialect {
    pub fn new() -> Self {
        Dialect {
            name: DialectKind::Ansi,
            ..Default::default()
        }
    }

    pub fn name(&self) -> DialectKind {
        self.name
    }

    pub fn lexer_matchers(&self) -> &[Matcher] {
        match &self.lexer_matchers {
            Some(lexer_matchers) => lexer_matchers,
            None => panic!("Lexing struct has not been set for dialect {:?}", self.name),
        }
    }

    #[track_caller]
    pub fn set_lexer_matchers(&mut self, lexer_matchers: Vec<Matcher>) {
        self.lexer_matchers = lexer_matchers.into();
        self.refresh();
    }

    #[track_caller]
    pub fn insert_lexer_matchers(&mut self, lexer_patch: Vec<Matcher>, before: &str) {
        let Some(lexer_matchers) = self.lexer_matchers.take() else {
            panic!("Lexer struct must be defined before it can be patched!");
        };

        let mut buff = Vec::with_capacity(lexer_matchers.len() + lexer_patch.len());
        let mut found = false;

        for elem in lexer_matchers {
            if elem.name() == before {
                found = true;
                buff.extend(lexer_patch.iter().cloned());
            }
            buff.push(elem);
        }

        if !found {
            panic!("Lexer struct insert before '{before}' failed because tag never found.");
        }

        self.lexer_matchers = Some(buff);
        self.refresh();
    }

    #[track_caller]
    pub fn patch_lexer_matchers(&mut self, lexer_patch: Vec<Matcher>) {
        let Some(lexer_matchers) = self.lexer_matchers.take() else {
            panic!("Lexer struct must be defined before it can be patched!");
        };

        let patch_dict: AHashMap<&'static str, Matcher> = lexer_patch
            .into_iter()
            .map(|elem| (elem.name(), elem))
            .collect();

        let buff = lexer_matchers
            .into_iter()
            .map(|elem| patch_dict.get(elem.name()).cloned().unwrap_or(elem))
            .collect();

        self.lexer_matchers = Some(buff);
        self.refresh();
    }

    pub fn sets(&self, label: &str) -> AHashSet<&'static str> {
        self.sets.get(label).cloned().unwrap_or_default()
    }

    pub fn is_reserved_keyword(&self, word: &str) -> bool {
        self.sets
            .get("reserved_keywords")
            .is_some_and(|keywords| keywords.contains(word.to_ascii_uppercase().as_str()))
    }

    /// Mutable access to a keyword set. The lexer only sees the change once
    /// the dialect is expanded again.
    pub fn sets_mut(&mut self, label: &'static str) -> &mut AHashSet<&'static str> {
        self.sets.entry(label).or_default()
    }

    #[track_caller]
    pub fn update_keywords_set_from_multiline_string(
        &mut self,
        set_label: &'static str,
        values: &'static str,
    ) {
        let keywords = values.lines().map(str::trim).filter(|kw| !kw.is_empty());
        self.sets_mut(set_label).extend(keywords);
        self.refresh();
    }

    #[track_caller]
    pub fn remove_keywords(&mut self, set_label: &'static str, keywords: &[&str]) {
        if let Some(set) = self.sets.get_mut(set_label) {
            set.retain(|keyword| !keywords.contains(keyword));
        }
        self.refresh();
    }

    /// Registers parser overrides keyed by construct identifier. Existing
    /// entries under the same key are replaced.
    #[track_caller]
    pub fn add_function_parsers(
        &mut self,
        iter: impl IntoIterator<Item = (Cow<'static, str>, Arc<dyn FunctionParser>)>,
    ) {
        self.function_parsers.extend(iter);
        self.refresh();
    }

    #[track_caller]
    pub fn replace_function_parser(&mut self, name: &'static str, parser: Arc<dyn FunctionParser>) {
        match self.function_parsers.get_mut(name) {
            Some(target) => *target = parser,
            None => panic!("Failed to replace function parser {name}: it was never registered"),
        }
    }

    pub fn remove_function_parser(&mut self, name: &str) -> Option<Arc<dyn FunctionParser>> {
        self.function_parsers.remove(name)
    }

    pub fn function_parser(&self, name: &str) -> Option<&Arc<dyn FunctionParser>> {
        self.function_parsers.get(name)
    }

    #[track_caller]
    pub fn add_function_builders(
        &mut self,
        iter: impl IntoIterator<Item = (Cow<'static, str>, FunctionBuilder)>,
    ) {
        self.function_builders.extend(iter);
        self.refresh();
    }

    pub fn function_builder(&self, name: &str) -> Option<FunctionBuilder> {
        self.function_builders.get(name).copied()
    }

    /// Registers modifiers the parser applies when the keyword follows a
    /// table reference in `FROM`. Keys must be reserved keywords.
    #[track_caller]
    pub fn add_table_modifiers(
        &mut self,
        iter: impl IntoIterator<Item = (Cow<'static, str>, TableModifier)>,
    ) {
        self.table_modifiers.extend(iter);
        self.refresh();
    }

    pub fn table_modifier(&self, keyword: &str) -> Option<TableModifier> {
        self.table_modifiers.get(keyword).copied()
    }

    /// Maps type names as written, in uppercase, to canonical type names.
    pub fn add_type_aliases(
        &mut self,
        iter: impl IntoIterator<Item = (&'static str, &'static str)>,
    ) {
        self.type_aliases.extend(iter);
    }

    /// The canonical name for an uppercase type name.
    pub fn canonical_type<'n>(&self, name: &'n str) -> &'n str {
        self.type_aliases.get(name).copied().unwrap_or(name)
    }

    /// Maps canonical type names to the spelling this dialect generates.
    pub fn add_type_names(&mut self, iter: impl IntoIterator<Item = (&'static str, &'static str)>) {
        self.type_names.extend(iter);
    }

    pub fn type_name<'n>(&self, canonical: &'n str) -> &'n str {
        self.type_names.get(canonical).copied().unwrap_or(canonical)
    }

    /// Registers generator transforms keyed by node kind. Existing entries
    /// for the same kind are replaced.
    pub fn add_transforms(&mut self, iter: impl IntoIterator<Item = (ExprKind, Arc<dyn Transform>)>) {
        self.transforms.extend(iter);
    }

    pub fn remove_transform(&mut self, kind: ExprKind) -> Option<Arc<dyn Transform>> {
        self.transforms.remove(&kind)
    }

    pub fn transform(&self, kind: ExprKind) -> Option<&Arc<dyn Transform>> {
        self.transforms.get(&kind)
    }

    pub fn is_expanded(&self) -> bool {
        self.lexer.is_some()
    }

    /// Expands again after a registration on an already expanded dialect.
    #[track_caller]
    fn refresh(&mut self) {
        if self.is_expanded() {
            self.expand();
        }
    }

    /// Finishes construction: validates the registries and builds the
    /// lexer. Panics on a misconfigured dialect.
    #[track_caller]
    pub fn expand(&mut self) {
        let reserved_keywords = self.sets("reserved_keywords");

        for keyword in self.table_modifiers.keys() {
            if !reserved_keywords.contains(keyword.as_ref()) {
                panic!(
                    "Dialect {:?} registers table modifier '{keyword}' which is not a reserved \
                     keyword.",
                    self.name
                );
            }
        }

        let keys = self
            .function_parsers
            .keys()
            .chain(self.function_builders.keys());
        for key in keys {
            if !is_simple_identifier(key) || key.to_ascii_uppercase() != *key {
                panic!(
                    "Dialect {:?} registers '{key}' which is not an uppercase construct identifier.",
                    self.name
                );
            }

            if reserved_keywords.contains(key.as_ref()) {
                panic!(
                    "Dialect {:?} registers '{key}' which collides with a reserved keyword of the \
                     base grammar.",
                    self.name
                );
            }
        }

        self.lexer = Lexer::new(self.lexer_matchers(), reserved_keywords).into();

        log::debug!(
            "expanded dialect {}: {} function parsers, {} function builders, {} transforms",
            self.name.name(),
            self.function_parsers.len(),
            self.function_builders.len(),
            self.transforms.len()
        );
    }

    pub fn lexer(&self) -> &Lexer {
        match &self.lexer {
            Some(lexer) => lexer,
            None => panic!("Dialect {:?} has not been expanded", self.name),
        }
    }

    /// The escape character of string literals, known once expanded.
    pub fn string_escape(&self) -> Option<char> {
        self.lexer.as_ref().and_then(Lexer::string_escape)
    }
}
