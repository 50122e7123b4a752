//! `import` and `export` declarations.

use crate::dialect::StatementContext;
use crate::node_builder::NodeStart;
use crate::parser::Parser;
use ecma_ast::{Node, NodeKind, TokenType};
use ecma_core::text::TextPos;
use ecma_diagnostics::{messages, ParseResult};
use ecma_scanner::Plugin;
use tracing::debug;

impl Parser {
    /// An `import` or `export` at statement start.
    pub(crate) fn parse_module_item(&mut self, start: NodeStart, context: StatementContext) -> ParseResult<Node> {
        if !self.options.allow_import_export_everywhere && !context.top_level {
            return Err(self.raise(start.pos, &messages::IMPORT_EXPORT_NOT_TOP_LEVEL, &[]));
        }
        let is_import = self.is(TokenType::Import);
        self.next()?;
        let node = if is_import { self.parse_import(start)? } else { self.parse_export(start)? };
        self.assert_module_node_allowed(&node)?;
        Ok(node)
    }

    fn assert_module_node_allowed(&mut self, node: &Node) -> ParseResult<()> {
        // `import x = require("m")` is valid in a TypeScript script.
        let is_import_equals = matches!(node.kind, NodeKind::TSImportEqualsDeclaration { is_export: false, .. });
        if !is_import_equals && !self.options.allow_import_export_everywhere && !self.in_module {
            return Err(self.raise(node.start, &messages::IMPORT_OUTSIDE_MODULE, &[]));
        }
        if !self.saw_unambiguous_esm {
            debug!(pos = node.start, kind = node.type_name(), "module syntax found");
            self.saw_unambiguous_esm = true;
        }
        Ok(())
    }

    // ========================================================================
    // Import
    // ========================================================================

    /// The rest of an import declaration after `import`.
    pub(crate) fn parse_import(&mut self, start: NodeStart) -> ParseResult<Node> {
        if let Some(node) = self.hook_import_declaration(start)? {
            return Ok(node);
        }
        let import_kind = self.hook_import_kind()?;
        self.parse_import_with_kind(start, import_kind)
    }

    /// Specifiers and source, once any kind keyword has been consumed.
    pub(crate) fn parse_import_with_kind(
        &mut self,
        start: NodeStart,
        import_kind: Option<&'static str>,
    ) -> ParseResult<Node> {
        let mut specifiers = Vec::new();
        if !self.is(TokenType::String) {
            self.parse_import_specifiers(&mut specifiers)?;
            self.expect_contextual("from")?;
        }
        let source = self.parse_module_source()?;
        self.semicolon()?;
        Ok(self.finish_node(
            start,
            NodeKind::ImportDeclaration { specifiers, source: Box::new(source), import_kind },
        ))
    }

    /// The string after `from`.
    pub(crate) fn parse_module_source(&mut self) -> ParseResult<Node> {
        if !self.is(TokenType::String) {
            return Err(self.unexpected());
        }
        self.parse_expr_atom(None)
    }

    fn parse_import_specifiers(&mut self, specifiers: &mut Vec<Node>) -> ParseResult<()> {
        if self.is(TokenType::Name) {
            let start = self.start_node();
            let local = self.parse_import_local("default import specifier")?;
            specifiers.push(self.finish_node(start, NodeKind::ImportDefaultSpecifier { local }));
            if !self.eat(TokenType::Comma)? {
                return Ok(());
            }
        }

        if self.is(TokenType::Star) {
            let start = self.start_node();
            self.next()?;
            self.expect_contextual("as")?;
            let local = self.parse_import_local("import namespace specifier")?;
            specifiers.push(self.finish_node(start, NodeKind::ImportNamespaceSpecifier { local }));
            return Ok(());
        }

        self.expect(TokenType::BraceL)?;
        let mut first = true;
        while !self.eat(TokenType::BraceR)? {
            if first {
                first = false;
            } else {
                if self.eat(TokenType::Colon)? {
                    return Err(self.raise(self.state().last_tok_start, &messages::IMPORT_DESTRUCTURE, &[]));
                }
                self.expect(TokenType::Comma)?;
                if self.eat(TokenType::BraceR)? {
                    break;
                }
            }
            let specifier = match self.hook_import_specifier()? {
                Some(specifier) => specifier,
                None => self.parse_import_specifier()?,
            };
            specifiers.push(specifier);
        }
        Ok(())
    }

    /// A local binding name introduced by an import.
    pub(crate) fn parse_import_local(&mut self, context: &str) -> ParseResult<Box<Node>> {
        let local = self.parse_identifier(false)?;
        self.check_lval(&local, true, None, context)?;
        Ok(Box::new(local))
    }

    /// `name` or `name as local` inside import braces.
    pub(crate) fn parse_import_specifier(&mut self) -> ParseResult<Node> {
        let start = self.start_node();
        let imported = self.parse_identifier(true)?;
        let local = if self.eat_contextual("as")? {
            self.parse_identifier(false)?
        } else {
            let name = imported.identifier_name().unwrap_or_default();
            self.check_reserved_word(name, imported.start, true, true)?;
            imported.clone()
        };
        self.check_lval(&local, true, None, "import specifier")?;
        Ok(self.finish_node(
            start,
            NodeKind::ImportSpecifier { imported: Box::new(imported), local: Box::new(local), import_kind: None },
        ))
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// The rest of an export declaration after `export`.
    pub(crate) fn parse_export(&mut self, start: NodeStart) -> ParseResult<Node> {
        if let Some(node) = self.hook_export_declaration(start)? {
            self.check_export_decorators(start.pos)?;
            return Ok(node);
        }

        if self.is(TokenType::Star) {
            return self.parse_export_star(start);
        }
        if self.is_export_default_specifier()? {
            return self.parse_export_default_from(start);
        }
        if self.eat(TokenType::Default)? {
            let declaration = self.parse_export_default_expression()?;
            self.check_duplicate_export(start.pos, "default")?;
            self.check_export_decorators(start.pos)?;
            return Ok(self.finish_node(
                start,
                NodeKind::ExportDefaultDeclaration { declaration: Box::new(declaration) },
            ));
        }

        let (declaration, specifiers, source) = if self.should_parse_export_declaration()? {
            if self.is_contextual("async") {
                let next = self.lookahead()?;
                if next.token_type != TokenType::Function {
                    return Err(self.raise(next.start, &messages::UNEXPECTED_TOKEN_EXPECTED, &["function"]));
                }
            }
            let declaration = self.parse_statement(StatementContext::BLOCK)?;
            (Some(declaration), Vec::new(), None)
        } else {
            let specifiers = self.parse_export_specifiers()?;
            let source = self.parse_export_from(false)?;
            (None, specifiers, source)
        };

        self.check_named_exports(start.pos, declaration.as_ref(), &specifiers, source.is_some())?;
        self.check_export_decorators(start.pos)?;
        Ok(self.finish_node(
            start,
            NodeKind::ExportNamedDeclaration {
                declaration: declaration.map(Box::new),
                specifiers,
                source: source.map(Box::new),
                export_kind: None,
            },
        ))
    }

    /// `export * from "m"` or `export * as ns from "m"`.
    fn parse_export_star(&mut self, start: NodeStart) -> ParseResult<Node> {
        let star_start = self.start_node();
        self.next()?;
        if !self.is_contextual("as") {
            self.expect_contextual("from")?;
            let source = self.parse_module_source()?;
            self.semicolon()?;
            return Ok(self.finish_node(
                start,
                NodeKind::ExportAllDeclaration { source: Box::new(source), export_kind: None },
            ));
        }

        self.expect_plugin(Plugin::ExportNamespaceFrom, None)?;
        self.next()?;
        let exported = self.parse_identifier(true)?;
        let mut specifiers = vec![self.finish_node(
            star_start,
            NodeKind::ExportNamespaceSpecifier { exported: Box::new(exported) },
        )];
        if self.eat(TokenType::Comma)? {
            specifiers.extend(self.parse_export_specifiers()?);
        }
        let source = self.parse_export_from(true)?;
        self.check_named_exports(start.pos, None, &specifiers, true)?;
        Ok(self.finish_node(
            start,
            NodeKind::ExportNamedDeclaration { declaration: None, specifiers, source: source.map(Box::new), export_kind: None },
        ))
    }

    /// `export v from "m"`, optionally followed by `, * as ns` or a brace
    /// list.
    fn parse_export_default_from(&mut self, start: NodeStart) -> ParseResult<Node> {
        self.expect_plugin(Plugin::ExportDefaultFrom, None)?;
        let specifier_start = self.start_node();
        let exported = self.parse_identifier(true)?;
        let mut specifiers = vec![self.finish_node(
            specifier_start,
            NodeKind::ExportDefaultSpecifier { exported: Box::new(exported) },
        )];

        if self.is(TokenType::Comma) && self.lookahead()?.token_type == TokenType::Star {
            self.expect(TokenType::Comma)?;
            let ns_start = self.start_node();
            self.expect(TokenType::Star)?;
            self.expect_contextual("as")?;
            let exported = self.parse_identifier(true)?;
            specifiers.push(self.finish_node(
                ns_start,
                NodeKind::ExportNamespaceSpecifier { exported: Box::new(exported) },
            ));
        } else if self.eat(TokenType::Comma)? {
            specifiers.extend(self.parse_export_specifiers()?);
        }
        let source = self.parse_export_from(true)?;
        self.check_named_exports(start.pos, None, &specifiers, true)?;
        Ok(self.finish_node(
            start,
            NodeKind::ExportNamedDeclaration { declaration: None, specifiers, source: source.map(Box::new), export_kind: None },
        ))
    }

    /// An optional `from "m"` and the statement terminator.
    pub(crate) fn parse_export_from(&mut self, required: bool) -> ParseResult<Option<Node>> {
        let source = if self.eat_contextual("from")? {
            Some(self.parse_module_source()?)
        } else if required {
            return Err(self.unexpected());
        } else {
            None
        };
        self.semicolon()?;
        Ok(source)
    }

    fn is_export_default_specifier(&mut self) -> ParseResult<bool> {
        if self.is(TokenType::Name) {
            let value = self.value();
            return Ok(value != "async" && value != "let" && !self.is_dialect_declaration_keyword());
        }
        if !self.is(TokenType::Default) {
            return Ok(false);
        }
        let next = self.lookahead()?;
        Ok(next.token_type == TokenType::Comma
            || (next.token_type == TokenType::Name && next.value.str_or_empty() == "from"))
    }

    /// Names a type dialect reads as a declaration keyword after `export`.
    fn is_dialect_declaration_keyword(&self) -> bool {
        let value = self.value();
        (self.has_type_dialect() && matches!(value, "type" | "interface"))
            || (self.has_plugin(Plugin::Flow) && value == "opaque")
            || (self.has_plugin(Plugin::Typescript)
                && matches!(value, "declare" | "abstract" | "enum" | "namespace" | "module"))
    }

    fn should_parse_export_declaration(&mut self) -> ParseResult<bool> {
        if self.is(TokenType::At) {
            self.expect_plugin(Plugin::Decorators, None)?;
            return Err(self.raise(self.start(), &messages::DECORATOR_BEFORE_EXPORT, &[]));
        }
        Ok(matches!(self.cur(), TokenType::Var | TokenType::Const | TokenType::Function | TokenType::Class)
            || self.is_contextual("async")
            || (self.is(TokenType::Name) && self.is_dialect_declaration_keyword())
            || self.is_let_declaration()?)
    }

    fn parse_export_default_expression(&mut self) -> ParseResult<Node> {
        let start = self.start_node();
        let is_async = self.is_async_function()?;
        if is_async {
            self.next()?;
        }
        if self.eat(TokenType::Function)? {
            return self.parse_function(start, true, is_async, true);
        }
        if self.is(TokenType::Class) {
            return self.parse_class(start, true, true);
        }
        if self.is(TokenType::At) {
            self.expect_plugin(Plugin::Decorators, None)?;
            return Err(self.raise(self.start(), &messages::DECORATOR_BEFORE_EXPORT, &[]));
        }
        if self.is(TokenType::Const) || self.is(TokenType::Var) || self.is_let_declaration()? {
            return Err(self.raise(self.start(), &messages::EXPORT_DEFAULT_NOT_EXPRESSION, &[]));
        }
        let expr = self.parse_maybe_assign()?;
        self.semicolon()?;
        Ok(expr)
    }

    /// `{ a, b as c }`. A `default` local is only valid when re-exporting
    /// from another module.
    pub(crate) fn parse_export_specifiers(&mut self) -> ParseResult<Vec<Node>> {
        let mut specifiers = Vec::new();
        let mut needs_from = false;
        let mut first = true;
        self.expect(TokenType::BraceL)?;
        while !self.eat(TokenType::BraceR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                if self.eat(TokenType::BraceR)? {
                    break;
                }
            }
            let is_default = self.is(TokenType::Default);
            needs_from |= is_default;
            let start = self.start_node();
            let local = self.parse_identifier(is_default)?;
            let exported = if self.eat_contextual("as")? {
                self.parse_identifier(true)?
            } else {
                local.clone()
            };
            specifiers.push(self.finish_node(
                start,
                NodeKind::ExportSpecifier { local: Box::new(local), exported: Box::new(exported) },
            ));
        }
        if needs_from && !self.is_contextual("from") {
            return Err(self.unexpected());
        }
        Ok(specifiers)
    }

    // ========================================================================
    // Export checks
    // ========================================================================

    /// Record the names a named export introduces, rejecting duplicates.
    pub(crate) fn check_named_exports(
        &mut self,
        export_start: TextPos,
        declaration: Option<&Node>,
        specifiers: &[Node],
        has_source: bool,
    ) -> ParseResult<()> {
        for specifier in specifiers {
            let (exported, local) = match &specifier.kind {
                NodeKind::ExportSpecifier { exported, local } => (exported, Some(local)),
                NodeKind::ExportDefaultSpecifier { exported } | NodeKind::ExportNamespaceSpecifier { exported } => {
                    (exported, None)
                }
                _ => continue,
            };
            let name = exported.identifier_name().unwrap_or_default().to_string();
            self.check_duplicate_export(specifier.start, &name)?;
            if let (false, Some(local)) = (has_source, local) {
                let local_name = local.identifier_name().unwrap_or_default();
                self.check_reserved_word(local_name, local.start, true, false)?;
            }
        }

        let Some(declaration) = declaration else {
            return Ok(());
        };
        let mut names = Vec::new();
        match &declaration.kind {
            NodeKind::FunctionDeclaration { function } => {
                if let Some(name) = function.id.as_ref().and_then(|id| id.identifier_name()) {
                    names.push((export_start, name.to_string()));
                }
            }
            NodeKind::ClassDeclaration { class } => {
                if let Some(name) = class.id.as_ref().and_then(|id| id.identifier_name()) {
                    names.push((export_start, name.to_string()));
                }
            }
            NodeKind::VariableDeclaration { declarations, .. } => {
                for declarator in declarations {
                    if let NodeKind::VariableDeclarator { id, .. } = &declarator.kind {
                        collect_bound_names(id, &mut names);
                    }
                }
            }
            _ => {}
        }
        for (pos, name) in names {
            self.check_duplicate_export(pos, &name)?;
        }
        Ok(())
    }

    pub(crate) fn check_duplicate_export(&mut self, pos: TextPos, name: &str) -> ParseResult<()> {
        if self.tok.state.exported_identifiers.insert(name.to_string()) {
            return Ok(());
        }
        if name == "default" {
            Err(self.raise(pos, &messages::DUPLICATE_DEFAULT_EXPORT, &[]))
        } else {
            Err(self.raise(pos, &messages::DUPLICATE_EXPORT, &[name]))
        }
    }

    /// Decorators written before `export` are taken by the exported class;
    /// any left over decorate something else.
    fn check_export_decorators(&self, export_start: TextPos) -> ParseResult<()> {
        if self.has_pending_decorators() {
            return Err(self.raise(export_start, &messages::DECORATED_NON_CLASS_EXPORT, &[]));
        }
        Ok(())
    }
}

/// Names bound by a declarator pattern, with their positions.
fn collect_bound_names(pattern: &Node, names: &mut Vec<(TextPos, String)>) {
    match &pattern.kind {
        NodeKind::Identifier { name, .. } => names.push((pattern.start, name.clone())),
        NodeKind::ObjectPattern { properties, .. } => {
            for property in properties {
                collect_bound_names(property, names);
            }
        }
        NodeKind::ArrayPattern { elements, .. } => {
            for element in elements.iter().flatten() {
                collect_bound_names(element, names);
            }
        }
        NodeKind::ObjectProperty { value, .. } => collect_bound_names(value, names),
        NodeKind::RestElement { argument, .. } => collect_bound_names(argument, names),
        NodeKind::AssignmentPattern { left, .. } => collect_bound_names(left, names),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use crate::parse;
    use ecma_ast::{Node, NodeKind, SourceType};
    use ecma_scanner::Plugin;

    fn module_options() -> ParserOptions {
        ParserOptions { source_type: SourceType::Module, ..ParserOptions::default() }
    }

    fn body(source: &str) -> Vec<Node> {
        body_with(source, module_options())
    }

    fn body_with(source: &str, options: ParserOptions) -> Vec<Node> {
        let file = parse(source, options).unwrap();
        let NodeKind::File { program, .. } = file.kind else {
            panic!("expected a file");
        };
        let NodeKind::Program { body, .. } = program.kind else {
            panic!("expected a program");
        };
        body
    }

    fn error(source: &str) -> String {
        error_with(source, module_options())
    }

    fn error_with(source: &str, options: ParserOptions) -> String {
        parse(source, options).unwrap_err().to_string()
    }

    fn specifier_types(node: &Node) -> Vec<&'static str> {
        match &node.kind {
            NodeKind::ImportDeclaration { specifiers, .. } | NodeKind::ExportNamedDeclaration { specifiers, .. } => {
                specifiers.iter().map(Node::type_name).collect()
            }
            _ => panic!("expected a module declaration, got {}", node.type_name()),
        }
    }

    #[test]
    fn test_import_forms() {
        let body = body(
            "import 'side';\nimport a from 'a';\nimport * as ns from 'b';\nimport d, { x, y as z, } from 'c';",
        );
        let kinds: Vec<_> = body.iter().map(specifier_types).collect();
        assert_eq!(
            kinds,
            vec![
                vec![],
                vec!["ImportDefaultSpecifier"],
                vec!["ImportNamespaceSpecifier"],
                vec!["ImportDefaultSpecifier", "ImportSpecifier", "ImportSpecifier"],
            ]
        );
        let NodeKind::ImportDeclaration { specifiers, source, .. } = &body[3].kind else {
            unreachable!();
        };
        assert_eq!(source.string_value(), Some("c"));
        let NodeKind::ImportSpecifier { imported, local, .. } = &specifiers[2].kind else {
            panic!("expected an import specifier");
        };
        assert!(imported.is_identifier("y"));
        assert!(local.is_identifier("z"));
    }

    #[test]
    fn test_import_errors() {
        assert_eq!(
            error("import { a: b } from 'x';"),
            "ES2015 named imports do not destructure. Use another statement for destructuring after the import. (1:10)"
        );
        assert_eq!(error("import { if } from 'x';"), "if is a reserved word (1:9)");
        assert_eq!(error("import a from b;"), "Unexpected token (1:14)");
    }

    #[test]
    fn test_module_syntax_in_script() {
        assert_eq!(
            error_with("import a from 'a';", ParserOptions::default()),
            "'import' and 'export' may appear only with 'sourceType: \"module\"' (1:0)"
        );
        let options = ParserOptions { allow_import_export_everywhere: true, ..ParserOptions::default() };
        assert_eq!(body_with("if (x) { import a from 'a'; }", options).len(), 1);
    }

    #[test]
    fn test_module_item_not_top_level() {
        assert_eq!(
            error("{ export var a; }"),
            "'import' and 'export' may only appear at the top level (1:2)"
        );
    }

    #[test]
    fn test_export_declarations() {
        let body = body(
            "export var a = 1, { b, c: [d] } = e;\nexport function f() {}\nexport class C {}\nexport async function g() {}",
        );
        assert_eq!(body.len(), 4);
        for node in &body {
            let NodeKind::ExportNamedDeclaration { declaration, specifiers, source, .. } = &node.kind else {
                panic!("expected a named export, got {}", node.type_name());
            };
            assert!(declaration.is_some());
            assert!(specifiers.is_empty());
            assert!(source.is_none());
        }
    }

    #[test]
    fn test_export_specifiers() {
        let body = body("var a, b; export { a, b as c, };\nexport { default as d } from 'm';");
        let NodeKind::ExportNamedDeclaration { specifiers, source, .. } = &body[1].kind else {
            panic!("expected a named export");
        };
        assert_eq!(specifiers.len(), 2);
        assert!(source.is_none());
        let NodeKind::ExportSpecifier { local, exported } = &specifiers[1].kind else {
            panic!("expected an export specifier");
        };
        assert!(local.is_identifier("b"));
        assert!(exported.is_identifier("c"));
        assert_eq!(error("export { default };"), "Unexpected token (1:18)");
    }

    #[test]
    fn test_export_default() {
        let body = body("export default function () {}\n");
        let NodeKind::ExportDefaultDeclaration { declaration } = &body[0].kind else {
            panic!("expected a default export");
        };
        let NodeKind::FunctionDeclaration { function } = &declaration.kind else {
            panic!("expected a function declaration, got {}", declaration.type_name());
        };
        assert!(function.id.is_none());

        for (source, expected) in [("export default class {}", "ClassDeclaration"), ("export default a + b;", "BinaryExpression")] {
            let body = body_with(source, module_options());
            let NodeKind::ExportDefaultDeclaration { declaration } = &body[0].kind else {
                panic!("expected a default export");
            };
            assert_eq!(declaration.type_name(), expected);
        }

        assert_eq!(
            error("export default var a = 1;"),
            "Only expressions, functions or classes are allowed as the `default` export. (1:15)"
        );
    }

    #[test]
    fn test_duplicate_exports() {
        assert_eq!(
            error("export var a; export { b as a };"),
            "`a` has already been exported. Exported identifiers must be unique. (1:23)"
        );
        assert_eq!(
            error("export var { x: [a] } = o; export function a() {}"),
            "`a` has already been exported. Exported identifiers must be unique. (1:27)"
        );
        assert_eq!(
            error("export default 1; export { a as default };"),
            "Only one default export allowed per module. (1:27)"
        );
    }

    #[test]
    fn test_export_async_requires_function() {
        assert_eq!(error("export async x;"), "Unexpected token, expected \"function\" (1:13)");
    }

    #[test]
    fn test_export_star() {
        assert_eq!(body("export * from 'm';")[0].type_name(), "ExportAllDeclaration");

        let err = parse("export * as ns from 'm';", module_options()).unwrap_err();
        assert_eq!(err.missing_plugin, Some(vec!["exportNamespaceFrom".to_string()]));

        let options = module_options().with_plugins([Plugin::ExportNamespaceFrom]);
        let body = body_with("export * as ns, { a } from 'm';", options);
        assert_eq!(specifier_types(&body[0]), vec!["ExportNamespaceSpecifier", "ExportSpecifier"]);
    }

    #[test]
    fn test_export_default_from() {
        let err = parse("export v from 'm';", module_options()).unwrap_err();
        assert_eq!(err.missing_plugin, Some(vec!["exportDefaultFrom".to_string()]));

        let options = module_options().with_plugins([Plugin::ExportDefaultFrom]);
        let body = body_with("export v, * as ns from 'm';", options);
        assert_eq!(specifier_types(&body[0]), vec!["ExportDefaultSpecifier", "ExportNamespaceSpecifier"]);
    }

    #[test]
    fn test_decorators_and_export() {
        let options = module_options().with_plugins([Plugin::Decorators]);
        let body = body_with("@dec export class A {}", options.clone());
        let NodeKind::ExportNamedDeclaration { declaration: Some(declaration), .. } = &body[0].kind else {
            panic!("expected a named export");
        };
        let NodeKind::ClassDeclaration { class } = &declaration.kind else {
            panic!("expected a class declaration");
        };
        assert_eq!(class.decorators.len(), 1);
        assert_eq!(declaration.start, 0);

        assert!(error_with("export @dec class A {}", options.clone()).starts_with("Decorators must be placed *before*"));
        assert_eq!(
            error_with("@dec export const a = 1;", options),
            "You can only use decorators on an export when exporting a class (1:5)"
        );
    }
}
