//! Hierarchical parser for the Kotlin subset used by klint
//!
//! The parser builds a lossless rowan tree whose node layout follows the
//! Kotlin PSI: declarations own their leading comments, dot chains nest
//! leftwards, and whitespace belongs to whichever node is open when the next
//! significant token is consumed. Indentation checks are sensitive to exactly
//! these placements, so the tree shape is part of the contract.
//!
//! Parsing never fails. Problems are reported as [`ParseError`]s next to a
//! complete tree that still reproduces the input text.

use std::fmt;

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};

use super::lexer::{CstSpan, LexerError};
use super::{CstToken, KtSyntaxKind, KtSyntaxNode, lex_with_trivia};

use KtSyntaxKind::*;

/// Words that act as modifiers in front of a declaration
const MODIFIERS: &[&str] = &[
    "abstract",
    "actual",
    "annotation",
    "companion",
    "const",
    "crossinline",
    "data",
    "enum",
    "expect",
    "external",
    "final",
    "in",
    "infix",
    "inline",
    "inner",
    "internal",
    "lateinit",
    "noinline",
    "open",
    "operator",
    "out",
    "override",
    "private",
    "protected",
    "public",
    "reified",
    "sealed",
    "suspend",
    "tailrec",
    "vararg",
];

/// A problem found while lexing or parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: CstSpan,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl From<LexerError> for ParseError {
    fn from(error: LexerError) -> Self {
        Self::new(error.message, error.span)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
    }
}

/// Parse Kotlin source into a PSI-shaped CST
///
/// # Example
///
/// ```rust,ignore
/// use klint_core::cst::parse_kotlin;
///
/// let source = "fun main() {\n    println(1)\n}\n";
/// let (cst, errors) = parse_kotlin(source);
/// assert!(errors.is_empty());
/// assert_eq!(cst.text().to_string(), source);
/// ```
pub fn parse_kotlin(source: &str) -> (KtSyntaxNode, Vec<ParseError>) {
    let (tokens, lexer_errors) = lex_with_trivia(source);
    let mut parser = Parser::new(&tokens);
    parser.parse_file();
    let (green, parse_errors) = parser.finish();

    let mut errors: Vec<ParseError> = lexer_errors.into_iter().map(ParseError::from).collect();
    errors.extend(parse_errors);
    errors.sort_by_key(|error| error.span.start);

    if !errors.is_empty() {
        tracing::debug!("Parsed with {} error(s)", errors.len());
    }

    (KtSyntaxNode::new_root(green), errors)
}

/// Token stream parser
///
/// Trivia is attached lazily: it stays pending until the next significant
/// token is bumped or a new node is started, and is then emitted into the
/// node that is open at that moment.
struct Parser<'a> {
    tokens: &'a [CstToken],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
    /// Whether a line break ends the current expression
    newlines_significant: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            newlines_significant: true,
        }
    }

    fn finish(self) -> (GreenNode, Vec<ParseError>) {
        (self.builder.finish(), self.errors)
    }

    // ==================
    // Declarations
    // ==================

    fn parse_file(&mut self) {
        // Root node: there is no parent to receive leading trivia
        self.builder.start_node(File.into());

        if self.at(PackageKw) {
            self.parse_package_directive();
        }
        if self.at(ImportKw) {
            self.parse_import_list();
        }

        while !self.at_end() {
            let before = self.significant_pos();
            match self.declaration_kind() {
                Some(kind) => self.parse_declaration(kind, true),
                None => self.parse_expression(),
            }
            if self.significant_pos() == before {
                self.error_and_recover("Expected a declaration");
            }
        }

        self.flush_trivia();
        self.builder.finish_node(); // FILE
    }

    fn parse_package_directive(&mut self) {
        self.start_node(PackageDirective);
        self.bump(); // package
        self.parse_qualified_name();
        self.finish_node();
    }

    fn parse_import_list(&mut self) {
        self.start_node(ImportList);
        while self.at(ImportKw) {
            self.start_node(ImportDirective);
            self.bump(); // import
            self.parse_qualified_name();
            if self.at(Dot) && self.nth(1) == Some(Star) {
                self.bump();
                self.bump();
            }
            if self.at_word("as") && self.nth(1) == Some(Ident) {
                self.bump();
                self.bump();
            }
            self.finish_node();
        }
        self.finish_node();
    }

    /// `a.b.c` as nested dot-qualified references
    fn parse_qualified_name(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_reference();
        while self.at(Dot) && self.nth(1) == Some(Ident) {
            self.start_node_at(checkpoint, DotQualifiedExpression);
            self.bump();
            self.parse_reference();
            self.finish_node();
        }
    }

    /// Declaration node kind starting at the current token, looking past modifiers
    fn declaration_kind(&self) -> Option<KtSyntaxKind> {
        let n = self.modifiers_ahead();
        match self.nth(n)? {
            FunKw => Some(Fun),
            ValKw | VarKw => Some(Property),
            ClassKw | InterfaceKw => Some(Class),
            ObjectKw if n > 0 || self.nth(n + 1) == Some(Ident) => Some(ObjectDeclaration),
            _ => None,
        }
    }

    fn parse_declaration(&mut self, kind: KtSyntaxKind, member: bool) {
        match kind {
            Fun => self.parse_function(),
            Property => self.parse_property(member),
            Class => self.parse_class(),
            ObjectDeclaration => self.parse_object_declaration(),
            _ => self.error_and_recover("Expected a declaration"),
        }
    }

    /// Start a declaration node, pulling own-line comments right before it inside
    fn start_declaration(&mut self, kind: KtSyntaxKind) {
        let next = self.significant_pos();
        let mut split = next;
        for index in self.pos..next {
            let token = &self.tokens[index];
            if token.kind.is_comment() && self.starts_line(index) {
                split = index;
                break;
            }
        }
        while self.pos < split {
            self.emit_current();
        }
        self.builder.start_node(kind.into());
    }

    fn starts_line(&self, index: usize) -> bool {
        index == 0 || {
            let previous = &self.tokens[index - 1];
            previous.kind == Whitespace && previous.text.contains('\n')
        }
    }

    /// Significant tokens taken by the modifiers and annotations ahead
    fn modifiers_ahead(&self) -> usize {
        let mut n = 0;
        loop {
            match self.nth(n) {
                Some(Ident) if MODIFIERS.contains(&self.nth_text(n)) => n += 1,
                Some(AtIdent) => {
                    n += 1;
                    if self.nth(n) == Some(LParen) {
                        n = self.skip_parentheses(n);
                    }
                }
                _ => return n,
            }
        }
    }

    /// Index just past the parentheses opening at the `n`-th significant token
    fn skip_parentheses(&self, mut n: usize) -> usize {
        let mut depth = 0usize;
        loop {
            match self.nth(n) {
                Some(LParen) => depth += 1,
                Some(RParen) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return n + 1;
                    }
                }
                None => return n,
                _ => {}
            }
            n += 1;
        }
    }

    fn parse_modifiers(&mut self) {
        if self.modifiers_ahead() == 0 {
            return;
        }
        self.start_node(ModifierList);
        loop {
            match self.current() {
                Some(Ident) if MODIFIERS.contains(&self.nth_text(0)) => self.bump_as(ModifierKw),
                Some(AtIdent) => self.parse_annotation(),
                _ => break,
            }
        }
        self.finish_node();
    }

    /// `@Name` with optional arguments on the same line
    fn parse_annotation(&mut self) {
        self.start_node(AnnotationEntry);
        self.bump();
        if self.at(LParen) && !self.newline_before() {
            self.parse_value_argument_list();
        }
        self.finish_node();
    }

    fn parse_function(&mut self) {
        self.start_declaration(Fun);
        self.parse_modifiers();
        self.expect(FunKw);

        if self.at(Lt) {
            self.parse_type_parameter_list();
        }
        if self.at(Ident) && matches!(self.nth(1), Some(Dot | Lt)) {
            // Extension receiver
            self.start_node(TypeReference);
            self.parse_user_type(true);
            self.finish_node();
            self.expect(Dot);
        }
        self.expect(Ident);

        if self.at(LParen) {
            self.parse_value_parameter_list();
        } else {
            self.error("Expected parameter list");
        }
        if self.at(Colon) {
            self.bump();
            self.parse_type_reference();
        }
        if self.at(WhereKw) {
            self.parse_where_clause();
        }
        if self.at(LBrace) {
            self.parse_block();
        } else if self.at(Eq) {
            self.bump();
            self.parse_expression();
        }

        self.finish_node(); // FUN
    }

    fn parse_property(&mut self, member: bool) {
        self.start_declaration(Property);
        self.parse_modifiers();
        self.bump(); // val / var

        if self.at(Lt) {
            self.parse_type_parameter_list();
        }
        self.expect(Ident);
        if self.at(Colon) {
            self.bump();
            self.parse_type_reference();
        }
        if self.at(Eq) {
            self.bump();
            self.parse_expression();
        }

        // Local variables cannot declare accessors
        if member {
            while let Some(word) = self.accessor_ahead() {
                self.parse_property_accessor(word);
            }
        }

        self.finish_node(); // PROPERTY
    }

    /// `Some("get")`/`Some("set")` when a property accessor starts here
    fn accessor_ahead(&self) -> Option<&'static str> {
        let n = self.modifiers_ahead();
        if self.nth(n) != Some(Ident) {
            return None;
        }
        let word = match self.nth_text(n) {
            "get" => "get",
            "set" => "set",
            _ => return None,
        };
        match self.nth(n + 1) {
            None | Some(LParen | Eq | LBrace | RBrace | Semicolon) => Some(word),
            Some(Ident | ValKw | VarKw | FunKw | ClassKw | InterfaceKw | ObjectKw) => Some(word),
            _ => None,
        }
    }

    fn parse_property_accessor(&mut self, word: &str) {
        self.start_node(PropertyAccessor);
        self.parse_modifiers();

        if word == "get" {
            self.bump_as(GetKw);
            if self.at(LParen) && self.nth(1) == Some(RParen) {
                self.bump();
                self.bump();
            }
            if self.at(Colon) {
                self.bump();
                self.parse_type_reference();
            }
        } else {
            self.bump_as(SetKw);
            if self.at(LParen) {
                self.start_node(ValueParameterList);
                self.bump();
                if !self.at(RParen) {
                    self.parse_value_parameter();
                }
                self.expect(RParen);
                self.finish_node();
            }
        }

        if self.at(Eq) {
            self.bump();
            self.parse_expression();
        } else if self.at(LBrace) {
            self.parse_block();
        }

        self.finish_node(); // PROPERTY_ACCESSOR
    }

    fn parse_class(&mut self) {
        self.start_declaration(Class);
        self.parse_modifiers();
        self.bump(); // class / interface
        self.expect(Ident);

        if self.at(Lt) {
            self.parse_type_parameter_list();
        }
        if self.at(LParen) {
            self.start_node(PrimaryConstructor);
            self.parse_value_parameter_list();
            self.finish_node();
        }
        if self.at(Colon) {
            self.bump();
            self.parse_super_type_list();
        }
        if self.at(WhereKw) {
            self.parse_where_clause();
        }
        if self.at(LBrace) {
            self.parse_class_body();
        }

        self.finish_node(); // CLASS
    }

    fn parse_object_declaration(&mut self) {
        self.start_declaration(ObjectDeclaration);
        self.parse_modifiers();
        self.expect(ObjectKw);
        if self.at(Ident) {
            self.bump();
        }
        self.parse_object_tail();
        self.finish_node(); // OBJECT_DECLARATION
    }

    /// Supertypes and body shared by object declarations and literals
    fn parse_object_tail(&mut self) {
        if self.at(Colon) {
            self.bump();
            self.parse_super_type_list();
        }
        if self.at(LBrace) {
            self.parse_class_body();
        }
    }

    fn parse_super_type_list(&mut self) {
        self.start_node(SuperTypeList);
        loop {
            let checkpoint = self.checkpoint();
            self.parse_type_reference();
            if self.at(LParen) {
                self.start_node_at(checkpoint, ConstructorCallee);
                self.finish_node();
                self.start_node_at(checkpoint, SuperTypeCallEntry);
                self.parse_value_argument_list();
                self.finish_node();
            } else {
                self.start_node_at(checkpoint, SuperTypeEntry);
                self.finish_node();
            }

            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.finish_node();
    }

    fn parse_class_body(&mut self) {
        let saved = self.set_newlines_significant(true);
        self.start_node(ClassBody);
        self.bump(); // {

        while !self.at_end() && !self.at(RBrace) {
            if self.at(Semicolon) {
                self.bump();
                continue;
            }
            let before = self.significant_pos();
            if let Some(kind) = self.declaration_kind() {
                self.parse_declaration(kind, true);
            }
            if self.significant_pos() == before {
                self.error_and_recover("Expected a member declaration");
            }
        }

        self.expect(RBrace);
        self.finish_node();
        self.set_newlines_significant(saved);
    }

    fn parse_where_clause(&mut self) {
        self.bump(); // where
        self.start_node(TypeConstraintList);
        loop {
            self.start_node(TypeConstraint);
            self.parse_reference();
            self.expect(Colon);
            self.parse_type_reference();
            self.finish_node();

            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.finish_node();
    }

    // ==================
    // Parameters and types
    // ==================

    fn parse_value_parameter_list(&mut self) {
        let saved = self.set_newlines_significant(false);
        self.start_node(ValueParameterList);
        self.bump(); // (

        while !self.at_end() && !self.at(RParen) {
            let before = self.significant_pos();
            self.parse_value_parameter();
            if self.at(Comma) {
                self.bump();
            } else if self.significant_pos() == before || !self.at(RParen) {
                break;
            }
        }

        self.expect(RParen);
        self.finish_node();
        self.set_newlines_significant(saved);
    }

    fn parse_value_parameter(&mut self) {
        self.start_node(ValueParameter);
        self.parse_modifiers();
        if self.at(ValKw) || self.at(VarKw) {
            self.bump();
        }
        self.expect(Ident);
        if self.at(Colon) {
            self.bump();
            self.parse_type_reference();
        }
        if self.at(Eq) {
            self.bump();
            self.parse_expression();
        }
        self.finish_node();
    }

    fn parse_type_parameter_list(&mut self) {
        self.start_node(TypeParameterList);
        self.bump(); // <
        loop {
            self.start_node(TypeParameter);
            self.parse_modifiers();
            self.expect(Ident);
            if self.at(Colon) {
                self.bump();
                self.parse_type_reference();
            }
            self.finish_node();

            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(Gt);
        self.finish_node();
    }

    fn parse_type_reference(&mut self) {
        self.start_node(TypeReference);
        let checkpoint = self.checkpoint();
        if self.at(Ident) {
            self.parse_user_type(false);
            if self.at(Question) && !self.newline_before() {
                self.start_node_at(checkpoint, NullableType);
                self.bump();
                self.finish_node();
            }
        } else {
            self.error("Expected a type");
        }
        self.finish_node();
    }

    /// `a.b.C<T>`, nested leftwards
    ///
    /// With `receiver`, stops before the last segment when that segment is a
    /// function name rather than part of the type.
    fn parse_user_type(&mut self, receiver: bool) {
        let checkpoint = self.checkpoint();
        self.start_node(UserType);
        self.parse_reference();
        if self.at(Lt) {
            self.parse_type_argument_list();
        }
        self.finish_node();

        while self.at(Dot) && self.nth(1) == Some(Ident) {
            if receiver && !matches!(self.nth(2), Some(Dot | Lt)) {
                break;
            }
            self.start_node_at(checkpoint, UserType);
            self.bump();
            self.parse_reference();
            if self.at(Lt) {
                self.parse_type_argument_list();
            }
            self.finish_node();
        }
    }

    fn parse_type_argument_list(&mut self) {
        self.start_node(TypeArgumentList);
        self.bump(); // <
        loop {
            self.start_node(TypeProjection);
            if self.at(Star) {
                self.bump();
            } else {
                self.parse_modifiers();
                self.parse_type_reference();
            }
            self.finish_node();

            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(Gt);
        self.finish_node();
    }

    fn parse_reference(&mut self) {
        if self.at(Ident) {
            self.start_node(ReferenceExpression);
            self.bump();
            self.finish_node();
        } else {
            self.error("Expected an identifier");
        }
    }

    // ==================
    // Statements and expressions
    // ==================

    /// `{ statements }` including the braces
    fn parse_block(&mut self) {
        let saved = self.set_newlines_significant(true);
        self.start_node(Block);
        self.bump(); // {
        self.parse_statements();
        self.expect(RBrace);
        self.finish_node();
        self.set_newlines_significant(saved);
    }

    fn parse_statements(&mut self) {
        while !self.at_end() && !self.at(RBrace) {
            if self.at(Semicolon) {
                self.bump();
                continue;
            }
            let before = self.significant_pos();
            match self.declaration_kind() {
                Some(kind) => self.parse_declaration(kind, false),
                None => self.parse_expression(),
            }
            if self.significant_pos() == before {
                self.error_and_recover("Expected a statement");
            }
        }
    }

    fn parse_expression(&mut self) {
        self.parse_binary(0);
    }

    /// Precedence climbing over binary operators
    fn parse_binary(&mut self, min_bp: u8) {
        let checkpoint = self.checkpoint();
        self.parse_prefix();

        loop {
            let Some(op) = self.current() else {
                break;
            };
            let power = if op == Ident {
                self.infix_function_ahead().then_some(INFIX_FUNCTION_POWER)
            } else {
                infix_binding_power(op)
            };
            let Some((left_bp, right_bp)) = power else {
                break;
            };
            if left_bp < min_bp {
                break;
            }
            if self.newlines_significant
                && self.newline_before()
                && !matches!(op, AndAnd | OrOr | Elvis)
            {
                break;
            }

            self.start_node_at(checkpoint, BinaryExpression);
            self.start_node(OperationReference);
            self.bump();
            self.finish_node();
            self.parse_binary(right_bp);
            self.finish_node();
        }
    }

    /// `a to b`: a named function between two operands on one line
    fn infix_function_ahead(&self) -> bool {
        if self.newline_before() || self.accessor_ahead().is_some() {
            return false;
        }
        let word = self.nth_text(0);
        if word != "in" && MODIFIERS.contains(&word) {
            return false;
        }
        matches!(
            self.nth(1),
            Some(
                Ident
                    | IntLiteral
                    | FloatLiteral
                    | StringLiteral
                    | CharLiteral
                    | TrueKw
                    | FalseKw
                    | NullKw
                    | ThisKw
                    | LParen
                    | Minus
                    | Plus
                    | Excl
                    | PlusPlus
                    | MinusMinus
                    | ObjectKw
            )
        )
    }

    fn parse_prefix(&mut self) {
        if matches!(
            self.current(),
            Some(Minus | Plus | Excl | PlusPlus | MinusMinus)
        ) {
            self.start_node(PrefixExpression);
            self.start_node(OperationReference);
            self.bump();
            self.finish_node();
            self.parse_prefix();
            self.finish_node();
        } else {
            self.parse_postfix();
        }
    }

    fn parse_postfix(&mut self) {
        let checkpoint = self.checkpoint();
        let mut callable = self.parse_primary();

        loop {
            let same_line = !(self.newlines_significant && self.newline_before());
            match self.current() {
                Some(Lt) if same_line && callable && self.type_arguments_ahead() => {
                    self.start_node_at(checkpoint, CallExpression);
                    self.parse_type_argument_list();
                    self.parse_call_or_lambda();
                    self.finish_node();
                    callable = false;
                }
                Some(ExclExcl | PlusPlus | MinusMinus) if same_line => {
                    self.start_node_at(checkpoint, PostfixExpression);
                    self.start_node(OperationReference);
                    self.bump();
                    self.finish_node();
                    self.finish_node();
                    callable = false;
                }
                Some(kind @ (Dot | SafeAccess)) => {
                    let node = if kind == Dot {
                        DotQualifiedExpression
                    } else {
                        SafeAccessExpression
                    };
                    self.start_node_at(checkpoint, node);
                    self.bump();
                    self.parse_selector();
                    self.finish_node();
                    callable = false;
                }
                Some(LParen) if same_line => {
                    self.start_node_at(checkpoint, CallExpression);
                    self.parse_call_suffix();
                    self.finish_node();
                    callable = false;
                }
                Some(LBrace) if same_line && callable => {
                    self.start_node_at(checkpoint, CallExpression);
                    self.parse_lambda_argument();
                    self.finish_node();
                    callable = false;
                }
                Some(LBracket) if same_line => {
                    self.start_node_at(checkpoint, ArrayAccessExpression);
                    self.parse_indices();
                    self.finish_node();
                    callable = false;
                }
                _ => break,
            }
        }
    }

    /// Member after `.` or `?.`, owning its own call suffix
    fn parse_selector(&mut self) {
        let checkpoint = self.checkpoint();
        if !self.at(Ident) {
            self.error("Expected a member name");
            return;
        }
        self.parse_reference();

        if self.newlines_significant && self.newline_before() {
            return;
        }
        let type_arguments = self.at(Lt) && self.type_arguments_ahead();
        if type_arguments || self.at(LParen) || self.at(LBrace) {
            self.start_node_at(checkpoint, CallExpression);
            if type_arguments {
                self.parse_type_argument_list();
            }
            self.parse_call_or_lambda();
            self.finish_node();
        }
    }

    fn parse_call_or_lambda(&mut self) {
        if self.at(LParen) {
            self.parse_call_suffix();
        } else {
            self.parse_lambda_argument();
        }
    }

    /// `<...>` of type arguments directly followed by `(` or `{`
    ///
    /// Anything else between the brackets means `<` is a comparison.
    fn type_arguments_ahead(&self) -> bool {
        let mut depth = 0usize;
        let mut n = 0;
        loop {
            match self.nth(n) {
                Some(Lt) => depth += 1,
                Some(Gt) => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(self.nth(n + 1), Some(LParen | LBrace));
                    }
                }
                Some(Ident | Comma | Dot | Question | Star) if depth > 0 => {}
                _ => return false,
            }
            n += 1;
        }
    }

    /// `(args)` optionally followed by a trailing lambda
    fn parse_call_suffix(&mut self) {
        self.parse_value_argument_list();
        if self.at(LBrace) && !(self.newlines_significant && self.newline_before()) {
            self.parse_lambda_argument();
        }
    }

    fn parse_value_argument_list(&mut self) {
        let saved = self.set_newlines_significant(false);
        self.start_node(ValueArgumentList);
        self.bump(); // (

        while !self.at_end() && !self.at(RParen) {
            let before = self.significant_pos();
            self.start_node(ValueArgument);
            if self.at(Ident) && self.nth(1) == Some(Eq) {
                self.start_node(ValueArgumentName);
                self.parse_reference();
                self.finish_node();
                self.bump(); // =
            }
            self.parse_expression();
            self.finish_node();

            if self.at(Comma) {
                self.bump();
            } else if self.significant_pos() == before || !self.at(RParen) {
                break;
            }
        }

        self.expect(RParen);
        self.finish_node();
        self.set_newlines_significant(saved);
    }

    fn parse_indices(&mut self) {
        let saved = self.set_newlines_significant(false);
        self.start_node(Indices);
        self.bump(); // [
        while !self.at_end() && !self.at(RBracket) {
            let before = self.significant_pos();
            self.parse_expression();
            if self.at(Comma) {
                self.bump();
            } else if self.significant_pos() == before || !self.at(RBracket) {
                break;
            }
        }
        self.expect(RBracket);
        self.finish_node();
        self.set_newlines_significant(saved);
    }

    fn parse_lambda_argument(&mut self) {
        self.start_node(LambdaArgument);
        self.parse_lambda();
        self.finish_node();
    }

    /// `{ params -> statements }`
    fn parse_lambda(&mut self) {
        let saved = self.set_newlines_significant(true);
        self.start_node(LambdaExpression);
        self.start_node(FunctionLiteral);
        self.bump(); // {

        if self.lambda_parameters_ahead() {
            self.start_node(ValueParameterList);
            loop {
                self.start_node(ValueParameter);
                self.bump();
                self.finish_node();
                if self.at(Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
            self.finish_node();
            self.expect(Arrow);
        }

        self.start_node(Block);
        self.parse_statements();
        self.finish_node();

        self.expect(RBrace);
        self.finish_node(); // FUNCTION_LITERAL
        self.finish_node(); // LAMBDA_EXPRESSION
        self.set_newlines_significant(saved);
    }

    /// `ident (, ident)* ->`
    fn lambda_parameters_ahead(&self) -> bool {
        let mut n = 0;
        loop {
            if self.nth(n) != Some(Ident) {
                return false;
            }
            match self.nth(n + 1) {
                Some(Comma) => n += 2,
                Some(Arrow) => return true,
                _ => return false,
            }
        }
    }

    /// Parse a primary expression; returns whether a trailing lambda may follow
    fn parse_primary(&mut self) -> bool {
        let Some(kind) = self.current() else {
            self.error("Expected an expression");
            return false;
        };

        match kind {
            Ident => {
                self.parse_reference();
                true
            }
            IntLiteral => self.wrap_token(IntegerConstant),
            FloatLiteral => self.wrap_token(FloatConstant),
            CharLiteral => self.wrap_token(CharacterConstant),
            StringLiteral => self.wrap_token(StringTemplate),
            TrueKw | FalseKw => self.wrap_token(BooleanConstant),
            NullKw => self.wrap_token(NullConstant),
            ThisKw => {
                self.start_node(ThisExpression);
                self.bump();
                self.bump_label();
                self.finish_node();
                false
            }
            LParen => {
                let saved = self.set_newlines_significant(false);
                self.start_node(ParenthesizedExpression);
                self.bump();
                self.parse_expression();
                self.expect(RParen);
                self.finish_node();
                self.set_newlines_significant(saved);
                false
            }
            LBrace => {
                self.parse_lambda();
                false
            }
            IfKw => {
                self.parse_if();
                false
            }
            ReturnKw => {
                self.start_node(ReturnExpression);
                self.bump();
                self.bump_label();
                let ends_here = self.at_end()
                    || self.at(RBrace)
                    || self.at(Semicolon)
                    || (self.newlines_significant && self.newline_before());
                if !ends_here {
                    self.parse_expression();
                }
                self.finish_node();
                false
            }
            ObjectKw => {
                self.start_node(ObjectLiteral);
                self.start_node(ObjectDeclaration);
                self.bump();
                self.parse_object_tail();
                self.finish_node();
                self.finish_node();
                false
            }
            RParen | RBrace | RBracket | Comma => {
                self.error("Expected an expression");
                false
            }
            _ => {
                self.error_and_recover("Expected an expression");
                false
            }
        }
    }

    fn wrap_token(&mut self, kind: KtSyntaxKind) -> bool {
        self.start_node(kind);
        self.bump();
        self.finish_node();
        false
    }

    fn parse_if(&mut self) {
        self.start_node(IfExpression);
        self.bump(); // if

        let saved = self.set_newlines_significant(false);
        self.expect(LParen);
        self.start_node(Condition);
        self.parse_expression();
        self.finish_node();
        self.expect(RParen);
        self.set_newlines_significant(saved);

        self.start_node(Then);
        self.parse_control_body();
        self.finish_node();

        if self.at(ElseKw) {
            self.bump();
            self.start_node(Else);
            self.parse_control_body();
            self.finish_node();
        }

        self.finish_node(); // IF
    }

    fn parse_control_body(&mut self) {
        if self.at(LBrace) {
            self.parse_block();
        } else {
            self.parse_expression();
        }
    }

    // ==================
    // Token plumbing
    // ==================

    /// Index of the `n`-th significant token at or after `pos`
    fn nth_index(&self, n: usize) -> Option<usize> {
        self.tokens[self.pos..]
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.is_trivia())
            .nth(n)
            .map(|(offset, _)| self.pos + offset)
    }

    fn nth(&self, n: usize) -> Option<KtSyntaxKind> {
        self.nth_index(n).map(|index| self.tokens[index].kind)
    }

    fn nth_text(&self, n: usize) -> &str {
        self.nth_index(n)
            .map_or("", |index| self.tokens[index].text.as_str())
    }

    fn current(&self) -> Option<KtSyntaxKind> {
        self.nth(0)
    }

    fn at(&self, kind: KtSyntaxKind) -> bool {
        self.current() == Some(kind)
    }

    fn at_word(&self, word: &str) -> bool {
        self.at(Ident) && self.nth_text(0) == word
    }

    fn at_end(&self) -> bool {
        self.current().is_none()
    }

    /// Index of the next significant token, or the token count at the end
    fn significant_pos(&self) -> usize {
        self.nth_index(0).unwrap_or(self.tokens.len())
    }

    /// Whether pending trivia contains a line break
    fn newline_before(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .take_while(|token| token.is_trivia())
            .any(|token| token.kind == Whitespace && token.text.contains('\n'))
    }

    fn set_newlines_significant(&mut self, significant: bool) -> bool {
        std::mem::replace(&mut self.newlines_significant, significant)
    }

    fn emit_current(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), &token.text);
            self.pos += 1;
        }
    }

    fn flush_trivia(&mut self) {
        while self.tokens.get(self.pos).is_some_and(CstToken::is_trivia) {
            self.emit_current();
        }
    }

    fn bump(&mut self) {
        self.flush_trivia();
        self.emit_current();
    }

    /// `@label` glued to the previous token
    fn bump_label(&mut self) {
        if self.tokens.get(self.pos).is_some_and(|token| token.kind == AtIdent) {
            self.emit_current();
        }
    }

    /// Consume the current token, re-tagging it (soft keywords, modifiers)
    fn bump_as(&mut self, kind: KtSyntaxKind) {
        self.flush_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(kind.into(), &token.text);
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: KtSyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            self.error(format!("Expected {kind}"));
            false
        }
    }

    fn start_node(&mut self, kind: KtSyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind.into());
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: KtSyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn current_span(&self) -> CstSpan {
        match self.nth_index(0) {
            Some(index) => self.tokens[index].span.clone(),
            None => {
                let end = self.tokens.last().map_or(0, |token| token.span.end);
                end..end
            }
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.errors.push(ParseError::new(message, span));
    }

    /// Record an error and wrap the offending token in an error node
    fn error_and_recover(&mut self, message: &str) {
        self.error(message);
        if self.at_end() {
            return;
        }
        self.start_node(Error);
        self.bump();
        self.finish_node();
    }
}

/// Binding power of named infix functions, between `?:` and `..`
const INFIX_FUNCTION_POWER: (u8, u8) = (13, 14);

/// Left and right binding power of an infix operator
fn infix_binding_power(kind: KtSyntaxKind) -> Option<(u8, u8)> {
    let power = match kind {
        Eq | PlusEq | MinusEq => (2, 1),
        OrOr => (3, 4),
        AndAnd => (5, 6),
        EqEq | ExclEq => (7, 8),
        Lt | Gt | LtEq | GtEq => (9, 10),
        Elvis => (11, 12),
        Range => (15, 16),
        Plus | Minus => (17, 18),
        Star | Slash | Percent => (19, 20),
        _ => return None,
    };
    Some(power)
}
