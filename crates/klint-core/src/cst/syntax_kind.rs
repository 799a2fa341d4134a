//! Syntax kind enumeration for the Kotlin CST
//!
//! This module defines all node and token types in the Kotlin syntax tree.
//! Node kinds mirror the element types of the Kotlin PSI so that tree-shape
//! driven rules (indentation in particular) see the structure they expect.

use std::fmt;

/// Syntax kind for Kotlin language elements
///
/// The discriminants are contiguous, starting at zero, which lets
/// [`KtSyntaxKind::from_raw`] index straight into [`KtSyntaxKind::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum KtSyntaxKind {
    // ==================
    // Trivia
    // ==================
    /// Run of spaces, tabs and line breaks
    Whitespace = 0,
    /// `// ...` up to (not including) the line break
    EolComment,
    /// `/* ... */`
    BlockComment,
    /// `/** ... */`
    KDoc,

    // ==================
    // Literals & identifiers
    // ==================
    Ident,
    IntLiteral,
    FloatLiteral,
    /// Complete `"..."` or `"""..."""` literal
    StringLiteral,
    CharLiteral,
    /// `@name`, an annotation or label reference
    AtIdent,

    // ==================
    // Keywords
    // ==================
    PackageKw,
    ImportKw,
    FunKw,
    ValKw,
    VarKw,
    ClassKw,
    InterfaceKw,
    ObjectKw,
    IfKw,
    ElseKw,
    ReturnKw,
    WhereKw,
    TrueKw,
    FalseKw,
    NullKw,
    ThisKw,
    /// Soft keyword `get`, remapped by the parser inside property accessors
    GetKw,
    /// Soft keyword `set`, remapped by the parser inside property accessors
    SetKw,
    /// Any modifier (`private`, `override`, `out`, ...), remapped by the parser
    ModifierKw,

    // ==================
    // Punctuation & operators
    // ==================
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Lt,
    Gt,
    Dot,
    /// `?.`
    SafeAccess,
    Comma,
    Colon,
    Semicolon,
    Eq,
    Arrow,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    ExclEq,
    LtEq,
    GtEq,
    AndAnd,
    OrOr,
    Excl,
    Question,
    /// `?:`
    Elvis,
    /// `..`
    Range,
    PlusEq,
    MinusEq,
    /// `!!`
    ExclExcl,
    PlusPlus,
    MinusMinus,

    // ==================
    // Structure nodes
    // ==================
    File,
    PackageDirective,
    ImportList,
    ImportDirective,
    ModifierList,
    AnnotationEntry,
    Fun,
    Class,
    ObjectDeclaration,
    ClassBody,
    PrimaryConstructor,
    ValueParameterList,
    ValueParameter,
    TypeReference,
    UserType,
    NullableType,
    TypeArgumentList,
    TypeProjection,
    TypeParameterList,
    TypeParameter,
    /// Constraints following a `where` keyword
    TypeConstraintList,
    TypeConstraint,
    SuperTypeList,
    SuperTypeEntry,
    SuperTypeCallEntry,
    ConstructorCallee,
    Property,
    PropertyAccessor,
    Block,

    // Expression nodes
    CallExpression,
    ValueArgumentList,
    ValueArgument,
    ValueArgumentName,
    LambdaArgument,
    LambdaExpression,
    FunctionLiteral,
    ObjectLiteral,
    ReferenceExpression,
    DotQualifiedExpression,
    SafeAccessExpression,
    BinaryExpression,
    OperationReference,
    PrefixExpression,
    PostfixExpression,
    ParenthesizedExpression,
    ArrayAccessExpression,
    Indices,
    StringTemplate,
    IntegerConstant,
    FloatConstant,
    CharacterConstant,
    BooleanConstant,
    NullConstant,
    ThisExpression,
    IfExpression,
    Condition,
    Then,
    Else,
    ReturnExpression,

    // ==================
    // Special
    // ==================
    /// Unrecognised token or node produced during error recovery
    Error,
}

use KtSyntaxKind::*;

impl KtSyntaxKind {
    /// Every kind, indexed by its discriminant
    pub const ALL: &'static [KtSyntaxKind] = &[
        Whitespace,
        EolComment,
        BlockComment,
        KDoc,
        Ident,
        IntLiteral,
        FloatLiteral,
        StringLiteral,
        CharLiteral,
        AtIdent,
        PackageKw,
        ImportKw,
        FunKw,
        ValKw,
        VarKw,
        ClassKw,
        InterfaceKw,
        ObjectKw,
        IfKw,
        ElseKw,
        ReturnKw,
        WhereKw,
        TrueKw,
        FalseKw,
        NullKw,
        ThisKw,
        GetKw,
        SetKw,
        ModifierKw,
        LParen,
        RParen,
        LBracket,
        RBracket,
        LBrace,
        RBrace,
        Lt,
        Gt,
        Dot,
        SafeAccess,
        Comma,
        Colon,
        Semicolon,
        Eq,
        Arrow,
        Plus,
        Minus,
        Star,
        Slash,
        Percent,
        EqEq,
        ExclEq,
        LtEq,
        GtEq,
        AndAnd,
        OrOr,
        Excl,
        Question,
        Elvis,
        Range,
        PlusEq,
        MinusEq,
        ExclExcl,
        PlusPlus,
        MinusMinus,
        File,
        PackageDirective,
        ImportList,
        ImportDirective,
        ModifierList,
        AnnotationEntry,
        Fun,
        Class,
        ObjectDeclaration,
        ClassBody,
        PrimaryConstructor,
        ValueParameterList,
        ValueParameter,
        TypeReference,
        UserType,
        NullableType,
        TypeArgumentList,
        TypeProjection,
        TypeParameterList,
        TypeParameter,
        TypeConstraintList,
        TypeConstraint,
        SuperTypeList,
        SuperTypeEntry,
        SuperTypeCallEntry,
        ConstructorCallee,
        Property,
        PropertyAccessor,
        Block,
        CallExpression,
        ValueArgumentList,
        ValueArgument,
        ValueArgumentName,
        LambdaArgument,
        LambdaExpression,
        FunctionLiteral,
        ObjectLiteral,
        ReferenceExpression,
        DotQualifiedExpression,
        SafeAccessExpression,
        BinaryExpression,
        OperationReference,
        PrefixExpression,
        PostfixExpression,
        ParenthesizedExpression,
        ArrayAccessExpression,
        Indices,
        StringTemplate,
        IntegerConstant,
        FloatConstant,
        CharacterConstant,
        BooleanConstant,
        NullConstant,
        ThisExpression,
        IfExpression,
        Condition,
        Then,
        Else,
        ReturnExpression,
        Error,
    ];

    /// Map a raw discriminant back to a kind, falling back to [`KtSyntaxKind::Error`]
    pub fn from_raw(raw: u16) -> Self {
        Self::ALL.get(raw as usize).copied().unwrap_or(Error)
    }

    /// Whitespace or comment
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | EolComment | BlockComment | KDoc)
    }

    pub fn is_comment(self) -> bool {
        matches!(self, EolComment | BlockComment | KDoc)
    }

    pub fn is_keyword(self) -> bool {
        (PackageKw as u16..=ModifierKw as u16).contains(&(self as u16))
    }

    /// Whether this kind names an interior node rather than a token
    pub fn is_node(self) -> bool {
        (File as u16..=ReturnExpression as u16).contains(&(self as u16))
    }

    /// Keyword kind for a reserved word, if any
    ///
    /// Soft keywords (`get`, `set`, modifiers) are lexed as identifiers and
    /// remapped by the parser where they act as keywords.
    pub fn from_keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "package" => PackageKw,
            "import" => ImportKw,
            "fun" => FunKw,
            "val" => ValKw,
            "var" => VarKw,
            "class" => ClassKw,
            "interface" => InterfaceKw,
            "object" => ObjectKw,
            "if" => IfKw,
            "else" => ElseKw,
            "return" => ReturnKw,
            "where" => WhereKw,
            "true" => TrueKw,
            "false" => FalseKw,
            "null" => NullKw,
            "this" => ThisKw,
            _ => return None,
        };
        Some(kind)
    }
}

impl From<KtSyntaxKind> for rowan::SyntaxKind {
    fn from(kind: KtSyntaxKind) -> Self {
        rowan::SyntaxKind(kind as u16)
    }
}

impl fmt::Display for KtSyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_indexed_by_discriminant() {
        for (index, kind) in KtSyntaxKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, index, "{kind:?} is out of place");
        }
        assert_eq!(KtSyntaxKind::ALL.last(), Some(&Error));
    }

    #[test]
    fn unknown_raw_maps_to_error() {
        assert_eq!(KtSyntaxKind::from_raw(u16::MAX), Error);
        assert_eq!(KtSyntaxKind::from_raw(Dot as u16), Dot);
    }

    #[test]
    fn kind_classification() {
        assert!(Whitespace.is_trivia());
        assert!(KDoc.is_comment());
        assert!(!Whitespace.is_comment());
        assert!(WhereKw.is_keyword());
        assert!(!Ident.is_keyword());
        assert!(Block.is_node());
        assert!(!RBrace.is_node());
        assert_eq!(KtSyntaxKind::from_keyword("where"), Some(WhereKw));
        assert_eq!(KtSyntaxKind::from_keyword("get"), None);
    }
}
