//! Node kinds for the host-supplied syntax tree.
//!
//! The analyzer consumes a tree produced by the host compiler; this enum
//! enumerates exactly the kinds the extraction algorithms inspect. Child
//! layout per kind is fixed and documented on [`TreeBuilder`], which is the
//! only construction surface.
//!
//! [`TreeBuilder`]: super::TreeBuilder

use std::fmt;

/// Kind of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    CompilationUnit,

    // Declarations
    ClassDeclaration,
    FieldDeclaration,
    PropertyDeclaration,
    MethodDeclaration,
    AccessorList,
    GetAccessor,
    SetAccessor,
    ParameterList,
    Parameter,
    VariableDeclarator,
    EqualsValueClause,

    // Statements
    Block,
    ReturnStatement,
    ExpressionStatement,
    LocalDeclarationStatement,

    // Expressions
    InvocationExpression,
    MemberAccessExpression,
    ObjectCreationExpression,
    ArgumentList,
    Argument,
    NameColon,
    TypeOfExpression,
    NameOfExpression,
    CastExpression,
    AsExpression,
    IsPatternExpression,
    DeclarationPattern,
    SwitchExpression,
    SwitchExpressionArm,
    SimpleLambdaExpression,
    ParenthesizedLambdaExpression,
    AssignmentExpression,
    ConditionalExpression,
    ParenthesizedExpression,

    // Names and types
    IdentifierName,
    QualifiedName,
    GenericName,
    PredefinedType,

    // Literals
    StringLiteral,
    NumericLiteral,
    BoolLiteral,
    NullLiteral,
    DefaultExpression,

    /// Anything the host produced that the analyzer has no interest in.
    Unknown,
}

impl SyntaxKind {
    /// Check if this kind declares a type (used to stop usage walks at
    /// nested type boundaries).
    pub fn is_type_declaration(&self) -> bool {
        matches!(self, SyntaxKind::ClassDeclaration)
    }

    /// Check if this kind is a lambda expression.
    pub fn is_lambda(&self) -> bool {
        matches!(
            self,
            SyntaxKind::SimpleLambdaExpression | SyntaxKind::ParenthesizedLambdaExpression
        )
    }

    /// Check if this kind can name a type (right side of `typeof`, cast
    /// targets, pattern types).
    pub fn is_type_name(&self) -> bool {
        matches!(
            self,
            SyntaxKind::IdentifierName
                | SyntaxKind::QualifiedName
                | SyntaxKind::GenericName
                | SyntaxKind::PredefinedType
        )
    }

    /// Check if this kind is a literal expression.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            SyntaxKind::StringLiteral
                | SyntaxKind::NumericLiteral
                | SyntaxKind::BoolLiteral
                | SyntaxKind::NullLiteral
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
