//! Rowan language implementation for Kotlin
//!
//! Connects [`KtSyntaxKind`] to Rowan's generic CST infrastructure.

use rowan::Language;

use super::KtSyntaxKind;

/// Language implementation for Kotlin
///
/// Zero-sized type implementing `rowan::Language` so that rowan's tree types
/// can be specialised to [`KtSyntaxKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KotlinLanguage;

impl Language for KotlinLanguage {
    type Kind = KtSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        let kind = KtSyntaxKind::from_raw(raw.0);
        if kind == KtSyntaxKind::Error && raw.0 != KtSyntaxKind::Error as u16 {
            tracing::warn!("Unknown syntax kind: {}", raw.0);
        }
        kind
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Red tree node specialised to Kotlin
pub type KtSyntaxNode = rowan::SyntaxNode<KotlinLanguage>;
/// Red tree token specialised to Kotlin
pub type KtSyntaxToken = rowan::SyntaxToken<KotlinLanguage>;
/// Node or token
pub type KtSyntaxElement = rowan::SyntaxElement<KotlinLanguage>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        let kinds = [
            KtSyntaxKind::Whitespace,
            KtSyntaxKind::FunKw,
            KtSyntaxKind::Ident,
            KtSyntaxKind::LBrace,
            KtSyntaxKind::DotQualifiedExpression,
            KtSyntaxKind::Error,
        ];

        for &kind in &kinds {
            let raw = KotlinLanguage::kind_to_raw(kind);
            let back = KotlinLanguage::kind_from_raw(raw);
            assert_eq!(kind, back, "Roundtrip failed for {kind:?}");
        }
    }

    #[test]
    fn test_kind_values() {
        assert_eq!(KotlinLanguage::kind_to_raw(KtSyntaxKind::Whitespace).0, 0);
        assert_eq!(
            KotlinLanguage::kind_from_raw(rowan::SyntaxKind(9_999)),
            KtSyntaxKind::Error
        );
    }
}
