//! Expression representation: the common header, the two variant sets and
//! their handles.

use coltc_lex::{BinaryOp, TokenRange, UnaryOp};
use coltc_types::TypeToken;
use coltc_util::{define_handle, QWord, Symbol};

define_handle! {
    /// Handle to a producer expression in an [`crate::ExprBuffer`].
    ProdExprToken,
    /// Optional [`ProdExprToken`].
    OptProdExprToken
}

define_handle! {
    /// Handle to a statement expression in an [`crate::ExprBuffer`].
    StmtExprToken,
    /// Optional [`StmtExprToken`].
    OptStmtExprToken
}

/// Discriminant shared by both expression arenas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExprID {
    Literal,
    Unary,
    Binary,
    Cast,
    AddressOf,
    PtrLoad,
    VarRead,
    GlobalRead,
    VarWrite,
    GlobalWrite,
    PtrStore,
    Move,
    Copy,
    CMove,
    FnCall,
    Nop,
    Error,
    Scope,
    Condition,
    VarDecl,
    GlobalDecl,
}

/// The header common to every expression: where it came from and what type
/// it has.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExprBase {
    /// The tokens this expression was built from.
    pub range: TokenRange,
    /// The type of the expression (`void` for statements and writes).
    pub ty: TypeToken,
}

impl ExprBase {
    pub fn new(range: TokenRange, ty: TypeToken) -> Self {
        Self { range, ty }
    }
}

/// A producer expression: header plus payload.
#[derive(Clone, Debug)]
pub struct ProdExpr {
    pub base: ExprBase,
    pub kind: ProdExprKind,
}

/// Payload of a producer expression.
#[derive(Clone, Debug)]
pub enum ProdExprKind {
    /// A scalar literal; its builtin id is the expression type.
    Literal { value: QWord },
    /// A unary operation.
    Unary { op: UnaryOp, expr: ProdExprToken },
    /// A binary operation over same-typed operands.
    Binary {
        lhs: ProdExprToken,
        op: BinaryOp,
        rhs: ProdExprToken,
    },
    /// A conversion; `is_bit_cast` reinterprets instead of converting.
    Cast {
        expr: ProdExprToken,
        is_bit_cast: bool,
    },
    /// Address of a variable or global declaration.
    AddressOf { decl: StmtExprToken },
    /// Load through a typed pointer.
    PtrLoad { from: ProdExprToken },
    /// Read of a local variable.
    VarRead { decl: StmtExprToken },
    /// Read of a global.
    GlobalRead { decl: StmtExprToken },
    /// Write to a local variable; produces `void`.
    VarWrite {
        decl: StmtExprToken,
        value: ProdExprToken,
    },
    /// Write to a global; produces `void`.
    GlobalWrite {
        decl: StmtExprToken,
        value: ProdExprToken,
    },
    /// Store through a typed mutable pointer; produces `void`.
    PtrStore {
        dest: ProdExprToken,
        value: ProdExprToken,
    },
    /// Move between local declarations; produces `void`.
    Move {
        from: StmtExprToken,
        to: StmtExprToken,
    },
    /// Copy between declarations; produces `void`.
    Copy {
        from: StmtExprToken,
        to: StmtExprToken,
    },
    /// Conditional move between declarations; produces `void`.
    CMove {
        from: StmtExprToken,
        to: StmtExprToken,
    },
    /// Call through a function type.
    FnCall {
        fn_type: TypeToken,
        args: Box<[ProdExprToken]>,
    },
    /// No operation; produces `void`.
    Nop,
    /// Placeholder for an invalid producer expression.
    Error,
}

impl ProdExprKind {
    /// The discriminant of this payload.
    pub const fn id(&self) -> ExprID {
        match self {
            ProdExprKind::Literal { .. } => ExprID::Literal,
            ProdExprKind::Unary { .. } => ExprID::Unary,
            ProdExprKind::Binary { .. } => ExprID::Binary,
            ProdExprKind::Cast { .. } => ExprID::Cast,
            ProdExprKind::AddressOf { .. } => ExprID::AddressOf,
            ProdExprKind::PtrLoad { .. } => ExprID::PtrLoad,
            ProdExprKind::VarRead { .. } => ExprID::VarRead,
            ProdExprKind::GlobalRead { .. } => ExprID::GlobalRead,
            ProdExprKind::VarWrite { .. } => ExprID::VarWrite,
            ProdExprKind::GlobalWrite { .. } => ExprID::GlobalWrite,
            ProdExprKind::PtrStore { .. } => ExprID::PtrStore,
            ProdExprKind::Move { .. } => ExprID::Move,
            ProdExprKind::Copy { .. } => ExprID::Copy,
            ProdExprKind::CMove { .. } => ExprID::CMove,
            ProdExprKind::FnCall { .. } => ExprID::FnCall,
            ProdExprKind::Nop => ExprID::Nop,
            ProdExprKind::Error => ExprID::Error,
        }
    }
}

impl ProdExpr {
    pub fn new(range: TokenRange, ty: TypeToken, kind: ProdExprKind) -> Self {
        Self {
            base: ExprBase::new(range, ty),
            kind,
        }
    }

    /// The discriminant, in constant time.
    #[inline]
    pub fn expr_id(&self) -> ExprID {
        self.kind.id()
    }

    /// The type of the expression.
    #[inline]
    pub fn ty(&self) -> TypeToken {
        self.base.ty
    }

    /// The token range of the expression.
    #[inline]
    pub fn range(&self) -> TokenRange {
        self.base.range
    }

    /// Check if this is the error placeholder.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.kind, ProdExprKind::Error)
    }

    /// Check if this reads storage (local or global).
    #[inline]
    pub fn is_read(&self) -> bool {
        matches!(
            self.kind,
            ProdExprKind::VarRead { .. } | ProdExprKind::GlobalRead { .. }
        )
    }

    /// The literal payload, if this is a literal.
    #[inline]
    pub fn as_literal(&self) -> Option<QWord> {
        match self.kind {
            ProdExprKind::Literal { value } => Some(value),
            _ => None,
        }
    }
}

/// A statement expression: header plus payload. Statements are `void`
/// typed except the error placeholder, which is error typed.
#[derive(Clone, Debug)]
pub struct StmtExpr {
    pub base: ExprBase,
    pub kind: StmtExprKind,
}

/// Payload of a statement expression.
#[derive(Clone, Debug)]
pub enum StmtExprKind {
    /// A lexical scope owning its statement list.
    Scope {
        parent: OptStmtExprToken,
        children: Vec<StmtExprToken>,
    },
    /// `if`/`else` over a `bool` condition.
    Condition {
        cond: ProdExprToken,
        then_stmt: StmtExprToken,
        else_stmt: OptStmtExprToken,
    },
    /// A local variable declaration.
    VarDecl {
        /// Index of the local within its function.
        local_id: u32,
        name: Symbol,
        init: OptProdExprToken,
        is_mut: bool,
    },
    /// A global declaration.
    GlobalDecl {
        name: Symbol,
        init: ProdExprToken,
        is_mut: bool,
    },
    /// Placeholder for an invalid statement.
    Error,
}

impl StmtExprKind {
    /// The discriminant of this payload.
    pub const fn id(&self) -> ExprID {
        match self {
            StmtExprKind::Scope { .. } => ExprID::Scope,
            StmtExprKind::Condition { .. } => ExprID::Condition,
            StmtExprKind::VarDecl { .. } => ExprID::VarDecl,
            StmtExprKind::GlobalDecl { .. } => ExprID::GlobalDecl,
            StmtExprKind::Error => ExprID::Error,
        }
    }
}

impl StmtExpr {
    pub fn new(range: TokenRange, ty: TypeToken, kind: StmtExprKind) -> Self {
        Self {
            base: ExprBase::new(range, ty),
            kind,
        }
    }

    /// The discriminant, in constant time.
    #[inline]
    pub fn expr_id(&self) -> ExprID {
        self.kind.id()
    }

    /// The type of the statement (`void`, or error for the placeholder).
    #[inline]
    pub fn ty(&self) -> TypeToken {
        self.base.ty
    }

    /// The token range of the statement.
    #[inline]
    pub fn range(&self) -> TokenRange {
        self.base.range
    }

    /// Check if this is a local variable declaration.
    #[inline]
    pub fn is_var_decl(&self) -> bool {
        matches!(self.kind, StmtExprKind::VarDecl { .. })
    }

    /// Check if this is a global declaration.
    #[inline]
    pub fn is_global_decl(&self) -> bool {
        matches!(self.kind, StmtExprKind::GlobalDecl { .. })
    }

    /// Check if this is any declaration (the declaration group).
    #[inline]
    pub fn is_any_decl(&self) -> bool {
        self.is_var_decl() || self.is_global_decl()
    }

    /// Check if this is a scope.
    #[inline]
    pub fn is_scope(&self) -> bool {
        matches!(self.kind, StmtExprKind::Scope { .. })
    }

    /// Check if this is the error placeholder.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.kind, StmtExprKind::Error)
    }

    /// Mutability of the declaration, if this is one.
    #[inline]
    pub fn decl_mutability(&self) -> Option<bool> {
        match self.kind {
            StmtExprKind::VarDecl { is_mut, .. } | StmtExprKind::GlobalDecl { is_mut, .. } => {
                Some(is_mut)
            }
            _ => None,
        }
    }

    /// Name of the declaration, if this is one.
    #[inline]
    pub fn decl_name(&self) -> Option<Symbol> {
        match self.kind {
            StmtExprKind::VarDecl { name, .. } | StmtExprKind::GlobalDecl { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coltc_util::BufferId;

    fn ty() -> TypeToken {
        TypeToken::new(0, BufferId::fresh())
    }

    #[test]
    fn test_prod_expr_ids() {
        let owner = BufferId::fresh();
        let tok = ProdExprToken::new(0, owner);
        let expr = ProdExpr::new(TokenRange::EMPTY, ty(), ProdExprKind::Nop);
        assert_eq!(expr.expr_id(), ExprID::Nop);
        let expr = ProdExpr::new(
            TokenRange::EMPTY,
            ty(),
            ProdExprKind::Unary {
                op: UnaryOp::Negate,
                expr: tok,
            },
        );
        assert_eq!(expr.expr_id(), ExprID::Unary);
        assert!(!expr.is_error());
    }

    #[test]
    fn test_stmt_decl_group() {
        let owner = BufferId::fresh();
        let init = ProdExprToken::new(0, owner);
        let var = StmtExpr::new(
            TokenRange::EMPTY,
            ty(),
            StmtExprKind::VarDecl {
                local_id: 0,
                name: Symbol::intern("x"),
                init: OptProdExprToken::NONE,
                is_mut: true,
            },
        );
        let global = StmtExpr::new(
            TokenRange::EMPTY,
            ty(),
            StmtExprKind::GlobalDecl {
                name: Symbol::intern("g"),
                init,
                is_mut: false,
            },
        );
        assert!(var.is_var_decl() && !var.is_global_decl() && var.is_any_decl());
        assert!(global.is_global_decl() && global.is_any_decl());
        assert_eq!(var.decl_mutability(), Some(true));
        assert_eq!(global.decl_mutability(), Some(false));
        assert_eq!(var.decl_name().unwrap().as_str(), "x");
    }

    #[test]
    fn test_literal_accessor() {
        let expr = ProdExpr::new(
            TokenRange::EMPTY,
            ty(),
            ProdExprKind::Literal {
                value: QWord::from_u8(7),
            },
        );
        assert_eq!(expr.as_literal(), Some(QWord::from_u8(7)));
        let nop = ProdExpr::new(TokenRange::EMPTY, ty(), ProdExprKind::Nop);
        assert_eq!(nop.as_literal(), None);
    }
}
