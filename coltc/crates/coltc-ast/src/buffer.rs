//! The expression arena and its builders.
//!
//! The `ExprBuffer` owns the producer and statement vectors and is the only
//! way to create expressions. It borrows the session's `TypeBuffer` for its
//! lifetime: every builder both checks operand types and mints the result
//! type through the interner.
//!
//! Builders assert their preconditions, with one deliberate exception: an
//! error-typed operand makes the builder return an error expression
//! immediately, before any precondition fires. That is what lets the parser
//! keep building a well-typed tree after a semantic mistake.

use coltc_lex::{BinaryOp, OpFamily, TokenRange, UnaryOp};
use coltc_types::{BuiltinID, TypeBuffer, TypeToken, TypeVariant};
use coltc_util::{BufferId, QWord, Symbol};

use crate::expr::{
    OptProdExprToken, OptStmtExprToken, ProdExpr, ProdExprKind, ProdExprToken, StmtExpr,
    StmtExprKind, StmtExprToken,
};

/// Owner of all expressions of a session.
pub struct ExprBuffer<'t> {
    /// Identity stamped into minted tokens (checked in debug builds).
    id: BufferId,
    /// The session's type interner.
    types: &'t mut TypeBuffer,
    /// Producer expressions, indexed by `ProdExprToken`.
    prod: Vec<ProdExpr>,
    /// Statement expressions, indexed by `StmtExprToken`.
    stmt: Vec<StmtExpr>,
}

impl<'t> ExprBuffer<'t> {
    /// A fresh buffer building types through `types`.
    pub fn new(types: &'t mut TypeBuffer) -> Self {
        Self {
            id: BufferId::fresh(),
            types,
            prod: Vec::new(),
            stmt: Vec::new(),
        }
    }

    /// This buffer's identity.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// The type interner the buffer builds through.
    pub fn types(&self) -> &TypeBuffer {
        &*self.types
    }

    /// Number of producer expressions.
    pub fn prod_count(&self) -> usize {
        self.prod.len()
    }

    /// Number of statement expressions.
    pub fn stmt_count(&self) -> usize {
        self.stmt.len()
    }

    // -- access ------------------------------------------------------------

    /// The producer expression behind `token`.
    #[inline]
    pub fn prod(&self, token: ProdExprToken) -> &ProdExpr {
        token.assert_owned_by(self.id);
        &self.prod[token.index()]
    }

    /// The statement expression behind `token`.
    #[inline]
    pub fn stmt(&self, token: StmtExprToken) -> &StmtExpr {
        token.assert_owned_by(self.id);
        &self.stmt[token.index()]
    }

    /// The type token of a producer expression.
    #[inline]
    pub fn type_of(&self, token: ProdExprToken) -> TypeToken {
        self.prod(token).ty()
    }

    /// The type variant of a producer expression.
    #[inline]
    pub fn variant_of(&self, token: ProdExprToken) -> &TypeVariant {
        self.types.get(self.type_of(token))
    }

    fn is_error_typed(&self, token: ProdExprToken) -> bool {
        self.variant_of(token).is_error()
    }

    fn is_error_stmt(&self, token: StmtExprToken) -> bool {
        self.stmt(token).is_error()
    }

    // -- arena plumbing ----------------------------------------------------

    fn push_prod(&mut self, range: TokenRange, ty: TypeToken, kind: ProdExprKind) -> ProdExprToken {
        let token = ProdExprToken::new(self.prod.len() as u32, self.id);
        self.prod.push(ProdExpr::new(range, ty, kind));
        token
    }

    fn push_stmt(&mut self, range: TokenRange, ty: TypeToken, kind: StmtExprKind) -> StmtExprToken {
        let token = StmtExprToken::new(self.stmt.len() as u32, self.id);
        self.stmt.push(StmtExpr::new(range, ty, kind));
        token
    }

    // -- producer builders -------------------------------------------------

    /// An error producer expression.
    pub fn add_error(&mut self, range: TokenRange) -> ProdExprToken {
        let ty = self.types.error_type();
        self.push_prod(range, ty, ProdExprKind::Error)
    }

    /// An error statement.
    pub fn add_error_stmt(&mut self, range: TokenRange) -> StmtExprToken {
        let ty = self.types.error_type();
        self.push_stmt(range, ty, StmtExprKind::Error)
    }

    /// A no-op producer; type `void`.
    pub fn add_nop(&mut self, range: TokenRange) -> ProdExprToken {
        let ty = self.types.void_type();
        self.push_prod(range, ty, ProdExprKind::Nop)
    }

    /// A scalar literal; its type is the builtin for `id`.
    pub fn add_literal(&mut self, range: TokenRange, value: QWord, id: BuiltinID) -> ProdExprToken {
        let ty = self.types.builtin(id);
        self.push_prod(range, ty, ProdExprKind::Literal { value })
    }

    /// A unary operation; the result type is the operand type.
    pub fn add_unary(&mut self, range: TokenRange, op: UnaryOp, expr: ProdExprToken) -> ProdExprToken {
        if self.is_error_typed(expr) {
            return self.add_error(range);
        }
        let ty = self.type_of(expr);
        self.push_prod(range, ty, ProdExprKind::Unary { op, expr })
    }

    /// A binary operation over same-typed operands.
    ///
    /// Comparison-family operators produce `bool`; everything else produces
    /// the operand type.
    ///
    /// # Panics
    ///
    /// Panics if the operand types differ (unless one is error typed, which
    /// absorbs the expression).
    pub fn add_binary(
        &mut self,
        range: TokenRange,
        lhs: ProdExprToken,
        op: BinaryOp,
        rhs: ProdExprToken,
    ) -> ProdExprToken {
        if self.is_error_typed(lhs) || self.is_error_typed(rhs) {
            return self.add_error(range);
        }
        assert!(
            self.type_of(lhs) == self.type_of(rhs),
            "binary operands must share a type ({} vs {})",
            self.types.name_of(self.type_of(lhs)),
            self.types.name_of(self.type_of(rhs)),
        );
        let ty = if op.family() == OpFamily::Comparison {
            self.types.builtin(BuiltinID::Bool)
        } else {
            self.type_of(lhs)
        };
        self.push_prod(range, ty, ProdExprKind::Binary { lhs, op, rhs })
    }

    /// A converting cast; both endpoints must be builtin.
    pub fn add_cast(
        &mut self,
        range: TokenRange,
        cast_to: TypeToken,
        to_cast: ProdExprToken,
    ) -> ProdExprToken {
        if self.is_error_typed(to_cast) || self.types.get(cast_to).is_error() {
            return self.add_error(range);
        }
        assert!(
            self.types.get(cast_to).is_builtin() && self.variant_of(to_cast).is_builtin(),
            "cast endpoints must both be builtin types"
        );
        self.push_prod(
            range,
            cast_to,
            ProdExprKind::Cast {
                expr: to_cast,
                is_bit_cast: false,
            },
        )
    }

    /// A bit-reinterpreting cast; both endpoints must be builtin and at
    /// least one must be of the byte family.
    pub fn add_bit_cast(
        &mut self,
        range: TokenRange,
        cast_to: TypeToken,
        to_cast: ProdExprToken,
    ) -> ProdExprToken {
        if self.is_error_typed(to_cast) || self.types.get(cast_to).is_error() {
            return self.add_error(range);
        }
        assert!(
            self.types.get(cast_to).is_builtin() && self.variant_of(to_cast).is_builtin(),
            "bit cast endpoints must both be builtin types"
        );
        assert!(
            self.types.get(cast_to).is_builtin_and(BuiltinID::is_bytes)
                || self.variant_of(to_cast).is_builtin_and(BuiltinID::is_bytes),
            "bit cast requires at least one byte-family endpoint"
        );
        self.push_prod(
            range,
            cast_to,
            ProdExprKind::Cast {
                expr: to_cast,
                is_bit_cast: true,
            },
        )
    }

    /// Address of a declaration; `MutPtr<T>` when the declaration is
    /// mutable, `Ptr<T>` otherwise.
    pub fn add_address_of(&mut self, range: TokenRange, decl: StmtExprToken) -> ProdExprToken {
        if self.is_error_stmt(decl) {
            return self.add_error(range);
        }
        let stmt = self.stmt(decl);
        let is_mut = stmt
            .decl_mutability()
            .expect("address-of target must be a variable or global declaration");
        let decl_ty = stmt.ty();
        let ty = self.types.ptr_to(decl_ty, is_mut);
        self.push_prod(range, ty, ProdExprKind::AddressOf { decl })
    }

    /// Load through a non-opaque pointer; the result type is the pointee.
    pub fn add_ptr_load(&mut self, range: TokenRange, from: ProdExprToken) -> ProdExprToken {
        if self.is_error_typed(from) {
            return self.add_error(range);
        }
        let pointee = self
            .variant_of(from)
            .pointee()
            .expect("pointer load requires a non-opaque pointer");
        self.push_prod(range, pointee, ProdExprKind::PtrLoad { from })
    }

    /// Store through a non-opaque mutable pointer whose pointee matches the
    /// stored value; produces `void`.
    pub fn add_ptr_store(
        &mut self,
        range: TokenRange,
        write_to: ProdExprToken,
        to_write: ProdExprToken,
    ) -> ProdExprToken {
        if self.is_error_typed(write_to) || self.is_error_typed(to_write) {
            return self.add_error(range);
        }
        let pointee = match self.variant_of(write_to) {
            TypeVariant::MutPtr(to) => *to,
            _ => panic!("pointer store requires a non-opaque pointer to mutable memory"),
        };
        assert!(
            pointee == self.type_of(to_write),
            "pointer store value type must match the pointee"
        );
        let ty = self.types.void_type();
        self.push_prod(
            range,
            ty,
            ProdExprKind::PtrStore {
                dest: write_to,
                value: to_write,
            },
        )
    }

    /// Read of a local variable; the result type is the declaration's.
    pub fn add_var_read(&mut self, range: TokenRange, decl: StmtExprToken) -> ProdExprToken {
        if self.is_error_stmt(decl) {
            return self.add_error(range);
        }
        assert!(
            self.stmt(decl).is_var_decl(),
            "variable read target must be a local declaration"
        );
        let ty = self.stmt(decl).ty();
        self.push_prod(range, ty, ProdExprKind::VarRead { decl })
    }

    /// Read of a global; the result type is the declaration's.
    pub fn add_global_read(&mut self, range: TokenRange, decl: StmtExprToken) -> ProdExprToken {
        if self.is_error_stmt(decl) {
            return self.add_error(range);
        }
        assert!(
            self.stmt(decl).is_global_decl(),
            "global read target must be a global declaration"
        );
        let ty = self.stmt(decl).ty();
        self.push_prod(range, ty, ProdExprKind::GlobalRead { decl })
    }

    /// Write to a local variable; produces `void`.
    pub fn add_var_write(
        &mut self,
        range: TokenRange,
        decl: StmtExprToken,
        value: ProdExprToken,
    ) -> ProdExprToken {
        if self.is_error_stmt(decl) || self.is_error_typed(value) {
            return self.add_error(range);
        }
        assert!(
            self.stmt(decl).is_var_decl(),
            "variable write target must be a local declaration"
        );
        assert!(
            self.stmt(decl).ty() == self.type_of(value),
            "variable write value type must match the declaration"
        );
        let ty = self.types.void_type();
        self.push_prod(range, ty, ProdExprKind::VarWrite { decl, value })
    }

    /// Write to a global; produces `void`.
    pub fn add_global_write(
        &mut self,
        range: TokenRange,
        decl: StmtExprToken,
        value: ProdExprToken,
    ) -> ProdExprToken {
        if self.is_error_stmt(decl) || self.is_error_typed(value) {
            return self.add_error(range);
        }
        assert!(
            self.stmt(decl).is_global_decl(),
            "global write target must be a global declaration"
        );
        assert!(
            self.stmt(decl).ty() == self.type_of(value),
            "global write value type must match the declaration"
        );
        let ty = self.types.void_type();
        self.push_prod(range, ty, ProdExprKind::GlobalWrite { decl, value })
    }

    /// Move between two local declarations; produces `void`.
    pub fn add_move(
        &mut self,
        range: TokenRange,
        from: StmtExprToken,
        to: StmtExprToken,
    ) -> ProdExprToken {
        if self.is_error_stmt(from) || self.is_error_stmt(to) {
            return self.add_error(range);
        }
        assert!(
            self.stmt(from).is_var_decl() && self.stmt(to).is_var_decl(),
            "move endpoints must be local declarations"
        );
        let ty = self.types.void_type();
        self.push_prod(range, ty, ProdExprKind::Move { from, to })
    }

    /// Copy between declarations; produces `void`.
    pub fn add_copy(
        &mut self,
        range: TokenRange,
        from: StmtExprToken,
        to: StmtExprToken,
    ) -> ProdExprToken {
        if self.is_error_stmt(from) || self.is_error_stmt(to) {
            return self.add_error(range);
        }
        assert!(
            self.stmt(from).is_any_decl() && self.stmt(to).is_any_decl(),
            "copy endpoints must be declarations"
        );
        let ty = self.types.void_type();
        self.push_prod(range, ty, ProdExprKind::Copy { from, to })
    }

    /// Conditional move between declarations; produces `void`.
    pub fn add_cmove(
        &mut self,
        range: TokenRange,
        from: StmtExprToken,
        to: StmtExprToken,
    ) -> ProdExprToken {
        if self.is_error_stmt(from) || self.is_error_stmt(to) {
            return self.add_error(range);
        }
        assert!(
            self.stmt(from).is_any_decl() && self.stmt(to).is_any_decl(),
            "conditional move endpoints must be declarations"
        );
        let ty = self.types.void_type();
        self.push_prod(range, ty, ProdExprKind::CMove { from, to })
    }

    /// Call through a function type.
    ///
    /// The callee type must be a function type whose arity matches `args`
    /// (variadic payloads accept extra trailing arguments) and whose
    /// parameter types match the argument types. The result type is the
    /// payload's return type.
    pub fn add_fn_call(
        &mut self,
        range: TokenRange,
        fn_type: TypeToken,
        args: Vec<ProdExprToken>,
    ) -> ProdExprToken {
        if self.types.get(fn_type).is_error() {
            return self.add_error(range);
        }
        if args.iter().any(|arg| self.is_error_typed(*arg)) {
            return self.add_error(range);
        }
        let payload = match self.types.get(fn_type) {
            TypeVariant::Fn(idx) => self.types.payload(*idx).clone(),
            _ => panic!("call target must have a function type"),
        };
        if payload.is_variadic {
            assert!(
                args.len() >= payload.args.len(),
                "call has too few arguments for variadic function"
            );
        } else {
            assert!(
                args.len() == payload.args.len(),
                "call arity must match the function type"
            );
        }
        for (arg, param) in args.iter().zip(payload.args.iter()) {
            assert!(
                self.types
                    .is_same_as(self.type_of(*arg), param.ty),
                "call argument type must match the parameter"
            );
        }
        self.push_prod(
            range,
            payload.return_type,
            ProdExprKind::FnCall {
                fn_type,
                args: args.into_boxed_slice(),
            },
        )
    }

    // -- statement builders ------------------------------------------------

    /// A scope, optionally nested in a parent scope.
    pub fn add_scope(
        &mut self,
        range: TokenRange,
        parent: Option<StmtExprToken>,
    ) -> StmtExprToken {
        if let Some(parent) = parent {
            assert!(
                self.stmt(parent).is_scope(),
                "scope parent must itself be a scope"
            );
        }
        let ty = self.types.void_type();
        self.push_stmt(
            range,
            ty,
            StmtExprKind::Scope {
                parent: OptStmtExprToken::from(parent),
                children: Vec::new(),
            },
        )
    }

    /// Append a statement to a scope's child list.
    pub fn scope_push(&mut self, scope: StmtExprToken, child: StmtExprToken) {
        scope.assert_owned_by(self.id);
        child.assert_owned_by(self.id);
        match &mut self.stmt[scope.index()].kind {
            StmtExprKind::Scope { children, .. } => children.push(child),
            _ => panic!("scope_push target must be a scope"),
        }
    }

    /// The children of a scope.
    pub fn scope_children(&self, scope: StmtExprToken) -> &[StmtExprToken] {
        match &self.stmt(scope).kind {
            StmtExprKind::Scope { children, .. } => children,
            _ => panic!("scope_children target must be a scope"),
        }
    }

    /// An `if`/`else`; the condition must be `bool`.
    pub fn add_condition(
        &mut self,
        range: TokenRange,
        cond: ProdExprToken,
        then_stmt: StmtExprToken,
        else_stmt: Option<StmtExprToken>,
    ) -> StmtExprToken {
        if self.is_error_typed(cond) {
            return self.add_error_stmt(range);
        }
        assert!(
            self.variant_of(cond).is_builtin_and(BuiltinID::is_bool),
            "condition must have type bool"
        );
        let ty = self.types.void_type();
        self.push_stmt(
            range,
            ty,
            StmtExprKind::Condition {
                cond,
                then_stmt,
                else_stmt: OptStmtExprToken::from(else_stmt),
            },
        )
    }

    /// A local variable declaration; the statement carries the declared
    /// type so reads and address-of can recover it.
    pub fn add_var_decl(
        &mut self,
        range: TokenRange,
        ty: TypeToken,
        local_id: u32,
        name: Symbol,
        init: Option<ProdExprToken>,
        is_mut: bool,
    ) -> StmtExprToken {
        ty.assert_owned_by(self.types.id());
        self.push_stmt(
            range,
            ty,
            StmtExprKind::VarDecl {
                local_id,
                name,
                init: OptProdExprToken::from(init),
                is_mut,
            },
        )
    }

    /// A global declaration.
    pub fn add_global_decl(
        &mut self,
        range: TokenRange,
        ty: TypeToken,
        name: Symbol,
        init: ProdExprToken,
        is_mut: bool,
    ) -> StmtExprToken {
        ty.assert_owned_by(self.types.id());
        self.push_stmt(
            range,
            ty,
            StmtExprKind::GlobalDecl { name, init, is_mut },
        )
    }
}

impl std::fmt::Debug for ExprBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ExprBuffer {{ {} producers, {} statements }}",
            self.prod.len(),
            self.stmt.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ExprID;
    use coltc_types::{ArgSpecifier, FnTypeArg};

    fn range() -> TokenRange {
        TokenRange::EMPTY
    }

    /// A literal `i32` producer for tests.
    fn lit_i32(buf: &mut ExprBuffer<'_>, v: i32) -> ProdExprToken {
        buf.add_literal(range(), QWord::from_i32(v), BuiltinID::I32)
    }

    #[test]
    fn test_literal_type() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let lit = buf.add_literal(range(), QWord::from_u8(42), BuiltinID::U8);
        assert_eq!(
            *buf.variant_of(lit),
            TypeVariant::Builtin(BuiltinID::U8)
        );
        assert_eq!(buf.prod(lit).as_literal(), Some(QWord::from_u8(42)));
    }

    #[test]
    fn test_unary_keeps_operand_type() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let lit = lit_i32(&mut buf, 5);
        let neg = buf.add_unary(range(), UnaryOp::Negate, lit);
        assert_eq!(buf.type_of(neg), buf.type_of(lit));
        assert_eq!(buf.prod(neg).expr_id(), ExprID::Unary);
    }

    #[test]
    fn test_binary_arithmetic_keeps_type() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let a = lit_i32(&mut buf, 1);
        let b = lit_i32(&mut buf, 2);
        let sum = buf.add_binary(range(), a, BinaryOp::Sum, b);
        assert_eq!(buf.type_of(sum), buf.type_of(a));
    }

    #[test]
    fn test_comparison_produces_bool() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let a = lit_i32(&mut buf, 1);
        let b = lit_i32(&mut buf, 2);
        for op in [
            BinaryOp::Less,
            BinaryOp::LessEqual,
            BinaryOp::Great,
            BinaryOp::GreatEqual,
            BinaryOp::NotEqual,
            BinaryOp::Equal,
        ] {
            let cmp = buf.add_binary(range(), a, op, b);
            assert_eq!(
                *buf.variant_of(cmp),
                TypeVariant::Builtin(BuiltinID::Bool),
                "{op} must produce bool"
            );
        }
    }

    #[test]
    #[should_panic(expected = "share a type")]
    fn test_binary_rejects_mismatched_operands() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let a = lit_i32(&mut buf, 1);
        let b = buf.add_literal(range(), QWord::from_u8(2), BuiltinID::U8);
        let _ = buf.add_binary(range(), a, BinaryOp::Sum, b);
    }

    #[test]
    fn test_error_absorption_in_binary() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let err = buf.add_error(range());
        let b = lit_i32(&mut buf, 2);
        // No panic despite the type mismatch: the error absorbs it.
        let sum = buf.add_binary(range(), err, BinaryOp::Sum, b);
        assert!(buf.prod(sum).is_error());
        assert!(buf.variant_of(sum).is_error());
    }

    #[test]
    fn test_error_absorption_in_unary_and_cast() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let err = buf.add_error(range());
        let neg = buf.add_unary(range(), UnaryOp::Negate, err);
        assert!(buf.prod(neg).is_error());

        let u8_ty = buf.types.builtin(BuiltinID::U8);
        let cast = buf.add_cast(range(), u8_ty, err);
        assert!(buf.prod(cast).is_error());
    }

    #[test]
    fn test_cast_types() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let lit = lit_i32(&mut buf, 5);
        let f64_ty = buf.types.builtin(BuiltinID::F64);
        let cast = buf.add_cast(range(), f64_ty, lit);
        assert_eq!(buf.type_of(cast), f64_ty);
    }

    #[test]
    fn test_bit_cast_requires_byte_family() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let lit = lit_i32(&mut buf, 5);
        let dword = buf.types.builtin(BuiltinID::Dword);
        let cast = buf.add_bit_cast(range(), dword, lit);
        assert_eq!(buf.type_of(cast), dword);
    }

    #[test]
    #[should_panic(expected = "byte-family")]
    fn test_bit_cast_rejects_non_bytes() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let lit = lit_i32(&mut buf, 5);
        let f64_ty = buf.types.builtin(BuiltinID::F64);
        let _ = buf.add_bit_cast(range(), f64_ty, lit);
    }

    fn var_decl(buf: &mut ExprBuffer<'_>, is_mut: bool) -> StmtExprToken {
        let ty = buf.types.builtin(BuiltinID::I32);
        buf.add_var_decl(range(), ty, 0, Symbol::intern("x"), None, is_mut)
    }

    #[test]
    fn test_address_of_mutable_var_is_mutptr() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let decl = var_decl(&mut buf, true);
        let addr = buf.add_address_of(range(), decl);
        let i32_ty = buf.types.builtin(BuiltinID::I32);
        assert_eq!(*buf.variant_of(addr), TypeVariant::MutPtr(i32_ty));
    }

    #[test]
    fn test_address_of_immutable_var_is_ptr() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let decl = var_decl(&mut buf, false);
        let addr = buf.add_address_of(range(), decl);
        let i32_ty = buf.types.builtin(BuiltinID::I32);
        assert_eq!(*buf.variant_of(addr), TypeVariant::Ptr(i32_ty));
    }

    #[test]
    fn test_ptr_load_yields_pointee() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let decl = var_decl(&mut buf, true);
        let addr = buf.add_address_of(range(), decl);
        let load = buf.add_ptr_load(range(), addr);
        let i32_ty = buf.types.builtin(BuiltinID::I32);
        assert_eq!(buf.type_of(load), i32_ty);
    }

    #[test]
    fn test_ptr_store_requires_matching_pointee() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let decl = var_decl(&mut buf, true);
        let addr = buf.add_address_of(range(), decl);
        let value = lit_i32(&mut buf, 7);
        let store = buf.add_ptr_store(range(), addr, value);
        assert!(buf.variant_of(store).is_void());
    }

    #[test]
    #[should_panic(expected = "pointer to mutable")]
    fn test_ptr_store_rejects_const_pointer() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let decl = var_decl(&mut buf, false);
        let addr = buf.add_address_of(range(), decl); // Ptr<i32>
        let value = lit_i32(&mut buf, 7);
        let _ = buf.add_ptr_store(range(), addr, value);
    }

    #[test]
    fn test_var_read_and_write() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let decl = var_decl(&mut buf, true);
        let read = buf.add_var_read(range(), decl);
        let i32_ty = buf.types.builtin(BuiltinID::I32);
        assert_eq!(buf.type_of(read), i32_ty);

        let value = lit_i32(&mut buf, 3);
        let write = buf.add_var_write(range(), decl, value);
        assert!(buf.variant_of(write).is_void());
    }

    #[test]
    #[should_panic(expected = "must match the declaration")]
    fn test_var_write_rejects_type_mismatch() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let decl = var_decl(&mut buf, true);
        let value = buf.add_literal(range(), QWord::from_u8(1), BuiltinID::U8);
        let _ = buf.add_var_write(range(), decl, value);
    }

    fn global_decl(buf: &mut ExprBuffer<'_>) -> StmtExprToken {
        let ty = buf.types.builtin(BuiltinID::I32);
        let init = buf.add_literal(range(), QWord::from_i32(0), BuiltinID::I32);
        buf.add_global_decl(range(), ty, Symbol::intern("g"), init, true)
    }

    #[test]
    fn test_global_read_write() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let decl = global_decl(&mut buf);
        let read = buf.add_global_read(range(), decl);
        let i32_ty = buf.types.builtin(BuiltinID::I32);
        assert_eq!(buf.type_of(read), i32_ty);

        let value = lit_i32(&mut buf, 3);
        let write = buf.add_global_write(range(), decl, value);
        assert!(buf.variant_of(write).is_void());
    }

    #[test]
    #[should_panic(expected = "local declaration")]
    fn test_var_read_rejects_global() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let decl = global_decl(&mut buf);
        let _ = buf.add_var_read(range(), decl);
    }

    #[test]
    fn test_move_copy_cmove() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let a = var_decl(&mut buf, true);
        let b = var_decl(&mut buf, true);
        let g = global_decl(&mut buf);

        let mv = buf.add_move(range(), a, b);
        assert!(buf.variant_of(mv).is_void());
        let copy = buf.add_copy(range(), g, a);
        assert!(buf.variant_of(copy).is_void());
        let cmove = buf.add_cmove(range(), a, g);
        assert!(buf.variant_of(cmove).is_void());
    }

    #[test]
    #[should_panic(expected = "local declarations")]
    fn test_move_rejects_globals() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let a = var_decl(&mut buf, true);
        let g = global_decl(&mut buf);
        let _ = buf.add_move(range(), a, g);
    }

    #[test]
    fn test_scope_children() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let outer = buf.add_scope(range(), None);
        let inner = buf.add_scope(range(), Some(outer));
        let decl = var_decl(&mut buf, false);
        buf.scope_push(outer, inner);
        buf.scope_push(outer, decl);
        assert_eq!(buf.scope_children(outer), &[inner, decl]);
        assert!(buf.scope_children(inner).is_empty());
    }

    #[test]
    #[should_panic(expected = "must itself be a scope")]
    fn test_scope_parent_must_be_scope() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let decl = var_decl(&mut buf, false);
        let _ = buf.add_scope(range(), Some(decl));
    }

    #[test]
    fn test_condition_requires_bool() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let cond = buf.add_literal(range(), QWord::from_bool(true), BuiltinID::Bool);
        let then_stmt = buf.add_scope(range(), None);
        let cond_stmt = buf.add_condition(range(), cond, then_stmt, None);
        assert_eq!(buf.stmt(cond_stmt).expr_id(), ExprID::Condition);
    }

    #[test]
    #[should_panic(expected = "type bool")]
    fn test_condition_rejects_non_bool() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let cond = lit_i32(&mut buf, 1);
        let then_stmt = buf.add_scope(range(), None);
        let _ = buf.add_condition(range(), cond, then_stmt, None);
    }

    #[test]
    fn test_condition_absorbs_error_condition() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let cond = buf.add_error(range());
        let then_stmt = buf.add_scope(range(), None);
        let stmt = buf.add_condition(range(), cond, then_stmt, None);
        assert!(buf.stmt(stmt).is_error());
    }

    #[test]
    fn test_fn_call_typing() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let i32_ty = buf.types.builtin(BuiltinID::I32);
        let u8_ty = buf.types.builtin(BuiltinID::U8);
        let fn_ty = buf.types.fn_type(
            u8_ty,
            vec![FnTypeArg::new(i32_ty, ArgSpecifier::In)],
            false,
        );
        let arg = lit_i32(&mut buf, 3);
        let call = buf.add_fn_call(range(), fn_ty, vec![arg]);
        assert_eq!(buf.type_of(call), u8_ty);
        assert_eq!(buf.prod(call).expr_id(), ExprID::FnCall);
    }

    #[test]
    fn test_fn_call_variadic_accepts_extra_args() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let i32_ty = buf.types.builtin(BuiltinID::I32);
        let void = buf.types.void_type();
        let fn_ty = buf.types.fn_type(
            void,
            vec![FnTypeArg::new(i32_ty, ArgSpecifier::In)],
            true,
        );
        let a = lit_i32(&mut buf, 1);
        let b = buf.add_literal(range(), QWord::from_u8(2), BuiltinID::U8);
        let call = buf.add_fn_call(range(), fn_ty, vec![a, b]);
        assert_eq!(buf.type_of(call), void);
    }

    #[test]
    #[should_panic(expected = "arity")]
    fn test_fn_call_rejects_wrong_arity() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let i32_ty = buf.types.builtin(BuiltinID::I32);
        let void = buf.types.void_type();
        let fn_ty = buf.types.fn_type(
            void,
            vec![FnTypeArg::new(i32_ty, ArgSpecifier::In)],
            false,
        );
        let _ = buf.add_fn_call(range(), fn_ty, vec![]);
    }

    #[test]
    #[should_panic(expected = "argument type")]
    fn test_fn_call_rejects_wrong_arg_type() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let i32_ty = buf.types.builtin(BuiltinID::I32);
        let void = buf.types.void_type();
        let fn_ty = buf.types.fn_type(
            void,
            vec![FnTypeArg::new(i32_ty, ArgSpecifier::In)],
            false,
        );
        let bad = buf.add_literal(range(), QWord::from_u8(1), BuiltinID::U8);
        let _ = buf.add_fn_call(range(), fn_ty, vec![bad]);
    }

    #[test]
    fn test_nop_is_void() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let nop = buf.add_nop(range());
        assert!(buf.variant_of(nop).is_void());
        assert_eq!(buf.prod(nop).expr_id(), ExprID::Nop);
    }

    #[test]
    fn test_tokens_are_sequential() {
        let mut types = TypeBuffer::new();
        let mut buf = ExprBuffer::new(&mut types);
        let a = buf.add_nop(range());
        let b = buf.add_nop(range());
        assert_eq!(a.raw(), 0);
        assert_eq!(b.raw(), 1);
        assert_eq!(buf.prod_count(), 2);
    }
}
