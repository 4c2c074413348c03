//! coltc-ast - Expression Arenas and Builders
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! Expressions live in two append-only arenas owned by one [`ExprBuffer`]:
//! **producer** expressions yield a value (writes produce `void`), while
//! **statement** expressions carry control flow and declarations. Each is
//! referred to by a 32-bit handle ([`ProdExprToken`] / [`StmtExprToken`]).
//!
//! ```text
//!                ┌──────────────────────────────┐
//!  builders ───▶ │ ExprBuffer                   │ ◀──▶ TypeBuffer
//!                │   prod:  IndexVec<ProdExpr>  │
//!                │   stmt:  IndexVec<StmtExpr>  │
//!                └──────────────────────────────┘
//! ```
//!
//! Every expression starts with the common [`ExprBase`] header (token
//! range + type token); the discriminant ([`ExprID`]) is reachable in
//! constant time on either arena.
//!
//! THE BUILDERS ARE THE ONLY DOOR
//! ------------------------------
//! Expressions are created exclusively through the `add_*` builders, which
//! enforce the typing contract: binary operands share a type and
//! comparisons produce `bool`, pointer loads need a non-opaque pointer,
//! stores need a matching mutable pointee, casts stay within builtins, and
//! so on. An error-typed operand short-circuits the builder to an error
//! expression *before* any other precondition is checked, so one mistake
//! never cascades into a chain of panicking invariants or duplicate
//! diagnostics.
//!
//! Expressions are never destroyed individually; the arenas drop as a unit
//! when the session ends. The only statement owning heap state is `Scope`
//! (its child list), which drops naturally with the arena.

pub mod buffer;
pub mod expr;
pub mod warn;

pub use buffer::ExprBuffer;
pub use expr::{
    ExprBase, ExprID, OptProdExprToken, OptStmtExprToken, ProdExpr, ProdExprKind, ProdExprToken,
    StmtExpr, StmtExprKind, StmtExprToken,
};
pub use warn::WarnFor;
