//! A syntax tree prepared for evaluation.
//!
//! `Script` owns an [`Ast`] together with the node-local caches the
//! evaluator fills lazily: literal values (numbers, strings, constant
//! ranges) and argument fill plans for call sites.

use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use eidos_ir::{Ast, Node, NodeId, NodeKind, NodeRange};
use eidos_value::{Signature, Value};

use crate::binder::FillPlan;

/// Where a script's positions point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScriptOrigin {
    /// Text the user wrote; spans are meaningful in error reports.
    User,
    /// Code supplied by the embedding; errors are blamed on the user-script
    /// call site instead.
    Internal,
}

type PlanSlot = RefCell<Option<(Rc<Signature>, Rc<FillPlan>)>>;

pub struct Script {
    ast: Ast,
    origin: ScriptOrigin,
    literals: Vec<OnceCell<Value>>,
    plans: Vec<PlanSlot>,
}

impl Script {
    /// A user script.
    ///
    /// # Panics
    /// Panics if `ast` has no root.
    pub fn new(ast: Ast) -> Rc<Self> {
        Self::with_origin(ast, ScriptOrigin::User)
    }

    /// An internal script whose positions are not reported.
    pub fn internal(ast: Ast) -> Rc<Self> {
        Self::with_origin(ast, ScriptOrigin::Internal)
    }

    fn with_origin(ast: Ast, origin: ScriptOrigin) -> Rc<Self> {
        assert!(ast.root().is_some(), "script syntax tree has no root");
        let len = ast.len();
        Rc::new(Script {
            literals: (0..len).map(|_| OnceCell::new()).collect(),
            plans: (0..len).map(|_| RefCell::new(None)).collect(),
            ast,
            origin,
        })
    }

    #[inline]
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    #[inline]
    pub fn origin(&self) -> ScriptOrigin {
        self.origin
    }

    #[inline]
    pub fn is_user(&self) -> bool {
        self.origin == ScriptOrigin::User
    }

    /// The root block.
    pub fn root(&self) -> NodeId {
        // Checked at construction.
        self.ast.root().unwrap_or(NodeId::new(0))
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        self.ast.node(id)
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        self.ast.kind(id)
    }

    #[inline]
    pub fn list(&self, range: NodeRange) -> &[NodeId] {
        self.ast.list(range)
    }

    /// Cached literal value of `id`, if computed.
    #[inline]
    pub(crate) fn cached_literal(&self, id: NodeId) -> Option<Value> {
        self.literals[id.index()].get().cloned()
    }

    /// Store the literal value of `id`. Later stores are ignored.
    pub(crate) fn cache_literal(&self, id: NodeId, value: &Value) {
        let _ = self.literals[id.index()].set(value.clone());
    }

    /// The fill plan cached at call site `id` for `signature`.
    pub(crate) fn cached_plan(&self, id: NodeId, signature: &Rc<Signature>) -> Option<Rc<FillPlan>> {
        let slot = self.plans[id.index()].borrow();
        match slot.as_ref() {
            Some((sig, plan)) if Rc::ptr_eq(sig, signature) => Some(Rc::clone(plan)),
            _ => None,
        }
    }

    /// Cache `plan` at call site `id`, replacing a plan for another
    /// signature.
    pub(crate) fn cache_plan(&self, id: NodeId, signature: &Rc<Signature>, plan: &Rc<FillPlan>) {
        *self.plans[id.index()].borrow_mut() = Some((Rc::clone(signature), Rc::clone(plan)));
    }
}

impl std::fmt::Debug for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Script")
            .field("origin", &self.origin)
            .field("nodes", &self.ast.len())
            .finish_non_exhaustive()
    }
}
