use std::ops::{Index, IndexMut};

use super::{CallingConv, Kind, Modifiers, StorageScope};

/// Handle to a [`Node`] owned by an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// A single type in the tree, e.g. the `int` in `int*`.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<'a> {
    pub kind: Kind,
    pub modifiers: Modifiers,

    /// Pointee, element, or return type.
    pub inner: Option<NodeId>,

    /// Valid if `kind` is [`Kind::Function`].
    pub calling_conv: CallingConv,

    /// Valid if `kind` is the outermost [`Kind::Function`] of a member function.
    pub storage_scope: StorageScope,

    /// Valid if `kind` is [`Kind::Array`].
    pub len: i32,

    /// Valid if `kind` is a struct, union, class or enum. Innermost name first.
    pub name: Vec<&'a str>,

    /// Function or template parameters.
    pub params: Vec<NodeId>,
}

impl<'a> Node<'a> {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            modifiers: Modifiers::empty(),
            inner: None,
            calling_conv: CallingConv::default(),
            storage_scope: StorageScope::empty(),
            len: 0,
            name: Vec::new(),
            params: Vec::new(),
        }
    }
}

/// Owns every node created while parsing a single symbol.
///
/// Nodes are only ever appended, so a [`NodeId`] stays valid for as long as the arena lives.
#[derive(Debug)]
pub struct Arena<'a> {
    nodes: Vec<Node<'a>>,
}

impl<'a> Arena<'a> {
    /// Most symbols fit in this many nodes.
    const INLINE_NODES: usize = 20;

    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(Self::INLINE_NODES),
        }
    }

    pub fn alloc(&mut self, kind: Kind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind));
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for Arena<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Index<NodeId> for Arena<'a> {
    type Output = Node<'a>;

    #[inline]
    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0 as usize]
    }
}

impl<'a> IndexMut<NodeId> for Arena<'a> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.0 as usize]
    }
}
