//! Converts a parsed tree back into a declaration.
//!
//! Converting a tree representing a C++ type to a string is tricky due
//! to the grammar of C++ declarations inherited from C. You have to
//! construct a string from inside to outside. For example, if a type
//! X is a pointer to a function returning int, the order you create a
//! string becomes something like this:
//!
//!   (1) X is a pointer: *X
//!   (2) (1) is a function returning int: int (*X)()
//!
//! So you cannot construct a result just by appending strings to a result.
//!
//! To deal with this, rendering is split in two. [`Renderer::demangle_pre`] writes
//! the "first half" of a type declaration, and [`Renderer::demangle_post`] writes the
//! "second half". For example, the first half of a function is its return type and
//! the second half its parameter list. The name goes in between.

use std::fmt::Write;

use super::{Arena, Kind, Modifiers, NodeId};

pub(super) struct Renderer<'s, 'a> {
    arena: &'s Arena<'a>,
    out: String,
}

impl<'s, 'a> Renderer<'s, 'a> {
    pub fn new(arena: &'s Arena<'a>) -> Self {
        Self {
            arena,
            out: String::with_capacity(64),
        }
    }

    pub fn declaration(mut self, name: &[&str], root: NodeId) -> String {
        self.demangle_pre(root);
        self.name(name);
        self.demangle_post(root);
        self.out
    }

    /// Write the "first half" of a given type.
    fn demangle_pre(&mut self, id: NodeId) {
        let arena = self.arena;
        let node = &arena[id];

        match node.kind {
            Kind::Unknown | Kind::NoReturnType => {}
            Kind::Function => {
                if let Some(ret) = node.inner {
                    self.demangle_pre(ret);
                }
                return;
            }
            Kind::Pointer | Kind::Reference => {
                if let Some(inner) = node.inner {
                    self.demangle_pre(inner);

                    // "[]" and "()" (for function parameters) take precedence over "*",
                    // so "int *x(int)" means "x is a function returning int *". We need
                    // parentheses to supercede the default precedence. (e.g. we want to
                    // emit something like "int (*x)(int)".)
                    if arena[inner].kind.binds_tighter() {
                        self.out.push('(');
                    }
                }

                self.out.push(if node.kind == Kind::Pointer { '*' } else { '&' });
            }
            Kind::Array => {
                if let Some(inner) = node.inner {
                    self.demangle_pre(inner);
                }
            }
            Kind::Struct => self.class("struct", id),
            Kind::Union => self.class("union", id),
            Kind::Class => self.class("class", id),
            Kind::Enum => {
                self.out.push_str("enum ");
                self.name(&node.name);
            }
            kind => self.out.push_str(primitive(kind)),
        }

        if node.modifiers.contains(Modifiers::CONST) {
            self.space();
            self.out.push_str("const");
        }
    }

    /// Write the "second half" of a given type.
    fn demangle_post(&mut self, id: NodeId) {
        let arena = self.arena;
        let node = &arena[id];

        match node.kind {
            Kind::Function => {
                self.out.push('(');
                self.params(&node.params);
                self.out.push(')');
            }
            Kind::Pointer | Kind::Reference => {
                if let Some(inner) = node.inner {
                    if arena[inner].kind.binds_tighter() {
                        self.out.push(')');
                    }

                    self.demangle_post(inner);
                }
            }
            Kind::Array => {
                let _ = write!(self.out, "[{}]", node.len);

                if let Some(inner) = node.inner {
                    self.demangle_post(inner);
                }
            }
            _ => {}
        }
    }

    /// Write a function or template parameter list.
    fn params(&mut self, params: &[NodeId]) {
        for (idx, &param) in params.iter().enumerate() {
            if idx != 0 {
                self.out.push(',');
            }

            self.demangle_pre(param);
            self.demangle_post(param);
        }
    }

    fn class(&mut self, keyword: &str, id: NodeId) {
        let arena = self.arena;
        let node = &arena[id];

        self.out.push_str(keyword);
        self.out.push(' ');
        self.name(&node.name);

        if !node.params.is_empty() {
            self.out.push('<');
            self.params(&node.params);
            self.out.push('>');
        }
    }

    /// Write a name stored innermost first as `outer::inner`.
    fn name(&mut self, name: &[&str]) {
        let Some((ident, scope)) = name.split_first() else {
            return;
        };

        self.space();

        for segment in scope.iter().rev() {
            self.out.push_str(segment);
            self.out.push_str("::");
        }

        // ?0 and ?1 are special names for constructors and destructors.
        if let Some(class) = ident.strip_prefix("?0") {
            let _ = write!(self.out, "{class}::{class}");
        } else if let Some(class) = ident.strip_prefix("?1") {
            let _ = write!(self.out, "{class}::~{class}");
        } else {
            self.out.push_str(ident);
        }
    }

    /// Writes a space if the last character is a letter.
    fn space(&mut self) {
        if self.out.ends_with(|c: char| c.is_ascii_alphabetic()) {
            self.out.push(' ');
        }
    }
}

fn primitive(kind: Kind) -> &'static str {
    match kind {
        Kind::Void => "void",
        Kind::Bool => "bool",
        Kind::Char => "char",
        Kind::SignedChar => "signed char",
        Kind::UnsignedChar => "unsigned char",
        Kind::Short => "short",
        Kind::UnsignedShort => "unsigned short",
        Kind::Int => "int",
        Kind::UnsignedInt => "unsigned int",
        Kind::Long => "long",
        Kind::UnsignedLong => "unsigned long",
        Kind::LongLong => "long long",
        Kind::UnsignedLongLong => "unsigned long long",
        Kind::WideChar => "wchar_t",
        Kind::Float => "float",
        Kind::Double => "double",
        Kind::LongDouble => "long double",
        _ => "",
    }
}
