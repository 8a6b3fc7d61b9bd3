//! Microsoft Visual Studio symbol demangler
//!
//! ```text
//! <mangled-name> = ? <path> <type-encoding>
//!                | <identifier> // not mangled, printed as is
//!
//! <path> = {<source-name> | <backref>}* @
//!
//! <source-name> = <identifier> @
//!
//! <backref> = [0-9] // one of the first 10 source names seen
//!
//! <type-encoding> = 3 <variable-type>
//!                 | Y <calling-convention> <return-modifiers> <variable-type>
//!                     {<variable-type>}*
//!                 | <member-function> [E] <calling-convention> <storage-class>
//!                   <return-type> {<variable-type>}* Z
//!
//! <return-type> = @ // constructors and destructors
//!               | <variable-type> [@]
//!
//! <variable-type> = T <class-name>                // union
//!                 | U <class-name>                // struct
//!                 | V <class-name>                // class
//!                 | W4 <path>                     // enum
//!                 | P6A <variable-type> {<variable-type>}* [@] Z
//!                 | A [E] <storage-class> <variable-type> // reference
//!                 | P [E] <storage-class> <variable-type> // pointer
//!                 | Q [E] <storage-class> <variable-type> // const pointer
//!                 | Y <number> <number>+ [$$C <storage-class>] <variable-type>
//!                 | <primitive-type>
//!
//! <class-name> = ?$ <identifier> @ {<variable-type>}* @
//!              | <path>
//!
//! <member-function> = A // private: near
//!                   | B // private: far
//!                   | C // private: static near
//!                   | D // private: static far
//!                   | E // private: virtual near
//!                   | F // private: virtual far
//!                   | I // protected: near
//!                   | J // protected: far
//!                   | K // protected: static near
//!                   | L // protected: static far
//!                   | M // protected: virtual near
//!                   | N // protected: virtual far
//!                   | Q // public: near
//!                   | R // public: far
//!                   | S // public: static near
//!                   | T // public: static far
//!                   | U // public: virtual near
//!                   | V // public: virtual far
//!                   | Y // global near
//!                   | Z // global far
//! ```
//!
//! Parsing builds a tree of [`Node`]s in an [`Arena`], rendering happens in [`render`].
mod arena;
mod context;
mod render;
mod tests;

use crate::error::{Diagnostic, Error};
use context::{Backrefs, Context};

pub use arena::{Arena, Node, NodeId};

use bitflags::bitflags;

/// Parse a mangled symbol into its name and type tree.
pub fn parse(s: &str) -> Result<Symbol<'_>, Diagnostic> {
    let mut parser = Parser::new(s);

    match parser.symbol() {
        Ok((path, root)) => Ok(Symbol {
            path,
            root,
            arena: parser.arena,
        }),
        Err(err) => {
            log::strong!("failed to demangle '{s}': {err}");
            Err(Diagnostic::new(err, parser.ctx.src()))
        }
    }
}

/// Parse and render a mangled symbol.
pub fn demangle(s: &str) -> Result<String, Diagnostic> {
    parse(s).map(|symbol| symbol.demangle())
}

/// A successfully parsed symbol.
#[derive(Debug)]
pub struct Symbol<'a> {
    /// Innermost name first, so `ns::foo` is stored as `["foo", "ns"]`.
    path: Vec<&'a str>,
    root: NodeId,
    arena: Arena<'a>,
}

impl<'a> Symbol<'a> {
    pub fn path(&self) -> &[&'a str] {
        &self.path
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node<'a> {
        &self.arena[id]
    }

    /// Render the symbol as a declaration.
    pub fn demangle(&self) -> String {
        render::Renderer::new(&self.arena).declaration(&self.path, self.root)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Not a mangled symbol, only the name gets printed.
    Unknown,

    /// Return type of constructors and destructors.
    NoReturnType,

    Function,
    Pointer,
    Reference,
    Array,

    Struct,
    Union,
    Class,
    Enum,

    Void,
    Bool,
    Char,
    SignedChar,
    UnsignedChar,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    WideChar,
    Float,
    Double,
    LongDouble,
}

impl Kind {
    /// Whether `*` or `&` in front of this kind needs parentheses.
    #[inline]
    fn binds_tighter(self) -> bool {
        matches!(self, Kind::Function | Kind::Array)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CallingConv {
    #[default]
    Cdecl,
    Pascal,
    Thiscall,
    Stdcall,
    Fastcall,
    Regcall,
}

bitflags! {
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct StorageScope: u8 {
        const PUBLIC    = 1;
        const PROTECTED = 1 << 1;
        const PRIVATE   = 1 << 2;
        const GLOBAL    = 1 << 3;
        const STATIC    = 1 << 4;
        const VIRTUAL   = 1 << 5;
        const FAR       = 1 << 6;
    }
}

bitflags! {
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct Modifiers: u8 {
        /// const
        const CONST     = 1;

        /// volatile
        const VOLATILE  = 1 << 1;

        /// __far
        const FAR       = 1 << 2;

        /// __huge
        const HUGE      = 1 << 3;

        /// __unaligned
        const UNALIGNED = 1 << 4;

        /// restrict
        const RESTRICT  = 1 << 5;
    }
}

trait Parse: Sized {
    fn parse(ctx: &mut Context) -> Result<Self, Error>;
}

impl Parse for StorageScope {
    fn parse(ctx: &mut Context) -> Result<Self, Error> {
        let byte = ctx.take();

        Ok(match byte {
            Some(b'A') => StorageScope::PRIVATE,
            Some(b'B') => StorageScope::PRIVATE | StorageScope::FAR,
            Some(b'C' | b'D') => StorageScope::PRIVATE | StorageScope::STATIC,
            Some(b'E' | b'F') => StorageScope::PRIVATE | StorageScope::VIRTUAL,
            Some(b'I') => StorageScope::PROTECTED,
            Some(b'J') => StorageScope::PROTECTED | StorageScope::FAR,
            Some(b'K') => StorageScope::PROTECTED | StorageScope::STATIC,
            Some(b'L') => StorageScope::PROTECTED | StorageScope::STATIC | StorageScope::FAR,
            Some(b'M') => StorageScope::PROTECTED | StorageScope::VIRTUAL,
            Some(b'N') => StorageScope::PROTECTED | StorageScope::VIRTUAL | StorageScope::FAR,
            Some(b'Q') => StorageScope::PUBLIC,
            Some(b'R') => StorageScope::PUBLIC | StorageScope::FAR,
            Some(b'S') => StorageScope::PUBLIC | StorageScope::STATIC,
            Some(b'T') => StorageScope::PUBLIC | StorageScope::STATIC | StorageScope::FAR,
            Some(b'U') => StorageScope::PUBLIC | StorageScope::VIRTUAL,
            Some(b'V') => StorageScope::PUBLIC | StorageScope::VIRTUAL | StorageScope::FAR,
            Some(b'Y') => StorageScope::GLOBAL,
            Some(b'Z') => StorageScope::GLOBAL | StorageScope::FAR,
            _ => {
                ctx.push_back(byte);
                return Err(Error::UnknownFunctionClass);
            }
        })
    }
}

impl Parse for CallingConv {
    fn parse(ctx: &mut Context) -> Result<Self, Error> {
        let byte = ctx.take();

        Ok(match byte {
            Some(b'A') => CallingConv::Cdecl,
            Some(b'C') => CallingConv::Pascal,
            Some(b'E') => CallingConv::Thiscall,
            Some(b'G') => CallingConv::Stdcall,
            Some(b'I') => CallingConv::Fastcall,
            _ => {
                ctx.push_back(byte);
                return Err(Error::UnknownCallingConvention);
            }
        })
    }
}

/// Storage class of a pointee or a function's return value.
///
/// Unknown bytes aren't consumed and mean no storage class.
impl Parse for Modifiers {
    fn parse(ctx: &mut Context) -> Result<Self, Error> {
        let byte = ctx.take();

        Ok(match byte {
            Some(b'A') => Modifiers::empty(),
            Some(b'B') => Modifiers::CONST,
            Some(b'C') => Modifiers::VOLATILE,
            Some(b'D') => Modifiers::CONST | Modifiers::VOLATILE,
            Some(b'E') => Modifiers::FAR,
            Some(b'F') => Modifiers::CONST | Modifiers::FAR,
            Some(b'G') => Modifiers::VOLATILE | Modifiers::FAR,
            Some(b'H') => Modifiers::CONST | Modifiers::VOLATILE | Modifiers::FAR,
            _ => {
                ctx.push_back(byte);
                Modifiers::empty()
            }
        })
    }
}

/// Storage class of a free function's return value.
struct ReturnModifiers(Modifiers);

impl Parse for ReturnModifiers {
    fn parse(ctx: &mut Context) -> Result<Self, Error> {
        let modi = if ctx.consume("?A") {
            Modifiers::empty()
        } else if ctx.consume("?B") {
            Modifiers::CONST
        } else if ctx.consume("?C") {
            Modifiers::VOLATILE
        } else if ctx.consume("?D") {
            Modifiers::CONST | Modifiers::VOLATILE
        } else {
            Modifiers::empty()
        };

        Ok(ReturnModifiers(modi))
    }
}

struct Parser<'a> {
    ctx: Context<'a>,
    backrefs: Backrefs<'a>,
    arena: Arena<'a>,
}

impl<'a> Parser<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            ctx: Context::new(s),
            backrefs: Backrefs::default(),
            arena: Arena::new(),
        }
    }

    fn symbol(&mut self) -> Result<(Vec<&'a str>, NodeId), Error> {
        if !self.ctx.consume("?") {
            log::trace!("'{}' isn't mangled", self.ctx.src());
            let root = self.arena.alloc(Kind::Unknown);
            return Ok((vec![self.ctx.take_rest()], root));
        }

        let path = self.path()?;

        if self.ctx.consume("3") {
            log::trace!("parsing variable {path:?}");
            let root = self.arena.alloc(Kind::Unknown);
            self.var_type(root)?;
            return Ok((path, root));
        }

        if self.ctx.consume("Y") {
            log::trace!("parsing function {path:?}");
            let root = self.function()?;
            return Ok((path, root));
        }

        log::trace!("parsing member function {path:?}");
        let root = self.member_function()?;
        Ok((path, root))
    }

    /// Parses a name in the form of `A@B@C@@` which represents `C::B::A`.
    fn path(&mut self) -> Result<Vec<&'a str>, Error> {
        let mut path = Vec::new();

        while !self.ctx.consume("@") {
            if let Some(digit @ b'0'..=b'9') = self.ctx.peek() {
                let ident = self.backrefs.get_memorized_ident((digit - b'0') as usize)?;
                self.ctx.take();
                path.push(ident);
                continue;
            }

            let ident = self.ctx.ident()?;
            self.backrefs.try_memorizing_ident(ident);
            path.push(ident);
        }

        Ok(path)
    }

    fn function(&mut self) -> Result<NodeId, Error> {
        let root = self.arena.alloc(Kind::Function);
        self.arena[root].calling_conv = CallingConv::parse(&mut self.ctx)?;

        let ret = self.arena.alloc(Kind::Unknown);
        self.arena[root].inner = Some(ret);
        self.arena[ret].modifiers = ReturnModifiers::parse(&mut self.ctx)?.0;
        self.var_type(ret)?;

        while !self.ctx.is_empty() && !self.ctx.starts_with("@") && !self.ctx.starts_with("Z") {
            let param = self.arena.alloc(Kind::Unknown);
            self.var_type(param)?;
            self.arena[root].params.push(param);
        }

        Ok(root)
    }

    fn member_function(&mut self) -> Result<NodeId, Error> {
        let root = self.arena.alloc(Kind::Function);
        self.arena[root].storage_scope = StorageScope::parse(&mut self.ctx)?;

        // 64-bit 'this' pointer
        self.ctx.consume("E");

        self.arena[root].calling_conv = CallingConv::parse(&mut self.ctx)?;

        let ret = self.arena.alloc(Kind::Unknown);
        self.arena[root].inner = Some(ret);
        self.arena[ret].modifiers = Modifiers::parse(&mut self.ctx)?;
        self.return_type(ret)?;

        loop {
            if self.ctx.starts_with("Z") || self.ctx.starts_with("@Z") {
                break;
            }

            if self.ctx.is_empty() {
                return Err(Error::UnterminatedParameterList);
            }

            let param = self.arena.alloc(Kind::Unknown);
            self.var_type(param)?;
            self.arena[root].params.push(param);
        }

        Ok(root)
    }

    fn return_type(&mut self, id: NodeId) -> Result<(), Error> {
        if self.ctx.consume("@") {
            self.arena[id].kind = Kind::NoReturnType;
            return Ok(());
        }

        self.var_type(id)?;
        self.ctx.consume("@");
        Ok(())
    }

    fn var_type(&mut self, id: NodeId) -> Result<(), Error> {
        self.ctx.descent()?;
        let result = self.var_type_inner(id);
        self.ctx.ascent();
        result
    }

    fn var_type_inner(&mut self, id: NodeId) -> Result<(), Error> {
        if self.ctx.consume("T") {
            return self.class(id, Kind::Union);
        }

        if self.ctx.consume("U") {
            return self.class(id, Kind::Struct);
        }

        if self.ctx.consume("V") {
            return self.class(id, Kind::Class);
        }

        if self.ctx.consume("W4") {
            self.arena[id].kind = Kind::Enum;
            self.arena[id].name = self.path()?;
            return Ok(());
        }

        if self.ctx.consume("P6A") {
            return self.function_ptr(id);
        }

        if self.ctx.consume("A") {
            return self.pointer(id, Kind::Reference, Modifiers::empty());
        }

        if self.ctx.consume("P") {
            return self.pointer(id, Kind::Pointer, Modifiers::empty());
        }

        if self.ctx.consume("Q") {
            return self.pointer(id, Kind::Pointer, Modifiers::CONST);
        }

        if self.ctx.consume("Y") {
            return self.array(id);
        }

        self.arena[id].kind = self.primitive()?;
        Ok(())
    }

    fn class(&mut self, id: NodeId, kind: Kind) -> Result<(), Error> {
        self.arena[id].kind = kind;

        if !self.ctx.consume("?$") {
            self.arena[id].name = self.path()?;
            return Ok(());
        }

        let name = self.ctx.ident()?;
        self.arena[id].name.push(name);

        while !self.ctx.consume("@") {
            if self.ctx.is_empty() {
                return Err(Error::UnterminatedParameterList);
            }

            let param = self.arena.alloc(Kind::Unknown);
            self.var_type(param)?;
            self.arena[id].params.push(param);
        }

        Ok(())
    }

    fn function_ptr(&mut self, id: NodeId) -> Result<(), Error> {
        let func = self.arena.alloc(Kind::Function);
        let ret = self.arena.alloc(Kind::Unknown);

        self.arena[id].kind = Kind::Pointer;
        self.arena[id].inner = Some(func);
        self.arena[func].inner = Some(ret);

        self.var_type(ret)?;

        while !self.ctx.consume("@Z") && !self.ctx.consume("Z") {
            if self.ctx.is_empty() {
                return Err(Error::UnterminatedParameterList);
            }

            let param = self.arena.alloc(Kind::Unknown);
            self.var_type(param)?;
            self.arena[func].params.push(param);
        }

        Ok(())
    }

    fn pointer(&mut self, id: NodeId, kind: Kind, modifiers: Modifiers) -> Result<(), Error> {
        // keep the qualifiers an enclosing pointer or return type already read
        self.arena[id].kind = kind;
        self.arena[id].modifiers |= modifiers;

        // 64-bit pointer
        self.ctx.consume("E");

        let pointee = self.arena.alloc(Kind::Unknown);
        self.arena[id].inner = Some(pointee);
        self.arena[pointee].modifiers = Modifiers::parse(&mut self.ctx)?;
        self.var_type(pointee)
    }

    fn array(&mut self, id: NodeId) -> Result<(), Error> {
        let dimension = self.ctx.number()?;

        if dimension <= 0 {
            return Err(Error::InvalidArrayDimension(dimension));
        }

        // each dimension nests one level deeper when rendered
        let mut levels = 0;
        let result = self.array_dimensions(id, dimension, &mut levels);

        for _ in 0..levels {
            self.ctx.ascent();
        }

        result
    }

    fn array_dimensions(
        &mut self,
        id: NodeId,
        dimension: i32,
        levels: &mut usize,
    ) -> Result<(), Error> {
        let mut elem = id;
        for _ in 0..dimension {
            *levels += 1;
            self.ctx.descent()?;

            let len = self.ctx.number()?;
            let next = self.arena.alloc(Kind::Unknown);

            self.arena[elem].kind = Kind::Array;
            self.arena[elem].len = len;
            self.arena[elem].inner = Some(next);
            elem = next;
        }

        if self.ctx.consume("$$C") {
            if self.ctx.consume("B") {
                self.arena[id].modifiers = Modifiers::CONST;
            } else if self.ctx.consume("C") || self.ctx.consume("D") {
                self.arena[id].modifiers = Modifiers::CONST | Modifiers::VOLATILE;
            } else if !self.ctx.consume("A") {
                return Err(Error::UnknownStorageClass);
            }
        }

        self.var_type(elem)
    }

    fn primitive(&mut self) -> Result<Kind, Error> {
        let byte = self.ctx.take();

        Ok(match byte {
            Some(b'X') => Kind::Void,
            Some(b'D') => Kind::Char,
            Some(b'C') => Kind::SignedChar,
            Some(b'E') => Kind::UnsignedChar,
            Some(b'F') => Kind::Short,
            Some(b'G') => Kind::UnsignedShort,
            Some(b'H') => Kind::Int,
            Some(b'I') => Kind::UnsignedInt,
            Some(b'J') => Kind::Long,
            Some(b'K') => Kind::UnsignedLong,
            Some(b'M') => Kind::Float,
            Some(b'N') => Kind::Double,
            Some(b'O') => Kind::LongDouble,
            _ => {
                self.ctx.push_back(byte);

                if self.ctx.consume("_N") {
                    Kind::Bool
                } else if self.ctx.consume("_J") {
                    Kind::LongLong
                } else if self.ctx.consume("_K") {
                    Kind::UnsignedLongLong
                } else if self.ctx.consume("_W") {
                    Kind::WideChar
                } else {
                    return Err(Error::UnknownPrimitiveType);
                }
            }
        })
    }
}
