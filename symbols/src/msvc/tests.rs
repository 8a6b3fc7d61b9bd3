#![cfg(test)]

use super::*;

macro_rules! eq {
    ($mangled:literal => $demangled:literal) => {
        let symbol = demangle($mangled)
            .unwrap_or_else(|err| panic!("Formatting '{}' failed: {err}.", $mangled));

        assert_eq!(symbol, $demangled)
    };
}

macro_rules! fails {
    ($mangled:literal => $err:expr) => {
        let diag = demangle($mangled).expect_err(&format!("'{}' shouldn't demangle.", $mangled));

        assert_eq!(diag.error, $err);
        assert!(!diag.to_string().is_empty());
    };
}

#[test]
fn simple() {
    let tree = parse("?foo@@YAHH@Z").unwrap();
    assert_eq!(tree.path(), ["foo"]);

    let root = tree.node(tree.root());
    assert_eq!(root.kind, Kind::Function);
    assert_eq!(root.calling_conv, CallingConv::Cdecl);
    assert_eq!(root.params.len(), 1);

    let ret = tree.node(root.inner.unwrap());
    assert_eq!(ret.kind, Kind::Int);
    assert_eq!(ret.modifiers, Modifiers::empty());
    assert_eq!(tree.node(root.params[0]).kind, Kind::Int);

    eq!("?foo@@YAHH@Z" => "int foo(int)");
}

#[test]
fn function_params() {
    eq!("?x@@YAXMH@Z" => "void x(float,int)");
    eq!("?x@@YAXXZ" => "void x(void)");
    eq!("?x@@YA_NDEF@Z" => "bool x(char,unsigned char,short)");
    eq!("?x@@YAHH" => "int x(int)");
}

#[test]
fn calling_conventions() {
    for (mangled, conv) in [
        ("?f@@YAHXZ", CallingConv::Cdecl),
        ("?f@@YCHXZ", CallingConv::Pascal),
        ("?f@@YEHXZ", CallingConv::Thiscall),
        ("?f@@YGHXZ", CallingConv::Stdcall),
        ("?f@@YIHXZ", CallingConv::Fastcall),
    ] {
        let tree = parse(mangled).unwrap();
        assert_eq!(tree.node(tree.root()).calling_conv, conv);
        assert_eq!(tree.demangle(), "int f(void)");
    }
}

#[test]
fn return_modifiers() {
    eq!("?f@@YA?BHH@Z" => "int const f(int)");
    eq!("?f@@YA?AHH@Z" => "int f(int)");
    eq!("?f@@YA?BPAHXZ" => "int*const f(void)");

    let tree = parse("?f@@YA?CHH@Z").unwrap();
    let ret = tree.node(tree.root()).inner.unwrap();
    assert_eq!(tree.node(ret).modifiers, Modifiers::VOLATILE);
}

#[test]
fn primitives() {
    eq!("?x@@3XA" => "void x");
    eq!("?x@@3DA" => "char x");
    eq!("?x@@3CA" => "signed char x");
    eq!("?x@@3EA" => "unsigned char x");
    eq!("?x@@3FA" => "short x");
    eq!("?x@@3GA" => "unsigned short x");
    eq!("?x@@3HA" => "int x");
    eq!("?x@@3IA" => "unsigned int x");
    eq!("?x@@3JA" => "long x");
    eq!("?x@@3KA" => "unsigned long x");
    eq!("?x@@3MA" => "float x");
    eq!("?x@@3NA" => "double x");
    eq!("?x@@3OA" => "long double x");
    eq!("?x@@3_NA" => "bool x");
    eq!("?x@@3_JA" => "long long x");
    eq!("?x@@3_KA" => "unsigned long long x");
    eq!("?x@@3_WA" => "wchar_t x");
}

#[test]
fn pointers() {
    eq!("?x@@3PAHA" => "int*x");
    eq!("?x@@3PEAHEA" => "int*x");
    eq!("?x@@3PBHA" => "int const*x");
    eq!("?x@@3QAHA" => "int*const x");
    eq!("?x@@3QBHA" => "int const*const x");
    eq!("?x@@3PAPAHA" => "int**x");
    eq!("?x@@3PBPAHA" => "int*const*x");
    eq!("?x@@3PAQAHA" => "int*const*x");
    eq!("?x@@3PBPBHA" => "int const*const*x");
}

#[test]
fn nested_pointer_keeps_storage_class() {
    let tree = parse("?x@@3PBPAHA").unwrap();
    let inner = tree.node(tree.root()).inner.unwrap();

    assert_eq!(tree.node(inner).kind, Kind::Pointer);
    assert_eq!(tree.node(inner).modifiers, Modifiers::CONST);
}

#[test]
fn references() {
    eq!("?r@@3AAHA" => "int&r");
    eq!("?r@@3AEBHA" => "int const&r");
    eq!("?f@@YAXAAN@Z" => "void f(double&)");
    eq!("?r@@3AAPBHA" => "int const*&r");
    eq!("?r@@3ABPAHA" => "int*const&r");
}

#[test]
fn unknown_storage_class_is_left_alone() {
    // 'M' isn't a storage class, so it's read as the pointee
    let tree = parse("?x@@3PMA").unwrap();
    let pointee = tree.node(tree.root()).inner.unwrap();

    assert_eq!(tree.node(pointee).kind, Kind::Float);
    assert_eq!(tree.node(pointee).modifiers, Modifiers::empty());
    assert_eq!(tree.demangle(), "float*x");
}

#[test]
fn function_pointers() {
    eq!("?fp@@3P6AHH@ZA" => "int(*fp)(int)");
    eq!("?f@@YAXP6AHH@Z@Z" => "void f(int(*)(int))");
    eq!("?fp@@3P6AXXZA" => "void(*fp)(void)");
    eq!("?fp@@3P6APAHMN@ZA" => "int*(*fp)(float,double)");
}

#[test]
fn function_pointer_tree() {
    let tree = parse("?fp@@3P6AHH@ZA").unwrap();

    let ptr = tree.node(tree.root());
    assert_eq!(ptr.kind, Kind::Pointer);

    let func = tree.node(ptr.inner.unwrap());
    assert_eq!(func.kind, Kind::Function);
    assert_eq!(tree.node(func.inner.unwrap()).kind, Kind::Int);
    assert_eq!(func.params.len(), 1);
}

#[test]
fn arrays() {
    eq!("?a@@3Y01HA" => "int a[2]");
    eq!("?a@@3Y112HA" => "int a[2][3]");
    eq!("?a@@3Y0BA@DA" => "char a[16]");
    eq!("?a@@3PAY02HA" => "int(*a)[3]");
    eq!("?a@@3AAY02HA" => "int(&a)[3]");
}

#[test]
fn array_storage_class() {
    eq!("?a@@3Y01$$CBHA" => "int const a[2]");
    eq!("?a@@3Y01$$CAHA" => "int a[2]");

    for mangled in ["?a@@3Y01$$CCHA", "?a@@3Y01$$CDHA"] {
        let tree = parse(mangled).unwrap();
        assert_eq!(
            tree.node(tree.root()).modifiers,
            Modifiers::CONST | Modifiers::VOLATILE
        );
    }
}

#[test]
fn array_tree() {
    let tree = parse("?a@@3Y112HA").unwrap();

    let outer = tree.node(tree.root());
    assert_eq!((outer.kind, outer.len), (Kind::Array, 2));

    let inner = tree.node(outer.inner.unwrap());
    assert_eq!((inner.kind, inner.len), (Kind::Array, 3));
    assert_eq!(tree.node(inner.inner.unwrap()).kind, Kind::Int);
}

#[test]
fn tags() {
    eq!("?s@@3Ufoo@@A" => "struct foo s");
    eq!("?u@@3Tfoo@@A" => "union foo u");
    eq!("?c@@3Vbar@ns@@A" => "class ns::bar c");
    eq!("?e@@3W4Color@@A" => "enum Color e");
    eq!("?f@@YAXPAUfoo@@@Z" => "void f(struct foo*)");
}

#[test]
fn templates() {
    eq!("?v@@3V?$vec@H@A" => "class vec<int>v");
    eq!("?v@@3V?$pair@HN@A" => "class pair<int,double>v");
    eq!("?v@@3U?$box@PAH@A" => "struct box<int*>v");
}

#[test]
fn nested_names() {
    eq!("?x@b@a@@3HA" => "int a::b::x");

    let tree = parse("?x@b@a@@3HA").unwrap();
    assert_eq!(tree.path(), ["x", "b", "a"]);
}

#[test]
fn backrefs() {
    eq!("?c@ns@@3Vbar@1@A" => "class ns::bar ns::c");
    eq!("?y@x@@3Vx@1@A" => "class x::x x::y");
    eq!("?x@@3Vfoo@0@A" => "class x::foo x");
}

#[test]
fn backrefs_stop_after_ten() {
    eq!("?a@b@c@d@e@f@g@h@i@j@@3Vk@9@A" => "class j::k j::i::h::g::f::e::d::c::b::a");

    // 'k' didn't fit in the table, so 9 still refers to 'j'
    eq!("?a@b@c@d@e@f@g@h@i@j@k@@3V9@A" => "class j k::j::i::h::g::f::e::d::c::b::a");
}

#[test]
fn dangling_backrefs() {
    fails!("?a@b@@3V5@A" => Error::DanglingReference);
    fails!("?0@@3HA" => Error::DanglingReference);

    let diag = demangle("?a@b@@3V5@A").unwrap_err();
    assert_eq!(diag.rest, "5@A");
}

#[test]
fn constructor() {
    eq!("??0Foo@@QAE@XZ" => "Foo::Foo(void)");
    eq!("??0klass@@QEAA@XZ" => "klass::klass(void)");

    let tree = parse("??0Foo@@QAE@XZ").unwrap();
    let root = tree.node(tree.root());
    assert_eq!(root.storage_scope, StorageScope::PUBLIC);
    assert_eq!(root.calling_conv, CallingConv::Cdecl);
    assert_eq!(tree.node(root.inner.unwrap()).kind, Kind::NoReturnType);
}

#[test]
fn destructor() {
    eq!("??1Foo@@QAE@XZ" => "Foo::~Foo(void)");
    eq!("??1klass@@QEAA@XZ" => "klass::~klass(void)");
}

#[test]
fn structors_in_namespace() {
    eq!("??0Foo@ns@@QAE@XZ" => "ns::Foo::Foo(void)");
    eq!("??1Foo@ns@@UAE@XZ" => "ns::Foo::~Foo(void)");
}

#[test]
fn member_functions() {
    eq!("?bar@Foo@@QAEHXZ" => "int Foo::bar(void)");
    eq!("?bar@Foo@@QAEHH@Z" => "int Foo::bar(int)");
    eq!("?bar@Foo@@AAEXPAH_N@Z" => "void Foo::bar(int*,bool)");
}

#[test]
fn function_classes() {
    for (byte, scope) in [
        ('A', StorageScope::PRIVATE),
        ('B', StorageScope::PRIVATE | StorageScope::FAR),
        ('C', StorageScope::PRIVATE | StorageScope::STATIC),
        ('D', StorageScope::PRIVATE | StorageScope::STATIC),
        ('E', StorageScope::PRIVATE | StorageScope::VIRTUAL),
        ('F', StorageScope::PRIVATE | StorageScope::VIRTUAL),
        ('I', StorageScope::PROTECTED),
        ('J', StorageScope::PROTECTED | StorageScope::FAR),
        ('K', StorageScope::PROTECTED | StorageScope::STATIC),
        ('L', StorageScope::PROTECTED | StorageScope::STATIC | StorageScope::FAR),
        ('M', StorageScope::PROTECTED | StorageScope::VIRTUAL),
        ('N', StorageScope::PROTECTED | StorageScope::VIRTUAL | StorageScope::FAR),
        ('Q', StorageScope::PUBLIC),
        ('R', StorageScope::PUBLIC | StorageScope::FAR),
        ('S', StorageScope::PUBLIC | StorageScope::STATIC),
        ('T', StorageScope::PUBLIC | StorageScope::STATIC | StorageScope::FAR),
        ('U', StorageScope::PUBLIC | StorageScope::VIRTUAL),
        ('V', StorageScope::PUBLIC | StorageScope::VIRTUAL | StorageScope::FAR),
        ('Y', StorageScope::GLOBAL),
        ('Z', StorageScope::GLOBAL | StorageScope::FAR),
    ] {
        let mangled = format!("?bar@Foo@@{byte}AAHXZ");
        let tree = parse(&mangled).unwrap();

        assert_eq!(tree.node(tree.root()).storage_scope, scope, "{mangled}");
        assert_eq!(tree.demangle(), "int Foo::bar(void)");
    }
}

#[test]
fn plain_identifiers() {
    eq!("main" => "main");
    eq!("_start" => "_start");

    let tree = parse("main").unwrap();
    assert_eq!(tree.path(), ["main"]);
    assert_eq!(tree.node(tree.root()).kind, Kind::Unknown);
}

#[test]
fn unterminated_names() {
    fails!("?foo" => Error::UnterminatedString);
    fails!("?foo@" => Error::UnterminatedString);
    fails!("?x@@3Ufoo" => Error::UnterminatedString);
}

#[test]
fn bad_numbers() {
    fails!("?a@@3YAB" => Error::BadNumber);
    fails!("?a@@3Y0" => Error::BadNumber);
}

#[test]
fn invalid_array_dimensions() {
    fails!("?a@@3YA@HA" => Error::InvalidArrayDimension(0));
    fails!("?a@@3Y?0HA" => Error::InvalidArrayDimension(-1));
}

#[test]
fn unknown_array_storage_class() {
    fails!("?a@@3Y01$$CZHA" => Error::UnknownStorageClass);
}

#[test]
fn unknown_function_class() {
    fails!("?f@@0AEXZ" => Error::UnknownFunctionClass);
    fails!("?f@@" => Error::UnknownFunctionClass);

    let diag = demangle("?f@@0AEXZ").unwrap_err();
    assert_eq!(diag.rest, "0AEXZ");
}

#[test]
fn unknown_calling_convention() {
    fails!("?f@@YBHH@Z" => Error::UnknownCallingConvention);
    fails!("?bar@Foo@@QBHXZ" => Error::UnknownCallingConvention);

    let diag = demangle("?f@@YBHH@Z").unwrap_err();
    assert_eq!(diag.rest, "BHH@Z");
    assert_eq!(diag.to_string(), "unknown calling convention: BHH@Z");
}

#[test]
fn unknown_primitive_type() {
    fails!("?x@@3LA" => Error::UnknownPrimitiveType);
    fails!("?x@@3_XA" => Error::UnknownPrimitiveType);
    fails!("?x@@3" => Error::UnknownPrimitiveType);
}

#[test]
fn unterminated_parameter_lists() {
    fails!("?bar@Foo@@QAEHX" => Error::UnterminatedParameterList);
    fails!("?fp@@3P6AHH" => Error::UnterminatedParameterList);
    fails!("?v@@3V?$vec@H" => Error::UnterminatedParameterList);
}

#[test]
fn first_error_wins() {
    // the unknown primitive stops the parameter list before the bad number is reached
    fails!("?f@@YAXLY0" => Error::UnknownPrimitiveType);

    let diag = demangle("?f@@YAXLY0").unwrap_err();
    assert_eq!(diag.rest, "LY0");
}

#[test]
fn recursion_limit() {
    let mangled = format!("?x@@3{}HA", "PA".repeat(300));
    let diag = demangle(&mangled).unwrap_err();

    assert_eq!(diag.error, Error::RecursionLimit);
}

#[test]
fn deep_but_bounded() {
    let mangled = format!("?x@@3{}HA", "PA".repeat(100));
    let demangled = demangle(&mangled).unwrap();

    assert_eq!(demangled, format!("int{}x", "*".repeat(100)));
}

#[test]
fn array_dimensions_count_towards_recursion_limit() {
    // 300 dimensions
    let mangled = format!("?x@@3YBCM@{}HA", "0".repeat(300));
    assert_eq!(demangle(&mangled).unwrap_err().error, Error::RecursionLimit);

    // 130000 dimensions
    let mangled = format!("?x@@3YBPLNA@{}HA", "0".repeat(130_000));
    assert_eq!(demangle(&mangled).unwrap_err().error, Error::RecursionLimit);
}

#[test]
fn many_array_dimensions() {
    // 200 dimensions
    let mangled = format!("?x@@3YMI@{}HA", "0".repeat(200));
    let demangled = demangle(&mangled).unwrap();

    assert_eq!(demangled, format!("int x{}", "[1]".repeat(200)));
}

#[test]
fn idempotent() {
    for mangled in ["?foo@@YAHH@Z", "??1Foo@@QAE@XZ", "?c@ns@@3Vbar@1@A", "?foo", "?x@@3LA"] {
        let first = demangle(mangled);
        let second = demangle(mangled);

        assert_eq!(first, second);
    }
}

#[test]
fn threads_dont_share_state() {
    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| demangle("?c@ns@@3Vbar@1@A")))
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Ok("class ns::bar ns::c"));
    }
}
