//! The `function!` macro builds a `dualgrad::Function` from a closure.
//!
//! ```ignore
//! let f = function!(|x, y| [x * 1.5 + x * y, x ^ y]);
//! ```
//!
//! The closure body must be a single expression, either one output or a bracketed list
//! of outputs, built from the parameters, numeric literals, `+ - * / ^` and calls to
//! elementary functions (`sin(x)` or `ef::sin(x)`, with a single module alias).
//! Every output becomes an independent expression, so reverse mode can evaluate it
//! on a graph of its own.
//!
//! `a ^ b` is power, as are `a.pow(b)` and `a.powf(b)`; no other method is accepted.
//! `^` binds looser than `+` and `*`, as in any Rust expression, so write `1 + (x ^ 2)`.

use std::collections::BTreeSet;

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{quote, ToTokens};
use syn::{
    parse_macro_input, spanned::Spanned, BinOp, Expr, ExprClosure, Ident, Lit, LitFloat, Pat,
    Stmt, UnOp,
};

const ELEMENTARY: [&str; 14] = [
    "sin", "cos", "tan", "exp", "sqrt", "log", "logb", "arcsin", "arccos", "arctan", "sinh",
    "cosh", "tanh", "logistic",
];

#[proc_macro]
pub fn function(input: TokenStream) -> TokenStream {
    let closure = parse_macro_input!(input as ExprClosure);
    match expand(&closure) {
        Ok(ts) => TokenStream::from(ts),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}

fn parse_error(span: Span, message: impl std::fmt::Display) -> syn::Error {
    syn::Error::new(span, format!("multi-output parse failure: {message}"))
}

/// A translated sub-expression. Constant ones do not depend on any parameter
/// and stay plain `f64` arithmetic.
struct Term {
    tokens: TokenStream2,
    constant: bool,
}

struct Context {
    params: Vec<Ident>,
    aliases: BTreeSet<String>,
}

fn expand(closure: &ExprClosure) -> syn::Result<TokenStream2> {
    let params = closure
        .inputs
        .iter()
        .map(param_name)
        .collect::<syn::Result<Vec<_>>>()?;

    let body = single_expr(&closure.body)?;
    let (outputs, scalar) = match body {
        Expr::Array(array) => (array.elems.iter().collect::<Vec<_>>(), false),
        ex => (vec![ex], true),
    };
    if outputs.is_empty() {
        return Err(parse_error(body.span(), "the output list is empty"));
    }

    let mut ctx = Context {
        params,
        aliases: BTreeSet::new(),
    };
    let mut terms = vec![];
    for (i, output) in outputs.iter().enumerate() {
        let term = traverse_expr(output, &mut ctx)?;
        if term.constant {
            return Err(parse_error(
                output.span(),
                format!("output #{i} does not depend on any parameter"),
            ));
        }
        terms.push(term.tokens);
    }
    if ctx.aliases.len() > 1 {
        let aliases: Vec<_> = ctx.aliases.into_iter().collect();
        return Err(parse_error(
            closure.body.span(),
            format!(
                "elementary functions are referenced through more than one alias: {}",
                aliases.join(", ")
            ),
        ));
    }

    let arity = ctx.params.len();
    let params = &ctx.params;
    let indices = 0..arity;
    let bindings = quote! {
        #(let #params: T = __args[#indices];)*
    };
    let eval = if scalar {
        quote! { ::dualgrad::Output::Scalar(#(#terms)*) }
    } else {
        quote! { ::dualgrad::Output::Vector(vec![#(#terms),*]) }
    };
    let output_indices = 0..terms.len();

    Ok(quote! {
        {
            struct __DualgradFunction;

            impl ::dualgrad::Function for __DualgradFunction {
                fn arity(&self) -> usize {
                    #arity
                }

                #[allow(unused_variables, unused_parens, unused_imports)]
                fn eval<T: ::dualgrad::Number>(&self, __args: &[T]) -> ::dualgrad::Output<T> {
                    use ::dualgrad::Number as _;
                    #bindings
                    #eval
                }

                #[allow(unused_variables, unused_parens, unused_imports)]
                fn eval_output<T: ::dualgrad::Number>(
                    &self,
                    __index: usize,
                    __args: &[T],
                ) -> ::std::option::Option<T> {
                    use ::dualgrad::Number as _;
                    #bindings
                    match __index {
                        #(#output_indices => ::std::option::Option::Some(#terms),)*
                        _ => ::std::option::Option::None,
                    }
                }
            }

            __DualgradFunction
        }
    })
}

fn param_name(pat: &Pat) -> syn::Result<Ident> {
    match pat {
        Pat::Ident(id) => Ok(id.ident.clone()),
        Pat::Type(ty) => param_name(&ty.pat),
        _ => Err(parse_error(pat.span(), "parameters must be plain identifiers")),
    }
}

/// The closure body may be a bare expression or a block holding only a tail expression.
fn single_expr(body: &Expr) -> syn::Result<&Expr> {
    match body {
        Expr::Block(block) => match block.block.stmts.as_slice() {
            [Stmt::Expr(ex, None)] | [Stmt::Expr(ex @ Expr::Return(_), Some(_))] => {
                single_expr(ex)
            }
            _ => Err(parse_error(
                block.span(),
                "the body must be a single expression returning the outputs, \
                without intermediate variables",
            )),
        },
        Expr::Paren(ex) => single_expr(&ex.expr),
        Expr::Return(ret) => match &ret.expr {
            Some(ex) => single_expr(ex),
            None => Err(parse_error(ret.span(), "nothing is returned")),
        },
        ex => Ok(ex),
    }
}

fn traverse_expr(input: &Expr, ctx: &mut Context) -> syn::Result<Term> {
    match input {
        Expr::Binary(ex) => {
            let lhs = traverse_expr(&ex.left, ctx)?;
            let rhs = traverse_expr(&ex.right, ctx)?;
            binary(&ex.op, lhs, rhs, ex.span())
        }
        Expr::Paren(ex) => {
            let inner = traverse_expr(&ex.expr, ctx)?;
            let tokens = inner.tokens;
            Ok(Term {
                tokens: quote! { (#tokens) },
                constant: inner.constant,
            })
        }
        Expr::Unary(ex) if matches!(ex.op, UnOp::Neg(_)) => {
            let inner = traverse_expr(&ex.expr, ctx)?;
            let tokens = inner.tokens;
            Ok(Term {
                tokens: quote! { (-#tokens) },
                constant: inner.constant,
            })
        }
        Expr::Lit(lit) => match &lit.lit {
            Lit::Float(_) => Ok(Term {
                tokens: lit.to_token_stream(),
                constant: true,
            }),
            Lit::Int(int) => {
                let float = LitFloat::new(&format!("{}.0", int.base10_digits()), int.span());
                Ok(Term {
                    tokens: float.to_token_stream(),
                    constant: true,
                })
            }
            _ => Err(parse_error(lit.span(), "only numeric literals are supported")),
        },
        Expr::Path(path) => {
            let constant = !path
                .path
                .get_ident()
                .map_or(false, |id| ctx.params.contains(id));
            Ok(Term {
                tokens: path.to_token_stream(),
                constant,
            })
        }
        Expr::Call(call) => {
            let Expr::Path(func) = &*call.func else {
                return Err(parse_error(call.func.span(), "only elementary functions can be called"));
            };
            let segments = &func.path.segments;
            let Some(last) = segments.last() else {
                return Err(parse_error(func.span(), "empty function path"));
            };
            let name = last.ident.to_string();
            if !ELEMENTARY.contains(&name.as_str()) {
                return Err(parse_error(
                    last.ident.span(),
                    format!("`{name}` is not an elementary function"),
                ));
            }
            if segments.len() > 1 {
                let alias = segments
                    .iter()
                    .take(segments.len() - 1)
                    .map(|seg| seg.ident.to_string())
                    .collect::<Vec<_>>()
                    .join("::");
                ctx.aliases.insert(alias);
            }

            let expected = if name == "logb" { 2 } else { 1 };
            if call.args.len() != expected {
                return Err(parse_error(
                    call.span(),
                    format!("`{name}` takes {expected} argument(s)"),
                ));
            }
            let args = call
                .args
                .iter()
                .map(|arg| traverse_expr(arg, ctx))
                .collect::<syn::Result<Vec<_>>>()?;
            if name == "logb" && !args[1].constant {
                return Err(parse_error(call.args[1].span(), "the base of `logb` must be a constant"));
            }
            let constant = args[0].constant;
            let tokens = args.into_iter().map(|arg| arg.tokens);
            let func = Ident::new(&name, last.ident.span());
            Ok(Term {
                tokens: quote! { ::dualgrad::elem::#func(#(#tokens),*) },
                constant,
            })
        }
        Expr::MethodCall(call) => {
            if call.method != "pow" && call.method != "powf" {
                return Err(parse_error(
                    call.method.span(),
                    format!("method `{}` is not supported; only `pow` and `powf` are", call.method),
                ));
            }
            if call.args.len() != 1 {
                return Err(parse_error(
                    call.span(),
                    format!("`{}` takes 1 argument(s)", call.method),
                ));
            }
            let base = traverse_expr(&call.receiver, ctx)?;
            let exp = traverse_expr(&call.args[0], ctx)?;
            Ok(power(base, exp))
        }
        _ => Err(parse_error(
            input.span(),
            "unsupported expression; use parameters, literals, arithmetic and elementary functions",
        )),
    }
}

fn binary(op: &BinOp, lhs: Term, rhs: Term, span: Span) -> syn::Result<Term> {
    if let BinOp::BitXor(_) = op {
        return Ok(power(lhs, rhs));
    }
    let constant = lhs.constant && rhs.constant;
    let (l, r) = (lhs.tokens, rhs.tokens);
    let tokens = match (op, lhs.constant, rhs.constant) {
        (BinOp::Add(_), true, false) => quote! { ::dualgrad::Number::radd(#r, #l) },
        (BinOp::Sub(_), true, false) => quote! { ::dualgrad::Number::rsub(#r, #l) },
        (BinOp::Mul(_), true, false) => quote! { ::dualgrad::Number::rmul(#r, #l) },
        (BinOp::Div(_), true, false) => quote! { ::dualgrad::Number::rdiv(#r, #l) },
        (BinOp::Add(_), ..) => quote! { (#l + #r) },
        (BinOp::Sub(_), ..) => quote! { (#l - #r) },
        (BinOp::Mul(_), ..) => quote! { (#l * #r) },
        (BinOp::Div(_), ..) => quote! { (#l / #r) },
        _ => return Err(parse_error(span, "unsupported operator")),
    };
    Ok(Term { tokens, constant })
}

/// `base ^ exp`, `base.pow(exp)` and `base.powf(exp)` all pick the power that fits
/// which side depends on a parameter.
fn power(base: Term, exp: Term) -> Term {
    let (b, e) = (base.tokens, exp.tokens);
    let tokens = match (base.constant, exp.constant) {
        (true, true) => quote! { f64::powf(#b, #e) },
        (false, true) => quote! { ::dualgrad::Number::powf(#b, #e) },
        (true, false) => quote! { ::dualgrad::Number::rpow(#e, #b) },
        (false, false) => quote! { ::dualgrad::Number::pow(#b, #e) },
    };
    Term {
        tokens,
        constant: base.constant && exp.constant,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use syn::parse_quote;

    fn rejection(closure: ExprClosure) -> String {
        match expand(&closure) {
            Ok(ts) => panic!("expected a parse failure, got {ts}"),
            Err(e) => e.to_string(),
        }
    }

    #[test]
    fn test_expand() {
        let ts = expand(&parse_quote!(|x, y| [1.5 * x + x * y, x ^ y]))
            .unwrap()
            .to_string();
        assert!(ts.contains("rmul"));
        assert!(ts.contains("Number :: pow"));
        assert!(ts.contains("Output :: Vector"));

        let ts = expand(&parse_quote!(|x| ef::sqrt(x).powf(2) + 1)).unwrap().to_string();
        assert!(ts.contains(":: dualgrad :: elem :: sqrt"));
        assert!(ts.contains("Number :: powf"));
        assert!(ts.contains("Output :: Scalar"));

        let ts = expand(&parse_quote!(|x| 2.0.pow(x))).unwrap().to_string();
        assert!(ts.contains("Number :: rpow"));
    }

    #[test]
    fn test_intermediate_variable() {
        let msg = rejection(parse_quote!(|x, y| {
            let z = x * y;
            [z, x]
        }));
        assert!(msg.starts_with("multi-output parse failure: "));
        assert!(msg.ends_with("without intermediate variables"), "{msg}");
    }

    #[test]
    fn test_two_aliases() {
        let msg = rejection(parse_quote!(|x| [ef::sin(x), gf::cos(x)]));
        assert_eq!(
            msg,
            "multi-output parse failure: elementary functions are referenced \
            through more than one alias: ef, gf"
        );
        assert!(expand(&parse_quote!(|x| [ef::sin(x), ef::cos(x), tanh(x)])).is_ok());
    }

    #[test]
    fn test_unknown_function() {
        let msg = rejection(parse_quote!(|x, y| [atan2(x, y), x]));
        assert_eq!(
            msg,
            "multi-output parse failure: `atan2` is not an elementary function"
        );
        let msg = rejection(parse_quote!(|x| sin(x, 2)));
        assert_eq!(msg, "multi-output parse failure: `sin` takes 1 argument(s)");
    }

    #[test]
    fn test_logb_base() {
        let msg = rejection(parse_quote!(|x, y| logb(x, y)));
        assert_eq!(
            msg,
            "multi-output parse failure: the base of `logb` must be a constant"
        );
        assert!(expand(&parse_quote!(|x| logb(x, 2))).is_ok());
    }

    #[test]
    fn test_output_shape() {
        let msg = rejection(parse_quote!(|x| [x, 2]));
        assert_eq!(
            msg,
            "multi-output parse failure: output #1 does not depend on any parameter"
        );
        let msg = rejection(parse_quote!(|x| []));
        assert_eq!(msg, "multi-output parse failure: the output list is empty");
    }

    #[test]
    fn test_method_call() {
        let msg = rejection(parse_quote!(|x| [x.value(), x]));
        assert_eq!(
            msg,
            "multi-output parse failure: method `value` is not supported; only `pow` and `powf` are"
        );
    }
}
