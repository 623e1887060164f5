use crate::{ParseError, ParseResult, Rule};
use pest::error::{Error, ErrorVariant};
use pest::iterators::{Pair, Pairs};
use pest::Span;
use pinta_core::builder::{ClassBuilder, MethodBuilder, ProgramBuilder};
use pinta_core::CallKind;

// Lowers parsed `.pir` pairs into the builder. Name resolution and validation happen in
// `ProgramBuilder::build`, so several files may be lowered into one builder first.
pub fn lower_into(builder: &mut ProgramBuilder, pairs: Pairs<'_, Rule>) -> ParseResult<()> {
    for pair in pairs.flat_map(|program| program.into_inner()) {
        match pair.as_rule() {
            Rule::class_decl => lower_class(builder, pair)?,
            Rule::entry_decl => {
                let span = pair.as_span();
                match parts(pair).as_slice() {
                    [sig] => {
                        let (class, subsignature) = method_sig(sig.clone())?;
                        builder.entry(class, &subsignature);
                    }
                    _ => return Err(malformed(span, "entry declaration")),
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn lower_class(builder: &mut ProgramBuilder, pair: Pair<'_, Rule>) -> ParseResult<()> {
    let span = pair.as_span();
    let mut name = None;
    let mut is_interface = false;
    let mut is_library = false;
    let mut is_abstract = false;
    let mut supers = Vec::new();
    let mut interfaces = Vec::new();
    let mut members = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::class_modifier => match modifier(inner) {
                Some(Rule::library_kw) => is_library = true,
                Some(Rule::abstract_kw) => is_abstract = true,
                _ => {}
            },
            Rule::interface_kw => is_interface = true,
            Rule::class_name => name = Some(inner.as_str()),
            Rule::extends_clause => supers = class_names(inner),
            Rule::implements_clause => interfaces = class_names(inner),
            Rule::field_decl | Rule::method_decl => members.push(inner),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| malformed(span, "class declaration"))?;
    if !is_interface && supers.len() > 1 {
        return Err(custom(
            span,
            format!("class {} extends more than one class", name),
        ));
    }

    let mut class = if is_interface {
        builder.interface(name)
    } else {
        builder.class(name)
    };
    if is_interface {
        // Interfaces extend other interfaces.
        for iface in supers.iter().chain(&interfaces) {
            class.implements(iface);
        }
    } else {
        if let Some(super_class) = supers.first() {
            class.extends(super_class);
        }
        for iface in &interfaces {
            class.implements(iface);
        }
    }
    if is_library {
        class.library();
    }
    if is_abstract {
        class.abstract_();
    }

    for member in members {
        match member.as_rule() {
            Rule::field_decl => lower_field(&mut class, member)?,
            Rule::method_decl => lower_method(&mut class, member)?,
            _ => {}
        }
    }
    Ok(())
}

fn lower_field(class: &mut ClassBuilder<'_>, pair: Pair<'_, Rule>) -> ParseResult<()> {
    let span = pair.as_span();
    let is_static = pair.clone().into_inner().any(|p| p.as_rule() == Rule::static_kw);
    match parts(pair).as_slice() {
        [name, ty] => {
            if is_static {
                class.static_field(name.as_str(), ty.as_str());
            } else {
                class.field(name.as_str(), ty.as_str());
            }
            Ok(())
        }
        _ => Err(malformed(span, "field declaration")),
    }
}

fn lower_method(class: &mut ClassBuilder<'_>, pair: Pair<'_, Rule>) -> ParseResult<()> {
    let span = pair.as_span();
    let mut name = None;
    let mut is_static = false;
    let mut is_abstract = false;
    let mut is_native = false;
    let mut params = Vec::new();
    let mut return_type = None;
    let mut body = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::method_modifier => match modifier(inner) {
                Some(Rule::static_kw) => is_static = true,
                Some(Rule::abstract_kw) => is_abstract = true,
                Some(Rule::native_kw) => is_native = true,
                _ => {}
            },
            Rule::method_name => name = Some(inner.as_str()),
            Rule::params => {
                for param in inner.into_inner() {
                    let param_span = param.as_span();
                    match parts(param).as_slice() {
                        [var, ty] => params.push((var.as_str(), ty.as_str())),
                        _ => return Err(malformed(param_span, "parameter")),
                    }
                }
            }
            Rule::return_type => return_type = inner.into_inner().next().map(|ty| ty.as_str()),
            Rule::method_body => body = Some(inner),
            _ => {}
        }
    }
    let name = name.ok_or_else(|| malformed(span, "method declaration"))?;

    let mut method = class.method(name);
    for (var, ty) in params {
        method.param(var, ty);
    }
    if let Some(ty) = return_type {
        method.returns(ty);
    }
    if is_static {
        method.static_();
    }
    if is_native {
        method.native();
    }
    match body {
        Some(body) => {
            if is_abstract {
                method.abstract_();
            }
            for stmt in body.into_inner() {
                lower_stmt(&mut method, stmt)?;
            }
        }
        // A method without a body is abstract unless it is native.
        None if !is_native => {
            method.abstract_();
        }
        None => {}
    }
    method.build()?;
    Ok(())
}

fn lower_stmt(method: &mut MethodBuilder<'_>, pair: Pair<'_, Rule>) -> ParseResult<()> {
    let rule = pair.as_rule();
    let span = pair.as_span();
    if rule == Rule::invoke_stmt {
        return lower_invoke(method, pair);
    }

    let items = parts(pair);
    match (rule, items.as_slice()) {
        (Rule::new_stmt, [lhs, ty]) => {
            method.new_object(lhs.as_str(), ty.as_str());
        }
        (Rule::copy_stmt, [lhs, rhs]) => {
            method.copy(lhs.as_str(), rhs.as_str());
        }
        (Rule::load_static_stmt, [lhs, field]) => {
            let (class, field) = field_sig(field.clone())?;
            method.load_static(lhs.as_str(), class, field);
        }
        (Rule::store_static_stmt, [field, rhs]) => {
            let (class, field) = field_sig(field.clone())?;
            method.store_static(class, field, rhs.as_str());
        }
        (Rule::load_field_stmt, [lhs, base, field]) => {
            let (class, field) = field_sig(field.clone())?;
            method.load_field(lhs.as_str(), base.as_str(), class, field);
        }
        (Rule::store_field_stmt, [base, field, rhs]) => {
            let (class, field) = field_sig(field.clone())?;
            method.store_field(base.as_str(), class, field, rhs.as_str());
        }
        (Rule::load_array_stmt, [lhs, base, index]) => {
            method.load_array(lhs.as_str(), base.as_str(), index.as_str());
        }
        (Rule::store_array_stmt, [base, index, rhs]) => {
            method.store_array(base.as_str(), index.as_str(), rhs.as_str());
        }
        (Rule::return_stmt, []) => {
            method.return_void();
        }
        (Rule::return_stmt, [value]) => {
            method.return_var(value.as_str());
        }
        _ => return Err(malformed(span, "statement")),
    }
    Ok(())
}

fn lower_invoke(method: &mut MethodBuilder<'_>, pair: Pair<'_, Rule>) -> ParseResult<()> {
    let span = pair.as_span();
    let mut kind = None;
    let mut result = None;
    let mut base = None;
    let mut target = None;
    let mut args = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::var_name if kind.is_none() => result = Some(inner.as_str()),
            Rule::var_name => base = Some(inner.as_str()),
            Rule::invoke_kind => kind = call_kind(inner.as_str()),
            Rule::method_sig => target = Some(method_sig(inner)?),
            Rule::args => args.extend(inner.into_inner().map(|arg| arg.as_str())),
            _ => {}
        }
    }

    match (kind, target) {
        (Some(kind), Some((class, subsignature))) => {
            method.invoke(kind, result, base, class, &subsignature, &args);
            Ok(())
        }
        _ => Err(malformed(span, "invoke statement")),
    }
}

fn call_kind(keyword: &str) -> Option<CallKind> {
    match keyword {
        "invokestatic" => Some(CallKind::Static),
        "invokespecial" => Some(CallKind::Special),
        "invokevirtual" => Some(CallKind::Virtual),
        "invokeinterface" => Some(CallKind::Interface),
        "invokedynamic" => Some(CallKind::Dynamic),
        _ => None,
    }
}

// `<A: foo(B,int[])>` -> ("A", "foo(B,int[])")
fn method_sig(pair: Pair<'_, Rule>) -> ParseResult<(&str, String)> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let (Some(class), Some(name)) = (inner.next(), inner.next()) else {
        return Err(malformed(span, "method signature"));
    };
    let params: Vec<&str> = inner.map(|ty| ty.as_str()).collect();
    Ok((class.as_str(), format!("{}({})", name.as_str(), params.join(","))))
}

// `<A: f>` -> ("A", "f")
fn field_sig(pair: Pair<'_, Rule>) -> ParseResult<(&str, &str)> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    match (inner.next(), inner.next()) {
        (Some(class), Some(field)) => Ok((class.as_str(), field.as_str())),
        _ => Err(malformed(span, "field signature")),
    }
}

fn modifier(pair: Pair<'_, Rule>) -> Option<Rule> {
    pair.into_inner().next().map(|keyword| keyword.as_rule())
}

fn class_names(pair: Pair<'_, Rule>) -> Vec<&str> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::class_name)
        .map(|p| p.as_str())
        .collect()
}

// Inner pairs without the keyword tokens.
fn parts(pair: Pair<'_, Rule>) -> Vec<Pair<'_, Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule())).collect()
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::class_kw
            | Rule::interface_kw
            | Rule::library_kw
            | Rule::abstract_kw
            | Rule::static_kw
            | Rule::native_kw
            | Rule::extends_kw
            | Rule::implements_kw
            | Rule::field_kw
            | Rule::method_kw
            | Rule::entry_kw
            | Rule::new_kw
            | Rule::return_kw
    )
}

fn custom(span: Span<'_>, message: String) -> ParseError {
    ParseError::Syntax(Box::new(Error::new_from_span(
        ErrorVariant::CustomError { message },
        span,
    )))
}

fn malformed(span: Span<'_>, what: &str) -> ParseError {
    custom(span, format!("malformed {}", what))
}
