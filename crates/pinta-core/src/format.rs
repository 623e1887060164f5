use crate::{
    class::FieldId,
    method::{MethodId, MethodRef},
    program::Program,
    stmt::{CallSiteId, Invoke, Stmt},
    types::Type,
    values::VarId,
};
use std::fmt::Write;

pub fn format_type(program: &Program, ty: &Type) -> String {
    program.type_name(ty)
}

pub fn format_method(program: &Program, method: MethodId) -> String {
    let method = program.method(method);
    format!(
        "<{}: {}>",
        program.class(method.declaring_class).name,
        method.subsignature
    )
}

pub fn format_method_ref(program: &Program, method: &MethodRef) -> String {
    format!("<{}: {}>", program.class(method.class).name, method.subsignature)
}

pub fn format_field(program: &Program, field: FieldId) -> String {
    let field = program.field(field);
    format!(
        "<{}: {}>",
        program.class(field.declaring_class).name,
        field.name
    )
}

pub fn format_var(program: &Program, var: VarId) -> String {
    let var = program.var(var);
    format!("{}/{}", format_method(program, var.method), var.name)
}

pub fn format_call_site(program: &Program, call_site: CallSiteId) -> String {
    let invoke = program.call_site(call_site);
    format!("{}[{}]", format_method(program, invoke.container), invoke.index)
}

fn var_name(program: &Program, var: VarId) -> &str {
    &program.var(var).name
}

pub fn format_invoke(program: &Program, invoke: &Invoke) -> String {
    let mut output = String::new();

    if let Some(result) = invoke.result {
        write!(&mut output, "{} = ", var_name(program, result)).unwrap();
    }
    write!(&mut output, "{} ", invoke.kind().keyword()).unwrap();
    if let Some(base) = invoke.exp.base() {
        write!(&mut output, "{}.", var_name(program, base)).unwrap();
    }
    write!(&mut output, "{}(", format_method_ref(program, invoke.exp.method_ref())).unwrap();
    for (i, arg) in invoke.exp.args().iter().enumerate() {
        if i > 0 {
            write!(&mut output, ", ").unwrap();
        }
        write!(&mut output, "{}", var_name(program, *arg)).unwrap();
    }
    write!(&mut output, ")").unwrap();

    output
}

// Renders a statement in the textual IR syntax, without the trailing `;`.
pub fn format_stmt(program: &Program, stmt: &Stmt) -> String {
    match stmt {
        Stmt::New { lhs, ty } => {
            format!("{} = new {}", var_name(program, *lhs), program.type_name(ty))
        }
        Stmt::Copy { lhs, rhs } => {
            format!("{} = {}", var_name(program, *lhs), var_name(program, *rhs))
        }
        Stmt::LoadStatic { lhs, field } => {
            format!(
                "{} = {}",
                var_name(program, *lhs),
                format_field(program, *field)
            )
        }
        Stmt::StoreStatic { field, rhs } => {
            format!(
                "{} = {}",
                format_field(program, *field),
                var_name(program, *rhs)
            )
        }
        Stmt::LoadField { lhs, base, field } => format!(
            "{} = {}.{}",
            var_name(program, *lhs),
            var_name(program, *base),
            format_field(program, *field)
        ),
        Stmt::StoreField { base, field, rhs } => format!(
            "{}.{} = {}",
            var_name(program, *base),
            format_field(program, *field),
            var_name(program, *rhs)
        ),
        Stmt::LoadArray { lhs, base, index } => format!(
            "{} = {}[{}]",
            var_name(program, *lhs),
            var_name(program, *base),
            index
        ),
        Stmt::StoreArray { base, index, rhs } => format!(
            "{}[{}] = {}",
            var_name(program, *base),
            index,
            var_name(program, *rhs)
        ),
        Stmt::Invoke(call_site) => format_invoke(program, program.call_site(*call_site)),
        Stmt::Return { value: Some(value) } => {
            format!("return {}", var_name(program, *value))
        }
        Stmt::Return { value: None } => "return".to_string(),
    }
}
